//! REST API tests against the in-process router

use axum::body::Body;
use axum::http::{Request, StatusCode};
use olist_dashboard::{
    api::{self, DashboardService},
    config::ViewOptions,
    DatasetCache,
};
use serde_json::Value;
use std::io::Write;
use std::sync::Arc;
use tower::ServiceExt;

const CSV: &str = "order_id,order_purchase_timestamp,order_delivered_customer_date,price,product_category_name,review_score\n\
                   1,2017-03-05 10:00:00,2017-03-10 10:00:00,100,toys,4\n\
                   2,2017-03-20 10:00:00,2017-03-22 10:00:00,50,toys,5\n\
                   3,2018-07-01 10:00:00,2018-07-11 10:00:00,80,garden,3\n\
                   4,2018-07-02 10:00:00,,500,garden,1\n";

fn app_with_file(file: &tempfile::NamedTempFile) -> axum::Router {
    let cache = DatasetCache::new(file.path());
    api::router(Arc::new(DashboardService::new(cache, ViewOptions::default())))
}

fn dataset_file() -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(CSV.as_bytes()).unwrap();
    file
}

async fn get(app: axum::Router, uri: &str) -> (StatusCode, Value) {
    let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let body = axum::body::to_bytes(resp.into_body(), 1024 * 1024)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn test_health() {
    let file = dataset_file();
    let (status, json) = get(app_with_file(&file), "/api/v1/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_years_start_with_sentinel() {
    let file = dataset_file();
    let (status, json) = get(app_with_file(&file), "/api/v1/years").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["years"], serde_json::json!(["all", 2017, 2018]));
}

#[tokio::test]
async fn test_dashboard_all_years() {
    let file = dataset_file();
    let (status, json) = get(app_with_file(&file), "/api/v1/dashboard").await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(json["title"], "Olist E-Commerce Dashboard");
    assert_eq!(json["year"], "all");
    assert_eq!(json["year_label"], "(All Years)");
    assert_eq!(json["total_rows"], 3);

    let sections = json["sections"].as_array().unwrap();
    assert_eq!(sections.len(), 2);
    assert_eq!(sections[0]["id"], "sales");
    assert_eq!(sections[1]["id"], "delivery");

    let sales = sections[0]["views"].as_array().unwrap();
    assert_eq!(sales[0]["name"], "orders-per-month");
    assert_eq!(sales[0]["chart"]["kind"], "line");
    assert_eq!(sales[0]["data"][0]["month"], "2017-03-01");
    assert_eq!(sales[0]["data"][0]["num_orders"], 2);

    let top = &sales[2];
    assert_eq!(top["chart"]["kind"], "horizontal_bar");
    assert_eq!(top["data"][0]["category"], "toys");
    assert_eq!(top["data"][0]["revenue"], 150.0);

    let delivery = sections[1]["views"].as_array().unwrap();
    assert_eq!(delivery[0]["chart"]["kind"], "histogram_with_density");
    assert_eq!(delivery[0]["data"]["bins"].as_array().unwrap().len(), 40);
    assert_eq!(delivery[2]["chart"]["kind"], "line_with_markers");
}

#[tokio::test]
async fn test_single_view_filtered_by_year() {
    let file = dataset_file();
    let (status, json) = get(app_with_file(&file), "/api/v1/views/revenue-per-month?year=2018").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["chart"]["title"], "Total Revenue Year 2018");
    assert_eq!(json["data"], serde_json::json!([{"month": "2018-07-01", "revenue": 80.0}]));
}

#[tokio::test]
async fn test_year_without_rows_gives_empty_views() {
    let file = dataset_file();
    let (status, json) = get(app_with_file(&file), "/api/v1/views/review-trend?year=2010").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"], serde_json::json!([]));
}

#[tokio::test]
async fn test_bad_requests() {
    let file = dataset_file();

    let (status, json) = get(app_with_file(&file), "/api/v1/dashboard?year=someday").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("someday"));

    let (status, _) = get(app_with_file(&file), "/api/v1/views/pie-chart").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_dataset_endpoint_reports_preparation() {
    let file = dataset_file();
    let (status, json) = get(app_with_file(&file), "/api/v1/dataset?limit=2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total_rows"], 3);
    assert_eq!(json["rows"].as_array().unwrap().len(), 2);
    assert_eq!(json["rows"][0]["order_year_month"], "2017-03");
    assert_eq!(json["report"]["dropped_missing_delivery"], 1);
    assert_eq!(json["report"]["delivery_source"], "derived");
}

#[tokio::test]
async fn test_malformed_limit_is_json_error() {
    let file = dataset_file();

    let (status, json) = get(app_with_file(&file), "/api/v1/dataset?limit=abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("abc"));

    let (status, json) = get(app_with_file(&file), "/api/v1/dataset?limit=-1").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("-1"));

    let (status, json) = get(app_with_file(&file), "/api/v1/dataset?limit=").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["rows"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_unreadable_dataset_is_unavailable() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"order_id,price\n1,\xff\xfe\n").unwrap();

    let (status, json) = get(app_with_file(&file), "/api/v1/years").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(json["error"].as_str().unwrap().contains("Failed to read dataset"));
}

#[tokio::test]
async fn test_missing_dataset_is_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let cache = DatasetCache::new(dir.path().join("olist_cleaned_dataset.csv"));
    let app = api::router(Arc::new(DashboardService::new(cache, ViewOptions::default())));

    let (status, json) = get(app, "/api/v1/dashboard").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(json["error"].as_str().unwrap().contains("not found"));
}
