//! REST API handlers for the dashboard
//!
//! These handlers use the shared DashboardService.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::service::DashboardService;
use crate::error::DashboardError;
use crate::filter::YearSelection;
use crate::models::OrderRecord;
use crate::prepare::PreparationReport;
use crate::views::{ChartSpec, Section, ViewData, ViewName, DASHBOARD_TITLE};

// ============================================================================
// Response Types
// ============================================================================

#[derive(Serialize)]
pub struct YearsResponse {
    pub years: Vec<YearSelection>,
}

#[derive(Serialize)]
pub struct DatasetResponse {
    pub path: String,
    pub total_rows: usize,
    pub report: PreparationReport,
    pub rows: Vec<OrderRecord>,
}

#[derive(Serialize)]
pub struct ViewResponse {
    pub name: ViewName,
    pub chart: ChartSpec,
    pub data: ViewData,
}

#[derive(Serialize)]
pub struct SectionResponse {
    pub id: Section,
    pub title: &'static str,
    pub views: Vec<ViewResponse>,
}

#[derive(Serialize)]
pub struct DashboardResponse {
    pub title: &'static str,
    pub year: YearSelection,
    pub year_label: String,
    pub total_rows: usize,
    pub sections: Vec<SectionResponse>,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

// ============================================================================
// Query Parameters
// ============================================================================

#[derive(Deserialize)]
pub struct YearQuery {
    pub year: Option<String>,
}

impl YearQuery {
    fn selection(&self) -> Result<YearSelection, DashboardError> {
        match self.year.as_deref() {
            None | Some("") => Ok(YearSelection::All),
            Some(year) => year.parse(),
        }
    }
}

#[derive(Deserialize)]
pub struct LimitQuery {
    pub limit: Option<String>,
}

impl LimitQuery {
    const DEFAULT: usize = 100;

    fn limit(&self) -> Result<usize, DashboardError> {
        match self.limit.as_deref().map(str::trim) {
            None | Some("") => Ok(Self::DEFAULT),
            Some(limit) => limit
                .parse()
                .map_err(|_| DashboardError::InvalidLimit(limit.to_string())),
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

pub type AppState = Arc<DashboardService>;
pub type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(e: DashboardError) -> ApiError {
    let status = match &e {
        DashboardError::InvalidYear(_) | DashboardError::InvalidLimit(_) => {
            StatusCode::BAD_REQUEST
        }
        DashboardError::UnknownView(_) => StatusCode::NOT_FOUND,
        DashboardError::DatasetNotFound { .. }
        | DashboardError::DatasetUnreadable { .. }
        | DashboardError::LoadAborted(_) => StatusCode::SERVICE_UNAVAILABLE,
    };
    (status, Json(ErrorResponse { error: e.to_string() }))
}

/// GET /api/v1/health
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok"}))
}

/// GET /api/v1/years
pub async fn get_years(State(service): State<AppState>) -> Result<Json<YearsResponse>, ApiError> {
    let years = service.year_options().await.map_err(api_error)?;
    Ok(Json(YearsResponse { years }))
}

/// GET /api/v1/dataset
pub async fn get_dataset(
    State(service): State<AppState>,
    Query(params): Query<LimitQuery>,
) -> Result<Json<DatasetResponse>, ApiError> {
    let limit = params.limit().map_err(api_error)?;
    let dataset = service.dataset().await.map_err(api_error)?;
    Ok(Json(DatasetResponse {
        path: service.cache().path().display().to_string(),
        total_rows: dataset.len(),
        report: dataset.report().clone(),
        rows: dataset.records().iter().take(limit).cloned().collect(),
    }))
}

/// GET /api/v1/dashboard?year=Y
pub async fn get_dashboard(
    State(service): State<AppState>,
    Query(params): Query<YearQuery>,
) -> Result<Json<DashboardResponse>, ApiError> {
    let selection = params.selection().map_err(api_error)?;
    let views = service.dashboard(selection).await.map_err(api_error)?;
    let options = service.options();

    let sections = Section::ALL
        .into_iter()
        .map(|section| SectionResponse {
            id: section,
            title: section.title(),
            views: section
                .views()
                .map(|name| ViewResponse {
                    name,
                    chart: name.chart(selection, options),
                    data: views.view(name),
                })
                .collect(),
        })
        .collect();

    Ok(Json(DashboardResponse {
        title: DASHBOARD_TITLE,
        year: selection,
        year_label: selection.label(),
        total_rows: views.row_count,
        sections,
    }))
}

/// GET /api/v1/views/:name?year=Y
pub async fn get_view(
    State(service): State<AppState>,
    Path(name): Path<String>,
    Query(params): Query<YearQuery>,
) -> Result<Json<ViewResponse>, ApiError> {
    let name: ViewName = name.parse().map_err(api_error)?;
    let selection = params.selection().map_err(api_error)?;
    let data = service.view(name, selection).await.map_err(api_error)?;
    Ok(Json(ViewResponse {
        name,
        chart: name.chart(selection, service.options()),
        data,
    }))
}
