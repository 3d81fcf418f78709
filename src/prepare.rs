//! Data preparation
//!
//! Turns the raw CSV table into typed order rows:
//! 1. every column whose name mentions a date or timestamp is coerced to a datetime,
//! 2. `delivery_time_days` is taken from the file or derived from the purchase and
//!    delivery timestamps,
//! 3. rows with a missing or negative delivery time are dropped,
//! 4. year and month grouping keys are derived from the purchase timestamp.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, info, warn};

use crate::loader::RawTable;
use crate::models::{
    OrderRecord, YearMonth, DELIVERY_TIME_DAYS, ORDER_DELIVERED_CUSTOMER_DATE, ORDER_ID,
    ORDER_PURCHASE_TIMESTAMP, PRICE, PRODUCT_CATEGORY_NAME, REQUIRED_COLUMNS, REVIEW_SCORE,
};

const DATETIME_FORMATS: [&str; 3] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Where the delivery time of the prepared rows came from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryTimeSource {
    /// The file carried a `delivery_time_days` column
    Provided,
    /// Computed from delivery date minus purchase timestamp
    Derived,
    /// Neither route was possible; every row is dropped
    #[default]
    Unavailable,
}

/// A date-like column that could not be read as datetimes and was left as text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoercionFailure {
    pub column: String,
    pub sample: String,
}

/// What preparation did to the input, for auditing and the dataset endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PreparationReport {
    pub rows_read: usize,
    pub rows_kept: usize,
    pub dropped_missing_delivery: usize,
    pub dropped_negative_delivery: usize,
    pub delivery_source: DeliveryTimeSource,
    pub coerced_columns: Vec<String>,
    pub skipped_columns: Vec<CoercionFailure>,
    pub cells_coerced_to_missing: usize,
    pub missing_columns: Vec<String>,
}

/// The immutable, prepared order table.
#[derive(Debug, Clone, Default)]
pub struct PreparedDataset {
    records: Vec<OrderRecord>,
    report: PreparationReport,
}

impl PreparedDataset {
    pub fn records(&self) -> &[OrderRecord] {
        &self.records
    }

    pub fn report(&self) -> &PreparationReport {
        &self.report
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Sorted, deduplicated purchase years present in the data.
    pub fn years(&self) -> Vec<i32> {
        self.records
            .iter()
            .filter_map(|r| r.order_year)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

impl FromIterator<OrderRecord> for PreparedDataset {
    fn from_iter<I: IntoIterator<Item = OrderRecord>>(iter: I) -> Self {
        let records: Vec<OrderRecord> = iter.into_iter().collect();
        let report = PreparationReport {
            rows_read: records.len(),
            rows_kept: records.len(),
            delivery_source: DeliveryTimeSource::Provided,
            ..Default::default()
        };
        Self { records, report }
    }
}

pub fn is_temporal_column(name: &str) -> bool {
    name.contains("date") || name.contains("timestamp")
}

/// Parse one datetime cell. Empty and malformed cells are `None`.
pub fn parse_timestamp(cell: &str) -> Option<NaiveDateTime> {
    let cell = cell.trim();
    if cell.is_empty() {
        return None;
    }
    for format in DATETIME_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(cell, format) {
            return Some(ts);
        }
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(cell) {
        return Some(ts.naive_utc());
    }
    NaiveDate::parse_from_str(cell, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

fn parse_number(cell: &str) -> Option<f64> {
    let cell = cell.trim();
    if cell.is_empty() {
        return None;
    }
    cell.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn parse_review_score(cell: &str) -> Option<u8> {
    parse_number(cell)
        .filter(|v| v.fract() == 0.0 && (0.0..=255.0).contains(v))
        .map(|v| v as u8)
}

fn parse_text(cell: &str) -> Option<String> {
    let cell = cell.trim();
    (!cell.is_empty()).then(|| cell.to_string())
}

fn cell(row: &[String], index: Option<usize>) -> &str {
    index
        .and_then(|i| row.get(i))
        .map(String::as_str)
        .unwrap_or("")
}

/// Whole days from `start` to `end`, floored (one hour early is -1, not 0).
pub fn whole_days_between(start: NaiveDateTime, end: NaiveDateTime) -> i64 {
    let elapsed = end - start;
    let days = elapsed.num_days();
    if elapsed < Duration::days(days) {
        days - 1
    } else {
        days
    }
}

/// A temporal column after coercion
#[derive(Debug, Clone, PartialEq)]
pub struct CoercedColumn {
    pub values: Vec<Option<NaiveDateTime>>,
    /// Non-empty cells that did not parse and became missing
    pub unparsed_cells: usize,
}

/// Coerce one column to datetimes.
///
/// Unparseable cells become missing. The column as a whole fails only when it has
/// content and none of it parses, in which case it is left as text.
pub fn coerce_temporal<'a>(
    column: &str,
    cells: impl Iterator<Item = &'a str>,
) -> Result<CoercedColumn, CoercionFailure> {
    let mut values = Vec::new();
    let mut parsed = 0usize;
    let mut unparsed_cells = 0usize;
    let mut sample: Option<&str> = None;

    for cell in cells {
        let value = parse_timestamp(cell);
        match value {
            Some(_) => parsed += 1,
            None if !cell.trim().is_empty() => {
                unparsed_cells += 1;
                sample.get_or_insert(cell);
            }
            None => {}
        }
        values.push(value);
    }

    if parsed == 0 && unparsed_cells > 0 {
        return Err(CoercionFailure {
            column: column.to_string(),
            sample: sample.unwrap_or_default().to_string(),
        });
    }

    Ok(CoercedColumn {
        values,
        unparsed_cells,
    })
}

/// Run the full preparation pipeline.
pub fn prepare(raw: RawTable) -> PreparedDataset {
    let row_count = raw.len();
    let mut report = PreparationReport {
        rows_read: row_count,
        ..Default::default()
    };

    for name in REQUIRED_COLUMNS {
        if raw.column_index(name).is_none() {
            warn!("Column '{}' is missing; its values are treated as absent", name);
            report.missing_columns.push(name.to_string());
        }
    }

    let mut temporal: HashMap<&str, Vec<Option<NaiveDateTime>>> = HashMap::new();
    for (index, name) in raw.headers.iter().enumerate() {
        if !is_temporal_column(name) {
            continue;
        }
        match coerce_temporal(name, raw.column(index)) {
            Ok(coerced) => {
                if coerced.unparsed_cells > 0 {
                    debug!(
                        "Column '{}': {} cells could not be parsed and are missing",
                        name, coerced.unparsed_cells
                    );
                }
                report.cells_coerced_to_missing += coerced.unparsed_cells;
                report.coerced_columns.push(name.clone());
                temporal.insert(name.as_str(), coerced.values);
            }
            Err(failure) => {
                warn!(
                    "Column '{}' left unparsed: no datetime values (e.g. {:?})",
                    failure.column, failure.sample
                );
                report.skipped_columns.push(failure);
            }
        }
    }

    let purchased = temporal
        .remove(ORDER_PURCHASE_TIMESTAMP)
        .unwrap_or_else(|| vec![None; row_count]);
    let delivered = temporal
        .remove(ORDER_DELIVERED_CUSTOMER_DATE)
        .unwrap_or_else(|| vec![None; row_count]);

    let delivery: Vec<Option<f64>> = if let Some(index) = raw.column_index(DELIVERY_TIME_DAYS) {
        report.delivery_source = DeliveryTimeSource::Provided;
        raw.column(index).map(parse_number).collect()
    } else if raw.column_index(ORDER_DELIVERED_CUSTOMER_DATE).is_some()
        && raw.column_index(ORDER_PURCHASE_TIMESTAMP).is_some()
    {
        report.delivery_source = DeliveryTimeSource::Derived;
        purchased
            .iter()
            .zip(&delivered)
            .map(|(p, d)| match (p, d) {
                (Some(p), Some(d)) => Some(whole_days_between(*p, *d) as f64),
                _ => None,
            })
            .collect()
    } else {
        warn!(
            "'{}' is absent and cannot be derived; every row will be dropped",
            DELIVERY_TIME_DAYS
        );
        report.delivery_source = DeliveryTimeSource::Unavailable;
        vec![None; row_count]
    };

    let order_id = raw.column_index(ORDER_ID);
    let price = raw.column_index(PRICE);
    let category = raw.column_index(PRODUCT_CATEGORY_NAME);
    let review = raw.column_index(REVIEW_SCORE);

    let mut records = Vec::with_capacity(row_count);
    for (i, row) in raw.rows.iter().enumerate() {
        let delivery_time_days = match delivery[i] {
            Some(days) if days < 0.0 => {
                report.dropped_negative_delivery += 1;
                continue;
            }
            Some(days) => days,
            None => {
                report.dropped_missing_delivery += 1;
                continue;
            }
        };

        let purchase = purchased[i];
        records.push(OrderRecord {
            order_id: parse_text(cell(row, order_id)),
            order_purchase_timestamp: purchase,
            order_delivered_customer_date: delivered[i],
            price: parse_number(cell(row, price)),
            product_category_name: parse_text(cell(row, category)),
            review_score: parse_review_score(cell(row, review)),
            delivery_time_days,
            order_year_month: purchase.as_ref().map(YearMonth::of),
            order_year: purchase.as_ref().map(|ts| YearMonth::of(ts).year),
        });
    }

    report.rows_kept = records.len();
    info!(
        "Prepared {} of {} rows ({} missing delivery time, {} negative)",
        report.rows_kept,
        report.rows_read,
        report.dropped_missing_delivery,
        report.dropped_negative_delivery
    );

    PreparedDataset { records, report }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::read_table;

    fn prepare_csv(csv: &str) -> PreparedDataset {
        prepare(read_table(csv.as_bytes()).unwrap())
    }

    const HEADER: &str = "order_id,order_purchase_timestamp,order_delivered_customer_date,price,product_category_name,review_score";

    #[test]
    fn test_derives_delivery_days_and_keys() {
        let csv = format!(
            "{}\n1,2023-01-05 10:00:00,2023-01-10 09:00:00,100,toys,4\n",
            HEADER
        );
        let dataset = prepare_csv(&csv);
        let report = dataset.report();

        assert_eq!(report.delivery_source, DeliveryTimeSource::Derived);
        assert_eq!(report.coerced_columns.len(), 2);
        assert_eq!(dataset.len(), 1);

        let row = &dataset.records()[0];
        // 4 days 23 hours
        assert_eq!(row.delivery_time_days, 4.0);
        assert_eq!(row.order_year, Some(2023));
        assert_eq!(row.order_year_month, Some(YearMonth { year: 2023, month: 1 }));
        assert_eq!(row.review_score, Some(4));
        assert_eq!(row.product_category_name.as_deref(), Some("toys"));
    }

    #[test]
    fn test_drops_missing_and_negative_delivery() {
        let csv = format!(
            "{}\n\
             1,2023-01-05 10:00:00,,100,toys,4\n\
             2,2023-01-05 10:00:00,2023-01-05 09:00:00,50,toys,5\n\
             3,2023-01-05 10:00:00,2023-01-05 11:00:00,20,toys,5\n",
            HEADER
        );
        let dataset = prepare_csv(&csv);
        let report = dataset.report();

        assert_eq!(report.rows_read, 3);
        assert_eq!(report.dropped_missing_delivery, 1);
        // one hour early floors to -1 day
        assert_eq!(report.dropped_negative_delivery, 1);
        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.records()[0].order_id.as_deref(), Some("3"));
        assert_eq!(dataset.records()[0].delivery_time_days, 0.0);
    }

    #[test]
    fn test_provided_delivery_column_wins() {
        let csv = "order_id,order_purchase_timestamp,price,delivery_time_days\n\
                   a,2018-03-01 00:00:00,10,7\n\
                   b,,10,3.0\n\
                   c,2018-03-02 00:00:00,10,\n\
                   d,2018-03-02 00:00:00,10,-2\n";
        let dataset = prepare_csv(csv);

        assert_eq!(dataset.report().delivery_source, DeliveryTimeSource::Provided);
        assert_eq!(dataset.len(), 2);
        let b = &dataset.records()[1];
        assert_eq!(b.delivery_time_days, 3.0);
        assert_eq!(b.order_year, None);
        assert_eq!(b.order_year_month, None);
    }

    #[test]
    fn test_non_finite_delivery_is_missing() {
        let csv = "order_id,order_purchase_timestamp,price,delivery_time_days\n\
                   a,2018-01-01,1,inf\n\
                   b,2018-01-02,1,3\n\
                   c,2018-01-03,1,-Infinity\n\
                   d,2018-01-04,NaN,2\n";
        let dataset = prepare_csv(csv);
        let report = dataset.report();

        assert_eq!(report.dropped_missing_delivery, 2);
        assert_eq!(report.dropped_negative_delivery, 0);
        let days: Vec<f64> = dataset.records().iter().map(|r| r.delivery_time_days).collect();
        assert_eq!(days, vec![3.0, 2.0]);
        assert_eq!(dataset.records()[1].price, None);
    }

    #[test]
    fn test_underivable_delivery_drops_everything() {
        let csv = "order_id,order_purchase_timestamp,price\n1,2018-01-01 00:00:00,5\n";
        let dataset = prepare_csv(csv);

        assert!(dataset.is_empty());
        assert_eq!(dataset.report().delivery_source, DeliveryTimeSource::Unavailable);
        assert_eq!(dataset.report().dropped_missing_delivery, 1);
        assert!(dataset
            .report()
            .missing_columns
            .contains(&ORDER_DELIVERED_CUSTOMER_DATE.to_string()));
    }

    #[test]
    fn test_unparseable_date_column_is_reported_not_fatal() {
        let csv = format!(
            "{},shipping_limit_date\n1,2023-01-05,2023-01-06,10,toys,5,soon\n",
            HEADER
        );
        let dataset = prepare_csv(&csv);
        let report = dataset.report();

        assert_eq!(dataset.len(), 1);
        assert_eq!(
            report.skipped_columns,
            vec![CoercionFailure {
                column: "shipping_limit_date".to_string(),
                sample: "soon".to_string(),
            }]
        );
        assert!(!report.coerced_columns.contains(&"shipping_limit_date".to_string()));
    }

    #[test]
    fn test_bad_cells_coerce_to_missing() {
        let column = ["2017-10-02 10:56:33", "not a date", "", "2017-10-02T10:56:33Z"];
        let coerced = coerce_temporal("order_approved_at_date", column.into_iter()).unwrap();
        assert_eq!(coerced.unparsed_cells, 1);
        assert!(coerced.values[0].is_some());
        assert!(coerced.values[1].is_none());
        assert!(coerced.values[2].is_none());
        assert!(coerced.values[3].is_some());
    }

    #[test]
    fn test_review_score_parsing() {
        assert_eq!(parse_review_score("5"), Some(5));
        assert_eq!(parse_review_score("4.0"), Some(4));
        assert_eq!(parse_review_score("4.5"), None);
        assert_eq!(parse_review_score(""), None);
        assert_eq!(parse_review_score("-1"), None);
        assert_eq!(parse_number("inf"), None);
        assert_eq!(parse_number(" 12.5 "), Some(12.5));
    }

    #[test]
    fn test_temporal_column_names() {
        assert!(is_temporal_column("order_purchase_timestamp"));
        assert!(is_temporal_column("order_delivered_customer_date"));
        assert!(!is_temporal_column("delivery_time_days"));
        assert!(!is_temporal_column("price"));
    }

    #[test]
    fn test_years_sorted_and_deduplicated() {
        let csv = "order_id,order_purchase_timestamp,delivery_time_days\n\
                   a,2018-01-01,1\nb,2016-10-01,1\nc,2018-05-01,1\nd,,1\n";
        let dataset = prepare_csv(csv);
        assert_eq!(dataset.years(), vec![2016, 2018]);
    }
}
