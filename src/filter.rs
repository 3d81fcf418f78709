//! Global year filter

use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::DashboardError;
use crate::models::OrderRecord;
use crate::prepare::PreparedDataset;

/// The year picked in the dashboard's filter, or the "all years" sentinel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum YearSelection {
    #[default]
    All,
    Year(i32),
}

impl YearSelection {
    pub fn matches(&self, record: &OrderRecord) -> bool {
        match self {
            YearSelection::All => true,
            YearSelection::Year(year) => record.order_year == Some(*year),
        }
    }

    /// Suffix used in chart titles
    pub fn label(&self) -> String {
        match self {
            YearSelection::All => "(All Years)".to_string(),
            YearSelection::Year(year) => format!("Year {}", year),
        }
    }
}

impl fmt::Display for YearSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            YearSelection::All => f.write_str("all"),
            YearSelection::Year(year) => write!(f, "{}", year),
        }
    }
}

impl FromStr for YearSelection {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") {
            return Ok(YearSelection::All);
        }
        s.parse::<i32>()
            .map(YearSelection::Year)
            .map_err(|_| DashboardError::InvalidYear(s.to_string()))
    }
}

impl Serialize for YearSelection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            YearSelection::All => serializer.serialize_str("all"),
            YearSelection::Year(year) => serializer.serialize_i32(*year),
        }
    }
}

/// Options offered by the year selector: the sentinel first, then each year in the data.
pub fn year_options(dataset: &PreparedDataset) -> Vec<YearSelection> {
    std::iter::once(YearSelection::All)
        .chain(dataset.years().into_iter().map(YearSelection::Year))
        .collect()
}

/// Rows of the prepared dataset that pass the year filter. Borrows, never mutates.
#[derive(Debug, Clone)]
pub struct FilteredTable<'a> {
    selection: YearSelection,
    rows: Vec<&'a OrderRecord>,
}

impl<'a> FilteredTable<'a> {
    pub fn new(dataset: &'a PreparedDataset, selection: YearSelection) -> Self {
        let rows = dataset
            .records()
            .iter()
            .filter(|r| selection.matches(r))
            .collect();
        Self { selection, rows }
    }

    pub fn selection(&self) -> YearSelection {
        self.selection
    }

    pub fn rows(&self) -> &[&'a OrderRecord] {
        &self.rows
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a OrderRecord> + '_ {
        self.rows.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::YearMonth;

    fn record(id: &str, year: Option<i32>) -> OrderRecord {
        OrderRecord {
            order_id: Some(id.to_string()),
            order_purchase_timestamp: None,
            order_delivered_customer_date: None,
            price: Some(1.0),
            product_category_name: None,
            review_score: None,
            delivery_time_days: 1.0,
            order_year_month: year.map(|y| YearMonth { year: y, month: 1 }),
            order_year: year,
        }
    }

    #[test]
    fn test_parse_selection() {
        assert_eq!("all".parse::<YearSelection>().unwrap(), YearSelection::All);
        assert_eq!("ALL".parse::<YearSelection>().unwrap(), YearSelection::All);
        assert_eq!("2017".parse::<YearSelection>().unwrap(), YearSelection::Year(2017));
        assert!(matches!(
            "Semua tahun".parse::<YearSelection>(),
            Err(DashboardError::InvalidYear(_))
        ));
    }

    #[test]
    fn test_serializes_sentinel_as_string() {
        let json = serde_json::to_string(&[YearSelection::All, YearSelection::Year(2018)]).unwrap();
        assert_eq!(json, r#"["all",2018]"#);
    }

    #[test]
    fn test_year_options_prefixed_with_sentinel() {
        let dataset: PreparedDataset = vec![
            record("a", Some(2018)),
            record("b", Some(2016)),
            record("c", None),
            record("d", Some(2018)),
        ]
        .into_iter()
        .collect();

        assert_eq!(
            year_options(&dataset),
            vec![YearSelection::All, YearSelection::Year(2016), YearSelection::Year(2018)]
        );
    }

    #[test]
    fn test_filter_by_year() {
        let dataset: PreparedDataset = vec![
            record("a", Some(2017)),
            record("b", Some(2018)),
            record("c", None),
        ]
        .into_iter()
        .collect();

        assert_eq!(FilteredTable::new(&dataset, YearSelection::All).len(), 3);

        let only_2018 = FilteredTable::new(&dataset, YearSelection::Year(2018));
        let ids: Vec<_> = only_2018.iter().map(|r| r.order_id.as_deref()).collect();
        assert_eq!(ids, vec![Some("b")]);

        assert!(FilteredTable::new(&dataset, YearSelection::Year(1999)).is_empty());
        assert_eq!(dataset.len(), 3);
    }

    #[test]
    fn test_labels() {
        assert_eq!(YearSelection::All.label(), "(All Years)");
        assert_eq!(YearSelection::Year(2017).label(), "Year 2017");
    }
}
