use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Serialize, Serializer};
use std::fmt;

pub const ORDER_ID: &str = "order_id";
pub const ORDER_PURCHASE_TIMESTAMP: &str = "order_purchase_timestamp";
pub const ORDER_DELIVERED_CUSTOMER_DATE: &str = "order_delivered_customer_date";
pub const PRICE: &str = "price";
pub const PRODUCT_CATEGORY_NAME: &str = "product_category_name";
pub const REVIEW_SCORE: &str = "review_score";
pub const DELIVERY_TIME_DAYS: &str = "delivery_time_days";

/// Columns the views read. Anything else in the file is carried through untouched.
pub const REQUIRED_COLUMNS: [&str; 6] = [
    ORDER_ID,
    ORDER_PURCHASE_TIMESTAMP,
    ORDER_DELIVERED_CUSTOMER_DATE,
    PRICE,
    PRODUCT_CATEGORY_NAME,
    REVIEW_SCORE,
];

/// Calendar month bucket of a purchase
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn of(ts: &NaiveDateTime) -> Self {
        Self {
            year: ts.year(),
            month: ts.month(),
        }
    }

    /// First day of the month, the x value used for charting.
    pub fn first_day(&self) -> NaiveDate {
        // year/month come from a valid timestamp, so day 1 always exists
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl Serialize for YearMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One prepared order-item row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderRecord {
    pub order_id: Option<String>,
    pub order_purchase_timestamp: Option<NaiveDateTime>,
    pub order_delivered_customer_date: Option<NaiveDateTime>,
    pub price: Option<f64>,
    pub product_category_name: Option<String>,
    pub review_score: Option<u8>,
    /// Always present and non-negative once the row survives preparation
    pub delivery_time_days: f64,
    pub order_year_month: Option<YearMonth>,
    pub order_year: Option<i32>,
}

impl OrderRecord {
    /// Month bucket reconstructed as a first-of-month date
    pub fn purchase_month(&self) -> Option<NaiveDate> {
        self.order_year_month.map(|ym| ym.first_day())
    }
}
