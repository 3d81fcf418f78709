//! The six aggregation views of the dashboard
//!
//! Every view is a pure function of a [`FilteredTable`]; none depends on another.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::config::ViewOptions;
use crate::error::DashboardError;
use crate::filter::{FilteredTable, YearSelection};
use crate::histogram::{histogram_with_density, Histogram};
use crate::models::YearMonth;

pub const DASHBOARD_TITLE: &str = "Olist E-Commerce Dashboard";

// ============================================================================
// View rows
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyOrderCount {
    pub month: NaiveDate,
    pub num_orders: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyRevenue {
    pub month: NaiveDate,
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryRevenue {
    pub category: String,
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewDelivery {
    pub review_score: u8,
    pub mean_delivery_days: f64,
}

// ============================================================================
// Queries
// ============================================================================

/// Distinct orders per purchase month, chronological.
pub fn monthly_order_counts(table: &FilteredTable) -> Vec<MonthlyOrderCount> {
    let mut months: BTreeMap<YearMonth, HashSet<&str>> = BTreeMap::new();
    for record in table.iter() {
        let Some(month) = record.order_year_month else {
            continue;
        };
        let orders = months.entry(month).or_default();
        if let Some(id) = record.order_id.as_deref() {
            orders.insert(id);
        }
    }

    months
        .into_iter()
        .map(|(month, orders)| MonthlyOrderCount {
            month: month.first_day(),
            num_orders: orders.len(),
        })
        .collect()
}

/// Summed item price per purchase month, chronological.
pub fn monthly_revenue(table: &FilteredTable) -> Vec<MonthlyRevenue> {
    let mut months: BTreeMap<YearMonth, f64> = BTreeMap::new();
    for record in table.iter() {
        if let Some(month) = record.order_year_month {
            *months.entry(month).or_insert(0.0) += record.price.unwrap_or(0.0);
        }
    }

    months
        .into_iter()
        .map(|(month, revenue)| MonthlyRevenue {
            month: month.first_day(),
            revenue,
        })
        .collect()
}

/// The `limit` categories with the highest summed price, highest first.
///
/// Categories are grouped in name order and the sort is stable, so equal revenues
/// keep name order.
pub fn top_categories(table: &FilteredTable, limit: usize) -> Vec<CategoryRevenue> {
    let mut categories: BTreeMap<&str, f64> = BTreeMap::new();
    for record in table.iter() {
        if let Some(category) = record.product_category_name.as_deref() {
            *categories.entry(category).or_insert(0.0) += record.price.unwrap_or(0.0);
        }
    }

    let mut ranked: Vec<CategoryRevenue> = categories
        .into_iter()
        .map(|(category, revenue)| CategoryRevenue {
            category: category.to_string(),
            revenue,
        })
        .collect();
    ranked.sort_by(|a, b| b.revenue.total_cmp(&a.revenue));
    ranked.truncate(limit);
    ranked
}

/// Histogram of delivery days with density overlay.
pub fn delivery_distribution(table: &FilteredTable, bin_count: usize) -> Histogram {
    let values: Vec<f64> = table.iter().map(|r| r.delivery_time_days).collect();
    histogram_with_density(&values, bin_count)
}

/// Mean delivery days per review score, in grouping order.
pub fn mean_delivery_by_review(table: &FilteredTable) -> Vec<ReviewDelivery> {
    let mut scores: BTreeMap<u8, (f64, usize)> = BTreeMap::new();
    for record in table.iter() {
        if let Some(score) = record.review_score {
            let (sum, count) = scores.entry(score).or_insert((0.0, 0));
            *sum += record.delivery_time_days;
            *count += 1;
        }
    }

    scores
        .into_iter()
        .map(|(review_score, (sum, count))| ReviewDelivery {
            review_score,
            mean_delivery_days: sum / count as f64,
        })
        .collect()
}

/// Mean delivery days per review score, explicitly sorted by score for the trend line.
pub fn review_delivery_trend(table: &FilteredTable) -> Vec<ReviewDelivery> {
    let mut trend = mean_delivery_by_review(table);
    trend.sort_by_key(|r| r.review_score);
    trend
}

// ============================================================================
// View catalogue and chart metadata
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViewName {
    OrdersPerMonth,
    RevenuePerMonth,
    TopCategories,
    DeliveryDistribution,
    DeliveryByReview,
    ReviewTrend,
}

impl ViewName {
    pub const ALL: [ViewName; 6] = [
        ViewName::OrdersPerMonth,
        ViewName::RevenuePerMonth,
        ViewName::TopCategories,
        ViewName::DeliveryDistribution,
        ViewName::DeliveryByReview,
        ViewName::ReviewTrend,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ViewName::OrdersPerMonth => "orders-per-month",
            ViewName::RevenuePerMonth => "revenue-per-month",
            ViewName::TopCategories => "top-categories",
            ViewName::DeliveryDistribution => "delivery-distribution",
            ViewName::DeliveryByReview => "delivery-by-review",
            ViewName::ReviewTrend => "review-trend",
        }
    }

    pub fn section(&self) -> Section {
        match self {
            ViewName::OrdersPerMonth | ViewName::RevenuePerMonth | ViewName::TopCategories => {
                Section::Sales
            }
            _ => Section::Delivery,
        }
    }

    /// Chart type, title and axes for this view under `selection`.
    pub fn chart(&self, selection: YearSelection, options: &ViewOptions) -> ChartSpec {
        let label = selection.label();
        match self {
            ViewName::OrdersPerMonth => ChartSpec::new(
                ChartKind::Line,
                format!("Orders per Month {}", label),
                "Month",
                "Number of Orders",
            ),
            ViewName::RevenuePerMonth => ChartSpec::new(
                ChartKind::VerticalBar,
                format!("Total Revenue {}", label),
                "Month",
                "Total Revenue (BRL)",
            ),
            ViewName::TopCategories => ChartSpec::new(
                ChartKind::HorizontalBar,
                format!("Top {} Product Categories {}", options.top_categories, label),
                "Total Revenue (BRL)",
                "Product Category",
            ),
            ViewName::DeliveryDistribution => ChartSpec::new(
                ChartKind::HistogramWithDensity,
                "Delivery Time Distribution (Days)".to_string(),
                "Delivery Time (days)",
                "Number of Orders",
            ),
            ViewName::DeliveryByReview => ChartSpec::new(
                ChartKind::VerticalBar,
                "Average Delivery Time by Review Score".to_string(),
                "Review Score",
                "Average Delivery Time (days)",
            ),
            ViewName::ReviewTrend => ChartSpec::new(
                ChartKind::LineWithMarkers,
                "Review Score vs Delivery Time".to_string(),
                "Average Delivery Time (days)",
                "Review Score",
            ),
        }
    }
}

impl fmt::Display for ViewName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ViewName {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ViewName::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| DashboardError::UnknownView(s.to_string()))
    }
}

/// The two tabs of the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Sales,
    Delivery,
}

impl Section {
    pub const ALL: [Section; 2] = [Section::Sales, Section::Delivery];

    pub fn title(&self) -> &'static str {
        match self {
            Section::Sales => "How do sales perform over time?",
            Section::Delivery => "How does delivery time relate to review scores?",
        }
    }

    pub fn views(&self) -> impl Iterator<Item = ViewName> + '_ {
        ViewName::ALL.into_iter().filter(move |v| v.section() == *self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Line,
    VerticalBar,
    HorizontalBar,
    HistogramWithDensity,
    LineWithMarkers,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub title: String,
    pub x_label: &'static str,
    pub y_label: &'static str,
}

impl ChartSpec {
    fn new(kind: ChartKind, title: String, x_label: &'static str, y_label: &'static str) -> Self {
        Self {
            kind,
            title,
            x_label,
            y_label,
        }
    }
}

/// Data of a single view, serialized without a wrapper.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ViewData {
    OrderCounts(Vec<MonthlyOrderCount>),
    Revenue(Vec<MonthlyRevenue>),
    Categories(Vec<CategoryRevenue>),
    Distribution(Histogram),
    ReviewDelivery(Vec<ReviewDelivery>),
}

impl ViewData {
    pub fn is_empty(&self) -> bool {
        match self {
            ViewData::OrderCounts(rows) => rows.is_empty(),
            ViewData::Revenue(rows) => rows.is_empty(),
            ViewData::Categories(rows) => rows.is_empty(),
            ViewData::Distribution(hist) => hist.bins.is_empty(),
            ViewData::ReviewDelivery(rows) => rows.is_empty(),
        }
    }
}

// ============================================================================
// All views at once
// ============================================================================

/// Every derived table for one year selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardViews {
    pub selection: YearSelection,
    pub row_count: usize,
    pub orders_per_month: Vec<MonthlyOrderCount>,
    pub revenue_per_month: Vec<MonthlyRevenue>,
    pub top_categories: Vec<CategoryRevenue>,
    pub delivery_distribution: Histogram,
    pub delivery_by_review: Vec<ReviewDelivery>,
    pub review_trend: Vec<ReviewDelivery>,
}

impl DashboardViews {
    pub fn compute(table: &FilteredTable, options: &ViewOptions) -> Self {
        debug!(
            "Computing dashboard views for {} ({} rows)",
            table.selection(),
            table.len()
        );
        Self {
            selection: table.selection(),
            row_count: table.len(),
            orders_per_month: monthly_order_counts(table),
            revenue_per_month: monthly_revenue(table),
            top_categories: top_categories(table, options.top_categories),
            delivery_distribution: delivery_distribution(table, options.histogram_bins),
            delivery_by_review: mean_delivery_by_review(table),
            review_trend: review_delivery_trend(table),
        }
    }

    pub fn view(&self, name: ViewName) -> ViewData {
        match name {
            ViewName::OrdersPerMonth => ViewData::OrderCounts(self.orders_per_month.clone()),
            ViewName::RevenuePerMonth => ViewData::Revenue(self.revenue_per_month.clone()),
            ViewName::TopCategories => ViewData::Categories(self.top_categories.clone()),
            ViewName::DeliveryDistribution => {
                ViewData::Distribution(self.delivery_distribution.clone())
            }
            ViewName::DeliveryByReview => ViewData::ReviewDelivery(self.delivery_by_review.clone()),
            ViewName::ReviewTrend => ViewData::ReviewDelivery(self.review_trend.clone()),
        }
    }
}

/// Compute just one view.
pub fn compute_view(table: &FilteredTable, name: ViewName, options: &ViewOptions) -> ViewData {
    match name {
        ViewName::OrdersPerMonth => ViewData::OrderCounts(monthly_order_counts(table)),
        ViewName::RevenuePerMonth => ViewData::Revenue(monthly_revenue(table)),
        ViewName::TopCategories => {
            ViewData::Categories(top_categories(table, options.top_categories))
        }
        ViewName::DeliveryDistribution => {
            ViewData::Distribution(delivery_distribution(table, options.histogram_bins))
        }
        ViewName::DeliveryByReview => ViewData::ReviewDelivery(mean_delivery_by_review(table)),
        ViewName::ReviewTrend => ViewData::ReviewDelivery(review_delivery_trend(table)),
    }
}
