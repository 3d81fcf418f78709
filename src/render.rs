//! Text charts for the terminal report
//!
//! Draws already-aggregated views; no grouping happens here.

use std::fmt::{self, Write};

use crate::config::ViewOptions;
use crate::histogram::Histogram;
use crate::views::{ChartKind, ChartSpec, DashboardViews, ViewData, ViewName};

const BAR_WIDTH: usize = 50;
const CHART_HEIGHT: usize = 10;

pub fn section_header(title: &str) -> String {
    format!("\n{}\n  {}\n{}\n", "═".repeat(80), title, "═".repeat(80))
}

fn subsection(out: &mut String, chart: &ChartSpec) -> fmt::Result {
    writeln!(out, "\n{}", chart.title)?;
    writeln!(out, "{}", "─".repeat(70))
}

fn scaled(value: f64, max: f64, width: usize) -> usize {
    if max <= 0.0 || !value.is_finite() {
        return 0;
    }
    ((value / max).clamp(0.0, 1.0) * width as f64).round() as usize
}

fn max_of(values: &[f64]) -> f64 {
    values.iter().copied().fold(0.0, f64::max)
}

/// One row per point with a marker placed along the value axis.
fn marker_rows(out: &mut String, labels: &[String], values: &[f64], marker: char) -> fmt::Result {
    let max = max_of(values);
    for (label, value) in labels.iter().zip(values) {
        writeln!(
            out,
            "  {:>10} │{:>10.2} {}{}",
            label,
            value,
            " ".repeat(scaled(*value, max, BAR_WIDTH)),
            marker
        )?;
    }
    Ok(())
}

fn horizontal_bars(out: &mut String, labels: &[String], values: &[f64]) -> fmt::Result {
    let max = max_of(values);
    let width = labels.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    for (label, value) in labels.iter().zip(values) {
        writeln!(
            out,
            "  {:<width$} {:>12.2} {}",
            label,
            value,
            "█".repeat(scaled(*value, max, BAR_WIDTH)),
            width = width
        )?;
    }
    Ok(())
}

fn vertical_bars(out: &mut String, labels: &[String], values: &[f64]) -> fmt::Result {
    let max = max_of(values);
    let heights: Vec<usize> = values.iter().map(|v| scaled(*v, max, CHART_HEIGHT)).collect();
    for level in (1..=CHART_HEIGHT).rev() {
        let row: String = heights
            .iter()
            .map(|h| if *h >= level { "█ " } else { "  " })
            .collect();
        writeln!(out, "  │{}", row.trim_end())?;
    }
    writeln!(out, "  └{}", "──".repeat(heights.len()))?;
    for (label, value) in labels.iter().zip(values) {
        writeln!(out, "  {:>10}  {:>12.2}", label, value)?;
    }
    Ok(())
}

fn histogram_rows(out: &mut String, hist: &Histogram) -> fmt::Result {
    let max_count = hist.bins.iter().map(|b| b.count).max().unwrap_or(0) as f64;
    let max_density = hist.density.iter().map(|p| p.y).fold(0.0, f64::max);
    let max = max_count.max(max_density);

    for bin in &hist.bins {
        let center = (bin.lower + bin.upper) / 2.0;
        let bar = scaled(bin.count as f64, max, BAR_WIDTH);
        let mut line: Vec<char> = "█".repeat(bar).chars().collect();
        line.resize(BAR_WIDTH + 1, ' ');

        let nearest = hist.density.iter().min_by(|a, b| {
            (a.x - center).abs().total_cmp(&(b.x - center).abs())
        });
        if let Some(point) = nearest {
            line[scaled(point.y, max, BAR_WIDTH)] = '•';
        }

        writeln!(
            out,
            "  [{:>7.1}, {:>7.1}) {:>7} {}",
            bin.lower,
            bin.upper,
            bin.count,
            line.into_iter().collect::<String>().trim_end()
        )?;
    }
    if let Some(bw) = hist.bandwidth {
        writeln!(out, "  density overlay (•): gaussian kernel, bandwidth {:.2} days", bw)?;
    }
    Ok(())
}

/// Render one view of the dashboard as a text chart.
pub fn render_view(
    name: ViewName,
    views: &DashboardViews,
    options: &ViewOptions,
) -> Result<String, fmt::Error> {
    let chart = name.chart(views.selection, options);
    let data = views.view(name);
    let mut out = String::new();
    subsection(&mut out, &chart)?;
    writeln!(out, "  x: {}   y: {}", chart.x_label, chart.y_label)?;

    if data.is_empty() {
        writeln!(out, "  (no data for this selection)")?;
        return Ok(out);
    }

    let (labels, values): (Vec<String>, Vec<f64>) = match &data {
        ViewData::OrderCounts(rows) => rows
            .iter()
            .map(|r| (r.month.format("%Y-%m").to_string(), r.num_orders as f64))
            .unzip(),
        ViewData::Revenue(rows) => rows
            .iter()
            .map(|r| (r.month.format("%Y-%m").to_string(), r.revenue))
            .unzip(),
        ViewData::Categories(rows) => rows.iter().map(|r| (r.category.clone(), r.revenue)).unzip(),
        ViewData::ReviewDelivery(rows) => rows
            .iter()
            .map(|r| (format!("score {}", r.review_score), r.mean_delivery_days))
            .unzip(),
        ViewData::Distribution(hist) => {
            histogram_rows(&mut out, hist)?;
            return Ok(out);
        }
    };

    match chart.kind {
        ChartKind::Line => marker_rows(&mut out, &labels, &values, '●')?,
        ChartKind::LineWithMarkers => marker_rows(&mut out, &labels, &values, 'o')?,
        ChartKind::HorizontalBar => horizontal_bars(&mut out, &labels, &values)?,
        ChartKind::VerticalBar => vertical_bars(&mut out, &labels, &values)?,
        ChartKind::HistogramWithDensity => {}
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{FilteredTable, YearSelection};
    use crate::models::{OrderRecord, YearMonth};
    use crate::prepare::PreparedDataset;

    fn views(year: YearSelection) -> DashboardViews {
        let data: PreparedDataset = (0..12)
            .map(|i| OrderRecord {
                order_id: Some(format!("o{}", i)),
                order_purchase_timestamp: None,
                order_delivered_customer_date: None,
                price: Some(10.0 * (i + 1) as f64),
                product_category_name: Some((if i % 2 == 0 { "toys" } else { "books" }).to_string()),
                review_score: Some((i % 5 + 1) as u8),
                delivery_time_days: i as f64,
                order_year_month: Some(YearMonth { year: 2018, month: (i % 3 + 1) as u32 }),
                order_year: Some(2018),
            })
            .collect();
        DashboardViews::compute(&FilteredTable::new(&data, year), &ViewOptions::default())
    }

    #[test]
    fn test_every_view_renders_title_and_rows() {
        let views = views(YearSelection::All);
        let options = ViewOptions::default();

        for name in ViewName::ALL {
            let text = render_view(name, &views, &options).unwrap();
            assert!(text.contains(&name.chart(YearSelection::All, &options).title));
            assert!(!text.contains("no data"), "{} rendered empty", name);
        }

        let top = render_view(ViewName::TopCategories, &views, &options).unwrap();
        assert!(top.contains("toys"));
        assert!(top.contains('█'));

        let hist = render_view(ViewName::DeliveryDistribution, &views, &options).unwrap();
        assert_eq!(hist.lines().filter(|l| l.trim_start().starts_with('[')).count(), 40);
    }

    #[test]
    fn test_empty_selection_renders_placeholder() {
        let views = views(YearSelection::Year(2001));
        let text = render_view(ViewName::RevenuePerMonth, &views, &ViewOptions::default()).unwrap();
        assert!(text.contains("Year 2001"));
        assert!(text.contains("(no data for this selection)"));
    }
}
