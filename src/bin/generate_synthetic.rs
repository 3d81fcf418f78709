//! Synthetic data generator for the Olist dashboard
//!
//! Writes an order-item CSV shaped like the cleaned Olist dataset, including the
//! dirty rows the dashboard has to drop (missing and negative delivery times).
//!
//! Usage:
//!   cargo run --release --bin generate_synthetic -- [OPTIONS]
//!
//! Options:
//!   --orders <N>                   Number of orders to generate (default: 10000)
//!   --start <DATE>                 First purchase date (default: 2016-09-01)
//!   --end <DATE>                   Last purchase date (default: 2018-08-31)
//!   --missing-delivery-rate <F>    Share of items never delivered (default: 0.03)
//!   --negative-delivery-rate <F>   Share of items delivered "before" purchase (default: 0.005)
//!   --missing-review-rate <F>      Share of items without a review (default: 0.01)
//!   --with-delivery-days           Also write a precomputed delivery_time_days column
//!   --seed <N>                     Random seed for reproducibility (optional)
//!   --output <PATH>                Output CSV path (default: olist_cleaned_dataset.csv)

use chrono::{Duration, NaiveDate, NaiveDateTime};
use clap::Parser;
use csv::WriterBuilder;
use rand::distributions::WeightedIndex;
use rand::prelude::*;
use rand::rngs::StdRng;
use serde::Serialize;
use std::error::Error;
use std::path::PathBuf;

/// Synthetic data generator for the dashboard dataset
#[derive(Parser, Debug)]
#[command(name = "generate_synthetic")]
#[command(about = "Generate a synthetic Olist-style order-item dataset")]
struct Args {
    /// Number of orders to generate
    #[arg(long, default_value = "10000")]
    orders: usize,

    /// First purchase date
    #[arg(long, default_value = "2016-09-01")]
    start: NaiveDate,

    /// Last purchase date
    #[arg(long, default_value = "2018-08-31")]
    end: NaiveDate,

    /// Probability that an item has no delivery date
    #[arg(long, default_value = "0.03")]
    missing_delivery_rate: f64,

    /// Probability that an item's delivery date precedes its purchase
    #[arg(long, default_value = "0.005")]
    negative_delivery_rate: f64,

    /// Probability that an item has no review score
    #[arg(long, default_value = "0.01")]
    missing_review_rate: f64,

    /// Write a precomputed delivery_time_days column
    #[arg(long)]
    with_delivery_days: bool,

    /// Random seed for reproducibility
    #[arg(long)]
    seed: Option<u64>,

    /// Output CSV path
    #[arg(long, default_value = "olist_cleaned_dataset.csv")]
    output: PathBuf,
}

/// Category name, typical item price in BRL, relative popularity
const CATEGORIES: [(&str, f64, u32); 15] = [
    ("cama_mesa_banho", 90.0, 110),
    ("beleza_saude", 130.0, 97),
    ("esporte_lazer", 115.0, 86),
    ("moveis_decoracao", 85.0, 83),
    ("informatica_acessorios", 115.0, 78),
    ("utilidades_domesticas", 90.0, 70),
    ("relogios_presentes", 200.0, 60),
    ("telefonia", 70.0, 45),
    ("ferramentas_jardim", 110.0, 44),
    ("automotivo", 140.0, 42),
    ("brinquedos", 115.0, 41),
    ("cool_stuff", 165.0, 38),
    ("perfumaria", 120.0, 34),
    ("bebes", 130.0, 30),
    ("eletronicos", 60.0, 28),
];

#[derive(Debug, Serialize)]
struct OutputRecord {
    order_id: String,
    order_item_id: u32,
    order_purchase_timestamp: String,
    order_delivered_customer_date: Option<String>,
    order_estimated_delivery_date: String,
    price: f64,
    freight_value: f64,
    product_category_name: String,
    review_score: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    delivery_time_days: Option<Option<i64>>,
}

/// Format datetime for CSV output
fn format_datetime(dt: &NaiveDateTime) -> String {
    dt.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Generate an order ID like Olist's 32-hex-digit identifiers
fn generate_order_id(rng: &mut impl Rng) -> String {
    format!("{:032x}", rng.gen::<u128>())
}

/// Purchase time between start and end, skewed toward the end to mimic growth
fn purchase_time(start: NaiveDateTime, span_seconds: i64, rng: &mut impl Rng) -> NaiveDateTime {
    let position = rng.gen::<f64>().sqrt();
    start + Duration::seconds((position * span_seconds as f64) as i64)
}

/// Transit time in whole days: mostly one to four weeks with a long tail
fn transit_days(rng: &mut impl Rng) -> i64 {
    let base = 3 + (0..3).map(|_| rng.gen_range(0..8i64)).sum::<i64>();
    if rng.gen_bool(0.05) {
        base + rng.gen_range(10..60)
    } else {
        base
    }
}

/// Review score that drops as delivery takes longer
fn review_score(days: Option<i64>, rng: &mut impl Rng) -> u8 {
    let weights: [u32; 5] = match days {
        Some(d) if d <= 10 => [3, 2, 8, 20, 67],
        Some(d) if d <= 20 => [10, 5, 15, 25, 45],
        Some(_) => [40, 10, 15, 15, 20],
        None => [60, 10, 10, 10, 10],
    };
    WeightedIndex::new(weights)
        .map(|dist| dist.sample(rng) as u8 + 1)
        .unwrap_or(5)
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    if args.end < args.start {
        return Err(format!("--end {} is before --start {}", args.end, args.start).into());
    }

    println!("🔧 Synthetic Dataset Generator");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("Output:               {}", args.output.display());
    println!("Orders:               {}", args.orders);
    println!("Purchase range:       {} .. {}", args.start, args.end);
    println!("Missing delivery:     {:.1}%", args.missing_delivery_rate * 100.0);
    println!("Negative delivery:    {:.1}%", args.negative_delivery_rate * 100.0);
    println!("Missing review:       {:.1}%", args.missing_review_rate * 100.0);
    println!("delivery_time_days:   {}", args.with_delivery_days);
    if let Some(seed) = args.seed {
        println!("Random seed:          {}", seed);
    }
    println!();

    // Initialize RNG
    let mut rng: StdRng = match args.seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };

    let start = args.start.and_hms_opt(0, 0, 0).ok_or("invalid start date")?;
    let end = args.end.and_hms_opt(23, 59, 59).ok_or("invalid end date")?;
    let span_seconds = (end - start).num_seconds();
    let category_dist = WeightedIndex::new(CATEGORIES.iter().map(|c| c.2))?;
    let item_count_dist = WeightedIndex::new([88u32, 9, 3])?;

    // Ensure output directory exists
    if let Some(parent) = args.output.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut writer = WriterBuilder::new()
        .has_headers(true)
        .from_path(&args.output)?;

    println!("🏭 Generating orders...");

    let mut items_written = 0usize;
    let mut undelivered = 0usize;
    let mut negative = 0usize;

    for i in 0..args.orders {
        let order_id = generate_order_id(&mut rng);
        let purchased = purchase_time(start, span_seconds, &mut rng);
        let estimated = purchased + Duration::days(rng.gen_range(20..35));

        // Items of one order share delivery, like a single shipment
        let delivered = if rng.gen_bool(args.missing_delivery_rate.clamp(0.0, 1.0)) {
            undelivered += 1;
            None
        } else if rng.gen_bool(args.negative_delivery_rate.clamp(0.0, 1.0)) {
            negative += 1;
            Some(purchased - Duration::hours(rng.gen_range(1..72)))
        } else {
            Some(purchased + Duration::days(transit_days(&mut rng)) + Duration::minutes(rng.gen_range(0..1440)))
        };
        let days = delivered.map(|d| (d - purchased).num_seconds().div_euclid(86_400));

        let score = if rng.gen_bool(args.missing_review_rate.clamp(0.0, 1.0)) {
            None
        } else {
            Some(review_score(days, &mut rng))
        };

        let item_count = item_count_dist.sample(&mut rng) + 1;
        for item in 0..item_count {
            let (category, typical_price, _) = CATEGORIES[category_dist.sample(&mut rng)];
            let price = (typical_price * rng.gen_range(-0.8f64..0.8).exp() * 100.0).round() / 100.0;
            let freight_value = (rng.gen_range(7.0..40.0f64) * 100.0).round() / 100.0;

            writer.serialize(OutputRecord {
                order_id: order_id.clone(),
                order_item_id: item as u32 + 1,
                order_purchase_timestamp: format_datetime(&purchased),
                order_delivered_customer_date: delivered.as_ref().map(format_datetime),
                order_estimated_delivery_date: format_datetime(&estimated),
                price,
                freight_value,
                product_category_name: category.to_string(),
                review_score: score,
                delivery_time_days: args.with_delivery_days.then_some(days),
            })?;
            items_written += 1;
        }

        // Progress indicator
        if (i + 1) % 10000 == 0 {
            println!("   Generated {}/{} orders...", i + 1, args.orders);
        }
    }

    writer.flush()?;

    println!("\n✅ Generation complete!");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("Orders:               {:>8}", args.orders);
    println!("Item rows:            {:>8}", items_written);
    println!("Undelivered orders:   {:>8}", undelivered);
    println!("Negative deliveries:  {:>8}", negative);
    println!("Output file:          {}", args.output.display());

    Ok(())
}
