//! REST API server for the Olist dashboard
//!
//! Usage:
//!   ./target/release/dashboard_server [options]
//!
//! Options:
//!   --port PORT          Port to listen on (default: 8080)
//!   --host HOST          Address to bind (default: 0.0.0.0)
//!   --data-path PATH     Cleaned dataset CSV (default: olist_cleaned_dataset.csv)
//!   --histogram-bins N   Delivery histogram bins (default: 40)
//!   --top-categories N   Categories in the revenue ranking (default: 10)
//!
//! REST endpoints:
//!   GET /api/v1/health                 - Health check
//!   GET /api/v1/years                  - Year filter options
//!   GET /api/v1/dataset?limit=N        - Prepared table and preparation report
//!   GET /api/v1/dashboard?year=Y       - Every view, grouped by section
//!   GET /api/v1/views/:name?year=Y     - A single view

use anyhow::Result;
use clap::Parser;
use olist_dashboard::{
    api::{self, DashboardService},
    config, DashboardConfig, DatasetCache,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "dashboard_server")]
#[command(about = "Serve the Olist dashboard views as JSON")]
struct Args {
    /// Port to listen on
    #[arg(long, default_value_t = 8080)]
    port: u16,

    /// Address to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    #[command(flatten)]
    config: DashboardConfig,
}

fn print_banner(addr: &SocketAddr, config: &DashboardConfig, rows: usize) {
    println!("============================================================");
    println!("         OLIST E-COMMERCE DASHBOARD API SERVER");
    println!("============================================================");
    println!();
    println!("  Address:  http://{}/api/v1/", addr);
    println!("  Dataset:  {} ({} prepared rows)", config.data_path.display(), rows);
    println!();
    println!("REST Endpoints:");
    println!("  GET /api/v1/health              Health check");
    println!("  GET /api/v1/years               Year filter options");
    println!("  GET /api/v1/dataset             Prepared table");
    println!("  GET /api/v1/dashboard?year=Y    All views");
    println!("  GET /api/v1/views/:name?year=Y  Single view");
    println!();
    println!("============================================================");
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(config::log_filter(config::SERVER_LOG_FILTER))
        .init();

    let args = Args::parse();
    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;

    let cache = DatasetCache::new(&args.config.data_path);
    let service = Arc::new(DashboardService::new(cache, args.config.view_options()));

    // Load eagerly: without the dataset there is nothing to serve
    let dataset = match service.dataset().await {
        Ok(dataset) => dataset,
        Err(e) => {
            tracing::error!("{}", e);
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    print_banner(&addr, &args.config, dataset.len());

    let app = api::router(service);
    tracing::info!("Starting REST server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
