//! Olist e-commerce dashboard, terminal edition
//!
//! Run: ./target/release/olist_dashboard [section] [--year Y] [--data-path PATH]
//! Sections: all, sales, delivery

use anyhow::Result;
use clap::Parser;
use olist_dashboard::{
    config,
    filter::{year_options, FilteredTable},
    render::{render_view, section_header},
    views::{Section, DASHBOARD_TITLE},
    DashboardConfig, DashboardViews, YearSelection,
};
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "olist_dashboard")]
#[command(about = "Render the Olist e-commerce dashboard as text charts")]
struct Args {
    /// Which part of the dashboard to draw: all, sales, delivery
    #[arg(default_value = "all")]
    section: String,

    /// Purchase year to filter on, or "all"
    #[arg(long, default_value = "all")]
    year: YearSelection,

    #[command(flatten)]
    config: DashboardConfig,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(config::log_filter(config::REPORT_LOG_FILTER))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<()> {
    let sections: Vec<Section> = match args.section.as_str() {
        "all" => Section::ALL.to_vec(),
        "sales" => vec![Section::Sales],
        "delivery" => vec![Section::Delivery],
        other => {
            println!("Unknown section: {}", other);
            println!("Available: all, sales, delivery");
            return Ok(());
        }
    };

    // A missing file halts here, before any view is computed
    let dataset = olist_dashboard::load_prepared(&args.config.data_path)?;
    let options = args.config.view_options();

    let years: Vec<String> = year_options(&dataset).iter().map(|y| y.to_string()).collect();
    let table = FilteredTable::new(&dataset, args.year);
    let views = DashboardViews::compute(&table, &options);

    println!("\n{}", "█".repeat(80));
    println!("  {}", DASHBOARD_TITLE.to_uppercase());
    println!("{}", "█".repeat(80));
    println!("  Dataset:      {}", args.config.data_path.display());
    println!("  Rows:         {} prepared, {} in selection", dataset.len(), table.len());
    println!("  Year:         {}   (available: {})", args.year, years.join(", "));

    for section in sections {
        print!("{}", section_header(section.title()));
        for name in section.views() {
            print!("{}", render_view(name, &views, &options)?);
        }
    }

    println!("\n{}", "█".repeat(80));
    Ok(())
}
