//! BasketForge: market-basket analytics CLI for café point-of-sale exports
//!
//! This is the main entrypoint that orchestrates data loading, the analytics
//! pipeline, console reporting, charts and JSON export.

use anyhow::{Context, Result};
use basketforge::{load_orders, viz, AnalyticsPipeline, Args};
use clap::Parser;
use std::fs::File;
use std::io::BufWriter;
use std::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .init();

    run_pipeline(&args)
}

fn run_pipeline(args: &Args) -> Result<()> {
    println!("=== Market Basket Analysis ===\n");

    let start_time = Instant::now();

    // Validate thresholds before touching the input
    let mut pipeline = AnalyticsPipeline::new(args.pipeline_config())?;
    let config = pipeline.config();
    info!(
        min_support = config.mining.min_support,
        min_confidence = config.rules.min_confidence,
        window = config.moving_average_window,
        "pipeline configured"
    );

    info!(input = %args.input, "loading orders");
    let data_start = Instant::now();
    let orders = load_orders(&args.input, &args.column_names())?;
    println!("✓ Data loaded: {} orders", orders.len());
    info!(elapsed = data_start.elapsed().as_secs_f64(), "data loaded");

    let analysis_start = Instant::now();
    let report = pipeline.run(&orders)?;
    println!(
        "✓ Analysis complete: {} frequent itemsets, {} rules",
        report.frequent_itemsets.len(),
        report.rules.len()
    );
    info!(
        elapsed = analysis_start.elapsed().as_secs_f64(),
        "analysis finished"
    );

    viz::print_report(&report, args.top);

    if let (Some(trend_path), Some(hourly_path)) = (&args.output, args.hourly_chart_path()) {
        viz::generate_visualization_report(&report, trend_path, &hourly_path)?;
        println!("\nMonthly trend chart saved to: {trend_path}");
        println!("Hourly chart saved to: {hourly_path}");
    }

    if let Some(json_path) = &args.json {
        let file = File::create(json_path)
            .with_context(|| format!("failed to create {json_path}"))?;
        serde_json::to_writer_pretty(BufWriter::new(file), &report)?;
        println!("Report written to: {json_path}");
    }

    println!("\n=== Pipeline Complete ===");
    println!(
        "Total processing time: {:.2}s",
        start_time.elapsed().as_secs_f64()
    );

    Ok(())
}
