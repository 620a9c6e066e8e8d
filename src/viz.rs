//! Console report and Plotters charts for the analytics report

use crate::pipeline::{AnalyticsReport, MonthlyTrendPoint};
use crate::temporal::{month_label, HourlyActivity};
use plotters::prelude::*;
use tracing::info;

const REVENUE_COLOR: RGBColor = RGBColor(194, 138, 52);
const AVERAGE_COLOR: RGBColor = RED;
const HOURLY_COLOR: RGBColor = RGBColor(166, 115, 41);

/// Revenue and moving-average series indexed by month position
pub fn monthly_chart_series(trend: &[MonthlyTrendPoint]) -> (Vec<(f64, f64)>, Vec<(f64, f64)>) {
    let revenue = trend
        .iter()
        .enumerate()
        .map(|(i, p)| (i as f64, p.revenue))
        .collect();
    let average = trend
        .iter()
        .enumerate()
        .filter_map(|(i, p)| p.moving_average.map(|ma| (i as f64, ma)))
        .collect();
    (revenue, average)
}

/// Upper bound of the y axis with 10% headroom
fn y_ceiling(values: impl Iterator<Item = f64>) -> f64 {
    let max = values.fold(0.0_f64, f64::max);
    if max > 0.0 {
        max * 1.1
    } else {
        1.0
    }
}

/// Month label for an x-axis tick; ticks between months stay blank
fn axis_label(trend: &[MonthlyTrendPoint], position: f64) -> String {
    let index = position.round();
    if index < 0.0 || (index - position).abs() > 1e-6 {
        return String::new();
    }
    trend
        .get(index as usize)
        .map(|p| month_label(p.year, p.month))
        .unwrap_or_default()
}

/// Line chart of monthly revenue with its trailing moving average
pub fn create_monthly_trend_chart(
    trend: &[MonthlyTrendPoint],
    output_path: &str,
) -> crate::Result<()> {
    if trend.is_empty() {
        anyhow::bail!("No monthly revenue to plot");
    }

    let (revenue, average) = monthly_chart_series(trend);
    let y_max = y_ceiling(revenue.iter().map(|&(_, v)| v));
    let x_max = (trend.len() as f64 - 0.5).max(0.5);

    let root = BitMapBackend::new(output_path, (800, 500)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Monthly Revenue and Moving Average", ("sans-serif", 28))
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(80)
        .build_cartesian_2d(-0.5f64..x_max, 0f64..y_max)?;

    let label_formatter = |x: &f64| axis_label(trend, *x);
    chart
        .configure_mesh()
        .x_labels(trend.len().max(2))
        .x_label_formatter(&label_formatter)
        .x_desc("Month")
        .y_desc("Revenue")
        .axis_desc_style(("sans-serif", 15))
        .draw()?;

    chart
        .draw_series(LineSeries::new(revenue.clone(), &REVENUE_COLOR))?
        .label("Revenue")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], REVENUE_COLOR));
    chart.draw_series(
        revenue
            .iter()
            .map(|&point| Circle::new(point, 3, REVENUE_COLOR.filled())),
    )?;

    chart
        .draw_series(LineSeries::new(average, &AVERAGE_COLOR))?
        .label("Moving average")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], AVERAGE_COLOR));

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    info!(path = output_path, "monthly trend chart saved");

    Ok(())
}

/// Order count per hour of day
pub fn create_hourly_chart(hourly: &[HourlyActivity], output_path: &str) -> crate::Result<()> {
    if hourly.is_empty() {
        anyhow::bail!("No hourly activity to plot");
    }

    let y_max = y_ceiling(hourly.iter().map(|h| h.orders as f64));

    let root = BitMapBackend::new(output_path, (800, 400)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Orders by Hour of Day", ("sans-serif", 28))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0f64..24f64, 0f64..y_max)?;

    chart
        .configure_mesh()
        .x_labels(12)
        .x_desc("Hour")
        .y_desc("Orders")
        .axis_desc_style(("sans-serif", 15))
        .draw()?;

    for activity in hourly {
        let hour = activity.hour as f64;
        chart.draw_series(std::iter::once(Rectangle::new(
            [(hour + 0.1, 0.0), (hour + 0.9, activity.orders as f64)],
            HOURLY_COLOR.filled(),
        )))?;
    }

    root.present()?;
    info!(path = output_path, "hourly chart saved");

    Ok(())
}

fn format_amount(value: f64) -> String {
    let whole = value.round() as i64;
    let digits = whole.abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    if whole < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

/// Print the report to the console
pub fn print_report(report: &AnalyticsReport, top: usize) {
    let summary = &report.summary;
    println!("\n=== Sales Summary ===");
    println!("Total revenue:       Rp {}", format_amount(summary.total_revenue));
    println!("Total orders:        {}", summary.total_orders);
    println!("Average order value: Rp {}", format_amount(summary.average_order_value));
    match summary.peak_hour {
        Some(hour) => println!("Peak hour:           {hour:02}:00"),
        None => println!("Peak hour:           n/a"),
    }

    println!("\n=== Best-Selling Products ===");
    for (rank, product) in report.top_products.iter().enumerate() {
        println!("  {}. {} ({} purchases)", rank + 1, product.item, product.count);
    }

    println!("\n=== Revenue Contribution by Item ===");
    for item in report.item_revenue.iter().take(top) {
        println!("  {:30} Rp {}", item.item, format_amount(item.revenue));
    }

    println!("\n=== Revenue by Order Type ===");
    for channel in &report.channel_revenue {
        println!("  {:30} Rp {}", channel.channel, format_amount(channel.revenue));
    }

    println!("\n=== Orders by Weekday ===");
    for day in &report.weekday_orders {
        println!("  {:10} {}", day.weekday, day.orders);
    }

    println!("\n=== Items per Order ===");
    for bucket in &report.items_per_order {
        println!("  {:2} items: {} orders", bucket.items, bucket.orders);
    }

    println!("\n=== Monthly Revenue ===");
    println!("  Month     | Revenue         | Moving avg");
    println!("  ----------|-----------------|----------------");
    for point in &report.monthly_trend {
        let average = point
            .moving_average
            .map(format_amount)
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {:9} | {:>15} | {:>15}",
            month_label(point.year, point.month),
            format_amount(point.revenue),
            average
        );
    }

    println!("\n=== Frequently Bought Together ===");
    if report.top_pairs.is_empty() {
        println!("  No order contains two or more items");
    }
    for pair in &report.top_pairs {
        println!("  {:45} {}", pair.label(), pair.frequency);
    }

    println!("\n=== Frequent Itemsets ===");
    for itemset in report.frequent_itemsets.iter().take(top) {
        println!("  {:45} support {:.3}", itemset.items.join(", "), itemset.support);
    }

    println!("\n=== Actionable Association Rules ===");
    if report.bundle_rules.is_empty() {
        println!("  No rule meets the bundling thresholds");
    }
    for rule in report.bundle_rules.iter().take(top) {
        println!(
            "  {} => {}  (support {:.3}, confidence {:.3}, lift {:.2})",
            rule.antecedent.join(", "),
            rule.consequent.join(", "),
            rule.support,
            rule.confidence,
            rule.lift
        );
    }

    if !report.recommendations.is_empty() {
        println!("\n=== Bundle Recommendations ===");
        for rec in report.recommendations.iter().take(top) {
            println!(
                "  {} + {}: {} ({})",
                rec.antecedent.join(", "),
                rec.consequent.join(", "),
                rec.tier.label(),
                rec.action
            );
        }
    }
}

/// Write both charts
pub fn generate_visualization_report(
    report: &AnalyticsReport,
    trend_path: &str,
    hourly_path: &str,
) -> crate::Result<()> {
    create_monthly_trend_chart(&report.monthly_trend, trend_path)?;
    create_hourly_chart(&report.hourly_activity, hourly_path)?;
    Ok(())
}
