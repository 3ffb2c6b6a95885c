use super::ui;
use crate::core::config::AppConfig;
use crate::core::rates::{DayResult, ResultSet};
use crate::core::RateFetcher;
use crate::providers::privatbank::PrivatBankProvider;
use anyhow::Result;
use chrono::{Local, NaiveDate};
use tracing::debug;

/// Fetches the requested days ending yesterday and prints the non-empty ones.
pub async fn run(config: &AppConfig, days: u32) -> Result<()> {
    let today = Local::now().date_naive();
    let output = fetch_and_render(config, days, today).await?;
    println!("{output}");
    Ok(())
}

pub async fn fetch_and_render(config: &AppConfig, days: u32, today: NaiveDate) -> Result<String> {
    let results = fetch(config, days, today).await?;
    report_failures(&results);
    Ok(render_results(&results.non_empty()))
}

/// Runs one fetch with a fresh HTTP session, released before returning.
pub async fn fetch(config: &AppConfig, days: u32, today: NaiveDate) -> Result<ResultSet> {
    let provider = PrivatBankProvider::new(&config.provider)?;
    let fetcher = RateFetcher::new(provider, days);

    let pb = ui::new_progress_bar(u64::from(fetcher.days()));
    pb.set_message("Fetching rates");
    let results = fetcher.fetch_all_with(today, |_| pb.inc(1)).await;
    pb.finish_and_clear();
    fetcher.close();

    debug!(
        requested = results.len(),
        failed = results.failures().count(),
        "Fetch complete"
    );
    Ok(results)
}

fn report_failures(results: &ResultSet) {
    for line in render_failures(results) {
        eprintln!("{}", ui::style_text(&line, ui::StyleType::Error));
    }
}

/// One diagnostic line per failed day, in request order.
pub fn render_failures(results: &ResultSet) -> Vec<String> {
    results
        .failures()
        .map(|(date, error)| format!("Failed to fetch data for {date}: {error}"))
        .collect()
}

/// Renders day results as a single line, e.g.
/// `[{"05.01.2024": {"EUR": {"sale":42.0,"purchase":41.5}}}]`.
pub fn render_results(results: &[&DayResult]) -> String {
    let days: Vec<String> = results.iter().map(|result| render_day(result)).collect();
    format!("[{}]", days.join(", "))
}

fn render_day(result: &DayResult) -> String {
    let rates: Vec<String> = result
        .rates
        .values()
        .map(|entry| {
            format!(
                "\"{}\": {{\"sale\":{:?},\"purchase\":{:?}}}",
                entry.currency, entry.sale, entry.purchase
            )
        })
        .collect();
    let date = serde_json::Value::String(result.date.clone());
    format!("{{{}: {{{}}}}}", date, rates.join(", "))
}
