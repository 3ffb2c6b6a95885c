use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap::error::ErrorKind;
use pbrates::core::log::init_logging;
use pbrates::core::parse_days;

#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long)]
    config_path: Option<String>,

    /// Number of past days to fetch, at most 10
    #[arg(value_parser = parse_days)]
    days: u32,
}

/// Renders an argument error, appending the usage line when clap left it out.
fn usage_error(e: &clap::Error) -> String {
    let mut message = e.render().to_string();
    if !message.contains("Usage:") {
        message.push_str(&format!("\n{}\n", Cli::command().render_usage()));
    }
    message
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => {
            eprint!("{}", usage_error(&e));
            std::process::exit(1);
        }
    };

    init_logging(cli.verbose);

    let result = pbrates::run(cli.days, cli.config_path.as_deref()).await;

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
