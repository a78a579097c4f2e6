mod cli;
mod output;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, OutputFormat};
use fire_bench::Benchmark;
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_filter()));
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let request = cli.run_request()?;
    cli.announce(&request);

    let progress = if cli.quiet {
        ProgressBar::hidden()
    } else {
        let bar = ProgressBar::new(cli.concurrency_levels.len() as u64);
        bar.set_style(ProgressStyle::with_template(
            "{spinner} [{elapsed_precise}] {bar:30} {pos}/{len} levels {msg}",
        )?);
        bar.enable_steady_tick(std::time::Duration::from_millis(200));
        bar
    };

    let bar = progress.clone();
    let report = Benchmark::new(request)
        .levels(cli.concurrency_levels.clone())
        .on_level(move |_, row| {
            bar.set_message(format!("(last: concurrency={})", row.concurrency));
            bar.inc(1);
        })
        .await?;
    progress.finish_and_clear();

    match cli.output {
        OutputFormat::Table => println!("{}", output::render_table(&report)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    Ok(())
}
