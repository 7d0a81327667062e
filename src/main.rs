//! thinker CLI - ask a question, get the judged best answer plus heuristics.

use anyhow::{Context, Result};
use clap::Parser;
use std::str::FromStr;
use std::time::Instant;
use thinker::{Config, ThinkingPipeline};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "thinker")]
#[command(version)]
#[command(about = "Multi-candidate reasoning loop over an OpenAI-compatible endpoint")]
struct Cli {
    /// The question to reason about
    question: String,
}

fn setup_logging(level: &str) {
    let level = Level::from_str(level).unwrap_or(Level::INFO);
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("Failed to set subscriber");
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::from_env().context("Failed to load configuration")?;
    setup_logging(&config.log_level);

    let pipeline = ThinkingPipeline::new(&config).context("Failed to build pipeline")?;

    let start = Instant::now();
    let result = pipeline.run(&cli.question).await;
    let elapsed = start.elapsed();

    println!("\n=== FINAL ANSWER ===");
    println!("{}", result.best.raw);
    println!("\n=== RULES EXTRACTED ===");
    if result.rules.is_empty() {
        println!("(none)");
    } else {
        println!("{}", result.rules.join("\n"));
    }
    println!("\n(total time: {:.1} s)", elapsed.as_secs_f64());

    Ok(())
}
