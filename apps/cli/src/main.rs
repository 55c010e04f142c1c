use std::{
    io::Read,
    path::PathBuf,
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use recap_core::{
    Backend, Conciseness, ContextBatch, Summarizer, format_context_timeline, format_timestamp,
};

/// CLI wrapper for Conciseness enum (needed for clap ValueEnum)
#[derive(Clone, Copy, Default, ValueEnum)]
enum CliConciseness {
    #[default]
    Concise,
    Medium,
    Detailed,
}

impl From<CliConciseness> for Conciseness {
    fn from(cli: CliConciseness) -> Self {
        match cli {
            CliConciseness::Concise => Conciseness::Concise,
            CliConciseness::Medium => Conciseness::Medium,
            CliConciseness::Detailed => Conciseness::Detailed,
        }
    }
}

/// CLI wrapper for Backend enum
#[derive(Clone, Copy, Default, ValueEnum)]
enum CliBackend {
    #[default]
    #[value(alias = "default")]
    Openai,
    #[value(alias = "alternate")]
    Mixtral,
}

impl From<CliBackend> for Backend {
    fn from(cli: CliBackend) -> Self {
        match cli {
            CliBackend::Openai => Backend::OpenAi,
            CliBackend::Mixtral => Backend::Mixtral,
        }
    }
}

#[derive(Parser)]
#[command(name = "recap")]
#[command(about = "Summarize timestamped visual and audio context of a video with a hosted LLM")]
struct Cli {
    /// JSON file with `{"context_list": [...]}` or a bare array of entries. Reads stdin if omitted or "-".
    input: Option<PathBuf>,

    /// Summary length and level of detail
    #[arg(short, long, default_value = "concise")]
    conciseness: CliConciseness,

    /// LLM backend used for the summary
    #[arg(short, long, default_value = "openai")]
    backend: CliBackend,

    /// Extra instructions passed to the model verbatim
    #[arg(short, long)]
    instructions: Option<String>,

    /// Override the backend's model
    #[arg(long)]
    model: Option<String>,

    /// Override the backend's base URL (OpenAI-compatible endpoint)
    #[arg(long)]
    base_url: Option<String>,

    /// Print the context timeline before summarizing
    #[arg(long)]
    show_context: bool,

    /// Print the raw summary JSON instead of formatted output
    #[arg(long)]
    json: bool,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info,recap_core=debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn format_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        format!("{:.0}m {:.0}s", (secs / 60.0).floor(), secs % 60.0)
    }
}

fn create_spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

fn read_batch(input: Option<&PathBuf>) -> Result<ContextBatch> {
    let raw = match input {
        Some(path) if path.as_os_str() != "-" => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        _ => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read context from stdin")?;
            buf
        }
    };

    serde_json::from_str(&raw).context("context is not a valid list of entries")
}

async fn run(cli: Cli) -> Result<()> {
    let backend: Backend = cli.backend.into();
    let conciseness: Conciseness = cli.conciseness.into();

    let batch = read_batch(cli.input.as_ref())?;
    batch.validate()?;

    // Validate API key early
    backend.validate_api_key()?;

    let model = cli
        .model
        .clone()
        .unwrap_or_else(|| backend.config().model.to_string());

    let mut summarizer = Summarizer::new().with_model(model.as_str());
    if let Some(base_url) = cli.base_url {
        summarizer = summarizer.with_base_url(base_url);
    }

    if cli.json {
        let summary = summarizer
            .summarize(&batch, conciseness, backend, cli.instructions.as_deref())
            .await?;
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!(
        "\n{}  {}\n",
        style("recap").cyan().bold(),
        style("Video Summarizer").dim()
    );
    println!(
        "{} Context: {} entries, {}",
        style("✓").green().bold(),
        batch.len(),
        style(format_timestamp(batch.duration())).yellow()
    );

    if cli.show_context {
        println!("\n{}\n", style(format_context_timeline(&batch)).dim());
    }

    let started = Instant::now();
    let spinner = create_spinner(&format!(
        "Generating {} summary with {}...",
        conciseness, model
    ));
    let summary = match summarizer
        .summarize(&batch, conciseness, backend, cli.instructions.as_deref())
        .await
    {
        Ok(summary) => summary,
        Err(e) => {
            spinner.finish_and_clear();
            return Err(e.into());
        }
    };
    spinner.finish_with_message(format!(
        "{} Summary generated ({}) {}",
        style("✓").green().bold(),
        backend,
        style(format_duration(started.elapsed())).dim()
    ));

    println!("{}", style("─".repeat(60)).dim());
    println!("{}", summary.summary);

    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("{} {:#}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_concise_openai() {
        let cli = Cli::try_parse_from(["recap", "context.json"]).unwrap();
        assert_eq!(Conciseness::from(cli.conciseness), Conciseness::Concise);
        assert_eq!(Backend::from(cli.backend), Backend::OpenAi);
        assert!(cli.instructions.is_none());
    }

    #[test]
    fn backend_aliases() {
        let cli = Cli::try_parse_from(["recap", "-b", "alternate", "-c", "detailed"]).unwrap();
        assert_eq!(Backend::from(cli.backend), Backend::Mixtral);
        assert_eq!(Conciseness::from(cli.conciseness), Conciseness::Detailed);
    }

    #[test]
    fn rejects_unknown_conciseness() {
        assert!(Cli::try_parse_from(["recap", "-c", "verbose"]).is_err());
    }

    #[test]
    fn durations() {
        assert_eq!(format_duration(Duration::from_millis(2500)), "2.5s");
        assert_eq!(format_duration(Duration::from_secs(125)), "2m 5s");
    }
}
