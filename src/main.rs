use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use colored::Colorize;

use aegis_container::cli;
use aegis_container::{Engine, Settings};

#[derive(Parser)]
#[command(name = "aegis")]
#[command(author = "Oleg")]
#[command(version = "0.1.0")]
#[command(about = "Password-protected, chunked AES-256-GCM file containers", long_about = None)]
struct Cli {
    /// Settings file (JSON)
    #[arg(long, global = true, env = "AEGIS_CONFIG")]
    config: Option<PathBuf>,

    /// Log filter, e.g. "debug" or "aegis_container=trace"
    #[arg(long, global = true, env = "AEGIS_LOG")]
    log: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encrypt files into .aegis containers
    Encrypt {
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Keyfile used as a second factor
        #[arg(short, long)]
        keyfile: Option<PathBuf>,

        /// Directory for the outputs (default: next to each input)
        #[arg(short, long)]
        out_dir: Option<PathBuf>,
    },

    /// Decrypt .aegis containers
    Decrypt {
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Keyfile the containers were encrypted with
        #[arg(short, long)]
        keyfile: Option<PathBuf>,

        /// Directory for the outputs (default: next to each input)
        #[arg(short, long)]
        out_dir: Option<PathBuf>,
    },

    /// Show the structure of a container without decrypting it
    Inspect { file: PathBuf },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let settings = Settings::load(cli.config.as_deref()).context("failed to load settings")?;
    init_logging(cli.log.as_deref().unwrap_or(&settings.log_level));
    tracing::debug!(?settings, "settings loaded");

    let engine = Engine::new(settings.engine)?;

    let runtime = tokio::runtime::Runtime::new().context("failed to start runtime")?;
    runtime.block_on(async {
        match cli.command {
            Commands::Encrypt {
                files,
                keyfile,
                out_dir,
            } => {
                check_out_dir(out_dir.as_deref())?;
                let report = cli::encrypt::run(&engine, &files, keyfile.as_deref(), out_dir).await?;
                finish_batch(&report)
            }
            Commands::Decrypt {
                files,
                keyfile,
                out_dir,
            } => {
                check_out_dir(out_dir.as_deref())?;
                let report = cli::decrypt::run(&engine, &files, keyfile.as_deref(), out_dir).await?;
                finish_batch(&report)
            }
            Commands::Inspect { file } => cli::inspect::run(&engine, &file)
                .with_context(|| format!("cannot inspect {}", file.display())),
        }
    })
}

fn check_out_dir(dir: Option<&Path>) -> anyhow::Result<()> {
    if let Some(dir) = dir {
        if !dir.is_dir() {
            bail!("output directory {} does not exist", dir.display());
        }
    }
    Ok(())
}

fn finish_batch(report: &aegis_container::BatchReport) -> anyhow::Result<()> {
    cli::print_report(report);
    if report.cancelled {
        bail!("cancelled");
    }
    if report.failed() > 0 {
        bail!("{} of {} files failed", report.failed(), report.outcomes.len());
    }
    Ok(())
}
