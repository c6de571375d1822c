use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(
    name = "hpademo",
    about = "Horizontal Pod Autoscaler simulator",
    version,
    propagate_version = true,
)]
struct Cli {
    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scenario on a virtual clock and print every tick.
    Run {
        /// Scenario file (default: built-in scenario)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Number of ticks to simulate
        #[arg(short, long, default_value = "300")]
        ticks: u64,
        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: String,
    },
    /// Run a scenario in real time, one tick per configured interval,
    /// until interrupted.
    Watch {
        /// Scenario file (default: built-in scenario)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Write a scenario file with default settings.
    Scaffold {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Per-pod CPU request in millicores
        #[arg(long, default_value = "500")]
        pod_cpu_request: u64,
        #[arg(long, default_value = "1")]
        min_replicas: u32,
        #[arg(long, default_value = "10")]
        max_replicas: u32,
    },
    /// Validate a scenario file and list warnings.
    Check {
        #[arg(short, long)]
        config: PathBuf,
    },
}

/// Used when `RUST_LOG` is unset or unparsable.
const DEFAULT_LOG_FILTER: &str = "info,hpademo=debug";

fn log_filter() -> anyhow::Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => Ok(DEFAULT_LOG_FILTER.parse()?),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(log_filter()?)
        .with_writer(std::io::stderr);
    if cli.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    match cli.command {
        Commands::Run {
            config,
            ticks,
            format,
        } => commands::run::run(config.as_deref(), ticks, &format),
        Commands::Watch { config } => commands::run::watch(config.as_deref()).await,
        Commands::Scaffold {
            output,
            pod_cpu_request,
            min_replicas,
            max_replicas,
        } => commands::scenario::scaffold(
            output.as_deref(),
            pod_cpu_request,
            min_replicas,
            max_replicas,
        ),
        Commands::Check { config } => commands::scenario::check(&config),
    }
}
