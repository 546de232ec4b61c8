use clap::{Parser, Subcommand};
use do_memory_cli::{commands, output};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "memory-cli")]
#[command(about = "Command-line interface for the learning-agent evaluation system")]
#[command(version, long_about = None)]
struct Cli {
    /// Settings file path (defaults to `eval.toml`/`.eval.toml`, or built-in defaults)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory results are written to, overriding the settings file
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Enable verbose (debug-level) logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the progressive L1-L12 learning-then-testing suite
    Progressive {
        /// Restrict the run to these level ids (e.g. L1 L2 L7); defaults to the standard L1-L6 sequence
        #[arg(long, value_delimiter = ',')]
        levels: Option<Vec<String>>,
    },
    /// Run the closed-loop self-improvement controller
    SelfImprove {
        /// Restrict each iteration's measurement to these level ids
        #[arg(long, value_delimiter = ',')]
        levels: Option<Vec<String>>,
    },
    /// Run the cross-agent matrix evaluator
    Matrix {
        /// Number of in-process memory-backed agents to evaluate
        #[arg(long, default_value_t = 1)]
        agents: usize,
        /// Number of dialogue turns to generate
        #[arg(long, default_value_t = 500)]
        turns: usize,
        /// Number of quiz questions to generate
        #[arg(long, default_value_t = 50)]
        questions: usize,
        /// Deterministic generation seed
        #[arg(long, default_value_t = 42)]
        seed: u64,
    },
    /// Run a single long-horizon learn-then-quiz pass and persist its
    /// ground truth and report
    LongHorizon {
        /// Number of dialogue turns to generate
        #[arg(long, default_value_t = 500)]
        turns: usize,
        /// Number of quiz questions to generate
        #[arg(long, default_value_t = 50)]
        questions: usize,
        /// Deterministic generation seed
        #[arg(long, default_value_t = 42)]
        seed: u64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { tracing::Level::DEBUG } else { tracing::Level::INFO };
    tracing_subscriber::fmt().with_max_level(level).init();

    let settings = memory_core::settings::Settings::load(cli.config.as_deref())?.with_env_overrides();
    let output_dir = cli
        .output_dir
        .unwrap_or_else(|| PathBuf::from(&settings.harness.output_dir));

    match cli.command {
        Commands::Progressive { levels } => {
            let result = commands::run_progressive(&settings, levels, output_dir.clone()).await?;
            output::emit(&result, Some(&output_dir), "progressive_result.json")?;
        }
        Commands::SelfImprove { levels } => {
            let result = commands::run_self_improve(&settings, levels, output_dir.clone()).await?;
            output::emit(&result, Some(&output_dir), "self_improve_result.json")?;
        }
        Commands::Matrix { agents, turns, questions, seed } => {
            let result = commands::run_matrix_cmd(agents, turns, questions, seed).await?;
            output::emit(&result, Some(&output_dir), "matrix_report.json")?;
        }
        Commands::LongHorizon { turns, questions, seed } => {
            let (ground_truth, report) = commands::run_long_horizon_cmd(turns, questions, seed).await?;
            output::emit(&ground_truth, Some(&output_dir), "ground_truth.json")?;
            output::emit(&report, Some(&output_dir), "report.json")?;
        }
    }

    Ok(())
}
