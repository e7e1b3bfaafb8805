//! aimark CLI — the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "aimark", version, about = "LLM bulk grader for free-text answers")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Grade one sheet column against a rubric
    Grade {
        /// Tab-delimited sheet ("-" reads stdin)
        #[arg(long)]
        sheet: PathBuf,

        /// Rubric file, one criterion per line
        #[arg(long)]
        rubric: PathBuf,

        /// Column to grade: heading title, or zero-based index
        #[arg(long)]
        column: String,

        /// Score ceiling (default: config, then the rubric's total weight)
        #[arg(long)]
        max_score: Option<u32>,

        /// Endpoint name from config
        #[arg(long)]
        endpoint: Option<String>,

        /// Max concurrent requests
        #[arg(long)]
        parallelism: Option<usize>,

        /// Where to write the graded sheet (default: stdout)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Where to save the JSON grading report
        #[arg(long)]
        report: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Render a sheet as a table
    Show {
        /// Tab-delimited sheet ("-" reads stdin)
        #[arg(long)]
        sheet: PathBuf,
    },

    /// Check a sheet (and optionally a rubric) for common problems
    Validate {
        /// Tab-delimited sheet ("-" reads stdin)
        #[arg(long)]
        sheet: PathBuf,

        /// Rubric file, one criterion per line
        #[arg(long)]
        rubric: Option<PathBuf>,
    },

    /// List configured endpoints
    Endpoints {
        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create starter config, rubric, and sheet
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("aimark=info".parse().unwrap()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Grade {
            sheet,
            rubric,
            column,
            max_score,
            endpoint,
            parallelism,
            output,
            report,
            config,
        } => {
            commands::grade::execute(
                sheet,
                rubric,
                column,
                max_score,
                endpoint,
                parallelism,
                output,
                report,
                config,
            )
            .await
        }
        Commands::Show { sheet } => commands::show::execute(sheet),
        Commands::Validate { sheet, rubric } => commands::validate::execute(sheet, rubric),
        Commands::Endpoints { config } => commands::endpoints::execute(config),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
