use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use colored::Colorize;
use planforge::models::DocumentType;
use planforge::Result;
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "planforge")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Checkpointed planning document pipeline", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Project root (defaults to the current directory)
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// CLI-facing document selector
#[derive(Debug, Clone, Copy, ValueEnum)]
enum DocumentArg {
    Rfc,
    Plan,
    Rollout,
}

impl From<DocumentArg> for DocumentType {
    fn from(arg: DocumentArg) -> Self {
        match arg {
            DocumentArg::Rfc => DocumentType::Rfc,
            DocumentArg::Plan => DocumentType::Plan,
            DocumentArg::Rollout => DocumentType::Rollout,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new project in this directory
    Init {
        /// Project name (defaults to the directory name)
        #[arg(short, long)]
        name: Option<String>,

        /// Technology stack entries
        #[arg(long)]
        stack: Vec<String>,

        /// Project constraints
        #[arg(long)]
        constraints: Vec<String>,

        /// Enable strict-mode approval gating
        #[arg(long)]
        strict: bool,
    },

    /// Run the current step and advance the pipeline
    Next {
        /// Advance past checkpoint steps without collecting feedback
        #[arg(long)]
        skip_checkpoint: bool,
    },

    /// Show pipeline position and approval state
    Status {
        /// Output in JSON format
        #[arg(short, long)]
        json: bool,
    },

    /// Print a rendered document
    Show {
        /// Which document to render
        #[arg(value_enum)]
        document: DocumentArg,
    },

    /// Approve one document, or all of them
    Approve {
        /// Which document to approve
        #[arg(value_enum)]
        document: Option<DocumentArg>,

        /// Approve rfc, plan, and rollout together
        #[arg(long, conflicts_with = "document")]
        all: bool,

        /// Record the approval even when validation fails
        #[arg(short, long)]
        force: bool,

        /// Skip the cross-document consistency check (--all only)
        #[arg(long)]
        skip_consistency: bool,
    },

    /// Regenerate per-stage implementation prompts from the plan
    Regenerate,

    /// Generate shell completions
    Completions {
        /// Shell type (bash, zsh, fish, powershell)
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() {
    let cli = Cli::parse();

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("{}", format!("Error: failed to start runtime: {}", e).red());
            std::process::exit(1);
        }
    };

    if let Err(e) = runtime.block_on(run_async(cli)) {
        eprintln!("{}", format!("Error: {}", e).red());
        std::process::exit(1);
    }
}

async fn run_async(cli: Cli) -> Result<()> {
    let root = match cli.root {
        Some(root) => root,
        None => std::env::current_dir()?,
    };

    match cli.command {
        Commands::Init {
            name,
            stack,
            constraints,
            strict,
        } => {
            planforge::cli::init::run(&root, name.as_deref(), stack, constraints, strict)?;
        }

        Commands::Next { skip_checkpoint } => {
            planforge::cli::next::run(&root, skip_checkpoint).await?;
        }

        Commands::Status { json } => {
            planforge::cli::status::run(&root, json)?;
        }

        Commands::Show { document } => {
            planforge::cli::show::run(&root, document.into())?;
        }

        Commands::Approve {
            document,
            all,
            force,
            skip_consistency,
        } => {
            planforge::cli::approve::run(
                &root,
                document.map(Into::into),
                all,
                force,
                skip_consistency,
            )?;
        }

        Commands::Regenerate => {
            planforge::cli::regenerate::run(&root).await?;
        }

        Commands::Completions { shell } => {
            generate(shell, &mut Cli::command(), "planforge", &mut io::stdout());
        }
    }

    Ok(())
}
