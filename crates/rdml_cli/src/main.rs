//! `rdml` command line tool.
//!
//! # Responsibility
//! - Expose validation, export and experimenter editing of RDML files.
//! - Keep all document rules in `rdml_core`; this binary only maps flags.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use rdml_core::{
    default_log_level, init_logging, validate_file, ContractRegistry, ExperimenterDraft,
    RdmlDocument, RecordKind,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "rdml", version, about = "Inspect, validate and edit RDML files")]
struct Cli {
    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, env = "RDML_LOG_LEVEL")]
    log_level: Option<String>,

    /// Absolute directory for rolling log files; logging is off when unset.
    #[arg(long, global = true, env = "RDML_LOG_DIR")]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check file structure and schema conformance, printing a report table.
    Validate { file: PathBuf },
    /// Print the document projection as JSON.
    Json {
        file: PathBuf,
        /// Emit compact single-line JSON.
        #[arg(long)]
        compact: bool,
    },
    /// List experimenters as tab-separated rows.
    Experimenters { file: PathBuf },
    /// Write an empty document of the latest version.
    New {
        file: PathBuf,
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
    /// Add one experimenter and save the file in place.
    AddExperimenter(AddExperimenterArgs),
    /// Remove one experimenter by id or position and save the file in place.
    DeleteExperimenter {
        file: PathBuf,
        #[arg(long, conflicts_with = "position", required_unless_present = "position")]
        id: Option<String>,
        #[arg(long)]
        position: Option<i64>,
    },
}

#[derive(Args, Debug)]
struct AddExperimenterArgs {
    file: PathBuf,
    #[arg(long)]
    id: String,
    #[arg(long)]
    first_name: String,
    #[arg(long)]
    last_name: String,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    lab_name: Option<String>,
    #[arg(long)]
    lab_address: Option<String>,
    /// Slot within the experimenter group; defaults to the first slot.
    #[arg(long, allow_hyphen_values = true)]
    position: Option<i64>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    if let Some(log_dir) = &cli.log_dir {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        let log_dir = log_dir
            .to_str()
            .context("log directory must be valid UTF-8")?;
        init_logging(level, log_dir)
            .map_err(anyhow::Error::msg)
            .context("failed to initialize logging")?;
    }

    match cli.command {
        Command::Validate { file } => {
            let registry = ContractRegistry::with_builtin_contracts();
            let table = validate_file(&file, &registry);
            print!("{table}");
            Ok(if table.contains("\tFalse\t") {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            })
        }
        Command::Json { file, compact } => {
            let document = load(&file)?;
            let json = document.to_json().context("failed to build JSON projection")?;
            let text = if compact {
                serde_json::to_string(&json)?
            } else {
                serde_json::to_string_pretty(&json)?
            };
            println!("{text}");
            Ok(ExitCode::SUCCESS)
        }
        Command::Experimenters { file } => {
            let document = load(&file)?;
            for experimenter in document.experimenters() {
                println!(
                    "{}\t{}\t{}\t{}",
                    experimenter.id(),
                    experimenter.first_name(),
                    experimenter.last_name(),
                    experimenter.email().unwrap_or("")
                );
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::New { file, force } => {
            if file.exists() && !force {
                bail!("`{}` already exists; pass --force to overwrite", file.display());
            }
            RdmlDocument::new()
                .save_file(&file)
                .with_context(|| format!("failed to write `{}`", file.display()))?;
            Ok(ExitCode::SUCCESS)
        }
        Command::AddExperimenter(args) => {
            let mut document = load(&args.file)?;
            let mut draft = ExperimenterDraft::new(args.id, args.first_name, args.last_name);
            draft.email = args.email;
            draft.lab_name = args.lab_name;
            draft.lab_address = args.lab_address;
            let slot = document
                .add_experimenter(&draft, args.position)
                .context("failed to add experimenter")?;
            save(&document, &args.file)?;
            println!("added experimenter `{}` at position {slot}", draft.id);
            Ok(ExitCode::SUCCESS)
        }
        Command::DeleteExperimenter { file, id, position } => {
            let mut document = load(&file)?;
            let removed = document
                .delete_record(RecordKind::Experimenter, id.as_deref(), position)
                .context("failed to delete experimenter")?;
            save(&document, &file)?;
            println!(
                "deleted experimenter `{}`",
                removed.attribute("id").unwrap_or("")
            );
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn load(file: &Path) -> Result<RdmlDocument> {
    RdmlDocument::load_file(file).with_context(|| format!("failed to load `{}`", file.display()))
}

fn save(document: &RdmlDocument, file: &Path) -> Result<()> {
    document
        .save_file(file)
        .with_context(|| format!("failed to write `{}`", file.display()))
}
