mod cmd;
mod output;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use mbuild_lib::consts::APP_NAME;
use mbuild_lib::discover::MATCH_ALL;
use mbuild_lib::settings::{Overrides, Settings};

use crate::cmd::{cmd_build, cmd_clean, cmd_list, cmd_watch};
use crate::output::OutputFormat;

/// mbuild - configure and build every package in a tree
#[derive(Parser)]
#[command(name = APP_NAME)]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Increase log verbosity (-v for info, -vv for debug)
  #[arg(short, long, global = true, action = ArgAction::Count)]
  verbose: u8,

  /// Directory whose immediate children are the packages
  #[arg(short = 'C', long, global = true, default_value = ".")]
  root: PathBuf,

  /// Environment name passed to every hook (overrides MBUILD_ENV)
  #[arg(long, global = true)]
  env: Option<String>,

  /// Packages to build first, in order (replaces the configured list)
  #[arg(long, global = true, value_delimiter = ',')]
  promote: Option<Vec<String>>,

  /// Fail when any global or local hook fails
  #[arg(long, global = true)]
  strict: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Configure, write config modules and build every package once
  Build {
    #[arg(long, value_enum, default_value_t)]
    format: OutputFormat,
  },

  /// Build, then rebuild everything whenever a file changes
  Watch,

  /// List discovered packages in build order
  List {
    /// Package name, or "*" for all
    #[arg(default_value = MATCH_ALL)]
    filter: String,

    #[arg(long, value_enum, default_value_t)]
    format: OutputFormat,
  },

  /// Remove generated local config modules
  Clean {
    /// Only clean this package
    package: Option<String>,
  },
}

fn init_logging(verbose: u8) {
  let filter = match verbose {
    0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    1 => EnvFilter::new("info"),
    _ => EnvFilter::new("debug"),
  };

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();
}

fn main() -> Result<()> {
  let cli = Cli::parse();
  init_logging(cli.verbose);

  let overrides = Overrides {
    env: cli.env,
    promote: cli.promote,
    strict: cli.strict.then_some(true),
  };
  let settings = Settings::resolve(&cli.root, overrides)
    .with_context(|| format!("Failed to load settings for {}", cli.root.display()))?;

  match cli.command {
    Commands::Build { format } => cmd_build(&settings, format),
    Commands::Watch => cmd_watch(&settings),
    Commands::List { filter, format } => cmd_list(&settings, &filter, format),
    Commands::Clean { package } => cmd_clean(&settings, package.as_deref()),
  }
}
