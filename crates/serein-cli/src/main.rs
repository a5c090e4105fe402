//! Serein CLI - create and maintain Minecraft: Bedrock Edition script projects

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use serein_pkg::CatalogConfig;
use std::env;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

mod add;
mod context;
mod init;
mod install;
mod prompt;
mod remove;
mod switch;

use context::{CommandContext, GulpTask, PackageManager};

#[derive(Parser)]
#[command(name = "serein")]
#[command(version)]
#[command(about = "A Minecraft: Bedrock Edition creation manage tool", long_about = None)]
struct Cli {
    /// Registry serving the version catalog and build script [env: SEREIN_REGISTRY]
    #[arg(long, global = true)]
    registry: Option<String>,

    /// Package manager to run (detected from lockfiles by default)
    #[arg(long, global = true, value_enum)]
    package_manager: Option<PackageManager>,

    /// Do not run the package manager after changing package.json
    #[arg(long, global = true)]
    no_install: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a project in the current directory
    #[command(visible_alias = "i")]
    Init {
        /// Use the default configuration without asking any questions
        #[arg(short, long)]
        yes: bool,
    },

    /// Switch the versions of the project's @minecraft dependencies
    #[command(visible_alias = "s")]
    Switch {
        /// Switch every dependency to its latest version directly
        #[arg(short, long)]
        yes: bool,
    },

    /// Add a dependency, or change the version of one already present
    Add {
        /// Package name, e.g. "@minecraft/server-ui"
        package: String,

        /// Manifest version (requires --npm for script modules)
        #[arg(long, requires = "npm")]
        api: Option<String>,

        /// npm version
        #[arg(long)]
        npm: Option<String>,
    },

    /// Remove a dependency
    Remove {
        /// Package name to remove
        package: String,
    },

    /// Build scripts for production
    #[command(visible_alias = "b")]
    Build,

    /// Deploy the project to the game
    #[command(visible_alias = "d")]
    Deploy,

    /// Build the .mcpack of the project
    #[command(visible_alias = "p")]
    Pack,

    /// Redeploy automatically when files change
    #[command(visible_alias = "w")]
    Watch,
}

fn init_logging(verbose: u8) {
    let level_filter = match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };

    let env_filter = EnvFilter::builder()
        .with_default_directive(level_filter.into())
        .with_env_var("SEREIN_LOG")
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let current_dir = env::current_dir().context("Failed to get current directory")?;
    let catalog = cli
        .registry
        .map_or_else(CatalogConfig::default, CatalogConfig::with_registry);

    let project = || {
        CommandContext::for_project(
            &current_dir,
            cli.package_manager,
            cli.no_install,
            catalog.clone(),
        )
    };

    match cli.command {
        Commands::Init { yes } => {
            let ctx = CommandContext::new(
                current_dir.clone(),
                cli.package_manager,
                cli.no_install,
                catalog.clone(),
            );
            init::init_project(&ctx, yes)?;
        }
        Commands::Switch { yes } => switch::switch_versions(&project()?, yes)?,
        Commands::Add { package, api, npm } => {
            add::add_dependency(&project()?, &package, api, npm)?;
        }
        Commands::Remove { package } => remove::remove_dependency(&project()?, &package)?,
        Commands::Build => install::run_task(&project()?, GulpTask::Build)?,
        Commands::Deploy => install::run_task(&project()?, GulpTask::Deploy)?,
        Commands::Pack => install::run_task(&project()?, GulpTask::Pack)?,
        Commands::Watch => install::run_task(&project()?, GulpTask::Watch)?,
    }

    Ok(())
}
