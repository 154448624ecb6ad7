//! addonkit CLI - Build and packaging tool for Replugged addons
//!
//! Commands:
//! - `addonkit build` - Compile the addon into `dist/` and install it
//! - `addonkit bundle` - Production build packed into `bundle/<id>.asar`

use addonkit_core::BuildOptions;
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

mod build;
mod bundle;
mod logging;
mod project;
mod update;

#[derive(Parser, Debug)]
#[command(name = "addonkit")]
#[command(author, version, about = "Build tool for Replugged addons", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the addon directory (default: current directory)
    #[arg(short, long, global = true)]
    path: Option<PathBuf>,

    /// esbuild executable (default: node_modules/.bin/esbuild, then PATH)
    #[arg(long, global = true)]
    esbuild: Option<PathBuf>,

    /// JSON file overriding the build layout
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Commands {
    /// Build the addon
    Build {
        /// Don't copy the build into the Replugged plugins directory
        #[arg(long)]
        no_install: bool,

        /// Rebuild when source files change
        #[arg(long)]
        watch: bool,

        /// Minify and skip source maps
        #[arg(long)]
        production: bool,
    },

    /// Package a production build for distribution
    Bundle,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let project = project::Project::load(cli.path, cli.esbuild, cli.config)?;

    match cli.command {
        Commands::Build {
            no_install,
            watch,
            production,
        } => {
            let options = BuildOptions {
                production,
                watch,
                no_install,
            };
            build::run(&project, options).await?;
        }
        Commands::Bundle => {
            bundle::run(&project).await?;
        }
    }

    update::notify().await;

    Ok(())
}
