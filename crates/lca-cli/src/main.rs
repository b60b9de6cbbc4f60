mod commands;
mod config;
mod workspace;

use std::io;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use lca::Theme;
use lca::clock::SystemClock;

use commands::SettingsUpdate;
use workspace::Workspace;

#[derive(Parser)]
#[command(name = "lca")]
#[command(about = "LCA Playground: run, save and restore markup/style/script projects")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Directory holding index.html, styles.css and script.js
    #[arg(long, global = true, env = "LCA_PROJECT_DIR")]
    project_dir: Option<PathBuf>,

    /// Directory for preferences and saved projects
    #[arg(long, global = true, env = "LCA_STORE_DIR")]
    store_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compose the sandbox document and write it to preview.html
    Run,
    /// Save the current sources as a new project
    Save,
    /// List saved projects
    List,
    /// Restore a saved project into the project directory and run it
    Load {
        /// Project number as shown by `list`
        number: usize,
    },
    /// Blank the sources and the preview
    New,
    /// Write the sources as a downloadable archive
    Export {
        /// Archive path (defaults to the project directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show or change preferences
    Settings {
        /// dark or light
        #[arg(long)]
        theme: Option<Theme>,

        /// Editor font size in pixels
        #[arg(long)]
        font_size: Option<u32>,

        /// Run on every edit (true or false)
        #[arg(long)]
        auto_run: Option<bool>,
    },
    /// Print log lines from relay envelopes read as JSON lines on stdin
    Relay {
        /// Only show lines from this run
        #[arg(long)]
        run: Option<u64>,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Warn)
        .parse_default_env()
        .init();

    let cli = Cli::parse();
    let cwd = std::env::current_dir()?;
    let paths = config::resolve(cli.project_dir, cli.store_dir, &cwd)?;
    if let Some(config_file) = &paths.config_file {
        log::info!("Configuration from {}", config_file.display());
    }
    let workspace = Workspace::new(paths);
    let clock = SystemClock;
    let mut out = io::stdout().lock();

    match cli.command {
        Commands::Run => commands::run(&workspace, &clock, &mut out)?,
        Commands::Save => commands::save(&workspace, &clock, &mut out)?,
        Commands::List => commands::list(&workspace, &clock, &mut out)?,
        Commands::Load { number } => commands::load(&workspace, &clock, number, &mut out)?,
        Commands::New => commands::new(&workspace, &clock, &mut out)?,
        Commands::Export { output } => commands::export(&workspace, &clock, output, &mut out)?,
        Commands::Settings {
            theme,
            font_size,
            auto_run,
        } => {
            let update = SettingsUpdate {
                theme,
                font_size,
                auto_run,
            };
            commands::settings(&workspace, &clock, update, &mut out)?;
        }
        Commands::Relay { run } => {
            commands::relay(io::stdin().lock(), run, &mut out, &mut io::stderr().lock())?;
        }
    }

    Ok(())
}
