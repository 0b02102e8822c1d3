//! CLI entry point for folio-rs

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use folio_rs::commands::{self, new::NewDocument};
use folio_rs::Folio;

#[derive(Parser)]
#[command(name = "folio-rs")]
#[command(version)]
#[command(about = "A static site generator for Markdown notes and LeetCode solutions", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new site
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        folder: PathBuf,
    },

    /// Create a new solution or page
    New {
        /// Title of the new document
        title: String,

        /// Layout to use (solution, page)
        #[arg(short, long, default_value = "solution")]
        layout: String,

        /// Problem number of a solution
        #[arg(long)]
        id: Option<String>,

        /// Difficulty of a solution (Easy, Medium, Hard)
        #[arg(long)]
        difficulty: Option<String>,

        /// Comma separated tags
        #[arg(long, value_delimiter = ',')]
        tags: Vec<String>,
    },

    /// Generate static files
    #[command(alias = "g")]
    Generate {
        /// Watch for file changes
        #[arg(short, long)]
        watch: bool,
    },

    /// Start a local server
    #[command(alias = "s")]
    Server {
        /// Port to listen on
        #[arg(short, long, default_value = "4000")]
        port: u16,

        /// IP address to bind to
        #[arg(short, long, default_value = "localhost")]
        ip: String,

        /// Serve without watching for changes
        #[arg(long)]
        r#static: bool,
    },

    /// Remove the public folder
    Clean,

    /// List site content
    List {
        /// Type of content to list (solution, page, tag)
        #[arg(default_value = "solution")]
        r#type: String,
    },

    /// Show or change the color mode of generated pages
    Theme {
        /// show, toggle, light or dark
        #[arg(default_value = "show")]
        action: String,
    },

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.debug {
        "folio_rs=debug,info"
    } else {
        "folio_rs=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir().context("Cannot read the current directory")?,
    };

    match cli.command {
        Commands::Init { folder } => {
            let target_dir = if folder.is_absolute() {
                folder
            } else {
                base_dir.join(folder)
            };
            tracing::info!("Initializing site in {:?}", target_dir);
            commands::init::init_site(&target_dir)?;
            println!("Initialized site in {:?}", target_dir);
        }

        Commands::New {
            title,
            layout,
            id,
            difficulty,
            tags,
        } => {
            let folio = Folio::new(&base_dir)?;
            let doc = NewDocument {
                title,
                layout,
                id,
                difficulty,
                tags: tags
                    .into_iter()
                    .map(|t| t.trim().to_string())
                    .filter(|t| !t.is_empty())
                    .collect(),
            };
            let path = commands::new::create(&folio, &doc)?;
            println!("Created: {:?}", path);
        }

        Commands::Generate { watch } => {
            let folio = Folio::new(&base_dir)?;
            folio.generate()?;
            println!("Site written to {:?}", folio.public_dir);

            if watch {
                commands::generate::watch(&folio).await?;
            }
        }

        Commands::Server { port, ip, r#static } => {
            let folio = Folio::new(&base_dir)?;
            folio.generate()?;
            folio_rs::server::start(&folio, &ip, port, !r#static).await?;
        }

        Commands::Clean => {
            let folio = Folio::new(&base_dir)?;
            folio.clean()?;
            println!("Removed {:?}", folio.public_dir);
        }

        Commands::List { r#type } => {
            let folio = Folio::new(&base_dir)?;
            commands::list::run(&folio, &r#type)?;
        }

        Commands::Theme { action } => {
            let folio = Folio::new(&base_dir)?;
            let mode = commands::theme::run(&folio, &action)?;
            println!("Theme mode: {}", mode);
        }

        Commands::Version => {
            println!("folio-rs version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
