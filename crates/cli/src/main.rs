use std::path::PathBuf;

use anyhow::Context;
use books_manager::books::models::BOOK_TYPE;
use books_manager::books::shortcode::TAG;
use books_manager::App;
use clap::{Parser, Subcommand};
use shelf_kernel::schema::SchemaHost;
use shelf_kernel::settings::Settings;

#[derive(Parser, Debug)]
#[command(name = "shelf-cli")]
#[command(about = "Book catalog listing service", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP server
    Serve,

    /// Expand directives in a page file and print the result
    Render {
        /// Page content to expand; prints the bare book listing when omitted
        page: Option<PathBuf>,
    },

    /// Print the registered book schema as JSON
    Schema,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load().context("failed to load settings")?;
    shelf_telemetry::init(&settings.telemetry)?;

    let app = App::new(settings);
    app.boot().await?;

    let outcome = run(&app, cli.command).await;
    app.shutdown().await?;
    outcome
}

async fn run(app: &App, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Serve => app.serve().await,
        Commands::Render { page } => {
            let content = match page {
                Some(path) => std::fs::read_to_string(&path)
                    .with_context(|| format!("failed to read page {}", path.display()))?,
                None => format!("[{TAG}]"),
            };
            print!("{}", app.shortcodes().expand(&content));
            Ok(())
        }
        Commands::Schema => {
            let schema = app
                .store()
                .describe(BOOK_TYPE)?
                .context("book type is not registered")?;
            println!("{}", serde_json::to_string_pretty(&schema)?);
            Ok(())
        }
    }
}
