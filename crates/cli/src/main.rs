//! # artmeta-cli: A CLI for `artmeta`
//!
//! This is the main entry point for the `artmeta` command-line interface. It sends an
//! artwork image to a running `artmeta-server`, lets the user refine the generated
//! listing metadata, and prints or copies the result.

mod api_client;
mod app;
mod clipboard;
mod image;

use anyhow::Result;
use api_client::ApiClient;
use app::Edits;
use artmeta::form::Clipboard;
use clap::{Parser, Subcommand};
use clipboard::{SystemClipboard, UnavailableClipboard};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{fmt, EnvFilter};

// --- CLI Definition ---

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate listing metadata for an artwork image
    Generate(GenerateArgs),
}

#[derive(Parser, Debug)]
struct GenerateArgs {
    /// Path to the artwork image (PNG, JPEG, GIF, WebP or BMP)
    #[arg(long, required = true)]
    image: PathBuf,
    /// Base URL of the artmeta server
    #[arg(long, env = "ARTMETA_SERVER_URL", default_value = "http://localhost:9090")]
    server: String,
    /// Replace the generated title
    #[arg(long)]
    title: Option<String>,
    /// Replace the generated tags (comma separated)
    #[arg(long)]
    tags: Option<String>,
    /// Replace the generated description
    #[arg(long)]
    description: Option<String>,
    /// Replace the generated categories (repeat for a second one)
    #[arg(long = "category")]
    categories: Vec<String>,
    /// Copy the metadata to the system clipboard
    #[arg(long)]
    copy: bool,
}

// --- Main Application Entry ---

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    // Logs go to stderr so stdout carries only the export block.
    let subscriber = fmt::Subscriber::builder()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to initialize logging: {e}");
    }

    let cli = Cli::parse();

    let result = match &cli.command {
        Commands::Generate(args) => handle_generate(args).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Generate failed: {e:#}");
            ExitCode::FAILURE
        }
    }
}

// --- Command Handlers ---

async fn handle_generate(args: &GenerateArgs) -> Result<()> {
    let image = image::encode_image_file(&args.image)?;
    let api = ApiClient::new(args.server.as_str());

    let mut form = app::generate(&api, &image).await?;

    let edits = Edits {
        title: args.title.clone(),
        tags: args.tags.clone(),
        description: args.description.clone(),
        categories: args.categories.clone(),
    };
    for warning in app::apply_edits(&mut form, &edits)? {
        eprintln!("⚠️  {warning}");
    }

    let field_errors = app::render_field_errors(&form);
    if !field_errors.is_empty() {
        eprint!("{field_errors}");
    }

    println!("{}", form.export_text());

    if args.copy {
        let mut clipboard: Box<dyn Clipboard> = match SystemClipboard::new() {
            Ok(clipboard) => Box::new(clipboard),
            Err(e) => Box::new(UnavailableClipboard(e.0)),
        };
        let copied = app::copy_to_clipboard(&mut form, clipboard.as_mut());
        print_notifications(&mut form);
        copied?;
    } else {
        print_notifications(&mut form);
    }

    Ok(())
}

fn print_notifications(form: &mut artmeta::form::MetadataForm) {
    for notification in form.take_notifications() {
        eprintln!("{}", app::render_notification(&notification));
    }
}
