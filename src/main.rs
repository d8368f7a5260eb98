use anyhow::{bail, Context, Result};
use clap::Parser;
use std::{path::PathBuf, sync::Arc};
use tracing::{error, info};

use astroloji::{constants, web_server, zodiac, GeminiClient, HoroscopeController, Settings};

// Define the command-line interface structure using clap
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Gemini API key. A missing key only fails reading requests.
    #[arg(long, global = true, env = constants::API_KEY_VAR, hide_env_values = true)]
    api_key: Option<String>,

    /// Model used for readings.
    #[arg(long, global = true, env = constants::MODEL_VAR, default_value = constants::DEFAULT_GEMINI_MODEL)]
    model: String,

    /// Base URL of the Gemini API.
    #[arg(
        long,
        global = true,
        env = constants::API_URL_VAR,
        default_value = constants::DEFAULT_GEMINI_API_URL
    )]
    api_url: String,

    #[command(subcommand)]
    command: Commands,
}

// Define the available subcommands
#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Start the web UI.
    Serve {
        #[arg(long, default_value_t = 9900, help = "Port for the web server.")]
        port: u16,
        #[arg(long, help = "Directory holding index.html.")]
        templates: Option<PathBuf>,
        #[arg(long, help = "Directory served under /static.")]
        static_dir: Option<PathBuf>,
    },
    /// Print today's reading for one sign.
    Read {
        #[arg(help = "Sign name or ASCII slug, e.g. Koç or koc.")]
        sign: String,
    },
    /// List the twelve signs.
    Signs,
}

// The main entry point of the application, using tokio's async runtime
#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (for GEMINI_API_KEY)
    dotenvy::dotenv().ok();

    // Reads log level from RUST_LOG environment variable (e.g., RUST_LOG=info,astroloji=debug)
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    info!("Astroloji starting with command: {:?}", cli.command);

    let settings = Settings::new(cli.api_key, cli.model, cli.api_url);
    if settings.credential().is_none() {
        info!("{} is not set; readings will fail until it is provided", constants::API_KEY_VAR);
    }
    let generator = Arc::new(GeminiClient::new(settings.api_url.clone()));
    let controller = Arc::new(HoroscopeController::new(settings, generator));

    match cli.command {
        Commands::Serve {
            port,
            templates,
            static_dir,
        } => {
            let templates = templates.unwrap_or_else(|| PathBuf::from(&*constants::TEMPLATES_DIR));
            let static_dir = static_dir.unwrap_or_else(|| PathBuf::from(&*constants::STATIC_DIR));
            info!("Starting web UI on port {}...", port);

            let mut web_server_handle = tokio::spawn(async move {
                if let Err(e) =
                    web_server::start_web_server(port, templates, static_dir, controller).await
                {
                    error!("Web server failed: {:?}", e);
                }
            });

            let ctrl_c = tokio::signal::ctrl_c();
            tokio::pin!(ctrl_c);

            tokio::select! {
                _ = &mut ctrl_c => {
                    info!("Ctrl-C received, initiating shutdown...");
                }
                res = &mut web_server_handle => {
                    match res {
                        Ok(_) => info!("Web server task completed unexpectedly."),
                        Err(e) if e.is_panic() => error!("Web server task panicked: {:?}", e),
                        Err(e) => error!("Web server task failed: {:?}", e),
                    }
                }
            }

            if !web_server_handle.is_finished() {
                info!("Aborting web server task...");
                web_server_handle.abort();
            }
            info!("Shutdown complete.");
        }
        Commands::Read { sign } => {
            let sign = zodiac::find(&sign).with_context(|| format!("Unknown sign '{}'", sign))?;
            let state = controller.request_reading(sign).await;
            if !state.error_message.is_empty() {
                bail!("{}", state.error_message);
            }
            println!("{} Günlük Yorumu\n\n{}", state.selected_sign, state.reading_text);
        }
        Commands::Signs => {
            for sign in zodiac::ZODIAC_SIGNS.iter() {
                println!("{:<8} {:<24} {}", sign.slug, sign.name, sign.date_range);
            }
        }
    }

    Ok(())
}
