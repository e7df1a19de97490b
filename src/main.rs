use std::io::Write;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use its::config::Config;
use its::service::{ImageService, ServiceResponse};

/// ITS - on-demand image transforms
///
/// Runs one request such as `/tests/seagull.jpg?resize=200x&format=webp`
/// and writes the encoded image to `--output` or stdout.
#[derive(Parser, Debug)]
#[command(name = "its")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file; built-in defaults when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write the image here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Validate the configuration and exit
    #[arg(long)]
    check_config: bool,

    /// Public scheme used in redirect locations
    #[arg(long, default_value = "http")]
    scheme: String,

    /// Public host used in redirect locations
    #[arg(long, default_value = "localhost")]
    host: String,

    /// Authorization header value; when given, the request's namespace
    /// credentials are checked before it is handled
    #[arg(long)]
    authorization: Option<String>,

    /// Request path with optional query, e.g. /tests/seagull.jpg?fit=100x100
    #[arg(required_unless_present = "check_config")]
    request: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::from_file(path)
            .map_err(|e| anyhow!(e))
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => Config::default(),
    };

    its::logging::init_subscriber(&config.logging)
        .map_err(|e| anyhow!(e))
        .context("Failed to initialize logging subsystem")?;

    tracing::info!(
        config_file = ?args.config,
        namespaces = config.namespaces.len(),
        overlays = config.overlays.len(),
        "Configuration loaded successfully"
    );

    if args.check_config {
        config.validate().map_err(|e| anyhow!(e))?;
        println!("configuration OK");
        return Ok(());
    }

    let request = args.request.as_deref().unwrap_or_default();
    let (path, query) = request.split_once('?').unwrap_or((request, ""));

    let service = ImageService::new(config)?.with_origin(&args.scheme, &args.host);

    if let Some(authorization) = &args.authorization {
        service.authorize_path(path, Some(authorization))?;
    }

    match service.handle_path(path, query)? {
        ServiceResponse::Image {
            data,
            content_type,
            cache_control,
        } => {
            tracing::info!(content_type, cache_control, bytes = data.len(), "Writing image");
            match &args.output {
                Some(output) => std::fs::write(output, &data)
                    .with_context(|| format!("Failed to write {}", output.display()))?,
                None => std::io::stdout()
                    .lock()
                    .write_all(&data)
                    .context("Failed to write image to stdout")?,
            }
        }
        ServiceResponse::Redirect { location } => {
            println!("301 {}", location);
        }
    }

    Ok(())
}
