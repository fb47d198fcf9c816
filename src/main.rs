use clap::{Parser, Subcommand};
use edgesize::mime::guess_mime;
use edgesize::{
    CdnConfig, MimeClassifier, RoutingMode, StandardMimeTypes, TransformParams, config, rewrite,
};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn version_string() -> &'static str {
    if env!("ON_RELEASE_TAG") == "true" {
        return env!("CARGO_PKG_VERSION");
    }
    match env!("GIT_HASH") {
        "" => "dev@unknown",
        // Leaked once at startup — trivial, called exactly once
        hash => Box::leak(format!("dev@{hash}").into_boxed_str()),
    }
}

#[derive(Parser)]
#[command(name = "edgesize")]
#[command(about = "Preview statically.io CDN rewrites for media-library image URLs")]
#[command(long_about = "\
Preview statically.io CDN rewrites for media-library image URLs

Given a config.toml describing your deployment, prints the URL the library
would produce — useful for verifying a storage_url or an Nginx origin-proxy
setup before wiring edgesize into the host application.

Routing modes (from config.toml):

  direct CDN     storage_url set, origin_proxy = false
                 https://cdn.statically.io/img/<storage host><bucket>/f=auto,w=…/<path>
  origin proxy   origin_proxy = true
                 <uploads_url>f=auto,w=…/<relative path>
  disabled       neither — URLs pass through unchanged

Vector formats (SVG) are rewritten without transform parameters; the CDN
cannot resize them. Non-image URLs pass through unchanged.

Run 'edgesize gen-config' to generate a documented config.toml.")]
#[command(version = version_string())]
struct Cli {
    /// CDN config file
    #[arg(long, default_value = "config.toml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Rewrite an origin image URL for the configured routing mode
    Rewrite {
        /// Origin image URL
        url: String,
        /// Target width in pixels
        #[arg(long)]
        width: Option<u32>,
        /// Target height in pixels
        #[arg(long)]
        height: Option<u32>,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Rewrite { url, width, height } => {
            let config = CdnConfig::load(&cli.config)?;
            println!("{}", preview(&config, &url, width, height));
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// The URL the rewrite pipeline would produce for this origin URL, with the
/// mime type guessed from the extension (the CLI has no media library).
fn preview(config: &CdnConfig, url: &str, width: Option<u32>, height: Option<u32>) -> String {
    let mimes = StandardMimeTypes::default();
    let Some(mime) = guess_mime(url).filter(|m| mimes.is_image(m)) else {
        return url.to_string();
    };

    let params = if mimes.bypass_resizing(mime) {
        TransformParams::empty()
    } else {
        TransformParams::auto(width.unwrap_or(0), height.unwrap_or(0))
    };

    match config.routing() {
        RoutingMode::Disabled => url.to_string(),
        RoutingMode::OriginProxy => {
            rewrite::insert_params_under_uploads(url, &config.uploads_url, &params)
        }
        RoutingMode::DirectCdn => {
            let storage = config.storage_url.as_deref().unwrap_or_default();
            let host = config.storage_host().unwrap_or_default();
            let cdn_url = rewrite::build_cdn_url(storage, url, &config.cdn_base);
            rewrite::insert_params_after_host(&cdn_url, &host, &params)
        }
    }
}
