mod cli;

use blogforge::{config, server};
use blogforge_db::pool::init_pool;
use blogforge_media::{normalize, ImageAsset, NormalizeOptions};

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use std::path::{Path, PathBuf};

async fn start_server(
    host: Option<String>,
    port: Option<u16>,
    config_path: Option<&Path>,
) -> Result<()> {
    let mut config = config::load_config_or_default(config_path)?;

    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
    config::validate_config(&config)?;

    tracing::info!("Starting Blogforge server");
    tracing::info!(
        "Server will listen on {}:{}",
        config.server.host,
        config.server.port
    );

    let data_dir = &config.storage.data_dir;
    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("Failed to create data directory {:?}", data_dir))?;

    let db_path = config.storage.db_path();
    let db_path_str = db_path.to_string_lossy();
    tracing::info!("Initializing database at {}", db_path_str);
    let db_pool = init_pool(&db_path_str)?;

    let result = server::start_server(config, db_pool).await;

    tracing::info!("Shutting down...");
    result
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over the verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "blogforge=trace,blogforge_db=debug,blogforge_media=debug,tower_http=debug".to_string()
        } else {
            "blogforge=debug,blogforge_db=info,tower_http=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Start { host, port } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(start_server(host, port, cli.config.as_deref()))
        }
        Commands::Normalize {
            input,
            output,
            max_width,
            max_height,
            quality,
        } => {
            let config = config::load_config_or_default(cli.config.as_deref())?;
            let mut options = config.images.normalize_options();
            if let Some(w) = max_width {
                options.max_width = w;
            }
            if let Some(h) = max_height {
                options.max_height = h;
            }
            if let Some(q) = quality {
                options.quality = q;
            }
            normalize_file(&input, output, &options)
        }
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("blogforge {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::HashPassword { password, cost } => hash_password(&password, cost),
    }
}

/// Default output path: the input with a `.jpg` extension, never the input itself.
fn default_output_path(input: &Path) -> PathBuf {
    let candidate = input.with_extension("jpg");
    if candidate != input {
        return candidate;
    }
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    input.with_file_name(format!("{}-normalized.jpg", stem))
}

fn normalize_file(input: &Path, output: Option<PathBuf>, options: &NormalizeOptions) -> Result<()> {
    if options.max_width == 0 || options.max_height == 0 {
        anyhow::bail!("Image bounds must be positive");
    }
    if !(options.quality > 0.0 && options.quality <= 1.0) {
        anyhow::bail!("Quality must be in (0, 1], got {}", options.quality);
    }

    let data =
        std::fs::read(input).with_context(|| format!("Failed to read image {:?}", input))?;
    let filename = input
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let normalized = normalize(&ImageAsset::new(filename, data), options)
        .with_context(|| format!("Failed to normalize {:?}", input))?;

    let output = output.unwrap_or_else(|| default_output_path(input));
    std::fs::write(&output, &normalized.data)
        .with_context(|| format!("Failed to write {:?}", output))?;

    println!(
        "Wrote {} ({}x{}, quality {}, {} bytes)",
        output.display(),
        normalized.width,
        normalized.height,
        normalized.quality,
        normalized.data.len()
    );

    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            println!("  Server: {}:{}", config.server.host, config.server.port);
            println!("  Public URL: {}", config.public_base_url());
            println!("  Data dir: {}", config.storage.data_dir.display());
            println!(
                "  Images: max {}x{}, quality {}",
                config.images.max_width, config.images.max_height, config.images.quality
            );
            println!("  Page size: {}", config.feed.page_size);
            println!("  Session timeout: {}h", config.auth.session_timeout_hours);
        }
        None => {
            println!("No config file specified, using defaults");
            let config = config::Config::default();
            println!("Default config:");
            println!("  Server: {}:{}", config.server.host, config.server.port);
        }
    }

    Ok(())
}

fn hash_password(password: &str, cost: u32) -> Result<()> {
    let hash = server::auth::hash_password(password, cost)?;
    println!("{}", hash);
    Ok(())
}
