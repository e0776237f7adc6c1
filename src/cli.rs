use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "blogforge")]
#[command(author, version, about = "Blog server with accounts, posts, comments and image uploads")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server
    Start {
        /// Host to bind to (overrides the config file)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides the config file)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Normalize an image file the same way uploads are normalized
    Normalize {
        /// Image to read
        #[arg(required = true)]
        input: PathBuf,

        /// Where to write the JPEG (defaults to the input name with a .jpg extension)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Width bound for landscape images
        #[arg(long)]
        max_width: Option<u32>,

        /// Height bound for portrait and square images
        #[arg(long)]
        max_height: Option<u32>,

        /// JPEG quality in (0, 1]
        #[arg(short, long)]
        quality: Option<f32>,
    },

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,

    /// Generate a bcrypt password hash
    HashPassword {
        /// Password to hash
        password: String,

        /// bcrypt work factor
        #[arg(long, default_value_t = bcrypt::DEFAULT_COST)]
        cost: u32,
    },
}
