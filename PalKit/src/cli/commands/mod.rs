use clap::Subcommand;
use std::path::PathBuf;

pub mod config;
pub mod extract;
pub mod frames;
pub mod unpack;

#[derive(Subcommand)]
pub enum Commands {
    /// Extract character sprites (the default when no command is given)
    Extract {
        /// TOML config file (built-in setup if omitted)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Use the in-process RLE rasterizer instead of the external script
        #[arg(long)]
        builtin_raster: bool,
    },

    /// Print the frame table of one sprite archive
    Frames {
        /// Sprite archive (compressed or already decompressed)
        #[arg(short, long)]
        source: PathBuf,

        /// Parse the bytes as-is even if they carry a compression marker
        #[arg(long)]
        no_decompress: bool,

        /// TOML config file selecting the decompressor
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Split an MKF archive into its sub-files
    Unpack {
        /// Source MKF archive
        #[arg(short, long)]
        source: PathBuf,

        /// Output directory
        #[arg(short, long)]
        destination: PathBuf,

        /// File name prefix for each sub-file
        #[arg(short, long, default_value = "")]
        prefix: String,

        /// File extension for each sub-file
        #[arg(short, long, default_value = "bin")]
        ext: String,
    },

    /// Print the effective configuration as TOML
    Config {
        /// TOML config file to merge over the defaults
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

impl Commands {
    /// Execute the selected command.
    ///
    /// # Errors
    /// Returns an error if the underlying command fails.
    pub fn execute(&self) -> anyhow::Result<()> {
        match self {
            Commands::Extract {
                config,
                builtin_raster,
            } => extract::execute(config.as_deref(), *builtin_raster),
            Commands::Frames {
                source,
                no_decompress,
                config,
            } => frames::execute(source, *no_decompress, config.as_deref()),
            Commands::Unpack {
                source,
                destination,
                prefix,
                ext,
            } => unpack::execute(source, destination, prefix, ext),
            Commands::Config { config: path } => config::execute(path.as_deref()),
        }
    }
}
