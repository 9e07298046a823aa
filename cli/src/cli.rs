use std::path::PathBuf;

use clap::{Parser, Subcommand};

use pic_convert_core::OutputFormat;

/// Fetch images from paths or URLs and re-encode them into one format
#[derive(Debug, Parser)]
#[command(name = "pic_convert", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Convert files, directories or http(s) URLs
    Convert {
        /// Local paths, directories or http(s) URLs
        #[arg(required = true)]
        inputs: Vec<String>,

        /// Directory the converted files are written to
        #[arg(short, long)]
        out_dir: PathBuf,

        /// JSON configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Target format for this run, overriding the stored one
        #[arg(long, short = 't', value_name = "FORMAT")]
        to: Option<OutputFormat>,

        /// Walk directories recursively
        #[arg(short, long)]
        recursive: bool,
    },

    /// Inspect or change the stored configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Print the configuration schema as JSON
    Schema {
        /// JSON configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Store the output format (jpeg, png, gif, webp, avif, heif)
    SetFormat {
        format: OutputFormat,

        /// JSON configuration file
        #[arg(short, long)]
        config: PathBuf,
    },
}
