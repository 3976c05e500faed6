// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
// SPDX-License-Identifier: GPL-3.0-only

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "splitzie")]
#[command(version)]
#[command(about = "Split a bill from a photo and a few words of context", long_about = None)]
pub struct Cli {
    /// LLM provider (openai, anthropic, ollama)
    #[arg(short, long, env = "SPLITZIE_PROVIDER", global = true)]
    pub provider: Option<String>,

    /// Model name
    #[arg(short, long, env = "SPLITZIE_MODEL", global = true)]
    pub model: Option<String>,

    /// Address to bind the HTTP server to
    #[arg(long, global = true)]
    pub host: Option<String>,

    /// Port to bind the HTTP server to
    #[arg(long, global = true)]
    pub port: Option<u16>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP API (default)
    Serve,
    /// Split an already extracted bill (JSON file, or - for stdin)
    Split {
        file: PathBuf,

        /// Print the calculation as JSON
        #[arg(long)]
        json: bool,
    },
    /// Extract a bill from an image and split it
    Extract {
        /// Bill image (PNG, JPEG, GIF or WebP)
        #[arg(short, long)]
        image: PathBuf,

        /// Who had what, in plain words
        #[arg(short, long)]
        context: String,

        /// Print the full response as JSON
        #[arg(long)]
        json: bool,
    },
    /// Initialize config file
    Init,
    /// Show current configuration
    Config,
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}
