// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0

use std::io::Read;
use std::path::Path;

use console::style;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::cli::{Cli, Commands};
use crate::config::Config;
use crate::domain::{BillSplitCalculation, SplitBill, SplitBillResponse};
use crate::error::Result;
use crate::server::{self, AppState};
use crate::services::{
    calculator::SplitCalculator, extractor::BillExtractor, image::ImageAttachment,
    parser::ExtractionParser,
};

pub struct App {
    cli: Cli,
    cancel_token: CancellationToken,
}

impl App {
    pub fn new(cli: Cli) -> Self {
        Self {
            cli,
            cancel_token: CancellationToken::new(),
        }
    }

    pub async fn run(&self) -> Result<()> {
        // Setup Ctrl+C handler with CancellationToken
        let cancel = self.cancel_token.clone();
        tokio::spawn(async move {
            signal::ctrl_c().await.ok();
            cancel.cancel();
        });

        match self.cli.command {
            None | Some(Commands::Serve) => self.serve().await,
            Some(Commands::Split { ref file, json }) => Self::split_file(file, json),
            Some(Commands::Extract {
                ref image,
                ref context,
                json,
            }) => self.extract(image, context, json).await,
            Some(Commands::Init) => {
                let path = Config::create_default()?;
                println!("Created config: {}", path.display());
                Ok(())
            }
            Some(Commands::Config) => self.show_config(),
            Some(Commands::Completions { shell }) => {
                let mut cmd = <Cli as clap::CommandFactory>::command();
                clap_complete::generate(shell, &mut cmd, "splitzie", &mut std::io::stdout());
                Ok(())
            }
        }
    }

    fn load_config(&self) -> Result<Config> {
        let config = Config::load(&self.cli)?;
        debug!(
            provider = %config.provider,
            model = %config.model_name(),
            bind = %config.server.bind_addr(),
            "config loaded"
        );
        Ok(config)
    }

    async fn serve(&self) -> Result<()> {
        let config = self.load_config()?;
        let state = AppState::from_config(&config).await?;
        server::serve(&config, state, self.cancel_token.clone()).await
    }

    async fn extract(&self, image_path: &Path, context: &str, json: bool) -> Result<()> {
        let config = self.load_config()?;
        let bytes = std::fs::read(image_path)?;
        let image = ImageAttachment::from_bytes(&bytes, None)?;

        let extractor = BillExtractor::from_config(&config)?;
        eprintln!(
            "{} Contacting {} ({})...",
            style("→").cyan(),
            extractor.llm().provider_name(),
            extractor.llm().model()
        );

        let (bill, calculation) = tokio::select! {
            _ = self.cancel_token.cancelled() => {
                eprintln!("Aborted.");
                return Ok(());
            }
            result = extractor.extract_and_split(context, &image) => result?,
        };

        if json {
            let response = SplitBillResponse::ok(bill, calculation);
            println!("{}", serde_json::to_string_pretty(&response)?);
        } else {
            print_split(&bill, &calculation);
        }
        Ok(())
    }

    fn split_file(file: &Path, json: bool) -> Result<()> {
        let raw = if file.as_os_str() == "-" {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        } else {
            std::fs::read_to_string(file)?
        };

        let bill = ExtractionParser::parse(&raw)?;
        let calculation = SplitCalculator::split(&bill)?;

        if json {
            println!("{}", serde_json::to_string_pretty(&calculation)?);
        } else {
            print_split(&bill, &calculation);
        }
        Ok(())
    }

    fn show_config(&self) -> Result<()> {
        let config = self.load_config()?;
        println!("Provider: {}", config.provider);
        println!("Model: {}", config.model_name());
        println!(
            "API key: {}",
            if config.api_key.is_some() { "set" } else { "not set" }
        );
        println!("Ollama host: {}", config.ollama_host);
        println!("Timeout: {}s", config.timeout_secs);
        println!("Temperature: {}", config.temperature);
        println!("Max tokens: {}", config.max_tokens);
        println!("Max attempts: {}", config.max_attempts);
        println!();
        println!("[server]");
        println!("  bind: {}", config.server.bind_addr());
        println!("  storage_path: {}", config.server.storage_path.display());
        println!("  max_upload_bytes: {}", config.server.max_upload_bytes);
        println!("  cors_origins: {}", config.server.cors_origins.join(", "));
        println!();
        println!("[mongo]");
        println!("  server_url: {}", config.mongo.server_url);
        println!("  db_name: {}", config.mongo.db_name);
        println!("  auth_source: {}", config.mongo.auth_source);
        println!("  auth_mechanism: {}", config.mongo.auth_mechanism);
        if let Some(ref path) = Config::config_path() {
            let status = if path.exists() { "found" } else { "not found" };
            println!();
            println!("Config file: {} ({})", path.display(), status);
        }
        Ok(())
    }
}

fn print_split(bill: &SplitBill, calculation: &BillSplitCalculation) {
    let currency = bill.bill_item.currency.trim();
    let rule = "=".repeat(40);

    println!("{}", style(&rule).dim());
    println!("{}", style("BILL SPLIT").bold());
    println!("{}", style(&rule).dim());

    for person in &calculation.per_person_split {
        println!(
            "{:<20} {:>10} {}",
            person.name,
            style(format!("{:.2}", person.amount)).green(),
            style(format!("[{}]", person.shared_items.join(", "))).dim()
        );
    }

    println!("{}", style(&rule).dim());
    println!(
        "{:<20} {:>10} {}",
        style("Total").bold(),
        style(format!("{:.2}", calculation.total_amount)).bold(),
        currency
    );
}
