// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0

use tracing::{debug, info, warn};

use crate::config::Config;
use crate::domain::{BillSplitCalculation, SplitBill};
use crate::error::{Error, Result};
use crate::services::calculator::SplitCalculator;
use crate::services::image::ImageAttachment;
use crate::services::llm::LlmClient;
use crate::services::parser::ExtractionParser;
use crate::services::prompt::ExtractionPrompt;

/// Turns a bill image plus context into structured bill data.
pub struct BillExtractor {
    llm: LlmClient,
    max_attempts: u32,
}

impl BillExtractor {
    pub fn new(llm: LlmClient, max_attempts: u32) -> Self {
        Self {
            llm,
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(LlmClient::from_config(config)?, config.max_attempts))
    }

    pub fn llm(&self) -> &LlmClient {
        &self.llm
    }

    /// Ask the model for the bill, retrying on malformed or transient failures.
    pub async fn extract(&self, context: &str, image: &ImageAttachment) -> Result<SplitBill> {
        let prompt = ExtractionPrompt::new(context, image);

        info!(
            provider = self.llm.provider_name(),
            model = self.llm.model(),
            media_type = %image.media_type,
            "extracting bill"
        );

        let mut attempt = 0;
        loop {
            attempt += 1;

            let result = match self.llm.complete(&prompt).await {
                Ok(raw) => {
                    debug!(attempt, raw_len = raw.len(), "parsing extraction");
                    ExtractionParser::parse(&raw)
                }
                Err(e) => Err(e),
            };

            match result {
                Ok(bill) => {
                    debug!(
                        attempt,
                        items = bill.bill().len(),
                        people = bill.people().len(),
                        "bill extracted"
                    );
                    return Ok(bill);
                }
                Err(e) if e.is_retryable() && attempt < self.max_attempts => {
                    warn!(attempt, max_attempts = self.max_attempts, error = %e, "extraction attempt failed, retrying");
                }
                Err(e) if e.is_retryable() => {
                    return Err(Error::ExtractionFailed {
                        attempts: attempt,
                        last: Box::new(e),
                    });
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Extract and split in one step.
    pub async fn extract_and_split(
        &self,
        context: &str,
        image: &ImageAttachment,
    ) -> Result<(SplitBill, BillSplitCalculation)> {
        let bill = self.extract(context, image).await?;
        let calculation = SplitCalculator::split(&bill)?;
        Ok((bill, calculation))
    }
}
