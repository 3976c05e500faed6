// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0

use std::sync::LazyLock;

use regex::Regex;

use crate::domain::SplitBill;
use crate::error::{Error, Result};

static CODE_FENCE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```(?:json|JSON)?\s*([\s\S]*?)```").unwrap());

pub struct ExtractionParser;

impl ExtractionParser {
    /// Parse the model's reply into a [`SplitBill`].
    ///
    /// Accepts bare JSON, JSON in a code fence, or a JSON object wrapped in
    /// prose. Structural invariants are not checked here.
    pub fn parse(raw: &str) -> Result<SplitBill> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(Error::MalformedExtraction("empty response".into()));
        }

        let mut last_error = None;
        for candidate in Self::candidates(trimmed) {
            match serde_json::from_str::<SplitBill>(candidate) {
                Ok(bill) => return Ok(bill),
                Err(e) => last_error = Some(e),
            }
        }

        Err(Error::MalformedExtraction(match last_error {
            Some(e) => e.to_string(),
            None => format!(
                "no JSON object found in response starting with '{}'",
                trimmed.chars().take(40).collect::<String>()
            ),
        }))
    }

    /// JSON snippets worth trying, most specific first.
    fn candidates(trimmed: &str) -> Vec<&str> {
        let mut out = Vec::new();

        // Direct JSON
        if trimmed.starts_with('{') {
            out.push(trimmed);
        }

        // JSON in code fence
        if let Some(caps) = CODE_FENCE_REGEX.captures(trimmed)
            && let Some(body) = caps.get(1)
        {
            let body = body.as_str().trim();
            if body.starts_with('{') {
                out.push(body);
            }
        }

        // Object embedded in prose
        if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}'))
            && start < end
        {
            let slice = &trimmed[start..=end];
            if !out.contains(&slice) {
                out.push(slice);
            }
        }

        out
    }
}
