// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: GPL-3.0-only

use super::image::ImageAttachment;

pub const SYSTEM_PROMPT: &str = r#"You are Splitzie, a bill splitting assistant.

The attached image is a bill. The user describes who consumed what.

RULES:
1. Read the TOTAL price of each line item, never the unit price
2. Infer the list of items on the bill from the image
3. Infer the list of people from the user's context
4. Map every person to the items they are responsible for; an item shared by several people is listed under each of them
5. Every person must appear in the mapping, and every bill item must be assigned to at least one person
6. Use item names exactly as they appear in "items" when building the mapping
7. Output ONLY valid JSON in this exact shape:

{"bill_item":{"items":{"<item>":<price>},"currency":"<currency>"},"person":{"people":["<name>"]},"mapping":{"assignment":{"<name>":["<item>"]}}}"#;

/// Everything a provider needs to build one extraction request.
#[derive(Debug, Clone, Copy)]
pub struct ExtractionPrompt<'a> {
    pub system: &'a str,
    pub context: &'a str,
    pub image: &'a ImageAttachment,
}

impl<'a> ExtractionPrompt<'a> {
    pub fn new(context: &'a str, image: &'a ImageAttachment) -> Self {
        Self {
            system: SYSTEM_PROMPT,
            context,
            image,
        }
    }

    /// User text sent alongside the image.
    pub fn user_text(&self) -> String {
        let context = self.context.trim();
        if context.is_empty() {
            "No context given: assume a single person paid for everything.".into()
        } else {
            format!("Context from the user:\n{context}")
        }
    }
}
