// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: GPL-3.0-only

pub mod calculator;
pub mod extractor;
pub mod heartbeat;
pub mod image;
pub mod llm;
pub mod parser;
pub mod prompt;
