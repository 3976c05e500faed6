// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: GPL-3.0-only

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::error::{Error, Result};

/// Magic byte prefixes for the formats vision APIs accept.
const SIGNATURES: &[(&[u8], &str)] = &[
    (b"\x89PNG\r\n\x1a\n", "image/png"),
    (b"\xff\xd8\xff", "image/jpeg"),
    (b"GIF87a", "image/gif"),
    (b"GIF89a", "image/gif"),
];

/// A bill image, base64-encoded for an LLM request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAttachment {
    pub media_type: String,
    pub data: String,
}

impl ImageAttachment {
    /// Encode raw upload bytes.
    ///
    /// A declared `image/*` content type is kept as is; anything else is
    /// replaced by the type sniffed from the bytes.
    pub fn from_bytes(bytes: &[u8], declared: Option<&str>) -> Result<Self> {
        if bytes.is_empty() {
            return Err(Error::InvalidImage("upload is empty".into()));
        }

        let declared = declared
            .map(|ct| ct.split(';').next().unwrap_or("").trim().to_lowercase())
            .filter(|ct| ct.starts_with("image/") && ct.len() > "image/".len());

        let media_type = match declared {
            Some(ct) => ct,
            None => sniff_media_type(bytes)
                .ok_or_else(|| Error::InvalidImage("unrecognized image format".into()))?
                .to_string(),
        };

        Ok(Self {
            media_type,
            data: STANDARD.encode(bytes),
        })
    }

    /// `data:` URL form used by OpenAI-style `image_url` parts.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.media_type, self.data)
    }
}

/// Detect the image type from its leading bytes.
pub fn sniff_media_type(bytes: &[u8]) -> Option<&'static str> {
    if let Some((_, media_type)) = SIGNATURES.iter().find(|(sig, _)| bytes.starts_with(sig)) {
        return Some(*media_type);
    }

    // RIFF....WEBP
    if bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        return Some("image/webp");
    }

    None
}
