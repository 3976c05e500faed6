// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: GPL-3.0-only

#![no_main]

use libfuzzer_sys::fuzz_target;
use splitzie::services::image::{ImageAttachment, sniff_media_type};

fuzz_target!(|data: &[u8]| {
    let _ = sniff_media_type(data);
    if let Ok(image) = ImageAttachment::from_bytes(data, None) {
        assert!(image.media_type.starts_with("image/"));
    }
});
