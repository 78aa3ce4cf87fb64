// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![no_main]

use karabo_data::XmlCodec;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // XML is text-based
    if let Ok(xml) = std::str::from_utf8(data) {
        let codec = XmlCodec::default();
        if let Ok(hash) = codec.decode(xml) {
            let _ = codec.encode(&hash);
        }
    }
});
