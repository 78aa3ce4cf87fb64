// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![no_main]

use karabo_data::{BinaryCodec, DecodeMode};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let codec = BinaryCodec::default();
    if let Ok(hash) = codec.decode(data) {
        // anything accepted must survive a re-encode unchanged
        let encoded = codec.encode(&hash).expect("decoded hash re-encodes");
        assert_eq!(codec.decode(&encoded).expect("re-decode"), hash);
    }

    let shared = bytes::Bytes::copy_from_slice(data);
    let _ = codec.with_mode(DecodeMode::Borrowed).decode_bytes(&shared);
});
