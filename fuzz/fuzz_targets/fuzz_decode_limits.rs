#![no_main]

use libfuzzer_sys::fuzz_target;
use zenrle::{DecodeRequest, Limits, TruncationPolicy};

// Hostile headers must be refused by the limits, never allocated.
fuzz_target!(|data: &[u8]| {
    let limits = Limits {
        max_pixels: Some(1 << 20),
        max_memory_bytes: Some(3 << 20),
        ..Limits::none()
    };

    if let Ok(text) = std::str::from_utf8(data) {
        if let Ok(stream) = zenrle::text::parse(text) {
            for policy in [TruncationPolicy::ZeroFill, TruncationPolicy::Reject] {
                if let Ok(out) = DecodeRequest::new(&stream)
                    .with_limits(&limits)
                    .with_truncation(policy)
                    .decode()
                {
                    assert_eq!(out.width(), stream.width);
                    assert_eq!(out.height(), stream.height);
                }
            }
        }
    }

    let _ = zenrle::pnm::decode(data, Some(&limits));
    let _ = zenrle::io::decode_image(data, Some(&limits));
});
