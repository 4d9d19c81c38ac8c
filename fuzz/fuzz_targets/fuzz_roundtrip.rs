#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use zenrle::{Channels, PixelBuffer};

#[derive(Debug, Arbitrary)]
struct Input {
    width: u8,
    color: bool,
    samples: Vec<u8>,
}

// Encode, serialize, parse, decode: the buffer must come back bit-exact and
// the stream must be maximal.
fuzz_target!(|input: Input| {
    let channels = if input.color { Channels::Rgb } else { Channels::Gray };
    let width = u32::from(input.width.max(1));
    let row = width as usize * channels.count() as usize;
    let height = input.samples.len() / row;
    let mut samples = input.samples;
    samples.truncate(height * row);

    let buffer = PixelBuffer::new(width, height as u32, channels, samples).expect("sized above");
    let stream = zenrle::encode(&buffer).expect("encode");
    assert!(stream.is_maximal());
    assert_eq!(stream.unit_count(), buffer.pixel_count() as u64);

    let parsed: zenrle::RunLengthStream = stream.to_string().parse().expect("parse");
    let decoded = zenrle::decode(&parsed).expect("decode");
    assert!(decoded.is_exact());
    assert_eq!(decoded.pixels, buffer);
});
