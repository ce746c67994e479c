//! Fuzz target: `LineDecoder::feed`
//!
//! Splits the input at an arbitrary point and feeds both halves.  Lines
//! must never carry a terminator, and feeding in pieces must yield the
//! same lines as feeding everything at once.
//!
//! cargo fuzz run fuzz_line_decoder

#![no_main]

use layoutctl::rpc::codec::{Line, LineDecoder};
use libfuzzer_sys::fuzz_target;

fn drain(decoder: &mut LineDecoder) -> Vec<Line> {
    let mut out = Vec::new();
    while let Some(line) = decoder.next_line() {
        if let Line::Text(ref text) = line {
            assert!(!text.contains('\n'));
        }
        out.push(line);
    }
    out
}

fuzz_target!(|data: &[u8]| {
    let Some((&split, rest)) = data.split_first() else {
        return;
    };
    let at = usize::from(split).min(rest.len());

    let mut whole = LineDecoder::new();
    whole.feed(rest);
    let expected = drain(&mut whole);

    let mut pieces = LineDecoder::new();
    pieces.feed(&rest[..at]);
    let mut got = drain(&mut pieces);
    pieces.feed(&rest[at..]);
    got.extend(drain(&mut pieces));

    assert_eq!(got, expected);
});
