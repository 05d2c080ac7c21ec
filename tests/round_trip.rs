use proptest::prelude::*;
use unibinary::ranges::Block;
use unibinary::{
    decode_bytes, decode_str, decode_to_vec, encode_to_bytes_with,
    encode_to_string_with, EncodeConfig,
};

/// Byte strings with a mix of ASCII, high bytes and long runs.
fn data() -> impl Strategy<Value = Vec<u8>> {
    let piece = prop_oneof![
        prop::collection::vec(0_u8..0x80, 0..16),
        prop::collection::vec(any::<u8>(), 0..16),
        (any::<u8>(), 0_usize..9000).prop_map(|(b, n)| vec![b; n]),
    ];
    prop::collection::vec(piece, 0..8).prop_map(|v| v.concat())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn decode_inverts_encode(bytes in data(), wrap in 0_usize..100) {
        let config = EncodeConfig::new().with_wrap_length(wrap);
        let encoded = encode_to_string_with(bytes.iter().copied(), config);
        let decoded = decode_to_vec(decode_str(&encoded));
        prop_assert_eq!(decoded, Ok(bytes.clone()));

        let utf8: Vec<u8> =
            encode_to_bytes_with(bytes.iter().copied(), config).collect();
        prop_assert_eq!(utf8.as_slice(), encoded.as_bytes());
        prop_assert_eq!(decode_to_vec(decode_bytes(utf8)), Ok(bytes));
    }

    #[test]
    fn every_char_is_in_one_block(bytes in data()) {
        let encoded = encode_to_string_with(bytes, EncodeConfig::new());
        for c in encoded.chars() {
            prop_assert!(Block::of(c).is_some(), "unclassified char {:?}", c);
        }
    }

    #[test]
    fn newlines_follow_every_full_line(bytes in data(), wrap in 1_usize..20) {
        let config = EncodeConfig::new().with_wrap_length(wrap);
        let encoded = encode_to_string_with(bytes.iter().copied(), config);
        let unwrapped = encode_to_string_with(bytes, EncodeConfig::new());
        let lines: Vec<&str> = encoded.split('\n').collect();
        let (last, full) = lines.split_last().unwrap();
        for line in full {
            prop_assert_eq!(line.chars().count(), wrap);
        }
        prop_assert!(last.chars().count() < wrap);
        prop_assert_eq!(lines.concat(), unwrapped);
    }
}

#[test]
fn empty_input() {
    let config = EncodeConfig::new().with_wrap_length(3);
    assert_eq!(encode_to_string_with(Vec::new(), config), "");
    assert_eq!(decode_to_vec(decode_str("")), Ok(Vec::new()));
}

#[test]
fn long_run_splits_at_4095() {
    let encoded: Vec<char> =
        encode_to_string_with(vec![0_u8; 0x2000], EncodeConfig::new())
            .chars()
            .collect();
    let blocks: Vec<_> = encoded.iter().map(|&c| Block::of(c)).collect();
    assert_eq!(
        blocks,
        [
            Some(Block::Eight),
            Some(Block::Twelve),
            Some(Block::Eight),
            Some(Block::Twelve),
            Some(Block::PairedAscii),
        ],
    );
    assert_eq!(u32::from(encoded[1]), 0x5dff);
    assert_eq!(u32::from(encoded[3]), 0x5dff);
}

#[test]
fn ascii_text() {
    let s = "if I'd listened everything that they said to me, took the time \
             to bleed from all the tiny little arrows shot my way, I wouldn't \
             be here!";
    let encoded = encode_to_string_with(s.bytes(), EncodeConfig::new());
    assert_eq!(encoded.chars().count(), s.len().div_ceil(2));
    assert_eq!(decode_to_vec(decode_str(&encoded)), Ok(s.as_bytes().to_vec()));
}
