use mir2_graphics::rle::{pack, unpack, unpack_into};
use proptest::prelude::*;
use rstest::rstest;

#[rstest]
#[case::empty_stream(&[], 3, &[0, 0, 0])]
#[case::only_markers(&[0, 0, 0, 0], 2, &[0, 0])]
#[case::run_then_literal(&[3, 9, 0, 2, 4, 5], 5, &[9, 9, 9, 4, 5])]
#[case::literal_longer_than_destination(&[0, 4, 1, 2, 3, 4], 2, &[1, 2])]
#[case::literal_longer_than_source(&[0, 9, 1], 3, &[1, 0, 0])]
#[case::lone_count_byte(&[5], 2, &[0, 0])]
#[case::stream_longer_than_destination(&[1, 1, 1, 2, 1, 3], 2, &[1, 2])]
fn damaged_streams_are_absorbed(#[case] stream: &[u8], #[case] len: usize, #[case] expected: &[u8]) {
    assert_eq!(unpack(stream, len), expected);
}

#[test]
fn unpack_into_reports_written_bytes() {
    let mut dst = [0xAA; 6];

    let written = unpack_into(&[2, 1, 0, 1, 7], &mut dst);

    assert_eq!(written, 3);
    assert_eq!(dst, [1, 1, 7, 0xAA, 0xAA, 0xAA]);
}

#[test]
fn zero_length_destination() {
    assert!(unpack(&[4, 7], 0).is_empty());
}

proptest! {
    #[test]
    fn pack_then_unpack_restores_any_bytes(data in proptest::collection::vec(any::<u8>(), 0..2048)) {
        let packed = pack(&data);
        prop_assert_eq!(unpack(&packed, data.len()), data);
    }

    #[test]
    fn pack_then_unpack_restores_runs(data in proptest::collection::vec(0u8..3, 0..4096)) {
        let packed = pack(&data);
        prop_assert!(packed.len() <= data.len() * 2 + 2);
        prop_assert_eq!(unpack(&packed, data.len()), data);
    }

    #[test]
    fn unpack_never_overflows(stream in proptest::collection::vec(any::<u8>(), 0..512), len in 0usize..1024) {
        prop_assert_eq!(unpack(&stream, len).len(), len);
    }
}
