use proptest::prelude::*;
use retrocompressor::{compress, decompress, huffman_decode, huffman_encode, lz77_decode, lz77_encode};

proptest! {
    #[test]
    fn full_pipeline_round_trips(data in proptest::collection::vec(any::<u8>(), 0..4000)) {
        let compressed = compress(&data).unwrap();
        let restored = decompress(&compressed).unwrap();
        prop_assert_eq!(restored, data);
    }

    #[test]
    fn lz77_round_trips(data in proptest::collection::vec(any::<u8>(), 0..4000)) {
        let encoded = lz77_encode(&data).unwrap();
        let restored = lz77_decode(&encoded).unwrap();
        prop_assert_eq!(restored, data);
    }

    #[test]
    fn huffman_round_trips(data in proptest::collection::vec(any::<u8>(), 0..4000)) {
        let encoded = huffman_encode(&data).unwrap();
        let restored = huffman_decode(&encoded).unwrap();
        prop_assert_eq!(restored, data);
    }

    #[test]
    fn pipeline_round_trips_on_repetitive_data(byte in any::<u8>(), reps in 1usize..3000) {
        let data = vec![byte; reps];
        let compressed = compress(&data).unwrap();
        let restored = decompress(&compressed).unwrap();
        prop_assert_eq!(restored, data);
    }
}
