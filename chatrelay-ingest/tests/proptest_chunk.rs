//! Property-based tests: chunk windows cover the text without splitting characters.

use chatrelay_ingest::{ChunkConfig, chunk_text};
use proptest::prelude::*;

fn arb_config() -> impl Strategy<Value = ChunkConfig> {
    (1usize..50)
        .prop_flat_map(|size| (Just(size), 0..size))
        .prop_map(|(size, overlap)| ChunkConfig::new(size, overlap).expect("overlap < size"))
}

proptest! {
    #[test]
    fn chunks_never_exceed_size(text in "[a-zA-Z0-9 èß☕\n]{0,300}", config in arb_config()) {
        for chunk in chunk_text(&text, &config) {
            prop_assert!(chunk.chars().count() <= config.size());
            prop_assert!(!chunk.trim().is_empty());
        }
    }

    #[test]
    fn zero_overlap_chunks_rebuild_text(text in "[a-zA-Z0-9èß☕]{0,300}", size in 1usize..50) {
        let config = ChunkConfig::new(size, 0).expect("valid config");
        let chunks = chunk_text(&text, &config);
        prop_assert_eq!(chunks.concat(), text);
    }

    #[test]
    fn consecutive_chunks_share_overlap(text in "[a-zA-Z0-9èß☕]{1,300}", config in arb_config()) {
        let chunks = chunk_text(&text, &config);
        for pair in chunks.windows(2) {
            let head: Vec<char> = pair[0].chars().collect();
            let tail: String = head[head.len() - config.overlap()..].iter().collect();
            prop_assert!(pair[1].starts_with(&tail));
        }
    }
}
