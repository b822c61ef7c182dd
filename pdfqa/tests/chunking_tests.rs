//! Property tests for recursive chunking.

use pdfqa::document::Page;
use pdfqa::{Chunker, RecursiveChunker};
use proptest::prelude::*;

/// Text made of distinct words `w0 w1 w2 ...`, so every chunk can be located
/// in the original word sequence.
fn numbered_words(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("w{i}")).collect()
}

/// Map a chunk back to the index range of the words it contains.
fn word_span(chunk: &str) -> (usize, usize) {
    let indices: Vec<usize> =
        chunk.split(' ').map(|w| w.trim_start_matches('w').parse().unwrap()).collect();
    for pair in indices.windows(2) {
        assert_eq!(pair[1], pair[0] + 1, "chunk words are not contiguous: {chunk:?}");
    }
    (indices[0], indices[indices.len() - 1])
}

fn arb_page_text() -> impl Strategy<Value = String> {
    proptest::collection::vec(
        prop_oneof![
            "[a-zA-Zçãé]{1,12}",
            Just(" ".to_string()),
            Just("\n".to_string()),
            Just("\n\n".to_string()),
        ],
        0..200,
    )
    .prop_map(|parts| parts.concat())
}

mod prop_chunk_bounds {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn chunks_never_exceed_size_and_are_trimmed(
            text in arb_page_text(),
            size in 20usize..200,
            overlap_pct in 0usize..50,
        ) {
            let overlap = size * overlap_pct / 100;
            let chunker = RecursiveChunker::new(size, overlap);

            for chunk in chunker.split_text(&text) {
                prop_assert!(chunk.chars().count() <= size, "chunk too long: {chunk:?}");
                prop_assert!(!chunk.is_empty());
                prop_assert_eq!(chunk.trim(), chunk.as_str());
            }
        }

        #[test]
        fn short_text_is_a_single_trimmed_chunk(text in arb_page_text()) {
            let chunker = RecursiveChunker::default();
            prop_assume!(text.chars().count() <= 1000);

            let chunks = chunker.split_text(&text);
            if text.trim().is_empty() {
                prop_assert!(chunks.is_empty());
            } else {
                prop_assert_eq!(chunks, vec![text.trim().to_string()]);
            }
        }

        #[test]
        fn chunking_is_deterministic(text in arb_page_text(), size in 20usize..200) {
            let chunker = RecursiveChunker::new(size, size / 5);
            prop_assert_eq!(chunker.split_text(&text), chunker.split_text(&text));
        }
    }
}

mod prop_chunk_overlap {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn consecutive_chunks_cover_the_text_without_gaps(
            count in 1usize..400,
            size in 30usize..300,
            overlap_pct in 0usize..50,
        ) {
            let overlap = size * overlap_pct / 100;
            let words = numbered_words(count);
            let text = words.join(" ");
            let chunks = RecursiveChunker::new(size, overlap).split_text(&text);

            let spans: Vec<(usize, usize)> = chunks.iter().map(|c| word_span(c)).collect();
            prop_assert_eq!(spans[0].0, 0);
            prop_assert_eq!(spans[spans.len() - 1].1, count - 1);

            for (pair, texts) in spans.windows(2).zip(chunks.windows(2)) {
                let (prev, next) = (pair[0], pair[1]);
                // Next chunk starts no later than one past the previous end.
                prop_assert!(next.0 <= prev.1 + 1, "gap between {:?} and {:?}", texts[0], texts[1]);
                prop_assert!(next.0 > prev.0, "no progress: {:?}", texts[1]);

                // The shared words fit inside the overlap budget.
                if next.0 <= prev.1 {
                    let shared = words[next.0..=prev.1].join(" ");
                    prop_assert!(shared.chars().count() <= overlap, "overlap too long: {shared:?}");
                }
            }
        }
    }
}

#[test]
fn chunks_inherit_page_metadata_without_empty_values() {
    let mut page = Page::new("Primeiro parágrafo.\n\nSegundo parágrafo.", 3, "");
    page.metadata.insert("author".into(), serde_json::Value::Null);
    page.metadata.insert("title".into(), serde_json::json!("Manual"));

    let chunks = RecursiveChunker::new(25, 5).chunk(&[page]);

    assert_eq!(chunks.len(), 2);
    for chunk in &chunks {
        assert!(chunk.id.is_empty());
        assert!(chunk.embedding.is_empty());
        assert_eq!(chunk.page(), Some(&serde_json::json!(3)));
        assert_eq!(chunk.source(), None);
        assert!(!chunk.metadata.contains_key("source"));
        assert!(!chunk.metadata.contains_key("author"));
        assert_eq!(chunk.metadata.get("title"), Some(&serde_json::json!("Manual")));
    }
}

#[test]
fn pages_are_chunked_independently_in_order() {
    let pages = vec![
        Page::new("fim da página um", 0, "a.pdf"),
        Page::new("", 1, "a.pdf"),
        Page::new("início da página três", 2, "a.pdf"),
    ];

    let chunks = RecursiveChunker::default().chunk(&pages);

    let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(texts, ["fim da página um", "início da página três"]);
    assert_eq!(chunks[1].page(), Some(&serde_json::json!(2)));
}
