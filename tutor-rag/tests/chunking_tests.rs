//! Tests for word-window chunking.

use proptest::prelude::*;
use tutor_rag::chunking::{Chunker, WordWindowChunker};
use tutor_rag::document::Document;

fn arb_text() -> impl Strategy<Value = String> {
    proptest::collection::vec(("[a-zA-Z0-9.,]{1,8}", "[ \t\n]{1,3}"), 0..60)
        .prop_map(|parts| parts.into_iter().map(|(word, gap)| format!("{word}{gap}")).collect())
}

/// **Property 1: Chunking is lossless and order preserving**
/// *For any* document and chunk size, joining the chunk texts of the
/// document in order SHALL reproduce the whitespace-normalised word sequence,
/// every chunk except the last SHALL hold exactly `chunk_size` words, and
/// ordinals SHALL count up from zero.
mod prop_lossless_chunking {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn chunks_reconstruct_word_sequence(text in arb_text(), chunk_size in 1usize..12) {
            let document = Document::new("notes.txt", text.clone());
            let chunks = WordWindowChunker::new(chunk_size).chunk(&document);

            let original: Vec<&str> = text.split_whitespace().collect();
            let rebuilt: Vec<&str> =
                chunks.iter().flat_map(|c| c.text.split_whitespace()).collect();
            prop_assert_eq!(&rebuilt, &original);

            for (i, chunk) in chunks.iter().enumerate() {
                prop_assert_eq!(chunk.ordinal, i);
                prop_assert_eq!(chunk.document_id.as_str(), "notes.txt");
                let words = chunk.text.split_whitespace().count();
                if i + 1 < chunks.len() {
                    prop_assert_eq!(words, chunk_size);
                } else {
                    prop_assert!(words >= 1 && words <= chunk_size);
                }
            }
        }
    }
}

#[test]
fn short_document_yields_single_tagged_chunk() {
    let document =
        Document::new("Syllabus.pdf", "a system is a set of interacting parts forming a whole");
    let chunks = WordWindowChunker::new(800).chunk(&document);

    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].document_id, "Syllabus.pdf");
    assert_eq!(chunks[0].ordinal, 0);
    assert_eq!(chunks[0].text.split_whitespace().count(), 11);
}

#[test]
fn empty_document_yields_no_chunks() {
    let chunker = WordWindowChunker::new(5);
    assert!(chunker.chunk(&Document::new("empty.txt", "")).is_empty());
    assert!(chunker.chunk(&Document::new("blank.txt", " \n\t ")).is_empty());
}

#[test]
fn chunk_all_keeps_document_order() {
    let documents = vec![
        Document::new("A.pdf", "one two three"),
        Document::new("B.pdf", "four five six seven"),
    ];
    let chunks = WordWindowChunker::new(2).chunk_all(&documents);

    let tags: Vec<(&str, usize, &str)> =
        chunks.iter().map(|c| (c.document_id.as_str(), c.ordinal, c.text.as_str())).collect();
    assert_eq!(
        tags,
        vec![
            ("A.pdf", 0, "one two"),
            ("A.pdf", 1, "three"),
            ("B.pdf", 0, "four five"),
            ("B.pdf", 1, "six seven"),
        ]
    );
}

#[test]
fn zero_chunk_size_is_clamped_to_one_word() {
    let chunker = WordWindowChunker::new(0);
    assert_eq!(chunker.chunk_size(), 1);
    assert_eq!(chunker.chunk(&Document::new("x.txt", "alpha beta")).len(), 2);
}
