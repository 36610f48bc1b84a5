//! Tests for TF-IDF relevance ranking.

use std::collections::HashSet;

use proptest::prelude::*;
use tutor_rag::document::Chunk;
use tutor_rag::ranking::{Ranker, TfIdfRanker};

const MAX_CHUNKS: usize = 8;

fn chunk(document_id: &str, ordinal: usize, text: &str) -> Chunk {
    Chunk { text: text.to_string(), document_id: document_id.to_string(), ordinal }
}

fn arb_chunks(range: std::ops::Range<usize>) -> impl Strategy<Value = Vec<Chunk>> {
    proptest::collection::vec("[a-z]{2,6}( [a-z]{2,6}){0,12}", range).prop_map(|texts| {
        texts.into_iter().enumerate().map(|(i, text)| chunk("doc.pdf", i, &text)).collect()
    })
}

/// **Property 2: Small corpora pass through unranked**
/// *For any* corpus with at most `MAX_CHUNKS` chunks and any query, `rank`
/// SHALL return every chunk, unscored and in input order.
mod prop_small_corpus_passthrough {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn returns_every_chunk(chunks in arb_chunks(0..MAX_CHUNKS + 1), query in "[a-z ]{0,30}") {
            let ranked = TfIdfRanker::new().rank(&chunks, &query, MAX_CHUNKS);

            prop_assert_eq!(ranked.len(), chunks.len());
            for (result, original) in ranked.iter().zip(&chunks) {
                prop_assert_eq!(&result.chunk, original);
                prop_assert!(result.score.is_none());
            }
        }
    }
}

/// **Property 3: Large corpora are cut to `MAX_CHUNKS` by descending score**
/// *For any* corpus with more than `MAX_CHUNKS` chunks, `rank` SHALL return
/// exactly `MAX_CHUNKS` distinct input chunks with non-increasing scores in
/// `[0, 1]`, and a second call SHALL return the same result.
mod prop_large_corpus_top_k {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn returns_top_k_in_descending_order(
            chunks in arb_chunks(MAX_CHUNKS + 1..30),
            query in "[a-z]{2,6}( [a-z]{2,6}){0,4}",
        ) {
            let ranker = TfIdfRanker::new();
            let ranked = ranker.rank(&chunks, &query, MAX_CHUNKS);

            prop_assert_eq!(ranked.len(), MAX_CHUNKS);

            let ordinals: HashSet<usize> = ranked.iter().map(|r| r.chunk.ordinal).collect();
            prop_assert_eq!(ordinals.len(), MAX_CHUNKS);
            for result in &ranked {
                prop_assert_eq!(&result.chunk, &chunks[result.chunk.ordinal]);
            }

            let scores: Vec<f32> = ranked.iter().map(|r| r.score.unwrap()).collect();
            for score in &scores {
                prop_assert!((0.0..=1.0 + 1e-6).contains(score));
            }
            for window in scores.windows(2) {
                prop_assert!(window[0] >= window[1], "scores not descending: {:?}", scores);
            }

            prop_assert_eq!(ranker.rank(&chunks, &query, MAX_CHUNKS), ranked);
        }
    }
}

#[test]
fn empty_corpus_ranks_to_nothing() {
    assert!(TfIdfRanker::new().rank(&[], "what is a system?", MAX_CHUNKS).is_empty());
}

#[test]
fn most_similar_chunk_ranks_first() {
    let mut chunks: Vec<Chunk> = (0..10)
        .map(|i| chunk("Filler.pdf", i, &format!("budget meeting agenda item number {i}")))
        .collect();
    chunks.push(chunk(
        "Networks.pdf",
        0,
        "the tcp handshake opens a connection between client and server",
    ));

    let ranked = TfIdfRanker::new().rank(&chunks, "How does the TCP handshake work?", 3);

    assert_eq!(ranked.len(), 3);
    assert_eq!(ranked[0].chunk.document_id, "Networks.pdf");
    assert!(ranked[0].score.unwrap() > ranked[1].score.unwrap());
}

#[test]
fn ties_keep_first_seen_order() {
    let chunks: Vec<Chunk> =
        (0..12).map(|i| chunk("Same.pdf", i, "identical words in every chunk")).collect();

    let ranked = TfIdfRanker::new().rank(&chunks, "unrelated query", 4);

    let ordinals: Vec<usize> = ranked.iter().map(|r| r.chunk.ordinal).collect();
    assert_eq!(ordinals, vec![0, 1, 2, 3]);
    assert!(ranked.iter().all(|r| r.score == Some(0.0)));
}

#[test]
fn zero_k_returns_nothing() {
    let chunks = vec![chunk("A.pdf", 0, "kernel scheduling")];
    assert!(TfIdfRanker::new().rank(&chunks, "kernel", 0).is_empty());
}
