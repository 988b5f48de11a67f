//! Text processing: sentence segmentation, structural feature
//! extraction, and sentence-aligned chunking.

mod chunker;
mod features;
mod segmenter;

pub use chunker::{chunk_text, Section, DEFAULT_PREVIEW_CHARS};
pub use features::{
    clause_trigger_positions, ClauseOrder, SentenceFeatures, CLAUSE_TRIGGERS, PUNCTUATION_CHARS,
};
pub use segmenter::{segment_sentences, word_count};
