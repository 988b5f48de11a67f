//! Sentence-aligned chunking of long documents.
//!
//! Sections are the unit of batch scheduling: word-bounded, never split
//! mid-sentence, and they partition the document's words exactly.

use uuid::Uuid;

use super::segmenter::{segment_sentences, word_count};

/// Characters of section text kept in the preview field.
pub const DEFAULT_PREVIEW_CHARS: usize = 80;

/// A sentence-aligned, word-bounded slice of a larger document.
#[derive(Debug, Clone)]
pub struct Section {
    pub id: String,
    pub text: String,
    pub word_count: usize,
    pub sentence_count: usize,
    /// Byte offset of the section's first sentence in the source text.
    pub char_start: usize,
    /// Byte offset just past the section's last sentence.
    pub char_end: usize,
    pub preview: String,
}

/// Split text into sections of roughly `target_words` words.
///
/// Sentences accumulate into the current section; when appending the next
/// sentence would push the accumulated word count past the target and the
/// accumulation is non-empty, the section is flushed and the sentence
/// starts a new one. A lone sentence longer than the target becomes its
/// own oversized section rather than being truncated.
pub fn chunk_text(text: &str, target_words: usize) -> Vec<Section> {
    let sentences = segment_sentences(text);
    if sentences.is_empty() {
        return Vec::new();
    }
    let target = target_words.max(1);

    let mut sections = Vec::new();
    let mut builder = SectionBuilder::new();
    let mut cursor = 0usize;

    for sentence in &sentences {
        // Trimmed sentences always reappear verbatim in the source text.
        let start = text[cursor..]
            .find(sentence.as_str())
            .map(|p| cursor + p)
            .unwrap_or(cursor);
        let end = start + sentence.len();
        cursor = end;

        let words = word_count(sentence);
        if !builder.is_empty() && builder.words + words > target {
            sections.push(builder.finish());
            builder = SectionBuilder::new();
        }
        builder.push(sentence, words, start, end);
    }
    if !builder.is_empty() {
        sections.push(builder.finish());
    }

    sections
}

struct SectionBuilder {
    text: String,
    words: usize,
    sentences: usize,
    char_start: usize,
    char_end: usize,
}

impl SectionBuilder {
    fn new() -> Self {
        Self {
            text: String::new(),
            words: 0,
            sentences: 0,
            char_start: 0,
            char_end: 0,
        }
    }

    fn is_empty(&self) -> bool {
        self.sentences == 0
    }

    fn push(&mut self, sentence: &str, words: usize, start: usize, end: usize) {
        if self.is_empty() {
            self.char_start = start;
        } else {
            self.text.push(' ');
        }
        self.text.push_str(sentence);
        self.words += words;
        self.sentences += 1;
        self.char_end = end;
    }

    fn finish(self) -> Section {
        let preview = preview_of(&self.text);
        Section {
            id: Uuid::new_v4().to_string(),
            text: self.text,
            word_count: self.words,
            sentence_count: self.sentences,
            char_start: self.char_start,
            char_end: self.char_end,
            preview,
        }
    }
}

fn preview_of(text: &str) -> String {
    if text.chars().count() <= DEFAULT_PREVIEW_CHARS {
        return text.to_string();
    }
    let truncated: String = text.chars().take(DEFAULT_PREVIEW_CHARS).collect();
    format!("{}...", truncated.trim_end())
}
