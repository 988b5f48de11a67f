//! Sentence segmentation.
//!
//! This is the single shared segmenter: feature extraction and chunking
//! both consume it, so sentence boundaries are identical everywhere.

/// Split text into sentences.
///
/// A sentence ends after `.`, `!` or `?` followed by whitespace. Fragments
/// are trimmed and empty ones dropped. A trailing fragment with no terminal
/// punctuation is kept as the final sentence. Empty input yields an empty
/// vector.
pub fn segment_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        current.push(c);
        if matches!(c, '.' | '!' | '?') && chars.peek().is_some_and(|n| n.is_whitespace()) {
            push_trimmed(&mut sentences, &current);
            current.clear();
        }
    }
    push_trimmed(&mut sentences, &current);

    sentences
}

fn push_trimmed(sentences: &mut Vec<String>, fragment: &str) {
    let trimmed = fragment.trim();
    if !trimmed.is_empty() {
        sentences.push(trimmed.to_string());
    }
}

/// Whitespace-delimited word count.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_splits_on_terminal_punctuation() {
        let sentences = segment_sentences("A cat sat. It was calm! Was it happy?");
        assert_eq!(sentences.len(), 3);
        assert_eq!(sentences[0], "A cat sat.");
        assert_eq!(sentences[1], "It was calm!");
        assert_eq!(sentences[2], "Was it happy?");
    }

    #[test]
    fn test_keeps_unterminated_trailing_fragment() {
        let sentences = segment_sentences("First sentence. And then a trailing bit");
        assert_eq!(sentences.len(), 2);
        assert_eq!(sentences[1], "And then a trailing bit");
    }

    #[test]
    fn test_empty_input() {
        assert!(segment_sentences("").is_empty());
        assert!(segment_sentences("   \n\t ").is_empty());
    }

    #[test]
    fn test_period_without_following_whitespace_does_not_split() {
        // Abbreviation-ish content: no whitespace after the dot.
        let sentences = segment_sentences("Version 2.5 shipped today. It works.");
        assert_eq!(sentences.len(), 2);
        assert_eq!(sentences[0], "Version 2.5 shipped today.");
    }

    #[test]
    fn test_word_count() {
        assert_eq!(word_count("the quick  brown fox"), 4);
        assert_eq!(word_count(""), 0);
    }
}
