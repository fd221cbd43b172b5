//! Small text helpers shared by detection, resolution and scoring

/// Characters that end a sentence
pub(crate) const TERMINATORS: [char; 4] = ['.', '!', '?', '।'];

/// Largest char boundary at or below `index`
pub(crate) fn floor_char_boundary(text: &str, index: usize) -> usize {
    if index >= text.len() {
        return text.len();
    }
    let mut i = index;
    while !text.is_char_boundary(i) {
        i -= 1;
    }
    i
}

/// Smallest char boundary at or above `index`
pub(crate) fn ceil_char_boundary(text: &str, index: usize) -> usize {
    if index >= text.len() {
        return text.len();
    }
    let mut i = index;
    while !text.is_char_boundary(i) {
        i += 1;
    }
    i
}

/// Whether `text` ends a sentence, ignoring trailing quotes and brackets
pub(crate) fn ends_with_terminal(text: &str) -> bool {
    text.trim_end()
        .trim_end_matches(['"', '\'', ')', ']', '”', '’'])
        .ends_with(TERMINATORS)
}

/// Split text into sentence-like segments
///
/// A segment ends after a terminator followed by whitespace, or at a line
/// break. Decimal points ("8.1") do not end a segment.
pub(crate) fn sentences(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        let next = chars.peek().map(|(_, n)| *n);
        let end = if c == '\n' {
            Some(i)
        } else if TERMINATORS.contains(&c) && next.map_or(true, char::is_whitespace) {
            Some(i + c.len_utf8())
        } else {
            None
        };

        if let Some(end) = end {
            let segment = text[start..end].trim();
            if !segment.is_empty() {
                out.push(segment);
            }
            start = if c == '\n' { i + 1 } else { end };
        }
    }

    let tail = text[start..].trim();
    if !tail.is_empty() {
        out.push(tail);
    }
    out
}

/// Byte offsets just after each sentence terminator or paragraph break
pub(crate) fn break_offsets(text: &str) -> Vec<usize> {
    let mut out = Vec::new();
    let mut chars = text.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        let next = chars.peek().map(|(_, n)| *n);
        if TERMINATORS.contains(&c) && next.map_or(false, char::is_whitespace) {
            out.push(i + c.len_utf8());
        } else if c == '\n' && next == Some('\n') {
            out.push(i + 1);
        }
    }
    out
}

/// Offset just after the last terminator that ends a sentence in `text`
///
/// The terminator must be followed by whitespace or sit at the very end.
pub(crate) fn last_sentence_end(text: &str) -> Option<usize> {
    let mut found = None;
    let mut chars = text.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        let next = chars.peek().map(|(_, n)| *n);
        if TERMINATORS.contains(&c) && next.map_or(true, char::is_whitespace) {
            found = Some(i + c.len_utf8());
        }
    }
    found
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric()
        || c == '\''
        || (('\u{0900}'..='\u{097F}').contains(&c) && !matches!(c, '\u{0964}' | '\u{0965}'))
}

/// Words of the text, punctuation stripped
pub(crate) fn words(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !is_word_char(c))
        .map(|w| w.trim_matches('\''))
        .filter(|w| !w.is_empty())
}

/// Estimated syllable count of an English word
pub(crate) fn count_syllables(word: &str) -> usize {
    let lower = word.to_lowercase();
    let mut count = 0;
    let mut previous_vowel = false;

    for c in lower.chars() {
        let vowel = matches!(c, 'a' | 'e' | 'i' | 'o' | 'u' | 'y');
        if vowel && !previous_vowel {
            count += 1;
        }
        previous_vowel = vowel;
    }

    if lower.ends_with('e') && !lower.ends_with("le") && count > 1 {
        count -= 1;
    }
    count.max(1)
}

/// Collapse whitespace runs to single spaces and trim
pub(crate) fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_boundaries() {
        let text = "aé b";
        assert_eq!(floor_char_boundary(text, 2), 1);
        assert_eq!(ceil_char_boundary(text, 2), 3);
        assert_eq!(floor_char_boundary(text, 100), text.len());
    }

    #[test]
    fn test_sentences_split_on_terminators_and_lines() {
        let text = "8.1 Force\nIntro text. Activity 8.1: push a box. More text.";
        assert_eq!(
            sentences(text),
            vec![
                "8.1 Force",
                "Intro text.",
                "Activity 8.1: push a box.",
                "More text."
            ]
        );
    }

    #[test]
    fn test_sentences_keep_decimals() {
        assert_eq!(sentences("It is 2.5 m long. Yes"), vec!["It is 2.5 m long.", "Yes"]);
    }

    #[test]
    fn test_ends_with_terminal() {
        assert!(ends_with_terminal("Done."));
        assert!(ends_with_terminal("He said \"stop!\"  "));
        assert!(ends_with_terminal("यह बल है।"));
        assert!(!ends_with_terminal("and then"));
    }

    #[test]
    fn test_break_offsets() {
        let text = "One. Two!\n\nThree";
        assert_eq!(break_offsets(text), vec![4, 9, 10]);
    }

    #[test]
    fn test_last_sentence_end_skips_decimals() {
        assert_eq!(last_sentence_end(" Pour water. Measure 2.5 cm"), Some(12));
        assert_eq!(last_sentence_end("no end"), None);
        assert_eq!(last_sentence_end("ends here."), Some(10));
    }

    #[test]
    fn test_words_and_syllables() {
        let w: Vec<&str> = words("Force, (mass) and 'acceleration'.").collect();
        assert_eq!(w, vec!["Force", "mass", "and", "acceleration"]);
        assert_eq!(count_syllables("force"), 1);
        assert_eq!(count_syllables("table"), 2);
        assert_eq!(count_syllables("acceleration"), 5);
    }

    #[test]
    fn test_hindi_words_stay_whole() {
        let w: Vec<&str> = words("बल का मात्रक न्यूटन है।").collect();
        assert_eq!(w, vec!["बल", "का", "मात्रक", "न्यूटन", "है"]);
    }
}
