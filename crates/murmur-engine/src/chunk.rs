//! Splitting authored text into chat-sized messages, and how long each one
//! takes to "type".

use crate::config::EngineConfig;

fn is_terminal(c: char) -> bool {
    matches!(c, '.' | '!' | '?')
}

/// Split text into sentence units: a run of non-terminal characters
/// followed by its run of `. ! ?`, plus any unterminated remainder.
fn sentence_units(text: &str) -> Vec<&str> {
    let mut units = Vec::new();
    let mut start = 0;
    let mut in_terminal_run = false;

    for (idx, c) in text.char_indices() {
        if is_terminal(c) {
            in_terminal_run = true;
        } else if in_terminal_run {
            units.push(&text[start..idx]);
            start = idx;
            in_terminal_run = false;
        }
    }
    if start < text.len() {
        units.push(&text[start..]);
    }
    units
}

fn fixed_width(text: &str, max: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(max)
        .map(|piece| piece.iter().collect::<String>())
        .collect()
}

fn flush(current: &mut String, chunks: &mut Vec<String>) {
    let trimmed = current.trim();
    if !trimmed.is_empty() {
        chunks.push(trimmed.to_string());
    }
    current.clear();
}

/// Split `text` into chunks of at most `max_len` characters.
///
/// Text at or under the cap is returned whole. Longer text is packed
/// greedily by sentence; a sentence longer than the cap, or text with no
/// sentence boundaries at all, is sliced at fixed width.
pub fn split_into_chunks(text: &str, max_len: usize) -> Vec<String> {
    let max_len = max_len.max(1);
    if text.chars().count() <= max_len {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for unit in sentence_units(text) {
        let unit_len = unit.chars().count();
        if unit_len > max_len {
            flush(&mut current, &mut chunks);
            current_len = 0;
            for piece in fixed_width(unit, max_len) {
                let mut piece = piece;
                flush(&mut piece, &mut chunks);
            }
        } else if current_len + unit_len <= max_len {
            current.push_str(unit);
            current_len += unit_len;
        } else {
            flush(&mut current, &mut chunks);
            current.push_str(unit);
            current_len = unit_len;
        }
    }
    flush(&mut current, &mut chunks);

    if chunks.is_empty() {
        chunks.push(text.trim().to_string());
    }
    chunks
}

/// Simulated typing time for one chunk: proportional to its length,
/// bounded by the configured minimum and maximum.
pub fn typing_delay(chunk: &str, config: &EngineConfig) -> u64 {
    let chars = chunk.chars().count() as u64;
    chars
        .saturating_mul(config.typing_ms_per_char)
        .max(config.min_typing_ms)
        .min(config.max_typing_ms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Whether `chunks` spell out `text` in order, differing only by
    /// whitespace at chunk boundaries.
    fn rebuilds(text: &str, chunks: &[String]) -> bool {
        let mut rest = text;
        for chunk in chunks {
            let chunk = chunk.trim_start();
            rest = rest.trim_start();
            match rest.strip_prefix(chunk) {
                Some(tail) => rest = tail,
                None => return false,
            }
        }
        rest.trim().is_empty()
    }

    #[test]
    fn rebuild_check_catches_dropped_inner_spaces() {
        let text = "Stay on the line. Please.";
        assert!(rebuilds(text, &["Stay on the line.".into(), "Please.".into()]));
        assert!(!rebuilds(text, &["Stayon the line.".into(), "Please.".into()]));
        assert!(!rebuilds(text, &["Please.".into(), "Stay on the line.".into()]));
    }

    #[test]
    fn short_text_is_one_chunk() {
        assert_eq!(split_into_chunks("Hello?", 180), vec!["Hello?"]);
        let exact = "a".repeat(180);
        assert_eq!(split_into_chunks(&exact, 180), vec![exact.clone()]);
    }

    #[test]
    fn packs_sentences_under_the_cap() {
        let text = "The water is rising. I can hear it on the stairs! What do I do? Please answer.";
        let chunks = split_into_chunks(text, 45);
        assert_eq!(
            chunks,
            vec![
                "The water is rising.",
                "I can hear it on the stairs! What do I do?",
                "Please answer.",
            ]
        );
    }

    #[test]
    fn keeps_unterminated_tail() {
        let text = "First sentence here. Second one here. and then no ending";
        let chunks = split_into_chunks(text, 25);
        assert_eq!(chunks.last().map(String::as_str), Some("and then no ending"));
    }

    #[test]
    fn no_boundaries_falls_back_to_fixed_width() {
        let text = "x".repeat(25);
        let chunks = split_into_chunks(&text, 10);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].len(), 10);
        assert_eq!(chunks[2].len(), 5);
    }

    #[test]
    fn counts_characters_not_bytes() {
        let text = "Salamat po! ".repeat(3) + "Ingat ka ñ.";
        for chunk in split_into_chunks(&text, 12) {
            assert!(chunk.chars().count() <= 12, "{chunk}");
        }
    }

    #[test]
    fn typing_delay_is_clamped() {
        let cfg = EngineConfig::default();
        assert_eq!(typing_delay("hi", &cfg), 1000);
        assert_eq!(typing_delay(&"a".repeat(40), &cfg), 1400);
        assert_eq!(typing_delay(&"a".repeat(500), &cfg), 5000);
    }

    proptest! {
        #[test]
        fn chunking_loses_and_reorders_nothing(
            text in "[a-zA-Z ,.!?']{0,400}",
            max in 1usize..200,
        ) {
            let chunks = split_into_chunks(&text, max);
            prop_assert!(!chunks.is_empty());
            prop_assert!(rebuilds(&text, &chunks), "{:?} from {:?}", chunks, text);
            for chunk in &chunks {
                prop_assert!(chunk.chars().count() <= max);
            }
        }
    }
}
