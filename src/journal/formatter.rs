//! Transcript post-processing and entry rendering.
//!
//! [`process_text`] applies the sentence-segmentation heuristic to a raw
//! dictation transcript (the dictation backend returns no punctuation).
//! The auto-detect backend already joins its segments with periods, so its
//! transcript skips this step.
//!
//! [`format_entry`] renders a stored [`Entry`] into the HTML card shown in
//! the chat, and [`sort_for_display`] puts fetched sets into chronological
//! order before rendering.

use std::sync::OnceLock;

use regex::Regex;

use crate::journal::dates::timestamp_to_date;
use crate::journal::entry::Entry;
use crate::recognize::Language;

fn word_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\w+").expect("static pattern"))
}

// ---------------------------------------------------------------------------
// Sentence segmentation
// ---------------------------------------------------------------------------

/// Split a raw transcript into sentences.
///
/// Heuristic carried over from the legacy formatter: a period is inserted
/// before any space that precedes a capitalized word (unless one is already
/// there), and a final period is appended. Proper nouns mid-sentence will
/// be mis-segmented — known approximation, intentionally not extended.
///
/// Empty input stays empty.
pub fn process_text(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len() + 8);

    for (i, &ch) in chars.iter().enumerate() {
        let next_is_capital = chars.get(i + 1).is_some_and(|c| c.is_uppercase());
        let prev_is_period = i > 0 && chars[i - 1] == '.';
        if ch == ' ' && next_is_capital && i > 0 && !prev_is_period {
            out.push('.');
        }
        out.push(ch);
    }

    out.push('.');
    out
}

// ---------------------------------------------------------------------------
// Entry rendering
// ---------------------------------------------------------------------------

/// Render one entry as the HTML card sent back to the user.
///
/// The header carries the entry date, the language flag and the topic; the
/// footer carries the `/d_<timestamp>` delete command for this entry. An
/// unknown locale tag renders with a neutral glyph instead of failing.
pub fn format_entry(entry: &Entry) -> String {
    let flag = Language::from_code(&entry.language)
        .map(Language::flag)
        .unwrap_or("🌐");

    let date = timestamp_to_date(entry.timestamp).unwrap_or_else(|_| entry.date.clone());
    let header = format!("{date} | {flag} {}", entry.topic);
    let line_len = (header.chars().count() as f32 * 1.6) as usize;
    let words = word_pattern().find_iter(&entry.text).count();

    format!(
        "<b>{header}</b>\n{}\n<i>{words} words</i>\n\n{}\n\n🗑️ /d_{}",
        "-".repeat(line_len),
        entry.text,
        entry.timestamp,
    )
}

/// Sort a fetched set chronologically (oldest first) for display.
pub fn sort_for_display(mut entries: Vec<Entry>) -> Vec<Entry> {
    entries.sort_by_key(|entry| entry.timestamp);
    entries
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(timestamp: i64) -> Entry {
        Entry {
            topic: "Meeting".into(),
            text: "Hello world.".into(),
            date: timestamp_to_date(timestamp).unwrap(),
            timestamp,
            language: "en-US".into(),
        }
    }

    // --- process_text ---

    #[test]
    fn plain_sentence_gains_trailing_period() {
        assert_eq!(process_text("Hello world"), "Hello world.");
    }

    #[test]
    fn period_inserted_before_capitalized_word() {
        assert_eq!(
            process_text("hello there How are you"),
            "hello there. How are you."
        );
    }

    #[test]
    fn existing_period_is_not_doubled() {
        assert_eq!(process_text("one. Two"), "one. Two.");
    }

    #[test]
    fn multiple_capitals_split_multiple_times() {
        assert_eq!(process_text("a b C d E"), "a b. C d. E.");
    }

    #[test]
    fn empty_text_stays_empty() {
        assert_eq!(process_text(""), "");
    }

    // --- format_entry ---

    #[test]
    fn card_contains_header_words_text_and_delete_command() {
        let ts = 1_700_000_000;
        let card = format_entry(&entry(ts));

        assert!(card.contains("| 🇺🇸 Meeting"));
        assert!(card.contains("<i>2 words</i>"));
        assert!(card.contains("Hello world."));
        assert!(card.contains(&format!("/d_{ts}")));
    }

    #[test]
    fn unknown_language_renders_with_neutral_glyph() {
        let mut e = entry(1_700_000_000);
        e.language = "xx-XX".into();
        let card = format_entry(&e);
        assert!(card.contains("🌐"));
    }

    // --- sort_for_display ---

    #[test]
    fn display_order_is_chronological() {
        let entries = vec![entry(30), entry(10), entry(20)];
        let sorted = sort_for_display(entries);
        let stamps: Vec<i64> = sorted.iter().map(|e| e.timestamp).collect();
        assert_eq!(stamps, vec![10, 20, 30]);
    }
}
