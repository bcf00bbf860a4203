//! Parsing of commands, keyboard choices and query parameters.
//!
//! Trigger texts match the keyboard button labels exactly; free-form
//! parameters (entry count, delete command) are shape-matched before any
//! number parsing so junk input is dropped silently.

use std::sync::OnceLock;

use regex::Regex;

// ---------------------------------------------------------------------------
// QueryTrigger
// ---------------------------------------------------------------------------

/// One of the query buttons on the entries keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryTrigger {
    All,
    ByDate,
    After,
    Between,
    LastN,
    ByTopic,
}

impl QueryTrigger {
    /// Match a message against the keyboard button labels.
    pub fn parse(text: &str) -> Option<QueryTrigger> {
        match text {
            "Get all the entries" => Some(QueryTrigger::All),
            "by date" => Some(QueryTrigger::ByDate),
            "after date" => Some(QueryTrigger::After),
            "between two dates" => Some(QueryTrigger::Between),
            "last N entries" => Some(QueryTrigger::LastN),
            "by topic" => Some(QueryTrigger::ByTopic),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// DateShortcut
// ---------------------------------------------------------------------------

/// Relative-date keyboard shortcut, as an offset in whole days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateShortcut {
    pub days_ago: i64,
}

impl DateShortcut {
    pub fn parse(text: &str) -> Option<DateShortcut> {
        let days_ago = match text {
            "Today" => 0,
            "Yesterday" => 1,
            "Past week" => 7,
            _ => return None,
        };
        Some(DateShortcut { days_ago })
    }
}

// ---------------------------------------------------------------------------
// Free-form parameters
// ---------------------------------------------------------------------------

fn delete_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^/d_(\d{10})$").expect("static pattern"))
}

fn count_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d+$").expect("static pattern"))
}

/// Parse a `/d_<timestamp>` delete command.
///
/// Entry timestamps are 10-digit epoch seconds; anything else is not a
/// delete command.
pub fn parse_delete_command(text: &str) -> Option<i64> {
    delete_pattern()
        .captures(text)
        .and_then(|caps| caps[1].parse().ok())
}

/// Parse the entry count for a last-N query.
pub fn parse_count(text: &str) -> Option<usize> {
    if !count_pattern().is_match(text) {
        return None;
    }
    text.parse().ok()
}

/// True for the `/start` registration command.
pub fn is_start_command(text: &str) -> bool {
    text == "/start"
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
