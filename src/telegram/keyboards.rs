//! Reply-keyboard layouts.
//!
//! The conversation layer only names a [`Keyboard`]; the button rows and
//! markup shape live here, next to the transport that understands them.

use crate::recognize::Language;
use crate::session::{language_button, Keyboard};

/// Button rows for a named keyboard.
fn rows(keyboard: Keyboard) -> Vec<Vec<String>> {
    match keyboard {
        Keyboard::Entries => vec![
            vec!["Get all the entries".into()],
            vec!["by date".into(), "by topic".into()],
            vec!["last N entries".into()],
            vec!["between two dates".into(), "after date".into()],
        ],
        Keyboard::Languages => vec![Language::ALL
            .into_iter()
            .map(language_button)
            .collect()],
        Keyboard::FrequentDates => vec![
            vec!["Today".into()],
            vec!["Yesterday".into()],
            vec!["Past week".into()],
        ],
        Keyboard::FrequentTopics => vec![vec!["None".into()]],
    }
}

/// Build the `reply_markup` JSON for a named keyboard.
pub fn markup(keyboard: Keyboard) -> serde_json::Value {
    serde_json::json!({
        "keyboard": rows(keyboard),
        "resize_keyboard": true,
        "one_time_keyboard": true,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
