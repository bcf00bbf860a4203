//! Journal domain: the entry record, canonical date handling and rendering.
//!
//! This module provides:
//! * [`Entry`] — one persisted voice-transcript record.
//! * [`dates`] — canonical-format conversions and user-input normalisation.
//! * [`formatter`] — sentence segmentation and entry-card rendering.

pub mod dates;
pub mod entry;
pub mod formatter;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use dates::{
    date_to_timestamp, days_ago, normalize_date_input, now_date, split_dual_date_input,
    timestamp_to_date, DateError, DATE_FORMAT,
};
pub use entry::{Entry, DEFAULT_TOPIC};
pub use formatter::{format_entry, process_text, sort_for_display};
