//! Canonical command phrases and the classifier that matches them
//!
//! Free text is normalized and checked against a small fixed table of
//! canonical phrases. Anything that matches gets a canned response without
//! touching the network; everything else is handed to remote inference.

/// Canonical phrase table, scanned in order.
///
/// First match in list order wins. Keys must be unique, non-empty and
/// lowercase; `classify` lowercases its input before scanning.
pub const PHRASE_TABLE: &[(&str, &str)] = &[
    ("play music", "🎵 Now playing your playlist"),
    ("set alarm", "⏰ Alarm set for 7:00 AM"),
    ("what's the weather?", "☁️ 72°F, Partly Cloudy"),
    ("call mom", "📞 Calling Mom..."),
    ("open calendar", "📅 Opening your calendar"),
    ("send message", "📨 Who would you like to message?"),
];

/// The phrase that triggers audio playback in the UI layer.
pub const PLAY_MUSIC_PHRASE: &str = "play music";

/// Outcome of classifying one submitted command
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClassificationResult {
    /// Input was empty after trimming
    Empty,
    /// Input matched a canonical phrase
    Matched {
        /// Canned response for the matched phrase
        response: String,
        /// The canonical phrase that matched
        matched_phrase: String,
    },
    /// No phrase matched; the normalized input should go to remote inference
    Unmatched {
        /// Trimmed, lowercased input
        normalized_input: String,
    },
}

impl ClassificationResult {
    /// Check if this result requires remote inference
    pub fn needs_inference(&self) -> bool {
        matches!(self, ClassificationResult::Unmatched { .. })
    }
}

/// Classify free text against the canonical phrase table
///
/// Input is trimmed and lowercased. A phrase matches when the normalized
/// input contains it or it contains the normalized input, so both
/// `"please play music"` and `"play"` resolve to `play music`. The table is
/// scanned in declaration order and the first match wins.
///
/// Pure function; no side effects.
pub fn classify(raw_input: &str) -> ClassificationResult {
    classify_against(PHRASE_TABLE, raw_input)
}

/// Classify against an explicit table (used directly by tests)
fn classify_against(table: &[(&str, &str)], raw_input: &str) -> ClassificationResult {
    let normalized = raw_input.trim().to_lowercase();

    if normalized.is_empty() {
        return ClassificationResult::Empty;
    }

    for (phrase, response) in table {
        if normalized.contains(phrase) || phrase.contains(normalized.as_str()) {
            return ClassificationResult::Matched {
                response: (*response).to_string(),
                matched_phrase: (*phrase).to_string(),
            };
        }
    }

    ClassificationResult::Unmatched {
        normalized_input: normalized,
    }
}
