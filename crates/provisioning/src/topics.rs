//! Normalisation of free-text theme labels into platform topic names.
//!
//! Topics must match `^[a-z0-9][a-z0-9-]*$` and be at most 50 characters.

/// Maximum length of a topic name.
pub const MAX_TOPIC_LEN: usize = 50;

/// Normalises free-text labels into topic names, preserving input order.
///
/// Each label is lower-cased and trimmed, every character outside
/// `[a-z0-9-]` becomes `-`, edge hyphens are stripped, and the result is cut
/// to [`MAX_TOPIC_LEN`]. Hyphens exposed at the end by the cut are stripped
/// too, which keeps the function idempotent. Labels that end up empty are
/// dropped.
pub fn sanitize_topics<I, S>(labels: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    labels
        .into_iter()
        .filter_map(|label| {
            let topic = sanitize_one(label.as_ref());
            if is_valid_topic(&topic) {
                Some(topic)
            } else {
                tracing::debug!(label = label.as_ref(), "dropping label that is not a valid topic");
                None
            }
        })
        .collect()
}

/// Splits a comma-separated theme string and sanitises each part.
pub fn topics_from_theme(theme: &str) -> Vec<String> {
    sanitize_topics(theme.split(','))
}

/// `true` if `topic` already satisfies the topic grammar.
pub fn is_valid_topic(topic: &str) -> bool {
    let mut chars = topic.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    topic.len() <= MAX_TOPIC_LEN
        && (first.is_ascii_lowercase() || first.is_ascii_digit())
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

fn sanitize_one(label: &str) -> String {
    let replaced: String = label
        .to_lowercase()
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' {
                c
            } else {
                '-'
            }
        })
        .collect();
    // Only ASCII remains, so byte slicing is char-safe.
    let stripped = replaced.trim_matches('-');
    let cut = &stripped[..stripped.len().min(MAX_TOPIC_LEN)];
    cut.trim_end_matches('-').to_string()
}
