/// One autocomplete entry offered to the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    pub text: String,
    pub description: String,
}

impl Suggestion {
    pub fn new(text: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            description: description.into(),
        }
    }
}

/// Suggestions whose text starts with `prefix`. An empty prefix keeps everything.
pub fn filter_has_prefix<'a>(
    suggestions: &'a [Suggestion],
    prefix: &str,
    ignore_case: bool,
) -> Vec<&'a Suggestion> {
    if prefix.is_empty() {
        return suggestions.iter().collect();
    }

    let prefix = if ignore_case {
        prefix.to_lowercase()
    } else {
        prefix.to_string()
    };

    suggestions
        .iter()
        .filter(|s| {
            if ignore_case {
                s.text.to_lowercase().starts_with(&prefix)
            } else {
                s.text.starts_with(&prefix)
            }
        })
        .collect()
}

/// The word that ends at byte offset `cursor`, i.e. everything after the last
/// whitespace before it.
pub fn word_before_cursor(text: &str, cursor: usize) -> &str {
    let before = &text[..cursor.min(text.len())];
    match before.rfind(char::is_whitespace) {
        Some(idx) => {
            let ws_len = before[idx..].chars().next().map_or(1, char::len_utf8);
            &before[idx + ws_len..]
        }
        None => before,
    }
}
