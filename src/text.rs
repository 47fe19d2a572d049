//! Label text normalization shared by question and option extraction

/// Maximum length of a question label
pub const QUESTION_CAP: usize = 150;

/// Maximum length of an option label
pub const OPTION_CAP: usize = 100;

/// Minimum length for a candidate to count as a usable label
pub const MIN_LABEL_LEN: usize = 2;

fn is_marker(c: char) -> bool {
    c == ':' || c == '*' || c.is_whitespace()
}

/// Normalize raw markup text into a display label.
///
/// Whitespace runs collapse to one space, required-field asterisks are
/// dropped, leading and trailing colons are stripped, and the result is cut
/// to `cap` characters. Applying it twice yields the same string.
pub fn clean_label(raw: &str, cap: usize) -> String {
    let collapsed = raw
        .split(|c: char| c.is_whitespace() || c == '*')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    let trimmed = collapsed.trim_matches(is_marker);
    if trimmed.chars().count() <= cap {
        return trimmed.to_string();
    }

    let capped: String = trimmed.chars().take(cap).collect();
    capped.trim_matches(is_marker).to_string()
}

/// Character count of a cleaned label
pub fn label_len(label: &str) -> usize {
    label.chars().count()
}

/// Turn an identifier such as `applicant_firstName` into `Applicant First Name`
pub fn humanize_identifier(ident: &str) -> String {
    let mut words: Vec<String> = Vec::new();

    for chunk in ident.split(|c: char| matches!(c, '_' | '-' | '.' | '[' | ']') || c.is_whitespace()) {
        let mut current = String::new();
        let mut prev: Option<char> = None;

        for c in chunk.chars() {
            let boundary = match prev {
                Some(p) => {
                    (p.is_lowercase() && c.is_uppercase())
                        || (p.is_alphabetic() && c.is_ascii_digit())
                        || (p.is_ascii_digit() && c.is_alphabetic())
                }
                None => false,
            };
            if boundary && !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            current.push(c);
            prev = Some(c);
        }

        if !current.is_empty() {
            words.push(current);
        }
    }

    words
        .iter()
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

const PLACEHOLDER_TEXTS: &[&str] = &[
    "select",
    "select one",
    "select an option",
    "please select",
    "please select one",
    "please choose",
    "choose",
    "choose one",
    "none selected",
];

const PLACEHOLDER_VALUES: &[&str] = &["", "-1", "select", "--select--", "please select"];

/// Whether a choice is a "Select..." style placeholder rather than an answer
pub fn is_placeholder_choice(text: &str, value: &str) -> bool {
    let value = value.trim().to_lowercase();
    if PLACEHOLDER_VALUES.contains(&value.as_str()) {
        return true;
    }

    let normalized = text
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    normalized.is_empty()
        || PLACEHOLDER_TEXTS.contains(&normalized.as_str())
        || normalized.starts_with("please select ")
        || normalized.starts_with("please choose ")
}

/// Remove whole-word occurrences of the given option labels from a candidate question
pub fn strip_option_labels(candidate: &str, option_labels: &[String]) -> String {
    let mut result = candidate.to_string();
    // Longest first so "Not Married" is removed before "Married"
    let mut labels: Vec<&String> = option_labels.iter().filter(|l| !l.is_empty()).collect();
    labels.sort_by_key(|l| std::cmp::Reverse(l.len()));

    for label in labels {
        result = remove_word(&result, label);
    }
    result
}

fn remove_word(haystack: &str, word: &str) -> String {
    let mut out = String::with_capacity(haystack.len());
    let mut rest = haystack;

    while let Some(pos) = rest.find(word) {
        let before = rest[..pos].chars().next_back();
        let after = rest[pos + word.len()..].chars().next();
        let bounded = !before.is_some_and(char::is_alphanumeric)
            && !after.is_some_and(char::is_alphanumeric);

        out.push_str(&rest[..pos]);
        if bounded {
            out.push(' ');
        } else {
            out.push_str(word);
        }
        rest = &rest[pos + word.len()..];
    }

    out.push_str(rest);
    out
}

/// First sentence in `text` that ends with a question mark
pub fn first_question_sentence(text: &str) -> Option<&str> {
    let end = text.find('?')?;
    let head = &text[..end];
    let start = head
        .rfind(['.', '!', '?', ':', '\n', '*'])
        .map(|i| i + 1)
        .unwrap_or(0);
    let sentence = text[start..=end].trim();
    if sentence.len() > 1 { Some(sentence) } else { None }
}

#[cfg(test)]
#[path = "text_test.rs"]
mod text_test;
