//! Text normalization and phrase segmentation for extracted resume text.

/// Characters that resumes use as visual bullets or column separators.
const BULLET_CHARS: &[char] = &['•', '|'];

/// Characters that end a candidate phrase.
const PHRASE_SEPARATORS: &[char] = &['\n', ',', '.', ';', ':'];

const MIN_PHRASE_CHARS: usize = 2;

/// Replaces bullets with line breaks, collapses whitespace runs to one space, lower-cases.
///
/// Whitespace collapsing also folds the line breaks, so bullets end up as plain spaces.
pub fn clean_text(raw: &str) -> String {
    let debulleted: String = raw
        .chars()
        .map(|c| if BULLET_CHARS.contains(&c) { '\n' } else { c })
        .collect();

    let mut cleaned = String::with_capacity(debulleted.len());
    let mut in_whitespace = false;
    for c in debulleted.chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                cleaned.push(' ');
            }
            in_whitespace = true;
        } else {
            cleaned.push(c);
            in_whitespace = false;
        }
    }

    cleaned.to_lowercase()
}

/// Splits cleaned text into trimmed phrases of at least two characters, in source order.
pub fn split_phrases(cleaned: &str) -> Vec<String> {
    cleaned
        .split(PHRASE_SEPARATORS)
        .map(str::trim)
        .filter(|p| p.chars().count() >= MIN_PHRASE_CHARS)
        .map(String::from)
        .collect()
}

/// `clean_text` followed by `split_phrases`. Empty input yields no phrases.
pub fn phrases(raw: &str) -> Vec<String> {
    split_phrases(&clean_text(raw))
}
