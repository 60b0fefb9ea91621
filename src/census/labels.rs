//! Label hygiene for category names coming from legacy spreadsheets
//!
//! Old worksheet exports mangle accented characters in a consistent way. Known
//! substitutions are fixed up; anything else outside the allow-list is a hard
//! error so the fix-up table gets extended instead of labels being corrupted.

use crate::core::error::{Result, SynthError};

/// Mangled character -> intended character
const ENCODING_FIXES: [(char, char); 9] = [
    ('·', 'á'),
    ('È', 'é'),
    ('Ì', 'í'),
    ('Û', 'ó'),
    ('˙', 'ú'),
    ('Ò', 'ñ'),
    ('¸', 'ü'),
    ('∞', 'º'),
    ('—', 'Ñ'),
];

/// Punctuation allowed in labels besides alphanumerics
const ALLOWED_PUNCTUATION: &str = " .'-()/";

/// Repair known encoding damage and reject unrecognized characters
pub fn fix_encoding(text: &str) -> Result<String> {
    let fixed: String = text
        .trim()
        .chars()
        .map(|c| {
            ENCODING_FIXES
                .iter()
                .find(|(bad, _)| *bad == c)
                .map(|(_, good)| *good)
                .unwrap_or(c)
        })
        .collect();

    for c in fixed.chars() {
        let allowed = c.is_alphanumeric()
            || ALLOWED_PUNCTUATION.contains(c)
            || ENCODING_FIXES.iter().any(|(_, good)| *good == c);
        if !allowed {
            return Err(SynthError::UnrecognizedCharacter {
                character: c,
                label: fixed.clone(),
            });
        }
    }

    Ok(fixed)
}

/// Normalize a category label: `"35.0"` becomes `"35"` and runs of spaces
/// collapse to one
pub fn format_category(label: &str) -> String {
    let chars: Vec<char> = label.chars().collect();
    let mut out = String::with_capacity(label.len());
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c == ' ' {
            if !out.ends_with(' ') {
                out.push(' ');
            }
            i += 1;
            continue;
        }
        out.push(c);
        // a digit run followed by ".0" drops the spurious decimal
        if c.is_ascii_digit()
            && chars.get(i + 1) == Some(&'.')
            && chars.get(i + 2) == Some(&'0')
        {
            i += 3;
            continue;
        }
        i += 1;
    }
    out
}

/// Drop the leading `"<condition>."` path of a column name
pub fn strip_condition(column: &str) -> &str {
    match column.find('.') {
        Some(idx) => &column[idx + 1..],
        None => column,
    }
}

/// Clean a raw column header into the form used for lookups
pub fn clean_column(raw: &str) -> Result<String> {
    Ok(format_category(&fix_encoding(raw)?))
}
