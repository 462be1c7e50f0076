//! Default operation ids

/// Operation id built from the method and path.
///
/// The method is lowercased and every path segment is title-cased and
/// appended. A templated segment (`{id}`) is prefixed with `By`.
///
/// ```
/// use oasis::default_operation_id;
///
/// assert_eq!(default_operation_id("GET", "/books/{id}"), "getBooksById");
/// ```
#[must_use]
pub fn default_operation_id(method: &str, path: &str) -> String {
    let mut id = method.to_lowercase();
    for part in path.split('/') {
        let name = part.trim_matches(|c| c == '{' || c == '}');
        if name != part {
            id.push_str("By");
        }
        id.push_str(&title_case(name));
    }
    id
}

/// Uppercase the first letter of every word. Words are separated by any
/// character that is not a letter, a digit or `_`.
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for ch in s.chars() {
        if at_word_start {
            out.extend(ch.to_uppercase());
        } else {
            out.push(ch);
        }
        at_word_start = !(ch.is_alphanumeric() || ch == '_');
    }
    out
}
