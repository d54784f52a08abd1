pub mod flowchart;
pub mod gantt;
pub mod pie;

/// Strips a leading keyword and returns its trimmed argument, but only at a word boundary:
/// `title X` yields `X`, while `titles : 5` is not a `title` line at all.
pub(crate) fn keyword_arg<'a>(line: &'a str, keyword: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(keyword)?;
    if rest.is_empty() || rest.starts_with(char::is_whitespace) {
        Some(rest.trim())
    } else {
        None
    }
}
