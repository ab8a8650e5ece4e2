use regex::Regex;
use std::sync::LazyLock;

/// One alternative per token class: letter run, ASCII digit run, whitespace
/// run, run of everything else. The classes are disjoint and together cover
/// every character, so a scan partitions the input exactly.
static TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\p{L}+|[0-9]+|\s+|[^\p{L}0-9\s]+").expect("invalid token pattern")
});

/// Splits `text` into maximal same-class runs, in source order. Joining the
/// tokens reproduces the input. Each call scans with its own cursor.
pub fn tokenize(text: &str) -> impl Iterator<Item = &str> {
    TOKEN_RE.find_iter(text).map(|found| found.as_str())
}
