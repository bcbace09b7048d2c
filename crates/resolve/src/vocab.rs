//! Case-insensitive vocabulary matching over folded (trimmed, lower-cased) text.
//! Blank vocabulary entries never match.

fn entries(vocab: &[String]) -> impl Iterator<Item = String> + '_ {
    vocab
        .iter()
        .map(|v| v.trim().to_lowercase())
        .filter(|v| !v.is_empty())
}

pub(crate) fn contains_any(folded: &str, vocab: &[String]) -> bool {
    entries(vocab).any(|v| folded.contains(&v))
}

pub(crate) fn equals_any(folded: &str, vocab: &[String]) -> bool {
    entries(vocab).any(|v| folded == v)
}

pub(crate) fn starts_with_any(folded: &str, vocab: &[String]) -> bool {
    entries(vocab).any(|v| folded.starts_with(&v))
}
