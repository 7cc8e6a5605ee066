use regex::Regex;

/// Extract the content of the first `<answer>...</answer>` span, trimmed.
/// Text without delimiters is returned unchanged. Only the first span is
/// used; later spans are ignored.
pub fn extract_answer(text: &str) -> &str {
    let pattern = Regex::new(r"(?s)<answer>(.*?)</answer>").unwrap();
    match pattern.captures(text).and_then(|caps| caps.get(1)) {
        Some(inner) => inner.as_str().trim(),
        None => text,
    }
}
