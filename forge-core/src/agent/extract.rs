//! Payload extraction from fenced Markdown code blocks

const FENCE: &str = "```";

/// Extract the first fenced block tagged with `lang`
///
/// The text is split on the opening fence (e.g. "```python"); the first
/// segment after it that contains a closing fence yields the payload, trimmed.
/// If there is no opening fence, or no segment is closed, the original text
/// is returned unchanged.
pub fn extract_code(text: &str, lang: &str) -> String {
    let opening = format!("{}{}", FENCE, lang);

    text.split(opening.as_str())
        .skip(1)
        .find_map(|part| part.find(FENCE).map(|end| part[..end].trim().to_string()))
        .unwrap_or_else(|| text.to_string())
}

/// Extract every fenced block tagged with `lang`, joined by blank lines
///
/// Each block is trimmed and followed by "\n\n". Returns the original text
/// unchanged if nothing was extracted.
pub fn extract_all_code(text: &str, lang: &str) -> String {
    let opening = format!("{}{}", FENCE, lang);

    let extracted: String = text
        .split(opening.as_str())
        .skip(1)
        .filter_map(|part| part.find(FENCE).map(|end| part[..end].trim()))
        .map(|block| format!("{}\n\n", block))
        .collect();

    if extracted.is_empty() {
        text.to_string()
    } else {
        extracted
    }
}
