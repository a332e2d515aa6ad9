/// Upper bound, in characters, for any exported text field.
pub const MAX_TEXT_CHARS: usize = 255;

const ELLIPSIS: &str = "...";

/// Trims surrounding whitespace and caps the result at [`MAX_TEXT_CHARS`]
/// characters, replacing the tail with `...` when it is cut.
pub fn sanitize_text(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() <= MAX_TEXT_CHARS {
        return trimmed.to_string();
    }

    let mut truncated: String = trimmed
        .chars()
        .take(MAX_TEXT_CHARS - ELLIPSIS.len())
        .collect();
    truncated.push_str(ELLIPSIS);
    truncated
}
