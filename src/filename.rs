//! Output file naming for downloaded cases.

use crate::archive::CaseDetail;

/// Placeholder used when a title sanitizes to nothing ("judgment").
pub const FALLBACK_NAME: &str = "판례";

/// Default character budget for a sanitized name.
pub const MAX_NAME_CHARS: usize = 180;

const RESERVED: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Make `text` safe to use as a file name on common filesystems.
///
/// Reserved characters become `_`, whitespace runs collapse to a single
/// space, and the result is cut to `max_len` characters. Empty input (or
/// input that ends up empty) yields [`FALLBACK_NAME`].
pub fn sanitize_filename(text: &str, max_len: usize) -> String {
    let text = if text.is_empty() { FALLBACK_NAME } else { text };
    let replaced: String = text
        .chars()
        .map(|c| if RESERVED.contains(&c) { '_' } else { c })
        .collect();
    let collapsed = replaced.split_whitespace().collect::<Vec<_>>().join(" ");
    let truncated: String = collapsed.chars().take(max_len).collect();
    if truncated.is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        truncated
    }
}

/// Build the file stem for a case: `<date>_<case no>_<title>_<id>`,
/// skipping empty parts. The caller appends `.pdf`.
///
/// The title is always present (possibly as [`FALLBACK_NAME`]), so the
/// result is never empty.
pub fn resolve_filename(case_id: &str, detail: &CaseDetail) -> String {
    let meta = detail.meta.clone().unwrap_or_default();
    let title = sanitize_filename(meta.title.as_deref().unwrap_or(""), MAX_NAME_CHARS);
    let date = meta.registered_on.unwrap_or_default();
    let case_no = meta.case_number.unwrap_or_default();

    let parts: Vec<&str> = [date.as_str(), case_no.as_str(), title.as_str(), case_id]
        .into_iter()
        .filter(|p| !p.is_empty())
        .collect();
    sanitize_filename(&parts.join("_"), MAX_NAME_CHARS)
}
