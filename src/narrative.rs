//! Small text helpers shared by the report renderer.

/// Sentences the questionnaire pre-fills; they carry no information.
const PLACEHOLDER_SENTENCES: [&str; 2] = [
    "no additional gating logic beyond the defined go/no-go criteria.",
    "this solution will not employ a distinct orchestration layer.",
];

/// Joins items as prose: `A`, `A and B`, `A, B and C`. Empty items are
/// skipped; nothing left is `TBD`.
pub fn join_human<S: AsRef<str>>(items: &[S]) -> String {
    let kept: Vec<&str> = items
        .iter()
        .map(AsRef::as_ref)
        .filter(|s| !s.is_empty())
        .collect();
    match kept.as_slice() {
        [] => "TBD".to_string(),
        [only] => only.to_string(),
        [init @ .., last] => format!("{} and {}", init.join(", "), last),
    }
}

/// A markdown bullet, or nothing for blank text.
pub fn md_line(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("- {trimmed}")
    }
}

/// False for blank text, anything still marked TBD, and the stock
/// placeholder sentences.
pub fn is_meaningful(text: &str) -> bool {
    let lowered = text.trim().to_lowercase();
    if lowered.is_empty() || lowered.contains("tbd") {
        return false;
    }
    !PLACEHOLDER_SENTENCES.contains(&lowered.as_str())
}
