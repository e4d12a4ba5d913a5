use crate::models::{Category, TriageDecision};

/// Keyword to category, scanned in order. The first keyword found wins.
pub const ROUTES: [(&str, Category); 3] = [
    ("hotel", Category::Hotels),
    ("transport", Category::Transport),
    ("food", Category::Food),
];

pub fn normalize_category(raw: &str) -> String {
    raw.trim().to_lowercase()
}

pub fn route_category(raw: &str) -> TriageDecision {
    let normalized = normalize_category(raw);
    let category = ROUTES
        .iter()
        .find(|(keyword, _)| normalized.contains(keyword))
        .map(|(_, category)| *category);

    TriageDecision {
        raw: raw.to_string(),
        normalized,
        category,
    }
}
