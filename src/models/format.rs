//! Class format naming rules.
//!
//! Formats are free-form names from the studio's booking system
//! ("Studio Barre 57 (Express)", "Studio Recovery"). Duration and
//! family membership are derived from the name.

/// Separator marking parametrized sub-variants ("Studio FIT - Outdoor").
pub const QUALIFIER_SEPARATOR: char = '-';

/// Duration in minutes: express and foundations run 45, recovery 30,
/// everything else 60.
pub fn duration_minutes(format: &str) -> u16 {
    let lower = format.to_lowercase();
    if lower.contains("express") || lower.contains("foundations") {
        45
    } else if lower.contains("recovery") {
        30
    } else {
        60
    }
}

/// Format names compare case-insensitively, ignoring surrounding whitespace.
pub fn same_format(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

/// Whether the format belongs to a family named by `pattern`.
///
/// Case-insensitive substring match with whitespace removed, so
/// "powerCycle" covers "Studio Power Cycle" and "Studio powerCycle Plus".
pub fn matches_family(format: &str, pattern: &str) -> bool {
    let squash = |s: &str| -> String {
        s.chars()
            .filter(|c| !c.is_whitespace())
            .flat_map(char::to_lowercase)
            .collect()
    };
    let pattern = squash(pattern);
    !pattern.is_empty() && squash(format).contains(&pattern)
}

/// Whether the format is an express variant.
pub fn is_express(format: &str) -> bool {
    format.to_lowercase().contains("express")
}

/// Whether the format is a recovery class.
pub fn is_recovery(format: &str) -> bool {
    format.to_lowercase().contains("recovery")
}

/// Whether the format counts toward the Barre 57 quota (including Express).
pub fn is_barre_57(format: &str) -> bool {
    format.contains("Barre 57")
}

/// Hosted classes are private bookings and never enter the history.
pub fn is_hosted(format: &str) -> bool {
    format.to_lowercase().contains("hosted")
}

/// Whether the format name carries a qualifier sub-variant.
pub fn has_qualifier(format: &str) -> bool {
    format.contains(QUALIFIER_SEPARATOR)
}
