use std::sync::LazyLock;

use regex::Regex;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
        .expect("email pattern is a valid regex")
});

/// Shape check only. Surrounding whitespace is ignored; nothing else is
/// normalized.
pub fn is_well_formed(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email.trim())
}
