use ulid::Ulid;

pub fn new_id() -> String {
    Ulid::new().to_string()
}

/// Apache-style blank check: empty or whitespace only.
pub fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}
