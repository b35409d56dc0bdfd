//! Shared helpers

use uuid::Uuid;

/// Lenient UUID parse for query filters.
///
/// Malformed identifiers in search filters must not reach the database;
/// callers treat `None` as "matches nothing" and return empty results.
pub fn parse_uuid_lenient(s: &str) -> Option<Uuid> {
    Uuid::parse_str(s.trim()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_uuid_lenient_valid() {
        let id = Uuid::now_v7();
        assert_eq!(parse_uuid_lenient(&id.to_string()), Some(id));
    }

    #[test]
    fn test_parse_uuid_lenient_trims_whitespace() {
        let id = Uuid::now_v7();
        assert_eq!(parse_uuid_lenient(&format!("  {} ", id)), Some(id));
    }

    #[test]
    fn test_parse_uuid_lenient_malformed() {
        assert_eq!(parse_uuid_lenient("not-a-uuid"), None);
        assert_eq!(parse_uuid_lenient(""), None);
    }
}
