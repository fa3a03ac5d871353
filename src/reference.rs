//! Reference vocabulary shared by every other module.
//!
//! A reference is a string of the form `@<token>` where `<token>` is a full
//! identity, an identity prefix, or an alias. This module only normalizes and
//! formats tokens; resolution against a loaded entity set lives in
//! [`crate::index`].
//!
//! Matching is case-sensitive and no minimum prefix length is enforced; both
//! are conservative defaults and candidates for a future configuration point.

/// Full length of a canonical identity string (a ULID rendering).
pub const IDENTITY_LEN: usize = 26;

/// Number of leading identity characters used for display.
pub const SHORT_ID_LEN: usize = 8;

/// Strip one leading `@` from a reference token, if present.
pub fn normalize_ref(reference: &str) -> &str {
    reference.strip_prefix('@').unwrap_or(reference)
}

/// Leading display substring of an identity.
///
/// Does not guarantee uniqueness by itself; callers pair it with an alias
/// when one is available.
pub fn short_id(identity: &str) -> &str {
    identity.get(..SHORT_ID_LEN).unwrap_or(identity)
}

/// Preferred display reference for an entity: its first alias when one is
/// declared, otherwise the short identity, always `@`-prefixed.
pub fn display_ref(identity: &str, aliases: &[String]) -> String {
    match aliases.iter().find(|a| !a.is_empty()) {
        Some(alias) => format!("@{}", alias),
        None => format!("@{}", short_id(identity)),
    }
}

/// Returns true if the token has the shape of a full identity.
///
/// Shape only: 26 characters from the Crockford base32 alphabet. A token
/// passing this check may still fail to resolve.
pub fn looks_like_identity(token: &str) -> bool {
    token.len() == IDENTITY_LEN
        && token
            .bytes()
            .all(|b| b.is_ascii_digit() || (b.is_ascii_alphabetic() && !matches!(b, b'I' | b'L' | b'O' | b'U' | b'i' | b'l' | b'o' | b'u')))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_single_at() {
        assert_eq!(normalize_ref("@auth-api"), "auth-api");
        assert_eq!(normalize_ref("auth-api"), "auth-api");
        // Only one leading @ is syntax; the rest is the token.
        assert_eq!(normalize_ref("@@weird"), "@weird");
    }

    #[test]
    fn test_normalize_empty() {
        assert_eq!(normalize_ref(""), "");
        assert_eq!(normalize_ref("@"), "");
    }

    #[test]
    fn test_short_id_truncates() {
        assert_eq!(short_id("01ARZ3NDEKTSV4RRFFQ69G5FAV"), "01ARZ3ND");
    }

    #[test]
    fn test_short_id_short_input() {
        assert_eq!(short_id("abc"), "abc");
        assert_eq!(short_id(""), "");
    }

    #[test]
    fn test_display_ref_prefers_alias() {
        let aliases = vec!["auth-api".to_string()];
        assert_eq!(
            display_ref("01ARZ3NDEKTSV4RRFFQ69G5FAV", &aliases),
            "@auth-api"
        );
    }

    #[test]
    fn test_display_ref_falls_back_to_short_id() {
        assert_eq!(
            display_ref("01ARZ3NDEKTSV4RRFFQ69G5FAV", &[]),
            "@01ARZ3ND"
        );
        // Empty alias strings do not count as aliases.
        let empty = vec![String::new()];
        assert_eq!(
            display_ref("01ARZ3NDEKTSV4RRFFQ69G5FAV", &empty),
            "@01ARZ3ND"
        );
    }

    #[test]
    fn test_looks_like_identity() {
        assert!(looks_like_identity("01ARZ3NDEKTSV4RRFFQ69G5FAV"));
        assert!(!looks_like_identity("01ARZ3ND"));
        assert!(!looks_like_identity("0LARZ3NDEKTSV4RRFFQ69G5FAV")); // L excluded
    }
}
