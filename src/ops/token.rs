use crate::model::gesture::{DecodedToken, DropTarget};

/// Separator between the container part and the leaf part of a token.
/// Identifiers must never contain it (see [`is_valid_id`]).
pub const TOKEN_SEPARATOR: &str = "::";

/// Encode a drag-and-drop token: `container` alone, or `container::leaf`.
pub fn encode_token(container_id: &str, leaf_id: Option<&str>) -> String {
    match leaf_id {
        Some(leaf) => format!("{}{}{}", container_id, TOKEN_SEPARATOR, leaf),
        None => container_id.to_string(),
    }
}

/// Decode a token. Never fails: a token without the separator refers to a
/// container itself (e.g. a drop into an empty subsection).
pub fn decode_token(token: &str) -> DecodedToken {
    match token.split_once(TOKEN_SEPARATOR) {
        Some((container, leaf)) => DecodedToken {
            container_id: container.to_string(),
            leaf_id: Some(leaf.to_string()),
        },
        None => DecodedToken {
            container_id: token.to_string(),
            leaf_id: None,
        },
    }
}

/// Whether `id` can be used as a container or unit ID: it must not break
/// token decoding, and unit IDs name `<id>.tex` files, so it must stay a
/// plain file stem.
pub fn is_valid_id(id: &str) -> bool {
    !id.is_empty()
        && !id.contains(TOKEN_SEPARATOR)
        && !id.contains(['/', '\\', '\0'])
        && !id.contains("..")
}

impl DropTarget {
    /// Resolve the "over" token of a drop gesture.
    pub fn from_token(token: &str) -> Self {
        let decoded = decode_token(token);
        DropTarget {
            container_id: decoded.container_id,
            anchor_leaf_id: decoded.leaf_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_container_only() {
        assert_eq!(encode_token("sub-001", None), "sub-001");
    }

    #[test]
    fn test_encode_with_leaf() {
        assert_eq!(encode_token("sub-001", Some("DEF-7")), "sub-001::DEF-7");
    }

    #[test]
    fn test_decode_round_trip() {
        for (c, l) in [("sub-001", Some("DEF-7")), ("sub-002", None), ("a_b", Some("x__y"))] {
            let decoded = decode_token(&encode_token(c, l));
            assert_eq!(decoded.container_id, c);
            assert_eq!(decoded.leaf_id.as_deref(), l);
        }
    }

    #[test]
    fn test_decode_without_separator_is_container() {
        let decoded = decode_token("sub__legacy");
        assert_eq!(decoded.container_id, "sub__legacy");
        assert_eq!(decoded.leaf_id, None);
    }

    #[test]
    fn test_decode_empty_token() {
        let decoded = decode_token("");
        assert_eq!(decoded.container_id, "");
        assert_eq!(decoded.leaf_id, None);
    }

    #[test]
    fn test_decode_splits_on_first_separator() {
        let decoded = decode_token("sub::u::x");
        assert_eq!(decoded.container_id, "sub");
        assert_eq!(decoded.leaf_id.as_deref(), Some("u::x"));
    }

    #[test]
    fn test_is_valid_id() {
        assert!(is_valid_id("DEF-001"));
        assert!(is_valid_id("a:b"));
        assert!(!is_valid_id(""));
        assert!(!is_valid_id("a::b"));
    }

    #[test]
    fn test_ids_that_escape_the_units_dir_are_invalid() {
        assert!(!is_valid_id("../../secret"));
        assert!(!is_valid_id("sub/DEF-1"));
        assert!(!is_valid_id("..\\DEF-1"));
        assert!(!is_valid_id("/etc/passwd"));
        assert!(!is_valid_id(".."));
        assert!(is_valid_id("DEF-1.v2"));
    }

    #[test]
    fn test_drop_target_from_token() {
        assert_eq!(
            DropTarget::from_token("sub-1::u2"),
            DropTarget::anchored("sub-1", "u2")
        );
        assert_eq!(DropTarget::from_token("sub-1"), DropTarget::container("sub-1"));
    }
}
