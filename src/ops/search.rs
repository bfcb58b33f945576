use regex::Regex;
use serde::Serialize;

use crate::model::outline::Collection;
use crate::ops::token::encode_token;

/// What a search hit refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HitKind {
    Section,
    Subsection,
    Unit,
}

/// A search hit, with the drag token that addresses it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    pub kind: HitKind,
    pub id: String,
    /// Section name, plus subsection name for units
    pub path: Vec<String>,
    pub token: String,
}

/// Match `re` against section/subsection IDs and names and against unit IDs,
/// in outline order.
pub fn search_outline(collection: &Collection, re: &Regex) -> Vec<SearchHit> {
    let mut hits = Vec::new();
    for section in &collection.sections {
        if re.is_match(&section.id) || re.is_match(&section.name) {
            hits.push(SearchHit {
                kind: HitKind::Section,
                id: section.id.clone(),
                path: vec![section.name.clone()],
                token: encode_token(&section.id, None),
            });
        }
        for sub in &section.subsections {
            if re.is_match(&sub.id) || re.is_match(&sub.name) {
                hits.push(SearchHit {
                    kind: HitKind::Subsection,
                    id: sub.id.clone(),
                    path: vec![section.name.clone(), sub.name.clone()],
                    token: encode_token(&sub.id, None),
                });
            }
            for unit in sub.unit_ids.iter().filter(|u| re.is_match(u)) {
                hits.push(SearchHit {
                    kind: HitKind::Unit,
                    id: unit.clone(),
                    path: vec![section.name.clone(), sub.name.clone()],
                    token: encode_token(&sub.id, Some(unit)),
                });
            }
        }
    }
    hits
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::outline::{Section, Subsection};

    fn sample() -> Collection {
        let mut defs = Subsection::new("sub-001", "Definitions");
        defs.unit_ids = vec!["DEF-1".into(), "THEO-1".into()];
        let mut sec = Section::new("sec-001", "Groups");
        sec.subsections = vec![defs, Subsection::new("sub-002", "Examples")];
        Collection::new(vec![sec])
    }

    #[test]
    fn test_unit_hits_carry_tokens() {
        let re = Regex::new("^DEF").unwrap();
        let hits = search_outline(&sample(), &re);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].kind, HitKind::Unit);
        assert_eq!(hits[0].token, "sub-001::DEF-1");
        assert_eq!(hits[0].path, vec!["Groups", "Definitions"]);
    }

    #[test]
    fn test_container_hits() {
        let re = Regex::new("(?i)examples|groups").unwrap();
        let hits = search_outline(&sample(), &re);
        let kinds: Vec<_> = hits.iter().map(|h| (h.kind, h.id.as_str())).collect();
        assert_eq!(
            kinds,
            vec![(HitKind::Section, "sec-001"), (HitKind::Subsection, "sub-002")]
        );
        assert_eq!(hits[1].token, "sub-002");
    }

    #[test]
    fn test_no_hits() {
        let re = Regex::new("zzz").unwrap();
        assert!(search_outline(&sample(), &re).is_empty());
    }
}
