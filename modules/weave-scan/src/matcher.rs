//! Name → contact resolution.
//!
//! Resolution rules, in order:
//!
//! 1. Case-insensitive full-name equality. Preferred so common first names
//!    don't over-match when better data exists.
//! 2. First-token (first-name) equality, only when no full match exists.
//!
//! At either layer, more than one matching contact is an `Ambiguous` verdict
//! carrying every candidate id — never silently resolved. Zero resolutions is
//! a normal outcome for events with no identifiable social context.

use weave_common::{Friend, MatchedFriend, NameCandidate, NameResolution};

/// Confidence carried on a full-name match.
pub const FULL_NAME_CONFIDENCE: f64 = 1.0;
/// Confidence carried on a first-name-only match.
pub const FIRST_NAME_CONFIDENCE: f64 = 0.75;

fn first_token(name: &str) -> &str {
    name.split_whitespace().next().unwrap_or(name)
}

fn resolve_one(candidate: &NameCandidate, directory: &[Friend]) -> NameResolution {
    let wanted = candidate.text.to_lowercase();

    let full: Vec<&Friend> = directory
        .iter()
        .filter(|f| f.name.to_lowercase() == wanted)
        .collect();
    match full.len() {
        1 => {
            return NameResolution::Unique(MatchedFriend {
                friend_id: full[0].id,
                name: full[0].name.clone(),
                match_confidence: FULL_NAME_CONFIDENCE,
            })
        }
        n if n > 1 => return NameResolution::Ambiguous(full.iter().map(|f| f.id).collect()),
        _ => {}
    }

    let first: Vec<&Friend> = directory
        .iter()
        .filter(|f| first_token(&f.name).to_lowercase() == wanted)
        .collect();
    match first.len() {
        0 => NameResolution::Unmatched,
        1 => NameResolution::Unique(MatchedFriend {
            friend_id: first[0].id,
            name: first[0].name.clone(),
            match_confidence: FIRST_NAME_CONFIDENCE,
        }),
        _ => NameResolution::Ambiguous(first.iter().map(|f| f.id).collect()),
    }
}

/// Resolve every extracted name against the contact directory. Output is
/// parallel to the input, one verdict per candidate.
pub fn resolve_names(
    candidates: &[NameCandidate],
    directory: &[Friend],
) -> Vec<(NameCandidate, NameResolution)> {
    candidates
        .iter()
        .map(|c| (c.clone(), resolve_one(c, directory)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;
    use weave_common::{NamePattern, RelationshipTier};

    fn friend(name: &str) -> Friend {
        Friend {
            id: Uuid::new_v4(),
            name: name.to_string(),
            tier: RelationshipTier::Close,
            relationship_score: 70.0,
        }
    }

    fn candidate(text: &str) -> NameCandidate {
        NameCandidate {
            text: text.to_string(),
            pattern: NamePattern::With,
        }
    }

    #[test]
    fn full_name_match_beats_first_name() {
        let dir = vec![friend("Sarah Chen"), friend("Sarah Miller")];
        let results = resolve_names(&[candidate("Sarah Chen")], &dir);
        match &results[0].1 {
            NameResolution::Unique(m) => {
                assert_eq!(m.name, "Sarah Chen");
                assert_eq!(m.match_confidence, FULL_NAME_CONFIDENCE);
            }
            other => panic!("expected unique match, got {other:?}"),
        }
    }

    #[test]
    fn first_name_match_is_graded_lower() {
        let dir = vec![friend("Tom Okafor"), friend("Maya Lin")];
        let results = resolve_names(&[candidate("Tom")], &dir);
        match &results[0].1 {
            NameResolution::Unique(m) => {
                assert_eq!(m.name, "Tom Okafor");
                assert_eq!(m.match_confidence, FIRST_NAME_CONFIDENCE);
            }
            other => panic!("expected unique match, got {other:?}"),
        }
    }

    #[test]
    fn shared_first_name_is_ambiguous_not_guessed() {
        let dir = vec![friend("Sarah Chen"), friend("Sarah Miller")];
        let results = resolve_names(&[candidate("Sarah")], &dir);
        match &results[0].1 {
            NameResolution::Ambiguous(ids) => assert_eq!(ids.len(), 2),
            other => panic!("expected ambiguous, got {other:?}"),
        }
    }

    #[test]
    fn unknown_name_is_unmatched() {
        let dir = vec![friend("Maya Lin")];
        let results = resolve_names(&[candidate("Greg")], &dir);
        assert_eq!(results[0].1, NameResolution::Unmatched);
    }

    #[test]
    fn empty_candidates_resolve_to_empty() {
        let dir = vec![friend("Maya Lin")];
        assert!(resolve_names(&[], &dir).is_empty());
    }

    #[test]
    fn matching_is_case_insensitive() {
        let dir = vec![friend("maya lin")];
        let results = resolve_names(&[candidate("Maya Lin")], &dir);
        assert!(matches!(results[0].1, NameResolution::Unique(_)));
    }
}
