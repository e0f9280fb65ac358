//! Offset validation and repair for detector-supplied candidates.
//!
//! Detector-reported offsets are untrusted: they may be off by unicode
//! width, whitespace normalization, or plain model error. Silently
//! trusting them would corrupt substitution, so every candidate is
//! checked against the source text and repaired or dropped.

use tracing::{debug, warn};

use crate::policy;
use crate::types::{CandidateEntity, Entity};

/// Validate a single candidate against the source text.
///
/// Accepts the candidate as-is when the reported span matches, repairs
/// it via substring search otherwise, and returns `None` when the
/// candidate text does not occur in the source at all (non-fatal to
/// the batch).
///
/// When the candidate text occurs more than once, repair picks the
/// occurrence nearest the detector-reported offset rather than blindly
/// taking the first match; repeated PII elsewhere in the text then
/// keeps its own offsets.
pub fn validate(source: &str, candidate: &CandidateEntity) -> Option<Entity> {
    if candidate.text.is_empty() || candidate.start >= candidate.end {
        warn!(
            text = %candidate.text,
            start = candidate.start,
            end = candidate.end,
            "dropping candidate with degenerate span"
        );
        return None;
    }

    // `get` rejects out-of-range and non-boundary offsets without panicking.
    let span_matches = source
        .get(candidate.start..candidate.end)
        .map(|span| span == candidate.text)
        .unwrap_or(false);

    let (start, end) = if span_matches {
        (candidate.start, candidate.end)
    } else {
        let (start, end) = nearest_occurrence(source, &candidate.text, candidate.start)?;
        debug!(
            text = %candidate.text,
            reported = candidate.start,
            corrected = start,
            "corrected entity offsets"
        );
        (start, end)
    };

    Some(Entity {
        start,
        end,
        label: candidate.label.clone(),
        text: candidate.text.clone(),
        confidence: candidate.confidence,
        sensitivity_tier: policy::classify(&candidate.label),
    })
}

/// Validate a batch of candidates and de-overlap the survivors.
///
/// The result is sorted by ascending start. When two validated spans
/// overlap the earlier one wins; substitution assumes disjoint spans.
pub fn validate_all(source: &str, candidates: &[CandidateEntity]) -> Vec<Entity> {
    let mut entities: Vec<Entity> = candidates
        .iter()
        .filter_map(|candidate| {
            let entity = validate(source, candidate);
            if entity.is_none() {
                warn!(text = %candidate.text, "dropping candidate: text not found in source");
            }
            entity
        })
        .collect();

    entities.sort_by_key(|e| e.start);

    let mut last_end = 0usize;
    entities.retain(|entity| {
        if entity.start >= last_end {
            last_end = entity.end;
            true
        } else {
            warn!(
                text = %entity.text,
                start = entity.start,
                "dropping entity overlapping an earlier span"
            );
            false
        }
    });

    entities
}

/// Find the occurrence of `needle` whose start is closest to `near`.
fn nearest_occurrence(source: &str, needle: &str, near: usize) -> Option<(usize, usize)> {
    source
        .match_indices(needle)
        .map(|(start, matched)| (start, start + matched.len()))
        .min_by_key(|(start, _)| start.abs_diff(near))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(text: &str, start: usize, end: usize) -> CandidateEntity {
        CandidateEntity {
            text: text.to_string(),
            label: "EMAIL".to_string(),
            start,
            end,
            confidence: 0.9,
        }
    }

    #[test]
    fn test_exact_span_accepted() {
        let source = "Contact alice@x.com at 555-1234.";
        let entity = validate(source, &candidate("alice@x.com", 8, 19)).unwrap();
        assert_eq!((entity.start, entity.end), (8, 19));
        assert_eq!(&source[entity.start..entity.end], entity.text);
    }

    #[test]
    fn test_bad_offsets_repaired() {
        let source = "Contact alice@x.com at 555-1234.";
        let entity = validate(source, &candidate("alice@x.com", 10, 21)).unwrap();
        assert_eq!((entity.start, entity.end), (8, 19));
        assert_eq!(&source[entity.start..entity.end], entity.text);
    }

    #[test]
    fn test_repair_prefers_nearest_occurrence() {
        let source = "a@b.com said hi, then a@b.com left";
        // Reported offset points near the second occurrence.
        let entity = validate(source, &candidate("a@b.com", 20, 27)).unwrap();
        assert_eq!(entity.start, 22);
        assert_eq!(&source[entity.start..entity.end], "a@b.com");
    }

    #[test]
    fn test_missing_text_dropped() {
        let source = "No PII here.";
        assert!(validate(source, &candidate("bob@y.com", 0, 9)).is_none());
    }

    #[test]
    fn test_degenerate_span_dropped() {
        let source = "text";
        assert!(validate(source, &candidate("", 0, 0)).is_none());
        assert!(validate(source, &candidate("text", 3, 1)).is_none());
    }

    #[test]
    fn test_non_boundary_offsets_do_not_panic() {
        let source = "héllo a@b.com";
        // Offset 2 is inside the 'é' byte pair; repair should still find it.
        let entity = validate(source, &candidate("a@b.com", 2, 9)).unwrap();
        assert_eq!(&source[entity.start..entity.end], "a@b.com");
    }

    #[test]
    fn test_validate_all_drops_overlaps() {
        let source = "Contact alice@x.com now";
        let candidates = vec![
            candidate("alice@x.com", 8, 19),
            candidate("alice@x", 8, 15), // nested in the first span
        ];
        let entities = validate_all(source, &candidates);
        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].text, "alice@x.com");
    }

    #[test]
    fn test_validate_all_offset_invariant() {
        let source = "Email a@b.com, phone 555-1234, ip 10.0.0.1";
        let candidates = vec![
            candidate("555-1234", 0, 8),  // wrong offsets
            candidate("a@b.com", 6, 13),  // right offsets
            candidate("10.0.0.1", 99, 107), // out of range
        ];
        let entities = validate_all(source, &candidates);
        assert_eq!(entities.len(), 3);
        for entity in &entities {
            assert_eq!(&source[entity.start..entity.end], entity.text);
        }
    }
}
