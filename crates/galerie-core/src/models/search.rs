use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::media::MediaRecord;
use crate::similarity::round4;

/// A candidate with its full-precision similarity score, as returned by
/// `MediaRepository::search_top_k`.
#[derive(Debug, Clone)]
pub struct ScoredRecord {
    pub record: MediaRecord,
    pub similarity: f32,
}

/// Presentation form of one search result; similarity is rounded to four
/// decimal digits here and nowhere earlier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: Uuid,
    pub locator: String,
    pub similarity: f32,
}

impl From<&ScoredRecord> for SearchHit {
    fn from(scored: &ScoredRecord) -> Self {
        SearchHit {
            id: scored.record.id,
            locator: scored.record.locator.clone(),
            similarity: round4(scored.similarity),
        }
    }
}

/// Outcome of a caption search. An owner with zero stored images yields
/// `NoCandidates`, which is distinguishable from a ranked list that happens
/// to be short; the caller decides whether that is an error or an empty
/// success.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SearchOutcome {
    NoCandidates,
    Ranked(Vec<SearchHit>),
}

/// One entry of a gallery listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListEntry {
    pub id: Uuid,
    pub locator: String,
}

/// Gallery listing with its count, mirroring the upload response shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListSummary {
    pub count: usize,
    pub items: Vec<ListEntry>,
}

/// Result of one committed upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommittedUpload {
    pub id: Uuid,
    pub locator: String,
}

/// A failed batch item, itemized by position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchItemFailure {
    pub index: usize,
    pub error: String,
}

/// Per-item outcome of a batch upload. A failure on item k never rolls back
/// items committed before it; the summary is always returned in place of a
/// single pass/fail flag.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchSummary {
    pub uploaded: Vec<CommittedUpload>,
    pub failed: Vec<BatchItemFailure>,
}

impl BatchSummary {
    pub fn uploaded_count(&self) -> usize {
        self.uploaded.len()
    }

    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }
}

/// Result of an owner purge. Blob cleanup is best-effort; `blob_failures`
/// counts blobs left orphaned after the metadata deletion committed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PurgeReport {
    pub records_deleted: u64,
    pub blobs_deleted: usize,
    pub blob_failures: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record(similarity: f32) -> ScoredRecord {
        ScoredRecord {
            record: MediaRecord {
                id: Uuid::new_v4(),
                owner_id: Uuid::new_v4(),
                locator: "http://localhost:3000/gallery/a.jpg".to_string(),
                blob_id: "gallery/a.jpg".to_string(),
                embedding: vec![0.0; 4],
                created_at: Utc::now(),
            },
            similarity,
        }
    }

    #[test]
    fn test_hit_rounds_similarity_to_four_digits() {
        let scored = record(0.876_543_2);
        let hit = SearchHit::from(&scored);
        assert_eq!(hit.similarity, 0.8765);
        // Full precision is preserved on the scored record itself.
        assert_eq!(scored.similarity, 0.876_543_2);
    }

    #[test]
    fn test_no_candidates_is_not_an_empty_ranking() {
        assert_ne!(SearchOutcome::NoCandidates, SearchOutcome::Ranked(vec![]));
    }
}
