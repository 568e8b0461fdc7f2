//! Point summaries and the attention ranking.
//!
//! Nothing here is stored; every figure is derived from the case records
//! at read time.

use bk_core::repository::StudentTally;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Minimum number of violations before a student is flagged.
pub const ATTENTION_THRESHOLD: u64 = 3;
pub const ATTENTION_REASON: &str = "multiple violations recorded";

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PointSummary {
    pub achievement_total: i64,
    pub violation_total: i64,
}

impl PointSummary {
    pub fn net(&self) -> i64 {
        self.achievement_total + self.violation_total
    }
}

/// A student selected by an [`AttentionPolicy`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttentionCandidate {
    pub student_id: Uuid,
    pub violation_count: u64,
    pub reason: String,
}

/// Decides which students need follow-up and in what order.
pub trait AttentionPolicy: Send + Sync {
    fn rank(&self, tallies: Vec<StudentTally>, limit: usize) -> Vec<AttentionCandidate>;
}

/// Flags students with at least [`ATTENTION_THRESHOLD`] violations,
/// highest count first.
#[derive(Debug, Clone, Copy, Default)]
pub struct ViolationCountPolicy;

impl AttentionPolicy for ViolationCountPolicy {
    fn rank(&self, mut tallies: Vec<StudentTally>, limit: usize) -> Vec<AttentionCandidate> {
        tallies.retain(|t| t.violation_count >= ATTENTION_THRESHOLD);
        // Ties broken by student id.
        tallies.sort_by(|a, b| {
            b.violation_count
                .cmp(&a.violation_count)
                .then_with(|| a.student_id.cmp(&b.student_id))
        });
        tallies
            .into_iter()
            .take(limit)
            .map(|t| AttentionCandidate {
                student_id: t.student_id,
                violation_count: t.violation_count,
                reason: ATTENTION_REASON.into(),
            })
            .collect()
    }
}

/// One row of the attention list, labelled from the roster when possible.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AttentionEntry {
    pub student_id: Uuid,
    pub student_name: Option<String>,
    pub class_name: Option<String>,
    pub violation_count: u64,
    pub reason: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tally(count: u64) -> StudentTally {
        StudentTally {
            student_id: Uuid::new_v4(),
            violation_count: count,
        }
    }

    #[test]
    fn threshold_and_order() {
        let tallies = vec![tally(2), tally(3), tally(0), tally(5)];
        let ranked = ViolationCountPolicy.rank(tallies, 10);
        let counts: Vec<u64> = ranked.iter().map(|c| c.violation_count).collect();
        assert_eq!(counts, vec![5, 3]);
        assert!(ranked.iter().all(|c| c.reason == ATTENTION_REASON));
    }

    #[test]
    fn limit_truncates() {
        let tallies = (3..10).map(tally).collect();
        let ranked = ViolationCountPolicy.rank(tallies, 2);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].violation_count, 9);
        assert!(ViolationCountPolicy.rank(vec![tally(4)], 0).is_empty());
    }

    #[test]
    fn net_score() {
        let summary = PointSummary {
            achievement_total: 125,
            violation_total: -45,
        };
        assert_eq!(summary.net(), 80);
        assert_eq!(PointSummary::default().net(), 0);
    }
}
