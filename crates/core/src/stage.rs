//! Stage directory: the ordered path a document traverses within one
//! workflow template.
//!
//! [`StagePath`] is built from the stages attached to a template and
//! validates the linear-order invariant up front: sequence numbers must be
//! unique within the template. Duplicates are a data-integrity error, never
//! an arbitrary pick.

use crate::error::CoreError;
use crate::types::DbId;

/// A stage as seen by the directory: identity, position, and role binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageRef {
    pub id: DbId,
    pub label: String,
    pub sequence_number: i32,
    /// `None` means no role is bound; only elevated roles may act there.
    pub required_role_id: Option<DbId>,
}

/// The ordered set of stages belonging to one workflow template.
#[derive(Debug, Clone)]
pub struct StagePath {
    stages: Vec<StageRef>,
}

impl StagePath {
    /// Build a path from a template's stages, sorting by sequence number
    /// and rejecting duplicate ordinals.
    pub fn new(mut stages: Vec<StageRef>) -> Result<Self, CoreError> {
        stages.sort_by_key(|s| s.sequence_number);
        for pair in stages.windows(2) {
            if pair[0].sequence_number == pair[1].sequence_number {
                return Err(CoreError::DataIntegrity(format!(
                    "duplicate sequence number {} (stages {} and {})",
                    pair[0].sequence_number, pair[0].id, pair[1].id
                )));
            }
        }
        Ok(Self { stages })
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// The entry stage of the template (lowest sequence number).
    pub fn first(&self) -> Option<&StageRef> {
        self.stages.first()
    }

    /// The stage occupying a given sequence number, if any.
    pub fn at(&self, sequence_number: i32) -> Option<&StageRef> {
        self.stages
            .iter()
            .find(|s| s.sequence_number == sequence_number)
    }

    /// Look up a stage of this path by its id.
    pub fn by_id(&self, stage_id: DbId) -> Option<&StageRef> {
        self.stages.iter().find(|s| s.id == stage_id)
    }

    /// The stage immediately after `sequence_number`, or `None` at the end
    /// of the path.
    pub fn next_after(&self, sequence_number: i32) -> Option<&StageRef> {
        self.stages
            .iter()
            .find(|s| s.sequence_number > sequence_number)
    }

    /// The stage immediately before `sequence_number`, or `None` at the
    /// start of the path.
    pub fn previous_before(&self, sequence_number: i32) -> Option<&StageRef> {
        self.stages
            .iter()
            .rev()
            .find(|s| s.sequence_number < sequence_number)
    }

    /// Whether the given stage id belongs to this template's path.
    pub fn contains(&self, stage_id: DbId) -> bool {
        self.by_id(stage_id).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stage(id: DbId, seq: i32) -> StageRef {
        StageRef {
            id,
            label: format!("stage-{seq}"),
            sequence_number: seq,
            required_role_id: Some(id * 10),
        }
    }

    #[test]
    fn test_duplicate_ordinals_rejected() {
        let result = StagePath::new(vec![stage(1, 1), stage(2, 2), stage(3, 2)]);
        assert!(matches!(result, Err(CoreError::DataIntegrity(_))));
    }

    #[test]
    fn test_first_is_lowest_ordinal_regardless_of_input_order() {
        let path = StagePath::new(vec![stage(3, 3), stage(1, 1), stage(2, 2)]).unwrap();
        assert_eq!(path.first().unwrap().id, 1);
    }

    #[test]
    fn test_next_and_previous_walk_the_path() {
        let path = StagePath::new(vec![stage(1, 1), stage(2, 2), stage(3, 3)]).unwrap();
        assert_eq!(path.next_after(1).unwrap().id, 2);
        assert_eq!(path.previous_before(3).unwrap().id, 2);
        assert!(path.next_after(3).is_none());
        assert!(path.previous_before(1).is_none());
    }

    #[test]
    fn test_next_and_previous_tolerate_ordinal_gaps() {
        // Ordinals need not be contiguous; the neighbour is the nearest one.
        let path = StagePath::new(vec![stage(1, 1), stage(2, 5), stage(3, 9)]).unwrap();
        assert_eq!(path.next_after(1).unwrap().id, 2);
        assert_eq!(path.previous_before(9).unwrap().id, 2);
    }

    #[test]
    fn test_forward_reject_round_trip_on_stage_id() {
        let path = StagePath::new(vec![stage(1, 1), stage(2, 2), stage(3, 3)]).unwrap();
        let current = path.at(2).unwrap();
        let back = path.previous_before(current.sequence_number).unwrap();
        let forward_again = path.next_after(back.sequence_number).unwrap();
        assert_eq!(forward_again.id, current.id);
    }

    #[test]
    fn test_empty_path() {
        let path = StagePath::new(vec![]).unwrap();
        assert!(path.is_empty());
        assert!(path.first().is_none());
    }

    #[test]
    fn test_contains_and_by_id() {
        let path = StagePath::new(vec![stage(1, 1), stage(2, 2)]).unwrap();
        assert!(path.contains(2));
        assert!(!path.contains(42));
        assert_eq!(path.by_id(1).unwrap().sequence_number, 1);
    }
}
