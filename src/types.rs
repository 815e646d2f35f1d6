//! Core types for branch reconciliation.

use serde::{Deserialize, Serialize};

/// Desired configuration for a branch, as declared by the orchestrator.
///
/// Only `project_id` is required; everything else is assigned by the remote
/// when omitted. `parent_lsn` and `parent_timestamp` select the fork point
/// and are mutually exclusive; changing either after creation requires
/// destroying and recreating the branch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchSpec {
    /// Parent project ID.
    pub project_id: String,
    /// Branch name.
    #[serde(default)]
    pub name: Option<String>,
    /// ID of the branch to checkout.
    #[serde(default)]
    pub parent_id: Option<String>,
    /// Log Sequence Number (LSN) horizon for the data to be present in the
    /// new branch.
    #[serde(default)]
    pub parent_lsn: Option<String>,
    /// Timestamp horizon for the data to be present in the new branch,
    /// defined as Unix epoch seconds. Must be not negative.
    #[serde(default)]
    pub parent_timestamp: Option<i64>,
}

/// Local attribute set of a branch, as last observed from the remote.
///
/// `id` is empty exactly when the branch has no live remote counterpart;
/// it is assigned by the remote at creation and never mutated afterwards.
/// All fields other than `id` and `project_id` are written by the state
/// mapper after every successful remote call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchState {
    /// Branch ID, assigned by the remote at creation.
    #[serde(default)]
    pub id: String,
    /// Parent project ID. Carried from the spec, never mapped.
    pub project_id: String,
    /// Branch name.
    #[serde(default)]
    pub name: String,
    /// ID of the branch this one was forked from.
    #[serde(default)]
    pub parent_id: String,
    /// LSN fork point, when the branch was created from one.
    #[serde(default)]
    pub parent_lsn: Option<String>,
    /// Timestamp fork point in epoch seconds, when the branch was created
    /// from one.
    #[serde(default)]
    pub parent_timestamp: Option<i64>,
    /// Branch logical size in MB.
    #[serde(default)]
    pub logical_size_mb: i64,
    /// Branch physical size in MB.
    #[serde(default)]
    pub physical_size_mb: i64,
    /// Branch state.
    #[serde(default)]
    pub current_state: String,
    /// Branch pending state.
    #[serde(default)]
    pub pending_state: String,
    /// Branch creation timestamp, RFC 3339.
    #[serde(default)]
    pub created_at: String,
    /// Branch last update timestamp, RFC 3339.
    #[serde(default)]
    pub updated_at: String,
}

impl BranchState {
    /// Create an empty state scoped to a project.
    #[must_use]
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            ..Self::default()
        }
    }

    /// Whether the branch has a live remote counterpart.
    #[must_use]
    pub fn presence(&self) -> Presence {
        if self.id.is_empty() {
            Presence::Absent
        } else {
            Presence::Present
        }
    }

    /// Check if the branch is present on the remote.
    #[must_use]
    pub fn is_present(&self) -> bool {
        self.presence().is_present()
    }
}

/// Whether a branch has a live remote counterpart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    /// The branch exists on the remote.
    Present,
    /// The branch does not exist on the remote.
    Absent,
}

impl Presence {
    /// Check if this is the present state.
    #[must_use]
    pub fn is_present(&self) -> bool {
        matches!(self, Self::Present)
    }

    /// Check if this is the absent state.
    #[must_use]
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state_is_absent() {
        let state = BranchState::default();
        assert_eq!(state.presence(), Presence::Absent);
        assert!(!state.is_present());
    }

    #[test]
    fn test_state_with_id_is_present() {
        let state = BranchState {
            id: "br-123".to_string(),
            ..BranchState::new("p1")
        };
        assert_eq!(state.presence(), Presence::Present);
        assert!(state.is_present());
    }

    #[test]
    fn test_new_keeps_project_id() {
        let state = BranchState::new("quiet-sea-123456");
        assert_eq!(state.project_id, "quiet-sea-123456");
        assert!(state.id.is_empty());
    }

    #[test]
    fn test_presence_predicates() {
        assert!(Presence::Present.is_present());
        assert!(!Presence::Present.is_absent());
        assert!(Presence::Absent.is_absent());
        assert!(!Presence::Absent.is_present());
    }
}
