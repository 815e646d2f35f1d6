//! Remote branching API: trait, wire types, and a mock for tests.
//!
//! The [`BranchApi`] trait is the typed capability the reconciler consumes.
//! The production implementation is [`http::HttpApi`]; [`MockApi`] is an
//! in-memory implementation for testing without network access.
//!
//! # Testing
//!
//! ```
//! use branchkit::api::{BranchApi, BranchCreateRequest, MockApi};
//!
//! let mock = MockApi::new();
//! let branch = mock
//!     .create_branch("p1", &BranchCreateRequest::default())
//!     .unwrap();
//!
//! assert_eq!(branch.id, "br-1");
//! assert_eq!(mock.calls().create, 1);
//! ```

pub mod http;

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// A branch as represented by the remote management API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Branch {
    /// Branch ID, assigned by the remote at creation.
    pub id: String,
    /// Branch name.
    pub name: String,
    /// ID of the branch this one was forked from.
    #[serde(default)]
    pub parent_id: Option<String>,
    /// LSN fork point, if the branch was created from one.
    #[serde(default)]
    pub parent_lsn: Option<String>,
    /// Timestamp fork point, if the branch was created from one.
    #[serde(default)]
    pub parent_timestamp: Option<DateTime<Utc>>,
    /// Logical size in MB; may be fractional.
    #[serde(default)]
    pub logical_size: Option<f64>,
    /// Physical size in MB; may be fractional.
    #[serde(default)]
    pub physical_size: Option<f64>,
    /// Branch state.
    pub current_state: String,
    /// Branch pending state, if a transition is in flight.
    #[serde(default)]
    pub pending_state: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Payload for branch creation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BranchCreateRequest {
    /// ID of the branch to fork from; remote picks the primary when omitted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    /// Branch name; remote assigns one when omitted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// LSN fork point.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_lsn: Option<String>,
    /// Point-in-time fork point.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_timestamp: Option<DateTime<Utc>>,
}

/// Payload for a branch rename.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BranchUpdateRequest {
    /// New branch name.
    pub name: String,
}

/// Typed client capability for the remote branching API.
///
/// All calls are blocking and issue at most one remote round trip. Retry,
/// backoff, and cancellation are the implementation's concern, not the
/// reconciler's.
pub trait BranchApi: Send + Sync {
    /// Create a branch in a project.
    ///
    /// # Errors
    ///
    /// Returns `Error::Api` with the remote failure, verbatim.
    fn create_branch(&self, project_id: &str, req: &BranchCreateRequest) -> Result<Branch>;

    /// Fetch a branch by `(project_id, branch_id)`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Api` with status 404 when the branch does not exist.
    fn get_branch(&self, project_id: &str, branch_id: &str) -> Result<Branch>;

    /// Rename a branch.
    fn update_branch(
        &self,
        project_id: &str,
        branch_id: &str,
        req: &BranchUpdateRequest,
    ) -> Result<Branch>;

    /// Delete a branch.
    ///
    /// # Errors
    ///
    /// Returns `Error::Api` with status 404 when the branch does not exist;
    /// the condition is never suppressed here.
    fn delete_branch(&self, project_id: &str, branch_id: &str) -> Result<()>;
}

/// Per-operation call counters recorded by [`MockApi`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    /// Number of `create_branch` calls.
    pub create: usize,
    /// Number of `get_branch` calls.
    pub get: usize,
    /// Number of `update_branch` calls.
    pub update: usize,
    /// Number of `delete_branch` calls.
    pub delete: usize,
}

impl CallCounts {
    /// Total number of remote calls issued.
    #[must_use]
    pub fn total(&self) -> usize {
        self.create + self.get + self.update + self.delete
    }
}

/// Creation time stamped onto branches provisioned by the mock.
const MOCK_EPOCH: i64 = 1_705_276_800; // 2024-01-15T00:00:00Z

/// In-memory mock of the remote branching API.
///
/// Stores branches keyed by `(project_id, branch_id)`, counts every call,
/// and can be armed to fail the next call with a chosen error.
#[derive(Debug, Clone, Default)]
pub struct MockApi {
    inner: Arc<Mutex<MockState>>,
}

#[derive(Debug, Default)]
struct MockState {
    branches: HashMap<(String, String), Branch>,
    fail_next: Option<Error>,
    calls: CallCounts,
    next_id: u64,
}

impl MockApi {
    /// Create a new empty mock.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a branch into a project.
    pub fn add_branch(&mut self, project_id: &str, branch: Branch) {
        let mut inner = self.inner.lock().unwrap();
        inner
            .branches
            .insert((project_id.to_string(), branch.id.clone()), branch);
    }

    /// Arm the mock to fail the next call with the given error.
    pub fn fail_next(&mut self, err: Error) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_next = Some(err);
    }

    /// Get the call counters recorded so far.
    #[must_use]
    pub fn calls(&self) -> CallCounts {
        self.inner.lock().unwrap().calls
    }

    /// A mock timestamp for fixtures.
    #[must_use]
    pub fn mock_time() -> DateTime<Utc> {
        DateTime::from_timestamp(MOCK_EPOCH, 0).unwrap()
    }

    /// Build a plausible branch fixture.
    #[must_use]
    pub fn sample_branch(id: &str, name: &str) -> Branch {
        Branch {
            id: id.to_string(),
            name: name.to_string(),
            parent_id: Some("main".to_string()),
            parent_lsn: None,
            parent_timestamp: None,
            logical_size: Some(28.0),
            physical_size: Some(30.0),
            current_state: "ready".to_string(),
            pending_state: None,
            created_at: Self::mock_time(),
            updated_at: Self::mock_time(),
        }
    }

    fn take_failure(inner: &mut MockState) -> Result<()> {
        match inner.fail_next.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn not_found(project_id: &str, branch_id: &str) -> Error {
        Error::api(
            format!("branch {branch_id} not found in project {project_id}"),
            Some(404),
        )
    }
}

impl BranchApi for MockApi {
    fn create_branch(&self, project_id: &str, req: &BranchCreateRequest) -> Result<Branch> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.create += 1;
        Self::take_failure(&mut inner)?;

        inner.next_id += 1;
        let id = format!("br-{}", inner.next_id);
        let branch = Branch {
            id: id.clone(),
            name: req.name.clone().unwrap_or_else(|| id.clone()),
            parent_id: req.parent_id.clone(),
            parent_lsn: req.parent_lsn.clone(),
            parent_timestamp: req.parent_timestamp,
            logical_size: Some(0.0),
            physical_size: Some(0.0),
            current_state: "ready".to_string(),
            pending_state: None,
            created_at: Self::mock_time(),
            updated_at: Self::mock_time(),
        };
        inner
            .branches
            .insert((project_id.to_string(), id), branch.clone());
        Ok(branch)
    }

    fn get_branch(&self, project_id: &str, branch_id: &str) -> Result<Branch> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.get += 1;
        Self::take_failure(&mut inner)?;

        inner
            .branches
            .get(&(project_id.to_string(), branch_id.to_string()))
            .cloned()
            .ok_or_else(|| Self::not_found(project_id, branch_id))
    }

    fn update_branch(
        &self,
        project_id: &str,
        branch_id: &str,
        req: &BranchUpdateRequest,
    ) -> Result<Branch> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.update += 1;
        Self::take_failure(&mut inner)?;

        let branch = inner
            .branches
            .get_mut(&(project_id.to_string(), branch_id.to_string()))
            .ok_or_else(|| Self::not_found(project_id, branch_id))?;
        branch.name = req.name.clone();
        Ok(branch.clone())
    }

    fn delete_branch(&self, project_id: &str, branch_id: &str) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.delete += 1;
        Self::take_failure(&mut inner)?;

        inner
            .branches
            .remove(&(project_id.to_string(), branch_id.to_string()))
            .map(|_| ())
            .ok_or_else(|| Self::not_found(project_id, branch_id))
    }
}
