//! Reconciliation of a declared branch against the remote API.
//!
//! The reconciler drives one branch at a time through create, read, update,
//! delete, and import. Each operation is synchronous, issues at most one
//! remote round trip, and never retries; serializing operations on the same
//! branch is the orchestrator's job.

use crate::api::{BranchApi, BranchCreateRequest, BranchUpdateRequest};
use crate::error::{Error, Result};
use crate::state::MappedAttrs;
use crate::types::{BranchSpec, BranchState, Presence};
use crate::validate;
use chrono::{DateTime, Utc};

/// Drives branch operations against a remote API.
///
/// Holds no branch state of its own; every operation works on a
/// [`BranchState`] the orchestrator owns. The client is a typed capability,
/// so tests can swap in [`crate::api::MockApi`].
pub struct Reconciler<C> {
    api: C,
}

impl<C: BranchApi> Reconciler<C> {
    /// Create a reconciler over a client.
    pub fn new(api: C) -> Self {
        Self { api }
    }

    /// Create the branch described by `spec`.
    ///
    /// Runs the conflict policy and field validation first; a violation is
    /// reported without any remote call. On success the remote-assigned ID
    /// is stored and the full returned entity is mapped into `state`. If the
    /// remote call fails, `state` stays absent and the error surfaces
    /// verbatim, no retry. If the returned entity fails to map, the identity
    /// is still recorded: the branch exists and must not be re-created.
    pub fn create(&self, spec: &BranchSpec, state: &mut BranchState) -> Result<()> {
        log::trace!("create branch in project {}", spec.project_id);
        validate::validate_spec(spec)?;

        let req = BranchCreateRequest {
            parent_id: spec.parent_id.clone(),
            name: spec.name.clone(),
            parent_lsn: spec.parent_lsn.clone(),
            parent_timestamp: materialize_fork_time(spec.parent_timestamp)?,
        };

        let remote = self.api.create_branch(&spec.project_id, &req)?;

        // The branch now exists remotely: record its identity before mapping,
        // so a mapping failure cannot leave a live branch untracked.
        state.project_id = spec.project_id.clone();
        state.id = remote.id.clone();
        state.apply(MappedAttrs::try_from(&remote)?);
        log::debug!("created branch {} in project {}", state.id, state.project_id);
        Ok(())
    }

    /// Refresh `state` from the remote, keyed by `(project_id, id)`.
    ///
    /// Identity is retained; only observed attributes are rewritten. A
    /// remote not-found means the branch drifted away: the local state is
    /// cleared and `Presence::Absent` is returned. Any other remote failure
    /// is a hard error and leaves `state` untouched.
    pub fn read(&self, state: &mut BranchState) -> Result<Presence> {
        log::trace!("read branch {} in project {}", state.id, state.project_id);

        let remote = match self.api.get_branch(&state.project_id, &state.id) {
            Ok(branch) => branch,
            Err(err) if err.is_not_found() => {
                log::debug!(
                    "branch {} gone from project {}, clearing local state",
                    state.id,
                    state.project_id
                );
                state.clear();
                return Ok(Presence::Absent);
            }
            Err(err) => return Err(err),
        };

        state.apply(MappedAttrs::try_from(&remote)?);
        Ok(Presence::Present)
    }

    /// Apply an in-place change. Only `name` participates; immutable fields
    /// are never sent here. A change to them is the orchestrator's cue to
    /// delete and recreate.
    ///
    /// An empty or unset `name` is an idempotent no-op: success, zero remote
    /// calls.
    pub fn update(&self, spec: &BranchSpec, state: &mut BranchState) -> Result<()> {
        log::trace!("update branch {} in project {}", state.id, state.project_id);

        let Some(name) = spec.name.as_deref().filter(|name| !name.is_empty()) else {
            return Ok(());
        };

        let req = BranchUpdateRequest {
            name: name.to_string(),
        };
        let remote = self.api.update_branch(&state.project_id, &state.id, &req)?;
        state.apply(MappedAttrs::try_from(&remote)?);
        Ok(())
    }

    /// Delete the branch on the remote and reset `state` to absent: the ID
    /// is emptied and every observed attribute returns to its zero value.
    ///
    /// On failure the branch stays present locally and the error surfaces,
    /// including a not-found for a branch already deleted out of band.
    pub fn delete(&self, state: &mut BranchState) -> Result<()> {
        log::trace!("delete branch {} in project {}", state.id, state.project_id);

        self.api.delete_branch(&state.project_id, &state.id)?;
        state.clear();
        Ok(())
    }

    /// Adopt an externally created branch by identifier. The caller supplies
    /// `project_id` out of band.
    ///
    /// Runs a read; on success returns the fully populated state. On any
    /// failure the operation aborts with the first diagnostic's message as
    /// the sole error text, discarding partial state.
    pub fn import(&self, project_id: &str, branch_id: &str) -> Result<BranchState> {
        log::trace!("import branch {branch_id} from project {project_id}");

        let mut state = BranchState {
            id: branch_id.to_string(),
            ..BranchState::new(project_id)
        };
        match self.read(&mut state) {
            Ok(Presence::Present) => Ok(state),
            Ok(Presence::Absent) => Err(Error::ImportFailed(format!(
                "branch {branch_id} not found in project {project_id}"
            ))),
            Err(err) => Err(Error::ImportFailed(err.to_string())),
        }
    }
}

/// Materialize an epoch-seconds fork point as a time value for the creation
/// payload. Zero means unset and is not sent.
fn materialize_fork_time(epoch: Option<i64>) -> Result<Option<DateTime<Utc>>> {
    let Some(secs) = epoch.filter(|secs| *secs > 0) else {
        return Ok(None);
    };
    DateTime::from_timestamp(secs, 0)
        .map(Some)
        .ok_or_else(|| Error::InvalidValue {
            field: "parent_timestamp",
            message: format!("{secs} is out of range for a timestamp"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Branch, MockApi};
    use crate::error::ErrorCategory;

    /// Client whose created branches carry a size no mapper can accept.
    struct UnmappableCreateApi;

    impl BranchApi for UnmappableCreateApi {
        fn create_branch(&self, _project_id: &str, req: &BranchCreateRequest) -> Result<Branch> {
            let mut branch =
                MockApi::sample_branch("br-live-1", req.name.as_deref().unwrap_or("dev"));
            branch.logical_size = Some(f64::NAN);
            Ok(branch)
        }

        fn get_branch(&self, _project_id: &str, _branch_id: &str) -> Result<Branch> {
            Err(Error::api("not supported", None))
        }

        fn update_branch(
            &self,
            _project_id: &str,
            _branch_id: &str,
            _req: &BranchUpdateRequest,
        ) -> Result<Branch> {
            Err(Error::api("not supported", None))
        }

        fn delete_branch(&self, _project_id: &str, _branch_id: &str) -> Result<()> {
            Err(Error::api("not supported", None))
        }
    }

    fn spec(project_id: &str) -> BranchSpec {
        BranchSpec {
            project_id: project_id.to_string(),
            ..BranchSpec::default()
        }
    }

    fn init_logs() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn test_create_assigns_id_and_maps_state() {
        init_logs();
        let mock = MockApi::new();
        let reconciler = Reconciler::new(mock.clone());
        let spec = BranchSpec {
            name: Some("dev".to_string()),
            parent_id: Some("main".to_string()),
            parent_lsn: Some("0/1708A40".to_string()),
            ..spec("p1")
        };

        let mut state = BranchState::default();
        reconciler.create(&spec, &mut state).unwrap();

        assert_eq!(state.id, "br-1");
        assert_eq!(state.project_id, "p1");
        assert_eq!(state.name, "dev");
        assert_eq!(state.parent_id, "main");
        assert_eq!(state.parent_lsn.as_deref(), Some("0/1708A40"));
        assert_eq!(state.current_state, "ready");
        assert_eq!(state.created_at, "2024-01-15T00:00:00Z");
        assert!(state.is_present());
        assert_eq!(mock.calls().create, 1);
    }

    #[test]
    fn test_create_then_read_roundtrip() {
        let mock = MockApi::new();
        let reconciler = Reconciler::new(mock);
        let spec = BranchSpec {
            name: Some("dev".to_string()),
            parent_id: Some("main".to_string()),
            parent_lsn: Some("0/1708A40".to_string()),
            ..spec("p1")
        };

        let mut state = BranchState::default();
        reconciler.create(&spec, &mut state).unwrap();
        let after_create = state.clone();

        let presence = reconciler.read(&mut state).unwrap();
        assert!(presence.is_present());
        assert_eq!(state, after_create);
        assert!(!state.current_state.is_empty());
    }

    #[test]
    fn test_create_conflicting_fork_points_makes_no_remote_call() {
        let mock = MockApi::new();
        let reconciler = Reconciler::new(mock.clone());
        let spec = BranchSpec {
            parent_lsn: Some("x".to_string()),
            parent_timestamp: Some(1_700_000_000),
            ..spec("p1")
        };

        let mut state = BranchState::default();
        let err = reconciler.create(&spec, &mut state).unwrap_err();

        assert_eq!(err.category(), ErrorCategory::Config);
        assert!(matches!(err, Error::ConflictingFields { .. }));
        assert_eq!(mock.calls().total(), 0);
        assert!(!state.is_present());
    }

    #[test]
    fn test_create_negative_timestamp_makes_no_remote_call() {
        let mock = MockApi::new();
        let reconciler = Reconciler::new(mock.clone());
        let spec = BranchSpec {
            parent_timestamp: Some(-1),
            ..spec("p1")
        };

        let mut state = BranchState::default();
        let err = reconciler.create(&spec, &mut state).unwrap_err();

        assert!(matches!(err, Error::NegativeValue { field: "parent_timestamp", .. }));
        assert_eq!(mock.calls().total(), 0);
    }

    #[test]
    fn test_create_with_timestamp_fork_point() {
        let mock = MockApi::new();
        let reconciler = Reconciler::new(mock);
        let spec = BranchSpec {
            parent_timestamp: Some(1_700_000_000),
            ..spec("p1")
        };

        let mut state = BranchState::default();
        reconciler.create(&spec, &mut state).unwrap();
        assert_eq!(state.parent_timestamp, Some(1_700_000_000));
    }

    #[test]
    fn test_create_zero_timestamp_is_not_materialized() {
        let mock = MockApi::new();
        let reconciler = Reconciler::new(mock);
        let spec = BranchSpec {
            parent_timestamp: Some(0),
            ..spec("p1")
        };

        let mut state = BranchState::default();
        reconciler.create(&spec, &mut state).unwrap();
        assert_eq!(state.parent_timestamp, None);
    }

    #[test]
    fn test_create_remote_failure_leaves_state_absent() {
        let mut mock = MockApi::new();
        mock.fail_next(Error::api("HTTP 500", Some(500)));
        let reconciler = Reconciler::new(mock.clone());

        let mut state = BranchState::default();
        let err = reconciler.create(&spec("p1"), &mut state).unwrap_err();

        assert_eq!(err, Error::api("HTTP 500", Some(500)));
        assert!(!state.is_present());
        assert_eq!(mock.calls().create, 1);
    }

    #[test]
    fn test_create_mapping_failure_keeps_remote_identity() {
        let reconciler = Reconciler::new(UnmappableCreateApi);

        let mut state = BranchState::default();
        let err = reconciler
            .create(
                &BranchSpec {
                    name: Some("dev".to_string()),
                    ..spec("p1")
                },
                &mut state,
            )
            .unwrap_err();

        assert_eq!(err.category(), ErrorCategory::Mapping);
        // the branch was provisioned remotely, its identity must survive
        assert_eq!(state.id, "br-live-1");
        assert_eq!(state.project_id, "p1");
        assert!(state.is_present());
    }

    #[test]
    fn test_read_not_found_clears_state() {
        let mock = MockApi::new();
        let reconciler = Reconciler::new(mock);

        let mut state = BranchState {
            id: "br-404".to_string(),
            name: "dev".to_string(),
            ..BranchState::new("p1")
        };
        let presence = reconciler.read(&mut state).unwrap();

        assert!(presence.is_absent());
        assert!(state.id.is_empty());
        assert!(state.name.is_empty());
        assert_eq!(state.project_id, "p1");
    }

    #[test]
    fn test_read_other_failure_is_hard_error() {
        let mut mock = MockApi::new();
        mock.fail_next(Error::api("HTTP 500", Some(500)));
        let reconciler = Reconciler::new(mock);

        let mut state = BranchState {
            id: "br-123".to_string(),
            ..BranchState::new("p1")
        };
        let err = reconciler.read(&mut state).unwrap_err();

        assert_eq!(err, Error::api("HTTP 500", Some(500)));
        assert_eq!(state.id, "br-123");
    }

    #[test]
    fn test_update_without_name_makes_no_remote_call() {
        let mock = MockApi::new();
        let reconciler = Reconciler::new(mock.clone());

        let mut state = BranchState::default();
        reconciler
            .create(
                &BranchSpec {
                    name: Some("dev".to_string()),
                    ..spec("p1")
                },
                &mut state,
            )
            .unwrap();
        let before = state.clone();

        reconciler.update(&spec("p1"), &mut state).unwrap();
        reconciler
            .update(
                &BranchSpec {
                    name: Some(String::new()),
                    ..spec("p1")
                },
                &mut state,
            )
            .unwrap();

        assert_eq!(state, before);
        assert_eq!(mock.calls().update, 0);
    }

    #[test]
    fn test_update_renames() {
        let mock = MockApi::new();
        let reconciler = Reconciler::new(mock.clone());

        let mut state = BranchState::default();
        reconciler
            .create(
                &BranchSpec {
                    name: Some("dev".to_string()),
                    ..spec("p1")
                },
                &mut state,
            )
            .unwrap();

        reconciler
            .update(
                &BranchSpec {
                    name: Some("staging".to_string()),
                    ..spec("p1")
                },
                &mut state,
            )
            .unwrap();

        assert_eq!(state.name, "staging");
        assert_eq!(state.id, "br-1");
        assert_eq!(mock.calls().update, 1);
    }

    #[test]
    fn test_delete_clears_all_fields() {
        let mock = MockApi::new();
        let reconciler = Reconciler::new(mock);

        let mut state = BranchState::default();
        reconciler
            .create(
                &BranchSpec {
                    name: Some("dev".to_string()),
                    parent_lsn: Some("0/1708A40".to_string()),
                    ..spec("p1")
                },
                &mut state,
            )
            .unwrap();

        reconciler.delete(&mut state).unwrap();

        assert_eq!(state, BranchState::new("p1"));
        assert!(!state.is_present());
        assert!(state.parent_lsn.is_none());
        assert_eq!(state.created_at, "");
    }

    #[test]
    fn test_delete_absent_branch_surfaces_remote_error() {
        let mock = MockApi::new();
        let reconciler = Reconciler::new(mock);

        let mut state = BranchState {
            id: "br-123".to_string(),
            ..BranchState::new("p1")
        };
        let err = reconciler.delete(&mut state).unwrap_err();

        assert!(err.is_not_found());
        // failed delete leaves the branch present locally
        assert_eq!(state.id, "br-123");
    }

    #[test]
    fn test_import_populates_state() {
        let mut mock = MockApi::new();
        let mut branch = MockApi::sample_branch("br-7", "imported");
        branch.logical_size = Some(42.5);
        mock.add_branch("p1", branch);
        let reconciler = Reconciler::new(mock);

        let state = reconciler.import("p1", "br-7").unwrap();

        assert_eq!(state.id, "br-7");
        assert_eq!(state.project_id, "p1");
        assert_eq!(state.name, "imported");
        assert_eq!(state.logical_size_mb, 42);
        assert!(state.is_present());
    }

    #[test]
    fn test_import_missing_branch_fails() {
        let mock = MockApi::new();
        let reconciler = Reconciler::new(mock);

        let err = reconciler.import("p1", "br-404").unwrap_err();
        match err {
            Error::ImportFailed(message) => {
                assert!(message.contains("br-404"));
                assert!(message.contains("p1"));
            }
            other => panic!("expected ImportFailed, got {other:?}"),
        }
    }

    #[test]
    fn test_import_remote_failure_uses_diagnostic_message() {
        let mut mock = MockApi::new();
        mock.fail_next(Error::api("connection reset", None));
        let reconciler = Reconciler::new(mock);

        let err = reconciler.import("p1", "br-1").unwrap_err();
        match err {
            Error::ImportFailed(message) => assert!(message.contains("connection reset")),
            other => panic!("expected ImportFailed, got {other:?}"),
        }
    }
}
