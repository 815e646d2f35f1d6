//! State mapping between the remote branch entity and the local attribute
//! set.
//!
//! The mapper is a pure, fallible conversion: it builds a complete
//! [`MappedAttrs`] or fails without touching anything, so a field-level
//! failure can never leave a [`BranchState`] half-updated. Sizes truncate to
//! whole MB; timestamps render as RFC 3339.

use crate::api;
use crate::error::{Error, Result};
use crate::types::BranchState;
use chrono::{DateTime, SecondsFormat, Utc};

/// Render a timestamp in the fixed textual format used by the timestamp
/// attributes.
pub(crate) fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Fully mapped view of a remote branch entity.
///
/// Covers every observed attribute; `Default` yields the all-zero set used
/// to clear a state after delete.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappedAttrs {
    /// Branch name.
    pub name: String,
    /// Parent branch ID.
    pub parent_id: String,
    /// LSN fork point.
    pub parent_lsn: Option<String>,
    /// Timestamp fork point in epoch seconds.
    pub parent_timestamp: Option<i64>,
    /// Logical size, whole MB.
    pub logical_size_mb: i64,
    /// Physical size, whole MB.
    pub physical_size_mb: i64,
    /// Branch state.
    pub current_state: String,
    /// Branch pending state.
    pub pending_state: String,
    /// Creation timestamp, RFC 3339.
    pub created_at: String,
    /// Last update timestamp, RFC 3339.
    pub updated_at: String,
}

impl TryFrom<&api::Branch> for MappedAttrs {
    type Error = Error;

    fn try_from(remote: &api::Branch) -> Result<Self> {
        Ok(Self {
            name: remote.name.clone(),
            parent_id: remote.parent_id.clone().unwrap_or_default(),
            parent_lsn: remote.parent_lsn.clone(),
            parent_timestamp: remote.parent_timestamp.map(|t| t.timestamp()),
            logical_size_mb: size_mb(remote.logical_size, "logical_size")?,
            physical_size_mb: size_mb(remote.physical_size, "physical_size")?,
            current_state: remote.current_state.clone(),
            pending_state: remote.pending_state.clone().unwrap_or_default(),
            created_at: format_timestamp(remote.created_at),
            updated_at: format_timestamp(remote.updated_at),
        })
    }
}

/// Truncate a fractional MB size to whole units. Absent sizes map to zero.
fn size_mb(raw: Option<f64>, field: &'static str) -> Result<i64> {
    let Some(raw) = raw else {
        return Ok(0);
    };
    if !raw.is_finite() {
        return Err(Error::mapping(field, format!("size {raw} is not finite")));
    }
    Ok(raw.trunc() as i64)
}

impl BranchState {
    /// Write mapped attributes into the state. Identity (`id`,
    /// `project_id`) is retained, never overwritten by the mapper.
    pub fn apply(&mut self, attrs: MappedAttrs) {
        self.name = attrs.name;
        self.parent_id = attrs.parent_id;
        self.parent_lsn = attrs.parent_lsn;
        self.parent_timestamp = attrs.parent_timestamp;
        self.logical_size_mb = attrs.logical_size_mb;
        self.physical_size_mb = attrs.physical_size_mb;
        self.current_state = attrs.current_state;
        self.pending_state = attrs.pending_state;
        self.created_at = attrs.created_at;
        self.updated_at = attrs.updated_at;
    }

    /// Empty the identity and reset every observed attribute to its zero
    /// value. `project_id` is configuration, not observed state, and is
    /// kept.
    pub fn clear(&mut self) {
        self.id.clear();
        self.apply(MappedAttrs::default());
    }
}
