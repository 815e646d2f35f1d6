//! Input validation and conflict policy.
//!
//! Both checks are purely local and run before any remote call; a violation
//! never costs a remote round trip.

use crate::error::{Error, Result};
use crate::types::BranchSpec;

/// Field-level rule: the value must be not negative.
pub fn not_negative(value: i64, field: &'static str) -> Result<()> {
    if value < 0 {
        return Err(Error::NegativeValue { field, value });
    }
    Ok(())
}

/// Conflict policy: `parent_lsn` and `parent_timestamp` are mutually
/// exclusive ways to pick a fork point.
pub fn check_conflicts(spec: &BranchSpec) -> Result<()> {
    if spec.parent_lsn.is_some() && spec.parent_timestamp.is_some() {
        return Err(Error::ConflictingFields {
            first: "parent_lsn",
            second: "parent_timestamp",
        });
    }
    Ok(())
}

/// Run the conflict policy and every field rule against a spec.
pub fn validate_spec(spec: &BranchSpec) -> Result<()> {
    check_conflicts(spec)?;
    if let Some(ts) = spec.parent_timestamp {
        not_negative(ts, "parent_timestamp")?;
    }
    Ok(())
}
