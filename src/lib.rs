//! # branchkit
//!
//! Declarative reconciliation of project branches against a managed
//! branching API.
//!
//! A branch is a forked, independently addressable copy of a project at a
//! given point in its history. This crate keeps a declared branch
//! description in sync with the remote service: it validates the declared
//! input, drives create/read/update/delete/import calls, and maps every
//! remote response back into a typed local attribute set.
//!
//! The crate is synchronous and stateless between calls. It is meant to be
//! driven by an external orchestrator that stores prior state, computes
//! attribute diffs, and decides which operation to run. Replacing a branch
//! when an immutable attribute (`parent_lsn`, `parent_timestamp`) changes is
//! also the orchestrator's call: it issues a delete followed by a create.
//!
//! ## Example
//!
//! ```
//! use branchkit::{BranchSpec, BranchState, MockApi, Reconciler};
//!
//! let reconciler = Reconciler::new(MockApi::new());
//!
//! let spec = BranchSpec {
//!     project_id: "quiet-sea-123456".to_string(),
//!     name: Some("dev".to_string()),
//!     parent_id: Some("main".to_string()),
//!     ..BranchSpec::default()
//! };
//!
//! let mut state = BranchState::default();
//! reconciler.create(&spec, &mut state).unwrap();
//!
//! assert!(state.is_present());
//! assert_eq!(state.name, "dev");
//! ```
//!
//! Against a live service, swap the mock for the HTTP client:
//!
//! ```no_run
//! use branchkit::{HttpApi, Reconciler};
//!
//! let api = HttpApi::new("https://console.example.com/api/v2", "api-key");
//! let reconciler = Reconciler::new(api);
//! ```
//!
//! ## Error taxonomy
//!
//! Errors carry a [`ErrorCategory`]: `Config` for conflicting or invalid
//! input (caught before any remote call), `Remote` for failures returned by
//! the API, and `Mapping` for a remote field that could not be written into
//! local state. Nothing is retried internally.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod api;
pub mod error;
pub mod reconciler;
pub mod schema;
pub mod state;
pub mod types;
pub mod validate;

// Re-export main types at crate root
pub use api::http::HttpApi;
pub use api::{Branch, BranchApi, BranchCreateRequest, BranchUpdateRequest, CallCounts, MockApi};
pub use error::{Error, ErrorCategory, Result};
pub use reconciler::Reconciler;
pub use schema::{attr, AttrDef, AttrType, SCHEMA};
pub use state::MappedAttrs;
pub use types::{BranchSpec, BranchState, Presence};
