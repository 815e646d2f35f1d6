//! HTTP binding for the remote branching API.
//!
//! Thin and blocking: one request per call, JSON envelopes, bearer
//! authentication. No retries or backoff happen here; transient-fault
//! handling is the caller's concern.

use crate::api::{Branch, BranchApi, BranchCreateRequest, BranchUpdateRequest};
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// HTTP client for the branching API.
///
/// # Example
///
/// ```no_run
/// use branchkit::api::http::HttpApi;
/// use branchkit::api::BranchApi;
///
/// let api = HttpApi::new("https://console.example.com/api/v2", "api-key");
/// let branch = api.get_branch("quiet-sea-123456", "br-123").unwrap();
/// println!("branch {} is {}", branch.id, branch.current_state);
/// ```
pub struct HttpApi {
    /// HTTP agent for requests.
    agent: ureq::Agent,
    /// API base URL, without trailing slash.
    base_url: String,
    /// Bearer token sent with every request.
    api_key: String,
}

impl HttpApi {
    /// Create a client against the given API base URL.
    #[must_use]
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            agent: ureq::Agent::new_with_defaults(),
            base_url,
            api_key: api_key.into(),
        }
    }

    /// Get the API base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build the URL for a project's branch collection.
    fn branches_url(&self, project_id: &str) -> String {
        format!("{}/projects/{}/branches", self.base_url, project_id)
    }

    /// Build the URL for a single branch.
    fn branch_url(&self, project_id: &str, branch_id: &str) -> String {
        format!(
            "{}/projects/{}/branches/{}",
            self.base_url, project_id, branch_id
        )
    }

    fn bearer(&self) -> String {
        format!("Bearer {}", self.api_key)
    }
}

impl BranchApi for HttpApi {
    fn create_branch(&self, project_id: &str, req: &BranchCreateRequest) -> Result<Branch> {
        let response: BranchResponse = self
            .agent
            .post(&self.branches_url(project_id))
            .header("Authorization", self.bearer())
            .header("Accept", "application/json")
            .send_json(CreateEnvelope { branch: req })?
            .body_mut()
            .read_json()?;

        Ok(response.branch)
    }

    fn get_branch(&self, project_id: &str, branch_id: &str) -> Result<Branch> {
        let response: BranchResponse = self
            .agent
            .get(&self.branch_url(project_id, branch_id))
            .header("Authorization", self.bearer())
            .header("Accept", "application/json")
            .call()?
            .body_mut()
            .read_json()?;

        Ok(response.branch)
    }

    fn update_branch(
        &self,
        project_id: &str,
        branch_id: &str,
        req: &BranchUpdateRequest,
    ) -> Result<Branch> {
        let response: BranchResponse = self
            .agent
            .patch(&self.branch_url(project_id, branch_id))
            .header("Authorization", self.bearer())
            .header("Accept", "application/json")
            .send_json(UpdateEnvelope { branch: req })?
            .body_mut()
            .read_json()?;

        Ok(response.branch)
    }

    fn delete_branch(&self, project_id: &str, branch_id: &str) -> Result<()> {
        self.agent
            .delete(&self.branch_url(project_id, branch_id))
            .header("Authorization", self.bearer())
            .header("Accept", "application/json")
            .call()?;

        Ok(())
    }
}

// =============================================================================
// JSON envelopes
// =============================================================================

#[derive(Debug, Deserialize)]
struct BranchResponse {
    branch: Branch,
}

#[derive(Debug, Serialize)]
struct CreateEnvelope<'a> {
    branch: &'a BranchCreateRequest,
}

#[derive(Debug, Serialize)]
struct UpdateEnvelope<'a> {
    branch: &'a BranchUpdateRequest,
}
