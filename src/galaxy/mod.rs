//! Galaxy workflow service boundary.
//!
//! The checker only talks to [`WorkflowService`]; [`client::GalaxyClient`] is
//! the HTTP implementation used by the binary.

pub mod client;

pub use client::GalaxyClient;

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GalaxyError {
    /// The server answered with a non-success status.
    #[error("Unexpected HTTP status code: {status}: {body}")]
    Connection { status: u16, body: String },

    /// The request never got a response.
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("could not decode response from {url}: {message}")]
    Decode { url: String, message: String },
}

impl GalaxyError {
    /// Response body text the server sent back, if any.
    pub fn body(&self) -> &str {
        match self {
            GalaxyError::Connection { body, .. } => body,
            GalaxyError::Transport { .. } | GalaxyError::Decode { .. } => "",
        }
    }
}

/// A stored workflow as listed by `GET /api/workflows`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Workflow {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub owner: String,
}

/// Operations the checker needs from a workflow service.
#[async_trait::async_trait]
pub trait WorkflowService: Send + Sync {
    async fn list_workflows(&self) -> Result<Vec<Workflow>, GalaxyError>;

    async fn delete_workflow(&self, id: &str) -> Result<(), GalaxyError>;

    async fn import_shared_workflow(&self, id: &str) -> Result<(), GalaxyError>;

    /// Download a workflow in its portable export format.
    async fn export_workflow(&self, id: &str) -> Result<serde_json::Value, GalaxyError>;

    /// Workflows whose owner is `username`.
    async fn owned_workflows(&self, username: &str) -> Result<Vec<Workflow>, GalaxyError> {
        let mut workflows = self.list_workflows().await?;
        workflows.retain(|wf| wf.owner == username);
        Ok(workflows)
    }
}

/// Why an export failed, as far as the report is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFault {
    /// The workflow references tools the server does not have installed.
    MissingTools,
    Other,
}

const MISSING_TOOLS_MARKER: &str = "missing tools";

/// Classify an export failure by its response body.
///
/// Galaxy reports this condition as "Workflow cannot be exported due to
/// missing tools." with no structured code, so the match is a
/// case-insensitive substring test on the body. Brittle if the server
/// rewords the message.
pub fn classify_export_fault(err: &GalaxyError) -> ExportFault {
    if err.body().to_lowercase().contains(MISSING_TOOLS_MARKER) {
        ExportFault::MissingTools
    } else {
        ExportFault::Other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_missing_tools() {
        let err = GalaxyError::Connection {
            status: 400,
            body: r#"{"err_msg": "Workflow cannot be exported due to missing tools."}"#.to_string(),
        };
        assert_eq!(classify_export_fault(&err), ExportFault::MissingTools);
    }

    #[test]
    fn test_classify_other() {
        let err = GalaxyError::Connection {
            status: 500,
            body: "Internal server error".to_string(),
        };
        assert_eq!(classify_export_fault(&err), ExportFault::Other);

        let err = GalaxyError::Decode {
            url: "http://x".to_string(),
            message: "missing tools".to_string(),
        };
        // Only the server body is inspected.
        assert_eq!(classify_export_fault(&err), ExportFault::Other);
    }

    #[test]
    fn test_workflow_owner_defaults_empty() {
        let wf: Workflow = serde_json::from_str(r#"{"id": "abc", "name": "wf", "extra": 1}"#).unwrap();
        assert_eq!(wf.owner, "");
    }
}
