//! HTTP client for the Galaxy workflows API.

use anyhow::{Context, Result};
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::{GalaxyError, Workflow, WorkflowService};

const API_KEY_HEADER: &str = "x-api-key";

/// Talks to a Galaxy server's `/api/workflows` endpoints with an API key.
pub struct GalaxyClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl GalaxyClient {
    /// Build a client for `base_url`. Fails if the URL does not parse.
    pub fn new(base_url: &str, api_key: &str) -> Result<Self> {
        let parsed = Url::parse(base_url).with_context(|| format!("invalid Galaxy URL '{}'", base_url))?;
        let client = Client::builder()
            .user_agent(concat!("workflow-checker/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: parsed.as_str().trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn send(&self, url: &str, request: RequestBuilder) -> Result<Response, GalaxyError> {
        debug!(%url, "galaxy request");
        let response = request
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .map_err(|source| GalaxyError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(GalaxyError::Connection {
            status: status.as_u16(),
            body,
        })
    }

    async fn json<T: DeserializeOwned>(&self, url: &str, request: RequestBuilder) -> Result<T, GalaxyError> {
        let response = self.send(url, request).await?;
        let text = response.text().await.map_err(|source| GalaxyError::Transport {
            url: url.to_string(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|e| GalaxyError::Decode {
            url: url.to_string(),
            message: e.to_string(),
        })
    }
}

#[async_trait::async_trait]
impl WorkflowService for GalaxyClient {
    async fn list_workflows(&self) -> Result<Vec<Workflow>, GalaxyError> {
        let url = self.url("api/workflows");
        self.json(&url, self.client.get(&url)).await
    }

    async fn delete_workflow(&self, id: &str) -> Result<(), GalaxyError> {
        let url = self.url(&format!("api/workflows/{}", id));
        self.send(&url, self.client.delete(&url)).await?;
        Ok(())
    }

    async fn import_shared_workflow(&self, id: &str) -> Result<(), GalaxyError> {
        let url = self.url("api/workflows");
        let payload = serde_json::json!({ "shared_workflow_id": id });
        self.send(&url, self.client.post(&url).json(&payload)).await?;
        Ok(())
    }

    async fn export_workflow(&self, id: &str) -> Result<serde_json::Value, GalaxyError> {
        let url = self.url(&format!("api/workflows/{}/download", id));
        self.json(&url, self.client.get(&url)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_url_rejected() {
        assert!(GalaxyClient::new("not a url", "key").is_err());
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let client = GalaxyClient::new("https://usegalaxy.example/", "key").unwrap();
        assert_eq!(client.base_url(), "https://usegalaxy.example");
        assert_eq!(client.url("api/workflows"), "https://usegalaxy.example/api/workflows");
    }

    #[tokio::test]
    async fn test_list_workflows_sends_api_key() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/workflows")
            .match_header("x-api-key", "secret")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"[{"id": "1", "name": "one", "owner": "alice"}, {"id": "2", "name": "two", "owner": "bob"}]"#)
            .create_async()
            .await;

        let client = GalaxyClient::new(&server.url(), "secret").unwrap();
        let workflows = client.list_workflows().await.unwrap();
        mock.assert_async().await;

        assert_eq!(workflows.len(), 2);
        assert_eq!(workflows[0].owner, "alice");

        let owned = client.owned_workflows("bob").await.unwrap();
        assert_eq!(owned.len(), 1);
        assert_eq!(owned[0].id, "2");
    }

    #[tokio::test]
    async fn test_error_status_carries_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/workflows/abc/download")
            .with_status(400)
            .with_body(r#"{"err_msg": "Workflow cannot be exported due to missing tools."}"#)
            .create_async()
            .await;

        let client = GalaxyClient::new(&server.url(), "secret").unwrap();
        let err = client.export_workflow("abc").await.unwrap_err();
        match &err {
            GalaxyError::Connection { status, body } => {
                assert_eq!(*status, 400);
                assert!(body.contains("missing tools"));
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_import_posts_shared_id() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/workflows")
            .match_body(mockito::Matcher::Json(serde_json::json!({ "shared_workflow_id": "f2db41e1fa331b3e" })))
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        let client = GalaxyClient::new(&server.url(), "secret").unwrap();
        client.import_shared_workflow("f2db41e1fa331b3e").await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_delete_workflow() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("DELETE", "/api/workflows/abc")
            .with_status(403)
            .with_body("not yours")
            .create_async()
            .await;

        let client = GalaxyClient::new(&server.url(), "secret").unwrap();
        let err = client.delete_workflow("abc").await.unwrap_err();
        mock.assert_async().await;
        assert_eq!(err.body(), "not yours");
    }

    #[tokio::test]
    async fn test_undecodable_json() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/workflows")
            .with_status(200)
            .with_body("<html>login</html>")
            .create_async()
            .await;

        let client = GalaxyClient::new(&server.url(), "secret").unwrap();
        let err = client.list_workflows().await.unwrap_err();
        assert!(matches!(err, GalaxyError::Decode { .. }));
    }
}
