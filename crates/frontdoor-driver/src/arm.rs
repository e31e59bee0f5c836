use std::time::Duration;

use async_trait::async_trait;
use frontdoor_config::ClientSettings;
use serde_json::Value;
use tracing::{debug, info};

use crate::error::DriverError;

// ── Token provider ────────────────────────────────────────────────────────────

/// Source of the bearer token attached to every request.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn token(&self) -> Result<String, DriverError>;
}

/// A token acquired out of band, e.g. `az account get-access-token`.
pub struct StaticToken(pub String);

#[async_trait]
impl TokenProvider for StaticToken {
    async fn token(&self) -> Result<String, DriverError> {
        if self.0.is_empty() {
            return Err(DriverError::Internal("no access token configured".into()));
        }
        Ok(self.0.clone())
    }
}

// ── ArmClient ─────────────────────────────────────────────────────────────────

/// Thin Azure Resource Manager client: bearer auth, `api-version`, and polling
/// of long-running operations.
pub struct ArmClient {
    client:      reqwest::Client,
    token:       Box<dyn TokenProvider>,
    base:        String,
    api_version: String,
    poll_delays: Vec<u64>,
    max_polls:   usize,
}

impl ArmClient {
    pub fn new(settings: &ClientSettings) -> Self {
        Self::with_token_provider(settings, Box::new(StaticToken(settings.access_token.clone())))
    }

    pub fn with_token_provider(settings: &ClientSettings, token: Box<dyn TokenProvider>) -> Self {
        let poll_delays = if settings.poll_delays_secs.is_empty() {
            vec![1]
        } else {
            settings.poll_delays_secs.clone()
        };
        Self {
            client: reqwest::Client::new(),
            token,
            base: settings.management_url.trim_end_matches('/').to_string(),
            api_version: settings.api_version.clone(),
            poll_delays,
            max_polls: settings.max_polls,
        }
    }

    /// Absolute URL for an ARM resource id.
    pub fn resource_url(&self, resource_id: &str) -> String {
        format!("{}{}?api-version={}", self.base, resource_id, self.api_version)
    }

    async fn bearer(&self) -> Result<String, DriverError> {
        self.token.token().await
    }

    // ── ARM error parsing ─────────────────────────────────────────────────────

    pub(crate) fn parse_arm_error(body: &Value) -> String {
        let err = body
            .get("error")
            .or_else(|| body.get("Error"))
            .unwrap_or(body);
        let code    = err["code"].as_str().unwrap_or("Unknown");
        let message = err["message"].as_str().unwrap_or("unknown error");
        format!("{}: {}", code, message)
    }

    // ── ARM async polling ─────────────────────────────────────────────────────

    /// Poll an ARM async operation URL until it completes or the poll budget
    /// runs out.
    ///
    /// Azure 202 responses carry an `Azure-AsyncOperation` or `Location` header.
    /// A `Location` poll answers 202 while pending and 200/204 when done; an
    /// `Azure-AsyncOperation` poll reports `status`.
    pub(crate) async fn wait_for_operation(&self, op_url: &str) -> Result<Value, DriverError> {
        let token = self.bearer().await?;

        for (i, &delay) in self.poll_delays.iter().cycle().take(self.max_polls).enumerate() {
            let resp = self
                .client
                .get(op_url)
                .bearer_auth(&token)
                .send()
                .await
                .map_err(|e| DriverError::Internal(format!("poll {}: {}", op_url, e)))?;

            let http_status = resp.status().as_u16();
            let body: Value = resp.json().await.unwrap_or(Value::Null);

            match body["status"].as_str() {
                Some("Succeeded") => return Ok(body),
                Some(s @ ("Failed" | "Canceled")) => {
                    return Err(DriverError::OperationFailed(format!(
                        "ARM operation {}: {}",
                        s,
                        Self::parse_arm_error(&body)
                    )));
                }
                Some(_) => {}
                None if http_status == 200 || http_status == 204 => return Ok(body),
                None if http_status >= 400 => {
                    return Err(DriverError::OperationFailed(format!(
                        "poll {}: status {}: {}",
                        op_url,
                        http_status,
                        Self::parse_arm_error(&body)
                    )));
                }
                None => {}
            }

            let poll = i + 1;
            if poll % 10 == 0 {
                info!(poll, op_url, "still waiting for Azure ARM operation");
            } else {
                debug!(poll, op_url, delay, "Azure ARM operation pending, waiting");
            }
            tokio::time::sleep(Duration::from_secs(delay)).await;
        }

        Err(DriverError::OperationFailed(format!(
            "Azure ARM operation timed out after {} polls: {}",
            self.max_polls, op_url
        )))
    }

    // ── ARM HTTP verbs ────────────────────────────────────────────────────────

    /// GET a resource. Returns `None` on 404.
    pub async fn get(&self, resource_id: &str) -> Result<Option<Value>, DriverError> {
        let token = self.bearer().await?;
        let url = self.resource_url(resource_id);
        debug!(url, "Azure ARM GET");
        let resp = self
            .client
            .get(&url)
            .bearer_auth(&token)
            .send()
            .await
            .map_err(|e| api_error(resource_id, e))?;

        let status = resp.status().as_u16();
        let body: Value = resp.json().await.unwrap_or(Value::Null);
        match status {
            404 => Ok(None),
            s if (200..300).contains(&s) => Ok(Some(body)),
            s => Err(DriverError::Api {
                id: resource_id.to_string(),
                message: format!("status {}: {}", s, Self::parse_arm_error(&body)),
            }),
        }
    }

    /// PUT a resource and wait for the operation to finish.
    pub async fn put_and_wait(&self, resource_id: &str, body: &Value) -> Result<Value, DriverError> {
        let token = self.bearer().await?;
        let url = self.resource_url(resource_id);
        debug!(url, "Azure ARM PUT");
        let resp = self
            .client
            .put(&url)
            .bearer_auth(&token)
            .json(body)
            .send()
            .await
            .map_err(|e| DriverError::OperationFailed(format!("PUT {}: {}", resource_id, e)))?;

        let status = resp.status().as_u16();
        let async_op = async_operation_url(&resp);
        let body_val: Value = resp.json().await.unwrap_or(Value::Null);

        match status {
            200 | 201 => {
                if let Some(op_url) = async_op.filter(|_| provisioning_pending(&body_val)) {
                    self.wait_for_operation(&op_url).await?;
                    return self.get(resource_id).await?.ok_or_else(|| DriverError::Api {
                        id: resource_id.to_string(),
                        message: "resource missing after create".into(),
                    });
                }
                Ok(body_val)
            }
            202 => {
                if let Some(op_url) = async_op {
                    self.wait_for_operation(&op_url).await?;
                }
                self.get(resource_id).await?.ok_or_else(|| DriverError::Api {
                    id: resource_id.to_string(),
                    message: "resource missing after create".into(),
                })
            }
            s => Err(DriverError::OperationFailed(format!(
                "PUT {}: status {}: {}",
                resource_id,
                s,
                Self::parse_arm_error(&body_val)
            ))),
        }
    }

    /// DELETE a resource. 404 counts as already deleted.
    pub async fn delete(&self, resource_id: &str) -> Result<(), DriverError> {
        let token = self.bearer().await?;
        let url = self.resource_url(resource_id);
        debug!(url, "Azure ARM DELETE");
        let resp = self
            .client
            .delete(&url)
            .bearer_auth(&token)
            .send()
            .await
            .map_err(|e| DriverError::OperationFailed(format!("DELETE {}: {}", resource_id, e)))?;

        let status = resp.status().as_u16();
        if status == 202 {
            if let Some(op_url) = async_operation_url(&resp) {
                self.wait_for_operation(&op_url).await?;
            }
            return Ok(());
        }
        if status == 404 || (200..300).contains(&status) {
            return Ok(());
        }

        let body: Value = resp.json().await.unwrap_or(Value::Null);
        Err(DriverError::OperationFailed(format!(
            "DELETE {}: status {}: {}",
            resource_id,
            status,
            Self::parse_arm_error(&body)
        )))
    }
}

// ── Helper functions ──────────────────────────────────────────────────────────

fn async_operation_url(resp: &reqwest::Response) -> Option<String> {
    resp.headers()
        .get("Azure-AsyncOperation")
        .or_else(|| resp.headers().get("Location"))
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
}

fn provisioning_pending(body: &Value) -> bool {
    !matches!(
        body["properties"]["provisioningState"].as_str(),
        None | Some("Succeeded")
    )
}

fn api_error(resource_id: &str, e: reqwest::Error) -> DriverError {
    DriverError::Api {
        id: resource_id.to_string(),
        message: e.to_string(),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::{
        matchers::{header, method, path, query_param},
        Mock, MockServer, ResponseTemplate,
    };

    pub(crate) fn client(server: &MockServer) -> ArmClient {
        let mut settings = ClientSettings::new("fake-token").with_management_url(server.uri());
        settings.poll_delays_secs = vec![0];
        settings.max_polls = 3;
        ArmClient::new(&settings)
    }

    #[tokio::test]
    async fn get_sends_bearer_and_api_version() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/things/a"))
            .and(query_param("api-version", "2021-06-01"))
            .and(header("authorization", "Bearer fake-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "name": "a" })))
            .mount(&server)
            .await;

        let body = client(&server).get("/things/a").await.unwrap().unwrap();
        assert_eq!(body["name"], "a");
    }

    #[tokio::test]
    async fn get_not_found_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/things/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "error": { "code": "NotFound", "message": "gone" }
            })))
            .mount(&server)
            .await;

        assert!(client(&server).get("/things/missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn get_server_error_is_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/things/broken"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({
                "error": { "code": "InternalServerError", "message": "boom" }
            })))
            .mount(&server)
            .await;

        let err = client(&server).get("/things/broken").await.unwrap_err();
        assert!(matches!(err, DriverError::Api { .. }));
        assert!(err.to_string().contains("InternalServerError: boom"), "got: {}", err);
    }

    #[tokio::test]
    async fn put_accepted_polls_then_reads_back() {
        let server = MockServer::start().await;
        let op_url = format!("{}/operations/op1", server.uri());
        Mock::given(method("PUT"))
            .and(path("/things/a"))
            .respond_with(
                ResponseTemplate::new(202).insert_header("Azure-AsyncOperation", op_url.as_str()),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/operations/op1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "Succeeded" })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/things/a"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "name": "a" })))
            .mount(&server)
            .await;

        let body = client(&server).put_and_wait("/things/a", &json!({})).await.unwrap();
        assert_eq!(body["name"], "a");
    }

    #[tokio::test]
    async fn wait_for_operation_fails_on_failed_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/operations/op-fail"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "Failed",
                "error": { "code": "InternalError", "message": "Something went wrong" }
            })))
            .mount(&server)
            .await;

        let url = format!("{}/operations/op-fail", server.uri());
        let err = client(&server).wait_for_operation(&url).await.unwrap_err();
        assert!(err.to_string().contains("Failed"), "got: {}", err);
    }

    #[tokio::test]
    async fn wait_for_operation_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/operations/slow"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "InProgress" })))
            .expect(3)
            .mount(&server)
            .await;

        let url = format!("{}/operations/slow", server.uri());
        let err = client(&server).wait_for_operation(&url).await.unwrap_err();
        assert!(err.to_string().contains("timed out after 3 polls"), "got: {}", err);
    }

    #[tokio::test]
    async fn delete_not_found_is_ok() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/things/gone"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        client(&server).delete("/things/gone").await.unwrap();
    }

    #[tokio::test]
    async fn delete_conflict_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/things/busy"))
            .respond_with(ResponseTemplate::new(409).set_body_json(json!({
                "error": { "code": "Conflict", "message": "in use" }
            })))
            .mount(&server)
            .await;

        let err = client(&server).delete("/things/busy").await.unwrap_err();
        assert!(err.to_string().contains("Conflict: in use"), "got: {}", err);
    }

    #[tokio::test]
    async fn empty_token_fails_before_request() {
        let server = MockServer::start().await;
        let settings = ClientSettings::new("").with_management_url(server.uri());
        let err = ArmClient::new(&settings).get("/things/a").await.unwrap_err();
        assert!(matches!(err, DriverError::Internal(_)));
        let received = server.received_requests().await.unwrap_or_default();
        assert!(received.is_empty());
    }

    #[test]
    fn parse_arm_error_standard() {
        let body = json!({
            "error": { "code": "ResourceNotFound", "message": "The resource was not found" }
        });
        let msg = ArmClient::parse_arm_error(&body);
        assert_eq!(msg, "ResourceNotFound: The resource was not found");
    }

    #[test]
    fn parse_arm_error_missing_fields_gives_fallback() {
        let body = json!({ "error": {} });
        assert_eq!(ArmClient::parse_arm_error(&body), "Unknown: unknown error");
    }
}
