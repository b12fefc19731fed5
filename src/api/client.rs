//! Async reqwest client for the tenant backend.

use super::types::*;
use super::ConsoleApi;
use crate::config::{ApiConfig, SecretString};
use crate::error::{ConsoleError, Result};
use crate::wizard::FormFields;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use std::time::Duration;

#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    token: Option<SecretString>,
    http: Client,
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) if !token.is_empty() => {
                request.header(reqwest::header::AUTHORIZATION, token.bearer())
            }
            _ => request,
        }
    }

    /// Send, reject non-2xx with the body text, decode JSON.
    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        what: &'static str,
    ) -> Result<(u16, T)> {
        let resp = self.authorize(request).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!("{} failed with {}: {}", what, status, body);
            return Err(ConsoleError::Status {
                status: status.as_u16(),
                body,
            });
        }
        let text = resp.text().await?;
        let parsed = serde_json::from_str(&text).map_err(|e| ConsoleError::decode(what, e))?;
        Ok((status.as_u16(), parsed))
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        what: &'static str,
    ) -> Result<(u16, T)> {
        tracing::debug!("GET {}", path);
        self.send(self.http.get(self.url(path)), what).await
    }

    pub(crate) async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        what: &'static str,
    ) -> Result<(u16, T)> {
        tracing::debug!("POST {}", path);
        self.send(self.http.post(self.url(path)).json(body), what)
            .await
    }
}

#[async_trait]
impl ConsoleApi for ApiClient {
    async fn session(&self) -> Result<SessionInfo> {
        let (status, env): (u16, ApiEnvelope<SessionInfo>) =
            self.get_json("/auth/session", "session").await?;
        env.into_data(status, "session")
    }

    async fn submit_organization(&self, fields: &FormFields) -> Result<OrganizationOnboarding> {
        let (status, env): (u16, ApiEnvelope<OrganizationOnboarding>) = self
            .post_json("/organization/onboarding", fields, "organization onboarding")
            .await?;
        env.into_data(status, "organization onboarding")
    }

    async fn create_campaign(
        &self,
        organization_id: &str,
        fields: &FormFields,
    ) -> Result<CampaignCreated> {
        let mut body = serde_json::to_value(fields)
            .map_err(|e| ConsoleError::decode("campaign request", e))?;
        if let Some(map) = body.as_object_mut() {
            map.insert("organizationId".to_string(), json!(organization_id));
        }
        let (status, env): (u16, ApiEnvelope<CampaignCreated>) =
            self.post_json("/campaigns", &body, "campaign").await?;
        env.into_data(status, "campaign")
    }

    async fn mark_onboarded(&self, organization_id: &str) -> Result<()> {
        let (status, env): (u16, ApiEnvelope<serde_json::Value>) = self
            .post_json(
                "/organization/onboarded",
                &json!({ "organizationId": organization_id, "onboarded": true }),
                "onboarding flag",
            )
            .await?;
        match env.status {
            Some(s) if !s.is_success() => Err(ConsoleError::Status {
                status,
                body: env
                    .message
                    .unwrap_or_else(|| "onboarding flag was rejected".to_string()),
            }),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    fn client_for(server: &Server, token: Option<&str>) -> ApiClient {
        ApiClient::new(&ApiConfig {
            base_url: format!("{}/", server.url()),
            timeout_secs: 5,
            token: token.map(SecretString::from_str),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_session_sends_bearer_token() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/auth/session")
            .match_header("authorization", "Bearer tok_123")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"status":true,"data":{"userId":"u1","organizationId":"org_1",
                    "accountClass":"admin","permissions":[{"module":"events","method":"get"}],
                    "onboarded":true}}"#,
            )
            .create_async()
            .await;

        let session = client_for(&server, Some("tok_123")).session().await.unwrap();

        mock.assert_async().await;
        assert_eq!(session.organization_id.as_deref(), Some("org_1"));
        assert!(session.onboarded);
        assert_eq!(session.permissions.len(), 1);
    }

    #[tokio::test]
    async fn test_non_success_status_keeps_body() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/campaigns")
            .with_status(422)
            .with_body("Campaign name already used")
            .create_async()
            .await;

        let fields: FormFields = [("name", "Drive")].into_iter().collect();
        let err = client_for(&server, None)
            .create_campaign("org_1", &fields)
            .await
            .unwrap_err();

        match &err {
            ConsoleError::Status { status, body } => {
                assert_eq!(*status, 422);
                assert_eq!(body, "Campaign name already used");
            }
            other => panic!("unexpected: {other:?}"),
        }
        assert_eq!(err.user_message(), "Campaign name already used");
    }

    #[tokio::test]
    async fn test_create_campaign_body() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/campaigns")
            .match_body(Matcher::PartialJson(json!({
                "organizationId": "org_1",
                "name": "Spring Drive",
                "targetAmount": "5000"
            })))
            .with_status(201)
            .with_body(r#"{"status":"success","data":{"id":"cmp_7"}}"#)
            .create_async()
            .await;

        let fields: FormFields = [("name", "Spring Drive"), ("targetAmount", "5000")]
            .into_iter()
            .collect();
        let created = client_for(&server, None)
            .create_campaign("org_1", &fields)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(created.id, "cmp_7");
    }

    #[tokio::test]
    async fn test_undecodable_response() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/auth/session")
            .with_status(200)
            .with_body("<html>maintenance</html>")
            .create_async()
            .await;

        let err = client_for(&server, None).session().await.unwrap_err();
        assert!(matches!(err, ConsoleError::Decode { what: "session", .. }));
    }

    #[tokio::test]
    async fn test_mark_onboarded_rejected() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/organization/onboarded")
            .with_status(200)
            .with_body(r#"{"status":false,"message":"not allowed"}"#)
            .create_async()
            .await;

        let err = client_for(&server, None)
            .mark_onboarded("org_1")
            .await
            .unwrap_err();
        assert_eq!(err.user_message(), "not allowed");
    }

    #[tokio::test]
    async fn test_organization_submit_returns_onboarding_url() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/organization/onboarding")
            .with_status(200)
            .with_body(
                r#"{"data":{"stripeAccountId":"acct_9","onboardingUrl":"https://connect.stripe.com/setup/s/abc"}}"#,
            )
            .create_async()
            .await;

        let fields: FormFields = [("organizationName", "Harbor")].into_iter().collect();
        let result = client_for(&server, None)
            .submit_organization(&fields)
            .await
            .unwrap();
        assert_eq!(result.stripe_account_id.as_deref(), Some("acct_9"));
        assert!(result.onboarding_url.is_some());
    }
}
