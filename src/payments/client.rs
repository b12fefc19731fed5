//! Payment-provider endpoints of the tenant backend.

use super::types::AccountStatus;
use crate::api::{ApiClient, ApiEnvelope, ApiStatus};
use crate::error::{ConsoleError, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

#[async_trait]
pub trait PaymentsApi: Send + Sync {
    async fn account_status(&self, organization_id: &str) -> Result<AccountStatus>;

    /// Create (or re-link) the connected account and return the provider
    /// onboarding URL. The provider sends the browser to `return_url` when
    /// onboarding finishes and to `refresh_url` when the link expired.
    async fn create_account(
        &self,
        organization_id: &str,
        return_url: &str,
        refresh_url: &str,
    ) -> Result<String>;
}

#[derive(Debug, Deserialize)]
struct UrlData {
    #[serde(default)]
    url: Option<String>,
}

/// `createAccount` answers `{url}` on some deployments and
/// `{status, data:{url}}` on others.
#[derive(Debug, Deserialize)]
struct CreateAccountResponse {
    #[serde(default)]
    status: Option<ApiStatus>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    data: Option<UrlData>,
}

impl CreateAccountResponse {
    fn into_url(self, http_status: u16) -> Result<String> {
        if let Some(status) = &self.status
            && !status.is_success()
        {
            return Err(ConsoleError::Status {
                status: http_status,
                body: self
                    .message
                    .unwrap_or_else(|| "Payment account could not be created".to_string()),
            });
        }
        self.url
            .or_else(|| self.data.and_then(|d| d.url))
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| {
                ConsoleError::Handoff("The server did not return a payment setup link".to_string())
            })
    }
}

#[async_trait]
impl PaymentsApi for ApiClient {
    async fn account_status(&self, organization_id: &str) -> Result<AccountStatus> {
        let (status, env): (u16, ApiEnvelope<AccountStatus>) = self
            .post_json(
                "/stripe/accountStatus",
                &json!({ "organizationId": organization_id }),
                "account status",
            )
            .await?;
        env.into_data(status, "account status")
    }

    async fn create_account(
        &self,
        organization_id: &str,
        return_url: &str,
        refresh_url: &str,
    ) -> Result<String> {
        let (status, resp): (u16, CreateAccountResponse) = self
            .post_json(
                "/stripe/createAccount",
                &json!({
                    "organizationId": organization_id,
                    "returnUrl": return_url,
                    "refreshUrl": refresh_url,
                }),
                "create account",
            )
            .await?;
        resp.into_url(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiConfig;
    use mockito::{Matcher, Server};

    fn client_for(server: &Server) -> ApiClient {
        ApiClient::new(&ApiConfig {
            base_url: server.url(),
            ..ApiConfig::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_account_status() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/stripe/accountStatus")
            .match_body(Matcher::Json(json!({ "organizationId": "org_1" })))
            .with_status(200)
            .with_body(
                r#"{"status":200,"data":{"isFullyVerified":true,"chargesEnabled":true,"payoutsEnabled":true}}"#,
            )
            .create_async()
            .await;

        let status = client_for(&server).account_status("org_1").await.unwrap();
        mock.assert_async().await;
        assert!(status.is_ready());
    }

    #[tokio::test]
    async fn test_create_account_flat_url() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/stripe/createAccount")
            .with_status(200)
            .with_body(r#"{"url":"https://connect.stripe.com/setup/e/acct_1"}"#)
            .create_async()
            .await;

        let url = client_for(&server)
            .create_account(
                "org_1",
                "http://127.0.0.1:18795/setup/return?stripe_success=true",
                "http://127.0.0.1:18795/setup/return",
            )
            .await
            .unwrap();
        assert_eq!(url, "https://connect.stripe.com/setup/e/acct_1");
    }

    #[tokio::test]
    async fn test_create_account_nested_url() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/stripe/createAccount")
            .match_body(Matcher::PartialJson(json!({
                "returnUrl": "http://127.0.0.1:1/setup/return?stripe_success=true",
                "refreshUrl": "http://127.0.0.1:1/setup/return"
            })))
            .with_status(200)
            .with_body(r#"{"status":true,"data":{"url":"https://connect.stripe.com/x"}}"#)
            .create_async()
            .await;

        let url = client_for(&server)
            .create_account(
                "org_1",
                "http://127.0.0.1:1/setup/return?stripe_success=true",
                "http://127.0.0.1:1/setup/return",
            )
            .await
            .unwrap();
        assert_eq!(url, "https://connect.stripe.com/x");
    }

    #[tokio::test]
    async fn test_create_account_without_url() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/stripe/createAccount")
            .with_status(200)
            .with_body(r#"{"status":true}"#)
            .create_async()
            .await;

        let err = client_for(&server)
            .create_account(
                "org_1",
                "http://127.0.0.1:1/setup/return?stripe_success=true",
                "http://127.0.0.1:1/setup/return",
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ConsoleError::Handoff(_)));
    }
}
