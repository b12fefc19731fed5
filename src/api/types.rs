use crate::error::{ConsoleError, Result};
use crate::navigation::{AccountClass, Permission};
use serde::{Deserialize, Serialize};

/// The backend reports `status` as a bool, a numeric code or a word,
/// depending on the endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ApiStatus {
    Flag(bool),
    Code(i64),
    Text(String),
}

impl ApiStatus {
    pub fn is_success(&self) -> bool {
        match self {
            Self::Flag(ok) => *ok,
            Self::Code(code) => (200..300).contains(code) || *code == 1,
            Self::Text(word) => {
                let word = word.trim();
                word.eq_ignore_ascii_case("success") || word.eq_ignore_ascii_case("ok")
            }
        }
    }
}

/// `{status, message, data}` wrapper most endpoints answer with.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope<T> {
    #[serde(default)]
    pub status: Option<ApiStatus>,
    #[serde(default)]
    pub message: Option<String>,
    pub data: Option<T>,
}

impl<T> ApiEnvelope<T> {
    /// Payload of a successful envelope. A missing status counts as success.
    pub fn into_data(self, http_status: u16, what: &'static str) -> Result<T> {
        if let Some(status) = &self.status
            && !status.is_success()
        {
            return Err(ConsoleError::Status {
                status: http_status,
                body: self
                    .message
                    .unwrap_or_else(|| format!("{what} was rejected")),
            });
        }
        self.data.ok_or_else(|| ConsoleError::Status {
            status: http_status,
            body: format!("{what} response had no data"),
        })
    }
}

/// Current user as seen by the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    pub user_id: String,
    #[serde(default)]
    pub organization_id: Option<String>,
    #[serde(default)]
    pub account_class: AccountClass,
    #[serde(default)]
    pub permissions: Vec<Permission>,
    /// Server-side onboarding flag; authoritative over the local copy.
    #[serde(default)]
    pub onboarded: bool,
}

/// Answer to the organization setup submit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawOrganizationOnboarding")]
pub struct OrganizationOnboarding {
    pub organization_id: Option<String>,
    pub stripe_account_id: Option<String>,
    /// Provider onboarding link; present when the account still needs setup.
    pub onboarding_url: Option<String>,
}

/// Wire shape of [`OrganizationOnboarding`]. Older backends send the id as
/// `id`; when both keys are present `organizationId` wins.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawOrganizationOnboarding {
    #[serde(default)]
    organization_id: Option<String>,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    stripe_account_id: Option<String>,
    #[serde(default)]
    onboarding_url: Option<String>,
}

impl From<RawOrganizationOnboarding> for OrganizationOnboarding {
    fn from(raw: RawOrganizationOnboarding) -> Self {
        Self {
            organization_id: raw.organization_id.or(raw.id),
            stripe_account_id: raw.stripe_account_id,
            onboarding_url: raw.onboarding_url,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignCreated {
    pub id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(r#"true"#, true)]
    #[case(r#"false"#, false)]
    #[case(r#"200"#, true)]
    #[case(r#"1"#, true)]
    #[case(r#"0"#, false)]
    #[case(r#"400"#, false)]
    #[case(r#""success""#, true)]
    #[case(r#""OK""#, true)]
    #[case(r#""error""#, false)]
    fn test_status_shapes(#[case] raw: &str, #[case] ok: bool) {
        let status: ApiStatus = serde_json::from_str(raw).unwrap();
        assert_eq!(status.is_success(), ok);
    }

    #[test]
    fn test_failed_envelope_carries_message() {
        let env: ApiEnvelope<CampaignCreated> =
            serde_json::from_str(r#"{"status":false,"message":"Name already taken"}"#).unwrap();
        match env.into_data(200, "campaign") {
            Err(ConsoleError::Status { status, body }) => {
                assert_eq!(status, 200);
                assert_eq!(body, "Name already taken");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_envelope_without_status() {
        let env: ApiEnvelope<CampaignCreated> =
            serde_json::from_str(r#"{"data":{"id":"c1"}}"#).unwrap();
        assert_eq!(env.into_data(201, "campaign").unwrap().id, "c1");
    }

    #[test]
    fn test_session_defaults() {
        let session: SessionInfo = serde_json::from_str(r#"{"userId":"u1"}"#).unwrap();
        assert_eq!(session.account_class, AccountClass::Staff);
        assert!(session.permissions.is_empty());
        assert!(!session.onboarded);
    }

    #[test]
    fn test_onboarding_response() {
        let parsed: OrganizationOnboarding = serde_json::from_str(
            r#"{"id":"org_9","stripeAccountId":"acct_1","onboardingUrl":"https://connect.stripe.com/x"}"#,
        )
        .unwrap();
        assert_eq!(parsed.organization_id.as_deref(), Some("org_9"));
        assert_eq!(
            parsed.onboarding_url.as_deref(),
            Some("https://connect.stripe.com/x")
        );
    }

    #[test]
    fn test_onboarding_response_with_both_id_keys() {
        let parsed: OrganizationOnboarding =
            serde_json::from_str(r#"{"id":"legacy_1","organizationId":"org_9"}"#).unwrap();
        assert_eq!(parsed.organization_id.as_deref(), Some("org_9"));
        assert_eq!(parsed.onboarding_url, None);

        let empty: OrganizationOnboarding = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, OrganizationOnboarding::default());
    }
}
