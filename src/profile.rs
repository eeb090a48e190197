use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use tracing::{debug, warn};

use crate::{FlowError, Session};

/// A loan-application field: a JSON number (integer or float form kept as sent), a categorical
/// string, or an explicit `null`, which is forwarded as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Number(Number),
    Text(String),
    Null,
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Self::Number(value.into())
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanApplication {
    pub age: Scalar,
    pub income: Scalar,
    pub ownership: Scalar,
    pub employment_len: Scalar,
    pub loan_intent: Scalar,
    pub loan_amnt: Scalar,
    pub loan_int_rate: Scalar,
    pub loan_percent_income: Scalar,
    pub cred_hist_len: Scalar,
}

/// A validated profile: only constructed once the loan application and credit score are known
/// to be present.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub name: String,
    pub loan_application: LoanApplication,
    pub credit_score: Number,
}

/// The profile as the backend sends it, before anything is known to be present.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProfileRecord {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    loan_application: Option<Value>,
    #[serde(default)]
    credit_score: Option<Number>,
}

impl TryFrom<ProfileRecord> for UserProfile {
    type Error = FlowError;

    fn try_from(record: ProfileRecord) -> Result<Self, Self::Error> {
        let application = match record.loan_application {
            None | Some(Value::Null) => return Err(FlowError::ProfileUnavailable),
            Some(value) => value,
        };
        let loan_application = serde_json::from_value::<LoanApplication>(application)
            .map_err(|err| {
                warn!(error = %err, "profile carries an incomplete loan application");
                FlowError::ProfileUnavailable
            })?;
        let credit_score = record.credit_score.ok_or(FlowError::ProfileUnavailable)?;

        Ok(Self {
            name: record.name.unwrap_or_default(),
            loan_application,
            credit_score,
        })
    }
}

/// Decode a profile response body.
///
/// An empty body or a JSON `null` means the backend has no record for this user.
pub fn parse_profile(body: &str) -> Result<UserProfile, FlowError> {
    if body.trim().is_empty() {
        return Err(FlowError::ProfileUnavailable);
    }

    let record: Option<ProfileRecord> = serde_json::from_str(body)
        .map_err(|err| FlowError::Transport(format!("Invalid profile response: {err}")))?;

    record.ok_or(FlowError::ProfileUnavailable)?.try_into()
}

#[async_trait]
pub trait ProfileFetcher: Send + Sync {
    async fn fetch(&self, session: &Session) -> Result<UserProfile, FlowError>;
}

pub struct HttpProfileFetcher {
    client: reqwest::Client,
    url: String,
}

impl HttpProfileFetcher {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl ProfileFetcher for HttpProfileFetcher {
    async fn fetch(&self, session: &Session) -> Result<UserProfile, FlowError> {
        debug!(url = %self.url, "fetching user profile");

        let response = session
            .apply(self.client.get(&self.url))
            .send()
            .await
            .map_err(FlowError::transport)?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(FlowError::ProfileUnavailable);
        }
        if !status.is_success() {
            return Err(FlowError::Transport(format!(
                "Profile request failed ({status})"
            )));
        }

        let body = response.text().await.map_err(FlowError::transport)?;
        parse_profile(&body)
    }
}
