use async_trait::async_trait;
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use serde_json::Number;
use tracing::debug;

use crate::profile::{Scalar, UserProfile};
use crate::FlowError;

/// Flat body posted to the analysis service.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisRequest {
    pub name: String,
    pub age: Scalar,
    pub income: Scalar,
    pub ownership: Scalar,
    pub employment_len: Scalar,
    pub loan_intent: Scalar,
    pub loan_amnt: Scalar,
    pub loan_int_rate: Scalar,
    pub loan_percent_income: Scalar,
    pub cred_hist_len: Scalar,
    #[serde(rename = "creditScore")]
    pub credit_score: Number,
}

impl AnalysisRequest {
    /// Copies every field across unchanged.
    pub fn from_profile(profile: &UserProfile) -> Self {
        let application = &profile.loan_application;

        Self {
            name: profile.name.clone(),
            age: application.age.clone(),
            income: application.income.clone(),
            ownership: application.ownership.clone(),
            employment_len: application.employment_len.clone(),
            loan_intent: application.loan_intent.clone(),
            loan_amnt: application.loan_amnt.clone(),
            loan_int_rate: application.loan_int_rate.clone(),
            loan_percent_income: application.loan_percent_income.clone(),
            cred_hist_len: application.cred_hist_len.clone(),
            credit_score: profile.credit_score.clone(),
        }
    }
}

/// Markdown verdict returned by the analysis service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub message: String,
}

#[async_trait]
pub trait AnalysisRequester: Send + Sync {
    async fn request(&self, payload: &AnalysisRequest) -> Result<AnalysisResult, FlowError>;
}

pub struct HttpAnalysisClient {
    client: reqwest::Client,
    url: String,
}

impl HttpAnalysisClient {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl AnalysisRequester for HttpAnalysisClient {
    async fn request(&self, payload: &AnalysisRequest) -> Result<AnalysisResult, FlowError> {
        debug!(url = %self.url, "requesting loan analysis");

        let response = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .json(payload)
            .send()
            .await
            .map_err(FlowError::transport)?;

        if !response.status().is_success() {
            debug!(status = %response.status(), "analysis service rejected the request");
            return Err(FlowError::AnalysisRequestFailed);
        }

        let body = response.text().await.map_err(FlowError::transport)?;
        parse_analysis(&body)
    }
}

fn parse_analysis(body: &str) -> Result<AnalysisResult, FlowError> {
    serde_json::from_str(body).map_err(|err| FlowError::AnalysisParse(err.to_string()))
}
