use axum::http::HeaderMap;
use reqwest::header::{HeaderName, AUTHORIZATION, COOKIE};
use reqwest::RequestBuilder;

/// Caller identity forwarded verbatim to the profile backend.
///
/// Nothing here inspects or validates the credential; it only travels with the request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub cookie: Option<String>,
    pub authorization: Option<String>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn from_headers(headers: &HeaderMap) -> Self {
        let read = |name: HeaderName| {
            headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string)
        };

        Self {
            cookie: read(COOKIE),
            authorization: read(AUTHORIZATION),
        }
    }

    pub(crate) fn apply(&self, mut request: RequestBuilder) -> RequestBuilder {
        if let Some(cookie) = &self.cookie {
            request = request.header(COOKIE, cookie.as_str());
        }
        if let Some(authorization) = &self.authorization {
            request = request.header(AUTHORIZATION, authorization.as_str());
        }
        request
    }
}
