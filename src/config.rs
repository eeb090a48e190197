use std::env;

pub const DEFAULT_PROFILE_URL: &str = "http://127.0.0.1:5000/api/user/profile";
pub const DEFAULT_ANALYSIS_URL: &str = "https://servolend-analysis.onrender.com/analyse";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub profile_url: String,
    pub analysis_url: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let port = env::var("PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(3000);

        let profile_url =
            non_empty_var("PROFILE_URL").unwrap_or_else(|| DEFAULT_PROFILE_URL.to_string());
        let analysis_url =
            non_empty_var("ANALYSIS_URL").unwrap_or_else(|| DEFAULT_ANALYSIS_URL.to_string());

        Self {
            port,
            profile_url,
            analysis_url,
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
