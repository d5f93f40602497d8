use std::env;
use std::time::Duration;

use restyle_contracts::errors::ServiceInitError;

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image-preview";

/// Everything the Gemini client needs, resolved once at startup.
#[derive(Clone, PartialEq)]
pub struct ServiceConfig {
    pub api_key: String,
    pub api_base: String,
    pub model: String,
    /// `None` waits for the service indefinitely.
    pub request_timeout: Option<Duration>,
}

impl std::fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("api_key", &"<redacted>")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, ServiceInitError> {
        Self::from_lookup(non_empty_env)
    }

    /// Resolves from any key lookup; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ServiceInitError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let api_key = read("GEMINI_API_KEY")
            .or_else(|| read("GOOGLE_API_KEY"))
            .ok_or(ServiceInitError::MissingApiKey)?;
        let api_base = read("GEMINI_API_BASE")
            .map(|value| value.trim_end_matches('/').to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        let model = read("GEMINI_IMAGE_MODEL").unwrap_or_else(|| DEFAULT_IMAGE_MODEL.to_string());
        let request_timeout = match read("GEMINI_REQUEST_TIMEOUT") {
            Some(raw) => Some(parse_timeout(&raw)?),
            None => None,
        };

        Ok(Self {
            api_key,
            api_base,
            model,
            request_timeout,
        })
    }

    pub fn with_model(mut self, model: Option<&str>) -> Self {
        if let Some(model) = model.map(str::trim).filter(|value| !value.is_empty()) {
            self.model = model.to_string();
        }
        self
    }

    pub fn endpoint(&self) -> String {
        let trimmed = self.model.trim();
        let model_path = if trimmed.starts_with("models/") {
            trimmed.to_string()
        } else {
            format!("models/{trimmed}")
        };
        format!("{}/{}:generateContent", self.api_base, model_path)
    }
}

fn parse_timeout(raw: &str) -> Result<Duration, ServiceInitError> {
    raw.parse::<f64>()
        .ok()
        .filter(|seconds| seconds.is_finite() && *seconds > 0.0)
        .map(Duration::from_secs_f64)
        .ok_or_else(|| ServiceInitError::InvalidTimeout(raw.to_string()))
}

fn non_empty_env(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::time::Duration;

    use restyle_contracts::errors::ServiceInitError;

    use super::{ServiceConfig, DEFAULT_API_BASE, DEFAULT_IMAGE_MODEL};

    fn config_from(pairs: &[(&str, &str)]) -> Result<ServiceConfig, ServiceInitError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        ServiceConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn missing_key_is_an_init_error() {
        let err = config_from(&[("GEMINI_API_KEY", "   ")]).unwrap_err();
        assert!(matches!(err, ServiceInitError::MissingApiKey));
    }

    #[test]
    fn defaults_apply_when_only_a_key_is_set() {
        let config = config_from(&[("GOOGLE_API_KEY", "g-key")]).unwrap();
        assert_eq!(config.api_key, "g-key");
        assert_eq!(config.api_base, DEFAULT_API_BASE);
        assert_eq!(config.model, DEFAULT_IMAGE_MODEL);
        assert_eq!(config.request_timeout, None);
        assert_eq!(
            config.endpoint(),
            format!("{DEFAULT_API_BASE}/models/{DEFAULT_IMAGE_MODEL}:generateContent")
        );
    }

    #[test]
    fn gemini_key_wins_and_overrides_are_read() {
        let config = config_from(&[
            ("GEMINI_API_KEY", "primary"),
            ("GOOGLE_API_KEY", "secondary"),
            ("GEMINI_API_BASE", "http://localhost:9000/v1/"),
            ("GEMINI_IMAGE_MODEL", "models/custom-image"),
            ("GEMINI_REQUEST_TIMEOUT", "45"),
        ])
        .unwrap();
        assert_eq!(config.api_key, "primary");
        assert_eq!(config.request_timeout, Some(Duration::from_secs(45)));
        assert_eq!(
            config.endpoint(),
            "http://localhost:9000/v1/models/custom-image:generateContent"
        );
    }

    #[test]
    fn bad_timeout_is_rejected() {
        let err = config_from(&[("GEMINI_API_KEY", "k"), ("GEMINI_REQUEST_TIMEOUT", "soon")])
            .unwrap_err();
        assert!(matches!(err, ServiceInitError::InvalidTimeout(_)));
    }

    #[test]
    fn model_flag_overrides_env() {
        let config = config_from(&[("GEMINI_API_KEY", "k")])
            .unwrap()
            .with_model(Some("gemini-3-pro-image-preview"));
        assert_eq!(config.model, "gemini-3-pro-image-preview");
        assert!(!format!("{config:?}").contains("\"k\""));
    }
}
