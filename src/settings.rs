use thiserror::Error;
use url::Url;

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:5000/chat";
pub const ENDPOINT_ENV: &str = "SERVICE_CHAT_ENDPOINT";
pub const MODEL_ENV: &str = "SERVICE_CHAT_MODEL";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("invalid chat endpoint {url:?}: {reason}")]
    InvalidEndpoint { url: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub endpoint: Url,
    /// Machine model the first conversation starts with. Without one the
    /// session starts empty and `/new` picks a model.
    pub default_model: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub endpoint: Option<String>,
    pub model: Option<String>,
}

/// Resolution precedence: CLI flag, then environment, then built-in default.
pub fn resolve_settings(cli: &CliOverrides) -> Result<Settings, SettingsError> {
    resolve_with_env(cli, |name| std::env::var(name).ok())
}

fn resolve_with_env(
    cli: &CliOverrides,
    env: impl Fn(&str) -> Option<String>,
) -> Result<Settings, SettingsError> {
    let endpoint_raw = cli
        .endpoint
        .clone()
        .or_else(|| env(ENDPOINT_ENV))
        .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
    let endpoint = parse_endpoint(&endpoint_raw)?;
    let default_model = cli
        .model
        .clone()
        .or_else(|| env(MODEL_ENV))
        .filter(|m| !m.trim().is_empty());
    Ok(Settings {
        endpoint,
        default_model,
    })
}

fn parse_endpoint(raw: &str) -> Result<Url, SettingsError> {
    let url = Url::parse(raw).map_err(|e| SettingsError::InvalidEndpoint {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(SettingsError::InvalidEndpoint {
            url: raw.to_string(),
            reason: format!("unsupported scheme {other}"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn precedence_cli_over_env_over_default() {
        let env = |name: &str| match name {
            ENDPOINT_ENV => Some("http://env.example:8080/chat".to_string()),
            MODEL_ENV => Some("ENV-1".to_string()),
            _ => None,
        };

        let cli = CliOverrides {
            endpoint: Some("http://cli.example/chat".into()),
            model: Some("CLI-1".into()),
        };
        let s = resolve_with_env(&cli, env).unwrap();
        assert_eq!(s.endpoint.as_str(), "http://cli.example/chat");
        assert_eq!(s.default_model.as_deref(), Some("CLI-1"));

        let s = resolve_with_env(&CliOverrides::default(), env).unwrap();
        assert_eq!(s.endpoint.as_str(), "http://env.example:8080/chat");
        assert_eq!(s.default_model.as_deref(), Some("ENV-1"));

        let s = resolve_with_env(&CliOverrides::default(), no_env).unwrap();
        assert_eq!(s.endpoint.as_str(), DEFAULT_ENDPOINT);
        assert_eq!(s.default_model, None);
    }

    #[test]
    fn rejects_non_http_endpoint() {
        let cli = CliOverrides {
            endpoint: Some("ftp://example.com/chat".into()),
            model: None,
        };
        assert!(resolve_with_env(&cli, no_env).is_err());

        let cli = CliOverrides {
            endpoint: Some("not a url".into()),
            model: None,
        };
        assert!(resolve_with_env(&cli, no_env).is_err());
    }

    #[test]
    fn blank_model_is_treated_as_unset() {
        let cli = CliOverrides {
            endpoint: None,
            model: Some("   ".into()),
        };
        let s = resolve_with_env(&cli, no_env).unwrap();
        assert_eq!(s.default_model, None);
    }
}
