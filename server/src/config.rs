use std::time::Duration;

use anyhow::{Context, Result};
use hr_attendance::NOTICE_TTL;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub notice_ttl: Duration,
    pub cors_allowed_origins: Vec<String>,
    /// Request body cap for image uploads; `None` lifts the limit entirely.
    pub upload_limit: Option<usize>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            notice_ttl: NOTICE_TTL,
            cors_allowed_origins: vec!["http://localhost:5173".into()],
            upload_limit: None,
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let notice_ttl = match lookup("NOTICE_TTL_MS") {
            Some(raw) => Duration::from_millis(
                raw.trim()
                    .parse::<u64>()
                    .with_context(|| format!("invalid NOTICE_TTL_MS {raw:?}"))?,
            ),
            None => NOTICE_TTL,
        };

        let cors_allowed_origins = lookup("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|| "http://localhost:5173".into())
            .split(',')
            .filter_map(|s| {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            })
            .collect::<Vec<_>>();

        let upload_limit = lookup("MAX_UPLOAD_BYTES")
            .map(|raw| {
                raw.trim()
                    .parse::<usize>()
                    .with_context(|| format!("invalid MAX_UPLOAD_BYTES {raw:?}"))
            })
            .transpose()?;

        Ok(Self {
            notice_ttl,
            cors_allowed_origins,
            upload_limit,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<AppConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        let config = load(&[]).unwrap();
        assert_eq!(config.notice_ttl, Duration::from_secs(3));
        assert_eq!(config.cors_allowed_origins, vec!["http://localhost:5173"]);
        assert_eq!(config.upload_limit, None);
    }

    #[test]
    fn parses_overrides() {
        let config = load(&[
            ("NOTICE_TTL_MS", "1500"),
            ("CORS_ALLOWED_ORIGINS", "http://a.test, ,http://b.test"),
            ("MAX_UPLOAD_BYTES", "1048576"),
        ])
        .unwrap();
        assert_eq!(config.notice_ttl, Duration::from_millis(1500));
        assert_eq!(
            config.cors_allowed_origins,
            vec!["http://a.test", "http://b.test"]
        );
        assert_eq!(config.upload_limit, Some(1_048_576));
    }

    #[test]
    fn rejects_garbage_ttl() {
        let err = load(&[("NOTICE_TTL_MS", "soon")]).unwrap_err();
        assert!(err.to_string().contains("NOTICE_TTL_MS"));
    }
}
