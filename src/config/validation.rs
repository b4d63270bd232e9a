use super::models::Config;
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("CORS allow-list is empty (at least one origin is required)")]
    NoAllowedOrigins,

    #[error("Invalid origin '{origin}': expected scheme://host[:port]")]
    InvalidOrigin { origin: String },

    #[error("Extractor timeout must be positive")]
    InvalidTimeout,

    #[error("Artifact retention must be positive")]
    InvalidRetention,

    #[error("Downloads directory must not be empty")]
    EmptyDownloadsDir,
}

/// Validate the entire configuration
pub fn validate(config: &Config) -> Result<(), ValidationError> {
    validate_server(config)?;
    validate_cors(config)?;
    validate_extractor(config)?;
    Ok(())
}

fn validate_server(config: &Config) -> Result<(), ValidationError> {
    if config.server.downloads_dir.as_os_str().is_empty() {
        return Err(ValidationError::EmptyDownloadsDir);
    }
    Ok(())
}

/// Every configured origin must normalize to a bare `scheme://host[:port]`
fn validate_cors(config: &Config) -> Result<(), ValidationError> {
    if config.cors.allowed_origins.is_empty() {
        return Err(ValidationError::NoAllowedOrigins);
    }

    for origin in &config.cors.allowed_origins {
        if normalize_origin(origin).is_none() {
            return Err(ValidationError::InvalidOrigin {
                origin: origin.clone(),
            });
        }
    }

    Ok(())
}

fn validate_extractor(config: &Config) -> Result<(), ValidationError> {
    if config.extractor.timeout_secs == 0 {
        return Err(ValidationError::InvalidTimeout);
    }
    if config.extractor.retention_secs == 0 {
        return Err(ValidationError::InvalidRetention);
    }
    Ok(())
}

/// Normalize an origin to `scheme://host[:port]`: lowercased host, default
/// ports elided. Returns `None` for anything that is not a bare origin
/// (path, query, fragment, or a non-http scheme).
pub fn normalize_origin(value: &str) -> Option<String> {
    let parsed = Url::parse(value).ok()?;
    let host = parsed.host_str()?.to_ascii_lowercase();
    let scheme = parsed.scheme();
    let default_port = match scheme {
        "http" => 80,
        "https" => 443,
        _ => return None,
    };
    let port = parsed.port();

    if parsed.path() != "/" || parsed.query().is_some() || parsed.fragment().is_some() {
        return None;
    }

    let include_port = port.is_some_and(|explicit| explicit != default_port);

    if include_port {
        Some(format!("{scheme}://{host}:{}", port?))
    } else {
        Some(format!("{scheme}://{host}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_origin_keeps_explicit_port() {
        assert_eq!(
            normalize_origin("http://localhost:5173"),
            Some("http://localhost:5173".to_string())
        );
    }

    #[test]
    fn normalize_origin_elides_default_port() {
        assert_eq!(
            normalize_origin("https://app.example.com:443"),
            Some("https://app.example.com".to_string())
        );
    }

    #[test]
    fn normalize_origin_lowercases_host() {
        assert_eq!(
            normalize_origin("https://App.Example.COM"),
            Some("https://app.example.com".to_string())
        );
    }

    #[test]
    fn normalize_origin_rejects_paths_and_schemes() {
        assert_eq!(normalize_origin("https://example.com/app"), None);
        assert_eq!(normalize_origin("https://example.com/?q=1"), None);
        assert_eq!(normalize_origin("ftp://example.com"), None);
        assert_eq!(normalize_origin("not-an-origin"), None);
    }

    #[test]
    fn validate_rejects_empty_allow_list() {
        let mut config = Config::default();
        config.cors.allowed_origins.clear();

        let err = validate(&config).unwrap_err();
        assert!(matches!(err, ValidationError::NoAllowedOrigins));
    }

    #[test]
    fn validate_accepts_defaults() {
        assert!(validate(&Config::default()).is_ok());
    }
}
