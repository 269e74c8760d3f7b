use crate::config::types::Config;
use crate::ConfigError;

/// Bounds applied to every worker-pool size
const MIN_WORKERS: usize = 1;
const MAX_WORKERS: usize = 100;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_workers("crawl.workers", config.crawl.workers)?;
    validate_workers("probe.workers", config.probe.workers)?;
    validate_workers("pages.scrape-workers", config.pages.scrape_workers)?;
    validate_workers("download.workers", config.download.workers)?;

    if config.client.request_timeout == 0 {
        return Err(ConfigError::Validation(
            "client.request-timeout must be >= 1 second".to_string(),
        ));
    }

    if config.client.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "client.user-agent cannot be empty".to_string(),
        ));
    }

    if config.pages.step == 0 {
        return Err(ConfigError::Validation(
            "pages.step must be >= 1".to_string(),
        ));
    }

    if config.pages.scan_timeout == 0 {
        return Err(ConfigError::Validation(
            "pages.scan-timeout must be >= 1 second".to_string(),
        ));
    }

    if config.download.max_attempts == 0 {
        return Err(ConfigError::Validation(
            "download.max-attempts must be >= 1".to_string(),
        ));
    }

    if let Some(credentials) = &config.credentials {
        if credentials.client_id.trim().is_empty() || credentials.client_secret.trim().is_empty() {
            return Err(ConfigError::Validation(
                "credentials require both client-id and client-secret".to_string(),
            ));
        }
        if credentials.user_agent.trim().is_empty() {
            return Err(ConfigError::Validation(
                "credentials.user-agent cannot be empty".to_string(),
            ));
        }
        if credentials.username.is_some() != credentials.password.is_some() {
            return Err(ConfigError::Validation(
                "credentials username and password must be set together".to_string(),
            ));
        }
    }

    Ok(())
}

fn validate_workers(field: &str, value: usize) -> Result<(), ConfigError> {
    if !(MIN_WORKERS..=MAX_WORKERS).contains(&value) {
        return Err(ConfigError::Validation(format!(
            "{} must be between {} and {}, got {}",
            field, MIN_WORKERS, MAX_WORKERS, value
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::Credentials;

    fn credentials() -> Credentials {
        Credentials {
            client_id: "id".to_string(),
            client_secret: "secret".to_string(),
            user_agent: "Agent/1.0".to_string(),
            username: None,
            password: None,
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_zero_workers_rejected() {
        let mut config = Config::default();
        config.crawl.workers = 0;
        assert!(matches!(
            validate(&config),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_excessive_workers_rejected() {
        let mut config = Config::default();
        config.download.workers = 500;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = Config::default();
        config.client.request_timeout = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_zero_step_rejected() {
        let mut config = Config::default();
        config.pages.step = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_valid_credentials_accepted() {
        let mut config = Config::default();
        config.credentials = Some(credentials());
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_blank_credentials_rejected() {
        let mut config = Config::default();
        let mut creds = credentials();
        creds.client_secret = "  ".to_string();
        config.credentials = Some(creds);
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_lonely_username_rejected() {
        let mut config = Config::default();
        let mut creds = credentials();
        creds.username = Some("alice".to_string());
        config.credentials = Some(creds);
        assert!(validate(&config).is_err());
    }
}
