use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use std::path::Path;

/// Loads and validates a configuration file
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use dragnet::config::load_config;
///
/// let config = load_config(Path::new("dragnet.toml")).unwrap();
/// println!("Crawl workers: {}", config.crawl.workers);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    validate(&config)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_full_config() {
        let config_content = r#"
[client]
user-agent = "TestAgent/1.0"
request-timeout = 20
connect-timeout = 5

[crawl]
workers = 8
politeness-delay-ms = 250

[probe]
workers = 12

[pages]
step = 20
scan-timeout = 60

[download]
workers = 6
max-attempts = 5

[credentials]
client-id = "abc"
client-secret = "def"
user-agent = "FeedAgent/1.0"
"#;

        let file = create_temp_config(config_content);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.client.user_agent, "TestAgent/1.0");
        assert_eq!(config.crawl.workers, 8);
        assert_eq!(config.crawl.politeness_delay_ms, 250);
        assert_eq!(config.probe.workers, 12);
        assert_eq!(config.pages.step, 20);
        assert_eq!(config.download.max_attempts, 5);
        assert_eq!(config.credentials.unwrap().client_id, "abc");
    }

    #[test]
    fn test_empty_file_yields_defaults() {
        let file = create_temp_config("");
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.crawl.workers, 4);
        assert_eq!(config.probe.workers, 10);
        assert_eq!(config.pages.upper_bound, 1000);
        assert!(config.credentials.is_none());
        assert!(config.client.user_agent.contains("Mozilla/5.0"));
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let file = create_temp_config("[crawl]\nworkers = 2\n");
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.crawl.workers, 2);
        assert_eq!(config.crawl.politeness_delay_ms, 0);
        assert_eq!(config.download.workers, 4);
    }

    #[test]
    fn test_missing_file() {
        let result = load_config(Path::new("/nonexistent/dragnet.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_invalid_toml() {
        let file = create_temp_config("this is not valid TOML {{{");
        assert!(matches!(
            load_config(file.path()),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_validation_failure_propagates() {
        let file = create_temp_config("[crawl]\nworkers = 0\n");
        assert!(matches!(
            load_config(file.path()),
            Err(ConfigError::Validation(_))
        ));
    }
}
