use std::path::Path;

use config::Config;
use config::ConfigError;
use config::Environment;
use config::File;
use crpt_http::ClientConfig;
use serde::Deserialize;

use crate::tracing_setup::LoggingConfig;

/// Prefix of environment variables overriding file settings, e.g. `CRPT__REQUEST_LIMIT=10`
pub const ENV_PREFIX: &str = "CRPT";

/// Everything the submit driver can be configured with
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AppConfigFile {
    #[serde(flatten)]
    pub client: ClientConfig,
    pub logging: LoggingConfig,
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX).separator("__").try_parsing(true)
}

/// Load configuration from `path`, then apply `CRPT__*` environment overrides
pub fn load_app_config<P: AsRef<Path>>(path: P) -> Result<AppConfigFile, ConfigError> {
    load_app_config_with_env(path, environment())
}

/// Load configuration from `path` with an explicit environment source
pub fn load_app_config_with_env<P: AsRef<Path>>(path: P, env: Environment) -> Result<AppConfigFile, ConfigError> {
    let config = Config::builder().add_source(File::from(path.as_ref())).add_source(env).build()?;

    config.try_deserialize()
}

/// Load configuration with fallback to defaults
///
/// Returns the load error alongside the defaults so the caller can report it
/// once logging is up.
pub fn load_app_config_or_default(path: &str) -> (AppConfigFile, Option<ConfigError>) {
    match load_app_config(path) {
        Ok(config) => (config, None),
        Err(err) => (AppConfigFile::default(), Some(err)),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;

    use crpt_http::DEFAULT_URL;
    use crpt_ratelimit::ReleaseMode;
    use crpt_ratelimit::TimeUnit;

    use super::*;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    fn no_env() -> Environment {
        Environment::with_prefix(ENV_PREFIX).separator("__").try_parsing(true).source(Some(HashMap::new()))
    }

    #[test]
    fn test_load_full_config() {
        let file = write_config(
            r#"
url = "http://localhost:9000/create"
time_unit = "minutes"
request_limit = 30
release_mode = "on_completion"

[http]
request_timeout_ms = 2500

[logging]
level = "debug"
log_dir = "logs"
"#,
        );

        let config = load_app_config_with_env(file.path(), no_env()).unwrap();

        assert_eq!(config.client.url, "http://localhost:9000/create");
        assert_eq!(config.client.time_unit, TimeUnit::Minutes);
        assert_eq!(config.client.request_limit, 30);
        assert_eq!(config.client.release_mode, ReleaseMode::OnCompletion);
        assert_eq!(config.client.http.request_timeout_ms, 2500);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.log_dir.as_deref(), Some("logs"));
    }

    #[test]
    fn test_missing_keys_use_defaults() {
        let file = write_config("request_limit = 2\n");

        let config = load_app_config_with_env(file.path(), no_env()).unwrap();

        assert_eq!(config.client.url, DEFAULT_URL);
        assert_eq!(config.client.time_unit, TimeUnit::Seconds);
        assert_eq!(config.client.request_limit, 2);
        assert_eq!(config.logging.level, "info");
        assert!(config.logging.log_dir.is_none());
    }

    #[test]
    fn test_environment_overrides_file() {
        let file = write_config("request_limit = 2\ntime_unit = \"seconds\"\n");
        let vars = HashMap::from([
            ("CRPT__REQUEST_LIMIT".to_string(), "9".to_string()),
            ("CRPT__TIME_UNIT".to_string(), "hours".to_string()),
        ]);
        let env = Environment::with_prefix(ENV_PREFIX).separator("__").try_parsing(true).source(Some(vars));

        let config = load_app_config_with_env(file.path(), env).unwrap();

        assert_eq!(config.client.request_limit, 9);
        assert_eq!(config.client.time_unit, TimeUnit::Hours);
    }

    #[test]
    fn test_missing_file_falls_back() {
        let (config, err) = load_app_config_or_default("/nonexistent/crpt.toml");

        assert!(err.is_some());
        assert_eq!(config.client.request_limit, 5);
        assert_eq!(config.client.url, DEFAULT_URL);
    }
}
