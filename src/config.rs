//! Environment-variable configuration loader.
//!
//! Every field has a typed Rust default, exactly like [`ServerLimits::default`]
//! et al.; environment variables only override it. There is no configuration
//! file format and no external config crate — this is the same discipline
//! the `*Limits` types already use, lifted one level up to process startup.

use std::{env, net::IpAddr, path::PathBuf, str::FromStr, time::Duration};

use crate::{
    brig::BrigConfig,
    limits::{ConnLimits, ReqLimits, RespLimits, ServerLimits},
};

/// TLS listener configuration. `None` unless both `TLS_CERT_PATH` and
/// `TLS_KEY_PATH` are set.
#[derive(Debug, Clone)]
pub struct TlsConfig {
    pub cert_path: PathBuf,
    pub key_path: PathBuf,
    pub port: u16,
}

/// Static-asset cache configuration.
#[derive(Debug, Clone)]
pub struct StaticConfig {
    /// Root directory walked at startup (default: `./static`).
    pub directory: PathBuf,
}

impl Default for StaticConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("./static"),
        }
    }
}

/// All process-wide configuration, loaded once from the environment at startup.
#[derive(Debug, Clone)]
pub struct MinumConfig {
    /// Plaintext listen address (default: `127.0.0.1:8080`).
    pub host: IpAddr,
    pub port: u16,

    /// `None` disables the TLS listener (default: disabled).
    pub tls: Option<TlsConfig>,

    pub shutdown_grace: Duration,

    pub static_files: StaticConfig,
    pub brig: BrigConfig,

    pub server_limits: ServerLimits,
    pub connection_limits: ConnLimits,
    pub request_limits: ReqLimits,
    pub response_limits: RespLimits,
}

impl Default for MinumConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::from([127, 0, 0, 1]),
            port: 8080,
            tls: None,
            shutdown_grace: Duration::from_millis(5000),
            static_files: StaticConfig::default(),
            brig: BrigConfig::default(),
            server_limits: ServerLimits::default(),
            connection_limits: ConnLimits::default(),
            request_limits: ReqLimits::default(),
            response_limits: RespLimits::default(),
        }
    }
}

impl MinumConfig {
    /// Loads configuration from environment variables, falling back to
    /// [`MinumConfig::default`] for anything unset or unparseable.
    ///
    /// # Examples
    /// ```no_run
    /// use minum::config::MinumConfig;
    ///
    /// let config = MinumConfig::from_env();
    /// ```
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let secure_port = env_parse("SECURE_SERVER_PORT", 0u16);
        let tls = match (env::var("TLS_CERT_PATH"), env::var("TLS_KEY_PATH")) {
            (Ok(cert_path), Ok(key_path)) if secure_port != 0 => Some(TlsConfig {
                cert_path: PathBuf::from(cert_path),
                key_path: PathBuf::from(key_path),
                port: secure_port,
            }),
            _ => None,
        };

        let max_read_line = env_parse("MAX_READ_LINE_SIZE_BYTES", defaults.request_limits.url_size);
        let socket_timeout_ms = env_parse("SOCKET_TIMEOUT_MILLIS", 2000u64);
        let keep_alive_timeout_secs = env_parse("KEEP_ALIVE_TIMEOUT_SECONDS", 2u64);

        Self {
            host: env_parse("HOST_NAME", defaults.host),
            port: env_parse("SERVER_PORT", defaults.port),
            tls,
            shutdown_grace: Duration::from_millis(env_parse("SHUTDOWN_GRACE_MS", 5000u64)),
            static_files: StaticConfig {
                directory: env::var("STATIC_FILES_DIRECTORY")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.static_files.directory),
            },
            brig: BrigConfig {
                enabled: env_parse("IS_THE_BRIG_ENABLED", defaults.brig.enabled),
                jail_duration: Duration::from_millis(env_parse(
                    "VULN_SEEKING_JAIL_DURATION",
                    defaults.brig.jail_duration.as_millis() as u64,
                )),
                sweep_interval: Duration::from_millis(env_parse(
                    "BRIG_SWEEP_INTERVAL_MS",
                    defaults.brig.sweep_interval.as_millis() as u64,
                )),
                suspicious_paths: env::var("SUSPICIOUS_PATHS")
                    .map(|value| value.split(',').map(str::trim).map(String::from).collect())
                    .unwrap_or(defaults.brig.suspicious_paths),
            },
            server_limits: ServerLimits {
                json_errors: env_parse("JSON_ERRORS", defaults.server_limits.json_errors),
                ..defaults.server_limits
            },
            connection_limits: ConnLimits {
                socket_read_timeout: Duration::from_millis(socket_timeout_ms),
                ..defaults.connection_limits
            },
            request_limits: ReqLimits {
                url_size: max_read_line,
                header_value_size: max_read_line.max(defaults.request_limits.header_value_size),
                body_size: env_parse("MAX_READ_SIZE_BYTES", defaults.request_limits.body_size),
                ..defaults.request_limits
            },
            response_limits: RespLimits {
                keep_alive_timeout_secs,
                ..defaults.response_limits
            },
        }
        .with_keep_alive_timeout(keep_alive_timeout_secs)
    }

    fn with_keep_alive_timeout(mut self, secs: u64) -> Self {
        self.connection_limits.socket_read_timeout =
            self.connection_limits.socket_read_timeout.max(Duration::from_secs(secs));
        self
    }
}

fn env_parse<T: FromStr>(key: &str, default: T) -> T {
    env::var(key).ok().and_then(|value| value.parse().ok()).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = MinumConfig::default();

        assert_eq!(config.port, 8080);
        assert_eq!(config.host, IpAddr::from([127, 0, 0, 1]));
        assert!(config.tls.is_none());
        assert!(config.brig.enabled);
        assert_eq!(config.shutdown_grace, Duration::from_millis(5000));
    }

    #[test]
    fn env_parse_falls_back_on_missing_or_invalid() {
        assert_eq!(env_parse::<u16>("MINUM_TEST_DEFINITELY_UNSET_KEY", 42), 42);
    }
}
