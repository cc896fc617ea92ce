//! The Brig: a lightweight intrusion detector that jails clients probing for
//! known vulnerability-scanner paths.
//!
//! Tracks client IPs that trip a honeypot route behind a TTL. Expired entries
//! are evicted lazily on lookup and swept periodically by a background task.

use std::{net::IpAddr, sync::Arc, time::Duration};

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use tokio::time::{sleep, Instant};

use crate::Method;

/// Tuning for the [`IntrusionDetector`].
#[derive(Debug, Clone)]
pub struct BrigConfig {
    /// Whether the detector is active at all (default: `true`).
    ///
    /// When `false`, [`is_honeypot`](IntrusionDetector::is_honeypot) and
    /// [`is_jailed`](IntrusionDetector::is_jailed) always return `false`, and
    /// [`jail`](IntrusionDetector::jail) is a no-op.
    pub enabled: bool,

    /// How long a jailed IP stays jailed (default: `10 minutes`).
    pub jail_duration: Duration,

    /// How often the background sweeper evicts expired entries (default: `30 seconds`).
    pub sweep_interval: Duration,

    /// Lowercase substrings that mark a request path as a honeypot
    /// (default: `.php`, `.env`, `wp-login`, `admin.cgi`, `/cgi-bin/`).
    pub suspicious_paths: Vec<String>,
}

impl Default for BrigConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            jail_duration: Duration::from_secs(600),
            sweep_interval: Duration::from_secs(30),
            suspicious_paths: [".php", ".env", "wp-login", "admin.cgi", "/cgi-bin/"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

type Jail = Arc<RwLock<FxHashMap<IpAddr, Instant>>>;

/// Jails clients that probe for known vulnerability-scanner paths.
///
/// Cloning is cheap; clones share the same underlying jail and sweeper task.
#[derive(Clone)]
pub struct IntrusionDetector {
    jail: Jail,
    config: Arc<BrigConfig>,
}

impl IntrusionDetector {
    /// Builds a detector and spawns its background sweeper task.
    ///
    /// The sweeper only starts if called from within a running Tokio
    /// runtime; constructed outside one (e.g. a plain `#[test]`), the
    /// detector works normally but relies on lazy eviction alone.
    pub fn new(config: BrigConfig) -> Self {
        let jail: Jail = Arc::new(RwLock::new(FxHashMap::default()));
        let config = Arc::new(config);

        if config.enabled && tokio::runtime::Handle::try_current().is_ok() {
            Self::spawn_sweeper(&jail, &config);
        }

        Self { jail, config }
    }

    /// Returns `true` if `path` (matched case-insensitively) contains one of
    /// the configured honeypot tokens.
    ///
    /// `method` is accepted for forward compatibility (e.g. restricting
    /// honeypot checks to `GET`/`POST`) but is currently unused: the scanner
    /// signatures this guards against are path-based regardless of verb.
    pub fn is_honeypot(&self, _method: Method, path: &[u8]) -> bool {
        if !self.config.enabled {
            return false;
        }

        let path = String::from_utf8_lossy(path).to_ascii_lowercase();
        self.config
            .suspicious_paths
            .iter()
            .any(|token| path.contains(token.as_str()))
    }

    /// Jails `ip` for [`jail_duration`](BrigConfig::jail_duration), overwriting
    /// any existing sentence.
    pub fn jail(&self, ip: IpAddr) {
        if !self.config.enabled {
            return;
        }

        let expires_at = Instant::now() + self.config.jail_duration;
        self.jail.write().insert(ip, expires_at);
        tracing::warn!(%ip, duration_secs = self.config.jail_duration.as_secs(), "jailed client");
    }

    /// Returns `true` iff `ip` is currently jailed. Lazily evicts expired entries.
    pub fn is_jailed(&self, ip: IpAddr) -> bool {
        if !self.config.enabled {
            return false;
        }

        let now = Instant::now();

        if let Some(expires_at) = self.jail.read().get(&ip) {
            if *expires_at > now {
                return true;
            }
        } else {
            return false;
        }

        self.jail.write().remove(&ip);
        false
    }

    fn spawn_sweeper(jail: &Jail, config: &Arc<BrigConfig>) {
        let jail = jail.clone();
        let interval = config.sweep_interval;

        tokio::spawn(async move {
            loop {
                sleep(interval).await;

                let now = Instant::now();
                let before = jail.read().len();
                jail.write().retain(|_, expires_at| *expires_at > now);
                let evicted = before - jail.read().len();

                if evicted > 0 {
                    tracing::debug!(evicted, "swept expired jail entries");
                }
            }
        });
    }
}

impl Default for IntrusionDetector {
    fn default() -> Self {
        Self::new(BrigConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr};

    fn ip(n: u8) -> IpAddr {
        IpAddr::V4(Ipv4Addr::new(127, 0, 0, n))
    }

    #[test]
    fn honeypot_matches_known_scanner_paths() {
        let brig = IntrusionDetector::new(BrigConfig::default());

        assert!(brig.is_honeypot(Method::Get, b"/wp-login.php"));
        assert!(brig.is_honeypot(Method::Get, b"/.env"));
        assert!(!brig.is_honeypot(Method::Get, b"/api/users"));
    }

    #[test]
    fn disabled_detector_never_flags_or_jails() {
        let brig = IntrusionDetector::new(BrigConfig {
            enabled: false,
            ..BrigConfig::default()
        });

        assert!(!brig.is_honeypot(Method::Get, b"/.env"));
        brig.jail(ip(1));
        assert!(!brig.is_jailed(ip(1)));
    }

    #[test]
    fn jailed_ip_is_reported_until_expiry_only() {
        let brig = IntrusionDetector::new(BrigConfig {
            jail_duration: Duration::from_secs(600),
            sweep_interval: Duration::from_secs(3600),
            ..BrigConfig::default()
        });

        assert!(!brig.is_jailed(ip(2)));
        brig.jail(ip(2));
        assert!(brig.is_jailed(ip(2)));
        assert!(!brig.is_jailed(ip(3)));
    }

    #[test]
    fn expired_entry_is_evicted_lazily() {
        let brig = IntrusionDetector::new(BrigConfig {
            jail_duration: Duration::from_millis(0),
            sweep_interval: Duration::from_secs(3600),
            ..BrigConfig::default()
        });

        brig.jail(ip(4));
        assert!(!brig.is_jailed(ip(4)));
        assert!(brig.jail.read().is_empty());
    }
}
