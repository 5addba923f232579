use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::converge::Pacing;
use crate::models::Role;
use crate::target::StatePaths;

/// Config holds all application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub role: Role,
    pub listen_addr: String,
    pub peer_addr: String,
    pub peer_https: bool,
    pub peer_timeout_secs: u64,
    pub htpasswd_file: String,
    pub settle_secs: u64,
    pub ping_retry_secs: u64,
    pub ping_attempts: u32,
    pub vmac_reload_delay_secs: u64,
    pub reload_cmd: String,
    pub interfaces_dir: String,
    pub keepalived_dir: String,
    pub check_ifupdown: bool,
}

impl Config {
    /// Load configuration from environment variables with defaults
    pub fn load() -> Self {
        Self {
            role: get_env("ROLE", "master").parse().unwrap_or_else(|e| {
                tracing::warn!("{}, falling back to master", e);
                Role::Master
            }),
            listen_addr: get_env("LISTEN_ADDR", "127.0.0.1:8080"),
            peer_addr: get_env("PEER_ADDR", "172.17.197.82:8080"),
            peer_https: get_env("PEER_HTTPS", "false").parse().unwrap_or(false),
            peer_timeout_secs: get_env("PEER_TIMEOUT_SECS", "120").parse().unwrap_or(120),
            htpasswd_file: get_env("HTPASSWD_FILE", ""),
            settle_secs: get_env("SETTLE_SECS", "10").parse().unwrap_or(10),
            ping_retry_secs: get_env("PING_RETRY_SECS", "10").parse().unwrap_or(10),
            ping_attempts: get_env("PING_ATTEMPTS", "2").parse().unwrap_or(2),
            vmac_reload_delay_secs: get_env("VMAC_RELOAD_DELAY_SECS", "10")
                .parse()
                .unwrap_or(10),
            reload_cmd: get_env("RELOAD_CMD", "/etc/init.d/keepalived-vrrp reload"),
            interfaces_dir: get_env("INTERFACES_DIR", "/etc/network/interfaces.d"),
            keepalived_dir: get_env("KEEPALIVED_DIR", "/etc/keepalived/keepalived-vrrp.d"),
            check_ifupdown: get_env("CHECK_IFUPDOWN", "true").parse().unwrap_or(true),
        }
    }

    pub fn pacing(&self) -> Pacing {
        Pacing {
            settle: Duration::from_secs(self.settle_secs),
            ping_interval: Duration::from_secs(self.ping_retry_secs),
            ping_attempts: self.ping_attempts,
            vmac_reload_delay: Duration::from_secs(self.vmac_reload_delay_secs),
        }
    }

    pub fn state_paths(&self) -> StatePaths {
        StatePaths {
            interfaces_dir: PathBuf::from(&self.interfaces_dir),
            keepalived_dir: PathBuf::from(&self.keepalived_dir),
        }
    }

    pub fn peer_timeout(&self) -> Duration {
        Duration::from_secs(self.peer_timeout_secs)
    }
}

#[cfg(test)]
impl Config {
    /// Zero waits, no startup checks, state under the given directories
    pub fn for_tests(role: Role, paths: &StatePaths) -> Self {
        Self {
            role,
            listen_addr: "127.0.0.1:0".into(),
            peer_addr: "127.0.0.1:0".into(),
            peer_https: false,
            peer_timeout_secs: 5,
            htpasswd_file: String::new(),
            settle_secs: 0,
            ping_retry_secs: 0,
            ping_attempts: 1,
            vmac_reload_delay_secs: 0,
            reload_cmd: "reload-keepalived".into(),
            interfaces_dir: paths.interfaces_dir.display().to_string(),
            keepalived_dir: paths.keepalived_dir.display().to_string(),
            check_ifupdown: false,
        }
    }
}

fn get_env(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}
