// src/config/validate.rs

use std::net::{SocketAddr, ToSocketAddrs};

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{FreshError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = FreshError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        let listen_addr = parse_listen(&raw.serve.listen)?;
        validate_serve(&raw)?;
        validate_freshness(&raw)?;
        validate_toolchain(&raw)?;
        Ok(ConfigFile::new_unchecked(raw, listen_addr))
    }
}

/// Resolve a listen address, accepting hostnames (`localhost:8080`) and the
/// `:PORT` shorthand for all interfaces. The first resolved address wins.
pub fn parse_listen(listen: &str) -> Result<SocketAddr> {
    let listen = listen.trim();
    if listen.is_empty() {
        return Err(FreshError::ConfigError(
            "[serve].listen must not be empty".to_string(),
        ));
    }
    let normalized = match listen.strip_prefix(':') {
        Some(port) => format!("0.0.0.0:{port}"),
        None => listen.to_string(),
    };
    let mut addrs = normalized.to_socket_addrs().map_err(|e| {
        FreshError::ConfigError(format!("[serve].listen {listen:?} is not a socket address: {e}"))
    })?;
    addrs.next().ok_or_else(|| {
        FreshError::ConfigError(format!("[serve].listen {listen:?} resolved to no addresses"))
    })
}

fn validate_serve(cfg: &RawConfigFile) -> Result<()> {
    if !cfg.serve.freshness_path.starts_with('/') {
        return Err(FreshError::ConfigError(format!(
            "[serve].freshness_path must start with '/' (got {:?})",
            cfg.serve.freshness_path
        )));
    }
    Ok(())
}

fn validate_freshness(cfg: &RawConfigFile) -> Result<()> {
    if cfg.freshness.channel_capacity == 0 {
        return Err(FreshError::ConfigError(
            "[freshness].channel_capacity must be >= 1 (got 0)".to_string(),
        ));
    }
    if cfg.freshness.poll_timeout_secs == 0 {
        return Err(FreshError::ConfigError(
            "[freshness].poll_timeout_secs must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}

fn validate_toolchain(cfg: &RawConfigFile) -> Result<()> {
    if cfg.toolchain.program.trim().is_empty() {
        return Err(FreshError::ConfigError(
            "[toolchain].program must not be empty".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_shorthand_binds_all_interfaces() {
        assert_eq!(
            parse_listen(":8080").unwrap(),
            "0.0.0.0:8080".parse::<SocketAddr>().unwrap()
        );
    }

    #[test]
    fn hostnames_are_resolved() {
        let addr = parse_listen("localhost:8080").unwrap();
        assert_eq!(addr.port(), 8080);
        assert!(addr.ip().is_loopback());
    }

    #[test]
    fn missing_port_is_rejected() {
        assert!(matches!(
            parse_listen("127.0.0.1"),
            Err(FreshError::ConfigError(msg)) if msg.contains("127.0.0.1")
        ));
        assert!(parse_listen("").is_err());
    }

    #[test]
    fn defaults_are_valid() {
        let cfg = ConfigFile::try_from(RawConfigFile::default()).unwrap();
        assert_eq!(cfg.listen_addr().port(), 8080);
        assert_eq!(cfg.serve.freshness_path, "/version");
        assert_eq!(cfg.freshness.channel_capacity, 20);
        assert_eq!(cfg.poll_timeout().as_secs(), 20);
        assert_eq!(cfg.toolchain.env.get("GOARCH").map(String::as_str), Some("wasm"));
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let mut raw = RawConfigFile::default();
        raw.freshness.channel_capacity = 0;
        assert!(matches!(
            ConfigFile::try_from(raw),
            Err(FreshError::ConfigError(msg)) if msg.contains("channel_capacity")
        ));
    }
}
