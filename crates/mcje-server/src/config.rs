use std::path::Path;
use std::time::Duration;

use mcje_proto::frame::ProtocolConfig;
use serde::Deserialize;

/// Tunables for one connection's protocol handling.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Frames declaring more than this many bytes are malformed.
    pub max_frame_len: usize,
    /// Bound on decoded strings, in UTF-16 code units.
    pub max_string_utf16: usize,
    /// Keep-alive heartbeat period while in the Play state.
    pub keep_alive_secs: u64,
    /// How long the classifier waits for a byte after a leading 0xFE
    /// before treating the ping as the very-legacy single-byte form.
    pub legacy_probe_ms: u64,
    /// Compressed framing is recognized but not implemented; leave off.
    pub compression_enabled: bool,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            max_frame_len: mcje_proto::frame::DEFAULT_MAX_FRAME_LEN,
            max_string_utf16: mcje_proto::codec::MAX_STRING_UTF16,
            keep_alive_secs: 20,
            legacy_probe_ms: 250,
            compression_enabled: false,
        }
    }
}

impl ConnectionConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        Ok(config)
    }

    pub fn protocol(&self) -> ProtocolConfig {
        ProtocolConfig {
            max_frame_len: self.max_frame_len,
            max_string_utf16: self.max_string_utf16,
            compression_enabled: self.compression_enabled,
        }
    }

    pub fn keep_alive_interval(&self) -> Duration {
        Duration::from_secs(self.keep_alive_secs)
    }

    pub fn legacy_probe(&self) -> Duration {
        Duration::from_millis(self.legacy_probe_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_config() {
        let toml_str = r#"
            max_frame_len = 1048576
            keep_alive_secs = 10
            legacy_probe_ms = 100
        "#;
        let config: ConnectionConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.max_frame_len, 1 << 20);
        assert_eq!(config.keep_alive_secs, 10);
        assert_eq!(config.legacy_probe_ms, 100);
        // Unspecified fields fall back to defaults.
        assert_eq!(config.max_string_utf16, 32_767);
        assert!(!config.compression_enabled);
    }

    #[test]
    fn defaults() {
        let config = ConnectionConfig::default();
        assert_eq!(config.max_frame_len, 1 << 21);
        assert_eq!(config.keep_alive_interval(), Duration::from_secs(20));
        assert_eq!(config.legacy_probe(), Duration::from_millis(250));
        let proto = config.protocol();
        assert_eq!(proto.max_frame_len, 1 << 21);
        assert!(!proto.compression_enabled);
    }
}
