//! Layered settings resolution: compiled-in defaults, an optional config
//! file, then environment variables, in increasing priority. Resolved once
//! at process start and validated before anything binds a socket.
#![cfg_attr(all(coverage_nightly, test), feature(coverage_attribute))]

use std::net::SocketAddr;

use serde_derive::Deserialize;
use smart_default::SmartDefault;

/// Environment variables override file/defaults when prefixed `HYLAN__`,
/// using `__` as the path separator, e.g. `HYLAN__CACHE__PACKET_RING_SIZE`.
const ENV_PREFIX: &str = "HYLAN";
const ENV_SEPARATOR: &str = "__";

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
    #[error("cache.packet_ring_size ({0}) must be a power of two")]
    PacketRingSizeNotPowerOfTwo(u64),
    #[error("cache.key_ring_size ({0}) must be a power of two")]
    KeyRingSizeNotPowerOfTwo(u64),
}

#[derive(Debug, Clone, Deserialize, SmartDefault)]
#[serde(default)]
pub struct RtmpSettings {
    #[default(SocketAddr::from(([0, 0, 0, 0], 1935)))]
    pub listen_addr: SocketAddr,
}

#[derive(Debug, Clone, Deserialize, SmartDefault)]
#[serde(default)]
pub struct HttpSettings {
    #[default(SocketAddr::from(([0, 0, 0, 0], 8080)))]
    pub listen_addr: SocketAddr,
}

#[derive(Debug, Clone, Deserialize, SmartDefault)]
#[serde(default)]
pub struct CacheSettings {
    #[default(1024)]
    pub packet_ring_size: u64,
    #[default(16)]
    pub key_ring_size: u64,
}

#[derive(Debug, Clone, Deserialize, SmartDefault)]
#[serde(default)]
pub struct SessionSettings {
    #[default(10)]
    pub write_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, SmartDefault)]
#[serde(default)]
pub struct LogSettings {
    #[default("info".to_string())]
    pub level: String,
}

/// Process-wide resolved configuration. See each nested struct's fields for
/// the recognized options and their defaults.
#[derive(Debug, Clone, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Settings {
    pub rtmp: RtmpSettings,
    pub http: HttpSettings,
    pub cache: CacheSettings,
    pub session: SessionSettings,
    pub log: LogSettings,
}

impl Settings {
    /// Builds the layered source chain (defaults are just this struct's own
    /// `Default`, via `config`'s `Config::try_deserialize` falling back to
    /// `#[serde(default)]`), overlaying an optional config file and then
    /// environment variables, and validates the result.
    ///
    /// `config_path` is only read if `Some` and the file exists; a missing
    /// path is not an error, matching the "optional config file" priority
    /// layer.
    pub fn load(config_path: Option<&str>) -> Result<Self, SettingsError> {
        let mut builder = config::Config::builder();

        if let Some(path) = config_path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }

        builder = builder.add_source(config::Environment::with_prefix(ENV_PREFIX).separator(ENV_SEPARATOR));

        let settings: Settings = builder.build()?.try_deserialize().unwrap_or_default();
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), SettingsError> {
        if !self.cache.packet_ring_size.is_power_of_two() {
            return Err(SettingsError::PacketRingSizeNotPowerOfTwo(self.cache.packet_ring_size));
        }
        if !self.cache.key_ring_size.is_power_of_two() {
            return Err(SettingsError::KeyRingSizeNotPowerOfTwo(self.cache.key_ring_size));
        }
        Ok(())
    }
}
