//=========================================================================
// Player Configuration
//=========================================================================
//
// Player name, server address, keybindings and volumes, stored as TOML.
//
//   load_or_default(path)  missing/broken file → defaults + warning,
//                          plus the ConfigOrigin telling whether the
//                          file may be overwritten later
//   load(path)             strict, for callers that want the error
//   save(path)             validates, creates parent dirs, writes
//
// Every field has a default, so an older file missing newer keys still
// loads.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::HashSet;
use std::fs;
use std::io;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

//=== Internal Dependencies ===============================================

use crate::core::input::KeyCode;

//=== Constants ===========================================================

pub const DEFAULT_CONFIG_FILE: &str = "islander.toml";

/// Environment variable overriding [`DEFAULT_CONFIG_FILE`].
pub const CONFIG_PATH_ENV: &str = "ISLANDER_CONFIG";

/// Longest accepted player name, in bytes.
pub const MAX_NAME_LEN: usize = 16;

//=== ConfigError =========================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("config file {path} is not valid TOML: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("config could not be serialized: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

//=== KeyBindings =========================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    pub up: KeyCode,
    pub down: KeyCode,
    pub left: KeyCode,
    pub right: KeyCode,
    pub confirm: KeyCode,
    pub back: KeyCode,
    pub pause: KeyCode,
    pub ready: KeyCode,
}

impl KeyBindings {
    fn all(&self) -> [(&'static str, KeyCode); 8] {
        [
            ("up", self.up),
            ("down", self.down),
            ("left", self.left),
            ("right", self.right),
            ("confirm", self.confirm),
            ("back", self.back),
            ("pause", self.pause),
            ("ready", self.ready),
        ]
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            up: KeyCode::KeyW,
            down: KeyCode::KeyS,
            left: KeyCode::KeyA,
            right: KeyCode::KeyD,
            confirm: KeyCode::Enter,
            back: KeyCode::Backspace,
            pause: KeyCode::Escape,
            ready: KeyCode::KeyR,
        }
    }
}

//=== AudioSettings =======================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    pub master: f32,
    pub music: f32,
    pub effects: f32,
    pub ambience: f32,
    pub menu: f32,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            master: 0.8,
            music: 0.6,
            effects: 1.0,
            ambience: 0.7,
            menu: 0.9,
        }
    }
}

//=== PlayerConfig ========================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub name: String,
    /// Host or IP used by "Join" and by "Host" to bind.
    pub address: String,
    pub port: u16,
    pub keybinds: KeyBindings,
    pub audio: AudioSettings,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            name: "Sailor".to_string(),
            address: "127.0.0.1".to_string(),
            port: 7777,
            keybinds: KeyBindings::default(),
            audio: AudioSettings::default(),
        }
    }
}

//=== ConfigOrigin ========================================================

/// Where [`PlayerConfig::load_or_default`] got its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigOrigin {
    File,
    /// No file yet; saving creates it.
    Missing,
    /// The file exists but could not be used. Saving would replace the
    /// user's contents with defaults.
    Unusable,
}

impl ConfigOrigin {
    pub fn may_overwrite(self) -> bool {
        self != ConfigOrigin::Unusable
    }
}

impl PlayerConfig {
    /// `$ISLANDER_CONFIG` if set, else `islander.toml` in the working dir.
    pub fn default_path() -> PathBuf {
        std::env::var_os(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
    }

    /// `address:port`, with IPv6 literals bracketed.
    pub fn server_addr(&self) -> String {
        match self.address.parse::<Ipv6Addr>() {
            Ok(ip) => SocketAddr::from((ip, self.port)).to_string(),
            Err(_) => format!("{}:{}", self.address, self.port),
        }
    }

    /// Wildcard address a hosted server listens on, in the family of the
    /// configured address so other machines can reach it.
    pub fn host_bind_addr(&self) -> SocketAddr {
        let ip = match self.address.trim_matches(&['[', ']'][..]).parse::<IpAddr>() {
            Ok(IpAddr::V6(_)) => IpAddr::V6(Ipv6Addr::UNSPECIFIED),
            _ => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
        };
        SocketAddr::new(ip, self.port)
    }

    //--- Persistence ------------------------------------------------------

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Loads `path`, falling back to defaults on any failure.
    pub fn load_or_default(path: &Path) -> (Self, ConfigOrigin) {
        match Self::load(path) {
            Ok(config) => {
                info!("Loaded config from {}", path.display());
                (config, ConfigOrigin::File)
            }
            Err(ConfigError::Io { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
                info!("No config at {}, using defaults", path.display());
                (Self::default(), ConfigOrigin::Missing)
            }
            Err(e) => {
                warn!("{}; using defaults", e);
                (Self::default(), ConfigOrigin::Unusable)
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        self.validate()?;
        let text = toml::to_string_pretty(self)?;

        let io_err = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        fs::write(path, text).map_err(io_err)?;

        info!("Saved config to {}", path.display());
        Ok(())
    }

    //--- Validation -------------------------------------------------------

    pub fn validate(&self) -> Result<(), ConfigError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ConfigError::Invalid("player name is empty".into()));
        }
        if name.len() > MAX_NAME_LEN {
            return Err(ConfigError::Invalid(format!(
                "player name longer than {} bytes",
                MAX_NAME_LEN
            )));
        }
        if self.address.trim().is_empty() {
            return Err(ConfigError::Invalid("server address is empty".into()));
        }
        if self.port == 0 {
            return Err(ConfigError::Invalid("port 0 is not connectable".into()));
        }

        let mut seen = HashSet::new();
        for (action, key) in self.keybinds.all() {
            if key == KeyCode::Unidentified {
                return Err(ConfigError::Invalid(format!("'{}' has no key", action)));
            }
            if !seen.insert(key) {
                return Err(ConfigError::Invalid(format!("{:?} is bound twice", key)));
            }
        }

        let audio = &self.audio;
        for (channel, volume) in [
            ("master", audio.master),
            ("music", audio.music),
            ("effects", audio.effects),
            ("ambience", audio.ambience),
            ("menu", audio.menu),
        ] {
            if !(0.0..=1.0).contains(&volume) {
                return Err(ConfigError::Invalid(format!(
                    "{} volume {} outside 0..=1",
                    channel, volume
                )));
            }
        }

        Ok(())
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn save_then_load_preserves_changes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("player.toml");

        let mut config = PlayerConfig::default();
        config.name = "Anne".into();
        config.port = 9000;
        config.keybinds.up = KeyCode::ArrowUp;
        config.audio.music = 0.1;
        config.save(&path).unwrap();

        assert_eq!(PlayerConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        let (config, origin) = PlayerConfig::load_or_default(&dir.path().join("absent.toml"));
        assert_eq!(config, PlayerConfig::default());
        assert_eq!(origin, ConfigOrigin::Missing);
        assert!(origin.may_overwrite());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("player.toml");
        fs::write(&path, "name = \"Mary\"\n[keybinds]\npause = \"KeyP\"\n").unwrap();

        let config = PlayerConfig::load(&path).unwrap();
        assert_eq!(config.name, "Mary");
        assert_eq!(config.keybinds.pause, KeyCode::KeyP);
        assert_eq!(config.keybinds.up, KeyCode::KeyW);
        assert_eq!(config.port, 7777);
    }

    #[test]
    fn malformed_file_is_parse_error_and_default_on_lenient_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("player.toml");
        fs::write(&path, "name = [unterminated").unwrap();

        assert!(matches!(PlayerConfig::load(&path), Err(ConfigError::Parse { .. })));
        let (config, origin) = PlayerConfig::load_or_default(&path);
        assert_eq!(config, PlayerConfig::default());
        assert_eq!(origin, ConfigOrigin::Unusable);
        assert!(!origin.may_overwrite());
    }

    #[test]
    fn validation_rejects_bad_values() {
        let mut config = PlayerConfig::default();
        config.keybinds.down = config.keybinds.up;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = PlayerConfig::default();
        config.name = "a name far too long for the wire".into();
        assert!(config.validate().is_err());

        let mut config = PlayerConfig::default();
        config.audio.master = 1.5;
        assert!(config.validate().is_err());

        let mut config = PlayerConfig::default();
        config.port = 0;
        assert!(config.save(Path::new("unused.toml")).is_err());
    }

    #[test]
    fn server_addr_joins_host_and_port() {
        assert_eq!(PlayerConfig::default().server_addr(), "127.0.0.1:7777");

        let named = PlayerConfig {
            address: "harbour.example".into(),
            ..PlayerConfig::default()
        };
        assert_eq!(named.server_addr(), "harbour.example:7777");
    }

    #[test]
    fn ipv6_server_addr_is_bracketed() {
        let config = PlayerConfig {
            address: "::1".into(),
            ..PlayerConfig::default()
        };
        assert_eq!(config.server_addr(), "[::1]:7777");
        assert!(config.server_addr().parse::<SocketAddr>().is_ok());
    }

    #[test]
    fn host_binds_wildcard_of_configured_family() {
        let v4 = PlayerConfig {
            address: "192.0.2.10".into(),
            ..PlayerConfig::default()
        };
        assert_eq!(v4.host_bind_addr(), "0.0.0.0:7777".parse().unwrap());

        let v6 = PlayerConfig {
            address: "[2001:db8::1]".into(),
            port: 9000,
            ..PlayerConfig::default()
        };
        assert_eq!(v6.host_bind_addr(), "[::]:9000".parse().unwrap());

        let named = PlayerConfig {
            address: "harbour.example".into(),
            ..PlayerConfig::default()
        };
        assert!(named.host_bind_addr().ip().is_unspecified());
    }
}
