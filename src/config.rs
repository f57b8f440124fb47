//! Configuration management for the console
//!
//! Registered servers and their database profiles are kept in
//! ~/.config/fbconsole/config.json. The file is read once at startup
//! ([`AppConfig::load`]) and written back at shutdown ([`AppConfig::save`]).

use crate::db::{ConnectParams, DEFAULT_PORT};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

macro_rules! charsets {
    ($($variant:ident => $name:literal),+ $(,)?) => {
        /// Connection character sets accepted by the server
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum Charset {
            $(#[serde(rename = $name)] $variant,)+
        }

        impl Charset {
            pub const ALL: &'static [Charset] = &[$(Charset::$variant,)+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Charset::$variant => $name,)+
                }
            }
        }
    };
}

charsets! {
    UnicodeFss => "UNICODE_FSS",
    None => "NONE",
    Ascii => "ASCII",
    Utf8 => "UTF8",
    Octets => "OCTETS",
    Sjis0208 => "SJIS_0208",
    Eucj0208 => "EUCJ_0208",
    Dos437 => "DOS437",
    Dos850 => "DOS850",
    Dos865 => "DOS865",
    Iso8859_1 => "ISO8859_1",
    Iso8859_2 => "ISO8859_2",
    Iso8859_3 => "ISO8859_3",
    Iso8859_4 => "ISO8859_4",
    Iso8859_5 => "ISO8859_5",
    Iso8859_6 => "ISO8859_6",
    Iso8859_7 => "ISO8859_7",
    Iso8859_8 => "ISO8859_8",
    Iso8859_9 => "ISO8859_9",
    Iso8859_13 => "ISO8859_13",
    Dos852 => "DOS852",
    Dos857 => "DOS857",
    Dos860 => "DOS860",
    Dos861 => "DOS861",
    Dos863 => "DOS863",
    Cyrl => "CYRL",
    Dos737 => "DOS737",
    Dos775 => "DOS775",
    Dos858 => "DOS858",
    Dos862 => "DOS862",
    Dos864 => "DOS864",
    Dos866 => "DOS866",
    Dos869 => "DOS869",
    Win1250 => "WIN1250",
    Win1251 => "WIN1251",
    Win1252 => "WIN1252",
    Win1253 => "WIN1253",
    Win1254 => "WIN1254",
    Next => "NEXT",
    Win1255 => "WIN1255",
    Win1256 => "WIN1256",
    Win1257 => "WIN1257",
    Ksc5601 => "KSC_5601",
    Big5 => "BIG_5",
    Gb2312 => "GB_2312",
    Koi8r => "KOI8R",
    Koi8u => "KOI8U",
    Win1258 => "WIN1258",
    Tis620 => "TIS620",
    Gbk => "GBK",
    Cp943c => "CP943C",
}

impl Default for Charset {
    fn default() -> Self {
        Charset::UnicodeFss
    }
}

impl fmt::Display for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Charset {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        Charset::ALL
            .iter()
            .copied()
            .find(|c| c.as_str().eq_ignore_ascii_case(wanted))
            .with_context(|| format!("Unknown character set: {}", wanted))
    }
}

/// Saved parameters for one database (the host comes from the owning server)
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ConnProfile {
    pub path: String,
    pub user: String,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub charset: Charset,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub save_password: bool,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

impl Default for ConnProfile {
    fn default() -> Self {
        Self {
            path: String::new(),
            user: std::env::var("ISC_USER").unwrap_or_else(|_| "SYSDBA".to_string()),
            password: std::env::var("ISC_PASSWORD").ok(),
            charset: Charset::default(),
            port: DEFAULT_PORT,
            save_password: false,
        }
    }
}

impl ConnProfile {
    /// Check if all required fields are filled
    pub fn is_valid(&self) -> bool {
        !self.path.trim().is_empty() && !self.user.trim().is_empty() && self.port > 0
    }

    /// True when the password must be asked for before opening
    pub fn needs_password(&self) -> bool {
        self.password.is_none()
    }

    /// Build the parameters for opening a session on `host`.
    ///
    /// `password` overrides the stored one (e.g. from a prompt).
    pub fn connect_params(&self, host: &str, password: Option<&str>) -> Result<ConnectParams> {
        let password = password
            .map(str::to_string)
            .or_else(|| self.password.clone())
            .with_context(|| format!("No password for {}", self.user))?;
        Ok(ConnectParams {
            host: host.to_string(),
            path: self.path.clone(),
            user: self.user.clone(),
            password,
            charset: self.charset,
            port: self.port,
        })
    }
}

/// A registered server and its databases
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct ServerEntry {
    pub name: String,
    #[serde(default)]
    pub databases: Vec<ConnProfile>,
}

/// Main window placement
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct WindowLayout {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    pub divider: u32,
}

impl Default for WindowLayout {
    fn default() -> Self {
        Self {
            x: 0,
            y: 0,
            width: 800,
            height: 600,
            divider: 200,
        }
    }
}

/// Application configuration
#[derive(Serialize, Deserialize, Default, Clone, Debug, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub servers: Vec<ServerEntry>,
    #[serde(default)]
    pub window: WindowLayout,
    /// Log filter (e.g. "info", "fb_console=debug")
    #[serde(default)]
    pub log_level: Option<String>,
}

impl AppConfig {
    /// Get the config file path (~/.config/fbconsole/config.json)
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not find config directory")?
            .join("fbconsole");

        Ok(config_dir.join("config.json"))
    }

    /// Load configuration from the default location.
    ///
    /// A missing or unreadable file yields the default configuration.
    pub fn load() -> Self {
        let _ = dotenvy::dotenv();
        match Self::config_path().and_then(|p| Self::load_from(&p)) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(error = %e, "using default configuration");
                Self::default()
            }
        }
    }

    /// Load configuration from `path`; a missing file is not an error
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .context("Failed to read config file")?;

        let config: Self = serde_json::from_str(&contents)
            .context("Failed to parse config file")?;

        Ok(config)
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to `path`, dropping passwords not marked for saving
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .context("Failed to create config directory")?;
        }

        let contents = serde_json::to_string_pretty(&self.for_storage())
            .context("Failed to serialize config")?;

        fs::write(path, contents)
            .context("Failed to write config file")?;

        tracing::debug!(path = %path.display(), "configuration saved");
        Ok(())
    }

    fn for_storage(&self) -> Self {
        let mut stored = self.clone();
        for db in stored.servers.iter_mut().flat_map(|s| s.databases.iter_mut()) {
            if !db.save_password {
                db.password = None;
            }
        }
        stored
    }

    /// Register a server; an existing server of the same name is kept
    pub fn add_server(&mut self, name: &str) {
        if self.server(name).is_none() {
            self.servers.push(ServerEntry {
                name: name.to_string(),
                databases: Vec::new(),
            });
        }
    }

    pub fn rename_server(&mut self, old: &str, new: &str) -> bool {
        match self.servers.iter_mut().find(|s| s.name == old) {
            Some(server) => {
                server.name = new.to_string();
                true
            }
            None => false,
        }
    }

    pub fn remove_server(&mut self, name: &str) {
        self.servers.retain(|s| s.name != name);
    }

    pub fn server(&self, name: &str) -> Option<&ServerEntry> {
        self.servers.iter().find(|s| s.name == name)
    }

    /// Add or update a database profile (updates if the path already exists)
    pub fn add_database(&mut self, server: &str, profile: ConnProfile) -> Result<()> {
        let entry = self
            .servers
            .iter_mut()
            .find(|s| s.name == server)
            .with_context(|| format!("Unknown server: {}", server))?;
        if let Some(existing) = entry.databases.iter_mut().find(|d| d.path == profile.path) {
            *existing = profile;
        } else {
            entry.databases.push(profile);
        }
        Ok(())
    }

    pub fn remove_database(&mut self, server: &str, path: &str) {
        if let Some(entry) = self.servers.iter_mut().find(|s| s.name == server) {
            entry.databases.retain(|d| d.path != path);
        }
    }
}
