use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use quickgist_core::links::parse_base_url;
use quickgist_core::validation::{FILE_MAX_BYTES, Limits};

/// Current config version. Bump this when adding fields or changing shape.
/// Each bump requires a corresponding entry in [`migrate`].
const CURRENT_VERSION: u32 = 1;

pub const ENV_SERVER_URI: &str = "QUICKGIST_SERVER_URI";
pub const ENV_FRONTEND_ORIGIN: &str = "QUICKGIST_FRONTEND_ORIGIN";
pub const ENV_IDENTITY_PUBLIC_KEY: &str = "QUICKGIST_IDENTITY_PUBLIC_KEY";
pub const ENV_SESSION_TOKEN: &str = "QUICKGIST_SESSION_TOKEN";

const DEFAULT_SERVER_URI: &str = "http://localhost:8000";
const DEFAULT_FRONTEND_ORIGIN: &str = "http://localhost:5173";
const DEFAULT_CACHE_TTL_SECS: u64 = 300;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuickgistConfig {
    /// Schema version. Missing or 0 = pre-versioned config.
    #[serde(default)]
    pub config_version: u32,
    pub server_uri: String,
    pub frontend_origin: String,
    /// PEM public key of the identity provider, used to verify sessions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity_public_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_token: Option<String>,
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
    #[serde(default = "default_max_file_bytes")]
    pub max_file_bytes: usize,
}

fn default_cache_ttl_secs() -> u64 {
    DEFAULT_CACHE_TTL_SECS
}

fn default_max_file_bytes() -> usize {
    FILE_MAX_BYTES
}

impl Default for QuickgistConfig {
    fn default() -> Self {
        Self {
            config_version: CURRENT_VERSION,
            server_uri: DEFAULT_SERVER_URI.to_string(),
            frontend_origin: DEFAULT_FRONTEND_ORIGIN.to_string(),
            identity_public_key: None,
            session_token: None,
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            max_file_bytes: FILE_MAX_BYTES,
        }
    }
}

impl QuickgistConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn limits(&self) -> Limits {
        Limits {
            file_max_bytes: self.max_file_bytes,
            ..Limits::default()
        }
    }

    /// Apply environment overrides. `lookup` is `std::env::var` in
    /// production; tests pass a map.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(v) = non_empty(ENV_SERVER_URI) {
            self.server_uri = v;
        }
        if let Some(v) = non_empty(ENV_FRONTEND_ORIGIN) {
            self.frontend_origin = v;
        }
        if let Some(v) = non_empty(ENV_IDENTITY_PUBLIC_KEY) {
            self.identity_public_key = Some(v);
        }
        if let Some(v) = non_empty(ENV_SESSION_TOKEN) {
            self.session_token = Some(v);
        }
    }

    /// Check that both base URLs parse.
    pub fn validate(&self) -> eyre::Result<()> {
        parse_base_url(&self.server_uri)
            .map_err(|e| eyre::eyre!("invalid server_uri {:?}: {e}", self.server_uri))?;
        parse_base_url(&self.frontend_origin)
            .map_err(|e| eyre::eyre!("invalid frontend_origin {:?}: {e}", self.frontend_origin))?;
        Ok(())
    }
}

/// Redacted config info safe to print.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigInfo {
    pub path: String,
    pub server_uri: String,
    pub frontend_origin: String,
    pub identity_public_key: bool,
    pub session_token_hint: Option<String>,
    pub cache_ttl_secs: u64,
    pub max_file_bytes: usize,
}

pub fn config_dir() -> eyre::Result<PathBuf> {
    let base = dirs::config_dir().ok_or_else(|| eyre::eyre!("no config directory found"))?;
    Ok(base.join("quickgist"))
}

pub fn config_path() -> eyre::Result<PathBuf> {
    Ok(config_dir()?.join("config.json"))
}

/// Load the config at `path`, or defaults when the file does not exist.
pub fn load_config_from(path: &Path) -> eyre::Result<QuickgistConfig> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        return Ok(QuickgistConfig::default());
    }

    let contents = std::fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("failed to read config at {}: {e}", path.display()))?;

    // Parse as raw JSON so we can run migrations before deserializing.
    let json: serde_json::Value = serde_json::from_str(&contents)?;
    let on_disk_version = json
        .get("config_version")
        .and_then(|v| v.as_u64())
        .unwrap_or(0) as u32;

    let migrated = migrate(json, on_disk_version)?;
    let config: QuickgistConfig = serde_json::from_value(migrated)?;
    Ok(config)
}

/// Run sequential migrations from `from_version` up to [`CURRENT_VERSION`].
fn migrate(mut json: serde_json::Value, from_version: u32) -> eyre::Result<serde_json::Value> {
    if from_version > CURRENT_VERSION {
        return Err(eyre::eyre!(
            "config_version {from_version} is newer than this build supports ({CURRENT_VERSION}). \
             Please update quickgist."
        ));
    }

    // v0 → v1: `server_url` renamed to `server_uri`; cache and upload limits added.
    if from_version < 1 {
        let obj = json
            .as_object_mut()
            .ok_or_else(|| eyre::eyre!("config is not a JSON object"))?;
        if let Some(url) = obj.remove("server_url") {
            obj.entry("server_uri").or_insert(url);
        }
        obj.entry("server_uri")
            .or_insert(serde_json::Value::String(DEFAULT_SERVER_URI.to_string()));
        obj.entry("frontend_origin")
            .or_insert(serde_json::Value::String(DEFAULT_FRONTEND_ORIGIN.to_string()));
        obj.entry("cache_ttl_secs")
            .or_insert(serde_json::Value::Number(DEFAULT_CACHE_TTL_SECS.into()));
        obj.entry("max_file_bytes")
            .or_insert(serde_json::Value::Number(FILE_MAX_BYTES.into()));
        obj.insert(
            "config_version".to_string(),
            serde_json::Value::Number(1.into()),
        );
        tracing::info!("migrated config v0 → v1");
    }

    Ok(json)
}

pub fn save_config_to(path: &Path, config: &QuickgistConfig) -> eyre::Result<()> {
    let dir = path
        .parent()
        .ok_or_else(|| eyre::eyre!("config path {} has no parent", path.display()))?;
    std::fs::create_dir_all(dir)?;

    // Always write the current version, regardless of what was loaded.
    let mut stamped = config.clone();
    stamped.config_version = CURRENT_VERSION;

    let json = serde_json::to_string_pretty(&stamped)?;

    // Write to a temp file then rename for atomicity
    let tmp_path = path.with_extension("json.tmp");
    std::fs::write(&tmp_path, json.as_bytes())?;

    // The file may hold a session token.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&tmp_path, std::fs::Permissions::from_mode(0o600))?;
    }

    std::fs::rename(&tmp_path, path)?;

    tracing::info!(path = %path.display(), "config saved");
    Ok(())
}

pub fn config_info(path: &Path, config: &QuickgistConfig) -> ConfigInfo {
    ConfigInfo {
        path: path.display().to_string(),
        server_uri: config.server_uri.clone(),
        frontend_origin: config.frontend_origin.clone(),
        identity_public_key: config.identity_public_key.is_some(),
        session_token_hint: config.session_token.as_deref().map(redact_token),
        cache_ttl_secs: config.cache_ttl_secs,
        max_file_bytes: config.max_file_bytes,
    }
}

fn redact_token(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 8 {
        return "****".to_string();
    }
    let prefix: String = chars[..4].iter().collect();
    let suffix: String = chars[chars.len() - 4..].iter().collect();
    format!("{prefix}...{suffix}")
}
