use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    pub models: Option<ModelsConfig>,
    pub grobid: Option<GrobidConfig>,
    pub server: Option<ServerConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelsConfig {
    pub dir: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GrobidConfig {
    pub url: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    pub listen: Option<String>,
    pub max_upload_mb: Option<u32>,
}

/// Platform config directory path: `<config_dir>/claimsift/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("claimsift").join("config.toml"))
}

/// Load config by cascading CWD `.claimsift.toml` over platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(&PathBuf::from(".claimsift.toml"));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

/// Load a config from a specific path. Returns `None` if the file doesn't
/// exist or can't be parsed.
pub fn load_from_path(path: &PathBuf) -> Option<ConfigFile> {
    let content = std::fs::read_to_string(path).ok()?;
    toml::from_str(&content).ok()
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    ConfigFile {
        models: Some(ModelsConfig {
            dir: overlay
                .models
                .as_ref()
                .and_then(|m| m.dir.clone())
                .or_else(|| base.models.as_ref().and_then(|m| m.dir.clone())),
        }),
        grobid: Some(GrobidConfig {
            url: overlay
                .grobid
                .as_ref()
                .and_then(|g| g.url.clone())
                .or_else(|| base.grobid.as_ref().and_then(|g| g.url.clone())),
            timeout_secs: overlay
                .grobid
                .as_ref()
                .and_then(|g| g.timeout_secs)
                .or_else(|| base.grobid.as_ref().and_then(|g| g.timeout_secs)),
        }),
        server: Some(ServerConfig {
            listen: overlay
                .server
                .as_ref()
                .and_then(|s| s.listen.clone())
                .or_else(|| base.server.as_ref().and_then(|s| s.listen.clone())),
            max_upload_mb: overlay
                .server
                .as_ref()
                .and_then(|s| s.max_upload_mb)
                .or_else(|| base.server.as_ref().and_then(|s| s.max_upload_mb)),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grobid_url_round_trip_toml() {
        let config = ConfigFile {
            grobid: Some(GrobidConfig {
                url: Some("http://localhost:8070/".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: ConfigFile = toml::from_str(&toml_str).unwrap();
        assert_eq!(
            parsed.grobid.unwrap().url.unwrap(),
            "http://localhost:8070/"
        );
    }

    #[test]
    fn models_dir_absent_deserializes_as_none() {
        let toml_str = "[grobid]\nurl = \"http://localhost:8070\"\n";
        let parsed: ConfigFile = toml::from_str(toml_str).unwrap();
        assert!(parsed.models.is_none());
    }

    #[test]
    fn merge_listen_overlay_wins() {
        let base = ConfigFile {
            server: Some(ServerConfig {
                listen: Some("0.0.0.0:8501".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let overlay = ConfigFile {
            server: Some(ServerConfig {
                listen: Some("127.0.0.1:9000".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let merged = merge(base, overlay);
        assert_eq!(merged.server.unwrap().listen.unwrap(), "127.0.0.1:9000");
    }

    #[test]
    fn merge_base_preserved_when_overlay_absent() {
        let base = ConfigFile {
            models: Some(ModelsConfig {
                dir: Some("/srv/models".to_string()),
            }),
            grobid: Some(GrobidConfig {
                timeout_secs: Some(120),
                ..Default::default()
            }),
            ..Default::default()
        };
        let overlay = ConfigFile::default();
        let merged = merge(base, overlay);
        assert_eq!(merged.models.unwrap().dir.unwrap(), "/srv/models");
        assert_eq!(merged.grobid.unwrap().timeout_secs.unwrap(), 120);
    }
}
