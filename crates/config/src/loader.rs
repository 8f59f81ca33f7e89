use std::{
    path::{Path, PathBuf},
    sync::RwLock,
};

use tracing::{debug, warn};

use crate::{env_subst::substitute_env, schema::SwitchboardConfig};

/// Standard config file names, checked in order.
const CONFIG_FILENAMES: &[&str] = &[
    "switchboard.toml",
    "switchboard.yaml",
    "switchboard.yml",
    "switchboard.json",
];

static DATA_DIR_OVERRIDE: RwLock<Option<PathBuf>> = RwLock::new(None);

/// Load config from the given path (format chosen by extension).
pub fn load_config(path: &Path) -> anyhow::Result<SwitchboardConfig> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");
    parse_config(&substitute_env(&raw), ext)
}

/// Parse config text in the given format (`toml`, `yaml`/`yml`, `json`).
pub fn parse_config(raw: &str, ext: &str) -> anyhow::Result<SwitchboardConfig> {
    match ext {
        "toml" => Ok(toml::from_str(raw)?),
        "yaml" | "yml" => Ok(serde_yaml::from_str(raw)?),
        "json" => Ok(serde_json::from_str(raw)?),
        _ => anyhow::bail!("unsupported config format: .{ext}"),
    }
}

/// Discover and load config from standard locations.
///
/// Search order:
/// 1. `./switchboard.{toml,yaml,yml,json}`
/// 2. `<user config dir>/switchboard.{toml,yaml,yml,json}`
///
/// Returns `SwitchboardConfig::default()` if nothing is found or the file
/// fails to parse.
pub fn discover_and_load() -> SwitchboardConfig {
    let Some(path) = find_config_file() else {
        debug!("no config file found, using defaults");
        return SwitchboardConfig::default();
    };
    debug!(path = %path.display(), "loading config");
    load_config(&path).unwrap_or_else(|e| {
        warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
        SwitchboardConfig::default()
    })
}

fn find_config_file() -> Option<PathBuf> {
    let local = CONFIG_FILENAMES.iter().map(PathBuf::from);
    let global = config_dir()
        .into_iter()
        .flat_map(|dir| CONFIG_FILENAMES.iter().map(move |name| dir.join(name)));
    local.chain(global).find(|p| p.exists())
}

/// Returns the user-global config directory.
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "switchboard").map(|d| d.config_dir().to_path_buf())
}

/// Returns the data directory: the process override if set, else the
/// platform data dir, else `./.switchboard`.
pub fn data_dir() -> PathBuf {
    let guard = DATA_DIR_OVERRIDE
        .read()
        .unwrap_or_else(|e| e.into_inner());
    if let Some(dir) = guard.as_ref() {
        return dir.clone();
    }
    directories::ProjectDirs::from("", "", "switchboard")
        .map(|d| d.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".switchboard"))
}

/// Override the data directory for the rest of the process.
pub fn set_data_dir(path: impl Into<PathBuf>) {
    let mut guard = DATA_DIR_OVERRIDE
        .write()
        .unwrap_or_else(|e| e.into_inner());
    *guard = Some(path.into());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_toml_agents_and_channels() {
        let raw = r#"
[[agents.list]]
id = "ops"
default = true
workspace = "~/ops"

[[agents.list]]
id = "research"

[channels.telegram]
history_limit = 50
dm_history_limit = 10

[channels.telegram.dms.user123]
history_limit = 5

[messages.inbound]
debounce_ms = 1500
by_channel = { discord = 800 }
"#;
        let cfg = parse_config(raw, "toml").unwrap();
        assert_eq!(cfg.agents.list.len(), 2);
        assert!(cfg.agents.list[0].default);
        assert_eq!(cfg.agents.list[1].id, "research");
        let tg = cfg.channels.get("telegram").unwrap();
        assert_eq!(tg.dms["user123"].history_limit, Some(5));
        assert_eq!(cfg.messages.inbound.by_channel["discord"], 800);
    }

    #[test]
    fn parses_yaml() {
        let raw = "agents:\n  list:\n    - id: main\nsession:\n  main_key: primary\n";
        let cfg = parse_config(raw, "yml").unwrap();
        assert_eq!(cfg.agents.list[0].id, "main");
        assert_eq!(cfg.session.main_key, "primary");
    }

    #[test]
    fn rejects_unknown_extension() {
        let err = parse_config("", "ini").unwrap_err();
        assert!(err.to_string().contains("unsupported config format"));
    }

    #[test]
    fn load_config_reads_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("switchboard.json");
        std::fs::write(
            &path,
            r#"{"agents":{"list":[{"id":"a1","name":"Agent One"}]}}"#,
        )
        .unwrap();
        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.agents.list[0].name.as_deref(), Some("Agent One"));
    }

    #[test]
    fn load_config_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(&dir.path().join("nope.toml")).unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }
}
