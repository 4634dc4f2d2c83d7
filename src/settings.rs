use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

static SETTINGS: OnceLock<Settings> = OnceLock::new();

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub store: Store,
    pub monitor: Monitor,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Store {
    pub database_url: String,
    pub pool_size: u32,
    pub busy_timeout_ms: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Monitor {
    pub watch_database: bool,
    pub debounce_ms: u64,
    pub report_top_items: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            store: Store {
                database_url: "closet.db".to_string(),
                pool_size: 4,
                busy_timeout_ms: 2000,
            },
            monitor: Monitor {
                watch_database: true,
                debounce_ms: 250,
                report_top_items: 5,
            },
        }
    }
}

impl Settings {
    pub fn load() -> &'static Settings {
        SETTINGS.get_or_init(Self::load_from_files)
    }

    fn load_from_files() -> Settings {
        let mut settings =
            Self::load_layered(Path::new("settings.default.ron"), Path::new("settings.ron"));

        if let Ok(url) = std::env::var("DATABASE_URL") {
            if !url.trim().is_empty() {
                settings.store.database_url = url;
            }
        }

        settings
    }

    fn load_layered(default_path: &Path, override_path: &Path) -> Settings {
        let mut settings = if default_path.exists() {
            fs::read_to_string(default_path)
                .ok()
                .and_then(|content| ron::from_str(&content).ok())
                .unwrap_or_default()
        } else {
            Settings::default()
        };

        if override_path.exists() {
            if let Ok(content) = fs::read_to_string(override_path) {
                if let Ok(overrides) = ron::from_str::<Settings>(&content) {
                    settings = overrides;
                }
            }
        }

        settings
    }
}

pub fn settings() -> &'static Settings {
    Settings::load()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_without_files() {
        let dir = TempDir::new().unwrap();
        let settings = Settings::load_layered(
            &dir.path().join("missing.default.ron"),
            &dir.path().join("missing.ron"),
        );
        assert_eq!(settings.store.database_url, "closet.db");
        assert_eq!(settings.monitor.report_top_items, 5);
    }

    #[test]
    fn test_override_file_replaces_defaults() {
        let dir = TempDir::new().unwrap();
        let default_path = dir.path().join("settings.default.ron");
        let override_path = dir.path().join("settings.ron");

        fs::write(
            &default_path,
            ron::to_string(&Settings::default()).unwrap(),
        )
        .unwrap();
        fs::write(
            &override_path,
            r#"(
                store: (database_url: "wardrobe.db", pool_size: 1, busy_timeout_ms: 500),
                monitor: (watch_database: false, debounce_ms: 10, report_top_items: 2),
            )"#,
        )
        .unwrap();

        let settings = Settings::load_layered(&default_path, &override_path);
        assert_eq!(settings.store.database_url, "wardrobe.db");
        assert!(!settings.monitor.watch_database);
        assert_eq!(settings.monitor.report_top_items, 2);
    }

    #[test]
    fn test_unparsable_override_is_ignored() {
        let dir = TempDir::new().unwrap();
        let override_path = dir.path().join("settings.ron");
        fs::write(&override_path, "(store: oops)").unwrap();

        let settings =
            Settings::load_layered(&dir.path().join("settings.default.ron"), &override_path);
        assert_eq!(settings.store.pool_size, 4);
    }

    #[test]
    fn test_shipped_defaults_parse() {
        let content = include_str!("../settings.default.ron");
        let settings: Settings = ron::from_str(content).unwrap();
        assert_eq!(settings.store.database_url, Settings::default().store.database_url);
    }
}
