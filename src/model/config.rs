use serde::{Deserialize, Serialize};

/// Configuration from deck.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeckConfig {
    pub deck: DeckInfo,
    #[serde(default)]
    pub projects: Vec<ProjectConfig>,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeckInfo {
    pub name: String,
    /// Name of the project commands operate on
    #[serde(default)]
    pub active: Option<String>,
}

/// One named outline and the JSON file that stores it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub name: String,
    pub file: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Directory (relative to the workspace root) holding `<unitID>.tex` files
    #[serde(default = "default_units_dir")]
    pub units_dir: String,
    /// Directory (relative to the workspace root) receiving versioned exports
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    /// Header template containing the `%%CONTENT%%` marker
    #[serde(default)]
    pub header: Option<String>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        ExportConfig {
            units_dir: default_units_dir(),
            output_dir: default_output_dir(),
            header: None,
        }
    }
}

fn default_units_dir() -> String {
    "units".to_string()
}

fn default_output_dir() -> String {
    "exports".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Fallback filter when ND_LOG is unset (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl DeckConfig {
    pub fn project(&self, name: &str) -> Option<&ProjectConfig> {
        self.projects.iter().find(|p| p.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_defaults() {
        let config: DeckConfig = toml::from_str("[deck]\nname = \"notes\"\n").unwrap();
        assert_eq!(config.deck.name, "notes");
        assert!(config.deck.active.is_none());
        assert!(config.projects.is_empty());
        assert_eq!(config.export.units_dir, "units");
        assert_eq!(config.export.output_dir, "exports");
        assert_eq!(config.log.level, "warn");
    }

    #[test]
    fn test_full_config() {
        let text = r#"[deck]
name = "notes"
active = "eft"

[[projects]]
name = "eft"
file = "projects/eft.json"

[export]
units_dir = "lib/modules"
header = "header.tex"
"#;
        let config: DeckConfig = toml::from_str(text).unwrap();
        assert_eq!(config.deck.active.as_deref(), Some("eft"));
        assert_eq!(config.project("eft").unwrap().file, "projects/eft.json");
        assert_eq!(config.export.units_dir, "lib/modules");
        assert_eq!(config.export.output_dir, "exports");
        assert_eq!(config.export.header.as_deref(), Some("header.tex"));
    }
}
