//! Configuration management for promptgen.
//!
//! Configuration is layered: built-in defaults, then the user file
//! (`~/.config/promptgen/config.toml`), then the repository file
//! (`<repo>/.promptgen/config.toml`), then an explicit `--config` file. Later
//! layers override earlier ones key by key. Keys are kebab-case. Unknown keys
//! are warned about, not rejected, since they are usually typos.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::template::{find_repo_root, ExtensionSet, PathResolver, TierRoots};

/// Default user instruction: wrap the piped document and append the query
/// when one was given
pub const DEFAULT_USER_INSTRUCTION: &str = "<document>\n{{ document }}\n</document>\n\n{% if input is defined %}\nUser Query: {{ input }}\n{% endif %}\n";

/// Marker prefix for file-indirected instruction values
const FILE_INDIRECTION_PREFIX: &str = "@:";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Config {
    /// Template discovery configuration
    pub templates: TemplateConfig,
    /// Generation request configuration
    pub generation: GenerationConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            templates: TemplateConfig::default(),
            generation: GenerationConfig::default(),
        }
    }
}

/// Template discovery configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct TemplateConfig {
    /// Project-tier template roots, in precedence order
    pub project_roots: Vec<PathBuf>,
    /// User-tier template roots, in precedence order
    pub user_roots: Vec<PathBuf>,
    /// Builtin-tier template roots, in precedence order
    pub builtin_roots: Vec<PathBuf>,
    /// Recognized template extensions; compound suffixes are matched before
    /// their shorter tails
    pub extensions: Vec<String>,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        let roots = PathResolver::default_roots();
        Self {
            project_roots: roots.project,
            user_roots: roots.user,
            builtin_roots: roots.builtin,
            extensions: ExtensionSet::default().as_slice().to_vec(),
        }
    }
}

impl TemplateConfig {
    /// The configured roots as a tier→roots mapping
    pub fn tier_roots(&self) -> TierRoots {
        TierRoots {
            project: self.project_roots.clone(),
            user: self.user_roots.clone(),
            builtin: self.builtin_roots.clone(),
        }
    }

    /// The configured extensions as a matching set
    pub fn extension_set(&self) -> ExtensionSet {
        ExtensionSet::new(self.extensions.iter().cloned())
    }
}

/// Generation request configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct GenerationConfig {
    /// Model identifier
    pub model: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Response MIME type requested from the API
    pub response_mime_type: String,
    /// Maximum output tokens; unlimited when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
    /// Literal system instruction template string
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<String>,
    /// Literal user instruction template string
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_instruction: Option<String>,
    /// Named catalog template for the system instruction; takes precedence
    /// over the literal string
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction_template: Option<String>,
    /// Named catalog template for the user instruction; takes precedence
    /// over the literal string
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_instruction_template: Option<String>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: "gemini-flash-latest".to_string(),
            temperature: 0.1,
            response_mime_type: "text/plain".to_string(),
            max_output_tokens: None,
            system_instruction: None,
            user_instruction: Some(DEFAULT_USER_INSTRUCTION.to_string()),
            system_instruction_template: None,
            user_instruction_template: None,
        }
    }
}

impl Config {
    /// Load the effective configuration: defaults, user file, repository
    /// file, then an explicit file if given.
    ///
    /// Missing user and repository files are normal; a missing explicit file
    /// is an error.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = Config::default();

        if let Some(path) = Self::user_config_path() {
            Self::merge_file(&mut config, &path, "user", false)?;
        }
        if let Some(path) = Self::repo_config_path() {
            Self::merge_file(&mut config, &path, "repository", false)?;
        }
        if let Some(path) = explicit {
            Self::merge_file(&mut config, path, "command line", true)?;
        }

        config.resolve_indirections()?;
        tracing::debug!("effective configuration: {:?}", config);
        Ok(config)
    }

    /// Path of the user-level configuration file, if a config directory
    /// exists on this platform
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("promptgen").join("config.toml"))
    }

    /// Path of the repository-level configuration file, if inside a Git
    /// repository
    pub fn repo_config_path() -> Option<PathBuf> {
        let cwd = std::env::current_dir().ok()?;
        find_repo_root(&cwd).map(|root| root.join(".promptgen").join("config.toml"))
    }

    fn merge_file(config: &mut Config, path: &Path, source: &str, required: bool) -> Result<()> {
        if !path.exists() {
            if required {
                return Err(Error::config(format!(
                    "configuration file not found: {}",
                    path.display()
                )));
            }
            tracing::debug!("no {} configuration file at {}", source, path.display());
            return Ok(());
        }

        tracing::info!("loading {} configuration from {}", source, path.display());
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::config(format!("cannot read {}: {}", path.display(), e)))?;
        let overlay: ConfigOverlay = toml::from_str(&content)
            .map_err(|e| Error::config(format!("invalid TOML in {}: {}", path.display(), e)))?;
        overlay.apply(config, source);
        Ok(())
    }

    /// Replace `@:path` instruction values with the content of the named file
    fn resolve_indirections(&mut self) -> Result<()> {
        for value in [
            &mut self.generation.system_instruction,
            &mut self.generation.user_instruction,
        ] {
            if let Some(text) = value {
                if let Some(file) = text.strip_prefix(FILE_INDIRECTION_PREFIX) {
                    tracing::info!("loading instruction template from file: {}", file);
                    *value = Some(read_file_content(Path::new(file))?);
                }
            }
        }
        Ok(())
    }
}

/// Read a file into a string, resolving relative paths against the current
/// directory for error reporting
pub fn read_file_content(path: &Path) -> Result<String> {
    let absolute = std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| path.to_path_buf());
    std::fs::read_to_string(&absolute).map_err(|e| {
        Error::config(format!(
            "cannot read file '{}' (resolved to '{}'): {}",
            path.display(),
            absolute.display(),
            e
        ))
    })
}

/// One configuration file's contribution; every field optional so later
/// layers only override what they mention
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
struct ConfigOverlay {
    templates: Option<TemplateOverlay>,
    generation: Option<GenerationOverlay>,
    #[serde(flatten)]
    unknown: toml::Table,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
struct TemplateOverlay {
    project_roots: Option<Vec<PathBuf>>,
    user_roots: Option<Vec<PathBuf>>,
    builtin_roots: Option<Vec<PathBuf>>,
    extensions: Option<Vec<String>>,
    #[serde(flatten)]
    unknown: toml::Table,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
struct GenerationOverlay {
    model: Option<String>,
    temperature: Option<f32>,
    response_mime_type: Option<String>,
    max_output_tokens: Option<u32>,
    system_instruction: Option<String>,
    user_instruction: Option<String>,
    system_instruction_template: Option<String>,
    user_instruction_template: Option<String>,
    #[serde(flatten)]
    unknown: toml::Table,
}

impl ConfigOverlay {
    fn apply(self, config: &mut Config, source: &str) {
        warn_unknown(&self.unknown, source);
        if let Some(templates) = self.templates {
            templates.apply(&mut config.templates, source);
        }
        if let Some(generation) = self.generation {
            generation.apply(&mut config.generation, source);
        }
    }
}

impl TemplateOverlay {
    fn apply(self, config: &mut TemplateConfig, source: &str) {
        warn_unknown(&self.unknown, source);
        if let Some(v) = self.project_roots {
            config.project_roots = v;
        }
        if let Some(v) = self.user_roots {
            config.user_roots = v;
        }
        if let Some(v) = self.builtin_roots {
            config.builtin_roots = v;
        }
        if let Some(v) = self.extensions {
            config.extensions = v;
        }
    }
}

impl GenerationOverlay {
    fn apply(self, config: &mut GenerationConfig, source: &str) {
        warn_unknown(&self.unknown, source);
        if let Some(v) = self.model {
            config.model = v;
        }
        if let Some(v) = self.temperature {
            config.temperature = v;
        }
        if let Some(v) = self.response_mime_type {
            config.response_mime_type = v;
        }
        if let Some(v) = self.max_output_tokens {
            config.max_output_tokens = Some(v);
        }
        if let Some(v) = self.system_instruction {
            config.system_instruction = Some(v);
        }
        if let Some(v) = self.user_instruction {
            config.user_instruction = Some(v);
        }
        if let Some(v) = self.system_instruction_template {
            config.system_instruction_template = Some(v);
        }
        if let Some(v) = self.user_instruction_template {
            config.user_instruction_template = Some(v);
        }
    }
}

fn warn_unknown(unknown: &toml::Table, source: &str) {
    for key in unknown.keys() {
        tracing::warn!(
            "unknown configuration parameter '{}' from {} configuration; this may be a typo",
            key,
            source
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.generation.model, "gemini-flash-latest");
        assert_eq!(config.generation.temperature, 0.1);
        assert_eq!(
            config.generation.user_instruction.as_deref(),
            Some(DEFAULT_USER_INSTRUCTION)
        );
        assert!(config.generation.system_instruction.is_none());
        assert_eq!(config.templates.extensions, vec![".j2.md", ".j2"]);
    }

    #[test]
    fn test_overlay_only_overrides_mentioned_keys() {
        let mut config = Config::default();
        let overlay: ConfigOverlay = toml::from_str(
            r#"
            [generation]
            model = "gemini-pro-latest"
            max-output-tokens = 2048
            "#,
        )
        .unwrap();
        overlay.apply(&mut config, "test");

        assert_eq!(config.generation.model, "gemini-pro-latest");
        assert_eq!(config.generation.max_output_tokens, Some(2048));
        // untouched keys keep their defaults
        assert_eq!(config.generation.temperature, 0.1);
        assert_eq!(
            config.generation.user_instruction.as_deref(),
            Some(DEFAULT_USER_INSTRUCTION)
        );
    }

    #[test]
    fn test_overlay_kebab_case_template_keys() {
        let mut config = Config::default();
        let overlay: ConfigOverlay = toml::from_str(
            r#"
            [templates]
            project-roots = ["./prompts"]
            extensions = [".tpl"]

            [generation]
            system-instruction-template = "layout/system"
            "#,
        )
        .unwrap();
        overlay.apply(&mut config, "test");

        assert_eq!(config.templates.project_roots, vec![PathBuf::from("./prompts")]);
        assert_eq!(config.templates.extensions, vec![".tpl"]);
        assert_eq!(
            config.generation.system_instruction_template.as_deref(),
            Some("layout/system")
        );
    }

    #[test]
    fn test_unknown_keys_are_tolerated() {
        let overlay: std::result::Result<ConfigOverlay, _> = toml::from_str(
            r#"
            surprise = "value"

            [generation]
            modle = "typo"
            "#,
        );
        let overlay = overlay.unwrap();
        assert!(overlay.unknown.contains_key("surprise"));
        assert!(overlay
            .generation
            .as_ref()
            .unwrap()
            .unknown
            .contains_key("modle"));
    }

    #[test]
    fn test_instruction_file_indirection() {
        let dir = tempfile::TempDir::new().unwrap();
        let file = dir.path().join("system.txt");
        std::fs::write(&file, "You are terse.").unwrap();

        let mut config = Config::default();
        config.generation.system_instruction = Some(format!("@:{}", file.display()));
        config.resolve_indirections().unwrap();

        assert_eq!(
            config.generation.system_instruction.as_deref(),
            Some("You are terse.")
        );
    }

    #[test]
    fn test_missing_indirection_file_is_an_error() {
        let mut config = Config::default();
        config.generation.user_instruction = Some("@:/no/such/file.txt".to_string());
        assert!(config.resolve_indirections().is_err());
    }

    #[test]
    fn test_extension_set_from_config_orders_longest_first() {
        let config = TemplateConfig {
            extensions: vec![".j2".to_string(), ".j2.md".to_string()],
            ..TemplateConfig::default()
        };
        let set = config.extension_set();
        assert_eq!(set.match_file_name("a.j2.md"), Some(".j2.md"));
    }
}
