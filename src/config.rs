//! Project configuration loaded from `importscope.toml`.
//!
//! Every section is optional. A missing file means defaults, which match the
//! built-in [`RuleSet::standard`] and [`LayoutConfig::default`].
//!
//! ```toml
//! [analysis]
//! exclude = ["**/*.test.ts", "fixtures/**"]
//! include_external = true
//! max_diagnostics = 500
//!
//! [layout]
//! strategy = "circular"
//! hide_categories = ["config"]
//!
//! [[languages]]
//! name = "vue"
//! file_extensions = ["vue"]
//! patterns = ['import\s+\w+\s+from\s+"([^"]+)"']
//! extensions = [".vue", ".ts", ".js"]
//! index_files = ["index.vue"]
//! ```

use std::path::{Path, PathBuf};

use regex::Regex;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::analysis::{AnalysisOptions, LanguageRules, RuleSet, SpecifierStyle};
use crate::graph::Category;
use crate::layout::{LayoutConfig, LayoutStrategy, VisibilityFilter};

/// File looked up in the project root when no explicit path is given.
pub const CONFIG_FILE_NAME: &str = "importscope.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config at {}: {source}", path.display())]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid import pattern for language '{language}': {source}")]
    InvalidPattern {
        language: String,
        #[source]
        source: regex::Error,
    },

    #[error("import pattern for language '{language}' has no capture group: {pattern}")]
    MissingCapture { language: String, pattern: String },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub analysis: AnalysisSection,
    pub layout: LayoutSection,
    pub languages: Vec<LanguageSection>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisSection {
    /// Glob patterns matched against project-relative paths
    pub exclude: Vec<String>,
    pub include_external: bool,
    /// Cap on each diagnostic list in exported reports
    pub max_diagnostics: Option<usize>,
}

impl Default for AnalysisSection {
    fn default() -> Self {
        Self {
            exclude: Vec::new(),
            include_external: true,
            max_diagnostics: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutSection {
    pub strategy: LayoutStrategy,
    pub width: f32,
    pub height: f32,
    pub seed: u64,
    pub hide_categories: Vec<Category>,
    pub show_external: bool,
}

impl Default for LayoutSection {
    fn default() -> Self {
        let defaults = LayoutConfig::default();
        Self {
            strategy: defaults.strategy,
            width: defaults.viewport_width,
            height: defaults.viewport_height,
            seed: defaults.seed,
            hide_categories: Vec::new(),
            show_external: true,
        }
    }
}

/// A user-defined language, added to or replacing a built-in one.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LanguageSection {
    pub name: String,
    #[serde(default)]
    pub file_extensions: Vec<String>,
    pub patterns: Vec<String>,
    #[serde(default)]
    pub extensions: Vec<String>,
    #[serde(default)]
    pub index_files: Vec<String>,
    #[serde(default)]
    pub style: SpecifierStyle,
    /// Splits each capture into several specifiers
    #[serde(default)]
    pub list_separator: Option<String>,
}

impl LanguageSection {
    fn compile(&self) -> ConfigResult<LanguageRules> {
        let mut patterns = Vec::with_capacity(self.patterns.len());
        for pattern in &self.patterns {
            let regex = Regex::new(pattern).map_err(|source| ConfigError::InvalidPattern {
                language: self.name.clone(),
                source,
            })?;
            // group 0 is the whole match
            if regex.captures_len() < 2 {
                return Err(ConfigError::MissingCapture {
                    language: self.name.clone(),
                    pattern: pattern.clone(),
                });
            }
            patterns.push(regex);
        }

        Ok(LanguageRules {
            name: self.name.clone(),
            file_extensions: self
                .file_extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_string())
                .collect(),
            patterns,
            extensions: self.extensions.clone(),
            index_files: self.index_files.clone(),
            style: self.style,
            list_separator: self.list_separator.clone(),
        })
    }
}

impl Config {
    /// Reads and parses a config file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        if !path.is_file() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents, path)
    }

    fn parse(contents: &str, path: &Path) -> ConfigResult<Self> {
        toml::from_str(contents).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Loads `importscope.toml` from `root` if present, defaults otherwise.
    pub fn discover(root: &Path) -> ConfigResult<Self> {
        let path = root.join(CONFIG_FILE_NAME);
        if path.is_file() {
            debug!(path = %path.display(), "loading config");
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// The standard rule set extended with the configured languages.
    pub fn rule_set(&self) -> ConfigResult<RuleSet> {
        let mut rules = RuleSet::standard();
        for language in &self.languages {
            rules.insert(language.compile()?);
        }
        Ok(rules)
    }

    pub fn analysis_options(&self) -> AnalysisOptions {
        AnalysisOptions {
            include_external: self.analysis.include_external,
        }
    }

    pub fn layout_config(&self) -> LayoutConfig {
        let filter = VisibilityFilter {
            hidden_categories: self.layout.hide_categories.iter().copied().collect(),
            show_external: self.layout.show_external,
        };
        LayoutConfig::new(self.layout.strategy, self.layout.width, self.layout.height)
            .with_filter(filter)
            .with_seed(self.layout.seed)
    }
}
