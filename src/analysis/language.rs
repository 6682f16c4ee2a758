//! Per-language import rule tables.
//!
//! A [`RuleSet`] is immutable configuration data handed to the extractor and
//! the resolver. Each registered language carries the regular expressions that
//! pull import specifiers out of its source text, plus the ordered extension
//! and index-file lists used to resolve relative specifiers on disk.

use std::collections::HashMap;
use std::path::Path;

use regex::Regex;
use serde::Deserialize;

/// How a language spells relative module references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpecifierStyle {
    /// Slash-separated paths: `./utils`, `../lib/api.js`
    #[default]
    Path,
    /// Dotted module names with leading dots for relative imports: `.utils`, `..pkg.mod`
    Dotted,
}

/// Import rules for a single language.
#[derive(Debug, Clone)]
pub struct LanguageRules {
    /// Language tag (e.g. "javascript")
    pub name: String,
    /// Source file extensions (without the dot) that belong to this language
    pub file_extensions: Vec<String>,
    /// Patterns with exactly one capture group holding the specifier
    pub patterns: Vec<Regex>,
    /// Extensions appended to extensionless specifiers, tried in order
    pub extensions: Vec<String>,
    /// Index file names tried inside a directory target, in order
    pub index_files: Vec<String>,
    /// Relative specifier spelling
    pub style: SpecifierStyle,
    /// Splits one capture into several specifiers (`import os, sys`).
    /// Only the first word of each item is kept, so `json as j` yields `json`.
    pub list_separator: Option<String>,
}

impl LanguageRules {
    /// Creates rules for `name` from raw pattern strings.
    ///
    /// Fails on the first pattern that is not a valid regular expression.
    pub fn new(name: impl Into<String>, patterns: &[&str]) -> Result<Self, regex::Error> {
        let patterns = patterns
            .iter()
            .map(|p| Regex::new(p))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            name: name.into(),
            file_extensions: Vec::new(),
            patterns,
            extensions: Vec::new(),
            index_files: Vec::new(),
            style: SpecifierStyle::Path,
            list_separator: None,
        })
    }

    /// Sets the source file extensions, given without the leading dot.
    pub fn with_file_extensions(mut self, exts: &[&str]) -> Self {
        self.file_extensions = exts.iter().map(|e| e.to_string()).collect();
        self
    }

    /// Sets the extensions tried, in order, when resolving an extensionless specifier.
    pub fn with_extensions(mut self, exts: &[&str]) -> Self {
        self.extensions = exts.iter().map(|e| e.to_string()).collect();
        self
    }

    /// Sets the index files tried, in order, inside a directory target.
    pub fn with_index_files(mut self, files: &[&str]) -> Self {
        self.index_files = files.iter().map(|f| f.to_string()).collect();
        self
    }

    pub fn with_style(mut self, style: SpecifierStyle) -> Self {
        self.style = style;
        self
    }

    /// Treats each capture as a `separator`-delimited list of specifiers.
    pub fn with_list_separator(mut self, separator: &str) -> Self {
        self.list_separator = Some(separator.to_string());
        self
    }
}

const JS_PATTERNS: &[&str] = &[
    // import x from 'y' / import { a, b } from 'y' / import 'y'
    r#"\bimport\s+(?:type\s+)?(?:[\w$*\s{},]*?\s*from\s*)?['"]([^'"\n]+)['"]"#,
    // export * from 'y' / export { a } from 'y'
    r#"\bexport\s+(?:type\s+)?(?:\*(?:\s+as\s+[\w$]+)?|\{[^}]*\})\s*from\s*['"]([^'"\n]+)['"]"#,
    // import('y')
    r#"\bimport\s*\(\s*['"]([^'"\n]+)['"]\s*\)"#,
    // require('y')
    r#"\brequire\s*\(\s*['"]([^'"\n]+)['"]\s*\)"#,
];

const PYTHON_PATTERNS: &[&str] = &[
    r"(?m)^[ \t]*from[ \t]+(\.+[\w.]*|[A-Za-z_][\w.]*)[ \t]+import\b",
    // import a, b.c as d
    r"(?m)^[ \t]*import[ \t]+([A-Za-z_][\w.]*(?:[ \t]+as[ \t]+\w+)?(?:[ \t]*,[ \t]*[A-Za-z_][\w.]*(?:[ \t]+as[ \t]+\w+)?)*)",
];

const CSS_PATTERNS: &[&str] = &[
    r#"@import\s+(?:url\(\s*)?['"]([^'"\n]+)['"]"#,
    r#"@(?:use|forward)\s+['"]([^'"\n]+)['"]"#,
];

/// The collection of language rules known to one analysis run.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    languages: HashMap<String, LanguageRules>,
    by_extension: HashMap<String, String>,
}

impl RuleSet {
    /// Creates a rule set with no languages registered.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates the built-in rule set: javascript, typescript, python and css.
    ///
    /// # Example
    ///
    /// ```
    /// use std::path::Path;
    /// use importscope::analysis::RuleSet;
    ///
    /// let rules = RuleSet::standard();
    /// assert_eq!(rules.language_for_path(Path::new("src/app.tsx")), Some("typescript"));
    /// ```
    pub fn standard() -> Self {
        let mut set = Self::empty();

        set.insert(
            builtin("javascript", JS_PATTERNS)
                .with_file_extensions(&["js", "jsx", "mjs", "cjs"])
                .with_extensions(&[".js", ".jsx", ".mjs", ".cjs", ".ts", ".tsx", ".json"])
                .with_index_files(&["index.js", "index.jsx", "index.ts", "index.tsx"]),
        );
        set.insert(
            builtin("typescript", JS_PATTERNS)
                .with_file_extensions(&["ts", "tsx", "mts", "cts"])
                .with_extensions(&[".ts", ".tsx", ".d.ts", ".js", ".jsx", ".json"])
                .with_index_files(&["index.ts", "index.tsx", "index.js", "index.jsx"]),
        );
        set.insert(
            builtin("python", PYTHON_PATTERNS)
                .with_file_extensions(&["py", "pyi"])
                .with_extensions(&[".py", ".pyi"])
                .with_index_files(&["__init__.py"])
                .with_style(SpecifierStyle::Dotted)
                .with_list_separator(","),
        );
        set.insert(
            builtin("css", CSS_PATTERNS)
                .with_file_extensions(&["css", "scss", "sass", "less"])
                .with_extensions(&[".css", ".scss", ".sass", ".less"])
                .with_index_files(&["index.css", "_index.scss"]),
        );

        set
    }

    /// Registers `rules`, replacing any language with the same name.
    pub fn insert(&mut self, rules: LanguageRules) {
        if let Some(previous) = self.languages.remove(&rules.name) {
            self.by_extension.retain(|_, lang| *lang != previous.name);
        }
        for ext in &rules.file_extensions {
            self.by_extension
                .insert(ext.to_lowercase(), rules.name.clone());
        }
        self.languages.insert(rules.name.clone(), rules);
    }

    /// Looks up the rules for a language tag.
    pub fn get(&self, language: &str) -> Option<&LanguageRules> {
        self.languages.get(language)
    }

    /// Determines the language tag of a file from its extension.
    pub fn language_for_path(&self, path: &Path) -> Option<&str> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        self.by_extension.get(&ext).map(String::as_str)
    }

    /// Registered language tags, sorted.
    pub fn languages(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.languages.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of registered languages.
    pub fn len(&self) -> usize {
        self.languages.len()
    }

    /// Returns true if no language is registered.
    pub fn is_empty(&self) -> bool {
        self.languages.is_empty()
    }
}

fn builtin(name: &str, patterns: &[&str]) -> LanguageRules {
    LanguageRules::new(name, patterns).expect("built-in import patterns are valid")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_languages() {
        let rules = RuleSet::standard();
        assert_eq!(
            rules.languages(),
            vec!["css", "javascript", "python", "typescript"]
        );
    }

    #[test]
    fn test_language_for_path() {
        let rules = RuleSet::standard();
        assert_eq!(
            rules.language_for_path(Path::new("src/App.TSX")),
            Some("typescript")
        );
        assert_eq!(
            rules.language_for_path(Path::new("lib/util.mjs")),
            Some("javascript")
        );
        assert_eq!(
            rules.language_for_path(Path::new("pkg/__init__.py")),
            Some("python")
        );
        assert_eq!(rules.language_for_path(Path::new("README.md")), None);
        assert_eq!(rules.language_for_path(Path::new("Makefile")), None);
    }

    #[test]
    fn test_insert_replaces_language() {
        let mut rules = RuleSet::standard();
        let custom = LanguageRules::new("javascript", &[r#"load\("([^"]+)"\)"#])
            .unwrap()
            .with_file_extensions(&["jsm"]);
        rules.insert(custom);

        assert_eq!(rules.len(), 4);
        assert_eq!(rules.get("javascript").unwrap().patterns.len(), 1);
        assert_eq!(
            rules.language_for_path(Path::new("a.jsm")),
            Some("javascript")
        );
        assert_eq!(rules.language_for_path(Path::new("a.js")), None);
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        assert!(LanguageRules::new("broken", &["(unclosed"]).is_err());
    }
}
