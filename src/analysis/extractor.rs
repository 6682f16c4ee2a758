//! Import specifier extraction.
//!
//! Runs every pattern registered for a file's language over its text and
//! unions the captures, preserving first-seen order.

use std::collections::HashSet;

use super::language::RuleSet;
use super::source::SourceFile;

/// Extracts raw import specifiers from source text.
#[derive(Debug, Clone, Copy)]
pub struct ImportExtractor<'r> {
    rules: &'r RuleSet,
}

impl<'r> ImportExtractor<'r> {
    /// Creates an extractor over the given rule set.
    ///
    /// # Example
    ///
    /// ```
    /// use importscope::analysis::{ImportExtractor, RuleSet};
    ///
    /// let rules = RuleSet::standard();
    /// let imports = ImportExtractor::new(&rules).extract_source("import os, sys", "python");
    /// assert_eq!(imports, vec!["os", "sys"]);
    /// ```
    pub fn new(rules: &'r RuleSet) -> Self {
        Self { rules }
    }

    /// Extracts the deduplicated specifiers of `file`.
    ///
    /// A language without registered rules yields an empty list.
    pub fn extract(&self, file: &SourceFile) -> Vec<String> {
        self.extract_source(&file.content, &file.language)
    }

    /// Extracts specifiers from raw text in the given language.
    pub fn extract_source(&self, source: &str, language: &str) -> Vec<String> {
        let Some(rules) = self.rules.get(language) else {
            return Vec::new();
        };

        // Matches are collected with their byte offset so that specifiers come
        // out in source order no matter which rule found them.
        let mut found: Vec<(usize, &str)> = Vec::new();
        for pattern in &rules.patterns {
            for caps in pattern.captures_iter(source) {
                let Some(m) = caps.get(1) else { continue };
                match rules.list_separator.as_deref() {
                    // stable sort below keeps list items in written order
                    Some(separator) => found.extend(
                        m.as_str()
                            .split(separator)
                            .filter_map(|item| item.split_whitespace().next())
                            .map(|item| (m.start(), item)),
                    ),
                    None => found.push((m.start(), m.as_str())),
                }
            }
        }
        found.sort_by_key(|(offset, _)| *offset);

        let mut seen = HashSet::new();
        let mut specifiers = Vec::new();
        for (_, raw) in found {
            let specifier = raw.trim();
            if specifier.is_empty() {
                continue;
            }
            if seen.insert(specifier) {
                specifiers.push(specifier.to_string());
            }
        }

        specifiers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(source: &str, language: &str) -> Vec<String> {
        let rules = RuleSet::standard();
        ImportExtractor::new(&rules).extract_source(source, language)
    }

    // ===== JavaScript / TypeScript =====

    #[test]
    fn test_default_and_named_imports() {
        let source = r#"
import React from 'react';
import { useState, useEffect } from "react";
import * as api from './api';
"#;
        assert_eq!(extract(source, "javascript"), vec!["react", "./api"]);
    }

    #[test]
    fn test_side_effect_import() {
        let imports = extract(r#"import './styles.css';"#, "javascript");
        assert_eq!(imports, vec!["./styles.css"]);
    }

    #[test]
    fn test_multiline_named_import() {
        let source = r#"
import {
    alpha,
    beta,
} from '../shared/greek';
"#;
        assert_eq!(extract(source, "typescript"), vec!["../shared/greek"]);
    }

    #[test]
    fn test_require_dynamic_and_reexport_are_unioned() {
        let source = r#"
const fs = require('fs');
const lazy = await import('./lazy');
export * from './types';
export { helper } from './helpers';
require('./polyfills');
"#;
        assert_eq!(
            extract(source, "javascript"),
            vec!["fs", "./lazy", "./types", "./helpers", "./polyfills"]
        );
    }

    #[test]
    fn test_duplicate_specifiers_deduplicated() {
        let source = r#"
import { a } from './utils';
import { b } from './utils';
const c = require('./utils');
"#;
        assert_eq!(extract(source, "javascript"), vec!["./utils"]);
    }

    #[test]
    fn test_type_only_import() {
        let imports = extract(r#"import type { FC } from 'react';"#, "typescript");
        assert_eq!(imports, vec!["react"]);
    }

    #[test]
    fn test_whitespace_only_capture_discarded() {
        let imports = extract(r#"const x = require('   ');"#, "javascript");
        assert!(imports.is_empty());
    }

    #[test]
    fn test_identifier_containing_import_is_ignored() {
        let imports = extract("const important = 1;\nreimport('x');", "javascript");
        assert!(imports.is_empty());
    }

    // ===== Other languages =====

    #[test]
    fn test_python_imports() {
        let source = "import os\nfrom .models import User\nfrom ..core.db import session\n";
        assert_eq!(
            extract(source, "python"),
            vec!["os", ".models", "..core.db"]
        );
    }

    #[test]
    fn test_python_comma_separated_imports() {
        let source = "import os, sys\nimport json as j, re\nimport a.b as ab,c.d\n";
        assert_eq!(
            extract(source, "python"),
            vec!["os", "sys", "json", "re", "a.b", "c.d"]
        );
    }

    #[test]
    fn test_python_list_keeps_source_order_with_from_imports() {
        let source = "from pkg import x\nimport b, a\nfrom .local import y\n";
        assert_eq!(
            extract(source, "python"),
            vec!["pkg", "b", "a", ".local"]
        );
    }

    #[test]
    fn test_css_imports() {
        let source = "@import 'reset.css';\n@import url(\"./theme.css\");\n";
        assert_eq!(extract(source, "css"), vec!["reset.css", "./theme.css"]);
    }

    #[test]
    fn test_unknown_language_yields_nothing() {
        assert!(extract("import x from 'y'", "cobol").is_empty());
    }

    #[test]
    fn test_extract_from_source_file() {
        let rules = RuleSet::standard();
        let file = SourceFile::new("src/a.js", "javascript", "import b from './b';");
        assert_eq!(ImportExtractor::new(&rules).extract(&file), vec!["./b"]);
    }
}
