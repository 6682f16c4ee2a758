//! Import specifier resolution.
//!
//! Turns a raw specifier into a [`ResolvedEdge`]: bare names become external
//! packages, relative and root-absolute specifiers are matched against the
//! project's files using the language's extension and index-file lists.

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::language::{RuleSet, SpecifierStyle};

/// Outcome of resolving one specifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionKind {
    /// Resolved to a file inside the project
    Internal,
    /// A package name outside the project
    External,
    /// Looked like a project path but matched nothing
    Unresolved,
}

impl fmt::Display for ResolutionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Internal => write!(f, "internal"),
            Self::External => write!(f, "external"),
            Self::Unresolved => write!(f, "unresolved"),
        }
    }
}

/// A classified import relationship.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolvedEdge {
    /// Project-relative path of the importing file
    pub from: String,
    /// Project-relative path, package name, or best-effort normalized path
    pub to: String,
    pub kind: ResolutionKind,
}

impl ResolvedEdge {
    /// Creates an edge of the given kind.
    pub fn new(from: impl Into<String>, to: impl Into<String>, kind: ResolutionKind) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            kind,
        }
    }
}

/// Existence checks on project-relative paths.
pub trait PathProbe {
    fn is_file(&self, path: &str) -> bool;
    fn is_dir(&self, path: &str) -> bool;
}

/// Answers existence checks from the real filesystem below a project root.
#[derive(Debug, Clone)]
pub struct DiskProbe {
    root: PathBuf,
}

impl DiskProbe {
    /// Probes paths relative to `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn full(&self, path: &str) -> PathBuf {
        if path.is_empty() {
            self.root.clone()
        } else {
            self.root.join(path)
        }
    }
}

impl PathProbe for DiskProbe {
    fn is_file(&self, path: &str) -> bool {
        self.full(path).is_file()
    }

    fn is_dir(&self, path: &str) -> bool {
        self.full(path).is_dir()
    }
}

/// Answers existence checks from a known list of project files.
#[derive(Debug, Clone, Default)]
pub struct KnownFiles {
    files: HashSet<String>,
    dirs: HashSet<String>,
}

impl KnownFiles {
    /// Indexes project-relative file paths and every directory above them.
    pub fn new<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut known = Self::default();
        known.dirs.insert(String::new());

        for path in paths {
            let path: String = path.into();
            let mut end = path.len();
            while let Some(idx) = path[..end].rfind('/') {
                known.dirs.insert(path[..idx].to_string());
                end = idx;
            }
            known.files.insert(path);
        }

        known
    }
}

impl PathProbe for KnownFiles {
    fn is_file(&self, path: &str) -> bool {
        self.files.contains(path)
    }

    fn is_dir(&self, path: &str) -> bool {
        self.dirs.contains(path)
    }
}

/// Resolves specifiers against a project using injected language rules.
#[derive(Debug)]
pub struct ImportResolver<'r, P> {
    rules: &'r RuleSet,
    probe: P,
}

impl<'r, P: PathProbe> ImportResolver<'r, P> {
    /// Creates a resolver using `rules` for extensions and `probe` for existence checks.
    ///
    /// # Example
    ///
    /// ```
    /// use importscope::analysis::{ImportResolver, KnownFiles, ResolutionKind, RuleSet};
    ///
    /// let rules = RuleSet::standard();
    /// let files = KnownFiles::new(["src/app.ts", "src/utils/index.ts"]);
    /// let resolver = ImportResolver::new(&rules, files);
    ///
    /// let edge = resolver.resolve("./utils", "src/app.ts", "typescript");
    /// assert_eq!(edge.kind, ResolutionKind::Internal);
    /// assert_eq!(edge.to, "src/utils/index.ts");
    ///
    /// assert_eq!(resolver.resolve("react", "src/app.ts", "typescript").kind, ResolutionKind::External);
    /// ```
    pub fn new(rules: &'r RuleSet, probe: P) -> Self {
        Self { rules, probe }
    }

    /// Resolves `specifier` as written in the file at `from` (written in `language`).
    pub fn resolve(&self, specifier: &str, from: &str, language: &str) -> ResolvedEdge {
        let rules = self.rules.get(language);
        let cleaned = strip_query(specifier);
        let spelled = match rules.map(|r| r.style) {
            Some(SpecifierStyle::Dotted) if cleaned.starts_with('.') => dotted_to_path(cleaned),
            _ => cleaned.to_string(),
        };

        if !spelled.starts_with('.') && !spelled.starts_with('/') {
            return ResolvedEdge::new(from, specifier, ResolutionKind::External);
        }

        let base = if spelled.starts_with('/') {
            ""
        } else {
            parent_dir(from)
        };
        let Some(target) = normalize(base, &spelled) else {
            return ResolvedEdge::new(
                from,
                best_effort(base, &spelled),
                ResolutionKind::Unresolved,
            );
        };

        if has_extension(&target) && self.probe.is_file(&target) {
            return ResolvedEdge::new(from, target, ResolutionKind::Internal);
        }

        let (extensions, index_files) = match rules {
            Some(r) => (r.extensions.as_slice(), r.index_files.as_slice()),
            None => (&[][..], &[][..]),
        };

        for ext in extensions {
            let candidate = format!("{target}{ext}");
            if self.probe.is_file(&candidate) {
                return ResolvedEdge::new(from, candidate, ResolutionKind::Internal);
            }
        }

        if self.probe.is_dir(&target) {
            for index in index_files {
                let candidate = join(&target, index);
                if self.probe.is_file(&candidate) {
                    return ResolvedEdge::new(from, candidate, ResolutionKind::Internal);
                }
            }
        }

        ResolvedEdge::new(from, target, ResolutionKind::Unresolved)
    }
}

fn strip_query(specifier: &str) -> &str {
    let end = specifier.find(['?', '#']).unwrap_or(specifier.len());
    &specifier[..end]
}

/// `.models` -> `./models`, `..core.db` -> `../core/db`
fn dotted_to_path(specifier: &str) -> String {
    let dots = specifier.chars().take_while(|&c| c == '.').count();
    let rest = specifier[dots..].replace('.', "/");

    let mut path = String::from("./");
    for _ in 1..dots {
        path.push_str("../");
    }
    path.push_str(&rest);
    path
}

fn parent_dir(path: &str) -> &str {
    path.rfind('/').map(|idx| &path[..idx]).unwrap_or("")
}

fn join(dir: &str, name: &str) -> String {
    if dir.is_empty() {
        name.to_string()
    } else {
        format!("{dir}/{name}")
    }
}

fn has_extension(path: &str) -> bool {
    Path::new(path).extension().is_some()
}

/// Lexically applies `specifier` to `base`. Returns `None` when the result
/// would climb above the project root.
fn normalize(base: &str, specifier: &str) -> Option<String> {
    let mut parts: Vec<&str> = base.split('/').filter(|p| !p.is_empty()).collect();
    for segment in specifier.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop()?;
            }
            other => parts.push(other),
        }
    }
    Some(parts.join("/"))
}

/// Like [`normalize`] but keeps leading `..` segments that escape the root.
fn best_effort(base: &str, specifier: &str) -> String {
    let mut parts: Vec<&str> = base.split('/').filter(|p| !p.is_empty()).collect();
    for segment in specifier.split('/') {
        match segment {
            "" | "." => {}
            ".." => match parts.last() {
                Some(&last) if last != ".." => {
                    parts.pop();
                }
                _ => parts.push(".."),
            },
            other => parts.push(other),
        }
    }
    parts.join("/")
}
