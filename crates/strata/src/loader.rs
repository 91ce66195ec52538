//! Loading cascade sources from disk.
//!
//! Source names are resolved against a base directory and get a `.yml`
//! extension unless they already end in `.yml` or `.yaml`. `@include <path>` rows are replaced by the
//! included file, indented to the column of the directive; include paths are
//! relative to the file containing the directive.

use std::fs;
use std::path::{Path, PathBuf};

use strata_config::CascadeSource;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Include cycle: {}", format_chain(chain))]
    IncludeCycle { chain: Vec<PathBuf> },
}

fn format_chain(chain: &[PathBuf]) -> String {
    chain
        .iter()
        .map(|path| path.display().to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Append `.yml` to names that do not already carry a YAML extension.
///
/// Dots elsewhere in the name are kept, so `app.prod` becomes `app.prod.yml`.
fn with_default_extension(name: &str) -> PathBuf {
    if name.ends_with(".yml") || name.ends_with(".yaml") {
        PathBuf::from(name)
    } else {
        PathBuf::from(format!("{name}.yml"))
    }
}

/// Column and target of an `@include` row.
fn include_directive(raw: &str) -> Option<(usize, &str)> {
    let trimmed = raw.trim_start_matches(' ');
    let rest = trimmed.strip_prefix("@include")?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let target = rest.trim().trim_matches(['"', '\'']);
    if target.is_empty() {
        return None;
    }
    Some((raw.len() - trimmed.len(), target))
}

pub struct SourceLoader {
    dir: PathBuf,
}

impl SourceLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn resolve(&self, name: &str) -> PathBuf {
        let path = with_default_extension(name);
        if path.is_absolute() {
            path
        } else {
            self.dir.join(path)
        }
    }

    /// Read one source with its includes expanded.
    pub fn load(&self, name: &str) -> Result<String, LoadError> {
        let mut stack = Vec::new();
        read_with_includes(&self.resolve(name), &mut stack)
    }

    /// Load every source in order. Sources that fail to load become
    /// [`CascadeSource::Missing`] entries.
    pub fn load_all(&self, names: &[String]) -> Vec<CascadeSource> {
        names
            .iter()
            .map(|name| match self.load(name) {
                Ok(text) => CascadeSource::loaded(name.clone(), text),
                Err(err) => {
                    tracing::debug!(source = %name, error = %err, "Failed to load source");
                    CascadeSource::missing(self.resolve(name).display().to_string(), err.to_string())
                }
            })
            .collect()
    }
}

fn read_with_includes(path: &Path, stack: &mut Vec<PathBuf>) -> Result<String, LoadError> {
    let text = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let key = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    if stack.contains(&key) {
        let mut chain = stack.clone();
        chain.push(key);
        return Err(LoadError::IncludeCycle { chain });
    }

    stack.push(key);
    let base = path.parent().unwrap_or_else(|| Path::new("."));
    let mut out = String::with_capacity(text.len());

    for raw in text.lines() {
        let Some((indent, target)) = include_directive(raw) else {
            out.push_str(raw);
            out.push('\n');
            continue;
        };

        let included = read_with_includes(&base.join(with_default_extension(target)), stack)?;
        tracing::debug!(include = target, from = %path.display(), "Expanded include");
        for line in included.lines() {
            if !line.trim().is_empty() {
                out.push_str(&" ".repeat(indent));
                out.push_str(line);
            }
            out.push('\n');
        }
    }

    stack.pop();
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, text: &str) {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, text).unwrap();
    }

    #[test]
    fn test_resolve_appends_extension() {
        let loader = SourceLoader::new("/configs");
        assert_eq!(loader.resolve("base"), PathBuf::from("/configs/base.yml"));
        assert_eq!(loader.resolve("base.yaml"), PathBuf::from("/configs/base.yaml"));
        assert_eq!(loader.resolve("/abs/prod"), PathBuf::from("/abs/prod.yml"));
        assert_eq!(loader.resolve("base.yml"), PathBuf::from("/configs/base.yml"));
    }

    #[test]
    fn test_dotted_names_keep_their_dots() {
        let loader = SourceLoader::new("/configs");
        assert_eq!(loader.resolve("app.prod"), PathBuf::from("/configs/app.prod.yml"));
        assert_eq!(loader.resolve("v1.2"), PathBuf::from("/configs/v1.2.yml"));

        let temp = TempDir::new().unwrap();
        write(temp.path(), "app.prod.yml", "env: prod\n");
        let sources = SourceLoader::new(temp.path()).load_all(&["app.prod".to_string()]);
        assert_eq!(sources[0], CascadeSource::loaded("app.prod", "env: prod\n"));
    }

    #[test]
    fn test_include_directive() {
        assert_eq!(include_directive("@include shared"), Some((0, "shared")));
        assert_eq!(include_directive("  @include \"dir/x.yml\""), Some((2, "dir/x.yml")));
        assert_eq!(include_directive("@included: true"), None);
        assert_eq!(include_directive("@include"), None);
    }

    #[test]
    fn test_includes_are_indented_and_relative() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "main.yml", "top:\n  @include parts/child\nafter: 1\n");
        write(temp.path(), "parts/child.yml", "included: true\n@include sibling\n");
        write(temp.path(), "parts/sibling.yml", "relativeIncluded: true\n");

        let text = SourceLoader::new(temp.path()).load("main").unwrap();
        assert_eq!(
            text,
            "top:\n  included: true\n  relativeIncluded: true\nafter: 1\n"
        );
    }

    #[test]
    fn test_include_cycle_is_an_error() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "a.yml", "@include b\n");
        write(temp.path(), "b.yml", "@include a\n");

        let err = SourceLoader::new(temp.path()).load("a").unwrap_err();
        assert!(matches!(err, LoadError::IncludeCycle { ref chain } if chain.len() == 3));
    }

    #[test]
    fn test_missing_files_become_missing_sources() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "a.yml", "a: 1\n");

        let sources = SourceLoader::new(temp.path())
            .load_all(&["iDoNotExist".to_string(), "a".to_string()]);
        assert!(matches!(sources[0], CascadeSource::Missing { .. }));
        assert!(sources[0].name().ends_with("iDoNotExist.yml"));
        assert_eq!(sources[1], CascadeSource::loaded("a", "a: 1\n"));
    }
}
