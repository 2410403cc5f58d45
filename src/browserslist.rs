use std::path::{Component, Path, PathBuf};

use crate::errors::{PrefixError, Result};

/// Name of the config file looked up in every ancestor directory.
pub const CONFIG_FILE: &str = "browserslist";

/// Walk up from `start` looking for a `browserslist` file and return its text.
///
/// A directory is searched first, anything else starts at its parent. Not
/// finding a config is `Ok(None)`; only an unreadable file is an error.
pub fn find_config(start: &Path) -> Result<Option<String>> {
    let absolute = absolutize(start);
    let mut dir = if absolute.is_dir() {
        absolute
    } else {
        match absolute.parent() {
            Some(parent) => parent.to_path_buf(),
            None => absolute,
        }
    };

    loop {
        let candidate = dir.join(CONFIG_FILE);
        // a directory named `browserslist` is not a config
        if candidate.is_file() {
            tracing::debug!(path = %candidate.display(), "found browserslist config");
            return std::fs::read_to_string(&candidate)
                .map(Some)
                .map_err(|source| PrefixError::ConfigRead { path: candidate, source });
        }
        match dir.parent() {
            Some(parent) if parent != dir => dir = parent.to_path_buf(),
            _ => break,
        }
    }

    tracing::debug!(start = %start.display(), "no browserslist config");
    Ok(None)
}

/// Split config text into queries, dropping `#` comments and blank lines.
pub fn parse_config(config: &str) -> Vec<String> {
    config
        .lines()
        .map(|line| match line.find('#') {
            Some(at) => &line[..at],
            None => line,
        })
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

// Absolute path with `.` and `..` folded, without touching symlinks.
fn absolutize(path: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };

    let mut out = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn strips_comments_and_blank_lines() {
        let parsed = parse_config("a\n# comment\n  b  \n\nc#trailing");
        assert_eq!(parsed, vec!["a", "b", "c"]);
    }

    #[test]
    fn comments_only_is_empty() {
        assert!(parse_config("# one\n   # two\n\n\t\n").is_empty());
        assert!(parse_config("").is_empty());
    }

    #[test]
    fn handles_crlf() {
        let parsed = parse_config("> 1%\r\nie 8 # old\r\n");
        assert_eq!(parsed, vec!["> 1%", "ie 8"]);
    }

    #[test]
    fn absolutize_folds_dots() {
        let path = absolutize(Path::new("/a/b/./c/../d"));
        assert_eq!(path, PathBuf::from("/a/b/d"));
    }
}
