//! Glob expansion for input patterns.
//!
//! Supports `*`, `?`, `[...]` (with `!` or `^` negation) inside a path
//! component and `**` as a whole component matching any number of
//! directories. Matches are regular files, returned in lexical order.

use crate::error::{Result, TailbenchError};
use regex::Regex;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};
use walkdir::WalkDir;

const WILDCARDS: &[char] = &['*', '?', '['];

/// True if the pattern contains any glob metacharacter.
#[must_use]
pub fn has_wildcard(pattern: &str) -> bool {
    pattern.contains(WILDCARDS)
}

/// Expand a glob pattern into the sorted list of matching files.
///
/// A pattern without wildcards yields itself if it names an existing file.
///
/// # Errors
///
/// Returns `InvalidPattern` if a character class is not closed.
pub fn expand_pattern(pattern: &str) -> Result<Vec<PathBuf>> {
    if !has_wildcard(pattern) {
        let path = PathBuf::from(pattern);
        return Ok(if path.is_file() { vec![path] } else { Vec::new() });
    }

    let components: Vec<&str> = pattern.split('/').collect();
    let split = components
        .iter()
        .position(|c| has_wildcard(c))
        .unwrap_or(components.len());
    let (literal, rest) = components.split_at(split);

    let base = match literal.join("/") {
        s if s.is_empty() && pattern.starts_with('/') => PathBuf::from("/"),
        s if s.is_empty() => PathBuf::new(),
        s => PathBuf::from(s),
    };
    let matcher = build_matcher(pattern, rest)?;
    trace!(pattern, regex = matcher.as_str(), base = %base.display(), "Compiled glob");

    let root: &Path = if base.as_os_str().is_empty() {
        Path::new(".")
    } else {
        &base
    };
    if !root.is_dir() {
        debug!(pattern, base = %root.display(), "Glob base directory does not exist");
        return Ok(Vec::new());
    }

    let mut walker = WalkDir::new(root).min_depth(1).sort_by_file_name();
    if !rest.contains(&"**") {
        walker = walker.max_depth(rest.len());
    }

    let mut matches: Vec<PathBuf> = walker
        .into_iter()
        .filter_map(|entry| {
            entry
                .inspect_err(|e| debug!(error = %e, "Skipping unreadable entry"))
                .ok()
        })
        .filter(|entry| entry.path().is_file())
        .filter_map(|entry| {
            let relative = entry.path().strip_prefix(root).ok()?;
            let candidate = relative.to_string_lossy().replace('\\', "/");
            matcher
                .is_match(&candidate)
                .then(|| base.join(relative))
        })
        .collect();
    matches.sort();
    Ok(matches)
}

fn build_matcher(pattern: &str, components: &[&str]) -> Result<Regex> {
    let mut re = String::from("^");
    for (idx, component) in components.iter().enumerate() {
        let last = idx + 1 == components.len();
        if *component == "**" {
            re.push_str(if last { ".*" } else { "(?:[^/]+/)*" });
            continue;
        }
        re.push_str(&translate_component(pattern, component)?);
        if !last {
            re.push('/');
        }
    }
    re.push('$');

    Regex::new(&re).map_err(|e| TailbenchError::InvalidPattern {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })
}

fn translate_component(pattern: &str, component: &str) -> Result<String> {
    let mut out = String::new();
    let mut chars = component.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '*' => out.push_str("[^/]*"),
            '?' => out.push_str("[^/]"),
            '[' => {
                let mut class = String::from("[");
                if matches!(chars.peek(), Some('!' | '^')) {
                    chars.next();
                    class.push('^');
                }
                let mut first = true;
                let mut closed = false;
                for c in chars.by_ref() {
                    if c == ']' && !first {
                        closed = true;
                        break;
                    }
                    first = false;
                    if matches!(c, '\\' | '[' | ']') {
                        class.push('\\');
                    }
                    class.push(c);
                }
                if !closed {
                    return Err(TailbenchError::InvalidPattern {
                        pattern: pattern.to_string(),
                        reason: "unclosed character class".to_string(),
                    });
                }
                class.push(']');
                out.push_str(&class);
            }
            other => out.push_str(&regex::escape(other.encode_utf8(&mut [0; 4]))),
        }
    }
    Ok(out)
}
