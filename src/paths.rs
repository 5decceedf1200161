//! Lexical path utilities.
//! Containment checks never touch the filesystem, so they cannot be fooled by symlinks.

use std::path::{Component, Path, PathBuf};

/// Resolve `.` and `..` components without consulting the filesystem.
/// A `..` that would climb above the start of a relative path is kept.
#[must_use]
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut normalized: Vec<Component<'_>> = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match normalized.last() {
                Some(Component::Normal(_)) => {
                    normalized.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => normalized.push(component),
            },
            other => normalized.push(other),
        }
    }

    normalized.iter().collect()
}

/// True if `path` lies strictly inside `root` once both are normalized.
/// `root` itself is not inside `root`.
#[must_use]
pub fn is_strictly_within(root: &Path, path: &Path) -> bool {
    let root = normalize_lexically(root);
    let path = normalize_lexically(path);
    path.strip_prefix(&root).is_ok_and(|rest| {
        rest.components().next().is_some()
            && !rest.components().any(|c| c == Component::ParentDir)
    })
}

/// Match a file name against a pattern.
///
/// Supports simple glob patterns:
/// - `*` matches any run of characters (including none)
/// - `?` matches exactly one character
/// - Exact match if no wildcards
///
/// # Examples
///
/// ```
/// assert!(extpack::paths::glob_match("clib.*", "clib.so"));
/// assert!(extpack::paths::glob_match("clib.*", "clib.cpython-312-x86_64-linux-gnu.so"));
/// assert!(!extpack::paths::glob_match("clib.*", "clib"));
/// assert!(extpack::paths::glob_match("*.pyc", "module.pyc"));
/// assert!(extpack::paths::glob_match("temp.?", "temp.x"));
/// ```
#[must_use]
pub fn glob_match(pattern: &str, name: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let name: Vec<char> = name.chars().collect();

    let (mut p, mut n) = (0, 0);
    // Position of the last `*` seen and the name index it was tried against
    let mut backtrack: Option<(usize, usize)> = None;

    while n < name.len() {
        match (pattern.get(p), name.get(n)) {
            (Some('*'), _) => {
                backtrack = Some((p, n));
                p += 1;
            }
            (Some('?'), _) => {
                p += 1;
                n += 1;
            }
            (Some(expected), Some(actual)) if expected == actual => {
                p += 1;
                n += 1;
            }
            _ => match backtrack {
                Some((star, matched)) => {
                    p = star + 1;
                    n = matched + 1;
                    backtrack = Some((star, matched + 1));
                }
                None => return false,
            },
        }
    }

    pattern.get(p..).is_some_and(|rest| rest.iter().all(|&c| c == '*'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_drops_current_dir_and_resolves_parents() {
        assert_eq!(
            normalize_lexically(Path::new("/project/./pkg/../build")),
            PathBuf::from("/project/build")
        );
        assert_eq!(
            normalize_lexically(Path::new("a/b/../../c")),
            PathBuf::from("c")
        );
        assert_eq!(
            normalize_lexically(Path::new("../outside")),
            PathBuf::from("../outside")
        );
        assert_eq!(normalize_lexically(Path::new("/..")), PathBuf::from("/"));
    }

    #[test]
    fn strictly_within() {
        let root = Path::new("/project");
        assert!(is_strictly_within(root, Path::new("/project/build")));
        assert!(is_strictly_within(root, Path::new("/project/a/b/c.pyc")));
        assert!(!is_strictly_within(root, Path::new("/project")));
        assert!(!is_strictly_within(root, Path::new("/project/.")));
        assert!(!is_strictly_within(root, Path::new("/project/../etc")));
        assert!(!is_strictly_within(root, Path::new("/projectx/build")));
    }

    #[test]
    fn relative_roots() {
        assert!(is_strictly_within(Path::new("."), Path::new("./build")));
        assert!(!is_strictly_within(Path::new("."), Path::new("./../build")));
    }

    #[test]
    fn glob_patterns() {
        assert!(glob_match("clib.*", "clib.so"));
        assert!(glob_match("clib.*", "clib.dll"));
        assert!(glob_match("clib.*", "clib."));
        assert!(!glob_match("clib.*", "clib"));
        assert!(!glob_match("clib.*", "xclib.so"));
        assert!(glob_match("temp.*", "temp.linux-x86_64-cpython-312"));
        assert!(glob_match("*cache*", "__pycache__"));
        assert!(glob_match("a*b*c", "aXXbYYc"));
        assert!(!glob_match("a*b*c", "aXXbYY"));
        assert!(glob_match("exact", "exact"));
        assert!(!glob_match("exact", "exact2"));
        assert!(glob_match("*", ""));
        assert!(!glob_match("?", ""));
    }
}
