//! Cross-platform path helpers.
//!
//! Output names are join keys between asset emission and metadata, so they
//! must come out identical on every platform. Everything here is lexical:
//! no filesystem access, no symlink resolution.

use std::path::{Component, Path, PathBuf};

/// Normalizes a path for platform-independent output by converting all
/// separators to forward slashes.
///
/// Windows extended-length prefixes (`\\?\`) are stripped first, since they
/// are an artifact of canonicalization and never part of a logical name.
///
/// # Examples
///
/// ```rust
/// use css_export::utils::platform::normalize_path_for_storage;
/// use std::path::Path;
///
/// assert_eq!(normalize_path_for_storage(Path::new("styles\\lib\\reset.css")), "styles/lib/reset.css");
/// assert_eq!(normalize_path_for_storage(Path::new("styles/red.css")), "styles/red.css");
/// ```
#[must_use]
pub fn normalize_path_for_storage<P: AsRef<Path>>(path: P) -> String {
    let path_str = path.as_ref().to_string_lossy();

    let cleaned = if let Some(stripped) = path_str.strip_prefix(r"\\?\UNC\") {
        format!("//{stripped}")
    } else if let Some(stripped) = path_str.strip_prefix(r"\\?\") {
        stripped.to_string()
    } else {
        path_str.to_string()
    };

    cleaned.replace('\\', "/")
}

/// Resolves `.` and `..` components lexically.
///
/// A `..` that would climb above the root of an absolute path is dropped.
/// For relative paths, leading `..` components are kept.
#[must_use]
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut components: Vec<Component<'_>> = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match components.last() {
                Some(Component::Normal(_)) => {
                    components.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => components.push(component),
            },
            c => components.push(c),
        }
    }

    components.iter().collect()
}

/// Computes the path of `to` relative to `from`, the way `path.relative`
/// does in Node: both sides are made absolute against `cwd`, normalized, and
/// the shared prefix is replaced by the `..` steps needed to leave `from`.
///
/// Returns an empty path when both resolve to the same location.
///
/// # Examples
///
/// ```rust
/// use css_export::utils::platform::relative_path;
/// use std::path::{Path, PathBuf};
///
/// let cwd = Path::new("/project");
/// assert_eq!(
///     relative_path(cwd, Path::new("test"), Path::new("/project/test/fixtures/red.css")),
///     PathBuf::from("fixtures/red.css")
/// );
/// assert_eq!(
///     relative_path(cwd, Path::new("/project/src"), Path::new("/project/lib/a.css")),
///     PathBuf::from("../lib/a.css")
/// );
/// ```
#[must_use]
pub fn relative_path(cwd: &Path, from: &Path, to: &Path) -> PathBuf {
    let from = normalize_path(&cwd.join(from));
    let to = normalize_path(&cwd.join(to));

    let from_parts: Vec<Component<'_>> = from.components().collect();
    let to_parts: Vec<Component<'_>> = to.components().collect();

    let shared = from_parts.iter().zip(to_parts.iter()).take_while(|(a, b)| a == b).count();

    let mut relative = PathBuf::new();
    for _ in shared..from_parts.len() {
        relative.push("..");
    }
    for part in &to_parts[shared..] {
        relative.push(part.as_os_str());
    }
    relative
}
