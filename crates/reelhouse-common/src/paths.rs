//! Path confinement and file-type helpers.
//!
//! [`resolve`] turns a user-supplied, possibly percent-encoded relative path
//! into an absolute path that is guaranteed to sit inside a root directory.
//! Nothing here touches the filesystem: `.` and `..` are folded lexically, so
//! a path can be vetted before anything is opened.

use std::path::{Component, Path, PathBuf};

/// Image types the asset endpoint is allowed to serve.
const IMAGE_TYPES: &[(&str, &str)] = &[
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
    ("gif", "image/gif"),
    ("webp", "image/webp"),
];

/// A path was rejected because it would leave the root directory, or could
/// not be decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("path escapes the media root")]
pub struct Denied;

/// Decode `input` and confine it to `root`.
///
/// The input is percent-decoded first. A `%` that is not followed by two hex
/// digits, a decoded byte sequence that is not UTF-8, or an embedded NUL all
/// count as denial.
///
/// # Examples
///
/// ```
/// use reelhouse_common::paths::resolve;
/// use std::path::{Path, PathBuf};
///
/// let root = Path::new("/media");
/// assert_eq!(
///     resolve(root, "Shows/Firefly/poster.jpg"),
///     Ok(PathBuf::from("/media/Shows/Firefly/poster.jpg"))
/// );
/// assert!(resolve(root, "%2e%2e/etc/passwd").is_err());
/// assert_eq!(resolve(root, ""), Ok(PathBuf::from("/media")));
/// ```
pub fn resolve(root: &Path, input: &str) -> Result<PathBuf, Denied> {
    let decoded = percent_decode(input).ok_or(Denied)?;
    confine(root, Path::new(&decoded))
}

/// Join `relative` onto `root` and fold `.`/`..` segments, returning the
/// result only when it equals the root or lies strictly inside it.
///
/// An absolute `relative` replaces the root entirely and is therefore denied
/// unless it happens to point inside the root.
pub fn confine(root: &Path, relative: &Path) -> Result<PathBuf, Denied> {
    let root = std::path::absolute(root)
        .map(|p| normalize(&p))
        .map_err(|_| Denied)?;
    let candidate = normalize(&root.join(relative));

    // Component-wise: "/media2" does not start with "/media".
    if candidate.starts_with(&root) {
        Ok(candidate)
    } else {
        Err(Denied)
    }
}

/// Whether a configuration-supplied relative path stays below its base.
///
/// Absolute paths and paths whose `..` segments climb above the starting
/// directory are rejected.
pub fn is_confined(relative: &Path) -> bool {
    let mut depth: usize = 0;
    for component in relative.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => return false,
            Component::CurDir => {}
            Component::ParentDir => {
                if depth == 0 {
                    return false;
                }
                depth -= 1;
            }
            Component::Normal(_) => depth += 1,
        }
    }
    true
}

/// MIME type for an allowed image, or `None` when the extension is not on the
/// allow-list.
pub fn image_content_type(path: &Path) -> Option<&'static str> {
    let ext = extension_lowercase(path)?;
    IMAGE_TYPES
        .iter()
        .find(|(known, _)| *known == ext)
        .map(|(_, mime)| *mime)
}

fn extension_lowercase(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
}

fn percent_decode(input: &str) -> Option<String> {
    let bytes = input.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let escape = bytes.get(i + 1..i + 3)?;
            if !escape.iter().all(u8::is_ascii_hexdigit) {
                return None;
            }
            i += 3;
        } else {
            i += 1;
        }
    }

    let decoded = urlencoding::decode(input).ok()?;
    if decoded.contains('\0') {
        return None;
    }
    Some(decoded.into_owned())
}

fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(prefix) => out = PathBuf::from(prefix.as_os_str()),
            Component::RootDir => out.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            Component::Normal(part) => out.push(part),
        }
    }
    out
}
