//! Project path sanitization.
//!
//! A [`ProjectPath`] is a validated, slash-separated relative path inside the
//! project tree: never absolute, never containing `..`, never resolving
//! outside the root it is joined under. Every user-supplied path crosses
//! through [`ProjectPath::sanitize`] (or [`ProjectPath::sanitize_file`] for
//! intra-archive file paths) before it touches the filesystem.

use std::path::{Path, PathBuf};

use crate::error::{PathError, PathErrorReason};

/// Name of the archive manifest file inside a project directory.
///
/// Sessions are scoped to directories, so a raw path that designates the
/// manifest itself resolves to its containing directory.
pub const MANIFEST_FILENAME: &str = "manifest.xml";

/// A sanitized relative path inside the project tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProjectPath(String);

impl ProjectPath {
    /// Sanitize a raw, user-supplied path into a directory-scoped
    /// [`ProjectPath`].
    ///
    /// Normalizes `\` to `/`, strips a single leading `/`, drops empty
    /// segments, and resolves a trailing [`MANIFEST_FILENAME`] to its
    /// containing directory. Sanitization is idempotent: feeding an
    /// already-sanitized path back in returns it unchanged.
    ///
    /// # Errors
    ///
    /// - [`PathErrorReason::Traversal`] for any `..` segment
    /// - [`PathErrorReason::Reserved`] for `.` segments or null bytes
    /// - [`PathErrorReason::Empty`] when nothing remains after normalization
    pub fn sanitize(raw: &str) -> Result<Self, PathError> {
        Self::sanitize_inner(raw, true)
    }

    /// Sanitize a raw path without the manifest-to-directory resolution.
    ///
    /// Used for file paths beneath a session alias, where a path may
    /// legitimately designate the manifest or any other file.
    ///
    /// # Errors
    ///
    /// Same rules as [`ProjectPath::sanitize`].
    pub fn sanitize_file(raw: &str) -> Result<Self, PathError> {
        Self::sanitize_inner(raw, false)
    }

    fn sanitize_inner(raw: &str, resolve_manifest: bool) -> Result<Self, PathError> {
        if raw.contains('\0') {
            return Err(PathError::new(PathErrorReason::Reserved));
        }

        let normalized = raw.replace('\\', "/");
        let trimmed = normalized.strip_prefix('/').unwrap_or(&normalized);

        let mut segments: Vec<&str> = Vec::new();
        for segment in trimmed.split('/') {
            match segment {
                "" => {}
                ".." => return Err(PathError::new(PathErrorReason::Traversal)),
                "." => return Err(PathError::new(PathErrorReason::Reserved)),
                _ => segments.push(segment),
            }
        }

        if resolve_manifest && segments.last() == Some(&MANIFEST_FILENAME) {
            segments.pop();
        }

        if segments.is_empty() {
            return Err(PathError::new(PathErrorReason::Empty));
        }

        Ok(Self(segments.join("/")))
    }

    /// The sanitized path as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Join this path beneath a filesystem root.
    ///
    /// Safe by construction: no segment of a `ProjectPath` can climb out of
    /// `root`.
    #[must_use]
    pub fn join_under(&self, root: &Path) -> PathBuf {
        let mut out = root.to_path_buf();
        for segment in self.0.split('/') {
            out.push(segment);
        }
        out
    }
}

impl std::fmt::Display for ProjectPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn plain_relative_path_passes_through() {
        let p = ProjectPath::sanitize("proj1/main").unwrap();
        assert_eq!(p.as_str(), "proj1/main");
    }

    #[test]
    fn leading_slash_is_stripped() {
        let p = ProjectPath::sanitize("/proj1/main").unwrap();
        assert_eq!(p.as_str(), "proj1/main");
    }

    #[test]
    fn backslashes_are_normalized() {
        let p = ProjectPath::sanitize("proj1\\main").unwrap();
        assert_eq!(p.as_str(), "proj1/main");
    }

    #[test]
    fn empty_segments_collapse() {
        let p = ProjectPath::sanitize("proj1//main").unwrap();
        assert_eq!(p.as_str(), "proj1/main");
    }

    #[test]
    fn dot_dot_segment_is_traversal() {
        let err = ProjectPath::sanitize("proj1/../proj2").unwrap_err();
        assert_eq!(err.reason, PathErrorReason::Traversal);
    }

    #[test]
    fn leading_dot_dot_is_traversal() {
        let err = ProjectPath::sanitize("../secret").unwrap_err();
        assert_eq!(err.reason, PathErrorReason::Traversal);
    }

    #[test]
    fn single_dot_segment_is_reserved() {
        let err = ProjectPath::sanitize("proj1/./main").unwrap_err();
        assert_eq!(err.reason, PathErrorReason::Reserved);
    }

    #[test]
    fn null_byte_is_reserved() {
        let err = ProjectPath::sanitize("proj\01").unwrap_err();
        assert_eq!(err.reason, PathErrorReason::Reserved);
    }

    #[test]
    fn empty_input_is_empty() {
        let err = ProjectPath::sanitize("").unwrap_err();
        assert_eq!(err.reason, PathErrorReason::Empty);
    }

    #[test]
    fn bare_slash_is_empty() {
        let err = ProjectPath::sanitize("/").unwrap_err();
        assert_eq!(err.reason, PathErrorReason::Empty);
    }

    #[test]
    fn manifest_resolves_to_containing_directory() {
        let p = ProjectPath::sanitize("proj1/main/manifest.xml").unwrap();
        assert_eq!(p.as_str(), "proj1/main");
    }

    #[test]
    fn manifest_at_root_is_empty() {
        let err = ProjectPath::sanitize("manifest.xml").unwrap_err();
        assert_eq!(err.reason, PathErrorReason::Empty);
    }

    #[test]
    fn sanitize_file_keeps_manifest() {
        let p = ProjectPath::sanitize_file("manifest.xml").unwrap();
        assert_eq!(p.as_str(), "manifest.xml");
    }

    #[test]
    fn sanitize_file_still_rejects_traversal() {
        let err = ProjectPath::sanitize_file("../proj2/secret").unwrap_err();
        assert_eq!(err.reason, PathErrorReason::Traversal);
    }

    #[test]
    fn sanitize_is_idempotent() {
        for raw in ["proj1/main", "/a/b/c", "x\\y//z", "p/main/manifest.xml"] {
            let once = ProjectPath::sanitize(raw).unwrap();
            let twice = ProjectPath::sanitize(once.as_str()).unwrap();
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn join_under_stays_beneath_root() {
        let p = ProjectPath::sanitize("proj1/main").unwrap();
        let joined = p.join_under(Path::new("/srv/projects"));
        assert_eq!(joined, PathBuf::from("/srv/projects/proj1/main"));
    }
}
