//! Resolved path normalization
//!
//! Every cache key and catalog key goes through [`ResolvedPath::resolve`], so
//! two spellings of the same logical path always compare equal.

use std::fmt;
use std::path::Path;

/// Normalized, platform-neutral absolute path of a stored entity
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResolvedPath(String);

impl ResolvedPath {
    /// Resolve a request path (query string allowed) against a content root.
    ///
    /// Separators are unified to `/`, empty and `.` segments dropped, and
    /// `..` never climbs above the root.
    ///
    /// # Examples
    /// ```
    /// use rangeserve::store::ResolvedPath;
    ///
    /// let a = ResolvedPath::resolve("/srv/Files", "/videos/intro.mp4?t=10");
    /// let b = ResolvedPath::resolve("/srv/Files/", "videos\\intro.mp4/");
    /// assert_eq!(a, b);
    /// assert_eq!(a.as_str(), "/srv/Files/videos/intro.mp4");
    /// ```
    pub fn resolve(root: &str, request_path: &str) -> Self {
        let request_path = request_path.split('?').next().unwrap_or_default();

        let mut segments = Vec::new();
        push_segments(&mut segments, root, 0);
        let floor = segments.len();
        push_segments(&mut segments, request_path, floor);

        let joined = segments.join("/");
        if root.starts_with(['/', '\\']) {
            Self(format!("/{joined}"))
        } else {
            Self(joined)
        }
    }

    /// Key for a file found on disk
    pub fn from_location(location: &Path) -> Self {
        Self::resolve(&location.to_string_lossy(), "")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last path segment
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or_default()
    }
}

impl fmt::Display for ResolvedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn push_segments<'a>(segments: &mut Vec<&'a str>, raw: &'a str, floor: usize) {
    for segment in raw.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.len() > floor {
                    segments.pop();
                }
            }
            s => segments.push(s),
        }
    }
}
