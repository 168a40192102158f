//! Dot-delimited paths into a state tree.
//!
//! Two flavours of path live here:
//!
//! - [`Path`]: a parsed `"user.profile.name"` string, resolved at runtime
//!   against a [`serde_json::Value`] snapshot of the state. This is the form
//!   used by callers that only have a string in hand.
//! - [`Field`] / [`KeyPath`]: typed paths generated by `#[derive(StatePaths)]`
//!   and composed with [`KeyPath::then`]. A typed path can only be built
//!   from segments that exist on the state type, so resolving it never fails.
//!
//! # Examples
//!
//! ```
//! use slicekit_core::path::{resolve, Path};
//! use serde_json::json;
//!
//! let state = json!({ "user": { "profile": { "name": "Ada" } } });
//! let path: Path = "user.profile.name".parse().unwrap();
//! assert_eq!(resolve(&state, &path).unwrap(), &json!("Ada"));
//! ```

use serde_json::Value;
use smallvec::SmallVec;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

/// Separator between path segments.
pub const SEPARATOR: char = '.';

/// Errors produced while parsing or resolving a [`Path`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    /// The path string was empty.
    #[error("Path is empty")]
    Empty,

    /// The path contained an empty segment, e.g. `"a..b"` or `"a."`.
    #[error("Path '{path}' has an empty segment at index {index}")]
    EmptySegment {
        /// The offending path.
        path: String,
        /// Zero-based index of the empty segment.
        index: usize,
    },

    /// A segment did not name anything at its depth.
    ///
    /// Also returned when a segment tries to index into a scalar, or an
    /// array index is out of range.
    #[error("Path '{path}' not found: no '{segment}' at depth {depth}")]
    NotFound {
        /// The full path being resolved.
        path: String,
        /// The first segment that failed to resolve.
        segment: String,
        /// Zero-based depth of `segment` within `path`.
        depth: usize,
    },
}

/// A parsed dot path such as `"counter.count"` or `"todos.items.0.title"`.
///
/// A `Path` always holds at least one segment and no segment is empty.
/// Segments are not checked against any state shape; that happens when the
/// path is resolved.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Path {
    segments: SmallVec<[String; 4]>,
}

impl Path {
    /// Parse a dot path.
    ///
    /// # Errors
    ///
    /// - [`PathError::Empty`] for `""`
    /// - [`PathError::EmptySegment`] for inputs like `"a..b"`, `".a"` or `"a."`
    ///
    /// # Examples
    ///
    /// ```
    /// use slicekit_core::path::Path;
    ///
    /// let path = Path::parse("counter.count").unwrap();
    /// assert_eq!(path.len(), 2);
    /// assert!(Path::parse("counter..count").is_err());
    /// ```
    pub fn parse(raw: &str) -> Result<Self, PathError> {
        if raw.is_empty() {
            return Err(PathError::Empty);
        }

        let mut segments = SmallVec::new();
        for (index, segment) in raw.split(SEPARATOR).enumerate() {
            if segment.is_empty() {
                return Err(PathError::EmptySegment {
                    path: raw.to_string(),
                    index,
                });
            }
            segments.push(segment.to_string());
        }

        Ok(Self { segments })
    }

    /// Iterate over the segments in order.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().map(String::as_str)
    }

    /// Number of segments (always at least one).
    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Always `false`; present for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// The first segment.
    #[must_use]
    pub fn head(&self) -> &str {
        self.segments.first().map_or("", String::as_str)
    }

    /// Append the segments of `suffix` to this path.
    ///
    /// # Errors
    ///
    /// Returns an error if `suffix` is not itself a valid path.
    pub fn join(&self, suffix: &str) -> Result<Self, PathError> {
        let suffix = Self::parse(suffix)?;
        let mut segments = self.segments.clone();
        segments.extend(suffix.segments);
        Ok(Self { segments })
    }
}

impl FromStr for Path {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for Path {
    type Error = PathError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, "{SEPARATOR}")?;
            }
            f.write_str(segment)?;
        }
        Ok(())
    }
}

/// Walk `path` from `root`, strictly.
///
/// Object members are indexed by key. Arrays are indexed when the segment is
/// a canonical decimal integer (`"0"`, `"12"`, but not `"01"` or `"+1"`).
///
/// # Errors
///
/// Returns [`PathError::NotFound`] naming the first segment that does not
/// resolve. No other error is possible.
pub fn resolve<'v>(root: &'v Value, path: &Path) -> Result<&'v Value, PathError> {
    resolve_from(root, path, 0)
}

/// Like [`resolve`], but starts at segment `depth`, treating `root` as the
/// value already reached by the first `depth` segments.
///
/// Errors still report the full path and absolute depth.
///
/// # Errors
///
/// Returns [`PathError::NotFound`] for the first segment that does not resolve.
pub fn resolve_from<'v>(root: &'v Value, path: &Path, depth: usize) -> Result<&'v Value, PathError> {
    let mut current = root;
    for (offset, segment) in path.segments.iter().enumerate().skip(depth) {
        current = step(current, segment).ok_or_else(|| PathError::NotFound {
            path: path.to_string(),
            segment: segment.clone(),
            depth: offset,
        })?;
    }
    Ok(current)
}

/// Walk `path` from `root`, permissively: a missing segment yields `None`.
///
/// # Examples
///
/// ```
/// use slicekit_core::path::{lookup, Path};
/// use serde_json::json;
///
/// let state = json!({ "counter": { "count": 3 } });
/// let missing = Path::parse("counter.total").unwrap();
/// assert_eq!(lookup(&state, &missing), None);
/// ```
#[must_use]
pub fn lookup<'v>(root: &'v Value, path: &Path) -> Option<&'v Value> {
    path.segments
        .iter()
        .try_fold(root, |current, segment| step(current, segment))
}

fn step<'v>(value: &'v Value, segment: &str) -> Option<&'v Value> {
    match value {
        Value::Object(members) => members.get(segment),
        Value::Array(items) => array_index(segment).and_then(|index| items.get(index)),
        _ => None,
    }
}

fn array_index(segment: &str) -> Option<usize> {
    let canonical = segment.bytes().all(|b| b.is_ascii_digit())
        && !(segment.len() > 1 && segment.starts_with('0'));
    if canonical {
        segment.parse().ok()
    } else {
        None
    }
}

type Getter<Root, T> = Arc<dyn for<'a> Fn(&'a Root) -> &'a T + Send + Sync>;

// Pins a closure to the higher-ranked getter signature so the returned
// reference borrows from the argument.
fn getter<Root, T, F>(f: F) -> F
where
    F: for<'a> Fn(&'a Root) -> &'a T,
{
    f
}

/// A single typed segment: field `name` of `Root`, holding a `T`.
///
/// Normally generated as an associated constant by `#[derive(StatePaths)]`:
///
/// ```
/// use slicekit_core::path::Field;
///
/// struct Counter { count: i64 }
///
/// const COUNT: Field<Counter, i64> = Field::new("count", |c| &c.count);
///
/// assert_eq!(COUNT.get(&Counter { count: 7 }), &7);
/// assert_eq!(COUNT.name(), "count");
/// ```
pub struct Field<Root, T> {
    name: &'static str,
    get: fn(&Root) -> &T,
}

impl<Root, T> Field<Root, T> {
    /// Create a field path from its name and accessor.
    #[must_use]
    pub const fn new(name: &'static str, get: fn(&Root) -> &T) -> Self {
        Self { name, get }
    }

    /// The field name, i.e. the path segment.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Read the field from `root`.
    pub fn get<'a>(&self, root: &'a Root) -> &'a T {
        (self.get)(root)
    }
}

impl<Root: 'static, T: 'static> Field<Root, T> {
    /// Extend this field with a path into its value.
    #[must_use]
    pub fn then<U: 'static>(self, next: impl Into<KeyPath<T, U>>) -> KeyPath<Root, U> {
        KeyPath::from(self).then(next)
    }

    /// The dynamic form of this path.
    #[must_use]
    pub fn path(&self) -> Path {
        KeyPath::from(*self).path()
    }
}

impl<Root, T> Clone for Field<Root, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<Root, T> Copy for Field<Root, T> {}

impl<Root, T> fmt::Debug for Field<Root, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Field").field(&self.name).finish()
    }
}

/// A typed, composed path from `Root` to a `T` somewhere inside it.
///
/// Built from [`Field`]s with [`Field::then`] / [`KeyPath::then`]. Because
/// every segment was a real field, [`KeyPath::get`] performs no validation.
///
/// ```
/// use slicekit_core::path::{Field, KeyPath};
///
/// struct Profile { name: String }
/// struct User { profile: Profile }
///
/// const PROFILE: Field<User, Profile> = Field::new("profile", |u| &u.profile);
/// const NAME: Field<Profile, String> = Field::new("name", |p| &p.name);
///
/// let path: KeyPath<User, String> = PROFILE.then(NAME);
/// let user = User { profile: Profile { name: "Ada".into() } };
///
/// assert_eq!(path.get(&user), "Ada");
/// assert_eq!(path.to_string(), "profile.name");
/// ```
pub struct KeyPath<Root, T> {
    segments: SmallVec<[&'static str; 4]>,
    get: Getter<Root, T>,
}

impl<Root: 'static, T: 'static> KeyPath<Root, T> {
    /// Read the value at this path.
    pub fn get<'a>(&self, root: &'a Root) -> &'a T {
        (*self.get)(root)
    }

    /// Extend this path further.
    #[must_use]
    pub fn then<U: 'static>(self, next: impl Into<KeyPath<T, U>>) -> KeyPath<Root, U> {
        let next = next.into();
        let mut segments = self.segments;
        segments.extend(next.segments.iter().copied());

        let outer = self.get;
        let inner = next.get;
        KeyPath {
            segments,
            get: Arc::new(getter(move |root: &Root| (*inner)((*outer)(root)))),
        }
    }

    /// The segments of this path.
    #[must_use]
    pub fn segments(&self) -> &[&'static str] {
        &self.segments
    }

    /// The dynamic form of this path, suitable for [`resolve`] against a
    /// serialised snapshot.
    #[must_use]
    pub fn path(&self) -> Path {
        Path {
            segments: self.segments.iter().map(|s| (*s).to_string()).collect(),
        }
    }
}

impl<Root: 'static, T: 'static> From<Field<Root, T>> for KeyPath<Root, T> {
    fn from(field: Field<Root, T>) -> Self {
        Self {
            segments: smallvec::smallvec![field.name],
            get: Arc::new(field.get),
        }
    }
}

impl<Root, T> Clone for KeyPath<Root, T> {
    fn clone(&self) -> Self {
        Self {
            segments: self.segments.clone(),
            get: Arc::clone(&self.get),
        }
    }
}

impl<Root, T> fmt::Display for KeyPath<Root, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, "{SEPARATOR}")?;
            }
            f.write_str(segment)?;
        }
        Ok(())
    }
}

impl<Root, T> fmt::Debug for KeyPath<Root, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("KeyPath").field(&self.to_string()).finish()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)] // Test code can use unwrap/expect

    use super::*;
    use serde_json::json;

    fn state() -> Value {
        json!({
            "counter": { "count": 5 },
            "user": {
                "profile": { "name": "Ada", "age": 36 },
                "tags": ["admin", "ops"]
            }
        })
    }

    #[test]
    fn parse_rejects_empty_input() {
        assert_eq!(Path::parse(""), Err(PathError::Empty));
    }

    #[test]
    fn parse_rejects_empty_segments() {
        assert_eq!(
            Path::parse("a..b"),
            Err(PathError::EmptySegment {
                path: "a..b".to_string(),
                index: 1
            })
        );
        assert!(matches!(Path::parse(".a"), Err(PathError::EmptySegment { index: 0, .. })));
        assert!(matches!(Path::parse("a."), Err(PathError::EmptySegment { index: 1, .. })));
    }

    #[test]
    fn display_round_trips_input() {
        let path: Path = "user.profile.name".parse().unwrap();
        assert_eq!(path.to_string(), "user.profile.name");
        assert_eq!(path.head(), "user");
        assert_eq!(path.segments().collect::<Vec<_>>(), ["user", "profile", "name"]);
    }

    #[test]
    fn join_appends_segments() {
        let path = Path::parse("user").unwrap().join("profile.name").unwrap();
        assert_eq!(path.to_string(), "user.profile.name");
        assert!(Path::parse("user").unwrap().join("").is_err());
    }

    #[test]
    fn resolves_nested_leaf() {
        let state = state();
        let path = Path::parse("user.profile.name").unwrap();
        assert_eq!(resolve(&state, &path).unwrap(), &json!("Ada"));
    }

    #[test]
    fn resolves_intermediate_mapping() {
        let state = state();
        let path = Path::parse("counter").unwrap();
        assert_eq!(resolve(&state, &path).unwrap(), &json!({ "count": 5 }));
    }

    #[test]
    fn resolves_array_elements() {
        let state = state();
        let path = Path::parse("user.tags.1").unwrap();
        assert_eq!(resolve(&state, &path).unwrap(), &json!("ops"));

        for bad in ["user.tags.01", "user.tags.+1", "user.tags.2", "user.tags.first"] {
            let path = Path::parse(bad).unwrap();
            assert!(matches!(resolve(&state, &path), Err(PathError::NotFound { depth: 2, .. })));
        }
    }

    #[test]
    fn missing_key_reports_segment_and_depth() {
        let state = state();
        let path = Path::parse("user.settings.theme").unwrap();
        assert_eq!(
            resolve(&state, &path),
            Err(PathError::NotFound {
                path: "user.settings.theme".to_string(),
                segment: "settings".to_string(),
                depth: 1,
            })
        );
    }

    #[test]
    fn indexing_into_scalar_is_not_found() {
        let state = state();
        let path = Path::parse("counter.count.value").unwrap();
        assert!(matches!(
            resolve(&state, &path),
            Err(PathError::NotFound { depth: 2, .. })
        ));
    }

    #[test]
    fn lookup_is_permissive() {
        let state = state();
        assert_eq!(lookup(&state, &Path::parse("counter.count").unwrap()), Some(&json!(5)));
        assert_eq!(lookup(&state, &Path::parse("counter.total").unwrap()), None);
        assert_eq!(lookup(&state, &Path::parse("nope.at.all").unwrap()), None);
    }

    #[test]
    fn resolve_from_reports_absolute_depth() {
        let state = state();
        let user = &state["user"];
        let path = Path::parse("user.profile.email").unwrap();
        assert!(matches!(
            resolve_from(user, &path, 1),
            Err(PathError::NotFound { depth: 2, ref segment, .. }) if segment == "email"
        ));
    }

    struct Profile {
        name: String,
    }

    struct User {
        profile: Profile,
        visits: u32,
    }

    const PROFILE: Field<User, Profile> = Field::new("profile", |u| &u.profile);
    const NAME: Field<Profile, String> = Field::new("name", |p| &p.name);
    const VISITS: Field<User, u32> = Field::new("visits", |u| &u.visits);

    fn user() -> User {
        User {
            profile: Profile {
                name: "Ada".to_string(),
            },
            visits: 3,
        }
    }

    #[test]
    fn field_reads_value() {
        assert_eq!(VISITS.get(&user()), &3);
        assert_eq!(VISITS.path().to_string(), "visits");
    }

    #[test]
    fn key_path_composes() {
        let path = PROFILE.then(NAME);
        let user = user();
        assert_eq!(path.get(&user), "Ada");
        assert_eq!(path.segments(), ["profile", "name"]);
        assert_eq!(path.path(), Path::parse("profile.name").unwrap());
        assert_eq!(format!("{path:?}"), "KeyPath(\"profile.name\")");
    }
}
