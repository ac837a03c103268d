/// Hierarchical places where fixtures are registered and tests live.
///
/// A location is a `/` separated path like `suite/api/test_users.rs`: lookups
/// from a location search the location itself and then every ancestor up to
/// the root.
use std::fmt;

#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Location(Vec<String>);

impl Location {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn new<S: AsRef<str>>(path: S) -> Self {
        Self(
            path.as_ref()
                .split('/')
                .filter(|s| !s.is_empty() && *s != ".")
                .map(ToOwned::to_owned)
                .collect(),
        )
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn child<S: AsRef<str>>(&self, segment: S) -> Self {
        let mut segments = self.0.clone();
        segments.extend(Self::new(segment).0);
        Self(segments)
    }

    pub fn parent(&self) -> Option<Self> {
        match self.0.split_last() {
            Some((_, parent)) => Some(Self(parent.to_vec())),
            None => None,
        }
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Iterate over this location and then all its ancestors, root included.
    pub fn ancestors(&self) -> impl Iterator<Item = Location> + '_ {
        (0..=self.0.len()).rev().map(|n| Self(self.0[..n].to_vec()))
    }

    /// `true` if `other` is this location or one of its descendants.
    pub fn contains(&self, other: &Location) -> bool {
        other.0.starts_with(&self.0)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            write!(f, ".")
        } else {
            write!(f, "{}", self.0.join("/"))
        }
    }
}

impl fmt::Debug for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Location({self})")
    }
}

impl From<&str> for Location {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

impl From<String> for Location {
    fn from(path: String) -> Self {
        Self::new(path)
    }
}

impl From<&Location> for Location {
    fn from(location: &Location) -> Self {
        location.clone()
    }
}
