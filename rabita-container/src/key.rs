//! Binding identification keys.
//!
//! [`BindingKey`] identifies a binding within the container. Keys are plain
//! strings — type paths, trait names, or free-form aliases — normalized on
//! construction.

use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

/// Identifies a binding in the container.
///
/// Keys are normalized by stripping any leading path-separator colons, so a
/// fully anchored path and its unanchored spelling refer to the same
/// binding.
///
/// Cloning is cheap: the key body is reference-counted.
///
/// # Examples
/// ```
/// use rabita_container::key::BindingKey;
///
/// let anchored = BindingKey::new("::app::Mailer");
/// let plain = BindingKey::new("app::Mailer");
/// assert_eq!(anchored, plain);
/// assert_eq!(anchored.as_str(), "app::Mailer");
///
/// // Free-form aliases are keys too
/// let alias = BindingKey::new("mailer");
/// assert_eq!(alias.as_str(), "mailer");
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BindingKey(Arc<str>);

impl BindingKey {
    /// Creates a normalized key from a raw string.
    pub fn new(raw: &str) -> Self {
        Self(Arc::from(raw.trim_start_matches(':')))
    }

    /// Returns the normalized key text.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for BindingKey {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for BindingKey {
    fn from(raw: String) -> Self {
        Self::new(&raw)
    }
}

impl From<&BindingKey> for BindingKey {
    fn from(key: &BindingKey) -> Self {
        key.clone()
    }
}

impl Borrow<str> for BindingKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for BindingKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for BindingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BindingKey({})", self.0)
    }
}

impl fmt::Display for BindingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leading_separators_stripped() {
        assert_eq!(BindingKey::new("::app::Foo"), BindingKey::new("app::Foo"));
        assert_eq!(BindingKey::new("::::app::Foo").as_str(), "app::Foo");
    }

    #[test]
    fn interior_separators_kept() {
        assert_eq!(BindingKey::new("app::sub::Foo").as_str(), "app::sub::Foo");
    }

    #[test]
    fn distinct_keys_differ() {
        assert_ne!(BindingKey::new("app::Foo"), BindingKey::new("app::Bar"));
    }

    #[test]
    fn key_in_hashmap() {
        use std::collections::HashMap;
        let mut map = HashMap::new();
        map.insert(BindingKey::new("::app::Foo"), 1);
        // Borrow<str> allows &str lookups
        assert_eq!(map.get("app::Foo"), Some(&1));
        assert_eq!(map.get("app::Bar"), None);
    }

    #[test]
    fn display_and_debug() {
        let key = BindingKey::new("app::Foo");
        assert_eq!(format!("{key}"), "app::Foo");
        assert_eq!(format!("{key:?}"), "BindingKey(app::Foo)");
    }
}
