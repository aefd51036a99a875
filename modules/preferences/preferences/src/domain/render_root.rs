use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

/// Class carried by the root element while dark mode is shown.
pub const DARK_CLASS: &str = "dark";
pub const HIGH_CONTRAST_CLASS: &str = "high-contrast";
pub const LARGE_TEXT_CLASS: &str = "large-text";
pub const REDUCED_MOTION_CLASS: &str = "reduced-motion";
/// Attribute holding the accent color token.
pub const ACCENT_ATTRIBUTE: &str = "data-accent";

/// The root element of the rendering surface.
///
/// This is the only presentation surface the client core touches. Callers
/// read before writing, so an implementation may treat every write as a
/// real mutation.
pub trait RenderRoot: Send + Sync {
    fn has_class(&self, class: &str) -> bool;
    fn set_class(&self, class: &str, enabled: bool);
    fn attribute(&self, name: &str) -> Option<String>;
    fn set_attribute(&self, name: &str, value: &str);

    fn is_dark(&self) -> bool {
        self.has_class(DARK_CLASS)
    }
}

/// In-process render root.
///
/// Holds the class set and attributes of the root element and counts the
/// writes that actually changed something.
#[derive(Debug, Default)]
pub struct DocumentRoot {
    classes: RwLock<BTreeSet<String>>,
    attributes: RwLock<BTreeMap<String, String>>,
    mutations: AtomicU64,
}

impl DocumentRoot {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of effective mutations so far.
    #[must_use]
    pub fn mutation_count(&self) -> u64 {
        self.mutations.load(Ordering::Acquire)
    }

    /// Space-separated class list, sorted.
    #[must_use]
    pub fn class_list(&self) -> String {
        self.classes
            .read()
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn bump(&self) {
        self.mutations.fetch_add(1, Ordering::AcqRel);
    }
}

impl RenderRoot for DocumentRoot {
    fn has_class(&self, class: &str) -> bool {
        self.classes.read().contains(class)
    }

    fn set_class(&self, class: &str, enabled: bool) {
        let changed = if enabled {
            self.classes.write().insert(class.to_owned())
        } else {
            self.classes.write().remove(class)
        };
        if changed {
            self.bump();
        }
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.attributes.read().get(name).cloned()
    }

    fn set_attribute(&self, name: &str, value: &str) {
        let previous = self
            .attributes
            .write()
            .insert(name.to_owned(), value.to_owned());
        if previous.as_deref() != Some(value) {
            self.bump();
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn only_effective_writes_count() {
        let root = DocumentRoot::new();
        assert!(!root.is_dark());

        root.set_class(DARK_CLASS, true);
        root.set_class(DARK_CLASS, true);
        assert!(root.is_dark());
        assert_eq!(root.mutation_count(), 1);

        root.set_attribute(ACCENT_ATTRIBUTE, "teal");
        root.set_attribute(ACCENT_ATTRIBUTE, "teal");
        assert_eq!(root.attribute(ACCENT_ATTRIBUTE).as_deref(), Some("teal"));
        assert_eq!(root.mutation_count(), 2);

        root.set_class(DARK_CLASS, false);
        root.set_class(LARGE_TEXT_CLASS, false);
        assert_eq!(root.mutation_count(), 3);
    }

    #[test]
    fn class_list_is_sorted() {
        let root = DocumentRoot::new();
        root.set_class(REDUCED_MOTION_CLASS, true);
        root.set_class(DARK_CLASS, true);
        assert_eq!(root.class_list(), "dark reduced-motion");
    }
}
