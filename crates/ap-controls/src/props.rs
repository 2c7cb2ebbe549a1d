//! Property tree backing the controllers' live inputs and outputs.
//!
//! The property tree is the external store a controller reads its setpoint,
//! measurement, gains and limits from, and writes its output into. Paths are
//! slash-separated (`/controls/flight/elevator`). Values are `f64`; booleans
//! are stored as `0.0`/`1.0` and any non-zero value reads as `true`.
//!
//! The tree is single threaded: a scheduler ticks every controller that
//! shares a tree from one control thread.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

/// Normalize a property path: leading slash, no empty or trailing segments.
pub fn normalize_path(path: &str) -> String {
    let segments: Vec<&str> = path
        .split('/')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    format!("/{}", segments.join("/"))
}

/// Shared handle to a property store. Clones refer to the same store.
#[derive(Debug, Clone, Default)]
pub struct PropertyTree {
    values: Rc<RefCell<BTreeMap<String, f64>>>,
}

impl PropertyTree {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value at `path`, if it has been set.
    pub fn get(&self, path: &str) -> Option<f64> {
        self.values.borrow().get(&normalize_path(path)).copied()
    }

    /// Current value at `path`, or `default` if it has never been set.
    pub fn get_or(&self, path: &str, default: f64) -> f64 {
        self.get(path).unwrap_or(default)
    }

    /// Boolean view of `path`; unset paths read as `false`.
    pub fn get_bool(&self, path: &str) -> bool {
        self.get(path).is_some_and(|v| v != 0.0)
    }

    /// Set the value at `path`, creating it if needed.
    pub fn set(&self, path: &str, value: f64) {
        self.values.borrow_mut().insert(normalize_path(path), value);
    }

    /// Set a boolean at `path`.
    pub fn set_bool(&self, path: &str, value: bool) {
        self.set(path, if value { 1.0 } else { 0.0 });
    }

    /// Whether `path` has been set.
    pub fn contains(&self, path: &str) -> bool {
        self.values.borrow().contains_key(&normalize_path(path))
    }

    /// Handle to a single path in this tree.
    pub fn node(&self, path: &str) -> PropertyNode {
        PropertyNode {
            tree: self.clone(),
            path: normalize_path(path),
        }
    }

    /// All set paths, sorted.
    pub fn paths(&self) -> Vec<String> {
        self.values.borrow().keys().cloned().collect()
    }

    /// Number of set paths.
    pub fn len(&self) -> usize {
        self.values.borrow().len()
    }

    /// Whether no path has been set.
    pub fn is_empty(&self) -> bool {
        self.values.borrow().is_empty()
    }
}

/// Handle to one path in a [`PropertyTree`].
#[derive(Debug, Clone)]
pub struct PropertyNode {
    tree: PropertyTree,
    path: String,
}

impl PropertyNode {
    /// Normalized path of this node.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Current value; `0.0` when the path has never been set.
    pub fn get(&self) -> f64 {
        self.tree.get_or(&self.path, 0.0)
    }

    /// Current value as a boolean.
    pub fn get_bool(&self) -> bool {
        self.tree.get_bool(&self.path)
    }

    /// Write a value.
    pub fn set(&self, value: f64) {
        self.tree.set(&self.path, value);
    }

    /// Whether the path has been set.
    pub fn exists(&self) -> bool {
        self.tree.contains(&self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_are_normalized() {
        assert_eq!(normalize_path("controls/flight//elevator/"), "/controls/flight/elevator");
        assert_eq!(normalize_path("/a"), "/a");
        assert_eq!(normalize_path(""), "/");
    }

    #[test]
    fn clones_share_storage() {
        let props = PropertyTree::new();
        let other = props.clone();
        other.set("/autopilot/target", 3.5);
        assert_eq!(props.get("autopilot/target"), Some(3.5));
        assert_eq!(props.len(), 1);
    }

    #[test]
    fn unset_node_reads_zero() {
        let props = PropertyTree::new();
        let node = props.node("/missing");
        assert!(!node.exists());
        assert_eq!(node.get(), 0.0);
        assert!(!node.get_bool());

        node.set(2.0);
        assert!(node.exists());
        assert!(node.get_bool());
    }

    #[test]
    fn booleans_round_through_doubles() {
        let props = PropertyTree::new();
        props.set_bool("/locks/altitude", true);
        assert_eq!(props.get("/locks/altitude"), Some(1.0));
        props.set_bool("/locks/altitude", false);
        assert!(!props.get_bool("/locks/altitude"));
    }
}
