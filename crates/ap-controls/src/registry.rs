//! Component factories keyed by configuration type name.

use std::collections::BTreeMap;
use std::fmt;

use crate::component::Component;
use crate::config::ConfigEntry;
use crate::error::{ControlError, ControlResult};
use crate::pid::PidController;
use crate::props::PropertyTree;

/// Builds a configured component from its name and entries.
pub type ComponentFactory =
    fn(&str, &[ConfigEntry], &PropertyTree) -> ControlResult<Box<dyn Component>>;

/// Maps type names such as `pid-controller` to factories.
#[derive(Clone, Default)]
pub struct ComponentRegistry {
    factories: BTreeMap<String, ComponentFactory>,
}

impl fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentRegistry")
            .field("kinds", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}

fn build_pid(
    name: &str,
    entries: &[ConfigEntry],
    props: &PropertyTree,
) -> ControlResult<Box<dyn Component>> {
    Ok(Box::new(PidController::from_entries(name, entries, props)?))
}

impl ComponentRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the built-in component types.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(PidController::TYPE_NAME, build_pid);
        registry
    }

    /// Register or replace the factory for `kind`.
    pub fn register(&mut self, kind: impl Into<String>, factory: ComponentFactory) {
        self.factories.insert(kind.into(), factory);
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.factories.contains_key(kind)
    }

    /// Registered type names, sorted.
    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    /// Build a component of type `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`ControlError::UnknownComponentType`] if nothing is registered
    /// for `kind`, or the factory's configuration error.
    pub fn build(
        &self,
        kind: &str,
        name: &str,
        entries: &[ConfigEntry],
        props: &PropertyTree,
    ) -> ControlResult<Box<dyn Component>> {
        let factory = self
            .factories
            .get(kind)
            .ok_or_else(|| ControlError::UnknownComponentType {
                kind: kind.to_string(),
            })?;
        factory(name, entries, props)
    }
}
