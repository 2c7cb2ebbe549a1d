//! Ordered collection of components ticked together.

use tracing::trace;

use crate::component::Component;
use crate::error::{ControlError, ControlResult};

/// Runs its components in insertion order once per step.
///
/// Components communicate only through the property tree, so a component
/// sees outputs written earlier in the same step.
#[derive(Default)]
pub struct Autopilot {
    name: String,
    components: Vec<Box<dyn Component>>,
}

impl std::fmt::Debug for Autopilot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Autopilot")
            .field("name", &self.name)
            .field("components", &self.names().collect::<Vec<_>>())
            .finish()
    }
}

impl Autopilot {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            components: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Append a component.
    ///
    /// # Errors
    ///
    /// Returns [`ControlError::DuplicateComponent`] if the name is taken.
    pub fn add(&mut self, component: Box<dyn Component>) -> ControlResult<()> {
        if self.component(component.name()).is_some() {
            return Err(ControlError::DuplicateComponent {
                name: component.name().to_string(),
            });
        }
        self.components.push(component);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn component(&self, name: &str) -> Option<&dyn Component> {
        self.components
            .iter()
            .find(|c| c.name() == name)
            .map(Box::as_ref)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.components.iter().map(|c| c.name())
    }

    /// Advance every component by `dt` seconds.
    pub fn update(&mut self, dt: f64) {
        trace!(autopilot = %self.name, dt, "step");
        for component in &mut self.components {
            component.tick(dt);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pid::PidController;
    use crate::props::PropertyTree;
    use crate::value::InputValue;

    fn p_controller(props: &PropertyTree, name: &str, input: &str, output: &str) -> PidController {
        let mut pid = PidController::new(name);
        let analog = pid.analog_mut();
        analog.add_input(InputValue::property(props.node(input)));
        analog.add_reference(InputValue::constant(1.0));
        analog.add_output(props.node(output));
        pid.config_mut().kp.push(InputValue::constant(1.0));
        pid
    }

    #[test]
    fn duplicate_names_rejected() {
        let props = PropertyTree::new();
        let mut ap = Autopilot::new("ap");
        ap.add(Box::new(p_controller(&props, "a", "/y", "/u")))
            .unwrap();
        let err = ap
            .add(Box::new(p_controller(&props, "a", "/y", "/v")))
            .unwrap_err();
        assert_eq!(err, ControlError::DuplicateComponent { name: "a".into() });
        assert_eq!(ap.len(), 1);
    }

    #[test]
    fn components_run_in_order() {
        let props = PropertyTree::new();
        let mut ap = Autopilot::new("ap");
        // Outer loop writes /mid, inner loop reads it within the same step.
        ap.add(Box::new(p_controller(&props, "outer", "/y", "/mid")))
            .unwrap();
        ap.add(Box::new(p_controller(&props, "inner", "/mid", "/u")))
            .unwrap();
        assert_eq!(ap.names().collect::<Vec<_>>(), vec!["outer", "inner"]);

        ap.update(0.1);
        assert_eq!(props.get("/mid"), Some(1.0));
        // inner error = 1 - 1 = 0
        assert_eq!(props.get("/u"), Some(0.0));
        assert!(ap.component("inner").is_some_and(|c| c.is_enabled()));
    }
}
