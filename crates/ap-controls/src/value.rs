//! Live numeric sources.
//!
//! Gains, limits, setpoints and measurements are not fixed fields: each is a
//! [`LiveValue`] read afresh on every sample. Concrete sources are constants,
//! property references and computed expressions, optionally post-processed by
//! scale, offset, clamping and `abs`, and optionally gated by a condition.

use crate::condition::Condition;
use crate::config::{self, ConfigNode};
use crate::error::{ControlError, ControlResult};
use crate::props::{PropertyNode, PropertyTree};

/// A value that can be read at any time without side effects.
pub trait LiveValue {
    /// Current value.
    fn read(&self) -> f64;
}

impl LiveValue for f64 {
    fn read(&self) -> f64 {
        *self
    }
}

/// Computed live value over properties and constants.
#[derive(Debug, Clone)]
pub enum Expression {
    Value(f64),
    Property(PropertyNode),
    Sum(Vec<Expression>),
    /// First operand minus all the others.
    Difference(Vec<Expression>),
    Product(Vec<Expression>),
    /// Evaluates to 0.0 when the divisor is 0.0.
    Quotient(Box<Expression>, Box<Expression>),
    Abs(Box<Expression>),
    Min(Vec<Expression>),
    Max(Vec<Expression>),
    Clip {
        expression: Box<Expression>,
        min: f64,
        max: f64,
    },
}

impl Expression {
    /// Evaluate the expression.
    pub fn eval(&self) -> f64 {
        match self {
            Self::Value(v) => *v,
            Self::Property(node) => node.get(),
            Self::Sum(terms) => terms.iter().map(Expression::eval).sum(),
            Self::Difference(terms) => {
                let mut iter = terms.iter().map(Expression::eval);
                let first = iter.next().unwrap_or(0.0);
                iter.fold(first, |acc, v| acc - v)
            }
            Self::Product(terms) => terms.iter().map(Expression::eval).product(),
            Self::Quotient(num, den) => {
                let den = den.eval();
                if den == 0.0 { 0.0 } else { num.eval() / den }
            }
            Self::Abs(inner) => inner.eval().abs(),
            Self::Min(terms) => terms
                .iter()
                .map(Expression::eval)
                .fold(f64::INFINITY, f64::min),
            Self::Max(terms) => terms
                .iter()
                .map(Expression::eval)
                .fold(f64::NEG_INFINITY, f64::max),
            Self::Clip {
                expression,
                min,
                max,
            } => expression.eval().max(*min).min(*max),
        }
    }

    /// Bind an expression from configuration.
    ///
    /// Numbers are constants, strings starting with `/` are properties, and
    /// operators are single-key mappings such as `{sum: [...]}`.
    pub fn from_config(
        node: &ConfigNode,
        props: &PropertyTree,
        component: &str,
    ) -> ControlResult<Self> {
        match node {
            ConfigNode::Number(_) => Ok(Self::Value(config::as_f64(node, component, "value")?)),
            ConfigNode::String(s) if s.starts_with('/') => Ok(Self::Property(props.node(s))),
            _ => {
                let (op, arg) = config::single_entry(node).ok_or_else(|| {
                    ControlError::config(component, "expression must be a single-key mapping")
                })?;
                Self::operator(op, arg, props, component)
            }
        }
    }

    fn operator(
        op: &str,
        arg: &ConfigNode,
        props: &PropertyTree,
        component: &str,
    ) -> ControlResult<Self> {
        match op {
            "value" => Ok(Self::Value(config::as_f64(arg, component, op)?)),
            "property" => Ok(Self::Property(
                props.node(config::as_str(arg, component, op)?),
            )),
            "sum" => Ok(Self::Sum(Self::operands(arg, props, component, op)?)),
            "difference" => Ok(Self::Difference(Self::operands(arg, props, component, op)?)),
            "product" => Ok(Self::Product(Self::operands(arg, props, component, op)?)),
            "min" => Ok(Self::Min(Self::operands(arg, props, component, op)?)),
            "max" => Ok(Self::Max(Self::operands(arg, props, component, op)?)),
            "quotient" => {
                let mut operands = Self::operands(arg, props, component, op)?;
                if operands.len() != 2 {
                    return Err(ControlError::config(
                        component,
                        "'quotient' takes exactly two operands",
                    ));
                }
                let den = operands.pop().map(Box::new);
                let num = operands.pop().map(Box::new);
                match (num, den) {
                    (Some(num), Some(den)) => Ok(Self::Quotient(num, den)),
                    _ => Err(ControlError::config(component, "'quotient' is malformed")),
                }
            }
            "abs" => Ok(Self::Abs(Box::new(Self::from_config(arg, props, component)?))),
            "clip" => {
                let inner = arg.get("expression").ok_or_else(|| {
                    ControlError::config(component, "'clip' needs an expression")
                })?;
                let min = arg
                    .get("min")
                    .map(|v| config::as_f64(v, component, "min"))
                    .transpose()?
                    .unwrap_or(f64::NEG_INFINITY);
                let max = arg
                    .get("max")
                    .map(|v| config::as_f64(v, component, "max"))
                    .transpose()?
                    .unwrap_or(f64::INFINITY);
                Ok(Self::Clip {
                    expression: Box::new(Self::from_config(inner, props, component)?),
                    min,
                    max,
                })
            }
            other => Err(ControlError::config(
                component,
                format!("unknown expression operator '{other}'"),
            )),
        }
    }

    fn operands(
        arg: &ConfigNode,
        props: &PropertyTree,
        component: &str,
        op: &str,
    ) -> ControlResult<Vec<Self>> {
        match arg {
            ConfigNode::Sequence(items) if !items.is_empty() => items
                .iter()
                .map(|item| Self::from_config(item, props, component))
                .collect(),
            _ => Err(ControlError::config(
                component,
                format!("'{op}' expects a non-empty list of operands"),
            )),
        }
    }
}

impl LiveValue for Expression {
    fn read(&self) -> f64 {
        self.eval()
    }
}

#[derive(Debug, Clone)]
enum ValueSource {
    Constant(f64),
    Property(PropertyNode),
    Expression(Expression),
}

/// One live input: a source plus optional post-processing and gate.
///
/// Post-processing applies in order: `scale`, `offset`, `min`/`max`, `abs`.
#[derive(Debug, Clone)]
pub struct InputValue {
    source: ValueSource,
    scale: f64,
    offset: f64,
    min: Option<f64>,
    max: Option<f64>,
    abs: bool,
    condition: Option<Condition>,
}

impl InputValue {
    fn with_source(source: ValueSource) -> Self {
        Self {
            source,
            scale: 1.0,
            offset: 0.0,
            min: None,
            max: None,
            abs: false,
            condition: None,
        }
    }

    /// Constant input.
    pub fn constant(value: f64) -> Self {
        Self::with_source(ValueSource::Constant(value))
    }

    /// Input read from a property.
    pub fn property(node: PropertyNode) -> Self {
        Self::with_source(ValueSource::Property(node))
    }

    /// Input computed from an expression.
    pub fn expression(expression: Expression) -> Self {
        Self::with_source(ValueSource::Expression(expression))
    }

    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_offset(mut self, offset: f64) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_limits(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    pub fn with_abs(mut self, abs: bool) -> Self {
        self.abs = abs;
        self
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    /// Whether this input's condition currently holds (always, if it has none).
    pub fn is_active(&self) -> bool {
        self.condition.as_ref().is_none_or(Condition::test)
    }

    /// Bind an input from configuration.
    ///
    /// Accepted forms: a number (constant), a string starting with `/`
    /// (property), or a mapping with `value`, `property`, `expression`,
    /// `scale`, `offset`, `min`, `max`, `abs` and `condition` keys. When both
    /// `property` and `value` are given, `value` seeds the property if it does
    /// not exist yet.
    pub fn from_config(
        node: &ConfigNode,
        props: &PropertyTree,
        component: &str,
    ) -> ControlResult<Self> {
        match node {
            ConfigNode::Number(_) => Ok(Self::constant(config::as_f64(node, component, "value")?)),
            ConfigNode::String(s) if s.starts_with('/') => Ok(Self::property(props.node(s))),
            ConfigNode::String(s) => match s.trim().parse::<f64>() {
                Ok(value) if value.is_finite() => Ok(Self::constant(value)),
                _ => Err(ControlError::InputUnavailable {
                    what: format!("'{s}' in '{component}' is neither a number nor a property path"),
                }),
            },
            ConfigNode::Mapping(_) => Self::from_mapping(node, props, component),
            _ => Err(ControlError::config(
                component,
                "input value must be a number, a property path or a mapping",
            )),
        }
    }

    fn from_mapping(
        node: &ConfigNode,
        props: &PropertyTree,
        component: &str,
    ) -> ControlResult<Self> {
        let mut value = None;
        let mut property = None;
        let mut expression = None;
        let mut scale = 1.0;
        let mut offset = 0.0;
        let mut min = None;
        let mut max = None;
        let mut abs = false;
        let mut condition = None;

        for (key, child) in config::entries_of(node, component)? {
            match key.as_str() {
                "value" => value = Some(config::as_f64(&child, component, &key)?),
                "property" => property = Some(config::as_str(&child, component, &key)?.to_string()),
                "expression" => expression = Some(Expression::from_config(&child, props, component)?),
                "scale" => scale = config::as_f64(&child, component, &key)?,
                "offset" => offset = config::as_f64(&child, component, &key)?,
                "min" => min = Some(config::as_f64(&child, component, &key)?),
                "max" => max = Some(config::as_f64(&child, component, &key)?),
                "abs" => abs = config::as_bool(&child, component, &key)?,
                "condition" => condition = Some(Condition::from_config(&child, props, component)?),
                other => {
                    return Err(ControlError::config(
                        component,
                        format!("unknown input value key '{other}'"),
                    ));
                }
            }
        }

        let source = match (property, expression, value) {
            (Some(path), None, seed) => {
                let node = props.node(&path);
                if let Some(seed) = seed {
                    if !node.exists() {
                        node.set(seed);
                    }
                }
                ValueSource::Property(node)
            }
            (None, Some(expression), None) => ValueSource::Expression(expression),
            (None, None, Some(value)) => ValueSource::Constant(value),
            (None, None, None) => {
                return Err(ControlError::config(
                    component,
                    "input value needs a value, property or expression",
                ));
            }
            _ => {
                return Err(ControlError::config(
                    component,
                    "input value may use only one of property or expression",
                ));
            }
        };

        Ok(Self {
            source,
            scale,
            offset,
            min,
            max,
            abs,
            condition,
        })
    }
}

impl LiveValue for InputValue {
    fn read(&self) -> f64 {
        let raw = match &self.source {
            ValueSource::Constant(v) => *v,
            ValueSource::Property(node) => node.get(),
            ValueSource::Expression(expression) => expression.eval(),
        };
        let mut value = raw * self.scale + self.offset;
        if let Some(min) = self.min {
            value = value.max(min);
        }
        if let Some(max) = self.max {
            value = value.min(max);
        }
        if self.abs { value.abs() } else { value }
    }
}

/// Ordered list of alternative inputs for one quantity.
///
/// The most recently appended entry whose condition holds is the one read.
/// With no active entry the caller's default applies.
#[derive(Debug, Clone, Default)]
pub struct InputValueList {
    entries: Vec<InputValue>,
}

impl InputValueList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an alternative. It takes precedence over earlier ones while active.
    pub fn push(&mut self, input: InputValue) {
        self.entries.push(input);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The entry currently in effect.
    pub fn active(&self) -> Option<&InputValue> {
        self.entries.iter().rev().find(|e| e.is_active())
    }

    /// Read the active entry, or `default` if none is active.
    pub fn read_or(&self, default: f64) -> f64 {
        self.active().map_or(default, LiveValue::read)
    }
}

impl LiveValue for InputValueList {
    fn read(&self) -> f64 {
        self.read_or(0.0)
    }
}
