//! Autopilot control components.
//!
//! Components read live values from a shared [`PropertyTree`], run one step
//! per scheduler tick, and write their outputs back to the tree.
//!
//! # Architecture
//!
//! - [`PropertyTree`] holds every live value as an `f64` keyed by path
//! - [`InputValue`] binds a gain, setpoint or limit to a constant, a
//!   property or an [`Expression`], optionally gated by a [`Condition`]
//! - [`Component`] is the scheduler-facing trait; [`ComponentCore`] carries
//!   the enable gate and [`AnalogCore`] the input/output plumbing
//! - [`PidController`] is an incremental-form PID with reference weighting,
//!   a filtered derivative, increment clamping and bumpless transfer
//! - [`ComponentRegistry`] builds components by type name and [`Autopilot`]
//!   ticks them in order

pub mod analog;
pub mod autopilot;
pub mod component;
pub mod condition;
pub mod config;
pub mod error;
pub mod pid;
pub mod props;
pub mod registry;
pub mod sampled;
pub mod value;

pub use analog::{AnalogCore, OutputSink, Periodical, PropertyOutputs};
pub use autopilot::Autopilot;
pub use component::{Component, ComponentCore};
pub use condition::Condition;
pub use config::{ConfigEntry, ConfigNode, entries_of};
pub use error::{ControlError, ControlResult};
pub use pid::{PidConfig, PidController, PidState, PidTerms, TERMS_ROOT};
pub use props::{PropertyNode, PropertyTree, normalize_path};
pub use registry::{ComponentFactory, ComponentRegistry};
pub use sampled::SampleAccumulator;
pub use value::{Expression, InputValue, InputValueList, LiveValue};
