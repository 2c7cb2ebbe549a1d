//! Incremental-form PID controller.
//!
//! Each sample computes an output increment and adds it to the previous
//! output:
//!
//! ```text
//! Δu_n = Kp * [ (ep_n - ep_n-1)
//!             + (Ts/Ti) * e_n
//!             + (Td/Ts) * (edf_n - 2*edf_n-1 + edf_n-2) ]
//! u_n  = u_n-1 + Δu_n
//! ```
//!
//! where
//! - `ep = beta*r - y` is the reference-weighted proportional error,
//! - `e = r - y` is the plain error driving the integral term,
//! - `edf` is the weighted derivative error `ed = gamma*r - y` passed through
//!   a first-order low-pass with time constant `Tf = alpha*Td`:
//!   `edf_n = edf_n-1 / (Ts/Tf + 1) + ed_n * (Ts/Tf) / (Ts/Tf + 1)`.
//!
//! `Ti <= 0` removes the integral term and `Td <= 0` the derivative term.
//! Windup is prevented by clamping the increment so that `u_n` never leaves
//! `[u_min, u_max]`; increments back towards the range are never blocked.
//!
//! Entering the enabled state re-seeds `u_n-1` from the output property, so
//! enabling never makes the output jump. With `shadow` set, the controller
//! also tracks the measurement and the external output while disabled.

use ap_core::is_usable_interval;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::analog::AnalogCore;
use crate::component::{Component, ComponentCore};
use crate::config::{self, ConfigEntry, ConfigNode};
use crate::error::{ControlError, ControlResult};
use crate::props::{PropertyNode, PropertyTree};
use crate::sampled::SampleAccumulator;
use crate::value::{InputValue, InputValueList, LiveValue};

/// Where accumulated terms are published when `show-terms` is set.
pub const TERMS_ROOT: &str = "/systems/tune/pid";

/// Tuning of a PID controller.
#[derive(Debug, Clone)]
pub struct PidConfig {
    /// Proportional gain.
    pub kp: InputValueList,
    /// Integral time (seconds). `<= 0` disables the integral term.
    pub ti: InputValueList,
    /// Derivative time (seconds). `<= 0` disables the derivative term.
    pub td: InputValueList,
    /// Setpoint weight in the proportional error.
    pub beta: f64,
    /// Derivative filter time as a fraction of `Td`.
    pub alpha: f64,
    /// Setpoint weight in the derivative error.
    pub gamma: f64,
}

impl Default for PidConfig {
    fn default() -> Self {
        Self {
            kp: InputValueList::new(),
            ti: InputValueList::new(),
            td: InputValueList::new(),
            beta: 1.0,
            alpha: 0.1,
            gamma: 0.0,
        }
    }
}

/// Running totals of each term's contribution since the last enable.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PidTerms {
    pub p: f64,
    pub i: f64,
    pub d: f64,
}

/// Memory carried between samples.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PidState {
    /// `ep_n-1`, the last reference-weighted proportional error.
    pub previous_weighted_error: f64,
    /// Last unweighted error `e = r - y`.
    pub last_error: f64,
    /// `edf_n-1`.
    pub filtered_derivative_error_n1: f64,
    /// `edf_n-2`.
    pub filtered_derivative_error_n2: f64,
    /// `u_n-1`, seeds the next increment.
    pub previous_output: f64,
    /// Working output `u_n`, written on every executed tick.
    pub output: f64,
    /// Last applied (post-clamp) increment.
    pub last_increment: f64,
    pub last_setpoint: f64,
    pub last_measurement: f64,
    pub terms: PidTerms,
}

/// Incremental PID controller component.
#[derive(Debug, Clone)]
pub struct PidController {
    analog: AnalogCore,
    config: PidConfig,
    sampler: SampleAccumulator,
    state: PidState,
    terms_nodes: Option<[PropertyNode; 3]>,
    /// Set on a shadowed enable: the next sample uses `r = y`.
    shadow_seed_pending: bool,
}

impl PidController {
    /// Type name used in configuration files and the registry.
    pub const TYPE_NAME: &'static str = "pid-controller";

    pub fn new(name: impl Into<String>) -> Self {
        Self {
            analog: AnalogCore::new(name),
            config: PidConfig::default(),
            sampler: SampleAccumulator::default(),
            state: PidState::default(),
            terms_nodes: None,
            shadow_seed_pending: false,
        }
    }

    /// Build a controller from an ordered list of configuration entries.
    pub fn from_entries(
        name: impl Into<String>,
        entries: &[ConfigEntry],
        props: &PropertyTree,
    ) -> ControlResult<Self> {
        let mut pid = Self::new(name);
        for (key, node) in entries {
            pid.configure(key, node, props)?;
        }
        pid.finish_configuration(props)?;
        Ok(pid)
    }

    /// Bind one configuration entry.
    ///
    /// PID keys are handled here; anything else goes to the analog and
    /// common component layers. A key nobody recognises is an error.
    pub fn configure(
        &mut self,
        key: &str,
        node: &ConfigNode,
        props: &PropertyTree,
    ) -> ControlResult<()> {
        let name = self.analog.core().name().to_string();
        match key {
            "config" => {
                for (child_key, child) in config::entries_of(node, &name)? {
                    self.configure(&child_key, &child, props)?;
                }
            }
            "Ts" => {
                let ts = config::as_f64(node, &name, key)?;
                self.sampler
                    .set_desired_interval(ts)
                    .map_err(|e| ControlError::config(&name, e.to_string()))?;
            }
            "Kp" => self.config.kp.push(InputValue::from_config(node, props, &name)?),
            "Ti" => self.config.ti.push(InputValue::from_config(node, props, &name)?),
            "Td" => self.config.td.push(InputValue::from_config(node, props, &name)?),
            "beta" => self.config.beta = config::as_f64(node, &name, key)?,
            "alpha" => self.config.alpha = config::as_f64(node, &name, key)?,
            "gamma" => self.config.gamma = config::as_f64(node, &name, key)?,
            _ => {
                if !self.analog.configure(key, node, props)? {
                    return Err(ControlError::config(
                        &name,
                        format!("unknown configuration entry '{key}'"),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Validate the bound configuration and prepare diagnostics.
    pub fn finish_configuration(&mut self, props: &PropertyTree) -> ControlResult<()> {
        let name = self.analog.core().name().to_string();
        if !(self.config.alpha > 0.0) {
            return Err(ControlError::config(&name, "alpha must be positive"));
        }
        if self.config.kp.is_empty() {
            warn!(component = %name, "no Kp configured, controller output will not move");
        }
        if !self.analog.has_input() || !self.analog.has_reference() {
            warn!(component = %name, "input or reference missing, reading 0.0");
        }
        if self.analog.outputs().is_empty() {
            warn!(component = %name, "no output configured");
        }
        self.terms_nodes = self.analog.show_terms().then(|| {
            [
                props.node(&format!("{TERMS_ROOT}/P-Term")),
                props.node(&format!("{TERMS_ROOT}/I-Term")),
                props.node(&format!("{TERMS_ROOT}/D-Term")),
            ]
        });
        Ok(())
    }

    pub fn analog(&self) -> &AnalogCore {
        &self.analog
    }

    pub fn analog_mut(&mut self) -> &mut AnalogCore {
        &mut self.analog
    }

    pub fn config(&self) -> &PidConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut PidConfig {
        &mut self.config
    }

    pub fn state(&self) -> &PidState {
        &self.state
    }

    /// Accumulated term contributions since the last enable.
    pub fn terms(&self) -> PidTerms {
        self.state.terms
    }

    /// Desired sample interval in seconds.
    pub fn sample_interval(&self) -> f64 {
        self.sampler.desired_interval()
    }

    pub fn set_sample_interval(&mut self, ts: f64) -> ControlResult<()> {
        self.sampler.set_desired_interval(ts)
    }

    /// Time accrued towards the next sample.
    pub fn accumulated_time(&self) -> f64 {
        self.sampler.elapsed()
    }

    fn enter(&mut self) {
        let state = &mut self.state;
        state.previous_weighted_error = 0.0;
        state.filtered_derivative_error_n1 = 0.0;
        state.filtered_derivative_error_n2 = 0.0;

        let current = self.analog.get_output_value();
        state.output = current;
        state.previous_output = current;

        if self.analog.shadow() {
            state.last_setpoint = state.last_measurement;
            self.shadow_seed_pending = true;
            if self.analog.core().debug() {
                debug!(
                    component = %self.analog.core().name(),
                    r = state.last_setpoint,
                    y = state.last_measurement,
                    u = state.previous_output,
                    "entering from shadow"
                );
            }
        }
        state.terms = PidTerms::default();
    }

    fn sample(&mut self, ts: f64, u_min: f64, u_max: f64) {
        let PidConfig {
            beta, alpha, gamma, ..
        } = self.config;

        let y = self.analog.measurement();
        let mut r = self.analog.setpoint();
        if std::mem::take(&mut self.shadow_seed_pending) {
            r = y;
        }
        let kp = self.config.kp.read();
        let state = &mut self.state;

        let ep = beta * r - y;
        let delta_p = kp * (ep - state.previous_weighted_error);

        let e = r - y;
        let ti = self.config.ti.read();
        let delta_i = if ti > 0.0 { kp * (ts / ti) * e } else { 0.0 };

        let td = self.config.td.read();
        let (edf, delta_d) = if td > 0.0 {
            let ed = gamma * r - y;
            let tf = alpha * td;
            let ratio = ts / tf;
            let edf = state.filtered_derivative_error_n1 / (ratio + 1.0)
                + ed * ratio / (ratio + 1.0);
            let delta_d = kp
                * (td / ts)
                * (edf - 2.0 * state.filtered_derivative_error_n1
                    + state.filtered_derivative_error_n2);
            (edf, delta_d)
        } else {
            state.filtered_derivative_error_n1 = 0.0;
            state.filtered_derivative_error_n2 = 0.0;
            (0.0, 0.0)
        };

        state.terms.p += delta_p;
        state.terms.i += delta_i;
        state.terms.d += delta_d;

        let mut delta_u = delta_p + delta_i + delta_d;
        let u_prev = state.previous_output;
        if delta_u > u_max - u_prev {
            delta_u = u_max - u_prev;
        } else if delta_u < u_min - u_prev {
            delta_u = u_min - u_prev;
        }

        let u = u_prev + delta_u;
        state.output = u;
        state.previous_output = u;
        state.last_increment = delta_u;
        state.previous_weighted_error = ep;
        state.last_error = e;
        state.filtered_derivative_error_n2 = state.filtered_derivative_error_n1;
        state.filtered_derivative_error_n1 = edf;
        state.last_setpoint = r;
        state.last_measurement = y;

        if let Some([p, i, d]) = &self.terms_nodes {
            p.set(state.terms.p);
            i.set(state.terms.i);
            d.set(state.terms.d);
        }

        if self.analog.core().debug() {
            debug!(
                component = %self.analog.core().name(),
                ts,
                r,
                y,
                e,
                p = state.terms.p,
                i = state.terms.i,
                d = state.terms.d,
                u,
                "pid sample"
            );
        }
    }
}

impl Component for PidController {
    fn core(&self) -> &ComponentCore {
        self.analog.core()
    }

    fn core_mut(&mut self) -> &mut ComponentCore {
        self.analog.core_mut()
    }

    fn update(&mut self, first_time: bool, dt: f64) {
        if first_time {
            self.enter();
        }

        let (u_min, u_max) = self.analog.output_bounds();

        let Some(ts) = self.sampler.accumulate(dt) else {
            trace!(
                component = %self.analog.core().name(),
                elapsed = self.sampler.elapsed(),
                "waiting for sample interval"
            );
            return;
        };

        if is_usable_interval(ts) {
            self.sample(ts, u_min, u_max);
        } else {
            trace!(
                component = %self.analog.core().name(),
                ts,
                "degenerate sample interval, holding output"
            );
        }
        self.analog.set_output_value(self.state.output);
    }

    fn disabled(&mut self, _dt: f64) {
        if !self.analog.shadow() {
            return;
        }
        let y = self.analog.measurement();
        self.state.last_measurement = y;
        self.state.last_setpoint = y;
        self.state.previous_output = self.analog.get_output_value();
        if self.analog.core().debug() {
            debug!(
                component = %self.analog.core().name(),
                r = y,
                y,
                u = self.state.previous_output,
                "shadowing"
            );
        }
    }
}
