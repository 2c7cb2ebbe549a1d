//! Fixed-step replay of a configuration's scenario.
//!
//! The autopilot has no plant model of its own: measurements change only
//! through scenario events. A run seeds the property tree, then alternates
//! applying due events and ticking the autopilot, recording the traced
//! properties after every step.

use std::time::Instant;

use ap_config::{AutopilotConfig, EventDef};
use ap_controls::{ComponentRegistry, PropertyTree};
use serde::Serialize;

use crate::compile::compile;
use crate::error::{AppError, AppResult};

/// Slack when comparing event times against accumulated step times.
const EVENT_TIME_EPS: f64 = 1e-9;

/// One recorded step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraceRow {
    pub time_s: f64,
    /// Values in the order of [`RunResult::columns`].
    pub values: Vec<f64>,
}

/// Recorded trace of a scenario run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunResult {
    pub name: String,
    /// Traced property paths.
    pub columns: Vec<String>,
    pub rows: Vec<TraceRow>,
    pub steps: usize,
    pub wall_time_s: f64,
}

impl RunResult {
    /// `(time, value)` samples for one traced property.
    pub fn series(&self, property: &str) -> Option<Vec<(f64, f64)>> {
        let idx = self.columns.iter().position(|c| c == property)?;
        Some(
            self.rows
                .iter()
                .map(|row| (row.time_s, row.values[idx]))
                .collect(),
        )
    }

    /// Last recorded value of a traced property.
    pub fn final_value(&self, property: &str) -> Option<f64> {
        let idx = self.columns.iter().position(|c| c == property)?;
        self.rows.last().map(|row| row.values[idx])
    }

    /// CSV with a `time_s` column followed by one column per traced property.
    pub fn to_csv(&self) -> String {
        let mut csv = String::from("time_s");
        for column in &self.columns {
            csv.push(',');
            csv.push_str(column);
        }
        csv.push('\n');
        for row in &self.rows {
            csv.push_str(&format!("{}", row.time_s));
            for value in &row.values {
                csv.push_str(&format!(",{value}"));
            }
            csv.push('\n');
        }
        csv
    }
}

/// Whole steps of `dt` in `duration`, bounded by [`ap_config::MAX_SCENARIO_STEPS`].
fn step_count(duration: f64, dt: f64) -> AppResult<usize> {
    let steps = (duration / dt + EVENT_TIME_EPS).floor();
    if !steps.is_finite() || steps < 0.0 || steps > ap_config::MAX_SCENARIO_STEPS {
        return Err(AppError::InvalidInput(format!(
            "scenario needs {steps} steps of {dt} s, limit is {}",
            ap_config::MAX_SCENARIO_STEPS
        )));
    }
    Ok(steps as usize)
}

/// Run the configuration's scenario against a fresh property tree.
pub fn run_scenario(config: &AutopilotConfig, registry: &ComponentRegistry) -> AppResult<RunResult> {
    let scenario = config
        .scenario
        .as_ref()
        .ok_or_else(|| AppError::NoScenario(config.name.clone()))?;
    ap_config::validate_config(config)?;
    let started = Instant::now();

    let props = PropertyTree::new();
    for (path, value) in &scenario.initial {
        props.set(path, *value);
    }
    let mut autopilot = compile(config, registry, &props)?;

    let mut events: Vec<&EventDef> = scenario.events.iter().collect();
    events.sort_by(|a, b| a.time_s.total_cmp(&b.time_s));
    let mut pending = events.into_iter().peekable();

    let dt = scenario.dt_s;
    let steps = step_count(scenario.duration_s, dt)?;
    let columns = scenario.trace.clone();
    let record = |time_s: f64| TraceRow {
        time_s,
        values: columns.iter().map(|path| props.get_or(path, 0.0)).collect(),
    };

    tracing::info!(
        autopilot = %autopilot.name(),
        components = autopilot.len(),
        steps,
        dt,
        "starting scenario"
    );

    let mut rows = Vec::with_capacity(steps + 1);
    rows.push(record(0.0));
    for step in 0..steps {
        let t = step as f64 * dt;
        while let Some(event) = pending.next_if(|e| e.time_s <= t + EVENT_TIME_EPS) {
            tracing::debug!(t, property = %event.property, value = event.value, "event");
            props.set(&event.property, event.value);
        }
        autopilot.update(dt);
        rows.push(record((step + 1) as f64 * dt));
    }

    let wall_time_s = started.elapsed().as_secs_f64();
    tracing::info!(steps, wall_time_s, "scenario finished");

    Ok(RunResult {
        name: config.name.clone(),
        columns,
        rows,
        steps,
        wall_time_s,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_count_rounds_to_whole_steps() {
        assert_eq!(step_count(1.0, 0.1).unwrap(), 10);
        assert_eq!(step_count(0.0, 0.1).unwrap(), 0);
    }

    #[test]
    fn step_count_rejects_unbounded_runs() {
        assert!(matches!(step_count(1.0e300, 1.0e-300), Err(AppError::InvalidInput(_))));
        assert!(matches!(step_count(1.0e12, 1.0), Err(AppError::InvalidInput(_))));
        assert!(matches!(step_count(f64::INFINITY, 1.0), Err(AppError::InvalidInput(_))));
    }
}
