use ap_controls::{
    Component, InputValue, LiveValue, PidController, PidTerms, PropertyTree,
};
use proptest::prelude::*;

const EPS: f64 = 1e-9;

/// PID wired to `/y` (measurement), `/r` (setpoint) and `/u` (output).
fn wired(props: &PropertyTree, kp: f64, ti: f64, td: f64) -> PidController {
    let mut pid = PidController::new("pid");
    let analog = pid.analog_mut();
    analog.add_input(InputValue::property(props.node("/y")));
    analog.add_reference(InputValue::property(props.node("/r")));
    analog.add_output(props.node("/u"));
    let config = pid.config_mut();
    config.kp.push(InputValue::constant(kp));
    config.ti.push(InputValue::constant(ti));
    config.td.push(InputValue::constant(td));
    pid
}

fn output(props: &PropertyTree) -> f64 {
    props.get_or("/u", 0.0)
}

/// Equal within `EPS`, relative once the magnitudes exceed one.
fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= EPS * a.abs().max(b.abs()).max(1.0)
}

#[test]
fn pure_p_step_response() {
    let props = PropertyTree::new();
    let mut pid = wired(&props, 1.0, 0.0, 0.0);
    pid.update(true, 0.0);

    props.set("/r", 10.0);
    pid.update(false, 0.05);
    assert_eq!(pid.state().last_increment, 10.0);
    assert_eq!(output(&props), 10.0);
}

#[test]
fn pure_p_step_is_clamped() {
    let props = PropertyTree::new();
    let mut pid = wired(&props, 1.0, 0.0, 0.0);
    pid.analog_mut().add_max(InputValue::constant(4.0));
    pid.analog_mut().add_min(InputValue::constant(-4.0));
    props.set("/r", 10.0);
    pid.update(true, 0.05);
    assert_eq!(output(&props), 4.0);

    props.set("/r", -10.0);
    pid.update(false, 0.05);
    assert_eq!(output(&props), -4.0);
}

#[test]
fn anti_windup_recovers_immediately() {
    let props = PropertyTree::new();
    let mut pid = wired(&props, 2.0, 0.5, 0.0);
    pid.analog_mut().add_max(InputValue::constant(5.0));
    props.set("/r", 100.0);

    pid.update(true, 0.1);
    for _ in 0..200 {
        pid.update(false, 0.1);
        assert!(output(&props) <= 5.0);
    }
    assert_eq!(output(&props), 5.0);
    // The integral keeps accumulating in the diagnostics only.
    assert!(pid.terms().i > 5.0);

    // Measurement overshoots: the required increment turns negative and is
    // applied on the very next sample.
    props.set("/y", 101.0);
    pid.update(false, 0.1);
    assert!(output(&props) < 5.0);
    assert!(pid.state().last_increment < 0.0);
}

#[test]
fn integral_disabled_never_drifts() {
    let props = PropertyTree::new();
    let mut pid = wired(&props, 1.5, 0.0, 0.0);
    props.set("/r", 3.0);
    pid.update(true, 0.02);
    let after_step = output(&props);
    for _ in 0..500 {
        pid.update(false, 0.02);
        assert_eq!(pid.terms().i, 0.0);
    }
    assert_eq!(output(&props), after_step);
}

#[test]
fn sub_interval_ticks_fold_into_one_sample() {
    let props = PropertyTree::new();
    let mut pid = wired(&props, 1.0, 1.0, 0.0);
    pid.set_sample_interval(0.1).unwrap();
    // beta = 0 isolates the integral term: ΔI = Kp * Ts / Ti * e.
    pid.config_mut().beta = 0.0;
    props.set("/r", 1.0);

    pid.update(true, 0.03);
    pid.update(false, 0.03);
    pid.update(false, 0.03);
    assert_eq!(pid.terms(), PidTerms::default());
    assert_eq!(output(&props), 0.0);

    pid.update(false, 0.03);
    assert!((pid.terms().i - 0.12).abs() < EPS);
    assert!((output(&props) - 0.12).abs() < EPS);
    assert_eq!(pid.accumulated_time(), 0.0);
}

#[test]
fn shadowed_enable_starts_without_error() {
    let props = PropertyTree::new();
    let mut pid = wired(&props, 1.0, 2.0, 0.0);
    pid.analog_mut().set_shadow(true);
    props.set("/r", 42.0);

    for step in 0..20 {
        props.set("/y", f64::from(step) * 0.7);
        props.set("/u", f64::from(step) * -0.1);
        pid.disabled(0.02);
    }
    let held = output(&props);
    pid.update(true, 0.02);
    assert_eq!(pid.state().previous_weighted_error, 0.0);
    assert_eq!(pid.state().last_error, 0.0);
    assert!(close(output(&props), held));
}

#[test]
fn gains_are_read_live() {
    let props = PropertyTree::new();
    let mut pid = wired(&props, 0.0, 0.0, 0.0);
    let kp = props.node("/gains/kp");
    pid.config_mut().kp.push(InputValue::property(kp.clone()));
    kp.set(0.5);
    assert_eq!(pid.config().kp.read(), 0.5);

    props.set("/r", 4.0);
    pid.update(true, 0.1);
    assert_eq!(output(&props), 2.0);
}

#[test]
fn scheduler_tick_drives_enable_edges() {
    let props = PropertyTree::new();
    let mut pid = wired(&props, 1.0, 0.0, 0.0);
    pid.core_mut().set_enable_property(props.node("/locks/on"), None);
    pid.analog_mut().set_shadow(true);

    props.set("/y", 2.0);
    props.set("/u", 7.0);
    pid.tick(0.1);
    assert!(!pid.is_enabled());
    assert_eq!(pid.state().previous_output, 7.0);

    props.set_bool("/locks/on", true);
    props.set("/r", 5.0);
    pid.tick(0.1);
    assert!(pid.is_enabled());
    assert_eq!(output(&props), 7.0);

    pid.tick(0.1);
    assert_eq!(output(&props), 10.0);
}

proptest! {
    #[test]
    fn enable_is_bumpless(
        prior in -1.0e3_f64..1.0e3,
        setpoint in -1.0e3_f64..1.0e3,
        kp in 0.0_f64..10.0,
        ts in 0.01_f64..1.0,
        frac in 0.0_f64..1.0,
    ) {
        let props = PropertyTree::new();
        let mut pid = wired(&props, kp, 1.0, 0.2);
        pid.set_sample_interval(ts).unwrap();
        props.set("/u", prior);
        props.set("/r", setpoint);

        pid.update(true, ts * frac);
        prop_assert!(close(output(&props), prior));
    }

    #[test]
    fn output_stays_within_bounds(
        kp in 0.0_f64..20.0,
        ti in -1.0_f64..5.0,
        td in -1.0_f64..2.0,
        setpoints in prop::collection::vec(-100.0_f64..100.0, 1..60),
        dt in 0.001_f64..0.5,
    ) {
        let props = PropertyTree::new();
        let mut pid = wired(&props, kp, ti, td);
        pid.analog_mut().add_min(InputValue::constant(-5.0));
        pid.analog_mut().add_max(InputValue::constant(5.0));

        let mut first = true;
        for r in setpoints {
            props.set("/r", r);
            pid.update(first, dt);
            first = false;
            let u = output(&props);
            prop_assert!((-5.0..=5.0).contains(&u), "output {u} out of bounds");
        }
    }

    #[test]
    fn aggregated_interval_is_sum_of_ticks(
        ticks in prop::collection::vec(0.001_f64..0.05, 1..10),
    ) {
        let total: f64 = ticks.iter().sum();
        let props = PropertyTree::new();
        let mut pid = wired(&props, 1.0, 1.0, 0.0);
        pid.config_mut().beta = 0.0;
        // Strictly below the summed time so the last tick releases the sample.
        pid.set_sample_interval(total - ticks[ticks.len() - 1] * 0.5).unwrap();
        props.set("/r", 1.0);

        let mut first = true;
        for dt in &ticks {
            pid.update(first, *dt);
            first = false;
        }
        prop_assert!((pid.terms().i - total).abs() < 1e-9);
    }
}
