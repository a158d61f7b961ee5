use vizij_elemental_core::{AnimationConfig, AnimationState, Easing, Phase};

fn approx(a: f32, b: f32, eps: f32) {
    assert!((a - b).abs() <= eps, "left={a} right={b} eps={eps}");
}

fn linear(enter: f32, exit: f32) -> AnimationConfig {
    AnimationConfig {
        enter_duration: enter,
        exit_duration: exit,
        enter_easing: Easing::Linear,
        exit_easing: Easing::Linear,
        ..AnimationConfig::default()
    }
}

#[test]
fn full_lifecycle_with_hold_duration() {
    let cfg = AnimationConfig {
        hold_duration: Some(0.5),
        ..linear(0.5, 0.5)
    };
    let mut s = AnimationState::new(cfg, 0);
    let mut t = 0.0;
    let mut step = |s: &mut AnimationState| {
        t += 0.25;
        s.update(t, 0.25, None)
    };
    assert!(step(&mut s));
    assert_eq!(s.phase(), Phase::Entering);
    assert!(step(&mut s));
    approx(s.opacity(), 0.5, 1e-6);
    approx(s.scale_factor(), 0.8, 1e-6);
    assert!(step(&mut s));
    assert_eq!(s.phase(), Phase::Holding);
    assert_eq!(s.opacity(), 1.0);
    step(&mut s);
    step(&mut s);
    assert_eq!(s.phase(), Phase::Exiting);
    step(&mut s);
    approx(s.opacity(), 0.5, 1e-6);
    assert!(!step(&mut s));
    assert_eq!(s.phase(), Phase::Done);
    assert!(!step(&mut s));
}

#[test]
fn disappear_window_triggers_exit() {
    let cfg = AnimationConfig {
        disappear_at: Some(0.6),
        ..linear(0.1, 0.2)
    };
    let mut s = AnimationState::new(cfg, 0);
    s.update(0.0, 0.0, Some(0.0));
    s.update(0.1, 0.1, Some(0.2));
    s.update(0.2, 0.1, Some(0.4));
    assert_eq!(s.phase(), Phase::Holding);
    s.update(0.3, 0.1, Some(0.6));
    assert_eq!(s.phase(), Phase::Exiting);
}

#[test]
fn disappear_window_cuts_entering_short() {
    let cfg = AnimationConfig {
        disappear_at: Some(0.5),
        ..linear(1.0, 0.5)
    };
    let mut s = AnimationState::new(cfg, 0);
    s.update(0.0, 0.0, Some(0.1));
    assert_eq!(s.phase(), Phase::Entering);
    s.update(0.25, 0.25, Some(0.3));
    approx(s.opacity(), 0.25, 1e-6);

    s.update(0.5, 0.25, Some(0.6));
    assert_eq!(s.phase(), Phase::Exiting);
    approx(s.opacity(), 0.5, 1e-6);
    s.update(0.75, 0.25, Some(0.7));
    approx(s.opacity(), 0.25, 1e-6);
}

#[test]
fn trigger_exit_starts_from_current_opacity() {
    let mut s = AnimationState::new(linear(1.0, 1.0), 0);
    s.update(0.0, 0.0, None);
    s.update(0.5, 0.5, None);
    approx(s.opacity(), 0.5, 1e-6);
    s.trigger_exit();
    approx(s.opacity(), 0.5, 1e-6);
    s.update(1.0, 0.5, None);
    approx(s.opacity(), 0.25, 1e-6);
}

#[test]
fn target_opacity_is_respected() {
    let cfg = AnimationConfig {
        opacity: 0.4,
        ..linear(0.0, 0.5)
    };
    let mut s = AnimationState::new(cfg, 0);
    s.update(0.0, 0.0, None);
    s.update(0.01, 0.01, None);
    assert_eq!(s.phase(), Phase::Holding);
    approx(s.opacity(), 0.4, 1e-6);
}

#[test]
fn local_progress_without_window_is_identity() {
    let s = AnimationState::new(AnimationConfig::default(), 3);
    assert!(!s.has_window());
    approx(s.local_progress(0.3), 0.3, 1e-6);
}
