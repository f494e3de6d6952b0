//! End-to-end gesture sequences against a single navigator with an injected
//! clock.

use std::time::{Duration, Instant};

use hark_nav::{
    Direction, GestureNavigator, IndexChange, TRANSITION_LOCK, WHEEL_QUIET_PERIOD,
    WheelDisposition, WheelInput,
};

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

/// Touch from `from_y` to `to_y` with one intermediate move.
fn swipe(nav: &mut GestureNavigator, from_y: f64, to_y: f64, now: Instant) -> Option<IndexChange> {
    if !nav.touch_start(from_y, false, now) {
        return None;
    }
    nav.touch_move(f64::midpoint(from_y, to_y));
    nav.touch_move(to_y);
    nav.touch_end(now)
}

#[test]
fn swipe_up_moves_forward() {
    let t0 = Instant::now();
    let mut nav = GestureNavigator::new(4);

    let change = swipe(&mut nav, 600.0, 520.0, t0);

    assert_eq!(
        change,
        Some(IndexChange {
            from: 0,
            to: 1,
            direction: Direction::Forward,
        })
    );
    assert!(nav.is_transitioning(t0 + ms(10)));
}

#[test]
fn swipe_down_moves_backward() {
    let t0 = Instant::now();
    let mut nav = GestureNavigator::new(4);
    swipe(&mut nav, 600.0, 500.0, t0);

    let t1 = t0 + TRANSITION_LOCK;
    let change = swipe(&mut nav, 300.0, 400.0, t1);

    assert_eq!(change.map(|c| c.direction), Some(Direction::Backward));
    assert_eq!(nav.current_index(), 0);
}

#[test]
fn short_drag_is_not_a_swipe() {
    let t0 = Instant::now();
    let mut nav = GestureNavigator::new(4);
    assert_eq!(swipe(&mut nav, 600.0, 560.0, t0), None);
    assert_eq!(nav.current_index(), 0);
    assert!(!nav.is_transitioning(t0));
}

#[test]
fn rapid_swipes_during_transition_move_one_card() {
    let t0 = Instant::now();
    let mut nav = GestureNavigator::new(5);

    assert!(swipe(&mut nav, 700.0, 620.0, t0).is_some());

    // Second 80 px swipe lands while the first transition is still running.
    let t1 = t0 + ms(200);
    assert!(nav.is_transitioning(t1));
    assert_eq!(swipe(&mut nav, 700.0, 620.0, t1), None);

    assert_eq!(nav.current_index(), 1);
}

#[test]
fn touch_that_ends_during_transition_is_dropped() {
    let t0 = Instant::now();
    let mut nav = GestureNavigator::new(5);

    assert!(nav.touch_start(700.0, false, t0));
    nav.touch_move(600.0);
    assert!(nav.advance(Direction::Forward, t0 + ms(5)).is_some());
    assert_eq!(nav.touch_end(t0 + ms(10)), None);
    assert_eq!(nav.current_index(), 1);
}

#[test]
fn trackpad_burst_advances_once_after_quiet_period() {
    let t0 = Instant::now();
    let mut nav = GestureNavigator::new(5);

    for (offset, dy) in [(0, 10.0), (60, 12.0), (120, 15.0)] {
        assert_eq!(
            nav.wheel(WheelInput::new(dy), t0 + ms(offset)),
            WheelDisposition::Captured
        );
    }
    let last = t0 + ms(120);

    // Not yet quiet.
    assert_eq!(nav.poll(last + ms(100)), None);
    assert_eq!(nav.next_deadline(), Some(last + WHEEL_QUIET_PERIOD));

    let change = nav.poll(last + WHEEL_QUIET_PERIOD);
    assert_eq!(
        change,
        Some(IndexChange {
            from: 0,
            to: 1,
            direction: Direction::Forward,
        })
    );

    // Nothing further from the same burst.
    assert_eq!(nav.poll(last + WHEEL_QUIET_PERIOD + ms(1)), None);
    assert_eq!(nav.poll(last + TRANSITION_LOCK + ms(200)), None);
    assert_eq!(nav.current_index(), 1);
}

#[test]
fn small_burst_below_threshold_does_nothing() {
    let t0 = Instant::now();
    let mut nav = GestureNavigator::new(5);
    nav.wheel(WheelInput::new(10.0), t0);
    nav.wheel(WheelInput::new(12.0), t0 + ms(50));

    assert_eq!(nav.poll(t0 + ms(300)), None);
    assert_eq!(nav.current_index(), 0);
}

#[test]
fn stale_window_does_not_carry_into_next_burst() {
    let t0 = Instant::now();
    let mut nav = GestureNavigator::new(5);
    nav.wheel(WheelInput::new(25.0), t0);
    // Second event after the accumulation window lapsed but before the
    // quiet period was polled.
    nav.wheel(WheelInput::new(10.0), t0 + ms(320));

    assert_eq!(nav.poll(t0 + ms(320) + WHEEL_QUIET_PERIOD), None);
    assert_eq!(nav.current_index(), 0);
}

#[test]
fn scroll_up_burst_moves_backward() {
    let t0 = Instant::now();
    let mut nav = GestureNavigator::new(5);
    nav.advance(Direction::Forward, t0);

    let t1 = t0 + TRANSITION_LOCK;
    nav.wheel(WheelInput::new(-20.0), t1);
    nav.wheel(WheelInput::new(-20.0), t1 + ms(30));

    let change = nav.poll(t1 + ms(30) + WHEEL_QUIET_PERIOD);
    assert_eq!(change.map(|c| c.to), Some(0));
}

#[test]
fn wheel_during_transition_is_ignored() {
    let t0 = Instant::now();
    let mut nav = GestureNavigator::new(5);
    nav.advance(Direction::Forward, t0);

    assert_eq!(
        nav.wheel(WheelInput::new(40.0), t0 + ms(100)),
        WheelDisposition::Ignored
    );
    assert_eq!(nav.poll(t0 + ms(400)), None);
    assert_eq!(nav.current_index(), 1);
}

#[test]
fn edges_do_not_wrap() {
    let t0 = Instant::now();
    let mut nav = GestureNavigator::new(2);

    assert_eq!(swipe(&mut nav, 300.0, 400.0, t0), None);
    assert!(swipe(&mut nav, 400.0, 300.0, t0).is_some());

    let t1 = t0 + TRANSITION_LOCK;
    assert_eq!(swipe(&mut nav, 400.0, 300.0, t1), None);
    assert_eq!(nav.current_index(), 1);
}

#[test]
fn navigators_are_independent() {
    let t0 = Instant::now();
    let mut a = GestureNavigator::new(3);
    let mut b = GestureNavigator::new(3);

    a.wheel(WheelInput::new(20.0), t0);
    b.wheel(WheelInput::new(20.0), t0);
    a.wheel(WheelInput::new(20.0), t0 + ms(10));

    assert!(a.poll(t0 + ms(10) + WHEEL_QUIET_PERIOD).is_some());
    assert_eq!(b.poll(t0 + ms(10) + WHEEL_QUIET_PERIOD), None);
}
