use super::*;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Channel {
    Edit,
    Resize,
}

#[test]
fn burst_of_triggers_fires_once_from_the_last_one() {
    let t0 = Instant::now();
    let mut d = Debouncer::new(Duration::from_millis(1500));
    for i in 0..5u64 {
        d.schedule(Channel::Edit, i, t0 + Duration::from_millis(i * 300));
    }

    // 1500ms after the first trigger is still inside the quiet period of the last one.
    assert!(d.take_due(t0 + Duration::from_millis(1500)).is_empty());
    assert!(d.take_due(t0 + Duration::from_millis(2699)).is_empty());

    let fired = d.take_due(t0 + Duration::from_millis(2700));
    assert_eq!(fired, vec![(Channel::Edit, 4)]);
    assert!(d.take_due(t0 + Duration::from_secs(10)).is_empty());
}

#[test]
fn superseded_arm_never_fires() {
    let t0 = Instant::now();
    let mut d = Debouncer::new(Duration::from_millis(100));
    let first = d.schedule(Channel::Edit, "a", t0);
    let second = d.schedule(Channel::Edit, "b", t0 + Duration::from_millis(50));

    assert_eq!(d.fire(&Channel::Edit, first), None);
    assert_eq!(d.fire(&Channel::Edit, second), Some("b"));
    assert_eq!(d.fire(&Channel::Edit, second), None);
}

#[test]
fn channels_are_independent() {
    let t0 = Instant::now();
    let mut d = Debouncer::new(Duration::from_millis(100));
    d.schedule(Channel::Edit, 1, t0);
    d.schedule_after(Channel::Resize, 2, t0, Duration::from_millis(30));

    assert_eq!(d.next_deadline(), Some(t0 + Duration::from_millis(30)));
    assert_eq!(
        d.take_due(t0 + Duration::from_millis(200)),
        vec![(Channel::Resize, 2), (Channel::Edit, 1)]
    );
}

#[test]
fn cancel_drops_the_pending_trigger() {
    let t0 = Instant::now();
    let mut d = Debouncer::new(Duration::from_millis(100));
    d.schedule(Channel::Edit, 1, t0);
    assert!(d.is_pending(&Channel::Edit));
    assert_eq!(d.cancel(&Channel::Edit), Some(1));
    assert!(d.take_due(t0 + Duration::from_secs(1)).is_empty());
    assert_eq!(d.next_deadline(), None);
}

#[test]
fn status_line_show_cancels_previous_clear() {
    let t0 = Instant::now();
    let mut s = StatusLine::new();
    s.show("rendering...", None, t0);
    assert!(!s.tick(t0 + Duration::from_secs(60)));
    assert_eq!(s.text(), "rendering...");

    s.show("error", Some(Duration::from_millis(500)), t0);
    s.show("done", Some(Duration::from_millis(500)), t0 + Duration::from_millis(400));
    assert!(!s.tick(t0 + Duration::from_millis(600)));
    assert_eq!(s.text(), "done");
    assert!(s.tick(t0 + Duration::from_millis(900)));
    assert_eq!(s.text(), "");
}
