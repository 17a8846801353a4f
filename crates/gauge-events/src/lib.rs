//! The event log: the time-ordered sequence of momentum activation and
//! deactivation timestamps that the determination algorithm walks.

use gauge_momentum::Momentum;

/// Whether a momentum is starting or stopping to contribute its velocity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Add,
    Remove,
}

/// One entry of the event log. A `change` of `None` marks one of the two
/// bracketing sentinels (the base time, and `+inf`).
#[derive(Debug, Clone, Copy)]
pub struct Event {
    pub time: f64,
    pub change: Option<(EventKind, Momentum)>,
}

/// Builds the sorted event log for `momenta`, bracketed by a leading
/// sentinel at `base_time` and a trailing sentinel at `+inf`.
///
/// A momentum whose `until` is `+inf` contributes only an `Add` event: it
/// never expires, so no `Remove` is ever needed.
pub fn build_log(base_time: f64, momenta: &[Momentum]) -> Vec<Event> {
    let mut events = Vec::with_capacity(momenta.len() * 2 + 2);
    events.push(Event {
        time: base_time,
        change: None,
    });
    for momentum in momenta {
        events.push(Event {
            time: momentum.since,
            change: Some((EventKind::Add, *momentum)),
        });
        if momentum.until != f64::INFINITY {
            events.push(Event {
                time: momentum.until,
                change: Some((EventKind::Remove, *momentum)),
            });
        }
    }
    events.push(Event {
        time: f64::INFINITY,
        change: None,
    });
    events.sort_by(|a, b| a.time.total_cmp(&b.time));
    events
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brackets_with_sentinels() {
        let m = Momentum::new(1.0, 1.0, 6.0).unwrap();
        let log = build_log(0.0, &[m]);
        assert_eq!(log.first().unwrap().time, 0.0);
        assert!(log.first().unwrap().change.is_none());
        assert_eq!(log.last().unwrap().time, f64::INFINITY);
        assert!(log.last().unwrap().change.is_none());
    }

    #[test]
    fn permanent_momentum_has_no_remove_event() {
        let m = Momentum::permanent(1.0);
        let log = build_log(0.0, &[m]);
        let removes = log
            .iter()
            .filter(|e| matches!(e.change, Some((EventKind::Remove, _))))
            .count();
        assert_eq!(removes, 0);
    }

    #[test]
    fn events_are_time_sorted() {
        let a = Momentum::new(1.0, 3.0, 8.0).unwrap();
        let b = Momentum::new(-1.0, 1.0, 6.0).unwrap();
        let log = build_log(0.0, &[a, b]);
        let times: Vec<f64> = log.iter().map(|e| e.time).collect();
        let mut sorted = times.clone();
        sorted.sort_by(|x, y| x.total_cmp(y));
        assert_eq!(times, sorted);
    }
}
