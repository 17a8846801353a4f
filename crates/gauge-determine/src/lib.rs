//! The determination algorithm.
//!
//! Given a base point, a set of momenta, and the ceiling/floor bounds, this
//! walks the time-ordered event log while simultaneously walking the two
//! boundary line streams, producing the sorted vertex list of the resulting
//! clamped trajectory. See the module-level invariants below; they are the
//! ones a change here must never violate.
//!
//! * The returned list is never empty and its first vertex time equals `base.0`.
//! * Vertex times are strictly increasing (equal adjacent times are dropped).
//! * The trajectory between consecutive vertices is exactly linear.
//!
//! This is a direct, line-by-line port of the reference algorithm; resist
//! the urge to "simplify" the control flow; the `again`/`overlapped` dance
//! encodes exact-tangency handling that's easy to regress silently.

use gauge_boundary::{Bound, Cursor, Polarity};
use gauge_events::{EventKind, build_log};
use gauge_line::Line;
use gauge_momentum::Momentum;

/// Computes the clamped trajectory's vertex list from `base` forward.
pub fn determine(base: (f64, f64), momenta: &[Momentum], max: &Bound, min: &Bound) -> Vec<(f64, f64)> {
    let (base_time, base_value) = base;
    let mut since = base_time;
    let mut value = base_value;
    let mut velocity = 0.0_f64;
    let mut velocities: Vec<f64> = Vec::new();

    let mut boundaries = vec![
        Cursor::new(Polarity::Ceiling, max, base_time),
        Cursor::new(Polarity::Floor, min, base_time),
    ];

    let mut bound: Option<usize> = None;
    let mut overlapped = false;

    for boundary in boundaries.iter_mut() {
        boundary.skip_to(since);
    }
    for i in 0..boundaries.len() {
        if bound.is_some() {
            continue;
        }
        let guessed = boundaries[i].line().guess(since);
        if boundaries[i].cmp(guessed, value) {
            bound = Some(i);
            overlapped = false;
        }
    }

    let mut raw: Vec<(f64, f64)> = Vec::new();
    let log = build_log(base_time, momenta);

    'events: for event in &log {
        let until = event.time.max(base_time);
        let mut again = true;

        loop {
            if !(since < until) {
                break;
            }

            let walked: Vec<usize> = if again {
                again = false;
                (0..boundaries.len()).collect()
            } else if boundaries.iter().all(|b| b.line().until() >= until) {
                break;
            } else {
                let chosen = (0..boundaries.len())
                    .min_by(|&a, &b| boundaries[a].line().until().total_cmp(&boundaries[b].line().until()))
                    .expect("at least one boundary");
                boundaries[chosen].walk();
                vec![chosen]
            };

            let net: f64 = velocities.iter().sum();
            velocity = match bound {
                None => net,
                Some(b) if overlapped => boundaries[b].best(net, boundaries[b].line().velocity()),
                Some(b) => velocities.iter().copied().filter(|&v| boundaries[b].cmp(v, 0.0)).sum(),
            };

            if overlapped {
                let b = bound.expect("overlapped implies bound is set");
                if boundaries[b].cmp(velocity, boundaries[b].line().velocity()) {
                    bound = None;
                    overlapped = false;
                    again = true;
                    continue;
                }
            }

            let current = Line::ray(since, until, value, velocity);

            if overlapped {
                let b = bound.expect("overlapped implies bound is set");
                let bound_until = boundaries[b].line().until().min(until);
                if bound_until == f64::INFINITY {
                    break;
                }
                since = bound_until;
                value = boundaries[b].line().get(bound_until);
                raw.push((since, value));
                continue;
            }

            let mut transitioned = false;
            for &bi in &walked {
                let boundary_line = *boundaries[bi].line();
                match current.intersect(&boundary_line) {
                    Ok((t, v)) if t != since => {
                        again = true;
                        bound = Some(bi);
                        overlapped = true;
                        since = t;
                        value = boundaries[bi].best(v, boundary_line.guess(t));
                        raw.push((since, value));
                        transitioned = true;
                        break;
                    }
                    _ => continue,
                }
            }
            if transitioned {
                continue;
            }
            if bound.is_some() {
                // already tracking a boundary from an earlier, overshot anchor;
                // no fresh crossing this pass, reassess from the top.
                continue;
            }

            let mut snapped = false;
            for &bi in &walked {
                let boundary_line = *boundaries[bi].line();
                let bound_until = boundary_line.until().min(until);
                if bound_until == f64::INFINITY || bound_until < since {
                    continue;
                }
                let boundary_value = boundary_line.get(bound_until);
                if boundaries[bi].cmp_eq(current.get(bound_until), boundary_value) {
                    continue;
                }
                bound = Some(bi);
                overlapped = true;
                since = bound_until;
                value = boundary_value;
                raw.push((since, value));
                snapped = true;
                break;
            }
            if snapped {
                continue;
            }

            // This pass's walked boundaries are safe out to their own
            // current line's end, but that can be short of `until` for a
            // multi-segment dynamic bound; loop back so the top-of-loop
            // "walk the boundary with the smallest `line().until()`"
            // branch can advance into its next segment and get re-checked,
            // rather than declaring the whole `[since, until)` span safe
            // on the strength of only its first segment.
        }

        if until == f64::INFINITY {
            break 'events;
        }
        value += velocity * (until - since);
        raw.push((until, value));

        if let Some((kind, momentum)) = event.change {
            match kind {
                EventKind::Add => velocities.push(momentum.velocity),
                EventKind::Remove => {
                    if let Some(pos) = velocities.iter().position(|&v| v == momentum.velocity) {
                        velocities.remove(pos);
                    }
                }
            }
        }
        since = until;
    }

    dedup(raw)
}

/// Drops consecutive vertices sharing a timestamp, keeping only the first of
/// each run, and strips a trailing vertex at `+inf` if one ever appears.
fn dedup(raw: Vec<(f64, f64)>) -> Vec<(f64, f64)> {
    let mut out: Vec<(f64, f64)> = Vec::with_capacity(raw.len());
    for (t, v) in raw {
        if t == f64::INFINITY {
            continue;
        }
        if out.last().is_some_and(|last| last.0 == t) {
            continue;
        }
        out.push((t, v));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(velocity: f64, since: f64, until: f64) -> Momentum {
        Momentum::new(velocity, since, until).unwrap()
    }

    fn round(det: &[(f64, f64)]) -> Vec<(i64, i64)> {
        det.iter().map(|&(t, v)| (t.round() as i64, v.round() as i64)).collect()
    }

    #[test]
    fn scenario_a_in_range() {
        let max = Bound::Scalar(100.0);
        let min = Bound::Scalar(0.0);
        let momenta = vec![m(1.0, 1.0, 6.0), m(-1.0, 3.0, 8.0)];
        let det = determine((0.0, 12.0), &momenta, &max, &min);
        assert_eq!(
            round(&det),
            vec![(0, 12), (1, 12), (3, 14), (6, 14), (8, 12)]
        );
    }

    #[test]
    fn scenario_b_over_max() {
        let max = Bound::Scalar(10.0);
        let min = Bound::Scalar(0.0);
        let momenta = vec![m(1.0, 0.0, 4.0)];
        let det = determine((0.0, 8.0), &momenta, &max, &min);
        assert_eq!(round(&det), vec![(0, 8), (2, 10), (4, 10)]);
    }

    #[test]
    fn scenario_c_overshoot_at_anchor() {
        let max = Bound::Scalar(10.0);
        let min = Bound::Scalar(0.0);
        let momenta = vec![m(1.0, 0.0, 4.0), m(-2.0, 0.0, 4.0)];
        let det = determine((0.0, 12.0), &momenta, &max, &min);
        assert_eq!(round(&det), vec![(0, 12), (1, 10), (4, 7)]);
    }

    #[test]
    fn scenario_f_equal_sign_momenta_sum() {
        let max = Bound::Scalar(10.0);
        let min = Bound::Scalar(0.0);
        let momenta = vec![m(1.0, f64::NEG_INFINITY, f64::INFINITY), m(1.0, f64::NEG_INFINITY, f64::INFINITY)];
        let det = determine((0.0, 0.0), &momenta, &max, &min);
        assert_eq!(round(&det), vec![(0, 0), (5, 10)]);
    }

    #[test]
    fn first_vertex_matches_base() {
        let max = Bound::Scalar(10.0);
        let min = Bound::Scalar(0.0);
        let det = determine((3.0, 5.0), &[], &max, &min);
        assert_eq!(det[0], (3.0, 5.0));
    }

    #[test]
    fn determination_is_strictly_time_increasing() {
        let max = Bound::Scalar(10.0);
        let min = Bound::Scalar(0.0);
        let momenta = vec![m(1.0, 1.0, 6.0), m(-1.0, 3.0, 8.0)];
        let det = determine((0.0, 2.0), &momenta, &max, &min);
        for pair in det.windows(2) {
            assert!(pair[0].0 < pair[1].0);
        }
    }
}
