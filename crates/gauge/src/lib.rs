//! A deterministic, closed-form scalar gauge: a value that evolves under a
//! superposition of time-bounded linear velocities ("momenta"), clamped
//! between a `max` and `min` that may themselves be gauges.
//!
//! Everything here is computed in closed form from the momentum set; there
//! is no simulation loop and no background task. A gauge is single-threaded
//! and synchronous (see [`Gauge`]'s docs), and caches its own determination
//! until something that would change it happens.

mod display;
mod error;
mod limit;
mod serde_repr;

use std::cell::{Ref, RefCell};
use std::rc::{Rc, Weak};

use gauge_momentum::Momentum;

pub use error::GaugeError;
pub use limit::Limit;

struct Inner {
    base: (f64, f64),
    /// Kept sorted ascending by `until`; duplicates are meaningful (a
    /// momentum multiset, not a set).
    momenta: Vec<Momentum>,
    max: Limit,
    min: Limit,
    determination: Option<Vec<(f64, f64)>>,
    /// Other gauges that use this one as a `max`/`min`. Weak so that a
    /// bound gauge never keeps its dependents alive; pruned opportunistically
    /// whenever this gauge's invalidation walks the list.
    dependents: Vec<Weak<RefCell<Inner>>>,
}

/// A scalar value evolving under linear momenta, clamped by `max`/`min`.
///
/// `Gauge` is a cheap `Rc<RefCell<..>>` handle: cloning it shares the same
/// underlying state, which is the intended way to hand a gauge to another
/// gauge as a hyper-gauge bound. There is no internal locking; a `Gauge`
/// is not `Send` or `Sync`, matching the single-threaded, synchronous model
/// this crate targets. There is no ambient clock either: every operation
/// that needs "now" takes it as an explicit `at: f64` argument.
#[derive(Clone)]
pub struct Gauge(Rc<RefCell<Inner>>);

impl Gauge {
    /// Builds a new gauge anchored at `(at, value)` with the given bounds.
    pub fn new(value: f64, max: impl Into<Limit>, min: impl Into<Limit>, at: f64) -> Gauge {
        let inner = Inner {
            base: (at, value),
            momenta: Vec::new(),
            max: Limit::Scalar(0.0),
            min: Limit::Scalar(0.0),
            determination: None,
            dependents: Vec::new(),
        };
        let gauge = Gauge(Rc::new(RefCell::new(inner)));
        gauge.set_max(max, false, at);
        gauge.set_min(min, false, at);
        gauge
    }

    fn inner_ref(&self) -> Ref<'_, Inner> {
        self.0.borrow()
    }

    /// This gauge's anchor point: the `(time, value)` pair every momentum
    /// is projected forward from.
    pub fn base(&self) -> (f64, f64) {
        self.inner_ref().base
    }

    pub fn max(&self) -> Limit {
        self.inner_ref().max.clone()
    }

    pub fn min(&self) -> Limit {
        self.inner_ref().min.clone()
    }

    /// The momenta currently in effect, in `until`-ascending order.
    pub fn momenta(&self) -> Vec<Momentum> {
        self.inner_ref().momenta.clone()
    }

    pub fn get_max(&self, at: f64) -> f64 {
        let max = self.inner_ref().max.clone();
        max.value_at(at)
    }

    pub fn get_min(&self, at: f64) -> f64 {
        let min = self.inner_ref().min.clone();
        min.value_at(at)
    }

    /// The closed-form determination from this gauge's base point forward,
    /// recomputing (and caching) it if nothing has invalidated it yet.
    pub fn determination(&self) -> Vec<(f64, f64)> {
        if let Some(cached) = self.inner_ref().determination.clone() {
            return cached;
        }
        let (base, momenta, max_bound, min_bound) = {
            let inner = self.inner_ref();
            (inner.base, inner.momenta.clone(), inner.max.to_bound(), inner.min.to_bound())
        };
        let det = gauge_determine::determine(base, &momenta, &max_bound, &min_bound);
        tracing::trace!(target: "gauge", vertices = det.len(), "determination_recomputed");
        self.0.borrow_mut().determination = Some(det.clone());
        det
    }

    /// The value at `t`. Before the first vertex or after the last, this
    /// holds flat at the nearest endpoint's value.
    pub fn get(&self, t: f64) -> f64 {
        self.sample(t).0
    }

    /// The instantaneous velocity at `t`. Flat (zero) before the first
    /// vertex and after the last.
    pub fn velocity(&self, t: f64) -> f64 {
        self.sample(t).1
    }

    fn sample(&self, t: f64) -> (f64, f64) {
        let det = self.determination();
        if det.len() == 1 {
            return (det[0].1, 0.0);
        }
        let idx = det.partition_point(|&(time, _)| time < t);
        if idx == 0 {
            return (det[0].1, 0.0);
        }
        if idx >= det.len() {
            return (det[det.len() - 1].1, 0.0);
        }
        let (since, value) = det[idx - 1];
        let (until, final_value) = det[idx];
        let segment = gauge_line::Line::segment(since, until, value, final_value);
        (segment.get(t), segment.velocity())
    }

    /// Every time this gauge crosses `goal`, in ascending order. A segment
    /// crosses `goal` when it strictly enters the half-open interval on one
    /// side and reaches or passes it on the other (`v1 < goal <= v2` or
    /// `v1 > goal >= v2`); this avoids double-counting a vertex that sits
    /// exactly on `goal`. The very first vertex is an exception: if it
    /// equals `goal`, there is no earlier segment to have already claimed
    /// it, so it is reported directly.
    pub fn whenever(&self, goal: f64) -> Vec<f64> {
        let det = self.determination();
        let mut crossings = Vec::new();
        if let Some(&(t0, v0)) = det.first() {
            if v0 == goal {
                crossings.push(t0);
            }
        }
        for pair in det.windows(2) {
            let (t1, v1) = pair[0];
            let (t2, v2) = pair[1];
            let rising = v1 < goal && goal <= v2;
            let falling = v1 > goal && goal >= v2;
            if !rising && !falling {
                continue;
            }
            let ratio = (goal - v1) / (v2 - v1);
            crossings.push(t1 + (t2 - t1) * ratio);
        }
        crossings
    }

    /// The `after`-th (0-indexed) time this gauge reaches `goal`.
    pub fn when(&self, goal: f64, after: usize) -> Result<f64, GaugeError> {
        self.whenever(goal).into_iter().nth(after).ok_or(GaugeError::Unreachable)
    }

    /// Relocates the anchor to `(at, value)` without touching the momenta.
    pub fn rebase(&self, value: f64, at: f64) {
        self.0.borrow_mut().base = (at, value);
        self.invalidate();
    }

    /// Drops every momentum and relocates the anchor to `(at, value)`,
    /// defaulting `value` to the current value at `at` when omitted.
    pub fn clear_momenta(&self, value: Option<f64>, at: f64) -> f64 {
        let value = value.unwrap_or_else(|| self.get(at));
        {
            let mut inner = self.0.borrow_mut();
            inner.base = (at, value);
            inner.momenta.clear();
        }
        self.invalidate();
        value
    }

    /// Drops every momentum that has already fully elapsed as of `at`
    /// (`until <= at`) and relocates the anchor to `(at, value)`, defaulting
    /// `value` to the current value at `at` when omitted.
    pub fn forget_past(&self, value: Option<f64>, at: f64) -> f64 {
        let value = value.unwrap_or_else(|| self.get(at));
        {
            let mut inner = self.0.borrow_mut();
            inner.base = (at, value);
            inner.momenta.retain(|m| m.until > at);
        }
        self.invalidate();
        value
    }

    /// Builds and adds a new momentum.
    pub fn add_momentum(&self, velocity: f64, since: f64, until: f64) -> Result<Momentum, GaugeError> {
        let momentum = Momentum::new(velocity, since, until)?;
        self.insert_momentum(momentum);
        Ok(momentum)
    }

    /// Adds an already-built momentum, e.g. one recovered from storage.
    pub fn add_existing_momentum(&self, momentum: Momentum) -> Momentum {
        self.insert_momentum(momentum);
        momentum
    }

    fn insert_momentum(&self, momentum: Momentum) {
        {
            let mut inner = self.0.borrow_mut();
            let pos = inner.momenta.partition_point(|m| m.until < momentum.until);
            inner.momenta.insert(pos, momentum);
        }
        self.invalidate();
    }

    /// Removes one matching momentum (momenta are a multiset, so an equal
    /// duplicate is left in place). Fails with [`GaugeError::NotFound`] if
    /// none match.
    pub fn remove_momentum(&self, momentum: Momentum) -> Result<(), GaugeError> {
        let removed = {
            let mut inner = self.0.borrow_mut();
            match inner.momenta.iter().position(|m| *m == momentum) {
                Some(pos) => {
                    inner.momenta.remove(pos);
                    true
                }
                None => false,
            }
        };
        if !removed {
            return Err(GaugeError::NotFound);
        }
        self.invalidate();
        Ok(())
    }

    /// Raises or lowers the value by `delta` as of `at`.
    ///
    /// * `over = true` allows the result to exceed `max`/`min` outright.
    /// * `over = false, clamp = true` saturates at the bound, but never
    ///   below whatever the value already was (the source's documented
    ///   saturation rule: clamping tightens toward the bound, it never
    ///   retroactively corrects an already-out-of-range value the other way).
    /// * `over = false, clamp = false` rejects the change with
    ///   [`GaugeError::OutOfRange`].
    pub fn incr(&self, delta: f64, over: bool, clamp: bool, at: f64) -> Result<f64, GaugeError> {
        let previous = self.get(at);
        let mut value = previous + delta;

        if over {
            // no bound check at all.
        } else if delta > 0.0 {
            let max = self.get_max(at);
            if value > max {
                if clamp {
                    value = previous.max(max);
                } else {
                    return Err(GaugeError::OutOfRange { value, bound: max });
                }
            }
        } else if delta < 0.0 {
            let min = self.get_min(at);
            if value < min {
                if clamp {
                    value = previous.min(min);
                } else {
                    return Err(GaugeError::OutOfRange { value, bound: min });
                }
            }
        }

        Ok(self.forget_past(Some(value), at))
    }

    pub fn decr(&self, delta: f64, over: bool, clamp: bool, at: f64) -> Result<f64, GaugeError> {
        self.incr(-delta, over, clamp, at)
    }

    /// Sets the value outright, expressed internally as `incr` by the
    /// needed delta so the same overflow policy applies.
    pub fn set(&self, value: f64, over: bool, clamp: bool, at: f64) -> Result<f64, GaugeError> {
        let delta = value - self.get(at);
        self.incr(delta, over, clamp, at)
    }

    /// Sets `max`, optionally re-clamping the current value down to it.
    pub fn set_max(&self, max: impl Into<Limit>, clamp: bool, at: f64) {
        self.set_limit(true, max.into(), clamp, at);
    }

    /// Sets `min`, optionally re-clamping the current value up to it.
    pub fn set_min(&self, min: impl Into<Limit>, clamp: bool, at: f64) {
        self.set_limit(false, min.into(), clamp, at);
    }

    fn set_limit(&self, is_max: bool, new_limit: Limit, clamp: bool, at: f64) {
        if let Limit::Gauge(bound) = &new_limit {
            debug_assert!(!Rc::ptr_eq(&self.0, &bound.0), "a gauge cannot be its own bound");
        }

        let previous = {
            let mut inner = self.0.borrow_mut();
            if is_max {
                std::mem::replace(&mut inner.max, new_limit.clone())
            } else {
                std::mem::replace(&mut inner.min, new_limit.clone())
            }
        };
        if let Limit::Gauge(bound) = &previous {
            bound.unlink_dependent(self);
        }
        if let Limit::Gauge(bound) = &new_limit {
            bound.link_dependent(self);
        }

        if clamp {
            let value = self.get(at);
            let limited = if is_max {
                let max = self.get_max(at);
                (value > max).then_some(max)
            } else {
                let min = self.get_min(at);
                (value < min).then_some(min)
            };
            if let Some(clamped) = limited {
                self.forget_past(Some(clamped), at);
                return;
            }
        }
        self.invalidate();
    }

    fn link_dependent(&self, dependent: &Gauge) {
        self.0.borrow_mut().dependents.push(Rc::downgrade(&dependent.0));
    }

    fn unlink_dependent(&self, dependent: &Gauge) {
        self.0.borrow_mut().dependents.retain(|weak| match weak.upgrade() {
            Some(rc) => !Rc::ptr_eq(&rc, &dependent.0),
            None => false,
        });
    }

    /// Drops this gauge's cached determination and transitively invalidates
    /// every gauge that uses it as a bound.
    fn invalidate(&self) {
        self.0.borrow_mut().determination = None;
        let dependents = self.0.borrow().dependents.clone();
        let mut alive = Vec::with_capacity(dependents.len());
        for weak in dependents {
            if let Some(rc) = weak.upgrade() {
                Gauge(rc).invalidate();
                alive.push(weak);
            }
        }
        self.0.borrow_mut().dependents = alive;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_gauge_holds_its_base_value() {
        let g = Gauge::new(12.0, 100.0, 0.0, 0.0);
        assert_eq!(g.get(0.0), 12.0);
        assert_eq!(g.get(50.0), 12.0);
        assert_eq!(g.velocity(0.0), 0.0);
    }

    #[test]
    fn velocity_at_an_interior_vertex_is_the_left_hand_slope() {
        // +1/s until t=5, then -3/s until t=10: a genuine slope change at
        // an interior vertex, not an endpoint. `sample` locates `t` via
        // `partition_point`, the same `bisect_left`-shaped lookup the
        // reference implementation uses, so an exact vertex match resolves
        // to the segment ending at `t`, not the one starting there.
        let g = Gauge::new(0.0, 100.0, -100.0, 0.0);
        g.add_momentum(1.0, 0.0, 5.0).unwrap();
        g.add_momentum(-3.0, 5.0, 10.0).unwrap();

        assert_eq!(g.get(5.0), 5.0);
        assert_eq!(g.velocity(5.0), 1.0);
        assert_eq!(g.velocity(7.0), -3.0);
    }

    #[test]
    fn scenario_a_matches_the_determination() {
        let g = Gauge::new(12.0, 100.0, 0.0, 0.0);
        g.add_momentum(1.0, 1.0, 6.0).unwrap();
        g.add_momentum(-1.0, 3.0, 8.0).unwrap();
        assert_eq!(g.get(0.0), 12.0);
        assert_eq!(g.get(3.0), 14.0);
        assert_eq!(g.get(6.0), 14.0);
        assert_eq!(g.get(8.0), 12.0);
        assert_eq!(g.get(100.0), 12.0);
    }

    #[test]
    fn clamps_against_a_scalar_max() {
        let g = Gauge::new(8.0, 10.0, 0.0, 0.0);
        g.add_momentum(1.0, 0.0, 4.0).unwrap();
        assert_eq!(g.get(2.0), 10.0);
        assert_eq!(g.get(4.0), 10.0);
    }

    #[test]
    fn incr_rejects_overflow_without_clamp_or_over() {
        let g = Gauge::new(8.0, 10.0, 0.0, 0.0);
        let err = g.incr(5.0, false, false, 0.0).unwrap_err();
        assert_eq!(err, GaugeError::OutOfRange { value: 13.0, bound: 10.0 });
        assert_eq!(g.get(0.0), 8.0);
    }

    #[test]
    fn incr_saturates_when_clamped() {
        let g = Gauge::new(8.0, 10.0, 0.0, 0.0);
        let result = g.incr(5.0, false, true, 0.0).unwrap();
        assert_eq!(result, 10.0);
        assert_eq!(g.get(0.0), 10.0);
    }

    #[test]
    fn incr_over_ignores_bounds() {
        let g = Gauge::new(8.0, 10.0, 0.0, 0.0);
        let result = g.incr(5.0, true, false, 0.0).unwrap();
        assert_eq!(result, 13.0);
    }

    #[test]
    fn add_and_remove_momentum_round_trips() {
        let g = Gauge::new(0.0, 100.0, 0.0, 0.0);
        let m = g.add_momentum(2.0, 0.0, 10.0).unwrap();
        assert_eq!(g.momenta().len(), 1);
        g.remove_momentum(m).unwrap();
        assert!(g.momenta().is_empty());
    }

    #[test]
    fn remove_momentum_reports_not_found() {
        let g = Gauge::new(0.0, 100.0, 0.0, 0.0);
        let phantom = Momentum::new(1.0, 0.0, 5.0).unwrap();
        assert_eq!(g.remove_momentum(phantom).unwrap_err(), GaugeError::NotFound);
    }

    #[test]
    fn forget_past_drops_elapsed_momenta_only() {
        let g = Gauge::new(0.0, 100.0, -100.0, 0.0);
        g.add_momentum(1.0, 0.0, 5.0).unwrap();
        g.add_momentum(1.0, 10.0, 20.0).unwrap();
        g.forget_past(None, 6.0);
        assert_eq!(g.momenta().len(), 1);
        assert_eq!(g.base(), (6.0, 5.0));
    }

    #[test]
    fn hyper_gauge_follows_its_dynamic_ceiling() {
        let ceiling = Gauge::new(10.0, 1000.0, 0.0, 0.0);
        let g = Gauge::new(8.0, ceiling.clone(), 0.0, 0.0);
        g.add_momentum(1.0, 0.0, 10.0).unwrap();
        // the ceiling gauge is flat at 10, so g rides it once it gets there.
        assert_eq!(g.get(2.0), 10.0);
        assert_eq!(g.get(5.0), 10.0);
    }

    #[test]
    fn invalidating_a_bound_gauge_propagates_to_its_dependent() {
        let ceiling = Gauge::new(10.0, 1000.0, 0.0, 0.0);
        let g = Gauge::new(8.0, ceiling.clone(), 0.0, 0.0);
        g.add_momentum(1.0, 0.0, 10.0).unwrap();
        assert_eq!(g.get(5.0), 10.0);
        ceiling.rebase(20.0, 0.0);
        assert_eq!(g.get(5.0), 13.0);
    }

    #[test]
    fn whenever_reports_every_crossing() {
        let g = Gauge::new(0.0, 10.0, 0.0, 0.0);
        g.add_momentum(1.0, f64::NEG_INFINITY, f64::INFINITY).unwrap();
        g.add_momentum(-2.0, 3.0, 4.0).unwrap();
        g.add_momentum(-2.0, 5.0, 6.0).unwrap();
        g.add_momentum(-2.0, 7.0, 8.0).unwrap();
        let crossings = g.whenever(3.0);
        assert_eq!(crossings, vec![3.0, 5.0, 7.0, 9.0]);
    }

    #[test]
    fn when_reports_unreachable_goal() {
        let g = Gauge::new(0.0, 10.0, 0.0, 0.0);
        assert_eq!(g.when(50.0, 0).unwrap_err(), GaugeError::Unreachable);
    }

    #[test]
    fn display_uses_slash_form_when_min_is_zero() {
        let g = Gauge::new(12.0, 100.0, 0.0, 0.0);
        assert_eq!(format!("{g}"), "<Gauge 12.00/100.00>");
    }

    #[test]
    fn display_uses_between_form_otherwise() {
        let g = Gauge::new(12.0, 100.0, 5.0, 0.0);
        assert_eq!(format!("{g}"), "<Gauge 12.00 between 5.00~100.00>");
    }

    #[test]
    fn serde_round_trip_preserves_observable_behavior() {
        let g = Gauge::new(12.0, 100.0, 0.0, 0.0);
        g.add_momentum(1.0, 1.0, 6.0).unwrap();
        g.add_momentum(-1.0, 3.0, 8.0).unwrap();
        let json = serde_json::to_string(&g).unwrap();
        let restored: Gauge = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.get(3.0), g.get(3.0));
        assert_eq!(restored.get(8.0), g.get(8.0));
    }
}
