//! Line primitives.
//!
//! A [`Line`] is the value representation of a linear segment valid over
//! `[since, until]`. Three shapes exist: a constant [`Line::Horizon`], a
//! velocity-parameterized [`Line::Ray`], and an endpoint-parameterized
//! [`Line::Segment`]. All three share `get`, `guess`, `intercept`, and
//! `velocity`; [`Line::intersect`] works across shapes.
//!
//! Callers that walk a boundary built from another gauge's determination
//! rely on the upstream invariant that consecutive vertices have strictly
//! increasing times, so `Segment`s here are never zero-length.

use thiserror::Error;

/// Failure modes of [`Line::intersect`]. Both are recovered from by the
/// determination algorithm (see `gauge-determine`); neither should reach a
/// caller outside this crate's boundary.
#[derive(Debug, Error, PartialEq, Clone, Copy)]
pub enum LineError {
    /// The two lines have the same velocity and never cross (or are identical).
    #[error("lines are parallel")]
    Parallel,
    /// The lines cross, but outside the time range where both are defined.
    #[error("intersection falls outside the time overlap")]
    NoIntersection,
}

/// A linear segment valid over `[since, until]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Line {
    /// A constant value with no velocity.
    Horizon { since: f64, until: f64, value: f64 },
    /// A value that moves at a fixed velocity from `value` at `since`.
    Ray {
        since: f64,
        until: f64,
        value: f64,
        velocity: f64,
    },
    /// A value that moves linearly from `value` at `since` to `final_value` at `until`.
    Segment {
        since: f64,
        until: f64,
        value: f64,
        final_value: f64,
    },
}

impl Line {
    pub fn horizon(since: f64, until: f64, value: f64) -> Self {
        Line::Horizon { since, until, value }
    }

    pub fn ray(since: f64, until: f64, value: f64, velocity: f64) -> Self {
        Line::Ray {
            since,
            until,
            value,
            velocity,
        }
    }

    pub fn segment(since: f64, until: f64, value: f64, final_value: f64) -> Self {
        Line::Segment {
            since,
            until,
            value,
            final_value,
        }
    }

    pub fn since(&self) -> f64 {
        match *self {
            Line::Horizon { since, .. } | Line::Ray { since, .. } | Line::Segment { since, .. } => since,
        }
    }

    pub fn until(&self) -> f64 {
        match *self {
            Line::Horizon { until, .. } | Line::Ray { until, .. } | Line::Segment { until, .. } => until,
        }
    }

    pub fn value(&self) -> f64 {
        match *self {
            Line::Horizon { value, .. } | Line::Ray { value, .. } | Line::Segment { value, .. } => value,
        }
    }

    /// The slope of the line. Constant for `Horizon` and `Ray`; derived from
    /// the two endpoints for `Segment`.
    pub fn velocity(&self) -> f64 {
        match *self {
            Line::Horizon { .. } => 0.0,
            Line::Ray { velocity, .. } => velocity,
            Line::Segment {
                since,
                until,
                value,
                final_value,
            } => (final_value - value) / (until - since),
        }
    }

    /// The y-axis intercept: the value the line would have at `t = 0`.
    pub fn intercept(&self) -> f64 {
        self.value() - self.velocity() * self.since()
    }

    /// The value at `at`, which must lie in `[since, until]`.
    ///
    /// Out-of-range calls are a caller bug within this crate's boundary
    /// (the determiner never calls `get` outside a line's own range); in
    /// release builds they degrade to extrapolation rather than panicking.
    pub fn get(&self, at: f64) -> f64 {
        debug_assert!(
            self.since() <= at && at <= self.until(),
            "Line::get called with {at} outside [{}, {}]",
            self.since(),
            self.until()
        );
        match *self {
            Line::Horizon { value, .. } => value,
            Line::Ray {
                since, value, velocity, ..
            } => value + velocity * (at - since),
            Line::Segment {
                since,
                until,
                value,
                final_value,
            } => {
                if at == since {
                    value
                } else if at == until {
                    final_value
                } else {
                    let rate = (at - since) / (until - since);
                    value + rate * (final_value - value)
                }
            }
        }
    }

    /// The value at `at`, extrapolating as constant outside `[since, until]`.
    pub fn guess(&self, at: f64) -> f64 {
        if at < self.since() {
            self.value()
        } else if at > self.until() {
            match *self {
                Line::Horizon { value, .. } => value,
                Line::Ray { .. } => self.get(self.until()),
                Line::Segment { final_value, .. } => final_value,
            }
        } else {
            self.get(at)
        }
    }

    /// The intersection point `(t, v)` with `other`.
    ///
    /// Fails with [`LineError::Parallel`] when the two lines share a
    /// velocity, or [`LineError::NoIntersection`] when the crossing falls
    /// outside the overlap of the two time ranges.
    pub fn intersect(&self, other: &Line) -> Result<(f64, f64), LineError> {
        let velocity_delta = self.velocity() - other.velocity();
        if velocity_delta == 0.0 {
            return Err(LineError::Parallel);
        }
        let t = (other.intercept() - self.intercept()) / velocity_delta;
        let since = self.since().max(other.since());
        let until = self.until().min(other.until());
        if t < since || t > until {
            return Err(LineError::NoIntersection);
        }
        Ok((t, self.get(t)))
    }
}
