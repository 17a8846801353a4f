//! A gauge's `max` or `min`: a plain number, or another gauge (a
//! hyper-gauge bound). Bridges to [`gauge_boundary::Bound`] for the
//! duration of a single `determine()` call.

use std::rc::Rc;

use gauge_boundary::{Bound, BoundSource};
use gauge_line::Line;

use crate::Gauge;

/// A `max` or `min` value: either fixed, or delegated to another gauge.
#[derive(Clone)]
pub enum Limit {
    Scalar(f64),
    Gauge(Gauge),
}

impl Limit {
    pub fn value_at(&self, t: f64) -> f64 {
        match self {
            Limit::Scalar(v) => *v,
            Limit::Gauge(g) => g.get(t),
        }
    }

    pub fn as_gauge(&self) -> Option<&Gauge> {
        match self {
            Limit::Scalar(_) => None,
            Limit::Gauge(g) => Some(g),
        }
    }

    /// Builds a short-lived [`Bound`] view for a single `determine()` call.
    pub(crate) fn to_bound(&self) -> Bound {
        match self {
            Limit::Scalar(v) => Bound::Scalar(*v),
            Limit::Gauge(g) => Bound::Dynamic(Rc::new(g.clone()) as Rc<dyn BoundSource>),
        }
    }
}

impl From<f64> for Limit {
    fn from(v: f64) -> Self {
        Limit::Scalar(v)
    }
}

impl From<Gauge> for Limit {
    fn from(g: Gauge) -> Self {
        Limit::Gauge(g)
    }
}

impl BoundSource for Gauge {
    fn value_at(&self, t: f64) -> f64 {
        Gauge::get(self, t)
    }

    fn lines_since(&self, since: f64) -> Vec<Line> {
        let det = self.determination();
        let mut lines = Vec::with_capacity(det.len() + 1);
        let (first_t, first_v) = det[0];
        if since < first_t {
            lines.push(Line::horizon(since, first_t, first_v));
        }
        for pair in det.windows(2) {
            let (t1, v1) = pair[0];
            let (t2, v2) = pair[1];
            lines.push(Line::segment(t1, t2, v1, v2));
        }
        let (last_t, last_v) = *det.last().expect("determination is never empty");
        lines.push(Line::horizon(last_t, f64::INFINITY, last_v));
        lines
    }
}
