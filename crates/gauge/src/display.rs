use std::fmt;

use crate::{Gauge, Limit};

impl Gauge {
    /// Renders this gauge as of `at`, the way [`fmt::Display`] would if it
    /// could take a time argument. `Display` itself falls back to the
    /// gauge's own base time, since there is no ambient clock to default to.
    pub fn describe_at(&self, at: f64) -> String {
        let value = self.get(at);
        let (max_limit, min_limit) = {
            let inner = self.inner_ref();
            (inner.max.clone(), inner.min.clone())
        };
        let hyper = max_limit.as_gauge().is_some() || min_limit.as_gauge().is_some();
        let max_repr = render_limit(&max_limit, at);
        let min_repr = render_limit(&min_limit, at);

        let min_is_zero = matches!(min_limit, Limit::Scalar(v) if v == 0.0);
        if !hyper && min_is_zero {
            format!("<Gauge {value:.2}/{max_repr}>")
        } else {
            format!("<Gauge {value:.2} between {min_repr}~{max_repr}>")
        }
    }
}

fn render_limit(limit: &Limit, at: f64) -> String {
    match limit {
        Limit::Scalar(v) => format!("{v:.2}"),
        Limit::Gauge(g) => g.describe_at(at),
    }
}

impl fmt::Display for Gauge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let at = self.inner_ref().base.0;
        write!(f, "{}", self.describe_at(at))
    }
}

impl fmt::Debug for Gauge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let at = self.inner_ref().base.0;
        write!(f, "Gauge({})", self.describe_at(at))
    }
}
