//! Serialization: a gauge serializes as `(base, max, min, momenta)`, where
//! `max`/`min` are either a number or a recursively serialized gauge.
//! Deserialization rebuilds via [`Gauge::new`] and re-adds each momentum;
//! the determination cache is never part of the wire format.

use gauge_momentum::Momentum;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{Gauge, Limit};

#[derive(Serialize, Deserialize)]
struct GaugeRepr {
    base: (f64, f64),
    max: LimitRepr,
    min: LimitRepr,
    momenta: Vec<(f64, f64, f64)>,
}

#[derive(Serialize, Deserialize)]
enum LimitRepr {
    Scalar(f64),
    Gauge(Box<GaugeRepr>),
}

impl Limit {
    fn to_repr(&self) -> LimitRepr {
        match self {
            Limit::Scalar(v) => LimitRepr::Scalar(*v),
            Limit::Gauge(g) => LimitRepr::Gauge(Box::new(g.to_repr())),
        }
    }

    fn from_repr(repr: LimitRepr) -> Limit {
        match repr {
            LimitRepr::Scalar(v) => Limit::Scalar(v),
            LimitRepr::Gauge(boxed) => Limit::Gauge(Gauge::from_repr(*boxed)),
        }
    }
}

impl Gauge {
    fn to_repr(&self) -> GaugeRepr {
        let inner = self.inner_ref();
        GaugeRepr {
            base: inner.base,
            max: inner.max.to_repr(),
            min: inner.min.to_repr(),
            momenta: inner.momenta.iter().map(|m| (m.velocity, m.since, m.until)).collect(),
        }
    }

    fn from_repr(repr: GaugeRepr) -> Gauge {
        let max = Limit::from_repr(repr.max);
        let min = Limit::from_repr(repr.min);
        let gauge = Gauge::new(repr.base.1, max, min, repr.base.0);
        for (velocity, since, until) in repr.momenta {
            if let Ok(momentum) = Momentum::new(velocity, since, until) {
                gauge.add_existing_momentum(momentum);
            }
        }
        gauge
    }
}

impl Serialize for Gauge {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_repr().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Gauge {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let repr = GaugeRepr::deserialize(deserializer)?;
        Ok(Gauge::from_repr(repr))
    }
}
