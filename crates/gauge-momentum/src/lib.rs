//! Momentum: an immutable, time-bounded constant-velocity contribution.

use std::fmt;
use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A momentum failed validation.
#[derive(Debug, Error, PartialEq, Clone, Copy)]
pub enum MomentumError {
    /// `since` is not strictly earlier than `until`, and neither is infinite.
    #[error("'since' ({since}) should be earlier than 'until' ({until})")]
    BadMomentum { since: f64, until: f64 },
}

/// A power which increases or decreases a gauge continually between a
/// specific period. Two momenta with equal `(velocity, since, until)` are
/// equal in value, but a gauge's momentum set treats them as distinct
/// instances (multiset semantics).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Momentum {
    pub velocity: f64,
    pub since: f64,
    pub until: f64,
}

impl Momentum {
    /// Creates a momentum active over `[since, until]`. Either bound may be
    /// infinite. Fails if both are finite and `since` is not earlier than
    /// `until`.
    pub fn new(velocity: f64, since: f64, until: f64) -> Result<Self, MomentumError> {
        let valid = since == f64::NEG_INFINITY || until == f64::INFINITY || since < until;
        if !valid {
            return Err(MomentumError::BadMomentum { since, until });
        }
        Ok(Momentum {
            velocity,
            since,
            until,
        })
    }

    /// A momentum with no time bound at all.
    pub fn permanent(velocity: f64) -> Self {
        Momentum {
            velocity,
            since: f64::NEG_INFINITY,
            until: f64::INFINITY,
        }
    }

    pub fn is_permanent_tail(&self) -> bool {
        self.until == f64::INFINITY
    }
}

impl fmt::Display for Momentum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Momentum {:+.2}/s", self.velocity)?;
        if self.since != f64::NEG_INFINITY || self.until != f64::INFINITY {
            let since = if self.since == f64::NEG_INFINITY {
                String::new()
            } else {
                format!("{:.2}", self.since)
            };
            let until = if self.until == f64::INFINITY {
                String::new()
            } else {
                format!("{:.2}", self.until)
            };
            write!(f, " {since}~{until}")?;
        }
        write!(f, ">")
    }
}
