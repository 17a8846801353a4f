use gauge_momentum::MomentumError;
use thiserror::Error;

/// Failure modes surfaced by the [`crate::Gauge`] facade.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum GaugeError {
    /// A non-overriding mutation would have pushed the value past a bound.
    #[error("value {value} is out of range against bound {bound}")]
    OutOfRange { value: f64, bound: f64 },

    /// The requested momentum window is malformed (`since >= until`, with
    /// neither end infinite).
    #[error(transparent)]
    BadMomentum(#[from] MomentumError),

    /// A fully formed [`gauge_momentum::Momentum`] was combined with
    /// additional `since`/`until` arguments it cannot carry. Rust's typed
    /// `add_momentum`/`add_existing_momentum` split makes this case
    /// unreachable through the safe API; kept for parity with the error
    /// surface a caller working through serialized or dynamically typed
    /// data might still need to model.
    #[error("a ready-made momentum cannot also take since/until arguments")]
    BadMomentumArgs,

    /// `remove_momentum` found no matching entry to drop.
    #[error("no matching momentum to remove")]
    NotFound,

    /// `when`/`whenever` found no crossing of the requested goal.
    #[error("the gauge never reaches that value")]
    Unreachable,
}
