//! Error types for alignment operations.
//!
//! Numeric failures never unwind: a spiral that cannot be fitted keeps NaN in
//! its curvature, clothance and length, and the fitting call returns one of
//! these errors so callers can tell the reasons apart.

use thiserror::Error;

/// Errors that can occur while fitting or building alignment curves.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AlignmentError {
    /// The spiral fitting iteration did not settle.
    #[error("spiral fit did not converge after {iterations} iterations")]
    NoConvergence {
        /// Number of iterations performed before giving up.
        iterations: usize,
    },

    /// Degenerate geometry (e.g., a zero-length chord).
    #[error("degenerate geometry: {reason}")]
    Degenerate {
        /// Description of the degeneracy.
        reason: String,
    },

    /// A turn angle is too large for the fitting arithmetic.
    #[error("{name} of {degrees:.3}° exceeds the ±{limit}° fitting range")]
    AngleOutOfRange {
        /// Which angle was rejected (`"delta"` or `"delta2"`).
        name: &'static str,
        /// The rejected angle in degrees.
        degrees: f64,
        /// The allowed magnitude in degrees.
        limit: u32,
    },
}

impl AlignmentError {
    /// Create a degenerate geometry error.
    #[must_use]
    pub fn degenerate(reason: impl Into<String>) -> Self {
        Self::Degenerate {
            reason: reason.into(),
        }
    }

    /// Create a non-convergence error.
    #[must_use]
    pub const fn no_convergence(iterations: usize) -> Self {
        Self::NoConvergence { iterations }
    }

    /// Check if this is a non-convergence error.
    #[must_use]
    pub fn is_no_convergence(&self) -> bool {
        matches!(self, Self::NoConvergence { .. })
    }

    /// Check if this is a degenerate geometry error.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        matches!(self, Self::Degenerate { .. })
    }

    /// Check if this is an angle range error.
    #[must_use]
    pub fn is_angle_out_of_range(&self) -> bool {
        matches!(self, Self::AngleOutOfRange { .. })
    }
}
