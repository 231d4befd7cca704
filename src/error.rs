//! Error types for the ivsurf library.
//!
//! Only run-level failures are errors. Quote-level outcomes of the implied
//! volatility solver (no-arbitrage violations, prices outside the search
//! bracket, non-convergence) are reported as [`SolverStatus`] values and
//! tallied in [`BuildDiagnostics`], never raised.
//!
//! [`SolverStatus`]: crate::implied::SolverStatus
//! [`BuildDiagnostics`]: crate::surface::BuildDiagnostics

use thiserror::Error;

use crate::surface::BuildDiagnostics;

/// Convenience type alias for results in this crate.
pub type Result<T> = std::result::Result<T, IvSurfError>;

/// Errors that can occur while pricing, solving, building or analysing a surface.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IvSurfError {
    /// Malformed model inputs or configuration (e.g., non-positive spot or
    /// strike, negative time to expiry, NaN anywhere).
    #[error("invalid input: {message}")]
    InvalidInput { message: String },

    /// Too few quotes survived cleaning and solving to form a surface.
    ///
    /// Carries the diagnostics of the failed run so callers can explain
    /// which filters removed the data.
    #[error("insufficient data: {found} surface points survived, at least {required} required")]
    InsufficientData {
        found: usize,
        required: usize,
        diagnostics: Box<BuildDiagnostics>,
    },

    /// Analytics requested on an expiry with no populated cells.
    #[error("empty surface: no populated cells for expiry {expiry}")]
    EmptySurface { expiry: f64 },

    /// Reading a chain from CSV or writing the tabular surface view failed.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_data_fields_accessible() {
        let diagnostics = BuildDiagnostics {
            input_quotes: 12,
            excluded_by_volume: 9,
            ..Default::default()
        };
        let err = IvSurfError::InsufficientData {
            found: 3,
            required: 10,
            diagnostics: Box::new(diagnostics),
        };
        match &err {
            IvSurfError::InsufficientData {
                found,
                required,
                diagnostics,
            } => {
                assert_eq!(*found, 3);
                assert_eq!(*required, 10);
                assert_eq!(diagnostics.excluded_by_volume, 9);
            }
            _ => panic!("wrong variant"),
        }
    }

    #[test]
    fn error_display_includes_details() {
        let err = IvSurfError::InvalidInput {
            message: "strike must be positive".into(),
        };
        assert!(format!("{err}").contains("strike must be positive"));

        let err2 = IvSurfError::EmptySurface { expiry: 0.25 };
        assert!(format!("{err2}").contains("0.25"));

        let err3 = IvSurfError::InsufficientData {
            found: 2,
            required: 10,
            diagnostics: Box::default(),
        };
        let display = format!("{err3}");
        assert!(display.contains('2'));
        assert!(display.contains("10"));
    }

    #[test]
    fn error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<IvSurfError>();
    }
}
