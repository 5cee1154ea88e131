use thiserror::Error;

/// Errors surfaced by the library.
///
/// Plotting internals work with `anyhow` (plotters error types carry the
/// backend type and are awkward to name); they are folded into [`SalesError::Render`]
/// at the dispatcher boundary.
#[derive(Debug, Error)]
pub enum SalesError {
    /// The dataset could not be read or parsed. Fatal at startup.
    #[error("failed to load dataset from {source_name}: {reason}")]
    DatasetLoad { source_name: String, reason: String },

    /// A user-submitted form value was missing or not a valid number.
    #[error("invalid value for `{field}`: {reason}")]
    InvalidInput { field: &'static str, reason: String },

    /// Not enough rows to fit the regression model.
    #[error("not enough rows to fit the model: {rows} training rows for {params} parameters")]
    InsufficientData { rows: usize, params: usize },

    /// The plotting backend or the PNG encoder failed.
    #[error("chart rendering failed: {0}")]
    Render(#[from] anyhow::Error),
}

pub type Result<T, E = SalesError> = std::result::Result<T, E>;
