use thiserror::Error;

/// Hard failures. Soft conditions (substituted share counts, inverted bands,
/// non-computable CAGR) are reported as warnings on the output envelope.
#[derive(Debug, Error)]
pub enum ValuationError {
    #[error("Invalid input for {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Financial impossibility: {0}")]
    FinancialImpossibility(String),

    #[error("Arithmetic overflow in {context}")]
    ArithmeticOverflow { context: String },
}

impl ValuationError {
    pub(crate) fn overflow(context: impl Into<String>) -> Self {
        ValuationError::ArithmeticOverflow {
            context: context.into(),
        }
    }
}
