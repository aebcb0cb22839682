use thiserror::Error;

/// Solana chain operation errors.
#[derive(Debug, Error)]
pub enum SolError {
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid keypair: {0}")]
    InvalidKeypair(String),

    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    #[error("invalid PDA seeds: {0}")]
    InvalidSeeds(String),

    #[error("no off-curve program address found for any bump seed")]
    PdaExhausted,

    #[error("amount must be greater than zero")]
    NonPositiveAmount,

    #[error("amount overflows u64 after scaling to {decimals} decimals")]
    AmountOverflow { decimals: u8 },

    #[error("transaction build error: {0}")]
    TransactionBuildError(String),

    #[error("serialization error: {0}")]
    SerializationError(String),

    /// The node simulated the transaction and refused it. Nothing landed.
    #[error("transaction rejected in preflight: {0}")]
    SimulationRejected(String),

    /// The submission did not get an answer. The transfer may still land.
    #[error("transaction submission failed: {0}")]
    SubmissionFailed(String),

    #[error("remote node unavailable: {0}")]
    RemoteUnavailable(String),

    /// The node answered, but the result did not have the expected shape.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// The node answered with a JSON-RPC error object.
    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("configuration error: {0}")]
    Config(String),
}

impl SolError {
    /// True when the remote node has definitively refused the operation.
    pub fn is_definite_failure(&self) -> bool {
        matches!(self, SolError::SimulationRejected(_))
    }

    /// True when the outcome of a submission is unknown and the caller must
    /// not assume the transfer failed.
    pub fn is_unknown_outcome(&self) -> bool {
        matches!(self, SolError::SubmissionFailed(_))
    }

    /// True for input validation errors raised before any network call.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            SolError::InvalidAddress(_)
                | SolError::NonPositiveAmount
                | SolError::AmountOverflow { .. }
                | SolError::InvalidSeeds(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_invalid_address() {
        let err = SolError::InvalidAddress("bad decode".into());
        assert_eq!(err.to_string(), "invalid address: bad decode");
    }

    #[test]
    fn display_amount_overflow() {
        let err = SolError::AmountOverflow { decimals: 9 };
        assert_eq!(
            err.to_string(),
            "amount overflows u64 after scaling to 9 decimals"
        );
    }

    #[test]
    fn display_simulation_rejected() {
        let err = SolError::SimulationRejected("insufficient funds".into());
        assert_eq!(
            err.to_string(),
            "transaction rejected in preflight: insufficient funds"
        );
    }

    #[test]
    fn display_rpc_error() {
        let err = SolError::Rpc {
            code: -32602,
            message: "could not find account".into(),
        };
        assert_eq!(err.to_string(), "rpc error -32602: could not find account");
    }

    #[test]
    fn display_malformed_response() {
        let err = SolError::MalformedResponse("getBalance: missing field `value`".into());
        assert_eq!(
            err.to_string(),
            "malformed response: getBalance: missing field `value`"
        );
        assert!(!err.is_unknown_outcome());
    }

    #[test]
    fn simulation_rejection_is_definite() {
        let err = SolError::SimulationRejected("blockhash not found".into());
        assert!(err.is_definite_failure());
        assert!(!err.is_unknown_outcome());
    }

    #[test]
    fn submission_failure_is_unknown_outcome() {
        let err = SolError::SubmissionFailed("timed out".into());
        assert!(err.is_unknown_outcome());
        assert!(!err.is_definite_failure());
    }

    #[test]
    fn validation_errors_are_classified() {
        assert!(SolError::NonPositiveAmount.is_validation());
        assert!(SolError::AmountOverflow { decimals: 6 }.is_validation());
        assert!(SolError::InvalidAddress("x".into()).is_validation());
        assert!(!SolError::PdaExhausted.is_validation());
        assert!(!SolError::RemoteUnavailable("down".into()).is_validation());
    }

    #[test]
    fn error_trait_is_implemented() {
        let err: Box<dyn std::error::Error> = Box::new(SolError::PdaExhausted);
        assert!(err.to_string().contains("bump"));
    }
}
