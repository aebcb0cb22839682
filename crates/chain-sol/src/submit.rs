//! Transaction assembly, submission and confirmation lookup.
//!
//! Nothing here retries. A submission either returns a signature, fails
//! definitively (`SimulationRejected`), or ends with an unknown outcome
//! (`SubmissionFailed`) that the caller must treat as "may still land".

use std::time::Duration;

use crate::config::Commitment;
use crate::error::SolError;
use crate::keypair::Keypair;
use crate::rpc::{
    ConfirmedTxInfo, SignatureStatus, SolanaRpc, INVALID_PARAMS, PREFLIGHT_FAILURE,
    SIGNATURE_VERIFICATION_FAILURE,
};
use crate::signature::Signature;
use crate::transaction::{compile_message, sign_transaction, Blockhash, Instruction};

/// Sign `instructions` with `signer` and submit them.
///
/// The node simulates the transaction at `confirmed` commitment before
/// accepting it. The instructions are compiled once before any network call
/// so malformed input fails without touching the node. A failed blockhash
/// fetch is returned as-is: nothing was sent at that point.
pub async fn submit(
    rpc: &SolanaRpc,
    instructions: &[Instruction],
    signer: &Keypair,
) -> Result<Signature, SolError> {
    compile_message(instructions, &signer.pubkey(), Blockhash::default())?;

    let blockhash = rpc.get_latest_blockhash().await?;

    let tx = sign_transaction(instructions, signer, blockhash)?;
    let wire = tx.to_wire()?;
    let local_id = tx.id();

    tracing::debug!(
        signer = %signer.pubkey(),
        instructions = instructions.len(),
        bytes = wire.len(),
        "submitting transaction"
    );

    match rpc.send_transaction(&wire, Commitment::Confirmed).await {
        Ok(signature) => {
            if local_id != Some(signature) {
                tracing::warn!(%signature, "node returned a signature that differs from the local one");
            }
            tracing::info!(%signature, signer = %signer.pubkey(), "transaction submitted");
            Ok(signature)
        }
        Err(SolError::Rpc { code, message }) if is_rejection(code) => {
            tracing::warn!(code, reason = %message, "transaction rejected in preflight");
            Err(SolError::SimulationRejected(message))
        }
        Err(e) => {
            tracing::warn!(error = %e, "transaction submission outcome unknown");
            Err(SolError::SubmissionFailed(e.to_string()))
        }
    }
}

fn is_rejection(code: i64) -> bool {
    matches!(
        code,
        PREFLIGHT_FAILURE | SIGNATURE_VERIFICATION_FAILURE | INVALID_PARAMS
    )
}

/// Best-effort transaction lookup.
///
/// Returns `None` while the node has not indexed the signature, and also when
/// the lookup itself fails or times out: callers must read `None` as
/// "still pending", never as "failed".
pub async fn get_transaction_details(
    rpc: &SolanaRpc,
    signature: &Signature,
) -> Option<ConfirmedTxInfo> {
    match rpc.get_transaction(signature).await {
        Ok(Some(info)) => {
            tracing::debug!(%signature, slot = info.slot, "transaction indexed");
            Some(info)
        }
        Ok(None) => {
            tracing::debug!(%signature, "transaction not indexed yet");
            None
        }
        Err(e) => {
            tracing::warn!(%signature, error = %e, "transaction lookup failed");
            None
        }
    }
}

/// Poll `getSignatureStatuses` until the signature reaches `level`, an
/// on-chain error is reported, or `timeout` elapses.
///
/// Returns the last status seen; `None` means the outcome is still unknown.
pub async fn await_confirmation(
    rpc: &SolanaRpc,
    signature: &Signature,
    level: Commitment,
    timeout: Duration,
    poll_interval: Duration,
) -> Option<SignatureStatus> {
    let deadline = tokio::time::Instant::now() + timeout;
    let mut last = None;

    loop {
        match rpc.get_signature_statuses(std::slice::from_ref(signature)).await {
            Ok(mut statuses) => {
                if let Some(Some(status)) = statuses.pop() {
                    if status.err.is_some() || status.reached(level) {
                        return Some(status);
                    }
                    last = Some(status);
                }
            }
            Err(e) => tracing::debug!(%signature, error = %e, "status poll failed"),
        }

        if tokio::time::Instant::now() + poll_interval > deadline {
            tracing::debug!(%signature, "confirmation wait timed out");
            return last;
        }
        tokio::time::sleep(poll_interval).await;
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::address::Address;
    use crate::rpc::testing::{rpc, MockTransport};
    use crate::transaction::build_native_transfer;

    fn blockhash_response() -> Result<serde_json::Value, SolError> {
        Ok(json!({
            "context": { "slot": 1 },
            "value": { "blockhash": Blockhash([0x33; 32]).to_string(), "lastValidBlockHeight": 9 }
        }))
    }

    fn transfer(signer: &Keypair) -> Instruction {
        build_native_transfer(&signer.pubkey(), &Address::new([0xBB; 32]), 1_000).unwrap()
    }

    #[tokio::test]
    async fn submit_signs_and_returns_node_signature() {
        let signer = Keypair::from_seed(&[0x42; 32]);
        let ix = transfer(&signer);
        let expected = crate::transaction::sign_transaction(
            &[ix.clone()],
            &signer,
            Blockhash([0x33; 32]),
        )
        .unwrap();
        let expected_id = expected.id().unwrap();

        let (client, mock) = rpc(MockTransport::new()
            .respond("getLatestBlockhash", blockhash_response())
            .respond("sendTransaction", Ok(json!(expected_id.to_string()))));

        let signature = submit(&client, &[ix], &signer).await.unwrap();
        assert_eq!(signature, expected_id);

        let sent = &mock.calls_to("sendTransaction")[0];
        use base64::Engine;
        let wire = base64::engine::general_purpose::STANDARD
            .decode(sent[0].as_str().unwrap())
            .unwrap();
        assert_eq!(wire, expected.to_wire().unwrap());
    }

    #[tokio::test]
    async fn preflight_failure_is_simulation_rejected() {
        let signer = Keypair::from_seed(&[0x42; 32]);
        let (client, _) = rpc(MockTransport::new()
            .respond("getLatestBlockhash", blockhash_response())
            .respond(
                "sendTransaction",
                Err(SolError::Rpc {
                    code: PREFLIGHT_FAILURE,
                    message: "Transaction simulation failed: insufficient lamports".into(),
                }),
            ));

        let err = submit(&client, &[transfer(&signer)], &signer).await.unwrap_err();
        assert!(err.is_definite_failure());
        assert!(err.to_string().contains("insufficient lamports"));
    }

    #[tokio::test]
    async fn timeout_is_submission_failed() {
        let signer = Keypair::from_seed(&[0x42; 32]);
        let (client, _) = rpc(MockTransport::new()
            .respond("getLatestBlockhash", blockhash_response())
            .respond(
                "sendTransaction",
                Err(SolError::RemoteUnavailable("sendTransaction: request timed out".into())),
            ));

        let err = submit(&client, &[transfer(&signer)], &signer).await.unwrap_err();
        assert!(err.is_unknown_outcome());
    }

    #[tokio::test]
    async fn node_side_error_without_rejection_code_is_unknown() {
        let signer = Keypair::from_seed(&[0x42; 32]);
        let (client, _) = rpc(MockTransport::new()
            .respond("getLatestBlockhash", blockhash_response())
            .respond(
                "sendTransaction",
                Err(SolError::Rpc {
                    code: -32005,
                    message: "Node is unhealthy".into(),
                }),
            ));

        let err = submit(&client, &[transfer(&signer)], &signer).await.unwrap_err();
        assert!(matches!(err, SolError::SubmissionFailed(_)));
    }

    #[tokio::test]
    async fn blockhash_failure_never_sends() {
        let signer = Keypair::from_seed(&[0x42; 32]);
        let (client, mock) = rpc(MockTransport::new().respond(
            "getLatestBlockhash",
            Err(SolError::RemoteUnavailable("connection refused".into())),
        ));

        let err = submit(&client, &[transfer(&signer)], &signer).await.unwrap_err();
        assert!(matches!(err, SolError::RemoteUnavailable(_)));
        assert!(!err.is_unknown_outcome());
        assert!(mock.calls_to("sendTransaction").is_empty());
    }

    #[tokio::test]
    async fn invalid_instructions_fail_before_any_call() {
        let signer = Keypair::from_seed(&[0x42; 32]);
        let stranger = Address::new([0x99; 32]);
        let ix = build_native_transfer(&stranger, &signer.pubkey(), 1).unwrap();
        let (client, mock) = rpc(MockTransport::new());

        let err = submit(&client, &[ix], &signer).await.unwrap_err();
        assert!(matches!(err, SolError::TransactionBuildError(_)));
        assert!(mock.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn details_lookup_errors_read_as_pending() {
        let (client, _) = rpc(MockTransport::new().respond(
            "getTransaction",
            Err(SolError::RemoteUnavailable("getTransaction: request timed out".into())),
        ));
        assert!(get_transaction_details(&client, &Signature::new([1; 64]))
            .await
            .is_none());
    }

    #[tokio::test]
    async fn details_lookup_returns_block_time() {
        let (client, _) = rpc(MockTransport::new().respond(
            "getTransaction",
            Ok(json!({ "slot": 5, "blockTime": 1_700_000_123i64, "meta": { "err": null, "fee": 5000 } })),
        ));
        let info = get_transaction_details(&client, &Signature::new([1; 64]))
            .await
            .unwrap();
        assert_eq!(info.block_time, Some(1_700_000_123));
    }

    #[tokio::test(start_paused = true)]
    async fn await_confirmation_polls_until_confirmed() {
        let status = |level: &str| -> Result<serde_json::Value, SolError> {
            Ok(json!({
                "context": { "slot": 1 },
                "value": [{ "slot": 3, "confirmations": 1, "err": null, "confirmationStatus": level }]
            }))
        };
        let (client, mock) = rpc(MockTransport::new()
            .respond("getSignatureStatuses", Ok(json!({ "context": { "slot": 1 }, "value": [null] })))
            .respond("getSignatureStatuses", status("processed"))
            .respond("getSignatureStatuses", status("confirmed")));

        let result = await_confirmation(
            &client,
            &Signature::new([1; 64]),
            Commitment::Confirmed,
            Duration::from_secs(10),
            Duration::from_millis(500),
        )
        .await
        .unwrap();
        assert_eq!(result.confirmation_status, Some(Commitment::Confirmed));
        assert_eq!(mock.calls_to("getSignatureStatuses").len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn await_confirmation_gives_up_after_timeout() {
        let mut mock = MockTransport::new();
        for _ in 0..10 {
            mock = mock.respond(
                "getSignatureStatuses",
                Ok(json!({ "context": { "slot": 1 }, "value": [null] })),
            );
        }
        let (client, _) = rpc(mock);

        let result = await_confirmation(
            &client,
            &Signature::new([1; 64]),
            Commitment::Confirmed,
            Duration::from_secs(2),
            Duration::from_millis(500),
        )
        .await;
        assert!(result.is_none());
    }
}
