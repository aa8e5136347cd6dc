//! A deterministic oracle used by the reflection loop's own tests and by
//! callers wiring up a dry-run agent.

use std::sync::Mutex;

use tokio_util::sync::CancellationToken;

use crate::oracle::{Oracle, OracleRequest, OracleResponse, OracleResult};

/// Replies with a fixed sequence of responses, one per call. Once exhausted,
/// repeats the last response. Useful for scripting end-to-end scenarios
/// without a real model behind the loop.
pub struct StaticOracle {
    responses: Mutex<Vec<OracleResponse>>,
    calls: Mutex<Vec<OracleRequest>>,
}

impl StaticOracle {
    /// Creates an oracle that always returns the same response.
    #[must_use]
    pub fn always(response: OracleResponse) -> Self {
        Self::sequence(vec![response])
    }

    /// Creates an oracle that replies with `text` verbatim on every call.
    #[must_use]
    pub fn reply(text: impl Into<String>) -> Self {
        Self::always(OracleResponse::new(text))
    }

    /// Creates an oracle that plays back `responses` in order, repeating the
    /// last one once the sequence is exhausted.
    ///
    /// # Panics
    ///
    /// Panics if `responses` is empty.
    #[must_use]
    pub fn sequence(responses: Vec<OracleResponse>) -> Self {
        assert!(!responses.is_empty(), "StaticOracle requires at least one response");
        Self {
            responses: Mutex::new(responses),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Returns every request this oracle has observed so far, in order.
    ///
    /// # Panics
    ///
    /// Panics if the internal call-log lock has been poisoned.
    #[must_use]
    pub fn calls(&self) -> Vec<OracleRequest> {
        self.calls.lock().expect("static oracle call log poisoned").clone()
    }
}

#[async_trait::async_trait]
impl Oracle for StaticOracle {
    async fn complete(
        &self,
        request: OracleRequest,
        _cancellation: CancellationToken,
    ) -> OracleResult<OracleResponse> {
        self.calls
            .lock()
            .expect("static oracle call log poisoned")
            .push(request);

        let guard = self.responses.lock().expect("static oracle responses poisoned");
        let index = (self.calls.lock().expect("static oracle call log poisoned").len() - 1)
            .min(guard.len() - 1);
        Ok(guard[index].clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn always_repeats_the_same_response() {
        let oracle = StaticOracle::reply("IDLE: nothing to do");
        let request = OracleRequest::single_turn("sys", "what now?", 64, 0.3);

        let first = oracle
            .complete(request.clone(), CancellationToken::new())
            .await
            .unwrap();
        let second = oracle.complete(request, CancellationToken::new()).await.unwrap();

        assert_eq!(first.text, "IDLE: nothing to do");
        assert_eq!(second.text, first.text);
        assert_eq!(oracle.calls().len(), 2);
    }

    #[tokio::test]
    async fn sequence_repeats_last_entry_after_exhaustion() {
        let oracle = StaticOracle::sequence(vec![
            OracleResponse::new("IDLE: nothing to do"),
            OracleResponse::new("GOAL: ship the release"),
        ]);
        let request = OracleRequest::single_turn("sys", "what now?", 64, 0.3);

        let first = oracle
            .complete(request.clone(), CancellationToken::new())
            .await
            .unwrap();
        let second = oracle
            .complete(request.clone(), CancellationToken::new())
            .await
            .unwrap();
        let third = oracle.complete(request, CancellationToken::new()).await.unwrap();

        assert_eq!(first.text, "IDLE: nothing to do");
        assert_eq!(second.text, "GOAL: ship the release");
        assert_eq!(third.text, second.text);
    }
}
