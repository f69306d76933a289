//! Hand-off of a prediction result from the predict flow to the results view
//!
//! The result lives only in memory and is consumed by the first view that
//! receives it. Restarting the client loses it; the results view then shows
//! its fallback.

use super::results::PredictionResult;
use uuid::Uuid;

/// Data carried across the Predict -> Results transition
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionHandoff {
    pub submission_id: Uuid,
    pub result: PredictionResult,
    pub name: String,
    pub age: String,
}

/// Single-slot, take-once store for the last prediction
#[derive(Debug, Default)]
pub struct ResultHandoff {
    slot: Option<PredictionHandoff>,
}

impl ResultHandoff {
    /// Store a result for the next results view. Replaces anything unclaimed.
    pub fn handoff(&mut self, handoff: PredictionHandoff) {
        if let Some(stale) = self.slot.replace(handoff) {
            tracing::debug!(submission_id = %stale.submission_id, "Dropping unclaimed prediction");
        }
    }

    /// Take the pending result, leaving the slot empty
    pub fn receive(&mut self) -> Option<PredictionHandoff> {
        self.slot.take()
    }

    pub fn is_pending(&self) -> bool {
        self.slot.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handoff_with(likelihood: u8) -> PredictionHandoff {
        PredictionHandoff {
            submission_id: Uuid::new_v4(),
            result: PredictionResult::new(likelihood, "See a doctor"),
            name: "Ada".to_string(),
            age: "36".to_string(),
        }
    }

    #[test]
    fn test_receive_without_handoff_is_none() {
        let mut bridge = ResultHandoff::default();
        assert!(bridge.receive().is_none());
    }

    #[test]
    fn test_receive_consumes() {
        let mut bridge = ResultHandoff::default();
        bridge.handoff(handoff_with(85));
        assert!(bridge.is_pending());

        let received = bridge.receive().unwrap();
        assert_eq!(received.result.likelihood_percent, 85);
        assert!(bridge.receive().is_none());
    }

    #[test]
    fn test_newer_handoff_replaces_unclaimed() {
        let mut bridge = ResultHandoff::default();
        bridge.handoff(handoff_with(10));
        bridge.handoff(handoff_with(90));
        assert_eq!(bridge.receive().unwrap().result.likelihood_percent, 90);
    }
}
