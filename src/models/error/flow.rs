use solana_sdk::signature::Signature;
use strum::Display;
use thiserror::Error;

use super::TransferError;
use crate::models::BalancePair;

/// Stage of a transfer flow, reported when the flow fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum FlowStage {
    Snapshot,
    Build,
    Assemble,
    Sign,
    Submit,
    Confirm,
    Verify,
}

/// A transfer flow failure tagged with the stage that failed and the values
/// observed up to that point.
#[derive(Error, Debug)]
#[error("Transfer failed at {stage} stage: {source}")]
pub struct FlowError {
    pub stage: FlowStage,
    pub source: TransferError,
    pub signature: Option<Signature>,
    pub pre_balances: Option<BalancePair>,
}

impl FlowError {
    pub fn new(stage: FlowStage, source: TransferError) -> Self {
        Self {
            stage,
            source,
            signature: None,
            pre_balances: None,
        }
    }

    pub fn with_signature(mut self, signature: Signature) -> Self {
        self.signature = Some(signature);
        self
    }

    pub fn with_pre_balances(mut self, pre: BalancePair) -> Self {
        self.pre_balances = Some(pre);
        self
    }
}
