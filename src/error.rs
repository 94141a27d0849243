//! Error taxonomy. Only three kinds ever propagate out of the public API;
//! everything else becomes a [`Warning`] attached to a plan or result.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SlicerError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("unknown output format: {0}")]
    UnknownFormat(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, SlicerError>;

/// Non-fatal categories: a strategy failed, reserved items blew the
/// budget, or the selection landed close enough to the ceiling to be worth
/// flagging. None of these abort the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    StrategyFailure,
    BudgetExceeded,
    NearBudget,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Warning {
    pub kind: WarningKind,
    pub message: String,
}

impl Warning {
    pub fn new(kind: WarningKind, message: impl Into<String>) -> Self {
        let message = message.into();
        match kind {
            WarningKind::StrategyFailure => tracing::warn!(%message, "strategy_failure"),
            WarningKind::BudgetExceeded => tracing::warn!(%message, "budget_exceeded"),
            WarningKind::NearBudget => tracing::warn!(%message, "near_budget"),
        }
        Self { kind, message }
    }
}
