//! Inbound signal schema and response bodies

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::common::errors::ReconcileError;
use crate::reconciler::{DesiredSignal, ExecutionReport};

/// JSON body accepted by the signal endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalPayload {
    pub symbol: String,
    /// Desired signed position: a JSON number or a numeric string
    pub target_size: SizeField,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SizeField {
    Number(serde_json::Number),
    Text(String),
}

impl SizeField {
    fn to_decimal(&self) -> Option<Decimal> {
        let raw = match self {
            SizeField::Number(n) => n.to_string(),
            SizeField::Text(s) => s.trim().to_string(),
        };
        Decimal::from_str(&raw)
            .or_else(|_| Decimal::from_scientific(&raw))
            .ok()
    }
}

impl TryFrom<SignalPayload> for DesiredSignal {
    type Error = ReconcileError;

    fn try_from(payload: SignalPayload) -> Result<Self, Self::Error> {
        let size = payload.target_size.to_decimal().ok_or_else(|| {
            ReconcileError::InvalidSignal(format!(
                "target_size {:?} is not a number",
                payload.target_size
            ))
        })?;

        let signal = DesiredSignal::new(&payload.symbol, size)?;
        Ok(match payload.comment.filter(|c| !c.is_empty()) {
            Some(comment) => signal.with_comment(comment),
            None => signal,
        })
    }
}

/// Body returned for a reconciliation that ran
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeResponse {
    pub message: String,
    pub report: ExecutionReport,
}

/// Body returned when a request is rejected or fails
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub kind: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<ExecutionReport>,
}
