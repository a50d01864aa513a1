//! Threshold input parsing and per-field bookkeeping.
//!
//! A field only ever forwards values that parse as a base-10 integer, lie
//! within the configured bounds and keep `min <= max`.

use crate::protocol::{Command, RequestId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Instant;
use thiserror::Error;

/// Inclusive range accepted for both thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdBounds {
    pub lower: i32,
    pub upper: i32,
}

impl ThresholdBounds {
    pub fn contains(&self, value: i32) -> bool {
        (self.lower..=self.upper).contains(&value)
    }
}

impl Default for ThresholdBounds {
    fn default() -> Self {
        Self { lower: 0, upper: 100 }
    }
}

/// Why a threshold edit was not forwarded
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ThresholdError {
    #[error("'{0}' is not a whole number")]
    NotANumber(String),

    #[error("{value} is outside {lower}..={upper}")]
    OutOfRange { value: i32, lower: i32, upper: i32 },

    #[error("min {min} is above max {max}")]
    MinAboveMax { min: i32, max: i32 },

    #[error("max {max} is below min {min}")]
    MaxBelowMin { max: i32, min: i32 },

    #[error("rejected: {0}")]
    Rejected(String),
}

/// Parse raw field text. Blank input yields `Ok(None)`.
pub fn parse(raw: &str, bounds: ThresholdBounds) -> Result<Option<i32>, ThresholdError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let value: i32 = trimmed
        .parse()
        .map_err(|_| ThresholdError::NotANumber(trimmed.to_string()))?;

    if !bounds.contains(value) {
        return Err(ThresholdError::OutOfRange {
            value,
            lower: bounds.lower,
            upper: bounds.upper,
        });
    }

    Ok(Some(value))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThresholdKind {
    Min,
    Max,
}

impl ThresholdKind {
    pub fn command(&self, value: i32) -> Command {
        match self {
            ThresholdKind::Min => Command::SetMinThreshold { new_min_threshold: value },
            ThresholdKind::Max => Command::SetMaxThreshold { new_max_threshold: value },
        }
    }
}

impl fmt::Display for ThresholdKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThresholdKind::Min => f.write_str("Min"),
            ThresholdKind::Max => f.write_str("Max"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct PendingValue {
    value: i32,
    due: Instant,
}

/// State of one threshold input
#[derive(Debug, Clone)]
pub struct ThresholdField {
    kind: ThresholdKind,
    text: String,
    error: Option<ThresholdError>,
    pending: Option<PendingValue>,
    in_flight: BTreeMap<RequestId, i32>,
    confirmed: i32,
    confirmed_id: Option<RequestId>,
}

impl ThresholdField {
    pub fn new(kind: ThresholdKind, initial: i32) -> Self {
        Self {
            kind,
            text: String::new(),
            error: None,
            pending: None,
            in_flight: BTreeMap::new(),
            confirmed: initial,
            confirmed_id: None,
        }
    }

    pub fn kind(&self) -> ThresholdKind {
        self.kind
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn error(&self) -> Option<&ThresholdError> {
        self.error.as_ref()
    }

    /// Last value the backend acknowledged
    pub fn confirmed(&self) -> i32 {
        self.confirmed
    }

    pub fn pending_value(&self) -> Option<i32> {
        self.pending.map(|p| p.value)
    }

    /// Newest request still waiting on the backend
    pub fn in_flight(&self) -> Option<(RequestId, i32)> {
        self.in_flight.iter().next_back().map(|(id, value)| (*id, *value))
    }

    /// Value the backend has, or will have once the newest in-flight call lands
    pub fn last_forwarded(&self) -> i32 {
        self.in_flight().map_or(self.confirmed, |(_, value)| value)
    }

    /// Value used when checking the other field against this one
    pub fn effective(&self) -> i32 {
        self.pending_value().unwrap_or_else(|| self.last_forwarded())
    }

    /// Replace the text and validate it against the bounds and the other field.
    ///
    /// On error the message is kept on the field and any pending value is
    /// dropped.
    pub fn edit(
        &mut self,
        raw: &str,
        bounds: ThresholdBounds,
        other: i32,
    ) -> Result<Option<i32>, ThresholdError> {
        self.text = raw.to_string();
        let checked = parse(raw, bounds).and_then(|value| match value {
            Some(value) => self.check_order(value, other).map(Some),
            None => Ok(None),
        });

        match &checked {
            Ok(_) => self.error = None,
            Err(e) => self.error = Some(e.clone()),
        }
        if !matches!(checked, Ok(Some(_))) {
            self.pending = None;
        }
        checked
    }

    fn check_order(&self, value: i32, other: i32) -> Result<i32, ThresholdError> {
        match self.kind {
            ThresholdKind::Min if value > other => Err(ThresholdError::MinAboveMax { min: value, max: other }),
            ThresholdKind::Max if value < other => Err(ThresholdError::MaxBelowMin { max: value, min: other }),
            _ => Ok(value),
        }
    }

    pub fn schedule(&mut self, value: i32, due: Instant) {
        self.pending = Some(PendingValue { value, due });
    }

    pub fn clear_pending(&mut self) {
        self.pending = None;
    }

    /// Take the pending value if its deadline has passed
    pub fn take_due(&mut self, now: Instant) -> Option<i32> {
        match self.pending {
            Some(p) if p.due <= now => {
                self.pending = None;
                Some(p.value)
            }
            _ => None,
        }
    }

    pub fn take_pending(&mut self) -> Option<i32> {
        self.pending.take().map(|p| p.value)
    }

    pub fn mark_sent(&mut self, id: RequestId, value: i32) {
        self.in_flight.insert(id, value);
    }

    /// Settle request `id`. Its value becomes confirmed unless a newer
    /// request was already acknowledged.
    pub fn acknowledge(&mut self, id: RequestId) -> bool {
        let Some(value) = self.in_flight.remove(&id) else {
            return false;
        };
        if self.confirmed_id.map_or(true, |confirmed| id > confirmed) {
            self.confirmed = value;
            self.confirmed_id = Some(id);
        }
        true
    }

    /// Drop request `id` and show the backend's reason. `last_forwarded`
    /// falls back to the newest remaining request or the confirmed value.
    pub fn reject(&mut self, id: RequestId, reason: String) -> bool {
        if self.in_flight.remove(&id).is_none() {
            return false;
        }
        self.error = Some(ThresholdError::Rejected(reason));
        true
    }

    /// Clear the text, error and pending edit
    pub fn reset(&mut self) {
        self.text.clear();
        self.error = None;
        self.pending = None;
    }
}
