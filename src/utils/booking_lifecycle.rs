use thiserror::Error;

use crate::models::booking::BookingStatus;

/// Rejected status change. Terminal states have no outgoing transitions and
/// same-state updates are not treated as changes.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("cannot change booking status from {from} to {to}")]
pub struct InvalidTransition {
    pub from: BookingStatus,
    pub to: BookingStatus,
}

/// The booking lifecycle:
///
///   pending -> confirmed -> completed
///   pending -> cancelled
///   confirmed -> cancelled
///
/// Confirmation happens on a paid deposit or by explicit artist action;
/// completion and cancellation are explicit actions only.
pub fn validate_transition(
    from: BookingStatus,
    to: BookingStatus,
) -> Result<(), InvalidTransition> {
    use BookingStatus::*;

    let allowed = matches!(
        (from, to),
        (Pending, Confirmed) | (Pending, Cancelled) | (Confirmed, Completed) | (Confirmed, Cancelled)
    );

    if allowed {
        Ok(())
    } else {
        Err(InvalidTransition { from, to })
    }
}
