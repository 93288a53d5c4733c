use cosmwasm_std::Timestamp;
use sweepstakes_common::types::DrawStatus;

use crate::state::Draw;

/// Derive the effective lifecycle status of a draw at `now`.
///
/// The persisted status can lag reality between sweeps (nothing guarantees
/// a write at the exact freeze or draw instant), so every read path derives
/// the status from the dates. Cancelled is terminal and overrides the time
/// logic; a persisted Completed never reopens.
pub fn resolve_status(draw: &Draw, now: Timestamp) -> DrawStatus {
    if draw.status == DrawStatus::Cancelled {
        return DrawStatus::Cancelled;
    }
    if draw.status == DrawStatus::Completed || now >= draw.draw_at {
        return DrawStatus::Completed;
    }
    if now >= draw.freeze_entries_at {
        return DrawStatus::Frozen;
    }
    if now < draw.activation_at {
        return DrawStatus::Queued;
    }
    DrawStatus::Active
}

/// Whether admin mutation of the draw's configuration is blocked.
///
/// Frozen and completed draws are locked by status; the persisted one-way
/// flag locks earlier. Cancelled draws stay editable (admins may still
/// annotate them) — entry awards to them are blocked separately by
/// `accepts_entries`.
pub fn is_locked(draw: &Draw, now: Timestamp) -> bool {
    if draw.configuration_locked {
        return true;
    }
    matches!(
        resolve_status(draw, now),
        DrawStatus::Frozen | DrawStatus::Completed
    )
}

/// Whether the draw still accepts entries at `now`.
pub fn accepts_entries(draw: &Draw, now: Timestamp) -> bool {
    matches!(
        resolve_status(draw, now),
        DrawStatus::Queued | DrawStatus::Active
    )
}

/// Whether a completed draw is still inside its display grace window —
/// the stretch after `draw_at` during which the storefront keeps showing
/// "draw ended, winner announcement pending" instead of jumping to the
/// next queued draw.
pub fn ended_within_grace(draw: &Draw, now: Timestamp, default_grace_seconds: u64) -> bool {
    if resolve_status(draw, now) != DrawStatus::Completed {
        return false;
    }
    now < draw.draw_at.plus_seconds(draw.gap_grace(default_grace_seconds))
}

/// Whole seconds until `instant`; None once it has passed.
pub fn seconds_until(now: Timestamp, instant: Timestamp) -> Option<u64> {
    if now >= instant {
        None
    } else {
        Some(instant.seconds() - now.seconds())
    }
}
