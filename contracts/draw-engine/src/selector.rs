use cosmwasm_std::{Order, Storage, Timestamp};
use sweepstakes_common::types::{DrawKind, DrawStatus};

use crate::lifecycle::{ended_within_grace, resolve_status};
use crate::state::{Draw, DRAWS};

fn draws_of_kind(storage: &dyn Storage, kind: &DrawKind) -> Vec<Draw> {
    DRAWS
        .range(storage, None, None, Order::Ascending)
        .filter_map(|r| r.ok())
        .map(|(_, draw)| draw)
        .filter(|draw| &draw.kind == kind)
        .collect()
}

/// Which draw new entries should count toward right now.
///
/// Normal case: the active draw. During the gap between one draw completing
/// and the next activating, entries accrue to the earliest-activating queued
/// draw no matter how far out its activation is.
pub fn entry_target(storage: &dyn Storage, kind: &DrawKind, now: Timestamp) -> Option<Draw> {
    let draws = draws_of_kind(storage, kind);

    if let Some(draw) = draws
        .iter()
        .filter(|d| resolve_status(d, now) == DrawStatus::Active)
        .min_by_key(|d| d.activation_at)
    {
        return Some(draw.clone());
    }

    draws
        .iter()
        .filter(|d| resolve_status(d, now) == DrawStatus::Queued)
        .min_by_key(|d| d.activation_at)
        .cloned()
}

/// Which draw the storefront should show right now.
///
/// Differs from the entry target during the gap: the just-ended draw keeps
/// being shown inside its grace window ("winner announcement pending") so
/// the page never flashes to an empty future draw while one is still
/// wrapping up.
pub fn display_draw(
    storage: &dyn Storage,
    kind: &DrawKind,
    now: Timestamp,
    default_grace_seconds: u64,
) -> Option<Draw> {
    let draws = draws_of_kind(storage, kind);

    // A live draw first: active preferred, then frozen ("entries closed").
    for wanted in [DrawStatus::Active, DrawStatus::Frozen] {
        if let Some(draw) = draws
            .iter()
            .filter(|d| resolve_status(d, now) == wanted)
            .min_by_key(|d| d.draw_at)
        {
            return Some(draw.clone());
        }
    }

    // Most recently ended draw still inside its grace window.
    if let Some(draw) = draws
        .iter()
        .filter(|d| ended_within_grace(d, now, default_grace_seconds))
        .max_by_key(|d| d.draw_at)
    {
        return Some(draw.clone());
    }

    draws
        .iter()
        .filter(|d| resolve_status(d, now) == DrawStatus::Queued)
        .min_by_key(|d| d.activation_at)
        .cloned()
}
