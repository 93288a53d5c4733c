use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, Timestamp, Uint128};
use cw_storage_plus::{Item, Map};
use sweepstakes_common::types::{
    DrawKind, DrawStatus, EntryBreakdown, EntrySource, SelectionMethod,
};

pub const CONFIG: Item<EngineConfig> = Item::new("config");
pub const ENGINE_STATE: Item<EngineState> = Item::new("engine_state");
pub const DRAWS: Map<u64, Draw> = Map::new("draws");

/// One aggregate per (draw, user) pair; the composite key is the
/// uniqueness constraint.
pub const ENTRIES: Map<(u64, &Addr), EntryAggregate> = Map::new("entries");
/// Next insertion sequence per draw. Winner selection walks aggregates in
/// seq order, so the virtual ticket sequence is stable.
pub const ENTRY_SEQ: Map<u64, u32> = Map::new("entry_seq");

/// Per-cycle winner archive keyed (draw_id, cycle). Mini-draw restarts
/// reset the live document but never this map.
pub const WINNERS: Map<(u64, u64), WinnerRecord> = Map::new("winners");
pub const USER_WIN_COUNT: Map<&Addr, u32> = Map::new("user_win_count");

/// Idempotency ledger for purchase-driven awards, keyed
/// (event_type, payment_intent_id).
pub const BENEFIT_EVENTS: Map<(&str, &str), BenefitEvent> = Map::new("benefit_events");

/// Awards that found no active or queued draw, held for operator replay.
pub const UNROUTED_EVENTS: Map<u64, UnroutedEvent> = Map::new("unrouted_events");
pub const NEXT_UNROUTED_ID: Item<u64> = Item::new("next_unrouted_id");

#[cw_serde]
pub struct EngineConfig {
    pub admin: Addr,
    pub operator: Addr,
    /// Default freeze lead: a draw created without freeze_entries_at stops
    /// counting entries this many seconds before draw_at.
    pub freeze_lead_seconds: u64,
    /// How long a completed draw keeps being displayed before the UI moves
    /// on to the next queued draw. Per-draw override: Draw.gap_grace_seconds.
    pub default_gap_grace_seconds: u64,
}

#[cw_serde]
pub struct EngineState {
    pub next_draw_id: u64,
    pub total_draws_completed: u64,
    pub total_entries_awarded: u64,
}

#[cw_serde]
pub struct Prize {
    pub name: String,
    pub description: String,
    pub value: Uint128,
    pub image_urls: Vec<String>,
    pub category: String,
}

#[cw_serde]
pub struct Draw {
    pub id: u64,
    pub kind: DrawKind,
    pub name: String,
    pub description: String,
    pub prize: Prize,
    /// Draw becomes visible and starts accepting entries.
    pub activation_at: Timestamp,
    /// Entries stop counting toward this draw's pool.
    pub freeze_entries_at: Timestamp,
    /// Winner selection becomes eligible.
    pub draw_at: Timestamp,
    /// Write-cache of the derived status, refreshed by the sweep. Reads
    /// derive the effective status instead of trusting this field.
    pub status: DrawStatus,
    /// Legacy mirror of status == Active.
    pub is_active: bool,
    /// One-way within a cycle; set by LockConfiguration.
    pub configuration_locked: bool,
    pub locked_at: Option<Timestamp>,
    /// Cached sum of all aggregate totals for this cycle.
    pub total_entries: u64,
    pub num_entrants: u32,
    pub winner: Option<WinnerRecord>,
    /// Mini draws restart on the same document and bump this; major draws
    /// stay at cycle 1 and repeat as new documents.
    pub cycle: u64,
    /// Display floor for the storefront; not enforced by selection.
    pub min_entries: Option<u64>,
    pub gap_grace_seconds: Option<u64>,
    pub created_at: Timestamp,
    pub cancelled_at: Option<Timestamp>,
}

impl Draw {
    pub fn gap_grace(&self, default_seconds: u64) -> u64 {
        self.gap_grace_seconds.unwrap_or(default_seconds)
    }
}

#[cw_serde]
pub struct WinnerRecord {
    pub user: Addr,
    /// 1-indexed ordinal in the draw's virtual ticket sequence.
    pub entry_number: u64,
    pub selected_at: Timestamp,
    pub notified: bool,
    pub method: SelectionMethod,
    pub selected_by: Addr,
}

#[cw_serde]
pub struct EntryAggregate {
    pub user: Addr,
    /// Insertion order within the draw's current cycle.
    pub seq: u32,
    pub total_entries: u64,
    pub by_source: EntryBreakdown,
    pub first_added_at: Timestamp,
    pub last_updated_at: Timestamp,
}

#[cw_serde]
pub struct BenefitEvent {
    pub event_type: String,
    pub payment_intent_id: String,
    pub user: Addr,
    /// None while the award sits in the unrouted queue.
    pub draw_id: Option<u64>,
    pub source: EntrySource,
    pub count: u64,
    pub granted_at: Timestamp,
}

#[cw_serde]
pub struct UnroutedEvent {
    pub id: u64,
    pub user: Addr,
    pub kind: DrawKind,
    pub source: EntrySource,
    pub count: u64,
    /// Idempotency key of the paid benefit this award settles. Only keyed
    /// (purchase-driven) awards are parked; manual grants fail fast.
    pub event_type: String,
    pub payment_intent_id: String,
    pub received_at: Timestamp,
}
