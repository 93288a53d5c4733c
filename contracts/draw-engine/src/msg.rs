use cosmwasm_schema::{cw_serde, QueryResponses};
use cosmwasm_std::Timestamp;
use sweepstakes_common::types::{DrawKind, DrawStatus, EntrySource};

use crate::state::{
    BenefitEvent, Draw, EngineConfig, EngineState, EntryAggregate, Prize, UnroutedEvent,
    WinnerRecord,
};

#[cw_serde]
pub struct InstantiateMsg {
    pub operator: String,
    /// Seconds before draw_at at which entries freeze when a draw is
    /// created without an explicit freeze_entries_at. Default 1800.
    pub freeze_lead_seconds: Option<u64>,
    /// Seconds a completed draw keeps being displayed before the storefront
    /// moves on to the next queued draw. Default 14400.
    pub default_gap_grace_seconds: Option<u64>,
}

#[cw_serde]
pub struct CreateDrawParams {
    pub kind: DrawKind,
    pub name: String,
    pub description: String,
    pub prize: Prize,
    pub activation_at: Timestamp,
    /// Defaults to draw_at minus the configured freeze lead.
    pub freeze_entries_at: Option<Timestamp>,
    pub draw_at: Timestamp,
    pub min_entries: Option<u64>,
    pub gap_grace_seconds: Option<u64>,
}

#[cw_serde]
pub struct UpdateDrawParams {
    pub draw_id: u64,
    pub name: Option<String>,
    pub description: Option<String>,
    pub prize: Option<Prize>,
    pub activation_at: Option<Timestamp>,
    pub freeze_entries_at: Option<Timestamp>,
    pub draw_at: Option<Timestamp>,
    pub min_entries: Option<u64>,
    pub gap_grace_seconds: Option<u64>,
}

#[cw_serde]
pub struct AwardEntriesParams {
    pub user: String,
    pub source: EntrySource,
    pub count: u64,
    /// Explicit target draw; routed via the entry-target selector when absent.
    pub draw_id: Option<u64>,
    /// Routing pool when no explicit target is given. Default Major.
    pub kind: Option<DrawKind>,
    /// Idempotency key of the paid benefit this award settles. Both parts
    /// must be given together; awards without a key are unguarded.
    pub event_type: Option<String>,
    pub payment_intent_id: Option<String>,
}

/// How to pick the winning ticket.
#[cw_serde]
pub enum WinnerSelection {
    /// Weighted pseudo-random pick derived from a hex-encoded seed.
    Seeded { seed_hex: String },
    /// Audit/re-run path: 1-indexed ticket number supplied directly.
    Manual { entry_number: u64 },
}

#[cw_serde]
pub enum ExecuteMsg {
    /// Create a draw in queued or active state. Admin only.
    CreateDraw {
        kind: DrawKind,
        name: String,
        description: String,
        prize: Prize,
        activation_at: Timestamp,
        freeze_entries_at: Option<Timestamp>,
        draw_at: Timestamp,
        min_entries: Option<u64>,
        gap_grace_seconds: Option<u64>,
    },
    /// Patch an unlocked draw's configuration. Admin only.
    UpdateDraw {
        draw_id: u64,
        name: Option<String>,
        description: Option<String>,
        prize: Option<Prize>,
        activation_at: Option<Timestamp>,
        freeze_entries_at: Option<Timestamp>,
        draw_at: Option<Timestamp>,
        min_entries: Option<u64>,
        gap_grace_seconds: Option<u64>,
    },
    /// One-way configuration lock. Admin only.
    LockConfiguration { draw_id: u64 },
    /// Cancel a draw at any point before completion. Admin only.
    CancelDraw { draw_id: u64 },
    /// Credit entries to a user. Operator only.
    AwardEntries {
        user: String,
        source: EntrySource,
        count: u64,
        draw_id: Option<u64>,
        kind: Option<DrawKind>,
        event_type: Option<String>,
        payment_intent_id: Option<String>,
    },
    /// Pick the winner of a completed draw. Admin or operator.
    SelectWinner {
        draw_id: u64,
        selection: WinnerSelection,
    },
    /// Record that the winner has been notified. Operator only.
    MarkWinnerNotified { draw_id: u64 },
    /// Persist derived statuses for non-terminal draws. Anyone can call.
    SweepStatus { limit: Option<u32> },
    /// Start the next cycle of a finished mini draw on the same document.
    /// Admin only.
    RestartMiniDraw {
        draw_id: u64,
        activation_at: Timestamp,
        freeze_entries_at: Option<Timestamp>,
        draw_at: Timestamp,
    },
    /// Re-route awards that previously found no draw. Operator only.
    ReplayUnrouted { limit: Option<u32> },
    /// Update engine configuration. Admin only.
    UpdateConfig {
        admin: Option<String>,
        operator: Option<String>,
        freeze_lead_seconds: Option<u64>,
        default_gap_grace_seconds: Option<u64>,
    },
}

#[cw_serde]
#[derive(QueryResponses)]
pub enum QueryMsg {
    #[returns(EngineConfig)]
    Config {},
    #[returns(EngineState)]
    EngineState {},
    /// The raw draw document, persisted status included.
    #[returns(Draw)]
    Draw { draw_id: u64 },
    /// Persisted vs. effective status, lock state, and countdowns.
    #[returns(DrawStatusResponse)]
    DrawStatus { draw_id: u64 },
    /// The draw the storefront should show right now, if any.
    #[returns(Option<DrawSummary>)]
    DisplayDraw { kind: DrawKind },
    /// The draw new entries would count toward right now. Errors when no
    /// active or queued draw exists.
    #[returns(DrawSummary)]
    EntryTarget { kind: DrawKind },
    #[returns(Vec<DrawSummary>)]
    Draws {
        kind: Option<DrawKind>,
        start_after: Option<u64>,
        limit: Option<u32>,
    },
    #[returns(EntriesResponse)]
    Entries {
        draw_id: u64,
        start_after: Option<String>,
        limit: Option<u32>,
    },
    #[returns(Option<EntryAggregate>)]
    UserEntries { draw_id: u64, address: String },
    #[returns(Option<WinnerRecord>)]
    Winner { draw_id: u64 },
    /// Per-cycle winner archive; survives mini-draw restarts.
    #[returns(Vec<WinnerHistoryEntry>)]
    WinnerHistory {
        draw_id: u64,
        start_after: Option<u64>,
        limit: Option<u32>,
    },
    #[returns(u32)]
    UserWinCount { address: String },
    #[returns(Vec<UnroutedEvent>)]
    UnroutedEvents {
        start_after: Option<u64>,
        limit: Option<u32>,
    },
    #[returns(Option<BenefitEvent>)]
    BenefitEvent {
        event_type: String,
        payment_intent_id: String,
    },
}

#[cw_serde]
pub struct MigrateMsg {}

#[cw_serde]
pub struct DrawStatusResponse {
    pub draw_id: u64,
    pub persisted_status: DrawStatus,
    pub effective_status: DrawStatus,
    pub locked: bool,
    pub cycle: u64,
    pub total_entries: u64,
    pub seconds_until_activation: Option<u64>,
    pub seconds_until_freeze: Option<u64>,
    pub seconds_until_draw: Option<u64>,
}

#[cw_serde]
pub struct DrawSummary {
    pub draw: Draw,
    pub effective_status: DrawStatus,
}

#[cw_serde]
pub struct EntriesResponse {
    pub draw_id: u64,
    pub total_entries: u64,
    pub entries: Vec<EntryAggregate>,
}

#[cw_serde]
pub struct WinnerHistoryEntry {
    pub cycle: u64,
    pub winner: WinnerRecord,
}
