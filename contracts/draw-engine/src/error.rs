use cosmwasm_std::StdError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContractError {
    #[error("{0}")]
    Std(#[from] StdError),

    #[error("unauthorized: {reason}")]
    Unauthorized { reason: String },

    #[error("draw {draw_id} not found")]
    DrawNotFound { draw_id: u64 },

    #[error("draw {draw_id} is {status} and no longer accepts entries")]
    DrawLocked { draw_id: u64, status: String },

    #[error("draw {draw_id} configuration is locked")]
    ConfigurationLocked { draw_id: u64 },

    #[error("no active or queued {kind} draw available")]
    NoAvailableDraw { kind: String },

    #[error("draw {draw_id} already has a winner")]
    WinnerAlreadySelected { draw_id: u64 },

    #[error("draw {draw_id} has no winner selected")]
    NoWinnerSelected { draw_id: u64 },

    #[error("draw {draw_id} has no entries")]
    NoEntries { draw_id: u64 },

    #[error("entry count must be positive, got {count}")]
    InvalidEntryCount { count: u64 },

    #[error("draw {draw_id} is {status}; winner selection requires a completed draw")]
    DrawNotCompleted { draw_id: u64, status: String },

    #[error("entry number {entry_number} out of range 1..={total_entries}")]
    EntryNumberOutOfRange {
        entry_number: u64,
        total_entries: u64,
    },

    #[error("benefit already granted for ({event_type}, {payment_intent_id})")]
    BenefitAlreadyGranted {
        event_type: String,
        payment_intent_id: String,
    },

    #[error("invalid schedule: {reason}")]
    InvalidSchedule { reason: String },

    #[error("invalid seed: {reason}")]
    InvalidSeed { reason: String },

    #[error("draw {draw_id} is not a mini draw")]
    NotAMiniDraw { draw_id: u64 },

    #[error("draw {draw_id} cycle is still {status}; restart requires a finished cycle")]
    CycleStillRunning { draw_id: u64, status: String },

    #[error("invalid config value: {field} = {value}")]
    InvalidConfigValue { field: String, value: u64 },
}
