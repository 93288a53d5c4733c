pub mod selection;
pub mod types;

pub use selection::{derive_randomness, locate_ticket, winning_ticket};
pub use types::{DrawKind, DrawStatus, EntryBreakdown, EntrySource, SelectionMethod};
