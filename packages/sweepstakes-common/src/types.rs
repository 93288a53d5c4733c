use cosmwasm_schema::cw_serde;

/// The two draw variants: Major (flagship prize, one document per period)
/// or Mini (smaller recurring prize, one rolling document that cycles).
#[cw_serde]
pub enum DrawKind {
    Major,
    Mini,
}

impl DrawKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DrawKind::Major => "major",
            DrawKind::Mini => "mini",
        }
    }
}

/// The lifecycle status of a draw.
///
/// The persisted status is a write-cache; the effective status is always
/// re-derived from the draw's dates at read time.
#[cw_serde]
pub enum DrawStatus {
    Queued,
    Active,
    Frozen,
    Completed,
    Cancelled,
}

impl DrawStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DrawStatus::Queued => "queued",
            DrawStatus::Active => "active",
            DrawStatus::Frozen => "frozen",
            DrawStatus::Completed => "completed",
            DrawStatus::Cancelled => "cancelled",
        }
    }

    /// Completed and Cancelled are absorbing: no time-driven transition
    /// leaves them.
    pub fn is_terminal(&self) -> bool {
        matches!(self, DrawStatus::Completed | DrawStatus::Cancelled)
    }
}

/// Where an awarded entry came from.
///
/// A closed set: an unknown source tag fails message deserialization
/// instead of accumulating into an unindexed field.
#[cw_serde]
pub enum EntrySource {
    Membership,
    OneTimePackage,
    Upsell,
    MiniDraw,
}

impl EntrySource {
    pub const ALL: [EntrySource; 4] = [
        EntrySource::Membership,
        EntrySource::OneTimePackage,
        EntrySource::Upsell,
        EntrySource::MiniDraw,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntrySource::Membership => "membership",
            EntrySource::OneTimePackage => "one_time_package",
            EntrySource::Upsell => "upsell",
            EntrySource::MiniDraw => "mini_draw",
        }
    }
}

/// Per-source entry counters for one (draw, user) aggregate.
/// The field sum always equals the aggregate's cached total.
#[cw_serde]
#[derive(Default)]
pub struct EntryBreakdown {
    pub membership: u64,
    pub one_time_package: u64,
    pub upsell: u64,
    pub mini_draw: u64,
}

impl EntryBreakdown {
    pub fn add(&mut self, source: &EntrySource, count: u64) {
        match source {
            EntrySource::Membership => self.membership += count,
            EntrySource::OneTimePackage => self.one_time_package += count,
            EntrySource::Upsell => self.upsell += count,
            EntrySource::MiniDraw => self.mini_draw += count,
        }
    }

    pub fn get(&self, source: &EntrySource) -> u64 {
        match source {
            EntrySource::Membership => self.membership,
            EntrySource::OneTimePackage => self.one_time_package,
            EntrySource::Upsell => self.upsell,
            EntrySource::MiniDraw => self.mini_draw,
        }
    }

    pub fn total(&self) -> u64 {
        self.membership + self.one_time_package + self.upsell + self.mini_draw
    }
}

/// How a winner was picked: a seeded pseudo-random ticket draw, or a
/// manually supplied ticket number (audit/re-run path).
#[cw_serde]
pub enum SelectionMethod {
    Seeded,
    Manual,
}

impl SelectionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            SelectionMethod::Seeded => "seeded",
            SelectionMethod::Manual => "manual",
        }
    }
}
