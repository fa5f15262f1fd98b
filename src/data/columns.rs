//! Column headers of the market extract.

pub const SUPPORT_CATEGORY: &str = "Support Category";
pub const STATE_TERRITORY: &str = "State/Territory";
pub const PERIOD: &str = "Period";

// Market by Total
pub const PAYMENTS: &str = "Payments";
pub const COMMITTED_SUPPORTS: &str = "Committed supports";
pub const UTILISATION: &str = "Utilisation";

// ActPrtpnt by Total
pub const ACTIVE_PARTICIPANTS: &str = "Active participants";
pub const AVERAGE_COMMITTED: &str = "Average committed support";
pub const AVERAGE_PAYMENTS: &str = "Average payments";

// Provider by Total
pub const ACTIVE_PROVIDER: &str = "Active provider";

pub const MARKET: &[&str] = &[
    SUPPORT_CATEGORY,
    STATE_TERRITORY,
    PERIOD,
    PAYMENTS,
    COMMITTED_SUPPORTS,
    UTILISATION,
];

pub const PARTICIPANTS: &[&str] = &[
    SUPPORT_CATEGORY,
    STATE_TERRITORY,
    PERIOD,
    ACTIVE_PARTICIPANTS,
    AVERAGE_COMMITTED,
    AVERAGE_PAYMENTS,
];

pub const PROVIDERS: &[&str] = &[SUPPORT_CATEGORY, STATE_TERRITORY, PERIOD, ACTIVE_PROVIDER];
