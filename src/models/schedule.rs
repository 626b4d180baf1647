//! Schedule event enums and simulator models

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Kind of ledger line produced by the schedule generator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// Partial first-period payout covering only the days between start
    /// and the first payment date
    ProRataDividend,
    MonthlyDividend,
    ConsultantCommission,
    LeaderCommission,
    /// Final return of the original principal at maturity
    CapitalReturn,
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventKind::ProRataDividend => write!(f, "pro_rata_dividend"),
            EventKind::MonthlyDividend => write!(f, "monthly_dividend"),
            EventKind::ConsultantCommission => write!(f, "consultant_commission"),
            EventKind::LeaderCommission => write!(f, "leader_commission"),
            EventKind::CapitalReturn => write!(f, "capital_return"),
        }
    }
}

impl std::str::FromStr for EventKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pro_rata_dividend" => Ok(EventKind::ProRataDividend),
            "monthly_dividend" => Ok(EventKind::MonthlyDividend),
            "consultant_commission" => Ok(EventKind::ConsultantCommission),
            "leader_commission" => Ok(EventKind::LeaderCommission),
            "capital_return" => Ok(EventKind::CapitalReturn),
            _ => Err(format!("Unknown event kind: {}", s)),
        }
    }
}

/// Party a ledger line pays out to; mutually exclusive per event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Beneficiary {
    Client,
    Consultant,
    Leader,
}

impl std::fmt::Display for Beneficiary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Beneficiary::Client => write!(f, "client"),
            Beneficiary::Consultant => write!(f, "consultant"),
            Beneficiary::Leader => write!(f, "leader"),
        }
    }
}

/// Body of POST /api/simulator/projection
#[derive(Debug, Clone, Deserialize)]
pub struct SimulationRequest {
    pub principal: Decimal,
    /// Monthly rate as a percentage (e.g. 2 = 2% per month)
    pub monthly_rate: Decimal,
    pub term_months: i32,
    pub start_date: NaiveDate,
    /// Include the 4% consultant commission lines
    #[serde(default = "default_true")]
    pub with_consultant: bool,
    /// Include the one-time 0.10% leader participation fee
    #[serde(default)]
    pub with_leader: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize)]
pub struct SimulatedEvent {
    pub date: NaiveDate,
    pub amount: Decimal,
    pub kind: EventKind,
    pub beneficiary: Beneficiary,
    pub label: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SimulationSummary {
    pub monthly_dividend: Decimal,
    /// Sum of all client dividend lines (pro-rata + monthly)
    pub total_dividend: Decimal,
    pub first_payment_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Serialize)]
pub struct SimulationResponse {
    pub summary: SimulationSummary,
    pub events: Vec<SimulatedEvent>,
}
