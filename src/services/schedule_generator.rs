//! Schedule generator: the pure calculation core of the activation pipeline
//!
//! Given finalized contract terms, deterministically produces every ledger
//! line of the contract's lifetime: optional one-time leader fee, pro-rata
//! first dividend, monthly dividends with 4% consultant commissions, and
//! the final capital return. No I/O: any failure is a validation error
//! detectable before a single row is written.
//!
//! Payment convention: the platform pays on the 10th. Contracts starting
//! before the 7th catch the same month's payment run; later starts roll to
//! the following month, keeping at least a 3-day processing buffer before
//! the cut-off. Dividends use the commercial 30-day month as daily basis.

use chrono::{Datelike, Months, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

use crate::models::schedule::{Beneficiary, EventKind};

/// Day of month the platform pays out on
const PAYMENT_DAY: u32 = 10;

/// Start days strictly below this catch the same month's payment run
const SAME_MONTH_CUTOFF_DAY: u32 = 7;

/// Flat consultant override on every client dividend
const CONSULTANT_COMMISSION_RATE: Decimal = dec!(0.04);

/// One-time leader participation fee on the principal
const LEADER_SHARE_RATE: Decimal = dec!(0.0010);

/// Commercial month length used as the daily-rate basis
const COMMERCIAL_MONTH_DAYS: Decimal = dec!(30);

/// Finalized terms the generator works from. Party identities are resolved
/// later by the persister; the generator only needs to know which optional
/// beneficiaries exist.
#[derive(Debug, Clone)]
pub struct ContractTerms {
    pub principal: Decimal,
    /// Monthly rate as a percentage (2 = 2% per month)
    pub monthly_rate: Decimal,
    pub term_months: i32,
    pub start_date: NaiveDate,
    pub with_consultant: bool,
    pub with_leader: bool,
}

/// One generated ledger line, not yet persisted
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleEventDraft {
    /// Emission order within the schedule
    pub sequence: i32,
    pub beneficiary: Beneficiary,
    pub event_date: NaiveDate,
    pub amount: Decimal,
    pub kind: EventKind,
    pub label: String,
}

/// Validation errors for schedule generation
#[derive(Debug, Clone, PartialEq)]
pub enum ScheduleError {
    /// term_months < 1
    InvalidTerm(i32),
    /// Negative or zero principal, or negative rate
    InvalidAmount(String),
    /// Calendar arithmetic left the supported date range
    DateOverflow,
}

impl std::fmt::Display for ScheduleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScheduleError::InvalidTerm(term) => {
                write!(f, "Invalid term length: {} months", term)
            }
            ScheduleError::InvalidAmount(msg) => write!(f, "Invalid amount: {}", msg),
            ScheduleError::DateOverflow => write!(f, "Date arithmetic overflow"),
        }
    }
}

impl std::error::Error for ScheduleError {}

/// Round a monetary amount to cents, keeping exactly two decimal places
pub fn round_money(amount: Decimal) -> Decimal {
    let mut rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}

fn validate(terms: &ContractTerms) -> Result<(), ScheduleError> {
    if terms.term_months < 1 {
        return Err(ScheduleError::InvalidTerm(terms.term_months));
    }
    if terms.principal <= Decimal::ZERO {
        return Err(ScheduleError::InvalidAmount(format!(
            "principal must be positive, got {}",
            terms.principal
        )));
    }
    if terms.monthly_rate < Decimal::ZERO {
        return Err(ScheduleError::InvalidAmount(format!(
            "monthly rate must not be negative, got {}",
            terms.monthly_rate
        )));
    }
    Ok(())
}

/// The 10th of the month a given date falls in
fn payment_day_of(date: NaiveDate) -> Result<NaiveDate, ScheduleError> {
    NaiveDate::from_ymd_opt(date.year(), date.month(), PAYMENT_DAY)
        .ok_or(ScheduleError::DateOverflow)
}

fn add_months(date: NaiveDate, months: u32) -> Result<NaiveDate, ScheduleError> {
    date.checked_add_months(Months::new(months))
        .ok_or(ScheduleError::DateOverflow)
}

/// First payment date for a contract starting on `start_date`: the 10th of
/// the same month when the start day is before the 7th, otherwise the 10th
/// of the following month.
pub fn first_payment_date(start_date: NaiveDate) -> Result<NaiveDate, ScheduleError> {
    if start_date.day() < SAME_MONTH_CUTOFF_DAY {
        payment_day_of(start_date)
    } else {
        payment_day_of(add_months(start_date, 1)?)
    }
}

/// Contract end date: start plus the term in calendar months, with the day
/// clamped to the target month's last valid day.
pub fn compute_end_date(
    start_date: NaiveDate,
    term_months: i32,
) -> Result<NaiveDate, ScheduleError> {
    if term_months < 1 {
        return Err(ScheduleError::InvalidTerm(term_months));
    }
    add_months(start_date, term_months as u32)
}

/// Generate the full ordered ledger for a contract's lifetime.
///
/// Deterministic and side-effect free. Event dates within the client
/// dividend sequence are non-decreasing; the final draft is always exactly
/// one capital-return event for the full principal at the end date.
pub fn generate(terms: &ContractTerms) -> Result<Vec<ScheduleEventDraft>, ScheduleError> {
    validate(terms)?;

    let mut events = Vec::new();
    let draft = |beneficiary: Beneficiary,
                 event_date: NaiveDate,
                 amount: Decimal,
                 kind: EventKind,
                 label: String| ScheduleEventDraft {
        sequence: 0,
        beneficiary,
        event_date,
        amount,
        kind,
        label,
    };

    // One-time leader participation fee, dated at contract start
    if terms.with_leader {
        events.push(draft(
            Beneficiary::Leader,
            terms.start_date,
            round_money(terms.principal * LEADER_SHARE_RATE),
            EventKind::LeaderCommission,
            "Leader participation fee".to_string(),
        ));
    }

    let first_payment = first_payment_date(terms.start_date)?;
    let monthly_dividend = round_money(terms.principal * terms.monthly_rate / dec!(100));

    // Pro-rata first dividend: daily rate times calendar days from start
    // to the first payment run
    let pro_rata_days = (first_payment - terms.start_date).num_days();
    let daily_rate = terms.principal * terms.monthly_rate / dec!(100) / COMMERCIAL_MONTH_DAYS;
    let pro_rata_amount = round_money(daily_rate * Decimal::from(pro_rata_days));

    events.push(draft(
        Beneficiary::Client,
        first_payment,
        pro_rata_amount,
        EventKind::ProRataDividend,
        format!("Pro-rata ({} days)", pro_rata_days),
    ));

    if terms.with_consultant {
        events.push(draft(
            Beneficiary::Consultant,
            first_payment,
            round_money(pro_rata_amount * CONSULTANT_COMMISSION_RATE),
            EventKind::ConsultantCommission,
            format!("Commission 1/{}", terms.term_months),
        ));
    }

    // Regular monthly cycle: advance one calendar month from the previous
    // payment date, not from the start date, to tolerate month-length drift
    let monthly_commission = round_money(monthly_dividend * CONSULTANT_COMMISSION_RATE);
    let mut payment_date = first_payment;
    for month in 2..=terms.term_months {
        payment_date = add_months(payment_date, 1)?;
        events.push(draft(
            Beneficiary::Client,
            payment_date,
            monthly_dividend,
            EventKind::MonthlyDividend,
            format!("Monthly dividend {}/{}", month, terms.term_months),
        ));
        if terms.with_consultant {
            events.push(draft(
                Beneficiary::Consultant,
                payment_date,
                monthly_commission,
                EventKind::ConsultantCommission,
                format!("Commission {}/{}", month, terms.term_months),
            ));
        }
    }

    // Capital return: the original principal, never reduced by any fee
    let end_date = compute_end_date(terms.start_date, terms.term_months)?;
    events.push(draft(
        Beneficiary::Client,
        end_date,
        terms.principal,
        EventKind::CapitalReturn,
        "Capital return".to_string(),
    ));

    for (i, event) in events.iter_mut().enumerate() {
        event.sequence = i as i32;
    }

    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terms(
        principal: Decimal,
        rate: Decimal,
        term_months: i32,
        start: &str,
    ) -> ContractTerms {
        ContractTerms {
            principal,
            monthly_rate: rate,
            term_months,
            start_date: start.parse().unwrap(),
            with_consultant: true,
            with_leader: true,
        }
    }

    #[test]
    fn test_worked_example() {
        // P=100000, r=2%, n=12, start 2025-06-05
        let events = generate(&terms(dec!(100000), dec!(2), 12, "2025-06-05")).unwrap();

        // Leader fee: 0.10% of principal, dated at start
        let leader: Vec<_> = events
            .iter()
            .filter(|e| e.kind == EventKind::LeaderCommission)
            .collect();
        assert_eq!(leader.len(), 1);
        assert_eq!(leader[0].amount, dec!(100.00));
        assert_eq!(leader[0].event_date, "2025-06-05".parse::<NaiveDate>().unwrap());

        // Day 5 < 7: first payment is the same month's 10th, 5 pro-rata days
        let pro_rata = events
            .iter()
            .find(|e| e.kind == EventKind::ProRataDividend)
            .unwrap();
        assert_eq!(pro_rata.event_date, "2025-06-10".parse::<NaiveDate>().unwrap());
        assert_eq!(pro_rata.amount, dec!(333.33));
        assert_eq!(pro_rata.label, "Pro-rata (5 days)");

        let commissions: Vec<_> = events
            .iter()
            .filter(|e| e.kind == EventKind::ConsultantCommission)
            .collect();
        assert_eq!(commissions.len(), 12);
        assert_eq!(commissions[0].amount, dec!(13.33));
        assert!(commissions[1..].iter().all(|e| e.amount == dec!(80.00)));

        let monthly: Vec<_> = events
            .iter()
            .filter(|e| e.kind == EventKind::MonthlyDividend)
            .collect();
        assert_eq!(monthly.len(), 11);
        assert!(monthly.iter().all(|e| e.amount == dec!(2000.00)));
        assert_eq!(monthly[0].event_date, "2025-07-10".parse::<NaiveDate>().unwrap());
        assert_eq!(
            monthly.last().unwrap().event_date,
            "2026-05-10".parse::<NaiveDate>().unwrap()
        );

        // Capital return: full principal at start + 12 months
        let capital = events.last().unwrap();
        assert_eq!(capital.kind, EventKind::CapitalReturn);
        assert_eq!(capital.amount, dec!(100000));
        assert_eq!(capital.event_date, "2026-06-05".parse::<NaiveDate>().unwrap());
    }

    #[test]
    fn test_event_count_law() {
        for n in [1, 2, 6, 12, 24] {
            let events = generate(&terms(dec!(50000), dec!(1.85), n, "2025-03-15")).unwrap();
            let dividends = events
                .iter()
                .filter(|e| {
                    matches!(
                        e.kind,
                        EventKind::ProRataDividend | EventKind::MonthlyDividend
                    )
                })
                .count();
            let commissions = events
                .iter()
                .filter(|e| e.kind == EventKind::ConsultantCommission)
                .count();
            let capital = events
                .iter()
                .filter(|e| e.kind == EventKind::CapitalReturn)
                .count();
            assert_eq!(dividends, n as usize);
            assert_eq!(commissions, n as usize);
            assert_eq!(capital, 1);
            assert_eq!(events.len(), 2 * n as usize + 2);
        }
    }

    #[test]
    fn test_no_optional_parties() {
        let mut t = terms(dec!(10000), dec!(2), 6, "2025-01-02");
        t.with_consultant = false;
        t.with_leader = false;
        let events = generate(&t).unwrap();
        assert!(events
            .iter()
            .all(|e| e.beneficiary == Beneficiary::Client));
        // 6 dividends + capital return
        assert_eq!(events.len(), 7);
    }

    #[test]
    fn test_first_payment_boundary() {
        // Day 6: same month's 10th
        assert_eq!(
            first_payment_date("2025-06-06".parse().unwrap()).unwrap(),
            "2025-06-10".parse::<NaiveDate>().unwrap()
        );
        // Day 7: next month's 10th
        assert_eq!(
            first_payment_date("2025-06-07".parse().unwrap()).unwrap(),
            "2025-07-10".parse::<NaiveDate>().unwrap()
        );
        // December rolls into the next year
        assert_eq!(
            first_payment_date("2025-12-20".parse().unwrap()).unwrap(),
            "2026-01-10".parse::<NaiveDate>().unwrap()
        );
    }

    #[test]
    fn test_dates_non_decreasing() {
        let events = generate(&terms(dec!(75000), dec!(1.5), 18, "2025-08-31")).unwrap();
        let client_dates: Vec<_> = events
            .iter()
            .filter(|e| e.beneficiary == Beneficiary::Client)
            .map(|e| e.event_date)
            .collect();
        assert!(client_dates.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_end_date_clamped() {
        // Jan 31 + 1 month clamps to Feb 28
        assert_eq!(
            compute_end_date("2025-01-31".parse().unwrap(), 1).unwrap(),
            "2025-02-28".parse::<NaiveDate>().unwrap()
        );
        assert_eq!(
            compute_end_date("2024-01-31".parse().unwrap(), 1).unwrap(),
            "2024-02-29".parse::<NaiveDate>().unwrap()
        );
    }

    #[test]
    fn test_single_month_term() {
        let events = generate(&terms(dec!(10000), dec!(2), 1, "2025-06-20")).unwrap();
        // Leader fee + pro-rata + its commission + capital return, no monthlies
        assert!(!events.iter().any(|e| e.kind == EventKind::MonthlyDividend));
        let pro_rata = events
            .iter()
            .find(|e| e.kind == EventKind::ProRataDividend)
            .unwrap();
        // Jun 20 -> Jul 10 is 20 days
        assert_eq!(pro_rata.label, "Pro-rata (20 days)");
        assert_eq!(pro_rata.event_date, "2025-07-10".parse::<NaiveDate>().unwrap());
    }

    #[test]
    fn test_zero_rate_is_valid() {
        let events = generate(&terms(dec!(10000), dec!(0), 3, "2025-01-02")).unwrap();
        let dividends: Vec<_> = events
            .iter()
            .filter(|e| {
                matches!(
                    e.kind,
                    EventKind::ProRataDividend | EventKind::MonthlyDividend
                )
            })
            .collect();
        assert!(dividends.iter().all(|e| e.amount == Decimal::ZERO));
        assert_eq!(events.last().unwrap().amount, dec!(10000));
    }

    #[test]
    fn test_invalid_inputs() {
        assert_eq!(
            generate(&terms(dec!(1000), dec!(2), 0, "2025-01-01")),
            Err(ScheduleError::InvalidTerm(0))
        );
        assert!(matches!(
            generate(&terms(dec!(-5), dec!(2), 6, "2025-01-01")),
            Err(ScheduleError::InvalidAmount(_))
        ));
        assert!(matches!(
            generate(&terms(dec!(1000), dec!(-1), 6, "2025-01-01")),
            Err(ScheduleError::InvalidAmount(_))
        ));
    }

    #[test]
    fn test_sequence_is_emission_order() {
        let events = generate(&terms(dec!(20000), dec!(2), 4, "2025-02-03")).unwrap();
        for (i, event) in events.iter().enumerate() {
            assert_eq!(event.sequence, i as i32);
        }
    }
}
