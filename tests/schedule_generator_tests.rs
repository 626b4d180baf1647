//! Property tests for the schedule generator
//!
//! Exercise the generation laws across a spread of terms rather than a
//! single fixture: event counts, date monotonicity, capital return
//! placement and the payment-day boundary.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use contracts_backend::models::schedule::{Beneficiary, EventKind};
use contracts_backend::services::schedule_generator::{
    compute_end_date, first_payment_date, generate, ContractTerms, ScheduleError,
};

fn terms(principal: Decimal, rate: Decimal, term_months: i32, start: NaiveDate) -> ContractTerms {
    ContractTerms {
        principal,
        monthly_rate: rate,
        term_months,
        start_date: start,
        with_consultant: true,
        with_leader: true,
    }
}

fn date(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

#[test]
fn event_count_law_holds_across_terms() {
    for principal in [dec!(1000), dec!(50000), dec!(250000.50)] {
        for rate in [dec!(0), dec!(1.85), dec!(2)] {
            for n in 1..=24 {
                let events = generate(&terms(principal, rate, n, date("2025-04-09"))).unwrap();

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
                let capital: Vec<_> = events
                    .iter()
                    .filter(|e| e.kind == EventKind::CapitalReturn)
                    .collect();
                let leader = events
                    .iter()
                    .filter(|e| e.kind == EventKind::LeaderCommission)
                    .count();

                assert_eq!(dividends, n as usize, "n={}", n);
                assert_eq!(commissions, n as usize, "n={}", n);
                assert_eq!(leader, 1);
                assert_eq!(capital.len(), 1);
                assert_eq!(capital[0].amount, principal);
                assert_eq!(capital[0].beneficiary, Beneficiary::Client);
            }
        }
    }
}

#[test]
fn capital_return_lands_on_the_computed_end_date() {
    for n in [1, 6, 12, 36] {
        for start in ["2025-01-31", "2025-02-28", "2025-06-05", "2024-12-15"] {
            let start = date(start);
            let events = generate(&terms(dec!(10000), dec!(2), n, start)).unwrap();
            let capital = events.last().unwrap();
            assert_eq!(capital.kind, EventKind::CapitalReturn);
            assert_eq!(capital.event_date, compute_end_date(start, n).unwrap());
        }
    }
}

#[test]
fn client_dividend_dates_are_non_decreasing() {
    // Dividends alone must be monotone. The capital return follows the
    // calendar end date instead of the payment-day grid, so for start days
    // 7 through 9 it can legitimately fall before the last dividend.
    for start in ["2025-01-01", "2025-01-06", "2025-01-07", "2025-08-31", "2025-12-30"] {
        let start = date(start);
        let events = generate(&terms(dec!(80000), dec!(1.5), 18, start)).unwrap();
        let dates: Vec<_> = events
            .iter()
            .filter(|e| {
                matches!(
                    e.kind,
                    EventKind::ProRataDividend | EventKind::MonthlyDividend
                )
            })
            .map(|e| e.event_date)
            .collect();
        assert!(
            dates.windows(2).all(|w| w[0] <= w[1]),
            "dates out of order for start {}",
            start
        );

        let capital = events.last().unwrap();
        assert_eq!(capital.kind, EventKind::CapitalReturn);
        assert_eq!(capital.event_date, compute_end_date(start, 18).unwrap());
    }
}

#[test]
fn first_payment_boundary_at_day_seven() {
    // Days 1-6 catch the same month's 10th
    for day in 1..7 {
        let start = NaiveDate::from_ymd_opt(2025, 6, day).unwrap();
        let first = first_payment_date(start).unwrap();
        assert_eq!(first, date("2025-06-10"), "day {}", day);
    }
    // Day 7 onward rolls to the next month
    for day in [7, 10, 15, 30] {
        let start = NaiveDate::from_ymd_opt(2025, 6, day).unwrap();
        let first = first_payment_date(start).unwrap();
        assert_eq!(first, date("2025-07-10"), "day {}", day);
    }
}

#[test]
fn pro_rata_covers_days_between_start_and_first_payment() {
    // Start Jun 5, first payment Jun 10: 5 days at 100000 * 2% / 30 per day
    let events = generate(&terms(dec!(100000), dec!(2), 12, date("2025-06-05"))).unwrap();
    let pro_rata = events
        .iter()
        .find(|e| e.kind == EventKind::ProRataDividend)
        .unwrap();
    assert_eq!(pro_rata.amount, dec!(333.33));

    let commission = events
        .iter()
        .find(|e| e.kind == EventKind::ConsultantCommission)
        .unwrap();
    assert_eq!(commission.amount, dec!(13.33));

    let total_dividend: Decimal = events
        .iter()
        .filter(|e| {
            matches!(
                e.kind,
                EventKind::ProRataDividend | EventKind::MonthlyDividend
            )
        })
        .map(|e| e.amount)
        .sum();
    assert_eq!(total_dividend, dec!(22333.33));
}

#[test]
fn leader_fee_is_fixed_share_of_principal_at_start() {
    let events = generate(&terms(dec!(250000), dec!(2), 6, date("2025-03-20"))).unwrap();
    let leader = events
        .iter()
        .find(|e| e.kind == EventKind::LeaderCommission)
        .unwrap();
    // 0.10% one-time fee, independent of rate and term
    assert_eq!(leader.amount, dec!(250.00));
    assert_eq!(leader.event_date, date("2025-03-20"));
    assert_eq!(leader.beneficiary, Beneficiary::Leader);
}

#[test]
fn monthly_dates_drift_with_calendar_months() {
    // First payment lands on the 10th and every subsequent payment advances
    // exactly one calendar month from the previous one
    let events = generate(&terms(dec!(10000), dec!(2), 14, date("2025-01-20"))).unwrap();
    let payment_dates: Vec<_> = events
        .iter()
        .filter(|e| {
            matches!(
                e.kind,
                EventKind::ProRataDividend | EventKind::MonthlyDividend
            )
        })
        .map(|e| e.event_date)
        .collect();
    assert!(payment_dates.iter().all(|d| d.day() == 10));
    for window in payment_dates.windows(2) {
        let months_apart = (window[1].year() - window[0].year()) * 12
            + (window[1].month() as i32 - window[0].month() as i32);
        assert_eq!(months_apart, 1);
    }
}

#[test]
fn invalid_terms_are_rejected_before_any_event() {
    assert_eq!(
        generate(&terms(dec!(1000), dec!(2), 0, date("2025-01-01"))),
        Err(ScheduleError::InvalidTerm(0))
    );
    assert_eq!(
        generate(&terms(dec!(1000), dec!(2), -3, date("2025-01-01"))),
        Err(ScheduleError::InvalidTerm(-3))
    );
    assert!(matches!(
        generate(&terms(dec!(0), dec!(2), 6, date("2025-01-01"))),
        Err(ScheduleError::InvalidAmount(_))
    ));
    assert!(matches!(
        generate(&terms(dec!(-100), dec!(2), 6, date("2025-01-01"))),
        Err(ScheduleError::InvalidAmount(_))
    ));
    assert!(matches!(
        generate(&terms(dec!(1000), dec!(-0.5), 6, date("2025-01-01"))),
        Err(ScheduleError::InvalidAmount(_))
    ));
}

#[test]
fn all_amounts_are_non_negative_cents() {
    let events = generate(&terms(dec!(33333.33), dec!(1.07), 9, date("2025-05-02"))).unwrap();
    for event in &events {
        assert!(event.amount >= Decimal::ZERO);
        assert!(event.amount.scale() <= 2, "amount {} not in cents", event.amount);
    }
}
