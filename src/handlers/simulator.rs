//! Contract projection simulator
//!
//! Runs the pure schedule generator without persisting anything, so
//! consultants can preview a contract's full payment calendar before it
//! exists.

use axum::{http::StatusCode, Json};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::models::schedule::{
    EventKind, SimulatedEvent, SimulationRequest, SimulationResponse, SimulationSummary,
};
use crate::models::ErrorResponse;
use crate::services::schedule_generator::{
    self, compute_end_date, first_payment_date, round_money, ContractTerms, ScheduleError,
};

pub async fn simulate(
    Json(payload): Json<SimulationRequest>,
) -> Result<Json<SimulationResponse>, (StatusCode, Json<ErrorResponse>)> {
    let terms = ContractTerms {
        principal: payload.principal,
        monthly_rate: payload.monthly_rate,
        term_months: payload.term_months,
        start_date: payload.start_date,
        with_consultant: payload.with_consultant,
        with_leader: payload.with_leader,
    };

    let drafts = schedule_generator::generate(&terms).map_err(schedule_error)?;
    let first_payment = first_payment_date(payload.start_date).map_err(schedule_error)?;
    let end_date =
        compute_end_date(payload.start_date, payload.term_months).map_err(schedule_error)?;

    let total_dividend: Decimal = drafts
        .iter()
        .filter(|e| {
            matches!(
                e.kind,
                EventKind::ProRataDividend | EventKind::MonthlyDividend
            )
        })
        .map(|e| e.amount)
        .sum();

    let monthly_dividend = round_money(payload.principal * payload.monthly_rate / dec!(100));

    let events = drafts
        .into_iter()
        .map(|draft| SimulatedEvent {
            date: draft.event_date,
            amount: draft.amount,
            kind: draft.kind,
            beneficiary: draft.beneficiary,
            label: draft.label,
        })
        .collect();

    Ok(Json(SimulationResponse {
        summary: SimulationSummary {
            monthly_dividend,
            total_dividend,
            first_payment_date: first_payment,
            end_date,
        },
        events,
    }))
}

fn schedule_error(e: ScheduleError) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(ErrorResponse {
            error: e.to_string(),
        }),
    )
}
