pub mod approval;
pub mod contract;
pub mod schedule;

use serde::Serialize;

/// Generic error payload returned by every handler
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
