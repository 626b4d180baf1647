// src/lib.rs

use std::sync::Arc;

use sea_orm::DatabaseConnection;
use services::activation::ApprovalPolicy;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub approval_policy: ApprovalPolicy,
}

pub mod entities {
    pub mod prelude;
    pub mod contracts;
    pub mod notifications;
    pub mod schedule_events;
    pub mod users;
}

pub mod services {
    pub mod activation;
    pub mod approval;
    pub mod ledger;
    pub mod notifier;
    pub mod schedule_generator;
}

pub mod models;
pub mod handlers;

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    // The shared connection must stay cloneable for axum's state extractor
    // even when the mock backend is compiled in for tests.
    #[test]
    fn test_app_state_is_cloneable() {
        let state = AppState {
            db: Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection()),
            approval_policy: ApprovalPolicy {
                require_all_steps_approved: true,
            },
        };
        let cloned = state.clone();
        assert!(cloned.approval_policy.require_all_steps_approved);
        assert!(Arc::ptr_eq(&state.db, &cloned.db));
    }
}
