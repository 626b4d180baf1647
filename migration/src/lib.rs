pub use sea_orm_migration::prelude::*;

mod m20260115_000001_create_users;
mod m20260115_000002_create_contracts;
mod m20260115_000003_create_schedule_events;
mod m20260115_000004_create_notifications;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260115_000001_create_users::Migration),
            Box::new(m20260115_000002_create_contracts::Migration),
            Box::new(m20260115_000003_create_schedule_events::Migration),
            Box::new(m20260115_000004_create_notifications::Migration),
        ]
    }
}
