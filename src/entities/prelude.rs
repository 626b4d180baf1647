pub use super::contracts::Entity as Contracts;
pub use super::notifications::Entity as Notifications;
pub use super::schedule_events::Entity as ScheduleEvents;
pub use super::users::Entity as Users;
