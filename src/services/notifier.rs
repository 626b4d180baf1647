//! In-app notification dispatcher
//!
//! Delivery is a row insert into the notifications table; the portals
//! consume it from there. Failures are never fatal to the caller:
//! activation and rejection must succeed even when a notification write
//! fails, so errors are logged at warn and swallowed.

use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use crate::entities::{notifications, users};

const ADMIN_ROLE: &str = "admin";

/// Write one notification row for a recipient
pub async fn notify(db: &DatabaseConnection, recipient_id: Uuid, title: &str, body: &str) {
    let row = notifications::ActiveModel {
        recipient_id: Set(recipient_id),
        title: Set(title.to_string()),
        body: Set(body.to_string()),
        ..Default::default()
    };
    if let Err(e) = row.insert(db).await {
        tracing::warn!(
            recipient = %recipient_id,
            title = title,
            "Failed to deliver notification: {}",
            e
        );
    }
}

/// Fan a notification out to every administrator
pub async fn notify_admins(db: &DatabaseConnection, title: &str, body: &str) {
    let admins = match users::Entity::find()
        .filter(users::Column::Role.eq(ADMIN_ROLE))
        .all(db)
        .await
    {
        Ok(admins) => admins,
        Err(e) => {
            tracing::warn!("Failed to resolve administrators for fan-out: {}", e);
            return;
        }
    };

    for admin in admins {
        notify(db, admin.id, title, body).await;
    }
}
