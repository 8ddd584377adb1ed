use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseTransaction, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    dto::notifications::NotificationList,
    entity::{
        Notifications,
        notifications::{ActiveModel as NotificationActive, Column as NotificationCol},
    },
    error::{AppError, AppResult},
    mail::{MailQueue, OutboundEmail},
    middleware::auth::AuthUser,
    models::Notification,
    response::{ApiResponse, Meta},
    state::AppState,
};

/// A status transition on something a user owns.
#[derive(Debug, Clone)]
pub struct StatusChange {
    pub owner_id: Uuid,
    /// Where the change email goes.
    pub email: String,
    /// Kind of entity, e.g. "booking".
    pub kind: &'static str,
    /// Short human description of the entity.
    pub summary: String,
    pub status: String,
}

impl StatusChange {
    pub fn message(&self) -> String {
        format!(
            "Your {} \"{}\" is now {}.",
            self.kind,
            self.summary,
            self.status.replace('_', " ")
        )
    }

    fn email(&self) -> OutboundEmail {
        OutboundEmail {
            to: self.email.clone(),
            subject: format!("Update on your {}", self.kind),
            body: format!("Hello,\n\n{}\n\nThank you for working with us.\n", self.message()),
        }
    }
}

/// Finishes a status transition.
///
/// `txn` must already hold the status update. The notification row joins the
/// same transaction, which is committed here; the email is queued only after
/// the commit and its delivery can never undo the change.
pub async fn on_status_change(
    txn: DatabaseTransaction,
    mail: &MailQueue,
    change: StatusChange,
) -> AppResult<Notification> {
    let notification = NotificationActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(Some(change.owner_id)),
        message: Set(change.message()),
        read: Set(false),
        created_at: Set(Utc::now().into()),
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    mail.enqueue(change.email());
    tracing::info!(
        user_id = %change.owner_id,
        kind = change.kind,
        status = %change.status,
        notification_id = %notification.id,
        "status change dispatched"
    );
    Ok(notification.into())
}

pub async fn list_mine(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<NotificationList>> {
    let items: Vec<Notification> = Notifications::find()
        .filter(NotificationCol::UserId.eq(user.user_id))
        .order_by_desc(NotificationCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Notification::from)
        .collect();
    let meta = Meta::unpaged(items.len());
    Ok(ApiResponse::success("Notifications", NotificationList { items }, Some(meta)))
}

/// Someone else's notification is reported as missing.
pub async fn mark_read(state: &AppState, user: &AuthUser, id: Uuid) -> AppResult<ApiResponse<Notification>> {
    let txn = state.orm.begin().await?;
    let existing = Notifications::find()
        .filter(
            Condition::all()
                .add(NotificationCol::Id.eq(id))
                .add(NotificationCol::UserId.eq(user.user_id)),
        )
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    let notification = if existing.read {
        existing
    } else {
        let mut active: NotificationActive = existing.into();
        active.read = Set(true);
        active.update(&txn).await?
    };
    txn.commit().await?;

    Ok(ApiResponse::item("Notification marked as read", notification.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn change() -> StatusChange {
        StatusChange {
            owner_id: Uuid::new_v4(),
            email: "ann@x.com".into(),
            kind: "project",
            summary: "Churn model".into(),
            status: "awaiting_data".into(),
        }
    }

    #[test]
    fn message_is_readable() {
        assert_eq!(change().message(), "Your project \"Churn model\" is now awaiting data.");
    }

    #[test]
    fn email_targets_the_change_address() {
        let email = change().email();
        assert_eq!(email.to, "ann@x.com");
        assert_eq!(email.subject, "Update on your project");
        assert!(email.body.contains("awaiting data"));
    }
}
