//! Auto-message notification history.

use serde::Deserialize;

use crate::client::ChatClient;
use crate::errors::ClientError;
use crate::models::{DeletedCount, NewNotification, Notification, NotificationStatus};

#[derive(Deserialize)]
struct NotificationEnvelope {
    #[serde(default)]
    data: Vec<Notification>,
}

impl ChatClient {
    /// All recorded notifications, newest first as the backend returns
    /// them.
    pub async fn notifications(&self) -> Result<Vec<Notification>, ClientError> {
        let url = self.config.endpoint("api/notifications");
        let envelope: NotificationEnvelope = self
            .expect_json(self.http.get(url), "failed to load notifications")
            .await?;
        Ok(envelope.data)
    }

    /// Total number of recorded notifications.
    pub async fn notification_count(&self) -> Result<u64, ClientError> {
        let url = self.config.endpoint("api/notifications/count");
        self.expect_json(self.http.get(url), "failed to count notifications")
            .await
    }

    /// Records a notification, returning the stored record.
    pub async fn add_notification(
        &self,
        notification: &NewNotification,
    ) -> Result<Notification, ClientError> {
        let url = self.config.endpoint("api/notifications");
        self.expect_json(
            self.http.post(url).json(notification),
            "failed to record notification",
        )
        .await
    }

    /// Deletes every notification with the given delivery status.
    pub async fn delete_notifications_by_status(
        &self,
        status: NotificationStatus,
    ) -> Result<DeletedCount, ClientError> {
        let url = self.config.endpoint("api/notifications");
        self.expect_json(
            self.http.delete(url).query(&[("status", status.as_str())]),
            "failed to delete notifications",
        )
        .await
    }
}
