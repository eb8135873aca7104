//! Firebase Cloud Messaging delivery helper
//!
//! One outbound send per message, no queueing and no retries. Callers that
//! must not fail on delivery problems use [`FcmNotifier::send_or_log`].

use reqwest::Client;
use serde_json::{Value, json};
use tracing::{error, info};

use crate::config::GeoAlertConfig;
use crate::models::PushMessage;
use crate::upstream::build_client;
use crate::{GeoAlertError, Result};

/// FCM push delivery client
pub struct FcmNotifier {
    client: Client,
    endpoint: String,
    server_key: Option<String>,
    dry_run: bool,
}

impl FcmNotifier {
    /// Create a new notifier
    pub fn new(config: &GeoAlertConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(config.upstream.timeout_seconds)?,
            endpoint: config.notifications.fcm_endpoint.clone(),
            server_key: config.notifications.fcm_server_key.clone(),
            dry_run: config.notifications.dry_run,
        })
    }

    /// Deliver a single push message.
    pub async fn send(&self, message: &PushMessage) -> Result<()> {
        message.validate()?;

        if self.dry_run {
            info!(
                "Dry run: would deliver '{}' to token {}",
                message.title,
                mask_token(&message.token)
            );
            return Ok(());
        }

        let server_key = self
            .server_key
            .as_ref()
            .ok_or_else(|| GeoAlertError::notification("Missing FCM server key"))?;

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("key={server_key}"))
            .json(&payload(message))
            .send()
            .await
            .map_err(|e| GeoAlertError::notification(format!("FCM request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GeoAlertError::notification(format!(
                "FCM returned {status}: {body}"
            )));
        }

        info!(
            "Delivered push notification '{}' to token {}",
            message.title,
            mask_token(&message.token)
        );
        Ok(())
    }

    /// Deliver a message, swallowing failures.
    ///
    /// Delivery problems are logged and reported as `false`, never
    /// propagated to the caller.
    pub async fn send_or_log(&self, message: &PushMessage) -> bool {
        match self.send(message).await {
            Ok(()) => true,
            Err(err) => {
                error!("Failed to send push notification: {}", err);
                false
            }
        }
    }
}

/// Legacy FCM send payload for a single device token
fn payload(message: &PushMessage) -> Value {
    json!({
        "to": message.token,
        "notification": {
            "title": message.title,
            "body": message.body,
        },
        "data": message.data,
    })
}

/// Device tokens are credentials; only the tail end is loggable.
fn mask_token(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 8 {
        "***".to_string()
    } else {
        let tail: String = chars[chars.len() - 8..].iter().collect();
        format!("***{tail}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_payload_shape() {
        let message = PushMessage::new("device-token-123456", "Quake alert", "M5.2 nearby")
            .with_data("magnitude", json!(5.2));

        let value = payload(&message);
        assert_eq!(value["to"], "device-token-123456");
        assert_eq!(value["notification"]["title"], "Quake alert");
        assert_eq!(value["notification"]["body"], "M5.2 nearby");
        assert_eq!(value["data"]["magnitude"], json!(5.2));
    }

    #[test]
    fn test_mask_token() {
        assert_eq!(mask_token("short"), "***");
        assert_eq!(mask_token("abcdefghijklmnop"), "***ijklmnop");
    }

    #[tokio::test]
    async fn test_dry_run_send_succeeds_without_key() {
        let mut config = GeoAlertConfig::default();
        config.notifications.dry_run = true;
        let notifier = FcmNotifier::new(&config).unwrap();

        let message = PushMessage::new("device-token-123456", "title", "body");
        assert!(notifier.send(&message).await.is_ok());
    }

    #[tokio::test]
    async fn test_send_without_key_is_notification_error() {
        let notifier = FcmNotifier::new(&GeoAlertConfig::default()).unwrap();
        let message = PushMessage::new("device-token-123456", "title", "body");
        assert!(matches!(
            notifier.send(&message).await,
            Err(GeoAlertError::Notification { .. })
        ));
    }

    #[tokio::test]
    async fn test_send_or_log_swallows_failure() {
        let notifier = FcmNotifier::new(&GeoAlertConfig::default()).unwrap();
        let message = PushMessage::new("device-token-123456", "title", "body");
        assert!(!notifier.send_or_log(&message).await);
    }
}
