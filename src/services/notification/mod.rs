//! Push notifications through ntfy.
//!
//! Consumers subscribe to a personal ntfy topic stored on their Supabase
//! profile. Every send resolves that topic first; a profile without a topic
//! counts as a failed delivery.

pub mod ntfy;

use std::time::Duration;

use metrics::counter;
use serde::Deserialize;
use tracing::{error, info, warn};

use crate::config::NotificationConfig;
use crate::error::{ApiError, ErrorCode};
use crate::models::notification::{
    BroadcastResponse, ConfirmationRequest, NtfyMessage, PayoutRequest, WeatherAlert,
};

const DIRECTORY_TIMEOUT_SECS: u64 = 5;
const PUBLISH_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Deserialize)]
struct TopicRow {
    ntfy_topic: Option<String>,
}

#[derive(Clone)]
pub struct NotificationService {
    client: reqwest::Client,
    ntfy_server: String,
    supabase: Option<(String, String)>,
    api_base_url: String,
}

impl std::fmt::Debug for NotificationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationService")
            .field("ntfy_server", &self.ntfy_server)
            .field("directory_configured", &self.supabase.is_some())
            .finish()
    }
}

impl NotificationService {
    pub fn new(client: reqwest::Client, config: &NotificationConfig) -> Self {
        let supabase = match (&config.supabase_url, &config.supabase_anon_key) {
            (Some(url), Some(key)) => Some((url.trim_end_matches('/').to_string(), key.clone())),
            _ => None,
        };
        if supabase.is_none() {
            warn!("Supabase not configured, notifications can only target explicit topics");
        }

        Self {
            client,
            ntfy_server: config.ntfy_server.trim_end_matches('/').to_string(),
            supabase,
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// ntfy topic on the consumer's profile, if any.
    pub async fn topic_for(&self, profile_id: &str) -> Option<String> {
        let (url, key) = self.supabase.as_ref()?;

        let result = async {
            let rows: Vec<TopicRow> = self
                .client
                .get(format!("{}/rest/v1/consumer_profiles", url))
                .query(&[
                    ("id", format!("eq.{}", profile_id)),
                    ("select", "ntfy_topic".to_string()),
                ])
                .header("apikey", key)
                .bearer_auth(key)
                .timeout(Duration::from_secs(DIRECTORY_TIMEOUT_SECS))
                .send()
                .await?
                .error_for_status()?
                .json()
                .await?;
            Ok::<_, reqwest::Error>(rows)
        }
        .await;

        match result {
            Ok(rows) => rows
                .into_iter()
                .next()
                .and_then(|r| r.ntfy_topic)
                .filter(|t| !t.is_empty()),
            Err(e) => {
                warn!("Failed to fetch ntfy topic for profile {}: {}", profile_id, e);
                None
            }
        }
    }

    async fn publish(&self, kind: &'static str, message: &NtfyMessage) -> Result<(), ApiError> {
        let result = self
            .client
            .post(&self.ntfy_server)
            .json(message)
            .timeout(Duration::from_secs(PUBLISH_TIMEOUT_SECS))
            .send()
            .await
            .and_then(|r| r.error_for_status());

        match result {
            Ok(_) => {
                counter!("notifications_sent_total", "kind" => kind, "outcome" => "sent").increment(1);
                info!("📬 Sent {} notification to topic {}", kind, message.topic);
                Ok(())
            }
            Err(e) => {
                counter!("notifications_sent_total", "kind" => kind, "outcome" => "failed").increment(1);
                error!("Failed to send {} notification to topic {}: {}", kind, message.topic, e);
                Err(ApiError::with_code(
                    ErrorCode::NotificationFailed,
                    "Failed to send notification",
                ))
            }
        }
    }

    async fn require_topic(&self, profile_id: &str) -> Result<String, ApiError> {
        self.topic_for(profile_id).await.ok_or_else(|| {
            warn!("No ntfy topic configured for profile {}", profile_id);
            ApiError::with_code(ErrorCode::NotificationFailed, "Failed to send notification")
        })
    }

    /// Send one weather alert; `topic` overrides the profile lookup.
    pub async fn send_weather_alert(
        &self,
        profile_id: &str,
        alert: &WeatherAlert,
        topic: Option<&str>,
    ) -> Result<(), ApiError> {
        let topic = match topic {
            Some(t) => t.to_string(),
            None => self.require_topic(profile_id).await?,
        };
        self.publish("alert", &ntfy::weather_alert(&topic, alert, &self.api_base_url))
            .await
    }

    /// Deliver personalised `weather_*` alerts. Alerts without a profile or
    /// of another type are skipped and not counted.
    pub async fn broadcast(&self, alerts: &[WeatherAlert]) -> BroadcastResponse {
        let mut response = BroadcastResponse { success: 0, failed: 0 };

        for alert in alerts {
            let Some(profile_id) = alert.profile_id.as_deref() else {
                continue;
            };
            if !alert.alert_type.starts_with("weather_") {
                continue;
            }
            match self.send_weather_alert(profile_id, alert, None).await {
                Ok(()) => response.success += 1,
                Err(_) => response.failed += 1,
            }
        }

        info!(
            "Broadcast complete: {} sent, {} failed",
            response.success, response.failed
        );
        response
    }

    pub async fn send_confirmation(&self, req: &ConfirmationRequest) -> Result<(), ApiError> {
        let topic = self.require_topic(&req.profile_id).await?;
        self.publish("confirmation", &ntfy::confirmation(&topic, req)).await
    }

    pub async fn send_payout(&self, req: &PayoutRequest) -> Result<(), ApiError> {
        let topic = self.require_topic(&req.profile_id).await?;
        self.publish("payout", &ntfy::payout(&topic, req)).await
    }
}
