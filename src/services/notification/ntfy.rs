//! ntfy message formats for weather alerts, confirmations and payouts.

use crate::models::notification::{
    AlertAction, ConfirmationRequest, NtfyAction, NtfyMessage, PayoutRequest, WeatherAlert,
};

fn priority_for(severity: &str) -> u8 {
    match severity {
        "critical" => 5,
        "warning" => 4,
        "info" => 2,
        _ => 3,
    }
}

fn tags_for(alert_type: &str) -> Vec<String> {
    let tags: &[&str] = match alert_type {
        "weather_hvac" => &["thermometer", "fire"],
        "weather_battery" => &["battery", "zap"],
        "weather_ev" | "weather_ev_charger" => &["car", "zap"],
        _ => &["warning"],
    };
    tags.iter().map(|t| t.to_string()).collect()
}

fn tags(values: &[&str]) -> Vec<String> {
    values.iter().map(|t| t.to_string()).collect()
}

fn setpoint(value: Option<f64>) -> String {
    value.map_or_else(|| "??".to_string(), |v| format!("{}", v))
}

/// Alert with a device preview, savings line and accept/decline buttons.
pub fn weather_alert(topic: &str, alert: &WeatherAlert, base_url: &str) -> NtfyMessage {
    let meta = &alert.metadata;
    let mut message = format!("{}\n\n", alert.description);

    if alert.alert_type.contains("hvac") {
        let recommended = meta
            .recommended_action
            .cool_setpoint
            .or(meta.recommended_action.heat_setpoint);
        message.push_str(&format!(
            "🌡️ Current: {}°F → Recommended: {}°F\n",
            setpoint(meta.typical_setpoint),
            setpoint(recommended)
        ));
    } else if alert.alert_type.contains("ev") || alert.alert_type.contains("battery") {
        let action = meta.action_description.as_deref().unwrap_or("Adjust device timing");
        message.push_str(&format!("⚡ Action: {}\n", action));
    }

    if meta.estimated_savings_usd > 0.0 {
        message.push_str(&format!("💰 Save ~${:.2} → RLUSD", meta.estimated_savings_usd));
    }

    let actions = alert
        .id
        .as_deref()
        .map(|id| {
            [("✓ Accept", "ACCEPT"), ("✗ Decline", "DECLINE")]
                .iter()
                .map(|(label, action)| NtfyAction {
                    action: "view".to_string(),
                    label: label.to_string(),
                    url: format!("{}/api/alerts/respond?id={}&action={}", base_url, id, action),
                    clear: true,
                })
                .collect()
        })
        .unwrap_or_default();

    NtfyMessage {
        topic: topic.to_string(),
        title: alert.title.clone(),
        message,
        priority: priority_for(&alert.severity),
        tags: tags_for(&alert.alert_type),
        actions,
        click: Some(format!("{}/dashboard", base_url)),
    }
}

fn device_name(device_type: Option<&str>) -> &'static str {
    match device_type {
        Some("hvac") => "thermostat",
        Some("battery") => "battery",
        Some("ev_charger") => "EV charger",
        _ => "device",
    }
}

/// Result of an accepted or declined recommendation.
pub fn confirmation(topic: &str, req: &ConfirmationRequest) -> NtfyMessage {
    let (title, default_message, priority, tag_list) = match (req.action_taken, req.success) {
        (AlertAction::Accept, true) => {
            let mut message = format!(
                "Your {} has been adjusted.\nYou earned ${:.2} energy savings!\n💵 Pending: ${:.2}",
                device_name(req.device_type.as_deref()),
                req.savings_added,
                req.savings_pending
            );
            if req.savings_pending >= req.payout_threshold {
                message.push_str("\n🚀 Payout threshold reached! Sending RLUSD...");
            } else {
                message.push_str(&format!(
                    "\n📊 ${:.2} more until RLUSD payout",
                    req.payout_threshold - req.savings_pending
                ));
            }
            let device_tag = if req.device_type.as_deref() == Some("hvac") {
                "thermometer"
            } else {
                "zap"
            };
            ("✅ Device Adjusted", message, 3, tags(&["white_check_mark", device_tag]))
        }
        (AlertAction::Accept, false) => (
            "✗ Device Control Failed",
            format!(
                "Failed to adjust your device for: {}\nPlease try again or contact support.",
                req.alert_title
            ),
            4,
            tags(&["x"]),
        ),
        (AlertAction::Decline, _) => (
            "Recommendation Declined",
            "No changes made to your device.".to_string(),
            2,
            tags(&["x"]),
        ),
    };

    NtfyMessage {
        topic: topic.to_string(),
        title: title.to_string(),
        message: req.message.clone().unwrap_or(default_message),
        priority,
        tags: tag_list,
        actions: Vec::new(),
        click: None,
    }
}

/// XRPL payout receipt with a shortened transaction hash.
pub fn payout(topic: &str, req: &PayoutRequest) -> NtfyMessage {
    let short_hash: String = req.tx_hash.chars().take(16).collect();
    let mut message = format!("${:.2} RLUSD → your wallet!\nTX: {}…\n", req.amount_usd, short_hash);
    if let Some(total) = req.total_paid {
        message.push_str(&format!("Total earned: ${:.2} RLUSD", total));
    }

    NtfyMessage {
        topic: topic.to_string(),
        title: "💰 RLUSD Payout Sent!".to_string(),
        message,
        priority: 4,
        tags: tags(&["moneybag", "rocket"]),
        actions: Vec::new(),
        click: None,
    }
}
