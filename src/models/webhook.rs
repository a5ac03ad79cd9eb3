//! Polka payment webhook payloads

use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

/// The only event that has an effect
pub const USER_UPGRADED_EVENT: &str = "user.upgraded";

#[derive(Debug, Deserialize, Validate)]
pub struct PolkaWebhookRequest {
    #[validate(length(min = 1, message = "Event is required"))]
    pub event: String,
    pub data: PolkaWebhookData,
}

#[derive(Debug, Deserialize)]
pub struct PolkaWebhookData {
    pub user_id: Uuid,
}

impl PolkaWebhookRequest {
    pub fn is_upgrade(&self) -> bool {
        self.event == USER_UPGRADED_EVENT
    }
}
