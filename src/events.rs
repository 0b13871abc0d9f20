/*
 * Responsibility
 * - Events the server publishes on the EventBus
 */
use chrono::{DateTime, Utc};

use crate::plugins::event_bus::Event;

#[derive(Debug, Clone, PartialEq)]
pub struct UserPinged {
    pub user_id: String,
    pub message: String,
    pub at: DateTime<Utc>,
}

impl Event for UserPinged {
    const NAME: &'static str = "user.pinged";
}
