use async_trait::async_trait;

use crate::domain::user::models::User;
use crate::domain::user::ports::MessageSender;
use crate::user::errors::MessageSenderError;

/// Subject line of the genre-subscription notification.
pub const SUBSCRIPTION_SUBJECT: &str = "New book available";

/// Delivers notifications as structured log records.
///
/// Stands in for a mail transport: the record carries the recipient and the
/// rendered message, so a log shipper can forward it.
#[derive(Debug, Default, Clone)]
pub struct LoggingMessageSender;

impl LoggingMessageSender {
    pub fn new() -> Self {
        Self
    }
}

fn subscription_body(recipient: &User) -> String {
    format!(
        "Hello {}, a new book has been published in the genre you subscribed to.",
        recipient.username
    )
}

#[async_trait]
impl MessageSender for LoggingMessageSender {
    async fn send_subscription_message(&self, recipient: &User) -> Result<(), MessageSenderError> {
        tracing::info!(
            user_id = %recipient.id,
            to = %recipient.email.as_str(),
            subject = SUBSCRIPTION_SUBJECT,
            body = %subscription_body(recipient),
            "Subscription message sent"
        );
        Ok(())
    }
}
