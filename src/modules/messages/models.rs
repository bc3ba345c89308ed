use chrono::{DateTime, Utc};
use savanna_http::{AppError, FieldErrors};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::utils::{closed_enum, filter::Filterable};

closed_enum! {
    pub enum MessageStatus {
        Unread => "unread",
        Read => "read",
        Replied => "replied",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub contact_number: Option<String>,
    pub adults: i64,
    pub children: i64,
    pub subject: String,
    pub message: String,
    pub status: MessageStatus,
    pub created_at: DateTime<Utc>,
}

impl Filterable for Message {
    fn search_text(&self) -> Vec<&str> {
        vec![
            self.name.as_str(),
            self.email.as_str(),
            self.subject.as_str(),
            self.message.as_str(),
        ]
    }

    fn status(&self) -> Option<&str> {
        Some(self.status.as_str())
    }
}

/// Public contact form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct NewMessage {
    #[validate(length(max = 255))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(max = 50))]
    pub contact_number: Option<String>,
    #[validate(range(min = 1))]
    pub adults: i64,
    #[validate(range(min = 0))]
    pub children: i64,
    #[validate(length(max = 255))]
    pub subject: String,
    #[validate(length(max = 5000))]
    pub message: String,
}

impl Default for NewMessage {
    fn default() -> Self {
        Self {
            name: String::new(),
            email: String::new(),
            contact_number: None,
            adults: 1,
            children: 0,
            subject: String::new(),
            message: String::new(),
        }
    }
}

impl NewMessage {
    pub fn validate(&self) -> Result<(), AppError> {
        let mut errors = FieldErrors::new();
        errors
            .required("name", &self.name)
            .required("email", &self.email)
            .required("subject", &self.subject)
            .required("message", &self.message)
            .merge(Validate::validate(self));
        errors.finish()
    }

    pub fn contact_number(&self) -> Option<&str> {
        self.contact_number
            .as_deref()
            .map(str::trim)
            .filter(|number| !number.is_empty())
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct UpdateMessageStatus {
    pub status: MessageStatus,
}

#[cfg(test)]
pub(crate) fn sample_message(name: &str, subject: &str) -> NewMessage {
    NewMessage {
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase()),
        contact_number: Some("+44 20 7946 0000".to_string()),
        adults: 2,
        children: 1,
        subject: subject.to_string(),
        message: "Is July a good month for the river crossings?".to_string(),
    }
}
