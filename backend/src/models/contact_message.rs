use serde::{Deserialize, Serialize};

use super::validate::required;
use super::{Entity, Lifecycle};
use crate::error::ValidationError;

/// An inquiry sent through the contact form, optionally tied to a user and a listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContactMessage {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub is_read: bool,
    pub is_replied: bool,
    pub user_id: Option<i64>,
    pub property_id: Option<i64>,
    #[serde(flatten)]
    pub lifecycle: Lifecycle,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewContactMessage {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub user_id: Option<i64>,
    pub property_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ContactMessagePatch {
    pub is_read: Option<bool>,
    pub is_replied: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ContactMessageQuery {
    pub user_id: Option<i64>,
    pub property_id: Option<i64>,
    pub is_read: Option<bool>,
    pub is_replied: Option<bool>,
}

impl Entity for ContactMessage {
    const NAME: &'static str = "ContactMessage";

    type New = NewContactMessage;
    type Patch = ContactMessagePatch;
    type Query = ContactMessageQuery;

    fn from_new(new: NewContactMessage) -> Self {
        Self {
            id: 0,
            name: new.name,
            email: new.email,
            subject: new.subject,
            message: new.message,
            is_read: false,
            is_replied: false,
            user_id: new.user_id,
            property_id: new.property_id,
            lifecycle: Lifecycle::default(),
        }
    }

    fn id(&self) -> i64 {
        self.id
    }

    fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    fn lifecycle_mut(&mut self) -> &mut Lifecycle {
        &mut self.lifecycle
    }

    fn apply_patch(&mut self, patch: ContactMessagePatch) {
        if let Some(is_read) = patch.is_read {
            self.is_read = is_read;
        }
        if let Some(is_replied) = patch.is_replied {
            self.is_replied = is_replied;
            // A reply implies the message was read.
            if is_replied {
                self.is_read = true;
            }
        }
    }

    fn validate(&self) -> Result<(), ValidationError> {
        required("name", &self.name, 100)?;
        required("email", &self.email, 255)?;
        required("subject", &self.subject, 200)?;
        required("message", &self.message, 2000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message() -> ContactMessage {
        ContactMessage::from_new(NewContactMessage {
            name: "Orkhan".to_string(),
            email: "orkhan@example.com".to_string(),
            subject: "Viewing".to_string(),
            message: "Is the flat still available?".to_string(),
            user_id: None,
            property_id: None,
        })
    }

    #[test]
    fn test_all_text_fields_required() {
        let mut msg = message();
        assert!(msg.validate().is_ok());
        msg.subject = String::new();
        assert_eq!(
            msg.validate(),
            Err(ValidationError::MissingField { field: "subject" })
        );
    }

    #[test]
    fn test_message_length_bound() {
        let mut msg = message();
        msg.message = "a".repeat(2001);
        assert_eq!(
            msg.validate(),
            Err(ValidationError::FieldTooLong {
                field: "message",
                max_length: 2000
            })
        );
    }

    #[test]
    fn test_reply_marks_read() {
        let mut msg = message();
        msg.apply_patch(ContactMessagePatch {
            is_replied: Some(true),
            ..ContactMessagePatch::default()
        });
        assert!(msg.is_read);
        assert!(msg.is_replied);
    }
}
