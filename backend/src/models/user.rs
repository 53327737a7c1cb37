use serde::{Deserialize, Serialize};

use super::validate::{optional, required};
use super::{nullable, Entity, Lifecycle, SortOrder, UserRole};
use crate::error::ValidationError;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub phone_number: Option<String>,
    pub role: UserRole,
    #[serde(flatten)]
    pub lifecycle: Lifecycle,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Registration payload. Password hashing happens before the store.
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
    pub phone_number: Option<String>,
    #[serde(default)]
    pub role: UserRole,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UserPatch {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub password_hash: Option<String>,
    #[serde(deserialize_with = "nullable")]
    pub phone_number: Option<Option<String>>,
    pub role: Option<UserRole>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UserQuery {
    pub email: Option<String>,
    pub role: Option<UserRole>,
    pub order: SortOrder,
}

impl Entity for User {
    const NAME: &'static str = "User";

    type New = NewUser;
    type Patch = UserPatch;
    type Query = UserQuery;

    fn from_new(new: NewUser) -> Self {
        Self {
            id: 0,
            email: new.email,
            first_name: new.first_name,
            last_name: new.last_name,
            password_hash: new.password_hash,
            phone_number: new.phone_number,
            role: new.role,
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

    fn apply_patch(&mut self, patch: UserPatch) {
        if let Some(email) = patch.email {
            self.email = email;
        }
        if let Some(first_name) = patch.first_name {
            self.first_name = first_name;
        }
        if let Some(last_name) = patch.last_name {
            self.last_name = last_name;
        }
        if let Some(password_hash) = patch.password_hash {
            self.password_hash = password_hash;
        }
        if let Some(phone_number) = patch.phone_number {
            self.phone_number = phone_number;
        }
        if let Some(role) = patch.role {
            self.role = role;
        }
    }

    fn validate(&self) -> Result<(), ValidationError> {
        required("email", &self.email, 255)?;
        required("first_name", &self.first_name, 100)?;
        required("last_name", &self.last_name, 100)?;
        if self.password_hash.is_empty() {
            return Err(ValidationError::MissingField {
                field: "password_hash",
            });
        }
        optional("phone_number", self.phone_number.as_deref(), 20)
    }
}
