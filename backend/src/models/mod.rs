use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ValidationError;

mod contact_message;
mod enums;
mod favorite;
mod payment;
mod property;
mod property_image;
mod query;
mod user;
pub(crate) mod validate;

pub use contact_message::{ContactMessage, ContactMessagePatch, ContactMessageQuery, NewContactMessage};
pub use enums::{PaymentStatus, PaymentType, PropertyStatus, PropertyType, UserRole};
pub use favorite::{Favorite, FavoritePatch, FavoriteQuery, NewFavorite};
pub use payment::{NewPayment, Payment, PaymentPatch, PaymentQuery};
pub use property::{
    NewProperty, Property, PropertyPatch, PropertyQuery, PropertySort, COORDINATE_SCALE, MONEY_SCALE,
};
pub use property_image::{NewPropertyImage, PropertyImage, PropertyImagePatch, PropertyImageQuery};
pub use query::{Page, SortOrder};
#[cfg(test)]
pub(crate) use property::tests::new_property as property_fixture;
pub use user::{NewUser, User, UserPatch, UserQuery};

/// Audit columns shared by every table.
///
/// `Default` is the unstamped state of a row that has not been committed yet;
/// the commit hook is the only writer of these fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lifecycle {
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub is_deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Lifecycle {
    pub fn is_live(&self) -> bool {
        !self.is_deleted
    }
}

/// Patch field for a nullable column: absent leaves the column alone
/// (`None`), `null` clears it (`Some(None)`).
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// A row type owned by the store.
///
/// Each entity embeds a [`Lifecycle`] and names the payloads used to create,
/// patch and filter it.
pub trait Entity: Clone + Send + Sync + Serialize + 'static {
    /// Display name used in errors and logs.
    const NAME: &'static str;

    type New: DeserializeOwned + Send + 'static;
    type Patch: DeserializeOwned + Default + Send + 'static;
    type Query: DeserializeOwned + Default + Send + Sync + 'static;

    /// Builds an uncommitted entity (id 0, unstamped lifecycle).
    fn from_new(new: Self::New) -> Self;

    fn id(&self) -> i64;

    fn lifecycle(&self) -> &Lifecycle;

    fn lifecycle_mut(&mut self) -> &mut Lifecycle;

    fn apply_patch(&mut self, patch: Self::Patch);

    /// Required-field, length, sign and precision checks.
    fn validate(&self) -> Result<(), ValidationError>;
}
