use serde::{Deserialize, Serialize};

use super::validate::{optional, required};
use super::{nullable, Entity, Lifecycle};
use crate::error::ValidationError;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyImage {
    pub id: i64,
    pub image_url: String,
    pub alt_text: Option<String>,
    pub display_order: i32,
    pub is_cover: bool,
    pub property_id: i64,
    #[serde(flatten)]
    pub lifecycle: Lifecycle,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewPropertyImage {
    pub image_url: String,
    pub alt_text: Option<String>,
    #[serde(default)]
    pub display_order: i32,
    #[serde(default)]
    pub is_cover: bool,
    pub property_id: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PropertyImagePatch {
    pub image_url: Option<String>,
    #[serde(deserialize_with = "nullable")]
    pub alt_text: Option<Option<String>>,
    pub display_order: Option<i32>,
}

/// Images come back in display order.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PropertyImageQuery {
    pub property_id: Option<i64>,
    pub is_cover: Option<bool>,
}

impl Entity for PropertyImage {
    const NAME: &'static str = "PropertyImage";

    type New = NewPropertyImage;
    type Patch = PropertyImagePatch;
    type Query = PropertyImageQuery;

    fn from_new(new: NewPropertyImage) -> Self {
        Self {
            id: 0,
            image_url: new.image_url,
            alt_text: new.alt_text,
            display_order: new.display_order,
            is_cover: new.is_cover,
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

    // Cover selection goes through `Store::set_cover_image` so siblings stay consistent.
    fn apply_patch(&mut self, patch: PropertyImagePatch) {
        if let Some(image_url) = patch.image_url {
            self.image_url = image_url;
        }
        if let Some(alt_text) = patch.alt_text {
            self.alt_text = alt_text;
        }
        if let Some(display_order) = patch.display_order {
            self.display_order = display_order;
        }
    }

    fn validate(&self) -> Result<(), ValidationError> {
        required("image_url", &self.image_url, 500)?;
        optional("alt_text", self.alt_text.as_deref(), 250)
    }
}
