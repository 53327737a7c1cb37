use serde::{Deserialize, Serialize};

use super::{Entity, Lifecycle};
use crate::error::ValidationError;

/// A user's bookmark on a listing. Only one live favorite per pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Favorite {
    pub id: i64,
    pub user_id: i64,
    pub property_id: i64,
    #[serde(flatten)]
    pub lifecycle: Lifecycle,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewFavorite {
    pub user_id: i64,
    pub property_id: i64,
}

/// Favorites carry no mutable columns.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FavoritePatch {}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FavoriteQuery {
    pub user_id: Option<i64>,
    pub property_id: Option<i64>,
}

impl Entity for Favorite {
    const NAME: &'static str = "Favorite";

    type New = NewFavorite;
    type Patch = FavoritePatch;
    type Query = FavoriteQuery;

    fn from_new(new: NewFavorite) -> Self {
        Self {
            id: 0,
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

    fn apply_patch(&mut self, _patch: FavoritePatch) {}

    fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }
}
