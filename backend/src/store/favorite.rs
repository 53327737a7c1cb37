use chrono::NaiveDateTime;
use diesel::prelude::*;
use diesel::sqlite::{Sqlite, SqliteConnection};

use super::{require_live, Record, Scope, Stamps, Table};
use crate::error::{StoreError, StoreResult};
use crate::models::{Entity, Favorite, FavoriteQuery, Page, Property, User};
use crate::schema::favorites;

#[derive(Queryable, Selectable)]
#[diesel(table_name = favorites)]
#[diesel(check_for_backend(Sqlite))]
struct FavoriteRow {
    id: i64,
    user_id: i64,
    property_id: i64,
    created_at: NaiveDateTime,
    updated_at: Option<NaiveDateTime>,
    is_deleted: bool,
    deleted_at: Option<NaiveDateTime>,
}

#[derive(Insertable, AsChangeset)]
#[diesel(table_name = favorites)]
#[diesel(treat_none_as_null = true)]
struct FavoriteColumns {
    user_id: i64,
    property_id: i64,
    created_at: NaiveDateTime,
    updated_at: Option<NaiveDateTime>,
    is_deleted: bool,
    deleted_at: Option<NaiveDateTime>,
}

impl From<FavoriteRow> for Favorite {
    fn from(row: FavoriteRow) -> Self {
        Favorite {
            id: row.id,
            user_id: row.user_id,
            property_id: row.property_id,
            lifecycle: Stamps {
                created_at: row.created_at,
                updated_at: row.updated_at,
                is_deleted: row.is_deleted,
                deleted_at: row.deleted_at,
            }
            .into_lifecycle(),
        }
    }
}

fn columns(favorite: &Favorite) -> FavoriteColumns {
    let stamps = Stamps::of(&favorite.lifecycle);
    FavoriteColumns {
        user_id: favorite.user_id,
        property_id: favorite.property_id,
        created_at: stamps.created_at,
        updated_at: stamps.updated_at,
        is_deleted: stamps.is_deleted,
        deleted_at: stamps.deleted_at,
    }
}

pub(super) fn live_for_user(conn: &mut SqliteConnection, user_id: i64) -> StoreResult<Vec<Favorite>> {
    Ok(scoped!(favorites, Scope::Live)
        .filter(favorites::user_id.eq(user_id))
        .load::<FavoriteRow>(conn)?
        .into_iter()
        .map(Favorite::from)
        .collect())
}

pub(super) fn live_for_property(
    conn: &mut SqliteConnection,
    property_id: i64,
) -> StoreResult<Vec<Favorite>> {
    Ok(scoped!(favorites, Scope::Live)
        .filter(favorites::property_id.eq(property_id))
        .load::<FavoriteRow>(conn)?
        .into_iter()
        .map(Favorite::from)
        .collect())
}

impl Table for Favorite {
    fn find(conn: &mut SqliteConnection, id: i64, scope: Scope) -> StoreResult<Option<Self>> {
        Ok(scoped!(favorites, scope)
            .filter(favorites::id.eq(id))
            .first::<FavoriteRow>(conn)
            .optional()?
            .map(Favorite::from))
    }

    fn search(conn: &mut SqliteConnection, filter: &FavoriteQuery, page: Page) -> StoreResult<Vec<Self>> {
        let mut query = scoped!(favorites, Scope::Live);
        if let Some(user_id) = filter.user_id {
            query = query.filter(favorites::user_id.eq(user_id));
        }
        if let Some(property_id) = filter.property_id {
            query = query.filter(favorites::property_id.eq(property_id));
        }
        let (offset, limit) = page.bounds();
        Ok(query
            .order(favorites::id.desc())
            .offset(offset)
            .limit(limit)
            .load::<FavoriteRow>(conn)?
            .into_iter()
            .map(Favorite::from)
            .collect())
    }

    fn insert(&self, conn: &mut SqliteConnection) -> StoreResult<Self> {
        diesel::insert_into(favorites::table)
            .values(&columns(self))
            .get_result::<FavoriteRow>(conn)
            .map(Favorite::from)
            .map_err(|e| StoreError::from_write(Self::NAME, e))
    }

    fn update(&self, conn: &mut SqliteConnection) -> StoreResult<()> {
        let changed = diesel::update(favorites::table.find(self.id))
            .set(&columns(self))
            .execute(conn)
            .map_err(|e| StoreError::from_write(Self::NAME, e))?;
        if changed == 0 {
            return Err(StoreError::not_found(Self::NAME, self.id));
        }
        Ok(())
    }

    fn check_references(&self, conn: &mut SqliteConnection) -> StoreResult<()> {
        require_live::<User>(conn, Self::NAME, self.user_id)?;
        require_live::<Property>(conn, Self::NAME, self.property_id)
    }

    fn into_record(self) -> Record {
        Record::Favorite(self)
    }

    fn from_record(record: Record) -> Option<Self> {
        match record {
            Record::Favorite(favorite) => Some(favorite),
            _ => None,
        }
    }
}
