use chrono::NaiveDateTime;
use diesel::prelude::*;
use diesel::sqlite::{Sqlite, SqliteConnection};

use super::{require_live, Record, Scope, Stamps, Table};
use crate::error::{StoreError, StoreResult};
use crate::models::{Entity, Page, Property, PropertyImage, PropertyImageQuery};
use crate::schema::property_images;

#[derive(Queryable, Selectable)]
#[diesel(table_name = property_images)]
#[diesel(check_for_backend(Sqlite))]
struct PropertyImageRow {
    id: i64,
    image_url: String,
    alt_text: Option<String>,
    display_order: i32,
    is_cover: bool,
    property_id: i64,
    created_at: NaiveDateTime,
    updated_at: Option<NaiveDateTime>,
    is_deleted: bool,
    deleted_at: Option<NaiveDateTime>,
}

#[derive(Insertable, AsChangeset)]
#[diesel(table_name = property_images)]
#[diesel(treat_none_as_null = true)]
struct PropertyImageColumns<'a> {
    image_url: &'a str,
    alt_text: Option<&'a str>,
    display_order: i32,
    is_cover: bool,
    property_id: i64,
    created_at: NaiveDateTime,
    updated_at: Option<NaiveDateTime>,
    is_deleted: bool,
    deleted_at: Option<NaiveDateTime>,
}

impl From<PropertyImageRow> for PropertyImage {
    fn from(row: PropertyImageRow) -> Self {
        PropertyImage {
            id: row.id,
            image_url: row.image_url,
            alt_text: row.alt_text,
            display_order: row.display_order,
            is_cover: row.is_cover,
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

fn columns(image: &PropertyImage) -> PropertyImageColumns<'_> {
    let stamps = Stamps::of(&image.lifecycle);
    PropertyImageColumns {
        image_url: &image.image_url,
        alt_text: image.alt_text.as_deref(),
        display_order: image.display_order,
        is_cover: image.is_cover,
        property_id: image.property_id,
        created_at: stamps.created_at,
        updated_at: stamps.updated_at,
        is_deleted: stamps.is_deleted,
        deleted_at: stamps.deleted_at,
    }
}

/// Live images of a listing in display order.
pub(super) fn live_for_property(
    conn: &mut SqliteConnection,
    property_id: i64,
) -> StoreResult<Vec<PropertyImage>> {
    Ok(scoped!(property_images, Scope::Live)
        .filter(property_images::property_id.eq(property_id))
        .order((property_images::display_order.asc(), property_images::id.asc()))
        .load::<PropertyImageRow>(conn)?
        .into_iter()
        .map(PropertyImage::from)
        .collect())
}

impl Table for PropertyImage {
    fn find(conn: &mut SqliteConnection, id: i64, scope: Scope) -> StoreResult<Option<Self>> {
        Ok(scoped!(property_images, scope)
            .filter(property_images::id.eq(id))
            .first::<PropertyImageRow>(conn)
            .optional()?
            .map(PropertyImage::from))
    }

    fn search(
        conn: &mut SqliteConnection,
        filter: &PropertyImageQuery,
        page: Page,
    ) -> StoreResult<Vec<Self>> {
        let mut query = scoped!(property_images, Scope::Live);
        if let Some(property_id) = filter.property_id {
            query = query.filter(property_images::property_id.eq(property_id));
        }
        if let Some(is_cover) = filter.is_cover {
            query = query.filter(property_images::is_cover.eq(is_cover));
        }
        let (offset, limit) = page.bounds();
        Ok(query
            .order((property_images::display_order.asc(), property_images::id.asc()))
            .offset(offset)
            .limit(limit)
            .load::<PropertyImageRow>(conn)?
            .into_iter()
            .map(PropertyImage::from)
            .collect())
    }

    fn insert(&self, conn: &mut SqliteConnection) -> StoreResult<Self> {
        diesel::insert_into(property_images::table)
            .values(&columns(self))
            .get_result::<PropertyImageRow>(conn)
            .map(PropertyImage::from)
            .map_err(|e| StoreError::from_write(Self::NAME, e))
    }

    fn update(&self, conn: &mut SqliteConnection) -> StoreResult<()> {
        let changed = diesel::update(property_images::table.find(self.id))
            .set(&columns(self))
            .execute(conn)
            .map_err(|e| StoreError::from_write(Self::NAME, e))?;
        if changed == 0 {
            return Err(StoreError::not_found(Self::NAME, self.id));
        }
        Ok(())
    }

    fn check_references(&self, conn: &mut SqliteConnection) -> StoreResult<()> {
        require_live::<Property>(conn, Self::NAME, self.property_id)
    }

    fn into_record(self) -> Record {
        Record::PropertyImage(self)
    }

    fn from_record(record: Record) -> Option<Self> {
        match record {
            Record::PropertyImage(image) => Some(image),
            _ => None,
        }
    }
}
