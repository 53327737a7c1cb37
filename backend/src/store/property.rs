use chrono::NaiveDateTime;
use diesel::dsl::count_star;
use diesel::prelude::*;
use diesel::sqlite::{Sqlite, SqliteConnection};

use super::{cascade_delete, contact_message, favorite, payment, property_image, require_live};
use super::{from_scaled, to_scaled, unknown_code, ChangeSet, Record, Scope, Stamps, Table};
use crate::error::{StoreError, StoreResult};
use crate::models::{
    Entity, Page, Property, PropertyQuery, PropertySort, PropertyStatus, PropertyType, SortOrder,
    User, COORDINATE_SCALE, MONEY_SCALE,
};
use crate::schema::properties;

#[derive(Queryable, Selectable)]
#[diesel(table_name = properties)]
#[diesel(check_for_backend(Sqlite))]
struct PropertyRow {
    id: i64,
    title: String,
    description: String,
    property_type: i32,
    status: i32,
    price: i64,
    currency: String,
    area: i64,
    bedrooms: i32,
    bathrooms: i32,
    living_rooms: i32,
    floor: Option<i32>,
    total_floors: Option<i32>,
    build_year: Option<i32>,
    has_balcony: bool,
    has_elevator: bool,
    has_parking: bool,
    is_furnished: bool,
    country: String,
    city: String,
    district: String,
    neighborhood: String,
    address: String,
    postal_code: Option<String>,
    latitude: Option<i64>,
    longitude: Option<i64>,
    view_count: i32,
    is_featured: bool,
    is_published: bool,
    video_url: Option<String>,
    virtual_tour_url: Option<String>,
    user_id: i64,
    created_at: NaiveDateTime,
    updated_at: Option<NaiveDateTime>,
    is_deleted: bool,
    deleted_at: Option<NaiveDateTime>,
}

#[derive(Insertable, AsChangeset)]
#[diesel(table_name = properties)]
#[diesel(treat_none_as_null = true)]
struct PropertyColumns<'a> {
    title: &'a str,
    description: &'a str,
    property_type: i32,
    status: i32,
    price: i64,
    currency: &'a str,
    area: i64,
    bedrooms: i32,
    bathrooms: i32,
    living_rooms: i32,
    floor: Option<i32>,
    total_floors: Option<i32>,
    build_year: Option<i32>,
    has_balcony: bool,
    has_elevator: bool,
    has_parking: bool,
    is_furnished: bool,
    country: &'a str,
    city: &'a str,
    district: &'a str,
    neighborhood: &'a str,
    address: &'a str,
    postal_code: Option<&'a str>,
    latitude: Option<i64>,
    longitude: Option<i64>,
    view_count: i32,
    is_featured: bool,
    is_published: bool,
    video_url: Option<&'a str>,
    virtual_tour_url: Option<&'a str>,
    user_id: i64,
    created_at: NaiveDateTime,
    updated_at: Option<NaiveDateTime>,
    is_deleted: bool,
    deleted_at: Option<NaiveDateTime>,
}

impl TryFrom<PropertyRow> for Property {
    type Error = StoreError;

    fn try_from(row: PropertyRow) -> StoreResult<Self> {
        let property_type = PropertyType::from_code(row.property_type)
            .ok_or_else(|| unknown_code(Property::NAME, "property_type", row.property_type))?;
        let status = PropertyStatus::from_code(row.status)
            .ok_or_else(|| unknown_code(Property::NAME, "status", row.status))?;
        let lifecycle = Stamps {
            created_at: row.created_at,
            updated_at: row.updated_at,
            is_deleted: row.is_deleted,
            deleted_at: row.deleted_at,
        }
        .into_lifecycle();
        Ok(Property {
            id: row.id,
            title: row.title,
            description: row.description,
            property_type,
            status,
            price: from_scaled(row.price, MONEY_SCALE),
            currency: row.currency,
            area: from_scaled(row.area, MONEY_SCALE),
            bedrooms: row.bedrooms,
            bathrooms: row.bathrooms,
            living_rooms: row.living_rooms,
            floor: row.floor,
            total_floors: row.total_floors,
            build_year: row.build_year,
            has_balcony: row.has_balcony,
            has_elevator: row.has_elevator,
            has_parking: row.has_parking,
            is_furnished: row.is_furnished,
            country: row.country,
            city: row.city,
            district: row.district,
            neighborhood: row.neighborhood,
            address: row.address,
            postal_code: row.postal_code,
            latitude: row.latitude.map(|v| from_scaled(v, COORDINATE_SCALE)),
            longitude: row.longitude.map(|v| from_scaled(v, COORDINATE_SCALE)),
            view_count: row.view_count,
            is_featured: row.is_featured,
            is_published: row.is_published,
            video_url: row.video_url,
            virtual_tour_url: row.virtual_tour_url,
            user_id: row.user_id,
            lifecycle,
        })
    }
}

fn columns(property: &Property) -> PropertyColumns<'_> {
    let stamps = Stamps::of(&property.lifecycle);
    PropertyColumns {
        title: &property.title,
        description: &property.description,
        property_type: property.property_type.code(),
        status: property.status.code(),
        price: to_scaled(property.price, MONEY_SCALE),
        currency: &property.currency,
        area: to_scaled(property.area, MONEY_SCALE),
        bedrooms: property.bedrooms,
        bathrooms: property.bathrooms,
        living_rooms: property.living_rooms,
        floor: property.floor,
        total_floors: property.total_floors,
        build_year: property.build_year,
        has_balcony: property.has_balcony,
        has_elevator: property.has_elevator,
        has_parking: property.has_parking,
        is_furnished: property.is_furnished,
        country: &property.country,
        city: &property.city,
        district: &property.district,
        neighborhood: &property.neighborhood,
        address: &property.address,
        postal_code: property.postal_code.as_deref(),
        latitude: property.latitude.map(|v| to_scaled(v, COORDINATE_SCALE)),
        longitude: property.longitude.map(|v| to_scaled(v, COORDINATE_SCALE)),
        view_count: property.view_count,
        is_featured: property.is_featured,
        is_published: property.is_published,
        video_url: property.video_url.as_deref(),
        virtual_tour_url: property.virtual_tour_url.as_deref(),
        user_id: property.user_id,
        created_at: stamps.created_at,
        updated_at: stamps.updated_at,
        is_deleted: stamps.is_deleted,
        deleted_at: stamps.deleted_at,
    }
}

/// Live listings owned by `user_id`.
pub(super) fn count_live_for_user(conn: &mut SqliteConnection, user_id: i64) -> StoreResult<i64> {
    Ok(properties::table
        .filter(properties::user_id.eq(user_id))
        .filter(properties::is_deleted.eq(false))
        .select(count_star())
        .first(conn)?)
}

impl Table for Property {
    fn find(conn: &mut SqliteConnection, id: i64, scope: Scope) -> StoreResult<Option<Self>> {
        scoped!(properties, scope)
            .filter(properties::id.eq(id))
            .first::<PropertyRow>(conn)
            .optional()?
            .map(Property::try_from)
            .transpose()
    }

    fn search(
        conn: &mut SqliteConnection,
        filter: &PropertyQuery,
        page: Page,
    ) -> StoreResult<Vec<Self>> {
        let mut query = scoped!(properties, Scope::Live);
        if let Some(property_type) = filter.property_type {
            query = query.filter(properties::property_type.eq(property_type.code()));
        }
        if let Some(status) = filter.status {
            query = query.filter(properties::status.eq(status.code()));
        }
        if let Some(city) = &filter.city {
            query = query.filter(properties::city.eq(city.as_str()));
        }
        if let Some(min_price) = filter.min_price {
            query = query.filter(properties::price.ge(to_scaled(min_price, MONEY_SCALE)));
        }
        if let Some(max_price) = filter.max_price {
            query = query.filter(properties::price.le(to_scaled(max_price, MONEY_SCALE)));
        }
        if let Some(is_featured) = filter.is_featured {
            query = query.filter(properties::is_featured.eq(is_featured));
        }
        if let Some(is_published) = filter.is_published {
            query = query.filter(properties::is_published.eq(is_published));
        }
        if let Some(user_id) = filter.user_id {
            query = query.filter(properties::user_id.eq(user_id));
        }

        query = match (filter.sort, filter.order) {
            (PropertySort::CreatedAt, SortOrder::Asc) => query.order(properties::created_at.asc()),
            (PropertySort::CreatedAt, SortOrder::Desc) => query.order(properties::created_at.desc()),
            (PropertySort::Price, SortOrder::Asc) => query.order(properties::price.asc()),
            (PropertySort::Price, SortOrder::Desc) => query.order(properties::price.desc()),
            (PropertySort::Area, SortOrder::Asc) => query.order(properties::area.asc()),
            (PropertySort::Area, SortOrder::Desc) => query.order(properties::area.desc()),
            (PropertySort::ViewCount, SortOrder::Asc) => query.order(properties::view_count.asc()),
            (PropertySort::ViewCount, SortOrder::Desc) => query.order(properties::view_count.desc()),
        };
        // Ties break on insertion order.
        query = query.then_order_by(properties::id.asc());

        let (offset, limit) = page.bounds();
        query
            .offset(offset)
            .limit(limit)
            .load::<PropertyRow>(conn)?
            .into_iter()
            .map(Property::try_from)
            .collect()
    }

    fn insert(&self, conn: &mut SqliteConnection) -> StoreResult<Self> {
        diesel::insert_into(properties::table)
            .values(&columns(self))
            .get_result::<PropertyRow>(conn)
            .map_err(|e| StoreError::from_write(Self::NAME, e))?
            .try_into()
    }

    fn update(&self, conn: &mut SqliteConnection) -> StoreResult<()> {
        let changed = diesel::update(properties::table.find(self.id))
            .set(&columns(self))
            .execute(conn)
            .map_err(|e| StoreError::from_write(Self::NAME, e))?;
        if changed == 0 {
            return Err(StoreError::not_found(Self::NAME, self.id));
        }
        Ok(())
    }

    fn check_references(&self, conn: &mut SqliteConnection) -> StoreResult<()> {
        require_live::<User>(conn, Self::NAME, self.user_id)
    }

    fn plan_delete(&self, conn: &mut SqliteConnection, changes: &mut ChangeSet) -> StoreResult<()> {
        let images = property_image::live_for_property(conn, self.id)?;
        cascade_delete(conn, changes, images)?;

        let favorites = favorite::live_for_property(conn, self.id)?;
        cascade_delete(conn, changes, favorites)?;

        for mut payment in payment::for_property(conn, self.id, Scope::IncludeDeleted)? {
            payment.property_id = None;
            changes.modify(payment);
        }
        for mut message in contact_message::for_property(conn, self.id, Scope::IncludeDeleted)? {
            message.property_id = None;
            changes.modify(message);
        }
        Ok(())
    }

    fn into_record(self) -> Record {
        Record::Property(self)
    }

    fn from_record(record: Record) -> Option<Self> {
        match record {
            Record::Property(property) => Some(property),
            _ => None,
        }
    }
}
