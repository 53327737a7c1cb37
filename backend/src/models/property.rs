use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::validate::{non_negative, non_negative_numeric, numeric, optional, required};
use super::{nullable, Entity, Lifecycle, PropertyStatus, PropertyType, SortOrder};
use crate::error::ValidationError;

/// Scale of `price` and `area`.
pub const MONEY_SCALE: u32 = 2;
/// Scale of `latitude` and `longitude`.
pub const COORDINATE_SCALE: u32 = 7;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Property {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub property_type: PropertyType,
    pub status: PropertyStatus,
    pub price: Decimal,
    pub currency: String,
    pub area: Decimal,
    pub bedrooms: i32,
    pub bathrooms: i32,
    pub living_rooms: i32,
    pub floor: Option<i32>,
    pub total_floors: Option<i32>,
    pub build_year: Option<i32>,
    pub has_balcony: bool,
    pub has_elevator: bool,
    pub has_parking: bool,
    pub is_furnished: bool,
    pub country: String,
    pub city: String,
    pub district: String,
    pub neighborhood: String,
    pub address: String,
    pub postal_code: Option<String>,
    pub latitude: Option<Decimal>,
    pub longitude: Option<Decimal>,
    pub view_count: i32,
    pub is_featured: bool,
    pub is_published: bool,
    pub video_url: Option<String>,
    pub virtual_tour_url: Option<String>,
    pub user_id: i64,
    #[serde(flatten)]
    pub lifecycle: Lifecycle,
}

impl Property {
    /// `neighborhood,district,city`, recomputed on every read.
    pub fn full_location(&self) -> String {
        format!("{},{},{}", self.neighborhood, self.district, self.city)
    }

    /// Price divided by area, or zero when there is no area.
    pub fn price_per_square_meter(&self) -> Decimal {
        if self.area > Decimal::ZERO {
            self.price / self.area
        } else {
            Decimal::ZERO
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewProperty {
    pub title: String,
    pub description: String,
    pub property_type: PropertyType,
    pub status: PropertyStatus,
    pub price: Decimal,
    pub currency: String,
    pub area: Decimal,
    #[serde(default)]
    pub bedrooms: i32,
    #[serde(default)]
    pub bathrooms: i32,
    #[serde(default)]
    pub living_rooms: i32,
    pub floor: Option<i32>,
    pub total_floors: Option<i32>,
    pub build_year: Option<i32>,
    #[serde(default)]
    pub has_balcony: bool,
    #[serde(default)]
    pub has_elevator: bool,
    #[serde(default)]
    pub has_parking: bool,
    #[serde(default)]
    pub is_furnished: bool,
    pub country: String,
    pub city: String,
    pub district: String,
    pub neighborhood: String,
    pub address: String,
    pub postal_code: Option<String>,
    pub latitude: Option<Decimal>,
    pub longitude: Option<Decimal>,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub is_published: bool,
    pub video_url: Option<String>,
    pub virtual_tour_url: Option<String>,
    pub user_id: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PropertyPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub property_type: Option<PropertyType>,
    pub status: Option<PropertyStatus>,
    pub price: Option<Decimal>,
    pub currency: Option<String>,
    pub area: Option<Decimal>,
    pub bedrooms: Option<i32>,
    pub bathrooms: Option<i32>,
    pub living_rooms: Option<i32>,
    #[serde(deserialize_with = "nullable")]
    pub floor: Option<Option<i32>>,
    #[serde(deserialize_with = "nullable")]
    pub total_floors: Option<Option<i32>>,
    #[serde(deserialize_with = "nullable")]
    pub build_year: Option<Option<i32>>,
    pub has_balcony: Option<bool>,
    pub has_elevator: Option<bool>,
    pub has_parking: Option<bool>,
    pub is_furnished: Option<bool>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub district: Option<String>,
    pub neighborhood: Option<String>,
    pub address: Option<String>,
    #[serde(deserialize_with = "nullable")]
    pub postal_code: Option<Option<String>>,
    #[serde(deserialize_with = "nullable")]
    pub latitude: Option<Option<Decimal>>,
    #[serde(deserialize_with = "nullable")]
    pub longitude: Option<Option<Decimal>>,
    pub is_featured: Option<bool>,
    pub is_published: Option<bool>,
    #[serde(deserialize_with = "nullable")]
    pub video_url: Option<Option<String>>,
    #[serde(deserialize_with = "nullable")]
    pub virtual_tour_url: Option<Option<String>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertySort {
    #[default]
    CreatedAt,
    Price,
    Area,
    ViewCount,
}

/// Filters over the indexed listing columns.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PropertyQuery {
    pub property_type: Option<PropertyType>,
    pub status: Option<PropertyStatus>,
    pub city: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub is_featured: Option<bool>,
    pub is_published: Option<bool>,
    pub user_id: Option<i64>,
    pub sort: PropertySort,
    pub order: SortOrder,
}

impl Entity for Property {
    const NAME: &'static str = "Property";

    type New = NewProperty;
    type Patch = PropertyPatch;
    type Query = PropertyQuery;

    fn from_new(new: NewProperty) -> Self {
        Self {
            id: 0,
            title: new.title,
            description: new.description,
            property_type: new.property_type,
            status: new.status,
            price: new.price,
            currency: new.currency,
            area: new.area,
            bedrooms: new.bedrooms,
            bathrooms: new.bathrooms,
            living_rooms: new.living_rooms,
            floor: new.floor,
            total_floors: new.total_floors,
            build_year: new.build_year,
            has_balcony: new.has_balcony,
            has_elevator: new.has_elevator,
            has_parking: new.has_parking,
            is_furnished: new.is_furnished,
            country: new.country,
            city: new.city,
            district: new.district,
            neighborhood: new.neighborhood,
            address: new.address,
            postal_code: new.postal_code,
            latitude: new.latitude,
            longitude: new.longitude,
            view_count: 0,
            is_featured: new.is_featured,
            is_published: new.is_published,
            video_url: new.video_url,
            virtual_tour_url: new.virtual_tour_url,
            user_id: new.user_id,
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

    fn apply_patch(&mut self, patch: PropertyPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(property_type) = patch.property_type {
            self.property_type = property_type;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(price) = patch.price {
            self.price = price;
        }
        if let Some(currency) = patch.currency {
            self.currency = currency;
        }
        if let Some(area) = patch.area {
            self.area = area;
        }
        if let Some(bedrooms) = patch.bedrooms {
            self.bedrooms = bedrooms;
        }
        if let Some(bathrooms) = patch.bathrooms {
            self.bathrooms = bathrooms;
        }
        if let Some(living_rooms) = patch.living_rooms {
            self.living_rooms = living_rooms;
        }
        if let Some(has_balcony) = patch.has_balcony {
            self.has_balcony = has_balcony;
        }
        if let Some(has_elevator) = patch.has_elevator {
            self.has_elevator = has_elevator;
        }
        if let Some(has_parking) = patch.has_parking {
            self.has_parking = has_parking;
        }
        if let Some(is_furnished) = patch.is_furnished {
            self.is_furnished = is_furnished;
        }
        if let Some(country) = patch.country {
            self.country = country;
        }
        if let Some(city) = patch.city {
            self.city = city;
        }
        if let Some(district) = patch.district {
            self.district = district;
        }
        if let Some(neighborhood) = patch.neighborhood {
            self.neighborhood = neighborhood;
        }
        if let Some(address) = patch.address {
            self.address = address;
        }
        if let Some(is_featured) = patch.is_featured {
            self.is_featured = is_featured;
        }
        if let Some(is_published) = patch.is_published {
            self.is_published = is_published;
        }
        if let Some(floor) = patch.floor {
            self.floor = floor;
        }
        if let Some(total_floors) = patch.total_floors {
            self.total_floors = total_floors;
        }
        if let Some(build_year) = patch.build_year {
            self.build_year = build_year;
        }
        if let Some(postal_code) = patch.postal_code {
            self.postal_code = postal_code;
        }
        if let Some(latitude) = patch.latitude {
            self.latitude = latitude;
        }
        if let Some(longitude) = patch.longitude {
            self.longitude = longitude;
        }
        if let Some(video_url) = patch.video_url {
            self.video_url = video_url;
        }
        if let Some(virtual_tour_url) = patch.virtual_tour_url {
            self.virtual_tour_url = virtual_tour_url;
        }
    }

    fn validate(&self) -> Result<(), ValidationError> {
        required("title", &self.title, 100)?;
        required("description", &self.description, 5000)?;
        non_negative_numeric("price", self.price, 18, MONEY_SCALE)?;
        required("currency", &self.currency, 3)?;
        non_negative_numeric("area", self.area, 10, MONEY_SCALE)?;
        non_negative("bedrooms", self.bedrooms)?;
        non_negative("bathrooms", self.bathrooms)?;
        non_negative("living_rooms", self.living_rooms)?;
        non_negative("view_count", self.view_count)?;
        required("country", &self.country, 100)?;
        required("city", &self.city, 100)?;
        required("district", &self.district, 100)?;
        required("neighborhood", &self.neighborhood, 100)?;
        required("address", &self.address, 500)?;
        optional("postal_code", self.postal_code.as_deref(), 20)?;
        if let Some(latitude) = self.latitude {
            numeric("latitude", latitude, 10, COORDINATE_SCALE)?;
        }
        if let Some(longitude) = self.longitude {
            numeric("longitude", longitude, 10, COORDINATE_SCALE)?;
        }
        optional("video_url", self.video_url.as_deref(), 500)?;
        optional("virtual_tour_url", self.virtual_tour_url.as_deref(), 500)
    }
}
