use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use log::error;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::json;

use crate::error::{StoreError, StoreResult};
use crate::models::{ContactMessage, Favorite, Page, Payment, Property, PropertyImage, User};
use crate::store::{Store, Table};

#[derive(Clone)]
pub struct AppState {
    pub store: Store,
}

impl AppState {
    pub fn new(store: Store) -> Self {
        Self { store }
    }
}

#[derive(Debug)]
pub enum ApiError {
    Store(StoreError),
    /// The blocking task running the store call panicked or was cancelled.
    Task(String),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        Self::Store(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Store(StoreError::ValidationFailed(_) | StoreError::ForeignKeyMissing { .. }) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            Self::Store(
                StoreError::UniqueConstraintViolated { .. }
                | StoreError::ReferentialRestrictionViolated { .. },
            ) => StatusCode::CONFLICT,
            Self::Store(StoreError::NotFound { .. }) => StatusCode::NOT_FOUND,
            Self::Store(_) | Self::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            Self::Store(err) => err.to_string(),
            Self::Task(reason) => reason.clone(),
        };
        if status.is_server_error() {
            error!("Request failed: {}", message);
        }
        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// How an entity is rendered in responses.
pub trait Present: Table {
    type View: Serialize + std::fmt::Debug + Send + 'static;

    fn present(self) -> Self::View;
}

macro_rules! present_as_stored {
    ($($entity:ty),+) => {
        $(impl Present for $entity {
            type View = Self;

            fn present(self) -> Self {
                self
            }
        })+
    };
}

present_as_stored!(User, PropertyImage, Favorite, Payment, ContactMessage);

/// A listing with its derived values.
#[derive(Debug, Serialize)]
pub struct PropertyView {
    #[serde(flatten)]
    pub property: Property,
    pub full_location: String,
    pub price_per_square_meter: Decimal,
}

impl Present for Property {
    type View = PropertyView;

    fn present(self) -> PropertyView {
        PropertyView {
            full_location: self.full_location(),
            price_per_square_meter: self.price_per_square_meter(),
            property: self,
        }
    }
}

/// Runs a store call on the blocking pool.
async fn blocking<T, F>(call: F) -> Result<T, ApiError>
where
    F: FnOnce() -> StoreResult<T> + Send + 'static,
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(call).await {
        Ok(result) => Ok(result?),
        Err(e) => Err(ApiError::Task(e.to_string())),
    }
}

pub async fn create_entity<E: Present>(
    State(state): State<AppState>,
    Json(new): Json<E::New>,
) -> Result<(StatusCode, Json<E::View>), ApiError> {
    let entity = blocking(move || state.store.create::<E>(new)).await?;
    Ok((StatusCode::CREATED, Json(entity.present())))
}

pub async fn list_entities<E: Present>(
    State(state): State<AppState>,
    Query(page): Query<Page>,
    Query(filter): Query<E::Query>,
) -> Result<Json<Vec<E::View>>, ApiError> {
    let entities = blocking(move || state.store.query::<E>(&filter, page)).await?;
    Ok(Json(entities.into_iter().map(Present::present).collect()))
}

pub async fn get_entity<E: Present>(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<E::View>, ApiError> {
    let entity = blocking(move || state.store.get::<E>(id)).await?;
    Ok(Json(entity.present()))
}

pub async fn update_entity<E: Present>(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(patch): Json<E::Patch>,
) -> Result<Json<E::View>, ApiError> {
    let entity = blocking(move || state.store.update::<E>(id, patch)).await?;
    Ok(Json(entity.present()))
}

pub async fn delete_entity<E: Present>(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    blocking(move || state.store.delete::<E>(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Counts one view of a listing.
pub async fn record_view(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<PropertyView>, ApiError> {
    let property = blocking(move || state.store.record_view(id)).await?;
    Ok(Json(property.present()))
}

/// Makes an image the cover of its listing.
pub async fn set_cover_image(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<PropertyImage>, ApiError> {
    let image = blocking(move || state.store.set_cover_image(id)).await?;
    Ok(Json(image))
}

fn resource<E: Present>(path: &str) -> Router<AppState> {
    Router::new()
        .route(path, post(create_entity::<E>).get(list_entities::<E>))
        .route(
            &format!("{path}/:id"),
            get(get_entity::<E>)
                .patch(update_entity::<E>)
                .delete(delete_entity::<E>),
        )
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { "Estate store" }))
        .merge(resource::<User>("/users"))
        .merge(resource::<Property>("/properties"))
        .merge(resource::<PropertyImage>("/property-images"))
        .merge(resource::<Favorite>("/favorites"))
        .merge(resource::<Payment>("/payments"))
        .merge(resource::<ContactMessage>("/contact-messages"))
        .route("/properties/:id/views", post(record_view))
        .route("/property-images/:id/cover", put(set_cover_image))
        .with_state(state)
}
