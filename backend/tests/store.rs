use chrono::{Duration, Utc};
use rust_decimal::Decimal;

use estate_store::models::{
    ContactMessage, Entity, ContactMessagePatch, Favorite, FavoriteQuery, NewContactMessage, NewFavorite,
    NewPayment, NewProperty, NewPropertyImage, NewUser, Page, Payment, PaymentType, Property,
    PropertyImage, PropertyImageQuery, PropertyPatch, PropertyQuery, PropertySort, PropertyStatus,
    PropertyType, SortOrder, User, UserPatch, UserRole,
};
use estate_store::{Store, StoreError, ValidationError};

fn store() -> Store {
    Store::in_memory().expect("in-memory store")
}

fn new_user(email: &str) -> NewUser {
    NewUser {
        email: email.to_string(),
        first_name: "Rashad".to_string(),
        last_name: "Mammadov".to_string(),
        password_hash: "hashed".to_string(),
        phone_number: Some("+994501234567".to_string()),
        role: UserRole::User,
    }
}

fn new_property(user_id: i64, city: &str, price: i64) -> NewProperty {
    NewProperty {
        title: "Two-room flat".to_string(),
        description: "Renovated, close to the metro".to_string(),
        property_type: PropertyType::Apartment,
        status: PropertyStatus::ForSale,
        price: Decimal::new(price, 0),
        currency: "AZN".to_string(),
        area: Decimal::new(50, 0),
        bedrooms: 2,
        bathrooms: 1,
        living_rooms: 1,
        floor: Some(3),
        total_floors: Some(12),
        build_year: None,
        has_balcony: true,
        has_elevator: true,
        has_parking: false,
        is_furnished: true,
        country: "Azerbaijan".to_string(),
        city: city.to_string(),
        district: "Nasimi".to_string(),
        neighborhood: "28 May".to_string(),
        address: "Samad Vurgun 5".to_string(),
        postal_code: Some("AZ1000".to_string()),
        latitude: Some(Decimal::new(403_790_000, 7)),
        longitude: Some(Decimal::new(498_490_000, 7)),
        is_featured: false,
        is_published: true,
        video_url: None,
        virtual_tour_url: None,
        user_id,
    }
}

fn new_image(property_id: i64, display_order: i32, is_cover: bool) -> NewPropertyImage {
    NewPropertyImage {
        image_url: format!("https://cdn.example.com/{property_id}/{display_order}.jpg"),
        alt_text: Some("Living room".to_string()),
        display_order,
        is_cover,
        property_id,
    }
}

fn new_payment(user_id: i64, property_id: Option<i64>) -> NewPayment {
    NewPayment {
        amount: Decimal::new(150_000, 2),
        payment_type: PaymentType::RentDeposit,
        payment_method: "card".to_string(),
        currency: "TRY".to_string(),
        status: Default::default(),
        transaction_id: Some("tx-001".to_string()),
        user_id,
        property_id,
    }
}

fn new_message(user_id: Option<i64>, property_id: Option<i64>) -> NewContactMessage {
    NewContactMessage {
        name: "Nigar".to_string(),
        email: "nigar@example.com".to_string(),
        subject: "Viewing".to_string(),
        message: "Can I see the flat on Saturday?".to_string(),
        user_id,
        property_id,
    }
}

fn baku() -> PropertyQuery {
    PropertyQuery {
        city: Some("Baku".to_string()),
        ..PropertyQuery::default()
    }
}

#[test]
fn test_create_then_get_is_stamped() {
    let store = store();
    let before = Utc::now() - Duration::seconds(1);

    let created: User = store.create(new_user("rashad@example.com")).unwrap();
    assert!(created.id > 0);

    let user: User = store.get(created.id).unwrap();
    assert_eq!(user.email, "rashad@example.com");
    assert!(user.lifecycle.created_at >= before);
    assert!(user.lifecycle.updated_at.is_none());
    assert!(!user.lifecycle.is_deleted);
    assert!(user.lifecycle.deleted_at.is_none());
    assert_eq!(user.full_name(), "Rashad Mammadov");
}

#[test]
fn test_update_stamps_updated_at_and_keeps_created_at() {
    let store = store();
    let created: User = store.create(new_user("a@example.com")).unwrap();

    let updated: User = store
        .update(
            created.id,
            UserPatch {
                role: Some(UserRole::Agent),
                ..UserPatch::default()
            },
        )
        .unwrap();
    assert_eq!(updated.role, UserRole::Agent);
    assert_eq!(updated.lifecycle.created_at, created.lifecycle.created_at);
    assert!(updated.lifecycle.updated_at.is_some());

    let reloaded: User = store.get(created.id).unwrap();
    assert_eq!(reloaded.role, UserRole::Agent);
    assert_eq!(reloaded.lifecycle.created_at, created.lifecycle.created_at);
}

#[test]
fn test_delete_is_soft() {
    let store = store();
    let user: User = store.create(new_user("gone@example.com")).unwrap();

    store.delete::<User>(user.id).unwrap();

    assert!(matches!(
        store.get::<User>(user.id),
        Err(StoreError::NotFound { entity: "User", .. })
    ));
    let tombstone: User = store.get_including_deleted(user.id).unwrap().unwrap();
    assert!(tombstone.lifecycle.is_deleted);
    assert!(tombstone.lifecycle.deleted_at.is_some());
    assert!(tombstone.lifecycle.updated_at.is_none());
    assert_eq!(tombstone.email, "gone@example.com");

    assert!(matches!(
        store.delete::<User>(user.id),
        Err(StoreError::NotFound { .. })
    ));
}

#[test]
fn test_duplicate_email_is_rejected_until_deleted() {
    let store = store();
    let first: User = store.create(new_user("dup@example.com")).unwrap();

    let err = store.create::<User>(new_user("dup@example.com")).unwrap_err();
    assert!(matches!(err, StoreError::UniqueConstraintViolated { entity: "User", .. }));

    store.delete::<User>(first.id).unwrap();
    let second: User = store.create(new_user("dup@example.com")).unwrap();
    assert_ne!(second.id, first.id);
}

#[test]
fn test_duplicate_favorite_is_rejected_until_deleted() {
    let store = store();
    let owner: User = store.create(new_user("owner@example.com")).unwrap();
    let fan: User = store.create(new_user("fan@example.com")).unwrap();
    let property: Property = store.create(new_property(owner.id, "Baku", 100_000)).unwrap();
    let pair = || NewFavorite {
        user_id: fan.id,
        property_id: property.id,
    };

    let favorite: Favorite = store.create(pair()).unwrap();
    assert!(matches!(
        store.create::<Favorite>(pair()),
        Err(StoreError::UniqueConstraintViolated { entity: "Favorite", .. })
    ));

    store.delete::<Favorite>(favorite.id).unwrap();
    let again: Favorite = store.create(pair()).unwrap();
    assert_ne!(again.id, favorite.id);
}

#[test]
fn test_references_must_be_live() {
    let store = store();
    assert!(matches!(
        store.create::<Property>(new_property(42, "Baku", 1)),
        Err(StoreError::ForeignKeyMissing { entity: "Property", .. })
    ));

    let user: User = store.create(new_user("temp@example.com")).unwrap();
    store.delete::<User>(user.id).unwrap();
    assert!(matches!(
        store.create::<Payment>(new_payment(user.id, None)),
        Err(StoreError::ForeignKeyMissing { entity: "Payment", .. })
    ));
}

#[test]
fn test_validation_runs_before_insert() {
    let store = store();
    let mut invalid = new_user("x@example.com");
    invalid.email = "x".repeat(256);
    assert!(matches!(
        store.create::<User>(invalid),
        Err(StoreError::ValidationFailed(ValidationError::FieldTooLong {
            field: "email",
            max_length: 255
        }))
    ));

    let owner: User = store.create(new_user("o@example.com")).unwrap();
    let mut negative = new_property(owner.id, "Baku", 1);
    negative.price = Decimal::new(-5, 0);
    assert!(matches!(
        store.create::<Property>(negative),
        Err(StoreError::ValidationFailed(ValidationError::Negative { field: "price" }))
    ));
    assert!(store.query::<Property>(&baku(), Page::default()).unwrap().is_empty());
}

#[test]
fn test_decimals_survive_storage() {
    let store = store();
    let owner: User = store.create(new_user("dec@example.com")).unwrap();
    let mut listing = new_property(owner.id, "Baku", 0);
    listing.price = Decimal::new(12_345_678, 2);
    listing.area = Decimal::new(7_525, 2);

    let created: Property = store.create(listing).unwrap();
    let property: Property = store.get(created.id).unwrap();
    assert_eq!(property.price, Decimal::new(12_345_678, 2));
    assert_eq!(property.area, Decimal::new(7_525, 2));
    assert_eq!(property.latitude, Some(Decimal::new(403_790_000, 7)));
    assert_eq!(
        property.price_per_square_meter(),
        Decimal::new(12_345_678, 2) / Decimal::new(7_525, 2)
    );
}

#[test]
fn test_derived_values() {
    let store = store();
    let owner: User = store.create(new_user("d@example.com")).unwrap();
    let created: Property = store.create(new_property(owner.id, "Baku", 100_000)).unwrap();
    assert_eq!(created.price_per_square_meter(), Decimal::new(2000, 0));

    let patched: Property = store
        .update(
            created.id,
            PropertyPatch {
                area: Some(Decimal::ZERO),
                neighborhood: Some("X".to_string()),
                district: Some("Y".to_string()),
                city: Some("Z".to_string()),
                ..PropertyPatch::default()
            },
        )
        .unwrap();
    assert_eq!(patched.price_per_square_meter(), Decimal::ZERO);
    assert_eq!(patched.full_location(), "X,Y,Z");
}

#[test]
fn test_patch_can_clear_optional_columns() {
    let store = store();
    let owner: User = store.create(new_user("clear@example.com")).unwrap();
    let created: Property = store.create(new_property(owner.id, "Baku", 90_000)).unwrap();
    assert_eq!(created.floor, Some(3));

    let patch: PropertyPatch =
        serde_json::from_str(r#"{"floor": null, "latitude": null, "longitude": null, "build_year": 1998}"#)
            .unwrap();
    store.update::<Property>(created.id, patch).unwrap();

    let property: Property = store.get(created.id).unwrap();
    assert_eq!(property.floor, None);
    assert_eq!(property.latitude, None);
    assert_eq!(property.longitude, None);
    assert_eq!(property.build_year, Some(1998));
    assert_eq!(property.total_floors, Some(12));
    assert_eq!(property.postal_code.as_deref(), Some("AZ1000"));

    let user: User = store
        .update(
            owner.id,
            UserPatch {
                phone_number: Some(None),
                ..UserPatch::default()
            },
        )
        .unwrap();
    assert_eq!(user.phone_number, None);
    assert_eq!(store.get::<User>(owner.id).unwrap().phone_number, None);
}

#[test]
fn test_user_with_live_property_cannot_be_deleted() {
    let store = store();
    let owner: User = store.create(new_user("landlord@example.com")).unwrap();
    let other: User = store.create(new_user("other@example.com")).unwrap();
    let property: Property = store.create(new_property(owner.id, "Baku", 90_000)).unwrap();
    let listing: Property = store.create(new_property(other.id, "Baku", 80_000)).unwrap();
    let favorite: Favorite = store
        .create(NewFavorite {
            user_id: owner.id,
            property_id: listing.id,
        })
        .unwrap();

    let err = store.delete::<User>(owner.id).unwrap_err();
    assert!(matches!(
        err,
        StoreError::ReferentialRestrictionViolated {
            entity: "User",
            dependent: "Property",
            count: 1,
            ..
        }
    ));

    // The rejected batch left nothing behind.
    assert!(store.get::<User>(owner.id).is_ok());
    assert!(store.get::<Favorite>(favorite.id).is_ok());

    store.delete::<Property>(property.id).unwrap();
    store.delete::<User>(owner.id).unwrap();
}

#[test]
fn test_user_with_live_payment_cannot_be_deleted() {
    let store = store();
    let payer: User = store.create(new_user("payer@example.com")).unwrap();
    let payment: Payment = store.create(new_payment(payer.id, None)).unwrap();
    assert_eq!(payment.currency, "TRY");

    assert!(matches!(
        store.delete::<User>(payer.id),
        Err(StoreError::ReferentialRestrictionViolated {
            dependent: "Payment",
            ..
        })
    ));
}

#[test]
fn test_deleting_user_cascades_favorites_and_detaches_messages() {
    let store = store();
    let owner: User = store.create(new_user("seller@example.com")).unwrap();
    let buyer: User = store.create(new_user("buyer@example.com")).unwrap();
    let property: Property = store.create(new_property(owner.id, "Baku", 70_000)).unwrap();
    let favorite: Favorite = store
        .create(NewFavorite {
            user_id: buyer.id,
            property_id: property.id,
        })
        .unwrap();
    let message: ContactMessage = store
        .create(new_message(Some(buyer.id), Some(property.id)))
        .unwrap();

    store.delete::<User>(buyer.id).unwrap();

    assert!(matches!(
        store.get::<Favorite>(favorite.id),
        Err(StoreError::NotFound { .. })
    ));
    let tombstone: Favorite = store.get_including_deleted(favorite.id).unwrap().unwrap();
    assert!(tombstone.lifecycle.is_deleted);

    let message: ContactMessage = store.get(message.id).unwrap();
    assert_eq!(message.user_id, None);
    assert_eq!(message.property_id, Some(property.id));
    assert!(message.lifecycle.updated_at.is_some());

    let user: User = store.get_including_deleted(buyer.id).unwrap().unwrap();
    assert_eq!(user.lifecycle.deleted_at, tombstone.lifecycle.deleted_at);
}

#[test]
fn test_deleted_messages_also_lose_their_sender() {
    let store = store();
    let sender: User = store.create(new_user("sender@example.com")).unwrap();
    let message: ContactMessage = store.create(new_message(Some(sender.id), None)).unwrap();
    store.delete::<ContactMessage>(message.id).unwrap();

    store.delete::<User>(sender.id).unwrap();

    let tombstone: ContactMessage = store.get_including_deleted(message.id).unwrap().unwrap();
    assert!(tombstone.lifecycle.is_deleted);
    assert_eq!(tombstone.user_id, None);
}

#[test]
fn test_deleted_payments_also_lose_their_listing() {
    let store = store();
    let owner: User = store.create(new_user("listing@example.com")).unwrap();
    let property: Property = store.create(new_property(owner.id, "Baku", 60_000)).unwrap();
    let payment: Payment = store.create(new_payment(owner.id, Some(property.id))).unwrap();
    let message: ContactMessage = store.create(new_message(None, Some(property.id))).unwrap();
    store.delete::<Payment>(payment.id).unwrap();
    store.delete::<ContactMessage>(message.id).unwrap();

    store.delete::<Property>(property.id).unwrap();

    let payment: Payment = store.get_including_deleted(payment.id).unwrap().unwrap();
    assert!(payment.lifecycle.is_deleted);
    assert_eq!(payment.property_id, None);
    let message: ContactMessage = store.get_including_deleted(message.id).unwrap().unwrap();
    assert_eq!(message.property_id, None);
}

#[test]
fn test_failed_commit_leaves_no_partial_writes() {
    let store = store();
    let existing: User = store.create(new_user("taken@example.com")).unwrap();
    let renamed = User {
        first_name: "Changed".to_string(),
        ..existing.clone()
    };

    let err = store
        .commit(|_, changes| {
            changes.modify(renamed);
            changes.add(User::from_new(new_user("taken@example.com")));
            Ok(())
        })
        .unwrap_err();
    assert!(matches!(err, StoreError::UniqueConstraintViolated { entity: "User", .. }));

    let reloaded: User = store.get(existing.id).unwrap();
    assert_eq!(reloaded.first_name, "Rashad");
    assert_eq!(reloaded.lifecycle.updated_at, None);
    assert_eq!(reloaded, existing);
    let everyone = store.query::<User>(&Default::default(), Page::default()).unwrap();
    assert_eq!(everyone.len(), 1);
}

#[test]
fn test_deleting_property_cascades_and_nulls() {
    let store = store();
    let owner: User = store.create(new_user("p-owner@example.com")).unwrap();
    let buyer: User = store.create(new_user("p-buyer@example.com")).unwrap();
    let property: Property = store.create(new_property(owner.id, "Baku", 120_000)).unwrap();
    let image: PropertyImage = store.create(new_image(property.id, 0, true)).unwrap();
    let favorite: Favorite = store
        .create(NewFavorite {
            user_id: buyer.id,
            property_id: property.id,
        })
        .unwrap();
    let payment: Payment = store.create(new_payment(buyer.id, Some(property.id))).unwrap();
    let message: ContactMessage = store
        .create(new_message(None, Some(property.id)))
        .unwrap();

    store.delete::<Property>(property.id).unwrap();

    assert!(store.get::<PropertyImage>(image.id).is_err());
    assert!(store.get::<Favorite>(favorite.id).is_err());
    let image: PropertyImage = store.get_including_deleted(image.id).unwrap().unwrap();
    assert!(image.lifecycle.is_deleted);

    let payment: Payment = store.get(payment.id).unwrap();
    assert_eq!(payment.property_id, None);
    assert_eq!(payment.amount, Decimal::new(150_000, 2));
    let message: ContactMessage = store.get(message.id).unwrap();
    assert_eq!(message.property_id, None);

    // Payments still hold the buyer in place.
    assert!(store.delete::<User>(buyer.id).is_err());
}

#[test]
fn test_query_never_returns_deleted_rows() {
    let store = store();
    let owner: User = store.create(new_user("q@example.com")).unwrap();
    let kept: Property = store.create(new_property(owner.id, "Baku", 100_000)).unwrap();
    let removed: Property = store.create(new_property(owner.id, "Baku", 200_000)).unwrap();
    store.create::<Property>(new_property(owner.id, "Ganja", 50_000)).unwrap();

    store.delete::<Property>(removed.id).unwrap();

    let found = store.query::<Property>(&baku(), Page::default()).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, kept.id);
    assert!(found.iter().all(|p| p.lifecycle.is_live()));
}

#[test]
fn test_property_filters_sort_and_page() {
    let store = store();
    let owner: User = store.create(new_user("sort@example.com")).unwrap();
    for price in [300_000, 100_000, 200_000, 400_000] {
        store.create::<Property>(new_property(owner.id, "Baku", price)).unwrap();
    }

    let query = PropertyQuery {
        min_price: Some(Decimal::new(150_000, 0)),
        max_price: Some(Decimal::new(350_000, 0)),
        sort: PropertySort::Price,
        order: SortOrder::Desc,
        ..baku()
    };
    let prices: Vec<Decimal> = store
        .query::<Property>(&query, Page::default())
        .unwrap()
        .into_iter()
        .map(|p| p.price)
        .collect();
    assert_eq!(prices, vec![Decimal::new(300_000, 0), Decimal::new(200_000, 0)]);

    let query = PropertyQuery {
        sort: PropertySort::Price,
        ..baku()
    };
    let page = store.query::<Property>(&query, Page::new(1, 2)).unwrap();
    let prices: Vec<Decimal> = page.into_iter().map(|p| p.price).collect();
    assert_eq!(prices, vec![Decimal::new(200_000, 0), Decimal::new(300_000, 0)]);

    assert!(store.query::<Property>(&query, Page::new(0, 0)).unwrap().is_empty());
}

#[test]
fn test_set_cover_image_leaves_one_cover() {
    let store = store();
    let owner: User = store.create(new_user("cover@example.com")).unwrap();
    let property: Property = store.create(new_property(owner.id, "Baku", 1)).unwrap();
    let first: PropertyImage = store.create(new_image(property.id, 0, true)).unwrap();
    let second: PropertyImage = store.create(new_image(property.id, 1, false)).unwrap();
    store.create::<PropertyImage>(new_image(property.id, 2, false)).unwrap();

    let cover = store.set_cover_image(second.id).unwrap();
    assert!(cover.is_cover);

    let covers = store
        .query::<PropertyImage>(
            &PropertyImageQuery {
                property_id: Some(property.id),
                is_cover: Some(true),
            },
            Page::default(),
        )
        .unwrap();
    assert_eq!(covers.len(), 1);
    assert_eq!(covers[0].id, second.id);

    let first: PropertyImage = store.get(first.id).unwrap();
    assert!(!first.is_cover);
    assert!(first.lifecycle.updated_at.is_some());
}

#[test]
fn test_record_view_stamps_updated_at() {
    let store = store();
    let owner: User = store.create(new_user("views@example.com")).unwrap();
    let property: Property = store.create(new_property(owner.id, "Baku", 1)).unwrap();
    assert_eq!(property.view_count, 0);

    store.record_view(property.id).unwrap();
    let viewed = store.record_view(property.id).unwrap();
    assert_eq!(viewed.view_count, 2);
    assert!(viewed.lifecycle.updated_at.is_some());
    assert_eq!(viewed.lifecycle.created_at, property.lifecycle.created_at);

    store.delete::<Property>(property.id).unwrap();
    assert!(matches!(
        store.record_view(property.id),
        Err(StoreError::NotFound { entity: "Property", .. })
    ));
}

#[test]
fn test_reply_marks_message_read() {
    let store = store();
    let message: ContactMessage = store.create(new_message(None, None)).unwrap();
    assert!(!message.is_read);

    let replied: ContactMessage = store
        .update(
            message.id,
            ContactMessagePatch {
                is_replied: Some(true),
                ..ContactMessagePatch::default()
            },
        )
        .unwrap();
    assert!(replied.is_read);
    assert!(replied.is_replied);
}

#[test]
fn test_favorites_are_filtered_by_user() {
    let store = store();
    let owner: User = store.create(new_user("fo@example.com")).unwrap();
    let fan: User = store.create(new_user("ff@example.com")).unwrap();
    let first: Property = store.create(new_property(owner.id, "Baku", 1)).unwrap();
    let second: Property = store.create(new_property(owner.id, "Baku", 2)).unwrap();
    for property_id in [first.id, second.id] {
        store
            .create::<Favorite>(NewFavorite {
                user_id: fan.id,
                property_id,
            })
            .unwrap();
    }
    store
        .create::<Favorite>(NewFavorite {
            user_id: owner.id,
            property_id: first.id,
        })
        .unwrap();

    let query = FavoriteQuery {
        user_id: Some(fan.id),
        property_id: None,
    };
    let favorites = store.query::<Favorite>(&query, Page::default()).unwrap();
    assert_eq!(favorites.len(), 2);
    assert!(favorites.iter().all(|f| f.user_id == fan.id));
}

#[test]
fn test_file_database_persists_between_opens() {
    let path = std::env::temp_dir().join(format!("estate-store-{}.db", std::process::id()));
    let url = path.to_string_lossy().to_string();
    let _ = std::fs::remove_file(&path);

    let id = {
        let store = Store::open(&url, 2).unwrap();
        store.create::<User>(new_user("disk@example.com")).unwrap().id
    };
    let store = Store::open(&url, 2).unwrap();
    let user: User = store.get(id).unwrap();
    assert_eq!(user.email, "disk@example.com");

    drop(store);
    let _ = std::fs::remove_file(&path);
}
