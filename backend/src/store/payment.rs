use chrono::NaiveDateTime;
use diesel::dsl::count_star;
use diesel::prelude::*;
use diesel::sqlite::{Sqlite, SqliteConnection};

use super::{from_scaled, require_live, to_scaled, unknown_code, Record, Scope, Stamps, Table};
use crate::error::{StoreError, StoreResult};
use crate::models::{
    Entity, Page, Payment, PaymentQuery, PaymentStatus, PaymentType, Property, User, MONEY_SCALE,
};
use crate::schema::payments;

#[derive(Queryable, Selectable)]
#[diesel(table_name = payments)]
#[diesel(check_for_backend(Sqlite))]
struct PaymentRow {
    id: i64,
    amount: i64,
    payment_type: i32,
    payment_method: String,
    currency: String,
    status: i32,
    transaction_id: Option<String>,
    user_id: i64,
    property_id: Option<i64>,
    created_at: NaiveDateTime,
    updated_at: Option<NaiveDateTime>,
    is_deleted: bool,
    deleted_at: Option<NaiveDateTime>,
}

#[derive(Insertable, AsChangeset)]
#[diesel(table_name = payments)]
#[diesel(treat_none_as_null = true)]
struct PaymentColumns<'a> {
    amount: i64,
    payment_type: i32,
    payment_method: &'a str,
    currency: &'a str,
    status: i32,
    transaction_id: Option<&'a str>,
    user_id: i64,
    property_id: Option<i64>,
    created_at: NaiveDateTime,
    updated_at: Option<NaiveDateTime>,
    is_deleted: bool,
    deleted_at: Option<NaiveDateTime>,
}

impl TryFrom<PaymentRow> for Payment {
    type Error = StoreError;

    fn try_from(row: PaymentRow) -> StoreResult<Self> {
        let payment_type = PaymentType::from_code(row.payment_type)
            .ok_or_else(|| unknown_code(Payment::NAME, "payment_type", row.payment_type))?;
        let status = PaymentStatus::from_code(row.status)
            .ok_or_else(|| unknown_code(Payment::NAME, "status", row.status))?;
        Ok(Payment {
            id: row.id,
            amount: from_scaled(row.amount, MONEY_SCALE),
            payment_type,
            payment_method: row.payment_method,
            currency: row.currency,
            status,
            transaction_id: row.transaction_id,
            user_id: row.user_id,
            property_id: row.property_id,
            lifecycle: Stamps {
                created_at: row.created_at,
                updated_at: row.updated_at,
                is_deleted: row.is_deleted,
                deleted_at: row.deleted_at,
            }
            .into_lifecycle(),
        })
    }
}

fn columns(payment: &Payment) -> PaymentColumns<'_> {
    let stamps = Stamps::of(&payment.lifecycle);
    PaymentColumns {
        amount: to_scaled(payment.amount, MONEY_SCALE),
        payment_type: payment.payment_type.code(),
        payment_method: &payment.payment_method,
        currency: &payment.currency,
        status: payment.status.code(),
        transaction_id: payment.transaction_id.as_deref(),
        user_id: payment.user_id,
        property_id: payment.property_id,
        created_at: stamps.created_at,
        updated_at: stamps.updated_at,
        is_deleted: stamps.is_deleted,
        deleted_at: stamps.deleted_at,
    }
}

pub(super) fn count_live_for_user(conn: &mut SqliteConnection, user_id: i64) -> StoreResult<i64> {
    Ok(payments::table
        .filter(payments::user_id.eq(user_id))
        .filter(payments::is_deleted.eq(false))
        .select(count_star())
        .first(conn)?)
}

pub(super) fn for_property(
    conn: &mut SqliteConnection,
    property_id: i64,
    scope: Scope,
) -> StoreResult<Vec<Payment>> {
    scoped!(payments, scope)
        .filter(payments::property_id.eq(property_id))
        .load::<PaymentRow>(conn)?
        .into_iter()
        .map(Payment::try_from)
        .collect()
}

impl Table for Payment {
    fn find(conn: &mut SqliteConnection, id: i64, scope: Scope) -> StoreResult<Option<Self>> {
        scoped!(payments, scope)
            .filter(payments::id.eq(id))
            .first::<PaymentRow>(conn)
            .optional()?
            .map(Payment::try_from)
            .transpose()
    }

    fn search(conn: &mut SqliteConnection, filter: &PaymentQuery, page: Page) -> StoreResult<Vec<Self>> {
        let mut query = scoped!(payments, Scope::Live);
        if let Some(user_id) = filter.user_id {
            query = query.filter(payments::user_id.eq(user_id));
        }
        if let Some(property_id) = filter.property_id {
            query = query.filter(payments::property_id.eq(property_id));
        }
        if let Some(status) = filter.status {
            query = query.filter(payments::status.eq(status.code()));
        }
        if let Some(transaction_id) = &filter.transaction_id {
            query = query.filter(payments::transaction_id.eq(transaction_id.as_str()));
        }
        let (offset, limit) = page.bounds();
        query
            .order(payments::id.desc())
            .offset(offset)
            .limit(limit)
            .load::<PaymentRow>(conn)?
            .into_iter()
            .map(Payment::try_from)
            .collect()
    }

    fn insert(&self, conn: &mut SqliteConnection) -> StoreResult<Self> {
        diesel::insert_into(payments::table)
            .values(&columns(self))
            .get_result::<PaymentRow>(conn)
            .map_err(|e| StoreError::from_write(Self::NAME, e))?
            .try_into()
    }

    fn update(&self, conn: &mut SqliteConnection) -> StoreResult<()> {
        let changed = diesel::update(payments::table.find(self.id))
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
        if let Some(property_id) = self.property_id {
            require_live::<Property>(conn, Self::NAME, property_id)?;
        }
        Ok(())
    }

    fn into_record(self) -> Record {
        Record::Payment(self)
    }

    fn from_record(record: Record) -> Option<Self> {
        match record {
            Record::Payment(payment) => Some(payment),
            _ => None,
        }
    }
}
