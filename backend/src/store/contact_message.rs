use chrono::NaiveDateTime;
use diesel::prelude::*;
use diesel::sqlite::{Sqlite, SqliteConnection};

use super::{require_live, Record, Scope, Stamps, Table};
use crate::error::{StoreError, StoreResult};
use crate::models::{ContactMessage, ContactMessageQuery, Entity, Page, Property, User};
use crate::schema::contact_messages;

#[derive(Queryable, Selectable)]
#[diesel(table_name = contact_messages)]
#[diesel(check_for_backend(Sqlite))]
struct ContactMessageRow {
    id: i64,
    name: String,
    email: String,
    subject: String,
    message: String,
    is_read: bool,
    is_replied: bool,
    user_id: Option<i64>,
    property_id: Option<i64>,
    created_at: NaiveDateTime,
    updated_at: Option<NaiveDateTime>,
    is_deleted: bool,
    deleted_at: Option<NaiveDateTime>,
}

#[derive(Insertable, AsChangeset)]
#[diesel(table_name = contact_messages)]
#[diesel(treat_none_as_null = true)]
struct ContactMessageColumns<'a> {
    name: &'a str,
    email: &'a str,
    subject: &'a str,
    message: &'a str,
    is_read: bool,
    is_replied: bool,
    user_id: Option<i64>,
    property_id: Option<i64>,
    created_at: NaiveDateTime,
    updated_at: Option<NaiveDateTime>,
    is_deleted: bool,
    deleted_at: Option<NaiveDateTime>,
}

impl From<ContactMessageRow> for ContactMessage {
    fn from(row: ContactMessageRow) -> Self {
        ContactMessage {
            id: row.id,
            name: row.name,
            email: row.email,
            subject: row.subject,
            message: row.message,
            is_read: row.is_read,
            is_replied: row.is_replied,
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

fn columns(message: &ContactMessage) -> ContactMessageColumns<'_> {
    let stamps = Stamps::of(&message.lifecycle);
    ContactMessageColumns {
        name: &message.name,
        email: &message.email,
        subject: &message.subject,
        message: &message.message,
        is_read: message.is_read,
        is_replied: message.is_replied,
        user_id: message.user_id,
        property_id: message.property_id,
        created_at: stamps.created_at,
        updated_at: stamps.updated_at,
        is_deleted: stamps.is_deleted,
        deleted_at: stamps.deleted_at,
    }
}

pub(super) fn for_user(
    conn: &mut SqliteConnection,
    user_id: i64,
    scope: Scope,
) -> StoreResult<Vec<ContactMessage>> {
    Ok(scoped!(contact_messages, scope)
        .filter(contact_messages::user_id.eq(user_id))
        .load::<ContactMessageRow>(conn)?
        .into_iter()
        .map(ContactMessage::from)
        .collect())
}

pub(super) fn for_property(
    conn: &mut SqliteConnection,
    property_id: i64,
    scope: Scope,
) -> StoreResult<Vec<ContactMessage>> {
    Ok(scoped!(contact_messages, scope)
        .filter(contact_messages::property_id.eq(property_id))
        .load::<ContactMessageRow>(conn)?
        .into_iter()
        .map(ContactMessage::from)
        .collect())
}

impl Table for ContactMessage {
    fn find(conn: &mut SqliteConnection, id: i64, scope: Scope) -> StoreResult<Option<Self>> {
        Ok(scoped!(contact_messages, scope)
            .filter(contact_messages::id.eq(id))
            .first::<ContactMessageRow>(conn)
            .optional()?
            .map(ContactMessage::from))
    }

    fn search(
        conn: &mut SqliteConnection,
        filter: &ContactMessageQuery,
        page: Page,
    ) -> StoreResult<Vec<Self>> {
        let mut query = scoped!(contact_messages, Scope::Live);
        if let Some(user_id) = filter.user_id {
            query = query.filter(contact_messages::user_id.eq(user_id));
        }
        if let Some(property_id) = filter.property_id {
            query = query.filter(contact_messages::property_id.eq(property_id));
        }
        if let Some(is_read) = filter.is_read {
            query = query.filter(contact_messages::is_read.eq(is_read));
        }
        if let Some(is_replied) = filter.is_replied {
            query = query.filter(contact_messages::is_replied.eq(is_replied));
        }
        let (offset, limit) = page.bounds();
        Ok(query
            .order(contact_messages::id.desc())
            .offset(offset)
            .limit(limit)
            .load::<ContactMessageRow>(conn)?
            .into_iter()
            .map(ContactMessage::from)
            .collect())
    }

    fn insert(&self, conn: &mut SqliteConnection) -> StoreResult<Self> {
        diesel::insert_into(contact_messages::table)
            .values(&columns(self))
            .get_result::<ContactMessageRow>(conn)
            .map(ContactMessage::from)
            .map_err(|e| StoreError::from_write(Self::NAME, e))
    }

    fn update(&self, conn: &mut SqliteConnection) -> StoreResult<()> {
        let changed = diesel::update(contact_messages::table.find(self.id))
            .set(&columns(self))
            .execute(conn)
            .map_err(|e| StoreError::from_write(Self::NAME, e))?;
        if changed == 0 {
            return Err(StoreError::not_found(Self::NAME, self.id));
        }
        Ok(())
    }

    fn check_references(&self, conn: &mut SqliteConnection) -> StoreResult<()> {
        if let Some(user_id) = self.user_id {
            require_live::<User>(conn, Self::NAME, user_id)?;
        }
        if let Some(property_id) = self.property_id {
            require_live::<Property>(conn, Self::NAME, property_id)?;
        }
        Ok(())
    }

    fn into_record(self) -> Record {
        Record::ContactMessage(self)
    }

    fn from_record(record: Record) -> Option<Self> {
        match record {
            Record::ContactMessage(message) => Some(message),
            _ => None,
        }
    }
}
