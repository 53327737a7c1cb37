use chrono::NaiveDateTime;
use diesel::prelude::*;
use diesel::sqlite::{Sqlite, SqliteConnection};

use super::{cascade_delete, contact_message, favorite, payment, property, restrict};
use super::{unknown_code, ChangeSet, Record, Scope, Stamps, Table};
use crate::error::{StoreError, StoreResult};
use crate::models::{Entity, Page, Payment, Property, SortOrder, User, UserQuery, UserRole};
use crate::schema::users;

#[derive(Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(Sqlite))]
struct UserRow {
    id: i64,
    email: String,
    first_name: String,
    last_name: String,
    password_hash: String,
    phone_number: Option<String>,
    role: i32,
    created_at: NaiveDateTime,
    updated_at: Option<NaiveDateTime>,
    is_deleted: bool,
    deleted_at: Option<NaiveDateTime>,
}

#[derive(Insertable, AsChangeset)]
#[diesel(table_name = users)]
#[diesel(treat_none_as_null = true)]
struct UserColumns<'a> {
    email: &'a str,
    first_name: &'a str,
    last_name: &'a str,
    password_hash: &'a str,
    phone_number: Option<&'a str>,
    role: i32,
    created_at: NaiveDateTime,
    updated_at: Option<NaiveDateTime>,
    is_deleted: bool,
    deleted_at: Option<NaiveDateTime>,
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(row: UserRow) -> StoreResult<Self> {
        let role = UserRole::from_code(row.role)
            .ok_or_else(|| unknown_code(User::NAME, "role", row.role))?;
        let lifecycle = Stamps {
            created_at: row.created_at,
            updated_at: row.updated_at,
            is_deleted: row.is_deleted,
            deleted_at: row.deleted_at,
        }
        .into_lifecycle();
        Ok(User {
            id: row.id,
            email: row.email,
            first_name: row.first_name,
            last_name: row.last_name,
            password_hash: row.password_hash,
            phone_number: row.phone_number,
            role,
            lifecycle,
        })
    }
}

fn columns(user: &User) -> UserColumns<'_> {
    let stamps = Stamps::of(&user.lifecycle);
    UserColumns {
        email: &user.email,
        first_name: &user.first_name,
        last_name: &user.last_name,
        password_hash: &user.password_hash,
        phone_number: user.phone_number.as_deref(),
        role: user.role.code(),
        created_at: stamps.created_at,
        updated_at: stamps.updated_at,
        is_deleted: stamps.is_deleted,
        deleted_at: stamps.deleted_at,
    }
}

impl Table for User {
    fn find(conn: &mut SqliteConnection, id: i64, scope: Scope) -> StoreResult<Option<Self>> {
        scoped!(users, scope)
            .filter(users::id.eq(id))
            .first::<UserRow>(conn)
            .optional()?
            .map(User::try_from)
            .transpose()
    }

    fn search(conn: &mut SqliteConnection, filter: &UserQuery, page: Page) -> StoreResult<Vec<Self>> {
        let mut query = scoped!(users, Scope::Live);
        if let Some(email) = &filter.email {
            query = query.filter(users::email.eq(email.as_str()));
        }
        if let Some(role) = filter.role {
            query = query.filter(users::role.eq(role.code()));
        }
        query = match filter.order {
            SortOrder::Asc => query.order((users::created_at.asc(), users::id.asc())),
            SortOrder::Desc => query.order((users::created_at.desc(), users::id.desc())),
        };
        let (offset, limit) = page.bounds();
        query
            .offset(offset)
            .limit(limit)
            .load::<UserRow>(conn)?
            .into_iter()
            .map(User::try_from)
            .collect()
    }

    fn insert(&self, conn: &mut SqliteConnection) -> StoreResult<Self> {
        diesel::insert_into(users::table)
            .values(&columns(self))
            .get_result::<UserRow>(conn)
            .map_err(|e| StoreError::from_write(Self::NAME, e))?
            .try_into()
    }

    fn update(&self, conn: &mut SqliteConnection) -> StoreResult<()> {
        let changed = diesel::update(users::table.find(self.id))
            .set(&columns(self))
            .execute(conn)
            .map_err(|e| StoreError::from_write(Self::NAME, e))?;
        if changed == 0 {
            return Err(StoreError::not_found(Self::NAME, self.id));
        }
        Ok(())
    }

    // Listings and payments hold the user in place; favorites go with the
    // user. Contact messages, deleted ones included, lose their sender.
    fn plan_delete(&self, conn: &mut SqliteConnection, changes: &mut ChangeSet) -> StoreResult<()> {
        restrict::<Property>(Self::NAME, self.id, property::count_live_for_user(conn, self.id)?)?;
        restrict::<Payment>(Self::NAME, self.id, payment::count_live_for_user(conn, self.id)?)?;

        let favorites = favorite::live_for_user(conn, self.id)?;
        cascade_delete(conn, changes, favorites)?;

        for mut message in contact_message::for_user(conn, self.id, Scope::IncludeDeleted)? {
            message.user_id = None;
            changes.modify(message);
        }
        Ok(())
    }

    fn into_record(self) -> Record {
        Record::User(self)
    }

    fn from_record(record: Record) -> Option<Self> {
        match record {
            Record::User(user) => Some(user),
            _ => None,
        }
    }
}
