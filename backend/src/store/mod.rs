//! Typed repository over the listing tables.
//!
//! Every write goes through [`Store::commit`]: the caller's plan fills a
//! [`ChangeSet`], the pre-commit hook stamps it into [`Write`]s, and the
//! writes are applied inside one `BEGIN IMMEDIATE` transaction. Every read
//! starts from [`scoped!`], which adds the live-row predicate unless the
//! caller asks for [`Scope::IncludeDeleted`].

use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::r2d2::{ConnectionManager, PooledConnection};
use diesel::sqlite::SqliteConnection;
use log::{debug, info, warn};
use rust_decimal::Decimal;

use crate::db::{self, DbPool};
use crate::error::{StoreError, StoreResult};
use crate::models::{Entity, Lifecycle, Page, Property, PropertyImage};

/// Starts a boxed select over `$table` restricted to the given [`Scope`].
macro_rules! scoped {
    ($table:ident, $scope:expr) => {{
        let query: crate::schema::$table::BoxedQuery<'_, diesel::sqlite::Sqlite> =
            crate::schema::$table::table.into_boxed();
        match $scope {
            crate::store::Scope::Live => query.filter(crate::schema::$table::is_deleted.eq(false)),
            crate::store::Scope::IncludeDeleted => query,
        }
    }};
}

mod changeset;
mod contact_message;
mod favorite;
mod payment;
mod property;
mod property_image;
mod user;

pub use changeset::{ChangeSet, Entry, EntryState, Record, Write};

/// Which rows a read may see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Rows with `is_deleted = false`. Every public read uses this.
    Live,
    /// Tombstoned rows too; audit and test reads only.
    IncludeDeleted,
}

/// Storage operations for one entity table.
pub trait Table: Entity {
    fn find(conn: &mut SqliteConnection, id: i64, scope: Scope) -> StoreResult<Option<Self>>;

    fn search(conn: &mut SqliteConnection, query: &Self::Query, page: Page) -> StoreResult<Vec<Self>>;

    /// Inserts the row and returns it with its generated id.
    fn insert(&self, conn: &mut SqliteConnection) -> StoreResult<Self>;

    /// Rewrites every column of the row in place.
    fn update(&self, conn: &mut SqliteConnection) -> StoreResult<()>;

    /// Referenced parents must exist and be live.
    fn check_references(&self, _conn: &mut SqliteConnection) -> StoreResult<()> {
        Ok(())
    }

    /// Applies the ON DELETE policy for dependents of this row, adding
    /// cascaded deletes and set-null updates to `changes`.
    fn plan_delete(&self, _conn: &mut SqliteConnection, _changes: &mut ChangeSet) -> StoreResult<()> {
        Ok(())
    }

    fn into_record(self) -> Record;

    fn from_record(record: Record) -> Option<Self>;
}

#[derive(Clone)]
pub struct Store {
    pool: DbPool,
}

impl Store {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Opens (or creates) the database and applies pending migrations.
    pub fn open(database_url: &str, pool_size: u32) -> StoreResult<Self> {
        let pool = db::establish_pool(database_url, pool_size)?;
        let mut conn = pool.get()?;
        db::run_migrations(&mut conn)?;
        Ok(Self::new(pool))
    }

    /// A private, migrated in-memory database.
    pub fn in_memory() -> StoreResult<Self> {
        Self::open(db::IN_MEMORY, 1)
    }

    fn connection(&self) -> StoreResult<PooledConnection<ConnectionManager<SqliteConnection>>> {
        Ok(self.pool.get()?)
    }

    pub fn create<E: Table>(&self, new: E::New) -> StoreResult<E> {
        let entity = E::from_new(new);
        entity.validate()?;
        let written = self.commit(|conn, changes| {
            entity.check_references(conn)?;
            changes.add(entity);
            Ok(())
        })?;
        let created = written
            .into_iter()
            .find_map(E::from_record)
            .ok_or_else(|| StoreError::not_found(E::NAME, 0))?;
        info!("Created {} {}", E::NAME, created.id());
        Ok(created)
    }

    pub fn get<E: Table>(&self, id: i64) -> StoreResult<E> {
        let mut conn = self.connection()?;
        E::find(&mut conn, id, Scope::Live)?.ok_or_else(|| StoreError::not_found(E::NAME, id))
    }

    /// Reads a row whether or not it has been soft-deleted.
    pub fn get_including_deleted<E: Table>(&self, id: i64) -> StoreResult<Option<E>> {
        let mut conn = self.connection()?;
        E::find(&mut conn, id, Scope::IncludeDeleted)
    }

    pub fn query<E: Table>(&self, query: &E::Query, page: Page) -> StoreResult<Vec<E>> {
        let mut conn = self.connection()?;
        E::search(&mut conn, query, page)
    }

    pub fn update<E: Table>(&self, id: i64, patch: E::Patch) -> StoreResult<E> {
        let written = self.commit(|conn, changes| {
            let mut entity = live::<E>(conn, id)?;
            entity.apply_patch(patch);
            entity.validate()?;
            changes.modify(entity);
            Ok(())
        })?;
        written_with_id(written, id)
    }

    /// Soft-deletes the row and applies the referential policy to its dependents.
    pub fn delete<E: Table>(&self, id: i64) -> StoreResult<()> {
        let written = self.commit(|conn, changes| {
            let entity = live::<E>(conn, id)?;
            entity.plan_delete(conn, changes)?;
            changes.delete(entity);
            Ok(())
        })?;
        info!(
            "Soft-deleted {} {} ({} row(s) written)",
            E::NAME,
            id,
            written.len()
        );
        Ok(())
    }

    pub fn record_view(&self, property_id: i64) -> StoreResult<Property> {
        let written = self.commit(|conn, changes| {
            let mut property = live::<Property>(conn, property_id)?;
            property.view_count = property.view_count.saturating_add(1);
            changes.modify(property);
            Ok(())
        })?;
        written_with_id(written, property_id)
    }

    /// Makes `image_id` the only cover among its property's live images.
    pub fn set_cover_image(&self, image_id: i64) -> StoreResult<PropertyImage> {
        self.commit(|conn, changes| {
            let image = live::<PropertyImage>(conn, image_id)?;
            for mut sibling in property_image::live_for_property(conn, image.property_id)? {
                let is_cover = sibling.id == image_id;
                if sibling.is_cover != is_cover {
                    sibling.is_cover = is_cover;
                    changes.modify(sibling);
                }
            }
            Ok(())
        })?;
        self.get(image_id)
    }

    /// Runs `plan` and the commit hook in a single immediate transaction.
    ///
    /// Returns the rows as written, in the order they were planned.
    pub fn commit<F>(&self, plan: F) -> StoreResult<Vec<Record>>
    where
        F: FnOnce(&mut SqliteConnection, &mut ChangeSet) -> StoreResult<()>,
    {
        let mut conn = self.connection()?;
        conn.immediate_transaction(|conn| {
            let mut changes = ChangeSet::new();
            plan(conn, &mut changes)?;
            let writes = changes.prepare(Utc::now());
            debug!("Committing {} write(s)", writes.len());
            writes.into_iter().map(|write| write.apply(conn)).collect()
        })
    }
}

fn live<E: Table>(conn: &mut SqliteConnection, id: i64) -> StoreResult<E> {
    E::find(conn, id, Scope::Live)?.ok_or_else(|| StoreError::not_found(E::NAME, id))
}

fn written_with_id<E: Table>(written: Vec<Record>, id: i64) -> StoreResult<E> {
    written
        .into_iter()
        .filter_map(E::from_record)
        .find(|entity| entity.id() == id)
        .ok_or_else(|| StoreError::not_found(E::NAME, id))
}

/// Fails with `ForeignKeyMissing` unless `P` row `id` exists and is live.
fn require_live<P: Table>(conn: &mut SqliteConnection, entity: &'static str, id: i64) -> StoreResult<()> {
    match P::find(conn, id, Scope::Live)? {
        Some(_) => Ok(()),
        None => Err(StoreError::missing_reference(entity, P::NAME, id)),
    }
}

/// ON DELETE RESTRICT.
fn restrict<D: Entity>(entity: &'static str, id: i64, live_dependents: i64) -> StoreResult<()> {
    if live_dependents > 0 {
        warn!(
            "Refusing to delete {} {}: {} live {} row(s) reference it",
            entity,
            id,
            live_dependents,
            D::NAME
        );
        return Err(StoreError::ReferentialRestrictionViolated {
            entity,
            id,
            dependent: D::NAME,
            count: live_dependents,
        });
    }
    Ok(())
}

/// ON DELETE CASCADE.
fn cascade_delete<E: Table>(
    conn: &mut SqliteConnection,
    changes: &mut ChangeSet,
    dependents: Vec<E>,
) -> StoreResult<()> {
    for dependent in dependents {
        dependent.plan_delete(conn, changes)?;
        changes.delete(dependent);
    }
    Ok(())
}

/// Lifecycle columns in their stored form.
struct Stamps {
    created_at: NaiveDateTime,
    updated_at: Option<NaiveDateTime>,
    is_deleted: bool,
    deleted_at: Option<NaiveDateTime>,
}

impl Stamps {
    fn of(lifecycle: &Lifecycle) -> Self {
        Self {
            created_at: lifecycle.created_at.naive_utc(),
            updated_at: lifecycle.updated_at.map(|at| at.naive_utc()),
            is_deleted: lifecycle.is_deleted,
            deleted_at: lifecycle.deleted_at.map(|at| at.naive_utc()),
        }
    }

    fn into_lifecycle(self) -> Lifecycle {
        let utc = |at: NaiveDateTime| -> DateTime<Utc> { at.and_utc() };
        Lifecycle {
            created_at: utc(self.created_at),
            updated_at: self.updated_at.map(utc),
            is_deleted: self.is_deleted,
            deleted_at: self.deleted_at.map(utc),
        }
    }
}

/// Decimal to its scaled-integer column value.
fn to_scaled(value: Decimal, scale: u32) -> i64 {
    let mut value = value.round_dp(scale);
    value.rescale(scale);
    // Validated numeric(18, 2) and numeric(10, 7) values fit comfortably.
    i64::try_from(value.mantissa()).unwrap_or(if value.is_sign_negative() {
        i64::MIN
    } else {
        i64::MAX
    })
}

fn from_scaled(value: i64, scale: u32) -> Decimal {
    Decimal::new(value, scale)
}

fn unknown_code(entity: &'static str, column: &str, code: i32) -> StoreError {
    StoreError::CorruptRow {
        entity,
        reason: format!("unknown {column} code {code}"),
    }
}
