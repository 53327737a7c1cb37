use chrono::{DateTime, Utc};
use diesel::sqlite::SqliteConnection;

use super::Table;
use crate::error::StoreResult;
use crate::models::{
    ContactMessage, Entity, Favorite, Lifecycle, Payment, Property, PropertyImage, User,
};

/// A row of any table, as carried through a commit batch.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    User(User),
    Property(Property),
    PropertyImage(PropertyImage),
    Favorite(Favorite),
    Payment(Payment),
    ContactMessage(ContactMessage),
}

macro_rules! each_record {
    ($record:expr, $entity:ident => $body:expr) => {
        match $record {
            Record::User($entity) => $body,
            Record::Property($entity) => $body,
            Record::PropertyImage($entity) => $body,
            Record::Favorite($entity) => $body,
            Record::Payment($entity) => $body,
            Record::ContactMessage($entity) => $body,
        }
    };
}

impl Record {
    pub fn name(&self) -> &'static str {
        match self {
            Record::User(_) => User::NAME,
            Record::Property(_) => Property::NAME,
            Record::PropertyImage(_) => PropertyImage::NAME,
            Record::Favorite(_) => Favorite::NAME,
            Record::Payment(_) => Payment::NAME,
            Record::ContactMessage(_) => ContactMessage::NAME,
        }
    }

    pub fn id(&self) -> i64 {
        each_record!(self, entity => entity.id())
    }

    pub fn lifecycle(&self) -> &Lifecycle {
        each_record!(self, entity => entity.lifecycle())
    }

    fn lifecycle_mut(&mut self) -> &mut Lifecycle {
        each_record!(self, entity => entity.lifecycle_mut())
    }

    fn same_row(&self, other: &Record) -> bool {
        self.id() != 0 && self.name() == other.name() && self.id() == other.id()
    }
}

/// What the caller asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryState {
    Added,
    Modified,
    Deleted,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub state: EntryState,
    pub record: Record,
}

/// What the storage engine receives. Only inserts and updates exist.
#[derive(Debug, Clone, PartialEq)]
pub enum Write {
    Insert(Record),
    Update(Record),
}

impl Write {
    pub fn record(&self) -> &Record {
        match self {
            Write::Insert(record) | Write::Update(record) => record,
        }
    }

    /// Executes the write and returns the row as stored.
    pub(crate) fn apply(self, conn: &mut SqliteConnection) -> StoreResult<Record> {
        match self {
            Write::Insert(record) => each_record!(record, entity => entity.insert(conn).map(Table::into_record)),
            Write::Update(record) => {
                each_record!(&record, entity => entity.update(conn))?;
                Ok(record)
            }
        }
    }
}

/// Pending mutations of one commit batch.
#[derive(Debug, Clone, Default)]
pub struct ChangeSet {
    entries: Vec<Entry>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<E: Table>(&mut self, entity: E) {
        self.push(EntryState::Added, entity.into_record());
    }

    pub fn modify<E: Table>(&mut self, entity: E) {
        self.push(EntryState::Modified, entity.into_record());
    }

    pub fn delete<E: Table>(&mut self, entity: E) {
        self.push(EntryState::Deleted, entity.into_record());
    }

    // A row planned twice keeps one entry holding its latest state; once
    // deleted it stays deleted.
    fn push(&mut self, state: EntryState, record: Record) {
        if let Some(entry) = self
            .entries
            .iter_mut()
            .find(|entry| entry.record.same_row(&record))
        {
            if entry.state != EntryState::Deleted {
                entry.state = state;
            }
            entry.record = record;
            return;
        }
        self.entries.push(Entry { state, record });
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The pre-commit hook.
    ///
    /// Added rows get `created_at`, modified rows get `updated_at`, and
    /// deleted rows become updates carrying `is_deleted` and `deleted_at`.
    /// Every stamp in the batch uses the same `now`.
    pub fn prepare(self, now: DateTime<Utc>) -> Vec<Write> {
        self.entries
            .into_iter()
            .map(|Entry { state, mut record }| {
                let lifecycle = record.lifecycle_mut();
                match state {
                    EntryState::Added => {
                        *lifecycle = Lifecycle {
                            created_at: now,
                            ..Lifecycle::default()
                        };
                        Write::Insert(record)
                    }
                    EntryState::Modified => {
                        lifecycle.updated_at = Some(now);
                        Write::Update(record)
                    }
                    EntryState::Deleted => {
                        lifecycle.is_deleted = true;
                        lifecycle.deleted_at = Some(now);
                        Write::Update(record)
                    }
                }
            })
            .collect()
    }
}
