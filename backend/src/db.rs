use diesel::connection::SimpleConnection;
use diesel::r2d2::{self, ConnectionManager, CustomizeConnection, Pool};
use diesel::sqlite::SqliteConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use log::{error, info};

use crate::error::{StoreError, StoreResult};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Database URL of a private in-memory database.
pub const IN_MEMORY: &str = ":memory:";

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;

/// Applied to every connection the pool opens.
#[derive(Debug)]
struct ConnectionPragmas {
    file_backed: bool,
}

impl CustomizeConnection<SqliteConnection, r2d2::Error> for ConnectionPragmas {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), r2d2::Error> {
        // SQLite leaves foreign keys off unless asked, per connection.
        conn.batch_execute("PRAGMA foreign_keys = ON;")
            .map_err(r2d2::Error::QueryError)?;
        if self.file_backed {
            conn.batch_execute("PRAGMA journal_mode = WAL; PRAGMA busy_timeout = 5000;")
                .map_err(r2d2::Error::QueryError)?;
        }
        Ok(())
    }
}

pub fn establish_pool(database_url: &str, pool_size: u32) -> StoreResult<DbPool> {
    info!("Opening database at {}", database_url);
    let in_memory = database_url == IN_MEMORY;
    let manager = ConnectionManager::<SqliteConnection>::new(database_url);

    let mut builder = Pool::builder().connection_customizer(Box::new(ConnectionPragmas {
        file_backed: !in_memory,
    }));
    builder = if in_memory {
        // Every in-memory connection is its own database, so keep exactly one alive.
        builder.max_size(1).idle_timeout(None).max_lifetime(None)
    } else {
        builder.max_size(pool_size.max(1))
    };

    match builder.build(manager) {
        Ok(pool) => {
            info!("Database pool ready ({} connection(s))", pool.max_size());
            Ok(pool)
        }
        Err(e) => {
            error!("Failed to build database pool: {}", e);
            Err(StoreError::Pool(e))
        }
    }
}

pub fn run_migrations(conn: &mut SqliteConnection) -> StoreResult<()> {
    match conn.run_pending_migrations(MIGRATIONS) {
        Ok(applied) => {
            info!("Applied {} pending migration(s)", applied.len());
            Ok(())
        }
        Err(e) => {
            error!("Failed to run migrations: {}", e);
            Err(StoreError::Migration(e.to_string()))
        }
    }
}
