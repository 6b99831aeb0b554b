// 🗄️ Address Store + Repository Layer
// SQLite table of addresses and the CRUD functions over it

use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

// ============================================================================
// RECORDS
// ============================================================================

/// Persisted address. `id` is assigned by the store and never changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub id: i64,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Input for creating an address. All fields required.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAddress {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Input for a partial update. Absent fields keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AddressUpdate {
    pub name: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl AddressUpdate {
    /// True when the update carries no fields at all
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.latitude.is_none() && self.longitude.is_none()
    }

    /// Apply the present fields onto an existing record
    pub fn apply_to(&self, address: &mut Address) {
        if let Some(name) = &self.name {
            address.name = name.clone();
        }
        if let Some(latitude) = self.latitude {
            address.latitude = latitude;
        }
        if let Some(longitude) = self.longitude {
            address.longitude = longitude;
        }
    }
}

/// One page of the listing, already validated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

impl Page {
    pub const DEFAULT_LIMIT: i64 = 100;
    pub const MAX_LIMIT: i64 = 1000;
}

impl Default for Page {
    fn default() -> Self {
        Page {
            limit: Self::DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error("address {id} not found")]
    NotFound { id: i64 },

    #[error("store failure: {0}")]
    Store(#[from] rusqlite::Error),
}

pub type RepoResult<T> = Result<T, RepoError>;

// ============================================================================
// STORE HANDLE
// ============================================================================

/// Cheap, cloneable handle on the database file.
///
/// Every request takes its own [`Connection`] through [`Store::session`]; the
/// connection closes when the caller drops it, whatever the outcome.
#[derive(Debug, Clone)]
pub struct Store {
    path: PathBuf,
}

impl Store {
    /// Open the database at `path`, creating the schema if it is absent.
    pub fn open(path: impl Into<PathBuf>) -> RepoResult<Self> {
        let path = path.into();
        let conn = Connection::open(&path)?;
        setup_database(&conn)?;

        info!(path = %path.display(), "address store ready");
        Ok(Store { path })
    }

    /// Fresh connection scoped to one unit of work
    pub fn session(&self) -> RepoResult<Connection> {
        debug!(path = %self.path.display(), "opening store session");
        Ok(Connection::open(&self.path)?)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

pub fn setup_database(conn: &Connection) -> RepoResult<()> {
    // WAL lets readers proceed while a request is writing
    conn.pragma_update(None, "journal_mode", "WAL")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS addresses (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            latitude REAL NOT NULL,
            longitude REAL NOT NULL
        )",
        [],
    )?;

    Ok(())
}

// ============================================================================
// REPOSITORY
// ============================================================================

/// Read-then-write unit of work. Takes the write lock at BEGIN: under WAL a
/// deferred read lock cannot be upgraded once another session has committed.
fn write_transaction(conn: &Connection) -> RepoResult<Transaction<'_>> {
    Ok(Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?)
}

const SELECT_ADDRESS: &str = "SELECT id, name, latitude, longitude FROM addresses";

fn address_from_row(row: &Row<'_>) -> rusqlite::Result<Address> {
    Ok(Address {
        id: row.get(0)?,
        name: row.get(1)?,
        latitude: row.get(2)?,
        longitude: row.get(3)?,
    })
}

/// Insert a new address and return it with its assigned id
pub fn create_address(conn: &Connection, input: &NewAddress) -> RepoResult<Address> {
    info!(name = %input.name, "creating new address");

    conn.execute(
        "INSERT INTO addresses (name, latitude, longitude) VALUES (?1, ?2, ?3)",
        params![input.name, input.latitude, input.longitude],
    )?;

    Ok(Address {
        id: conn.last_insert_rowid(),
        name: input.name.clone(),
        latitude: input.latitude,
        longitude: input.longitude,
    })
}

/// One page of addresses in insertion order
pub fn list_addresses(conn: &Connection, page: Page) -> RepoResult<Vec<Address>> {
    debug!(limit = page.limit, offset = page.offset, "fetching addresses");

    let mut stmt = conn.prepare(&format!(
        "{SELECT_ADDRESS} ORDER BY id ASC LIMIT ?1 OFFSET ?2"
    ))?;

    let addresses = stmt
        .query_map(params![page.limit, page.offset], address_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(addresses)
}

/// Every stored address in insertion order, for full-table scans
pub fn list_all_addresses(conn: &Connection) -> RepoResult<Vec<Address>> {
    let mut stmt = conn.prepare(&format!("{SELECT_ADDRESS} ORDER BY id ASC"))?;

    let addresses = stmt
        .query_map([], address_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    debug!(count = addresses.len(), "fetched all addresses");
    Ok(addresses)
}

pub fn get_address_by_id(conn: &Connection, id: i64) -> RepoResult<Option<Address>> {
    debug!(id, "fetching address");

    let address = conn
        .query_row(
            &format!("{SELECT_ADDRESS} WHERE id = ?1"),
            [id],
            address_from_row,
        )
        .optional()?;

    Ok(address)
}

/// Apply a partial update. Fails with `NotFound` when `id` is unknown.
pub fn update_address(
    conn: &Connection,
    id: i64,
    input: &AddressUpdate,
) -> RepoResult<Address> {
    let tx = write_transaction(conn)?;

    let Some(mut address) = get_address_by_id(&tx, id)? else {
        warn!(id, "address not found for update");
        return Err(RepoError::NotFound { id });
    };

    if input.is_empty() {
        debug!(id, "empty update, nothing to write");
        return Ok(address);
    }

    input.apply_to(&mut address);

    tx.execute(
        "UPDATE addresses SET name = ?1, latitude = ?2, longitude = ?3 WHERE id = ?4",
        params![address.name, address.latitude, address.longitude, id],
    )?;
    tx.commit()?;

    info!(id, "updated address");
    Ok(address)
}

/// Remove an address and hand back what was removed
pub fn delete_address(conn: &Connection, id: i64) -> RepoResult<Address> {
    let tx = write_transaction(conn)?;

    let Some(address) = get_address_by_id(&tx, id)? else {
        warn!(id, "attempted to delete non-existing address");
        return Err(RepoError::NotFound { id });
    };

    tx.execute("DELETE FROM addresses WHERE id = ?1", [id])?;
    tx.commit()?;

    info!(id, "deleted address");
    Ok(address)
}

pub fn count_addresses(conn: &Connection) -> RepoResult<i64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM addresses", [], |row| row.get(0))?;

    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        setup_database(&conn).unwrap();
        conn
    }

    fn new_address(name: &str, latitude: f64, longitude: f64) -> NewAddress {
        NewAddress {
            name: name.to_string(),
            latitude,
            longitude,
        }
    }

    #[test]
    fn test_create_then_get_round_trip() {
        let conn = test_db();

        let created = create_address(&conn, &new_address("Home", 52.52, 13.405)).unwrap();
        let fetched = get_address_by_id(&conn, created.id).unwrap().unwrap();

        assert_eq!(fetched.name, "Home");
        assert_eq!(fetched.latitude, 52.52);
        assert_eq!(fetched.longitude, 13.405);
        assert_eq!(fetched, created);
    }

    #[test]
    fn test_ids_are_assigned_and_unique() {
        let conn = test_db();

        let a = create_address(&conn, &new_address("A", 0.0, 0.0)).unwrap();
        let b = create_address(&conn, &new_address("A", 0.0, 0.0)).unwrap();

        assert_ne!(a.id, b.id, "same name must still get a distinct id");
        assert_eq!(count_addresses(&conn).unwrap(), 2);
    }

    #[test]
    fn test_get_unknown_id_is_none() {
        let conn = test_db();
        assert!(get_address_by_id(&conn, 42).unwrap().is_none());
    }

    #[test]
    fn test_list_pages_in_insertion_order() {
        let conn = test_db();
        for i in 0..5 {
            create_address(&conn, &new_address(&format!("addr-{i}"), 1.0, 1.0)).unwrap();
        }

        let first = list_addresses(&conn, Page { limit: 2, offset: 0 }).unwrap();
        let second = list_addresses(&conn, Page { limit: 2, offset: 2 }).unwrap();
        let tail = list_addresses(&conn, Page { limit: 10, offset: 4 }).unwrap();

        let names: Vec<_> = first.iter().chain(&second).map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["addr-0", "addr-1", "addr-2", "addr-3"]);
        assert_eq!(tail.len(), 1);
        assert_eq!(tail[0].name, "addr-4");

        let past_end = list_addresses(&conn, Page { limit: 10, offset: 50 }).unwrap();
        assert!(past_end.is_empty());
    }

    #[test]
    fn test_list_all_ignores_paging() {
        let conn = test_db();
        for i in 0..(Page::DEFAULT_LIMIT + 5) {
            create_address(&conn, &new_address(&format!("n{i}"), 0.0, 0.0)).unwrap();
        }

        let all = list_all_addresses(&conn).unwrap();
        assert_eq!(all.len() as i64, Page::DEFAULT_LIMIT + 5);
        assert!(all.windows(2).all(|w| w[0].id < w[1].id));
    }

    #[test]
    fn test_partial_update_keeps_other_fields() {
        let conn = test_db();
        let created = create_address(&conn, &new_address("Office", 10.0, 20.0)).unwrap();

        let update = AddressUpdate {
            latitude: Some(-33.5),
            ..Default::default()
        };
        let updated = update_address(&conn, created.id, &update).unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.name, "Office");
        assert_eq!(updated.latitude, -33.5);
        assert_eq!(updated.longitude, 20.0);

        let stored = get_address_by_id(&conn, created.id).unwrap().unwrap();
        assert_eq!(stored, updated);
    }

    #[test]
    fn test_empty_update_is_a_no_op() {
        let conn = test_db();
        let created = create_address(&conn, &new_address("Same", 1.0, 2.0)).unwrap();

        let updated = update_address(&conn, created.id, &AddressUpdate::default()).unwrap();
        assert_eq!(updated, created);
    }

    #[test]
    fn test_update_unknown_id_is_not_found() {
        let conn = test_db();

        let update = AddressUpdate {
            name: Some("Ghost".to_string()),
            ..Default::default()
        };
        let err = update_address(&conn, 7, &update).unwrap_err();

        assert!(matches!(err, RepoError::NotFound { id: 7 }));
        assert_eq!(count_addresses(&conn).unwrap(), 0);
    }

    #[test]
    fn test_delete_returns_record_then_not_found() {
        let conn = test_db();
        let created = create_address(&conn, &new_address("Gone", 5.0, 5.0)).unwrap();

        let removed = delete_address(&conn, created.id).unwrap();
        assert_eq!(removed, created);

        assert!(get_address_by_id(&conn, created.id).unwrap().is_none());
        let err = delete_address(&conn, created.id).unwrap_err();
        assert!(matches!(err, RepoError::NotFound { .. }));
    }

    #[test]
    fn test_ids_are_not_reused_after_delete() {
        let conn = test_db();
        let first = create_address(&conn, &new_address("first", 0.0, 0.0)).unwrap();
        delete_address(&conn, first.id).unwrap();

        let second = create_address(&conn, &new_address("second", 0.0, 0.0)).unwrap();
        assert!(second.id > first.id);
    }

    #[test]
    fn test_setup_is_idempotent() {
        let conn = test_db();
        create_address(&conn, &new_address("kept", 0.0, 0.0)).unwrap();

        setup_database(&conn).unwrap();

        assert_eq!(count_addresses(&conn).unwrap(), 1);
    }

    #[test]
    fn test_store_sessions_share_one_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path().join("addresses.db")).unwrap();

        let created = {
            let conn = store.session().unwrap();
            create_address(&conn, &new_address("persisted", 48.85, 2.35)).unwrap()
        };

        let conn = store.session().unwrap();
        let fetched = get_address_by_id(&conn, created.id).unwrap();
        assert_eq!(fetched, Some(created));

        // Reopening must not wipe existing rows
        let reopened = Store::open(store.path()).unwrap();
        let conn = reopened.session().unwrap();
        assert_eq!(count_addresses(&conn).unwrap(), 1);

        println!("✅ Store session test PASSED");
    }

    #[test]
    fn test_concurrent_sessions_update_and_delete() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path().join("addresses.db")).unwrap();

        let ids: Vec<i64> = {
            let conn = store.session().unwrap();
            (0..8)
                .map(|i| {
                    create_address(&conn, &new_address(&format!("row-{i}"), 0.0, 0.0))
                        .unwrap()
                        .id
                })
                .collect()
        };

        let workers: Vec<_> = ids
            .iter()
            .map(|&id| {
                let store = store.clone();
                std::thread::spawn(move || -> RepoResult<()> {
                    for step in 0..50 {
                        let conn = store.session()?;
                        let update = AddressUpdate {
                            latitude: Some(f64::from(step)),
                            ..Default::default()
                        };
                        update_address(&conn, id, &update)?;
                    }

                    let conn = store.session()?;
                    let removed = delete_address(&conn, id)?;
                    assert_eq!(removed.latitude, 49.0);
                    Ok(())
                })
            })
            .collect();

        let errors: Vec<String> = workers
            .into_iter()
            .filter_map(|w| w.join().unwrap().err())
            .map(|e| e.to_string())
            .collect();

        assert!(errors.is_empty(), "concurrent writes failed: {errors:?}");

        let conn = store.session().unwrap();
        assert_eq!(count_addresses(&conn).unwrap(), 0);
    }
}
