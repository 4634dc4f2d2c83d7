use crate::error::{Result, StoreError};
use crate::item::{BrandType, ClosetSnapshot, Item, ItemStatus, Material, StoredItem};
use crate::schema::items;
use chrono::Utc;
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool};
use diesel::sqlite::SqliteConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, warn};

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

#[derive(Debug, Clone, Copy)]
struct ConnectionOptions {
    busy_timeout_ms: u32,
}

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for ConnectionOptions {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> std::result::Result<(), diesel::r2d2::Error> {
        configure_connection(conn, self.busy_timeout_ms).map_err(diesel::r2d2::Error::QueryError)
    }
}

pub fn establish_pool(database_url: &str, max_size: u32, busy_timeout_ms: u32) -> Result<DbPool> {
    let manager = ConnectionManager::<SqliteConnection>::new(database_url);
    let pool = Pool::builder()
        .max_size(max_size)
        .connection_customizer(Box::new(ConnectionOptions { busy_timeout_ms }))
        .build(manager)?;
    Ok(pool)
}

pub fn configure_connection(conn: &mut SqliteConnection, busy_timeout_ms: u32) -> QueryResult<()> {
    conn.batch_execute(&format!("PRAGMA busy_timeout = {busy_timeout_ms};"))?;
    conn.batch_execute("PRAGMA journal_mode = WAL;")?;
    conn.batch_execute("PRAGMA synchronous = NORMAL;")?;
    conn.batch_execute("PRAGMA foreign_keys = ON;")?;
    Ok(())
}

pub fn run_migrations(conn: &mut SqliteConnection) -> Result<()> {
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| StoreError::Migration(e.to_string()))?;
    if !applied.is_empty() {
        debug!(count = applied.len(), "applied migrations");
    }
    Ok(())
}

#[derive(Queryable, Selectable, Debug)]
#[diesel(table_name = items)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ItemRow {
    pub id: i32,
    pub name: String,
    pub is_second_hand: bool,
    pub brand_type: String,
    pub material: String,
    pub wear_count: i32,
    pub status: String,
    pub price: f64,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = items)]
pub struct NewItemRow {
    pub name: String,
    pub is_second_hand: bool,
    pub brand_type: String,
    pub material: String,
    pub wear_count: i32,
    pub status: String,
    pub price: f64,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(AsChangeset, Debug, Clone)]
#[diesel(table_name = items)]
pub struct ItemChanges {
    pub name: String,
    pub is_second_hand: bool,
    pub brand_type: String,
    pub material: String,
    pub wear_count: i32,
    pub status: String,
    pub price: f64,
    pub updated_at: i64,
}

impl TryFrom<ItemRow> for StoredItem {
    type Error = StoreError;

    fn try_from(row: ItemRow) -> Result<Self> {
        let id = row.id;
        let corrupt = |reason: String| StoreError::CorruptRow { id, reason };

        let brand_type = BrandType::from_str(&row.brand_type)
            .map_err(|_| corrupt(format!("unknown brand type '{}'", row.brand_type)))?;
        let material = Material::from_str(&row.material)
            .map_err(|_| corrupt(format!("unknown material '{}'", row.material)))?;
        let status = ItemStatus::from_str(&row.status)
            .map_err(|_| corrupt(format!("unknown status '{}'", row.status)))?;
        let wear_count = u32::try_from(row.wear_count)
            .map_err(|_| corrupt(format!("negative wear count {}", row.wear_count)))?;
        if !row.price.is_finite() || row.price < 0.0 {
            return Err(corrupt(format!("invalid price {}", row.price)));
        }

        Ok(StoredItem {
            id,
            name: row.name,
            item: Item {
                is_second_hand: row.is_second_hand,
                brand_type,
                material,
                wear_count,
                status,
                price: row.price,
            },
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn validate(name: &str, item: &Item) -> Result<i32> {
    if name.trim().is_empty() {
        return Err(StoreError::InvalidItem("name must not be blank".into()));
    }
    if !item.price.is_finite() || item.price < 0.0 {
        return Err(StoreError::InvalidItem(format!(
            "price must be a non-negative number, got {}",
            item.price
        )));
    }
    i32::try_from(item.wear_count)
        .map_err(|_| StoreError::InvalidItem(format!("wear count {} too large", item.wear_count)))
}

pub fn load_items(conn: &mut SqliteConnection) -> Result<Vec<StoredItem>> {
    let rows = items::table
        .order(items::id.asc())
        .select(ItemRow::as_select())
        .load::<ItemRow>(conn)?;
    rows.into_iter().map(StoredItem::try_from).collect()
}

/// Builds a snapshot from every readable row. Corrupt rows are logged and left out,
/// so one bad row never hides writes that already committed.
fn load_snapshot(conn: &mut SqliteConnection) -> Result<ClosetSnapshot> {
    let rows = items::table
        .order(items::id.asc())
        .select(ItemRow::as_select())
        .load::<ItemRow>(conn)?;

    let stored = rows
        .into_iter()
        .filter_map(|row| match StoredItem::try_from(row) {
            Ok(item) => Some(item),
            Err(StoreError::CorruptRow { id, reason }) => {
                warn!(id, %reason, "skipping corrupt item row");
                None
            }
            Err(e) => {
                warn!(error = %e, "skipping unreadable item row");
                None
            }
        })
        .collect();
    Ok(ClosetSnapshot::new(stored))
}

fn not_found(id: i32) -> StoreError {
    StoreError::NotFound { kind: "item", id }
}

/// SQLite-backed item collection with a change feed of snapshots.
#[derive(Clone)]
pub struct ItemStore {
    pool: DbPool,
    changes: Arc<watch::Sender<ClosetSnapshot>>,
}

impl ItemStore {
    pub fn open(pool: DbPool) -> Result<Self> {
        let mut conn = pool.get()?;
        run_migrations(&mut conn)?;
        let snapshot = load_snapshot(&mut conn)?;
        let (changes, _) = watch::channel(snapshot);

        Ok(Self {
            pool,
            changes: Arc::new(changes),
        })
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    pub fn snapshot(&self) -> ClosetSnapshot {
        self.changes.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ClosetSnapshot> {
        self.changes.subscribe()
    }

    pub fn insert(&self, name: &str, item: &Item) -> Result<i32> {
        let wear_count = validate(name, item)?;
        let now = Utc::now().timestamp();
        let row = NewItemRow {
            name: name.trim().to_string(),
            is_second_hand: item.is_second_hand,
            brand_type: item.brand_type.to_string(),
            material: item.material.to_string(),
            wear_count,
            status: item.status.to_string(),
            price: item.price,
            created_at: now,
            updated_at: now,
        };

        let mut conn = self.pool.get()?;
        let id = diesel::insert_into(items::table)
            .values(&row)
            .returning(items::id)
            .get_result::<i32>(&mut conn)?;
        debug!(id, name = %row.name, "inserted item");

        self.publish(&mut conn)?;
        Ok(id)
    }

    pub fn get(&self, id: i32) -> Result<Option<StoredItem>> {
        let mut conn = self.pool.get()?;
        let row = items::table
            .find(id)
            .select(ItemRow::as_select())
            .first::<ItemRow>(&mut conn)
            .optional()?;
        row.map(StoredItem::try_from).transpose()
    }

    pub fn list(&self) -> Result<Vec<StoredItem>> {
        let mut conn = self.pool.get()?;
        load_items(&mut conn)
    }

    pub fn update(&self, id: i32, name: &str, item: &Item) -> Result<()> {
        let wear_count = validate(name, item)?;
        let changes = ItemChanges {
            name: name.trim().to_string(),
            is_second_hand: item.is_second_hand,
            brand_type: item.brand_type.to_string(),
            material: item.material.to_string(),
            wear_count,
            status: item.status.to_string(),
            price: item.price,
            updated_at: Utc::now().timestamp(),
        };

        let mut conn = self.pool.get()?;
        let updated = diesel::update(items::table.find(id))
            .set(&changes)
            .execute(&mut conn)?;
        if updated == 0 {
            return Err(not_found(id));
        }
        debug!(id, "updated item");

        self.publish(&mut conn)
    }

    pub fn delete(&self, id: i32) -> Result<bool> {
        let mut conn = self.pool.get()?;
        let deleted = diesel::delete(items::table.find(id)).execute(&mut conn)?;
        if deleted > 0 {
            debug!(id, "deleted item");
            self.publish(&mut conn)?;
        }
        Ok(deleted > 0)
    }

    pub fn record_wear(&self, id: i32) -> Result<()> {
        let mut conn = self.pool.get()?;
        let updated = diesel::update(items::table.find(id))
            .set((
                items::wear_count.eq(items::wear_count + 1),
                items::updated_at.eq(Utc::now().timestamp()),
            ))
            .execute(&mut conn)?;
        if updated == 0 {
            return Err(not_found(id));
        }

        self.publish(&mut conn)
    }

    pub fn set_status(&self, id: i32, status: ItemStatus) -> Result<()> {
        let mut conn = self.pool.get()?;
        let updated = diesel::update(items::table.find(id))
            .set((
                items::status.eq(status.to_string()),
                items::updated_at.eq(Utc::now().timestamp()),
            ))
            .execute(&mut conn)?;
        if updated == 0 {
            return Err(not_found(id));
        }
        debug!(id, %status, "changed item status");

        self.publish(&mut conn)
    }

    /// Reloads the collection from disk, picking up writes made by other processes.
    /// Returns whether subscribers were notified.
    pub fn refresh(&self) -> Result<bool> {
        let mut conn = self.pool.get()?;
        self.publish_changed(&mut conn)
    }

    fn publish(&self, conn: &mut SqliteConnection) -> Result<()> {
        self.publish_changed(conn).map(|_| ())
    }

    fn publish_changed(&self, conn: &mut SqliteConnection) -> Result<bool> {
        let snapshot = load_snapshot(conn)?;
        let changed = self.changes.send_if_modified(|current| {
            if *current == snapshot {
                false
            } else {
                *current = snapshot;
                true
            }
        });
        if changed {
            debug!(items = self.changes.borrow().len(), "published snapshot");
        }
        Ok(changed)
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::temp_store;
    use super::*;
    use crate::schema::items::dsl;

    fn jacket() -> Item {
        Item {
            is_second_hand: true,
            brand_type: BrandType::EcoSustainable,
            material: Material::Natural,
            wear_count: 2,
            status: ItemStatus::Active,
            price: 35.5,
        }
    }

    #[test]
    fn test_insert_and_get() {
        let (_dir, store) = temp_store();
        let id = store.insert("  denim jacket ", &jacket()).unwrap();

        let stored = store.get(id).unwrap().unwrap();
        assert_eq!(stored.name, "denim jacket");
        assert_eq!(stored.item, jacket());
        assert!(stored.created_at > 0);
        assert!(store.get(id + 100).unwrap().is_none());
    }

    #[test]
    fn test_rejects_invalid_items() {
        let (_dir, store) = temp_store();

        let negative = Item {
            price: -1.0,
            ..jacket()
        };
        assert!(matches!(
            store.insert("coat", &negative),
            Err(StoreError::InvalidItem(_))
        ));

        let nan = Item {
            price: f64::NAN,
            ..jacket()
        };
        assert!(matches!(
            store.insert("coat", &nan),
            Err(StoreError::InvalidItem(_))
        ));

        assert!(matches!(
            store.insert("   ", &jacket()),
            Err(StoreError::InvalidItem(_))
        ));
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn test_update_delete_and_missing_ids() {
        let (_dir, store) = temp_store();
        let id = store.insert("scarf", &jacket()).unwrap();

        let changed = Item {
            material: Material::Synthetic,
            ..jacket()
        };
        store.update(id, "wool scarf", &changed).unwrap();
        let stored = store.get(id).unwrap().unwrap();
        assert_eq!(stored.name, "wool scarf");
        assert_eq!(stored.item.material, Material::Synthetic);

        assert!(matches!(
            store.update(999, "ghost", &changed),
            Err(StoreError::NotFound { id: 999, .. })
        ));
        assert!(store.delete(id).unwrap());
        assert!(!store.delete(id).unwrap());
    }

    #[test]
    fn test_record_wear_and_status() {
        let (_dir, store) = temp_store();
        let id = store.insert("boots", &jacket()).unwrap();

        store.record_wear(id).unwrap();
        store.record_wear(id).unwrap();
        store.set_status(id, ItemStatus::Donated).unwrap();

        let stored = store.get(id).unwrap().unwrap();
        assert_eq!(stored.item.wear_count, 4);
        assert_eq!(stored.item.status, ItemStatus::Donated);
        assert!(matches!(
            store.record_wear(42),
            Err(StoreError::NotFound { .. })
        ));
    }

    #[test]
    fn test_mutations_publish_snapshots() {
        let (_dir, store) = temp_store();
        let mut rx = store.subscribe();
        assert!(rx.borrow_and_update().is_empty());

        let id = store.insert("hat", &jacket()).unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().len(), 1);

        store.record_wear(id).unwrap();
        assert!(rx.has_changed().unwrap());
        let wears = rx.borrow_and_update().items().next().map(|i| i.wear_count);
        assert_eq!(wears, Some(3));

        // nothing changed on disk
        assert!(!store.refresh().unwrap());
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn test_refresh_picks_up_external_writes() {
        let (_dir, store) = temp_store();
        let id = store.insert("gloves", &jacket()).unwrap();

        let mut conn = store.pool().get().unwrap();
        diesel::update(dsl::items.find(id))
            .set(dsl::wear_count.eq(40))
            .execute(&mut conn)
            .unwrap();

        assert_eq!(store.snapshot().items().next().unwrap().wear_count, 2);
        assert!(store.refresh().unwrap());
        assert_eq!(store.snapshot().items().next().unwrap().wear_count, 40);
    }

    #[test]
    fn test_corrupt_rows_are_reported() {
        let (_dir, store) = temp_store();
        let id = store.insert("belt", &jacket()).unwrap();

        let mut conn = store.pool().get().unwrap();
        diesel::update(dsl::items.find(id))
            .set(dsl::material.eq("leather"))
            .execute(&mut conn)
            .unwrap();

        assert!(matches!(
            store.get(id),
            Err(StoreError::CorruptRow { id: row_id, .. }) if row_id == id
        ));

        diesel::update(dsl::items.find(id))
            .set((dsl::material.eq("natural"), dsl::wear_count.eq(-3)))
            .execute(&mut conn)
            .unwrap();
        assert!(matches!(store.list(), Err(StoreError::CorruptRow { .. })));
    }

    #[test]
    fn test_corrupt_row_does_not_fail_later_writes() {
        let (_dir, store) = temp_store();
        let belt = store.insert("belt", &jacket()).unwrap();

        let mut conn = store.pool().get().unwrap();
        diesel::update(dsl::items.find(belt))
            .set(dsl::material.eq("leather"))
            .execute(&mut conn)
            .unwrap();

        let mut rx = store.subscribe();
        rx.borrow_and_update();

        let scarf = store.insert("scarf", &jacket()).unwrap();
        let on_disk: i64 = dsl::items.count().get_result(&mut conn).unwrap();
        assert_eq!(on_disk, 2);

        assert!(rx.has_changed().unwrap());
        let snapshot = rx.borrow_and_update().clone();
        let ids: Vec<i32> = snapshot.stored().iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![scarf]);

        store.record_wear(scarf).unwrap();
        assert!(store.delete(scarf).unwrap());
        assert!(store.snapshot().is_empty());
    }

    #[test]
    fn test_open_skips_corrupt_rows() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("closet.db");
        let url = path.to_str().unwrap();

        let store = ItemStore::open(establish_pool(url, 1, 2000).unwrap()).unwrap();
        let bad = store.insert("belt", &jacket()).unwrap();
        store.insert("scarf", &jacket()).unwrap();
        let mut conn = store.pool().get().unwrap();
        diesel::update(dsl::items.find(bad))
            .set(dsl::status.eq("burned"))
            .execute(&mut conn)
            .unwrap();
        drop(conn);
        drop(store);

        let reopened = ItemStore::open(establish_pool(url, 1, 2000).unwrap()).unwrap();
        assert_eq!(reopened.snapshot().len(), 1);
    }

    #[test]
    fn test_reopen_keeps_items() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("closet.db");
        let url = path.to_str().unwrap();

        {
            let store = ItemStore::open(establish_pool(url, 1, 2000).unwrap()).unwrap();
            store.insert("sweater", &jacket()).unwrap();
        }

        let store = ItemStore::open(establish_pool(url, 1, 2000).unwrap()).unwrap();
        assert_eq!(store.snapshot().len(), 1);
    }
}
