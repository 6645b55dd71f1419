//! Order Store

use std::{
    fmt,
    sync::{Arc, Mutex, PoisonError},
};

use serde_json::Value;
use tracing::{info, warn};

use crate::{
    orders::{Order, OrderId, OrderStatus},
    storage::{KeyValueStore, StorageError},
};

/// Default key of the persisted order collection.
pub const ORDERS_KEY: &str = "griya_orders";

/// Owner of the persisted order collection, most recent first.
///
/// Every mutation reads the whole collection, changes it and writes it back
/// while holding the store's write lock, so two writers through the same store
/// never lose each other's update. Mutations work on the raw records, so a
/// record this version cannot decode is written back untouched.
pub struct OrderStore {
    storage: Arc<dyn KeyValueStore>,
    key: String,
    write_lock: Mutex<()>,
}

impl fmt::Debug for OrderStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrderStore")
            .field("storage", &self.storage)
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

impl OrderStore {
    /// Store orders under `key`.
    pub fn new(storage: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Store orders under [`ORDERS_KEY`].
    pub fn with_default_key(storage: Arc<dyn KeyValueStore>) -> Self {
        Self::new(storage, ORDERS_KEY)
    }

    /// Every persisted order, most recent first.
    ///
    /// Unreadable storage reads as an empty collection. Records that fail to
    /// decode are skipped.
    pub fn list_all(&self) -> Vec<Order> {
        match self.load_records() {
            Ok(records) => records
                .into_iter()
                .filter_map(|record| self.decode(record))
                .collect(),
            Err(err) => {
                warn!(key = %self.key, error = %err, "treating unreadable order collection as empty");

                Vec::new()
            }
        }
    }

    /// Prepends an order and persists the collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the existing collection is not a JSON array, or if
    /// the collection cannot be written.
    pub fn append(&self, order: Order) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut records = self.load_records()?;

        records.insert(0, serde_json::to_value(&order)?);
        self.save(&records)?;

        info!(order = %order.id, count = records.len(), "order persisted");

        Ok(())
    }

    /// Replaces the status of one order and persists the collection.
    ///
    /// Only the `status` field of the stored record changes. Returns the
    /// updated order, or `None` (and writes nothing) when no order has that id.
    ///
    /// # Errors
    ///
    /// Returns an error if the existing collection is not a JSON array, if the
    /// updated record does not decode as an order, or if the collection cannot
    /// be written.
    pub fn update_status(
        &self,
        id: &OrderId,
        status: OrderStatus,
    ) -> Result<Option<Order>, StorageError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut records = self.load_records()?;

        let Some(fields) = records
            .iter_mut()
            .filter_map(Value::as_object_mut)
            .find(|fields| fields.get("id").and_then(Value::as_str) == Some(id.as_str()))
        else {
            return Ok(None);
        };

        fields.insert("status".to_string(), serde_json::to_value(&status)?);
        let updated: Order = serde_json::from_value(Value::Object(fields.clone()))?;

        self.save(&records)?;

        info!(order = %id, status = %updated.status, "order status updated");

        Ok(Some(updated))
    }

    /// Looks up one order by id.
    pub fn find(&self, id: &OrderId) -> Option<Order> {
        self.list_all().into_iter().find(|order| order.id == *id)
    }

    /// Orders whose phone or purchaser name matches, most recent first.
    pub fn orders_for(&self, name: &str, phone: &str) -> Vec<Order> {
        self.list_all()
            .into_iter()
            .filter(|order| order.placed_by(name, phone))
            .collect()
    }

    fn load_records(&self) -> Result<Vec<Value>, StorageError> {
        match self.storage.read(&self.key)? {
            Some(contents) => Ok(serde_json::from_str(&contents)?),
            None => Ok(Vec::new()),
        }
    }

    fn decode(&self, record: Value) -> Option<Order> {
        let id = record.get("id").and_then(Value::as_str).map(str::to_string);

        serde_json::from_value(record)
            .inspect_err(|err| {
                warn!(key = %self.key, order = ?id, error = %err, "skipping undecodable order record");
            })
            .ok()
    }

    fn save(&self, records: &[Value]) -> Result<(), StorageError> {
        let contents = serde_json::to_string(records)?;

        self.storage.write(&self.key, &contents)
    }
}
