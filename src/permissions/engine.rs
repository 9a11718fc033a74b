use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::Mutex;

use crate::permissions::errors::CapabilityError;
use crate::permissions::store::{CapabilityStore, StoredCapability};
use crate::permissions::types::{
    Capability, CapabilitySet, BUILTINS, BUILTIN_COUNT, MAX_CAPABILITIES,
};

/// Name <-> bit mapping for built-in and runtime-registered capabilities.
///
/// Reads take a shared lock and never touch storage. Administration
/// (`initialize`, `load_custom`, `register`, `unregister`) is serialized and
/// only publishes a change to the in-memory table once the store accepted it,
/// so readers never observe a capability the store does not hold.
pub struct CapabilityRegistry {
    table: RwLock<CapabilityTable>,
    store: RwLock<Option<Arc<dyn CapabilityStore>>>,
    admin: Mutex<()>,
}

#[derive(Debug, Clone)]
struct CapabilityTable {
    by_name: HashMap<String, u8>,
    by_bit: BTreeMap<u8, String>,
    /// Next unallocated bit; only ever moves forward
    next_bit: u8,
}

impl CapabilityTable {
    fn seeded() -> Self {
        let mut table = Self {
            by_name: HashMap::new(),
            by_bit: BTreeMap::new(),
            next_bit: BUILTIN_COUNT,
        };
        for (bit, name) in (0u8..).zip(BUILTINS) {
            table.insert(name, bit);
        }
        table
    }

    fn insert(&mut self, name: &str, bit: u8) {
        if let Some(old_bit) = self.by_name.insert(name.to_string(), bit) {
            if old_bit != bit {
                self.by_bit.remove(&old_bit);
            }
        }
        if let Some(old_name) = self.by_bit.insert(bit, name.to_string()) {
            if old_name != name {
                self.by_name.remove(&old_name);
            }
        }
    }

    fn remove(&mut self, name: &str) {
        if let Some(bit) = self.by_name.remove(name) {
            self.by_bit.remove(&bit);
        }
    }

    fn capability(&self, name: &str) -> Option<Capability> {
        self.by_name.get(name).map(|&bit| Capability {
            name: name.to_string(),
            bit,
        })
    }
}

impl Default for CapabilityRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CapabilityRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let table = self.table.read();
        f.debug_struct("CapabilityRegistry")
            .field("capabilities", &table.by_bit)
            .field("next_bit", &table.next_bit)
            .field("has_store", &self.store.read().is_some())
            .finish()
    }
}

impl CapabilityRegistry {
    /// Registry holding only the built-ins, with no store attached.
    pub fn new() -> Self {
        Self {
            table: RwLock::new(CapabilityTable::seeded()),
            store: RwLock::new(None),
            admin: Mutex::new(()),
        }
    }

    /// Attach durable storage and load the custom capabilities it holds.
    /// Returns the number of live capabilities loaded.
    pub async fn initialize(&self, store: Arc<dyn CapabilityStore>) -> Result<usize, CapabilityError> {
        let _admin = self.admin.lock().await;
        *self.store.write() = Some(Arc::clone(&store));
        self.load_locked(store.as_ref()).await
    }

    /// Merge persisted custom capabilities into the table. Safe to repeat.
    pub async fn load_custom(&self, store: &dyn CapabilityStore) -> Result<usize, CapabilityError> {
        let _admin = self.admin.lock().await;
        self.load_locked(store).await
    }

    async fn load_locked(&self, store: &dyn CapabilityStore) -> Result<usize, CapabilityError> {
        let rows = store.load_all().await?;
        for row in &rows {
            validate_stored(row)?;
        }

        let mut table = self.table.write();
        for row in &rows {
            table.insert(&row.name, row.bit_position);
            if row.bit_position >= table.next_bit {
                table.next_bit = row.bit_position + 1;
            }
        }
        Ok(rows.len())
    }

    pub async fn register(&self, name: &str) -> Result<Capability, CapabilityError> {
        self.register_with_description(name, "").await
    }

    /// Allocate the next free bit for `name`. Registering an existing name
    /// returns the existing capability.
    pub async fn register_with_description(
        &self,
        name: &str,
        description: &str,
    ) -> Result<Capability, CapabilityError> {
        let _admin = self.admin.lock().await;

        let bit = {
            let table = self.table.read();
            if let Some(existing) = table.capability(name) {
                return Ok(existing);
            }
            if table.next_bit >= MAX_CAPABILITIES {
                return Err(CapabilityError::CapacityExceeded {
                    max: MAX_CAPABILITIES,
                });
            }
            table.next_bit
        };

        let store = self.store.read().clone();
        if let Some(store) = store {
            store.insert(name, bit, description).await?;
        }

        let mut table = self.table.write();
        table.insert(name, bit);
        table.next_bit = bit + 1;

        Ok(Capability {
            name: name.to_string(),
            bit,
        })
    }

    /// Remove a custom capability. Its bit is not handed out again by this
    /// process; a restart reclaims bits above the highest live one.
    pub async fn unregister(&self, name: &str) -> Result<(), CapabilityError> {
        let _admin = self.admin.lock().await;

        let capability = self
            .lookup(name)
            .ok_or_else(|| CapabilityError::NotFound(name.to_string()))?;
        if capability.is_builtin() {
            return Err(CapabilityError::BuiltinImmutable(name.to_string()));
        }

        let store = self.store.read().clone();
        if let Some(store) = store {
            store.delete(name).await?;
        }

        self.table.write().remove(name);
        Ok(())
    }

    /// Live custom capabilities as persisted; empty without a store.
    pub async fn list_custom(&self) -> Result<Vec<StoredCapability>, CapabilityError> {
        let store = self.store.read().clone();
        let Some(store) = store else {
            return Ok(Vec::new());
        };
        Ok(store.load_all().await?)
    }

    pub fn lookup(&self, name: &str) -> Option<Capability> {
        self.table.read().capability(name)
    }

    /// Names of every mapped capability contained in `held`.
    pub fn to_names(&self, held: CapabilitySet) -> BTreeSet<String> {
        let table = self.table.read();
        held.positions()
            .filter_map(|bit| table.by_bit.get(&bit).cloned())
            .collect()
    }

    /// Combined mask of the given names; unknown names contribute nothing.
    pub fn to_mask<I, S>(&self, names: I) -> CapabilitySet
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let table = self.table.read();
        names
            .into_iter()
            .filter_map(|name| table.capability(name.as_ref()))
            .fold(CapabilitySet::EMPTY, |acc, cap| acc | cap.mask())
    }

    /// Name of a single-bit mask, or `"Unknown"`.
    pub fn name_of(&self, capability: CapabilitySet) -> String {
        let mut positions = capability.positions();
        let bit = match (positions.next(), positions.next()) {
            (Some(bit), None) => bit,
            _ => return "Unknown".to_string(),
        };
        self.table
            .read()
            .by_bit
            .get(&bit)
            .cloned()
            .unwrap_or_else(|| "Unknown".to_string())
    }

    pub fn all_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.table.read().by_name.keys().cloned().collect();
        names.sort();
        names
    }

    /// Every mapped capability, ascending by bit.
    pub fn capabilities(&self) -> Vec<Capability> {
        self.table
            .read()
            .by_bit
            .iter()
            .map(|(&bit, name)| Capability {
                name: name.clone(),
                bit,
            })
            .collect()
    }

    pub fn builtin_count(&self) -> u8 {
        BUILTIN_COUNT
    }

    pub fn next_bit(&self) -> u8 {
        self.table.read().next_bit
    }

    pub fn has_store(&self) -> bool {
        self.store.read().is_some()
    }
}

fn validate_stored(row: &StoredCapability) -> Result<(), CapabilityError> {
    let reason = if row.bit_position >= MAX_CAPABILITIES {
        "bit lies beyond the 64-bit mask"
    } else if row.bit_position < BUILTIN_COUNT {
        "bit lies inside the built-in range"
    } else if BUILTINS.contains(&row.name.as_str()) {
        "name collides with a built-in capability"
    } else {
        return Ok(());
    };

    Err(CapabilityError::InvalidStoredCapability {
        name: row.name.clone(),
        bit_position: row.bit_position,
        reason: reason.to_string(),
    })
}
