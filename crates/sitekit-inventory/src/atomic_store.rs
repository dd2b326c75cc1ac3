//! Lock-scoped mutation of an inventory file.
//!
//! A run holds `<inventory>.lock` (created with `create_new`) while it loads,
//! mutates and saves. The lock records who holds it; a second writer fails
//! immediately with that holder in the error instead of waiting.

use crate::{InventoryError, MemoryInventory};
use chrono::Utc;
use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

pub fn inventory_lock_path(inventory_path: &Path) -> PathBuf {
    let mut path: OsString = inventory_path.as_os_str().to_os_string();
    path.push(".lock");
    PathBuf::from(path)
}

#[derive(Debug, thiserror::Error)]
pub enum AtomicInventoryMutationError<E> {
    #[error("inventory lock busy: {}{}", .lock_path.display(), held_by(.holder))]
    LockBusy {
        lock_path: PathBuf,
        holder: Option<String>,
    },

    #[error("failed to acquire inventory lock {}: {source}", .lock_path.display())]
    LockIo {
        lock_path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Inventory(#[from] InventoryError),

    #[error("{0}")]
    Mutation(E),
}

fn held_by(holder: &Option<String>) -> String {
    holder
        .as_deref()
        .map(|h| format!(" (held by {h})"))
        .unwrap_or_default()
}

/// Load the inventory at `path` under its lock, hand it to `mutator`, and
/// write it back when the mutator changed anything.
///
/// A mutator error aborts without writing. A mutator that returns `Ok` after
/// a partial change still has that change saved, since every accepted write
/// bumps [`MemoryInventory::revision`].
pub fn mutate_inventory_jsonl<T, E, F>(
    path: impl AsRef<Path>,
    mutator: F,
) -> Result<T, AtomicInventoryMutationError<E>>
where
    F: FnOnce(&mut MemoryInventory) -> Result<T, E>,
{
    let path = path.as_ref();
    let _lock = InventoryLock::acquire(path)?;

    let mut inventory = MemoryInventory::load_jsonl(path)?;
    let value = mutator(&mut inventory).map_err(AtomicInventoryMutationError::Mutation)?;

    let writes = inventory.revision();
    if writes > 0 {
        inventory.save_jsonl(path)?;
        tracing::debug!(path = %path.display(), writes, "inventory mutation saved");
    } else {
        tracing::debug!(path = %path.display(), "inventory unchanged; skipped write");
    }
    Ok(value)
}

struct InventoryLock {
    lock_path: PathBuf,
    _file: File,
}

impl InventoryLock {
    fn acquire<E>(inventory_path: &Path) -> Result<Self, AtomicInventoryMutationError<E>> {
        let lock_path = inventory_lock_path(inventory_path);
        let lock_io = |source| AtomicInventoryMutationError::LockIo {
            lock_path: lock_path.clone(),
            source,
        };
        if let Some(parent) = lock_path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(lock_io)?;
        }

        let mut file = match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&lock_path)
        {
            Ok(file) => file,
            Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => {
                return Err(AtomicInventoryMutationError::LockBusy {
                    holder: read_holder(&lock_path),
                    lock_path,
                });
            }
            Err(err) => return Err(lock_io(err)),
        };
        let _ = write!(
            file,
            "pid={}\nutc={}\ninventory={}\n",
            std::process::id(),
            Utc::now().to_rfc3339(),
            inventory_path.display()
        );
        Ok(Self {
            lock_path,
            _file: file,
        })
    }
}

impl Drop for InventoryLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.lock_path);
    }
}

/// `pid=<n>` line of an existing lock file, if readable.
fn read_holder(lock_path: &Path) -> Option<String> {
    fs::read_to_string(lock_path)
        .ok()?
        .lines()
        .find(|line| line.starts_with("pid="))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{InventoryStore, Lookup, StoreError};
    use std::convert::Infallible;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_path(prefix: &str) -> PathBuf {
        let unique = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be after unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "sitekit-atomic-{prefix}-{}-{unique}.jsonl",
            std::process::id()
        ))
    }

    fn seed(path: &Path) {
        let mut inventory = MemoryInventory::new();
        inventory.add_status("Active").expect("seed status");
        inventory.save_jsonl(path).expect("seed write");
    }

    #[test]
    fn mutation_is_persisted_and_lock_released() {
        let path = temp_path("persist");
        seed(&path);

        let added = mutate_inventory_jsonl(&path, |inventory| {
            inventory.add_status("Planned").map(|s| s.name)
        })
        .expect("mutation should succeed");
        assert_eq!(added, "Planned");
        assert!(!inventory_lock_path(&path).exists());

        let reloaded = MemoryInventory::load_jsonl(&path).expect("reload");
        assert!(reloaded.find_status("Planned").expect("lookup").is_found());

        let _ = fs::remove_file(path);
    }

    #[test]
    fn read_only_mutation_leaves_file_untouched() {
        let path = temp_path("read-only");
        seed(&path);
        let before = fs::read_to_string(&path).expect("read");

        let found = mutate_inventory_jsonl(&path, |inventory| {
            Ok::<_, Infallible>(inventory.find_status("Active"))
        })
        .expect("mutation should succeed");
        assert!(matches!(found, Ok(Lookup::Found(_))));
        assert_eq!(before, fs::read_to_string(&path).expect("read"));

        let _ = fs::remove_file(path);
    }

    #[test]
    fn failed_mutation_discards_earlier_writes() {
        let path = temp_path("abort");
        seed(&path);

        let err = mutate_inventory_jsonl(&path, |inventory| {
            inventory.add_status("Planned")?;
            inventory.add_status("Active").map(|_| ())
        })
        .expect_err("duplicate status must fail");
        assert!(matches!(
            err,
            AtomicInventoryMutationError::Mutation(StoreError::Validation(_))
        ));

        let reloaded = MemoryInventory::load_jsonl(&path).expect("reload");
        assert!(!reloaded.find_status("Planned").expect("lookup").is_found());
        assert!(!inventory_lock_path(&path).exists());

        let _ = fs::remove_file(path);
    }

    #[test]
    fn busy_lock_names_its_holder() {
        let path = temp_path("busy");
        seed(&path);
        let lock_path = inventory_lock_path(&path);
        fs::write(&lock_path, "pid=4242\nutc=2026-01-01T00:00:00Z\n").expect("lock fixture");

        let err = mutate_inventory_jsonl(&path, |_| Ok::<_, Infallible>(()))
            .expect_err("busy lock must fail");
        match &err {
            AtomicInventoryMutationError::LockBusy { holder, .. } => {
                assert_eq!(holder.as_deref(), Some("pid=4242"));
            }
            other => panic!("expected busy lock, got {other:?}"),
        }
        let message = err.to_string();
        assert!(message.starts_with("inventory lock busy"));
        assert!(message.ends_with("(held by pid=4242)"));
        assert!(lock_path.exists());

        let _ = fs::remove_file(lock_path);
        let _ = fs::remove_file(path);
    }
}
