//! Per-symbol mutual exclusion for reconciliations

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type LockMap = Arc<Mutex<HashMap<String, Arc<AsyncMutex<()>>>>>;

/// Registry of one async lock per symbol.
///
/// Two reconciliations of the same symbol must not interleave their
/// read-decide-execute sequences; different symbols never contend.
/// Entries live only while a guard holds or waits on them.
#[derive(Debug, Default, Clone)]
pub struct SymbolLocks {
    locks: LockMap,
}

/// Exclusive access to one symbol, released on drop
#[derive(Debug)]
pub struct SymbolGuard {
    symbol: String,
    locks: LockMap,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for SymbolGuard {
    fn drop(&mut self) {
        self.guard.take();

        // Waiters clone the entry under the map lock, so a count of one
        // means nobody else holds or awaits it.
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        if locks
            .get(&self.symbol)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(&self.symbol);
        }
    }
}

impl SymbolLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `symbol`
    pub async fn acquire(&self, symbol: &str) -> SymbolGuard {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
            locks
                .entry(symbol.to_string())
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone()
        };
        SymbolGuard {
            symbol: symbol.to_string(),
            locks: self.locks.clone(),
            guard: Some(lock.lock_owned().await),
        }
    }

    /// Number of symbols currently locked or awaited
    pub fn len(&self) -> usize {
        self.locks.lock().map(|l| l.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
