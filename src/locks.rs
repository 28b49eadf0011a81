/// 키별 비동기 배타 잠금
/// 잡고 있거나 기다리는 쪽이 없는 키는 잠금 해제 시 맵에서 제거된다.
// region:    --- Imports
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

// endregion: --- Imports

// region:    --- Keyed Locks
#[derive(Default)]
pub struct KeyedLocks {
    entries: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl KeyedLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// 키에 대한 배타 구역 진입
    pub async fn lock(&self, key: &str) -> KeyedGuard<'_> {
        let lock = {
            let mut entries = self.entries();
            Arc::clone(entries.entry(key.to_string()).or_default())
        };
        let guard = lock.lock_owned().await;
        KeyedGuard {
            guard: Some(guard),
            owner: self,
            key: key.to_string(),
        }
    }

    /// 추적 중인 키 수
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, Arc<AsyncMutex<()>>>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

pub struct KeyedGuard<'a> {
    guard: Option<OwnedMutexGuard<()>>,
    owner: &'a KeyedLocks,
    key: String,
}

impl Drop for KeyedGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        // 맵만 참조하고 있으면 잡거나 기다리는 쪽이 없다
        let mut entries = self.owner.entries();
        if entries
            .get(&self.key)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            entries.remove(&self.key);
        }
    }
}
// endregion: --- Keyed Locks

#[cfg(test)]
mod tests {
    use super::*;

    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn released_keys_are_forgotten() {
        let locks = KeyedLocks::new();
        {
            let _a = locks.lock("a").await;
            let _b = locks.lock("b").await;
            assert_eq!(locks.len(), 2);
        }
        assert!(locks.is_empty());
    }

    #[tokio::test]
    async fn same_key_is_exclusive_and_waiters_keep_the_entry() {
        let locks = Arc::new(KeyedLocks::new());
        let guard = locks.lock("a").await;

        let waiter = {
            let locks = Arc::clone(&locks);
            tokio::spawn(async move {
                let _guard = locks.lock("a").await;
            })
        };
        settle().await;
        assert!(!waiter.is_finished());

        drop(guard);
        assert_eq!(locks.len(), 1);

        waiter.await.unwrap();
        assert!(locks.is_empty());
    }

    #[tokio::test]
    async fn different_keys_do_not_block() {
        let locks = KeyedLocks::new();
        let _a = locks.lock("a").await;
        let _b = locks.lock("b").await;
        assert_eq!(locks.len(), 2);
    }
}
