/// 경매 종료 스케줄러
/// 경매 id를 키로 하는 취소 가능한 타이머를 관리한다.
/// 같은 키로 다시 예약하면 기존 타이머는 취소되고 새 타이머로 교체된다.
// region:    --- Imports
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use tokio::task::AbortHandle;
use tokio::time::{sleep_until, Duration, Instant};
use tracing::debug;

// endregion: --- Imports

// 표현할 수 없을 만큼 먼 종료 시각의 상한 (약 30년)
const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);

// region:    --- Auction Scheduler
struct Timer {
    generation: u64,
    deadline: Instant,
    handle: AbortHandle,
}

/// 경매 종료 스케줄러
#[derive(Default)]
pub struct AuctionScheduler {
    timers: Mutex<HashMap<String, Timer>>,
    next_generation: AtomicU64,
}

impl AuctionScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// `delay` 후 `task(generation)` 실행 예약, 기존 타이머는 교체
    ///
    /// 실행되는 작업은 `take_if_current`로 자신이 아직 유효한 타이머인지 확인해야 한다.
    pub fn schedule<F, Fut>(&self, key: &str, delay: Duration, task: F) -> u64
    where
        F: FnOnce(u64) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed) + 1;
        let deadline = Instant::now()
            .checked_add(delay)
            .unwrap_or_else(|| Instant::now() + FAR_FUTURE);

        // 작업이 맵 등록 전에 실행되지 않도록 잠금을 잡은 채로 spawn
        let mut timers = self.timers();
        let handle = tokio::spawn(async move {
            sleep_until(deadline).await;
            task(generation).await;
        });

        let previous = timers.insert(
            key.to_string(),
            Timer {
                generation,
                deadline,
                handle: handle.abort_handle(),
            },
        );
        if let Some(previous) = previous {
            previous.handle.abort();
            debug!(
                "{:<12} --> 타이머 교체 key: {} (gen {} -> {})",
                "Scheduler", key, previous.generation, generation
            );
        }
        debug!(
            "{:<12} --> 타이머 예약 key: {} gen: {} delay: {:?}",
            "Scheduler", key, generation, delay
        );
        generation
    }

    /// 만료된 타이머가 여전히 현재 타이머라면 등록을 해제하고 true 반환
    pub fn take_if_current(&self, key: &str, generation: u64) -> bool {
        let mut timers = self.timers();
        match timers.get(key) {
            Some(timer) if timer.generation == generation => {
                timers.remove(key);
                true
            }
            _ => false,
        }
    }

    /// 예약된 타이머 취소
    pub fn cancel(&self, key: &str) -> bool {
        match self.timers().remove(key) {
            Some(timer) => {
                timer.handle.abort();
                debug!("{:<12} --> 타이머 취소 key: {}", "Scheduler", key);
                true
            }
            None => false,
        }
    }

    pub fn is_scheduled(&self, key: &str) -> bool {
        self.timers().contains_key(key)
    }

    pub fn deadline(&self, key: &str) -> Option<Instant> {
        self.timers().get(key).map(|timer| timer.deadline)
    }

    pub fn pending(&self) -> usize {
        self.timers().len()
    }

    fn timers(&self) -> MutexGuard<'_, HashMap<String, Timer>> {
        self.timers.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Drop for AuctionScheduler {
    fn drop(&mut self) {
        for timer in self.timers().values() {
            timer.handle.abort();
        }
    }
}
// endregion: --- Auction Scheduler
