/// 경매 생명주기 컨트롤러
/// 1. 생성 (pending)
/// 2. 시작 (active, 종료 타이머 예약)
/// 3. 연장 (종료 타이머 재예약)
/// 4. 종료 (ended, 낙찰자 결정 및 공지)
///
/// 같은 경매에 대한 모든 변경은 경매별 잠금 아래에서 직렬화된다.
// region:    --- Imports
use crate::auction::{parse_duration, Auction, AuctionEvent, AuctionStatus, UserId};
use crate::binder::ChannelBinder;
use crate::clock::Clock;
use crate::error::AuctionError;
use crate::locks::{KeyedGuard, KeyedLocks};
use crate::scheduler::AuctionScheduler;
use crate::store::AuctionStore;
use chrono::{DateTime, Utc};
use std::sync::{Arc, OnceLock, Weak};
use tokio::time::Duration;
use tracing::{debug, error, info, warn};

// endregion: --- Imports

// region:    --- Modules
mod bidding;

pub use bidding::reaction_offer;
// endregion: --- Modules

// 저장 실패로 종료하지 못한 경매의 재시도 간격
const RESOLVE_RETRY_DELAY: Duration = Duration::from_secs(30);

// region:    --- Auction Controller
/// 경매 생명주기 컨트롤러
pub struct AuctionController {
    store: Arc<dyn AuctionStore>,
    binder: Arc<dyn ChannelBinder>,
    clock: Arc<dyn Clock>,
    scheduler: AuctionScheduler,
    locks: KeyedLocks,
    bot_user: OnceLock<UserId>,
    me: Weak<AuctionController>,
}

impl AuctionController {
    pub fn new(
        store: Arc<dyn AuctionStore>,
        binder: Arc<dyn ChannelBinder>,
        clock: Arc<dyn Clock>,
    ) -> Arc<Self> {
        Arc::new_cyclic(|me| Self {
            store,
            binder,
            clock,
            scheduler: AuctionScheduler::new(),
            locks: KeyedLocks::new(),
            bot_user: OnceLock::new(),
            me: me.clone(),
        })
    }

    /// 봇 자신의 사용자 id 등록 (반응 입찰 필터링용)
    pub fn set_bot_user(&self, user: UserId) {
        if self.bot_user.set(user).is_err() {
            debug!("{:<12} --> 봇 사용자 id 이미 등록됨", "Lifecycle");
        }
    }

    pub fn scheduler(&self) -> &AuctionScheduler {
        &self.scheduler
    }

    pub async fn get(&self, auction_id: &str) -> Option<Auction> {
        self.store.get(auction_id).await
    }

    /// 1. 경매 생성
    pub async fn create(
        &self,
        creator: UserId,
        title: &str,
        description: &str,
        guild_id: Option<u64>,
    ) -> Result<Auction, AuctionError> {
        info!("{:<12} --> 경매 생성 요청: {} by {}", "Lifecycle", title, creator);
        let channel_id = self
            .binder
            .create_ticket_channel(guild_id, creator, title)
            .await?;

        let auction = Auction::new(channel_id, creator, title, description, guild_id);
        self.store.put(auction.clone()).await?;

        if let Err(e) = self.binder.announce_created(&auction).await {
            warn!("{:<12} --> 경매 생성 공지 실패: {}", "Lifecycle", e);
        }
        info!("{:<12} --> 경매 생성 완료 id: {}", "Lifecycle", auction.id);
        Ok(auction)
    }

    /// 2. 경매 시작
    pub async fn start(
        &self,
        auction_id: &str,
        duration_text: &str,
    ) -> Result<AuctionEvent, AuctionError> {
        let duration = parse_duration(duration_text)?;
        let _guard = self.lock(auction_id).await;

        let mut auction = self
            .store
            .get(auction_id)
            .await
            .ok_or_else(|| AuctionError::NotFound(format!("auction {}", auction_id)))?;
        if auction.status == AuctionStatus::Ended {
            return Err(AuctionError::AlreadyEnded(auction_id.to_string()));
        }

        let end_time = self
            .clock
            .now()
            .checked_add_signed(duration)
            .ok_or_else(|| AuctionError::InvalidDuration(duration_text.to_string()))?;
        auction.status = AuctionStatus::Active;
        auction.end_time = Some(end_time);
        self.store.put(auction.clone()).await?;

        let role_warning = match self.binder.grant_participant_access(&auction).await {
            Ok(()) => None,
            Err(e) => {
                warn!("{:<12} --> 참여자 권한 부여 실패: {}", "Lifecycle", e);
                Some(e.to_string())
            }
        };

        self.schedule_resolution(auction_id, end_time);

        if let Err(e) = self.binder.announce_started(&auction, duration_text).await {
            warn!("{:<12} --> 경매 시작 공지 실패: {}", "Lifecycle", e);
        }
        info!(
            "{:<12} --> 경매 시작 id: {} 종료: {}",
            "Lifecycle", auction_id, end_time
        );
        Ok(AuctionEvent::Started {
            auction_id: auction_id.to_string(),
            end_time,
            role_warning,
        })
    }

    /// 3. 경매 연장
    pub async fn extend(
        &self,
        auction_id: &str,
        duration_text: &str,
    ) -> Result<AuctionEvent, AuctionError> {
        let _guard = self.lock(auction_id).await;

        let mut auction = self
            .store
            .get(auction_id)
            .await
            .ok_or_else(|| AuctionError::NotFound(format!("auction {}", auction_id)))?;
        if !auction.is_active() {
            return Err(AuctionError::NotActive(auction_id.to_string()));
        }
        let duration = parse_duration(duration_text)?;

        let end_time = auction
            .end_time
            .unwrap_or_else(|| self.clock.now())
            .checked_add_signed(duration)
            .ok_or_else(|| AuctionError::InvalidDuration(duration_text.to_string()))?;
        auction.end_time = Some(end_time);
        self.store.put(auction.clone()).await?;

        self.schedule_resolution(auction_id, end_time);

        if let Err(e) = self.binder.announce_extended(&auction, duration_text).await {
            warn!("{:<12} --> 경매 연장 공지 실패: {}", "Lifecycle", e);
        }
        info!(
            "{:<12} --> 경매 연장 id: {} 새 종료: {}",
            "Lifecycle", auction_id, end_time
        );
        Ok(AuctionEvent::Extended {
            auction_id: auction_id.to_string(),
            end_time,
        })
    }

    /// 4. 경매 강제 종료 (예약된 타이머 취소)
    ///
    /// 활성 상태가 아니면 아무 것도 하지 않고 `None`을 반환한다.
    pub async fn resolve(&self, auction_id: &str) -> Result<Option<AuctionEvent>, AuctionError> {
        let _guard = self.lock(auction_id).await;
        self.scheduler.cancel(auction_id);
        self.resolve_locked(auction_id).await
    }

    /// 재시작 후 활성 경매의 타이머 복구, 복구된 경매 수 반환
    pub async fn restore_timers(&self) -> usize {
        let now = self.clock.now();
        let mut restored = 0;

        for auction in self.store.list_all().await {
            if !auction.is_active() {
                continue;
            }
            match auction.end_time {
                Some(end_time) if end_time > now => {
                    self.schedule_resolution(&auction.id, end_time);
                }
                _ => {
                    info!(
                        "{:<12} --> 종료 시각이 지난 경매 즉시 종료 id: {}",
                        "Lifecycle", auction.id
                    );
                    if let Err(e) = self.resolve(&auction.id).await {
                        error!("{:<12} --> 경매 종료 실패 id: {}: {}", "Lifecycle", auction.id, e);
                    }
                }
            }
            restored += 1;
        }

        info!("{:<12} --> 활성 경매 {}건 복구", "Lifecycle", restored);
        restored
    }

    /// 종료 타이머 예약 (기존 타이머 교체)
    fn schedule_resolution(&self, auction_id: &str, end_time: DateTime<Utc>) {
        let delay = (end_time - self.clock.now())
            .to_std()
            .unwrap_or(Duration::ZERO);
        self.schedule_after(auction_id, delay);
    }

    fn schedule_after(&self, auction_id: &str, delay: Duration) {
        let me = self.me.clone();
        let key = auction_id.to_string();
        self.scheduler.schedule(auction_id, delay, move |generation| async move {
            if let Some(controller) = me.upgrade() {
                controller.resolve_on_timer(&key, generation).await;
            }
        });
    }

    /// 타이머 만료에 의한 종료
    async fn resolve_on_timer(&self, auction_id: &str, generation: u64) {
        let _guard = self.lock(auction_id).await;
        if !self.scheduler.take_if_current(auction_id, generation) {
            debug!(
                "{:<12} --> 교체된 타이머 무시 id: {} gen: {}",
                "Lifecycle", auction_id, generation
            );
            return;
        }

        match self.resolve_locked(auction_id).await {
            Ok(_) => {}
            Err(AuctionError::Persistence(e)) => {
                error!(
                    "{:<12} --> 경매 종료 저장 실패, {:?} 후 재시도 id: {}: {}",
                    "Lifecycle", RESOLVE_RETRY_DELAY, auction_id, e
                );
                self.schedule_after(auction_id, RESOLVE_RETRY_DELAY);
            }
            Err(e) => error!("{:<12} --> 경매 종료 실패 id: {}: {}", "Lifecycle", auction_id, e),
        }
    }

    /// 종료 처리 (경매별 잠금을 잡은 상태에서 호출)
    async fn resolve_locked(&self, auction_id: &str) -> Result<Option<AuctionEvent>, AuctionError> {
        let mut auction = self
            .store
            .get(auction_id)
            .await
            .ok_or_else(|| AuctionError::NotFound(format!("auction {}", auction_id)))?;
        if !auction.is_active() {
            debug!(
                "{:<12} --> 이미 종료되었거나 시작되지 않은 경매 id: {}",
                "Lifecycle", auction_id
            );
            return Ok(None);
        }

        auction.status = AuctionStatus::Ended;
        self.store.put(auction.clone()).await?;

        if let Err(e) = self.binder.revoke_participant_access(&auction).await {
            warn!("{:<12} --> 참여자 권한 회수 실패: {}", "Lifecycle", e);
        }

        let winner = auction.winning_bid().cloned();
        let transaction_channel = match &winner {
            Some(bid) => match self.binder.open_transaction_channel(&auction, bid).await {
                Ok(channel_id) => Some(channel_id),
                Err(e) => {
                    warn!("{:<12} --> 거래 채널 생성 실패: {}", "Lifecycle", e);
                    None
                }
            },
            None => None,
        };

        if let Err(e) = self
            .binder
            .announce_result(&auction, winner.as_ref(), transaction_channel.as_deref())
            .await
        {
            warn!("{:<12} --> 경매 결과 공지 실패: {}", "Lifecycle", e);
        }

        info!(
            "{:<12} --> 경매 종료 id: {} 낙찰자: {:?}",
            "Lifecycle",
            auction_id,
            winner.as_ref().map(|bid| bid.bidder)
        );
        Ok(Some(AuctionEvent::Ended {
            auction_id: auction_id.to_string(),
            winner,
            transaction_channel,
        }))
    }

    /// 경매별 배타 구역
    async fn lock(&self, auction_id: &str) -> KeyedGuard<'_> {
        self.locks.lock(auction_id).await
    }

    #[cfg(test)]
    pub(crate) fn held_locks(&self) -> usize {
        self.locks.len()
    }
}
// endregion: --- Auction Controller
