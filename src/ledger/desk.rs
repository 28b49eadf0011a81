/// 원장 경매 창구
/// 1. 경매 등록 및 종료 타이머 예약 (재시작 시 복구)
/// 2. 금액 입찰 (현재가, 잔액 검증)
/// 3. 잔액 조회 / 충전
/// 4. 종료 및 정산 (낙찰자 차감 후 판매자 지급)
///
/// 같은 경매의 종료는 경매별 잠금 아래에서 한 번만 정산된다.
// region:    --- Imports
use super::model::{LedgerAuction, NewLedgerAuction};
use super::Ledger;
use crate::auction::UserId;
use crate::binder::ChannelBinder;
use crate::clock::Clock;
use crate::error::AuctionError;
use crate::locks::KeyedLocks;
use crate::scheduler::AuctionScheduler;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, Weak};
use tokio::time::Duration;
use tracing::{error, info, warn};

// endregion: --- Imports

// region:    --- Ledger Desk
/// 원장 경매 창구
pub struct LedgerDesk {
    ledger: Arc<dyn Ledger>,
    binder: Arc<dyn ChannelBinder>,
    clock: Arc<dyn Clock>,
    scheduler: AuctionScheduler,
    announce_channel: Option<String>,
    locks: KeyedLocks,
    // 종료 처리를 마친 경매 id
    finished: Mutex<HashSet<String>>,
    me: Weak<LedgerDesk>,
}

impl LedgerDesk {
    pub fn new(
        ledger: Arc<dyn Ledger>,
        binder: Arc<dyn ChannelBinder>,
        clock: Arc<dyn Clock>,
        announce_channel: Option<String>,
    ) -> Arc<Self> {
        Arc::new_cyclic(|me| Self {
            ledger,
            binder,
            clock,
            scheduler: AuctionScheduler::new(),
            announce_channel,
            locks: KeyedLocks::new(),
            finished: Mutex::new(HashSet::new()),
            me: me.clone(),
        })
    }

    pub fn scheduler(&self) -> &AuctionScheduler {
        &self.scheduler
    }

    /// 1. 경매 등록
    pub async fn open(
        &self,
        seller: UserId,
        item: &str,
        starting_price: i64,
        minutes: i64,
        image_url: Option<String>,
        reply_channel: &str,
    ) -> Result<LedgerAuction, AuctionError> {
        if starting_price <= 0 {
            return Err(AuctionError::InvalidAmount(starting_price.to_string()));
        }
        if minutes <= 0 {
            return Err(AuctionError::InvalidDuration(format!("{}m", minutes)));
        }

        let created = self
            .ledger
            .create_auction(&NewLedgerAuction {
                item: item.to_string(),
                seller_id: seller,
                starting_price,
                duration_minutes: minutes,
                image_url,
            })
            .await
            .ok_or_else(|| AuctionError::RemoteServiceUnavailable("create_auction".to_string()))?;

        let delay = Duration::from_secs((minutes as u64).saturating_mul(60));
        self.schedule_finish(&created.id, delay, Some(self.announce_channel(reply_channel)));

        info!(
            "{:<12} --> 원장 경매 등록 id: {} item: {} price: {}",
            "Ledger", created.id, created.item, created.starting_price
        );
        Ok(created)
    }

    /// 1. 재시작 후 진행 중인 원장 경매의 종료 타이머 복구, 복구된 경매 수 반환
    ///
    /// 종료 시각이 지난 경매는 즉시 종료된다.
    pub async fn restore_timers(&self) -> usize {
        let now = self.clock.now();
        let mut restored = 0;

        for auction in self.active_auctions().await {
            let Some(end_time) = auction.end_time else {
                warn!(
                    "{:<12} --> 종료 시각 없는 원장 경매 id: {}",
                    "Ledger", auction.id
                );
                continue;
            };
            let delay = (end_time - now).to_std().unwrap_or(Duration::ZERO);
            self.schedule_finish(&auction.id, delay, self.announce_channel.clone());
            restored += 1;
        }

        info!("{:<12} --> 원장 경매 {}건 복구", "Ledger", restored);
        restored
    }

    /// 2. 금액 입찰
    pub async fn place_bid(
        &self,
        bidder: UserId,
        auction_id: &str,
        amount: i64,
    ) -> Result<LedgerAuction, AuctionError> {
        if amount <= 0 {
            return Err(AuctionError::InvalidAmount(amount.to_string()));
        }

        let auction = self
            .ledger
            .get_auction(auction_id)
            .await
            .ok_or_else(|| AuctionError::NotFound(format!("auction {}", auction_id)))?;
        if !auction.is_active() {
            return Err(AuctionError::NotActive(auction_id.to_string()));
        }
        if amount <= auction.current_price {
            return Err(AuctionError::BidTooLow {
                amount,
                current_price: auction.current_price,
            });
        }

        // 원장 장애 시 잔액은 0으로 취급되어 입찰이 거절된다
        let balance = self.ledger.get_balance(bidder).await;
        if amount > balance {
            return Err(AuctionError::InsufficientFunds { amount, balance });
        }

        if !self.ledger.place_bid(auction_id, bidder, amount).await {
            return Err(AuctionError::RemoteServiceUnavailable("place_bid".to_string()));
        }

        info!(
            "{:<12} --> 원장 입찰 id: {} bidder: {} amount: {}",
            "Ledger", auction_id, bidder, amount
        );
        Ok(LedgerAuction {
            current_price: amount,
            highest_bidder: Some(bidder),
            ..auction
        })
    }

    /// 3. 잔액 조회
    pub async fn balance(&self, user: UserId) -> i64 {
        self.ledger.get_balance(user).await
    }

    /// 3. 잔액 충전, 충전 후 잔액 반환
    pub async fn add_funds(&self, user: UserId, amount: i64) -> Result<i64, AuctionError> {
        if amount <= 0 {
            return Err(AuctionError::InvalidAmount(amount.to_string()));
        }
        if !self.ledger.adjust_balance(user, amount).await {
            return Err(AuctionError::RemoteServiceUnavailable("update_balance".to_string()));
        }
        if !self
            .ledger
            .record_transaction(user, amount, "deposit", "Added funds")
            .await
        {
            warn!("{:<12} --> 충전 거래 기록 실패 user: {}", "Ledger", user);
        }
        Ok(self.ledger.get_balance(user).await)
    }

    pub async fn active_auctions(&self) -> Vec<LedgerAuction> {
        self.ledger
            .list_auctions()
            .await
            .into_iter()
            .filter(LedgerAuction::is_active)
            .collect()
    }

    /// 4. 강제 종료 (예약된 타이머 취소)
    pub async fn force_end(
        &self,
        auction_id: &str,
        reply_channel: &str,
    ) -> Result<LedgerAuction, AuctionError> {
        self.scheduler.cancel(&timer_key(auction_id));
        let channel = self.announce_channel(reply_channel);
        self.finish(auction_id, Some(&channel)).await
    }

    /// 종료 타이머 예약 (기존 타이머 교체)
    fn schedule_finish(&self, auction_id: &str, delay: Duration, channel: Option<String>) {
        let me = self.me.clone();
        let auction_id = auction_id.to_string();
        self.scheduler
            .schedule(&timer_key(&auction_id), delay, move |generation| async move {
                let Some(desk) = me.upgrade() else {
                    return;
                };
                if !desk.scheduler.take_if_current(&timer_key(&auction_id), generation) {
                    return;
                }
                if let Err(e) = desk.finish(&auction_id, channel.as_deref()).await {
                    error!("{:<12} --> 원장 경매 종료 실패 id: {}: {}", "Ledger", auction_id, e);
                }
            });
    }

    /// 4. 종료 및 정산
    ///
    /// 정산에 실패해도 경매는 종료된 상태로 남고 다시 정산하지 않는다.
    async fn finish(
        &self,
        auction_id: &str,
        channel: Option<&str>,
    ) -> Result<LedgerAuction, AuctionError> {
        let _guard = self.locks.lock(auction_id).await;
        if self.is_finished(auction_id) {
            return Err(AuctionError::NotActive(auction_id.to_string()));
        }
        match self.ledger.get_auction(auction_id).await {
            Some(auction) if !auction.is_active() => {
                return Err(AuctionError::NotActive(auction_id.to_string()));
            }
            _ => {}
        }

        let ended = self
            .ledger
            .end_auction(auction_id)
            .await
            .ok_or_else(|| AuctionError::RemoteServiceUnavailable("end_auction".to_string()))?;
        self.mark_finished(auction_id);

        let settlement = match ended.highest_bidder {
            Some(winner) => self.settle(&ended, winner).await,
            None => Ok(()),
        };

        if let Some(channel) = channel {
            let mut notice = ledger_result_summary(&ended);
            if settlement.is_err() {
                notice.push_str(SETTLEMENT_FAILED_NOTICE);
            }
            if let Err(e) = self.binder.say(channel, &notice).await {
                warn!("{:<12} --> 원장 경매 결과 공지 실패: {}", "Ledger", e);
            }
        }
        info!(
            "{:<12} --> 원장 경매 종료 id: {} 낙찰자: {:?}",
            "Ledger", ended.id, ended.highest_bidder
        );
        settlement.map(|()| ended)
    }

    /// 낙찰자 차감이 성공해야 판매자에게 지급한다.
    /// 판매자 지급이 실패하면 낙찰자에게 환불한다.
    async fn settle(&self, auction: &LedgerAuction, winner: UserId) -> Result<(), AuctionError> {
        let price = auction.current_price;
        let unavailable = || {
            AuctionError::RemoteServiceUnavailable(format!("settlement of auction {}", auction.id))
        };

        if !self.ledger.adjust_balance(winner, -price).await {
            error!(
                "{:<12} --> 낙찰자 차감 실패, 정산 중단 user: {} auction: {}",
                "Ledger", winner, auction.id
            );
            return Err(unavailable());
        }
        self.record(
            winner,
            price,
            "auction_win",
            format!("Won auction {}: {}", auction.id, auction.item),
        )
        .await;

        if !self.ledger.adjust_balance(auction.seller_id, price).await {
            error!(
                "{:<12} --> 판매자 지급 실패 user: {} auction: {}",
                "Ledger", auction.seller_id, auction.id
            );
            if self.ledger.adjust_balance(winner, price).await {
                self.record(
                    winner,
                    price,
                    "auction_refund",
                    format!("Refund for auction {}: {}", auction.id, auction.item),
                )
                .await;
            } else {
                error!(
                    "{:<12} --> 낙찰자 환불 실패, 수동 정산 필요 user: {} amount: {} auction: {}",
                    "Ledger", winner, price, auction.id
                );
            }
            return Err(unavailable());
        }
        self.record(
            auction.seller_id,
            price,
            "auction_sale",
            format!("Sold auction {}: {}", auction.id, auction.item),
        )
        .await;
        Ok(())
    }

    async fn record(&self, user: UserId, amount: i64, kind: &str, description: String) {
        if !self
            .ledger
            .record_transaction(user, amount, kind, &description)
            .await
        {
            warn!("{:<12} --> 정산 거래 기록 실패 user: {} type: {}", "Ledger", user, kind);
        }
    }

    fn is_finished(&self, auction_id: &str) -> bool {
        self.finished
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(auction_id)
    }

    fn mark_finished(&self, auction_id: &str) {
        self.finished
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(auction_id.to_string());
    }

    fn announce_channel(&self, reply_channel: &str) -> String {
        self.announce_channel
            .clone()
            .unwrap_or_else(|| reply_channel.to_string())
    }
}

fn timer_key(auction_id: &str) -> String {
    format!("ledger:{}", auction_id)
}
// endregion: --- Ledger Desk

const SETTLEMENT_FAILED_NOTICE: &str =
    "\n⚠️ Settlement could not be completed, please contact an admin.";

/// 원장 경매 결과 문구
pub fn ledger_result_summary(auction: &LedgerAuction) -> String {
    match auction.highest_bidder {
        Some(winner) => format!(
            "🏆 Auction {} ended: <@{}> won **{}** for {} coins",
            auction.id, winner, auction.item, auction.current_price
        ),
        None => format!(
            "⏰ Auction {} ended: **{}** received no bids.",
            auction.id, auction.item
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binder::{BinderCall, RecordingBinder};
    use crate::clock::ManualClock;
    use async_trait::async_trait;
    use chrono::{DateTime, Duration as ChronoDuration, TimeZone, Utc};
    use std::collections::HashMap;

    const SELLER: UserId = 1;
    const ALICE: UserId = 2;
    const BOB: UserId = 3;

    /// 메모리 원장
    #[derive(Default)]
    struct FakeLedger {
        balances: Mutex<HashMap<UserId, i64>>,
        auctions: Mutex<HashMap<String, LedgerAuction>>,
        transactions: Mutex<Vec<(UserId, i64, String)>>,
        down: bool,
        // 경매 조회가 여러 번 양보하며 느리게 응답
        slow: bool,
        // 이 사용자의 잔액 변경은 거절
        rejected: Option<UserId>,
    }

    impl FakeLedger {
        fn with_balances(balances: &[(UserId, i64)]) -> Self {
            let ledger = Self::default();
            ledger.balances.lock().unwrap().extend(balances.iter().copied());
            ledger
        }

        fn down() -> Self {
            Self {
                down: true,
                ..Self::default()
            }
        }

        fn balance_of(&self, user: UserId) -> i64 {
            self.balances.lock().unwrap().get(&user).copied().unwrap_or(0)
        }

        fn transactions(&self) -> Vec<(UserId, i64, String)> {
            self.transactions.lock().unwrap().clone()
        }

        fn status_of(&self, auction_id: &str) -> String {
            self.auctions.lock().unwrap()[auction_id].status.clone()
        }

        fn insert(&self, id: &str, end_time: Option<DateTime<Utc>>, status: &str) {
            self.auctions.lock().unwrap().insert(
                id.to_string(),
                LedgerAuction {
                    id: id.to_string(),
                    item: format!("Item {}", id),
                    seller_id: SELLER,
                    starting_price: 10,
                    current_price: 10,
                    highest_bidder: None,
                    image_url: None,
                    end_time,
                    status: status.to_string(),
                },
            );
        }
    }

    #[async_trait]
    impl Ledger for FakeLedger {
        async fn get_balance(&self, user_id: UserId) -> i64 {
            if self.down {
                return 0;
            }
            self.balance_of(user_id)
        }

        async fn adjust_balance(&self, user_id: UserId, delta: i64) -> bool {
            if self.down || self.rejected == Some(user_id) {
                return false;
            }
            *self.balances.lock().unwrap().entry(user_id).or_default() += delta;
            true
        }

        async fn record_transaction(
            &self,
            user_id: UserId,
            amount: i64,
            kind: &str,
            _description: &str,
        ) -> bool {
            if self.down {
                return false;
            }
            self.transactions
                .lock()
                .unwrap()
                .push((user_id, amount, kind.to_string()));
            true
        }

        async fn create_auction(&self, auction: &NewLedgerAuction) -> Option<LedgerAuction> {
            if self.down {
                return None;
            }
            let mut auctions = self.auctions.lock().unwrap();
            let created = LedgerAuction {
                id: (auctions.len() + 1).to_string(),
                item: auction.item.clone(),
                seller_id: auction.seller_id,
                starting_price: auction.starting_price,
                current_price: auction.starting_price,
                highest_bidder: None,
                image_url: auction.image_url.clone(),
                end_time: None,
                status: "active".to_string(),
            };
            auctions.insert(created.id.clone(), created.clone());
            Some(created)
        }

        async fn get_auction(&self, auction_id: &str) -> Option<LedgerAuction> {
            if self.down {
                return None;
            }
            if self.slow {
                for _ in 0..20 {
                    tokio::task::yield_now().await;
                }
            }
            self.auctions.lock().unwrap().get(auction_id).cloned()
        }

        async fn list_auctions(&self) -> Vec<LedgerAuction> {
            if self.down {
                return Vec::new();
            }
            self.auctions.lock().unwrap().values().cloned().collect()
        }

        async fn place_bid(&self, auction_id: &str, user_id: UserId, amount: i64) -> bool {
            if self.down {
                return false;
            }
            match self.auctions.lock().unwrap().get_mut(auction_id) {
                Some(auction) => {
                    auction.current_price = amount;
                    auction.highest_bidder = Some(user_id);
                    true
                }
                None => false,
            }
        }

        async fn end_auction(&self, auction_id: &str) -> Option<LedgerAuction> {
            if self.down {
                return None;
            }
            let mut auctions = self.auctions.lock().unwrap();
            let auction = auctions.get_mut(auction_id)?;
            auction.status = "ended".to_string();
            Some(auction.clone())
        }
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
    }

    fn desk(ledger: FakeLedger) -> (Arc<LedgerDesk>, Arc<FakeLedger>, Arc<RecordingBinder>) {
        let ledger = Arc::new(ledger);
        let binder = Arc::new(RecordingBinder::new());
        let desk = LedgerDesk::new(
            ledger.clone(),
            binder.clone(),
            Arc::new(ManualClock::new(t0())),
            Some("announce".to_string()),
        );
        (desk, ledger, binder)
    }

    async fn settle() {
        for _ in 0..100 {
            tokio::task::yield_now().await;
        }
    }

    fn said(binder: &RecordingBinder) -> Vec<String> {
        binder
            .calls()
            .into_iter()
            .filter_map(|call| match call {
                BinderCall::Said { content, .. } => Some(content),
                _ => None,
            })
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn bid_must_beat_current_price_and_fit_balance() {
        let (desk, _ledger, _binder) = desk(FakeLedger::with_balances(&[(ALICE, 500), (BOB, 50)]));
        let auction = desk
            .open(SELLER, "Golden Cup", 100, 10, None, "general")
            .await
            .unwrap();

        assert!(matches!(
            desk.place_bid(ALICE, &auction.id, 100).await,
            Err(AuctionError::BidTooLow { current_price: 100, .. })
        ));
        assert!(matches!(
            desk.place_bid(ALICE, &auction.id, 600).await,
            Err(AuctionError::InsufficientFunds { balance: 500, .. })
        ));
        assert!(matches!(
            desk.place_bid(ALICE, &auction.id, -5).await,
            Err(AuctionError::InvalidAmount(_))
        ));

        let updated = desk.place_bid(ALICE, &auction.id, 150).await.unwrap();
        assert_eq!(updated.current_price, 150);
        assert_eq!(updated.highest_bidder, Some(ALICE));

        assert!(matches!(
            desk.place_bid(BOB, &auction.id, 160).await,
            Err(AuctionError::InsufficientFunds { .. })
        ));
        assert!(matches!(
            desk.place_bid(BOB, "404", 10).await,
            Err(AuctionError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn downed_ledger_rejects_bids_instead_of_failing() {
        let (desk, _ledger, _binder) = desk(FakeLedger::down());

        assert_eq!(desk.balance(ALICE).await, 0);
        assert!(desk.active_auctions().await.is_empty());
        assert!(desk.place_bid(ALICE, "1", 10).await.is_err());
        assert!(matches!(
            desk.add_funds(ALICE, 10).await,
            Err(AuctionError::RemoteServiceUnavailable(_))
        ));
        assert!(matches!(
            desk.open(SELLER, "Cup", 10, 5, None, "general").await,
            Err(AuctionError::RemoteServiceUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn add_funds_credits_and_records_deposit() {
        let (desk, ledger, _binder) = desk(FakeLedger::with_balances(&[(ALICE, 5)]));
        assert_eq!(desk.add_funds(ALICE, 20).await.unwrap(), 25);
        assert!(matches!(
            desk.add_funds(ALICE, 0).await,
            Err(AuctionError::InvalidAmount(_))
        ));
        assert_eq!(
            ledger.transactions(),
            vec![(ALICE, 20, "deposit".to_string())]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn timer_ends_auction_and_settles_highest_bid() {
        let (desk, ledger, binder) = desk(FakeLedger::with_balances(&[(ALICE, 500), (BOB, 500)]));
        let auction = desk
            .open(SELLER, "Golden Cup", 100, 2, None, "general")
            .await
            .unwrap();
        desk.place_bid(ALICE, &auction.id, 150).await.unwrap();
        desk.place_bid(BOB, &auction.id, 200).await.unwrap();
        assert_eq!(desk.active_auctions().await.len(), 1);

        tokio::time::advance(Duration::from_secs(121)).await;
        for _ in 0..50 {
            tokio::task::yield_now().await;
        }

        assert!(desk.active_auctions().await.is_empty());
        assert_eq!(ledger.balance_of(BOB), 300);
        assert_eq!(ledger.balance_of(ALICE), 500);
        assert_eq!(ledger.balance_of(SELLER), 200);
        assert_eq!(
            binder.calls(),
            vec![BinderCall::Said {
                channel_id: "announce".to_string(),
                content: format!("🏆 Auction 1 ended: <@{}> won **Golden Cup** for 200 coins", BOB),
            }]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn force_end_cancels_timer_and_is_not_repeatable() {
        let (desk, ledger, binder) = desk(FakeLedger::default());
        let auction = desk
            .open(SELLER, "Old Boot", 10, 30, None, "general")
            .await
            .unwrap();

        let ended = desk.force_end(&auction.id, "general").await.unwrap();
        assert_eq!(ended.highest_bidder, None);
        assert!(!desk.scheduler().is_scheduled("ledger:1"));
        assert!(matches!(
            desk.force_end(&auction.id, "general").await,
            Err(AuctionError::NotActive(_))
        ));
        assert!(ledger.transactions().is_empty());
        assert_eq!(binder.calls().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn force_end_racing_the_timer_settles_once() {
        let ledger = FakeLedger {
            slow: true,
            ..FakeLedger::with_balances(&[(ALICE, 300)])
        };
        let (desk, ledger, binder) = desk(ledger);
        let auction = desk
            .open(SELLER, "Golden Cup", 100, 1, None, "general")
            .await
            .unwrap();
        desk.place_bid(ALICE, &auction.id, 200).await.unwrap();

        // 타이머가 종료 처리 중일 때 강제 종료
        tokio::time::advance(Duration::from_secs(60)).await;
        tokio::task::yield_now().await;
        tokio::task::yield_now().await;
        assert!(matches!(
            desk.force_end(&auction.id, "general").await,
            Err(AuctionError::NotActive(_))
        ));
        settle().await;

        assert_eq!(ledger.balance_of(ALICE), 100);
        assert_eq!(ledger.balance_of(SELLER), 200);
        assert_eq!(
            ledger.transactions(),
            vec![
                (ALICE, 200, "auction_win".to_string()),
                (SELLER, 200, "auction_sale".to_string()),
            ]
        );
        assert_eq!(said(&binder).len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_winner_debit_pays_nothing_to_seller() {
        let ledger = FakeLedger {
            rejected: Some(ALICE),
            ..FakeLedger::with_balances(&[(ALICE, 500)])
        };
        let (desk, ledger, binder) = desk(ledger);
        let auction = desk
            .open(SELLER, "Golden Cup", 100, 10, None, "general")
            .await
            .unwrap();
        desk.place_bid(ALICE, &auction.id, 200).await.unwrap();

        assert!(matches!(
            desk.force_end(&auction.id, "general").await,
            Err(AuctionError::RemoteServiceUnavailable(_))
        ));
        assert_eq!(ledger.balance_of(ALICE), 500);
        assert_eq!(ledger.balance_of(SELLER), 0);
        assert!(ledger.transactions().is_empty());
        assert_eq!(ledger.status_of(&auction.id), "ended");

        let notices = said(&binder);
        assert_eq!(notices.len(), 1);
        assert!(notices[0].starts_with(&format!("🏆 Auction 1 ended: <@{}>", ALICE)));
        assert!(notices[0].ends_with(SETTLEMENT_FAILED_NOTICE));

        // 종료된 경매는 다시 정산하지 않는다
        assert!(matches!(
            desk.force_end(&auction.id, "general").await,
            Err(AuctionError::NotActive(_))
        ));
        assert_eq!(said(&binder).len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_seller_credit_refunds_winner() {
        let ledger = FakeLedger {
            rejected: Some(SELLER),
            ..FakeLedger::with_balances(&[(ALICE, 500)])
        };
        let (desk, ledger, _binder) = desk(ledger);
        let auction = desk
            .open(SELLER, "Golden Cup", 100, 10, None, "general")
            .await
            .unwrap();
        desk.place_bid(ALICE, &auction.id, 200).await.unwrap();

        assert!(desk.force_end(&auction.id, "general").await.is_err());
        assert_eq!(ledger.balance_of(ALICE), 500);
        assert_eq!(ledger.balance_of(SELLER), 0);
        assert_eq!(
            ledger.transactions(),
            vec![
                (ALICE, 200, "auction_win".to_string()),
                (ALICE, 200, "auction_refund".to_string()),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn restore_timers_reschedules_listed_auctions() {
        let ledger = FakeLedger::default();
        ledger.insert("1", Some(t0() + ChronoDuration::minutes(10)), "active");
        ledger.insert("2", Some(t0() - ChronoDuration::minutes(1)), "active");
        ledger.insert("3", None, "active");
        ledger.insert("4", Some(t0() + ChronoDuration::minutes(5)), "ended");
        let (desk, ledger, binder) = desk(ledger);

        assert_eq!(desk.restore_timers().await, 2);
        settle().await;

        // 종료 시각이 지난 경매는 바로 종료
        assert_eq!(ledger.status_of("2"), "ended");
        assert_eq!(ledger.status_of("1"), "active");
        assert!(desk.scheduler().is_scheduled("ledger:1"));
        assert!(!desk.scheduler().is_scheduled("ledger:3"));
        assert!(!desk.scheduler().is_scheduled("ledger:4"));

        tokio::time::advance(Duration::from_secs(600)).await;
        settle().await;
        assert_eq!(ledger.status_of("1"), "ended");
        assert_eq!(
            binder.calls(),
            vec![
                BinderCall::Said {
                    channel_id: "announce".to_string(),
                    content: "⏰ Auction 2 ended: **Item 2** received no bids.".to_string(),
                },
                BinderCall::Said {
                    channel_id: "announce".to_string(),
                    content: "⏰ Auction 1 ended: **Item 1** received no bids.".to_string(),
                },
            ]
        );
    }
}
