/// 입찰 기록
/// 1. 채팅 메시지 입찰
/// 2. 반응(💰) 입찰
///
/// 활성 경매 채널의 봇이 아닌 모든 메시지는 입찰로 취급한다. 금액 검증은 하지 않는다.
// region:    --- Imports
use super::AuctionController;
use crate::auction::{Bid, UserId};
use crate::binder::BID_EMOJI;
use crate::error::AuctionError;
use chrono::{DateTime, Utc};
use tracing::{debug, info};

// endregion: --- Imports

// 반응 입찰 요약에 포함할 원본 메시지 길이
const REACTION_EXCERPT_CHARS: usize = 50;

/// 반응 입찰의 제안 문구
pub fn reaction_offer(excerpt: &str) -> String {
    let excerpt: String = excerpt.chars().take(REACTION_EXCERPT_CHARS).collect();
    format!("Reaction to message: {}...", excerpt)
}

// region:    --- Bid Recorder
impl AuctionController {
    /// 1. 채팅 메시지 입찰 기록, 활성 경매가 아니면 `None`
    pub async fn record_chat_bid(
        &self,
        auction_id: &str,
        bidder: UserId,
        message: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<Option<Bid>, AuctionError> {
        self.append_bid(auction_id, Bid::new(bidder, message, timestamp))
            .await
    }

    /// 2. 반응 입찰 기록
    ///
    /// 봇 자신의 반응이나 💰 이외의 반응은 무시한다.
    pub async fn record_reaction_bid(
        &self,
        auction_id: &str,
        bidder: UserId,
        emoji: &str,
        excerpt: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<Option<Bid>, AuctionError> {
        if emoji != BID_EMOJI || self.bot_user.get() == Some(&bidder) {
            return Ok(None);
        }
        self.append_bid(auction_id, Bid::new(bidder, reaction_offer(excerpt), timestamp))
            .await
    }

    async fn append_bid(
        &self,
        auction_id: &str,
        bid: Bid,
    ) -> Result<Option<Bid>, AuctionError> {
        // 경매 채널이 아닌 메시지는 잠금 없이 걸러낸다
        if !self.is_accepting_bids(auction_id).await {
            return Ok(None);
        }

        let _guard = self.lock(auction_id).await;
        let Some(mut auction) = self.store.get(auction_id).await else {
            return Ok(None);
        };
        if !auction.is_active() {
            debug!(
                "{:<12} --> 비활성 경매 입찰 무시 id: {}",
                "Bidding", auction_id
            );
            return Ok(None);
        }

        auction.bids.push(bid.clone());
        self.store.put(auction).await?;
        info!(
            "{:<12} --> 입찰 기록 id: {} bidder: {}",
            "Bidding", auction_id, bid.bidder
        );
        Ok(Some(bid))
    }

    async fn is_accepting_bids(&self, auction_id: &str) -> bool {
        matches!(self.store.get(auction_id).await, Some(auction) if auction.is_active())
    }
}
// endregion: --- Bid Recorder
