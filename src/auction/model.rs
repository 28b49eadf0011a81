use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 경매 식별자 (경매 티켓 채널 id)
pub type AuctionId = String;

/// 채팅 플랫폼 사용자 식별자
pub type UserId = u64;

// 경매 상태 (pending -> active -> ended)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuctionStatus {
    Pending,
    Active,
    Ended,
}

impl AuctionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuctionStatus::Pending => "pending",
            AuctionStatus::Active => "active",
            AuctionStatus::Ended => "ended",
        }
    }
}

// 경매 모델
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Auction {
    #[serde(default)]
    pub id: AuctionId,
    pub creator: UserId,
    pub title: String,
    pub description: String,
    pub status: AuctionStatus,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub bids: Vec<Bid>,
    #[serde(default)]
    pub media: Vec<String>,
    #[serde(default)]
    pub guild_id: Option<u64>,
}

impl Auction {
    /// 대기(pending) 상태의 새 경매 생성
    pub fn new(
        id: impl Into<AuctionId>,
        creator: UserId,
        title: impl Into<String>,
        description: impl Into<String>,
        guild_id: Option<u64>,
    ) -> Self {
        Self {
            id: id.into(),
            creator,
            title: title.into(),
            description: description.into(),
            status: AuctionStatus::Pending,
            end_time: None,
            bids: Vec::new(),
            media: Vec::new(),
            guild_id,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == AuctionStatus::Active
    }

    /// 낙찰자: 가장 마지막에 추가된 입찰
    pub fn winning_bid(&self) -> Option<&Bid> {
        self.bids.last()
    }
}

// 입찰 모델
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bid {
    pub bidder: UserId,
    pub offer: String,
    pub timestamp: DateTime<Utc>,
    // 예약 필드, 현재 항상 null
    #[serde(default)]
    pub value: Option<f64>,
}

impl Bid {
    pub fn new(bidder: UserId, offer: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            bidder,
            offer: offer.into(),
            timestamp,
            value: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_auction_is_pending_without_end_time() {
        let auction = Auction::new("42", 1, "Sword", "Sharp", Some(7));
        assert_eq!(auction.status, AuctionStatus::Pending);
        assert!(auction.end_time.is_none());
        assert!(auction.bids.is_empty());
        assert!(auction.winning_bid().is_none());
    }

    #[test]
    fn winning_bid_is_most_recent_not_largest() {
        let now = Utc::now();
        let mut auction = Auction::new("42", 1, "Sword", "Sharp", None);
        auction.bids.push(Bid::new(2, "500 gold", now));
        auction.bids.push(Bid::new(3, "900 gold", now));
        auction.bids.push(Bid::new(4, "10 gold", now));
        assert_eq!(auction.winning_bid().map(|b| b.bidder), Some(4));
    }

    #[test]
    fn reads_records_without_optional_fields() {
        let json = r#"{
            "creator": 11,
            "title": "Shield",
            "description": "Round",
            "status": "active",
            "end_time": "2024-05-01T10:00:00Z",
            "bids": [{"bidder": 12, "offer": "a pie", "timestamp": "2024-05-01T09:00:00Z", "value": null}]
        }"#;
        let auction: Auction = serde_json::from_str(json).unwrap();
        assert!(auction.id.is_empty());
        assert_eq!(auction.status, AuctionStatus::Active);
        assert_eq!(auction.bids[0].offer, "a pie");
        assert!(auction.bids[0].value.is_none());
        assert!(auction.media.is_empty());
    }
}
