use crate::auction::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// 원장 서비스 경매 모델
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerAuction {
    pub id: String,
    pub item: String,
    pub seller_id: UserId,
    pub starting_price: i64,
    pub current_price: i64,
    #[serde(default)]
    pub highest_bidder: Option<UserId>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    pub status: String,
}

impl LedgerAuction {
    pub fn is_active(&self) -> bool {
        self.status == "active"
    }
}

// 경매 생성 요청
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewLedgerAuction {
    pub item: String,
    pub seller_id: UserId,
    pub starting_price: i64,
    pub duration_minutes: i64,
    #[serde(default)]
    pub image_url: Option<String>,
}

// 잔액 응답
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceResponse {
    pub user_id: UserId,
    pub balance: i64,
}

// 잔액 변경 요청
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceUpdate {
    pub user_id: UserId,
    pub amount: i64,
}

// 거래 기록 요청
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub user_id: UserId,
    pub amount: i64,
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
}

// 입찰 요청
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerBid {
    pub auction_id: String,
    pub user_id: UserId,
    pub amount: i64,
}
