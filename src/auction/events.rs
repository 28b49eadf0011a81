use super::model::{AuctionId, Bid};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub enum AuctionEvent {
    // 경매 시작 이벤트
    Started {
        auction_id: AuctionId,
        end_time: DateTime<Utc>,
        // 참여자 역할 권한 부여 실패 사유 (비치명적)
        role_warning: Option<String>,
    },
    // 경매 연장 이벤트
    Extended {
        auction_id: AuctionId,
        end_time: DateTime<Utc>,
    },
    // 경매 종료 이벤트
    Ended {
        auction_id: AuctionId,
        winner: Option<Bid>,
        transaction_channel: Option<String>,
    },
}
