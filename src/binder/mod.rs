/// 채널 바인더
/// 경매 채널 생성, 참여자 권한 부여/회수, 거래 채널 생성, 결과 공지를 담당하는
/// 채팅 플랫폼 경계
// region:    --- Imports
use crate::auction::{Auction, Bid, UserId};
use crate::error::BindError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::info;

// endregion: --- Imports

// region:    --- Modules
mod recording;

pub use recording::{BinderCall, RecordingBinder};
// endregion: --- Modules

/// 입찰 반응 이모지
pub const BID_EMOJI: &str = "💰";

// region:    --- Channel Binder Trait
/// 채널 바인더 트레이트
#[async_trait]
pub trait ChannelBinder: Send + Sync {
    /// 경매 티켓 채널 생성, 채널 id 반환
    async fn create_ticket_channel(
        &self,
        guild_id: Option<u64>,
        creator: UserId,
        title: &str,
    ) -> Result<String, BindError>;

    async fn announce_created(&self, auction: &Auction) -> Result<(), BindError>;

    /// 참여자 역할에 쓰기 권한 부여 (역할이 없으면 RoleNotFound)
    async fn grant_participant_access(&self, auction: &Auction) -> Result<(), BindError>;

    async fn revoke_participant_access(&self, auction: &Auction) -> Result<(), BindError>;

    async fn announce_started(&self, auction: &Auction, duration: &str) -> Result<(), BindError>;

    async fn announce_extended(&self, auction: &Auction, duration: &str)
        -> Result<(), BindError>;

    /// 판매자와 낙찰자만 볼 수 있는 거래 채널 생성, 채널 id 반환
    async fn open_transaction_channel(
        &self,
        auction: &Auction,
        winner: &Bid,
    ) -> Result<String, BindError>;

    async fn announce_result(
        &self,
        auction: &Auction,
        winner: Option<&Bid>,
        transaction_channel: Option<&str>,
    ) -> Result<(), BindError>;

    async fn say(&self, channel_id: &str, content: &str) -> Result<(), BindError>;
}
// endregion: --- Channel Binder Trait

// region:    --- Null Binder
/// 봇 비활성(대시보드 전용) 모드의 바인더
///
/// 채널 생성은 실패하고, 나머지 작업은 로그만 남긴다.
#[derive(Debug, Default)]
pub struct NullBinder;

#[async_trait]
impl ChannelBinder for NullBinder {
    async fn create_ticket_channel(
        &self,
        _guild_id: Option<u64>,
        _creator: UserId,
        _title: &str,
    ) -> Result<String, BindError> {
        Err(BindError::Platform("chat bot is disabled".to_string()))
    }

    async fn announce_created(&self, auction: &Auction) -> Result<(), BindError> {
        info!("{:<12} --> (봇 비활성) 경매 생성: {}", "Binder", auction.id);
        Ok(())
    }

    async fn grant_participant_access(&self, _auction: &Auction) -> Result<(), BindError> {
        Ok(())
    }

    async fn revoke_participant_access(&self, _auction: &Auction) -> Result<(), BindError> {
        Ok(())
    }

    async fn announce_started(&self, auction: &Auction, duration: &str) -> Result<(), BindError> {
        info!(
            "{:<12} --> (봇 비활성) 경매 시작: {} ({})",
            "Binder", auction.id, duration
        );
        Ok(())
    }

    async fn announce_extended(
        &self,
        auction: &Auction,
        duration: &str,
    ) -> Result<(), BindError> {
        info!(
            "{:<12} --> (봇 비활성) 경매 연장: {} ({})",
            "Binder", auction.id, duration
        );
        Ok(())
    }

    async fn open_transaction_channel(
        &self,
        _auction: &Auction,
        _winner: &Bid,
    ) -> Result<String, BindError> {
        Err(BindError::Platform("chat bot is disabled".to_string()))
    }

    async fn announce_result(
        &self,
        auction: &Auction,
        winner: Option<&Bid>,
        _transaction_channel: Option<&str>,
    ) -> Result<(), BindError> {
        info!(
            "{:<12} --> (봇 비활성) 경매 종료: {} - {}",
            "Binder",
            auction.id,
            result_summary(winner)
        );
        Ok(())
    }

    async fn say(&self, channel_id: &str, content: &str) -> Result<(), BindError> {
        info!("{:<12} --> (봇 비활성) #{}: {}", "Binder", channel_id, content);
        Ok(())
    }
}
// endregion: --- Null Binder

// region:    --- Formatting
/// 공개 결과 요약
pub fn result_summary(winner: Option<&Bid>) -> String {
    match winner {
        Some(bid) => format!("<@{}> won with: {}", bid.bidder, bid.offer),
        None => "No bids were placed.".to_string(),
    }
}

/// 거래 채널 이름 (제목 앞 15자)
pub fn transaction_channel_name(title: &str) -> String {
    format!("transaction-{}", title.chars().take(15).collect::<String>())
}

pub fn format_end_time(end_time: DateTime<Utc>) -> String {
    end_time.format("%Y-%m-%d %H:%M UTC").to_string()
}

pub fn format_end_clock(end_time: DateTime<Utc>) -> String {
    end_time.format("%H:%M UTC").to_string()
}
// endregion: --- Formatting
