// region:    --- Imports
use thiserror::Error;

// endregion: --- Imports

// region:    --- Store Error
/// 경매 저장소 오류
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("저장소 파일 입출력 실패: {0}")]
    Io(#[from] std::io::Error),

    #[error("저장소 직렬화 실패: {0}")]
    Json(#[from] serde_json::Error),
}
// endregion: --- Store Error

// region:    --- Bind Error
/// 채팅 플랫폼 채널/권한 작업 오류
#[derive(Debug, Error)]
pub enum BindError {
    #[error("Role '{0}' not found. Please create it.")]
    RoleNotFound(String),

    #[error("invalid platform id: {0}")]
    InvalidId(String),

    #[error("chat platform error: {0}")]
    Platform(String),
}
// endregion: --- Bind Error

// region:    --- Auction Error
/// 경매 도메인 오류
///
/// 커맨드 경계에서 `user_message`로 변환되어 사용자에게 응답된다.
#[derive(Debug, Error)]
pub enum AuctionError {
    #[error("invalid duration '{0}' (use <number><m|h|d>, e.g. 30m)")]
    InvalidDuration(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("auction {0} is not active")]
    NotActive(String),

    #[error("auction {0} has already ended")]
    AlreadyEnded(String),

    #[error("remote service unavailable: {0}")]
    RemoteServiceUnavailable(String),

    #[error("failed to persist auctions: {0}")]
    Persistence(#[from] StoreError),

    #[error("chat platform error: {0}")]
    Platform(#[from] BindError),

    #[error("{0}")]
    InvalidCommand(String),

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("bid {amount} must be higher than the current price {current_price}")]
    BidTooLow { amount: i64, current_price: i64 },

    #[error("insufficient funds: balance {balance}, bid {amount}")]
    InsufficientFunds { amount: i64, balance: i64 },
}

impl AuctionError {
    /// 사용자에게 보여줄 짧은 오류 메시지
    pub fn user_message(&self) -> String {
        match self {
            AuctionError::NotFound(_) => format!("❌ {}", self),
            AuctionError::NotActive(_) => "❌ No active auction in this channel".to_string(),
            AuctionError::RemoteServiceUnavailable(_) => {
                "❌ The ledger service is unavailable, please try again later".to_string()
            }
            AuctionError::Persistence(_) => {
                "❌ Could not save the auction, please try again".to_string()
            }
            _ => format!("❌ {}", self),
        }
    }
}
// endregion: --- Auction Error

// region:    --- Config Error
/// 환경 설정 오류
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable {name} is malformed: {value}")]
    Malformed { name: &'static str, value: String },
}
// endregion: --- Config Error
