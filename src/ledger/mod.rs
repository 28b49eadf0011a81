/// 원장(가상 화폐) 연동
/// 1. 원장 트레이트 (잔액, 거래 기록, 원격 경매)
/// 2. HTTP 클라이언트 (client.rs)
/// 3. 원장 경매 창구 (desk.rs): 금액 입찰 검증 및 종료 정산
// region:    --- Imports
use crate::auction::UserId;
use async_trait::async_trait;

// endregion: --- Imports

// region:    --- Modules
mod client;
mod desk;
pub mod model;

pub use client::LedgerClient;
pub use desk::{ledger_result_summary, LedgerDesk};
pub use model::{LedgerAuction, NewLedgerAuction};
// endregion: --- Modules

// region:    --- Ledger Trait
/// 원장 서비스 트레이트
///
/// 구현체는 실패를 전파하지 않고 안전한 기본값(0 / false / None / 빈 목록)을 반환해야 한다.
#[async_trait]
pub trait Ledger: Send + Sync {
    async fn get_balance(&self, user_id: UserId) -> i64;
    async fn adjust_balance(&self, user_id: UserId, delta: i64) -> bool;
    async fn record_transaction(
        &self,
        user_id: UserId,
        amount: i64,
        kind: &str,
        description: &str,
    ) -> bool;
    async fn create_auction(&self, auction: &NewLedgerAuction) -> Option<LedgerAuction>;
    async fn get_auction(&self, auction_id: &str) -> Option<LedgerAuction>;
    async fn list_auctions(&self) -> Vec<LedgerAuction>;
    async fn place_bid(&self, auction_id: &str, user_id: UserId, amount: i64) -> bool;
    async fn end_auction(&self, auction_id: &str) -> Option<LedgerAuction>;
}
// endregion: --- Ledger Trait
