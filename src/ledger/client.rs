// region:    --- Imports
use super::model::{
    BalanceResponse, BalanceUpdate, LedgerAuction, LedgerBid, NewLedgerAuction, TransactionRecord,
};
use super::Ledger;
use crate::auction::UserId;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

// endregion: --- Imports

// 원장 서비스 요청 타임아웃
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

// region:    --- Ledger Client
/// 원장 HTTP 클라이언트
///
/// 모든 호출은 실패 시 로그를 남기고 0 / false / 빈 값을 반환한다.
#[derive(Clone)]
pub struct LedgerClient {
    base_url: String,
    http: Client,
}

impl LedgerClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|e| {
                warn!("{:<12} --> HTTP 클라이언트 설정 실패, 기본값 사용: {}", "Ledger", e);
                Client::new()
            });
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// 요청 전송 후 성공 여부만 확인
    async fn send(&self, what: &str, request: RequestBuilder) -> bool {
        match request.send().await {
            Ok(response) if response.status().is_success() => {
                debug!("{:<12} --> {} 성공", "Ledger", what);
                true
            }
            Ok(response) => {
                warn!("{:<12} --> {} 실패: HTTP {}", "Ledger", what, response.status());
                false
            }
            Err(e) => {
                warn!("{:<12} --> {} 요청 실패: {}", "Ledger", what, e);
                false
            }
        }
    }

    /// 요청 전송 후 JSON 본문 파싱
    async fn fetch<T: DeserializeOwned>(&self, what: &str, request: RequestBuilder) -> Option<T> {
        let response = match request.send().await {
            Ok(response) if response.status().is_success() => response,
            Ok(response) => {
                warn!("{:<12} --> {} 실패: HTTP {}", "Ledger", what, response.status());
                return None;
            }
            Err(e) => {
                warn!("{:<12} --> {} 요청 실패: {}", "Ledger", what, e);
                return None;
            }
        };

        match response.json::<T>().await {
            Ok(body) => Some(body),
            Err(e) => {
                warn!("{:<12} --> {} 응답 파싱 실패: {}", "Ledger", what, e);
                None
            }
        }
    }
}

#[async_trait]
impl Ledger for LedgerClient {
    async fn get_balance(&self, user_id: UserId) -> i64 {
        let request = self.http.get(self.url(&format!("/balance/{}", user_id)));
        self.fetch::<BalanceResponse>("잔액 조회", request)
            .await
            .map(|body| body.balance)
            .unwrap_or(0)
    }

    async fn adjust_balance(&self, user_id: UserId, delta: i64) -> bool {
        let request = self
            .http
            .post(self.url("/update_balance"))
            .json(&BalanceUpdate {
                user_id,
                amount: delta,
            });
        self.send("잔액 변경", request).await
    }

    async fn record_transaction(
        &self,
        user_id: UserId,
        amount: i64,
        kind: &str,
        description: &str,
    ) -> bool {
        let request = self
            .http
            .post(self.url("/record_transaction"))
            .json(&TransactionRecord {
                user_id,
                amount,
                kind: kind.to_string(),
                description: description.to_string(),
            });
        self.send("거래 기록", request).await
    }

    async fn create_auction(&self, auction: &NewLedgerAuction) -> Option<LedgerAuction> {
        let request = self.http.post(self.url("/create_auction")).json(auction);
        self.fetch("경매 생성", request).await
    }

    async fn get_auction(&self, auction_id: &str) -> Option<LedgerAuction> {
        let request = self.http.get(self.url(&format!("/auction/{}", auction_id)));
        self.fetch("경매 조회", request).await
    }

    async fn list_auctions(&self) -> Vec<LedgerAuction> {
        let request = self.http.get(self.url("/auctions"));
        self.fetch("경매 목록 조회", request)
            .await
            .unwrap_or_default()
    }

    async fn place_bid(&self, auction_id: &str, user_id: UserId, amount: i64) -> bool {
        let request = self.http.post(self.url("/place_bid")).json(&LedgerBid {
            auction_id: auction_id.to_string(),
            user_id,
            amount,
        });
        self.send("입찰", request).await
    }

    async fn end_auction(&self, auction_id: &str) -> Option<LedgerAuction> {
        let request = self
            .http
            .post(self.url(&format!("/end_auction/{}", auction_id)));
        self.fetch("경매 종료", request).await
    }
}
// endregion: --- Ledger Client
