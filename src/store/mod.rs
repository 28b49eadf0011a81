/// 경매 저장소
/// 1. 저장소 트레이트 (get / put / list_all)
/// 2. 메모리 저장소 (테스트 및 임시 실행용)
/// 3. JSON 파일 저장소 (file.rs)
// region:    --- Imports
use crate::auction::Auction;
use crate::error::StoreError;
use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::Mutex;

// endregion: --- Imports

// region:    --- Modules
mod file;

pub use file::JsonFileStore;
// endregion: --- Modules

// region:    --- Auction Store Trait
/// 경매 저장소 트레이트
#[async_trait]
pub trait AuctionStore: Send + Sync {
    async fn get(&self, id: &str) -> Option<Auction>;
    async fn put(&self, auction: Auction) -> Result<(), StoreError>;
    async fn list_all(&self) -> Vec<Auction>;
}
// endregion: --- Auction Store Trait

// region:    --- Memory Store
/// 메모리 저장소 구현체
#[derive(Default)]
pub struct MemoryStore {
    auctions: Mutex<BTreeMap<String, Auction>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AuctionStore for MemoryStore {
    async fn get(&self, id: &str) -> Option<Auction> {
        self.auctions.lock().await.get(id).cloned()
    }

    async fn put(&self, auction: Auction) -> Result<(), StoreError> {
        self.auctions
            .lock()
            .await
            .insert(auction.id.clone(), auction);
        Ok(())
    }

    async fn list_all(&self) -> Vec<Auction> {
        self.auctions.lock().await.values().cloned().collect()
    }
}
// endregion: --- Memory Store
