// region:    --- Imports
use super::AuctionStore;
use crate::auction::Auction;
use crate::error::StoreError;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tokio::time::{sleep, Duration};
use tracing::{error, info, warn};

// endregion: --- Imports

// 최대 재시도 횟수
const MAX_WRITE_RETRIES: u32 = 3;

// region:    --- Json File Store
/// JSON 파일 저장소
///
/// 경매 id를 키로 하는 JSON 객체 하나를 통째로 읽고 쓴다.
/// 모든 변경은 잠금 아래에서 직렬화되며, 임시 파일에 쓴 뒤 rename 한다.
pub struct JsonFileStore {
    path: PathBuf,
    auctions: Mutex<BTreeMap<String, Auction>>,
}

impl JsonFileStore {
    /// 저장소 파일 열기 (파일이 없으면 빈 저장소)
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let mut auctions: BTreeMap<String, Auction> = match fs::read(&path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => BTreeMap::new(),
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };

        // 이전 형식 레코드에는 id 필드가 없다
        for (id, auction) in auctions.iter_mut() {
            if auction.id.is_empty() {
                auction.id = id.clone();
            }
        }

        info!(
            "{:<12} --> 경매 {}건 로드: {}",
            "Store",
            auctions.len(),
            path.display()
        );
        Ok(Self {
            path,
            auctions: Mutex::new(auctions),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 전체 스냅샷 쓰기 (임시 파일 -> rename)
    async fn write_snapshot(&self, auctions: &BTreeMap<String, Auction>) -> Result<(), StoreError> {
        let json = serde_json::to_vec_pretty(auctions)?;
        let tmp_path = self.tmp_path();

        let mut file = fs::File::create(&tmp_path).await?;
        file.write_all(&json).await?;
        file.sync_all().await?;
        drop(file);

        fs::rename(&tmp_path, &self.path).await?;
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "auctions.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl AuctionStore for JsonFileStore {
    async fn get(&self, id: &str) -> Option<Auction> {
        self.auctions.lock().await.get(id).cloned()
    }

    async fn put(&self, auction: Auction) -> Result<(), StoreError> {
        let mut auctions = self.auctions.lock().await;
        let id = auction.id.clone();
        let previous = auctions.insert(id.clone(), auction);

        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.write_snapshot(&auctions).await {
                Ok(()) => return Ok(()),
                Err(e) if attempt < MAX_WRITE_RETRIES => {
                    warn!(
                        "{:<12} --> 저장 실패 ({}/{}): {}",
                        "Store", attempt, MAX_WRITE_RETRIES, e
                    );
                    sleep(Duration::from_millis(50 * attempt as u64)).await;
                }
                Err(e) => {
                    error!("{:<12} --> 저장 최종 실패, 롤백 id: {}: {}", "Store", id, e);
                    match previous {
                        Some(previous) => {
                            auctions.insert(id, previous);
                        }
                        None => {
                            auctions.remove(&id);
                        }
                    }
                    return Err(e);
                }
            }
        }
    }

    async fn list_all(&self) -> Vec<Auction> {
        self.auctions.lock().await.values().cloned().collect()
    }
}
// endregion: --- Json File Store
