use super::{result_summary, ChannelBinder};
use crate::auction::{Auction, Bid, UserId};
use crate::error::BindError;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

/// 바인더 호출 기록
#[derive(Debug, Clone, PartialEq)]
pub enum BinderCall {
    TicketCreated {
        channel_id: String,
        creator: UserId,
        title: String,
    },
    Created {
        auction_id: String,
    },
    Granted {
        auction_id: String,
    },
    Revoked {
        auction_id: String,
    },
    Started {
        auction_id: String,
        duration: String,
    },
    Extended {
        auction_id: String,
        duration: String,
    },
    TransactionOpened {
        auction_id: String,
        channel_id: String,
        seller: UserId,
        buyer: UserId,
    },
    Result {
        auction_id: String,
        summary: String,
        transaction_channel: Option<String>,
    },
    Said {
        channel_id: String,
        content: String,
    },
}

/// 호출을 기록하기만 하는 바인더 (테스트용)
pub struct RecordingBinder {
    calls: Mutex<Vec<BinderCall>>,
    next_channel: AtomicU64,
    participant_role: AtomicBool,
}

impl Default for RecordingBinder {
    fn default() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            next_channel: AtomicU64::new(1000),
            participant_role: AtomicBool::new(true),
        }
    }
}

impl RecordingBinder {
    pub fn new() -> Self {
        Self::default()
    }

    /// 참여자 역할이 없는 서버 흉내
    pub fn without_participant_role() -> Self {
        let binder = Self::default();
        binder.participant_role.store(false, Ordering::SeqCst);
        binder
    }

    pub fn calls(&self) -> Vec<BinderCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn results(&self) -> Vec<BinderCall> {
        self.calls()
            .into_iter()
            .filter(|call| matches!(call, BinderCall::Result { .. }))
            .collect()
    }

    fn record(&self, call: BinderCall) {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(call);
    }

    fn allocate_channel(&self) -> String {
        self.next_channel.fetch_add(1, Ordering::SeqCst).to_string()
    }
}

#[async_trait]
impl ChannelBinder for RecordingBinder {
    async fn create_ticket_channel(
        &self,
        _guild_id: Option<u64>,
        creator: UserId,
        title: &str,
    ) -> Result<String, BindError> {
        let channel_id = self.allocate_channel();
        self.record(BinderCall::TicketCreated {
            channel_id: channel_id.clone(),
            creator,
            title: title.to_string(),
        });
        Ok(channel_id)
    }

    async fn announce_created(&self, auction: &Auction) -> Result<(), BindError> {
        self.record(BinderCall::Created {
            auction_id: auction.id.clone(),
        });
        Ok(())
    }

    async fn grant_participant_access(&self, auction: &Auction) -> Result<(), BindError> {
        if !self.participant_role.load(Ordering::SeqCst) {
            return Err(BindError::RoleNotFound("Bidders".to_string()));
        }
        self.record(BinderCall::Granted {
            auction_id: auction.id.clone(),
        });
        Ok(())
    }

    async fn revoke_participant_access(&self, auction: &Auction) -> Result<(), BindError> {
        if !self.participant_role.load(Ordering::SeqCst) {
            return Err(BindError::RoleNotFound("Bidders".to_string()));
        }
        self.record(BinderCall::Revoked {
            auction_id: auction.id.clone(),
        });
        Ok(())
    }

    async fn announce_started(&self, auction: &Auction, duration: &str) -> Result<(), BindError> {
        self.record(BinderCall::Started {
            auction_id: auction.id.clone(),
            duration: duration.to_string(),
        });
        Ok(())
    }

    async fn announce_extended(
        &self,
        auction: &Auction,
        duration: &str,
    ) -> Result<(), BindError> {
        self.record(BinderCall::Extended {
            auction_id: auction.id.clone(),
            duration: duration.to_string(),
        });
        Ok(())
    }

    async fn open_transaction_channel(
        &self,
        auction: &Auction,
        winner: &Bid,
    ) -> Result<String, BindError> {
        let channel_id = self.allocate_channel();
        self.record(BinderCall::TransactionOpened {
            auction_id: auction.id.clone(),
            channel_id: channel_id.clone(),
            seller: auction.creator,
            buyer: winner.bidder,
        });
        Ok(channel_id)
    }

    async fn announce_result(
        &self,
        auction: &Auction,
        winner: Option<&Bid>,
        transaction_channel: Option<&str>,
    ) -> Result<(), BindError> {
        self.record(BinderCall::Result {
            auction_id: auction.id.clone(),
            summary: result_summary(winner),
            transaction_channel: transaction_channel.map(str::to_string),
        });
        Ok(())
    }

    async fn say(&self, channel_id: &str, content: &str) -> Result<(), BindError> {
        self.record(BinderCall::Said {
            channel_id: channel_id.to_string(),
            content: content.to_string(),
        });
        Ok(())
    }
}
