/// 명령 실행
/// 채팅 플랫폼과 무관하게 파싱된 명령을 컨트롤러/원장 창구에 전달하고 응답 문구를 만든다.
/// 모든 오류는 여기서 사용자 메시지로 변환되며 이벤트 처리기로 전파되지 않는다.
// region:    --- Imports
use crate::auction::{AuctionEvent, UserId};
use crate::binder::format_end_time;
use crate::commands::Command;
use crate::error::AuctionError;
use crate::ledger::LedgerDesk;
use crate::lifecycle::AuctionController;
use std::sync::Arc;
use tracing::{info, warn};

// endregion: --- Imports

// region:    --- Invocation
/// 명령 호출 정보
#[derive(Debug, Clone)]
pub struct Invocation {
    pub user: UserId,
    pub channel_id: String,
    pub guild_id: Option<u64>,
    pub is_admin: bool,
}
// endregion: --- Invocation

// region:    --- Reply
/// 명령 응답
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Text(String),
    /// 경매 생성 버튼 패널 게시
    SetupPanel,
}

impl Reply {
    pub fn text(&self) -> Option<&str> {
        match self {
            Reply::Text(text) => Some(text),
            Reply::SetupPanel => None,
        }
    }
}
// endregion: --- Reply

// region:    --- Dispatcher
pub struct Dispatcher {
    controller: Arc<AuctionController>,
    ledger: Option<Arc<LedgerDesk>>,
    admin_role: String,
}

impl Dispatcher {
    pub fn new(
        controller: Arc<AuctionController>,
        ledger: Option<Arc<LedgerDesk>>,
        admin_role: impl Into<String>,
    ) -> Self {
        Self {
            controller,
            ledger,
            admin_role: admin_role.into(),
        }
    }

    pub fn controller(&self) -> &Arc<AuctionController> {
        &self.controller
    }

    /// 명령 실행 후 채널에 보낼 응답 (없으면 `None`)
    pub async fn handle(
        &self,
        invocation: &Invocation,
        parsed: Result<Command, AuctionError>,
    ) -> Option<Reply> {
        let command = match parsed {
            Ok(command) => command,
            Err(e) => return Some(Reply::Text(e.user_message())),
        };

        if command.requires_admin() && !invocation.is_admin {
            return Some(Reply::Text(format!(
                "❌ You need the '{}' role to use this command",
                self.admin_role
            )));
        }
        if command.requires_ledger() && self.ledger.is_none() {
            return Some(Reply::Text(ledger_disabled().user_message()));
        }
        if command == Command::Setup {
            return Some(Reply::SetupPanel);
        }

        info!(
            "{:<12} --> 명령 실행: {:?} by {} in {}",
            "Dispatch", command, invocation.user, invocation.channel_id
        );
        match self.execute(invocation, command).await {
            Ok(reply) => reply.map(Reply::Text),
            Err(e) => {
                warn!("{:<12} --> 명령 실패: {}", "Dispatch", e);
                Some(Reply::Text(e.user_message()))
            }
        }
    }

    async fn execute(
        &self,
        invocation: &Invocation,
        command: Command,
    ) -> Result<Option<String>, AuctionError> {
        let channel = invocation.channel_id.as_str();
        match command {
            Command::Setup => Ok(None),
            Command::Ticket { title, description } => {
                let auction = self
                    .controller
                    .create(invocation.user, &title, &description, invocation.guild_id)
                    .await?;
                Ok(Some(format!("Auction ticket created: <#{}>", auction.id)))
            }
            Command::StartAuction { duration } => {
                match self.controller.start(channel, &duration).await? {
                    AuctionEvent::Started {
                        role_warning: Some(warning),
                        ..
                    } => Ok(Some(format!("❌ {}", warning))),
                    _ => Ok(None),
                }
            }
            Command::Extend { duration } => {
                self.controller.extend(channel, &duration).await?;
                Ok(None)
            }
            Command::ForceEnd { auction_id } => self.force_end(auction_id, channel).await,
            Command::OpenLedgerAuction {
                item,
                price,
                minutes,
                image_url,
            } => {
                let created = self
                    .ledger()?
                    .open(invocation.user, &item, price, minutes, image_url, channel)
                    .await?;
                let mut reply = format!(
                    "🔨 Auction {} started: **{}** starting at {} coins, ends in {} minutes. Bid with `bid {} <amount>`",
                    created.id, created.item, created.starting_price, minutes, created.id
                );
                if let Some(image_url) = &created.image_url {
                    reply.push('\n');
                    reply.push_str(image_url);
                }
                Ok(Some(reply))
            }
            Command::Bid { auction_id, amount } => {
                let auction = self
                    .ledger()?
                    .place_bid(invocation.user, &auction_id, amount)
                    .await?;
                Ok(Some(format!(
                    "💰 <@{}> is now the highest bidder on auction {} with {} coins",
                    invocation.user, auction.id, auction.current_price
                )))
            }
            Command::Balance => {
                let balance = self.ledger()?.balance(invocation.user).await;
                Ok(Some(format!(
                    "💳 <@{}> balance: {} coins",
                    invocation.user, balance
                )))
            }
            Command::AddFunds { amount } => {
                let balance = self.ledger()?.add_funds(invocation.user, amount).await?;
                Ok(Some(format!(
                    "💳 Added {} coins. New balance: {} coins",
                    amount, balance
                )))
            }
            Command::Active => {
                let auctions = self.ledger()?.active_auctions().await;
                if auctions.is_empty() {
                    return Ok(Some("No active auctions.".to_string()));
                }
                let lines: Vec<String> = auctions
                    .iter()
                    .map(|auction| {
                        let ends = auction
                            .end_time
                            .map(format_end_time)
                            .unwrap_or_else(|| "unknown".to_string());
                        format!(
                            "#{} **{}** - {} coins (ends {})",
                            auction.id, auction.item, auction.current_price, ends
                        )
                    })
                    .collect();
                Ok(Some(lines.join("\n")))
            }
        }
    }

    /// 로컬 경매가 있으면 로컬 종료, 없으면 원장 경매 종료
    async fn force_end(
        &self,
        auction_id: Option<String>,
        channel: &str,
    ) -> Result<Option<String>, AuctionError> {
        let target = auction_id.clone().unwrap_or_else(|| channel.to_string());

        if self.controller.get(&target).await.is_some() {
            return match self.controller.resolve(&target).await? {
                Some(_) => Ok(None),
                None => Err(AuctionError::NotActive(target)),
            };
        }

        match (&self.ledger, auction_id) {
            (Some(ledger), Some(auction_id)) => {
                ledger.force_end(&auction_id, channel).await?;
                Ok(None)
            }
            _ => Err(AuctionError::NotFound(format!("auction {}", target))),
        }
    }

    fn ledger(&self) -> Result<&Arc<LedgerDesk>, AuctionError> {
        self.ledger.as_ref().ok_or_else(ledger_disabled)
    }
}

fn ledger_disabled() -> AuctionError {
    AuctionError::InvalidCommand("Ledger commands are not enabled".to_string())
}
// endregion: --- Dispatcher
