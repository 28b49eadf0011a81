/// 디스코드 채널 바인더
/// 1. 티켓 채널 생성 (@everyone 비공개, 생성자/관리자만 접근)
/// 2. 참여자 역할 권한 부여/회수
/// 3. 경매 공지 (임베드)
/// 4. 거래 채널 생성 (판매자/낙찰자만 접근)
// region:    --- Imports
use crate::auction::{Auction, Bid, UserId};
use crate::binder::{
    format_end_clock, format_end_time, result_summary, transaction_channel_name, ChannelBinder,
    BID_EMOJI,
};
use crate::error::BindError;
use async_trait::async_trait;
use serenity::all::{
    ChannelId, ChannelType, CreateChannel, CreateEmbed, CreateEmbedFooter, CreateMessage, GuildId,
    Http, PermissionOverwrite, PermissionOverwriteType, Permissions, RoleId,
    UserId as DiscordUserId,
};
use std::sync::Arc;
use tracing::{info, warn};

// endregion: --- Imports

const COLOR_CREATED: u32 = 0xBB86FC;
const COLOR_STARTED: u32 = 0x00FF00;
const COLOR_ENDED: u32 = 0xFF0000;

// 임베드 필드 값 최대 길이는 1024자
const FIELD_VALUE_LIMIT: usize = 1000;

// region:    --- Discord Binder
pub struct DiscordBinder {
    http: Arc<Http>,
    guild_id: Option<u64>,
    bidders_role: String,
    admin_role: String,
}

impl DiscordBinder {
    pub fn new(
        http: Arc<Http>,
        guild_id: Option<u64>,
        bidders_role: impl Into<String>,
        admin_role: impl Into<String>,
    ) -> Self {
        Self {
            http,
            guild_id,
            bidders_role: bidders_role.into(),
            admin_role: admin_role.into(),
        }
    }

    fn guild(&self, guild_id: Option<u64>) -> Result<GuildId, BindError> {
        guild_id
            .or(self.guild_id)
            .filter(|id| *id != 0)
            .map(GuildId::new)
            .ok_or_else(|| BindError::InvalidId("guild".to_string()))
    }

    /// 이름으로 역할 조회
    async fn find_role(&self, guild: GuildId, name: &str) -> Result<Option<RoleId>, BindError> {
        let roles = guild.roles(&self.http).await.map_err(platform)?;
        Ok(roles
            .into_iter()
            .find(|(_, role)| role.name == name)
            .map(|(id, _)| id))
    }

    async fn bidders_role_id(&self, auction: &Auction) -> Result<RoleId, BindError> {
        let guild = self.guild(auction.guild_id)?;
        self.find_role(guild, &self.bidders_role)
            .await?
            .ok_or_else(|| BindError::RoleNotFound(self.bidders_role.clone()))
    }

    /// 생성자와 낙찰자 등 지정된 사용자만 볼 수 있는 비공개 채널
    async fn create_private_channel(
        &self,
        guild: GuildId,
        name: String,
        members: &[UserId],
    ) -> Result<ChannelId, BindError> {
        let mut overwrites = vec![PermissionOverwrite {
            allow: Permissions::empty(),
            deny: Permissions::VIEW_CHANNEL,
            kind: PermissionOverwriteType::Role(RoleId::new(guild.get())),
        }];
        for member in members {
            overwrites.push(PermissionOverwrite {
                allow: member_permissions(),
                deny: Permissions::empty(),
                kind: PermissionOverwriteType::Member(DiscordUserId::new(*member)),
            });
        }
        match self.find_role(guild, &self.admin_role).await {
            Ok(Some(admin)) => overwrites.push(PermissionOverwrite {
                allow: member_permissions(),
                deny: Permissions::empty(),
                kind: PermissionOverwriteType::Role(admin),
            }),
            Ok(None) => warn!(
                "{:<12} --> 관리자 역할 없음: {}",
                "Discord", self.admin_role
            ),
            Err(e) => warn!("{:<12} --> 역할 조회 실패: {}", "Discord", e),
        }

        let builder = CreateChannel::new(name)
            .kind(ChannelType::Text)
            .permissions(overwrites);
        let channel = guild
            .create_channel(&self.http, builder)
            .await
            .map_err(platform)?;
        info!("{:<12} --> 채널 생성: {} ({})", "Discord", channel.name, channel.id);
        Ok(channel.id)
    }

    async fn send_embed(
        &self,
        channel_id: &str,
        content: Option<String>,
        embed: CreateEmbed,
    ) -> Result<(), BindError> {
        let mut message = CreateMessage::new().embed(embed);
        if let Some(content) = content {
            message = message.content(content);
        }
        parse_channel(channel_id)?
            .send_message(&self.http, message)
            .await
            .map_err(platform)?;
        Ok(())
    }
}

#[async_trait]
impl ChannelBinder for DiscordBinder {
    async fn create_ticket_channel(
        &self,
        guild_id: Option<u64>,
        creator: UserId,
        title: &str,
    ) -> Result<String, BindError> {
        let guild = self.guild(guild_id)?;
        let channel = self
            .create_private_channel(guild, format!("auction-{}", title), &[creator])
            .await?;
        Ok(channel.get().to_string())
    }

    async fn announce_created(&self, auction: &Auction) -> Result<(), BindError> {
        // 빈 설명은 디스코드가 거부한다
        let description = match auction.description.trim() {
            "" => "No description provided.".to_string(),
            text => clip(text),
        };
        let embed = CreateEmbed::new()
            .title(format!("New Auction: {}", auction.title))
            .description(description)
            .colour(COLOR_CREATED)
            .field("Created by", format!("<@{}>", auction.creator), true)
            .field("Status", "Pending", true)
            .footer(CreateEmbedFooter::new("Waiting for admin approval..."));
        self.send_embed(&auction.id, None, embed).await
    }

    async fn grant_participant_access(&self, auction: &Auction) -> Result<(), BindError> {
        let role = self.bidders_role_id(auction).await?;
        parse_channel(&auction.id)?
            .create_permission(
                &self.http,
                PermissionOverwrite {
                    allow: member_permissions() | Permissions::ADD_REACTIONS,
                    deny: Permissions::empty(),
                    kind: PermissionOverwriteType::Role(role),
                },
            )
            .await
            .map_err(platform)
    }

    async fn revoke_participant_access(&self, auction: &Auction) -> Result<(), BindError> {
        let role = self.bidders_role_id(auction).await?;
        parse_channel(&auction.id)?
            .create_permission(
                &self.http,
                PermissionOverwrite {
                    allow: Permissions::VIEW_CHANNEL,
                    deny: Permissions::SEND_MESSAGES | Permissions::ADD_REACTIONS,
                    kind: PermissionOverwriteType::Role(role),
                },
            )
            .await
            .map_err(platform)
    }

    async fn announce_started(&self, auction: &Auction, duration: &str) -> Result<(), BindError> {
        let ends = auction
            .end_time
            .map(format_end_time)
            .unwrap_or_else(|| "unknown".to_string());
        let description = match auction.description.trim() {
            "" => format!("Duration: {}", duration),
            text => format!("Duration: {}\n\n{}", duration, clip(text)),
        };
        let embed = CreateEmbed::new()
            .title(format!("🚀 Auction Started: {}", auction.title))
            .description(description)
            .colour(COLOR_STARTED)
            .field(
                "How to Bid",
                format!("Type your bid in chat or react with {}", BID_EMOJI),
                false,
            )
            .footer(CreateEmbedFooter::new(format!("Auction ends at {}", ends)));
        self.send_embed(&auction.id, None, embed).await
    }

    async fn announce_extended(
        &self,
        auction: &Auction,
        duration: &str,
    ) -> Result<(), BindError> {
        let ends = auction
            .end_time
            .map(format_end_clock)
            .unwrap_or_else(|| "unknown".to_string());
        let notice = format!("⏳ Auction extended by {}. New end time: {}", duration, ends);
        self.say(&auction.id, &notice).await
    }

    async fn open_transaction_channel(
        &self,
        auction: &Auction,
        winner: &Bid,
    ) -> Result<String, BindError> {
        let guild = self.guild(auction.guild_id)?;
        let channel = self
            .create_private_channel(
                guild,
                transaction_channel_name(&auction.title),
                &[auction.creator, winner.bidder],
            )
            .await?;

        let embed = CreateEmbed::new()
            .title(format!("Transaction for: {}", auction.title))
            .description(format!(
                "**Seller**: <@{}>\n**Buyer**: <@{}>",
                auction.creator, winner.bidder
            ))
            .colour(COLOR_CREATED)
            .field("Agreed Terms", clip(&winner.offer), false);
        let channel_id = channel.get().to_string();
        self.send_embed(
            &channel_id,
            Some(format!("<@{}> <@{}>", auction.creator, winner.bidder)),
            embed,
        )
        .await?;
        Ok(channel_id)
    }

    async fn announce_result(
        &self,
        auction: &Auction,
        winner: Option<&Bid>,
        transaction_channel: Option<&str>,
    ) -> Result<(), BindError> {
        let mut embed = CreateEmbed::new()
            .title(format!("⏰ Auction Ended: {}", auction.title))
            .colour(COLOR_ENDED);
        match winner {
            Some(bid) => {
                embed = embed.field(
                    "🏆 Highest Bid",
                    clip(&format!("<@{}> with:\n{}", bid.bidder, bid.offer)),
                    false,
                );
                if let Some(channel) = transaction_channel {
                    embed = embed.field(
                        "💼 Next Steps",
                        format!("Complete the transaction in <#{}>", channel),
                        false,
                    );
                }
            }
            None => embed = embed.description("No bids were placed."),
        }
        self.send_embed(&auction.id, Some(result_summary(winner)), embed)
            .await
    }

    async fn say(&self, channel_id: &str, content: &str) -> Result<(), BindError> {
        parse_channel(channel_id)?
            .say(&self.http, content)
            .await
            .map_err(platform)?;
        Ok(())
    }
}
// endregion: --- Discord Binder

// region:    --- Helpers
fn member_permissions() -> Permissions {
    Permissions::VIEW_CHANNEL | Permissions::SEND_MESSAGES | Permissions::READ_MESSAGE_HISTORY
}

pub(crate) fn parse_channel(raw: &str) -> Result<ChannelId, BindError> {
    raw.parse::<u64>()
        .ok()
        .filter(|id| *id != 0)
        .map(ChannelId::new)
        .ok_or_else(|| BindError::InvalidId(raw.to_string()))
}

fn platform(e: serenity::Error) -> BindError {
    BindError::Platform(e.to_string())
}

fn clip(text: &str) -> String {
    if text.chars().count() <= FIELD_VALUE_LIMIT {
        return text.to_string();
    }
    let mut clipped: String = text.chars().take(FIELD_VALUE_LIMIT).collect();
    clipped.push_str("...");
    clipped
}
// endregion: --- Helpers

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_ids_must_be_nonzero_numbers() {
        assert_eq!(parse_channel("1234").unwrap(), ChannelId::new(1234));
        assert!(matches!(parse_channel("0"), Err(BindError::InvalidId(_))));
        assert!(matches!(parse_channel("lobby"), Err(BindError::InvalidId(_))));
    }

    #[test]
    fn long_field_values_are_clipped() {
        let long = "x".repeat(FIELD_VALUE_LIMIT + 10);
        let clipped = clip(&long);
        assert_eq!(clipped.chars().count(), FIELD_VALUE_LIMIT + 3);
        assert!(clipped.ends_with("..."));
        assert_eq!(clip("short"), "short");
    }
}
