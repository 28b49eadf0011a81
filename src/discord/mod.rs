/// 디스코드 이벤트 처리
/// 1. ready: 봇 사용자 등록, 상태 표시
/// 2. message: 명령 실행 또는 채팅 입찰 기록
/// 3. reaction_add: 💰 반응 입찰 기록
/// 4. interaction_create: 경매 생성 버튼과 양식 제출
// region:    --- Imports
use crate::binder::BID_EMOJI;
use crate::commands::Command;
use crate::dispatch::{Dispatcher, Invocation, Reply};
use crate::error::AuctionError;
use async_trait::async_trait;
use chrono::Utc;
use serenity::all::{
    ActionRowComponent, ActivityData, Client, ComponentInteraction, Context,
    CreateInteractionResponse, EditInteractionResponse, EventHandler, GatewayIntents, GuildId,
    Interaction, Message, ModalInteraction, Reaction, ReactionType, Ready,
};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

// endregion: --- Imports

// region:    --- Modules
mod binder;
mod panel;

pub use binder::DiscordBinder;
// endregion: --- Modules

/// 봇 클라이언트 생성
pub async fn connect(token: &str, handler: Handler) -> Result<Client, serenity::Error> {
    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT
        | GatewayIntents::GUILD_MESSAGE_REACTIONS
        | GatewayIntents::GUILD_MEMBERS;
    Client::builder(token, intents).event_handler(handler).await
}

// region:    --- Handler
pub struct Handler {
    dispatcher: Arc<Dispatcher>,
    prefix: String,
    admin_role: String,
    guild_id: Option<u64>,
}

impl Handler {
    pub fn new(
        dispatcher: Arc<Dispatcher>,
        prefix: impl Into<String>,
        admin_role: impl Into<String>,
        guild_id: Option<u64>,
    ) -> Self {
        Self {
            dispatcher,
            prefix: prefix.into(),
            admin_role: admin_role.into(),
            guild_id,
        }
    }

    /// GUILD_ID가 설정되어 있으면 해당 서버의 이벤트만 처리
    fn in_scope(&self, guild: Option<GuildId>) -> bool {
        match self.guild_id {
            Some(expected) => guild.map(|id| id.get()) == Some(expected),
            None => true,
        }
    }

    async fn is_admin(&self, ctx: &Context, msg: &Message) -> bool {
        let Some(guild_id) = msg.guild_id else {
            return false;
        };
        let member = match guild_id.member(&ctx.http, msg.author.id).await {
            Ok(member) => member,
            Err(e) => {
                warn!("{:<12} --> 멤버 조회 실패: {}", "Discord", e);
                return false;
            }
        };
        let roles = match guild_id.roles(&ctx.http).await {
            Ok(roles) => roles,
            Err(e) => {
                warn!("{:<12} --> 역할 조회 실패: {}", "Discord", e);
                return false;
            }
        };
        member.roles.iter().any(|id| {
            roles
                .get(id)
                .is_some_and(|role| role.name == self.admin_role)
        })
    }

    async fn run_command(
        &self,
        ctx: &Context,
        msg: &Message,
        parsed: Result<Command, AuctionError>,
    ) {
        let is_admin = match &parsed {
            Ok(command) if command.requires_admin() => self.is_admin(ctx, msg).await,
            _ => false,
        };
        let invocation = Invocation {
            user: msg.author.id.get(),
            channel_id: msg.channel_id.get().to_string(),
            guild_id: msg.guild_id.map(|id| id.get()),
            is_admin,
        };

        let sent = match self.dispatcher.handle(&invocation, parsed).await {
            Some(Reply::Text(text)) => msg.channel_id.say(&ctx.http, text).await.map(|_| ()),
            Some(Reply::SetupPanel) => msg
                .channel_id
                .send_message(&ctx.http, panel::setup_panel())
                .await
                .map(|_| ()),
            None => Ok(()),
        };
        if let Err(e) = sent {
            error!("{:<12} --> 응답 전송 실패: {}", "Discord", e);
        }
    }

    /// 경매 생성 버튼: 양식 열기
    async fn open_ticket_form(&self, ctx: &Context, component: &ComponentInteraction) {
        let response = CreateInteractionResponse::Modal(panel::ticket_modal());
        if let Err(e) = component.create_response(&ctx.http, response).await {
            error!("{:<12} --> 양식 열기 실패: {}", "Discord", e);
        }
    }

    /// 양식 제출: 티켓 채널 생성 후 제출자에게만 결과 표시
    async fn submit_ticket_form(&self, ctx: &Context, modal: &ModalInteraction) {
        // 채널 생성이 응답 제한 시간을 넘길 수 있다
        if let Err(e) = modal.defer_ephemeral(&ctx.http).await {
            error!("{:<12} --> 양식 응답 지연 실패: {}", "Discord", e);
            return;
        }

        let (title, description) = panel::ticket_form_values(
            modal
                .data
                .components
                .iter()
                .flat_map(|row| row.components.iter())
                .filter_map(|component| match component {
                    ActionRowComponent::InputText(input) => {
                        Some((input.custom_id.as_str(), input.value.as_deref()))
                    }
                    _ => None,
                }),
        );
        let invocation = Invocation {
            user: modal.user.id.get(),
            channel_id: modal.channel_id.get().to_string(),
            guild_id: modal.guild_id.map(|id| id.get()),
            is_admin: false,
        };
        let parsed = Command::from_ticket_form(&title, &description);
        let text = match self.dispatcher.handle(&invocation, parsed).await {
            Some(Reply::Text(text)) => text,
            _ => return,
        };

        let edit = EditInteractionResponse::new().content(text);
        if let Err(e) = modal.edit_response(&ctx.http, edit).await {
            error!("{:<12} --> 양식 결과 전송 실패: {}", "Discord", e);
        }
    }

    async fn record_chat_bid(&self, ctx: &Context, msg: &Message) {
        let channel_id = msg.channel_id.get().to_string();
        let recorded = self
            .dispatcher
            .controller()
            .record_chat_bid(&channel_id, msg.author.id.get(), &msg.content, Utc::now())
            .await;

        match recorded {
            Ok(Some(_)) => {
                let reaction = ReactionType::Unicode(BID_EMOJI.to_string());
                if let Err(e) = msg.react(&ctx.http, reaction).await {
                    warn!("{:<12} --> 입찰 확인 반응 실패: {}", "Discord", e);
                }
            }
            Ok(None) => {}
            Err(e) => {
                error!("{:<12} --> 채팅 입찰 기록 실패: {}", "Discord", e);
                if let Err(e) = msg.channel_id.say(&ctx.http, e.user_message()).await {
                    error!("{:<12} --> 응답 전송 실패: {}", "Discord", e);
                }
            }
        }
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!(
            "{:<12} --> 로그인: {} (ID: {})",
            "Discord", ready.user.name, ready.user.id
        );
        self.dispatcher.controller().set_bot_user(ready.user.id.get());
        ctx.set_activity(Some(ActivityData::watching("Auctions")));
    }

    async fn message(&self, ctx: Context, msg: Message) {
        if msg.author.bot || !self.in_scope(msg.guild_id) {
            return;
        }

        match Command::parse(&self.prefix, &msg.content) {
            Some(parsed) => self.run_command(&ctx, &msg, parsed).await,
            None => self.record_chat_bid(&ctx, &msg).await,
        }
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        match interaction {
            Interaction::Component(component)
                if component.data.custom_id == panel::CREATE_BUTTON_ID
                    && self.in_scope(component.guild_id) =>
            {
                self.open_ticket_form(&ctx, &component).await;
            }
            Interaction::Modal(modal)
                if modal.data.custom_id == panel::TICKET_MODAL_ID
                    && self.in_scope(modal.guild_id) =>
            {
                self.submit_ticket_form(&ctx, &modal).await;
            }
            _ => {}
        }
    }

    async fn reaction_add(&self, ctx: Context, reaction: Reaction) {
        if !self.in_scope(reaction.guild_id) {
            return;
        }
        let ReactionType::Unicode(emoji) = &reaction.emoji else {
            return;
        };
        let Some(user) = reaction.user_id else {
            return;
        };

        let controller = self.dispatcher.controller();
        let channel_id = reaction.channel_id.get().to_string();
        // 활성 경매 채널이 아니면 메시지를 가져오지 않는다
        if !controller
            .get(&channel_id)
            .await
            .is_some_and(|auction| auction.is_active())
        {
            return;
        }

        let excerpt = match reaction.message(&ctx.http).await {
            Ok(message) => message.content,
            Err(e) => {
                warn!("{:<12} --> 반응 대상 메시지 조회 실패: {}", "Discord", e);
                String::new()
            }
        };

        match controller
            .record_reaction_bid(&channel_id, user.get(), emoji, &excerpt, Utc::now())
            .await
        {
            Ok(Some(_)) => {
                let notice = format!("💰 <@{}> placed a bid via reaction!", user.get());
                if let Err(e) = reaction.channel_id.say(&ctx.http, notice).await {
                    error!("{:<12} --> 응답 전송 실패: {}", "Discord", e);
                }
            }
            Ok(None) => debug!("{:<12} --> 반응 무시: {} by {}", "Discord", emoji, user),
            Err(e) => error!("{:<12} --> 반응 입찰 기록 실패: {}", "Discord", e),
        }
    }
}
// endregion: --- Handler
