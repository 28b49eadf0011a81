// region:    --- Imports
use auction_bot::binder::{ChannelBinder, NullBinder};
use auction_bot::clock::SystemClock;
use auction_bot::config::Config;
use auction_bot::dashboard::{self, DashboardState};
use auction_bot::discord::{self, DiscordBinder, Handler};
use auction_bot::dispatch::Dispatcher;
use auction_bot::ledger::{LedgerClient, LedgerDesk};
use auction_bot::lifecycle::AuctionController;
use auction_bot::store::{AuctionStore, JsonFileStore};
use serenity::all::Http;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
// endregion: --- Imports

// region:    --- Main
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // .env 파일이 있으면 환경 변수로 로드
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!(".env 로드 실패: {}", e);
        }
    }

    // logging 초기화
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .without_time()
        .with_target(false)
        .init();

    let config = Arc::new(Config::from_env()?);
    info!(
        "{:<12} --> 설정 로드 (모드: {})",
        "Main",
        if config.bot_enabled() {
            "bot + dashboard"
        } else {
            "dashboard only"
        }
    );

    // 경매 저장소 (손상된 파일이면 시작 실패)
    let store: Arc<dyn AuctionStore> = match JsonFileStore::open(&config.auctions_file).await {
        Ok(store) => {
            info!("{:<12} --> 저장소: {}", "Main", store.path().display());
            Arc::new(store)
        }
        Err(e) => {
            error!("{:<12} --> 저장소 로드 실패: {}", "Main", e);
            return Err(e.into());
        }
    };

    // 채널 바인더
    let binder: Arc<dyn ChannelBinder> = match &config.discord_token {
        Some(token) => Arc::new(DiscordBinder::new(
            Arc::new(Http::new(token)),
            config.guild_id,
            config.bidders_role.clone(),
            config.admin_role.clone(),
        )),
        None => {
            warn!("{:<12} --> DISCORD_TOKEN 없음, 대시보드 전용 모드", "Main");
            Arc::new(NullBinder)
        }
    };

    // 경매 컨트롤러 및 타이머 복구
    let controller = AuctionController::new(
        Arc::clone(&store),
        Arc::clone(&binder),
        Arc::new(SystemClock),
    );
    controller.restore_timers().await;

    // 원장 서비스 (선택) 및 원장 경매 타이머 복구
    let ledger = match &config.ledger_api_url {
        Some(url) => {
            info!("{:<12} --> 원장 서비스: {}", "Main", url);
            let desk = LedgerDesk::new(
                Arc::new(LedgerClient::new(url.clone())),
                Arc::clone(&binder),
                Arc::new(SystemClock),
                config.target_channel_id.map(|id| id.to_string()),
            );
            desk.restore_timers().await;
            Some(desk)
        }
        None => None,
    };

    let dispatcher = Arc::new(Dispatcher::new(
        Arc::clone(&controller),
        ledger,
        config.admin_role.clone(),
    ));

    // 디스코드 봇 실행
    let shard_manager = match &config.discord_token {
        Some(token) => {
            let handler = Handler::new(
                Arc::clone(&dispatcher),
                config.command_prefix.clone(),
                config.admin_role.clone(),
                config.guild_id,
            );
            let mut client = discord::connect(token, handler).await?;
            let shard_manager = Arc::clone(&client.shard_manager);
            tokio::spawn(async move {
                if let Err(e) = client.start().await {
                    error!("{:<12} --> 봇 실행 실패: {}", "Main", e);
                }
            });
            Some(shard_manager)
        }
        None => None,
    };

    // 대시보드
    let routes_all = dashboard::router(DashboardState {
        store,
        config: Arc::clone(&config),
    });

    let listener = TcpListener::bind(("0.0.0.0", config.port)).await?;
    info!(
        "{:<12} --> Web Server: Listening on {}",
        "Main",
        listener.local_addr()?
    );

    // 서버 실행 (Ctrl-C로 종료)
    if let Err(err) = axum::serve(listener, routes_all.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("{:<12} --> Server error: {}", "Main", err);
    }

    if let Some(shard_manager) = shard_manager {
        shard_manager.shutdown_all().await;
    }
    info!("{:<12} --> 종료", "Main");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("{:<12} --> 종료 신호 대기 실패: {}", "Main", e);
        std::future::pending::<()>().await;
    }
    info!("{:<12} --> 종료 신호 수신", "Main");
}
// endregion: --- Main
