/// 읽기 전용 대시보드
/// 1. GET /         경매 목록 HTML
/// 2. GET /auctions 경매 목록 JSON
/// 3. GET /health   생존 확인
/// 4. GET /debug    진단 페이지 (토큰은 앞 5자만)
// region:    --- Imports
use crate::auction::Auction;
use crate::config::Config;
use crate::store::AuctionStore;
use axum::extract::State;
use axum::response::{Html, IntoResponse};
use axum::routing::get;
use axum::{Json, Router};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, info};

// endregion: --- Imports

// region:    --- Modules
mod render;

pub use render::{escape_html, render_rows};
// endregion: --- Modules

// 템플릿에서 경매 목록 행으로 치환되는 자리
// 템플릿 엔진이 아니라 단순 문자열 치환이며 다른 변수는 지원하지 않는다.
const TEMPLATE_PLACEHOLDER: &str = "{{ auctions }}";
const TEMPLATE_FILE: &str = "dashboard.html";

// region:    --- Router
#[derive(Clone)]
pub struct DashboardState {
    pub store: Arc<dyn AuctionStore>,
    pub config: Arc<Config>,
}

/// 대시보드 라우터 생성
pub fn router(state: DashboardState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handle_dashboard))
        .route("/auctions", get(handle_get_auctions))
        .route("/health", get(handle_health))
        .route("/debug", get(handle_debug))
        .layer(cors)
        .with_state(state)
}
// endregion: --- Router

// region:    --- Handlers

/// 경매 목록 HTML
pub async fn handle_dashboard(State(state): State<DashboardState>) -> impl IntoResponse {
    info!("{:<12} --> 대시보드 조회", "Dashboard");
    let auctions = state.store.list_all().await;
    let rows = render_rows(&auctions);

    let template_path = state.config.template_dir.join(TEMPLATE_FILE);
    let filled = tokio::fs::read_to_string(&template_path)
        .await
        .ok()
        .and_then(|template| fill_template(&template, &rows));
    let page = match filled {
        Some(page) => page,
        None => {
            debug!(
                "{:<12} --> 템플릿 없음, 기본 페이지 사용: {}",
                "Dashboard",
                template_path.display()
            );
            render::builtin_page(&rows, auctions.len())
        }
    };
    Html(page)
}

/// 경매 목록 JSON
pub async fn handle_get_auctions(State(state): State<DashboardState>) -> Json<Vec<Auction>> {
    info!("{:<12} --> 경매 목록 조회", "Dashboard");
    Json(state.store.list_all().await)
}

pub async fn handle_health() -> &'static str {
    "OK"
}

/// 진단 페이지
pub async fn handle_debug(State(state): State<DashboardState>) -> impl IntoResponse {
    info!("{:<12} --> 진단 페이지 조회", "Dashboard");
    let cwd = std::env::current_dir()
        .map(|dir| dir.display().to_string())
        .unwrap_or_else(|e| format!("unavailable ({})", e));
    let template_dir = &state.config.template_dir;
    let template_dir_exists = tokio::fs::metadata(template_dir).await.is_ok();
    let template_exists = tokio::fs::metadata(template_dir.join(TEMPLATE_FILE))
        .await
        .is_ok();
    let auction_count = state.store.list_all().await.len();
    let mode = if state.config.bot_enabled() {
        "bot + dashboard"
    } else {
        "dashboard only"
    };

    let lines = [
        ("Working directory", cwd),
        ("Template directory", template_dir.display().to_string()),
        ("Template directory exists", template_dir_exists.to_string()),
        ("Dashboard template exists", template_exists.to_string()),
        ("Auctions", auction_count.to_string()),
        ("Mode", mode.to_string()),
        ("Token", state.config.token_preview()),
    ];
    let body: String = lines
        .iter()
        .map(|(name, value)| format!("{}: {}\n", name, escape_html(value)))
        .collect();

    Html(format!(
        "<!DOCTYPE html><html><head><title>Auction Bot Debug</title></head><body><pre>{}</pre></body></html>",
        body
    ))
}
// endregion: --- Handlers

// region:    --- Template
/// 템플릿의 자리 표시자를 경매 목록 행으로 치환
/// 자리 표시자가 없는 템플릿은 `None` (기본 페이지 사용)
pub fn fill_template(template: &str, rows: &str) -> Option<String> {
    template
        .contains(TEMPLATE_PLACEHOLDER)
        .then(|| template.replace(TEMPLATE_PLACEHOLDER, rows))
}
// endregion: --- Template

#[cfg(test)]
mod tests {
    use super::*;

    const SHIPPED_TEMPLATE: &str = include_str!("../../templates/dashboard.html");

    #[test]
    fn shipped_template_has_exactly_one_placeholder() {
        assert_eq!(SHIPPED_TEMPLATE.matches(TEMPLATE_PLACEHOLDER).count(), 1);

        let page = fill_template(SHIPPED_TEMPLATE, "<tr><td>Lamp</td></tr>").unwrap();
        assert!(page.contains("<tr><td>Lamp</td></tr>"));
        assert!(!page.contains(TEMPLATE_PLACEHOLDER));
    }

    #[test]
    fn template_without_placeholder_is_rejected() {
        assert!(fill_template("<html>static</html>", "<tr></tr>").is_none());
        assert_eq!(
            fill_template("<a>{{ auctions }}</a>", "rows").as_deref(),
            Some("<a>rows</a>")
        );
    }
}
