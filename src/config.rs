/// 환경 변수 설정
// region:    --- Imports
use crate::error::ConfigError;
use std::path::PathBuf;
use std::str::FromStr;

// endregion: --- Imports

// region:    --- Config
#[derive(Debug, Clone)]
pub struct Config {
    /// 없으면 대시보드 전용 모드
    pub discord_token: Option<String>,
    pub guild_id: Option<u64>,
    pub port: u16,
    /// 없으면 원장 명령 비활성
    pub ledger_api_url: Option<String>,
    pub target_channel_id: Option<u64>,
    pub command_prefix: String,
    pub auctions_file: PathBuf,
    pub bidders_role: String,
    pub admin_role: String,
    pub template_dir: PathBuf,
}

impl Config {
    /// 프로세스 환경 변수에서 설정 로드
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// 임의의 조회 함수에서 설정 로드
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let text = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        Ok(Self {
            discord_token: text("DISCORD_TOKEN"),
            guild_id: parse_optional("GUILD_ID", text("GUILD_ID"))?,
            port: parse_optional("PORT", text("PORT"))?.unwrap_or(8000),
            ledger_api_url: text("LEDGER_API_URL"),
            target_channel_id: parse_optional("TARGET_CHANNEL_ID", text("TARGET_CHANNEL_ID"))?,
            command_prefix: text("COMMAND_PREFIX").unwrap_or_else(|| "!".to_string()),
            auctions_file: text("AUCTIONS_FILE")
                .unwrap_or_else(|| "auctions.json".to_string())
                .into(),
            bidders_role: text("BIDDERS_ROLE").unwrap_or_else(|| "Bidders".to_string()),
            admin_role: text("ADMIN_ROLE").unwrap_or_else(|| "Admin".to_string()),
            template_dir: text("TEMPLATE_DIR")
                .unwrap_or_else(|| "templates".to_string())
                .into(),
        })
    }

    pub fn bot_enabled(&self) -> bool {
        self.discord_token.is_some()
    }

    /// 진단용 토큰 앞부분 (전체 값은 절대 노출하지 않는다)
    pub fn token_preview(&self) -> String {
        match &self.discord_token {
            Some(token) => format!("{}...", token.chars().take(5).collect::<String>()),
            None => "not set".to_string(),
        }
    }
}

fn parse_optional<T: FromStr>(
    name: &'static str,
    value: Option<String>,
) -> Result<Option<T>, ConfigError> {
    value
        .map(|value| {
            value
                .parse::<T>()
                .map_err(|_| ConfigError::Malformed { name, value })
        })
        .transpose()
}
// endregion: --- Config
