/// 채팅 명령 파싱
/// 접두사로 시작하는 메시지 중 알려진 명령만 명령으로 취급한다.
/// 알 수 없는 명령은 일반 메시지(입찰)로 처리된다.
// region:    --- Imports
use crate::error::AuctionError;

// endregion: --- Imports

// 시작 명령의 기본 경매 기간
pub const DEFAULT_AUCTION_DURATION: &str = "30m";

// 경매 생성 양식 입력 길이 상한
pub const TICKET_TITLE_MAX: usize = 100;
pub const TICKET_DESCRIPTION_MAX: usize = 1000;

// region:    --- Command
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// `setup` (경매 생성 버튼 패널 게시)
    Setup,
    /// `ticket "<title>" [description...]`, 또는 경매 생성 양식 제출
    Ticket { title: String, description: String },
    /// `start_auction [duration]`
    StartAuction { duration: String },
    /// `extend <duration>`
    Extend { duration: String },
    /// `forceend [id]`
    ForceEnd { auction_id: Option<String> },
    /// `startauction "<item>" <price> <minutes> [imageUrl]`
    OpenLedgerAuction {
        item: String,
        price: i64,
        minutes: i64,
        image_url: Option<String>,
    },
    /// `bid <id> <amount>`
    Bid { auction_id: String, amount: i64 },
    Balance,
    /// `addfunds <amount>`
    AddFunds { amount: i64 },
    Active,
}

impl Command {
    /// 메시지를 명령으로 파싱, 명령이 아니면 `None`
    pub fn parse(prefix: &str, content: &str) -> Option<Result<Command, AuctionError>> {
        let body = content.trim().strip_prefix(prefix)?;
        let name = body.split_whitespace().next()?.to_lowercase();
        if !KNOWN_COMMANDS.contains(&name.as_str()) {
            return None;
        }
        Some(Self::parse_known(prefix, &name, body))
    }

    /// 경매 생성 양식 제출 내용을 티켓 명령으로 변환
    pub fn from_ticket_form(title: &str, description: &str) -> Result<Command, AuctionError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(AuctionError::InvalidCommand(
                "An auction needs a title".to_string(),
            ));
        }
        if title.chars().count() > TICKET_TITLE_MAX
            || description.chars().count() > TICKET_DESCRIPTION_MAX
        {
            return Err(AuctionError::InvalidCommand(format!(
                "Title is limited to {} characters and description to {}",
                TICKET_TITLE_MAX, TICKET_DESCRIPTION_MAX
            )));
        }
        Ok(Command::Ticket {
            title: title.to_string(),
            description: description.trim().to_string(),
        })
    }

    fn parse_known(prefix: &str, name: &str, body: &str) -> Result<Command, AuctionError> {
        let args = split_args(body)?;
        let args = &args[1..];
        let usage = |text: &str| AuctionError::InvalidCommand(format!("Usage: {}{}", prefix, text));

        match name {
            "setup" => Ok(Command::Setup),
            "ticket" => {
                let (title, rest) = args
                    .split_first()
                    .ok_or_else(|| usage("ticket \"<title>\" [description]"))?;
                if title.trim().is_empty() {
                    return Err(usage("ticket \"<title>\" [description]"));
                }
                Ok(Command::Ticket {
                    title: title.clone(),
                    description: rest.join(" "),
                })
            }
            "start_auction" => Ok(Command::StartAuction {
                duration: args
                    .first()
                    .cloned()
                    .unwrap_or_else(|| DEFAULT_AUCTION_DURATION.to_string()),
            }),
            "extend" => {
                let duration = args.first().ok_or_else(|| usage("extend <duration>"))?;
                Ok(Command::Extend {
                    duration: duration.clone(),
                })
            }
            "forceend" => Ok(Command::ForceEnd {
                auction_id: args.first().cloned(),
            }),
            "startauction" => {
                let usage_text = "startauction \"<item>\" <price> <minutes> [imageUrl]";
                if args.len() < 3 {
                    return Err(usage(usage_text));
                }
                Ok(Command::OpenLedgerAuction {
                    item: args[0].clone(),
                    price: parse_amount(&args[1])?,
                    minutes: args[2]
                        .parse()
                        .map_err(|_| AuctionError::InvalidDuration(format!("{}m", args[2])))?,
                    image_url: args.get(3).cloned(),
                })
            }
            "bid" => {
                if args.len() < 2 {
                    return Err(usage("bid <id> <amount>"));
                }
                Ok(Command::Bid {
                    auction_id: args[0].clone(),
                    amount: parse_amount(&args[1])?,
                })
            }
            "balance" => Ok(Command::Balance),
            "addfunds" => {
                let amount = args.first().ok_or_else(|| usage("addfunds <amount>"))?;
                Ok(Command::AddFunds {
                    amount: parse_amount(amount)?,
                })
            }
            "active" => Ok(Command::Active),
            _ => Err(AuctionError::InvalidCommand(format!("Unknown command {}", name))),
        }
    }

    /// 관리자 역할이 필요한 명령
    pub fn requires_admin(&self) -> bool {
        matches!(
            self,
            Command::Setup
                | Command::StartAuction { .. }
                | Command::Extend { .. }
                | Command::ForceEnd { .. }
                | Command::OpenLedgerAuction { .. }
                | Command::AddFunds { .. }
        )
    }

    /// 원장 서비스가 필요한 명령
    pub fn requires_ledger(&self) -> bool {
        matches!(
            self,
            Command::OpenLedgerAuction { .. }
                | Command::Bid { .. }
                | Command::Balance
                | Command::AddFunds { .. }
                | Command::Active
        )
    }
}

const KNOWN_COMMANDS: &[&str] = &[
    "setup",
    "ticket",
    "start_auction",
    "extend",
    "forceend",
    "startauction",
    "bid",
    "balance",
    "addfunds",
    "active",
];
// endregion: --- Command

// region:    --- Helpers
fn parse_amount(raw: &str) -> Result<i64, AuctionError> {
    raw.parse::<i64>()
        .map_err(|_| AuctionError::InvalidAmount(raw.to_string()))
}

/// 공백 기준 분리, 큰따옴표로 묶인 구간은 하나의 인자
fn split_args(input: &str) -> Result<Vec<String>, AuctionError> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut has_token = false;

    for c in input.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                has_token = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if has_token {
                    args.push(std::mem::take(&mut current));
                    has_token = false;
                }
            }
            c => {
                current.push(c);
                has_token = true;
            }
        }
    }

    if in_quotes {
        return Err(AuctionError::InvalidCommand(
            "Unterminated quote in command".to_string(),
        ));
    }
    if has_token {
        args.push(current);
    }
    Ok(args)
}
// endregion: --- Helpers

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(content: &str) -> Option<Result<Command, AuctionError>> {
        Command::parse("!", content)
    }

    #[test]
    fn plain_messages_are_not_commands() {
        assert!(parse("100 gold and a sandwich").is_none());
        assert!(parse("!unknown stuff").is_none());
        assert!(parse("!").is_none());
    }

    #[test]
    fn parses_lifecycle_commands() {
        assert_eq!(
            parse("!start_auction").unwrap().unwrap(),
            Command::StartAuction {
                duration: "30m".to_string()
            }
        );
        assert_eq!(
            parse("!start_auction 2h").unwrap().unwrap(),
            Command::StartAuction {
                duration: "2h".to_string()
            }
        );
        assert_eq!(
            parse("  !extend 5m ").unwrap().unwrap(),
            Command::Extend {
                duration: "5m".to_string()
            }
        );
        assert_eq!(
            parse("!forceend").unwrap().unwrap(),
            Command::ForceEnd { auction_id: None }
        );
        assert!(matches!(
            parse("!extend"),
            Some(Err(AuctionError::InvalidCommand(_)))
        ));
    }

    #[test]
    fn parses_quoted_titles() {
        assert_eq!(
            parse(r#"!ticket "Silver Ring" worn once, no box"#)
                .unwrap()
                .unwrap(),
            Command::Ticket {
                title: "Silver Ring".to_string(),
                description: "worn once, no box".to_string(),
            }
        );
        assert!(matches!(
            parse(r#"!ticket "Silver Ring"#),
            Some(Err(AuctionError::InvalidCommand(_)))
        ));
        assert!(matches!(
            parse(r#"!ticket "" desc"#),
            Some(Err(AuctionError::InvalidCommand(_)))
        ));
    }

    #[test]
    fn setup_is_an_admin_command() {
        let setup = parse("!setup").unwrap().unwrap();
        assert_eq!(setup, Command::Setup);
        assert!(setup.requires_admin());
        assert!(!setup.requires_ledger());
    }

    #[test]
    fn ticket_form_is_trimmed_and_validated() {
        assert_eq!(
            Command::from_ticket_form("  Silver Ring ", " worn once\n").unwrap(),
            Command::Ticket {
                title: "Silver Ring".to_string(),
                description: "worn once".to_string(),
            }
        );
        assert!(matches!(
            Command::from_ticket_form("   ", "desc"),
            Err(AuctionError::InvalidCommand(_))
        ));
        assert!(matches!(
            Command::from_ticket_form(&"t".repeat(TICKET_TITLE_MAX + 1), ""),
            Err(AuctionError::InvalidCommand(_))
        ));
        assert!(Command::from_ticket_form("Ring", &"d".repeat(TICKET_DESCRIPTION_MAX)).is_ok());
    }

    #[test]
    fn parses_ledger_commands() {
        assert_eq!(
            parse(r#"!startauction "Old Lamp" 250 15 https://img.example/lamp.png"#)
                .unwrap()
                .unwrap(),
            Command::OpenLedgerAuction {
                item: "Old Lamp".to_string(),
                price: 250,
                minutes: 15,
                image_url: Some("https://img.example/lamp.png".to_string()),
            }
        );
        assert_eq!(
            parse("!bid 7 300").unwrap().unwrap(),
            Command::Bid {
                auction_id: "7".to_string(),
                amount: 300
            }
        );
        assert_eq!(parse("!balance").unwrap().unwrap(), Command::Balance);
        assert_eq!(parse("!active").unwrap().unwrap(), Command::Active);
        assert!(matches!(
            parse("!bid 7 lots"),
            Some(Err(AuctionError::InvalidAmount(_)))
        ));
        assert!(matches!(
            parse("!addfunds"),
            Some(Err(AuctionError::InvalidCommand(_)))
        ));
    }

    #[test]
    fn admin_and_ledger_requirements() {
        assert!(Command::Extend {
            duration: "5m".to_string()
        }
        .requires_admin());
        assert!(!Command::Balance.requires_admin());
        assert!(Command::Balance.requires_ledger());
        assert!(!Command::StartAuction {
            duration: "5m".to_string()
        }
        .requires_ledger());
    }
}
