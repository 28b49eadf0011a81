use crate::error::AuctionError;
use chrono::Duration;

/// `<정수><단위>` 형식의 기간 파싱 (m=60초, h=3600초, d=86400초)
pub fn parse_duration(raw: &str) -> Result<Duration, AuctionError> {
    let invalid = || AuctionError::InvalidDuration(raw.to_string());
    let trimmed = raw.trim();

    let unit = trimmed.chars().last().ok_or_else(invalid)?;
    let unit_seconds: i64 = match unit {
        'm' => 60,
        'h' => 3600,
        'd' => 86400,
        _ => return Err(invalid()),
    };

    let digits = &trimmed[..trimmed.len() - unit.len_utf8()];
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }

    let value: i64 = digits.parse().map_err(|_| invalid())?;
    value
        .checked_mul(unit_seconds)
        .and_then(Duration::try_seconds)
        .ok_or_else(invalid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_each_unit() {
        assert_eq!(parse_duration("1m").unwrap(), Duration::seconds(60));
        assert_eq!(parse_duration("2h").unwrap(), Duration::seconds(7200));
        assert_eq!(parse_duration("3d").unwrap(), Duration::seconds(259_200));
        assert_eq!(parse_duration("45m").unwrap(), Duration::seconds(2700));
    }

    #[test]
    fn rejects_unknown_unit_and_malformed_value() {
        for raw in ["10s", "10", "m", "", "1.5h", "-5m", "ten m", "5 m", "99999999999999999999d"] {
            assert!(
                matches!(parse_duration(raw), Err(AuctionError::InvalidDuration(_))),
                "expected InvalidDuration for {:?}",
                raw
            );
        }
    }
}
