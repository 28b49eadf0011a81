use crate::auction::Auction;
use crate::binder::format_end_time;

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// 경매 목록 테이블 행
pub fn render_rows(auctions: &[Auction]) -> String {
    if auctions.is_empty() {
        return r#"<tr><td colspan="6">No auctions yet.</td></tr>"#.to_string();
    }

    auctions
        .iter()
        .map(|auction| {
            let end_time = auction
                .end_time
                .map(format_end_time)
                .unwrap_or_else(|| "-".to_string());
            let leading = auction
                .winning_bid()
                .map(|bid| format!("{}: {}", bid.bidder, bid.offer))
                .unwrap_or_else(|| "-".to_string());
            format!(
                r#"<tr class="{status}"><td>{title}</td><td>{description}</td><td>{status}</td><td>{end}</td><td>{bids}</td><td>{leading}</td></tr>"#,
                status = auction.status.as_str(),
                title = escape_html(&auction.title),
                description = escape_html(&auction.description),
                end = end_time,
                bids = auction.bids.len(),
                leading = escape_html(&leading),
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub(super) fn builtin_page(rows: &str, count: usize) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>Auction Dashboard</title>
<style>
body {{ font-family: sans-serif; background: #121212; color: #e0e0e0; }}
table {{ border-collapse: collapse; width: 100%; }}
td, th {{ border-bottom: 1px solid #333; padding: 6px; text-align: left; }}
tr.active td {{ color: #00ff7f; }}
tr.ended td {{ color: #888; }}
</style>
</head>
<body>
<h1>Auctions ({count})</h1>
<table>
<tr><th>Item</th><th>Description</th><th>Status</th><th>Ends</th><th>Bids</th><th>Leading bid</th></tr>
{rows}
</table>
</body>
</html>"#,
        count = count,
        rows = rows,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auction::Bid;
    use chrono::Utc;

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape_html(r#"<b>"Tom" & 'Jerry'</b>"#),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn rows_show_leading_bid_escaped() {
        let mut auction = Auction::new("1", 1, "<script>", "desc", None);
        auction.bids.push(Bid::new(7, "2 <gold>", Utc::now()));
        let rows = render_rows(&[auction]);
        assert!(rows.contains("&lt;script&gt;"));
        assert!(rows.contains("7: 2 &lt;gold&gt;"));
        assert!(rows.contains(r#"class="pending""#));
        assert!(!rows.contains("<script>"));
    }

    #[test]
    fn empty_list_has_placeholder_row() {
        assert!(render_rows(&[]).contains("No auctions yet."));
    }
}
