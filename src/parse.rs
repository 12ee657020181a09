//! Turns raw stat-page markup into validated match rows.

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::error::RowError;
use crate::types::{ParsedMatch, Winner};

/// Substitutions applied to every fighter name before it is compared or
/// stored. The single current entry covers a known upstream defect:
/// unescaped angle brackets in one fighter's name can get eaten during HTML
/// parsing, leaving the mangled form on the left.
const NAME_FIXUPS: &[(&str, &str)] = &[(" ( 0)/2", "<> ( 0)<>/2")];

/// Canonical form of a fighter name as scraped. Applied at every site that
/// compares or stores a name, so matching and storage stay consistent.
pub fn normalize_name(raw: &str) -> String {
    for (mangled, canonical) in NAME_FIXUPS {
        if raw == *mangled {
            return (*canonical).to_string();
        }
    }
    raw.to_string()
}

/// One stat page's worth of parse output.
#[derive(Debug)]
pub struct ResultsPage {
    /// Per-row outcome, in document order. Errors are row-local.
    pub rows: Vec<Result<ParsedMatch, RowError>>,
    /// True when the pagination block carries a `Next` link.
    pub has_next: bool,
}

/// Compiled selectors for the result-table layout, built once per page.
/// Every accessor yields an explicit empty result on malformed markup
/// instead of indexing into a selection that might not be there.
struct RowSelectors {
    row: Selector,
    link: Selector,
    red: Selector,
    blue: Selector,
    winner: Selector,
    cell: Selector,
    page_link: Selector,
    number: Regex,
}

impl RowSelectors {
    fn new() -> Self {
        Self {
            row: Selector::parse("table tbody tr").unwrap(),
            link: Selector::parse("td a[href]").unwrap(),
            red: Selector::parse("td > a > span.redtext").unwrap(),
            blue: Selector::parse("td > a > span.bluetext").unwrap(),
            winner: Selector::parse("td:nth-child(2) > span").unwrap(),
            cell: Selector::parse("td").unwrap(),
            page_link: Selector::parse("div#pagination a").unwrap(),
            number: Regex::new(r"[0-9]+").unwrap(),
        }
    }

    /// First run of digits in `text`, if any.
    fn first_number(&self, text: &str) -> Option<i64> {
        self.number.find(text).and_then(|m| m.as_str().parse().ok())
    }
}

/// Parse a tournament results page. Rows that fail validation stay in the
/// output as errors so the caller can log and count them; an entirely empty
/// row set is the caller's signal that the page had no content at all.
pub fn parse_results_page(html: &str, cutoff: i64) -> ResultsPage {
    let doc = Html::parse_document(html);
    let sel = RowSelectors::new();

    let rows = doc
        .select(&sel.row)
        .map(|row| parse_row(row, &sel, cutoff))
        .collect();

    let has_next = doc
        .select(&sel.page_link)
        .any(|a| a.text().collect::<String>().trim() == "Next");

    ResultsPage { rows, has_next }
}

fn parse_row(
    row: ElementRef<'_>,
    sel: &RowSelectors,
    cutoff: i64,
) -> Result<ParsedMatch, RowError> {
    let match_id = row
        .select(&sel.link)
        .next()
        .and_then(|a| a.value().attr("href"))
        .and_then(|href| sel.first_number(href))
        .unwrap_or(0);

    let red_span = row.select(&sel.red).next();
    let blue_span = row.select(&sel.blue).next();
    let red = red_span.map(span_name).unwrap_or_default();
    let blue = blue_span.map(span_name).unwrap_or_default();

    // Wager totals sit in the text node right after each name span. A
    // missing total is zero, not an error.
    let red_bets = red_span
        .and_then(following_text)
        .and_then(|t| sel.first_number(&t))
        .unwrap_or(0);
    let blue_bets = blue_span
        .and_then(following_text)
        .and_then(|t| sel.first_number(&t))
        .unwrap_or(0);

    let bettors = row
        .select(&sel.cell)
        .last()
        .map(|td| td.text().collect::<String>())
        .and_then(|t| t.trim().parse().ok())
        .unwrap_or(0);

    let declared = row
        .select(&sel.winner)
        .next()
        .map(span_name)
        .unwrap_or_default();

    // Validation order is fixed; the first failing check wins.
    if match_id == 0 {
        return Err(RowError::MissingId);
    }
    if red.is_empty() || blue.is_empty() {
        return Err(RowError::EmptyName);
    }
    let winner = if declared == red {
        Winner::Red
    } else if declared == blue {
        Winner::Blue
    } else {
        return Err(RowError::NoWinner { declared });
    };
    if match_id < cutoff {
        return Err(RowError::PreMatchmaking {
            id: match_id,
            cutoff,
        });
    }

    Ok(ParsedMatch {
        match_id,
        red,
        blue,
        red_bets,
        blue_bets,
        bettors,
        winner,
    })
}

fn span_name(span: ElementRef<'_>) -> String {
    normalize_name(&span.text().collect::<String>())
}

/// First text node following `el` among its siblings, if any.
fn following_text(el: ElementRef<'_>) -> Option<String> {
    let mut node = el.next_sibling();
    while let Some(n) = node {
        if let Some(text) = n.value().as_text() {
            return Some(text.to_string());
        }
        node = n.next_sibling();
    }
    None
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const CUTOFF: i64 = 51_966;

    fn match_row(
        href: &str,
        red: &str,
        red_bets: &str,
        blue: &str,
        blue_bets: &str,
        winner: &str,
        bettors: &str,
    ) -> String {
        format!(
            r#"<tr>
                <td><a href="{href}"><span class="redtext">{red}</span>{red_bets} vs <span class="bluetext">{blue}</span>{blue_bets}</a></td>
                <td><span class="greentext">{winner}</span></td>
                <td>{bettors}</td>
            </tr>"#
        )
    }

    fn results_page(rows: &[String], has_next: bool) -> String {
        let pagination = if has_next {
            r#"<div id="pagination"><a href="?page=2">Next</a></div>"#
        } else {
            r#"<div id="pagination"></div>"#
        };
        format!(
            "<html><body><table><tbody>{}</tbody></table>{pagination}</body></html>",
            rows.concat()
        )
    }

    fn single_row(row: String) -> Result<ParsedMatch, RowError> {
        let page = parse_results_page(&results_page(&[row], false), CUTOFF);
        assert_eq!(page.rows.len(), 1);
        page.rows.into_iter().next().unwrap()
    }

    #[test]
    fn parses_complete_row() {
        let row = match_row(
            "/stats?match_id=52000",
            "Goku",
            " (120)",
            "Vegeta",
            " (80)",
            "Goku",
            "50",
        );
        let parsed = single_row(row).unwrap();
        assert_eq!(
            parsed,
            ParsedMatch {
                match_id: 52_000,
                red: "Goku".to_string(),
                blue: "Vegeta".to_string(),
                red_bets: 120,
                blue_bets: 80,
                bettors: 50,
                winner: Winner::Red,
            }
        );
    }

    #[test]
    fn blue_winner_resolves_by_name() {
        let row = match_row(
            "/stats?match_id=52001",
            "Goku",
            " (120)",
            "Vegeta",
            " (80)",
            "Vegeta",
            "41",
        );
        assert_eq!(single_row(row).unwrap().winner, Winner::Blue);
    }

    #[test]
    fn missing_bets_default_to_zero() {
        let row = match_row("/stats?match_id=52002", "Goku", "", "Vegeta", "", "Goku", "9");
        let parsed = single_row(row).unwrap();
        assert_eq!(parsed.red_bets, 0);
        assert_eq!(parsed.blue_bets, 0);
    }

    #[test]
    fn href_without_number_is_missing_id() {
        let row = match_row("/stats", "Goku", " (120)", "Vegeta", " (80)", "Goku", "50");
        assert_eq!(single_row(row), Err(RowError::MissingId));
    }

    #[test]
    fn missing_id_wins_over_later_failures() {
        // Both the id and the names are broken; the id check fires first.
        let row = match_row("/stats", "", "", "", "", "Nobody", "0");
        assert_eq!(single_row(row), Err(RowError::MissingId));
    }

    #[test]
    fn empty_name_wins_over_no_winner() {
        let row = match_row("/stats?match_id=52003", "", "", "Vegeta", " (80)", "Nobody", "3");
        assert_eq!(single_row(row), Err(RowError::EmptyName));
    }

    #[test]
    fn unmatched_winner_is_rejected() {
        let row = match_row(
            "/stats?match_id=52004",
            "Goku",
            " (120)",
            "Vegeta",
            " (80)",
            "Piccolo",
            "17",
        );
        assert_eq!(
            single_row(row),
            Err(RowError::NoWinner {
                declared: "Piccolo".to_string()
            })
        );
    }

    #[test]
    fn pre_matchmaking_id_is_rejected() {
        let row = match_row(
            "/stats?match_id=51000",
            "Goku",
            " (120)",
            "Vegeta",
            " (80)",
            "Goku",
            "50",
        );
        assert_eq!(
            single_row(row),
            Err(RowError::PreMatchmaking {
                id: 51_000,
                cutoff: CUTOFF
            })
        );
    }

    #[test]
    fn mangled_name_is_normalized_for_matching_and_storage() {
        let row = match_row(
            "/stats?match_id=52005",
            " ( 0)/2",
            " (30)",
            "Vegeta",
            " (80)",
            " ( 0)/2",
            "12",
        );
        let parsed = single_row(row).unwrap();
        assert_eq!(parsed.red, "<> ( 0)<>/2");
        assert_eq!(parsed.winner, Winner::Red);
    }

    #[test]
    fn clean_names_pass_through_normalization() {
        assert_eq!(normalize_name("Goku"), "Goku");
        assert_eq!(normalize_name(" ( 0)/2"), "<> ( 0)<>/2");
    }

    #[test]
    fn detects_next_page_link() {
        let row = match_row(
            "/stats?match_id=52000",
            "Goku",
            " (120)",
            "Vegeta",
            " (80)",
            "Goku",
            "50",
        );
        assert!(parse_results_page(&results_page(&[row.clone()], true), CUTOFF).has_next);
        assert!(!parse_results_page(&results_page(&[row], false), CUTOFF).has_next);
    }

    #[test]
    fn empty_table_yields_no_rows() {
        let page = parse_results_page(&results_page(&[], false), CUTOFF);
        assert!(page.rows.is_empty());
    }
}
