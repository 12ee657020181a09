//! Compendium roster synchronization.

use regex::Regex;
use reqwest::Client;
use scraper::{Html, Selector};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::db::Store;
use crate::error::Result;
use crate::fetch;
use crate::parse::normalize_name;
use crate::types::{Fighter, RosterEntry};

/// Pull every compendium entry out of the tier-list markup. Each anchor href
/// carries the tier and then the character id as its first two numeric runs;
/// the anchor text is the display name. Entries missing either number are
/// malformed and dropped with a warning.
pub fn parse_roster(html: &str) -> Vec<RosterEntry> {
    let doc = Html::parse_document(html);
    let entry = Selector::parse("ul#tierlist li a").unwrap();
    let number = Regex::new(r"[0-9]+").unwrap();

    let mut entries = Vec::new();
    for a in doc.select(&entry) {
        let href = a.value().attr("href").unwrap_or("");
        let mut nums = number
            .find_iter(href)
            .filter_map(|m| m.as_str().parse::<i64>().ok());
        let (Some(tier), Some(character_id)) = (nums.next(), nums.next()) else {
            warn!(href, "skipping malformed tier-list entry");
            continue;
        };
        let name = normalize_name(&a.text().collect::<String>());
        if name.is_empty() {
            warn!(character_id, "skipping tier-list entry with empty name");
            continue;
        }
        entries.push(RosterEntry {
            character_id,
            tier,
            name,
        });
    }
    entries
}

/// Upsert one roster entry: a new fighter starts at the baseline rating with
/// zero wagers, while a known one gets its name and tier overwritten and
/// keeps its rating and wager totals. Safe to repeat any number of times.
pub async fn upsert_entry(store: &Store, entry: &RosterEntry, baseline: f64) -> Result<()> {
    let existing = match store.fighter_by_character_id(entry.character_id).await? {
        Some(f) => Some(f),
        // Fall back to name for fighters first seen in a match, before any
        // roster sync could attach their character id.
        None => store.fighter_by_name(&entry.name).await?,
    };

    let fighter = match existing {
        Some(f) => Fighter {
            character_id: Some(entry.character_id),
            name: entry.name.clone(),
            tier: entry.tier,
            ..f
        },
        None => Fighter {
            id: 0,
            character_id: Some(entry.character_id),
            name: entry.name.clone(),
            tier: entry.tier,
            rating: baseline,
            total_bets: 0,
        },
    };
    store.save_fighter(&fighter).await?;
    Ok(())
}

/// Scrape the compendium and bring the fighter roster up to date. Individual
/// entry failures are logged and the sync moves on.
pub async fn sync(
    client: &Client,
    store: &Store,
    base_url: &str,
    baseline: f64,
    cancel: &CancellationToken,
) -> Result<()> {
    let url = format!("{base_url}/compendium?search=");
    let html = fetch::fetch_page(client, &url, cancel).await?;
    let entries = parse_roster(&html);
    info!(entries = entries.len(), "syncing roster");
    for entry in &entries {
        if let Err(e) = upsert_entry(store, entry, baseline).await {
            warn!(
                character_id = entry.character_id,
                name = %entry.name,
                error = %e,
                "failed to upsert roster entry"
            );
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: f64 = 300.0;

    fn tierlist(entries: &[(i64, i64, &str)]) -> String {
        let items: String = entries
            .iter()
            .map(|(tier, cid, name)| {
                format!(r#"<li><a href="/compendium?tier={tier}&character={cid}">{name}</a></li>"#)
            })
            .collect();
        format!(r#"<html><body><ul id="tierlist">{items}</ul></body></html>"#)
    }

    #[test]
    fn parses_tier_and_character_id_from_href() {
        let html = tierlist(&[(2, 450, "Mr. X"), (4, 1203, "Akuma")]);
        let entries = parse_roster(&html);
        assert_eq!(
            entries,
            vec![
                RosterEntry {
                    character_id: 450,
                    tier: 2,
                    name: "Mr. X".to_string()
                },
                RosterEntry {
                    character_id: 1203,
                    tier: 4,
                    name: "Akuma".to_string()
                },
            ]
        );
    }

    #[test]
    fn malformed_entries_are_dropped() {
        let html = r##"<html><body><ul id="tierlist">
            <li><a href="/compendium">No Numbers</a></li>
            <li><a href="/compendium?tier=1&character=9">Kept</a></li>
        </ul></body></html>"##;
        let entries = parse_roster(html);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "Kept");
    }

    #[tokio::test]
    async fn unknown_fighter_is_created_with_baseline() {
        let store = Store::open_in_memory().await.unwrap();
        let entry = RosterEntry {
            character_id: 450,
            tier: 2,
            name: "Mr. X".to_string(),
        };

        upsert_entry(&store, &entry, BASE).await.unwrap();

        let f = store.fighter_by_character_id(450).await.unwrap().unwrap();
        assert_eq!(f.name, "Mr. X");
        assert_eq!(f.tier, 2);
        assert_eq!(f.rating, BASE);
        assert_eq!(f.total_bets, 0);
    }

    #[tokio::test]
    async fn resync_overwrites_tier_but_preserves_rating_and_bets() {
        let store = Store::open_in_memory().await.unwrap();
        let entry = RosterEntry {
            character_id: 450,
            tier: 2,
            name: "Mr. X".to_string(),
        };
        upsert_entry(&store, &entry, BASE).await.unwrap();

        let mut f = store.fighter_by_character_id(450).await.unwrap().unwrap();
        f.rating = 412.0;
        f.total_bets = 999;
        store.save_fighter(&f).await.unwrap();

        let promoted = RosterEntry {
            character_id: 450,
            tier: 3,
            name: "Mr. X".to_string(),
        };
        upsert_entry(&store, &promoted, BASE).await.unwrap();

        let after = store.fighter_by_character_id(450).await.unwrap().unwrap();
        assert_eq!(after.id, f.id);
        assert_eq!(after.tier, 3);
        assert_eq!(after.rating, 412.0);
        assert_eq!(after.total_bets, 999);
    }

    #[tokio::test]
    async fn match_discovered_fighter_gains_character_id_on_sync() {
        let store = Store::open_in_memory().await.unwrap();
        let discovered = store.load_or_create_fighter("Mr. X", BASE).await.unwrap();
        assert_eq!(discovered.character_id, None);

        let entry = RosterEntry {
            character_id: 450,
            tier: 2,
            name: "Mr. X".to_string(),
        };
        upsert_entry(&store, &entry, BASE).await.unwrap();

        let after = store.fighter_by_name("Mr. X").await.unwrap().unwrap();
        assert_eq!(after.id, discovered.id);
        assert_eq!(after.character_id, Some(450));
        assert_eq!(after.tier, 2);
    }
}
