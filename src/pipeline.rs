use std::collections::HashSet;

use anyhow::Result;
use rusqlite::Connection;
use scraper::Html;
use tracing::{error, info, warn};

use crate::config::Settings;
use crate::db;
use crate::fetch::Fetcher;
use crate::notify::{self, Notifier};
use crate::parser::{detail, search, Listing};

/// Cycle outcome returned after all sources were attempted.
#[derive(Debug, Default)]
pub struct CycleStats {
    pub sources: usize,
    pub fetch_errors: usize,
    pub candidates: usize,
    pub new_listings: usize,
    pub enriched: usize,
    pub notified: usize,
    pub delivery_errors: usize,
}

impl CycleStats {
    pub fn print(&self) {
        println!(
            "Cycle done: {} sources ({} fetch errors), {} candidates, {} new, {} enriched, {} notified ({} delivery errors).",
            self.sources,
            self.fetch_errors,
            self.candidates,
            self.new_listings,
            self.enriched,
            self.notified,
            self.delivery_errors,
        );
    }
}

/// Candidates whose id is not in the seen set, order preserved.
/// Duplicates within one page are not collapsed; the identity store
/// governs only cross-cycle duplication.
pub fn partition_new(candidates: Vec<Listing>, seen: &HashSet<String>) -> Vec<Listing> {
    candidates
        .into_iter()
        .filter(|listing| !seen.contains(&listing.id))
        .collect()
}

/// One polling cycle over all configured sources. The seen snapshot is
/// read once up front; a store read failure is fatal (novelty cannot be
/// decided without it). Everything after that degrades per source.
pub async fn run_cycle(
    settings: &Settings,
    conn: &Connection,
    fetcher: &Fetcher,
    notifier: &Notifier,
) -> Result<CycleStats> {
    let seen = db::seen_ids(conn)?;
    info!("{} listings already seen", seen.len());

    let mut stats = CycleStats::default();
    for (name, url) in &settings.sources {
        stats.sources += 1;
        process_source(name, url, &seen, settings, conn, fetcher, notifier, &mut stats).await;
    }
    Ok(stats)
}

/// Fetch → extract → partition → enrich → notify → commit, for one
/// source. Failures here never propagate to sibling sources.
#[allow(clippy::too_many_arguments)]
async fn process_source(
    name: &str,
    url: &str,
    seen: &HashSet<String>,
    settings: &Settings,
    conn: &Connection,
    fetcher: &Fetcher,
    notifier: &Notifier,
    stats: &mut CycleStats,
) {
    info!("Scraping source '{}'", name);
    let body = match fetcher.get(url).await {
        Ok(body) => body,
        Err(e) => {
            warn!("Fetch failed for source '{}': {}", name, e);
            stats.fetch_errors += 1;
            return;
        }
    };

    let candidates = {
        let doc = Html::parse_document(&body);
        search::extract_listings(&doc)
    };
    stats.candidates += candidates.len();

    let mut new = partition_new(candidates, seen);
    if new.is_empty() {
        info!("No new listings for '{}'", name);
        return;
    }
    info!("Found {} new listings for '{}'", new.len(), name);
    stats.new_listings += new.len();

    if settings.scraper.scrape_details {
        for listing in new.iter_mut().filter(|l| l.is_enrichable()) {
            match fetcher.get(&listing.url).await {
                Ok(body) => {
                    let data = {
                        let doc = Html::parse_document(&body);
                        detail::extract_detail(&doc)
                    };
                    listing.merge_detail(data);
                    stats.enriched += 1;
                }
                // Listing ships with its base fields only.
                Err(e) => warn!("Detail fetch failed for {}: {}", listing.id, e),
            }
        }
    }

    for listing in &new {
        let embed = notify::build_embed(listing);
        match notifier.deliver(&embed).await {
            Ok(()) => {
                stats.notified += 1;
                info!("Sent notification for listing {}", listing.id);
            }
            Err(e) => {
                stats.delivery_errors += 1;
                let payload = serde_json::to_string(&embed).unwrap_or_default();
                warn!(
                    "Delivery failed for listing {}: {} (payload: {})",
                    listing.id, e, payload
                );
            }
        }
    }

    // Commit only after every notification in the batch was attempted.
    // A failed write leaves the ids unseen; a duplicate notification next
    // cycle is the accepted failure mode, crashing mid-cycle is not.
    let ids: Vec<String> = new.iter().map(|l| l.id.clone()).collect();
    match db::add_seen_ids(conn, &ids) {
        Ok(inserted) => info!("Committed {} new ids for '{}'", inserted, name),
        Err(e) => error!("Failed to persist ids for '{}': {}", name, e),
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::DetailExtras;

    fn listing(id: &str) -> Listing {
        Listing {
            id: id.into(),
            url: format!("https://www.olx.pl/d/oferta/{}.html", id),
            title: None,
            price: None,
            location: None,
            area: None,
            image_url: None,
            details: DetailExtras::default(),
        }
    }

    #[test]
    fn partition_is_exact_set_difference() {
        let seen: HashSet<String> = ["abc".to_string()].into();
        let new = partition_new(vec![listing("abc"), listing("xyz")], &seen);
        assert_eq!(new.len(), 1);
        assert_eq!(new[0].id, "xyz");
    }

    #[test]
    fn partition_with_empty_seen_set_keeps_everything() {
        let new = partition_new(vec![listing("a"), listing("b")], &HashSet::new());
        assert_eq!(new.len(), 2);
    }

    #[test]
    fn partition_preserves_order_and_intra_page_duplicates() {
        let new = partition_new(
            vec![listing("a"), listing("b"), listing("a")],
            &HashSet::new(),
        );
        let ids: Vec<&str> = new.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "a"]);
    }

    #[test]
    fn commit_after_partition_yields_union() {
        let conn = Connection::open_in_memory().unwrap();
        db::init_schema(&conn).unwrap();
        db::add_seen_ids(&conn, &["abc".into()]).unwrap();

        let seen = db::seen_ids(&conn).unwrap();
        let new = partition_new(vec![listing("abc"), listing("xyz")], &seen);
        let ids: Vec<String> = new.iter().map(|l| l.id.clone()).collect();
        db::add_seen_ids(&conn, &ids).unwrap();

        let after = db::seen_ids(&conn).unwrap();
        let expected: HashSet<String> = ["abc".to_string(), "xyz".to_string()].into();
        assert_eq!(after, expected);
    }
}
