use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::error::ParseError;
use crate::parser::{DetailExtras, Listing};

pub const BASE_URL: &str = "https://www.olx.pl";

/// Relative hrefs with this prefix are OLX's own listings; everything else
/// relative is navigation chrome.
const OFFER_PATH_PREFIX: &str = "/d/oferta/";

static CARD: LazyLock<Selector> = LazyLock::new(|| sel("div[data-cy='l-card']"));
static PROMOTED_BADGE: LazyLock<Selector> = LazyLock::new(|| sel("div.css-qavd0c"));
static TITLE_H4: LazyLock<Selector> = LazyLock::new(|| sel("h4"));
static TITLE_H6: LazyLock<Selector> = LazyLock::new(|| sel("h6"));
static PRICE_P: LazyLock<Selector> = LazyLock::new(|| sel("p[data-testid='ad-price']"));
static PRICE_ANY: LazyLock<Selector> = LazyLock::new(|| sel("[data-testid='ad-price']"));
static LOCATION_DATE: LazyLock<Selector> = LazyLock::new(|| sel("p[data-testid='location-date']"));
static AREA_BADGE: LazyLock<Selector> = LazyLock::new(|| sel("span.css-6as4g5"));
static ANY_SPAN: LazyLock<Selector> = LazyLock::new(|| sel("span"));
static PRIMARY_ANCHOR: LazyLock<Selector> = LazyLock::new(|| sel("a.css-1tqlkj0"));
static ANY_ANCHOR: LazyLock<Selector> = LazyLock::new(|| sel("a[href]"));
static IMG: LazyLock<Selector> = LazyLock::new(|| sel("img"));

static SRCSET_CANDIDATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https://[^\s,]+").unwrap());

fn sel(css: &str) -> Selector {
    Selector::parse(css).expect("static selector")
}

/// Ordered extraction strategies per field; the first `Some` wins.
type Strategy = fn(&ElementRef<'_>) -> Option<String>;

const TITLE_STRATEGIES: &[Strategy] = &[title_from_h4, title_from_h6, title_from_anchor_text];
const PRICE_STRATEGIES: &[Strategy] = &[price_from_p, price_from_any];
const LOCATION_STRATEGIES: &[Strategy] = &[location_from_badge];
const AREA_STRATEGIES: &[Strategy] = &[area_from_badge, area_from_any_span];
const LINK_STRATEGIES: &[Strategy] = &[link_from_primary_anchor, link_from_any_anchor];
const IMAGE_STRATEGIES: &[Strategy] = &[image_from_src, image_from_srcset];

fn first_match(card: &ElementRef<'_>, strategies: &[Strategy]) -> Option<String> {
    strategies.iter().find_map(|strategy| strategy(card))
}

/// Extract all real listings from a search results page. One malformed
/// card never aborts the rest; rejected cards are filtered out here.
pub fn extract_listings(doc: &Html) -> Vec<Listing> {
    doc.select(&CARD)
        .filter_map(|card| match extract_card(&card) {
            Ok(listing) => Some(listing),
            // Ad slots and empty placeholders are expected page furniture.
            Err(ParseError::PromotedCard) | Err(ParseError::MissingId) => None,
            Err(e) => {
                debug!(
                    "Skipping card {}: {}",
                    card.value().attr("id").unwrap_or("?"),
                    e
                );
                None
            }
        })
        .collect()
}

/// Extract one card. `Ok` only when both the card id and a usable detail
/// link resolved; this is the single admission gate into the pipeline.
pub fn extract_card(card: &ElementRef<'_>) -> Result<Listing, ParseError> {
    if card.select(&PROMOTED_BADGE).next().is_some() {
        return Err(ParseError::PromotedCard);
    }

    let id = card
        .value()
        .attr("id")
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or(ParseError::MissingId)?
        .to_string();

    let url = first_match(card, LINK_STRATEGIES).ok_or(ParseError::UnresolvableLink)?;

    Ok(Listing {
        id,
        url,
        title: first_match(card, TITLE_STRATEGIES),
        price: first_match(card, PRICE_STRATEGIES),
        location: first_match(card, LOCATION_STRATEGIES),
        area: first_match(card, AREA_STRATEGIES),
        image_url: first_match(card, IMAGE_STRATEGIES),
        details: DetailExtras::default(),
    })
}

// ── Field strategies ──

fn text_of(card: &ElementRef<'_>, selector: &Selector) -> Option<String> {
    card.select(selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|text| !text.is_empty())
}

fn title_from_h4(card: &ElementRef<'_>) -> Option<String> {
    text_of(card, &TITLE_H4)
}

fn title_from_h6(card: &ElementRef<'_>) -> Option<String> {
    text_of(card, &TITLE_H6)
}

fn title_from_anchor_text(card: &ElementRef<'_>) -> Option<String> {
    card.select(&ANY_ANCHOR)
        .map(|a| a.text().collect::<String>().trim().to_string())
        .find(|text| !text.is_empty())
}

fn price_from_p(card: &ElementRef<'_>) -> Option<String> {
    text_of(card, &PRICE_P)
}

fn price_from_any(card: &ElementRef<'_>) -> Option<String> {
    text_of(card, &PRICE_ANY)
}

/// "Kraków, Krowodrza - Odświeżono dnia 05 sierpnia" → "Kraków, Krowodrza".
fn location_from_badge(card: &ElementRef<'_>) -> Option<String> {
    text_of(card, &LOCATION_DATE)
        .map(|text| {
            text.split(" - ")
                .next()
                .unwrap_or_default()
                .trim()
                .to_string()
        })
        .filter(|location| !location.is_empty())
}

fn area_from_badge(card: &ElementRef<'_>) -> Option<String> {
    text_of(card, &AREA_BADGE).and_then(strip_area_unit)
}

fn area_from_any_span(card: &ElementRef<'_>) -> Option<String> {
    card.select(&ANY_SPAN)
        .map(|span| span.text().collect::<String>())
        .find_map(|text| strip_area_unit(text.trim().to_string()))
}

/// "28 m²" → "28". Textual, no numeric validation.
fn strip_area_unit(text: String) -> Option<String> {
    if !text.contains("m²") {
        return None;
    }
    let stripped = text.replace("m²", "").trim().to_string();
    (!stripped.is_empty()).then_some(stripped)
}

fn link_from_primary_anchor(card: &ElementRef<'_>) -> Option<String> {
    card.select(&PRIMARY_ANCHOR)
        .next()
        .and_then(|a| a.value().attr("href"))
        .and_then(resolve_link)
}

fn link_from_any_anchor(card: &ElementRef<'_>) -> Option<String> {
    card.select(&ANY_ANCHOR)
        .filter_map(|a| a.value().attr("href"))
        .find_map(resolve_link)
}

/// Three href shapes: absolute (external listings, kept as-is), the OLX
/// offer path (rewritten against the base origin), anything else
/// (unresolvable).
fn resolve_link(href: &str) -> Option<String> {
    if href.starts_with("https://") {
        Some(href.to_string())
    } else if href.starts_with(OFFER_PATH_PREFIX) {
        Some(format!("{}{}", BASE_URL, href))
    } else {
        None
    }
}

fn image_from_src(card: &ElementRef<'_>) -> Option<String> {
    card.select(&IMG)
        .filter_map(|img| img.value().attr("src"))
        .find(|src| src.starts_with("https://"))
        .map(str::to_string)
}

/// First absolute candidate from a responsive srcset list.
fn image_from_srcset(card: &ElementRef<'_>) -> Option<String> {
    card.select(&IMG)
        .filter_map(|img| img.value().attr("srcset"))
        .find_map(|srcset| {
            SRCSET_CANDIDATE_RE
                .find(srcset)
                .map(|m| m.as_str().to_string())
        })
}

// ── Tests ──
