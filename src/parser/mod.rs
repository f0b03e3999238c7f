pub mod detail;
pub mod search;

use serde::Serialize;

/// One classified-ad record extracted from a search results page.
///
/// `id` and `url` are resolvable by construction: a card that cannot
/// produce both never becomes a `Listing` (the admission gate in
/// [`search::extract_card`]). Display fields are `None` when the source
/// markup lacks the element; the notifier renders those as "N/A".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Listing {
    pub id: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Textual area with the unit suffix stripped ("28 m²" → "28").
    /// No numeric parsing; consumers that need a number parse it themselves.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(flatten)]
    pub details: DetailExtras,
}

/// Fixed-vocabulary enrichment fields from a listing's own page.
/// Absent keys stay `None` and are never rendered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DetailExtras {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offer_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub furnished: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pets: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub building_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_rent: Option<String>,
}

/// Everything a detail page can contribute to a listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetailData {
    pub image_url: Option<String>,
    pub extras: DetailExtras,
}

impl Listing {
    /// Only OLX's own pages carry the parameters/gallery markup the detail
    /// extractor understands; external listings (e.g. Otodom) are skipped.
    pub fn is_enrichable(&self) -> bool {
        self.url.contains("olx.pl")
    }

    /// Additive merge: detail data fills fields the search page left
    /// empty and never overwrites a populated base field.
    pub fn merge_detail(&mut self, data: DetailData) {
        fill(&mut self.image_url, data.image_url);
        fill(&mut self.details.offer_type, data.extras.offer_type);
        fill(&mut self.details.furnished, data.extras.furnished);
        fill(&mut self.details.pets, data.extras.pets);
        fill(&mut self.details.building_type, data.extras.building_type);
        fill(&mut self.details.additional_rent, data.extras.additional_rent);
    }
}

fn fill(slot: &mut Option<String>, value: Option<String>) {
    if slot.is_none() {
        *slot = value;
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn base_listing() -> Listing {
        Listing {
            id: "abc".into(),
            url: "https://www.olx.pl/d/oferta/abc".into(),
            title: Some("Kawalerka".into()),
            price: None,
            location: None,
            area: None,
            image_url: Some("https://img.example/base.jpg".into()),
            details: DetailExtras::default(),
        }
    }

    #[test]
    fn merge_fills_empty_fields() {
        let mut listing = base_listing();
        listing.merge_detail(DetailData {
            image_url: None,
            extras: DetailExtras {
                pets: Some("Tak".into()),
                furnished: Some("Nie".into()),
                ..Default::default()
            },
        });
        assert_eq!(listing.details.pets.as_deref(), Some("Tak"));
        assert_eq!(listing.details.furnished.as_deref(), Some("Nie"));
        assert!(listing.details.offer_type.is_none());
    }

    #[test]
    fn merge_never_overwrites_populated_fields() {
        let mut listing = base_listing();
        listing.merge_detail(DetailData {
            image_url: Some("https://img.example/detail.jpg".into()),
            extras: DetailExtras::default(),
        });
        assert_eq!(
            listing.image_url.as_deref(),
            Some("https://img.example/base.jpg")
        );
    }

    #[test]
    fn merge_with_empty_detail_changes_nothing() {
        let mut listing = base_listing();
        let before = listing.clone();
        listing.merge_detail(DetailData::default());
        assert_eq!(listing, before);
    }

    #[test]
    fn enrichable_only_for_olx_links() {
        let mut listing = base_listing();
        assert!(listing.is_enrichable());
        listing.url = "https://www.otodom.pl/oferta/xyz".into();
        assert!(!listing.is_enrichable());
    }
}
