use std::sync::LazyLock;

use scraper::{Html, Selector};

use crate::parser::DetailData;

static PARAMS_CONTAINER: LazyLock<Selector> =
    LazyLock::new(|| sel("div[data-testid='ad-parameters-container']"));
static PARAM_LINE: LazyLock<Selector> = LazyLock::new(|| sel("p"));
// The site's own markup spells it "galery".
static GALLERY: LazyLock<Selector> =
    LazyLock::new(|| sel("div[data-testid='image-galery-container']"));
static GALLERY_IMG: LazyLock<Selector> = LazyLock::new(|| sel("img"));

fn sel(css: &str) -> Selector {
    Selector::parse(css).expect("static selector")
}

/// Extract enrichment fields from a listing's own page. A missing
/// parameters container or gallery is not an error; fewer fields come back.
pub fn extract_detail(doc: &Html) -> DetailData {
    let mut data = DetailData::default();

    if let Some(gallery) = doc.select(&GALLERY).next() {
        data.image_url = gallery
            .select(&GALLERY_IMG)
            .filter_map(|img| img.value().attr("src"))
            .find(|src| src.starts_with("https://"))
            .map(str::to_string);
    }

    if let Some(container) = doc.select(&PARAMS_CONTAINER).next() {
        for line in container.select(&PARAM_LINE) {
            let text = line.text().collect::<String>();
            let text = text.trim();

            if let Some((key, value)) = text.split_once(':') {
                let slot = match key.trim() {
                    "Zwierzęta" => &mut data.extras.pets,
                    "Umeblowane" => &mut data.extras.furnished,
                    "Rodzaj zabudowy" => &mut data.extras.building_type,
                    "Czynsz (dodatkowo)" => &mut data.extras.additional_rent,
                    _ => continue,
                };
                let value = value.trim();
                if !value.is_empty() {
                    *slot = Some(value.to_string());
                }
            } else if text.contains("Prywatne") {
                data.extras.offer_type = Some("Private".to_string());
            } else if text.contains("Firmowe") || text.contains("Agencja") {
                data.extras.offer_type = Some("Business".to_string());
            }
        }
    }

    data
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(html: &str) -> DetailData {
        extract_detail(&Html::parse_document(html))
    }

    #[test]
    fn recognized_parameters_map_to_vocabulary_keys() {
        let data = extract(
            r#"<div data-testid="ad-parameters-container">
                 <p>Prywatne</p>
                 <p>Zwierzęta: Tak</p>
                 <p>Umeblowane: Nie</p>
                 <p>Rodzaj zabudowy: Blok</p>
                 <p>Czynsz (dodatkowo): 600 zł</p>
                 <p>Powierzchnia: 28 m²</p>
               </div>"#,
        );
        assert_eq!(data.extras.offer_type.as_deref(), Some("Private"));
        assert_eq!(data.extras.pets.as_deref(), Some("Tak"));
        assert_eq!(data.extras.furnished.as_deref(), Some("Nie"));
        assert_eq!(data.extras.building_type.as_deref(), Some("Blok"));
        assert_eq!(data.extras.additional_rent.as_deref(), Some("600 zł"));
    }

    #[test]
    fn agency_markers_classify_as_business() {
        for marker in ["Firmowe", "Agencja nieruchomości"] {
            let data = extract(&format!(
                r#"<div data-testid="ad-parameters-container"><p>{}</p></div>"#,
                marker
            ));
            assert_eq!(data.extras.offer_type.as_deref(), Some("Business"));
        }
    }

    #[test]
    fn gallery_image_requires_absolute_src() {
        let data = extract(
            r#"<div data-testid="image-galery-container">
                 <img src="/static/spinner.gif" />
                 <img src="https://ireland.apollo.olxcdn.com/v1/files/xyz/image" />
               </div>"#,
        );
        assert_eq!(
            data.image_url.as_deref(),
            Some("https://ireland.apollo.olxcdn.com/v1/files/xyz/image")
        );
    }

    #[test]
    fn missing_containers_yield_empty_data() {
        let data = extract("<html><body><h1>Ogłoszenie</h1></body></html>");
        assert_eq!(data, DetailData::default());
    }

    #[test]
    fn empty_parameter_value_stays_absent() {
        let data = extract(
            r#"<div data-testid="ad-parameters-container"><p>Zwierzęta:</p></div>"#,
        );
        assert!(data.extras.pets.is_none());
    }

    #[test]
    fn fixture_detail_page() {
        let html = std::fs::read_to_string("tests/fixtures/detail_page.html").unwrap();
        let data = extract_detail(&Html::parse_document(&html));
        assert_eq!(data.extras.offer_type.as_deref(), Some("Private"));
        assert_eq!(data.extras.furnished.as_deref(), Some("Tak"));
        assert!(data.image_url.is_some());
    }
}
