use anyhow::{Context, Result};
use serde::Serialize;
use tracing::debug;

use crate::error::DeliveryError;
use crate::parser::Listing;

/// Placeholder text rendered for fields the markup did not resolve.
const NOT_AVAILABLE: &str = "N/A";

/// A freshly generated config ships with this value; treat it as
/// "delivery disabled" rather than an error.
const PLACEHOLDER_WEBHOOK: &str = "YOUR_WEBHOOK_URL_HERE";

/// Gold accent used for all listing embeds.
pub const EMBED_COLOR: u32 = 15_258_703;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Embed {
    pub title: String,
    pub url: String,
    pub color: u32,
    pub fields: Vec<EmbedField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<EmbedImage>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmbedImage {
    pub url: String,
}

#[derive(Serialize)]
struct WebhookPayload<'a> {
    embeds: [&'a Embed; 1],
}

/// Map a listing onto the webhook embed shape. Pure; the payload layout
/// is stable for compatibility with Discord's accepted structure.
pub fn build_embed(listing: &Listing) -> Embed {
    let rendered = |field: &Option<String>| {
        field.clone().unwrap_or_else(|| NOT_AVAILABLE.to_string())
    };

    let mut fields = vec![
        EmbedField {
            name: "Price".to_string(),
            value: rendered(&listing.price),
            inline: true,
        },
        EmbedField {
            name: "Area".to_string(),
            value: format!("{} m²", rendered(&listing.area)),
            inline: true,
        },
        EmbedField {
            name: "Location".to_string(),
            value: rendered(&listing.location),
            inline: false,
        },
    ];

    // Enrichment fields in fixed priority order, present values only.
    let optional = [
        ("Offer Type", &listing.details.offer_type),
        ("Furnished", &listing.details.furnished),
        ("Pets Allowed", &listing.details.pets),
        ("Building Type", &listing.details.building_type),
        ("Additional Rent", &listing.details.additional_rent),
    ];
    for (name, value) in optional {
        if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
            fields.push(EmbedField {
                name: name.to_string(),
                value: value.to_string(),
                inline: true,
            });
        }
    }

    Embed {
        title: rendered(&listing.title),
        url: listing.url.clone(),
        color: EMBED_COLOR,
        fields,
        image: listing
            .image_url
            .clone()
            .map(|url| EmbedImage { url }),
    }
}

pub struct Notifier {
    client: reqwest::Client,
    webhook_url: String,
}

impl Notifier {
    pub fn new(webhook_url: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .context("Failed to create webhook client")?;
        Ok(Self {
            client,
            webhook_url,
        })
    }

    pub fn enabled(&self) -> bool {
        !self.webhook_url.is_empty() && !self.webhook_url.contains(PLACEHOLDER_WEBHOOK)
    }

    /// Deliver one embed. With no configured webhook this is a guaranteed
    /// no-op success so the pipeline still commits the listing as seen.
    pub async fn deliver(&self, embed: &Embed) -> Result<(), DeliveryError> {
        if !self.enabled() {
            debug!("Webhook URL not configured, skipping notification");
            return Ok(());
        }

        let response = self
            .client
            .post(&self.webhook_url)
            .json(&WebhookPayload { embeds: [embed] })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DeliveryError::Rejected { status, body });
        }
        Ok(())
    }
}

// ── Tests ──
