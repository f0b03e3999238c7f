use thiserror::Error;

/// A document could not be fetched. Degrades the affected source (search
/// fetch) or the affected enrichment (detail fetch) to an empty result.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned status {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
}

/// Why a single listing card was rejected. Isolated to that card; never
/// aborts extraction of the rest of the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Card carries the promoted/sponsored badge. Advertising, not a listing.
    #[error("promoted card")]
    PromotedCard,
    /// Card has no id attribute. Placeholder slot, not a listing.
    #[error("card has no listing id")]
    MissingId,
    /// No anchor resolved to a usable absolute detail URL.
    #[error("no usable detail link")]
    UnresolvableLink,
}

/// The notification transport rejected a payload or could not be reached.
/// Isolated per listing; the listing's id is still committed as seen.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("webhook request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("webhook returned status {status}: {body}")]
    Rejected {
        status: reqwest::StatusCode,
        body: String,
    },
}

/// Identity store failure. Fatal when reading the seen snapshot (novelty
/// cannot be decided without it), logged and non-fatal on batch writes.
#[derive(Debug, Error)]
#[error("identity store error: {0}")]
pub struct StoreError(#[from] rusqlite::Error);
