//! PokéAPI catalog client.
//!
//! This module provides:
//!
//! - `CatalogClient`: HTTP client wrapper for creature lookups
//! - `CatalogEntry` and friends: deserialized catalog responses
//! - `locator_for`: locator derivation from a committed search term
//!
//! The catalog schema is externally owned and consumed defensively: missing
//! sprites and unrecognized category names degrade instead of failing.

use serde::Deserialize;

use crate::category::Category;
use crate::fetch::FetchError;

/// Catalog API base URL
pub const CATALOG_API_BASE: &str = "https://pokeapi.co/api/v2/pokemon";

/// User agent for API requests
const USER_AGENT: &str = concat!("Critterdex/", env!("CARGO_PKG_VERSION"));

/// Build the locator for a committed search term.
///
/// An empty term maps to an empty locator, which the fetch controller
/// treats as "no request". Names are lowercased; the catalog only knows
/// lowercase entity names.
pub fn locator_for(term: &str) -> String {
    if term.is_empty() {
        String::new()
    } else {
        format!("{CATALOG_API_BASE}/{}", term.to_lowercase())
    }
}

/// A catalog entry as returned by the remote service
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CatalogEntry {
    pub name: String,
    #[serde(default)]
    pub sprites: Sprites,
    #[serde(default)]
    pub types: Vec<TypeSlot>,
}

impl CatalogEntry {
    /// Category tags in slot order
    pub fn categories(&self) -> Vec<Category> {
        self.types.iter().map(|t| t.kind.name).collect()
    }
}

/// Sprite URLs attached to an entry
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Sprites {
    pub front_default: Option<String>,
}

/// One category tag with its display order
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TypeSlot {
    pub slot: u32,
    #[serde(rename = "type")]
    pub kind: CategoryRef,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CategoryRef {
    pub name: Category,
}

/// A completed lookup: the decoded entry plus its sprite bytes, if the
/// sprite could be downloaded
#[derive(Debug, Clone, PartialEq)]
pub struct Lookup {
    pub entry: CatalogEntry,
    pub artwork: Option<Vec<u8>>,
}

/// Catalog API client
#[derive(Clone)]
pub struct CatalogClient {
    client: reqwest::Client,
}

impl CatalogClient {
    /// Create a new catalog client
    pub fn new() -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;

        Ok(Self { client })
    }

    /// Look up one catalog entry.
    ///
    /// Maps non-2xx responses to `HttpStatus`, body decode failures to
    /// `Decode`, and everything else the transport reports to `Transport`.
    /// The sprite download is best-effort; its failure never fails the
    /// lookup.
    pub async fn lookup(&self, url: reqwest::Url) -> Result<Lookup, FetchError> {
        let response = self.client.get(url).send().await.map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus(status.as_u16()));
        }

        let mut entry: CatalogEntry = response.json().await.map_err(|e| {
            if e.is_decode() {
                FetchError::Decode
            } else {
                transport_error(e)
            }
        })?;

        // Badge order must match slot order regardless of wire order
        entry.types.sort_by_key(|t| t.slot);

        let artwork = match entry.sprites.front_default.clone() {
            Some(sprite_url) => self.fetch_artwork(&sprite_url).await,
            None => None,
        };

        tracing::debug!(
            "Lookup complete: {} ({} categories, artwork: {})",
            entry.name,
            entry.types.len(),
            artwork.is_some()
        );

        Ok(Lookup { entry, artwork })
    }

    async fn fetch_artwork(&self, url: &str) -> Option<Vec<u8>> {
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!("Artwork download failed: {e}");
                return None;
            }
        };

        if !response.status().is_success() {
            tracing::debug!("Artwork download returned {}", response.status());
            return None;
        }

        response.bytes().await.ok().map(|b| b.to_vec())
    }
}

impl Default for CatalogClient {
    fn default() -> Self {
        Self::new().unwrap_or_else(|_| Self {
            client: reqwest::Client::new(),
        })
    }
}

/// Convert a reqwest error into the transport variant, falling back to a
/// generic message if the error carries none
fn transport_error(e: reqwest::Error) -> FetchError {
    let message = e.to_string();
    if message.is_empty() {
        FetchError::Transport("unknown error".to_string())
    } else {
        FetchError::Transport(message)
    }
}
