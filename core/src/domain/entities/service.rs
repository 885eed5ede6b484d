//! Service listing entity for the marketplace catalog.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Minimum billable service cost (15 minutes)
pub const MIN_TIME_COST_MINUTES: i32 = 15;

/// A service offered on the marketplace, priced in minutes
///
/// Owned by its provider; only the provider mutates it. Invariants:
/// `time_cost >= 15` and `categories` non-empty (set semantics, duplicates
/// are collapsed at creation).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    /// Unique identifier for the service
    pub id: Uuid,

    /// User offering the service
    pub provider_id: Uuid,

    /// Short display title
    pub title: String,

    /// Free-text description
    pub description: String,

    /// Price in minutes of time-tokens
    pub time_cost: i32,

    /// Category tags; membership drives catalog filtering
    pub categories: Vec<String>,

    /// Average rating, if the service has been rated
    pub avg_rating: Option<f64>,

    /// Timestamp when the listing was created
    pub created_at: DateTime<Utc>,

    /// Timestamp of the last provider edit
    pub updated_at: DateTime<Utc>,
}

impl Service {
    /// Creates a new unrated listing
    pub fn new(
        provider_id: Uuid,
        title: String,
        description: String,
        time_cost: i32,
        categories: Vec<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            provider_id,
            title,
            description,
            time_cost,
            categories,
            avg_rating: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Checks category membership (exact match)
    pub fn has_category(&self, category: &str) -> bool {
        self.categories.iter().any(|c| c == category)
    }

    /// Case-insensitive substring match against title or description
    pub fn matches_text(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.title.to_lowercase().contains(&needle)
            || self.description.to_lowercase().contains(&needle)
    }
}
