//! Pure catalog filtering and sorting.
//!
//! Side-effect free over an immutable snapshot; all sorts are stable, so
//! services with equal sort keys keep their catalog order.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::domain::entities::service::Service;

/// Sort order for catalog queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ServiceSort {
    /// Most recently created first
    #[default]
    Newest,
    /// Oldest first
    Oldest,
    /// Cheapest first
    CostAsc,
    /// Most expensive first
    CostDesc,
    /// Best rated first; unrated services count as 0
    RatingDesc,
}

impl std::str::FromStr for ServiceSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "newest" => Ok(ServiceSort::Newest),
            "oldest" => Ok(ServiceSort::Oldest),
            "cost_asc" => Ok(ServiceSort::CostAsc),
            "cost_desc" => Ok(ServiceSort::CostDesc),
            "rating_desc" => Ok(ServiceSort::RatingDesc),
            other => Err(format!("unknown sort order: {}", other)),
        }
    }
}

/// Catalog query filter
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceFilter {
    /// Restrict to services whose category set contains this value
    pub category: Option<String>,

    /// Case-insensitive substring match against title or description
    pub text: Option<String>,

    /// Inclusive lower bound on `time_cost`
    pub min_cost: Option<i32>,

    /// Inclusive upper bound on `time_cost`
    pub max_cost: Option<i32>,

    /// Result ordering
    pub sort: ServiceSort,
}

/// Filter and sort a catalog snapshot
pub fn apply_filter(catalog: &[Service], filter: &ServiceFilter) -> Vec<Service> {
    let mut result: Vec<Service> = catalog
        .iter()
        .filter(|service| {
            if let Some(category) = &filter.category {
                if !service.has_category(category) {
                    return false;
                }
            }
            if let Some(text) = &filter.text {
                if !service.matches_text(text) {
                    return false;
                }
            }
            if let Some(min_cost) = filter.min_cost {
                if service.time_cost < min_cost {
                    return false;
                }
            }
            if let Some(max_cost) = filter.max_cost {
                if service.time_cost > max_cost {
                    return false;
                }
            }
            true
        })
        .cloned()
        .collect();

    // Vec::sort_by is stable: equal keys preserve catalog order
    match filter.sort {
        ServiceSort::Newest => result.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        ServiceSort::Oldest => result.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
        ServiceSort::CostAsc => result.sort_by(|a, b| a.time_cost.cmp(&b.time_cost)),
        ServiceSort::CostDesc => result.sort_by(|a, b| b.time_cost.cmp(&a.time_cost)),
        ServiceSort::RatingDesc => result.sort_by(|a, b| {
            let rating_a = a.avg_rating.unwrap_or(0.0);
            let rating_b = b.avg_rating.unwrap_or(0.0);
            rating_b.partial_cmp(&rating_a).unwrap_or(Ordering::Equal)
        }),
    }

    result
}
