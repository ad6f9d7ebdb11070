//! Points of interest around a destination
//!
//! [`PoiService`] queries the primary provider and, only when that yields
//! nothing usable, the fallback provider exactly once.

use std::collections::HashSet;

use async_trait::async_trait;
use tracing::{info, instrument, warn};

use crate::Result;
use crate::models::{Location, PointOfInterest};

pub mod opentripmap;
pub mod overpass;

pub use opentripmap::OpenTripMapProvider;
pub use overpass::OverpassProvider;

/// Minimum number of candidates requested from the fallback provider
pub const FALLBACK_MIN_LIMIT: usize = 12;

/// Kinds ranked first when ordering fallback results
const KIND_PRIORITY: [&str; 8] = [
    "attraction",
    "museum",
    "memorial",
    "monument",
    "historic",
    "park",
    "marketplace",
    "gallery",
];

/// Search radius and result cap for one lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoiQuery {
    pub radius_m: u32,
    pub limit: usize,
}

/// A source of points of interest
#[async_trait]
pub trait PoiProvider: Send + Sync {
    /// Provider name used in logs
    fn name(&self) -> &'static str;

    async fn fetch(&self, location: &Location, query: &PoiQuery) -> Result<Vec<PointOfInterest>>;
}

/// Drop nameless entries and repeated names (case-insensitive), keeping order
#[must_use]
pub fn dedup_by_name(pois: Vec<PointOfInterest>) -> Vec<PointOfInterest> {
    let mut seen = HashSet::new();
    pois.into_iter()
        .filter(|poi| !poi.name.trim().is_empty())
        .filter(|poi| seen.insert(poi.dedup_key()))
        .collect()
}

/// Priority of a kinds string; lower ranks earlier, unmatched kinds last
fn kind_rank(kinds: &str) -> usize {
    let kinds = kinds.to_lowercase();
    KIND_PRIORITY
        .iter()
        .position(|kind| kinds.contains(kind))
        .unwrap_or(KIND_PRIORITY.len())
}

/// Stable sort by kind priority
pub fn rank_by_kind(pois: &mut [PointOfInterest]) {
    pois.sort_by_key(|poi| kind_rank(&poi.kinds));
}

/// Primary/fallback POI lookup
pub struct PoiService {
    primary: Box<dyn PoiProvider>,
    fallback: Box<dyn PoiProvider>,
}

impl PoiService {
    #[must_use]
    pub fn new(primary: Box<dyn PoiProvider>, fallback: Box<dyn PoiProvider>) -> Self {
        Self { primary, fallback }
    }

    /// Fetch up to `query.limit` attractions near `location`
    #[instrument(skip(self, location), fields(location = %location.name))]
    pub async fn nearby(&self, location: &Location, query: PoiQuery) -> Result<Vec<PointOfInterest>> {
        let mut pois = dedup_by_name(self.primary.fetch(location, &query).await?);
        if !pois.is_empty() {
            pois.truncate(query.limit);
            info!("{} returned {} POIs", self.primary.name(), pois.len());
            return Ok(pois);
        }

        warn!(
            "{} returned no POIs, querying {}",
            self.primary.name(),
            self.fallback.name()
        );

        let fallback_query = PoiQuery {
            radius_m: query.radius_m,
            limit: query.limit.max(FALLBACK_MIN_LIMIT),
        };
        let mut pois = dedup_by_name(self.fallback.fetch(location, &fallback_query).await?);
        pois.truncate(fallback_query.limit);
        rank_by_kind(&mut pois);
        pois.truncate(query.limit);

        info!("{} returned {} POIs", self.fallback.name(), pois.len());
        Ok(pois)
    }
}
