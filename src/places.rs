//! Place catalogue and nearby search.

use serde::{Deserialize, Serialize};

use crate::{
    geo::GeoPoint,
    types::{BusynessLevel, Category, PlaceId},
};

/// A point of interest reports are attached to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    /// Stable place identifier.
    pub id: PlaceId,
    /// Display name.
    pub name: String,
    /// Street address.
    pub address: String,
    /// Category bucket.
    pub category: Category,
    /// Coordinates.
    pub location: GeoPoint,
    /// Last known crowd level from the catalogue, if any.
    #[serde(default)]
    pub current_busyness: Option<BusynessLevel>,
    /// Opaque cover image reference.
    #[serde(default)]
    pub photo_ref: Option<String>,
}

/// A place paired with its distance from the search origin.
#[derive(Debug, Clone, PartialEq)]
pub struct NearbyPlace<'a> {
    /// Matched place.
    pub place: &'a Place,
    /// Rounded distance in meters.
    pub distance_m: u64,
}

/// Read-only place catalogue.
#[derive(Debug, Clone, Default)]
pub struct PlaceDirectory {
    places: Vec<Place>,
}

impl PlaceDirectory {
    /// Wraps an existing list of places.
    pub fn new(places: Vec<Place>) -> Self {
        Self { places }
    }

    /// Looks a place up by id.
    pub fn get(&self, id: &str) -> Option<&Place> {
        self.places.iter().find(|p| p.id == id)
    }

    /// All places in catalogue order.
    pub fn all(&self) -> &[Place] {
        &self.places
    }

    /// Places within `radius_m` of `origin`, closest first.
    pub fn nearby(&self, origin: GeoPoint, radius_m: f64) -> Vec<NearbyPlace<'_>> {
        let mut out: Vec<NearbyPlace<'_>> = self
            .places
            .iter()
            .map(|place| NearbyPlace {
                place,
                distance_m: origin.distance_m(&place.location).round() as u64,
            })
            .filter(|n| (n.distance_m as f64) <= radius_m)
            .collect();
        out.sort_by_key(|n| n.distance_m);
        out
    }

    /// Places matching `category` (when given) whose name or address contains `query`.
    ///
    /// The match is case-insensitive; an empty query matches everything.
    pub fn filter(&self, category: Option<Category>, query: &str) -> Vec<&Place> {
        let needle = query.trim().to_lowercase();
        self.places
            .iter()
            .filter(|p| category.is_none_or(|c| p.category == c))
            .filter(|p| {
                needle.is_empty()
                    || p.name.to_lowercase().contains(&needle)
                    || p.address.to_lowercase().contains(&needle)
            })
            .collect()
    }
}
