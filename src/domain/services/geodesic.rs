//! Geodesic circle sampling
//!
//! The study-area circle is approximated by a closed ring of vertices placed
//! at equal bearing steps around the center.

use geo::{Destination, Haversine, Point};

use crate::domain::entities::{LatLng, Position};

/// Vertex count used for the analysis-area polygon
pub const CIRCLE_STEPS: usize = 64;

/// Produces a closed exterior ring approximating a circle on the Earth
pub trait CircleSampler: Send + Sync {
    /// Returns `[lng, lat]` positions; the last position repeats the first.
    fn sample(&self, center: LatLng, radius_km: f64) -> Vec<Position>;
}

/// Spherical (haversine) sampling on the mean Earth radius
#[derive(Debug, Clone, Copy)]
pub struct HaversineCircleSampler {
    steps: usize,
}

impl HaversineCircleSampler {
    pub fn new(steps: usize) -> Self {
        Self {
            steps: steps.max(3),
        }
    }
}

impl Default for HaversineCircleSampler {
    fn default() -> Self {
        Self::new(CIRCLE_STEPS)
    }
}

impl CircleSampler for HaversineCircleSampler {
    fn sample(&self, center: LatLng, radius_km: f64) -> Vec<Position> {
        let origin = Point::new(center.lng, center.lat);
        let distance_m = radius_km * 1000.0;

        let mut ring: Vec<Position> = (0..self.steps)
            .map(|i| {
                // Negative bearings walk the ring counter-clockwise
                let bearing = (i as f64 * -360.0) / self.steps as f64;
                let vertex = Haversine.destination(origin, bearing, distance_m);
                [vertex.x(), vertex.y()]
            })
            .collect();

        if let Some(first) = ring.first().copied() {
            ring.push(first);
        }
        ring
    }
}
