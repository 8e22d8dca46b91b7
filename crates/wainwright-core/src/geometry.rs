//! Plane geometry shared by link rendering and transport positions.
//!
//! Pure `f64` math: nothing here feeds back into the simulation clock.

use crate::rng::SimRng;
use serde::{Deserialize, Serialize};

/// A world-space position in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn offset(self, by: Point) -> Point {
        Point::new(self.x + by.x, self.y + by.y)
    }

    pub fn round(self) -> Point {
        Point::new(self.x.round(), self.y.round())
    }
}

/// A link segment with both endpoints pulled in towards each other so the
/// drawn line (and travelling transports) stop short of the city icons.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OffsetSegment {
    pub start: Point,
    pub end: Point,
}

impl OffsetSegment {
    /// Shorten `from -> to` by `radius` at each end. Endpoints are rounded
    /// to whole pixels.
    pub fn between(from: Point, to: Point, radius: f64) -> Self {
        let angle = (to.y - from.y).atan2(to.x - from.x);
        let (sin, cos) = angle.sin_cos();
        Self {
            start: Point::new(from.x + cos * radius, from.y + sin * radius).round(),
            end: Point::new(to.x - cos * radius, to.y - sin * radius).round(),
        }
    }

    /// Point at fraction `t` from `start` to `end`, rounded to whole pixels.
    pub fn lerp(&self, t: f64) -> Point {
        Point::new(
            self.start.x + (self.end.x - self.start.x) * t,
            self.start.y + (self.end.y - self.start.y) * t,
        )
        .round()
    }
}

/// Random offset at a distance in `[min_radius, min_radius + range)` from
/// the origin, used to scatter waiting transports around a city.
pub fn jitter(rng: &mut SimRng, min_radius: f64, range: f64) -> Point {
    let angle = rng.next_f64() * std::f64::consts::TAU;
    let radius = min_radius + rng.next_f64() * range;
    let (sin, cos) = angle.sin_cos();
    Point::new(sin * radius, cos * radius)
}
