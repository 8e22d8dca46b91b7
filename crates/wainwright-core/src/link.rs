use crate::fixed::Fixed64;
use crate::geometry::Point;
use crate::id::{CityId, TransportTypeId};
use crate::order::Endpoint;

/// An undirected connection between two cities, travelled by one kind of
/// transport.
#[derive(Debug, Clone, PartialEq)]
pub struct CityLink {
    first: CityId,
    second: CityId,
    transport_type: TransportTypeId,
    distance: f64,
    travel_distance: Fixed64,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LinkError {
    #[error("a link cannot connect a city to itself")]
    SameCity,
    #[error("linked cities must not share a position")]
    ZeroLength,
}

impl CityLink {
    /// Connect two distinct cities at distinct positions.
    pub fn new(
        first: CityId,
        first_position: Point,
        second: CityId,
        second_position: Point,
        transport_type: TransportTypeId,
    ) -> Result<Self, LinkError> {
        if first == second {
            return Err(LinkError::SameCity);
        }
        let distance = first_position.distance_to(second_position);
        let travel_distance = Fixed64::checked_from_num(distance).unwrap_or(Fixed64::MAX);
        if !distance.is_finite() || travel_distance <= Fixed64::ZERO {
            return Err(LinkError::ZeroLength);
        }
        Ok(Self {
            first,
            second,
            transport_type,
            distance,
            travel_distance,
        })
    }

    pub fn first(&self) -> CityId {
        self.first
    }

    pub fn second(&self) -> CityId {
        self.second
    }

    pub fn transport_type(&self) -> TransportTypeId {
        self.transport_type
    }

    /// Euclidean distance between the endpoints. Always positive.
    pub fn distance(&self) -> f64 {
        self.distance
    }

    /// Distance in simulation units, used as the travel-time denominator.
    pub(crate) fn travel_distance(&self) -> Fixed64 {
        self.travel_distance
    }

    /// The opposite endpoint, or `None` if `city` is not on this link.
    pub fn other(&self, city: CityId) -> Option<CityId> {
        if city == self.first {
            Some(self.second)
        } else if city == self.second {
            Some(self.first)
        } else {
            None
        }
    }

    /// True iff `city` is the first endpoint: travel from it runs in the
    /// link's canonical direction.
    pub fn forward(&self, city: CityId) -> bool {
        city == self.first
    }

    pub fn contains(&self, city: CityId) -> bool {
        self.other(city).is_some()
    }

    pub fn endpoint_of(&self, city: CityId) -> Option<Endpoint> {
        if city == self.first {
            Some(Endpoint::First)
        } else if city == self.second {
            Some(Endpoint::Second)
        } else {
            None
        }
    }

    pub fn city_at(&self, endpoint: Endpoint) -> CityId {
        match endpoint {
            Endpoint::First => self.first,
            Endpoint::Second => self.second,
        }
    }
}
