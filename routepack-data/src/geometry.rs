//! Way geometry resolution and reprojection to WGS84.

use std::f64::consts::FRAC_PI_2;

use geo::{Coord, LineString};
use log::{debug, warn};
use routepack_core::{GroupWay, RawPosition, RouteStore, StoreError, Tags};

use crate::PipelineError;

/// Spatial reference id of WGS84 longitude/latitude.
pub const WGS84_SRID: i32 = 4326;

/// Spatial reference id of the legacy spherical mercator projection.
pub const SPHERICAL_MERCATOR_SRID: i32 = 900_913;

const EARTH_RADIUS_METRES: f64 = 6_378_137.0;
const DECIMICRO_PER_DEGREE: f64 = 1.0e7;
const CENTIMETRES_PER_METRE: f64 = 100.0;

/// Coordinate reference systems the store may use for node positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinateSystem {
    /// Longitude/latitude stored as 1e-7 degree integers.
    Wgs84,
    /// Spherical mercator easting/northing stored as centimetres.
    SphericalMercator,
}

impl CoordinateSystem {
    /// Map a spatial reference id to a supported system.
    pub const fn from_srid(srid: i32) -> Option<Self> {
        match srid {
            WGS84_SRID => Some(Self::Wgs84),
            SPHERICAL_MERCATOR_SRID => Some(Self::SphericalMercator),
            _ => None,
        }
    }

    /// Spatial reference id of this system.
    pub const fn srid(self) -> i32 {
        match self {
            Self::Wgs84 => WGS84_SRID,
            Self::SphericalMercator => SPHERICAL_MERCATOR_SRID,
        }
    }

    /// Convert a stored position to WGS84 (`x = longitude`, `y = latitude`).
    pub fn to_wgs84(self, position: RawPosition) -> Coord<f64> {
        match self {
            Self::Wgs84 => Coord {
                x: position.lon as f64 / DECIMICRO_PER_DEGREE,
                y: position.lat as f64 / DECIMICRO_PER_DEGREE,
            },
            Self::SphericalMercator => {
                let easting = position.lon as f64 / CENTIMETRES_PER_METRE;
                let northing = position.lat as f64 / CENTIMETRES_PER_METRE;
                Coord {
                    x: (easting / EARTH_RADIUS_METRES).to_degrees(),
                    y: (2.0 * (northing / EARTH_RADIUS_METRES).exp().atan() - FRAC_PI_2)
                        .to_degrees(),
                }
            }
        }
    }
}

/// Resolves way ids to tags and WGS84 lines.
#[derive(Debug)]
pub struct GeometryFetcher<'s, S: ?Sized> {
    store: &'s S,
    coordinate_system: CoordinateSystem,
}

impl<S: ?Sized> Clone for GeometryFetcher<'_, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S: ?Sized> Copy for GeometryFetcher<'_, S> {}

impl<'s, S: RouteStore + ?Sized> GeometryFetcher<'s, S> {
    /// Read the store's SRID and build a fetcher for it.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::UnsupportedCoordinateSystem`] unless the store
    /// declares WGS84 or spherical mercator positions.
    pub fn detect(store: &'s S) -> Result<Self, PipelineError> {
        let srid = store.srid()?;
        let coordinate_system = CoordinateSystem::from_srid(srid)
            .ok_or(PipelineError::UnsupportedCoordinateSystem { srid })?;
        debug!("route store positions use SRID {srid}");
        Ok(Self::with_coordinate_system(store, coordinate_system))
    }

    /// Build a fetcher with a known coordinate system.
    pub const fn with_coordinate_system(store: &'s S, coordinate_system: CoordinateSystem) -> Self {
        Self {
            store,
            coordinate_system,
        }
    }

    /// Coordinate system the fetcher reprojects from.
    pub const fn coordinate_system(&self) -> CoordinateSystem {
        self.coordinate_system
    }

    /// Resolve `way_id` into its tags and line.
    ///
    /// A missing way yields empty tags and no line. Node references without a
    /// stored position are skipped; fewer than two remaining coordinates
    /// yield no line.
    pub fn fetch(&self, way_id: i64) -> Result<GroupWay, StoreError> {
        let Some(way) = self.store.way(way_id)? else {
            debug!("way {way_id} is missing; emitting it without geometry");
            return Ok(GroupWay {
                way_id,
                tags: Tags::new(),
                line: None,
            });
        };

        let positions = self.store.node_positions(&way.nodes)?;
        let coords: Vec<Coord<f64>> = way
            .nodes
            .iter()
            .filter_map(|node_id| positions.get(node_id))
            .map(|position| self.coordinate_system.to_wgs84(*position))
            .collect();

        let skipped = way.nodes.len() - coords.len();
        if skipped > 0 {
            warn!("way {way_id}: skipped {skipped} node references without positions");
        }

        let line = (coords.len() >= 2).then(|| LineString::from(coords));
        Ok(GroupWay {
            way_id,
            tags: way.tags,
            line,
        })
    }
}
