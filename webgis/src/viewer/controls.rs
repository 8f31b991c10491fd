use std::fmt::{Display, Formatter};
use std::str::FromStr;

use crate::boundary::BoundaryKind;
use crate::error::WebGisError;
use crate::primary::BaseTiles;

/// Options of the base layer radio selector.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum BaseLayerChoice {
    /// OpenStreetMap tiles on the primary surface.
    #[default]
    Osm,
    /// CARTO tiles on the primary surface.
    Carto,
    /// The commercial widget surface.
    Commercial,
}

impl BaseLayerChoice {
    /// Base tile layer of the primary surface for this choice, `None` for the commercial
    /// surface.
    pub fn tiles(&self) -> Option<BaseTiles> {
        match self {
            BaseLayerChoice::Osm => Some(BaseTiles::Osm),
            BaseLayerChoice::Carto => Some(BaseTiles::Carto),
            BaseLayerChoice::Commercial => None,
        }
    }

    /// Surface shown for this choice.
    pub fn surface(&self) -> ActiveSurface {
        match self.tiles() {
            Some(_) => ActiveSurface::Primary,
            None => ActiveSurface::Secondary,
        }
    }
}

impl FromStr for BaseLayerChoice {
    type Err = WebGisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "osm" => Ok(Self::Osm),
            "carto" => Ok(Self::Carto),
            "commercial" => Ok(Self::Commercial),
            _ => Err(WebGisError::Generic(format!(
                "unknown base layer {s}, expected osm, carto or commercial"
            ))),
        }
    }
}

impl Display for BaseLayerChoice {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            BaseLayerChoice::Osm => "osm",
            BaseLayerChoice::Carto => "carto",
            BaseLayerChoice::Commercial => "commercial",
        };
        f.write_str(name)
    }
}

/// Which map surface is shown. Exactly one is visible at a time.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ActiveSurface {
    /// The primary surface.
    Primary,
    /// The commercial widget surface.
    Secondary,
}

/// State of the viewer controls: the base layer radio and the two boundary checkboxes.
///
/// Both surfaces follow the checkboxes.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Controls {
    /// Selected base layer.
    pub base: BaseLayerChoice,
    /// Provinces checkbox.
    pub provinces: bool,
    /// Counties checkbox.
    pub counties: bool,
}

impl Default for Controls {
    fn default() -> Self {
        Self {
            base: BaseLayerChoice::Osm,
            provinces: true,
            counties: true,
        }
    }
}

impl Controls {
    /// State of the checkbox of the kind.
    pub fn is_checked(&self, kind: BoundaryKind) -> bool {
        match kind {
            BoundaryKind::Province => self.provinces,
            BoundaryKind::County => self.counties,
        }
    }

    /// Sets the checkbox of the kind.
    pub fn set_checked(&mut self, kind: BoundaryKind, checked: bool) {
        match kind {
            BoundaryKind::Province => self.provinces = checked,
            BoundaryKind::County => self.counties = checked,
        }
    }

    /// Checked boundary kinds, in fetch order.
    pub fn checked(&self) -> impl Iterator<Item = BoundaryKind> + '_ {
        BoundaryKind::ALL
            .into_iter()
            .filter(|kind| self.is_checked(*kind))
    }
}
