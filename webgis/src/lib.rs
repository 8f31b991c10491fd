//! `webgis` shows administrative boundaries of Iran (provinces and counties) served by a
//! GeoServer instance over a choice of base maps, and tells the user which region they clicked.
//!
//! # Surfaces
//!
//! There are two map surfaces and exactly one of them is visible:
//!
//! * the [primary surface](primary::PrimaryMap), a Web Mercator [`Map`] with OpenStreetMap and
//!   CARTO [raster tile layers](layer::RasterTileLayer), the provinces GeoJSON file as a
//!   [feature layer](layer::FeatureLayer), and the counties both as a [WMS layer](layer::WmsLayer)
//!   and as WFS features loaded by view extent;
//! * the [secondary surface](surface::SecondaryMap), a commercial map widget working in
//!   geographic coordinates, which gets its boundary layers fetched again every time it is shown.
//!
//! # Viewer
//!
//! [`Viewer`](viewer::Viewer) owns both surfaces, the state of the controls and the
//! [status line](status::StatusDisplay). It is driven by [`ViewerEvent`](viewer::ViewerEvent)s:
//!
//! ```no_run
//! use std::sync::Arc;
//! use webgis::config::ViewerConfig;
//! use webgis::platform::NativePlatformService;
//! use webgis::viewer::{BaseLayerChoice, Viewer, ViewerEvent};
//! use webgis_types::latlon;
//!
//! # tokio_test::block_on(async {
//! let config = ViewerConfig::default();
//! let platform = Arc::new(NativePlatformService::new(&config.user_agent, &config.data_dir)?);
//! let mut viewer = Viewer::with_widget(config, platform, None)?;
//! viewer.start().await;
//!
//! viewer.handle_event(ViewerEvent::Pick(latlon!(32.65, 51.67)));
//! viewer.handle_event(ViewerEvent::SelectBase(BaseLayerChoice::Commercial));
//! viewer.run_until_idle().await;
//! println!("{}", viewer.status().text());
//! # Ok::<(), webgis::error::WebGisError>(())
//! # });
//! ```
//!
//! Clicks on the primary surface are resolved by hit-testing the boundary features, counties
//! first, and fall back to a WMS `GetFeatureInfo` query. Clicks on the secondary surface read the
//! [descriptor](boundary::FeatureDescriptor) attached to the clicked shape.

#![warn(clippy::unwrap_used)]
#![warn(missing_docs)]

pub(crate) mod async_runtime;
pub mod boundary;
mod color;
pub mod config;
pub mod control;
pub mod error;
pub mod layer;
mod lod;
mod map;
mod messenger;
pub mod picker;
pub mod platform;
pub mod primary;
pub mod status;
pub mod surface;
pub mod tile_schema;
mod view;
pub mod viewer;

#[cfg(test)]
mod tests;

pub use color::Color;
pub use lod::Lod;
pub use map::{LayerCollection, Map};
pub use messenger::Messenger;
pub use tile_schema::{TileIndex, TileSchema};
pub use view::MapView;

// Reexport webgis_types
pub use webgis_types;
