//! [`Viewer`] owns both map surfaces and keeps them in sync with the controls.
//!
//! All changes go through [`ViewerEvent`]s processed one at a time. Network requests are spawned
//! tasks that post their results back as events, so the viewer state is never touched from more
//! than one place.

use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::{mpsc, watch};
use webgis_types::{Crs, GeoPoint2d, Point2d, Size};

use crate::boundary::{decode_boundaries, BoundaryKind, Naming};
use crate::color::Color;
use crate::config::ViewerConfig;
use crate::control::{RawUserEvent, UserEvent};
use crate::error::WebGisError;
use crate::layer::feature_layer::{SimplePolygonSymbol, WfsQuery};
use crate::messenger::Messenger;
use crate::picker::{parse_feature_info, pick_secondary, PickOutcome};
use crate::platform::PlatformService;
use crate::primary::PrimaryMap;
use crate::status::StatusDisplay;
use crate::surface::{SecondaryMap, ShapeLayer, WidgetMap};
use crate::view::MapView;

mod controls;

pub use controls::{ActiveSurface, BaseLayerChoice, Controls};

/// Message processed by the [`Viewer`].
#[derive(Debug)]
pub enum ViewerEvent {
    /// Base layer radio changed.
    SelectBase(BaseLayerChoice),
    /// Boundary checkbox changed.
    SetBoundaryVisible(BoundaryKind, bool),
    /// Pointer input over the primary surface.
    Input(RawUserEvent),
    /// Click at a pixel of the active surface.
    Click(Point2d),
    /// Click at a geographic point of the active surface.
    Pick(GeoPoint2d),
    /// Both surfaces changed size.
    Resize(Size),
    /// A boundary document for the secondary surface was fetched.
    BoundariesLoaded {
        /// Layer generation the fetch was issued for.
        generation: u64,
        /// Kind of the fetched boundaries.
        kind: BoundaryKind,
        /// Fetched document.
        result: Result<Bytes, WebGisError>,
    },
    /// A `GetFeatureInfo` answer arrived.
    FeatureInfoLoaded(Result<Bytes, WebGisError>),
    /// Stops [`Viewer::run`].
    Shutdown,
}

/// Boundary viewer with a primary map surface and a commercial widget surface.
///
/// Exactly one surface is visible. Selecting the commercial base layer copies the primary
/// viewport to the widget and rebuilds its boundary layers from fresh fetches; selecting a tile
/// base layer shows the primary surface at the initial view.
///
/// Every rebuild of the widget layers starts a new generation, and fetch results of older
/// generations are dropped, so fast checkbox toggling never leaves duplicate layers.
pub struct Viewer {
    config: ViewerConfig,
    platform: Arc<dyn PlatformService>,
    primary: PrimaryMap,
    secondary: Box<dyn SecondaryMap>,
    controls: Controls,
    active: ActiveSurface,
    surface_size: Size,
    status: StatusDisplay,
    sender: mpsc::UnboundedSender<ViewerEvent>,
    receiver: mpsc::UnboundedReceiver<ViewerEvent>,
    generation: u64,
    pending: usize,
}

impl Viewer {
    /// Creates a viewer with the given secondary surface. The primary surface is shown with the
    /// OSM base layer and both boundary layers checked.
    pub fn new(
        config: ViewerConfig,
        platform: Arc<dyn PlatformService>,
        mut secondary: Box<dyn SecondaryMap>,
        messenger: Option<Arc<dyn Messenger>>,
    ) -> Result<Self, WebGisError> {
        config.validate()?;

        let primary = PrimaryMap::new(&config, platform.clone(), messenger)?;
        secondary.set_visible(false);
        secondary.set_view(config.initial_view);

        let (sender, receiver) = mpsc::unbounded_channel();
        Ok(Self {
            surface_size: config.surface_size(),
            config,
            platform,
            primary,
            secondary,
            controls: Controls::default(),
            active: ActiveSurface::Primary,
            status: StatusDisplay::new(),
            sender,
            receiver,
            generation: 0,
            pending: 0,
        })
    }

    /// Creates a viewer with the built-in [`WidgetMap`] as the secondary surface.
    pub fn with_widget(
        config: ViewerConfig,
        platform: Arc<dyn PlatformService>,
        messenger: Option<Arc<dyn Messenger>>,
    ) -> Result<Self, WebGisError> {
        let widget = WidgetMap::new(config.widget_options(), messenger.clone());
        Self::new(config, platform, Box::new(widget), messenger)
    }

    /// Loads the boundary layers of the primary surface for the initial view and starts loading
    /// its tiles. Must be called within a tokio runtime.
    pub async fn start(&mut self) {
        self.primary.load_boundaries().await;
        self.primary.load_layers();
    }

    /// Sender to post events to the viewer from other tasks.
    pub fn sender(&self) -> mpsc::UnboundedSender<ViewerEvent> {
        self.sender.clone()
    }

    /// Processes events until [`ViewerEvent::Shutdown`] is received.
    pub async fn run(&mut self) {
        while let Some(event) = self.receiver.recv().await {
            if !self.handle_event(event) {
                break;
            }
        }
    }

    /// Processes queued events and waits for all requests in flight to complete.
    ///
    /// Returns false if [`ViewerEvent::Shutdown`] was processed.
    pub async fn run_until_idle(&mut self) -> bool {
        loop {
            let event = match self.receiver.try_recv() {
                Ok(event) => event,
                Err(_) if self.pending == 0 => return true,
                Err(_) => match self.receiver.recv().await {
                    Some(event) => event,
                    None => return true,
                },
            };

            if !self.handle_event(event) {
                return false;
            }
        }
    }

    /// Processes a single event. Returns false for [`ViewerEvent::Shutdown`].
    ///
    /// Must be called within a tokio runtime, since events may start requests.
    pub fn handle_event(&mut self, event: ViewerEvent) -> bool {
        match event {
            ViewerEvent::SelectBase(choice) => self.select_base(choice),
            ViewerEvent::SetBoundaryVisible(kind, is_visible) => {
                self.set_boundary_visible(kind, is_visible)
            }
            ViewerEvent::Input(event) => self.handle_input(event),
            ViewerEvent::Click(px_position) => self.click(px_position),
            ViewerEvent::Pick(point) => self.pick(&point),
            ViewerEvent::Resize(size) => {
                self.surface_size = size;
                self.primary.set_size(size);
            }
            ViewerEvent::BoundariesLoaded {
                generation,
                kind,
                result,
            } => {
                self.pending = self.pending.saturating_sub(1);
                self.insert_boundaries(generation, kind, result);
            }
            ViewerEvent::FeatureInfoLoaded(result) => {
                self.pending = self.pending.saturating_sub(1);
                self.show_feature_info(result);
            }
            ViewerEvent::Shutdown => return false,
        }

        true
    }

    /// Status display.
    pub fn status(&self) -> &StatusDisplay {
        &self.status
    }

    /// Receiver observing the status text.
    pub fn subscribe_status(&self) -> watch::Receiver<String> {
        self.status.subscribe()
    }

    /// State of the controls.
    pub fn controls(&self) -> Controls {
        self.controls
    }

    /// Visible surface.
    pub fn active_surface(&self) -> ActiveSurface {
        self.active
    }

    /// The primary surface.
    pub fn primary(&self) -> &PrimaryMap {
        &self.primary
    }

    /// The secondary surface.
    pub fn secondary(&self) -> &dyn SecondaryMap {
        &*self.secondary
    }

    /// Number of requests whose results were not processed yet.
    pub fn pending_requests(&self) -> usize {
        self.pending
    }

    fn select_base(&mut self, choice: BaseLayerChoice) {
        log::debug!("Base layer selected: {choice}");
        self.controls.base = choice;
        self.active = choice.surface();

        match choice.tiles() {
            None => {
                self.primary.set_visible(false);
                self.secondary.set_visible(true);
                match self.primary.viewport() {
                    Some(viewport) => self.secondary.set_view(viewport),
                    None => {
                        log::warn!("Primary view cannot be converted to geographic coordinates")
                    }
                }
                self.rebuild_secondary_layers();
            }
            Some(tiles) => {
                // Results of fetches issued for the widget are not needed anymore.
                self.generation += 1;
                self.secondary.set_visible(false);
                self.primary.set_visible(true);
                self.primary.select_base(tiles);
                self.primary.reset_view();
            }
        }
    }

    fn set_boundary_visible(&mut self, kind: BoundaryKind, is_visible: bool) {
        self.controls.set_checked(kind, is_visible);
        self.primary.set_boundary_visible(kind, is_visible);
        if self.active == ActiveSurface::Secondary {
            self.rebuild_secondary_layers();
        }
    }

    fn rebuild_secondary_layers(&mut self) {
        self.generation += 1;
        self.secondary.clear_layers();

        let kinds: Vec<_> = self.controls.checked().collect();
        for kind in kinds {
            self.fetch_secondary_boundaries(kind);
        }
    }

    fn secondary_url(&self, kind: BoundaryKind) -> String {
        match kind {
            BoundaryKind::Province => self.config.provinces_url.clone(),
            BoundaryKind::County => {
                WfsQuery::new(self.config.wfs_url(), &self.config.counties_layer, Crs::WGS84)
                    .get_feature_url(None)
            }
        }
    }

    fn fetch_secondary_boundaries(&mut self, kind: BoundaryKind) {
        let url = self.secondary_url(kind);
        let generation = self.generation;
        let platform = self.platform.clone();
        let sender = self.sender.clone();

        self.pending += 1;
        crate::async_runtime::spawn(async move {
            let result = platform.load_bytes_from_url(&url).await;
            if sender
                .send(ViewerEvent::BoundariesLoaded {
                    generation,
                    kind,
                    result,
                })
                .is_err()
            {
                log::debug!("Viewer is gone, dropping {kind} boundaries from {url}");
            }
        });
    }

    fn insert_boundaries(
        &mut self,
        generation: u64,
        kind: BoundaryKind,
        result: Result<Bytes, WebGisError>,
    ) {
        if generation != self.generation {
            log::debug!(
                "Dropping {kind} boundaries of generation {generation}, current is {}",
                self.generation
            );
            return;
        }

        let features = result.and_then(|bytes| {
            decode_boundaries(&bytes, Naming::Kind(kind), &Crs::WGS84, &Crs::WGS84)
        });
        match features {
            Ok(features) => {
                log::info!("Adding {} {kind} shapes to the widget", features.len());
                let layer = ShapeLayer::from_features(kind, features, secondary_symbol(kind));
                self.secondary.insert_layer(layer);
            }
            Err(err) => log::warn!("Failed to load {kind} boundaries for the widget: {err}"),
        }
    }

    fn handle_input(&mut self, event: RawUserEvent) {
        if self.active != ActiveSurface::Primary {
            log::debug!("Ignoring pointer input while the primary surface is hidden");
            return;
        }

        for event in self.primary.handle_input(event) {
            if let UserEvent::Click(_, mouse_event) = event {
                if let Some(point) = mouse_event.map_pointer_position {
                    let outcome = self.primary.pick(&point);
                    self.apply_outcome(outcome);
                }
            }
        }
    }

    fn click(&mut self, px_position: Point2d) {
        match self.active {
            ActiveSurface::Primary => {
                if let Some(point) = self.primary.screen_to_map(px_position) {
                    let outcome = self.primary.pick(&point);
                    self.apply_outcome(outcome);
                }
            }
            ActiveSurface::Secondary => {
                if let Some(point) = self.secondary_screen_to_geo(px_position) {
                    self.pick(&point);
                }
            }
        }
    }

    fn pick(&mut self, point: &GeoPoint2d) {
        let outcome = match self.active {
            ActiveSurface::Primary => match Crs::EPSG3857.get_projection().project(point) {
                Some(projected) => self.primary.pick(&projected),
                None => PickOutcome::Clear,
            },
            ActiveSurface::Secondary => pick_secondary(&*self.secondary, point),
        };

        self.apply_outcome(outcome);
    }

    fn secondary_screen_to_geo(&self, px_position: Point2d) -> Option<GeoPoint2d> {
        let viewport = self.secondary.view();
        let view = MapView::from_zoom(&viewport.center, viewport.zoom).with_size(self.surface_size);
        let point = view.screen_to_map(px_position)?;
        view.crs().get_projection().unproject(&point)
    }

    fn apply_outcome(&mut self, outcome: PickOutcome) {
        match outcome {
            PickOutcome::Feature(descriptor) => self.status.set(descriptor.status_text()),
            PickOutcome::QueryServer(url) => self.query_feature_info(url),
            PickOutcome::Clear => self.status.clear(),
            PickOutcome::Keep => {}
        }
    }

    fn query_feature_info(&mut self, url: String) {
        let platform = self.platform.clone();
        let sender = self.sender.clone();

        self.pending += 1;
        crate::async_runtime::spawn(async move {
            let result = platform.load_bytes_from_url(&url).await;
            if sender.send(ViewerEvent::FeatureInfoLoaded(result)).is_err() {
                log::debug!("Viewer is gone, dropping feature info from {url}");
            }
        });
    }

    fn show_feature_info(&mut self, result: Result<Bytes, WebGisError>) {
        match result {
            Ok(bytes) => match parse_feature_info(&bytes) {
                Some(descriptor) => self.status.set(descriptor.status_text()),
                None => self.status.clear(),
            },
            Err(err) => log::warn!("Feature info request failed: {err}"),
        }
    }
}

fn secondary_symbol(kind: BoundaryKind) -> SimplePolygonSymbol {
    match kind {
        BoundaryKind::Province => SimplePolygonSymbol::new(Color::rgb_opacity(255, 0, 0, 0.05))
            .with_stroke_color(Color::RED)
            .with_stroke_width(1.0),
        BoundaryKind::County => SimplePolygonSymbol::new(Color::GRAY)
            .with_stroke_color(Color::BLACK)
            .with_stroke_width(1.0),
    }
}
