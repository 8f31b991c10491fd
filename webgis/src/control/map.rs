use crate::control::{EventPropagation, MouseButton, UserEvent, UserEventHandler};
use crate::map::Map;
use crate::view::MapView;

const DEFAULT_MIN_ZOOM: u32 = 0;
const DEFAULT_MAX_ZOOM: u32 = 19;

/// Configuration of a [`MapController`].
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct MapControllerConfiguration {
    min_zoom: u32,
    max_zoom: u32,
}

impl Default for MapControllerConfiguration {
    fn default() -> Self {
        Self {
            min_zoom: DEFAULT_MIN_ZOOM,
            max_zoom: DEFAULT_MAX_ZOOM,
        }
    }
}

impl MapControllerConfiguration {
    /// The smallest zoom level the map can be zoomed out to.
    pub fn min_zoom(&self) -> u32 {
        self.min_zoom
    }

    /// Sets the smallest zoom level.
    pub fn with_min_zoom(mut self, zoom: u32) -> Self {
        self.min_zoom = zoom;
        self
    }

    /// The largest zoom level the map can be zoomed in to.
    pub fn max_zoom(&self) -> u32 {
        self.max_zoom
    }

    /// Sets the largest zoom level.
    pub fn with_max_zoom(mut self, zoom: u32) -> Self {
        self.max_zoom = zoom;
        self
    }
}

/// Pans the map with the left mouse button drag and zooms it by whole levels with scroll.
#[derive(Default, Copy, Clone, PartialEq, Debug)]
pub struct MapController {
    config: MapControllerConfiguration,
}

impl MapController {
    /// Creates a new controller.
    pub fn new(config: MapControllerConfiguration) -> Self {
        Self { config }
    }

    /// Configuration of the controller.
    pub fn config(&self) -> MapControllerConfiguration {
        self.config
    }

    fn adjust_target_view(&self, target: MapView) -> MapView {
        let zoom = target.zoom();
        if zoom < self.config.min_zoom {
            target.with_zoom(self.config.min_zoom)
        } else if zoom > self.config.max_zoom {
            target.with_zoom(self.config.max_zoom)
        } else {
            target
        }
    }
}

impl UserEventHandler for MapController {
    fn handle(&self, event: &UserEvent, map: &mut Map) -> EventPropagation {
        match event {
            UserEvent::DragStarted(MouseButton::Left | MouseButton::Other, _) => {
                EventPropagation::Consume
            }
            UserEvent::Drag(MouseButton::Left | MouseButton::Other, delta, e) => {
                let current_position = e.screen_pointer_position;
                let prev_position = current_position - *delta;

                let target = map
                    .view()
                    .translate_by_pixels(prev_position, current_position);
                map.set_view(target);

                EventPropagation::Stop
            }
            UserEvent::Scroll(delta, mouse_event) => {
                let levels = if *delta > 0.0 {
                    1
                } else if *delta < 0.0 {
                    -1
                } else {
                    return EventPropagation::Stop;
                };

                let target = map
                    .view()
                    .zoom_by(levels, mouse_event.screen_pointer_position);
                map.set_view(self.adjust_target_view(target));

                EventPropagation::Stop
            }
            _ => EventPropagation::Propagate,
        }
    }
}
