//! User interaction with the primary map surface.
//!
//! Input handling is done in several steps:
//! 1. Front end input is converted into a common [`RawUserEvent`] enum.
//! 2. `RawUserEvent` is given to the [`EventProcessor`], that converts it into [`UserEvent`]s
//!    (clicks, drags, scrolls), keeping track of pressed buttons and the pointer position.
//! 3. `EventProcessor` has a list of [`UserEventHandler`]s, which change the map based on the
//!    events. [`MapController`] pans and zooms the map. Events that no handler stops are returned
//!    to the caller, which is how clicks reach the feature picker.

use webgis_types::{Point2d, Vector2d};

use crate::map::Map;

mod event_processor;
mod map;

pub use event_processor::EventProcessor;
pub use map::{MapController, MapControllerConfiguration};

/// Handler of user events.
pub trait UserEventHandler: Send + Sync {
    /// Handles the event, possibly changing the map.
    fn handle(&self, event: &UserEvent, map: &mut Map) -> EventPropagation;
}

impl<T: for<'a> Fn(&'a UserEvent, &'a mut Map) -> EventPropagation> UserEventHandler for T
where
    T: Send + Sync,
{
    fn handle(&self, event: &UserEvent, map: &mut Map) -> EventPropagation {
        self(event, map)
    }
}

/// Input event as given by the front end.
#[derive(Debug, Clone, PartialEq)]
pub enum RawUserEvent {
    /// Mouse button pressed.
    ButtonPressed(MouseButton),
    /// Mouse button released.
    ButtonReleased(MouseButton),
    /// Pointer moved to the given position in pixels from the top-left corner of the surface.
    PointerMoved(Point2d),
    /// Scroll by the given number of wheel steps. Positive values zoom in.
    Scroll(f64),
}

/// Event produced by the [`EventProcessor`].
#[derive(Debug, Clone)]
pub enum UserEvent {
    /// Mouse button pressed.
    ButtonPressed(MouseButton, MouseEvent),
    /// Mouse button released.
    ButtonReleased(MouseButton, MouseEvent),
    /// Button was pressed and released quickly without moving the pointer.
    Click(MouseButton, MouseEvent),
    /// Pointer moved.
    PointerMoved(MouseEvent),
    /// Pointer moved with a button pressed. The event is given at the position where the
    /// button was pressed.
    ///
    /// A handler that returns [`EventPropagation::Consume`] receives the following `Drag` and
    /// `DragEnded` events.
    DragStarted(MouseButton, MouseEvent),
    /// Pointer moved by the given pixel delta while dragging.
    Drag(MouseButton, Vector2d, MouseEvent),
    /// Button released after dragging.
    DragEnded(MouseButton, MouseEvent),
    /// Scroll.
    Scroll(f64, MouseEvent),
}

/// What the [`EventProcessor`] does with an event after a handler returned.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EventPropagation {
    /// Give the event to the next handler.
    Propagate,
    /// Do not give the event to other handlers.
    Stop,
    /// Stop the event and capture the drag if the event is [`UserEvent::DragStarted`].
    Consume,
}

/// Mouse button.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MouseButton {
    /// Left button.
    Left,
    /// Middle button.
    Middle,
    /// Right button.
    Right,
    /// Any other button.
    Other,
}

/// Pointer state at the moment of an event.
#[derive(Debug, Clone, PartialEq)]
pub struct MouseEvent {
    /// Pointer position in pixels.
    pub screen_pointer_position: Point2d,
    /// Pointer position in map coordinates, `None` if the surface has no size.
    pub map_pointer_position: Option<Point2d>,
    /// Pressed buttons.
    pub buttons: MouseButtonsState,
}

/// State of a mouse button.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MouseButtonState {
    /// Button is pressed.
    Pressed,
    /// Button is not pressed.
    Released,
}

/// State of all mouse buttons.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct MouseButtonsState {
    /// State of the left mouse button.
    pub left: MouseButtonState,
    /// State of the middle mouse button.
    pub middle: MouseButtonState,
    /// State of the right mouse button.
    pub right: MouseButtonState,
}

impl MouseButtonsState {
    pub(crate) fn set_pressed(&mut self, button: MouseButton) {
        self.set_state(button, MouseButtonState::Pressed);
    }

    pub(crate) fn set_released(&mut self, button: MouseButton) {
        self.set_state(button, MouseButtonState::Released);
    }

    fn set_state(&mut self, button: MouseButton, state: MouseButtonState) {
        match button {
            MouseButton::Left => self.left = state,
            MouseButton::Middle => self.middle = state,
            MouseButton::Right => self.right = state,
            MouseButton::Other => {}
        }
    }

    fn single_pressed(&self) -> Option<MouseButton> {
        let mut button = None;
        if self.left == MouseButtonState::Pressed && button.replace(MouseButton::Left).is_some() {
            return None;
        }
        if self.middle == MouseButtonState::Pressed && button.replace(MouseButton::Middle).is_some()
        {
            return None;
        }
        if self.right == MouseButtonState::Pressed && button.replace(MouseButton::Right).is_some() {
            return None;
        }

        button
    }
}

impl Default for MouseButtonsState {
    fn default() -> Self {
        Self {
            left: MouseButtonState::Released,
            middle: MouseButtonState::Released,
            right: MouseButtonState::Released,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_pressed() {
        let mut state = MouseButtonsState::default();
        assert_eq!(state.single_pressed(), None);

        state.set_pressed(MouseButton::Left);
        assert_eq!(state.single_pressed(), Some(MouseButton::Left));

        state.set_pressed(MouseButton::Right);
        assert_eq!(state.single_pressed(), None);

        state.set_released(MouseButton::Left);
        assert_eq!(state.single_pressed(), Some(MouseButton::Right));
    }
}
