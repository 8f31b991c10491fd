use web_time::{Duration, SystemTime};
use webgis_types::{Point2d, Vector2d};

use crate::control::{
    EventPropagation, MouseButtonsState, MouseEvent, RawUserEvent, UserEvent, UserEventHandler,
};
use crate::map::Map;

const DRAG_THRESHOLD: f64 = 3.0;
const CLICK_TIMEOUT: Duration = Duration::from_millis(300);

/// Converts [`RawUserEvent`]s into [`UserEvent`]s and dispatches them to the handlers.
pub struct EventProcessor {
    handlers: Vec<Box<dyn UserEventHandler>>,
    pointer_position: Point2d,
    pointer_pressed_position: Point2d,
    buttons_state: MouseButtonsState,
    last_pressed_time: SystemTime,
    is_dragging: bool,
    drag_target: Option<usize>,
}

impl Default for EventProcessor {
    fn default() -> Self {
        Self {
            handlers: vec![],
            pointer_position: Point2d::origin(),
            pointer_pressed_position: Point2d::origin(),
            buttons_state: Default::default(),
            last_pressed_time: SystemTime::UNIX_EPOCH,
            is_dragging: false,
            drag_target: None,
        }
    }
}

impl EventProcessor {
    /// Adds a handler to the end of the handler list.
    pub fn add_handler(&mut self, handler: impl UserEventHandler + 'static) {
        self.handlers.push(Box::new(handler));
    }

    /// Current pointer position in pixels.
    pub fn pointer_position(&self) -> Point2d {
        self.pointer_position
    }

    /// Handles the raw event. Returns the produced events that none of the handlers stopped.
    pub fn handle(&mut self, event: RawUserEvent, map: &mut Map) -> Vec<UserEvent> {
        let mut unhandled = vec![];
        for user_event in self.process(event, map) {
            if self.dispatch(&user_event, map) {
                unhandled.push(user_event);
            }
        }

        unhandled
    }

    fn dispatch(&mut self, user_event: &UserEvent, map: &mut Map) -> bool {
        let is_drag_event = matches!(user_event, UserEvent::Drag(..) | UserEvent::DragEnded(..));
        if is_drag_event {
            let Some(handler) = self.drag_target.and_then(|index| self.handlers.get(index)) else {
                return true;
            };

            handler.handle(user_event, map);
            if matches!(user_event, UserEvent::DragEnded(..)) {
                self.drag_target = None;
            }
            return false;
        }

        for (index, handler) in self.handlers.iter().enumerate() {
            match handler.handle(user_event, map) {
                EventPropagation::Propagate => {}
                EventPropagation::Stop => return false,
                EventPropagation::Consume => {
                    if let UserEvent::DragStarted(..) = user_event {
                        self.drag_target = Some(index);
                    }
                    return false;
                }
            }
        }

        true
    }

    fn process(&mut self, event: RawUserEvent, map: &Map) -> Vec<UserEvent> {
        let now = SystemTime::now();
        match event {
            RawUserEvent::ButtonPressed(button) => {
                self.buttons_state.set_pressed(button);
                self.last_pressed_time = now;
                self.pointer_pressed_position = self.pointer_position;
                self.is_dragging = false;

                vec![UserEvent::ButtonPressed(button, self.get_mouse_event(map))]
            }
            RawUserEvent::ButtonReleased(button) => {
                self.buttons_state.set_released(button);
                let mut events = vec![UserEvent::ButtonReleased(
                    button,
                    self.get_mouse_event(map),
                )];

                if self.is_dragging {
                    self.is_dragging = false;
                    events.push(UserEvent::DragEnded(button, self.get_mouse_event(map)));
                } else if now.duration_since(self.last_pressed_time).unwrap_or_default()
                    < CLICK_TIMEOUT
                {
                    events.push(UserEvent::Click(button, self.get_mouse_event(map)));
                }

                events
            }
            RawUserEvent::PointerMoved(position) => {
                let prev_position = self.pointer_position;
                self.pointer_position = position;

                let mut events = vec![UserEvent::PointerMoved(self.get_mouse_event(map))];
                if let Some(button) = self.buttons_state.single_pressed() {
                    if !self.is_dragging
                        && taxicab_distance(&position, &self.pointer_pressed_position)
                            > DRAG_THRESHOLD
                    {
                        self.is_dragging = true;
                        events.push(UserEvent::DragStarted(
                            button,
                            self.get_mouse_event_pos(map, self.pointer_pressed_position),
                        ));
                        // The first drag covers the whole way from the pressed position.
                        events.push(UserEvent::Drag(
                            button,
                            position - self.pointer_pressed_position,
                            self.get_mouse_event(map),
                        ));
                    } else if self.is_dragging {
                        events.push(UserEvent::Drag(
                            button,
                            position - prev_position,
                            self.get_mouse_event(map),
                        ));
                    }
                }

                events
            }
            RawUserEvent::Scroll(delta) => {
                vec![UserEvent::Scroll(delta, self.get_mouse_event(map))]
            }
        }
    }

    fn get_mouse_event(&self, map: &Map) -> MouseEvent {
        self.get_mouse_event_pos(map, self.pointer_position)
    }

    fn get_mouse_event_pos(&self, map: &Map, screen_pointer_position: Point2d) -> MouseEvent {
        MouseEvent {
            screen_pointer_position,
            map_pointer_position: map.view().screen_to_map(screen_pointer_position),
            buttons: self.buttons_state,
        }
    }
}

fn taxicab_distance(a: &Point2d, b: &Point2d) -> f64 {
    let delta: Vector2d = a - b;
    delta.x.abs() + delta.y.abs()
}
