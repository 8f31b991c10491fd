//! Notification channel from layers and surfaces to the front end.

use std::sync::Arc;

/// Messenger is used by layers and map surfaces to notify the application that something they
/// display has changed and the screen should be updated.
pub trait Messenger: Send + Sync {
    /// Requests the surface to be redrawn.
    fn request_redraw(&self);
}

impl<T: Messenger + ?Sized> Messenger for Arc<T> {
    fn request_redraw(&self) {
        (**self).request_redraw()
    }
}
