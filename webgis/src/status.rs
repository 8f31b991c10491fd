//! Status text shown under the map surfaces.

use tokio::sync::watch;

/// The status line of the viewer. Observers get notified of every change through
/// [`StatusDisplay::subscribe`].
#[derive(Debug)]
pub struct StatusDisplay {
    sender: watch::Sender<String>,
}

impl Default for StatusDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusDisplay {
    /// Creates an empty status display.
    pub fn new() -> Self {
        let (sender, _) = watch::channel(String::new());
        Self { sender }
    }

    /// Replaces the text.
    pub fn set(&self, text: impl Into<String>) {
        let text = text.into();
        log::debug!("Status: {text}");
        self.sender.send_replace(text);
    }

    /// Sets the text to the empty string.
    pub fn clear(&self) {
        self.set(String::new());
    }

    /// Current text.
    pub fn text(&self) -> String {
        self.sender.borrow().clone()
    }

    /// Returns a receiver observing the text.
    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.sender.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_clear() {
        let status = StatusDisplay::new();
        let mut receiver = status.subscribe();
        assert_eq!(status.text(), "");

        status.set("Province Name: Isfahan");
        assert!(receiver.has_changed().unwrap());
        assert_eq!(*receiver.borrow_and_update(), "Province Name: Isfahan");

        status.clear();
        assert_eq!(status.text(), "");
        assert_eq!(*receiver.borrow_and_update(), "");
    }
}
