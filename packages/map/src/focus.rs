//! Shared map focus and the view that follows it.
//!
//! The focus is the only state that outlives a single advice request. One
//! [`MapFocus`] publishes coordinates; any number of [`MapView`]s observe
//! it and recentre when it moves.

use std::sync::Arc;

use crime_advice_geography_models::Coordinates;
use serde::Serialize;
use tokio::sync::watch;

/// Zoom level before any focus has been published.
pub const INITIAL_ZOOM: u8 = 8;

/// Zoom level after recentring on a published focus.
pub const FOCUS_ZOOM: u8 = 13;

/// Publisher side of the current map focus.
#[derive(Clone)]
pub struct MapFocus {
    tx: Arc<watch::Sender<Coordinates>>,
}

impl MapFocus {
    /// Creates a focus holder starting at `initial`.
    #[must_use]
    pub fn new(initial: Coordinates) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx: Arc::new(tx) }
    }

    /// Moves the focus. Returns `false` (and wakes nobody) when the focus
    /// is already at `coordinates`.
    pub fn publish(&self, coordinates: Coordinates) -> bool {
        self.tx.send_if_modified(|current| {
            if *current == coordinates {
                false
            } else {
                *current = coordinates;
                true
            }
        })
    }

    /// The current focus.
    #[must_use]
    pub fn current(&self) -> Coordinates {
        *self.tx.borrow()
    }

    /// Creates a view positioned at the current focus.
    #[must_use]
    pub fn subscribe(&self) -> MapView {
        MapView::new(self.tx.subscribe())
    }
}

impl Default for MapFocus {
    fn default() -> Self {
        Self::new(Coordinates::DEFAULT_FOCUS)
    }
}

/// Centre and zoom of a map view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Viewport {
    /// Point the view is centred on.
    pub center: Coordinates,
    /// Slippy-map zoom level.
    pub zoom: u8,
}

/// A map view following a [`MapFocus`].
pub struct MapView {
    rx: watch::Receiver<Coordinates>,
    viewport: Viewport,
}

impl MapView {
    fn new(mut rx: watch::Receiver<Coordinates>) -> Self {
        let center = *rx.borrow_and_update();
        Self {
            rx,
            viewport: Viewport {
                center,
                zoom: INITIAL_ZOOM,
            },
        }
    }

    /// Where the view is currently looking.
    #[must_use]
    pub const fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Applies a pending focus change without waiting. Returns whether the
    /// view moved.
    pub fn sync(&mut self) -> bool {
        if !self.rx.has_changed().unwrap_or(false) {
            return false;
        }
        let center = *self.rx.borrow_and_update();
        self.recentre(center);
        true
    }

    /// Waits for the next focus change and recentres on it.
    ///
    /// Returns `None` once every [`MapFocus`] handle has been dropped.
    pub async fn changed(&mut self) -> Option<Viewport> {
        self.rx.changed().await.ok()?;
        let center = *self.rx.borrow_and_update();
        self.recentre(center);
        Some(self.viewport)
    }

    fn recentre(&mut self, center: Coordinates) {
        log::debug!("Map view recentred on {center}");
        self.viewport = Viewport {
            center,
            zoom: FOCUS_ZOOM,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_starts_at_initial_focus_and_zoom() {
        let focus = MapFocus::default();
        let view = focus.subscribe();
        assert_eq!(
            view.viewport(),
            Viewport {
                center: Coordinates::new(52.633_331, -1.133_333),
                zoom: INITIAL_ZOOM,
            }
        );
    }

    #[test]
    fn sync_recentres_only_after_a_change() {
        let focus = MapFocus::default();
        let mut view = focus.subscribe();
        assert!(!view.sync());

        let london = Coordinates::new(51.507, -0.128);
        assert!(focus.publish(london));
        assert!(view.sync());
        assert_eq!(view.viewport().center, london);
        assert_eq!(view.viewport().zoom, FOCUS_ZOOM);

        assert!(!view.sync());
    }

    #[test]
    fn publishing_same_focus_is_not_a_change() {
        let focus = MapFocus::default();
        let mut view = focus.subscribe();
        assert!(!focus.publish(Coordinates::DEFAULT_FOCUS));
        assert!(!view.sync());
        assert_eq!(view.viewport().zoom, INITIAL_ZOOM);
    }

    #[test]
    fn late_subscriber_sees_current_focus() {
        let focus = MapFocus::default();
        let york = Coordinates::new(53.96, -1.08);
        focus.publish(york);

        let view = focus.subscribe();
        assert_eq!(view.viewport().center, york);
        assert_eq!(focus.current(), york);
    }

    #[tokio::test]
    async fn changed_wakes_on_publish() {
        let focus = MapFocus::default();
        let mut view = focus.subscribe();
        let leeds = Coordinates::new(53.8, -1.55);

        let publisher = focus.clone();
        tokio::spawn(async move {
            publisher.publish(leeds);
        });

        let viewport = view.changed().await.unwrap();
        assert_eq!(viewport.center, leeds);
        assert_eq!(viewport.zoom, FOCUS_ZOOM);
    }

    #[tokio::test]
    async fn changed_ends_when_focus_dropped() {
        let focus = MapFocus::default();
        let mut view = focus.subscribe();
        drop(focus);
        assert!(view.changed().await.is_none());
    }
}
