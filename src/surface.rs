// Copyright (c) 2026 rezky_nightky

use std::sync::mpsc::{channel, Receiver, Sender};

use crate::canvas::Canvas;

/// Current viewport dimensions in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

/// Dimensions of the drawing surface an engine renders into.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Surface {
    pub width: u32,
    pub height: u32,
}

impl Surface {
    /// Matches the surface (and the canvas backing it) to the viewport.
    /// Returns false when nothing changed.
    pub fn resize<C: Canvas>(&mut self, viewport: Viewport, canvas: &mut C) -> bool {
        if self.width == viewport.width
            && self.height == viewport.height
            && canvas.size() == (viewport.width, viewport.height)
        {
            return false;
        }
        self.width = viewport.width;
        self.height = viewport.height;
        canvas.set_size(self.width, self.height);
        true
    }
}

/// Fans viewport changes out to subscribers. Dropping a receiver
/// unsubscribes it; dead subscribers are pruned on the next publish.
#[derive(Debug, Default)]
pub struct ResizeBus {
    subscribers: Vec<Sender<Viewport>>,
}

impl ResizeBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self) -> Receiver<Viewport> {
        let (tx, rx) = channel();
        self.subscribers.push(tx);
        rx
    }

    pub fn publish(&mut self, viewport: Viewport) {
        self.subscribers.retain(|tx| tx.send(viewport).is_ok());
    }

    #[cfg(test)]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::mock::MockCanvas;

    #[test]
    fn resize_tracks_viewport() {
        let mut canvas = MockCanvas::new();
        let mut s = Surface::default();
        assert!(s.resize(Viewport { width: 300, height: 200 }, &mut canvas));
        assert_eq!(s, Surface { width: 300, height: 200 });
        assert_eq!(canvas.size(), (300, 200));
    }

    #[test]
    fn resize_with_same_viewport_is_idempotent() {
        let mut canvas = MockCanvas::new();
        let mut s = Surface::default();
        let vp = Viewport { width: 640, height: 480 };
        assert!(s.resize(vp, &mut canvas));
        assert!(!s.resize(vp, &mut canvas));
        assert!(!s.resize(vp, &mut canvas));
        assert_eq!(canvas.set_size_calls, 1);
    }

    #[test]
    fn dropped_receivers_are_pruned() {
        let mut bus = ResizeBus::new();
        let keep = bus.subscribe();
        let gone = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);

        drop(gone);
        bus.publish(Viewport { width: 1, height: 2 });
        assert_eq!(bus.subscriber_count(), 1);
        assert_eq!(keep.try_recv().unwrap(), Viewport { width: 1, height: 2 });
    }
}
