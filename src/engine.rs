// Copyright (c) 2026 rezky_nightky

use std::sync::mpsc::{Receiver, TryRecvError};
use std::time::Instant;

use log::{debug, info};

use crate::canvas::Canvas;
use crate::columns::{column_count, Drops};
use crate::renderer::{render_frame, RainParams};
use crate::runtime::ResizePolicy;
use crate::scheduler::Scheduler;
use crate::selector::Selector;
use crate::surface::{Surface, Viewport};

/// Whatever owns the screen the rain is drawn on.
pub trait Host {
    type Canvas: Canvas;

    /// `None` when no drawing surface is available right now.
    fn acquire_canvas(&mut self) -> Option<Self::Canvas>;

    fn viewport(&self) -> Viewport;

    fn subscribe_resize(&mut self) -> Receiver<Viewport>;
}

/// A running rain. Stopping it, or dropping it, releases the tick schedule
/// and the resize subscription; nothing is drawn afterwards.
#[must_use = "dropping the handle stops the rain"]
pub struct RainHandle<C: Canvas, S: Selector> {
    params: RainParams,
    policy: ResizePolicy,
    canvas: C,
    surface: Surface,
    drops: Drops,
    selector: S,
    scheduler: Scheduler,
    resizes: Option<Receiver<Viewport>>,
    ticks: u64,
}

/// Acquires a canvas, sizes it to the viewport, seeds the columns and
/// subscribes to resizes. Returns `None`, having subscribed to nothing,
/// when the host has no canvas to give.
pub fn start<H: Host, S: Selector>(
    host: &mut H,
    params: RainParams,
    policy: ResizePolicy,
    mut selector: S,
    now: Instant,
) -> Option<RainHandle<H::Canvas, S>> {
    let Some(mut canvas) = host.acquire_canvas() else {
        debug!("rain not started: no canvas available");
        return None;
    };

    let mut surface = Surface::default();
    surface.resize(host.viewport(), &mut canvas);

    let drops = Drops::initialize(
        column_count(surface.width, params.glyph_width),
        params.seeding,
        surface,
        params.row_scale(),
        &mut selector,
    );
    let scheduler = Scheduler::start(params.interval, now);
    let resizes = host.subscribe_resize();

    info!(
        "rain started: {}x{} px, {} columns, every {:?}",
        surface.width,
        surface.height,
        drops.len(),
        scheduler.period()
    );

    Some(RainHandle {
        params,
        policy,
        canvas,
        surface,
        drops,
        selector,
        scheduler,
        resizes: Some(resizes),
        ticks: 0,
    })
}

impl<C: Canvas, S: Selector> RainHandle<C, S> {
    /// Applies pending resizes and runs the tick if one is due.
    /// Returns whether a frame was drawn.
    pub fn pump(&mut self, now: Instant) -> bool {
        if !self.is_running() {
            return false;
        }
        self.drain_resizes();
        if !self.scheduler.fire(now) {
            return false;
        }
        render_frame(
            &self.params,
            self.surface,
            &mut self.drops,
            &mut self.canvas,
            &mut self.selector,
        );
        self.ticks += 1;
        true
    }

    fn drain_resizes(&mut self) {
        let mut latest = None;
        let mut disconnected = false;
        if let Some(rx) = &self.resizes {
            loop {
                match rx.try_recv() {
                    Ok(vp) => latest = Some(vp),
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        disconnected = true;
                        break;
                    }
                }
            }
        }
        if disconnected {
            self.resizes = None;
        }
        if let Some(vp) = latest {
            self.apply_resize(vp);
        }
    }

    fn apply_resize(&mut self, viewport: Viewport) {
        if !self.surface.resize(viewport, &mut self.canvas) {
            return;
        }
        debug!("surface resized to {}x{}", viewport.width, viewport.height);
        if self.policy == ResizePolicy::Reflow {
            let columns = column_count(self.surface.width, self.params.glyph_width);
            self.drops.reconcile(
                columns,
                self.params.seeding,
                self.surface,
                self.params.row_scale(),
                &mut self.selector,
            );
            debug!("columns reflowed to {}", self.drops.len());
        }
    }

    /// Cancels the schedule and drops the resize subscription. Idempotent.
    pub fn stop(&mut self) {
        if self.scheduler.is_cancelled() {
            return;
        }
        self.scheduler.cancel();
        self.resizes = None;
        info!("rain stopped after {} ticks", self.ticks);
    }

    pub fn is_running(&self) -> bool {
        !self.scheduler.is_cancelled()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.scheduler.next_deadline()
    }

    #[cfg(test)]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    #[cfg(test)]
    pub fn surface(&self) -> Surface {
        self.surface
    }

    #[cfg(test)]
    pub fn drops(&self) -> &Drops {
        &self.drops
    }

    pub fn canvas(&self) -> &C {
        &self.canvas
    }

    pub fn canvas_mut(&mut self) -> &mut C {
        &mut self.canvas
    }
}

impl<C: Canvas, S: Selector> Drop for RainHandle<C, S> {
    fn drop(&mut self) {
        self.stop();
    }
}
