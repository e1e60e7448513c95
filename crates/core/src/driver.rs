//! Damped animation driver.
//!
//! Owns the current/target color state and converges the rendered pair
//! toward the resolved target a little each frame. The driver is an explicit
//! two-state machine: `Idle` means no frame is outstanding, `Animating`
//! means the host should keep ticking [`BackdropDriver::on_frame`] until it
//! reports convergence. Scroll events that stay inside one palette step and
//! barely move the resolved color are absorbed without any work.

use std::time::{Duration, Instant};

use crate::color::Hsl;
use crate::config::{BackdropSettings, ConfigManager};
use crate::palette::Palette;
use crate::surface::{BackdropSink, Viewport};

/// Loose tolerance (source scale): a same-step scroll must move the resolved
/// color at least this far before the in-flight target is replaced.
const RETARGET_EPS: f64 = 0.25;
/// Tight tolerance (source scale) at which the tween snaps to its target
/// exactly and stops.
const SNAP_EPS: f64 = 0.05;
/// Content mutations settle for this long before the layout recompute runs.
const MUTATION_DEBOUNCE: Duration = Duration::from_millis(50);

/// Whether the driver currently needs animation frames.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DriverState {
    Idle,
    Animating,
}

pub struct BackdropDriver {
    palette: Palette,
    tween_speed: f64,

    current_bg: Hsl,
    current_end: Hsl,
    target_bg: Hsl,
    target_end: Hsl,
    last_step: Option<usize>,

    state: DriverState,
    max_scroll: f64,
    // Last pair actually handed to the sink, as formatted CSS strings.
    // Comparing the rounded strings (not the raw floats) is what suppresses
    // writes on frames where rounding makes the output identical.
    last_written: Option<(String, String)>,
    force_write: bool,
    layout_due: Option<Instant>,
}

impl BackdropDriver {
    pub fn new(settings: &BackdropSettings) -> Result<Self, anyhow::Error> {
        ConfigManager::validate_settings(settings)?;
        let palette = Palette::new(settings)?;
        let bg = palette.top();
        let end = palette.end();

        Ok(Self {
            palette,
            tween_speed: settings.tween_speed,
            current_bg: bg,
            current_end: end,
            target_bg: bg,
            target_end: end,
            last_step: None,
            state: DriverState::Idle,
            max_scroll: 0.0,
            last_written: None,
            force_write: true,
            layout_due: None,
        })
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Startup: force the exact configured pair out (bypassing the tween),
    /// then evaluate the current scroll position once. Covers documents that
    /// come up already scrolled.
    pub fn init<V: Viewport, S: BackdropSink>(&mut self, viewport: &V, sink: &mut S) {
        self.force_write = true;
        self.write_if_changed(sink);
        self.recompute_layout(viewport);
        self.on_scroll(viewport);
        log::debug!(
            "driver initialized: max_scroll={:.0}, {} palette steps",
            self.max_scroll,
            self.palette.steps()
        );
    }

    /// Refresh the cached maximum scrollable distance.
    pub fn recompute_layout<V: Viewport>(&mut self, viewport: &V) {
        self.max_scroll = (viewport.content_height() - viewport.viewport_height()).max(0.0);
    }

    /// Resize invalidates the layout cache; the next scroll evaluation picks
    /// up the new geometry.
    pub fn on_resize<V: Viewport>(&mut self, viewport: &V) {
        self.recompute_layout(viewport);
    }

    /// Note a content mutation. Mutations arrive in bursts, so the actual
    /// recompute waits until [`Self::poll_layout`] sees the burst settle.
    pub fn on_content_mutated(&mut self, now: Instant) {
        self.layout_due = Some(now + MUTATION_DEBOUNCE);
    }

    /// Run a pending debounced layout recompute if it has come due.
    /// Returns true when the recompute ran.
    pub fn poll_layout<V: Viewport>(&mut self, viewport: &V, now: Instant) -> bool {
        match self.layout_due {
            Some(due) if now >= due => {
                self.layout_due = None;
                self.recompute_layout(viewport);
                true
            }
            _ => false,
        }
    }

    /// Scroll fraction for the current viewport state: 0 at the top, 1 at
    /// the bottom, 0 when the content cannot scroll at all.
    pub fn fraction<V: Viewport>(&self, viewport: &V) -> f64 {
        if self.max_scroll > 0.0 {
            (viewport.scroll_y().max(0.0) / self.max_scroll).min(1.0)
        } else {
            0.0
        }
    }

    /// React to a scroll position change.
    ///
    /// Crossing a step boundary always retargets. Inside one step the eased
    /// color still creeps, so the target is only replaced once the resolved
    /// pair drifts past the loose tolerance; anything closer is a no-op.
    pub fn on_scroll<V: Viewport>(&mut self, viewport: &V) {
        let frac = self.fraction(viewport);
        let step = self.palette.step_index(frac);
        let step_changed = self.last_step != Some(step);

        let resolved = self.palette.resolve(frac);
        if step_changed
            || !resolved.bg.within(self.target_bg, RETARGET_EPS)
            || !resolved.end.within(self.target_end, RETARGET_EPS)
        {
            self.last_step = Some(step);
            self.target_bg = resolved.bg;
            self.target_end = resolved.end;
            if self.state == DriverState::Idle {
                log::trace!("retarget at fraction {frac:.3} (step {step})");
            }
            self.state = DriverState::Animating;
        }
    }

    /// Advance one animation frame: move both colors toward their targets by
    /// the tween speed and write the pair if the rendered value changed.
    /// Returns true while further frames are needed.
    pub fn on_frame<S: BackdropSink>(&mut self, sink: &mut S) -> bool {
        if self.state == DriverState::Idle && !self.force_write {
            return false;
        }

        self.current_bg = self.current_bg.lerp_toward(self.target_bg, self.tween_speed);
        self.current_end = self.current_end.lerp_toward(self.target_end, self.tween_speed);
        self.write_if_changed(sink);

        if self.current_bg.within(self.target_bg, SNAP_EPS)
            && self.current_end.within(self.target_end, SNAP_EPS)
        {
            // Snap exact so floating-point residue never lingers, then stop.
            self.current_bg = self.target_bg;
            self.current_end = self.target_end;
            self.write_if_changed(sink);
            self.state = DriverState::Idle;
            return false;
        }

        true
    }

    fn write_if_changed<S: BackdropSink>(&mut self, sink: &mut S) {
        let bg_css = self.current_bg.to_css();
        let end_css = self.current_end.to_css();

        let changed = match &self.last_written {
            Some((bg, end)) => *bg != bg_css || *end != end_css,
            None => true,
        };
        if changed || self.force_write {
            sink.set_colors(self.current_bg, self.current_end);
            self.last_written = Some((bg_css, end_css));
            self.force_write = false;
        }
    }
}
