//! Render scheduler
//!
//! Decouples "a result became available" from "redraw the output". Any number of [`RenderScheduler::notify`] calls
//! between two refresh opportunities collapse into a single render.
//!
//! A refresh opportunity comes from a [`FrameClock`]: a single-shot deferred callback primitive. The scheduler
//! keeps one `pending` flag:
//!
//! - `notify()` sets it and requests a frame, unless it was already set.
//! - the frame callback clears it *before* rendering, so a notify that arrives during the render schedules a
//!   fresh frame instead of being lost.
//! - `flush()` renders immediately if something is pending; the frame callback that is still queued then finds
//!   nothing pending and does nothing. The run entry point flushes at the end so the terminal state is always drawn.
//!
//! Frame renders happen at most once per frame. The end-of-run flush is the one exception: it does not wait for a
//! frame boundary, so it may draw in the same interval as a frame render that came just before it.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::io;
use std::rc::{Rc, Weak};
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, warn};

/// Callback to run at the next refresh opportunity.
pub type FrameCallback = Box<dyn FnOnce()>;

/// A source of refresh opportunities.
pub trait FrameClock {
    /// Run `callback` once, at the next refresh opportunity.
    fn request_frame(&self, callback: FrameCallback);
}

/// Frame clock backed by tokio timers.
///
/// Frame boundaries sit at `origin + k * interval`; a requested callback runs at the first boundary after the
/// request. Callbacks run on `spawn_local` tasks, so the clock must be used from within a
/// [`tokio::task::LocalSet`].
#[derive(Debug, Clone)]
pub struct TokioFrameClock {
    origin: Instant,
    interval: Duration,
}

impl TokioFrameClock {
    pub fn new(interval: Duration) -> Self {
        Self {
            origin: Instant::now(),
            interval,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// The first frame boundary strictly after `now`.
    pub fn next_boundary(&self, now: Instant) -> Instant {
        if self.interval.is_zero() {
            return now;
        }
        let interval = self.interval.as_nanos();
        let elapsed = now.saturating_duration_since(self.origin).as_nanos();
        let frames = elapsed / interval + 1;
        let offset = u64::try_from(frames * interval).unwrap_or(u64::MAX);
        self.origin + Duration::from_nanos(offset)
    }
}

impl FrameClock for TokioFrameClock {
    fn request_frame(&self, callback: FrameCallback) {
        let deadline = self.next_boundary(Instant::now());
        tokio::task::spawn_local(async move {
            tokio::time::sleep_until(deadline).await;
            callback();
        });
    }
}

/// Frame clock driven by hand.
///
/// Requested callbacks queue up until [`advance`](Self::advance) fires one frame. Clones share the queue.
#[derive(Clone, Default)]
pub struct ManualFrameClock {
    queue: Rc<RefCell<VecDeque<FrameCallback>>>,
}

impl ManualFrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of callbacks waiting for the next frame.
    pub fn pending_frames(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Fire one frame: run every callback requested before this call. Callbacks requested while the frame runs
    /// wait for the next one. Returns how many callbacks ran.
    pub fn advance(&self) -> usize {
        let due = std::mem::take(&mut *self.queue.borrow_mut());
        let count = due.len();
        for callback in due {
            callback();
        }
        count
    }
}

impl FrameClock for ManualFrameClock {
    fn request_frame(&self, callback: FrameCallback) {
        self.queue.borrow_mut().push_back(callback);
    }
}

/// Render procedure: draws the current aggregate snapshot.
pub type RenderFn = Box<dyn FnMut() -> io::Result<()>>;

struct SchedulerState {
    pending: Cell<bool>,
    renders: Cell<usize>,
    clock: Box<dyn FrameClock>,
    render: RefCell<RenderFn>,
}

impl SchedulerState {
    fn render(&self) -> io::Result<()> {
        self.renders.set(self.renders.get() + 1);
        let mut render = self.render.borrow_mut();
        (*render)()
    }

    fn on_frame(&self) {
        if !self.pending.replace(false) {
            return;
        }
        if let Err(err) = self.render() {
            warn!(error = %err, "render failed");
        }
    }
}

/// Coalesces render requests into at most one render per frame.
pub struct RenderScheduler {
    state: Rc<SchedulerState>,
}

impl RenderScheduler {
    pub fn new(clock: impl FrameClock + 'static, render: impl FnMut() -> io::Result<()> + 'static) -> Self {
        Self::with_boxed(Box::new(clock), Box::new(render))
    }

    pub fn with_boxed(clock: Box<dyn FrameClock>, render: RenderFn) -> Self {
        Self {
            state: Rc::new(SchedulerState {
                pending: Cell::new(false),
                renders: Cell::new(0),
                clock,
                render: RefCell::new(render),
            }),
        }
    }

    /// Request a render at the next frame. No-op while one is already pending.
    pub fn notify(&self) {
        if self.state.pending.replace(true) {
            return;
        }
        debug!("render scheduled");
        let state: Weak<SchedulerState> = Rc::downgrade(&self.state);
        self.state.clock.request_frame(Box::new(move || {
            if let Some(state) = state.upgrade() {
                state.on_frame();
            }
        }));
    }

    /// Render now if a render is pending, without waiting for the next frame. Returns whether a render happened.
    pub fn flush(&self) -> io::Result<bool> {
        if !self.state.pending.replace(false) {
            return Ok(false);
        }
        self.state.render()?;
        Ok(true)
    }

    pub fn is_pending(&self) -> bool {
        self.state.pending.get()
    }

    /// Number of renders performed so far.
    pub fn render_count(&self) -> usize {
        self.state.renders.get()
    }
}
