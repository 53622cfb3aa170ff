//! Frame and timer scheduling.
//!
//! The host owns the clock.  Components only *request* work:
//!
//! - [`FrameScheduler`] is the requestAnimationFrame analogue.  A request is
//!   good for exactly one frame; loops re-request from inside their frame.
//! - [`TimerQueue`] holds delayed payloads, each individually cancellable.
//! - [`PhaseSequence`] is a fixed choreography of delayed phases on top of a
//!   timer queue (preloaders, staged reveals).
//!
//! Every handle can be cancelled, and teardown cancels everything an owner
//! still has outstanding, so nothing fires against unmounted state.

use std::time::Duration;

// ───────────────────────────────────────── frames ────────────

/// Identifies the loop a frame request belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LoopId(pub u32);

/// Token for one pending frame request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(u64);

#[derive(Debug, Default)]
pub struct FrameScheduler {
    next_handle: u64,
    pending: Vec<(FrameHandle, LoopId)>,
    /// Frames dispatched so far (monotonic).
    frame: u64,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask for `owner` to be called on the next frame.
    pub fn request(&mut self, owner: LoopId) -> FrameHandle {
        self.next_handle += 1;
        let handle = FrameHandle(self.next_handle);
        self.pending.push((handle, owner));
        handle
    }

    /// Drop a pending request.  Returns `false` if it already ran.
    pub fn cancel(&mut self, handle: FrameHandle) -> bool {
        let before = self.pending.len();
        self.pending.retain(|(h, _)| *h != handle);
        self.pending.len() != before
    }

    /// Cancel every request held by `owner`.
    pub fn cancel_owner(&mut self, owner: LoopId) {
        self.pending.retain(|(_, o)| *o != owner);
    }

    /// Start a frame: hand back the owners due now, in request order.
    ///
    /// Requests made while servicing these land in the following frame.
    pub fn take_due(&mut self) -> Vec<LoopId> {
        self.frame += 1;
        std::mem::take(&mut self.pending)
            .into_iter()
            .map(|(_, owner)| owner)
            .collect()
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn pending_for(&self, owner: LoopId) -> usize {
        self.pending.iter().filter(|(_, o)| *o == owner).count()
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }
}

// ───────────────────────────────────────── timers ────────────

/// Token for one scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

#[derive(Debug)]
struct Timer<T> {
    handle: TimerHandle,
    due: Duration,
    payload: T,
}

/// Delayed payloads keyed by absolute due time.
#[derive(Debug)]
pub struct TimerQueue<T> {
    next_handle: u64,
    timers: Vec<Timer<T>>,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self {
            next_handle: 0,
            timers: Vec::new(),
        }
    }
}

impl<T> TimerQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, now: Duration, delay: Duration, payload: T) -> TimerHandle {
        self.next_handle += 1;
        let handle = TimerHandle(self.next_handle);
        self.timers.push(Timer {
            handle,
            due: now + delay,
            payload,
        });
        handle
    }

    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.handle != handle);
        self.timers.len() != before
    }

    /// Fire everything due at or before `now`, earliest first.  Timers with
    /// equal due times fire in scheduling order.
    pub fn advance(&mut self, now: Duration) -> Vec<T> {
        let (mut due, waiting): (Vec<_>, Vec<_>) = std::mem::take(&mut self.timers)
            .into_iter()
            .partition(|t| t.due <= now);
        self.timers = waiting;
        due.sort_by_key(|t| (t.due, t.handle.0));
        due.into_iter().map(|t| t.payload).collect()
    }

    /// Earliest pending due time.
    pub fn next_due(&self) -> Option<Duration> {
        self.timers.iter().map(|t| t.due).min()
    }

    pub fn clear(&mut self) {
        self.timers.clear();
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }
}

// ───────────────────────────────────────── phases ────────────

/// A fixed list of `(delay from start, phase)` steps.
#[derive(Debug)]
pub struct PhaseSequence<P> {
    steps: Vec<(Duration, P)>,
    timers: TimerQueue<P>,
    current: Option<P>,
}

impl<P: Clone + PartialEq> PhaseSequence<P> {
    pub fn new(steps: Vec<(Duration, P)>) -> Self {
        Self {
            steps,
            timers: TimerQueue::new(),
            current: None,
        }
    }

    /// Schedule every step relative to `now`.  Restarting cancels whatever
    /// the previous run still had pending.
    pub fn start(&mut self, now: Duration) {
        self.timers.clear();
        self.current = None;
        for (delay, phase) in &self.steps {
            self.timers.schedule(now, *delay, phase.clone());
        }
    }

    /// Phases reached since the last call, in order.
    pub fn advance(&mut self, now: Duration) -> Vec<P> {
        let reached = self.timers.advance(now);
        if let Some(last) = reached.last() {
            self.current = Some(last.clone());
        }
        reached
    }

    /// Jump to the final phase, dropping the remaining timers.
    pub fn finish(&mut self) -> Option<P> {
        self.timers.clear();
        self.current = self.steps.last().map(|(_, p)| p.clone());
        self.current.clone()
    }

    /// Cancel every outstanding timer.  Safe to call more than once.
    pub fn teardown(&mut self) {
        self.timers.clear();
    }

    pub fn current(&self) -> Option<&P> {
        self.current.as_ref()
    }

    pub fn is_running(&self) -> bool {
        !self.timers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn frame_requests_last_one_frame() {
        let mut frames = FrameScheduler::new();
        frames.request(LoopId(1));
        frames.request(LoopId(2));
        assert_eq!(frames.take_due(), vec![LoopId(1), LoopId(2)]);
        assert_eq!(frames.pending(), 0);
        assert!(frames.take_due().is_empty());
        assert_eq!(frames.frame(), 2);
    }

    #[test]
    fn cancelled_frame_never_runs() {
        let mut frames = FrameScheduler::new();
        let handle = frames.request(LoopId(7));
        assert!(frames.cancel(handle));
        assert!(!frames.cancel(handle));
        assert!(frames.take_due().is_empty());
    }

    #[test]
    fn cancel_owner_only_touches_that_owner() {
        let mut frames = FrameScheduler::new();
        frames.request(LoopId(1));
        frames.request(LoopId(2));
        frames.request(LoopId(1));
        frames.cancel_owner(LoopId(1));
        assert_eq!(frames.pending_for(LoopId(1)), 0);
        assert_eq!(frames.pending_for(LoopId(2)), 1);
    }

    #[test]
    fn timers_fire_in_due_order() {
        let mut timers = TimerQueue::new();
        timers.schedule(ms(0), ms(300), "c");
        timers.schedule(ms(0), ms(100), "a");
        timers.schedule(ms(0), ms(200), "b");
        assert_eq!(timers.next_due(), Some(ms(100)));
        assert_eq!(timers.advance(ms(50)), Vec::<&str>::new());
        assert_eq!(timers.advance(ms(250)), vec!["a", "b"]);
        assert_eq!(timers.advance(ms(1000)), vec!["c"]);
        assert!(timers.is_empty());
    }

    #[test]
    fn cancelled_timer_does_not_fire() {
        let mut timers = TimerQueue::new();
        let a = timers.schedule(ms(0), ms(10), 1);
        timers.schedule(ms(0), ms(10), 2);
        assert!(timers.cancel(a));
        assert_eq!(timers.advance(ms(10)), vec![2]);
    }

    #[derive(Debug, Clone, PartialEq)]
    enum Phase {
        In,
        Out,
        Done,
    }

    fn sequence() -> PhaseSequence<Phase> {
        PhaseSequence::new(vec![
            (ms(0), Phase::In),
            (ms(400), Phase::Out),
            (ms(800), Phase::Done),
        ])
    }

    #[test]
    fn phases_advance_with_the_clock() {
        let mut seq = sequence();
        seq.start(ms(1000));
        assert_eq!(seq.advance(ms(1000)), vec![Phase::In]);
        assert_eq!(seq.advance(ms(1500)), vec![Phase::Out]);
        assert_eq!(seq.current(), Some(&Phase::Out));
        assert_eq!(seq.advance(ms(5000)), vec![Phase::Done]);
        assert!(!seq.is_running());
    }

    #[test]
    fn teardown_mid_sequence_drops_stale_phases() {
        let mut seq = sequence();
        seq.start(ms(0));
        seq.advance(ms(100));
        seq.teardown();
        assert!(seq.advance(ms(10_000)).is_empty());
        assert_eq!(seq.current(), Some(&Phase::In));
    }

    #[test]
    fn finish_skips_to_the_last_phase() {
        let mut seq = sequence();
        seq.start(ms(0));
        assert_eq!(seq.finish(), Some(Phase::Done));
        assert!(seq.advance(ms(10_000)).is_empty());
    }
}
