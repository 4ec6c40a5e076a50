//! Cancellable scheduled callbacks
//!
//! Stands in for `setTimeout` inside the fixed-step loop. The clock only moves
//! when the owner advances it, so pending work can never outlive its owner.

/// Handle to a scheduled event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

#[derive(Debug, Clone)]
struct Pending<E> {
    id: TimerId,
    due: f64,
    event: E,
}

/// Clock plus pending events, fired in due order (ties by schedule order)
#[derive(Debug, Clone)]
pub struct Timers<E> {
    now: f64,
    next_id: u64,
    pending: Vec<Pending<E>>,
}

impl<E> Default for Timers<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Timers<E> {
    pub fn new() -> Self {
        Self {
            now: 0.0,
            next_id: 1,
            pending: Vec::new(),
        }
    }

    /// Current clock reading (seconds)
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Schedule `event` to fire `delay` seconds from now
    pub fn schedule(&mut self, delay: f64, event: E) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.pending.push(Pending {
            id,
            due: self.now + delay.max(0.0),
            event,
        });
        id
    }

    /// Cancel a pending event. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|p| p.id != id);
        self.pending.len() != before
    }

    pub fn cancel_all(&mut self) {
        self.pending.clear();
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Move the clock forward and collect everything that came due
    pub fn advance(&mut self, dt: f64) -> Vec<(TimerId, E)> {
        self.now += dt.max(0.0);
        let now = self.now;

        let mut due: Vec<Pending<E>> = Vec::new();
        let mut i = 0;
        while i < self.pending.len() {
            if self.pending[i].due <= now {
                due.push(self.pending.remove(i));
            } else {
                i += 1;
            }
        }
        due.sort_by(|a, b| a.due.total_cmp(&b.due).then(a.id.0.cmp(&b.id.0)));
        due.into_iter().map(|p| (p.id, p.event)).collect()
    }
}
