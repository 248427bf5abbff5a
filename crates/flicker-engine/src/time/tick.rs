use std::time::Duration;

/// Opaque handle identifying one outstanding tick request.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct TickHandle(u64);

impl TickHandle {
    #[inline]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }
}

/// One firing of the host's display-refresh primitive.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Tick {
    /// The request this firing answers.
    pub handle: TickHandle,

    /// Monotonic time since the host clock origin.
    pub timestamp: Duration,
}

/// Host-provided "call me at the next refresh" primitive.
///
/// A request is answered at most once. After `cancel_tick` returns, the cancelled
/// request must not be delivered.
pub trait TickSource {
    fn request_tick(&mut self) -> TickHandle;
    fn cancel_tick(&mut self, handle: TickHandle);
}

/// Single-slot tick source driven by the host loop.
///
/// The runtime calls [`fire`](Self::fire) once per display refresh; tests call it
/// with synthetic timestamps. Only the most recent request is kept.
#[derive(Debug, Default)]
pub struct TickSlot {
    next_id: u64,
    pending: Option<TickHandle>,
    requests: u64,
    cancels: u64,
}

impl TickSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delivers the outstanding request, if any, stamped with `timestamp`.
    pub fn fire(&mut self, timestamp: Duration) -> Option<Tick> {
        self.pending
            .take()
            .map(|handle| Tick { handle, timestamp })
    }

    #[inline]
    pub fn is_armed(&self) -> bool {
        self.pending.is_some()
    }

    #[inline]
    pub fn pending(&self) -> Option<TickHandle> {
        self.pending
    }

    /// Number of requests issued since creation.
    #[inline]
    pub fn requests(&self) -> u64 {
        self.requests
    }

    /// Number of cancellations that removed an outstanding request.
    #[inline]
    pub fn cancels(&self) -> u64 {
        self.cancels
    }
}

impl TickSource for TickSlot {
    fn request_tick(&mut self) -> TickHandle {
        let handle = TickHandle::new(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.requests += 1;
        self.pending = Some(handle);
        handle
    }

    fn cancel_tick(&mut self, handle: TickHandle) {
        if self.pending == Some(handle) {
            self.pending = None;
            self.cancels += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fire_without_request_yields_nothing() {
        let mut slot = TickSlot::new();
        assert_eq!(slot.fire(Duration::from_millis(16)), None);
    }

    #[test]
    fn request_is_delivered_once() {
        let mut slot = TickSlot::new();
        let h = slot.request_tick();

        let tick = slot.fire(Duration::from_millis(16)).unwrap();
        assert_eq!(tick.handle, h);
        assert_eq!(tick.timestamp, Duration::from_millis(16));

        assert!(!slot.is_armed());
        assert_eq!(slot.fire(Duration::from_millis(33)), None);
    }

    #[test]
    fn cancelled_request_never_fires() {
        let mut slot = TickSlot::new();
        let h = slot.request_tick();
        slot.cancel_tick(h);

        assert_eq!(slot.fire(Duration::from_millis(16)), None);
        assert_eq!(slot.cancels(), 1);
    }

    #[test]
    fn cancelling_a_superseded_handle_keeps_the_new_one() {
        let mut slot = TickSlot::new();
        let old = slot.request_tick();
        let new = slot.request_tick();
        assert_ne!(old, new);

        slot.cancel_tick(old);
        assert_eq!(slot.pending(), Some(new));
        assert_eq!(slot.cancels(), 0);
    }
}
