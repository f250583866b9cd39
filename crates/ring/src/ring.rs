//! Single-producer, multi-consumer ring buffer.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use parking_lot::Mutex;

use crate::error::RingError;

/// A fixed-capacity circular buffer.
///
/// One producer pushes; any number of independent consumers may pull,
/// each owning its own read cursor rather than sharing one on the ring
/// itself — [`PacketCache`](crate::cache::PacketCache) hands every sink
/// its own cursor into the same underlying slots for exactly this reason.
/// A write overtaking a not-yet-read slot silently discards the old
/// occupant; a consumer that falls more than `capacity` slots behind
/// loses data.
pub struct Ring<T> {
    slots: Box<[Mutex<Option<T>>]>,
    mask: u64,
    write_cursor: AtomicU64,
    closed: AtomicBool,
    notify: tokio::sync::Notify,
}

/// Starting position for a freshly created consumer cursor.
pub const INITIAL_CURSOR: u64 = 1;

impl<T> Ring<T> {
    /// Creates a ring of the given capacity, which must be a power of two.
    pub fn new(capacity: u64) -> Result<Self, RingError> {
        if capacity == 0 || (capacity & (capacity - 1)) != 0 {
            return Err(RingError::CapacityNotPowerOfTwo(capacity));
        }

        let slots = (0..capacity).map(|_| Mutex::new(None)).collect::<Vec<_>>().into_boxed_slice();

        Ok(Self {
            slots,
            mask: capacity - 1,
            write_cursor: AtomicU64::new(0),
            closed: AtomicBool::new(false),
            notify: tokio::sync::Notify::new(),
        })
    }

    /// The ring's capacity.
    pub fn capacity(&self) -> u64 {
        self.mask + 1
    }

    /// Pushes an item, overwriting whatever previously occupied its slot.
    /// Returns the new write cursor.
    pub fn push(&self, item: T) -> u64 {
        let w = self.write_cursor.fetch_add(1, Ordering::AcqRel) + 1;
        let idx = (w & self.mask) as usize;
        *self.slots[idx].lock() = Some(item);
        self.notify.notify_waiters();
        w
    }

    /// Attempts to pull the item at `cursor` without waiting, advancing
    /// `cursor` on success.
    ///
    /// Returns `None` if that slot is empty, regardless of whether the
    /// ring is closed.
    pub fn try_pull(&self, cursor: &AtomicU64) -> Option<T> {
        let r = cursor.load(Ordering::Acquire);
        let idx = (r & self.mask) as usize;
        let item = self.slots[idx].lock().take()?;
        cursor.store(r + 1, Ordering::Release);
        Some(item)
    }

    /// Pulls the item at `cursor`, waiting for it to arrive if `blocking`
    /// is true and the ring is not closed.
    ///
    /// Returns `None` once the ring is closed and `cursor` has drained.
    pub async fn pull(&self, cursor: &AtomicU64, blocking: bool) -> Option<T> {
        loop {
            if let Some(item) = self.try_pull(cursor) {
                return Some(item);
            }

            if self.closed.load(Ordering::Acquire) {
                return None;
            }

            if !blocking {
                return None;
            }

            let notified = self.notify.notified();
            // Re-check after subscribing: a push between the failed try_pull
            // and this notified() call would otherwise be missed.
            if self.try_pull(cursor).is_some() {
                continue;
            }
            if self.closed.load(Ordering::Acquire) {
                return None;
            }
            notified.await;
        }
    }

    /// Marks the ring closed. Blocking pulls currently waiting are woken
    /// and return `None` once their cursor has drained; the ring never
    /// un-blocks itself after this without a call to [`Ring::reset`].
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
        self.notify.notify_waiters();
    }

    /// True once [`Ring::close`] has been called.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Clears every slot and restores the ring to its freshly-constructed
    /// state, including un-closing it. Existing consumer cursors are not
    /// touched; callers must reset them too (typically to [`INITIAL_CURSOR`]).
    pub fn reset(&self) {
        for slot in self.slots.iter() {
            slot.lock().take();
        }
        self.write_cursor.store(0, Ordering::Release);
        self.closed.store(false, Ordering::Release);
    }

    /// The current write cursor, usable as a catch-up seek point for a
    /// new consumer cursor.
    pub fn write_cursor(&self) -> u64 {
        self.write_cursor.load(Ordering::Acquire)
    }
}

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use hylan_future_ext::FutureExt;

    use super::*;

    fn cursor() -> AtomicU64 {
        AtomicU64::new(INITIAL_CURSOR)
    }

    #[test]
    fn rejects_non_power_of_two() {
        assert!(matches!(Ring::<u8>::new(3), Err(RingError::CapacityNotPowerOfTwo(3))));
        assert!(Ring::<u8>::new(4).is_ok());
    }

    #[test]
    fn push_pull_in_order() {
        let ring = Ring::new(4).unwrap();
        let c = cursor();
        ring.push(1);
        ring.push(2);
        assert_eq!(ring.try_pull(&c), Some(1));
        assert_eq!(ring.try_pull(&c), Some(2));
        assert_eq!(ring.try_pull(&c), None);
    }

    #[test]
    fn independent_cursors_each_see_every_item() {
        let ring = Ring::new(4).unwrap();
        let (a, b) = (cursor(), cursor());
        ring.push(1);
        ring.push(2);
        assert_eq!(ring.try_pull(&a), Some(1));
        // b hasn't pulled yet; a being ahead must not affect b's view.
        assert_eq!(ring.try_pull(&b), Some(1));
        assert_eq!(ring.try_pull(&a), Some(2));
        assert_eq!(ring.try_pull(&b), Some(2));
    }

    #[test]
    fn overwrite_drops_unread_slot() {
        let ring = Ring::new(2).unwrap();
        let c = cursor();
        ring.push(1);
        ring.push(2);
        ring.push(3); // overwrites slot holding 2 (capacity 2, cursor wraps)
        assert_eq!(ring.try_pull(&c), Some(3));
    }

    #[test]
    fn close_drains_then_stays_closed() {
        let ring = Ring::new(2).unwrap();
        let c = cursor();
        ring.push(1);
        ring.close();
        assert_eq!(ring.try_pull(&c), Some(1));
        assert!(ring.is_closed());
    }

    #[tokio::test]
    async fn non_blocking_pull_returns_immediately_on_empty() {
        let ring = Ring::<u8>::new(2).unwrap();
        let c = cursor();
        assert_eq!(ring.pull(&c, false).await, None);
    }

    #[tokio::test]
    async fn blocking_pull_wakes_on_push() {
        let ring = Arc::new(Ring::new(2).unwrap());
        let producer = Arc::clone(&ring);
        let c = Arc::new(cursor());
        let c2 = Arc::clone(&c);

        let pull = tokio::spawn(async move { ring.pull(&c2, true).await });

        tokio::time::sleep(Duration::from_millis(10)).await;
        producer.push(42);

        let item = pull.with_timeout(Duration::from_millis(200)).await.unwrap().unwrap();
        assert_eq!(item, Some(42));
    }

    #[tokio::test]
    async fn blocking_pull_wakes_on_close() {
        let ring = Arc::new(Ring::<u8>::new(2).unwrap());
        let closer = Arc::clone(&ring);
        let c = Arc::new(cursor());
        let c2 = Arc::clone(&c);

        let pull = tokio::spawn(async move { ring.pull(&c2, true).await });

        tokio::time::sleep(Duration::from_millis(10)).await;
        closer.close();

        let item = pull.with_timeout(Duration::from_millis(200)).await.unwrap().unwrap();
        assert_eq!(item, None);
    }

    #[test]
    fn reset_clears_everything() {
        let ring = Ring::new(2).unwrap();
        let c = cursor();
        ring.push(1);
        ring.close();
        ring.reset();
        assert!(!ring.is_closed());
        assert_eq!(ring.try_pull(&c), None);
        ring.push(9);
        assert_eq!(ring.try_pull(&AtomicU64::new(INITIAL_CURSOR)), Some(9));
    }
}
