//! Thread-local free list of byte buffers.
//!
//! Encoding allocates many short-lived growable buffers (nested messages, map
//! entries, packed blocks). The pool amortizes those allocations: `acquire`
//! hands out a cleared buffer, `release` keeps its storage for the next
//! caller. The pool is an optimization only and never observable through the
//! codec interface.

use std::cell::RefCell;

/// Maximale Anzahl zurückgehaltener Buffer pro Thread.
const MAX_POOLED: usize = 32;

/// Buffer über dieser Kapazität werden nicht zurückgehalten (ein einzelner
/// Riesen-Payload soll den Pool nicht dauerhaft aufblähen).
const MAX_RETAINED_CAPACITY: usize = 1 << 20;

thread_local! {
    static POOL: RefCell<Vec<Vec<u8>>> = const { RefCell::new(Vec::new()) };
}

/// Takes a buffer from the pool, or allocates a fresh one.
///
/// The returned buffer is always empty; its capacity is whatever the previous
/// user grew it to.
pub(crate) fn acquire() -> Vec<u8> {
    POOL.with(|pool| pool.borrow_mut().pop()).unwrap_or_default()
}

/// Returns a buffer's storage to the pool.
///
/// The buffer is cleared here, so `acquire` never hands out stale content.
pub(crate) fn release(mut buf: Vec<u8>) {
    if buf.capacity() == 0 || buf.capacity() > MAX_RETAINED_CAPACITY {
        return;
    }
    buf.clear();
    POOL.with(|pool| {
        let mut pool = pool.borrow_mut();
        if pool.len() < MAX_POOLED {
            pool.push(buf);
        }
    });
}
