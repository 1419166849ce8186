//! Connection bookkeeping shared by the driver pools.
//!
//! A semaphore bounds the number of checked-out connections; idle ones wait
//! in a stack for reuse. Waiting for a slot is bounded by the acquire
//! timeout. Closing the slots closes the semaphore, which fails every pending
//! and future acquisition with [`AnydbError::Closed`].

use std::future::Future;
use std::mem::ManuallyDrop;
use std::ops::{Deref, DerefMut};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::error::{AnydbError, Result};

pub struct ConnectionSlots<C> {
    idle: Mutex<Vec<C>>,
    permits: Arc<Semaphore>,
    acquire_timeout: Duration,
}

impl<C: Send + 'static> ConnectionSlots<C> {
    /// Slots for up to `max` connections, seeded with already-open ones.
    pub fn new(max: usize, acquire_timeout: Duration, initial: Vec<C>) -> Arc<Self> {
        Arc::new(Self {
            idle: Mutex::new(initial),
            permits: Arc::new(Semaphore::new(max.max(1))),
            acquire_timeout,
        })
    }

    /// Waits for a free slot and hands out an idle connection, opening a new
    /// one with `connect` when none is idle.
    ///
    /// Fails with [`AnydbError::PoolTimeout`] when no slot frees up within
    /// the acquire timeout, e.g. while a transaction holds the only
    /// connection.
    pub async fn acquire<F, Fut>(self: &Arc<Self>, connect: F) -> Result<Lease<C>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<C>>,
    {
        let permit = tokio::time::timeout(
            self.acquire_timeout,
            Arc::clone(&self.permits).acquire_owned(),
        )
        .await
        .map_err(|_| AnydbError::PoolTimeout(self.acquire_timeout))?
        .map_err(|_| AnydbError::Closed)?;

        let idle = self.lock_idle().pop();
        let conn = match idle {
            Some(conn) => conn,
            None => connect().await?,
        };

        Ok(Lease {
            conn: ManuallyDrop::new(conn),
            discarded: false,
            slots: Arc::clone(self),
            _permit: permit,
        })
    }

    /// Rejects further acquisitions and drops idle connections. Leased
    /// connections are dropped when their lease ends.
    pub fn close(&self) {
        self.permits.close();
        self.lock_idle().clear();
    }

    pub fn is_closed(&self) -> bool {
        self.permits.is_closed()
    }

    pub fn idle_count(&self) -> usize {
        self.lock_idle().len()
    }

    fn lock_idle(&self) -> std::sync::MutexGuard<'_, Vec<C>> {
        self.idle.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A checked-out connection. Returns to the idle stack when dropped, unless
/// the slots were closed or the lease was discarded.
pub struct Lease<C: Send + 'static> {
    conn: ManuallyDrop<C>,
    discarded: bool,
    slots: Arc<ConnectionSlots<C>>,
    _permit: OwnedSemaphorePermit,
}

impl<C: Send + 'static> Lease<C> {
    /// Drops the connection instead of returning it, e.g. after the driver
    /// reported it broken.
    pub fn discard(mut self) {
        self.discarded = true;
    }

    /// True once the pool this lease came from has been closed. Work still
    /// holding a lease, such as an open transaction, checks this before
    /// touching the connection.
    pub fn pool_closed(&self) -> bool {
        self.slots.is_closed()
    }
}

impl<C: Send + 'static> Deref for Lease<C> {
    type Target = C;

    fn deref(&self) -> &Self::Target {
        &self.conn
    }
}

impl<C: Send + 'static> DerefMut for Lease<C> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.conn
    }
}

impl<C: Send + 'static> Drop for Lease<C> {
    fn drop(&mut self) {
        // SAFETY: `conn` is taken exactly once, here, and never touched again.
        let conn = unsafe { ManuallyDrop::take(&mut self.conn) };
        if !self.discarded && !self.slots.is_closed() {
            self.slots.lock_idle().push(conn);
        }
    }
}
