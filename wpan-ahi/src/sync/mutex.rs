use core::cell::{RefCell, UnsafeCell};
use core::future::poll_fn;
use core::marker::PhantomData;
use core::ops::{Deref, DerefMut};
use core::task::{Poll, Waker};

/// Wakers of the lockers waiting at the same time.
const MAX_WAITERS: usize = 4;

struct LockState {
    locked: bool,
    waiters: heapless::Vec<Waker, MAX_WAITERS>,
}

impl LockState {
    fn register(&mut self, waker: &Waker) {
        if self.waiters.iter().any(|w| w.will_wake(waker)) {
            return;
        }
        if self.waiters.is_full() {
            // The evicted locker polls again and registers anew.
            self.waiters.remove(0).wake();
        }
        let _ = self.waiters.push(waker.clone());
    }
}

/// An async mutex that is independent of the underlying runtime.
///
/// The lock state lives in a critical section, so the mutex can be shared
/// between tasks and threads, and placed in a `static`. A guard held across
/// an await point keeps every other locker pending until it is dropped.
pub struct Mutex<T> {
    state: critical_section::Mutex<RefCell<LockState>>,
    value: UnsafeCell<T>,
}

// The value is only reached through a guard, and a single guard exists at a
// time.
unsafe impl<T: Send> Sync for Mutex<T> {}

impl<T> Mutex<T> {
    /// Create a new unlocked mutex.
    pub const fn new(value: T) -> Self {
        Self {
            state: critical_section::Mutex::new(RefCell::new(LockState {
                locked: false,
                waiters: heapless::Vec::new(),
            })),
            value: UnsafeCell::new(value),
        }
    }

    /// Wait until the lock is acquired.
    pub async fn lock(&self) -> MutexGuard<'_, T> {
        poll_fn(|cx| {
            critical_section::with(|cs| {
                let mut state = self.state.borrow_ref_mut(cs);
                if state.locked {
                    state.register(cx.waker());
                    Poll::Pending
                } else {
                    state.locked = true;
                    Poll::Ready(())
                }
            })
        })
        .await;

        MutexGuard {
            mutex: self,
            _value: PhantomData,
        }
    }

    /// Acquire the lock if it is free.
    pub fn try_lock(&self) -> Option<MutexGuard<'_, T>> {
        critical_section::with(|cs| {
            let mut state = self.state.borrow_ref_mut(cs);
            if state.locked {
                None
            } else {
                state.locked = true;
                Some(MutexGuard {
                    mutex: self,
                    _value: PhantomData,
                })
            }
        })
    }

    /// Get access to the protected value. The `&mut` receiver guarantees no
    /// lock is held.
    pub fn get_mut(&mut self) -> &mut T {
        self.value.get_mut()
    }

    /// Consume the mutex and return the protected value.
    pub fn into_inner(self) -> T {
        self.value.into_inner()
    }

    fn unlock(&self) {
        let waiters = critical_section::with(|cs| {
            let mut state = self.state.borrow_ref_mut(cs);
            state.locked = false;
            core::mem::take(&mut state.waiters)
        });
        for waker in waiters {
            waker.wake();
        }
    }
}

/// Exclusive access to the value protected by a [`Mutex`].
pub struct MutexGuard<'a, T> {
    mutex: &'a Mutex<T>,
    _value: PhantomData<&'a mut T>,
}

impl<T> Deref for MutexGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        // SAFETY: the guard owns the lock.
        unsafe { &*self.mutex.value.get() }
    }
}

impl<T> DerefMut for MutexGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        // SAFETY: the guard owns the lock.
        unsafe { &mut *self.mutex.value.get() }
    }
}

impl<T> Drop for MutexGuard<'_, T> {
    fn drop(&mut self) {
        self.mutex.unlock();
    }
}
