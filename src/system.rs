//! Task Coordination
//!
//! [`CancelToken`] lets long-running loops be stopped deterministically. It is
//! set once and never reset; every task waiting on it wakes up.

use core::cell::RefCell;
use core::future::poll_fn;
use core::task::Poll;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::waitqueue::MultiWakerRegistration;

/// Maximum number of tasks waiting on one token at the same time
pub const MAX_CANCEL_WAITERS: usize = 4;

struct CancelState {
    cancelled: bool,
    wakers: MultiWakerRegistration<MAX_CANCEL_WAITERS>,
}

/// Set-once cancellation flag shared between tasks
pub struct CancelToken {
    state: Mutex<CriticalSectionRawMutex, RefCell<CancelState>>,
}

impl CancelToken {
    /// A token that has not been cancelled
    pub const fn new() -> Self {
        Self {
            state: Mutex::new(RefCell::new(CancelState {
                cancelled: false,
                wakers: MultiWakerRegistration::new(),
            })),
        }
    }

    /// Request cancellation and wake all waiters
    pub fn cancel(&self) {
        self.state.lock(|state| {
            let mut state = state.borrow_mut();
            state.cancelled = true;
            state.wakers.wake();
        });
    }

    /// True once [`cancel`](Self::cancel) has been called
    pub fn is_cancelled(&self) -> bool {
        self.state.lock(|state| state.borrow().cancelled)
    }

    /// Resolves once [`cancel`](Self::cancel) has been called
    pub async fn cancelled(&self) {
        poll_fn(|cx| {
            self.state.lock(|state| {
                let mut state = state.borrow_mut();
                if state.cancelled {
                    Poll::Ready(())
                } else {
                    state.wakers.register(cx.waker());
                    Poll::Pending
                }
            })
        })
        .await
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_futures::block_on;
    use embassy_futures::select::{select, Either};

    #[test]
    fn test_cancel_is_sticky() {
        let token = CancelToken::new();
        assert!(!token.is_cancelled());

        token.cancel();
        assert!(token.is_cancelled());
        token.cancel();
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_cancelled_resolves_for_every_waiter() {
        let token = CancelToken::new();
        token.cancel();

        block_on(token.cancelled());
        block_on(token.cancelled());
    }

    #[test]
    fn test_cancelled_pending_until_cancel() {
        let token = CancelToken::new();

        let result = block_on(select(token.cancelled(), async {
            token.cancel();
        }));
        // First branch is pending on the first poll, second one cancels
        assert!(matches!(result, Either::Second(())));
        assert!(token.is_cancelled());
        block_on(token.cancelled());
    }
}
