// Per-view request lifetime
// Every mount or parameter change opens a new generation; responses from an older
// generation are discarded instead of being applied to a view that moved on

use crate::api::ApiError;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::watch;

#[derive(Debug)]
pub struct ViewScope {
    generation: Arc<watch::Sender<u64>>,
}

/// Cloneable handle that lets another task (usually navigation) cancel a view's fetches.
#[derive(Debug, Clone)]
pub struct ScopeHandle {
    generation: Arc<watch::Sender<u64>>,
}

#[derive(Debug, Clone)]
pub struct FetchTicket {
    issued: u64,
    generation: watch::Receiver<u64>,
}

impl Default for ViewScope {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewScope {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(0);
        Self {
            generation: Arc::new(sender),
        }
    }

    pub fn handle(&self) -> ScopeHandle {
        ScopeHandle {
            generation: Arc::clone(&self.generation),
        }
    }

    /// Cancels everything in flight and hands out a ticket for the new generation.
    pub fn renew(&self) -> FetchTicket {
        bump(&self.generation);
        self.ticket()
    }

    /// Ticket for the current generation, used for follow-up fetches of the same mount.
    pub fn ticket(&self) -> FetchTicket {
        let generation = self.generation.subscribe();
        let issued = *generation.borrow();
        FetchTicket { issued, generation }
    }

    pub fn cancel(&self) {
        bump(&self.generation);
    }

    pub fn generation(&self) -> u64 {
        *self.generation.borrow()
    }
}

impl Drop for ViewScope {
    fn drop(&mut self) {
        bump(&self.generation);
    }
}

impl ScopeHandle {
    pub fn cancel(&self) {
        bump(&self.generation);
    }
}

impl FetchTicket {
    pub fn is_current(&self) -> bool {
        *self.generation.borrow() == self.issued
    }

    /// Drives `request` unless the scope moves to another generation first.
    pub async fn run<F, T>(&self, request: F) -> Result<T, ApiError>
    where
        F: Future<Output = Result<T, ApiError>>,
    {
        if !self.is_current() {
            return Err(ApiError::Cancelled);
        }

        let issued = self.issued;
        let mut generation = self.generation.clone();

        tokio::select! {
            result = request => {
                if self.is_current() {
                    result
                } else {
                    Err(ApiError::Cancelled)
                }
            }
            // A closed channel means the view is gone, which counts as cancellation too
            _ = generation.wait_for(|current| *current != issued) => Err(ApiError::Cancelled),
        }
    }
}

fn bump(generation: &watch::Sender<u64>) {
    generation.send_modify(|current| *current = current.wrapping_add(1));
}
