//! Seat accounting for connected players.
//!
//! Only the player count is shared between sessions; each session owns its
//! player outright.
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{OwnedSemaphorePermit, Semaphore, TryAcquireError};

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("server is full ({capacity} players)")]
pub struct RegistryFull {
    pub capacity: usize,
}

#[derive(Debug, Clone)]
pub struct Registry {
    seats: Arc<Semaphore>,
    capacity: usize,
}

/// A held seat. Dropping it is the same as [`Seat::leave`].
#[derive(Debug)]
pub struct Seat {
    _permit: OwnedSemaphorePermit,
}

impl Seat {
    pub fn leave(self) {}
}

impl Registry {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            seats: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    /// Claim a seat without waiting.
    ///
    /// # Errors
    ///
    /// Returns `RegistryFull` when every seat is taken.
    pub fn join(&self) -> Result<Seat, RegistryFull> {
        match Arc::clone(&self.seats).try_acquire_owned() {
            Ok(permit) => Ok(Seat { _permit: permit }),
            Err(TryAcquireError::NoPermits | TryAcquireError::Closed) => Err(RegistryFull {
                capacity: self.capacity,
            }),
        }
    }

    /// Players currently seated.
    #[must_use]
    pub fn len(&self) -> usize {
        self.capacity - self.seats.available_permits()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }
}
