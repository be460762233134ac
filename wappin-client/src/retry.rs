//! Retry policy for sends rejected with an invalid credential.
//!
//! A send gets at most two attempts: the first with whatever token the
//! cache serves, and one more with a token fetched past the cache.

/// Which attempt of a send is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attempt {
    /// Token served from the cache (or fetched on a miss).
    First,
    /// Token fetched again after the gateway rejected the first one.
    ForcedRefresh,
}

impl Attempt {
    /// The attempt to make after a credential rejection, if any remain.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::First => Some(Self::ForcedRefresh),
            Self::ForcedRefresh => None,
        }
    }
}
