//! Saved designs: local library, remote account store, merge and restore.

mod coordinator;
mod local;
mod remote;
mod restore;
mod saved;

pub use coordinator::{merge_designs, DesignCoordinator, DesignListing};
pub use local::LocalDesignStore;
pub use remote::{InMemoryRemoteStore, RemoteDesignStore, RemoteError};
pub use restore::{RestoreFailure, RestoreMachine, RestoreReport, RestoreState};
pub use saved::{Origin, SavedDesign, SessionToken};
