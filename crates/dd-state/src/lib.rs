//! # dd-state: Pack Lifecycle
//!
//! One explicit state machine, [`PackLifecycle`], owns the current pack and
//! everything that mutates it:
//!
//! - [`lifecycle`]: states, transitions, guards and the transition log.
//! - [`auto_reveal`]: the cancelable, token-carrying auto-reveal task.
//! - [`archive`]: the `PackSink` that receives finished packs.
//!
//! The UI reads state and cards through shared references; only lifecycle
//! operations flip `is_revealed`.

pub mod archive;
pub mod auto_reveal;
pub mod lifecycle;

pub use archive::{ArchiveError, MemoryArchive, NullSink, PackSink};
pub use auto_reveal::AutoRevealTask;
pub use lifecycle::{
    LifecycleError, LifecycleOptions, PackLifecycle, PackLifecycleState, TransitionRecord,
    DEFAULT_REVEAL_DELAY,
};
