//! Video player: resume on load, mirror transport state, and write progress
//! back on a fixed period while playing.

mod bootstrap;
mod media;
mod observer;
mod sampler;
mod session;
mod sync;

pub use bootstrap::{Bootstrap, SessionBootstrap};
pub use media::{MediaElement, MediaEvent, SimulatedMedia};
pub use observer::{PlaybackObserver, PlaybackState};
pub use sampler::{ProgressSampler, SamplerState};
pub use session::PlayerSession;
pub use sync::{ProgressSync, SyncTarget, TickOutcome};
