//! Orientation acquisition and distribution
//!
//! Everything between the raw sensor event and the display system:
//! permission lifecycle, sample ingestion, exponential smoothing,
//! reference-horizon bookkeeping, and subscriber fan-out.

pub mod events;
pub mod filter;
pub mod manager;
pub mod permission;
pub mod sample;

pub use events::{SubscriberChannel, Subscription};
pub use filter::SmoothingFilter;
pub use manager::{
    OrientationManager, OrientationSource, OrientationState, SampleHandler, TrackingPhase,
};
pub use permission::{PermissionDecision, PermissionFuture, PermissionGate, PreGrantedGate};
pub use sample::{OrientationSnapshot, RawOrientationSample};
