//! Motion-sensor permission plumbing

use std::future::Future;
use std::pin::Pin;

/// Outcome of a permission request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionDecision {
    /// The platform granted access, or never gates it
    Granted,
    /// The platform refused, or the request itself failed
    Denied,
    /// No orientation sensor API at all
    Unsupported,
}

impl PermissionDecision {
    pub fn is_granted(self) -> bool {
        self == PermissionDecision::Granted
    }
}

/// Boxed single-threaded future resolving to a permission decision
pub type PermissionFuture = Pin<Box<dyn Future<Output = PermissionDecision>>>;

/// Asynchronous one-shot permission capability
///
/// Implementations must resolve rather than hang, and must map a rejected
/// or thrown platform request to `Denied`. Platforms that expose the
/// sensor without an explicit permission step resolve `Granted`
/// immediately.
pub trait PermissionGate {
    fn request(&self) -> PermissionFuture;
}

/// Gate for platforms that never ask
#[derive(Debug, Default)]
pub struct PreGrantedGate;

impl PermissionGate for PreGrantedGate {
    fn request(&self) -> PermissionFuture {
        Box::pin(std::future::ready(PermissionDecision::Granted))
    }
}
