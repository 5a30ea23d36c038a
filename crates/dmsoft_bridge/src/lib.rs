//! Late-bound invocation bridge.
//!
//! Calls travel `ArgList` → [`Marshaler`] → [`Dispatcher`] →
//! [`AutomationObject`] and back. An [`AutomationHandle`] owns the object,
//! the per-handle dispatch cache and the resource registry.

pub mod dispatch;
pub mod error;
pub mod handle;
pub mod marshal;
pub mod object;
pub mod resources;
pub mod value;
pub mod variant;

#[cfg(windows)]
pub mod com;
#[cfg(any(test, feature = "stub"))]
pub mod stub;

pub use dispatch::{DispatchCache, Dispatcher, InvocationResult, StatsSnapshot};
pub use error::{ConnectionError, Error, ForeignError, LifecycleError, MarshalError, Result};
pub use handle::{AutomationHandle, CriticalSection};
pub use marshal::{Marshaler, PackedCall};
pub use object::{AutomationObject, DispId, codes};
pub use resources::{
    ResourceKey, ResourceKind, ResourceRegistry, picture_keys, picture_patterns, wildcard_matches,
};
pub use value::{Arg, ArgList, ArgumentValue, FromValue, IntoArgs, RawHandle};
pub use variant::{BufferLedger, RefSlot, Variant, WideText, WireArg};

#[cfg(windows)]
pub use com::ComObject;
#[cfg(any(test, feature = "stub"))]
pub use stub::{StubCall, StubObject, StubStats};
