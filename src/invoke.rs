//! The invocation seam the capability traits are written against, and the
//! handle-owning [`Dmsoft`] that implements it.

use std::sync::Arc;
use std::time::Duration;

use dmsoft_bridge::{
    ArgList, AutomationHandle, AutomationObject, CriticalSection, ForeignError, FromValue,
    InvocationResult, ResourceRegistry, Result, StatsSnapshot,
};
use dmsoft_config::BridgeConfig;
use dmsoft_symbol::MethodTable;

use crate::method_table;

/// Anything that can perform a named call. Every capability trait is
/// implemented for every `Invoke`.
pub trait Invoke {
    fn invoke_method(&self, name: &str, args: &ArgList) -> Result<InvocationResult>;

    /// Liveness set for pictures, captures, screen data and remote memory.
    fn resources(&self) -> &ResourceRegistry;

    /// Interval between probes of a bounded wait.
    fn poll_interval(&self) -> Duration {
        Duration::from_millis(50)
    }

    fn call<R: FromValue>(&self, name: &str, args: ArgList) -> Result<R>
    where
        Self: Sized,
    {
        let result = self.invoke_method(name, &args)?;
        Ok(result.value::<R>()?)
    }
}

/// Typed access to one automation object.
///
/// ```no_run
/// # #[cfg(windows)]
/// use dmsoft::{ComObject, Dmsoft, System};
///
/// # fn main() -> dmsoft::Result<()> {
/// # #[cfg(windows)]
/// # {
/// let dm = Dmsoft::<ComObject>::new()?;
/// println!("version {}", dm.ver()?);
/// dm.release()?;
/// # }
/// # Ok(())
/// # }
/// ```
pub struct Dmsoft<O: AutomationObject> {
    handle: AutomationHandle<O>,
}

impl<O: AutomationObject> Dmsoft<O> {
    /// Connect with a caller-supplied connector.
    pub fn acquire_with<F>(connector: F, config: BridgeConfig) -> Result<Self>
    where
        F: FnOnce(&BridgeConfig) -> std::result::Result<O, ForeignError>,
    {
        let handle = AutomationHandle::acquire(connector, method_table()?, config)?;
        Ok(Self { handle })
    }

    /// Wrap an object that is already instantiated.
    pub fn with_object(object: O, config: BridgeConfig) -> Result<Self> {
        Self::acquire_with(|_| Ok(object), config)
    }

    /// Use a table other than the built-in one.
    pub fn with_table(object: O, table: Arc<MethodTable>, config: BridgeConfig) -> Result<Self> {
        let handle = AutomationHandle::acquire(|_| Ok(object), table, config)?;
        Ok(Self { handle })
    }

    /// A facade with no object behind it; every call fails until a real
    /// one is acquired.
    pub fn detached(config: BridgeConfig) -> Result<Self> {
        Ok(Self {
            handle: AutomationHandle::detached(method_table()?, config),
        })
    }

    pub fn handle(&self) -> &AutomationHandle<O> {
        &self.handle
    }

    pub fn release(&self) -> Result<()> {
        self.handle.release()
    }

    pub fn is_valid(&self) -> bool {
        self.handle.is_valid()
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.handle.stats()
    }

    /// Most recent failure the object reported through this facade.
    pub fn last_foreign_error(&self) -> Option<ForeignError> {
        self.handle.last_foreign_error()
    }

    /// Call `name` by name, including methods missing from the table.
    pub fn call_dynamic(&self, name: &str, args: ArgList) -> Result<InvocationResult> {
        self.handle.invoke(name, &args)
    }

    /// Serialize a group of calls against other threads using this facade.
    pub fn enter(&self) -> CriticalSection<'_> {
        self.handle.enter()
    }
}

#[cfg(windows)]
impl Dmsoft<dmsoft_bridge::ComObject> {
    /// Instantiate the registered COM object using environment
    /// configuration.
    pub fn new() -> Result<Self> {
        Self::connect(BridgeConfig::from_env())
    }

    pub fn connect(config: BridgeConfig) -> Result<Self> {
        Self::acquire_with(dmsoft_bridge::ComObject::connect, config)
    }
}

impl<O: AutomationObject> Invoke for Dmsoft<O> {
    fn invoke_method(&self, name: &str, args: &ArgList) -> Result<InvocationResult> {
        self.handle.invoke(name, args)
    }

    fn resources(&self) -> &ResourceRegistry {
        self.handle.resources()
    }

    fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.handle.config().poll_interval_ms.max(1))
    }
}

impl<O: AutomationObject> std::fmt::Debug for Dmsoft<O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dmsoft").field("handle", &self.handle).finish()
    }
}
