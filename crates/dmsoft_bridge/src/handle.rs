//! Ownership of the connection to the automation object.

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use chrono::{DateTime, Utc};
use dmsoft_config::BridgeConfig;
use dmsoft_symbol::MethodTable;
use parking_lot::{ReentrantMutex, ReentrantMutexGuard, RwLock};
use tracing::{debug, info, warn};

use crate::dispatch::{DispatchCache, Dispatcher, InvocationResult, StatsSnapshot};
use crate::error::{ConnectionError, Error, ForeignError, LifecycleError, Result};
use crate::object::AutomationObject;
use crate::resources::ResourceRegistry;
use crate::value::ArgList;

const DETACHED: u8 = 0;
const LIVE: u8 = 1;
const RELEASED: u8 = 2;

/// Owns one automation object from acquisition until release.
///
/// The handle may be shared by reference; only the owner releases it,
/// and it releases at most once. Every invocation after release fails with
/// [`ConnectionError::Released`].
pub struct AutomationHandle<O: AutomationObject> {
    object: RwLock<Option<O>>,
    state: AtomicU8,
    created_at: DateTime<Utc>,
    config: BridgeConfig,
    dispatcher: Dispatcher,
    resources: ResourceRegistry,
    critical: ReentrantMutex<()>,
}

impl<O: AutomationObject> AutomationHandle<O> {
    /// Connect through `connector` and take ownership of the object.
    pub fn acquire<F>(connector: F, table: Arc<MethodTable>, config: BridgeConfig) -> Result<Self>
    where
        F: FnOnce(&BridgeConfig) -> std::result::Result<O, ForeignError>,
    {
        let object = connector(&config).map_err(|source| {
            warn!(prog_id = %config.prog_id, code = source.code, "cannot instantiate automation object");
            ConnectionError::Instantiate {
                prog_id: config.prog_id.clone(),
                source,
            }
        })?;
        info!(prog_id = %config.prog_id, methods = table.len(), "automation object acquired");
        Ok(Self::build(Some(object), LIVE, table, config))
    }

    /// A handle that never acquired an object.
    pub fn detached(table: Arc<MethodTable>, config: BridgeConfig) -> Self {
        Self::build(None, DETACHED, table, config)
    }

    fn build(object: Option<O>, state: u8, table: Arc<MethodTable>, config: BridgeConfig) -> Self {
        Self {
            object: RwLock::new(object),
            state: AtomicU8::new(state),
            created_at: Utc::now(),
            dispatcher: Dispatcher::new(table, &config),
            resources: ResourceRegistry::new(config.track_resources),
            config,
            critical: ReentrantMutex::new(()),
        }
    }

    /// Drop the object. Waits for in-flight invocations to finish.
    pub fn release(&self) -> Result<()> {
        match self
            .state
            .compare_exchange(LIVE, RELEASED, Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(_) => {
                let object = self.object.write().take();
                drop(object);
                debug!(
                    invocations = self.dispatcher.stats().invocations,
                    "automation object released"
                );
                Ok(())
            }
            Err(RELEASED) => {
                warn!("automation handle released twice");
                Err(LifecycleError::DoubleRelease.into())
            }
            Err(_) => Err(ConnectionError::NotAcquired.into()),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.state.load(Ordering::Acquire) == LIVE
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn table(&self) -> &Arc<MethodTable> {
        self.dispatcher.table()
    }

    pub fn resources(&self) -> &ResourceRegistry {
        &self.resources
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.dispatcher.stats()
    }

    pub fn cache(&self) -> &DispatchCache {
        self.dispatcher.cache()
    }

    pub fn live_buffers(&self) -> usize {
        self.dispatcher.live_buffers()
    }

    /// Most recent failure reported by the object through this handle.
    pub fn last_foreign_error(&self) -> Option<ForeignError> {
        self.dispatcher.last_foreign_error()
    }

    pub fn invoke(&self, name: &str, args: &ArgList) -> Result<InvocationResult> {
        let object = self.object.read();
        match object.as_ref() {
            Some(object) => self.dispatcher.invoke(object, name, args),
            None => Err(self.unavailable()),
        }
    }

    fn unavailable(&self) -> Error {
        match self.state.load(Ordering::Acquire) {
            RELEASED => ConnectionError::Released.into(),
            _ => ConnectionError::NotAcquired.into(),
        }
    }

    /// Serialize a sequence of calls against other users of this handle.
    ///
    /// Re-entrant: a thread holding the section may enter it again.
    pub fn enter(&self) -> CriticalSection<'_> {
        CriticalSection {
            _guard: self.critical.lock(),
        }
    }
}

impl<O: AutomationObject> Drop for AutomationHandle<O> {
    fn drop(&mut self) {
        if self.is_valid() {
            debug!("releasing automation object on drop");
            let _ = self.release();
        }
    }
}

impl<O: AutomationObject> std::fmt::Debug for AutomationHandle<O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AutomationHandle")
            .field("valid", &self.is_valid())
            .field("created_at", &self.created_at)
            .field("prog_id", &self.config.prog_id)
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

/// Held while a thread owns the handle's critical section.
#[must_use = "the section is left as soon as the guard drops"]
pub struct CriticalSection<'a> {
    _guard: ReentrantMutexGuard<'a, ()>,
}

impl CriticalSection<'_> {
    pub fn leave(self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::codes;
    use crate::stub::StubObject;
    use crate::variant::Variant;

    fn table() -> Arc<MethodTable> {
        Arc::new(MethodTable::from_declarations([("system", "CString Ver();")]).unwrap())
    }

    #[test]
    fn test_release_twice_is_lifecycle_error() {
        let stub = StubObject::new().with_value("Ver", Variant::text("1.0"));
        let stats = stub.stats();
        let handle = AutomationHandle::acquire(|_| Ok(stub), table(), BridgeConfig::default())
            .unwrap();
        assert!(handle.is_valid());
        handle.release().unwrap();
        assert!(!handle.is_valid());
        assert_eq!(stats.releases(), 1);
        assert_eq!(
            handle.release(),
            Err(Error::HandleLifecycle(LifecycleError::DoubleRelease))
        );
        assert_eq!(
            handle.invoke("Ver", &ArgList::new()).unwrap_err(),
            Error::Connection(ConnectionError::Released)
        );
        assert_eq!(stats.invocations(), 0);
    }

    #[test]
    fn test_detached_handle_rejects_calls() {
        let handle: AutomationHandle<StubObject> =
            AutomationHandle::detached(table(), BridgeConfig::default());
        assert_eq!(
            handle.invoke("Ver", &ArgList::new()).unwrap_err(),
            Error::Connection(ConnectionError::NotAcquired)
        );
        assert!(handle.release().is_err());
    }

    #[test]
    fn test_failed_connection() {
        let result = AutomationHandle::<StubObject>::acquire(
            |_| Err(ForeignError::new(codes::REGDB_E_CLASSNOTREG, "class not registered")),
            table(),
            BridgeConfig::default(),
        );
        let err = result.unwrap_err();
        assert_eq!(err.foreign_code(), Some(codes::REGDB_E_CLASSNOTREG));
        assert!(matches!(err, Error::Connection(ConnectionError::Instantiate { .. })));
    }

    #[test]
    fn test_drop_releases_object() {
        let stub = StubObject::new();
        let stats = stub.stats();
        let handle = AutomationHandle::acquire(|_| Ok(stub), table(), BridgeConfig::default())
            .unwrap();
        drop(handle);
        assert_eq!(stats.releases(), 1);
    }

    #[test]
    fn test_critical_section_is_reentrant() {
        let handle = AutomationHandle::acquire(
            |_| Ok(StubObject::new()),
            table(),
            BridgeConfig::default(),
        )
        .unwrap();
        let outer = handle.enter();
        let inner = handle.enter();
        inner.leave();
        outer.leave();
    }
}
