//! Name resolution, caching, and the invocation sequence.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use ahash::AHashMap;
use dmsoft_config::BridgeConfig;
use dmsoft_symbol::MethodTable;
use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use crate::error::{Error, ForeignError, MarshalError, Result};
use crate::marshal::Marshaler;
use crate::object::{AutomationObject, DispId};
use crate::value::{ArgList, ArgumentValue, FromValue};
use crate::variant::BufferLedger;

/// Outcome of one successful invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct InvocationResult {
    /// Canonical name the call was made under.
    pub method: String,
    /// `None` when an undeclared method returned nothing.
    pub value: Option<ArgumentValue>,
    /// Out and in-out values in natural order.
    pub outs: Vec<ArgumentValue>,
}

impl InvocationResult {
    pub fn value<T: FromValue>(&self) -> std::result::Result<T, MarshalError> {
        match &self.value {
            Some(value) => T::from_value(&self.method, value.clone()),
            None => Err(MarshalError::MissingValue {
                method: self.method.clone(),
                wanted: "return value".to_string(),
            }),
        }
    }

    /// The `index`th by-reference value, counted in natural order.
    pub fn out<T: FromValue>(&self, index: usize) -> std::result::Result<T, MarshalError> {
        match self.outs.get(index) {
            Some(value) => T::from_value(&self.method, value.clone()),
            None => Err(MarshalError::MissingValue {
                method: self.method.clone(),
                wanted: format!("out-parameter {index}"),
            }),
        }
    }
}

/// Name to call-target map for one handle. Entries are never invalidated.
#[derive(Debug, Default)]
pub struct DispatchCache {
    entries: Mutex<AHashMap<String, DispId>>,
}

impl DispatchCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached id or runs `lookup` and caches its answer.
    ///
    /// The lock is held across `lookup` so concurrent misses on one name
    /// perform a single lookup. The flag reports a cache hit.
    pub fn get_or_resolve<F>(&self, name: &str, lookup: F) -> Result<(DispId, bool)>
    where
        F: FnOnce() -> Result<DispId>,
    {
        let key = name.to_ascii_lowercase();
        let mut entries = self.entries.lock();
        if let Some(id) = entries.get(&key) {
            return Ok((*id, true));
        }
        let id = lookup()?;
        entries.insert(key, id);
        Ok((id, false))
    }

    pub fn get(&self, name: &str) -> Option<DispId> {
        self.entries.lock().get(&name.to_ascii_lowercase()).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

#[derive(Debug, Default)]
pub struct DispatchStats {
    lookups: AtomicU64,
    cache_hits: AtomicU64,
    invocations: AtomicU64,
    failures: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatsSnapshot {
    pub lookups: u64,
    pub cache_hits: u64,
    pub invocations: u64,
    pub failures: u64,
}

impl DispatchStats {
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            lookups: self.lookups.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            invocations: self.invocations.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
        }
    }
}

/// Resolves, packs, calls and unpacks for one handle.
#[derive(Debug)]
pub struct Dispatcher {
    table: Arc<MethodTable>,
    allow_undeclared: bool,
    marshaler: Marshaler,
    cache: DispatchCache,
    stats: DispatchStats,
    last_error: Mutex<Option<ForeignError>>,
}

impl Dispatcher {
    pub fn new(table: Arc<MethodTable>, config: &BridgeConfig) -> Self {
        Self {
            table,
            allow_undeclared: config.allow_undeclared,
            marshaler: Marshaler::new(config.int64_encoding, BufferLedger::new()),
            cache: DispatchCache::new(),
            stats: DispatchStats::default(),
            last_error: Mutex::new(None),
        }
    }

    pub fn table(&self) -> &Arc<MethodTable> {
        &self.table
    }

    pub fn cache(&self) -> &DispatchCache {
        &self.cache
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    pub fn live_buffers(&self) -> usize {
        self.marshaler.ledger().live()
    }

    pub fn last_foreign_error(&self) -> Option<ForeignError> {
        self.last_error.lock().clone()
    }

    /// Perform `name(args)` against `object`.
    ///
    /// Arguments are validated and packed before the object is contacted.
    /// A failing call is reported once and never retried.
    pub fn invoke<O>(&self, object: &O, name: &str, args: &ArgList) -> Result<InvocationResult>
    where
        O: AutomationObject + ?Sized,
    {
        let descriptor = self.table.resolve(name);
        if descriptor.is_none() && !self.allow_undeclared {
            debug!(method = name, "undeclared method rejected");
            return Err(Error::MethodNotFound {
                name: name.to_string(),
            });
        }
        let method = descriptor.map_or(name, |desc| desc.name.as_str());

        let mut packed = match descriptor {
            Some(desc) => self.marshaler.pack_call(desc, args)?,
            None => self.marshaler.pack_undeclared(args),
        };
        trace!(method, argc = packed.len(), "arguments packed");

        let id = self.resolve(object, method)?;

        self.stats.invocations.fetch_add(1, Ordering::Relaxed);
        let returned = match object.invoke(id, packed.presented_mut()) {
            Ok(value) => value,
            Err(source) => {
                self.stats.failures.fetch_add(1, Ordering::Relaxed);
                warn!(method, code = source.code, "invocation failed: {}", source.message);
                *self.last_error.lock() = Some(source.clone());
                return Err(Error::InvocationFailed {
                    method: method.to_string(),
                    source,
                });
            }
        };

        let outs = packed.read_back(&self.marshaler, method)?;
        let value = match descriptor {
            Some(desc) => Some(self.marshaler.unpack(method, desc.result, &returned)?),
            None => self.marshaler.unpack_natural(&returned),
        };

        Ok(InvocationResult {
            method: method.to_string(),
            value,
            outs,
        })
    }

    fn resolve<O>(&self, object: &O, method: &str) -> Result<DispId>
    where
        O: AutomationObject + ?Sized,
    {
        let (id, hit) = self.cache.get_or_resolve(method, || {
            self.stats.lookups.fetch_add(1, Ordering::Relaxed);
            match object.lookup(method) {
                Ok(Some(id)) => Ok(id),
                Ok(None) => Err(Error::MethodNotFound {
                    name: method.to_string(),
                }),
                Err(source) => {
                    *self.last_error.lock() = Some(source.clone());
                    Err(Error::InvocationFailed {
                        method: method.to_string(),
                        source,
                    })
                }
            }
        })?;
        if hit {
            self.stats.cache_hits.fetch_add(1, Ordering::Relaxed);
            trace!(method, dispid = id, "dispatch cache hit");
        } else {
            debug!(method, dispid = id, "resolved method");
        }
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stub::StubObject;
    use crate::variant::Variant;
    use dmsoft_symbol::ValueKind;

    fn table(src: &str) -> Arc<MethodTable> {
        Arc::new(MethodTable::from_declarations([("test", src)]).unwrap())
    }

    #[test]
    fn test_cache_single_lookup() {
        let stub = StubObject::new().with_value("Ver", Variant::text("7.2"));
        let dispatcher = Dispatcher::new(table("CString Ver();"), &BridgeConfig::default());

        for _ in 0..2 {
            let result = dispatcher.invoke(&stub, "ver", &ArgList::new()).unwrap();
            assert_eq!(result.value::<String>().unwrap(), "7.2");
        }
        let stats = dispatcher.stats();
        assert_eq!(stats.lookups, 1);
        assert_eq!(stats.cache_hits, 1);
        assert_eq!(stub.stats().lookups(), 1);
        assert_eq!(stub.stats().invocations(), 2);
        assert_eq!(dispatcher.cache().len(), 1);
    }

    #[test]
    fn test_unknown_name_never_invokes() {
        let stub = StubObject::new();
        let dispatcher = Dispatcher::new(table("CString Ver();"), &BridgeConfig::default());
        let err = dispatcher
            .invoke(&stub, "NoSuchMethod", &ArgList::new())
            .unwrap_err();
        assert!(err.is_method_not_found());
        assert_eq!(stub.stats().invocations(), 0);
    }

    #[test]
    fn test_undeclared_rejected_without_lookup_when_disabled() {
        let stub = StubObject::new().with_value("Hidden", Variant::I4(1));
        let config = BridgeConfig {
            allow_undeclared: false,
            ..Default::default()
        };
        let dispatcher = Dispatcher::new(table("CString Ver();"), &config);
        assert!(dispatcher.invoke(&stub, "Hidden", &ArgList::new()).is_err());
        assert_eq!(stub.stats().lookups(), 0);
    }

    #[test]
    fn test_undeclared_compatibility_path() {
        let stub = StubObject::new().with_method("Sum", |args| {
            let total: i32 = args.iter().filter_map(|a| a.value().as_i32()).sum();
            Ok(Variant::I4(total))
        });
        let dispatcher = Dispatcher::new(table("CString Ver();"), &BridgeConfig::default());
        let result = dispatcher
            .invoke(&stub, "Sum", &ArgList::from_args((1, 2, 3)))
            .unwrap();
        assert_eq!(result.value, Some(ArgumentValue::Int32(6)));
    }

    #[test]
    fn test_foreign_failure_recorded_not_retried() {
        let stub = StubObject::new().with_method("Capture", |_| {
            Err(ForeignError::new(crate::object::codes::E_FAIL, "disk full"))
        });
        let dispatcher = Dispatcher::new(
            table("long Capture(long x1, long y1, long x2, long y2, const TCHAR * file);"),
            &BridgeConfig::default(),
        );
        let err = dispatcher
            .invoke(&stub, "Capture", &ArgList::from_args((0, 0, 10, 10, "a.bmp")))
            .unwrap_err();
        assert_eq!(err.foreign_code(), Some(crate::object::codes::E_FAIL));
        assert_eq!(stub.stats().invocations(), 1);
        assert_eq!(dispatcher.stats().failures, 1);
        assert_eq!(
            dispatcher.last_foreign_error().map(|e| e.message),
            Some("disk full".to_string())
        );
        assert_eq!(dispatcher.live_buffers(), 0);
    }

    #[test]
    fn test_out_parameters_come_back_in_natural_order() {
        let stub = StubObject::new().with_method("GetCursorPos", |args| {
            // presented as (y, x)
            args[0].set(Variant::I4(480))?;
            args[1].set(Variant::I4(640))?;
            Ok(Variant::I4(1))
        });
        let dispatcher = Dispatcher::new(
            table("long GetCursorPos(long * x, long * y);"),
            &BridgeConfig::default(),
        );
        let args = ArgList::new().out(ValueKind::Int32).out(ValueKind::Int32);
        let result = dispatcher.invoke(&stub, "GetCursorPos", &args).unwrap();
        assert_eq!(result.out::<i32>(0).unwrap(), 640);
        assert_eq!(result.out::<i32>(1).unwrap(), 480);
        assert_eq!(result.value::<i32>().unwrap(), 1);
    }
}
