//! Scripted in-process automation object.
//!
//! Each method is a closure over the presented arguments. The stub counts
//! lookups and invocations, tracks how many calls overlap, and records
//! what every call was given so tests can assert on the wire layout.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use ahash::AHashMap;
use parking_lot::Mutex;

use crate::error::ForeignError;
use crate::object::{AutomationObject, DispId, codes};
use crate::variant::{Variant, WireArg};

type Handler = Box<dyn Fn(&mut [WireArg]) -> Result<Variant, ForeignError> + Send + Sync>;

/// One recorded call: the method and its arguments in presentation order
/// as they were on entry.
#[derive(Debug, Clone, PartialEq)]
pub struct StubCall {
    pub method: String,
    pub args: Vec<Variant>,
}

#[derive(Debug, Default)]
pub struct StubStats {
    lookups: AtomicUsize,
    invocations: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    in_flight_lookups: AtomicUsize,
    max_in_flight_lookups: AtomicUsize,
    releases: AtomicUsize,
    calls: Mutex<Vec<StubCall>>,
}

impl StubStats {
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    pub fn invocations(&self) -> usize {
        self.invocations.load(Ordering::SeqCst)
    }

    /// Highest number of invocations that were running at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Highest number of lookups that were running at the same time.
    pub fn max_in_flight_lookups(&self) -> usize {
        self.max_in_flight_lookups.load(Ordering::SeqCst)
    }

    /// How many times the object has been dropped.
    pub fn releases(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> Vec<StubCall> {
        self.calls.lock().clone()
    }

    pub fn calls_to(&self, method: &str) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|call| call.method.eq_ignore_ascii_case(method))
            .count()
    }

    pub fn last_call(&self) -> Option<StubCall> {
        self.calls.lock().last().cloned()
    }
}

fn enter(current: &AtomicUsize, max: &AtomicUsize) {
    let now = current.fetch_add(1, Ordering::SeqCst) + 1;
    max.fetch_max(now, Ordering::SeqCst);
}

struct StubMethod {
    name: String,
    handler: Handler,
}

pub struct StubObject {
    by_name: AHashMap<String, DispId>,
    methods: Vec<StubMethod>,
    lookup_delay: Duration,
    invoke_delay: Duration,
    stats: Arc<StubStats>,
}

impl StubObject {
    pub fn new() -> Self {
        Self {
            by_name: AHashMap::new(),
            methods: Vec::new(),
            lookup_delay: Duration::ZERO,
            invoke_delay: Duration::ZERO,
            stats: Arc::new(StubStats::default()),
        }
    }

    /// Register `name`; a later registration of the same name replaces it.
    pub fn with_method<F>(mut self, name: &str, handler: F) -> Self
    where
        F: Fn(&mut [WireArg]) -> Result<Variant, ForeignError> + Send + Sync + 'static,
    {
        let key = name.to_ascii_lowercase();
        let method = StubMethod {
            name: name.to_string(),
            handler: Box::new(handler),
        };
        match self.by_name.get(&key) {
            Some(&id) => self.methods[id as usize] = method,
            None => {
                self.by_name.insert(key, self.methods.len() as DispId);
                self.methods.push(method);
            }
        }
        self
    }

    /// A method that ignores its arguments and returns `value`.
    pub fn with_value(self, name: &str, value: Variant) -> Self {
        self.with_method(name, move |_| Ok(value.clone()))
    }

    pub fn with_lookup_delay(mut self, delay: Duration) -> Self {
        self.lookup_delay = delay;
        self
    }

    pub fn with_invoke_delay(mut self, delay: Duration) -> Self {
        self.invoke_delay = delay;
        self
    }

    /// Shared counters; they stay readable after the stub is moved into a
    /// handle or dropped.
    pub fn stats(&self) -> Arc<StubStats> {
        Arc::clone(&self.stats)
    }
}

impl Default for StubObject {
    fn default() -> Self {
        Self::new()
    }
}

impl AutomationObject for StubObject {
    fn lookup(&self, name: &str) -> Result<Option<DispId>, ForeignError> {
        enter(&self.stats.in_flight_lookups, &self.stats.max_in_flight_lookups);
        self.stats.lookups.fetch_add(1, Ordering::SeqCst);
        if !self.lookup_delay.is_zero() {
            thread::sleep(self.lookup_delay);
        }
        let id = self.by_name.get(&name.to_ascii_lowercase()).copied();
        self.stats.in_flight_lookups.fetch_sub(1, Ordering::SeqCst);
        Ok(id)
    }

    fn invoke(&self, id: DispId, args: &mut [WireArg]) -> Result<Variant, ForeignError> {
        let method = usize::try_from(id)
            .ok()
            .and_then(|idx| self.methods.get(idx))
            .ok_or_else(|| ForeignError::new(codes::DISP_E_MEMBERNOTFOUND, "unknown dispatch id"))?;

        enter(&self.stats.in_flight, &self.stats.max_in_flight);
        self.stats.invocations.fetch_add(1, Ordering::SeqCst);
        self.stats.calls.lock().push(StubCall {
            method: method.name.clone(),
            args: args.iter().map(|arg| arg.value().clone()).collect(),
        });
        if !self.invoke_delay.is_zero() {
            thread::sleep(self.invoke_delay);
        }
        let result = (method.handler)(args);
        self.stats.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

impl Drop for StubObject {
    fn drop(&mut self) {
        self.stats.releases.fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive() {
        let stub = StubObject::new().with_value("FindPic", Variant::I4(0));
        assert_eq!(stub.lookup("findpic"), Ok(Some(0)));
        assert_eq!(stub.lookup("FindPicEx"), Ok(None));
        assert_eq!(stub.stats().lookups(), 2);
    }

    #[test]
    fn test_invoke_records_args() {
        let stub = StubObject::new().with_value("MoveTo", Variant::I4(1));
        let mut args = vec![WireArg::Value(Variant::I4(2)), WireArg::Value(Variant::I4(1))];
        assert_eq!(stub.invoke(0, &mut args), Ok(Variant::I4(1)));
        let call = stub.stats().last_call().unwrap();
        assert_eq!(call.method, "MoveTo");
        assert_eq!(call.args, vec![Variant::I4(2), Variant::I4(1)]);
        assert!(stub.invoke(5, &mut args).is_err());
    }
}
