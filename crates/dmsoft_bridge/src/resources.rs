//! Liveness tracking for resources the object hands out.
//!
//! Pictures loaded into the object's cache, screen-data snapshots, captures
//! and remotely allocated memory all outlive the call that created them.
//! The registry records which are live so that a double free or a use after
//! free is reported instead of passed through.

use std::collections::VecDeque;
use std::fmt;

use ahash::AHashSet;
use parking_lot::Mutex;

use crate::error::LifecycleError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Picture,
    ScreenData,
    Capture,
    RemoteMemory,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Picture => write!(f, "picture"),
            ResourceKind::ScreenData => write!(f, "screen data"),
            ResourceKind::Capture => write!(f, "capture"),
            ResourceKind::RemoteMemory => write!(f, "remote memory"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResourceKey {
    /// File-like names compare case-insensitively.
    Name(String),
    Id(i64),
    /// Address inside the process owning window `owner`.
    Remote { owner: i64, addr: i64 },
}

impl ResourceKey {
    pub fn name(name: &str) -> Self {
        ResourceKey::Name(name.trim().to_lowercase())
    }

    pub fn id(id: i64) -> Self {
        ResourceKey::Id(id)
    }

    pub fn remote(owner: i64, addr: i64) -> Self {
        ResourceKey::Remote { owner, addr }
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKey::Name(name) => f.write_str(name),
            ResourceKey::Id(id) => write!(f, "{id:#x}"),
            ResourceKey::Remote { owner, addr } => write!(f, "{addr:#x} in {owner:#x}"),
        }
    }
}

/// Freed entries remembered for double-free reports. Older ones are
/// forgotten and then report as unknown.
const FREED_HISTORY: usize = 4096;

fn is_wildcard(name: &str) -> bool {
    name.contains(['*', '?'])
}

fn picture_names(names: &str) -> impl Iterator<Item = &str> {
    names.split('|').map(str::trim).filter(|name| !name.is_empty())
}

/// Splits the object's `a.bmp|b.bmp` picture lists into keys. Wildcard
/// entries are left to [`picture_patterns`].
pub fn picture_keys(names: &str) -> Vec<ResourceKey> {
    picture_names(names)
        .filter(|name| !is_wildcard(name))
        .map(ResourceKey::name)
        .collect()
}

/// The wildcard entries (`*`, `?`) of a picture list, lowercased.
pub fn picture_patterns(names: &str) -> Vec<String> {
    picture_names(names)
        .filter(|name| is_wildcard(name))
        .map(str::to_lowercase)
        .collect()
}

/// `*` matches any run of characters, `?` exactly one.
pub fn wildcard_matches(pattern: &str, name: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let name: Vec<char> = name.chars().collect();
    let (mut p, mut n) = (0, 0);
    let mut star: Option<(usize, usize)> = None;
    while n < name.len() {
        match pattern.get(p) {
            Some('*') => {
                star = Some((p, n));
                p += 1;
            }
            Some(&c) if c == '?' || c == name[n] => {
                p += 1;
                n += 1;
            }
            _ => match star {
                Some((star_p, star_n)) => {
                    p = star_p + 1;
                    n = star_n + 1;
                    star = Some((star_p, star_n + 1));
                }
                None => return false,
            },
        }
    }
    pattern[p..].iter().all(|&c| c == '*')
}

#[derive(Debug, Default)]
struct RegistryState {
    live: AHashSet<(ResourceKind, ResourceKey)>,
    freed: AHashSet<(ResourceKind, ResourceKey)>,
    freed_order: VecDeque<(ResourceKind, ResourceKey)>,
}

impl RegistryState {
    fn mark_freed(&mut self, entry: (ResourceKind, ResourceKey)) {
        if self.freed.insert(entry.clone()) {
            self.freed_order.push_back(entry);
        }
        while self.freed_order.len() > FREED_HISTORY {
            if let Some(oldest) = self.freed_order.pop_front() {
                self.freed.remove(&oldest);
            }
        }
    }

    fn forget_freed(&mut self, entry: &(ResourceKind, ResourceKey)) {
        if self.freed.remove(entry) {
            self.freed_order.retain(|old| old != entry);
        }
    }
}

#[derive(Debug)]
pub struct ResourceRegistry {
    enabled: bool,
    state: Mutex<RegistryState>,
}

impl ResourceRegistry {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            state: Mutex::new(RegistryState::default()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Record a newly created resource. A key freed earlier may be handed
    /// out again by the object.
    pub fn register(&self, kind: ResourceKind, key: ResourceKey) {
        if !self.enabled {
            return;
        }
        let mut state = self.state.lock();
        let entry = (kind, key);
        state.forget_freed(&entry);
        state.live.insert(entry);
    }

    /// Fails if `key` is freed or was never registered.
    pub fn check_live(&self, kind: ResourceKind, key: &ResourceKey) -> Result<(), LifecycleError> {
        if !self.enabled {
            return Ok(());
        }
        let state = self.state.lock();
        let entry = (kind, key.clone());
        if state.live.contains(&entry) {
            Ok(())
        } else if state.freed.contains(&entry) {
            Err(LifecycleError::UseAfterFree {
                kind,
                key: key.clone(),
            })
        } else {
            Err(LifecycleError::Unknown {
                kind,
                key: key.clone(),
            })
        }
    }

    /// Like [`check_live`](Self::check_live), for a key about to be freed:
    /// a freed key is reported as freed twice rather than used after free.
    pub fn check_releasable(
        &self,
        kind: ResourceKind,
        key: &ResourceKey,
    ) -> Result<(), LifecycleError> {
        match self.check_live(kind, key) {
            Err(LifecycleError::UseAfterFree { kind, key }) => {
                Err(LifecycleError::AlreadyFreed { kind, key })
            }
            other => other,
        }
    }

    pub fn release(&self, kind: ResourceKind, key: &ResourceKey) -> Result<(), LifecycleError> {
        if !self.enabled {
            return Ok(());
        }
        let mut state = self.state.lock();
        let entry = (kind, key.clone());
        if state.live.remove(&entry) {
            state.mark_freed(entry);
            Ok(())
        } else if state.freed.contains(&entry) {
            Err(LifecycleError::AlreadyFreed {
                kind,
                key: key.clone(),
            })
        } else {
            Err(LifecycleError::Unknown {
                kind,
                key: key.clone(),
            })
        }
    }

    /// Free every live resource of `kind`, returning how many there were.
    pub fn release_all(&self, kind: ResourceKind) -> usize {
        if !self.enabled {
            return 0;
        }
        let mut state = self.state.lock();
        let drained: Vec<_> = state
            .live
            .iter()
            .filter(|(k, _)| *k == kind)
            .cloned()
            .collect();
        let count = drained.len();
        for entry in drained {
            state.live.remove(&entry);
            state.mark_freed(entry);
        }
        count
    }

    /// Free every live named resource of `kind` matching the wildcard
    /// `pattern`, returning how many matched.
    pub fn release_matching(&self, kind: ResourceKind, pattern: &str) -> usize {
        if !self.enabled {
            return 0;
        }
        let pattern = pattern.trim().to_lowercase();
        let mut state = self.state.lock();
        let drained: Vec<_> = state
            .live
            .iter()
            .filter(|(k, key)| {
                *k == kind
                    && matches!(key, ResourceKey::Name(name) if wildcard_matches(&pattern, name))
            })
            .cloned()
            .collect();
        let count = drained.len();
        for entry in drained {
            state.live.remove(&entry);
            state.mark_freed(entry);
        }
        count
    }

    pub fn is_live(&self, kind: ResourceKind, key: &ResourceKey) -> bool {
        self.state.lock().live.contains(&(kind, key.clone()))
    }

    pub fn live_count(&self, kind: ResourceKind) -> usize {
        self.state
            .lock()
            .live
            .iter()
            .filter(|(k, _)| *k == kind)
            .count()
    }

    pub fn total_live(&self) -> usize {
        self.state.lock().live.len()
    }
}

impl Default for ResourceRegistry {
    fn default() -> Self {
        Self::new(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_free_twice_and_use_after_free() {
        let registry = ResourceRegistry::new(true);
        let key = ResourceKey::id(0x2000);
        registry.register(ResourceKind::RemoteMemory, key.clone());
        registry.check_live(ResourceKind::RemoteMemory, &key).unwrap();
        registry.release(ResourceKind::RemoteMemory, &key).unwrap();

        assert_eq!(
            registry.release(ResourceKind::RemoteMemory, &key),
            Err(LifecycleError::AlreadyFreed {
                kind: ResourceKind::RemoteMemory,
                key: key.clone()
            })
        );
        assert!(matches!(
            registry.check_live(ResourceKind::RemoteMemory, &key),
            Err(LifecycleError::UseAfterFree { .. })
        ));
    }

    #[test]
    fn test_releasable_reports_double_free() {
        let registry = ResourceRegistry::new(true);
        let key = ResourceKey::name("a.bmp");
        assert!(matches!(
            registry.check_releasable(ResourceKind::Picture, &key),
            Err(LifecycleError::Unknown { .. })
        ));
        registry.register(ResourceKind::Picture, key.clone());
        registry.check_releasable(ResourceKind::Picture, &key).unwrap();
        registry.release(ResourceKind::Picture, &key).unwrap();
        assert!(matches!(
            registry.check_releasable(ResourceKind::Picture, &key),
            Err(LifecycleError::AlreadyFreed { .. })
        ));
    }

    #[test]
    fn test_unknown_and_kind_separation() {
        let registry = ResourceRegistry::new(true);
        let key = ResourceKey::id(1);
        registry.register(ResourceKind::Capture, key.clone());
        assert!(matches!(
            registry.release(ResourceKind::RemoteMemory, &key),
            Err(LifecycleError::Unknown { .. })
        ));
        assert_eq!(registry.live_count(ResourceKind::Capture), 1);
    }

    #[test]
    fn test_picture_names_are_case_insensitive() {
        let registry = ResourceRegistry::new(true);
        for key in picture_keys("Ok.bmp| cancel.BMP |") {
            registry.register(ResourceKind::Picture, key);
        }
        assert!(registry.is_live(ResourceKind::Picture, &ResourceKey::name("ok.BMP")));
        assert_eq!(registry.release_all(ResourceKind::Picture), 2);
        assert_eq!(registry.total_live(), 0);
    }

    #[test]
    fn test_reissued_key_is_live_again() {
        let registry = ResourceRegistry::new(true);
        let key = ResourceKey::id(9);
        registry.register(ResourceKind::ScreenData, key.clone());
        registry.release(ResourceKind::ScreenData, &key).unwrap();
        registry.register(ResourceKind::ScreenData, key.clone());
        assert!(registry.check_live(ResourceKind::ScreenData, &key).is_ok());
    }

    #[test]
    fn test_wildcards() {
        assert!(wildcard_matches("*.bmp", "a.bmp"));
        assert!(wildcard_matches("btn_?.bmp", "btn_1.bmp"));
        assert!(wildcard_matches("*", ""));
        assert!(wildcard_matches("a*b*c", "axxbyyc"));
        assert!(!wildcard_matches("*.bmp", "a.png"));
        assert!(!wildcard_matches("btn_?.bmp", "btn_12.bmp"));

        assert_eq!(picture_keys("a.bmp|*.png"), vec![ResourceKey::name("a.bmp")]);
        assert_eq!(picture_patterns("a.bmp| *.PNG "), vec!["*.png".to_string()]);
    }

    #[test]
    fn test_release_matching_marks_freed() {
        let registry = ResourceRegistry::new(true);
        for key in picture_keys("a.bmp|b.BMP|c.png") {
            registry.register(ResourceKind::Picture, key);
        }
        assert_eq!(registry.release_matching(ResourceKind::Picture, "*.Bmp"), 2);
        assert!(matches!(
            registry.check_releasable(ResourceKind::Picture, &ResourceKey::name("b.bmp")),
            Err(LifecycleError::AlreadyFreed { .. })
        ));
        assert!(registry.is_live(ResourceKind::Picture, &ResourceKey::name("c.png")));
    }

    #[test]
    fn test_remote_keys_are_per_owner() {
        let registry = ResourceRegistry::new(true);
        let first = ResourceKey::remote(1, 0x10000);
        let second = ResourceKey::remote(2, 0x10000);
        registry.register(ResourceKind::RemoteMemory, first.clone());
        registry.register(ResourceKind::RemoteMemory, second.clone());
        registry.release(ResourceKind::RemoteMemory, &first).unwrap();
        registry.release(ResourceKind::RemoteMemory, &second).unwrap();
    }

    #[test]
    fn test_freed_history_is_bounded() {
        let registry = ResourceRegistry::new(true);
        let total = FREED_HISTORY as i64 + 10;
        for id in 0..total {
            let key = ResourceKey::id(id);
            registry.register(ResourceKind::Capture, key.clone());
            registry.release(ResourceKind::Capture, &key).unwrap();
        }
        {
            let state = registry.state.lock();
            assert_eq!(state.freed.len(), FREED_HISTORY);
            assert_eq!(state.freed_order.len(), FREED_HISTORY);
        }
        assert!(matches!(
            registry.release(ResourceKind::Capture, &ResourceKey::id(0)),
            Err(LifecycleError::Unknown { .. })
        ));
        assert!(matches!(
            registry.release(ResourceKind::Capture, &ResourceKey::id(total - 1)),
            Err(LifecycleError::AlreadyFreed { .. })
        ));

        registry.register(ResourceKind::Capture, ResourceKey::id(total - 1));
        assert_eq!(registry.state.lock().freed_order.len(), FREED_HISTORY - 1);
    }

    #[test]
    fn test_disabled_registry_accepts_everything() {
        let registry = ResourceRegistry::new(false);
        let key = ResourceKey::id(3);
        assert!(registry.release(ResourceKind::Capture, &key).is_ok());
        assert!(registry.check_live(ResourceKind::Capture, &key).is_ok());
    }
}
