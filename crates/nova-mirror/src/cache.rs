use std::collections::HashMap;

use nova_types::Type;
use parking_lot::RwLock;

use crate::invoke::{ArgPacking, MatchType};
use crate::members::{ConstructorId, MethodId};

/// (type, logical name, argument shape). Constructors use an empty name.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub ty: Type,
    pub name: String,
    pub shape: Vec<Type>,
}

impl CacheKey {
    pub fn new(ty: Type, name: impl Into<String>, shape: Vec<Type>) -> Self {
        Self {
            ty,
            name: name.into(),
            shape,
        }
    }
}

/// A resolved invocation plan, minus the arguments it was resolved for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CachedMember {
    Method {
        id: MethodId,
        match_type: MatchType,
        packing: ArgPacking,
    },
    Constructor {
        id: ConstructorId,
        match_type: MatchType,
        packing: ArgPacking,
    },
}

/// Concurrent memo of resolved plans.
///
/// Resolution is a pure function of the key, so racing writers store equal values and the
/// last one wins. When `max_entries` would be exceeded the map is emptied first.
#[derive(Debug)]
pub struct MemberCache {
    entries: RwLock<HashMap<CacheKey, CachedMember>>,
    max_entries: usize,
}

impl Default for MemberCache {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_CACHE_ENTRIES)
    }
}

impl MemberCache {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            max_entries,
        }
    }

    pub fn get(&self, key: &CacheKey) -> Option<CachedMember> {
        self.entries.read().get(key).cloned()
    }

    pub fn insert(&self, key: CacheKey, member: CachedMember) {
        if self.max_entries == 0 {
            return;
        }
        let mut entries = self.entries.write();
        if entries.len() >= self.max_entries && !entries.contains_key(&key) {
            entries.clear();
        }
        entries.insert(key, member);
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }
}
