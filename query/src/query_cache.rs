use std::{
    any::{Any, TypeId},
    cell::RefCell,
    collections::{hash_map::Entry, HashMap},
    rc::Rc,
};

use crate::{query::Query, QueryError, QueryKey, QueryValue};

type TypeKey = (TypeId, TypeId, TypeId);

#[derive(Clone, Default)]
pub(crate) struct QueryCache {
    cache: Rc<RefCell<HashMap<TypeKey, Box<dyn CacheEntryTrait>>>>,
}

pub(crate) struct CacheEntry<K, V, E>(HashMap<K, Query<K, V, E>>);

// Trait to enable cache introspection among distinct cache entry maps.
pub(crate) trait CacheEntryTrait: CacheSize + CacheCancel {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<K, V, E> CacheEntryTrait for CacheEntry<K, V, E>
where
    K: QueryKey + 'static,
    V: QueryValue + 'static,
    E: QueryError + 'static,
{
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

pub(crate) trait CacheSize {
    fn size(&self) -> usize;
}

impl<K, V, E> CacheSize for CacheEntry<K, V, E> {
    fn size(&self) -> usize {
        self.0.len()
    }
}

pub(crate) trait CacheCancel {
    fn cancel_all(&self);
}

impl<K, V, E> CacheCancel for CacheEntry<K, V, E>
where
    K: QueryKey + 'static,
    V: QueryValue + 'static,
    E: QueryError + 'static,
{
    fn cancel_all(&self) {
        for query in self.0.values() {
            query.cancel();
        }
    }
}

impl QueryCache {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn get_or_create_query<K, V, E>(&self, key: K) -> Query<K, V, E>
    where
        K: QueryKey + 'static,
        V: QueryValue + 'static,
        E: QueryError + 'static,
    {
        self.use_cache(move |cache| match cache.entry(key) {
            Entry::Occupied(entry) => entry.get().clone(),
            Entry::Vacant(entry) => {
                let query = Query::new(entry.key().clone());
                entry.insert(query).clone()
            }
        })
    }

    pub(crate) fn get_query<K, V, E>(&self, key: &K) -> Option<Query<K, V, E>>
    where
        K: QueryKey + 'static,
        V: QueryValue + 'static,
        E: QueryError + 'static,
    {
        self.use_cache_option(move |cache| cache.get(key).cloned())
    }

    pub(crate) fn size(&self) -> usize {
        RefCell::try_borrow(&self.cache)
            .expect("size borrow")
            .values()
            .map(|entry| entry.size())
            .sum()
    }

    pub(crate) fn evict_query<K, V, E>(&self, key: &K) -> bool
    where
        K: QueryKey + 'static,
        V: QueryValue + 'static,
        E: QueryError + 'static,
    {
        let removed = self.use_cache_option_mut::<K, V, E, _, _>(move |cache| cache.remove(key));

        if let Some(query) = removed {
            query.cancel();
            true
        } else {
            false
        }
    }

    pub(crate) fn clear_all_queries(&self) {
        let entries = std::mem::take(
            &mut *RefCell::try_borrow_mut(&self.cache).expect("clear_all_queries borrow_mut"),
        );
        for entry in entries.values() {
            entry.cancel_all();
        }
    }

    pub(crate) fn use_cache_option<K, V, E, F, R>(&self, func: F) -> Option<R>
    where
        K: QueryKey + 'static,
        V: QueryValue + 'static,
        E: QueryError + 'static,
        F: FnOnce(&HashMap<K, Query<K, V, E>>) -> Option<R>,
    {
        let cache = RefCell::try_borrow(&self.cache).expect("use_cache_option borrow");
        let cache = cache.get(&type_key::<K, V, E>())?;
        let cache = cache
            .as_any()
            .downcast_ref::<CacheEntry<K, V, E>>()
            .expect(EXPECT_CACHE_ERROR);
        func(&cache.0)
    }

    pub(crate) fn use_cache_option_mut<K, V, E, F, R>(&self, func: F) -> Option<R>
    where
        K: QueryKey + 'static,
        V: QueryValue + 'static,
        E: QueryError + 'static,
        F: FnOnce(&mut HashMap<K, Query<K, V, E>>) -> Option<R>,
    {
        let mut cache = RefCell::try_borrow_mut(&self.cache).expect("use_cache_option_mut borrow");
        let cache = cache.get_mut(&type_key::<K, V, E>())?;
        let cache = cache
            .as_any_mut()
            .downcast_mut::<CacheEntry<K, V, E>>()
            .expect(EXPECT_CACHE_ERROR);
        func(&mut cache.0)
    }

    pub(crate) fn use_cache<K, V, E, R>(
        &self,
        func: impl FnOnce(&mut HashMap<K, Query<K, V, E>>) -> R,
    ) -> R
    where
        K: QueryKey + 'static,
        V: QueryValue + 'static,
        E: QueryError + 'static,
    {
        let mut cache = RefCell::try_borrow_mut(&self.cache).expect("use_cache borrow");

        let cache: &mut Box<dyn CacheEntryTrait> = match cache.entry(type_key::<K, V, E>()) {
            Entry::Occupied(o) => o.into_mut(),
            Entry::Vacant(v) => {
                let wrapped: CacheEntry<K, V, E> = CacheEntry(HashMap::new());
                v.insert(Box::new(wrapped))
            }
        };

        let cache: &mut CacheEntry<K, V, E> = cache
            .as_any_mut()
            .downcast_mut::<CacheEntry<K, V, E>>()
            .expect(EXPECT_CACHE_ERROR);

        func(&mut cache.0)
    }
}

fn type_key<K: 'static, V: 'static, E: 'static>() -> TypeKey {
    (TypeId::of::<K>(), TypeId::of::<V>(), TypeId::of::<E>())
}

const EXPECT_CACHE_ERROR: &str =
    "Error: Query Cache Type Mismatch. This should not happen. Please file a bug report.";
