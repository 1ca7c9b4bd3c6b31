use std::collections::{HashMap, HashSet};
use std::hash::Hash;

/// Insertion-ordered map from identity key to visual primitive.
#[derive(Debug, Clone)]
pub struct Keyed<K, P> {
    order: Vec<K>,
    items: HashMap<K, P>,
}

impl<K, P> Default for Keyed<K, P> {
    fn default() -> Self {
        Self {
            order: Vec::new(),
            items: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash + Clone, P> Keyed<K, P> {
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn get(&self, key: &K) -> Option<&P> {
        self.items.get(key)
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut P> {
        self.items.get_mut(key)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.items.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.order.iter()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &P)> {
        self.order
            .iter()
            .filter_map(|k| self.items.get(k).map(|p| (k, p)))
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut P> {
        self.items.values_mut()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileStats {
    pub entered: usize,
    pub updated: usize,
    pub exited: usize,
}

/// Keyed enter/update/exit.
///
/// Keys present in both sets keep their primitive (`on_update` receives it
/// mutably), new keys get one from `on_enter`, and primitives whose key is gone
/// are handed to `on_exit`. A key repeated within `new` keeps its first datum.
/// The resulting order follows `new`.
pub fn reconcile<K, D, P>(
    current: &mut Keyed<K, P>,
    new: impl IntoIterator<Item = (K, D)>,
    mut on_enter: impl FnMut(&K, D) -> P,
    mut on_update: impl FnMut(&K, &mut P, D),
    mut on_exit: impl FnMut(&K, P),
) -> ReconcileStats
where
    K: Eq + Hash + Clone,
{
    let mut stats = ReconcileStats::default();
    let mut old = std::mem::take(&mut current.items);
    let old_order = std::mem::take(&mut current.order);
    let mut seen: HashSet<K> = HashSet::new();

    for (key, datum) in new {
        if !seen.insert(key.clone()) {
            continue;
        }
        let prim = match old.remove(&key) {
            Some(mut prim) => {
                on_update(&key, &mut prim, datum);
                stats.updated += 1;
                prim
            }
            None => {
                stats.entered += 1;
                on_enter(&key, datum)
            }
        };
        current.order.push(key.clone());
        current.items.insert(key, prim);
    }

    for key in old_order {
        if let Some(prim) = old.remove(&key) {
            on_exit(&key, prim);
            stats.exited += 1;
        }
    }

    stats
}
