use std::hash::Hash;

pub use indexmap::Equivalent;
pub use std::collections::btree_map as ordered_map;
pub use std::collections::btree_set as ordered_set;

/// Type alias for sets, we use this to hide which kind of set we are actually
/// using. Equality on this type is order-independent: two sets are equal iff
/// they have the same cardinality and the same elements.
pub type Set<S> = indexmap::IndexSet<S>;
/// Type alias for maps, we use this to hide which kind of map we are actually
/// using.
pub type Map<K, V> = indexmap::IndexMap<K, V>;

/// Type alias for sets that iterate in ascending order. Used where a
/// canonical ordering is required, e.g. for subset naming and JSON output.
pub type OrderedSet<S> = std::collections::BTreeSet<S>;
/// Type alias for maps that iterate in ascending key order.
pub type OrderedMap<K, V> = std::collections::BTreeMap<K, V>;

/// Returns a fresh set containing the elements present in both `a` and `b`.
pub fn intersection<T: Clone + Hash + Eq>(a: &Set<T>, b: &Set<T>) -> Set<T> {
    a.iter().filter(|x| b.contains(*x)).cloned().collect()
}

/// Returns true if `a` and `b` share at least one element.
pub fn intersects<T: Hash + Eq>(a: &Set<T>, b: &Set<T>) -> bool {
    a.iter().any(|x| b.contains(x))
}

/// Returns true if every element of `a` is contained in `b`.
pub fn is_subset<T: Hash + Eq>(a: &Set<T>, b: &Set<T>) -> bool {
    a.iter().all(|x| b.contains(x))
}

/// Materializes a set as a sorted vector of clones. Iteration order of [`Set`]
/// is unspecified, so every consumer that needs reproducible output goes
/// through this.
pub fn sorted<T: Clone + Ord + Hash>(set: &Set<T>) -> Vec<T> {
    let mut v: Vec<T> = set.iter().cloned().collect();
    v.sort();
    v
}
