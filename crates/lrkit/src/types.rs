//! Collection types shared by the analysis passes.

type BuildHasher = std::hash::BuildHasherDefault<rustc_hash::FxHasher>;

/// An insertion-ordered map.
pub type Map<K, V> = indexmap::IndexMap<K, V, BuildHasher>;

/// An insertion-ordered set.
pub type Set<T> = indexmap::IndexSet<T, BuildHasher>;
