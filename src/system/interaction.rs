use ahash::AHashMap;
use smallvec::SmallVec;

/// Marker for types usable as variable labels: anything cloneable,
/// orderable, and hashable qualifies (integers, `&str`, `String`, ...).
pub trait Label: Clone + Ord + std::hash::Hash {}

impl<T: Clone + Ord + std::hash::Hash> Label for T {}

/// Interaction key as given by the caller: one or two labels, inline.
pub(crate) type Key<L> = SmallVec<[L; 2]>;

/// A sparse quadratic form keyed by label tuples.
///
/// `set(&[x], h)` is a linear term, `set(&[x, y], w)` a pairwise
/// coupling, and `set(&[x, x], s)` a diagonal self-coupling. Keys are
/// unordered: entries whose sorted labels coincide are summed during
/// normalization, so `(x, y)` and `(y, x)` name the same coefficient.
/// Key arity is checked by [`System::new`](crate::System::new).
#[derive(Clone, Debug)]
pub struct Interaction<L: Label> {
    terms: AHashMap<Key<L>, f64>,
}

impl<L: Label> Interaction<L> {
    pub fn new() -> Self {
        Self { terms: AHashMap::new() }
    }

    /// Set the coefficient for one key, replacing any previous entry
    /// with the identical label order.
    pub fn set(&mut self, labels: &[L], coefficient: f64) {
        self.terms.insert(Key::from(labels), coefficient);
    }

    /// Number of stored entries (before normalization).
    #[inline] pub fn len(&self) -> usize { self.terms.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.terms.is_empty() }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (&[L], f64)> {
        self.terms.iter().map(|(key, &coefficient)| (key.as_slice(), coefficient))
    }
}

impl<L: Label> Default for Interaction<L> {
    fn default() -> Self {
        Self::new()
    }
}
