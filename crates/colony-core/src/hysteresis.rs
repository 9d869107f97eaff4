#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// "Who is here now vs. who was here last tick."
///
/// Only the known set is durable. `appeared` and `disappeared` describe the
/// latest [`HysteresisSet::update`] and are cleared by the next one.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(bound(deserialize = "T: Deserialize<'de>")))]
pub struct HysteresisSet<T> {
    known: Vec<T>,
    #[cfg_attr(feature = "serde", serde(skip))]
    appeared: Vec<T>,
    #[cfg_attr(feature = "serde", serde(skip))]
    disappeared: Vec<T>,
}

impl<T> Default for HysteresisSet<T> {
    fn default() -> Self {
        Self {
            known: Vec::new(),
            appeared: Vec::new(),
            disappeared: Vec::new(),
        }
    }
}

impl<T> HysteresisSet<T>
where
    T: Clone + PartialEq,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_known(known: Vec<T>) -> Self {
        Self {
            known,
            ..Self::default()
        }
    }

    /// Diffs `present` against the known set.
    ///
    /// A known id missing from `present` only counts as disappeared when
    /// `still_present` no longer vouches for it. The known set is replaced by
    /// `present` either way.
    pub fn update<I, F>(&mut self, present: I, mut still_present: F)
    where
        I: IntoIterator<Item = T>,
        F: FnMut(&T) -> bool,
    {
        self.appeared.clear();
        self.disappeared.clear();

        let mut current: Vec<T> = Vec::new();
        for id in present {
            if current.contains(&id) {
                continue;
            }
            if !self.known.contains(&id) {
                self.appeared.push(id.clone());
            }
            current.push(id);
        }

        for id in &self.known {
            if !current.contains(id) && !still_present(id) {
                self.disappeared.push(id.clone());
            }
        }

        self.known = current;
    }

    pub fn known(&self) -> &[T] {
        &self.known
    }

    pub fn appeared(&self) -> &[T] {
        &self.appeared
    }

    pub fn disappeared(&self) -> &[T] {
        &self.disappeared
    }

    pub fn contains(&self, id: &T) -> bool {
        self.known.contains(id)
    }
}
