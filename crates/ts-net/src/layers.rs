//! `Layers<T>` — ordered buckets keyed by integer layer.
//!
//! The registry keeps two independent instances, one for render order and
//! one for simulate order.  Buckets are created lazily on first `add` and
//! are never dropped, so a layer that has been registered once stays valid
//! for `remove` even after its last item left.

use std::collections::BTreeMap;

use thiserror::Error;

use ts_core::Layer;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LayerError {
    #[error("layer {0} was never registered")]
    OutOfRange(Layer),
}

/// Insertion-ordered buckets, iterated in ascending layer order.
#[derive(Clone, Debug)]
pub struct Layers<T> {
    buckets: BTreeMap<Layer, Vec<T>>,
}

impl<T> Default for Layers<T> {
    fn default() -> Self {
        Self { buckets: BTreeMap::new() }
    }
}

impl<T> Layers<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `item` to `layer`, creating the bucket if absent.
    pub fn add(&mut self, layer: Layer, item: T) {
        self.buckets.entry(layer).or_default().push(item);
    }

    /// Remove the first occurrence of `item` from `layer`.
    ///
    /// Returns `Ok(false)` if the layer exists but does not hold `item`, and
    /// [`LayerError::OutOfRange`] if `layer` was never registered.
    pub fn remove(&mut self, layer: Layer, item: &T) -> Result<bool, LayerError>
    where
        T: PartialEq,
    {
        let bucket = self.buckets.get_mut(&layer).ok_or(LayerError::OutOfRange(layer))?;
        match bucket.iter().position(|x| x == item) {
            Some(i) => {
                bucket.remove(i);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Populated layer keys in ascending numeric order.
    pub fn layers_ascending(&self) -> impl Iterator<Item = Layer> + '_ {
        self.buckets
            .iter()
            .filter(|(_, items)| !items.is_empty())
            .map(|(&layer, _)| layer)
    }

    /// Items of `layer` in insertion order (empty if the layer is unknown).
    pub fn items_of(&self, layer: Layer) -> impl Iterator<Item = &T> + '_ {
        self.buckets.get(&layer).into_iter().flatten()
    }

    /// Borrow a whole bucket.
    pub fn bucket(&self, layer: Layer) -> Option<&[T]> {
        self.buckets.get(&layer).map(Vec::as_slice)
    }

    /// Every item, layer by layer, each layer in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (Layer, &T)> + '_ {
        self.buckets
            .iter()
            .flat_map(|(&layer, items)| items.iter().map(move |item| (layer, item)))
    }

    /// Total number of items across all layers.
    pub fn len(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.values().all(Vec::is_empty)
    }
}
