//! Flat host buffers shared with external collaborators.

use std::sync::{Arc, PoisonError, RwLock};

use crate::tensor::dtype::Elem;

/// A flat, reference-counted buffer of host-resident elements.
///
/// This is the external array representation consumed and produced by the
/// zero-copy bridge: [`Tensor::from_buffer`](crate::tensor::Tensor::from_buffer)
/// wraps a buffer's memory without copying, and
/// [`Tensor::to_buffer`](crate::tensor::Tensor::to_buffer) hands the same
/// memory back out. While a buffer and a tensor alias the same storage,
/// writes through either side are visible through the other; operations that
/// allocate fresh storage (concatenation, casts, device transfer, copying
/// reshapes) end the aliasing for their results.
///
/// Cloning a buffer clones the handle, not the memory: both handles keep
/// aliasing the same elements.
#[derive(Debug)]
pub struct HostBuffer<E> {
    cells: Arc<RwLock<Vec<E>>>,
}

impl<E> Clone for HostBuffer<E> {
    fn clone(&self) -> Self {
        Self {
            cells: Arc::clone(&self.cells),
        }
    }
}

impl<E: Elem> HostBuffer<E> {
    /// Create a buffer owning the given elements.
    #[must_use]
    pub fn new(cells: Vec<E>) -> Self {
        Self {
            cells: Arc::new(RwLock::new(cells)),
        }
    }

    /// Return the number of elements in the buffer.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read(|cells| cells.len())
    }

    /// Return whether the buffer holds no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Return the element at the given position, if any.
    #[must_use]
    pub fn get(&self, position: usize) -> Option<E> {
        self.read(|cells| cells.get(position).copied())
    }

    /// Overwrite the element at the given position.
    ///
    /// Returns `false` if the position is out of bounds.
    pub fn set(&self, position: usize, value: E) -> bool {
        let mut cells = self.cells.write().unwrap_or_else(PoisonError::into_inner);
        match cells.get_mut(position) {
            Some(cell) => {
                *cell = value;
                true
            }
            None => false,
        }
    }

    /// Copy the buffer's elements into a [`Vec`].
    #[must_use]
    pub fn to_vec(&self) -> Vec<E> {
        self.read(|cells| cells.clone())
    }

    pub(crate) fn share(&self) -> Arc<RwLock<Vec<E>>> {
        Arc::clone(&self.cells)
    }

    pub(crate) fn from_shared(cells: Arc<RwLock<Vec<E>>>) -> Self {
        Self { cells }
    }

    fn read<T>(&self, body: impl FnOnce(&Vec<E>) -> T) -> T {
        let cells = self.cells.read().unwrap_or_else(PoisonError::into_inner);
        body(&cells)
    }
}

impl<E: Elem> From<Vec<E>> for HostBuffer<E> {
    fn from(cells: Vec<E>) -> Self {
        Self::new(cells)
    }
}
