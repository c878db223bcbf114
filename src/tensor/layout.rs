//! Describes how a tensor's elements are laid out in its storage.

use crate::tensor::error::TensorError;

/// A layout maps tensor indices to positions in a flat storage buffer.
///
/// A layout is a shape, one stride per dimension, and a base offset. Views
/// (slices, transpositions, broadcasts) are produced by deriving a new layout
/// over the same storage; no layout operation touches element data.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Layout {
    /// The number of elements in each axis.
    shape: Vec<usize>,

    /// The number of elements in the storage buffer that need to be skipped
    /// to move to the next element in each axis.
    strides: Vec<usize>,

    /// The storage position of the element at index `[0, 0, ..]`.
    offset: usize,
}

/// Returns the shape that two shapes broadcast to.
///
/// Dimensions are compared trailing-aligned; a dimension of size 1 stretches
/// to match the other operand, and mismatched sizes fail.
///
/// # Errors
///
/// Returns an error if the shapes cannot be broadcast together.
pub fn broadcast_shape(lhs: &[usize], rhs: &[usize]) -> Result<Vec<usize>, TensorError> {
    let (small, large) = if lhs.len() < rhs.len() {
        (lhs, rhs)
    } else {
        (rhs, lhs)
    };
    let mut shape = large.to_vec();
    for dim in 0..small.len() {
        let sm_size = small[small.len() - dim - 1];
        let lg_idx = large.len() - dim - 1;
        let lg_size = large[lg_idx];
        if sm_size == lg_size || sm_size == 1 {
            continue;
        }
        if lg_size == 1 {
            shape[lg_idx] = sm_size;
        } else {
            return Err(TensorError::Shape(lhs.to_vec(), rhs.to_vec()));
        }
    }
    Ok(shape)
}

fn contiguous_strides(shape: &[usize]) -> Vec<usize> {
    let mut strides = vec![1; shape.len()];
    for dim in (0..shape.len().saturating_sub(1)).rev() {
        strides[dim] = strides[dim + 1] * shape[dim + 1];
    }
    strides
}

impl Layout {
    /// Creates a contiguous row-major layout based on the given shape.
    #[must_use]
    pub fn contiguous(shape: &[usize]) -> Self {
        Self {
            strides: contiguous_strides(shape),
            shape: shape.to_vec(),
            offset: 0,
        }
    }

    pub(crate) fn with_parts(shape: Vec<usize>, strides: Vec<usize>, offset: usize) -> Self {
        Self {
            shape,
            strides,
            offset,
        }
    }

    /// Return the size of each dimension.
    #[must_use]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Return the stride of each dimension.
    #[must_use]
    pub fn strides(&self) -> &[usize] {
        &self.strides
    }

    /// Return the storage position of the first element.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Return the number of dimensions.
    #[must_use]
    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    /// Returns the number of elements in a tensor having this layout.
    #[must_use]
    pub fn elems(&self) -> usize {
        self.shape.iter().product()
    }

    /// Return whether the layout visits a row-major contiguous run of storage.
    ///
    /// Singleton dimensions are ignored; an empty layout is contiguous.
    #[must_use]
    pub fn is_contiguous(&self) -> bool {
        let mut expected = 1;
        for (&size, &stride) in self.shape.iter().zip(self.strides.iter()).rev() {
            if size == 1 {
                continue;
            }
            if size == 0 {
                return true;
            }
            if stride != expected {
                return false;
            }
            expected *= size;
        }
        true
    }

    /// Translates a tensor index into a position in the storage buffer.
    #[must_use]
    pub fn translate(&self, index: &[usize]) -> usize {
        self.offset
            + index
                .iter()
                .zip(self.strides.iter())
                .map(|(x, s)| x * s)
                .sum::<usize>()
    }

    /// Creates a row-major iterator over all indices of the tensor.
    #[must_use]
    pub fn iter(&self) -> IndexIter<'_> {
        self.into_iter()
    }

    /// Returns a new layout viewing the tensor at the given broadcast shape.
    ///
    /// Stretched dimensions get a stride of 0, mapping every index along them
    /// to the same storage position.
    ///
    /// # Errors
    ///
    /// Returns an error if the layout cannot be broadcast to the new shape.
    pub fn broadcast_to(&self, shape: &[usize]) -> Result<Self, TensorError> {
        if shape.len() < self.shape.len() {
            return Err(TensorError::Shape(self.shape.clone(), shape.to_vec()));
        }
        let mut strides = vec![0; shape.len()];
        for dim in 0..self.shape.len() {
            let old_idx = self.shape.len() - dim - 1;
            let new_idx = shape.len() - dim - 1;
            if self.shape[old_idx] == shape[new_idx] {
                strides[new_idx] = self.strides[old_idx];
            } else if self.shape[old_idx] == 1 {
                strides[new_idx] = 0;
            } else {
                return Err(TensorError::Shape(self.shape.clone(), shape.to_vec()));
            }
        }
        Ok(Self {
            shape: shape.to_vec(),
            strides,
            offset: self.offset,
        })
    }

    /// Returns a new layout where the dimensions are permuted.
    ///
    /// # Errors
    ///
    /// Returns an error if the permutation does not name every dimension
    /// exactly once.
    pub fn permute(&self, permutation: &[usize]) -> Result<Self, TensorError> {
        let rank = self.rank();
        if permutation.len() != rank {
            return Err(TensorError::Value(format!(
                "permute: expected {rank} dimensions, got {}",
                permutation.len()
            )));
        }
        let mut seen = vec![false; rank];
        let mut shape = Vec::with_capacity(rank);
        let mut strides = Vec::with_capacity(rank);
        for &dim in permutation {
            if dim >= rank {
                return Err(TensorError::Dimension { dim, rank });
            }
            if seen[dim] {
                return Err(TensorError::Value(format!(
                    "permute: duplicate dimension {dim}"
                )));
            }
            seen[dim] = true;
            shape.push(self.shape[dim]);
            strides.push(self.strides[dim]);
        }
        Ok(Self {
            shape,
            strides,
            offset: self.offset,
        })
    }

    /// Returns a new layout with 2 dimensions swapped.
    ///
    /// # Errors
    ///
    /// Returns an error if one of the dimensions is invalid.
    pub fn transpose(&self, dim0: usize, dim1: usize) -> Result<Self, TensorError> {
        let rank = self.rank();
        for dim in [dim0, dim1] {
            if dim >= rank {
                return Err(TensorError::Dimension { dim, rank });
            }
        }
        let mut permutation: Vec<_> = (0..rank).collect();
        permutation.swap(dim0, dim1);
        self.permute(&permutation)
    }

    /// Returns a new layout where all singleton dimensions are removed.
    #[must_use]
    pub fn squeeze(&self) -> Self {
        let mut shape = Vec::with_capacity(self.shape.len());
        let mut strides = Vec::with_capacity(self.strides.len());
        for (&size, &stride) in self.shape.iter().zip(self.strides.iter()) {
            if size != 1 {
                shape.push(size);
                strides.push(stride);
            }
        }
        Self {
            shape,
            strides,
            offset: self.offset,
        }
    }

    /// Returns 2 layouts where the first is the reduced layout and the second
    /// is the reducer layout. The reducer maps an index in the original
    /// tensor to a position in the reduced tensor's storage: its stride along
    /// the reduced axis is 0, so every element along that axis lands on the
    /// same output position.
    pub(crate) fn reduce(&self, axis: usize) -> (Self, Self) {
        let mut reduced_shape = self.shape.clone();
        reduced_shape[axis] = 1;
        let reduced = Self::contiguous(&reduced_shape);
        let mut reducer = reduced.clone();
        reducer.strides[axis] = 0;
        (reduced, reducer)
    }

    /// Decides how the layout accommodates a new shape: as a zero-copy view
    /// when the visited elements already form a contiguous run, or by copying
    /// into fresh storage otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if the new shape holds a different number of elements.
    pub(crate) fn reshape(&self, shape: &[usize]) -> Result<Reshaped, TensorError> {
        if shape.iter().product::<usize>() != self.elems() {
            return Err(TensorError::Shape(self.shape.clone(), shape.to_vec()));
        }
        if self.elems() == 0 {
            return Ok(Reshaped::Copy);
        }
        if self.is_contiguous() {
            return Ok(Reshaped::View(Self {
                strides: contiguous_strides(shape),
                shape: shape.to_vec(),
                offset: self.offset,
            }));
        }
        Ok(Reshaped::Copy)
    }
}

pub(crate) enum Reshaped {
    View(Layout),
    Copy,
}

impl<'a> IntoIterator for &'a Layout {
    type Item = Vec<usize>;
    type IntoIter = IndexIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        IndexIter {
            shape: &self.shape,
            index: vec![0; self.shape.len()],
            exhausted: self.shape.iter().any(|&size| size == 0),
        }
    }
}

/// A row-major iterator over a tensor's indices.
#[derive(Debug)]
pub struct IndexIter<'a> {
    shape: &'a [usize],
    index: Vec<usize>,
    exhausted: bool,
}

impl Iterator for IndexIter<'_> {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }
        let index = self.index.clone();
        self.exhausted = true;
        for dim in (0..self.shape.len()).rev() {
            self.index[dim] += 1;
            if self.index[dim] < self.shape[dim] {
                self.exhausted = false;
                break;
            }
            self.index[dim] = 0;
        }
        Some(index)
    }
}
