//! Shared element buffers and the kernels that read and write them.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::tensor::{
    dtype::{DType, Scalar},
    layout::Layout,
};

/// Where a buffer's memory came from.
///
/// The engine only ever allocates `Owned` buffers; `External` buffers alias
/// the memory of a [`HostBuffer`](crate::buffer::HostBuffer) handed in
/// through the bridge and are kept alive by reference counting rather than
/// being owned by any one tensor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Origin {
    /// Allocated by the engine for a tensor.
    Owned,
    /// Aliases an externally created buffer.
    External,
}

/// A reference-counted flat buffer of elements.
///
/// Buffers are shared between every view of a tensor and, for imported
/// storage, with the originating external buffer; writes through any handle
/// are visible through all of them. Element access takes the interior lock
/// once per gather or scatter and never holds it across user code.
#[derive(Debug)]
pub struct Buffer<E> {
    cells: Arc<RwLock<Vec<E>>>,
    origin: Origin,
}

impl<E> Clone for Buffer<E> {
    fn clone(&self) -> Self {
        Self {
            cells: Arc::clone(&self.cells),
            origin: self.origin,
        }
    }
}

impl<E> Buffer<E> {
    pub(crate) fn owned(cells: Vec<E>) -> Self {
        Self {
            cells: Arc::new(RwLock::new(cells)),
            origin: Origin::Owned,
        }
    }

    pub(crate) fn external(cells: Arc<RwLock<Vec<E>>>) -> Self {
        Self {
            cells,
            origin: Origin::External,
        }
    }

    pub(crate) fn cells(&self) -> &Arc<RwLock<Vec<E>>> {
        &self.cells
    }

    pub(crate) fn read(&self) -> RwLockReadGuard<'_, Vec<E>> {
        self.cells.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn write(&self) -> RwLockWriteGuard<'_, Vec<E>> {
        self.cells.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn len(&self) -> usize {
        self.read().len()
    }

    /// Return where the buffer's memory came from.
    #[must_use]
    pub fn origin(&self) -> Origin {
        self.origin
    }
}

/// Dynamically typed tensor storage.
#[derive(Clone, Debug)]
pub enum Storage {
    /// Boolean elements.
    Bool(Buffer<bool>),
    /// 32-bit signed integer elements.
    I32(Buffer<i32>),
    /// 32-bit floating point elements.
    F32(Buffer<f32>),
    /// 64-bit floating point elements.
    F64(Buffer<f64>),
}

impl Storage {
    pub(crate) fn dtype(&self) -> DType {
        match self {
            Self::Bool(_) => DType::Bool,
            Self::I32(_) => DType::I32,
            Self::F32(_) => DType::F32,
            Self::F64(_) => DType::F64,
        }
    }

    pub(crate) fn len(&self) -> usize {
        match self {
            Self::Bool(buffer) => buffer.len(),
            Self::I32(buffer) => buffer.len(),
            Self::F32(buffer) => buffer.len(),
            Self::F64(buffer) => buffer.len(),
        }
    }

    /// Return where the storage's memory came from.
    #[must_use]
    pub fn origin(&self) -> Origin {
        match self {
            Self::Bool(buffer) => buffer.origin(),
            Self::I32(buffer) => buffer.origin(),
            Self::F32(buffer) => buffer.origin(),
            Self::F64(buffer) => buffer.origin(),
        }
    }

    pub(crate) fn from_scalars<I>(dtype: DType, scalars: I) -> Self
    where
        I: Iterator<Item = Scalar>,
    {
        use crate::tensor::dtype::Elem;
        match dtype {
            DType::Bool => Self::Bool(Buffer::owned(scalars.map(bool::from_scalar).collect())),
            DType::I32 => Self::I32(Buffer::owned(scalars.map(i32::from_scalar).collect())),
            DType::F32 => Self::F32(Buffer::owned(scalars.map(f32::from_scalar).collect())),
            DType::F64 => Self::F64(Buffer::owned(scalars.map(f64::from_scalar).collect())),
        }
    }

    pub(crate) fn gather_scalars(&self, layout: &Layout) -> Vec<Scalar> {
        match self {
            Self::Bool(buffer) => map(buffer, layout, Scalar::Bool),
            Self::I32(buffer) => map(buffer, layout, Scalar::I32),
            Self::F32(buffer) => map(buffer, layout, Scalar::F32),
            Self::F64(buffer) => map(buffer, layout, Scalar::F64),
        }
    }
}

/// Collect the elements visited by `layout` in row-major order.
pub(crate) fn gather<E: Copy>(buffer: &Buffer<E>, layout: &Layout) -> Vec<E> {
    let cells = buffer.read();
    layout
        .iter()
        .map(|index| cells[layout.translate(&index)])
        .collect()
}

/// Write `values` to the positions visited by `layout` in row-major order.
pub(crate) fn scatter<E: Copy>(buffer: &Buffer<E>, layout: &Layout, values: &[E]) {
    let mut cells = buffer.write();
    for (index, value) in layout.iter().zip(values.iter()) {
        let position = layout.translate(&index);
        cells[position] = *value;
    }
}

/// Apply `op` to each element visited by `layout` in row-major order.
pub(crate) fn map<E, T, F>(buffer: &Buffer<E>, layout: &Layout, op: F) -> Vec<T>
where
    E: Copy,
    F: Fn(E) -> T,
{
    gather(buffer, layout).into_iter().map(op).collect()
}

/// Combine two equally shaped element sequences with `op`.
///
/// Both layouts must describe the same shape; each operand's buffer is read
/// under its own lock before the other is touched, so the operands may share
/// storage.
pub(crate) fn zip_map<E, T, F>(
    lhs: &Buffer<E>,
    lhs_layout: &Layout,
    rhs: &Buffer<E>,
    rhs_layout: &Layout,
    op: F,
) -> Vec<T>
where
    E: Copy,
    F: Fn(E, E) -> T,
{
    let xs = gather(lhs, lhs_layout);
    let ys = gather(rhs, rhs_layout);
    xs.into_iter().zip(ys).map(|(x, y)| op(x, y)).collect()
}

/// Fold the elements visited by `layout` into the reduced buffer described
/// by `reduced`, routing each input index through the `reducer` layout.
pub(crate) fn reduce<E, F>(
    buffer: &Buffer<E>,
    layout: &Layout,
    reduced: &Layout,
    reducer: &Layout,
    identity: E,
    op: F,
) -> Vec<E>
where
    E: Copy,
    F: Fn(E, E) -> E,
{
    let cells = buffer.read();
    let mut out = vec![identity; reduced.elems()];
    for index in layout.iter() {
        let dst = reducer.translate(&index);
        let src = layout.translate(&index);
        out[dst] = op(out[dst], cells[src]);
    }
    out
}
