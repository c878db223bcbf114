//! An N-dimensional array with dynamically typed elements.

use std::{cmp, iter, ops, sync::Arc};

use num::{traits::bounds::LowerBounded, Float, Zero};
use rand::Rng;
use rand_distr::Uniform;

pub mod device;
pub mod dtype;
pub mod error;
pub mod index;
pub mod layout;
pub mod storage;

pub use crate::tensor::device::Device;
pub use crate::tensor::dtype::{DType, Elem, Literal, Scalar};
pub use crate::tensor::error::TensorError;
pub use crate::tensor::index::Index;

use crate::buffer::HostBuffer;
use crate::tensor::layout::{broadcast_shape, Layout, Reshaped};
use crate::tensor::storage::{gather, map, reduce, scatter, zip_map, Buffer, Storage};

/// An N-dimensional array of dynamically typed elements.
///
/// A tensor is a shared storage buffer viewed through a [`Layout`]: slicing,
/// transposing, broadcasting, and stride-compatible reshaping derive a new
/// layout over the same storage without copying elements. Cloning a tensor
/// clones the handle, so a clone aliases the original; mutating through any
/// view is visible through every other view of the same storage.
///
/// Operations come in a pure form returning a fresh tensor, an in-place form
/// carrying a trailing underscore that writes into the receiver's storage,
/// and an `_out` form writing into a caller-supplied destination. The
/// `std::ops` operators delegate to the pure forms and panic where the named
/// methods would return an error.
#[derive(Clone, Debug)]
pub struct Tensor {
    storage: Storage,
    layout: Layout,
    device: Device,
}

impl ops::Add<Self> for &Tensor {
    type Output = Tensor;

    fn add(self, other: Self) -> Self::Output {
        Tensor::add(self, other).expect("tensors can be broadcast")
    }
}

impl ops::Sub<Self> for &Tensor {
    type Output = Tensor;

    fn sub(self, other: Self) -> Self::Output {
        Tensor::sub(self, other).expect("tensors can be broadcast")
    }
}

impl ops::Mul<Self> for &Tensor {
    type Output = Tensor;

    fn mul(self, other: Self) -> Self::Output {
        Tensor::mul(self, other).expect("tensors can be broadcast")
    }
}

impl ops::Div<Self> for &Tensor {
    type Output = Tensor;

    fn div(self, other: Self) -> Self::Output {
        Tensor::div(self, other).expect("tensors can be broadcast")
    }
}

impl ops::Neg for &Tensor {
    type Output = Tensor;

    fn neg(self) -> Self::Output {
        Tensor::neg(self).expect("tensor is numeric")
    }
}

impl ops::AddAssign<&Tensor> for Tensor {
    fn add_assign(&mut self, other: &Tensor) {
        self.add_(other).expect("tensors can be combined in place");
    }
}

impl ops::SubAssign<&Tensor> for Tensor {
    fn sub_assign(&mut self, other: &Tensor) {
        self.sub_(other).expect("tensors can be combined in place");
    }
}

impl ops::MulAssign<&Tensor> for Tensor {
    fn mul_assign(&mut self, other: &Tensor) {
        self.mul_(other).expect("tensors can be combined in place");
    }
}

impl ops::DivAssign<&Tensor> for Tensor {
    fn div_assign(&mut self, other: &Tensor) {
        self.div_(other).expect("tensors can be combined in place");
    }
}

#[derive(Clone, Copy, Debug)]
enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl ArithOp {
    fn name(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Sub => "sub",
            Self::Mul => "mul",
            Self::Div => "div",
        }
    }

    fn eval<E>(self, x: E, y: E) -> E
    where
        E: ops::Add<Output = E>
            + ops::Sub<Output = E>
            + ops::Mul<Output = E>
            + ops::Div<Output = E>,
    {
        match self {
            Self::Add => x + y,
            Self::Sub => x - y,
            Self::Mul => x * y,
            Self::Div => x / y,
        }
    }
}

impl Tensor {
    /// Create a tensor given its shape and data.
    ///
    /// The order of the elements in `data` is in increasing order of the last
    /// axis, then the second last, and so on. The dtype is taken from the
    /// element type.
    ///
    /// # Errors
    ///
    /// Returns an error if the number of elements does not match the shape.
    pub fn new<E: Elem>(shape: &[usize], data: &[E]) -> Result<Self, TensorError> {
        let layout = Layout::contiguous(shape);
        if layout.elems() != data.len() {
            return Err(TensorError::Value(format!(
                "new: expected {} elements for shape {:?}, got {}",
                layout.elems(),
                shape,
                data.len()
            )));
        }
        Ok(Self {
            storage: E::into_storage(Buffer::owned(data.to_vec())),
            layout,
            device: Device::Host,
        })
    }

    /// Create a scalar holding the given value.
    ///
    /// This is a special tensor that has no shape.
    pub fn scalar(value: impl Into<Scalar>) -> Self {
        let value = value.into();
        Self {
            storage: Storage::from_scalars(value.dtype(), iter::once(value)),
            layout: Layout::contiguous(&[]),
            device: Device::Host,
        }
    }

    /// Create a tensor from a nested sequence of values.
    ///
    /// The shape is inferred from the nesting structure and the dtype from
    /// the leaf values: integer leaves give an integer tensor, and any
    /// floating leaf promotes the whole tensor to a floating dtype.
    ///
    /// # Errors
    ///
    /// Returns an error if the rows of any level have unequal shapes.
    pub fn from_nested(literal: impl Into<Literal>) -> Result<Self, TensorError> {
        let literal = literal.into();
        let shape = literal.shape()?;
        let dtype = literal.dtype();
        let mut scalars = Vec::new();
        literal.flatten_into(&mut scalars);
        Ok(Self {
            storage: Storage::from_scalars(dtype, scalars.into_iter()),
            layout: Layout::contiguous(&shape),
            device: Device::Host,
        })
    }

    /// Create a tensor given its shape filled with a single value.
    pub fn full(shape: &[usize], value: impl Into<Scalar>) -> Self {
        let value = value.into();
        let layout = Layout::contiguous(shape);
        Self {
            storage: Storage::from_scalars(value.dtype(), iter::repeat(value).take(layout.elems())),
            layout,
            device: Device::Host,
        }
    }

    /// Create a tensor of the given shape and dtype filled with zeros.
    #[must_use]
    pub fn zeros(shape: &[usize], dtype: DType) -> Self {
        Self::full(shape, Scalar::Bool(false).cast(dtype))
    }

    /// Create a tensor of the given shape and dtype filled with ones.
    #[must_use]
    pub fn ones(shape: &[usize], dtype: DType) -> Self {
        Self::full(shape, Scalar::Bool(true).cast(dtype))
    }

    /// Create a tensor filled with uniform samples from `[0, 1)`.
    ///
    /// The engine owns no generator state: callers pass any [`Rng`], and
    /// reproducible tensors are obtained by seeding it, e.g. with
    /// `StdRng::seed_from_u64`.
    ///
    /// # Errors
    ///
    /// Returns an error if the dtype is not a float or the device is not
    /// available.
    pub fn rand<R>(
        shape: &[usize],
        dtype: DType,
        device: Device,
        rng: &mut R,
    ) -> Result<Self, TensorError>
    where
        R: Rng,
    {
        if !device.is_available() {
            return Err(TensorError::DeviceUnavailable(device));
        }
        let layout = Layout::contiguous(shape);
        let storage = match dtype {
            DType::F32 => {
                let dist = Uniform::new(0f32, 1f32);
                Storage::F32(Buffer::owned(
                    (0..layout.elems()).map(|_| rng.sample(dist)).collect(),
                ))
            }
            DType::F64 => {
                let dist = Uniform::new(0f64, 1f64);
                Storage::F64(Buffer::owned(
                    (0..layout.elems()).map(|_| rng.sample(dist)).collect(),
                ))
            }
            _ => return Err(TensorError::Dtype { op: "rand", dtype }),
        };
        Ok(Self {
            storage,
            layout,
            device,
        })
    }

    /// Create a zero-filled tensor with the receiver's shape and device.
    ///
    /// The dtype follows the receiver unless overridden.
    #[must_use]
    pub fn zeros_like(&self, dtype: Option<DType>) -> Self {
        let mut tensor = Self::zeros(self.shape(), dtype.unwrap_or_else(|| self.dtype()));
        tensor.device = self.device;
        tensor
    }

    /// Create a one-filled tensor with the receiver's shape and device.
    ///
    /// The dtype follows the receiver unless overridden.
    #[must_use]
    pub fn ones_like(&self, dtype: Option<DType>) -> Self {
        let mut tensor = Self::ones(self.shape(), dtype.unwrap_or_else(|| self.dtype()));
        tensor.device = self.device;
        tensor
    }

    /// Create a uniform random tensor with the receiver's shape and device.
    ///
    /// The dtype follows the receiver unless overridden.
    ///
    /// # Errors
    ///
    /// Returns an error if the dtype is not a float.
    pub fn rand_like<R>(&self, dtype: Option<DType>, rng: &mut R) -> Result<Self, TensorError>
    where
        R: Rng,
    {
        Self::rand(
            self.shape(),
            dtype.unwrap_or_else(|| self.dtype()),
            self.device,
            rng,
        )
    }

    /// Return the shape of the tensor.
    #[must_use]
    pub fn shape(&self) -> &[usize] {
        self.layout.shape()
    }

    /// Return the number of dimensions of the tensor.
    #[must_use]
    pub fn rank(&self) -> usize {
        self.layout.rank()
    }

    /// Return the number of elements in the tensor.
    #[must_use]
    pub fn numel(&self) -> usize {
        self.layout.elems()
    }

    /// Return the element type of the tensor.
    #[must_use]
    pub fn dtype(&self) -> DType {
        self.storage.dtype()
    }

    /// Return the device the tensor resides on.
    #[must_use]
    pub fn device(&self) -> Device {
        self.device
    }

    /// Return a view selected by one [`Index`] per dimension.
    ///
    /// The view shares the receiver's storage: no element is copied, and
    /// writes through the view are visible through the receiver.
    ///
    /// # Errors
    ///
    /// Returns an error if a selector is out of bounds or there are more
    /// selectors than dimensions.
    pub fn slice(&self, selectors: &[Index]) -> Result<Self, TensorError> {
        Ok(Self {
            storage: self.storage.clone(),
            layout: index::resolve(&self.layout, selectors)?,
            device: self.device,
        })
    }

    /// Write `value` into the tensor's storage in place.
    ///
    /// `value` is broadcast to the receiver's shape; its dtype must promote
    /// to the receiver's dtype. The receiver is typically a sliced view, in
    /// which case the write lands in the underlying shared storage. The
    /// arguments are validated in full before any element is written.
    ///
    /// # Errors
    ///
    /// Returns an error if `value` cannot be broadcast to the receiver's
    /// shape, its dtype does not promote to the receiver's, or the devices
    /// differ.
    pub fn assign(&mut self, value: &Tensor) -> Result<(), TensorError> {
        self.check_same_device(value)?;
        if self.dtype().promote(value.dtype()) != self.dtype() {
            return Err(TensorError::Cast {
                from: value.dtype(),
                to: self.dtype(),
            });
        }
        let value = value.astype(self.dtype());
        let value_layout =
            value
                .layout
                .broadcast_to(self.shape())
                .map_err(|_| TensorError::Broadcast {
                    src: value.shape().to_vec(),
                    dst: self.shape().to_vec(),
                })?;
        match (&self.storage, &value.storage) {
            (Storage::Bool(dst), Storage::Bool(src)) => {
                let values = gather(src, &value_layout);
                scatter(dst, &self.layout, &values);
            }
            (Storage::I32(dst), Storage::I32(src)) => {
                let values = gather(src, &value_layout);
                scatter(dst, &self.layout, &values);
            }
            (Storage::F32(dst), Storage::F32(src)) => {
                let values = gather(src, &value_layout);
                scatter(dst, &self.layout, &values);
            }
            (Storage::F64(dst), Storage::F64(src)) => {
                let values = gather(src, &value_layout);
                scatter(dst, &self.layout, &values);
            }
            _ => unreachable!("value is cast to the receiver's dtype"),
        }
        Ok(())
    }

    /// Write `value` into the region selected by `selectors`.
    ///
    /// Equivalent to slicing and assigning in one call.
    ///
    /// # Errors
    ///
    /// Returns an error if the selectors are invalid or `value` cannot be
    /// broadcast into the selected region.
    pub fn set(&mut self, selectors: &[Index], value: &Tensor) -> Result<(), TensorError> {
        let mut view = self.slice(selectors)?;
        view.assign(value)
    }

    /// Concatenate tensors along an existing dimension.
    ///
    /// All inputs must share rank, dtype, device, and every dimension size
    /// except `dim`. The result is a fresh allocation holding the inputs'
    /// elements in order; it never aliases any input.
    ///
    /// # Errors
    ///
    /// Returns an error if the inputs disagree on anything but their size
    /// along `dim`, or if no input is given.
    pub fn concat(parts: &[&Tensor], dim: usize) -> Result<Self, TensorError> {
        let Some(first) = parts.first() else {
            return Err(TensorError::Value(
                "concat: expected at least one tensor".into(),
            ));
        };
        let rank = first.rank();
        if dim >= rank {
            return Err(TensorError::Dimension { dim, rank });
        }
        let mut total = 0;
        for part in parts {
            if part.device != first.device {
                return Err(TensorError::DeviceMismatch(first.device, part.device));
            }
            if part.dtype() != first.dtype() {
                return Err(TensorError::Cast {
                    from: part.dtype(),
                    to: first.dtype(),
                });
            }
            let same_rank = part.rank() == rank;
            let same_sizes = same_rank
                && part
                    .shape()
                    .iter()
                    .zip(first.shape().iter())
                    .enumerate()
                    .all(|(d, (a, b))| d == dim || a == b);
            if !same_sizes {
                return Err(TensorError::Shape(
                    first.shape().to_vec(),
                    part.shape().to_vec(),
                ));
            }
            total += part.shape()[dim];
        }
        let mut shape = first.shape().to_vec();
        shape[dim] = total;
        let layout = Layout::contiguous(&shape);
        let zero = Scalar::Bool(false).cast(first.dtype());
        let mut out = Self {
            storage: Storage::from_scalars(
                first.dtype(),
                iter::repeat(zero).take(layout.elems()),
            ),
            layout,
            device: first.device,
        };
        let mut start = 0;
        for part in parts {
            let end = start + part.shape()[dim];
            let selectors: Vec<Index> = (0..rank)
                .map(|d| {
                    if d == dim {
                        Index::range(start as isize, end as isize)
                    } else {
                        Index::Full
                    }
                })
                .collect();
            out.set(&selectors, part)?;
            start = end;
        }
        Ok(out)
    }

    /// Return a view with singleton dimensions stretched to a larger shape.
    ///
    /// Stretched dimensions map every index to the same storage position;
    /// no element is copied.
    ///
    /// # Errors
    ///
    /// Returns an error if the tensor cannot be broadcast to the new shape.
    pub fn expand(&self, shape: &[usize]) -> Result<Self, TensorError> {
        Ok(Self {
            storage: self.storage.clone(),
            layout: self.layout.broadcast_to(shape)?,
            device: self.device,
        })
    }

    /// Removes all singleton dimensions from the tensor without copying.
    #[must_use]
    pub fn squeeze(&self) -> Self {
        Self {
            storage: self.storage.clone(),
            layout: self.layout.squeeze(),
            device: self.device,
        }
    }

    /// Permute the tensor axes according to the given permutation.
    ///
    /// The result is a view over the same storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the permutation does not name every dimension
    /// exactly once.
    pub fn permute(&self, permutation: &[usize]) -> Result<Self, TensorError> {
        Ok(Self {
            storage: self.storage.clone(),
            layout: self.layout.permute(permutation)?,
            device: self.device,
        })
    }

    /// Swaps 2 dimensions of the tensor without cloning its data.
    ///
    /// # Errors
    ///
    /// Returns an error if one of the dimensions is invalid.
    pub fn transpose(&self, dim0: usize, dim1: usize) -> Result<Self, TensorError> {
        Ok(Self {
            storage: self.storage.clone(),
            layout: self.layout.transpose(dim0, dim1)?,
            device: self.device,
        })
    }

    /// Swaps the trailing 2 dimensions of the tensor.
    ///
    /// Tensors below rank 2 are returned unchanged.
    #[must_use]
    pub fn t(&self) -> Self {
        if self.rank() < 2 {
            return self.clone();
        }
        let Ok(transposed) = self.transpose(self.rank() - 2, self.rank() - 1) else {
            unreachable!("the trailing dimensions exist");
        };
        transposed
    }

    /// Reshape the tensor, keeping the number of elements unchanged.
    ///
    /// Returns a view over the same storage when the tensor's elements
    /// already form a contiguous run; otherwise the elements are copied into
    /// fresh storage. Non-contiguity never makes this fail.
    ///
    /// # Errors
    ///
    /// Returns an error if the new shape holds a different number of
    /// elements.
    pub fn reshape(&self, shape: &[usize]) -> Result<Self, TensorError> {
        match self.layout.reshape(shape)? {
            Reshaped::View(layout) => Ok(Self {
                storage: self.storage.clone(),
                layout,
                device: self.device,
            }),
            Reshaped::Copy => Ok(Self {
                storage: self.compact(),
                layout: Layout::contiguous(shape),
                device: self.device,
            }),
        }
    }

    /// Return a tensor whose elements form a contiguous run covering its
    /// whole storage.
    ///
    /// Returns a storage-sharing handle if the receiver already does;
    /// otherwise copies the elements into fresh storage, ending any
    /// aliasing for the result.
    #[must_use]
    pub fn contiguous(&self) -> Self {
        if self.spans_storage() {
            return self.clone();
        }
        Self {
            storage: self.compact(),
            layout: Layout::contiguous(self.shape()),
            device: self.device,
        }
    }

    /// Convert the tensor to another dtype, producing a new tensor.
    ///
    /// Floats truncate towards zero when cast to integers, and numeric
    /// values cast to booleans by their non-zero-ness. Casting to the
    /// receiver's own dtype returns a storage-sharing handle.
    #[must_use]
    pub fn astype(&self, dtype: DType) -> Self {
        if dtype == self.dtype() {
            return self.clone();
        }
        let scalars = self.storage.gather_scalars(&self.layout);
        Self {
            storage: Storage::from_scalars(dtype, scalars.into_iter()),
            layout: Layout::contiguous(self.shape()),
            device: self.device,
        }
    }

    /// Collect all elements of the tensor into a [`Vec`].
    ///
    /// # Errors
    ///
    /// Returns an error if the element type does not match the dtype.
    pub fn ravel<E: Elem>(&self) -> Result<Vec<E>, TensorError> {
        let Some(buffer) = E::buffer(&self.storage) else {
            return Err(TensorError::Cast {
                from: self.dtype(),
                to: E::DTYPE,
            });
        };
        Ok(gather(buffer, &self.layout))
    }

    /// Convert a single-element tensor into a native scalar.
    ///
    /// # Errors
    ///
    /// Returns an error if the tensor does not hold exactly one element.
    pub fn item(&self) -> Result<Scalar, TensorError> {
        if self.numel() != 1 {
            return Err(TensorError::Value(format!(
                "item: expected exactly one element, found {}",
                self.numel()
            )));
        }
        let mut scalars = self.storage.gather_scalars(&self.layout);
        let Some(value) = scalars.pop() else {
            unreachable!("a single-element tensor yields one value");
        };
        Ok(value)
    }

    /// Add `other` to `self`, element-wise.
    ///
    /// The operands are broadcast to a common shape and promoted to a common
    /// dtype before adding.
    ///
    /// # Errors
    ///
    /// Returns an error if the shapes cannot be broadcast, the promoted
    /// dtype is not numeric, or the devices differ.
    pub fn add(&self, other: &Self) -> Result<Self, TensorError> {
        self.arith(other, ArithOp::Add)
    }

    /// Subtract `other` from `self`, element-wise.
    ///
    /// The operands are broadcast and promoted as in [`Tensor::add`].
    ///
    /// # Errors
    ///
    /// Returns an error under the same conditions as [`Tensor::add`].
    pub fn sub(&self, other: &Self) -> Result<Self, TensorError> {
        self.arith(other, ArithOp::Sub)
    }

    /// Multiply `self` by `other`, element-wise.
    ///
    /// The operands are broadcast and promoted as in [`Tensor::add`].
    ///
    /// # Errors
    ///
    /// Returns an error under the same conditions as [`Tensor::add`].
    pub fn mul(&self, other: &Self) -> Result<Self, TensorError> {
        self.arith(other, ArithOp::Mul)
    }

    /// Divide `self` by `other`, element-wise.
    ///
    /// The operands are broadcast and promoted as in [`Tensor::add`].
    ///
    /// # Errors
    ///
    /// Returns an error under the same conditions as [`Tensor::add`].
    pub fn div(&self, other: &Self) -> Result<Self, TensorError> {
        self.arith(other, ArithOp::Div)
    }

    /// Raise `self` to the power of `other`, element-wise.
    ///
    /// # Errors
    ///
    /// Returns an error if the promoted dtype is not a float, the shapes
    /// cannot be broadcast, or the devices differ.
    pub fn pow(&self, other: &Self) -> Result<Self, TensorError> {
        self.check_same_device(other)?;
        let dtype = self.arith_dtype(other, "pow")?;
        if !dtype.is_float() {
            return Err(TensorError::Dtype { op: "pow", dtype });
        }
        let lhs = self.astype(dtype);
        let rhs = other.astype(dtype);
        let shape = broadcast_shape(self.shape(), other.shape())?;
        let lhs_layout = lhs.layout.broadcast_to(&shape)?;
        let rhs_layout = rhs.layout.broadcast_to(&shape)?;
        let storage = match (&lhs.storage, &rhs.storage) {
            (Storage::F32(a), Storage::F32(b)) => Storage::F32(Buffer::owned(zip_map(
                a,
                &lhs_layout,
                b,
                &rhs_layout,
                Float::powf,
            ))),
            (Storage::F64(a), Storage::F64(b)) => Storage::F64(Buffer::owned(zip_map(
                a,
                &lhs_layout,
                b,
                &rhs_layout,
                Float::powf,
            ))),
            _ => unreachable!("operands share a float dtype after promotion"),
        };
        Ok(Self {
            storage,
            layout: Layout::contiguous(&shape),
            device: self.device,
        })
    }

    /// Compare `self` with `other`, element-wise, returning a boolean tensor
    /// marking the equal positions.
    ///
    /// The operands are broadcast to a common shape and promoted to a common
    /// dtype before comparing.
    ///
    /// # Errors
    ///
    /// Returns an error if the shapes cannot be broadcast or the devices
    /// differ.
    pub fn eq_elements(&self, other: &Self) -> Result<Self, TensorError> {
        self.check_same_device(other)?;
        let dtype = self.dtype().promote(other.dtype());
        let lhs = self.astype(dtype);
        let rhs = other.astype(dtype);
        let shape = broadcast_shape(self.shape(), other.shape())?;
        let lhs_layout = lhs.layout.broadcast_to(&shape)?;
        let rhs_layout = rhs.layout.broadcast_to(&shape)?;
        let cells = match (&lhs.storage, &rhs.storage) {
            (Storage::Bool(a), Storage::Bool(b)) => {
                zip_map(a, &lhs_layout, b, &rhs_layout, |x, y| x == y)
            }
            (Storage::I32(a), Storage::I32(b)) => {
                zip_map(a, &lhs_layout, b, &rhs_layout, |x, y| x == y)
            }
            (Storage::F32(a), Storage::F32(b)) => {
                zip_map(a, &lhs_layout, b, &rhs_layout, |x, y| x == y)
            }
            (Storage::F64(a), Storage::F64(b)) => {
                zip_map(a, &lhs_layout, b, &rhs_layout, |x, y| x == y)
            }
            _ => unreachable!("operands share a dtype after promotion"),
        };
        Ok(Self {
            storage: Storage::Bool(Buffer::owned(cells)),
            layout: Layout::contiguous(&shape),
            device: self.device,
        })
    }

    /// Apply negation to each element.
    ///
    /// # Errors
    ///
    /// Returns an error if the dtype is not numeric.
    pub fn neg(&self) -> Result<Self, TensorError> {
        let storage = match &self.storage {
            Storage::I32(b) => Storage::I32(Buffer::owned(map(b, &self.layout, |x| -x))),
            Storage::F32(b) => Storage::F32(Buffer::owned(map(b, &self.layout, |x| -x))),
            Storage::F64(b) => Storage::F64(Buffer::owned(map(b, &self.layout, |x| -x))),
            Storage::Bool(_) => {
                return Err(TensorError::Dtype {
                    op: "neg",
                    dtype: DType::Bool,
                })
            }
        };
        Ok(Self {
            storage,
            layout: Layout::contiguous(self.shape()),
            device: self.device,
        })
    }

    /// Apply exp to each element.
    ///
    /// # Errors
    ///
    /// Returns an error if the dtype is not a float.
    pub fn exp(&self) -> Result<Self, TensorError> {
        let storage = match &self.storage {
            Storage::F32(b) => Storage::F32(Buffer::owned(map(b, &self.layout, Float::exp))),
            Storage::F64(b) => Storage::F64(Buffer::owned(map(b, &self.layout, Float::exp))),
            _ => {
                return Err(TensorError::Dtype {
                    op: "exp",
                    dtype: self.dtype(),
                })
            }
        };
        Ok(Self {
            storage,
            layout: Layout::contiguous(self.shape()),
            device: self.device,
        })
    }

    /// Apply the natural logarithm to each element.
    ///
    /// # Errors
    ///
    /// Returns an error if the dtype is not a float.
    pub fn ln(&self) -> Result<Self, TensorError> {
        let storage = match &self.storage {
            Storage::F32(b) => Storage::F32(Buffer::owned(map(b, &self.layout, Float::ln))),
            Storage::F64(b) => Storage::F64(Buffer::owned(map(b, &self.layout, Float::ln))),
            _ => {
                return Err(TensorError::Dtype {
                    op: "ln",
                    dtype: self.dtype(),
                })
            }
        };
        Ok(Self {
            storage,
            layout: Layout::contiguous(self.shape()),
            device: self.device,
        })
    }

    /// Add `other` to `self` in place.
    ///
    /// The broadcast shape must equal the receiver's shape and the promoted
    /// dtype must equal the receiver's dtype: an in-place operation never
    /// resizes or re-types its receiver. The write lands in the receiver's
    /// existing storage, so every view sharing it observes the result.
    ///
    /// # Errors
    ///
    /// Returns an error before any element is written if the shape or dtype
    /// constraints are violated or the devices differ.
    pub fn add_(&mut self, other: &Self) -> Result<(), TensorError> {
        self.arith_assign(other, ArithOp::Add, "add_")
    }

    /// Subtract `other` from `self` in place.
    ///
    /// # Errors
    ///
    /// Returns an error under the same conditions as [`Tensor::add_`].
    pub fn sub_(&mut self, other: &Self) -> Result<(), TensorError> {
        self.arith_assign(other, ArithOp::Sub, "sub_")
    }

    /// Multiply `self` by `other` in place.
    ///
    /// # Errors
    ///
    /// Returns an error under the same conditions as [`Tensor::add_`].
    pub fn mul_(&mut self, other: &Self) -> Result<(), TensorError> {
        self.arith_assign(other, ArithOp::Mul, "mul_")
    }

    /// Divide `self` by `other` in place.
    ///
    /// # Errors
    ///
    /// Returns an error under the same conditions as [`Tensor::add_`].
    pub fn div_(&mut self, other: &Self) -> Result<(), TensorError> {
        self.arith_assign(other, ArithOp::Div, "div_")
    }

    /// Raise `self` to the power of `other` in place.
    ///
    /// # Errors
    ///
    /// Returns an error if the receiver is not a float tensor, or under the
    /// same shape and device conditions as [`Tensor::add_`].
    pub fn pow_(&mut self, other: &Self) -> Result<(), TensorError> {
        self.check_same_device(other)?;
        let dtype = self.arith_dtype(other, "pow_")?;
        if !dtype.is_float() {
            return Err(TensorError::Dtype { op: "pow_", dtype });
        }
        if dtype != self.dtype() {
            return Err(TensorError::Cast {
                from: other.dtype(),
                to: self.dtype(),
            });
        }
        let shape = broadcast_shape(self.shape(), other.shape())?;
        if shape.as_slice() != self.shape() {
            return Err(TensorError::Shape(
                self.shape().to_vec(),
                other.shape().to_vec(),
            ));
        }
        let rhs = other.astype(dtype);
        let rhs_layout = rhs.layout.broadcast_to(&shape)?;
        match (&self.storage, &rhs.storage) {
            (Storage::F32(dst), Storage::F32(src)) => {
                let values = zip_map(dst, &self.layout, src, &rhs_layout, Float::powf);
                scatter(dst, &self.layout, &values);
            }
            (Storage::F64(dst), Storage::F64(src)) => {
                let values = zip_map(dst, &self.layout, src, &rhs_layout, Float::powf);
                scatter(dst, &self.layout, &values);
            }
            _ => unreachable!("operands share a float dtype after promotion"),
        }
        Ok(())
    }

    /// Apply negation to each element in place.
    ///
    /// # Errors
    ///
    /// Returns an error if the dtype is not numeric.
    pub fn neg_(&mut self) -> Result<(), TensorError> {
        match &self.storage {
            Storage::I32(b) => {
                let values = map(b, &self.layout, |x| -x);
                scatter(b, &self.layout, &values);
            }
            Storage::F32(b) => {
                let values = map(b, &self.layout, |x| -x);
                scatter(b, &self.layout, &values);
            }
            Storage::F64(b) => {
                let values = map(b, &self.layout, |x| -x);
                scatter(b, &self.layout, &values);
            }
            Storage::Bool(_) => {
                return Err(TensorError::Dtype {
                    op: "neg_",
                    dtype: DType::Bool,
                })
            }
        }
        Ok(())
    }

    /// Apply exp to each element in place.
    ///
    /// # Errors
    ///
    /// Returns an error if the dtype is not a float.
    pub fn exp_(&mut self) -> Result<(), TensorError> {
        match &self.storage {
            Storage::F32(b) => {
                let values = map(b, &self.layout, Float::exp);
                scatter(b, &self.layout, &values);
            }
            Storage::F64(b) => {
                let values = map(b, &self.layout, Float::exp);
                scatter(b, &self.layout, &values);
            }
            _ => {
                return Err(TensorError::Dtype {
                    op: "exp_",
                    dtype: self.dtype(),
                })
            }
        }
        Ok(())
    }

    /// Apply the natural logarithm to each element in place.
    ///
    /// # Errors
    ///
    /// Returns an error if the dtype is not a float.
    pub fn ln_(&mut self) -> Result<(), TensorError> {
        match &self.storage {
            Storage::F32(b) => {
                let values = map(b, &self.layout, Float::ln);
                scatter(b, &self.layout, &values);
            }
            Storage::F64(b) => {
                let values = map(b, &self.layout, Float::ln);
                scatter(b, &self.layout, &values);
            }
            _ => {
                return Err(TensorError::Dtype {
                    op: "ln_",
                    dtype: self.dtype(),
                })
            }
        }
        Ok(())
    }

    /// Add `other` to `self`, writing the result into `out`.
    ///
    /// `out` must already have the result's exact shape, dtype, and device.
    ///
    /// # Errors
    ///
    /// Returns an error before any element is written if `out` does not
    /// match the result, the shapes cannot be broadcast, the promoted dtype
    /// is not numeric, or the devices differ.
    pub fn add_out(&self, other: &Self, out: &mut Tensor) -> Result<(), TensorError> {
        self.arith_out(other, out, ArithOp::Add, "add_out")
    }

    /// Subtract `other` from `self`, writing the result into `out`.
    ///
    /// # Errors
    ///
    /// Returns an error under the same conditions as [`Tensor::add_out`].
    pub fn sub_out(&self, other: &Self, out: &mut Tensor) -> Result<(), TensorError> {
        self.arith_out(other, out, ArithOp::Sub, "sub_out")
    }

    /// Multiply `self` by `other`, writing the result into `out`.
    ///
    /// # Errors
    ///
    /// Returns an error under the same conditions as [`Tensor::add_out`].
    pub fn mul_out(&self, other: &Self, out: &mut Tensor) -> Result<(), TensorError> {
        self.arith_out(other, out, ArithOp::Mul, "mul_out")
    }

    /// Divide `self` by `other`, writing the result into `out`.
    ///
    /// # Errors
    ///
    /// Returns an error under the same conditions as [`Tensor::add_out`].
    pub fn div_out(&self, other: &Self, out: &mut Tensor) -> Result<(), TensorError> {
        self.arith_out(other, out, ArithOp::Div, "div_out")
    }

    /// Matrix product of two arrays.
    ///
    /// The behavior depends on the arguments in the following ways:
    /// + If both arguments are 2-D they are multiplied like conventional
    ///   matrices, with leading dimensions broadcast as batch dimensions for
    ///   higher ranks.
    /// + If the first argument is 1-D, it is promoted to a matrix by
    ///   prepending a 1 to its axes. After matrix multiplication the
    ///   prepended 1 is removed.
    /// + If the second argument is 1-D, it is promoted to a matrix by
    ///   appending a 1 to its axes. After matrix multiplication the appended
    ///   1 is removed.
    ///
    /// # Errors
    ///
    /// Returns an error if either argument is a scalar, the inner dimensions
    /// do not match, the batch dimensions cannot be broadcast, the promoted
    /// dtype is not numeric, or the devices differ.
    pub fn matmul(&self, other: &Self) -> Result<Self, TensorError> {
        self.check_same_device(other)?;
        self.arith_dtype(other, "matmul")?;
        let mut lhs_shape = self.shape().to_vec();
        let mut rhs_shape = other.shape().to_vec();
        let orig_lhs_rank = lhs_shape.len();
        let orig_rhs_rank = rhs_shape.len();
        // Can't do matrix multiplication with scalars
        if orig_lhs_rank == 0 || orig_rhs_rank == 0 {
            return Err(TensorError::Shape(lhs_shape, rhs_shape));
        }
        // If the LHS shape is (k), make it (1, k)
        if orig_lhs_rank == 1 {
            lhs_shape.insert(0, 1);
        }
        // If the RHS shape is (k), make it (k, 1)
        if orig_rhs_rank == 1 {
            rhs_shape.push(1);
        }
        // The last axis of the LHS must match the second-to-last axis of the RHS
        if lhs_shape[lhs_shape.len() - 1] != rhs_shape[rhs_shape.len() - 2] {
            return Err(TensorError::Shape(
                self.shape().to_vec(),
                other.shape().to_vec(),
            ));
        }
        // Turn (..., m, k) into (..., m, 1, k)
        lhs_shape.insert(lhs_shape.len() - 1, 1);
        // Turn (..., k, n) into (..., 1, k, n)
        rhs_shape.insert(rhs_shape.len() - 2, 1);
        // Multiply (..., m, 1, k) with (..., 1, n, k) to get (..., m, n, k)
        let lhs = self.reshape(&lhs_shape)?;
        let rhs = other.reshape(&rhs_shape)?;
        let rhs = rhs.transpose(rhs_shape.len() - 1, rhs_shape.len() - 2)?;
        let product = lhs.mul(&rhs)?;
        // Sum the last axis to get (..., m, n)
        let summed = product.sum(Some(product.rank() - 1), false)?;
        // Remove the axes that were prepended or appended for 1-D operands
        let mut shape = summed.shape().to_vec();
        if orig_lhs_rank == 1 {
            shape.remove(shape.len() - 2);
        }
        if orig_rhs_rank == 1 {
            shape.remove(shape.len() - 1);
        }
        summed.reshape(&shape)
    }

    /// Reduce the tensor by summing its elements.
    ///
    /// With no dimension, every element folds into a rank-0 tensor. With a
    /// dimension, that dimension is reduced and removed, or kept with size 1
    /// under `keepdim`.
    ///
    /// # Errors
    ///
    /// Returns an error if the dtype is not numeric or the dimension does
    /// not exist.
    pub fn sum(&self, dim: Option<usize>, keepdim: bool) -> Result<Self, TensorError> {
        if !self.dtype().is_numeric() {
            return Err(TensorError::Dtype {
                op: "sum",
                dtype: self.dtype(),
            });
        }
        match dim {
            None => {
                let total = match &self.storage {
                    Storage::I32(b) => Scalar::I32(
                        gather(b, &self.layout)
                            .into_iter()
                            .fold(Zero::zero(), |acc, x| acc + x),
                    ),
                    Storage::F32(b) => Scalar::F32(
                        gather(b, &self.layout)
                            .into_iter()
                            .fold(Zero::zero(), |acc, x| acc + x),
                    ),
                    Storage::F64(b) => Scalar::F64(
                        gather(b, &self.layout)
                            .into_iter()
                            .fold(Zero::zero(), |acc, x| acc + x),
                    ),
                    Storage::Bool(_) => unreachable!("sum rejects boolean tensors"),
                };
                Ok(Self {
                    storage: Storage::from_scalars(total.dtype(), iter::once(total)),
                    layout: Layout::contiguous(&[]),
                    device: self.device,
                })
            }
            Some(dim) => {
                if dim >= self.rank() {
                    return Err(TensorError::Dimension {
                        dim,
                        rank: self.rank(),
                    });
                }
                let (reduced, reducer) = self.layout.reduce(dim);
                let storage = match &self.storage {
                    Storage::I32(b) => Storage::I32(Buffer::owned(reduce(
                        b,
                        &self.layout,
                        &reduced,
                        &reducer,
                        Zero::zero(),
                        |x, y| x + y,
                    ))),
                    Storage::F32(b) => Storage::F32(Buffer::owned(reduce(
                        b,
                        &self.layout,
                        &reduced,
                        &reducer,
                        Zero::zero(),
                        |x, y| x + y,
                    ))),
                    Storage::F64(b) => Storage::F64(Buffer::owned(reduce(
                        b,
                        &self.layout,
                        &reduced,
                        &reducer,
                        Zero::zero(),
                        |x, y| x + y,
                    ))),
                    Storage::Bool(_) => unreachable!("sum rejects boolean tensors"),
                };
                Ok(Self {
                    storage,
                    layout: self.reduced_layout(reduced, dim, keepdim),
                    device: self.device,
                })
            }
        }
    }

    /// Reduce the tensor by taking the maximum of its elements.
    ///
    /// The dimension handling matches [`Tensor::sum`].
    ///
    /// # Errors
    ///
    /// Returns an error if the dtype is not numeric or the dimension does
    /// not exist.
    pub fn max(&self, dim: Option<usize>, keepdim: bool) -> Result<Self, TensorError> {
        if !self.dtype().is_numeric() {
            return Err(TensorError::Dtype {
                op: "max",
                dtype: self.dtype(),
            });
        }
        fn pick<E: PartialOrd>(x: E, y: E) -> E {
            match x.partial_cmp(&y) {
                Some(cmp::Ordering::Less) => y,
                _ => x,
            }
        }
        match dim {
            None => {
                let total = match &self.storage {
                    Storage::I32(b) => Scalar::I32(
                        gather(b, &self.layout)
                            .into_iter()
                            .fold(LowerBounded::min_value(), pick),
                    ),
                    Storage::F32(b) => Scalar::F32(
                        gather(b, &self.layout)
                            .into_iter()
                            .fold(LowerBounded::min_value(), pick),
                    ),
                    Storage::F64(b) => Scalar::F64(
                        gather(b, &self.layout)
                            .into_iter()
                            .fold(LowerBounded::min_value(), pick),
                    ),
                    Storage::Bool(_) => unreachable!("max rejects boolean tensors"),
                };
                Ok(Self {
                    storage: Storage::from_scalars(total.dtype(), iter::once(total)),
                    layout: Layout::contiguous(&[]),
                    device: self.device,
                })
            }
            Some(dim) => {
                if dim >= self.rank() {
                    return Err(TensorError::Dimension {
                        dim,
                        rank: self.rank(),
                    });
                }
                let (reduced, reducer) = self.layout.reduce(dim);
                let storage = match &self.storage {
                    Storage::I32(b) => Storage::I32(Buffer::owned(reduce(
                        b,
                        &self.layout,
                        &reduced,
                        &reducer,
                        LowerBounded::min_value(),
                        pick,
                    ))),
                    Storage::F32(b) => Storage::F32(Buffer::owned(reduce(
                        b,
                        &self.layout,
                        &reduced,
                        &reducer,
                        LowerBounded::min_value(),
                        pick,
                    ))),
                    Storage::F64(b) => Storage::F64(Buffer::owned(reduce(
                        b,
                        &self.layout,
                        &reduced,
                        &reducer,
                        LowerBounded::min_value(),
                        pick,
                    ))),
                    Storage::Bool(_) => unreachable!("max rejects boolean tensors"),
                };
                Ok(Self {
                    storage,
                    layout: self.reduced_layout(reduced, dim, keepdim),
                    device: self.device,
                })
            }
        }
    }

    /// Wrap an external buffer's memory without copying.
    ///
    /// The returned 1-D tensor aliases the buffer: writes through either
    /// side are visible through the other until one of them reallocates.
    #[must_use]
    pub fn from_buffer<E: Elem>(buffer: &HostBuffer<E>) -> Self {
        let len = buffer.len();
        Self {
            storage: E::into_storage(Buffer::external(buffer.share())),
            layout: Layout::contiguous(&[len]),
            device: Device::Host,
        }
    }

    /// Hand the tensor's storage out as an external buffer without copying.
    ///
    /// The returned buffer aliases the tensor's storage, symmetric to
    /// [`Tensor::from_buffer`].
    ///
    /// # Errors
    ///
    /// Returns an error if the tensor is not host-resident, the element
    /// type does not match the dtype, or the tensor does not view its whole
    /// storage contiguously (exporting such a view would require a copy;
    /// call [`Tensor::contiguous`] first).
    pub fn to_buffer<E: Elem>(&self) -> Result<HostBuffer<E>, TensorError> {
        if self.device != Device::Host {
            return Err(TensorError::DeviceMismatch(self.device, Device::Host));
        }
        let Some(buffer) = E::buffer(&self.storage) else {
            return Err(TensorError::Cast {
                from: self.dtype(),
                to: E::DTYPE,
            });
        };
        if !self.spans_storage() {
            return Err(TensorError::Value(
                "to_buffer: tensor does not view its whole storage contiguously; \
                 call `contiguous` first"
                    .into(),
            ));
        }
        Ok(HostBuffer::from_shared(Arc::clone(buffer.cells())))
    }

    /// Move the tensor to the given device.
    ///
    /// Transferring to the tensor's current device returns a
    /// storage-sharing handle without copying. Transferring to another
    /// device copies every element into fresh storage there, ending any
    /// aliasing for the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the target device is not available.
    pub fn to(&self, device: Device) -> Result<Self, TensorError> {
        if device == self.device {
            return Ok(self.clone());
        }
        if !device.is_available() {
            return Err(TensorError::DeviceUnavailable(device));
        }
        Ok(Self {
            storage: self.compact(),
            layout: Layout::contiguous(self.shape()),
            device,
        })
    }

    fn arith(&self, other: &Self, op: ArithOp) -> Result<Self, TensorError> {
        self.check_same_device(other)?;
        let dtype = self.arith_dtype(other, op.name())?;
        let lhs = self.astype(dtype);
        let rhs = other.astype(dtype);
        let shape = broadcast_shape(self.shape(), other.shape())?;
        let lhs_layout = lhs.layout.broadcast_to(&shape)?;
        let rhs_layout = rhs.layout.broadcast_to(&shape)?;
        let storage = match (&lhs.storage, &rhs.storage) {
            (Storage::I32(a), Storage::I32(b)) => Storage::I32(Buffer::owned(zip_map(
                a,
                &lhs_layout,
                b,
                &rhs_layout,
                |x, y| op.eval(x, y),
            ))),
            (Storage::F32(a), Storage::F32(b)) => Storage::F32(Buffer::owned(zip_map(
                a,
                &lhs_layout,
                b,
                &rhs_layout,
                |x, y| op.eval(x, y),
            ))),
            (Storage::F64(a), Storage::F64(b)) => Storage::F64(Buffer::owned(zip_map(
                a,
                &lhs_layout,
                b,
                &rhs_layout,
                |x, y| op.eval(x, y),
            ))),
            _ => unreachable!("operands share a numeric dtype after promotion"),
        };
        Ok(Self {
            storage,
            layout: Layout::contiguous(&shape),
            device: self.device,
        })
    }

    fn arith_assign(
        &mut self,
        other: &Self,
        op: ArithOp,
        name: &'static str,
    ) -> Result<(), TensorError> {
        self.check_same_device(other)?;
        let dtype = self.arith_dtype(other, name)?;
        if dtype != self.dtype() {
            return Err(TensorError::Cast {
                from: other.dtype(),
                to: self.dtype(),
            });
        }
        let shape = broadcast_shape(self.shape(), other.shape())?;
        if shape.as_slice() != self.shape() {
            return Err(TensorError::Shape(
                self.shape().to_vec(),
                other.shape().to_vec(),
            ));
        }
        let rhs = other.astype(dtype);
        let rhs_layout = rhs.layout.broadcast_to(&shape)?;
        match (&self.storage, &rhs.storage) {
            (Storage::I32(dst), Storage::I32(src)) => {
                let values = zip_map(dst, &self.layout, src, &rhs_layout, |x, y| op.eval(x, y));
                scatter(dst, &self.layout, &values);
            }
            (Storage::F32(dst), Storage::F32(src)) => {
                let values = zip_map(dst, &self.layout, src, &rhs_layout, |x, y| op.eval(x, y));
                scatter(dst, &self.layout, &values);
            }
            (Storage::F64(dst), Storage::F64(src)) => {
                let values = zip_map(dst, &self.layout, src, &rhs_layout, |x, y| op.eval(x, y));
                scatter(dst, &self.layout, &values);
            }
            _ => unreachable!("operands share a numeric dtype after promotion"),
        }
        Ok(())
    }

    fn arith_out(
        &self,
        other: &Self,
        out: &mut Tensor,
        op: ArithOp,
        name: &'static str,
    ) -> Result<(), TensorError> {
        self.check_same_device(other)?;
        self.check_same_device(out)?;
        let dtype = self.arith_dtype(other, name)?;
        if out.dtype() != dtype {
            return Err(TensorError::Cast {
                from: dtype,
                to: out.dtype(),
            });
        }
        let shape = broadcast_shape(self.shape(), other.shape())?;
        if out.shape() != shape.as_slice() {
            return Err(TensorError::Shape(shape, out.shape().to_vec()));
        }
        let lhs = self.astype(dtype);
        let rhs = other.astype(dtype);
        let lhs_layout = lhs.layout.broadcast_to(&shape)?;
        let rhs_layout = rhs.layout.broadcast_to(&shape)?;
        match (&lhs.storage, &rhs.storage, &out.storage) {
            (Storage::I32(a), Storage::I32(b), Storage::I32(dst)) => {
                let values = zip_map(a, &lhs_layout, b, &rhs_layout, |x, y| op.eval(x, y));
                scatter(dst, &out.layout, &values);
            }
            (Storage::F32(a), Storage::F32(b), Storage::F32(dst)) => {
                let values = zip_map(a, &lhs_layout, b, &rhs_layout, |x, y| op.eval(x, y));
                scatter(dst, &out.layout, &values);
            }
            (Storage::F64(a), Storage::F64(b), Storage::F64(dst)) => {
                let values = zip_map(a, &lhs_layout, b, &rhs_layout, |x, y| op.eval(x, y));
                scatter(dst, &out.layout, &values);
            }
            _ => unreachable!("operands and destination share a numeric dtype"),
        }
        Ok(())
    }

    fn reduced_layout(&self, reduced: Layout, dim: usize, keepdim: bool) -> Layout {
        if keepdim {
            reduced
        } else {
            let mut shape = self.shape().to_vec();
            shape.remove(dim);
            Layout::contiguous(&shape)
        }
    }

    fn compact(&self) -> Storage {
        match &self.storage {
            Storage::Bool(b) => Storage::Bool(Buffer::owned(gather(b, &self.layout))),
            Storage::I32(b) => Storage::I32(Buffer::owned(gather(b, &self.layout))),
            Storage::F32(b) => Storage::F32(Buffer::owned(gather(b, &self.layout))),
            Storage::F64(b) => Storage::F64(Buffer::owned(gather(b, &self.layout))),
        }
    }

    fn spans_storage(&self) -> bool {
        self.layout.offset() == 0
            && self.layout.is_contiguous()
            && self.layout.elems() == self.storage.len()
    }

    fn check_same_device(&self, other: &Self) -> Result<(), TensorError> {
        if self.device == other.device {
            Ok(())
        } else {
            Err(TensorError::DeviceMismatch(self.device, other.device))
        }
    }

    fn arith_dtype(&self, other: &Self, op: &'static str) -> Result<DType, TensorError> {
        let dtype = self.dtype().promote(other.dtype());
        if dtype.is_numeric() {
            Ok(dtype)
        } else {
            Err(TensorError::Dtype { op, dtype })
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::nested;
    use crate::tensor::{DType, Scalar, Tensor};

    #[test]
    fn scalar_tensor() {
        let t = Tensor::scalar(2.5f32);
        assert_eq!(t.shape(), &[] as &[usize]);
        assert_eq!(t.numel(), 1);
        assert_eq!(t.item().unwrap(), Scalar::F32(2.5));
    }

    #[test]
    fn item_requires_a_single_element() {
        let t = Tensor::ones(&[2, 2], DType::F32);
        assert!(t.item().is_err());
        let one = t.slice(&[0.into(), 0.into()]).unwrap();
        assert_eq!(one.item().unwrap(), Scalar::F32(1.0));
    }

    #[test]
    fn nested_construction() {
        let t = Tensor::from_nested(nested!([[1, 2, 3], [4, 5, 6]])).unwrap();
        assert_eq!(t.shape(), &[2, 3]);
        assert_eq!(t.dtype(), DType::I32);
        assert_eq!(t.ravel::<i32>().unwrap(), vec![1, 2, 3, 4, 5, 6]);

        let t = Tensor::from_nested(nested!([[1.0f32, 2.0f32], [3.0f32, 4.0f32]])).unwrap();
        assert_eq!(t.dtype(), DType::F32);
    }

    #[test]
    fn astype_casts() {
        let t = Tensor::new(&[3], &[1.9f32, -0.4, 3.0]).unwrap();
        let ints = t.astype(DType::I32);
        assert_eq!(ints.ravel::<i32>().unwrap(), vec![1, 0, 3]);
        let bools = t.astype(DType::Bool);
        assert_eq!(bools.ravel::<bool>().unwrap(), vec![true, true, true]);
    }

    #[test]
    fn operator_sugar() {
        let t = Tensor::new(&[2], &[1.0f32, 2.0]).unwrap();
        let r = &(&t + &t) * &t;
        assert_eq!(r.ravel::<f32>().unwrap(), vec![2.0, 8.0]);
        let r = -&t;
        assert_eq!(r.ravel::<f32>().unwrap(), vec![-1.0, -2.0]);
        let mut acc = t.clone();
        acc += &t;
        assert_eq!(acc.ravel::<f32>().unwrap(), vec![2.0, 4.0]);
    }
}
