//! Element types, dynamic scalar values, and the dtype promotion table.

use std::fmt;

use crate::tensor::storage::{Buffer, Storage};

/// The element type of a tensor.
///
/// Dtypes form a small closed set; an arithmetic operation on mixed operands
/// promotes both sides through [`DType::promote`] before dispatching, and a
/// tensor's dtype changes only through an explicit cast producing a new
/// tensor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DType {
    /// Boolean elements.
    Bool,
    /// 32-bit signed integer elements.
    I32,
    /// 32-bit floating point elements.
    F32,
    /// 64-bit floating point elements.
    F64,
}

impl DType {
    /// Return whether the dtype is a floating point type.
    #[must_use]
    pub fn is_float(self) -> bool {
        matches!(self, Self::F32 | Self::F64)
    }

    /// Return whether the dtype supports arithmetic.
    #[must_use]
    pub fn is_numeric(self) -> bool {
        !matches!(self, Self::Bool)
    }

    /// Return the common dtype that both operands widen to.
    ///
    /// Booleans promote to the other operand, integers promote to floats, and
    /// mixed-width floats promote to the wider float.
    #[must_use]
    pub fn promote(self, other: Self) -> Self {
        match (self, other) {
            (lhs, rhs) if lhs == rhs => lhs,
            (Self::Bool, other) | (other, Self::Bool) => other,
            (Self::I32, other) | (other, Self::I32) => other,
            _ => Self::F64,
        }
    }
}

/// A single dynamically typed element value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Scalar {
    /// A boolean value.
    Bool(bool),
    /// A 32-bit signed integer value.
    I32(i32),
    /// A 32-bit floating point value.
    F32(f32),
    /// A 64-bit floating point value.
    F64(f64),
}

impl Scalar {
    /// Return the dtype of the value.
    #[must_use]
    pub fn dtype(self) -> DType {
        match self {
            Self::Bool(_) => DType::Bool,
            Self::I32(_) => DType::I32,
            Self::F32(_) => DType::F32,
            Self::F64(_) => DType::F64,
        }
    }

    /// Convert the value to another dtype.
    ///
    /// Floats truncate towards zero when converted to integers, and numeric
    /// values convert to booleans by their non-zero-ness.
    #[must_use]
    pub fn cast(self, dtype: DType) -> Self {
        match dtype {
            DType::Bool => Self::Bool(match self {
                Self::Bool(x) => x,
                Self::I32(x) => x != 0,
                Self::F32(x) => x != 0.0,
                Self::F64(x) => x != 0.0,
            }),
            DType::I32 => Self::I32(match self {
                Self::Bool(x) => i32::from(x),
                Self::I32(x) => x,
                Self::F32(x) => x as i32,
                Self::F64(x) => x as i32,
            }),
            DType::F32 => Self::F32(match self {
                Self::Bool(x) => f32::from(u8::from(x)),
                Self::I32(x) => x as f32,
                Self::F32(x) => x,
                Self::F64(x) => x as f32,
            }),
            DType::F64 => Self::F64(match self {
                Self::Bool(x) => f64::from(u8::from(x)),
                Self::I32(x) => f64::from(x),
                Self::F32(x) => f64::from(x),
                Self::F64(x) => x,
            }),
        }
    }

    /// Return the value as a 64-bit float, mapping booleans to 0 and 1.
    #[must_use]
    pub fn to_f64(self) -> f64 {
        match self.cast(DType::F64) {
            Self::F64(x) => x,
            _ => unreachable!("cast to F64 yields an F64 scalar"),
        }
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i32> for Scalar {
    fn from(value: i32) -> Self {
        Self::I32(value)
    }
}

impl From<f32> for Scalar {
    fn from(value: f32) -> Self {
        Self::F32(value)
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Self::F64(value)
    }
}

/// Types that can be used as elements in a tensor.
pub trait Elem: 'static + Copy + fmt::Debug + PartialEq {
    /// The dtype tag corresponding to the type.
    const DTYPE: DType;

    /// Wrap the value in a [`Scalar`].
    fn to_scalar(self) -> Scalar;

    /// Convert a [`Scalar`] of any dtype to the type.
    fn from_scalar(scalar: Scalar) -> Self;

    #[doc(hidden)]
    fn into_storage(buffer: Buffer<Self>) -> Storage;

    #[doc(hidden)]
    fn buffer(storage: &Storage) -> Option<&Buffer<Self>>;
}

impl Elem for bool {
    const DTYPE: DType = DType::Bool;

    fn to_scalar(self) -> Scalar {
        Scalar::Bool(self)
    }

    fn from_scalar(scalar: Scalar) -> Self {
        match scalar.cast(Self::DTYPE) {
            Scalar::Bool(x) => x,
            _ => unreachable!("cast yields the requested dtype"),
        }
    }

    fn into_storage(buffer: Buffer<Self>) -> Storage {
        Storage::Bool(buffer)
    }

    fn buffer(storage: &Storage) -> Option<&Buffer<Self>> {
        match storage {
            Storage::Bool(buffer) => Some(buffer),
            _ => None,
        }
    }
}

impl Elem for i32 {
    const DTYPE: DType = DType::I32;

    fn to_scalar(self) -> Scalar {
        Scalar::I32(self)
    }

    fn from_scalar(scalar: Scalar) -> Self {
        match scalar.cast(Self::DTYPE) {
            Scalar::I32(x) => x,
            _ => unreachable!("cast yields the requested dtype"),
        }
    }

    fn into_storage(buffer: Buffer<Self>) -> Storage {
        Storage::I32(buffer)
    }

    fn buffer(storage: &Storage) -> Option<&Buffer<Self>> {
        match storage {
            Storage::I32(buffer) => Some(buffer),
            _ => None,
        }
    }
}

impl Elem for f32 {
    const DTYPE: DType = DType::F32;

    fn to_scalar(self) -> Scalar {
        Scalar::F32(self)
    }

    fn from_scalar(scalar: Scalar) -> Self {
        match scalar.cast(Self::DTYPE) {
            Scalar::F32(x) => x,
            _ => unreachable!("cast yields the requested dtype"),
        }
    }

    fn into_storage(buffer: Buffer<Self>) -> Storage {
        Storage::F32(buffer)
    }

    fn buffer(storage: &Storage) -> Option<&Buffer<Self>> {
        match storage {
            Storage::F32(buffer) => Some(buffer),
            _ => None,
        }
    }
}

impl Elem for f64 {
    const DTYPE: DType = DType::F64;

    fn to_scalar(self) -> Scalar {
        Scalar::F64(self)
    }

    fn from_scalar(scalar: Scalar) -> Self {
        match scalar.cast(Self::DTYPE) {
            Scalar::F64(x) => x,
            _ => unreachable!("cast yields the requested dtype"),
        }
    }

    fn into_storage(buffer: Buffer<Self>) -> Storage {
        Storage::F64(buffer)
    }

    fn buffer(storage: &Storage) -> Option<&Buffer<Self>> {
        match storage {
            Storage::F64(buffer) => Some(buffer),
            _ => None,
        }
    }
}

/// A nested sequence of values used to build a tensor.
///
/// The shape is inferred from the nesting structure and the dtype from the
/// leaf values, folding mixed leaves through the promotion table. The
/// [`nested!`](crate::nested) macro builds literals from bracketed syntax.
#[derive(Clone, Debug)]
pub enum Literal {
    /// A leaf value.
    Scalar(Scalar),
    /// A sequence of equally shaped sub-literals.
    List(Vec<Literal>),
}

impl From<bool> for Literal {
    fn from(value: bool) -> Self {
        Self::Scalar(Scalar::Bool(value))
    }
}

impl From<i32> for Literal {
    fn from(value: i32) -> Self {
        Self::Scalar(Scalar::I32(value))
    }
}

impl From<f32> for Literal {
    fn from(value: f32) -> Self {
        Self::Scalar(Scalar::F32(value))
    }
}

impl From<f64> for Literal {
    fn from(value: f64) -> Self {
        Self::Scalar(Scalar::F64(value))
    }
}

impl From<Scalar> for Literal {
    fn from(value: Scalar) -> Self {
        Self::Scalar(value)
    }
}

impl From<Vec<Literal>> for Literal {
    fn from(items: Vec<Literal>) -> Self {
        Self::List(items)
    }
}

impl Literal {
    pub(crate) fn shape(&self) -> Result<Vec<usize>, crate::tensor::error::TensorError> {
        match self {
            Self::Scalar(_) => Ok(Vec::new()),
            Self::List(items) => {
                let mut inner = None;
                for item in items {
                    let shape = item.shape()?;
                    match &inner {
                        None => inner = Some(shape),
                        Some(first) if *first == shape => {}
                        Some(first) => {
                            return Err(crate::tensor::error::TensorError::Shape(
                                first.clone(),
                                shape,
                            ))
                        }
                    }
                }
                let mut shape = vec![items.len()];
                shape.extend(inner.unwrap_or_default());
                Ok(shape)
            }
        }
    }

    pub(crate) fn dtype(&self) -> DType {
        match self {
            Self::Scalar(scalar) => scalar.dtype(),
            Self::List(items) => items
                .iter()
                .map(Self::dtype)
                .reduce(DType::promote)
                .unwrap_or(DType::F32),
        }
    }

    pub(crate) fn flatten_into(&self, out: &mut Vec<Scalar>) {
        match self {
            Self::Scalar(scalar) => out.push(*scalar),
            Self::List(items) => {
                for item in items {
                    item.flatten_into(out);
                }
            }
        }
    }
}

/// Build a [`Literal`] from bracketed nested values.
///
/// Supports up to three nesting levels; leaves may mix element types, and
/// the dtype is inferred when the literal is turned into a tensor.
///
/// ```
/// use lattice::nested;
/// use lattice::tensor::Tensor;
///
/// let t = Tensor::from_nested(nested!([[1, 2], [3, 4]])).unwrap();
/// assert_eq!(t.shape(), &[2, 2]);
/// ```
#[macro_export]
macro_rules! nested {
    ([$([$([$($x:expr),* $(,)?]),* $(,)?]),* $(,)?]) => {
        $crate::tensor::Literal::List(::std::vec![$(
            $crate::tensor::Literal::List(::std::vec![$(
                $crate::tensor::Literal::List(::std::vec![$(
                    $crate::tensor::Literal::from($x)
                ),*])
            ),*])
        ),*])
    };
    ([$([$($x:expr),* $(,)?]),* $(,)?]) => {
        $crate::tensor::Literal::List(::std::vec![$(
            $crate::tensor::Literal::List(::std::vec![$(
                $crate::tensor::Literal::from($x)
            ),*])
        ),*])
    };
    ([$($x:expr),* $(,)?]) => {
        $crate::tensor::Literal::List(::std::vec![$(
            $crate::tensor::Literal::from($x)
        ),*])
    };
    ($value:expr) => {
        $crate::tensor::Literal::from($value)
    };
}
