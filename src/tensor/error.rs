//! Defines tensor errors.

use thiserror::Error;

use crate::tensor::{device::Device, dtype::DType};

/// An error type for all operations on tensors.
///
/// Every error is raised synchronously by the call that violates a contract;
/// nothing is retried internally. Operations that mutate storage validate
/// their arguments in full before writing, so a returned error implies no
/// element was touched.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum TensorError {
    /// An operation was performed on 2 objects with incompatible shapes.
    #[error("incompatible shapes {0:?} and {1:?}")]
    Shape(Vec<usize>, Vec<usize>),

    /// An operation was performed with a dimension that does not exist.
    #[error("dimension {dim} is out of range for rank {rank}")]
    Dimension {
        /// The offending dimension index.
        dim: usize,
        /// The rank of the tensor.
        rank: usize,
    },

    /// A value could not be broadcast into the region selected for assignment.
    #[error("cannot broadcast shape {src:?} into region of shape {dst:?}")]
    Broadcast {
        /// The shape of the assigned value.
        src: Vec<usize>,
        /// The shape of the selected region.
        dst: Vec<usize>,
    },

    /// An operation was performed on 2 tensors residing on different devices.
    #[error("mismatched devices {0:?} and {1:?}")]
    DeviceMismatch(Device, Device),

    /// The requested device is not usable in this process.
    #[error("device {0:?} is not available")]
    DeviceUnavailable(Device),

    /// An operation does not support the tensor's element type.
    #[error("{op} does not support dtype {dtype:?}")]
    Dtype {
        /// The name of the rejected operation.
        op: &'static str,
        /// The unsupported element type.
        dtype: DType,
    },

    /// An implicit conversion between element types is not allowed.
    #[error("cannot implicitly cast {from:?} to {to:?}")]
    Cast {
        /// The element type of the value being converted.
        from: DType,
        /// The element type required by the receiver.
        to: DType,
    },

    /// A value-level contract violation, such as an out-of-range index.
    #[error("{0}")]
    Value(String),
}
