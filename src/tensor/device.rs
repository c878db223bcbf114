//! Device placement tags and the process-wide capability set.

use std::sync::OnceLock;

/// The memory placement of a tensor.
///
/// Binary operations require both operands on the same device; moving data
/// between devices is an explicit, copying transfer. The accelerator is a
/// placement tag with full transfer semantics; its storage is host-backed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Device {
    /// Host memory, always available.
    Host,
    /// Accelerator memory, available only after [`enable_accelerator`].
    Accelerator,
}

static ACCELERATOR: OnceLock<bool> = OnceLock::new();

/// Mark the accelerator as usable for the rest of the process.
///
/// The capability set is immutable after initialization: the first of
/// `enable_accelerator` or an availability query pins it for the process
/// lifetime, and later calls have no effect. Tensor operations query the set
/// but never mutate it.
pub fn enable_accelerator() {
    let _ = ACCELERATOR.set(true);
}

impl Device {
    /// Return whether tensors can be placed on the device in this process.
    #[must_use]
    pub fn is_available(self) -> bool {
        match self {
            Self::Host => true,
            Self::Accelerator => *ACCELERATOR.get_or_init(|| false),
        }
    }
}
