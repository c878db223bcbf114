//! Per-dimension selectors for slicing tensors into views.

use std::ops;

use crate::tensor::{error::TensorError, layout::Layout};

/// A selector for a single dimension of a tensor.
///
/// A selector list is applied dimension by dimension; unnamed trailing
/// dimensions are kept whole, as if filled with [`Index::Full`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Index {
    /// Select one position and drop the dimension. Negative values count
    /// from the end, `-1` being the last position.
    At(isize),
    /// Select a stepped range and keep the dimension. Missing bounds default
    /// to the ends, negative bounds count from the end, and out-of-range
    /// bounds are clamped.
    Range {
        /// The first selected position.
        start: Option<isize>,
        /// The position one past the last selected.
        end: Option<isize>,
        /// The distance between selected positions; must be non-zero.
        step: usize,
    },
    /// Keep the whole dimension.
    Full,
    /// Keep every dimension not named by the other selectors.
    Ellipsis,
}

impl Index {
    /// Select `start..end` with a step of 1.
    #[must_use]
    pub fn range(start: isize, end: isize) -> Self {
        Self::Range {
            start: Some(start),
            end: Some(end),
            step: 1,
        }
    }

    /// Select `start..end`, keeping every `step`-th position.
    #[must_use]
    pub fn stepped(start: isize, end: isize, step: usize) -> Self {
        Self::Range {
            start: Some(start),
            end: Some(end),
            step,
        }
    }
}

impl From<isize> for Index {
    fn from(position: isize) -> Self {
        Self::At(position)
    }
}

impl From<i32> for Index {
    fn from(position: i32) -> Self {
        Self::At(position as isize)
    }
}

impl From<ops::Range<isize>> for Index {
    fn from(range: ops::Range<isize>) -> Self {
        Self::range(range.start, range.end)
    }
}

impl From<ops::RangeFull> for Index {
    fn from(_: ops::RangeFull) -> Self {
        Self::Full
    }
}

fn clamp_bound(bound: isize, size: usize) -> usize {
    let size = size as isize;
    let bound = if bound < 0 { bound + size } else { bound };
    bound.clamp(0, size) as usize
}

/// Resolve a selector list against a layout, producing the view's layout.
pub(crate) fn resolve(layout: &Layout, selectors: &[Index]) -> Result<Layout, TensorError> {
    let rank = layout.rank();
    let explicit = selectors
        .iter()
        .filter(|s| !matches!(s, Index::Ellipsis))
        .count();
    let ellipses = selectors.len() - explicit;
    if ellipses > 1 {
        return Err(TensorError::Value(
            "slice: at most one ellipsis is allowed".into(),
        ));
    }
    if explicit > rank {
        return Err(TensorError::Value(format!(
            "slice: too many indices ({explicit}) for tensor of rank {rank}"
        )));
    }

    // Expand the ellipsis (or the unnamed trailing dimensions) to Full.
    let mut expanded = Vec::with_capacity(rank);
    for selector in selectors {
        if matches!(selector, Index::Ellipsis) {
            expanded.extend(std::iter::repeat(Index::Full).take(rank - explicit));
        } else {
            expanded.push(*selector);
        }
    }
    while expanded.len() < rank {
        expanded.push(Index::Full);
    }

    let mut shape = Vec::with_capacity(rank);
    let mut strides = Vec::with_capacity(rank);
    let mut offset = layout.offset();
    for (dim, selector) in expanded.iter().enumerate() {
        let size = layout.shape()[dim];
        let stride = layout.strides()[dim];
        match *selector {
            Index::At(position) => {
                let resolved = if position < 0 {
                    position + size as isize
                } else {
                    position
                };
                if resolved < 0 || resolved >= size as isize {
                    return Err(TensorError::Value(format!(
                        "index {position} is out of bounds for dimension {dim} with size {size}"
                    )));
                }
                offset += resolved as usize * stride;
            }
            Index::Range { start, end, step } => {
                if step == 0 {
                    return Err(TensorError::Value("slice: step must be non-zero".into()));
                }
                let start = clamp_bound(start.unwrap_or(0), size);
                let end = clamp_bound(end.unwrap_or(size as isize), size);
                let len = if end > start {
                    (end - start).div_ceil(step)
                } else {
                    0
                };
                if len > 0 {
                    offset += start * stride;
                }
                shape.push(len);
                strides.push(stride * step);
            }
            Index::Full => {
                shape.push(size);
                strides.push(stride);
            }
            Index::Ellipsis => unreachable!("ellipses are expanded above"),
        }
    }
    Ok(Layout::with_parts(shape, strides, offset))
}

#[cfg(test)]
mod tests {
    use super::{resolve, Index};
    use crate::tensor::layout::Layout;

    #[test]
    fn integer_selector_drops_dimension() {
        let layout = Layout::contiguous(&[2, 3, 4]);
        let view = resolve(&layout, &[Index::At(1)]).unwrap();
        assert_eq!(view.shape(), &[3, 4]);
        assert_eq!(view.strides(), &[4, 1]);
        assert_eq!(view.offset(), 12);
    }

    #[test]
    fn negative_selector_counts_from_the_end() {
        let layout = Layout::contiguous(&[2, 3, 4]);
        let view = resolve(&layout, &[Index::At(-1), Index::At(-2)]).unwrap();
        assert_eq!(view.shape(), &[4]);
        assert_eq!(view.offset(), 12 + 4);
    }

    #[test]
    fn range_selector_keeps_dimension() {
        let layout = Layout::contiguous(&[6]);
        let view = resolve(&layout, &[Index::range(1, 5)]).unwrap();
        assert_eq!(view.shape(), &[4]);
        assert_eq!(view.strides(), &[1]);
        assert_eq!(view.offset(), 1);

        let view = resolve(&layout, &[Index::stepped(0, 6, 2)]).unwrap();
        assert_eq!(view.shape(), &[3]);
        assert_eq!(view.strides(), &[2]);
        assert_eq!(view.offset(), 0);
    }

    #[test]
    fn bounds_are_clamped() {
        let layout = Layout::contiguous(&[4]);
        let view = resolve(&layout, &[Index::range(2, 100)]).unwrap();
        assert_eq!(view.shape(), &[2]);
        let view = resolve(&layout, &[Index::range(3, 1)]).unwrap();
        assert_eq!(view.shape(), &[0]);
        let view = resolve(&layout, &[Index::range(-100, -1)]).unwrap();
        assert_eq!(view.shape(), &[3]);
    }

    #[test]
    fn ellipsis_expands_to_remaining_dimensions() {
        let layout = Layout::contiguous(&[2, 3, 4]);
        let view = resolve(&layout, &[Index::Ellipsis, Index::At(0)]).unwrap();
        assert_eq!(view.shape(), &[2, 3]);
        assert_eq!(view.strides(), &[12, 4]);

        let view = resolve(&layout, &[Index::At(0), Index::Ellipsis]).unwrap();
        assert_eq!(view.shape(), &[3, 4]);
    }

    #[test]
    fn selector_errors() {
        let layout = Layout::contiguous(&[2, 3]);
        assert!(resolve(&layout, &[Index::At(0); 3]).is_err());
        assert!(resolve(&layout, &[Index::Ellipsis, Index::Ellipsis]).is_err());
        assert!(resolve(&layout, &[Index::At(2)]).is_err());
        assert!(resolve(&layout, &[Index::At(-3)]).is_err());
        assert!(resolve(&layout, &[Index::stepped(0, 2, 0)]).is_err());
    }
}
