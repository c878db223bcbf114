use lattice::tensor::layout::{broadcast_shape, Layout};

#[test]
fn contiguous_layouts() {
    let layout = Layout::contiguous(&[2, 3, 4]);
    assert_eq!(layout.elems(), 24);
    assert_eq!(layout.shape(), &[2, 3, 4]);
    assert_eq!(layout.strides(), &[12, 4, 1]);
    assert_eq!(layout.offset(), 0);
    assert!(layout.is_contiguous());

    let scalar = Layout::contiguous(&[]);
    assert_eq!(scalar.rank(), 0);
    assert_eq!(scalar.elems(), 1);
    assert!(scalar.is_contiguous());

    let empty = Layout::contiguous(&[2, 0, 3]);
    assert_eq!(empty.elems(), 0);
}

#[test]
fn translate_visits_positions_in_row_major_order() {
    let layout = Layout::contiguous(&[2, 2, 2]);
    for (expected, index) in layout.iter().enumerate() {
        assert_eq!(layout.translate(&index), expected);
    }
}

#[test]
fn index_iteration() {
    let layout = Layout::contiguous(&[2, 3]);
    let indices: Vec<_> = layout.iter().collect();
    assert_eq!(
        indices,
        vec![
            vec![0, 0],
            vec![0, 1],
            vec![0, 2],
            vec![1, 0],
            vec![1, 1],
            vec![1, 2],
        ]
    );

    // A scalar layout yields exactly one empty index.
    let scalar = Layout::contiguous(&[]);
    assert_eq!(scalar.iter().count(), 1);

    // An empty layout yields nothing.
    let empty = Layout::contiguous(&[3, 0]);
    assert_eq!(empty.iter().count(), 0);
}

#[test]
fn broadcast_shapes() {
    assert_eq!(broadcast_shape(&[1], &[3]).unwrap(), &[3]);
    assert_eq!(broadcast_shape(&[3], &[1]).unwrap(), &[3]);
    assert_eq!(broadcast_shape(&[2, 3], &[1]).unwrap(), &[2, 3]);
    assert_eq!(broadcast_shape(&[1], &[3, 2]).unwrap(), &[3, 2]);
    assert_eq!(
        broadcast_shape(&[2, 1, 4], &[7, 2, 4, 1]).unwrap(),
        &[7, 2, 4, 4]
    );
    assert_eq!(
        broadcast_shape(&[1, 4, 1, 2], &[1, 3, 1]).unwrap(),
        &[1, 4, 3, 2]
    );
    assert!(broadcast_shape(&[2, 3], &[2, 4]).is_err());
}

#[test]
fn broadcast_views_use_zero_strides() {
    let layout = Layout::contiguous(&[1]);
    let expanded = layout.broadcast_to(&[3, 2]).unwrap();
    assert_eq!(expanded.shape(), &[3, 2]);
    assert_eq!(expanded.strides(), &[0, 0]);

    let layout = Layout::contiguous(&[2, 1, 1]);
    let expanded = layout.broadcast_to(&[7, 2, 4, 5]).unwrap();
    assert_eq!(expanded.shape(), &[7, 2, 4, 5]);
    assert_eq!(expanded.strides(), &[0, 1, 0, 0]);

    assert!(layout.broadcast_to(&[3, 1, 1]).is_err());
}

#[test]
fn permute_and_transpose() {
    let layout = Layout::contiguous(&[2, 3, 4]);

    let permuted = layout.permute(&[2, 0, 1]).unwrap();
    assert_eq!(permuted.shape(), &[4, 2, 3]);
    assert_eq!(permuted.strides(), &[1, 12, 4]);

    let transposed = layout.transpose(0, 2).unwrap();
    assert_eq!(transposed.shape(), &[4, 3, 2]);
    assert_eq!(transposed.strides(), &[1, 4, 12]);
    assert!(!transposed.is_contiguous());

    assert!(layout.transpose(0, 3).is_err());
}

#[test]
fn squeeze_drops_singleton_dimensions() {
    let layout = Layout::contiguous(&[1, 2, 1, 3]);
    let squeezed = layout.squeeze();
    assert_eq!(squeezed.shape(), &[2, 3]);
    assert_eq!(squeezed.strides(), &[3, 1]);

    let scalar = Layout::contiguous(&[1, 1]).squeeze();
    assert_eq!(scalar.rank(), 0);
}
