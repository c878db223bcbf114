use lattice::tensor::{DType, Index, Tensor, TensorError};

#[test]
fn integer_indexing_drops_the_dimension() {
    let t = Tensor::new(&[2, 3], &[1, 2, 3, 4, 5, 6]).unwrap();
    let row = t.slice(&[Index::At(1)]).unwrap();
    assert_eq!(row.shape(), &[3]);
    assert_eq!(row.ravel::<i32>().unwrap(), vec![4, 5, 6]);

    let cell = t.slice(&[Index::At(1), Index::At(2)]).unwrap();
    assert_eq!(cell.shape(), &[] as &[usize]);
    assert_eq!(cell.item().unwrap().to_f64(), 6.0);
}

#[test]
fn negative_indices_count_from_the_end() {
    let t = Tensor::new(&[2, 3], &[1, 2, 3, 4, 5, 6]).unwrap();
    let last = t.slice(&[Index::At(-1), Index::At(-1)]).unwrap();
    assert_eq!(last.item().unwrap().to_f64(), 6.0);

    let col = t.slice(&[Index::Full, Index::At(-2)]).unwrap();
    assert_eq!(col.ravel::<i32>().unwrap(), vec![2, 5]);
}

#[test]
fn ranges_keep_the_dimension() {
    let t = Tensor::new(&[6], &[0, 1, 2, 3, 4, 5]).unwrap();
    let mid = t.slice(&[Index::range(1, 4)]).unwrap();
    assert_eq!(mid.shape(), &[3]);
    assert_eq!(mid.ravel::<i32>().unwrap(), vec![1, 2, 3]);

    let evens = t.slice(&[Index::stepped(0, 6, 2)]).unwrap();
    assert_eq!(evens.ravel::<i32>().unwrap(), vec![0, 2, 4]);

    let tail = t.slice(&[Index::range(-2, 6)]).unwrap();
    assert_eq!(tail.ravel::<i32>().unwrap(), vec![4, 5]);

    let empty = t.slice(&[Index::range(4, 2)]).unwrap();
    assert_eq!(empty.shape(), &[0]);
    assert_eq!(empty.numel(), 0);
}

#[test]
fn ellipsis_keeps_the_remaining_dimensions() {
    let t = Tensor::new(&[2, 3, 4], &(0..24).collect::<Vec<i32>>()).unwrap();
    let r = t.slice(&[Index::Ellipsis, Index::At(0)]).unwrap();
    assert_eq!(r.shape(), &[2, 3]);
    assert_eq!(r.ravel::<i32>().unwrap(), vec![0, 4, 8, 12, 16, 20]);

    let r = t.slice(&[Index::At(1), Index::Ellipsis]).unwrap();
    assert_eq!(r.shape(), &[3, 4]);
}

#[test]
fn slices_are_views_of_the_same_storage() {
    let t = Tensor::new(&[2, 3], &[1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
    let mut row = t.slice(&[Index::At(0)]).unwrap();
    row.assign(&Tensor::scalar(0.0f32)).unwrap();
    assert_eq!(
        t.ravel::<f32>().unwrap(),
        vec![0.0, 0.0, 0.0, 4.0, 5.0, 6.0]
    );

    // A slice of a slice still addresses the original storage.
    let mut inner = t
        .slice(&[Index::At(1)])
        .unwrap()
        .slice(&[Index::range(1, 3)])
        .unwrap();
    inner.assign(&Tensor::scalar(9.0f32)).unwrap();
    assert_eq!(
        t.ravel::<f32>().unwrap(),
        vec![0.0, 0.0, 0.0, 4.0, 9.0, 9.0]
    );
}

#[test]
fn assignment_broadcasts_the_value() {
    let mut t = Tensor::zeros(&[3, 4], DType::F32);
    // A rank-0 value stretches across the whole selected region.
    t.set(&[Index::range(0, 2)], &Tensor::scalar(1.0f32)).unwrap();
    assert_eq!(
        t.ravel::<f32>().unwrap(),
        vec![1., 1., 1., 1., 1., 1., 1., 1., 0., 0., 0., 0.]
    );

    // A row vector stretches across the selected rows.
    let row = Tensor::new(&[4], &[1.0f32, 2.0, 3.0, 4.0]).unwrap();
    t.set(&[Index::Full], &row).unwrap();
    assert_eq!(
        t.slice(&[Index::At(2)]).unwrap().ravel::<f32>().unwrap(),
        vec![1., 2., 3., 4.]
    );
}

#[test]
fn assignment_rejects_non_broadcastable_values() {
    let mut t = Tensor::zeros(&[3, 4], DType::F32);
    let bad = Tensor::new(&[3], &[1.0f32, 2.0, 3.0]).unwrap();
    assert!(matches!(
        t.set(&[Index::Full], &bad),
        Err(TensorError::Broadcast { .. })
    ));
    // Nothing was written.
    assert_eq!(t.ravel::<f32>().unwrap(), vec![0.0; 12]);
}

#[test]
fn assignment_casts_the_value_to_the_receiver() {
    let mut t = Tensor::zeros(&[2], DType::F32);
    t.assign(&Tensor::new(&[2], &[1, 2]).unwrap()).unwrap();
    assert_eq!(t.ravel::<f32>().unwrap(), vec![1.0, 2.0]);

    // The receiver's dtype never widens.
    let mut ints = Tensor::zeros(&[2], DType::I32);
    let floats = Tensor::new(&[2], &[1.0f32, 2.0]).unwrap();
    assert!(matches!(
        ints.assign(&floats),
        Err(TensorError::Cast { .. })
    ));
}

#[test]
fn column_assignment_through_a_view() {
    let mut tensor = Tensor::ones(&[4, 4], DType::F32);
    tensor
        .set(&[Index::Full, Index::At(1)], &Tensor::scalar(0.0f32))
        .unwrap();
    for row in 0..4 {
        assert_eq!(
            tensor
                .slice(&[Index::At(row as isize)])
                .unwrap()
                .ravel::<f32>()
                .unwrap(),
            vec![1.0, 0.0, 1.0, 1.0]
        );
    }
}

#[test]
fn out_of_bounds_selectors() {
    let t = Tensor::new(&[2, 3], &[1, 2, 3, 4, 5, 6]).unwrap();
    assert!(matches!(
        t.slice(&[Index::At(2)]),
        Err(TensorError::Value(_))
    ));
    assert!(matches!(
        t.slice(&[Index::At(-3)]),
        Err(TensorError::Value(_))
    ));
    assert!(matches!(
        t.slice(&[Index::At(0), Index::At(0), Index::At(0)]),
        Err(TensorError::Value(_))
    ));
    // Range bounds are clamped instead of failing.
    let r = t.slice(&[Index::Full, Index::range(0, 100)]).unwrap();
    assert_eq!(r.shape(), &[2, 3]);
}

#[test]
fn stepped_views_share_storage() {
    let mut t = Tensor::new(&[6], &[0.0f32, 1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
    t.set(&[Index::stepped(0, 6, 2)], &Tensor::scalar(-1.0f32))
        .unwrap();
    assert_eq!(
        t.ravel::<f32>().unwrap(),
        vec![-1.0, 1.0, -1.0, 3.0, -1.0, 5.0]
    );
}
