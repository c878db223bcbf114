use lattice::buffer::HostBuffer;
use lattice::tensor::{DType, Index, Tensor, TensorError};

#[test]
fn imported_buffers_share_their_memory() {
    let buffer = HostBuffer::new(vec![1.0f32, 2.0, 3.0, 4.0]);
    let tensor = Tensor::from_buffer(&buffer);
    assert_eq!(tensor.shape(), &[4]);
    assert_eq!(tensor.dtype(), DType::F32);
    assert_eq!(tensor.ravel::<f32>().unwrap(), vec![1.0, 2.0, 3.0, 4.0]);

    // Writes through the buffer are visible through the tensor.
    assert!(buffer.set(0, 10.0));
    assert_eq!(tensor.ravel::<f32>().unwrap(), vec![10.0, 2.0, 3.0, 4.0]);
}

#[test]
fn in_place_mutation_round_trips_through_the_buffer() {
    let buffer = HostBuffer::new(vec![1.0f32, 2.0, 3.0]);
    let mut tensor = Tensor::from_buffer(&buffer);
    tensor.add_(&Tensor::scalar(5.0f32)).unwrap();
    assert_eq!(buffer.to_vec(), vec![6.0, 7.0, 8.0]);

    let exported = tensor.to_buffer::<f32>().unwrap();
    assert_eq!(exported.to_vec(), vec![6.0, 7.0, 8.0]);
    // The exported handle aliases the same memory as the original.
    assert!(exported.set(2, 0.0));
    assert_eq!(buffer.get(2), Some(0.0));
}

#[test]
fn slice_assignment_reaches_the_buffer() {
    let buffer = HostBuffer::new(vec![0.0f32; 6]);
    let mut tensor = Tensor::from_buffer(&buffer);
    let mut view = tensor.reshape(&[2, 3]).unwrap();
    assert_eq!(view.shape(), &[2, 3]);
    view.set(&[Index::At(1)], &Tensor::scalar(7.0f32)).unwrap();
    assert_eq!(buffer.to_vec(), vec![0.0, 0.0, 0.0, 7.0, 7.0, 7.0]);
    // `tensor` itself is another view of the same memory.
    tensor.set(&[Index::At(0)], &Tensor::scalar(1.0f32)).unwrap();
    assert_eq!(buffer.to_vec(), vec![1.0, 0.0, 0.0, 7.0, 7.0, 7.0]);
}

#[test]
fn export_requires_a_whole_contiguous_view() {
    let t = Tensor::new(&[2, 3], &[1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
    let col = t.slice(&[Index::Full, Index::At(0)]).unwrap();
    assert!(matches!(
        col.to_buffer::<f32>(),
        Err(TensorError::Value(_))
    ));

    // Compacting first gives an exportable tensor with fresh storage.
    let compacted = col.contiguous();
    let buffer = compacted.to_buffer::<f32>().unwrap();
    assert_eq!(buffer.to_vec(), vec![1.0, 4.0]);
    assert!(buffer.set(0, -1.0));
    assert_eq!(t.ravel::<f32>().unwrap(), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
}

#[test]
fn export_checks_the_element_type() {
    let t = Tensor::new(&[2], &[1.0f32, 2.0]).unwrap();
    assert!(matches!(
        t.to_buffer::<i32>(),
        Err(TensorError::Cast { .. })
    ));
}

#[test]
fn fresh_allocations_break_aliasing() {
    let buffer = HostBuffer::new(vec![1.0f32, 2.0]);
    let tensor = Tensor::from_buffer(&buffer);

    // Concatenation always copies.
    let mut joined = Tensor::concat(&[&tensor, &tensor], 0).unwrap();
    joined.add_(&Tensor::scalar(1.0f32)).unwrap();
    assert_eq!(buffer.to_vec(), vec![1.0, 2.0]);

    // Casts always copy.
    let mut doubles = tensor.astype(DType::F64);
    doubles.add_(&Tensor::scalar(1.0f64)).unwrap();
    assert_eq!(buffer.to_vec(), vec![1.0, 2.0]);
}

#[test]
fn empty_and_integer_buffers() {
    let buffer = HostBuffer::<i32>::new(Vec::new());
    assert!(buffer.is_empty());
    let tensor = Tensor::from_buffer(&buffer);
    assert_eq!(tensor.shape(), &[0]);
    assert_eq!(tensor.numel(), 0);

    let buffer = HostBuffer::new(vec![1, 2, 3]);
    let tensor = Tensor::from_buffer(&buffer);
    assert_eq!(tensor.dtype(), DType::I32);
    assert_eq!(tensor.sum(None, false).unwrap().item().unwrap().to_f64(), 6.0);
}
