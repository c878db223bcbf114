use lattice::tensor::{device, DType, Device, Tensor, TensorError};
use rand::{rngs::StdRng, SeedableRng};

// Every test in this binary runs with the accelerator capability enabled;
// the default-capability failure paths live in the `tensor` test binary.
fn setup() {
    device::enable_accelerator();
}

#[test]
fn transfer_copies_to_the_other_device() {
    setup();
    let host = Tensor::new(&[2, 2], &[1.0f32, 2.0, 3.0, 4.0]).unwrap();
    let accel = host.to(Device::Accelerator).unwrap();
    assert_eq!(accel.device(), Device::Accelerator);
    assert_eq!(accel.shape(), host.shape());
    assert_eq!(accel.ravel::<f32>().unwrap(), host.ravel::<f32>().unwrap());

    let back = accel.to(Device::Host).unwrap();
    assert_eq!(back.device(), Device::Host);
    assert_eq!(back.ravel::<f32>().unwrap(), host.ravel::<f32>().unwrap());
}

#[test]
fn transfer_to_the_same_device_shares_storage() {
    setup();
    let host = Tensor::ones(&[2], DType::F32);
    let moved = host.to(Device::Accelerator).unwrap();
    let mut again = moved.to(Device::Accelerator).unwrap();
    // The second transfer is a no-op handle over the same storage.
    let one = Tensor::scalar(1.0f32).to(Device::Accelerator).unwrap();
    again.add_(&one).unwrap();
    assert_eq!(moved.ravel::<f32>().unwrap(), vec![2.0, 2.0]);
    // The original host tensor was copied, not shared.
    assert_eq!(host.ravel::<f32>().unwrap(), vec![1.0, 1.0]);
}

#[test]
fn transfer_breaks_aliasing_with_the_source() {
    setup();
    let mut host = Tensor::ones(&[2], DType::F32);
    let accel = host.to(Device::Accelerator).unwrap();
    host.add_(&Tensor::scalar(1.0f32)).unwrap();
    assert_eq!(host.ravel::<f32>().unwrap(), vec![2.0, 2.0]);
    assert_eq!(accel.ravel::<f32>().unwrap(), vec![1.0, 1.0]);
}

#[test]
fn operands_must_share_a_device() {
    setup();
    let host = Tensor::ones(&[2], DType::F32);
    let accel = host.to(Device::Accelerator).unwrap();
    assert!(matches!(
        host.add(&accel),
        Err(TensorError::DeviceMismatch(Device::Host, Device::Accelerator))
    ));
    assert!(matches!(
        Tensor::concat(&[&host, &accel], 0),
        Err(TensorError::DeviceMismatch(_, _))
    ));
}

#[test]
fn random_tensors_on_the_accelerator() {
    setup();
    let mut rng = StdRng::seed_from_u64(99);
    let t = Tensor::rand(&[3], DType::F64, Device::Accelerator, &mut rng).unwrap();
    assert_eq!(t.device(), Device::Accelerator);
    assert!(t.ravel::<f64>().unwrap().iter().all(|&x| (0.0..1.0).contains(&x)));
}

#[test]
fn export_requires_host_residency() {
    setup();
    let accel = Tensor::ones(&[2], DType::F32)
        .to(Device::Accelerator)
        .unwrap();
    assert!(matches!(
        accel.to_buffer::<f32>(),
        Err(TensorError::DeviceMismatch(_, _))
    ));
}
