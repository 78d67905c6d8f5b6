/// Tests for blur kernel generation

use super::*;
use crate::error::Error;

const MAX: usize = 23;

fn weight_sum(kernel: &Kernel) -> f32 {
    kernel.weights().iter().sum()
}

fn assert_symmetric(kernel: &Kernel) {
    let samples = kernel.samples();
    let n = samples.len();
    for i in 0..n / 2 {
        let left = samples[i];
        let right = samples[n - 1 - i];
        assert!((left.offset + right.offset).abs() < 1e-5, "offsets {:?}", kernel.offsets());
        assert!((left.weight - right.weight).abs() < 1e-5, "weights {:?}", kernel.weights());
    }
    assert_eq!(samples[n / 2].offset, 0.0);
}

fn assert_ascending(kernel: &Kernel) {
    let offsets = kernel.offsets();
    assert!(offsets.windows(2).all(|w| w[0] < w[1]), "offsets {:?}", offsets);
}

// ============================================================================
// Tests: Normalization and symmetry
// ============================================================================

#[test]
fn test_all_odd_sizes_are_normalized_and_symmetric() {
    for n in (1..=MAX).step_by(2) {
        for hardware in [false, true] {
            for kernel in [
                Kernel::box_filter(n, hardware, MAX).unwrap(),
                Kernel::gaussian(n, hardware, MAX).unwrap(),
            ] {
                assert_eq!(kernel.len(), n);
                assert!((weight_sum(&kernel) - 1.0).abs() < 1e-4);
                assert_symmetric(&kernel);
                assert_ascending(&kernel);
            }
        }
    }
}

#[test]
fn test_single_sample_kernel() {
    let kernel = Kernel::gaussian(1, true, MAX).unwrap();
    assert_eq!(kernel.samples(), &[KernelSample { offset: 0.0, weight: 1.0 }]);
    assert_eq!(kernel.radius(), 0.0);
}

// ============================================================================
// Tests: Box kernels
// ============================================================================

#[test]
fn test_box_five_samples_without_filtering() {
    let kernel = Kernel::box_filter(5, false, MAX).unwrap();
    assert_eq!(kernel.offsets(), vec![-2.0, -1.0, 0.0, 1.0, 2.0]);
    for weight in kernel.weights() {
        assert!((weight - 0.2).abs() < 1e-6);
    }
    assert_eq!(kernel.radius(), 2.0);
}

#[test]
fn test_box_five_samples_with_hardware_filtering() {
    let kernel = Kernel::box_filter(5, true, MAX).unwrap();

    // 9 texels merged pairwise around the center
    assert_eq!(kernel.offsets(), vec![-3.5, -1.5, 0.0, 1.5, 3.5]);
    let weights = kernel.weights();
    assert!((weights[2] - 1.0 / 9.0).abs() < 1e-6);
    assert!((weights[0] - 2.0 / 9.0).abs() < 1e-6);
    assert!((weight_sum(&kernel) - 1.0).abs() < 1e-5);
    assert_eq!(kernel.radius(), 4.0);
}

// ============================================================================
// Tests: Gaussian kernels
// ============================================================================

#[test]
fn test_gaussian_weights_decrease_from_center() {
    let kernel = Kernel::gaussian(7, false, MAX).unwrap();
    let weights = kernel.weights();
    assert!(weights[3] > weights[2]);
    assert!(weights[2] > weights[1]);
    assert!(weights[1] > weights[0]);
}

#[test]
fn test_gaussian_merge_shifts_towards_heavier_texel() {
    let kernel = Kernel::gaussian(3, true, MAX).unwrap();

    // Right tap merges texels 1 and 2; texel 1 is heavier
    let right = kernel.samples()[2];
    assert!(right.offset > 1.0 && right.offset < 1.5);
}

#[test]
fn test_gaussian_explicit_deviation() {
    let wide = Kernel::new(KernelType::Gaussian { standard_deviation: Some(10.0) }, 5, false, MAX).unwrap();
    let narrow = Kernel::new(KernelType::Gaussian { standard_deviation: Some(0.5) }, 5, false, MAX).unwrap();
    assert!(wide.weights()[0] > narrow.weights()[0]);

    let result = Kernel::new(KernelType::Gaussian { standard_deviation: Some(0.0) }, 5, false, MAX);
    assert!(matches!(result, Err(Error::Configuration(_))));
}

// ============================================================================
// Tests: Validation
// ============================================================================

#[test]
fn test_invalid_sample_counts() {
    assert!(matches!(Kernel::box_filter(0, false, MAX), Err(Error::Configuration(_))));
    assert!(matches!(Kernel::box_filter(4, false, MAX), Err(Error::Configuration(_))));
    assert!(matches!(Kernel::box_filter(25, false, MAX), Err(Error::Configuration(_))));
    assert!(validate_sample_count(23, MAX).is_ok());
}
