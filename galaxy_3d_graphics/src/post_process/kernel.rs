/// Separable blur kernels.
///
/// A kernel is a list of (offset, weight) pairs in texel units along one
/// axis, sorted by ascending offset and normalized so the weights sum to 1.
///
/// Without hardware filtering every sample reads one texel, so `n` samples
/// cover `n` texels. With hardware filtering two adjacent texels are read
/// by one bilinear sample placed between them (offset weighted by the two
/// texel weights), so `n` samples cover `2n - 1` texels.

use crate::error::Result;
use crate::engine_bail;

/// Tolerance of the normalization check
const WEIGHT_TOLERANCE: f32 = 1e-4;

/// Shape of the weight distribution
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KernelType {
    /// Equal weights
    Box,
    /// Gaussian density; `None` derives the deviation from the radius
    Gaussian { standard_deviation: Option<f32> },
}

/// One tap of a kernel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KernelSample {
    /// Offset from the center in texels
    pub offset: f32,
    pub weight: f32,
}

/// Normalized 1-D kernel
#[derive(Debug, Clone, PartialEq)]
pub struct Kernel {
    samples: Vec<KernelSample>,
    kernel_type: KernelType,
    hardware_filtering: bool,
}

impl Kernel {
    /// Generate a kernel of `number_of_samples` taps
    ///
    /// # Errors
    ///
    /// `Error::Configuration` if the sample count is even, zero or above
    /// `max_samples`, or the Gaussian deviation is not positive.
    pub fn new(
        kernel_type: KernelType,
        number_of_samples: usize,
        hardware_filtering: bool,
        max_samples: usize,
    ) -> Result<Self> {
        validate_sample_count(number_of_samples, max_samples)?;

        // Texels covered on each side of the center
        let half = number_of_samples / 2;
        let radius = if hardware_filtering { half * 2 } else { half };

        let texel_weight: Box<dyn Fn(i32) -> f32> = match kernel_type {
            KernelType::Box => Box::new(|_| 1.0),
            KernelType::Gaussian { standard_deviation } => {
                let sigma = match standard_deviation {
                    Some(sigma) if sigma > 0.0 && sigma.is_finite() => sigma,
                    Some(sigma) => engine_bail!(Configuration, "galaxy3d::Kernel",
                        "Gaussian standard deviation must be positive (got {})", sigma),
                    None => default_standard_deviation(radius),
                };
                Box::new(move |x| gaussian_density(x as f32, sigma))
            }
        };

        let r = radius as i32;
        let texels: Vec<(f32, f32)> = (-r..=r).map(|x| (x as f32, texel_weight(x))).collect();
        let total: f32 = texels.iter().map(|(_, w)| w).sum();

        let mut samples = Vec::with_capacity(number_of_samples);
        if hardware_filtering {
            // Left pairs, center, right pairs: ascending order is preserved
            let center = radius;
            for pair in texels[..center].chunks(2) {
                samples.push(merge(pair[0], pair[1]));
            }
            samples.push(KernelSample { offset: 0.0, weight: texels[center].1 });
            for pair in texels[center + 1..].chunks(2) {
                samples.push(merge(pair[0], pair[1]));
            }
        } else {
            samples.extend(texels.iter().map(|&(offset, weight)| KernelSample { offset, weight }));
        }

        for sample in &mut samples {
            sample.weight /= total;
        }

        let kernel = Self { samples, kernel_type, hardware_filtering };
        kernel.check_normalized()?;
        Ok(kernel)
    }

    /// Equal-weight kernel
    pub fn box_filter(number_of_samples: usize, hardware_filtering: bool, max_samples: usize) -> Result<Self> {
        Self::new(KernelType::Box, number_of_samples, hardware_filtering, max_samples)
    }

    /// Gaussian kernel with the default deviation
    pub fn gaussian(number_of_samples: usize, hardware_filtering: bool, max_samples: usize) -> Result<Self> {
        Self::new(KernelType::Gaussian { standard_deviation: None }, number_of_samples, hardware_filtering, max_samples)
    }

    pub fn samples(&self) -> &[KernelSample] {
        &self.samples
    }

    pub fn offsets(&self) -> Vec<f32> {
        self.samples.iter().map(|s| s.offset).collect()
    }

    pub fn weights(&self) -> Vec<f32> {
        self.samples.iter().map(|s| s.weight).collect()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn kernel_type(&self) -> KernelType {
        self.kernel_type
    }

    pub fn hardware_filtering(&self) -> bool {
        self.hardware_filtering
    }

    /// Distance in texels from the center to the farthest texel read
    pub fn radius(&self) -> f32 {
        let half = (self.samples.len() / 2) as f32;
        if self.hardware_filtering { half * 2.0 } else { half }
    }

    fn check_normalized(&self) -> Result<()> {
        let sum: f32 = self.samples.iter().map(|s| s.weight).sum();
        if (sum - 1.0).abs() > WEIGHT_TOLERANCE {
            engine_bail!(InvariantViolation, "galaxy3d::Kernel",
                "Kernel weights sum to {} instead of 1", sum);
        }
        Ok(())
    }
}

/// # Errors
///
/// `Error::Configuration` unless `1 <= n <= max_samples` and `n` is odd.
pub fn validate_sample_count(number_of_samples: usize, max_samples: usize) -> Result<()> {
    if number_of_samples == 0 || number_of_samples % 2 == 0 {
        engine_bail!(Configuration, "galaxy3d::Kernel",
            "Number of samples must be odd and positive (got {})", number_of_samples);
    }
    if number_of_samples > max_samples {
        engine_bail!(Configuration, "galaxy3d::Kernel",
            "Number of samples {} exceeds the maximum of {}", number_of_samples, max_samples);
    }
    Ok(())
}

/// Two deviations span the radius
fn default_standard_deviation(radius: usize) -> f32 {
    (radius.max(1) as f32) / 2.0
}

fn gaussian_density(x: f32, sigma: f32) -> f32 {
    let two_sigma_sq = 2.0 * sigma * sigma;
    (-(x * x) / two_sigma_sq).exp() / (std::f32::consts::PI * two_sigma_sq).sqrt()
}

/// Single bilinear tap reading two adjacent texels
fn merge(a: (f32, f32), b: (f32, f32)) -> KernelSample {
    let weight = a.1 + b.1;
    let offset = if weight > 0.0 { (a.0 * a.1 + b.0 * b.1) / weight } else { (a.0 + b.0) * 0.5 };
    KernelSample { offset, weight }
}

#[cfg(test)]
#[path = "kernel_tests.rs"]
mod tests;
