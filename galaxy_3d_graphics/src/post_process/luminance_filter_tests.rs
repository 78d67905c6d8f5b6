/// Tests for LuminanceFilter

use super::*;
use crate::graphics_device::mock_graphics_device::{DeviceCommand, MockTexture};
use crate::graphics_device::Viewport;
use crate::post_process::test_utils::{assert_restored, Harness};

fn one_pixel_target(h: &mut Harness) {
    let target = MockTexture::shared(1, 1, TextureFormat::R32_SFLOAT, "luminance");
    h.context.render_target = Some(target.clone());
    h.context.viewport = Some(Viewport::from_size(1, 1));
    h.target = target;
}

#[test]
fn test_reduces_to_single_pixel() {
    let mut h = Harness::new();
    one_pixel_target(&mut h);
    let before = h.context.save_targets();
    let mut filter = LuminanceFilter::new(&h.graphics).unwrap();

    filter.process(&mut h.context).unwrap();

    assert_eq!(h.mock().applied_passes(), vec!["LogLuminance", "Average", "Average", "AverageExp"]);
    let created: Vec<_> = h.mock().commands.iter().filter_map(|c| match c {
        DeviceCommand::CreateTexture { width, height, format } => Some((*width, *height, *format)),
        _ => None,
    }).collect();
    assert_eq!(created, vec![
        (64, 64, TextureFormat::R32_SFLOAT),
        (16, 16, TextureFormat::R32_SFLOAT),
        (4, 4, TextureFormat::R32_SFLOAT),
    ]);
    assert_restored(&h.context, &before);
    h.assert_pool_released();
    h.assert_no_hazards();
    h.assert_wrote_target();
}

#[test]
fn test_small_source_skips_averaging_steps() {
    let mut h = Harness::new();
    h.context.source_texture = Some(MockTexture::shared(4, 4, TextureFormat::R8G8B8A8_UNORM, "tiny"));
    one_pixel_target(&mut h);
    let mut filter = LuminanceFilter::new(&h.graphics).unwrap();

    filter.process(&mut h.context).unwrap();

    assert_eq!(h.mock().applied_passes(), vec!["LogLuminance", "AverageExp"]);
    h.assert_pool_released();
}
