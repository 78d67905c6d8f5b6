/// Camera: shared lens definition referenced by camera nodes.
///
/// A camera only knows its projection. Where it stands comes from the
/// `CameraNode` that references it, so the same camera can be placed by
/// several nodes.

use glam::Mat4;
use crate::error::Result;
use crate::engine_bail;

/// Projection of a camera
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    /// Perspective projection, `fov_y` in radians
    Perspective { fov_y: f32, aspect: f32, near: f32, far: f32 },
    /// Orthographic projection centered on the view axis
    Orthographic { width: f32, height: f32, near: f32, far: f32 },
}

impl Projection {
    /// Validated perspective projection
    ///
    /// # Errors
    ///
    /// `Error::Configuration` unless `0 < fov_y < pi`, `aspect > 0` and
    /// `0 < near < far`.
    pub fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Result<Self> {
        let projection = Projection::Perspective { fov_y, aspect, near, far };
        projection.validate()?;
        Ok(projection)
    }

    /// Validated orthographic projection
    pub fn orthographic(width: f32, height: f32, near: f32, far: f32) -> Result<Self> {
        let projection = Projection::Orthographic { width, height, near, far };
        projection.validate()?;
        Ok(projection)
    }

    pub fn validate(&self) -> Result<()> {
        let (near, far) = (self.near(), self.far());
        if !(near > 0.0 && far > near && far.is_finite()) {
            engine_bail!(Configuration, "galaxy3d::Projection",
                "Invalid depth range [{}, {}]", near, far);
        }
        match *self {
            Projection::Perspective { fov_y, aspect, .. } => {
                if !(fov_y > 0.0 && fov_y < std::f32::consts::PI && aspect > 0.0) {
                    engine_bail!(Configuration, "galaxy3d::Projection",
                        "Invalid perspective fov_y={} aspect={}", fov_y, aspect);
                }
            }
            Projection::Orthographic { width, height, .. } => {
                if !(width > 0.0 && height > 0.0) {
                    engine_bail!(Configuration, "galaxy3d::Projection",
                        "Invalid orthographic size {}x{}", width, height);
                }
            }
        }
        Ok(())
    }

    pub fn near(&self) -> f32 {
        match *self {
            Projection::Perspective { near, .. } | Projection::Orthographic { near, .. } => near,
        }
    }

    pub fn far(&self) -> f32 {
        match *self {
            Projection::Perspective { far, .. } | Projection::Orthographic { far, .. } => far,
        }
    }

    /// Right-handed projection matrix, depth range [0, 1]
    pub fn to_mat4(&self) -> Mat4 {
        match *self {
            Projection::Perspective { fov_y, aspect, near, far } => {
                Mat4::perspective_rh(fov_y, aspect, near, far)
            }
            Projection::Orthographic { width, height, near, far } => {
                let (hw, hh) = (width * 0.5, height * 0.5);
                Mat4::orthographic_rh(-hw, hw, -hh, hh, near, far)
            }
        }
    }

    /// Vertical scale of the projection matrix.
    ///
    /// Distances divided by this value are independent of the field of
    /// view, which keeps LOD selection stable when zooming.
    pub fn scale_factor(&self) -> f32 {
        self.to_mat4().y_axis.y
    }
}

/// Shared camera definition
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    name: String,
    projection: Projection,
}

impl Camera {
    /// # Errors
    ///
    /// `Error::Configuration` if the projection is invalid.
    pub fn new(name: &str, projection: Projection) -> Result<Self> {
        projection.validate()?;
        Ok(Self { name: name.to_string(), projection })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }
}

#[cfg(test)]
#[path = "camera_tests.rs"]
mod tests;
