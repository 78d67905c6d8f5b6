/// Effect trait - compiled shader programs with named parameters and passes.
///
/// Filters look their parameter and pass handles up once at construction
/// and keep them for their whole lifetime.

use std::fmt;
use std::sync::Arc;
use glam::{Mat4, Vec2, Vec3, Vec4};
use crate::error::Result;
use crate::engine_bail;
use super::Texture;

/// Handle to a named effect parameter
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EffectParameter {
    /// Owning effect name
    pub effect: String,
    /// Parameter name
    pub name: String,
    /// Backend slot
    pub slot: u32,
}

/// Handle to a named effect pass (technique)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EffectPass {
    /// Owning effect name
    pub effect: String,
    /// Pass name
    pub name: String,
    /// Backend index
    pub index: u32,
}

/// Value bound to an effect parameter
#[derive(Debug, Clone)]
pub enum ParamValue {
    Float(f32),
    Int(i32),
    Bool(bool),
    Vec2(Vec2),
    Vec3(Vec3),
    Vec4(Vec4),
    Mat4(Mat4),
    FloatArray(Vec<f32>),
    Vec2Array(Vec<Vec2>),
    Vec4Array(Vec<Vec4>),
    Texture(Arc<dyn Texture>),
}

/// Effect resource trait
pub trait Effect: Send + Sync + fmt::Debug {
    /// Effect name
    fn name(&self) -> &str;

    /// Look up a parameter handle by name
    fn parameter(&self, name: &str) -> Option<EffectParameter>;

    /// Look up a pass handle by name
    fn pass(&self, name: &str) -> Option<EffectPass>;
}

/// Look up a parameter that the caller cannot work without
///
/// # Errors
///
/// `Error::InvalidResource` if the effect does not expose the parameter.
pub fn require_parameter(effect: &dyn Effect, name: &str) -> Result<EffectParameter> {
    match effect.parameter(name) {
        Some(parameter) => Ok(parameter),
        None => engine_bail!(InvalidResource, "galaxy3d::Effect",
            "Effect '{}' has no parameter '{}'", effect.name(), name),
    }
}

/// Look up a pass that the caller cannot work without
///
/// # Errors
///
/// `Error::InvalidResource` if the effect does not expose the pass.
pub fn require_pass(effect: &dyn Effect, name: &str) -> Result<EffectPass> {
    match effect.pass(name) {
        Some(pass) => Ok(pass),
        None => engine_bail!(InvalidResource, "galaxy3d::Effect",
            "Effect '{}' has no pass '{}'", effect.name(), name),
    }
}
