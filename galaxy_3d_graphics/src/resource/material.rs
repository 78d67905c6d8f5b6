/// Resource-level material types.
///
/// A `Material` is the shared base definition of a surface: the effect it
/// renders with and the default value of every parameter. A
/// `MaterialInstance` binds a material to one node and carries that node's
/// parameter overrides; cloning a node clones its instances but keeps the
/// base material shared.

use std::sync::Arc;
use rustc_hash::FxHashMap;
use crate::error::Result;
use crate::engine_bail;
use crate::graphics_device::ParamValue;

// ===== MATERIAL =====

/// Shared material definition
#[derive(Debug)]
pub struct Material {
    name: String,
    effect: String,
    params: Vec<(String, ParamValue)>,
    param_names: FxHashMap<String, usize>,
}

/// Material creation descriptor
pub struct MaterialDesc {
    pub name: String,
    /// Effect used to render the material
    pub effect: String,
    /// Default parameter values
    pub params: Vec<(String, ParamValue)>,
}

impl Material {
    /// Build a material
    ///
    /// # Errors
    ///
    /// `Error::Configuration` on an empty effect name or duplicate
    /// parameter names.
    pub fn from_desc(desc: MaterialDesc) -> Result<Self> {
        if desc.effect.is_empty() {
            engine_bail!(Configuration, "galaxy3d::Material",
                "Material '{}' has no effect", desc.name);
        }

        let mut params = Vec::with_capacity(desc.params.len());
        let mut param_names = FxHashMap::default();
        for (index, (name, value)) in desc.params.into_iter().enumerate() {
            if param_names.insert(name.clone(), index).is_some() {
                engine_bail!(Configuration, "galaxy3d::Material",
                    "Material '{}': duplicate parameter name '{}'", desc.name, name);
            }
            params.push((name, value));
        }

        Ok(Self { name: desc.name, effect: desc.effect, params, param_names })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn effect(&self) -> &str {
        &self.effect
    }

    /// Default value of a parameter
    pub fn param(&self, name: &str) -> Option<&ParamValue> {
        let index = self.param_names.get(name)?;
        self.params.get(*index).map(|(_, v)| v)
    }

    pub fn param_count(&self) -> usize {
        self.params.len()
    }

    /// Parameter names in declaration order
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.params.iter().map(|(n, _)| n.as_str())
    }
}

// ===== MATERIAL INSTANCE =====

/// Per-node binding of a shared material with parameter overrides
#[derive(Debug, Clone)]
pub struct MaterialInstance {
    material: Arc<Material>,
    overrides: FxHashMap<String, ParamValue>,
}

impl MaterialInstance {
    pub fn new(material: Arc<Material>) -> Self {
        Self { material, overrides: FxHashMap::default() }
    }

    /// Shared base material
    pub fn material(&self) -> &Arc<Material> {
        &self.material
    }

    /// Override a parameter for this instance only
    ///
    /// # Errors
    ///
    /// `Error::Configuration` if the base material has no such parameter.
    pub fn set_param(&mut self, name: &str, value: ParamValue) -> Result<()> {
        if self.material.param(name).is_none() {
            engine_bail!(Configuration, "galaxy3d::MaterialInstance",
                "Material '{}' has no parameter '{}'", self.material.name(), name);
        }
        self.overrides.insert(name.to_string(), value);
        Ok(())
    }

    /// Drop an override, falling back to the material default
    pub fn reset_param(&mut self, name: &str) {
        self.overrides.remove(name);
    }

    /// Effective value: override if present, material default otherwise
    pub fn param(&self, name: &str) -> Option<&ParamValue> {
        self.overrides.get(name).or_else(|| self.material.param(name))
    }

    pub fn has_override(&self, name: &str) -> bool {
        self.overrides.contains_key(name)
    }
}

#[cfg(test)]
#[path = "material_tests.rs"]
mod tests;
