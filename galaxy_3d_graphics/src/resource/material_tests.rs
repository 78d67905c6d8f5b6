use std::sync::Arc;
use crate::error::Error;
use crate::graphics_device::ParamValue;
use super::*;

fn material() -> Arc<Material> {
    Arc::new(Material::from_desc(MaterialDesc {
        name: "stone".to_string(),
        effect: "forward_lit".to_string(),
        params: vec![
            ("roughness".to_string(), ParamValue::Float(0.8)),
            ("tiling".to_string(), ParamValue::Float(1.0)),
        ],
    }).unwrap())
}

fn as_float(value: Option<&ParamValue>) -> f32 {
    match value {
        Some(ParamValue::Float(v)) => *v,
        other => panic!("expected float, got {:?}", other),
    }
}

// ============================================================================
// Material
// ============================================================================

#[test]
fn test_material_params_in_order() {
    let material = material();
    assert_eq!(material.effect(), "forward_lit");
    assert_eq!(material.param_count(), 2);
    assert_eq!(material.param_names().collect::<Vec<_>>(), vec!["roughness", "tiling"]);
    assert!(material.param("missing").is_none());
}

#[test]
fn test_material_duplicate_param_rejected() {
    let result = Material::from_desc(MaterialDesc {
        name: "bad".to_string(),
        effect: "fx".to_string(),
        params: vec![
            ("a".to_string(), ParamValue::Float(0.0)),
            ("a".to_string(), ParamValue::Float(1.0)),
        ],
    });
    assert!(matches!(result, Err(Error::Configuration(_))));
}

#[test]
fn test_material_without_effect_rejected() {
    let result = Material::from_desc(MaterialDesc {
        name: "bad".to_string(),
        effect: String::new(),
        params: Vec::new(),
    });
    assert!(result.is_err());
}

// ============================================================================
// MaterialInstance
// ============================================================================

#[test]
fn test_instance_override_and_reset() {
    let mut instance = MaterialInstance::new(material());
    assert_eq!(as_float(instance.param("roughness")), 0.8);

    instance.set_param("roughness", ParamValue::Float(0.2)).unwrap();
    assert!(instance.has_override("roughness"));
    assert_eq!(as_float(instance.param("roughness")), 0.2);

    instance.reset_param("roughness");
    assert_eq!(as_float(instance.param("roughness")), 0.8);
}

#[test]
fn test_instance_unknown_param_rejected() {
    let mut instance = MaterialInstance::new(material());
    let result = instance.set_param("metalness", ParamValue::Float(1.0));
    assert!(matches!(result, Err(Error::Configuration(_))));
}

#[test]
fn test_cloned_instance_is_independent_but_shares_material() {
    let mut a = MaterialInstance::new(material());
    let mut b = a.clone();
    b.set_param("tiling", ParamValue::Float(4.0)).unwrap();

    assert!(Arc::ptr_eq(a.material(), b.material()));
    assert_eq!(as_float(a.param("tiling")), 1.0);
    assert_eq!(as_float(b.param("tiling")), 4.0);

    a.set_param("tiling", ParamValue::Float(2.0)).unwrap();
    assert_eq!(as_float(b.param("tiling")), 4.0);
}
