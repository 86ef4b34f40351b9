//! Registration table mapping medium labels to kernel constructors.
//!
//! The table is built once (at host-context initialization) and passed by
//! reference wherever kernels are created from textual input; there is no
//! hidden global state. Custom media can be registered next to the
//! built-ins as long as their labels are fresh.

use crate::error::PcmError;
use crate::green::profiles::{ErfProfile, TanhProfile};
use crate::green::{
    AnisotropicLiquid, Derivative, GreensFunction, IonicLiquid, MetalSphere, SphericalDiffuse,
    SphericalDiffuseOptions, UniformDielectric, Vacuum,
};
use nalgebra::{Matrix3, Vector3};
use num::complex::Complex64;
use std::collections::HashMap;

/// Shape of a diffuse permittivity profile.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProfileShape {
    /// Hyperbolic-tangent transition.
    Tanh,
    /// Error-function transition.
    Erf,
}

/// Parameters of a radially diffuse layer.
#[derive(Clone, Copy, Debug)]
pub struct DiffuseProfileData {
    /// Transition shape.
    pub shape: ProfileShape,
    /// Bulk permittivity inside the layer.
    pub left: f64,
    /// Bulk permittivity outside the layer.
    pub right: f64,
    /// Radius of the transition.
    pub center: f64,
    /// Length scale of the transition.
    pub width: f64,
    /// Center of the layered structure.
    pub origin: Vector3<f64>,
}

/// Parameters of a metallic nanoparticle.
#[derive(Clone, Copy, Debug)]
pub struct MetalSphereData {
    /// Complex permittivity of the metal.
    pub epsilon_metal: Complex64,
    /// Sphere radius.
    pub radius: f64,
    /// Sphere center.
    pub center: Vector3<f64>,
}

/// Medium descriptor handed to the registered constructors.
///
/// Only the fields a given medium needs are read; constructors fail with a
/// configuration error when a required optional field is missing.
#[derive(Clone, Debug)]
pub struct GreenData {
    /// Derivative strategy for the kernel to build.
    pub derivative: Derivative,
    /// Scalar permittivity (uniform and ionic media, metal solvent).
    pub epsilon: f64,
    /// Inverse Debye screening length (ionic media).
    pub kappa: f64,
    /// Permittivity tensor (anisotropic media).
    pub epsilon_tensor: Option<Matrix3<f64>>,
    /// Diffuse layer parameters.
    pub profile: Option<DiffuseProfileData>,
    /// Metal nanoparticle parameters.
    pub metal: Option<MetalSphereData>,
}

impl Default for GreenData {
    fn default() -> Self {
        Self {
            derivative: Derivative::default(),
            epsilon: 1.0,
            kappa: 0.0,
            epsilon_tensor: None,
            profile: None,
            metal: None,
        }
    }
}

/// A boxed kernel constructor.
pub type GreenBuilder = fn(&GreenData) -> Result<Box<dyn GreensFunction>, PcmError>;

/// The registration table.
pub struct Factory {
    table: HashMap<String, GreenBuilder>,
}

impl Factory {
    /// An empty table.
    pub fn new() -> Self {
        Self {
            table: HashMap::new(),
        }
    }

    /// A table with every built-in medium registered.
    pub fn bootstrap() -> Self {
        let mut factory = Self::new();
        for (label, builder) in [
            ("VACUUM", build_vacuum as GreenBuilder),
            ("UNIFORMDIELECTRIC", build_uniform),
            ("IONICLIQUID", build_ionic),
            ("ANISOTROPICLIQUID", build_anisotropic),
            ("SPHERICALDIFFUSE", build_diffuse),
            ("METALSPHERE", build_metal),
        ] {
            factory
                .register(label, builder)
                .expect("built-in labels are distinct");
        }
        factory
    }

    /// Register a constructor under a fresh label.
    pub fn register(&mut self, label: &str, builder: GreenBuilder) -> Result<(), PcmError> {
        if self.table.contains_key(label) {
            return Err(PcmError::Configuration(format!(
                "label {label} is already registered"
            )));
        }
        self.table.insert(label.to_string(), builder);
        Ok(())
    }

    /// Build a kernel for a registered label.
    pub fn create(
        &self,
        label: &str,
        data: &GreenData,
    ) -> Result<Box<dyn GreensFunction>, PcmError> {
        let builder = self.table.get(label).ok_or_else(|| {
            PcmError::Configuration(format!("no Green's function registered for label {label}"))
        })?;
        builder(data)
    }

    /// The registered labels, sorted.
    pub fn labels(&self) -> Vec<&str> {
        let mut labels: Vec<&str> = self.table.keys().map(String::as_str).collect();
        labels.sort_unstable();
        labels
    }
}

impl Default for Factory {
    fn default() -> Self {
        Self::bootstrap()
    }
}

fn build_vacuum(data: &GreenData) -> Result<Box<dyn GreensFunction>, PcmError> {
    Ok(Box::new(Vacuum::new(data.derivative)))
}

fn build_uniform(data: &GreenData) -> Result<Box<dyn GreensFunction>, PcmError> {
    Ok(Box::new(UniformDielectric::new(
        data.epsilon,
        data.derivative,
    )?))
}

fn build_ionic(data: &GreenData) -> Result<Box<dyn GreensFunction>, PcmError> {
    Ok(Box::new(IonicLiquid::new(
        data.epsilon,
        data.kappa,
        data.derivative,
    )?))
}

fn build_anisotropic(data: &GreenData) -> Result<Box<dyn GreensFunction>, PcmError> {
    let tensor = data.epsilon_tensor.ok_or_else(|| {
        PcmError::Configuration("anisotropic medium needs a permittivity tensor".to_string())
    })?;
    Ok(Box::new(AnisotropicLiquid::new(tensor, data.derivative)?))
}

fn build_diffuse(data: &GreenData) -> Result<Box<dyn GreensFunction>, PcmError> {
    let profile = data.profile.ok_or_else(|| {
        PcmError::Configuration("diffuse medium needs profile parameters".to_string())
    })?;
    let options = SphericalDiffuseOptions::default();
    match profile.shape {
        ProfileShape::Tanh => Ok(Box::new(SphericalDiffuse::new(
            TanhProfile::new(profile.left, profile.right, profile.center, profile.width)?,
            profile.origin,
            options,
        )?)),
        ProfileShape::Erf => Ok(Box::new(SphericalDiffuse::new(
            ErfProfile::new(profile.left, profile.right, profile.center, profile.width)?,
            profile.origin,
            options,
        )?)),
    }
}

fn build_metal(data: &GreenData) -> Result<Box<dyn GreensFunction>, PcmError> {
    let metal = data.metal.ok_or_else(|| {
        PcmError::Configuration("metal-sphere medium needs nanoparticle parameters".to_string())
    })?;
    Ok(Box::new(MetalSphere::new(
        data.epsilon,
        metal.epsilon_metal,
        metal.radius,
        metal.center,
        data.derivative,
    )?))
}
