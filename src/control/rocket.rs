use serde::{Deserialize, Serialize};

use crate::constants::MM_TO_M;
use crate::errors::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoseShape {
    Cone,
    Parabola,
    Ogive,
}

impl NoseShape {
    // Fraction of the enclosing cylinder's volume filled by the nose.
    pub fn volume_coefficient(&self) -> f64 {
        match self {
            NoseShape::Cone => 1.0 / 3.0,
            NoseShape::Parabola => 0.5,
            NoseShape::Ogive => 2.0 / 3.0,
        }
    }

    // Fraction of the enclosing rectangle covered by the side silhouette.
    pub fn silhouette_coefficient(&self) -> f64 {
        match self {
            NoseShape::Cone => 0.5,
            NoseShape::Parabola => 2.0 / 3.0,
            NoseShape::Ogive => 0.75,
        }
    }

    // Centre of pressure as a fraction of nose length from the tip.
    pub fn pressure_center_fraction(&self) -> f64 {
        match self {
            NoseShape::Cone => 2.0 / 3.0,
            NoseShape::Parabola => 0.5,
            NoseShape::Ogive => 0.466,
        }
    }

    pub fn drag_coefficient(&self) -> f64 {
        match self {
            NoseShape::Cone => 0.50,
            NoseShape::Parabola => 0.45,
            NoseShape::Ogive => 0.40,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FinMaterial {
    Balsa,
    Basswood,
    Plywood,
    Plastic,
    Fiberglass,
}

impl FinMaterial {
    pub fn youngs_modulus(&self) -> f64 {
        match self {
            FinMaterial::Balsa => 3.4e9,
            FinMaterial::Basswood => 10.1e9,
            FinMaterial::Plywood => 8.0e9,
            FinMaterial::Plastic => 2.3e9,
            FinMaterial::Fiberglass => 18.0e9,
        }
    }

    pub fn shear_modulus(&self) -> f64 {
        match self {
            FinMaterial::Balsa => 0.15e9,
            FinMaterial::Basswood => 0.6e9,
            FinMaterial::Plywood => 0.62e9,
            FinMaterial::Plastic => 0.85e9,
            FinMaterial::Fiberglass => 3.0e9,
        }
    }

    pub fn density(&self) -> f64 {
        match self {
            FinMaterial::Balsa => 160.0,
            FinMaterial::Basswood => 415.0,
            FinMaterial::Plywood => 630.0,
            FinMaterial::Plastic => 1240.0,
            FinMaterial::Fiberglass => 1850.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FinCount {
    Three,
    Four,
}

impl FinCount {
    pub fn count(&self) -> u32 {
        match self {
            FinCount::Three => 3,
            FinCount::Four => 4,
        }
    }

    // Sum of sin² over the fin roll positions: the share of fin lift seen in one plane.
    pub fn normal_force_multiplier(&self) -> f64 {
        match self {
            FinCount::Three => 1.5,
            FinCount::Four => 2.0,
        }
    }
}

impl TryFrom<u32> for FinCount {
    type Error = ValidationError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            3 => Ok(FinCount::Three),
            4 => Ok(FinCount::Four),
            other => Err(ValidationError::FinCount(other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignParameters {
    pub nose_shape: NoseShape,
    pub nose_height: f64,       // mm
    pub body_height: f64,       // mm
    pub body_width: f64,        // mm
    pub fin_height: f64,        // mm
    pub fin_base_width: f64,    // mm
    pub fin_tip_width: f64,     // mm
    pub fin_thickness: f64,     // mm
    pub fin_sweep: f64,         // mm
    pub fin_count: u32,
    pub fin_material: FinMaterial,
    pub weight: f64,            // g
    pub center_of_gravity: f64, // mm from the nose tip
}

impl Default for DesignParameters {
    fn default() -> Self {
        DesignParameters {
            nose_shape: NoseShape::Cone,
            nose_height: 57.0,
            body_height: 255.0,
            body_width: 31.0,
            fin_height: 57.5,
            fin_base_width: 50.0,
            fin_tip_width: 25.0,
            fin_thickness: 2.0,
            fin_sweep: 20.0,
            fin_count: 3,
            fin_material: FinMaterial::Balsa,
            weight: 50.0,
            center_of_gravity: 150.0,
        }
    }
}

// Validated rocket geometry and mass. Construct through `RocketDesign::try_from`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RocketDesign {
    nose_shape: NoseShape,
    nose_height: f64,
    body_height: f64,
    body_width: f64,
    fin_height: f64,
    fin_base_width: f64,
    fin_tip_width: f64,
    fin_thickness: f64,
    fin_sweep: f64,
    fin_count: FinCount,
    fin_material: FinMaterial,
    weight: f64,
    center_of_gravity: f64,
}

fn positive(field: &'static str, value: f64) -> Result<f64, ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFinite { field, value });
    }
    if value <= 0.0 {
        return Err(ValidationError::NonPositive { field, value });
    }
    Ok(value)
}

impl TryFrom<DesignParameters> for RocketDesign {
    type Error = ValidationError;

    fn try_from(params: DesignParameters) -> Result<Self, Self::Error> {
        RocketDesign::try_from(&params)
    }
}

impl TryFrom<&DesignParameters> for RocketDesign {
    type Error = ValidationError;

    fn try_from(params: &DesignParameters) -> Result<Self, Self::Error> {
        Ok(RocketDesign {
            nose_shape: params.nose_shape,
            nose_height: positive("nose_height", params.nose_height)?,
            body_height: positive("body_height", params.body_height)?,
            body_width: positive("body_width", params.body_width)?,
            fin_height: positive("fin_height", params.fin_height)?,
            fin_base_width: positive("fin_base_width", params.fin_base_width)?,
            fin_tip_width: positive("fin_tip_width", params.fin_tip_width)?,
            fin_thickness: positive("fin_thickness", params.fin_thickness)?,
            fin_sweep: positive("fin_sweep", params.fin_sweep)?,
            fin_count: FinCount::try_from(params.fin_count)?,
            fin_material: params.fin_material,
            weight: positive("weight", params.weight)?,
            center_of_gravity: positive("center_of_gravity", params.center_of_gravity)?,
        })
    }
}

impl Default for RocketDesign {
    fn default() -> Self {
        let params = DesignParameters::default();
        RocketDesign {
            nose_shape: params.nose_shape,
            nose_height: params.nose_height,
            body_height: params.body_height,
            body_width: params.body_width,
            fin_height: params.fin_height,
            fin_base_width: params.fin_base_width,
            fin_tip_width: params.fin_tip_width,
            fin_thickness: params.fin_thickness,
            fin_sweep: params.fin_sweep,
            fin_count: FinCount::Three,
            fin_material: params.fin_material,
            weight: params.weight,
            center_of_gravity: params.center_of_gravity,
        }
    }
}

impl RocketDesign {
    pub fn nose_shape(&self) -> NoseShape {
        self.nose_shape
    }

    pub fn nose_height(&self) -> f64 {
        self.nose_height
    }

    pub fn body_height(&self) -> f64 {
        self.body_height
    }

    pub fn body_width(&self) -> f64 {
        self.body_width
    }

    pub fn body_radius(&self) -> f64 {
        self.body_width / 2.0
    }

    pub fn fin_height(&self) -> f64 {
        self.fin_height
    }

    pub fn fin_base_width(&self) -> f64 {
        self.fin_base_width
    }

    pub fn fin_tip_width(&self) -> f64 {
        self.fin_tip_width
    }

    pub fn fin_thickness(&self) -> f64 {
        self.fin_thickness
    }

    pub fn fin_sweep(&self) -> f64 {
        self.fin_sweep
    }

    pub fn fin_count(&self) -> FinCount {
        self.fin_count
    }

    pub fn fin_material(&self) -> FinMaterial {
        self.fin_material
    }

    pub fn center_of_gravity(&self) -> f64 {
        self.center_of_gravity
    }

    // Total length from nose tip to the aft end of the body, mm.
    pub fn total_length(&self) -> f64 {
        self.nose_height + self.body_height
    }

    // Distance from the nose tip to the fin root leading edge, mm.
    // Fins sit flush with the aft end of the body.
    pub fn fin_root_position(&self) -> f64 {
        self.total_length() - self.fin_base_width
    }

    // Planform area of a single fin, mm².
    pub fn fin_planform_area(&self) -> f64 {
        (self.fin_base_width + self.fin_tip_width) / 2.0 * self.fin_height
    }

    pub fn mass_kg(&self) -> f64 {
        self.weight / 1000.0
    }

    pub fn center_of_gravity_m(&self) -> f64 {
        self.center_of_gravity * MM_TO_M
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_parameters_validate() {
        let design = RocketDesign::try_from(DesignParameters::default()).unwrap();
        assert_eq!(design, RocketDesign::default());
        assert_eq!(design.fin_count().count(), 3);
        assert_relative_eq!(design.total_length(), 312.0);
        assert_relative_eq!(design.mass_kg(), 0.05);
    }

    #[test]
    fn test_rejects_bad_fin_count() {
        let params = DesignParameters {
            fin_count: 5,
            ..DesignParameters::default()
        };
        assert_eq!(
            RocketDesign::try_from(params),
            Err(ValidationError::FinCount(5))
        );
    }

    #[test]
    fn test_rejects_non_positive_and_non_finite_fields() {
        let negative = DesignParameters {
            body_width: -31.0,
            ..DesignParameters::default()
        };
        assert!(matches!(
            RocketDesign::try_from(negative),
            Err(ValidationError::NonPositive {
                field: "body_width",
                ..
            })
        ));

        let nan = DesignParameters {
            fin_height: f64::NAN,
            ..DesignParameters::default()
        };
        assert!(matches!(
            RocketDesign::try_from(nan),
            Err(ValidationError::NonFinite {
                field: "fin_height",
                ..
            })
        ));
    }

    #[test]
    fn test_design_parameters_from_json() {
        let json = r#"{
            "nose_shape": "ogive",
            "nose_height": 70.0,
            "body_height": 300.0,
            "body_width": 41.0,
            "fin_height": 60.0,
            "fin_base_width": 70.0,
            "fin_tip_width": 30.0,
            "fin_thickness": 3.0,
            "fin_sweep": 25.0,
            "fin_count": 4,
            "fin_material": "plywood",
            "weight": 90.0,
            "center_of_gravity": 200.0
        }"#;
        let params: DesignParameters = serde_json::from_str(json).unwrap();
        let design = RocketDesign::try_from(params).unwrap();
        assert_eq!(design.nose_shape(), NoseShape::Ogive);
        assert_eq!(design.fin_count(), FinCount::Four);
        assert_relative_eq!(design.fin_root_position(), 300.0);
    }

    #[test]
    fn test_fin_planform_area() {
        let design = RocketDesign::default();
        assert_relative_eq!(design.fin_planform_area(), 37.5 * 57.5);
    }
}
