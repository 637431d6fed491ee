use std::f64::consts::PI;

use log::warn;
use serde::Serialize;

use crate::constants::{
    AIR_DENSITY_SEA_LEVEL, FUSELAGE_VOLUME_FACTOR, MAX_DIVERGENCE_SPEED, MAX_FLUTTER_SPEED,
    MIN_DIVERGENCE_SPEED, MIN_FLUTTER_SPEED, MIN_MOMENT_OF_INERTIA, MM_TO_M,
    NOSE_NORMAL_FORCE_SLOPE, SEA_LEVEL_PRESSURE, SPEED_OF_SOUND,
};
use crate::control::rocket::{DesignParameters, FinCount, RocketDesign};

// Static aerodynamic properties of one design. Lengths in metres from the nose tip,
// areas in m², volumes in m³.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AerodynamicProperties {
    pub frontal_area: f64,
    pub side_area: f64,
    pub fin_area: f64,
    pub reference_area: f64,
    pub nose_volume: f64,
    pub body_volume: f64,
    pub total_volume: f64,
    pub center_of_pressure: f64,
    pub fore_body_center_of_pressure: f64,
    pub fin_center_of_pressure: f64,
    pub aerodynamic_center: f64,
    pub stability_center_of_pressure: f64,
    pub static_margin: f64,    // calibers
    pub stability_margin: f64, // calibers
    pub normal_force_slope: f64,
    pub fin_lift_slope: f64,
    pub effective_fin_area: f64,
    pub drag_coefficient: f64,
    pub center_of_gravity: f64,
    pub total_length: f64,
    pub body_diameter: f64,
    pub moment_of_inertia: f64, // kg·m²
    pub divergence_speed: f64,  // m/s
    pub flutter_speed: f64,     // m/s
}

impl AerodynamicProperties {
    pub fn calculate(design: &RocketDesign) -> Self {
        let areas = projected_areas(design);
        let volumes = volumes(design);
        let centers = center_of_pressure(design);
        let stability_cp = stability_center_of_pressure(design);
        let fin = FinGeometry::from_design(design);
        let cg = design.center_of_gravity_m();
        let diameter = design.body_width() * MM_TO_M;

        AerodynamicProperties {
            frontal_area: areas.frontal,
            side_area: areas.side,
            fin_area: areas.fins,
            reference_area: reference_area(design),
            nose_volume: volumes.nose,
            body_volume: volumes.body,
            total_volume: volumes.total,
            center_of_pressure: centers.overall,
            fore_body_center_of_pressure: centers.fore_body,
            fin_center_of_pressure: barrowman_fin_center(design),
            aerodynamic_center: aerodynamic_center(design),
            stability_center_of_pressure: stability_cp,
            static_margin: static_margin(centers.overall, cg, diameter),
            stability_margin: static_margin(stability_cp, cg, diameter),
            normal_force_slope: NOSE_NORMAL_FORCE_SLOPE + fin_normal_force_slope(design),
            fin_lift_slope: fin.lift_slope,
            effective_fin_area: fin.single_area * design.fin_count().normal_force_multiplier(),
            drag_coefficient: design.nose_shape().drag_coefficient(),
            center_of_gravity: cg,
            total_length: design.total_length() * MM_TO_M,
            body_diameter: diameter,
            moment_of_inertia: moment_of_inertia(design),
            divergence_speed: fin_divergence_speed(design),
            flutter_speed: fin_flutter_speed(design),
        }
    }

    // Properties for unvalidated geometry. Anything that fails validation gives the
    // all-zero property set so callers always have something to render.
    pub fn from_parameters(params: &DesignParameters) -> Self {
        match RocketDesign::try_from(params) {
            Ok(design) => Self::calculate(&design),
            Err(e) => {
                warn!("Invalid rocket geometry ({}), using zeroed aerodynamic properties", e);
                Self::default()
            }
        }
    }

    pub fn is_stable(&self) -> bool {
        self.stability_margin > 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectedAreas {
    pub frontal: f64,
    pub side: f64,
    pub fins: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Volumes {
    pub nose: f64,
    pub body: f64,
    pub total: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PressureCenters {
    pub overall: f64,
    pub fore_body: f64,
}

// Planform figures of a single trapezoidal fin, SI units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FinGeometry {
    pub span: f64,
    pub root_chord: f64,
    pub tip_chord: f64,
    pub sweep: f64,
    pub thickness: f64,
    pub single_area: f64,
    pub taper_ratio: f64,
    pub mean_aerodynamic_chord: f64,
    pub aspect_ratio: f64,
    pub lift_slope: f64,
}

impl FinGeometry {
    pub fn from_design(design: &RocketDesign) -> Self {
        let span = design.fin_height() * MM_TO_M;
        let root_chord = design.fin_base_width() * MM_TO_M;
        let tip_chord = design.fin_tip_width() * MM_TO_M;
        let single_area = (root_chord + tip_chord) / 2.0 * span;
        let chord_sum = root_chord + tip_chord;
        let mean_aerodynamic_chord = 2.0 / 3.0 * (chord_sum - root_chord * tip_chord / chord_sum);
        // Two fins opposite each other form one wing of span 2s and area 2A.
        let aspect_ratio = 2.0 * span * span / single_area;
        let lift_slope =
            2.0 * PI * aspect_ratio / (2.0 + (4.0 + aspect_ratio * aspect_ratio).sqrt());

        FinGeometry {
            span,
            root_chord,
            tip_chord,
            sweep: design.fin_sweep() * MM_TO_M,
            thickness: design.fin_thickness() * MM_TO_M,
            single_area,
            taper_ratio: tip_chord / root_chord,
            mean_aerodynamic_chord,
            aspect_ratio,
            lift_slope,
        }
    }
}

pub fn reference_area(design: &RocketDesign) -> f64 {
    let radius = design.body_radius() * MM_TO_M;
    PI * radius * radius
}

pub fn projected_areas(design: &RocketDesign) -> ProjectedAreas {
    let radius = design.body_radius() * MM_TO_M;
    let diameter = 2.0 * radius;
    let fin = FinGeometry::from_design(design);
    let fin_count = design.fin_count().count() as f64;

    let frontal = PI * radius * radius + fin_count * fin.span * fin.thickness;

    let body = design.body_height() * MM_TO_M * diameter;
    let nose = design.nose_shape().silhouette_coefficient() * design.nose_height() * MM_TO_M * diameter;
    let visible_fins = match design.fin_count() {
        FinCount::Four => 2.0 * fin.single_area,
        // One fin edge-on in the plane, two at ±120° foreshortened by sin 60°,
        // plus the strip of root uncovered by the body curvature.
        FinCount::Three => {
            let sixty = PI / 3.0;
            fin.single_area * (1.0 + sixty.sin()) + fin.root_chord * radius * (1.0 - sixty.cos())
        }
    };

    ProjectedAreas {
        frontal,
        side: body + nose + visible_fins,
        fins: fin_count * fin.single_area,
    }
}

pub fn volumes(design: &RocketDesign) -> Volumes {
    let radius = design.body_radius() * MM_TO_M;
    let cross_section = PI * radius * radius;
    let nose = design.nose_shape().volume_coefficient() * cross_section * design.nose_height() * MM_TO_M;
    let body = cross_section * design.body_height() * MM_TO_M;
    Volumes {
        nose,
        body,
        total: nose + body,
    }
}

// Chordwise centroid of the fin planform from the root leading edge, splitting the
// trapezoid into two triangles.
fn fin_centroid(fin: &FinGeometry) -> f64 {
    let (cr, ct, xs) = (fin.root_chord, fin.tip_chord, fin.sweep);
    (xs * (cr + 2.0 * ct) + cr * cr + cr * ct + ct * ct) / (3.0 * (cr + ct))
}

// Area-weighted centre of pressure over the side silhouette, plus the nose and body
// only centre.
pub fn center_of_pressure(design: &RocketDesign) -> PressureCenters {
    let nose_length = design.nose_height() * MM_TO_M;
    let body_length = design.body_height() * MM_TO_M;
    let diameter = design.body_width() * MM_TO_M;
    let fin = FinGeometry::from_design(design);
    let areas = projected_areas(design);

    let nose_area = design.nose_shape().silhouette_coefficient() * nose_length * diameter;
    let nose_cp = design.nose_shape().pressure_center_fraction() * nose_length;
    let body_area = body_length * diameter;
    let body_cp = nose_length + body_length / 2.0;
    let fin_area = areas.side - nose_area - body_area;
    let fin_cp = design.fin_root_position() * MM_TO_M + fin_centroid(&fin);

    let fore_body = (nose_area * nose_cp + body_area * body_cp) / (nose_area + body_area);
    let overall =
        (nose_area * nose_cp + body_area * body_cp + fin_area * fin_cp) / areas.side;

    PressureCenters { overall, fore_body }
}

pub fn barrowman_fin_center(design: &RocketDesign) -> f64 {
    let fin = FinGeometry::from_design(design);
    let (cr, ct, xs) = (fin.root_chord, fin.tip_chord, fin.sweep);
    let chord_sum = cr + ct;
    design.fin_root_position() * MM_TO_M
        + xs * (cr + 2.0 * ct) / (3.0 * chord_sum)
        + (chord_sum - cr * ct / chord_sum) / 6.0
}

// Barrowman normal-force slope of the fin set including body interference, per radian.
pub fn fin_normal_force_slope(design: &RocketDesign) -> f64 {
    let fin = FinGeometry::from_design(design);
    let radius = design.body_radius() * MM_TO_M;
    let diameter = 2.0 * radius;
    let chord_sum = fin.root_chord + fin.tip_chord;
    let mid_chord_line = (fin.span.powi(2)
        + (fin.sweep + fin.tip_chord / 2.0 - fin.root_chord / 2.0).powi(2))
    .sqrt();

    // 4N(s/d)² with N the fin count, written through the per-plane multiplier.
    let planform = 8.0 * design.fin_count().normal_force_multiplier() * (fin.span / diameter).powi(2)
        / (1.0 + (1.0 + (2.0 * mid_chord_line / chord_sum).powi(2)).sqrt());
    let interference = 1.0 + radius / (fin.span + radius);
    planform * interference
}

pub fn stability_center_of_pressure(design: &RocketDesign) -> f64 {
    let nose_cp = design.nose_shape().pressure_center_fraction() * design.nose_height() * MM_TO_M;
    let fin_slope = fin_normal_force_slope(design);
    (NOSE_NORMAL_FORCE_SLOPE * nose_cp + fin_slope * barrowman_fin_center(design))
        / (NOSE_NORMAL_FORCE_SLOPE + fin_slope)
}

// Aerodynamic centre: the stability centre of pressure moved forward by the
// fuselage volume correction.
pub fn aerodynamic_center(design: &RocketDesign) -> f64 {
    let total_slope = NOSE_NORMAL_FORCE_SLOPE + fin_normal_force_slope(design);
    let correction =
        FUSELAGE_VOLUME_FACTOR * 2.0 * volumes(design).total / (reference_area(design) * total_slope);
    stability_center_of_pressure(design) - correction
}

pub fn static_margin(center_of_pressure: f64, center_of_gravity: f64, diameter: f64) -> f64 {
    if diameter <= 0.0 {
        return 0.0;
    }
    (center_of_pressure - center_of_gravity) / diameter
}

// Pitch moment of inertia of a uniform rod about the centre of gravity.
pub fn moment_of_inertia(design: &RocketDesign) -> f64 {
    let length = design.total_length() * MM_TO_M;
    let offset = length / 2.0 - design.center_of_gravity_m();
    let inertia = design.mass_kg() * (length * length / 12.0 + offset * offset);
    if inertia < MIN_MOMENT_OF_INERTIA {
        warn!(
            "Moment of inertia {:.3e} kg·m² below floor, using {:.1e}",
            inertia, MIN_MOMENT_OF_INERTIA
        );
        return MIN_MOMENT_OF_INERTIA;
    }
    inertia
}

// Speed at which aerodynamic twisting overcomes the torsional stiffness of one fin.
pub fn fin_divergence_speed(design: &RocketDesign) -> f64 {
    let fin = FinGeometry::from_design(design);
    let chord = fin.mean_aerodynamic_chord;
    let torsion_constant = chord * fin.thickness.powi(3) / 3.0;
    let stiffness = design.fin_material().shear_modulus() * torsion_constant / fin.span;
    // Elastic axis at mid-chord, aerodynamic centre at quarter chord.
    let eccentricity = 0.25 * chord;
    let critical_pressure = stiffness / (eccentricity * fin.lift_slope * fin.single_area);
    let speed = (2.0 * critical_pressure / AIR_DENSITY_SEA_LEVEL).sqrt();
    if !speed.is_finite() {
        return MIN_DIVERGENCE_SPEED;
    }
    speed.clamp(MIN_DIVERGENCE_SPEED, MAX_DIVERGENCE_SPEED)
}

// Flutter boundary after NACA TN 4197, corrected by the fin's lift slope.
pub fn fin_flutter_speed(design: &RocketDesign) -> f64 {
    let fin = FinGeometry::from_design(design);
    let aspect_ratio = fin.span * fin.span / fin.single_area;
    let thickness_ratio = fin.thickness / fin.root_chord;
    let denominator = 1.337 * aspect_ratio.powi(3) * SEA_LEVEL_PRESSURE * (fin.taper_ratio + 1.0)
        / (2.0 * (aspect_ratio + 2.0) * thickness_ratio.powi(3));
    let speed = SPEED_OF_SOUND
        * (design.fin_material().shear_modulus() / denominator).sqrt()
        * (2.0 * PI / fin.lift_slope).sqrt();
    if !speed.is_finite() {
        return MIN_FLUTTER_SPEED;
    }
    speed.clamp(MIN_FLUTTER_SPEED, MAX_FLUTTER_SPEED)
}
