//! Engine configuration (parsed from TOML) and the emission region

use crate::curves::Easing;
use crate::modifier::{AlphaModifier, ParticleModifier, ScaleModifier};
use crate::rand::ParticleRng;
use pinwheel_core::{PinwheelError, Rect, Result};
use std::sync::Arc;

/// Largest pool a config may ask for
pub const MAX_POOL_SIZE: usize = 10_000;

/// Where inside the emitter's bounds particles appear
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmitterAnchor {
    /// The center point of the emitter
    #[default]
    Center,
    /// Anywhere inside the emitter's rectangle
    Area,
}

/// Integer pixel range particles are placed in, relative to the parent surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EmissionRegion {
    pub x_min: i32,
    pub x_max: i32,
    pub y_min: i32,
    pub y_max: i32,
}

impl EmissionRegion {
    pub fn point(x: i32, y: i32) -> Self {
        Self {
            x_min: x,
            x_max: x,
            y_min: y,
            y_max: y,
        }
    }

    /// Region for an emitter whose window bounds are `emitter`, with the parent
    /// surface's window origin at `parent_left`/`parent_top`.
    pub fn from_bounds(emitter: Rect, parent_left: f32, parent_top: f32, anchor: EmitterAnchor) -> Self {
        let left = emitter.left as i32 - parent_left as i32;
        let top = emitter.top as i32 - parent_top as i32;
        let width = emitter.width() as i32;
        let height = emitter.height() as i32;
        match anchor {
            EmitterAnchor::Center => Self::point(left + width / 2, top + height / 2),
            EmitterAnchor::Area => Self {
                x_min: left,
                x_max: left + width,
                y_min: top,
                y_max: top + height,
            },
        }
    }

    pub fn is_point(&self) -> bool {
        self.x_min == self.x_max && self.y_min == self.y_max
    }

    /// Uniform integer point in `[min, max)` per axis; fixed when min == max
    pub fn pick(&self, rng: &mut ParticleRng) -> (i32, i32) {
        (
            pick_axis(self.x_min, self.x_max, rng),
            pick_axis(self.y_min, self.y_max, rng),
        )
    }
}

fn pick_axis(min: i32, max: i32, rng: &mut ParticleRng) -> i32 {
    if min == max {
        return min;
    }
    rng.int_range(min, max)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModifierKind {
    Alpha,
    Scale,
}

/// One `[[modifier]]` table
#[derive(Debug, Clone, PartialEq)]
pub struct ModifierConfig {
    pub kind: ModifierKind,
    pub initial: f32,
    pub final_value: f32,
    pub start_ms: u64,
    pub end_ms: u64,
    /// Falls back to the modifier's own default curve
    pub easing: Option<Easing>,
}

impl ModifierConfig {
    pub fn alpha(initial: i32, final_value: i32, start_ms: u64, end_ms: u64) -> Self {
        Self {
            kind: ModifierKind::Alpha,
            initial: initial as f32,
            final_value: final_value as f32,
            start_ms,
            end_ms,
            easing: None,
        }
    }

    pub fn scale(initial: f32, final_value: f32, start_ms: u64, end_ms: u64) -> Self {
        Self {
            kind: ModifierKind::Scale,
            initial,
            final_value,
            start_ms,
            end_ms,
            easing: None,
        }
    }

    pub fn build(&self) -> Arc<dyn ParticleModifier> {
        match self.kind {
            ModifierKind::Alpha => Arc::new(AlphaModifier::with_easing(
                self.initial as i32,
                self.final_value as i32,
                self.start_ms,
                self.end_ms,
                self.easing.unwrap_or(Easing::Linear),
            )),
            ModifierKind::Scale => Arc::new(ScaleModifier::with_easing(
                self.initial,
                self.final_value,
                self.start_ms,
                self.end_ms,
                self.easing.unwrap_or(Easing::HalfSine),
            )),
        }
    }

    fn from_toml(table: &toml::value::Table) -> Result<Self> {
        let kind = match table.get("kind").and_then(|v| v.as_str()) {
            Some("alpha") => ModifierKind::Alpha,
            Some("scale") => ModifierKind::Scale,
            Some(other) => {
                return Err(PinwheelError::InvalidEnumValue {
                    value: other.to_string(),
                    allowed: vec!["alpha".into(), "scale".into()],
                });
            }
            None => return Err(PinwheelError::MissingRequiredField("modifier.kind".into())),
        };

        let easing = match table.get("easing") {
            Some(v) => {
                let name = v.as_str().unwrap_or_default();
                Some(Easing::from_name(name).ok_or_else(|| PinwheelError::InvalidEnumValue {
                    value: name.to_string(),
                    allowed: Easing::NAMES.iter().map(|s| s.to_string()).collect(),
                })?)
            }
            None => None,
        };

        let start_ms = required_ms(table, "start")?;
        let end_ms = required_ms(table, "end")?;
        if end_ms < start_ms {
            return Err(PinwheelError::ConfigError(format!(
                "modifier window ends ({end_ms} ms) before it starts ({start_ms} ms)"
            )));
        }

        Ok(Self {
            kind,
            initial: required_f32(table, "initial")?,
            final_value: required_f32(table, "final")?,
            start_ms,
            end_ms,
            easing,
        })
    }
}

/// Configuration parsed from a particle preset TOML file
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleConfig {
    /// Pool size, also the default emission rate per second
    pub max_particles: usize,
    /// Lifetime of every particle in ms
    pub time_to_live: u64,
    /// dp → px factor applied to speed and acceleration ranges
    pub display_scale: f32,
    /// Overrides the `max_particles`-per-second default
    pub particles_per_second: Option<f32>,
    /// `[min_x, max_x, min_y, max_y]` in dp per ms
    pub speed: Option<[f32; 4]>,
    /// `[min_x, max_x, min_y, max_y]` in dp per ms²
    pub acceleration: Option<[f32; 4]>,
    pub anchor: EmitterAnchor,
    pub modifiers: Vec<ModifierConfig>,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            max_particles: 30,
            time_to_live: 6000,
            display_scale: 1.0,
            particles_per_second: None,
            speed: None,
            acceleration: None,
            anchor: EmitterAnchor::Center,
            modifiers: Vec::new(),
        }
    }
}

impl ParticleConfig {
    /// The burst used by the pinwheel widget
    pub fn pinwheel() -> Self {
        Self {
            speed: Some([-0.08, 0.08, -0.08, 0.08]),
            modifiers: vec![
                ModifierConfig::alpha(-250, 250, 0, 2000),
                ModifierConfig::scale(0.3, 0.5, 0, 400),
            ],
            ..Self::default()
        }
    }

    pub fn from_toml_str(source: &str) -> Result<Self> {
        let table: toml::value::Table = toml::from_str(source)?;
        Self::from_toml(&table)
    }

    /// Parse from a TOML table. Missing keys keep their defaults.
    pub fn from_toml(table: &toml::value::Table) -> Result<Self> {
        let mut config = Self::default();

        if let Some(v) = table.get("max_particles") {
            let n = toml_f32(v, -1.0);
            if !(0.0..=MAX_POOL_SIZE as f32).contains(&n) {
                return Err(PinwheelError::ValueOutOfRange {
                    field: "max_particles".into(),
                    min: 0.0,
                    max: MAX_POOL_SIZE as f64,
                    value: n as f64,
                });
            }
            config.max_particles = n as usize;
        }
        if let Some(v) = table.get("time_to_live") {
            config.time_to_live = toml_ms(v, "time_to_live")?;
        }
        if let Some(v) = table.get("display_scale") {
            config.display_scale = toml_f32(v, config.display_scale);
        }
        if let Some(v) = table.get("particles_per_second") {
            config.particles_per_second = Some(toml_f32(v, config.max_particles as f32));
        }
        if let Some(v) = table.get("speed") {
            config.speed = Some(toml_vec4(v, "speed")?);
        }
        if let Some(v) = table.get("acceleration") {
            config.acceleration = Some(toml_vec4(v, "acceleration")?);
        }
        if let Some(v) = table.get("anchor") {
            config.anchor = match v.as_str() {
                Some("center") => EmitterAnchor::Center,
                Some("area") => EmitterAnchor::Area,
                Some(other) => {
                    return Err(PinwheelError::InvalidEnumValue {
                        value: other.to_string(),
                        allowed: vec!["center".into(), "area".into()],
                    });
                }
                None => {
                    return Err(PinwheelError::InvalidFieldType {
                        expected: "string".into(),
                        got: v.type_str().into(),
                    });
                }
            };
        }

        if let Some(v) = table.get("modifier") {
            let Some(entries) = v.as_array() else {
                return Err(PinwheelError::InvalidFieldType {
                    expected: "array of tables".into(),
                    got: v.type_str().into(),
                });
            };
            for entry in entries {
                let Some(t) = entry.as_table() else {
                    return Err(PinwheelError::InvalidFieldType {
                        expected: "table".into(),
                        got: entry.type_str().into(),
                    });
                };
                config.modifiers.push(ModifierConfig::from_toml(t)?);
            }
        }

        Ok(config)
    }

    /// Emission rate in particles per virtual millisecond
    pub fn particles_per_ms(&self) -> f32 {
        self.particles_per_second
            .unwrap_or(self.max_particles as f32)
            / 1000.0
    }
}

// ── TOML helpers (handle integer/float coercion) ──

fn toml_f32(v: &toml::Value, default: f32) -> f32 {
    v.as_float()
        .map(|f| f as f32)
        .or_else(|| v.as_integer().map(|i| i as f32))
        .unwrap_or(default)
}

fn toml_ms(v: &toml::Value, field: &str) -> Result<u64> {
    match v.as_integer() {
        Some(i) if i >= 0 => Ok(i as u64),
        Some(i) => Err(PinwheelError::ValueOutOfRange {
            field: field.to_string(),
            min: 0.0,
            max: u64::MAX as f64,
            value: i as f64,
        }),
        None => Err(PinwheelError::InvalidFieldType {
            expected: "integer".into(),
            got: v.type_str().into(),
        }),
    }
}

fn toml_vec4(v: &toml::Value, field: &str) -> Result<[f32; 4]> {
    let shape_error =
        || PinwheelError::ConfigError(format!("{field} must be [min_x, max_x, min_y, max_y]"));
    let arr = match v.as_array() {
        Some(arr) if arr.len() == 4 => arr,
        _ => return Err(shape_error()),
    };
    let mut out = [0.0; 4];
    for (slot, item) in out.iter_mut().zip(arr) {
        if item.as_float().is_none() && item.as_integer().is_none() {
            return Err(PinwheelError::InvalidFieldType {
                expected: "number".into(),
                got: item.type_str().into(),
            });
        }
        *slot = toml_f32(item, 0.0);
    }
    Ok(out)
}

fn required_f32(table: &toml::value::Table, key: &str) -> Result<f32> {
    let v = table
        .get(key)
        .ok_or_else(|| PinwheelError::MissingRequiredField(format!("modifier.{key}")))?;
    if v.as_float().is_none() && v.as_integer().is_none() {
        return Err(PinwheelError::InvalidFieldType {
            expected: "number".into(),
            got: v.type_str().into(),
        });
    }
    Ok(toml_f32(v, 0.0))
}

fn required_ms(table: &toml::value::Table, key: &str) -> Result<u64> {
    let v = table
        .get(key)
        .ok_or_else(|| PinwheelError::MissingRequiredField(format!("modifier.{key}")))?;
    toml_ms(v, key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pinwheel_preset_matches_widget() {
        let config = ParticleConfig::pinwheel();
        assert_eq!(config.max_particles, 30);
        assert_eq!(config.time_to_live, 6000);
        assert!((config.particles_per_ms() - 0.03).abs() < 1e-6);
        assert_eq!(config.modifiers.len(), 2);
        assert_eq!(config.modifiers[0].kind, ModifierKind::Alpha);
        assert_eq!(config.modifiers[1].end_ms, 400);
    }

    #[test]
    fn parse_from_toml() {
        let toml_str = r#"
max_particles = 50
time_to_live = 1500
display_scale = 2
speed = [-0.1, 0.1, 0, 0.2]
anchor = "area"

[[modifier]]
kind = "alpha"
initial = -250
final = 250
start = 0
end = 2000

[[modifier]]
kind = "scale"
initial = 0.3
final = 0.5
start = 0
end = 400
easing = "linear"
"#;
        let config = ParticleConfig::from_toml_str(toml_str).unwrap();
        assert_eq!(config.max_particles, 50);
        assert_eq!(config.time_to_live, 1500);
        assert!((config.display_scale - 2.0).abs() < 1e-6);
        assert_eq!(config.speed, Some([-0.1, 0.1, 0.0, 0.2]));
        assert_eq!(config.anchor, EmitterAnchor::Area);
        assert_eq!(config.modifiers[0].initial, -250.0);
        assert_eq!(config.modifiers[1].easing, Some(Easing::Linear));
    }

    #[test]
    fn unknown_modifier_kind_rejected() {
        let err = ParticleConfig::from_toml_str(
            "[[modifier]]\nkind = \"spin\"\ninitial = 0\nfinal = 1\nstart = 0\nend = 1\n",
        )
        .unwrap_err();
        assert!(matches!(err, PinwheelError::InvalidEnumValue { .. }));
    }

    #[test]
    fn missing_window_rejected() {
        let err = ParticleConfig::from_toml_str(
            "[[modifier]]\nkind = \"alpha\"\ninitial = 0\nfinal = 1\nstart = 0\n",
        )
        .unwrap_err();
        assert!(matches!(err, PinwheelError::MissingRequiredField(f) if f == "modifier.end"));
    }

    #[test]
    fn unknown_anchor_rejected() {
        let err = ParticleConfig::from_toml_str("anchor = \"edge\"").unwrap_err();
        assert!(
            matches!(err, PinwheelError::InvalidEnumValue { ref value, .. } if value == "edge")
        );
        let err = ParticleConfig::from_toml_str("anchor = 3").unwrap_err();
        assert!(matches!(err, PinwheelError::InvalidFieldType { .. }));
        let config = ParticleConfig::from_toml_str("anchor = \"center\"").unwrap();
        assert_eq!(config.anchor, EmitterAnchor::Center);
    }

    #[test]
    fn non_numeric_range_rejected() {
        let err = ParticleConfig::from_toml_str("speed = [0, \"fast\", 0, 1]").unwrap_err();
        assert!(matches!(err, PinwheelError::InvalidFieldType { ref got, .. } if got == "string"));
        let err = ParticleConfig::from_toml_str("acceleration = [0, 1]").unwrap_err();
        assert!(matches!(err, PinwheelError::ConfigError(_)));
    }

    #[test]
    fn pool_size_bounded() {
        let err = ParticleConfig::from_toml_str("max_particles = 20000").unwrap_err();
        assert!(matches!(err, PinwheelError::ValueOutOfRange { .. }));
    }

    #[test]
    fn region_from_bounds_center_and_area() {
        let emitter = Rect::new(110.0, 220.0, 211.0, 320.0);
        let center = EmissionRegion::from_bounds(emitter, 100.0, 200.0, EmitterAnchor::Center);
        assert_eq!(center, EmissionRegion::point(60, 70));
        assert!(center.is_point());

        let area = EmissionRegion::from_bounds(emitter, 100.0, 200.0, EmitterAnchor::Area);
        assert_eq!((area.x_min, area.x_max, area.y_min, area.y_max), (10, 111, 20, 120));

        let mut rng = ParticleRng::new(8);
        for _ in 0..200 {
            let (x, y) = area.pick(&mut rng);
            assert!((10..111).contains(&x));
            assert!((20..120).contains(&y));
        }
        assert_eq!(center.pick(&mut rng), (60, 70));
    }
}
