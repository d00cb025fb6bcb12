//! Print the built-in particle preset

use anyhow::Result;

/// TOML form of `ParticleConfig::pinwheel()`
pub const PINWHEEL_PRESET: &str = r#"# Particle burst used by the pinwheel widget
max_particles = 30
time_to_live = 6000
display_scale = 1.0
speed = [-0.08, 0.08, -0.08, 0.08]

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
"#;

pub fn run() -> Result<()> {
    print!("{PINWHEEL_PRESET}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pinwheel_particles::ParticleConfig;

    #[test]
    fn preset_matches_builtin() {
        let parsed = ParticleConfig::from_toml_str(PINWHEEL_PRESET).unwrap();
        assert_eq!(parsed, ParticleConfig::pinwheel());
    }
}
