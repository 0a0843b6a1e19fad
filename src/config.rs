use std::fmt;

use crate::utils::ChunkCoord;

/// Parameters of the noise height field used by the world generator.
///
/// Lower frequencies give larger features. The low layer is mixed with a
/// flattened copy of itself, steered by the control layer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TerrainConfig {
    pub seed: u32,
    /// world block coordinates are multiplied by this before sampling
    pub horizontal_scale: f64,

    // rolling base terrain
    pub low_octaves: usize,
    pub low_persistence: f64,
    pub low_lacunarity: f64,
    pub low_frequency: f64,

    // decides where the land gets flattened
    pub control_octaves: usize,
    pub control_persistence: f64,
    pub control_lacunarity: f64,
    pub control_frequency: f64,

    pub flatten_scale: f64,
    pub flatten_bias: f64,

    // control range that picks the unflattened layer
    pub select_lower: f64,
    pub select_upper: f64,
    pub select_falloff: f64,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            seed: 2,
            horizontal_scale: 0.1,

            low_octaves: 2,
            low_persistence: 0.15,
            low_lacunarity: 1.8,
            low_frequency: 1.1,

            control_octaves: 2,
            control_persistence: 0.5,
            control_lacunarity: 2.0,
            control_frequency: 1.0,

            flatten_scale: 0.4,
            flatten_bias: 0.1,

            select_lower: 0.4,
            select_upper: 100.0,
            select_falloff: 0.2,
        }
    }
}

/// Layout of a generated world.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WorldConfig {
    /// chunks along x, y, z
    pub extents: [usize; 3],
    pub origin: ChunkCoord,
    /// maximum terrain height in blocks
    pub land_scale: i32,
    pub terrain: TerrainConfig,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            extents: [24, 2, 24],
            origin: ChunkCoord(0, 0, 0),
            land_scale: 24,
            terrain: TerrainConfig::default(),
        }
    }
}

pub const ENV_EXTENTS: &str = "VOXEL_EXTENTS";
pub const ENV_ORIGIN: &str = "VOXEL_ORIGIN";
pub const ENV_LAND_SCALE: &str = "VOXEL_LAND_SCALE";
pub const ENV_SEED: &str = "VOXEL_SEED";

/// An environment override that could not be used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    pub variable: &'static str,
    pub value: String,
    pub reason: &'static str,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {}={:?}: {}", self.variable, self.value, self.reason)
    }
}

impl std::error::Error for ConfigError {}

impl WorldConfig {
    /// Defaults, overridden by `VOXEL_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`WorldConfig::from_env`] with a custom variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(value) = lookup(ENV_EXTENTS) {
            let [x, y, z] = parse_triple::<usize>(ENV_EXTENTS, &value)?;
            if x == 0 || y == 0 || z == 0 {
                return Err(ConfigError { variable: ENV_EXTENTS, value, reason: "extents must be positive" });
            }
            config.extents = [x, y, z];
        }

        if let Some(value) = lookup(ENV_ORIGIN) {
            let [x, y, z] = parse_triple::<isize>(ENV_ORIGIN, &value)?;
            config.origin = ChunkCoord(x, y, z);
        }

        if let Some(value) = lookup(ENV_LAND_SCALE) {
            let land_scale = parse_one::<i32>(ENV_LAND_SCALE, &value)?;
            if land_scale <= 0 {
                return Err(ConfigError { variable: ENV_LAND_SCALE, value, reason: "land scale must be positive" });
            }
            config.land_scale = land_scale;
        }

        if let Some(value) = lookup(ENV_SEED) {
            config.terrain.seed = parse_one(ENV_SEED, &value)?;
        }

        Ok(config)
    }
}

fn parse_one<T: std::str::FromStr>(variable: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError {
        variable,
        value: value.to_string(),
        reason: "not a number",
    })
}

/// `"x,y,z"`
fn parse_triple<T: std::str::FromStr + Copy>(variable: &'static str, value: &str) -> Result<[T; 3], ConfigError> {
    let parts = value
        .split(',')
        .map(|part| parse_one(variable, part))
        .collect::<Result<Vec<T>, _>>()?;

    match parts.as_slice() {
        [x, y, z] => Ok([*x, *y, *z]),
        _ => Err(ConfigError {
            variable,
            value: value.to_string(),
            reason: "expected three comma separated values",
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn no_overrides_gives_defaults() {
        let config = WorldConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, WorldConfig::default());
        assert_eq!(config.extents, [24, 2, 24]);
        assert_eq!(config.land_scale, 24);
    }

    #[test]
    fn overrides_are_applied() {
        let config = WorldConfig::from_lookup(lookup(&[
            (ENV_EXTENTS, "4, 1,3"),
            (ENV_ORIGIN, "-2,0,5"),
            (ENV_LAND_SCALE, "40"),
            (ENV_SEED, "99"),
        ]))
        .unwrap();
        assert_eq!(config.extents, [4, 1, 3]);
        assert_eq!(config.origin, ChunkCoord(-2, 0, 5));
        assert_eq!(config.land_scale, 40);
        assert_eq!(config.terrain.seed, 99);
    }

    #[test]
    fn bad_values_name_the_variable() {
        let err = WorldConfig::from_lookup(lookup(&[(ENV_EXTENTS, "4,1")])).unwrap_err();
        assert_eq!(err.variable, ENV_EXTENTS);
        assert_eq!(err.value, "4,1");

        let err = WorldConfig::from_lookup(lookup(&[(ENV_LAND_SCALE, "tall")])).unwrap_err();
        assert_eq!(err.variable, ENV_LAND_SCALE);
        assert!(err.to_string().contains("VOXEL_LAND_SCALE"));

        assert!(WorldConfig::from_lookup(lookup(&[(ENV_EXTENTS, "0,1,1")])).is_err());
        assert!(WorldConfig::from_lookup(lookup(&[(ENV_LAND_SCALE, "-3")])).is_err());
        assert!(WorldConfig::from_lookup(lookup(&[(ENV_ORIGIN, "1,x,1")])).is_err());
    }
}
