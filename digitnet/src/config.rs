//! Network configuration for a drawing canvas.

use crate::dtype::DType;
use crate::error::Result;
use crate::net::Net;
use crate::net::initializer::RandomNetInitializer;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
#[cfg(feature = "serde")]
use std::fs;
#[cfg(feature = "serde")]
use std::path::Path;

/// Describes a network whose input layer is a `canvas_width × canvas_height`
/// pixel grid and whose output layer has one neuron per class.
///
/// With the `serde` feature the config can be read from JSON; missing fields
/// take their default values:
///
/// ```json
/// { "canvas_width": 28, "canvas_height": 28, "hidden": [32], "batch_size": 10 }
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct NetConfig {
    pub canvas_width: usize,
    pub canvas_height: usize,
    pub hidden: Vec<usize>,
    pub classes: usize,
    pub batch_size: usize,
    pub learn_rate: f64,
    /// Seed for parameter initialization, entropy when absent.
    pub seed: Option<u64>,
}

impl Default for NetConfig {
    fn default() -> Self {
        NetConfig {
            canvas_width: 25,
            canvas_height: 25,
            hidden: vec![16, 16],
            classes: 10,
            batch_size: 100,
            learn_rate: 1.0,
            seed: None,
        }
    }
}

impl NetConfig {
    #[inline]
    pub fn input_size(&self) -> usize {
        self.canvas_width * self.canvas_height
    }

    pub fn layer_sizes(&self) -> Vec<usize> {
        let mut sizes = Vec::with_capacity(self.hidden.len() + 2);
        sizes.push(self.input_size());
        sizes.extend_from_slice(&self.hidden);
        sizes.push(self.classes);
        sizes
    }

    pub fn build<T: DType>(&self) -> Result<Net<T>> {
        let mut initializer = match self.seed {
            Some(seed) => RandomNetInitializer::seed_from_u64(seed),
            None => RandomNetInitializer::default(),
        };
        Net::with_initializer(
            &self.layer_sizes(),
            self.batch_size,
            T::from_f64(self.learn_rate),
            &mut initializer,
        )
    }

    /// Whether a loaded network fits this canvas and class count.
    pub fn matches(&self, sizes: &[usize]) -> bool {
        sizes.first() == Some(&self.input_size()) && sizes.last() == Some(&self.classes)
    }
}

#[cfg(feature = "serde")]
impl NetConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}

#[cfg(test)]
mod test {
    use super::NetConfig;
    use crate::error::Error;

    #[test]
    fn test_defaults() {
        let config = NetConfig::default();
        assert_eq!(config.layer_sizes(), vec![625, 16, 16, 10]);
        assert_eq!(config.batch_size, 100);
        assert_eq!(config.learn_rate, 1.0);
    }

    #[test]
    fn test_build() {
        let config = NetConfig {
            canvas_width: 3,
            canvas_height: 2,
            hidden: vec![4],
            classes: 3,
            batch_size: 5,
            learn_rate: 0.25,
            seed: Some(9),
        };
        let a = config.build::<f64>().unwrap();
        let b = config.build::<f64>().unwrap();
        assert_eq!(a.layer_sizes(), vec![6, 4, 3]);
        assert_eq!(a.batch_size(), 5);
        assert_eq!(a.learn_rate(), 0.25);
        assert_eq!(a.layers()[0].weights(), b.layers()[0].weights());
        assert!(config.matches(&a.layer_sizes()));
        assert!(!config.matches(&[625, 16, 10]));
    }

    #[test]
    fn test_invalid() {
        let config = NetConfig {
            canvas_width: 0,
            ..NetConfig::default()
        };
        assert!(matches!(config.build::<f32>(), Err(Error::InvalidTopology(_))));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_json() {
        let config = NetConfig::from_json_str(r#"{ "canvas_width": 28, "canvas_height": 28, "hidden": [32] }"#).unwrap();
        assert_eq!(config.layer_sizes(), vec![784, 32, 10]);
        assert_eq!(config.batch_size, 100);
        assert_eq!(config.seed, None);

        let json = config.to_json_string().unwrap();
        assert_eq!(NetConfig::from_json_str(&json).unwrap(), config);
        assert!(matches!(
            NetConfig::from_json_str("{ \"classes\": \"ten\" }"),
            Err(Error::Config(_))
        ));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("net.json");
        assert!(matches!(NetConfig::load(&path), Err(Error::Persistence(_))));

        std::fs::write(&path, "{ \"hidden\": [8], \"seed\": 4 }").unwrap();
        let config = NetConfig::load(&path).unwrap();
        assert_eq!(config.layer_sizes(), vec![625, 8, 10]);
        assert_eq!(config.seed, Some(4));

        std::fs::write(&path, "{ \"hidden\": ").unwrap();
        assert!(matches!(NetConfig::load(&path), Err(Error::Config(_))));
    }
}
