pub mod activation;
pub mod config;
pub mod dtype;
pub mod error;
pub mod loss;
pub mod net;
pub mod sample;
pub mod scoring;
pub mod store;
pub mod util;

pub use error::{Error, Result};

extern crate log;
extern crate num_traits;
extern crate rand;
extern crate rand_distr;
#[cfg(feature = "serde")]
extern crate serde;
#[cfg(feature = "serde")]
extern crate serde_json;
