use crate::net::Net;
use crate::net::initializer::RandomNetInitializer;
use crate::sample::Sample;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const CANVAS_LG: usize = 28 * 28;
pub const CANVAS_MD: usize = 25 * 25;
pub const CANVAS_SM: usize = 8 * 8;
pub const CLASSES: usize = 10;
const SEED: u64 = 0x8371943;

pub fn get_net(input_size: usize, batch_size: usize) -> Net<f64> {
    let mut init = RandomNetInitializer::seed_from_u64(SEED);
    Net::with_initializer(&[input_size, 16, 16, CLASSES], batch_size, 1.0, &mut init)
        .expect("valid benchmark topology")
}

pub fn get_samples(input_size: usize, count: usize) -> Vec<Sample<f64>> {
    let mut rng = StdRng::seed_from_u64(SEED);
    (0..count)
        .map(|i| Sample::new(i % CLASSES, (0..input_size).map(|_| rng.r#gen::<f64>()).collect()))
        .collect()
}
