//! 绳子拉直时的随机抖动源

use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// 随机抖动源，每个分量在 [-1, 1] 内
pub trait WobbleSource {
    fn next_wobble(&mut self) -> Vec3;
}

/// 可设种子的抖动源，测试时用固定种子保证可复现
pub struct SeededWobble {
    rng: StdRng,
}

impl SeededWobble {
    pub fn new(seed: u64) -> Self {
        Self { rng: StdRng::seed_from_u64(seed) }
    }
}

impl WobbleSource for SeededWobble {
    fn next_wobble(&mut self) -> Vec3 {
        Vec3::new(
            self.rng.random_range(-1.0..=1.0),
            self.rng.random_range(-1.0..=1.0),
            self.rng.random_range(-1.0..=1.0),
        )
    }
}

/// 不抖动
pub struct NoWobble;

impl WobbleSource for NoWobble {
    fn next_wobble(&mut self) -> Vec3 {
        Vec3::ZERO
    }
}
