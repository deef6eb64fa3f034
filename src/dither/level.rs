//! Nonlinear scaling applied to quantization error before diffusion.

/// Power-law curve over error values -255..=255.
///
/// For a level `l` in 1..=100 an error `e` maps to `sign(e) * |e|^(l/100)`.
/// Levels of zero or below disable propagation entirely.
#[derive(Debug, Clone)]
pub struct LevelCurve {
    level: i32,
    values: Vec<f32>,
}

impl LevelCurve {
    pub fn new(level: i32) -> Self {
        let mut values = vec![0.0f32; 511];
        if level > 0 {
            let exponent = level as f64 / 100.0;
            for i in 1..256usize {
                let scaled = (i as f64).powf(exponent) as f32;
                values[255 + i] = scaled;
                values[255 - i] = -scaled;
            }
        }
        Self { level, values }
    }

    pub fn level(&self) -> i32 {
        self.level
    }

    /// Scaled value for an error in -255..=255.
    pub fn apply(&self, error: i32) -> f32 {
        self.values[(error.clamp(-255, 255) + 255) as usize]
    }
}
