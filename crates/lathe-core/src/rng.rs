use rand::Rng;

/// Source of uniform random draws in `[0, 1)`.
///
/// The device takes this as a capability so tests can script exact draw
/// sequences and assert branch selection and band values.
pub trait RandomSource {
    fn next_unit(&mut self) -> f64;
}

/// Production source backed by `rand::thread_rng`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn next_unit(&mut self) -> f64 {
        rand::thread_rng().gen::<f64>()
    }
}

/// Scripted draw sequence. Cycles back to the start once exhausted.
#[derive(Debug, Clone)]
pub struct FixedSequence {
    values: Vec<f64>,
    next: usize,
}

impl FixedSequence {
    pub fn new(values: Vec<f64>) -> Self {
        assert!(!values.is_empty(), "sequence needs at least one draw");
        Self { values, next: 0 }
    }

    /// Same draw on every read.
    pub fn constant(value: f64) -> Self {
        Self::new(vec![value])
    }
}

impl RandomSource for FixedSequence {
    fn next_unit(&mut self) -> f64 {
        let value = self.values[self.next];
        self.next = (self.next + 1) % self.values.len();
        value
    }
}
