//! Xorshift32 PRNG backing every random bot decision.
//!
//! Algorithm: x ^= x << 13; x ^= x >> 17; x ^= x << 5;
//! Each bot slot owns its own stream so one kart's choices never shift
//! another kart's sequence.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeededRng {
    state: u32,
}

impl SeededRng {
    pub fn new(seed: u32) -> Self {
        // Must be non-zero; xorshift never leaves the zero state.
        let state = if seed == 0 { 0xDEADBEEF } else { seed };
        Self { state }
    }

    /// Stream for one bot slot, derived from the session seed.
    pub fn for_slot(session_seed: u32, slot: usize) -> Self {
        let salt = (slot as u32).wrapping_add(1).wrapping_mul(0x9E37_79B9);
        let mut rng = Self::new(session_seed ^ salt);
        // Decorrelate neighbouring slots before the first draw.
        rng.next();
        rng.next();
        rng
    }

    pub fn get_state(&self) -> u32 {
        self.state
    }

    /// Generate next random u32.
    pub fn next(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        self.state
    }

    /// Random value in [0, bound). A zero bound returns 0 without drawing.
    pub fn below(&mut self, bound: u32) -> u32 {
        if bound == 0 {
            return 0;
        }
        self.next() % bound
    }

    /// Random i32 in [min, max_exclusive). An empty range returns `min`.
    pub fn next_range(&mut self, min: i32, max_exclusive: i32) -> i32 {
        if max_exclusive <= min {
            return min;
        }
        let range = max_exclusive.wrapping_sub(min) as u32;
        min.wrapping_add((self.next() % range) as i32)
    }

    /// True with probability `percent`/100.
    pub fn chance_percent(&mut self, percent: u32) -> bool {
        self.below(100) < percent
    }

    /// Uniform roll in 0..256, compared against Q16.8 personality traits.
    pub fn roll_256(&mut self) -> i32 {
        self.below(256) as i32
    }

    /// +1 or -1.
    pub fn sign(&mut self) -> i32 {
        if self.next() & 1 == 0 {
            1
        } else {
            -1
        }
    }
}
