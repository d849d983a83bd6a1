//! Deterministic pseudo-random generators.
//!
//! Two generators live here:
//!
//! - [`Alea`]: Johannes Baagøe's lagged multiply-with-carry generator seeded
//!   through the "mash" string hash. It drives the noise permutation shuffle, so
//!   its output is pinned bit-for-bit to the reference sequence. Only IEEE-754
//!   double arithmetic with exactly representable integers is involved, which
//!   keeps the stream identical on every platform.
//! - [`Xorshift64`]: a fast integer generator used for spawn sampling and
//!   life-cycle jitter, where any reproducible stream will do.

use serde::{Deserialize, Serialize};

const TWO_POW_32: f64 = 4_294_967_296.0;
const TWO_POW_NEG_32: f64 = 1.0 / TWO_POW_32;

/// Multiplier of the Alea recurrence.
const ALEA_MULTIPLIER: f64 = 2_091_639.0;

/// Returns the canonical decimal text of a numeric seed.
///
/// Uses the shortest round-trip digits with ECMAScript number-to-string layout:
/// integral values print without a fractional part (`42.0` becomes `"42"`),
/// negative zero prints as `"0"`, and magnitudes below `1e-6` or from `1e21`
/// up switch to exponent form (`"1e-7"`, `"1.5e+21"`).
pub fn seed_key(seed: f64) -> String {
    if seed.is_nan() {
        return "NaN".to_string();
    }
    if seed.is_infinite() {
        return if seed > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if seed == 0.0 {
        return "0".to_string();
    }
    let sign = if seed < 0.0 { "-" } else { "" };

    // `{:e}` yields the shortest digits as `d[.ddd]e<exp>`.
    let sci = format!("{:e}", seed.abs());
    let (mantissa, exp) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let digits: String = mantissa.chars().filter(char::is_ascii_digit).collect();
    let k = digits.len() as i32;
    let n = exp.parse::<i32>().unwrap_or(0) + 1;

    let body = if k <= n && n <= 21 {
        format!("{digits}{}", "0".repeat((n - k) as usize))
    } else if 0 < n && n <= 21 {
        let (int, frac) = digits.split_at(n as usize);
        format!("{int}.{frac}")
    } else if -6 < n && n <= 0 {
        format!("0.{}{digits}", "0".repeat((-n) as usize))
    } else {
        let e = n - 1;
        let e_sign = if e < 0 { '-' } else { '+' };
        let (lead, rest) = digits.split_at(1);
        if rest.is_empty() {
            format!("{lead}e{e_sign}{}", e.abs())
        } else {
            format!("{lead}.{rest}e{e_sign}{}", e.abs())
        }
    };
    format!("{sign}{body}")
}

/// Truncates toward zero and wraps into `[0, 2^32)`, matching an unsigned
/// 32-bit shift of a double.
fn to_uint32(x: f64) -> f64 {
    if !x.is_finite() {
        return 0.0;
    }
    x.trunc().rem_euclid(TWO_POW_32)
}

/// Stateful string hash that feeds the Alea seeding.
///
/// The state carries over between calls, so hashing the same text twice in a
/// row gives two different values.
#[derive(Debug, Clone)]
struct Masher {
    n: f64,
}

impl Masher {
    fn new() -> Self {
        Self {
            n: f64::from(0xefc8_249d_u32),
        }
    }

    fn mash(&mut self, data: &str) -> f64 {
        for unit in data.encode_utf16() {
            self.n += f64::from(unit);
            let mut h = 0.025_196_032_824_169_38 * self.n;
            self.n = to_uint32(h);
            h -= self.n;
            h *= self.n;
            self.n = to_uint32(h);
            h -= self.n;
            self.n += h * TWO_POW_32;
        }
        to_uint32(self.n) * TWO_POW_NEG_32
    }
}

/// Alea generator producing doubles in `[0, 1)`.
#[derive(Debug, Clone)]
pub struct Alea {
    s0: f64,
    s1: f64,
    s2: f64,
    c: f64,
}

impl Alea {
    /// Seeds the generator from arbitrary text.
    pub fn new(seed: &str) -> Self {
        let mut mash = Masher::new();
        let mut s0 = mash.mash(" ");
        let mut s1 = mash.mash(" ");
        let mut s2 = mash.mash(" ");

        s0 -= mash.mash(seed);
        if s0 < 0.0 {
            s0 += 1.0;
        }
        s1 -= mash.mash(seed);
        if s1 < 0.0 {
            s1 += 1.0;
        }
        s2 -= mash.mash(seed);
        if s2 < 0.0 {
            s2 += 1.0;
        }

        Self { s0, s1, s2, c: 1.0 }
    }

    /// Seeds the generator from a number via its decimal text (see [`seed_key`]).
    pub fn from_seed(seed: f64) -> Self {
        Self::new(&seed_key(seed))
    }

    /// Advances the state and returns the next double in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        let t = ALEA_MULTIPLIER * self.s0 + self.c * TWO_POW_NEG_32;
        self.s0 = self.s1;
        self.s1 = self.s2;
        // t is non-negative and far below 2^31, so truncation is the integer part.
        self.c = t.trunc();
        self.s2 = t - self.c;
        self.s2
    }
}

/// Xorshift64 deterministic PRNG. Same seed always produces the same sequence.
///
/// Uses the (13, 7, 17) shift triple. A zero seed is replaced by a fixed
/// non-zero fallback because zero is a fixed point of the recurrence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Xorshift64 {
    state: u64,
}

impl Xorshift64 {
    const FALLBACK_SEED: u64 = 0x5EED_DEAD_BEEF_CAFE;

    /// Creates a new PRNG with the given seed.
    pub fn new(seed: u64) -> Self {
        Self {
            state: if seed == 0 { Self::FALLBACK_SEED } else { seed },
        }
    }

    /// Creates a PRNG from a numeric engine seed, mixing its bit pattern so
    /// that small integral seeds land on well separated streams.
    pub fn from_seed(seed: f64) -> Self {
        let bits = if seed == 0.0 { 0 } else { seed.to_bits() };
        Self::new(bits.wrapping_mul(0x9E37_79B9_7F4A_7C15) ^ 0xD1B5_4A32_D192_ED03)
    }

    /// Advances the state and returns the next 64-bit value.
    pub fn next_u64(&mut self) -> u64 {
        self.state ^= self.state << 13;
        self.state ^= self.state >> 7;
        self.state ^= self.state << 17;
        self.state
    }

    /// Returns a uniformly distributed f64 in [0, 1) from the upper 53 bits.
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Returns a uniformly distributed f64 in [min, max).
    pub fn next_range(&mut self, min: f64, max: f64) -> f64 {
        min + self.next_f64() * (max - min)
    }
}
