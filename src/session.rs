//! Session-key generation: a 32-bit LCG plus the `X-Eamuse-Info` formatter.
//!
//! The generator keeps one process-global state behind a mutex (see the
//! concurrency notes this mirrors: the PRNG is the only thing in the codec
//! that isn't scoped to a single request). `generate_key` is the public
//! entry point; `Prng` and `format_key` are exposed separately so tests can
//! drive a seeded generator against a fixed clock (scenario 5).

use std::sync::Mutex;

use chrono::{DateTime, Utc};

const MULTIPLIER: u32 = 0x41C64E6D;
const INCREMENT: u32 = 0x3039;
const HIGH_MULTIPLIER: u32 = 0x838C9CDA;
const HIGH_INCREMENT: u32 = 0x6072;
const INITIAL_STATE: u32 = 0x41C64E6D;

/// The 32-bit LCG from §4.F. Each call to `next` advances the main state
/// twice, then derives the returned value's upper bits from a second,
/// non-persisted LCG step seeded by the post-advance state.
#[derive(Debug, Clone, Copy)]
pub struct Prng {
    state: u32,
}

impl Prng {
    pub const fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    pub fn next(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(MULTIPLIER).wrapping_add(INCREMENT);
        self.state = self.state.wrapping_mul(MULTIPLIER).wrapping_add(INCREMENT);
        let upper = self.state.wrapping_mul(HIGH_MULTIPLIER).wrapping_add(HIGH_INCREMENT);
        (upper & 0x7FFF_0000) | ((self.state >> 15) & 0xFFFF)
    }
}

static PRNG: Mutex<Prng> = Mutex::new(Prng::new(INITIAL_STATE));

/// Build the `(info, date)` pair for an outbound response: `info` is the
/// fresh `X-Eamuse-Info` value, `date` the RFC 1123 `Date` header.
pub fn generate_key() -> (String, String) {
    let unix_seconds = Utc::now().timestamp() as u32;
    let mut prng = PRNG.lock().expect("session PRNG mutex poisoned");
    format_key(&mut prng, unix_seconds)
}

/// The formatting half of `generate_key`, parameterized over an explicit
/// PRNG and clock reading so it can be exercised deterministically.
pub fn format_key(prng: &mut Prng, unix_seconds: u32) -> (String, String) {
    let salt_hi = prng.next() & 0xFFFF;
    let salt_lo = prng.next() & 0xFFFF;
    let salt = (salt_hi << 16) | salt_lo;
    let salt_hex = format!("{salt:08x}");
    // Intentional: the source truncates the 8-hex-char salt to its first 4,
    // discarding roughly half its entropy. Preserved verbatim (see the open
    // question this corresponds to).
    let truncated_salt = &salt_hex[0..4];
    let info = format!("1-{unix_seconds:08x}-{truncated_salt}");
    let date = rfc1123_date(unix_seconds);
    (info, date)
}

fn rfc1123_date(unix_seconds: u32) -> String {
    let dt: DateTime<Utc> = DateTime::from_timestamp(unix_seconds as i64, 0).expect("unix seconds in range");
    dt.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_prng_and_fixed_clock_match_the_reference_scenario() {
        let mut prng = Prng::new(0x41C64E6D);
        let (info, date) = format_key(&mut prng, 0x6123ABCD);
        assert!(info.starts_with("1-6123abcd-"));
        let salt_part = &info[info.len() - 4..];
        assert_eq!(salt_part.len(), 4);
        assert!(salt_part.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert!(date.ends_with("GMT"));
    }

    #[test]
    fn info_matches_the_expected_shape() {
        let (info, _) = generate_key();
        let parts: Vec<&str> = info.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "1");
        assert_eq!(parts[1].len(), 8);
        assert_eq!(parts[2].len(), 4);
    }

    #[test]
    fn successive_keys_differ() {
        let (first, _) = generate_key();
        let (second, _) = generate_key();
        assert_ne!(first, second);
    }
}
