use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::warn;

pub const SLOPE: f64 = 0.57;
pub const INTERCEPT: f64 = 8.74;
pub const MAX_SCORE: f64 = 20.0;
pub const FALLBACK_LOW: f64 = 9.5;
pub const FALLBACK_HIGH: f64 = 12.0;

/// Rescales raw scores and fills in missing ones from a seeded stream.
///
/// A single instance owns the stream for a whole run; two transforms built
/// from the same seed produce the same fallback sequence.
#[derive(Debug)]
pub struct GradeTransform<R = StdRng> {
    rng: R,
}

impl GradeTransform<StdRng> {
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> GradeTransform<R> {
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }

    /// Adjusts an already parsed score; `None` takes the fallback path.
    pub fn adjust(&mut self, raw: Option<f64>) -> f64 {
        match raw {
            Some(value) if value.is_finite() => rescale(value),
            Some(value) => {
                warn!(%value, "non-finite raw score, using fallback");
                self.fallback()
            }
            None => self.fallback(),
        }
    }

    /// Adjusts a raw spreadsheet cell. Empty cells, `-` and unparseable
    /// text all end up on the fallback path.
    pub fn adjust_cell(&mut self, raw: Option<&str>) -> f64 {
        let Some(cell) = raw.map(str::trim).filter(|cell| !cell.is_empty() && *cell != "-") else {
            return self.fallback();
        };

        match parse_score(cell) {
            Some(value) => self.adjust(Some(value)),
            None => {
                warn!(cell, "unparseable score cell, using fallback");
                self.fallback()
            }
        }
    }

    fn fallback(&mut self) -> f64 {
        let drawn = self.rng.gen_range(FALLBACK_LOW..=FALLBACK_HIGH);
        round_one_decimal(drawn)
    }
}

/// `0.57 * raw + 8.74`, capped at 20. There is no lower clamp.
pub fn rescale(raw: f64) -> f64 {
    if !(0.0..=MAX_SCORE).contains(&raw) {
        warn!(raw, "raw score outside 0..=20, rescaling anyway");
    }
    (SLOPE * raw + INTERCEPT).min(MAX_SCORE)
}

/// Parses `"N / 20"`, `"N"` or `"N,5"`; the left operand of `/` is the score.
pub fn parse_score(cell: &str) -> Option<f64> {
    let left = cell.split('/').next()?.trim();
    if left.is_empty() || left == "-" {
        return None;
    }

    left.replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
