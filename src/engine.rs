//! Auto-scaling range engine for the volatility gauge.
//!
//! Owns the gauge's [min, max] display bounds and keeps the derived views
//! (color zones, tick labels, qualitative level) consistent with them.
//! Pure arithmetic, no I/O.

use crate::error::{GaugeError, Result};
use crate::models::Reading;

/// Number of equal-width color bands across the range.
pub const ZONE_COUNT: usize = 5;
/// Number of evenly spaced tick labels across the range.
pub const TICK_COUNT: usize = 11;

/// Qualitative volatility level derived from zone membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    VeryLow,
    Low,
    Moderate,
    High,
    VeryHigh,
}

impl Classification {
    fn from_zone_index(index: usize) -> Self {
        match index {
            0 => Self::VeryLow,
            1 => Self::Low,
            2 => Self::Moderate,
            3 => Self::High,
            _ => Self::VeryHigh,
        }
    }

    /// Status-panel sentence for this level.
    pub fn describe(&self) -> &'static str {
        match self {
            Self::VeryLow => "Volatility is Very Low",
            Self::Low => "Volatility is Low",
            Self::Moderate => "Volatility is Moderate",
            Self::High => "Volatility is High",
            Self::VeryHigh => "Volatility is Very High",
        }
    }
}

/// Current [min, max] display bounds of the gauge.
///
/// Only the engine mutates these; callers receive copies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range {
    pub min: f64,
    pub max: f64,
}

impl Range {
    pub fn width(&self) -> f64 {
        self.max - self.min
    }

    pub fn midpoint(&self) -> f64 {
        (self.min + self.max) / 2.0
    }
}

/// One of five equal-width color bands partitioning the range.
/// `level` runs 1..=5 from the calm end to the hot end.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Zone {
    pub from: f64,
    pub to: f64,
    pub level: u8,
}

/// Everything the caller needs to redraw the gauge after one reading.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestOutcome {
    pub range: Range,
    pub range_changed: bool,
    pub zones: [Zone; ZONE_COUNT],
    pub ticks: [f64; TICK_COUNT],
    pub classification: Classification,
}

/// Maintains the display range for one gauge widget.
///
/// The range starts at a caller-supplied default and is widened, never
/// narrowed, whenever a reading lands outside the current bounds. Zones
/// and ticks are recomputed from the range on every call; they are never
/// mutated independently.
pub struct VolatilityRangeEngine {
    range: Range,
}

impl VolatilityRangeEngine {
    pub fn new(min: f64, max: f64) -> Result<Self> {
        Ok(Self {
            range: checked_range(min, max)?,
        })
    }

    pub fn range(&self) -> Range {
        self.range
    }

    /// Feeds one reading through the engine.
    ///
    /// Negative or non-finite values are rejected without touching the
    /// range. A value outside the current bounds widens them with a 20%
    /// margin (floor/ceil to whole numbers) so the new bound does not sit
    /// exactly on the outlier.
    pub fn ingest(&mut self, reading: &Reading) -> Result<IngestOutcome> {
        let value = reading.value;
        if !value.is_finite() || value < 0.0 {
            return Err(GaugeError::InvalidReading(value));
        }

        let mut new_min = self.range.min;
        let mut new_max = self.range.max;

        if value < self.range.min {
            new_min = (value * 0.8).floor();
        }
        if value > self.range.max {
            new_max = (value * 1.2).ceil();
        }

        let range_changed = new_min != self.range.min || new_max != self.range.max;
        if range_changed {
            self.range = Range {
                min: new_min,
                max: new_max,
            };
        }

        Ok(IngestOutcome {
            range: self.range,
            range_changed,
            zones: self.zones(),
            ticks: self.ticks(),
            classification: self.classify(value),
        })
    }

    /// Reinitializes the range, e.g. when the tracked instrument or
    /// metric changes. State is unchanged if the new range is invalid.
    pub fn reset(&mut self, min: f64, max: f64) -> Result<()> {
        self.range = checked_range(min, max)?;
        Ok(())
    }

    /// Five contiguous equal-width color bands over the current range.
    pub fn zones(&self) -> [Zone; ZONE_COUNT] {
        let width = self.range.width() / ZONE_COUNT as f64;
        std::array::from_fn(|i| {
            let from = self.range.min + i as f64 * width;
            // Close the last band exactly at max so accumulated float
            // error cannot leave a sliver uncovered.
            let to = if i == ZONE_COUNT - 1 {
                self.range.max
            } else {
                self.range.min + (i + 1) as f64 * width
            };
            Zone {
                from,
                to,
                level: (i + 1) as u8,
            }
        })
    }

    /// Eleven evenly spaced tick labels, rounded to one decimal place.
    pub fn ticks(&self) -> [f64; TICK_COUNT] {
        let step = self.range.width() / (TICK_COUNT - 1) as f64;
        std::array::from_fn(|i| {
            let value = self.range.min + step * i as f64;
            (value * 10.0).round() / 10.0
        })
    }

    /// First zone whose upper edge the value does not exceed. A value
    /// exactly equal to max classifies as VeryHigh.
    fn classify(&self, value: f64) -> Classification {
        let width = self.range.width() / ZONE_COUNT as f64;
        for i in 0..ZONE_COUNT {
            if value <= self.range.min + (i + 1) as f64 * width {
                return Classification::from_zone_index(i);
            }
        }
        Classification::VeryHigh
    }
}

fn checked_range(min: f64, max: f64) -> Result<Range> {
    if !(min.is_finite() && max.is_finite()) || min >= max {
        return Err(GaugeError::InvalidRange { min, max });
    }
    Ok(Range { min, max })
}
