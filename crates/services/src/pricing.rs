//! # Price Suggestion
//!
//! The pricing step's suggestion is a placeholder: a random base price
//! scaled by the sell-speed slider. It sits behind [`PriceSuggester`] so a
//! real estimator can replace it without touching the wizard.

use std::ops::Range;

use domains::{AiRecommendation, PriceSuggester};

/// Base prices are drawn uniformly from this range (upper bound exclusive).
pub const BASE_PRICE_RANGE: Range<u32> = 100..400;
/// Slider position at which the multiplier is exactly 1.
pub const NEUTRAL_SELL_SPEED: u8 = 50;
pub const MAX_SELL_SPEED: u8 = 100;

/// `round(base * sell_speed / 50)`, with the slider clamped to `0..=100`.
pub fn scaled_price(base: u32, sell_speed: u8) -> u32 {
    let speed = sell_speed.min(MAX_SELL_SPEED);
    let multiplier = f64::from(speed) / f64::from(NEUTRAL_SELL_SPEED);
    (f64::from(base) * multiplier).round() as u32
}

/// Tag recorded on the listing for a given slider position.
pub fn recommendation_for(sell_speed: u8) -> AiRecommendation {
    match sell_speed {
        s if s < 33 => AiRecommendation::FastSell,
        s if s < 66 => AiRecommendation::Standard,
        _ => AiRecommendation::Hold,
    }
}

/// Default suggester: uniform random base price, linear slider multiplier.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomMultiplierSuggester;

impl PriceSuggester for RandomMultiplierSuggester {
    fn suggest(&self, sell_speed: u8) -> u32 {
        let base: u32 = rand::random_range(BASE_PRICE_RANGE);
        scaled_price(base, sell_speed)
    }
}

/// Always starts from the same base. Used by tests and demos that need
/// reproducible prices.
#[derive(Debug, Clone, Copy)]
pub struct FixedBaseSuggester(pub u32);

impl PriceSuggester for FixedBaseSuggester {
    fn suggest(&self, sell_speed: u8) -> u32 {
        scaled_price(self.0, sell_speed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neutral_speed_returns_base() {
        for base in [100, 250, 399] {
            assert_eq!(scaled_price(base, 50), base);
        }
    }

    #[test]
    fn max_speed_doubles_base() {
        assert_eq!(scaled_price(123, 100), 246);
        assert_eq!(scaled_price(123, 255), 246);
    }

    #[test]
    fn rounding_is_half_away_from_zero() {
        // 101 * 0.5 = 50.5
        assert_eq!(scaled_price(101, 25), 51);
        assert_eq!(scaled_price(150, 0), 0);
    }

    #[test]
    fn random_suggestions_stay_in_scaled_range() {
        let suggester = RandomMultiplierSuggester;
        for _ in 0..200 {
            let neutral = suggester.suggest(50);
            assert!(BASE_PRICE_RANGE.contains(&neutral));
            let doubled = suggester.suggest(100);
            assert!((200..800).contains(&doubled) && doubled % 2 == 0);
        }
    }

    #[test]
    fn recommendation_thresholds() {
        assert_eq!(recommendation_for(0), AiRecommendation::FastSell);
        assert_eq!(recommendation_for(32), AiRecommendation::FastSell);
        assert_eq!(recommendation_for(33), AiRecommendation::Standard);
        assert_eq!(recommendation_for(65), AiRecommendation::Standard);
        assert_eq!(recommendation_for(66), AiRecommendation::Hold);
        assert_eq!(recommendation_for(100), AiRecommendation::Hold);
    }
}
