use crate::constants::{DEFAULT_RISK_REWARD, MAX_RISK_REWARD, MIN_RISK_REWARD, RISK_MULTIPLIER};
use crate::error::{AppError, Result};
use crate::utils::round2;

/// Stop-loss and target derived from ATR
///
/// Both are `None` when ATR gives no usable distance; a zero stop would read
/// as a real price level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskLevels {
    pub stop_loss: Option<f64>,
    pub target_price: Option<f64>,
}

/// Clamp a risk/reward ratio into [1.5, 5.0]
pub fn clamp_risk_reward(ratio: f64) -> f64 {
    ratio.clamp(MIN_RISK_REWARD, MAX_RISK_REWARD)
}

/// Resolve the caller's optional ratio: missing defaults to 2.5, non-finite is rejected
pub fn resolve_risk_reward(ratio: Option<f64>) -> Result<f64> {
    match ratio {
        None => Ok(DEFAULT_RISK_REWARD),
        Some(r) if r.is_finite() => Ok(r),
        Some(r) => Err(AppError::InvalidInput(format!(
            "risk_reward_ratio must be a finite number, got {}",
            r
        ))),
    }
}

/// Size stop-loss and target around `entry_price`
///
/// `stop = entry - 1.0 * atr`, `target = entry + clamp(rrr) * atr`, rounded to cents.
pub fn size_risk(entry_price: f64, atr: f64, risk_reward_ratio: f64) -> RiskLevels {
    if !atr.is_finite() || atr <= 0.0 || !entry_price.is_finite() {
        return RiskLevels {
            stop_loss: None,
            target_price: None,
        };
    }

    let reward_multiplier = clamp_risk_reward(risk_reward_ratio);
    RiskLevels {
        stop_loss: Some(round2(entry_price - RISK_MULTIPLIER * atr)),
        target_price: Some(round2(entry_price + reward_multiplier * atr)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_risk_basic() {
        let levels = size_risk(100.0, 2.0, 2.5);
        assert_eq!(levels.stop_loss, Some(98.0));
        assert_eq!(levels.target_price, Some(105.0));
    }

    #[test]
    fn test_clamping() {
        assert_eq!(clamp_risk_reward(0.5), 1.5);
        assert_eq!(clamp_risk_reward(2.5), 2.5);
        assert_eq!(clamp_risk_reward(10.0), 5.0);

        let levels = size_risk(50.0, 1.0, 10.0);
        assert_eq!(levels.target_price, Some(55.0));
        let levels = size_risk(50.0, 1.0, 0.5);
        assert_eq!(levels.target_price, Some(51.5));
    }

    #[test]
    fn test_stop_below_entry_below_target() {
        for atr in [0.01, 0.37, 4.2, 25.0] {
            let levels = size_risk(123.45, atr, 2.0);
            assert!(levels.stop_loss.unwrap() < 123.45);
            assert!(levels.target_price.unwrap() > 123.45);
        }
    }

    #[test]
    fn test_non_positive_atr_yields_none() {
        for atr in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let levels = size_risk(100.0, atr, 2.5);
            assert_eq!(levels.stop_loss, None);
            assert_eq!(levels.target_price, None);
        }
    }

    #[test]
    fn test_resolve_risk_reward() {
        assert_eq!(resolve_risk_reward(None).unwrap(), 2.5);
        assert_eq!(resolve_risk_reward(Some(3.0)).unwrap(), 3.0);
        assert!(matches!(
            resolve_risk_reward(Some(f64::NAN)),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_rounding_to_cents() {
        let levels = size_risk(100.0, 1.234, 2.0);
        assert_eq!(levels.stop_loss, Some(98.77));
        assert_eq!(levels.target_price, Some(102.47));
    }
}
