use rust_decimal::Decimal;

use crate::common::errors::{GatewayError, ReconcileError};
use crate::common::types::{round_down_to_step, SymbolFilters};

/// Converts available funds into an executable order quantity.
///
/// Called right before an opening order is submitted, with balance, price
/// and filters read fresh from the gateway.
pub trait SizeCalculator: Send + Sync {
    fn compute_quantity(
        &self,
        symbol: &str,
        available_balance: Decimal,
        current_price: Decimal,
        filters: &SymbolFilters,
    ) -> Result<Decimal, ReconcileError>;
}

/// Spends the whole available balance: `balance / price`, rounded down to
/// the symbol's quantity step. No risk cap and no leverage multiplier.
#[derive(Debug, Clone, Copy, Default)]
pub struct FullBalanceSizer;

impl SizeCalculator for FullBalanceSizer {
    fn compute_quantity(
        &self,
        symbol: &str,
        available_balance: Decimal,
        current_price: Decimal,
        filters: &SymbolFilters,
    ) -> Result<Decimal, ReconcileError> {
        if current_price <= Decimal::ZERO {
            return Err(GatewayError::InvalidResponse(format!(
                "non-positive price {} for {}",
                current_price, symbol
            ))
            .into());
        }

        let raw = available_balance.max(Decimal::ZERO) / current_price;
        let quantity = round_down_to_step(raw, filters.step_size);

        if quantity.is_zero() || quantity < filters.min_qty {
            return Err(ReconcileError::InsufficientBalance {
                symbol: symbol.to_string(),
                quantity,
                min_qty: filters.min_qty,
            });
        }

        Ok(quantity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use tokio_test::{assert_err, assert_ok};

    fn btc_filters() -> SymbolFilters {
        SymbolFilters {
            symbol: "BTCUSDT".into(),
            step_size: dec!(0.001),
            min_qty: dec!(0.001),
            tick_size: dec!(0.1),
        }
    }

    #[test]
    fn test_whole_balance_divided_by_price() {
        let qty = assert_ok!(FullBalanceSizer.compute_quantity(
            "BTCUSDT",
            dec!(1000),
            dec!(50000),
            &btc_filters()
        ));
        assert_eq!(qty, dec!(0.02));
    }

    #[test]
    fn test_rounds_down_to_step() {
        // 1234.56 / 43210 = 0.028571...
        let qty = FullBalanceSizer
            .compute_quantity("BTCUSDT", dec!(1234.56), dec!(43210), &btc_filters())
            .unwrap();
        assert_eq!(qty, dec!(0.028));
    }

    #[test]
    fn test_below_minimum_is_insufficient_balance() {
        let err = assert_err!(FullBalanceSizer.compute_quantity(
            "BTCUSDT",
            dec!(10),
            dec!(50000),
            &btc_filters()
        ));
        match err {
            ReconcileError::InsufficientBalance {
                symbol,
                quantity,
                min_qty,
            } => {
                assert_eq!(symbol, "BTCUSDT");
                assert_eq!(quantity, Decimal::ZERO);
                assert_eq!(min_qty, dec!(0.001));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_min_qty_above_step() {
        let filters = SymbolFilters {
            min_qty: dec!(0.01),
            ..btc_filters()
        };
        // 0.005 rounds to a valid step but is under the minimum
        assert!(matches!(
            FullBalanceSizer.compute_quantity("BTCUSDT", dec!(250), dec!(50000), &filters),
            Err(ReconcileError::InsufficientBalance { .. })
        ));
    }

    #[test]
    fn test_non_positive_price_is_rejected() {
        assert!(matches!(
            FullBalanceSizer.compute_quantity("BTCUSDT", dec!(1000), dec!(0), &btc_filters()),
            Err(ReconcileError::Gateway(GatewayError::InvalidResponse(_)))
        ));
    }

    #[test]
    fn test_negative_balance_is_insufficient() {
        assert!(matches!(
            FullBalanceSizer.compute_quantity("BTCUSDT", dec!(-5), dec!(100), &btc_filters()),
            Err(ReconcileError::InsufficientBalance { .. })
        ));
    }
}
