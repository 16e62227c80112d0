//! Pure reconciliation decision logic

use crate::common::types::{OrderType, PositionState, Side};

use super::types::{DesiredSignal, Operation, OrderQuantity, ReconciliationPlan};

/// Decide which operations move `current` towards `desired`.
///
/// Total over all inputs and free of I/O. Rules:
/// - no position reported: leverage is unknown, so `SetLeverage` precedes any open
/// - flat: `SetLeverage` when leverage differs, then open if the target is non-zero
/// - non-flat, target zero or opposite sign: close, `SetLeverage` if it differs,
///   then open unless the target is zero
/// - non-flat, same sign: nothing, whatever the magnitudes
pub fn reconcile(
    current: Option<&PositionState>,
    desired: &DesiredSignal,
    configured_leverage: u32,
    order_type: OrderType,
) -> ReconciliationPlan {
    let symbol = desired.symbol.as_str();
    let target_side = desired.side();
    let mut operations = Vec::with_capacity(3);

    let set_leverage = || Operation::SetLeverage {
        symbol: symbol.to_string(),
        leverage: configured_leverage,
    };

    match current {
        None => {
            if target_side.is_none() {
                return ReconciliationPlan::default();
            }
            operations.push(set_leverage());
        }
        Some(position) => match position.side() {
            None => {
                if position.leverage != configured_leverage {
                    operations.push(set_leverage());
                }
            }
            Some(held) => {
                if target_side == Some(held) {
                    return ReconciliationPlan::default();
                }

                operations.push(Operation::ClosePosition {
                    symbol: symbol.to_string(),
                    side: held.opposite(),
                    quantity: position.quantity(),
                    leverage: position.leverage,
                });
                if position.leverage != configured_leverage {
                    operations.push(set_leverage());
                }
            }
        },
    }

    if let Some(side) = target_side {
        operations.push(open(symbol, side, configured_leverage, order_type));
    }

    ReconciliationPlan::new(operations)
}

fn open(symbol: &str, side: Side, leverage: u32, order_type: OrderType) -> Operation {
    Operation::OpenPosition {
        symbol: symbol.to_string(),
        side,
        quantity: OrderQuantity::AllAvailableBalance,
        leverage,
        order_type,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    const SYMBOL: &str = "BTCUSDT";

    fn signal(size: Decimal) -> DesiredSignal {
        DesiredSignal::new(SYMBOL, size).unwrap()
    }

    fn position(amount: Decimal, leverage: u32) -> PositionState {
        PositionState::new(SYMBOL, amount, leverage)
    }

    fn set_leverage(leverage: u32) -> Operation {
        Operation::SetLeverage {
            symbol: SYMBOL.into(),
            leverage,
        }
    }

    fn close(side: Side, quantity: Decimal, leverage: u32) -> Operation {
        Operation::ClosePosition {
            symbol: SYMBOL.into(),
            side,
            quantity,
            leverage,
        }
    }

    fn open_market(side: Side, leverage: u32) -> Operation {
        open(SYMBOL, side, leverage, OrderType::Market)
    }

    fn plan_for(current: Option<PositionState>, target: Decimal, leverage: u32) -> Vec<Operation> {
        reconcile(current.as_ref(), &signal(target), leverage, OrderType::Market).operations
    }

    #[test]
    fn test_absent_position_and_flat_target_is_empty() {
        assert_eq!(plan_for(None, dec!(0), 10), vec![]);
    }

    #[test]
    fn test_absent_position_short_target_sets_leverage_then_opens() {
        assert_eq!(
            plan_for(None, dec!(-5), 10),
            vec![set_leverage(10), open_market(Side::Sell, 10)]
        );
    }

    #[test]
    fn test_flat_position_opens_without_close() {
        assert_eq!(
            plan_for(Some(position(dec!(0), 10)), dec!(1), 10),
            vec![open_market(Side::Buy, 10)]
        );
        assert_eq!(
            plan_for(Some(position(dec!(0), 3)), dec!(1), 10),
            vec![set_leverage(10), open_market(Side::Buy, 10)]
        );
    }

    #[test]
    fn test_flat_position_flat_target() {
        assert_eq!(plan_for(Some(position(dec!(0), 10)), dec!(0), 10), vec![]);
        // Leverage drift is still corrected while flat
        assert_eq!(
            plan_for(Some(position(dec!(0), 3)), dec!(0), 10),
            vec![set_leverage(10)]
        );
    }

    #[test]
    fn test_same_direction_is_left_untouched() {
        assert_eq!(plan_for(Some(position(dec!(2), 5)), dec!(100), 10), vec![]);
        assert_eq!(plan_for(Some(position(dec!(-2), 5)), dec!(-0.01), 10), vec![]);
    }

    #[test]
    fn test_flat_target_closes_long() {
        assert_eq!(
            plan_for(Some(position(dec!(2.0), 5)), dec!(0), 10),
            vec![close(Side::Sell, dec!(2.0), 5), set_leverage(10)]
        );
        assert_eq!(
            plan_for(Some(position(dec!(2.0), 10)), dec!(0), 10),
            vec![close(Side::Sell, dec!(2.0), 10)]
        );
    }

    #[test]
    fn test_reversal_closes_then_opens() {
        assert_eq!(
            plan_for(Some(position(dec!(-0.75), 10)), dec!(3), 10),
            vec![close(Side::Buy, dec!(0.75), 10), open_market(Side::Buy, 10)]
        );
        assert_eq!(
            plan_for(Some(position(dec!(1.5), 20)), dec!(-1), 10),
            vec![
                close(Side::Sell, dec!(1.5), 20),
                set_leverage(10),
                open_market(Side::Sell, 10)
            ]
        );
    }

    #[test]
    fn test_limit_order_type_is_carried() {
        let plan = reconcile(None, &signal(dec!(1)), 4, OrderType::Limit);
        assert_eq!(
            plan.operations[1],
            open(SYMBOL, Side::Buy, 4, OrderType::Limit)
        );
    }

    #[test]
    fn test_plan_shape_invariants_hold_for_all_inputs() {
        let amounts = [dec!(-3), dec!(-0.001), dec!(0), dec!(0.001), dec!(3)];
        let leverages = [1u32, 10];

        let mut currents: Vec<Option<PositionState>> = vec![None];
        for amount in amounts {
            for leverage in leverages {
                currents.push(Some(position(amount, leverage)));
            }
        }

        for current in &currents {
            for target in amounts {
                for configured in leverages {
                    let plan = reconcile(current.as_ref(), &signal(target), configured, OrderType::Market);

                    assert!(plan.closes() <= 1);
                    assert!(plan.opens() <= 1);
                    assert!(plan.leverage_changes() <= 1);

                    let index = |name: &str| plan.iter().position(|op| op.name() == name);
                    if let (Some(c), Some(l)) = (index("close_position"), index("set_leverage")) {
                        assert!(c < l);
                    }
                    if let (Some(l), Some(o)) = (index("set_leverage"), index("open_position")) {
                        assert!(l < o);
                    }

                    if let Some(p) = current {
                        if p.leverage == configured {
                            assert_eq!(plan.leverage_changes(), 0, "{:?} -> {}", p, target);
                        }
                    }
                    if target.is_zero() {
                        assert_eq!(plan.opens(), 0);
                    }
                }
            }
        }
    }
}
