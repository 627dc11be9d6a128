//! Order-book pricing.

use crate::types::{Order, OrderSide};

/// Lowest price among sell orders from sellers who are online or in game.
///
/// Returns `None` when no such order exists; an unpriced item has no
/// market and must never be costed as zero.
pub fn lowest_valid_sell_price(orders: &[Order]) -> Option<u64> {
    orders
        .iter()
        .filter(|o| o.side == OrderSide::Sell && o.seller_status.is_reachable())
        .map(|o| o.price)
        .min()
}
