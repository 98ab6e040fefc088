//! Deterministic ids for time-sliced node copies.
//!
//! A synthetic node represents "this original node, but specifically at this
//! year". The encoding packs `(base, year)` into one integer so the pair maps
//! to a unique id across all vintages and original ids.

use crate::store::NodeId;

/// Must exceed the digit width of any year value; years are at most four
/// digits in practice, but a 32-bit-safe margin costs nothing in an `i64`.
pub const YEAR_SPAN: i64 = 1_000_000;

/// Encodes `(base, year)` as `base * YEAR_SPAN + year`.
///
/// Injective for all `(base, year)` pairs with `0 <= year < YEAR_SPAN`, which
/// [`decode`] round-trips exactly (euclidean division keeps the year
/// component non-negative even for negative base ids).
pub fn encode(base: NodeId, year: i32) -> NodeId {
    debug_assert!((0..YEAR_SPAN).contains(&(year as i64)));
    NodeId(base.raw() * YEAR_SPAN + year as i64)
}

/// Recovers the `(base, year)` pair from a synthetic id.
pub fn decode(id: NodeId) -> (NodeId, i32) {
    (
        NodeId(id.raw().div_euclid(YEAR_SPAN)),
        id.raw().rem_euclid(YEAR_SPAN) as i32,
    )
}
