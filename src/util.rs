/// Numeric conversion helpers.
///
/// Safe conversions between the engine's `f64` number representation and the
/// integer types used for indexing, bitwise operations, and lengths, plus
/// negative-index resolution shared by every indexable value type.
pub mod num;
