/// Arithmetic on counters that wrap around at their type's modulus
pub mod wrapping;
