mod decimal;

#[cfg(test)]
mod tests;

pub use decimal::{Decimal, DecimalParseError};
