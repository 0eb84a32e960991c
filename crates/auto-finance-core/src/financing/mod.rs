pub mod amortization;
pub mod breakdown;
pub mod equity;
