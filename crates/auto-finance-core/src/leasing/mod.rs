pub mod comparison;
pub mod lease;
pub mod mileage;
