pub mod affordability;
pub mod cash_purchase;
pub mod credit_tier;
pub mod financing;
pub mod leasing;
pub mod scenario;

use auto_finance_core::VehicleType;

pub(crate) fn vehicle_type(used: bool) -> VehicleType {
    if used {
        VehicleType::Used
    } else {
        VehicleType::New
    }
}
