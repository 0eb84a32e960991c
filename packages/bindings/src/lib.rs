use auto_finance_core::EngineConfig;
use napi::Result as NapiResult;
use napi_derive::napi;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

/// Parse the optional engine configuration; absent means defaults.
fn engine_config(config_json: Option<String>) -> NapiResult<EngineConfig> {
    match config_json {
        Some(json) => EngineConfig::from_json(&json).map_err(to_napi_error),
        None => Ok(EngineConfig::default()),
    }
}

/// Deserialize the input, run one calculation, serialize its envelope.
fn run<I, O, E>(
    input_json: &str,
    config_json: Option<String>,
    calculate: impl FnOnce(&I, &EngineConfig) -> Result<O, E>,
) -> NapiResult<String>
where
    I: DeserializeOwned,
    O: Serialize,
    E: std::fmt::Display,
{
    let input: I = serde_json::from_str(input_json).map_err(to_napi_error)?;
    let config = engine_config(config_json)?;
    let output = calculate(&input, &config).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Credit
// ---------------------------------------------------------------------------

#[napi]
pub fn resolve_credit_tier(input_json: String, config_json: Option<String>) -> NapiResult<String> {
    run(
        &input_json,
        config_json,
        auto_finance_core::credit_tier::resolve_credit_tier,
    )
}

// ---------------------------------------------------------------------------
// Financing
// ---------------------------------------------------------------------------

#[napi]
pub fn financing_options(input_json: String, config_json: Option<String>) -> NapiResult<String> {
    run(
        &input_json,
        config_json,
        auto_finance_core::financing::amortization::calculate_financing_options,
    )
}

#[napi]
pub fn equity_timeline(input_json: String, config_json: Option<String>) -> NapiResult<String> {
    run(
        &input_json,
        config_json,
        auto_finance_core::financing::equity::project_equity_timeline,
    )
}

#[napi]
pub fn payment_breakdown(input_json: String, config_json: Option<String>) -> NapiResult<String> {
    run(
        &input_json,
        config_json,
        auto_finance_core::financing::breakdown::project_payment_breakdown,
    )
}

// ---------------------------------------------------------------------------
// Leasing
// ---------------------------------------------------------------------------

#[napi]
pub fn lease_options(input_json: String, config_json: Option<String>) -> NapiResult<String> {
    run(
        &input_json,
        config_json,
        auto_finance_core::leasing::lease::calculate_lease_options,
    )
}

#[napi]
pub fn lease_vs_buy(input_json: String, config_json: Option<String>) -> NapiResult<String> {
    run(
        &input_json,
        config_json,
        auto_finance_core::leasing::comparison::compare_lease_vs_buy,
    )
}

#[napi]
pub fn mileage_analysis(input_json: String, config_json: Option<String>) -> NapiResult<String> {
    run(
        &input_json,
        config_json,
        auto_finance_core::leasing::mileage::analyze_mileage,
    )
}

// ---------------------------------------------------------------------------
// Cash purchase and affordability
// ---------------------------------------------------------------------------

#[napi]
pub fn lump_sum_analysis(input_json: String, config_json: Option<String>) -> NapiResult<String> {
    run(
        &input_json,
        config_json,
        auto_finance_core::cash_purchase::lump_sum::analyze_lump_sum,
    )
}

#[napi]
pub fn affordability_score(input_json: String, config_json: Option<String>) -> NapiResult<String> {
    run(
        &input_json,
        config_json,
        auto_finance_core::affordability::scoring::score_affordability,
    )
}

// ---------------------------------------------------------------------------
// Scenario
// ---------------------------------------------------------------------------

#[napi]
pub fn build_scenario(input_json: String, config_json: Option<String>) -> NapiResult<String> {
    run(
        &input_json,
        config_json,
        auto_finance_core::scenario::build_scenario,
    )
}
