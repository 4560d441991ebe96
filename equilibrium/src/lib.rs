use wasm_bindgen::prelude::*;

mod error;
mod market;
pub mod solver;
pub mod symbolic;
mod types;

pub use error::*;
pub use market::*;
pub use types::*;

// ============================================================================
// WASM API - Solver
// ============================================================================

/// Solve a market system handed over as a typed JS object.
#[wasm_bindgen(js_name = solveMarket)]
pub fn solve_market(input: MarketInput) -> Result<SolveOutput, JsError> {
    // Better panic messages in browser console
    console_error_panic_hook::set_once();

    input.solve().map_err(|e| JsError::new(&e.to_string()))
}

/// Same as `solveMarket`, for callers holding the parameters as JSON text.
#[wasm_bindgen(js_name = solveMarketJson)]
pub fn solve_market_json(input_json: &str) -> Result<SolveOutput, JsError> {
    console_error_panic_hook::set_once();

    MarketInput::from_json(input_json)
        .and_then(|input| input.solve())
        .map_err(|e| JsError::new(&e.to_string()))
}

/// Both solution sets of the `goods`-good closed form, as pasteable text.
#[wasm_bindgen(js_name = renderFormula)]
pub fn render_formula(goods: usize) -> Result<String, JsError> {
    symbolic::render(goods)
        .map(|f| f.solutions())
        .map_err(|e| JsError::new(&e.to_string()))
}
