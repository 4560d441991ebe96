use std::fs;
use std::path::Path;

use anyhow::Context;
use equilibrium::MarketInput;

pub fn run(input: &Path) -> anyhow::Result<()> {
    let json = fs::read_to_string(input)
        .with_context(|| format!("reading market input {}", input.display()))?;
    let market = MarketInput::from_json(&json)
        .with_context(|| format!("parsing market input {}", input.display()))?;

    tracing::info!(
        goods = market.goods.len(),
        pool = market.pool,
        formulation = ?market.formulation,
        "solving"
    );
    let output = market.solve().context("no equilibrium for this market")?;

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
