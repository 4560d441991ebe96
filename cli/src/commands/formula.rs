use anyhow::Context;
use equilibrium::symbolic;

pub fn run(goods: usize) -> anyhow::Result<()> {
    let formula = symbolic::render(goods)
        .with_context(|| format!("rendering the {goods}-good split"))?;
    println!("{}", formula.solutions());
    Ok(())
}
