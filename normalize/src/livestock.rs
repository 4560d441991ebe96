use rusqlite::{Connection, params};

use crate::config::NormalizeConfig;
use crate::error::StoreResult;

/// Daily output equivalent to turning `input` into `yearly_output` over
/// `days` days of compounding: `input * (yearly_output / input)^(1/days)`.
pub fn daily_rate(input: f64, yearly_output: f64, days: f64) -> Option<f64> {
    if input == 0.0 {
        return None;
    }
    let rate = input * (yearly_output / input).powf(1.0 / days);
    rate.is_finite().then_some(rate)
}

struct Pairing {
    business: i64,
    mode: i64,
    good: i64,
    output: f64,
    input: Option<f64>,
}

/// Convert the livestock business's yearly outputs to daily amounts.
///
/// Each output is paired with the input of the same (business, mode, good).
/// Outputs without a usable input are left alone. Running this twice
/// rescales twice.
pub fn rescale_livestock(conn: &Connection, cfg: &NormalizeConfig) -> StoreResult<usize> {
    let pairings = conn
        .prepare(
            "SELECT o.business_id, o.mode, o.good_id, o.amount, i.amount
             FROM outputs o
             LEFT JOIN inputs i
               ON i.business_id = o.business_id AND i.mode = o.mode AND i.good_id = o.good_id
             WHERE o.business_id = ?1 AND o.good_id BETWEEN ?2 AND ?3
             ORDER BY o.business_id, o.mode, o.good_id",
        )?
        .query_map(
            params![
                cfg.livestock_business,
                cfg.livestock_goods.start(),
                cfg.livestock_goods.end()
            ],
            |r| {
                Ok(Pairing {
                    business: r.get(0)?,
                    mode: r.get(1)?,
                    good: r.get(2)?,
                    output: r.get(3)?,
                    input: r.get(4)?,
                })
            },
        )?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let mut update = conn.prepare(
        "UPDATE outputs SET amount = ?1 WHERE business_id = ?2 AND mode = ?3 AND good_id = ?4",
    )?;
    let mut rescaled = 0;
    for p in pairings {
        let Some(daily) = p
            .input
            .and_then(|input| daily_rate(input, p.output, cfg.days_per_year))
        else {
            tracing::warn!(
                target: "livestock",
                business_id = p.business,
                mode = p.mode,
                good_id = p.good,
                output = p.output,
                "no usable input amount; output left as is"
            );
            continue;
        };

        update.execute(params![daily, p.business, p.mode, p.good])?;
        rescaled += 1;

        tracing::info!(
            target: "livestock",
            business_id = p.business,
            mode = p.mode,
            good_id = p.good,
            before = p.output,
            after = daily,
        );
    }

    tracing::info!(target: "normalize", step = "rescale", table = "outputs", rows = rescaled as u64);
    Ok(rescaled)
}
