//! Text rendering of the general closed form for a fixed number of goods.
//!
//! Goods are lettered `a, b, c, ...`; each has symbols `A I S R Q` with the
//! letter as suffix, plus the shared pool `P`. Output uses `*`, `**` and
//! `sqrt(...)` so it can be pasted into other code.

use crate::error::EquilibriumError;
use crate::market::Formulation;

const MAX_GOODS: usize = 26;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Formula {
    pub goods: usize,
    /// `Σ Ax*Rx*Sx - Σ Ix*Rx`
    pub numerator: String,
    /// `Σ Rx**2*Sx`
    pub denominator: String,
    /// Fully expanded quadratic form under the square root.
    pub discriminant: String,
}

pub fn render(goods: usize) -> Result<Formula, EquilibriumError> {
    if goods == 0 || goods > MAX_GOODS {
        return Err(EquilibriumError::Arity {
            formulation: Formulation::ProportionalSurplus,
            supported: "1 to 26",
            goods,
        });
    }
    let xs: Vec<char> = ('a'..='z').take(goods).collect();

    let mut numerator = Terms::default();
    for &x in &xs {
        numerator.push(true, format!("A{x}*R{x}*S{x}"));
    }
    for &x in &xs {
        numerator.push(false, format!("I{x}*R{x}"));
    }

    let mut denominator = Terms::default();
    for &x in &xs {
        denominator.push(true, format!("R{x}**2*S{x}"));
    }

    let mut disc = Terms::default();
    for (i, &x) in xs.iter().enumerate() {
        disc.push(true, format!("A{x}**2*R{x}**2*S{x}**2"));
        for &y in &xs[i + 1..] {
            disc.push(true, format!("2*A{x}*A{y}*R{x}*R{y}*S{x}*S{y}"));
        }
        for &y in &xs {
            disc.push(false, format!("2*A{x}*I{y}*{}*S{x}", capacity_product(x, y)));
        }
    }
    for (i, &x) in xs.iter().enumerate() {
        disc.push(true, format!("I{x}**2*R{x}**2"));
        for &y in &xs[i + 1..] {
            disc.push(true, format!("2*I{x}*I{y}*R{x}*R{y}"));
        }
    }
    for &x in &xs {
        disc.push(true, format!("2*P*R{x}**2*S{x}"));
    }

    Ok(Formula {
        goods,
        numerator: numerator.finish(),
        denominator: denominator.finish(),
        discriminant: disc.finish(),
    })
}

impl Formula {
    /// One line per good for the root with the given sign (`-` or `+`).
    pub fn root(&self, plus: bool) -> Vec<String> {
        let op = if plus { '+' } else { '-' };
        ('a'..='z')
            .take(self.goods)
            .map(|x| {
                format!(
                    "Q{x} = R{x}*({num})/({den}) {op} R{x}*sqrt({disc})/({den})",
                    num = self.numerator,
                    den = self.denominator,
                    disc = self.discriminant,
                )
            })
            .collect()
    }

    /// Both solution sets, minus root first, separated by a blank line.
    pub fn solutions(&self) -> String {
        [false, true]
            .map(|plus| {
                self.root(plus)
                    .into_iter()
                    .map(|line| line + "\n")
                    .collect::<String>()
            })
            .join("\n")
    }
}

fn capacity_product(x: char, y: char) -> String {
    match x.cmp(&y) {
        std::cmp::Ordering::Equal => format!("R{x}**2"),
        std::cmp::Ordering::Less => format!("R{x}*R{y}"),
        std::cmp::Ordering::Greater => format!("R{y}*R{x}"),
    }
}

#[derive(Default)]
struct Terms(String);

impl Terms {
    fn push(&mut self, positive: bool, term: String) {
        match (self.0.is_empty(), positive) {
            (true, true) => {}
            (true, false) => self.0.push('-'),
            (false, true) => self.0.push_str(" + "),
            (false, false) => self.0.push_str(" - "),
        }
        self.0.push_str(&term);
    }

    fn finish(self) -> String {
        self.0
    }
}
