//! Greedy bucketing of ranked values into pie wedges.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

/// Smallest share of the running total a value needs to get its own wedge.
pub const DEFAULT_THRESHOLD: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Wedge sizes and labels, ordered for clockwise drawing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Wedges {
    pub sizes: Vec<Decimal>,
    pub labels: Vec<String>,
}

impl Wedges {
    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }
}

/// Buckets `values` (sorted by descending magnitude) into wedges.
///
/// Values are taken one by one while each is at least `threshold` of the
/// running total; the first value that falls short, if others follow it,
/// is folded with everything after it into a single long-tail wedge.
/// Labels carry each wedge's signed share of the final total, and sizes are
/// absolute values. A zero total leaves labels without shares.
pub fn wedges(values: Vec<(Decimal, String)>, threshold: Decimal) -> Wedges {
    let mut out: Vec<(Decimal, String)> = Vec::with_capacity(values.len());
    let mut total = Decimal::ZERO;
    let mut remaining = values.into_iter().peekable();

    while let Some((value, name)) = remaining.next() {
        let more_follow = remaining.peek().is_some();
        if total > Decimal::ZERO && value / total < threshold && more_follow {
            let rest: Vec<(Decimal, String)> = remaining.by_ref().collect();
            let count = rest.len() + 1;
            let tail: Decimal = value + rest.iter().map(|(v, _)| *v).sum::<Decimal>();
            out.push((
                tail,
                format!("long tail of {count} below {}", percent(threshold)),
            ));
            total += tail;
            break;
        }
        out.push((value, name));
        total += value;
    }

    let labelled = out.into_iter().map(|(value, name)| {
        let label = if total.is_zero() {
            name
        } else {
            format!("{name} ({})", percent(value / total))
        };
        (value.abs(), label)
    });

    // Renderers draw counter-clockwise; reversing yields clockwise order.
    let (mut sizes, mut labels): (Vec<_>, Vec<_>) = labelled.unzip();
    sizes.reverse();
    labels.reverse();
    Wedges { sizes, labels }
}

fn percent(fraction: Decimal) -> String {
    let pct = (fraction * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("{pct:.2}%")
}
