//! Units and the dimension table.
//!
//! A dimension groups compatible units, each defined by its ratio to the
//! dimension's canonical unit. Units outside the table are opaque: their
//! dimension is their own name and they convert only to themselves.

use std::f64::consts::PI;

/// A single named unit, stored lowercased.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Unit(String);

impl Unit {
    pub fn new(name: impl AsRef<str>) -> Self {
        Unit(name.as_ref().to_ascii_lowercase())
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    /// The canonical unit name of this unit's dimension, or the unit's
    /// own name when it is not in the table.
    pub(crate) fn canonical_name(&self) -> &str {
        match lookup(&self.0) {
            Some((dimension, _)) => dimension.canonical,
            None => &self.0,
        }
    }

    /// How many canonical units one of this unit is worth.
    pub(crate) fn canonical_factor(&self) -> f64 {
        match lookup(&self.0) {
            Some((_, factor)) => factor,
            None => 1.0,
        }
    }

    /// Units are compatible when they share a dimension. An unknown
    /// unit's dimension is its own name.
    pub(crate) fn compatible_with(&self, other: &Unit) -> bool {
        self.canonical_name() == other.canonical_name()
    }
}

impl std::fmt::Display for Unit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

struct Dimension {
    canonical: &'static str,
    units: &'static [(&'static str, f64)],
}

static DIMENSIONS: [Dimension; 5] = [
    Dimension {
        canonical: "px",
        units: &[
            ("px", 1.0),
            ("cm", 96.0 / 2.54),
            ("mm", 96.0 / 25.4),
            ("q", 96.0 / (25.4 * 4.0)),
            ("in", 96.0),
            ("pc", 96.0 / 6.0),
            ("pt", 96.0 / 72.0),
        ],
    },
    Dimension {
        canonical: "deg",
        units: &[
            ("deg", 1.0),
            ("grad", 360.0 / 400.0),
            ("rad", 360.0 / (2.0 * PI)),
            ("turn", 360.0),
        ],
    },
    Dimension {
        canonical: "s",
        units: &[("s", 1.0), ("ms", 1.0 / 1000.0)],
    },
    Dimension {
        canonical: "hz",
        units: &[("hz", 1.0), ("khz", 1000.0)],
    },
    Dimension {
        canonical: "dppx",
        units: &[
            ("dppx", 1.0),
            ("dpi", 1.0 / 96.0),
            ("dpcm", 2.54 / 96.0),
            ("x", 1.0),
        ],
    },
];

fn lookup(name: &str) -> Option<(&'static Dimension, f64)> {
    DIMENSIONS.iter().find_map(|dimension| {
        dimension
            .units
            .iter()
            .find(|(unit, _)| *unit == name)
            .map(|(_, factor)| (dimension, *factor))
    })
}

/// The multiplier converting a value in `from` units into `to` units,
/// or None when the two quotients span different dimensions.
pub(crate) fn conversion_ratio(
    from: (&[Unit], &[Unit]),
    to: (&[Unit], &[Unit]),
) -> Option<f64> {
    let numerator = pairing_factor(from.0, to.0)?;
    let denominator = pairing_factor(from.1, to.1)?;
    Some(numerator / denominator)
}

// Pair each `from` unit with a dimension-compatible `to` unit. Any
// bijection yields the same overall factor (the product of canonical
// factors is independent of the pairing), so a greedy match suffices.
fn pairing_factor(from: &[Unit], to: &[Unit]) -> Option<f64> {
    if from.len() != to.len() {
        return None;
    }
    let mut unmatched: Vec<&Unit> = to.iter().collect();
    let mut factor = 1.0;
    for unit in from {
        let index = unmatched
            .iter()
            .position(|candidate| unit.compatible_with(candidate))?;
        let paired = unmatched.swap_remove(index);
        factor *= unit.canonical_factor() / paired.canonical_factor();
    }
    Some(factor)
}
