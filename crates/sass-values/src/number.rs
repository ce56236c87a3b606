use crate::units::{conversion_ratio, Unit};
use crate::{fuzzy, ValueError};

/// A SassScript number: a double together with a quotient of units.
///
/// Numbers compare and hash after conversion to the canonical unit of
/// each dimension, so `1in == 2.54cm` and both land in the same map
/// bucket. A unitless number never equals a unitful one.
#[derive(Debug, Clone)]
pub struct SassNumber {
    value: f64,
    numerators: Vec<Unit>,
    denominators: Vec<Unit>,
}

impl SassNumber {
    /// A unitless number.
    pub fn new(value: f64) -> Self {
        SassNumber {
            value,
            numerators: Vec::new(),
            denominators: Vec::new(),
        }
    }

    /// A number with a single numerator unit, such as `12px`.
    pub fn with_unit(value: f64, unit: impl AsRef<str>) -> Self {
        SassNumber {
            value,
            numerators: vec![Unit::new(unit)],
            denominators: Vec::new(),
        }
    }

    /// A number with an arbitrary unit quotient. Fails if a dimension
    /// appears in both the numerator and the denominator.
    pub fn with_units<N, D>(value: f64, numerators: N, denominators: D) -> Result<Self, ValueError>
    where
        N: IntoIterator,
        N::Item: AsRef<str>,
        D: IntoIterator,
        D::Item: AsRef<str>,
    {
        let numerators: Vec<Unit> = numerators.into_iter().map(Unit::new).collect();
        let denominators: Vec<Unit> = denominators.into_iter().map(Unit::new).collect();

        for numerator in &numerators {
            if let Some(denominator) = denominators
                .iter()
                .find(|denominator| numerator.compatible_with(denominator))
            {
                return Err(ValueError::ConflictingUnits(
                    numerator.name().to_string(),
                    denominator.name().to_string(),
                ));
            }
        }

        Ok(SassNumber {
            value,
            numerators,
            denominators,
        })
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn numerator_units(&self) -> impl Iterator<Item = &str> {
        self.numerators.iter().map(Unit::name)
    }

    pub fn denominator_units(&self) -> impl Iterator<Item = &str> {
        self.denominators.iter().map(Unit::name)
    }

    pub fn is_unitless(&self) -> bool {
        self.numerators.is_empty() && self.denominators.is_empty()
    }

    pub fn has_unit(&self, unit: &str) -> bool {
        let unit = Unit::new(unit);
        self.numerators.contains(&unit) || self.denominators.contains(&unit)
    }

    /// The sole numerator unit, when the number has exactly one unit.
    pub fn unit(&self) -> Option<&str> {
        match (&self.numerators[..], &self.denominators[..]) {
            ([unit], []) => Some(unit.name()),
            _ => None,
        }
    }

    /// This number expressed in the given units. Fails when the unit
    /// quotients span different dimensions.
    pub fn convert_to<N, D>(&self, numerators: N, denominators: D) -> Result<Self, ValueError>
    where
        N: IntoIterator,
        N::Item: AsRef<str>,
        D: IntoIterator,
        D::Item: AsRef<str>,
    {
        let target = SassNumber::with_units(self.value, numerators, denominators)?;
        let ratio = conversion_ratio(
            (&self.numerators[..], &self.denominators[..]),
            (&target.numerators[..], &target.denominators[..]),
        )
        .ok_or_else(|| {
            ValueError::IncompatibleUnits(self.unit_string(), target.unit_string())
        })?;

        Ok(SassNumber {
            value: self.value * ratio,
            numerators: target.numerators,
            denominators: target.denominators,
        })
    }

    /// The integer this number is sass-equal to, if any.
    pub fn assert_int(&self) -> Result<i64, ValueError> {
        fuzzy::as_int(self.value).ok_or(ValueError::NotAnInteger(self.value))
    }

    /// Clamp into the closed range `[min, max]` under sass-equality.
    pub fn assert_in_range(&self, min: f64, max: f64) -> Result<f64, ValueError> {
        fuzzy::clamp_within(self.value, min, max).ok_or(ValueError::OutOfRange {
            value: self.value,
            min,
            max,
        })
    }

    /// Clamp into the half-open range `[min, max)` under sass-equality.
    pub fn assert_in_half_open_range(&self, min: f64, max: f64) -> Result<f64, ValueError> {
        fuzzy::clamp_within_half_open(self.value, min, max).ok_or(ValueError::OutOfRange {
            value: self.value,
            min,
            max,
        })
    }

    /// A human-readable rendering of the unit quotient, for diagnostics.
    pub fn unit_string(&self) -> String {
        let numerators = self
            .numerators
            .iter()
            .map(Unit::name)
            .collect::<Vec<_>>()
            .join("*");
        let denominators = self
            .denominators
            .iter()
            .map(Unit::name)
            .collect::<Vec<_>>()
            .join("*");

        match (numerators.is_empty(), denominators.is_empty()) {
            (true, true) => String::new(),
            (false, true) => numerators,
            (true, false) => format!("(1/{denominators})"),
            (false, false) => format!("({numerators}/{denominators})"),
        }
    }

    // The value scaled to canonical units, with the sorted canonical
    // unit names of each side. Equal numbers have equal canonical forms.
    fn canonical_form(&self) -> (f64, Vec<&str>, Vec<&str>) {
        let mut value = self.value;
        let mut numerators = Vec::with_capacity(self.numerators.len());
        for unit in &self.numerators {
            value *= unit.canonical_factor();
            numerators.push(unit.canonical_name());
        }
        let mut denominators = Vec::with_capacity(self.denominators.len());
        for unit in &self.denominators {
            value /= unit.canonical_factor();
            denominators.push(unit.canonical_name());
        }
        numerators.sort_unstable();
        denominators.sort_unstable();
        (value, numerators, denominators)
    }
}

impl PartialEq for SassNumber {
    fn eq(&self, other: &Self) -> bool {
        let (value, numerators, denominators) = self.canonical_form();
        let (other_value, other_numerators, other_denominators) = other.canonical_form();
        numerators == other_numerators
            && denominators == other_denominators
            && fuzzy::equals(value, other_value)
    }
}

impl Eq for SassNumber {}

impl std::hash::Hash for SassNumber {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        use std::hash::Hash;

        let (value, numerators, denominators) = self.canonical_form();
        fuzzy::hash_code(value).hash(state);
        numerators.hash(state);
        denominators.hash(state);
    }
}
