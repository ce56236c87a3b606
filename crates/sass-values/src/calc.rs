use crate::SassNumber;
use std::sync::Arc;

/// The calculation functions the value tree can represent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CalculationKind {
    Calc,
    Min,
    Max,
    Clamp,
}

impl CalculationKind {
    pub fn name(&self) -> &'static str {
        match self {
            CalculationKind::Calc => "calc",
            CalculationKind::Min => "min",
            CalculationKind::Max => "max",
            CalculationKind::Clamp => "clamp",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "calc" => CalculationKind::Calc,
            "min" => CalculationKind::Min,
            "max" => CalculationKind::Max,
            "clamp" => CalculationKind::Clamp,
            _ => return None,
        })
    }
}

/// An unevaluated CSS calculation such as `calc(100% - 2px)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Calculation {
    kind: CalculationKind,
    arguments: Arc<[CalculationValue]>,
}

impl Calculation {
    pub fn new(kind: CalculationKind, arguments: impl IntoIterator<Item = CalculationValue>) -> Self {
        Calculation {
            kind,
            arguments: arguments.into_iter().collect(),
        }
    }

    /// A single-argument `calc(…)`.
    pub fn calc(argument: CalculationValue) -> Self {
        Self::new(CalculationKind::Calc, [argument])
    }

    pub fn kind(&self) -> CalculationKind {
        self.kind
    }

    pub fn arguments(&self) -> &[CalculationValue] {
        &self.arguments
    }
}

/// One operand inside a calculation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CalculationValue {
    Number(SassNumber),
    /// An unquoted string operand, such as a CSS variable reference.
    String(String),
    Interpolation(String),
    Operation(Arc<CalculationOperation>),
    Calculation(Calculation),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CalculationOperation {
    pub operator: CalculationOperator,
    pub left: CalculationValue,
    pub right: CalculationValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CalculationOperator {
    Plus,
    Minus,
    Times,
    DividedBy,
}
