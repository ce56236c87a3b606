//! The host-side SassScript value tree.
//!
//! Values are immutable after construction and cheap to clone:
//! composite variants share contents through `Arc`. Equality and
//! hashing follow SassScript semantics rather than structural Rust
//! equality: strings compare without regard to quoting, numbers compare
//! after conversion to canonical units at ten decimal digits of
//! precision, and an empty list equals an empty map. The `Hash`
//! implementation is consistent with `Eq` across all of those rules,
//! so values work as map keys.

use std::hash::{Hash, Hasher};

mod args;
mod calc;
mod color;
mod function;
pub mod fuzzy;
mod list;
mod map;
mod number;
mod string;
mod units;

pub use args::ArgumentList;
pub use calc::{
    Calculation, CalculationKind, CalculationOperation, CalculationOperator, CalculationValue,
};
pub use color::{ColorSpace, SassColor};
pub use function::{CompilerFunction, HostFunction, Mixin};
pub use list::{ListSeparator, SassList};
pub use map::SassMap;
pub use number::SassNumber;
pub use string::SassString;
pub use units::Unit;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValueError {
    #[error("units {0} and {1} aren't compatible")]
    IncompatibleUnits(String, String),
    #[error("the {0} and {1} units share a dimension")]
    ConflictingUnits(String, String),
    #[error("{0} is not an integer")]
    NotAnInteger(f64),
    #[error("{value} must be within {min} and {max}")]
    OutOfRange { value: f64, min: f64, max: f64 },
    #[error("invalid index {index} for a {what} with {length} elements")]
    BadIndex {
        index: i64,
        length: usize,
        what: &'static str,
    },
    #[error("value is not a {expected}, it is a {actual}")]
    WrongType {
        expected: &'static str,
        actual: &'static str,
    },
}

/// A SassScript value.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    String(SassString),
    Number(SassNumber),
    Color(SassColor),
    List(SassList),
    Map(SassMap),
    ArgumentList(ArgumentList),
    CompilerFunction(CompilerFunction),
    HostFunction(HostFunction),
    Mixin(Mixin),
    Calculation(Calculation),
}

impl Value {
    /// Everything except `false` and `null` is truthy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Null | Value::Bool(false))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::String(_) => "string",
            Value::Number(_) => "number",
            Value::Color(_) => "color",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::ArgumentList(_) => "argument list",
            Value::CompilerFunction(_) => "function",
            Value::HostFunction(_) => "function",
            Value::Mixin(_) => "mixin",
            Value::Calculation(_) => "calculation",
        }
    }

    pub fn as_bool(&self) -> Result<bool, ValueError> {
        match self {
            Value::Bool(value) => Ok(*value),
            _ => Err(self.wrong_type("bool")),
        }
    }

    pub fn as_string(&self) -> Result<&SassString, ValueError> {
        match self {
            Value::String(string) => Ok(string),
            _ => Err(self.wrong_type("string")),
        }
    }

    pub fn as_number(&self) -> Result<&SassNumber, ValueError> {
        match self {
            Value::Number(number) => Ok(number),
            _ => Err(self.wrong_type("number")),
        }
    }

    pub fn as_color(&self) -> Result<&SassColor, ValueError> {
        match self {
            Value::Color(color) => Ok(color),
            _ => Err(self.wrong_type("color")),
        }
    }

    pub fn as_list(&self) -> Result<&SassList, ValueError> {
        match self {
            Value::List(list) => Ok(list),
            _ => Err(self.wrong_type("list")),
        }
    }

    pub fn as_map(&self) -> Result<&SassMap, ValueError> {
        match self {
            Value::Map(map) => Ok(map),
            _ => Err(self.wrong_type("map")),
        }
    }

    pub fn as_argument_list(&self) -> Result<&ArgumentList, ValueError> {
        match self {
            Value::ArgumentList(arguments) => Ok(arguments),
            _ => Err(self.wrong_type("argument list")),
        }
    }

    pub fn as_calculation(&self) -> Result<&Calculation, ValueError> {
        match self {
            Value::Calculation(calculation) => Ok(calculation),
            _ => Err(self.wrong_type("calculation")),
        }
    }

    fn wrong_type(&self, expected: &'static str) -> ValueError {
        ValueError::WrongType {
            expected,
            actual: self.type_name(),
        }
    }

    fn container_view(&self) -> Option<ContainerView<'_>> {
        match self {
            Value::List(list) => Some(ContainerView::List {
                contents: list.contents(),
                separator: list.separator(),
                brackets: list.has_brackets(),
            }),
            Value::ArgumentList(arguments) => Some(ContainerView::List {
                contents: arguments.contents(),
                separator: arguments.separator(),
                brackets: false,
            }),
            Value::Map(map) => Some(ContainerView::Map(map)),
            _ => None,
        }
    }
}

// Lists, argument lists, and maps share container equality: all empty
// containers are mutually equal, and an argument list compares as the
// list of its positional arguments (keywords are not part of equality).
enum ContainerView<'a> {
    List {
        contents: &'a [Value],
        separator: ListSeparator,
        brackets: bool,
    },
    Map(&'a SassMap),
}

impl ContainerView<'_> {
    fn is_empty(&self) -> bool {
        match self {
            ContainerView::List { contents, .. } => contents.is_empty(),
            ContainerView::Map(map) => map.is_empty(),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(left), Value::Bool(right)) => left == right,
            (Value::String(left), Value::String(right)) => left == right,
            (Value::Number(left), Value::Number(right)) => left == right,
            (Value::Color(left), Value::Color(right)) => left == right,
            (Value::CompilerFunction(left), Value::CompilerFunction(right)) => left == right,
            (Value::HostFunction(left), Value::HostFunction(right)) => left.id() == right.id(),
            (Value::Mixin(left), Value::Mixin(right)) => left == right,
            (Value::Calculation(left), Value::Calculation(right)) => left == right,
            _ => match (self.container_view(), other.container_view()) {
                (Some(left), Some(right)) => {
                    if left.is_empty() && right.is_empty() {
                        return true;
                    }
                    match (left, right) {
                        (
                            ContainerView::List {
                                contents: left_contents,
                                separator: left_separator,
                                brackets: left_brackets,
                            },
                            ContainerView::List {
                                contents: right_contents,
                                separator: right_separator,
                                brackets: right_brackets,
                            },
                        ) => {
                            left_separator == right_separator
                                && left_brackets == right_brackets
                                && left_contents == right_contents
                        }
                        (ContainerView::Map(left), ContainerView::Map(right)) => left == right,
                        _ => false,
                    }
                }
                _ => false,
            },
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Containers hash through their shared view so that all empty
        // containers collide with one another, per their equality.
        if let Some(view) = self.container_view() {
            if view.is_empty() {
                state.write_u8(9);
                return;
            }
            match view {
                ContainerView::List {
                    contents,
                    separator,
                    brackets,
                } => {
                    state.write_u8(10);
                    separator.hash(state);
                    brackets.hash(state);
                    contents.hash(state);
                }
                ContainerView::Map(map) => {
                    state.write_u8(11);
                    map::unordered_hash(state, map.iter());
                }
            }
            return;
        }

        match self {
            Value::Null => state.write_u8(0),
            Value::Bool(value) => {
                state.write_u8(1);
                value.hash(state);
            }
            Value::String(string) => {
                state.write_u8(2);
                string.hash(state);
            }
            Value::Number(number) => {
                state.write_u8(3);
                number.hash(state);
            }
            Value::Color(color) => {
                state.write_u8(4);
                color.hash(state);
            }
            Value::CompilerFunction(function) => {
                state.write_u8(5);
                function.id().hash(state);
            }
            Value::HostFunction(function) => {
                state.write_u8(6);
                function.id().hash(state);
            }
            Value::Mixin(mixin) => {
                state.write_u8(7);
                mixin.id().hash(state);
            }
            Value::Calculation(calculation) => {
                state.write_u8(8);
                calculation.hash(state);
            }
            Value::List(_) | Value::Map(_) | Value::ArgumentList(_) => {
                unreachable!("containers hash through their view")
            }
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(SassNumber::new(value))
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Value::String(SassString::quoted(text))
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Value::String(SassString::quoted(text))
    }
}

impl From<SassNumber> for Value {
    fn from(number: SassNumber) -> Self {
        Value::Number(number)
    }
}

impl From<SassColor> for Value {
    fn from(color: SassColor) -> Self {
        Value::Color(color)
    }
}

impl From<SassList> for Value {
    fn from(list: SassList) -> Self {
        Value::List(list)
    }
}

impl From<SassMap> for Value {
    fn from(map: SassMap) -> Self {
        Value::Map(map)
    }
}

impl From<Calculation> for Value {
    fn from(calculation: Calculation) -> Self {
        Value::Calculation(calculation)
    }
}
