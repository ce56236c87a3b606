//! Host types to wire messages.

use crate::options::{OutputStyle, Syntax};
use proto_sass as proto;
use sass_values::{
    Calculation, CalculationOperator, CalculationValue, ListSeparator, SassNumber, Value,
};

pub(crate) fn value(value: &Value) -> proto::Value {
    use proto::value::Value as Wire;

    let wire = match value {
        Value::Null => Wire::Singleton(proto::SingletonValue::Null as i32),
        Value::Bool(true) => Wire::Singleton(proto::SingletonValue::True as i32),
        Value::Bool(false) => Wire::Singleton(proto::SingletonValue::False as i32),
        Value::String(string) => Wire::String(proto::value::String {
            text: string.text().to_string(),
            quoted: string.is_quoted(),
        }),
        Value::Number(number) => Wire::Number(self::number(number)),
        Value::Color(color) => Wire::Color(proto::value::Color {
            space: color.space().name().to_string(),
            channel1: color.channel1(),
            channel2: color.channel2(),
            channel3: color.channel3(),
            alpha: color.alpha(),
        }),
        Value::List(list) => Wire::List(proto::value::List {
            separator: separator(list.separator()) as i32,
            has_brackets: list.has_brackets(),
            contents: list.iter().map(self::value).collect(),
        }),
        Value::Map(map) => Wire::Map(proto::value::Map {
            entries: map
                .iter()
                .map(|(key, entry)| proto::value::map::Entry {
                    key: Some(self::value(key)),
                    value: Some(self::value(entry)),
                })
                .collect(),
        }),
        Value::ArgumentList(arguments) => Wire::ArgumentList(proto::value::ArgumentList {
            // Host-constructed argument lists carry no wire id; only
            // ids minted by the compiler are meaningful to it.
            id: 0,
            separator: separator(arguments.separator()) as i32,
            contents: arguments.contents().iter().map(self::value).collect(),
            keywords: arguments
                .keywords_unobserved()
                .iter()
                .map(|(name, entry)| (name.clone(), self::value(entry)))
                .collect(),
        }),
        Value::CompilerFunction(function) => {
            Wire::CompilerFunction(proto::value::CompilerFunction { id: function.id() })
        }
        Value::HostFunction(function) => Wire::HostFunction(proto::value::HostFunction {
            id: function.id(),
            signature: function.signature().to_string(),
        }),
        Value::Mixin(mixin) => Wire::CompilerMixin(proto::value::CompilerMixin { id: mixin.id() }),
        Value::Calculation(calculation) => Wire::Calculation(self::calculation(calculation)),
    };

    proto::Value { value: Some(wire) }
}

fn number(number: &SassNumber) -> proto::value::Number {
    proto::value::Number {
        value: number.value(),
        numerators: number.numerator_units().map(str::to_string).collect(),
        denominators: number.denominator_units().map(str::to_string).collect(),
    }
}

fn calculation(calculation: &Calculation) -> proto::value::Calculation {
    proto::value::Calculation {
        name: calculation.kind().name().to_string(),
        arguments: calculation
            .arguments()
            .iter()
            .map(calculation_value)
            .collect(),
    }
}

fn calculation_value(
    value: &CalculationValue,
) -> proto::value::calculation::CalculationValue {
    use proto::value::calculation::calculation_value::Value as Wire;

    let wire = match value {
        CalculationValue::Number(number) => Wire::Number(self::number(number)),
        CalculationValue::String(string) => Wire::String(string.clone()),
        CalculationValue::Interpolation(text) => Wire::Interpolation(text.clone()),
        CalculationValue::Operation(operation) => {
            Wire::Operation(Box::new(proto::value::calculation::CalculationOperation {
                operator: operator(operation.operator) as i32,
                left: Some(Box::new(calculation_value(&operation.left))),
                right: Some(Box::new(calculation_value(&operation.right))),
            }))
        }
        CalculationValue::Calculation(nested) => Wire::Calculation(calculation(nested)),
    };

    proto::value::calculation::CalculationValue { value: Some(wire) }
}

fn operator(operator: CalculationOperator) -> proto::CalculationOperator {
    match operator {
        CalculationOperator::Plus => proto::CalculationOperator::Plus,
        CalculationOperator::Minus => proto::CalculationOperator::Minus,
        CalculationOperator::Times => proto::CalculationOperator::Times,
        CalculationOperator::DividedBy => proto::CalculationOperator::Divide,
    }
}

pub(crate) fn separator(separator: ListSeparator) -> proto::ListSeparator {
    match separator {
        ListSeparator::Comma => proto::ListSeparator::Comma,
        ListSeparator::Space => proto::ListSeparator::Space,
        ListSeparator::Slash => proto::ListSeparator::Slash,
        ListSeparator::Undecided => proto::ListSeparator::Undecided,
    }
}

pub(crate) fn syntax(syntax: Syntax) -> proto::Syntax {
    match syntax {
        Syntax::Scss => proto::Syntax::Scss,
        Syntax::Indented => proto::Syntax::Indented,
        Syntax::Css => proto::Syntax::Css,
    }
}

pub(crate) fn output_style(style: OutputStyle) -> proto::OutputStyle {
    match style {
        OutputStyle::Expanded => proto::OutputStyle::Expanded,
        OutputStyle::Compressed => proto::OutputStyle::Compressed,
        OutputStyle::Nested => proto::OutputStyle::Nested,
        OutputStyle::Compact => proto::OutputStyle::Compact,
    }
}
