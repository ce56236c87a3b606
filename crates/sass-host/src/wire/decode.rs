//! Wire messages to host types.

use crate::error::{CompilerFailure, Error};
use crate::results::{CompileResults, CompilerMessage, Location, MessageKind, Span, Versions};
use proto_sass::{self as proto, outbound_message};
use sass_values::{
    ArgumentList, Calculation, CalculationKind, CalculationOperation, CalculationOperator,
    CalculationValue, ColorSpace, CompilerFunction, ListSeparator, Mixin, SassColor, SassList,
    SassMap, SassNumber, SassString, Value,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use url::Url;

/// Decodes wire values, remembering every argument list it produced so
/// keyword accesses can be reported in the eventual call response.
pub(crate) struct Decoder {
    argument_lists: Vec<(u32, Arc<AtomicBool>)>,
}

impl Decoder {
    pub(crate) fn new() -> Self {
        Decoder {
            argument_lists: Vec::new(),
        }
    }

    /// Ids of decoded argument lists whose keywords have been read.
    pub(crate) fn accessed_argument_lists(&self) -> Vec<u32> {
        self.argument_lists
            .iter()
            .filter(|(_, accessed)| accessed.load(Ordering::SeqCst))
            .map(|(id, _)| *id)
            .collect()
    }

    pub(crate) fn value(&mut self, value: proto::Value) -> Result<Value, Error> {
        use proto::value::Value as Wire;

        let Some(wire) = value.value else {
            return Err(Error::protocol("value with no variant set"));
        };

        match wire {
            Wire::String(string) => Ok(Value::String(SassString::new(string.text, string.quoted))),
            Wire::Number(number) => self.number(number).map(Value::Number),
            Wire::Color(color) => {
                let space = ColorSpace::from_name(&color.space).ok_or_else(|| {
                    Error::protocol(format!("unknown color space {:?}", color.space))
                })?;
                Ok(Value::Color(SassColor::new(
                    space,
                    color.channel1,
                    color.channel2,
                    color.channel3,
                    color.alpha,
                )))
            }
            Wire::List(list) => {
                let separator = self.separator(list.separator)?;
                let contents = list
                    .contents
                    .into_iter()
                    .map(|element| self.value(element))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Value::List(SassList::new(
                    contents,
                    separator,
                    list.has_brackets,
                )))
            }
            Wire::Map(map) => {
                let mut entries = HashMap::with_capacity(map.entries.len());
                for entry in map.entries {
                    let key = entry
                        .key
                        .ok_or_else(|| Error::protocol("map entry with no key"))?;
                    let value = entry
                        .value
                        .ok_or_else(|| Error::protocol("map entry with no value"))?;
                    let key = self.value(key)?;
                    if entries.insert(key, self.value(value)?).is_some() {
                        return Err(Error::protocol("map with duplicate keys"));
                    }
                }
                Ok(Value::Map(SassMap::from(entries)))
            }
            Wire::Singleton(singleton) => {
                match proto::SingletonValue::try_from(singleton) {
                    Ok(proto::SingletonValue::True) => Ok(Value::Bool(true)),
                    Ok(proto::SingletonValue::False) => Ok(Value::Bool(false)),
                    Ok(proto::SingletonValue::Null) => Ok(Value::Null),
                    Err(_) => Err(Error::protocol(format!(
                        "unknown singleton value {singleton}"
                    ))),
                }
            }
            Wire::CompilerFunction(function) => {
                Ok(Value::CompilerFunction(CompilerFunction::new(function.id)))
            }
            // Host functions originate here and only travel outbound;
            // the compiler echoing one back is a protocol violation.
            Wire::HostFunction(function) => Err(Error::protocol(format!(
                "compiler sent a host function (id {})",
                function.id
            ))),
            Wire::CompilerMixin(mixin) => Ok(Value::Mixin(Mixin::new(mixin.id))),
            Wire::ArgumentList(arguments) => {
                let separator = self.separator(arguments.separator)?;
                let contents = arguments
                    .contents
                    .into_iter()
                    .map(|element| self.value(element))
                    .collect::<Result<Vec<_>, _>>()?;
                let keywords = arguments
                    .keywords
                    .into_iter()
                    .map(|(name, keyword)| Ok((name, self.value(keyword)?)))
                    .collect::<Result<Vec<_>, Error>>()?;

                let accessed = Arc::new(AtomicBool::new(false));
                self.argument_lists.push((arguments.id, accessed.clone()));

                Ok(Value::ArgumentList(
                    ArgumentList::new(contents, keywords, separator).with_keywords_observer(
                        move || accessed.store(true, Ordering::SeqCst),
                    ),
                ))
            }
            Wire::Calculation(calculation) => self.calculation(calculation).map(Value::Calculation),
        }
    }

    fn number(&self, number: proto::value::Number) -> Result<SassNumber, Error> {
        SassNumber::with_units(number.value, number.numerators, number.denominators)
            .map_err(|error| Error::protocol(format!("invalid number units: {error}")))
    }

    fn separator(&self, raw: i32) -> Result<ListSeparator, Error> {
        match proto::ListSeparator::try_from(raw) {
            Ok(proto::ListSeparator::Comma) => Ok(ListSeparator::Comma),
            Ok(proto::ListSeparator::Space) => Ok(ListSeparator::Space),
            Ok(proto::ListSeparator::Slash) => Ok(ListSeparator::Slash),
            Ok(proto::ListSeparator::Undecided) => Ok(ListSeparator::Undecided),
            Err(_) => Err(Error::protocol(format!("unknown list separator {raw}"))),
        }
    }

    fn calculation(
        &mut self,
        calculation: proto::value::Calculation,
    ) -> Result<Calculation, Error> {
        let kind = CalculationKind::from_name(&calculation.name).ok_or_else(|| {
            Error::protocol(format!("unknown calculation {:?}", calculation.name))
        })?;
        let arguments = calculation
            .arguments
            .into_iter()
            .map(|argument| self.calculation_value(argument))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Calculation::new(kind, arguments))
    }

    fn calculation_value(
        &mut self,
        value: proto::value::calculation::CalculationValue,
    ) -> Result<CalculationValue, Error> {
        use proto::value::calculation::calculation_value::Value as Wire;

        let Some(wire) = value.value else {
            return Err(Error::protocol("calculation value with no variant set"));
        };

        Ok(match wire {
            Wire::Number(number) => CalculationValue::Number(self.number(number)?),
            Wire::String(string) => CalculationValue::String(string),
            Wire::Interpolation(text) => CalculationValue::Interpolation(text),
            Wire::Operation(operation) => {
                let proto::value::calculation::CalculationOperation {
                    operator: raw_operator,
                    left,
                    right,
                } = *operation;
                let operator = match proto::CalculationOperator::try_from(raw_operator) {
                    Ok(proto::CalculationOperator::Plus) => CalculationOperator::Plus,
                    Ok(proto::CalculationOperator::Minus) => CalculationOperator::Minus,
                    Ok(proto::CalculationOperator::Times) => CalculationOperator::Times,
                    Ok(proto::CalculationOperator::Divide) => CalculationOperator::DividedBy,
                    Err(_) => {
                        return Err(Error::protocol(format!(
                            "unknown calculation operator {raw_operator}"
                        )))
                    }
                };
                let left = left
                    .ok_or_else(|| Error::protocol("calculation operation with no left operand"))?;
                let right = right
                    .ok_or_else(|| Error::protocol("calculation operation with no right operand"))?;
                CalculationValue::Operation(Arc::new(CalculationOperation {
                    operator,
                    left: self.calculation_value(*left)?,
                    right: self.calculation_value(*right)?,
                }))
            }
            Wire::Calculation(nested) => CalculationValue::Calculation(self.calculation(nested)?),
        })
    }
}

/// Translate a compile response into the submission's outcome. The
/// accumulated log messages are folded into whichever side resulted.
pub(crate) fn compile_response(
    response: outbound_message::CompileResponse,
    messages: Vec<CompilerMessage>,
) -> Result<Result<CompileResults, CompilerFailure>, Error> {
    use outbound_message::compile_response::Result as Wire;

    let loaded_urls = response
        .loaded_urls
        .into_iter()
        .map(|url| {
            Url::parse(&url)
                .map_err(|error| Error::protocol(format!("malformed loaded URL {url:?}: {error}")))
        })
        .collect::<Result<Vec<_>, _>>()?;

    match response.result {
        Some(Wire::Success(success)) => Ok(Ok(CompileResults {
            css: success.css,
            source_map: optional(success.source_map),
            messages,
            loaded_urls,
        })),
        Some(Wire::Failure(failure)) => Ok(Err(CompilerFailure {
            message: failure.message,
            span: failure.span.map(span),
            stack_trace: optional(failure.stack_trace),
            formatted: optional(failure.formatted),
            messages,
            loaded_urls,
        })),
        None => Err(Error::protocol("compile response with no result")),
    }
}

pub(crate) fn log_event(event: outbound_message::LogEvent) -> Result<CompilerMessage, Error> {
    let kind = match proto::LogEventType::try_from(event.r#type) {
        Ok(proto::LogEventType::Warning) => MessageKind::Warning,
        Ok(proto::LogEventType::DeprecationWarning) => MessageKind::DeprecationWarning,
        Ok(proto::LogEventType::Debug) => MessageKind::Debug,
        Err(_) => {
            return Err(Error::protocol(format!(
                "unknown log event type {}",
                event.r#type
            )))
        }
    };

    Ok(CompilerMessage {
        kind,
        message: event.message,
        span: event.span.map(span),
        stack_trace: optional(event.stack_trace),
        formatted: optional(event.formatted),
    })
}

pub(crate) fn span(span: proto::SourceSpan) -> Span {
    Span {
        text: optional(span.text),
        start: span.start.map(location),
        end: span.end.map(location),
        url: optional(span.url).and_then(|url| Url::parse(&url).ok()),
        context: optional(span.context),
    }
}

fn location(location: proto::source_span::SourceLocation) -> Location {
    Location {
        offset: location.offset,
        line: location.line,
        column: location.column,
    }
}

pub(crate) fn version_response(response: &outbound_message::VersionResponse) -> Versions {
    Versions {
        protocol_version: response.protocol_version.clone(),
        package_version: env!("CARGO_PKG_VERSION").to_string(),
        compiler_version: response.compiler_version.clone(),
        compiler_name: response.implementation_name.clone(),
    }
}

fn optional(text: String) -> Option<String> {
    (!text.is_empty()).then_some(text)
}
