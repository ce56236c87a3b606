//! Protocol buffer types for the Embedded Sass protocol.
//!
//! The wire format is a fixed four-byte little-endian length header
//! followed by an encoded [`InboundMessage`] (host to compiler) or
//! [`OutboundMessage`] (compiler to host). Framing lives with the I/O
//! layer; this crate is only the message schema.

mod embedded_sass;

pub use embedded_sass::*;

#[cfg(test)]
mod test {
    use super::*;
    use prost::Message;

    #[test]
    fn test_round_trip_compile_request() {
        let request = InboundMessage {
            message: Some(inbound_message::Message::CompileRequest(
                inbound_message::CompileRequest {
                    id: 4000,
                    input: Some(inbound_message::compile_request::Input::String(
                        inbound_message::compile_request::StringInput {
                            source: "a { b: c }".to_string(),
                            url: String::new(),
                            syntax: Syntax::Scss as i32,
                            importer: None,
                        },
                    )),
                    style: OutputStyle::Compressed as i32,
                    source_map: true,
                    ..Default::default()
                },
            )),
        };

        let bytes = request.encode_to_vec();
        let decoded = InboundMessage::decode(bytes.as_slice()).unwrap();
        assert_eq!(request, decoded);
    }

    #[test]
    fn test_round_trip_recursive_value() {
        use value::calculation::{calculation_value, CalculationOperation, CalculationValue};

        // min(1px, 2px + 3px), nested through an operation.
        let operation = CalculationValue {
            value: Some(calculation_value::Value::Operation(Box::new(
                CalculationOperation {
                    operator: CalculationOperator::Plus as i32,
                    left: Some(Box::new(CalculationValue {
                        value: Some(calculation_value::Value::Number(value::Number {
                            value: 2.0,
                            numerators: vec!["px".to_string()],
                            denominators: vec![],
                        })),
                    })),
                    right: Some(Box::new(CalculationValue {
                        value: Some(calculation_value::Value::Number(value::Number {
                            value: 3.0,
                            numerators: vec!["px".to_string()],
                            denominators: vec![],
                        })),
                    })),
                },
            ))),
        };
        let calculation = Value {
            value: Some(value::Value::Calculation(value::Calculation {
                name: "min".to_string(),
                arguments: vec![
                    CalculationValue {
                        value: Some(calculation_value::Value::Number(value::Number {
                            value: 1.0,
                            numerators: vec!["px".to_string()],
                            denominators: vec![],
                        })),
                    },
                    operation,
                ],
            })),
        };

        let bytes = calculation.encode_to_vec();
        assert_eq!(Value::decode(bytes.as_slice()).unwrap(), calculation);
    }

    #[test]
    fn test_empty_message_decodes_to_default() {
        let decoded = OutboundMessage::decode(&[] as &[u8]).unwrap();
        assert_eq!(decoded, OutboundMessage::default());
        assert!(decoded.message.is_none());
    }

    #[test]
    fn test_unknown_enum_discriminants_are_preserved() {
        let list = Value {
            value: Some(value::Value::List(value::List {
                separator: 17,
                has_brackets: false,
                contents: vec![],
            })),
        };
        let decoded = Value::decode(list.encode_to_vec().as_slice()).unwrap();
        let Some(value::Value::List(decoded)) = decoded.value else {
            panic!("expected a list");
        };
        // Out-of-range discriminants survive the trip; rejecting them is
        // the adapter's job.
        assert_eq!(decoded.separator, 17);
        assert!(ListSeparator::try_from(decoded.separator).is_err());
    }
}
