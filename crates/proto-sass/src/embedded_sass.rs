// Message types of the Embedded Sass protocol. These mirror
// embedded_sass.proto at the crate root and are the schema of record
// for this workspace; field tags must never be renumbered.

/// Messages sent from the host to the compiler.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct InboundMessage {
    #[prost(oneof = "inbound_message::Message", tags = "2, 3, 4, 5, 6, 7")]
    pub message: ::core::option::Option<inbound_message::Message>,
}

pub mod inbound_message {
    /// Requests the compiler's version metadata. Sent once per child
    /// process with a reserved id, before any compilation.
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct VersionRequest {
        #[prost(uint32, tag = "1")]
        pub id: u32,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct CompileRequest {
        #[prost(uint32, tag = "1")]
        pub id: u32,
        #[prost(oneof = "compile_request::Input", tags = "2, 3")]
        pub input: ::core::option::Option<compile_request::Input>,
        #[prost(enumeration = "super::OutputStyle", tag = "4")]
        pub style: i32,
        #[prost(bool, tag = "5")]
        pub source_map: bool,
        #[prost(message, repeated, tag = "6")]
        pub importers: ::prost::alloc::vec::Vec<compile_request::Importer>,
        #[prost(string, repeated, tag = "7")]
        pub global_functions: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
        #[prost(bool, tag = "8")]
        pub alert_color: bool,
        #[prost(bool, tag = "9")]
        pub alert_ascii: bool,
        #[prost(bool, tag = "10")]
        pub source_map_include_sources: bool,
    }

    pub mod compile_request {
        #[derive(Clone, PartialEq, ::prost::Message)]
        pub struct StringInput {
            #[prost(string, tag = "1")]
            pub source: ::prost::alloc::string::String,
            #[prost(string, tag = "2")]
            pub url: ::prost::alloc::string::String,
            #[prost(enumeration = "super::super::Syntax", tag = "3")]
            pub syntax: i32,
            #[prost(message, optional, tag = "4")]
            pub importer: ::core::option::Option<Importer>,
        }

        #[derive(Clone, PartialEq, ::prost::Message)]
        pub struct Importer {
            #[prost(oneof = "importer::Importer", tags = "1, 2")]
            pub importer: ::core::option::Option<importer::Importer>,
        }

        pub mod importer {
            #[derive(Clone, PartialEq, ::prost::Oneof)]
            pub enum Importer {
                /// A load path on disk, resolved entirely by the compiler.
                #[prost(string, tag = "1")]
                Path(::prost::alloc::string::String),
                /// A host importer, addressed by its per-compilation id.
                #[prost(uint32, tag = "2")]
                ImporterId(u32),
            }
        }

        #[derive(Clone, PartialEq, ::prost::Oneof)]
        pub enum Input {
            #[prost(message, tag = "2")]
            String(StringInput),
            #[prost(string, tag = "3")]
            Path(::prost::alloc::string::String),
        }
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct CanonicalizeResponse {
        #[prost(uint32, tag = "1")]
        pub id: u32,
        #[prost(oneof = "canonicalize_response::Result", tags = "2, 3")]
        pub result: ::core::option::Option<canonicalize_response::Result>,
    }

    pub mod canonicalize_response {
        #[derive(Clone, PartialEq, ::prost::Oneof)]
        pub enum Result {
            #[prost(string, tag = "2")]
            Url(::prost::alloc::string::String),
            #[prost(string, tag = "3")]
            Error(::prost::alloc::string::String),
        }
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct ImportResponse {
        #[prost(uint32, tag = "1")]
        pub id: u32,
        #[prost(oneof = "import_response::Result", tags = "2, 3")]
        pub result: ::core::option::Option<import_response::Result>,
    }

    pub mod import_response {
        #[derive(Clone, PartialEq, ::prost::Message)]
        pub struct ImportSuccess {
            #[prost(string, tag = "1")]
            pub contents: ::prost::alloc::string::String,
            #[prost(enumeration = "super::super::Syntax", tag = "2")]
            pub syntax: i32,
            #[prost(string, tag = "3")]
            pub source_map_url: ::prost::alloc::string::String,
        }

        #[derive(Clone, PartialEq, ::prost::Oneof)]
        pub enum Result {
            #[prost(message, tag = "2")]
            Success(ImportSuccess),
            #[prost(string, tag = "3")]
            Error(::prost::alloc::string::String),
        }
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct FileImportResponse {
        #[prost(uint32, tag = "1")]
        pub id: u32,
        #[prost(oneof = "file_import_response::Result", tags = "2, 3")]
        pub result: ::core::option::Option<file_import_response::Result>,
    }

    pub mod file_import_response {
        #[derive(Clone, PartialEq, ::prost::Oneof)]
        pub enum Result {
            #[prost(string, tag = "2")]
            FileUrl(::prost::alloc::string::String),
            #[prost(string, tag = "3")]
            Error(::prost::alloc::string::String),
        }
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct FunctionCallResponse {
        #[prost(uint32, tag = "1")]
        pub id: u32,
        #[prost(oneof = "function_call_response::Result", tags = "2, 3")]
        pub result: ::core::option::Option<function_call_response::Result>,
        /// Ids of argument lists whose keywords were read by the function.
        #[prost(uint32, repeated, tag = "4")]
        pub accessed_argument_lists: ::prost::alloc::vec::Vec<u32>,
    }

    pub mod function_call_response {
        #[derive(Clone, PartialEq, ::prost::Oneof)]
        pub enum Result {
            #[prost(message, tag = "2")]
            Success(super::super::Value),
            #[prost(string, tag = "3")]
            Error(::prost::alloc::string::String),
        }
    }

    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Message {
        #[prost(message, tag = "2")]
        CompileRequest(CompileRequest),
        #[prost(message, tag = "3")]
        CanonicalizeResponse(CanonicalizeResponse),
        #[prost(message, tag = "4")]
        ImportResponse(ImportResponse),
        #[prost(message, tag = "5")]
        FileImportResponse(FileImportResponse),
        #[prost(message, tag = "6")]
        FunctionCallResponse(FunctionCallResponse),
        #[prost(message, tag = "7")]
        VersionRequest(VersionRequest),
    }
}

/// Messages sent from the compiler to the host.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct OutboundMessage {
    #[prost(oneof = "outbound_message::Message", tags = "1, 2, 3, 4, 5, 6, 7, 8")]
    pub message: ::core::option::Option<outbound_message::Message>,
}

pub mod outbound_message {
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct VersionResponse {
        #[prost(uint32, tag = "1")]
        pub id: u32,
        #[prost(string, tag = "2")]
        pub protocol_version: ::prost::alloc::string::String,
        #[prost(string, tag = "3")]
        pub compiler_version: ::prost::alloc::string::String,
        #[prost(string, tag = "4")]
        pub implementation_version: ::prost::alloc::string::String,
        #[prost(string, tag = "5")]
        pub implementation_name: ::prost::alloc::string::String,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct CompileResponse {
        #[prost(uint32, tag = "1")]
        pub id: u32,
        #[prost(oneof = "compile_response::Result", tags = "2, 3")]
        pub result: ::core::option::Option<compile_response::Result>,
        /// Canonical URLs loaded during the compilation, in load order.
        #[prost(string, repeated, tag = "4")]
        pub loaded_urls: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
    }

    pub mod compile_response {
        #[derive(Clone, PartialEq, ::prost::Message)]
        pub struct CompileSuccess {
            #[prost(string, tag = "1")]
            pub css: ::prost::alloc::string::String,
            #[prost(string, tag = "2")]
            pub source_map: ::prost::alloc::string::String,
        }

        #[derive(Clone, PartialEq, ::prost::Message)]
        pub struct CompileFailure {
            #[prost(string, tag = "1")]
            pub message: ::prost::alloc::string::String,
            #[prost(message, optional, tag = "2")]
            pub span: ::core::option::Option<super::super::SourceSpan>,
            #[prost(string, tag = "3")]
            pub stack_trace: ::prost::alloc::string::String,
            #[prost(string, tag = "4")]
            pub formatted: ::prost::alloc::string::String,
        }

        #[derive(Clone, PartialEq, ::prost::Oneof)]
        pub enum Result {
            #[prost(message, tag = "2")]
            Success(CompileSuccess),
            #[prost(message, tag = "3")]
            Failure(CompileFailure),
        }
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct LogEvent {
        #[prost(uint32, tag = "1")]
        pub compilation_id: u32,
        #[prost(enumeration = "super::LogEventType", tag = "2")]
        pub r#type: i32,
        #[prost(string, tag = "3")]
        pub message: ::prost::alloc::string::String,
        #[prost(message, optional, tag = "4")]
        pub span: ::core::option::Option<super::SourceSpan>,
        #[prost(string, tag = "5")]
        pub stack_trace: ::prost::alloc::string::String,
        #[prost(string, tag = "6")]
        pub formatted: ::prost::alloc::string::String,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct CanonicalizeRequest {
        #[prost(uint32, tag = "1")]
        pub id: u32,
        #[prost(uint32, tag = "2")]
        pub compilation_id: u32,
        #[prost(uint32, tag = "3")]
        pub importer_id: u32,
        #[prost(string, tag = "4")]
        pub url: ::prost::alloc::string::String,
        #[prost(bool, tag = "5")]
        pub from_import: bool,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct ImportRequest {
        #[prost(uint32, tag = "1")]
        pub id: u32,
        #[prost(uint32, tag = "2")]
        pub compilation_id: u32,
        #[prost(uint32, tag = "3")]
        pub importer_id: u32,
        #[prost(string, tag = "4")]
        pub url: ::prost::alloc::string::String,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct FileImportRequest {
        #[prost(uint32, tag = "1")]
        pub id: u32,
        #[prost(uint32, tag = "2")]
        pub compilation_id: u32,
        #[prost(uint32, tag = "3")]
        pub importer_id: u32,
        #[prost(string, tag = "4")]
        pub url: ::prost::alloc::string::String,
        #[prost(bool, tag = "5")]
        pub from_import: bool,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct FunctionCallRequest {
        #[prost(uint32, tag = "1")]
        pub id: u32,
        #[prost(uint32, tag = "2")]
        pub compilation_id: u32,
        #[prost(oneof = "function_call_request::Identifier", tags = "3, 4")]
        pub identifier: ::core::option::Option<function_call_request::Identifier>,
        #[prost(message, repeated, tag = "5")]
        pub arguments: ::prost::alloc::vec::Vec<super::Value>,
    }

    pub mod function_call_request {
        #[derive(Clone, PartialEq, ::prost::Oneof)]
        pub enum Identifier {
            /// A function declared by signature in the compile request.
            #[prost(string, tag = "3")]
            Name(::prost::alloc::string::String),
            /// A dynamic host function passed by value during this run.
            #[prost(uint32, tag = "4")]
            FunctionId(u32),
        }
    }

    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Message {
        #[prost(message, tag = "1")]
        Error(super::ProtocolError),
        #[prost(message, tag = "2")]
        CompileResponse(CompileResponse),
        #[prost(message, tag = "3")]
        LogEvent(LogEvent),
        #[prost(message, tag = "4")]
        CanonicalizeRequest(CanonicalizeRequest),
        #[prost(message, tag = "5")]
        ImportRequest(ImportRequest),
        #[prost(message, tag = "6")]
        FileImportRequest(FileImportRequest),
        #[prost(message, tag = "7")]
        FunctionCallRequest(FunctionCallRequest),
        #[prost(message, tag = "8")]
        VersionResponse(VersionResponse),
    }
}

/// An error in the protocol itself, as opposed to a failed compilation.
/// Carries no compilation id and is fatal to the session.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtocolError {
    #[prost(enumeration = "ProtocolErrorType", tag = "1")]
    pub r#type: i32,
    #[prost(uint32, tag = "2")]
    pub id: u32,
    #[prost(string, tag = "3")]
    pub message: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SourceSpan {
    #[prost(string, tag = "1")]
    pub text: ::prost::alloc::string::String,
    #[prost(message, optional, tag = "2")]
    pub start: ::core::option::Option<source_span::SourceLocation>,
    #[prost(message, optional, tag = "3")]
    pub end: ::core::option::Option<source_span::SourceLocation>,
    #[prost(string, tag = "4")]
    pub url: ::prost::alloc::string::String,
    #[prost(string, tag = "5")]
    pub context: ::prost::alloc::string::String,
}

pub mod source_span {
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct SourceLocation {
        #[prost(uint32, tag = "1")]
        pub offset: u32,
        #[prost(uint32, tag = "2")]
        pub line: u32,
        #[prost(uint32, tag = "3")]
        pub column: u32,
    }
}

/// A SassScript value, as passed to and returned from host functions.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Value {
    #[prost(oneof = "value::Value", tags = "1, 2, 3, 5, 6, 7, 8, 9, 10, 12, 13")]
    pub value: ::core::option::Option<value::Value>,
}

pub mod value {
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct String {
        #[prost(string, tag = "1")]
        pub text: ::prost::alloc::string::String,
        #[prost(bool, tag = "2")]
        pub quoted: bool,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Number {
        #[prost(double, tag = "1")]
        pub value: f64,
        #[prost(string, repeated, tag = "2")]
        pub numerators: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
        #[prost(string, repeated, tag = "3")]
        pub denominators: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
    }

    /// Channels use proto3 presence; an absent channel is "missing".
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Color {
        #[prost(string, tag = "1")]
        pub space: ::prost::alloc::string::String,
        #[prost(double, optional, tag = "2")]
        pub channel1: ::core::option::Option<f64>,
        #[prost(double, optional, tag = "3")]
        pub channel2: ::core::option::Option<f64>,
        #[prost(double, optional, tag = "4")]
        pub channel3: ::core::option::Option<f64>,
        #[prost(double, optional, tag = "5")]
        pub alpha: ::core::option::Option<f64>,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct List {
        #[prost(enumeration = "super::ListSeparator", tag = "1")]
        pub separator: i32,
        #[prost(bool, tag = "2")]
        pub has_brackets: bool,
        #[prost(message, repeated, tag = "3")]
        pub contents: ::prost::alloc::vec::Vec<super::Value>,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Map {
        #[prost(message, repeated, tag = "1")]
        pub entries: ::prost::alloc::vec::Vec<map::Entry>,
    }

    pub mod map {
        #[derive(Clone, PartialEq, ::prost::Message)]
        pub struct Entry {
            #[prost(message, optional, tag = "1")]
            pub key: ::core::option::Option<super::super::Value>,
            #[prost(message, optional, tag = "2")]
            pub value: ::core::option::Option<super::super::Value>,
        }
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct CompilerFunction {
        #[prost(uint32, tag = "1")]
        pub id: u32,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct HostFunction {
        #[prost(uint32, tag = "1")]
        pub id: u32,
        #[prost(string, tag = "2")]
        pub signature: ::prost::alloc::string::String,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct CompilerMixin {
        #[prost(uint32, tag = "1")]
        pub id: u32,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct ArgumentList {
        #[prost(uint32, tag = "1")]
        pub id: u32,
        #[prost(enumeration = "super::ListSeparator", tag = "2")]
        pub separator: i32,
        #[prost(message, repeated, tag = "3")]
        pub contents: ::prost::alloc::vec::Vec<super::Value>,
        #[prost(map = "string, message", tag = "4")]
        pub keywords: ::std::collections::HashMap<::prost::alloc::string::String, super::Value>,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Calculation {
        #[prost(string, tag = "1")]
        pub name: ::prost::alloc::string::String,
        #[prost(message, repeated, tag = "2")]
        pub arguments: ::prost::alloc::vec::Vec<calculation::CalculationValue>,
    }

    pub mod calculation {
        #[derive(Clone, PartialEq, ::prost::Message)]
        pub struct CalculationValue {
            #[prost(oneof = "calculation_value::Value", tags = "1, 2, 3, 4, 5")]
            pub value: ::core::option::Option<calculation_value::Value>,
        }

        pub mod calculation_value {
            #[derive(Clone, PartialEq, ::prost::Oneof)]
            pub enum Value {
                #[prost(message, tag = "1")]
                Number(super::super::Number),
                #[prost(string, tag = "2")]
                String(::prost::alloc::string::String),
                #[prost(string, tag = "3")]
                Interpolation(::prost::alloc::string::String),
                #[prost(message, tag = "4")]
                Operation(::prost::alloc::boxed::Box<super::CalculationOperation>),
                #[prost(message, tag = "5")]
                Calculation(super::super::Calculation),
            }
        }

        #[derive(Clone, PartialEq, ::prost::Message)]
        pub struct CalculationOperation {
            #[prost(enumeration = "super::super::CalculationOperator", tag = "1")]
            pub operator: i32,
            #[prost(message, optional, boxed, tag = "2")]
            pub left: ::core::option::Option<::prost::alloc::boxed::Box<CalculationValue>>,
            #[prost(message, optional, boxed, tag = "3")]
            pub right: ::core::option::Option<::prost::alloc::boxed::Box<CalculationValue>>,
        }
    }

    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Value {
        #[prost(message, tag = "1")]
        String(self::String),
        #[prost(message, tag = "2")]
        Number(Number),
        #[prost(message, tag = "3")]
        Color(Color),
        #[prost(message, tag = "5")]
        List(List),
        #[prost(message, tag = "6")]
        Map(Map),
        #[prost(enumeration = "super::SingletonValue", tag = "7")]
        Singleton(i32),
        #[prost(message, tag = "8")]
        CompilerFunction(CompilerFunction),
        #[prost(message, tag = "9")]
        HostFunction(HostFunction),
        #[prost(message, tag = "10")]
        ArgumentList(ArgumentList),
        #[prost(message, tag = "12")]
        Calculation(Calculation),
        #[prost(message, tag = "13")]
        CompilerMixin(CompilerMixin),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum OutputStyle {
    Expanded = 0,
    Compressed = 1,
    Nested = 2,
    Compact = 3,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum Syntax {
    Scss = 0,
    Indented = 1,
    Css = 2,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum ListSeparator {
    Comma = 0,
    Space = 1,
    Slash = 2,
    Undecided = 3,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum SingletonValue {
    True = 0,
    False = 1,
    Null = 2,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum LogEventType {
    Warning = 0,
    DeprecationWarning = 1,
    Debug = 2,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum ProtocolErrorType {
    Parse = 0,
    Params = 1,
    Internal = 2,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum CalculationOperator {
    Plus = 0,
    Minus = 1,
    Times = 2,
    Divide = 3,
}
