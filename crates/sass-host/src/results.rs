use url::Url;

/// A successful compilation.
#[derive(Debug, Clone)]
pub struct CompileResults {
    /// The compiled CSS.
    pub css: String,
    /// The source map, when one was requested.
    pub source_map: Option<String>,
    /// Warnings and debug messages, in emission order.
    pub messages: Vec<CompilerMessage>,
    /// Canonical URLs loaded during the compilation.
    pub loaded_urls: Vec<Url>,
}

/// A diagnostic emitted during compilation.
#[derive(Debug, Clone)]
pub struct CompilerMessage {
    pub kind: MessageKind,
    /// The message text, without source context.
    pub message: String,
    pub span: Option<Span>,
    pub stack_trace: Option<String>,
    /// The compiler's own rendering, formatted per the configured
    /// message style.
    pub formatted: Option<String>,
}

impl std::fmt::Display for CompilerMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.formatted {
            Some(formatted) => f.write_str(formatted),
            None => f.write_str(&self.message),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    /// An `@warn` directive or compiler-generated warning.
    Warning,
    /// A warning about deprecated language features.
    DeprecationWarning,
    /// An `@debug` directive.
    Debug,
}

/// A range of a source file.
#[derive(Debug, Clone)]
pub struct Span {
    /// The source text of the span, when non-empty.
    pub text: Option<String>,
    pub start: Option<Location>,
    /// Absent for point spans.
    pub end: Option<Location>,
    /// The URL of the file, when known.
    pub url: Option<Url>,
    /// Additional source context surrounding the span.
    pub context: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    /// Byte offset from the start of the file.
    pub offset: u32,
    /// Zero-based line number.
    pub line: u32,
    /// Zero-based column number.
    pub column: u32,
}

/// Version metadata reported by the child, plus this package's own
/// version.
#[derive(Debug, Clone)]
pub struct Versions {
    /// The Embedded Sass protocol version the child speaks.
    pub protocol_version: String,
    /// This host package's version.
    pub package_version: String,
    /// The child compiler's version.
    pub compiler_version: String,
    /// The child compiler's name, such as `dart-sass`.
    pub compiler_name: String,
}
