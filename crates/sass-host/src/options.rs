/// How the compiler renders CSS output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputStyle {
    #[default]
    Expanded,
    Compressed,
    Nested,
    Compact,
}

/// The syntax of an input stylesheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Syntax {
    #[default]
    Scss,
    /// The whitespace-sensitive `.sass` syntax.
    Indented,
    Css,
}

/// Whether and how to request a source map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceMapStyle {
    /// No source map.
    #[default]
    None,
    /// A source map whose `sources` are URLs.
    SeparateSources,
    /// A source map with `sourcesContent` embedded.
    EmbeddedSources,
}

impl SourceMapStyle {
    pub(crate) fn wants_map(self) -> bool {
        !matches!(self, SourceMapStyle::None)
    }

    pub(crate) fn wants_sources(self) -> bool {
        matches!(self, SourceMapStyle::EmbeddedSources)
    }
}

/// How the compiler formats diagnostic text in messages and errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MessageStyle {
    /// ASCII art, no color.
    #[default]
    Plain,
    /// Terminal colors and Unicode rules.
    TerminalColored,
}
