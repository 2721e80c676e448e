/// Options applied while building a `JsonNode` tree from text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseConfig {
    /// Keep object properties in document order. When off, properties are sorted by name.
    pub preserve_field_order: bool,
    /// Keep number literals verbatim. When off, fractional and exponent literals
    /// are normalized through `f64`.
    pub exact_numbers: bool,
    /// Deepest array/object nesting accepted; deeper input is a syntax error.
    pub max_depth: usize,
}

impl Default for ParseConfig {
    fn default() -> Self {
        ParseConfig {
            preserve_field_order: true,
            exact_numbers: false,
            max_depth: 128,
        }
    }
}

impl ParseConfig {
    pub fn with_preserve_field_order(mut self, preserve_field_order: bool) -> Self {
        self.preserve_field_order = preserve_field_order;
        self
    }

    pub fn with_exact_numbers(mut self, exact_numbers: bool) -> Self {
        self.exact_numbers = exact_numbers;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// Options applied while writing a `JsonNode` tree back to text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerateConfig {
    pub pretty: bool,
    /// Spaces per nesting level, only used when `pretty` is on.
    pub indent: usize,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        GenerateConfig {
            pretty: false,
            indent: 2,
        }
    }
}

impl GenerateConfig {
    pub fn pretty() -> Self {
        GenerateConfig {
            pretty: true,
            ..Default::default()
        }
    }

    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }
}
