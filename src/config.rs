//! Configuration options for writing parameter files.
//!
//! JSON output is pretty-printed with a four space indent unless a different
//! [`SerializationConfig`] is passed to the `to_json_with` methods.

/// Layout options for JSON output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializationConfig {
    /// Write one field per line. Default: true
    pub pretty: bool,

    /// Spaces per nesting level when `pretty` is set. Default: 4
    pub indent: usize,
}

impl Default for SerializationConfig {
    fn default() -> Self {
        Self {
            pretty: true,
            indent: 4,
        }
    }
}

impl SerializationConfig {
    /// Single-line output
    pub fn compact() -> Self {
        Self {
            pretty: false,
            ..Self::default()
        }
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    /// The indent string used by the pretty printer
    pub(crate) fn indent_string(&self) -> String {
        " ".repeat(self.indent)
    }
}
