//! Syntax extensions the tokenizer recognises.

/// Which syntax extensions are enabled on top of plain JavaScript.
///
/// TypeScript and Flow are mutually exclusive in practice; if both are set,
/// Flow-only tokens (`{|`, `|}`) and TypeScript-only checks are both active.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase", default))]
pub struct Dialect {
    /// TypeScript type syntax.
    pub typescript: bool,
    /// Flow type syntax.
    pub flow: bool,
    /// JSX elements.
    pub jsx: bool,
}

impl Dialect {
    /// Plain JavaScript.
    pub const JS: Dialect = Dialect {
        typescript: false,
        flow: false,
        jsx: false,
    };

    /// TypeScript without JSX.
    pub const TS: Dialect = Dialect {
        typescript: true,
        flow: false,
        jsx: false,
    };

    /// TypeScript with JSX.
    pub const TSX: Dialect = Dialect {
        typescript: true,
        flow: false,
        jsx: true,
    };

    /// Flow, which always allows JSX.
    pub const FLOW: Dialect = Dialect {
        typescript: false,
        flow: true,
        jsx: true,
    };

    /// JavaScript with JSX.
    pub const JSX: Dialect = Dialect {
        typescript: false,
        flow: false,
        jsx: true,
    };

    /// Returns true if any type syntax is enabled.
    #[inline]
    pub fn has_types(&self) -> bool {
        self.typescript || self.flow
    }

    /// Guesses a dialect from a file extension (without the dot).
    pub fn from_extension(ext: &str) -> Option<Dialect> {
        match ext {
            "ts" | "mts" | "cts" => Some(Dialect::TS),
            "tsx" => Some(Dialect::TSX),
            "flow" => Some(Dialect::FLOW),
            "jsx" => Some(Dialect::JSX),
            "js" | "mjs" | "cjs" => Some(Dialect::JS),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_extension() {
        assert_eq!(Dialect::from_extension("tsx"), Some(Dialect::TSX));
        assert_eq!(Dialect::from_extension("cjs"), Some(Dialect::JS));
        assert_eq!(Dialect::from_extension("rs"), None);
        assert!(Dialect::FLOW.has_types());
        assert!(!Dialect::JSX.has_types());
    }
}
