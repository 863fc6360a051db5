//! Transform selection and per-run options.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use sugarfree_lexer::Dialect;

/// A transform that can be enabled for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Transform {
    /// Strip TypeScript type syntax.
    Typescript,
    /// Strip Flow type syntax and `@flow` pragmas.
    Flow,
    /// Lower JSX elements to factory calls.
    Jsx,
    /// Rewrite ES module syntax to CommonJS.
    Imports,
    /// Hoist `jest.mock` calls above imports.
    Jest,
    /// Wrap the module for react-hot-loader registration.
    ReactHotLoader,
}

impl Transform {
    /// All transforms, in the order their names are listed in help text.
    pub const ALL: [Transform; 6] = [
        Transform::Typescript,
        Transform::Flow,
        Transform::Jsx,
        Transform::Imports,
        Transform::Jest,
        Transform::ReactHotLoader,
    ];

    /// The name used on the command line and in config files.
    pub fn as_str(self) -> &'static str {
        match self {
            Transform::Typescript => "typescript",
            Transform::Flow => "flow",
            Transform::Jsx => "jsx",
            Transform::Imports => "imports",
            Transform::Jest => "jest",
            Transform::ReactHotLoader => "react-hot-loader",
        }
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown transform name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown transform `{0}`")]
pub struct UnknownTransform(pub String);

impl FromStr for Transform {
    type Err = UnknownTransform;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Transform::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownTransform(s.to_string()))
    }
}

/// Module system the import transform targets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModuleConvention {
    /// `require` / `exports`.
    #[default]
    #[serde(rename = "commonjs")]
    CommonJs,
}

/// Options for a single [`transform`](crate::transform) call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TransformOptions {
    /// Enabled transforms. Order does not matter.
    pub transforms: Vec<Transform>,
    /// Syntax to recognise. Derived from `transforms` when unset.
    pub dialect: Option<Dialect>,
    /// Factory expression for JSX elements.
    pub jsx_pragma: String,
    /// Expression naming the fragment component.
    pub jsx_fragment_pragma: String,
    /// Module system targeted by the import transform.
    pub module_convention: ModuleConvention,
    /// Path reported to react-hot-loader registrations.
    pub file_path: Option<String>,
    /// Whether to build a source map alongside the code.
    pub source_maps: bool,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            transforms: Vec::new(),
            dialect: None,
            jsx_pragma: "React.createElement".to_string(),
            jsx_fragment_pragma: "React.Fragment".to_string(),
            module_convention: ModuleConvention::default(),
            file_path: None,
            source_maps: false,
        }
    }
}

impl TransformOptions {
    /// Options with the given transforms enabled and everything else default.
    pub fn from_transforms(transforms: &[Transform]) -> Self {
        Self {
            transforms: transforms.to_vec(),
            ..Self::default()
        }
    }

    /// Returns true if `transform` is enabled.
    #[inline]
    pub fn has(&self, transform: Transform) -> bool {
        self.transforms.contains(&transform)
    }

    /// The syntax to tokenize with.
    ///
    /// Flow sources may always contain JSX, so enabling Flow recognises it
    /// even when JSX lowering is off.
    pub fn dialect(&self) -> Dialect {
        self.dialect.unwrap_or(Dialect {
            typescript: self.has(Transform::Typescript),
            flow: self.has(Transform::Flow),
            jsx: self.has(Transform::Jsx) || self.has(Transform::Flow),
        })
    }

    /// The identifier the JSX pragma's member chain starts from.
    pub(crate) fn jsx_pragma_base(&self) -> &str {
        pragma_base(&self.jsx_pragma)
    }

    pub(crate) fn jsx_fragment_pragma_base(&self) -> &str {
        pragma_base(&self.jsx_fragment_pragma)
    }
}

fn pragma_base(pragma: &str) -> &str {
    pragma.split('.').next().unwrap_or(pragma)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_transform_names_round_trip() {
        for transform in Transform::ALL {
            assert_eq!(transform.as_str().parse::<Transform>(), Ok(transform));
        }
        assert_eq!(
            "babel".parse::<Transform>(),
            Err(UnknownTransform("babel".to_string()))
        );
    }

    #[test]
    fn test_dialect_follows_transforms() {
        let options = TransformOptions::from_transforms(&[Transform::Typescript]);
        assert_eq!(options.dialect(), Dialect::TS);

        let options = TransformOptions::from_transforms(&[Transform::Flow]);
        assert_eq!(options.dialect(), Dialect::FLOW);

        let options = TransformOptions {
            dialect: Some(Dialect::TSX),
            ..TransformOptions::from_transforms(&[Transform::Typescript])
        };
        assert!(options.dialect().jsx);
    }

    #[test]
    fn test_deserialize_camel_case() {
        let options: TransformOptions = serde_json::from_str(
            r#"{"transforms": ["jsx", "react-hot-loader"], "jsxPragma": "h", "moduleConvention": "commonjs"}"#,
        )
        .unwrap();
        assert!(options.has(Transform::ReactHotLoader));
        assert_eq!(options.jsx_pragma_base(), "h");
        assert_eq!(options.jsx_fragment_pragma_base(), "React");
        assert!(!options.source_maps);
    }
}
