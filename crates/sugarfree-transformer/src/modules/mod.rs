//! Transform modules.
//!
//! Each module reads the shared token stream and bindings and returns edits
//! plus optional prefix and suffix text. Modules never see each other's
//! output; the root transformer merges their edits and rejects overlaps.

pub(crate) mod hot_reload;
pub(crate) mod imports;
pub(crate) mod jest;
pub(crate) mod jsx;
pub(crate) mod types;

use crate::cursor::TokenView;
use crate::edit::Edits;
use crate::options::{Transform, TransformOptions};
use crate::scope::Bindings;
use imports::ImportPlan;
use std::fmt;

/// Identifies the module an edit came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ModuleKind {
    /// TypeScript and Flow type stripping.
    Types,
    Jsx,
    Imports,
    ReactHotLoader,
    Jest,
}

impl ModuleKind {
    /// Modules in the order their prefixes are emitted.
    pub const TABLE: [ModuleKind; 5] = [
        ModuleKind::Types,
        ModuleKind::Jsx,
        ModuleKind::Imports,
        ModuleKind::ReactHotLoader,
        ModuleKind::Jest,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ModuleKind::Types => "types",
            ModuleKind::Jsx => "jsx",
            ModuleKind::Imports => "imports",
            ModuleKind::ReactHotLoader => "react-hot-loader",
            ModuleKind::Jest => "jest",
        }
    }

    /// Whether the options enable this module.
    pub(crate) fn enabled(self, options: &TransformOptions) -> bool {
        match self {
            ModuleKind::Types => {
                options.has(Transform::Typescript) || options.has(Transform::Flow)
            }
            ModuleKind::Jsx => options.has(Transform::Jsx),
            ModuleKind::Imports => options.has(Transform::Imports),
            ModuleKind::ReactHotLoader => options.has(Transform::ReactHotLoader),
            ModuleKind::Jest => options.has(Transform::Jest),
        }
    }
}

impl fmt::Display for ModuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read-only state shared by every module in a run.
pub(crate) struct Context<'a> {
    pub view: TokenView<'a>,
    pub bindings: &'a Bindings,
    pub options: &'a TransformOptions,
    /// Present when the import transform is enabled.
    pub plan: Option<&'a ImportPlan>,
}

impl Context<'_> {
    #[inline]
    pub fn has(&self, transform: Transform) -> bool {
        self.options.has(transform)
    }
}

/// What one module contributes to the output.
#[derive(Debug)]
pub(crate) struct ModuleOutput {
    pub edits: Edits,
    pub prefix: String,
    pub suffix: String,
}

impl ModuleOutput {
    pub fn new(kind: ModuleKind) -> Self {
        Self {
            edits: Edits::new(kind),
            prefix: String::new(),
            suffix: String::new(),
        }
    }
}
