//! The root transformer: tokenize, analyze, run modules, merge and emit.

use crate::cursor::TokenView;
use crate::edit::EditSet;
use crate::emit::emit;
use crate::error::TransformError;
use crate::modules::imports::ImportPlan;
use crate::modules::{hot_reload, imports, jest, jsx, types, Context, ModuleKind};
use crate::options::{Transform, TransformOptions};
use crate::scope::{analyze, JsxNames};
use source_map::SourceMap;
use sugarfree_lexer::tokenize;

/// The result of a transform.
#[derive(Debug)]
pub struct TransformResult {
    /// The generated code.
    pub code: String,
    /// Mapping between generated and original positions, when requested.
    pub source_map: Option<SourceMap>,
}

/// Transforms one source file.
///
/// Every enabled module reads the same token stream and contributes edits;
/// the edits are merged and applied to the original text in one pass. Text
/// no edit touches is copied through, so lines keep their numbers.
#[tracing::instrument(level = "debug", skip_all, fields(len = source.len()))]
pub fn transform(source: &str, options: &TransformOptions) -> Result<TransformResult, TransformError> {
    let dialect = options.dialect();
    let tokens = tokenize(source, dialect)?;
    let view = TokenView::new(source, &tokens);

    let jsx_names = if options.has(Transform::Jsx) {
        JsxNames {
            pragma: Some(options.jsx_pragma_base()),
            fragment: Some(options.jsx_fragment_pragma_base()),
        }
    } else {
        JsxNames::default()
    };
    let bindings = analyze(view, jsx_names);
    let mut names = bindings.names.clone();
    let plan = options
        .has(Transform::Imports)
        .then(|| ImportPlan::build(&bindings, view, dialect.typescript, &mut names));

    let cx = Context {
        view,
        bindings: &bindings,
        options,
        plan: plan.as_ref(),
    };
    let mut edits = Vec::new();
    let mut prefix = String::new();
    let mut suffix = String::new();
    for kind in ModuleKind::TABLE {
        if !kind.enabled(options) {
            continue;
        }
        let output = match kind {
            ModuleKind::Types => types::run(&cx),
            ModuleKind::Jsx => jsx::run(&cx),
            ModuleKind::Imports => imports::run(&cx),
            ModuleKind::ReactHotLoader => hot_reload::run(&cx),
            ModuleKind::Jest => jest::run(&cx, &mut names),
        };
        let module_edits = output.edits.into_vec();
        tracing::debug!(module = %kind, edits = module_edits.len(), "module finished");
        edits.extend(module_edits);
        prefix.push_str(&output.prefix);
        suffix.push_str(&output.suffix);
    }

    let edits = EditSet::build(edits, &tokens)?;
    let (code, source_map) = emit(source, &tokens, &edits, &prefix, &suffix, options.source_maps);
    tracing::debug!(
        tokens = tokens.len(),
        input = source.len(),
        output = code.len(),
        "transform complete"
    );
    Ok(TransformResult { code, source_map })
}
