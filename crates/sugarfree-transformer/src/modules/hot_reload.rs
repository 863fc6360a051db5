//! react-hot-loader registration.

use super::{Context, ModuleKind, ModuleOutput};
use std::fmt::Write;

const ENTER: &str = "(function () { var enterModule = require('react-hot-loader').enterModule; enterModule && enterModule(module); })();";

pub(crate) fn run(cx: &Context<'_>) -> ModuleOutput {
    let mut out = ModuleOutput::new(ModuleKind::ReactHotLoader);
    let file = serde_json::Value::from(cx.options.file_path.as_deref().unwrap_or_default());

    out.prefix = ENTER.to_string();
    let mut suffix = String::from(
        "\n;(function () {\n  var reactHotLoader = require('react-hot-loader').default;\n  var leaveModule = require('react-hot-loader').leaveModule;\n  if (!reactHotLoader) {\n    return;\n  }\n",
    );
    for name in &cx.bindings.top_level {
        let _ = writeln!(suffix, "  reactHotLoader.register({name}, \"{name}\", {file});");
    }
    suffix.push_str("  leaveModule(module);\n})();");
    out.suffix = suffix;
    out
}
