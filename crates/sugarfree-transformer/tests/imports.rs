//! ES module to CommonJS interop.

use pretty_assertions::assert_eq;
use sugarfree_transformer::{transform, Transform, TransformOptions};

const USE_STRICT: &str = "\"use strict\";";
const ES_MODULE: &str = "Object.defineProperty(exports, \"__esModule\", {value: true});";
const IMPORT_DEFAULT_PREFIX: &str = " function _interopRequireDefault(obj) { return obj && obj.__esModule ? obj : { default: obj }; }";

fn imports(code: &str) -> String {
    transform(code, &TransformOptions::from_transforms(&[Transform::Imports]))
        .expect("transform failed")
        .code
}

#[test]
fn test_use_strict_without_module_syntax() {
    assert_eq!(imports("foo();\n"), "\"use strict\";foo();\n");
}

#[test]
fn test_named_imports_become_member_accesses() {
    let code = "import {a, b as c} from './x';\na();\nc.d;\nconst o = {a};\n";
    assert_eq!(
        imports(code),
        format!(
            "{USE_STRICT}var _x = require('./x');\n(0, _x.a)();\n_x.b.d;\nconst o = {{a: _x.a}};\n"
        )
    );
}

#[test]
fn test_default_import_uses_interop_helper() {
    let code = "import React from 'react';\nReact.render();\n";
    assert_eq!(
        imports(code),
        format!(
            "{USE_STRICT}{IMPORT_DEFAULT_PREFIX}var _react = require('react'); var _react2 = _interopRequireDefault(_react);\n_react2.default.render();\n"
        )
    );
}

#[test]
fn test_namespace_import_keeps_local_name() {
    let output = imports("import * as path from 'path';\npath.join();\n");
    assert!(output.contains(" function _interopRequireWildcard(obj) {"));
    assert!(output.contains(
        "var _path = require('path'); var path = _interopRequireWildcard(_path);\npath.join();\n"
    ));
}

#[test]
fn test_side_effect_import() {
    assert_eq!(
        imports("import './polyfill';\nrun();\n"),
        format!("{USE_STRICT}require('./polyfill');\nrun();\n")
    );
}

#[test]
fn test_one_interop_variable_per_source() {
    let code = "import a from 'm';\nimport {b} from 'm';\na(b);\n";
    let output = imports(code);
    assert!(output.contains("var _m = require('m'); var _m2 = _interopRequireDefault(_m);\n"));
    assert!(output.contains("\n\n(0, _m2.default)(_m.b);\n"));
}

#[test]
fn test_generated_names_avoid_existing_identifiers() {
    let code = "import x from 'x';\nconst _x = 1;\nx(_x);\n";
    let output = imports(code);
    assert!(output.contains("var _x2 = require('x'); var _x3 = _interopRequireDefault(_x2);"));
    assert!(output.contains("(0, _x3.default)(_x);"));
}

#[test]
fn test_shadowed_import_is_not_rewritten() {
    let code = "import a from 'a';\nfunction f(a) { return a; }\n";
    let output = imports(code);
    assert!(output.ends_with("\nfunction f(a) { return a; }\n"));
}

#[test]
fn test_export_declarations() {
    let code = "export const a = 1, b = 2;\nexport function f() {}\nexport class C {}\n";
    assert_eq!(
        imports(code),
        format!(
            "{USE_STRICT}{ES_MODULE} exports.f = f;const a = 1, b = 2; exports.a = a; exports.b = b;\nfunction f() {{}}\nclass C {{}} exports.C = C;\n"
        )
    );
}

#[test]
fn test_export_without_semicolon() {
    let output = imports("export let a = 1\nfoo()\n");
    assert!(output.ends_with("let a = 1; exports.a = a;\nfoo()\n"));
}

#[test]
fn test_assignments_update_exported_bindings() {
    let code = "export let q = 1;\nfunction inc() { q += 1; }\nfunction f(q) { q = 3; }\nq = 2;\n";
    assert_eq!(
        imports(code),
        format!(
            "{USE_STRICT}{ES_MODULE}let q = 1; exports.q = q;\nfunction inc() {{ exports.q = q += 1; }}\nfunction f(q) {{ q = 3; }}\nexports.q = q = 2;\n"
        )
    );
}

#[test]
fn test_assignments_update_export_list_aliases() {
    let output = imports("var v = 1;\nexport {v as w};\nv = 5;\n");
    assert!(output.ends_with("var v = 1;\nexports.w = v;\nexports.w = v = 5;\n"));
}

#[test]
fn test_export_default_forms() {
    assert_eq!(
        imports("export default 42;\n"),
        format!("{USE_STRICT}{ES_MODULE}exports.default = 42;\n")
    );
    assert_eq!(
        imports("export default function App() {}\n"),
        format!("{USE_STRICT}{ES_MODULE} exports.default = App;function App() {{}}\n")
    );
    assert_eq!(
        imports("export default class Widget {}\n"),
        format!("{USE_STRICT}{ES_MODULE}class Widget {{}} exports.default = Widget;\n")
    );
    assert_eq!(
        imports("export default function () {}\n"),
        format!("{USE_STRICT}{ES_MODULE}exports.default = function () {{}}\n")
    );
}

#[test]
fn test_export_list() {
    let code = "const a = 1;\nexport {a as b, a};\n";
    assert_eq!(
        imports(code),
        format!("{USE_STRICT}{ES_MODULE}const a = 1;\nexports.b = a; exports.a = a;\n")
    );
}

#[test]
fn test_export_list_before_declaration_is_deferred() {
    let code = "export {a};\nconst a = 1;\n";
    assert_eq!(
        imports(code),
        format!("{USE_STRICT}{ES_MODULE}\nconst a = 1;\n\nexports.a = a;")
    );
}

#[test]
fn test_reexported_import_uses_access() {
    let code = "import {x} from './x';\nexport {x as y};\n";
    let output = imports(code);
    assert!(output.ends_with("var _x = require('./x');\nexports.y = _x.x;\n"));
}

#[test]
fn test_export_from() {
    let output = imports("export {a as b, default as c} from './m';\n");
    assert!(output.contains(
        "var _m = require('./m'); Object.defineProperty(exports, 'b', {enumerable: true, get: function () { return _m.a; }}); var _m2 = _interopRequireDefault(_m); Object.defineProperty(exports, 'c', {enumerable: true, get: function () { return _m2.default; }});"
    ));
}

#[test]
fn test_export_star() {
    let output = imports("export * from './n';\n");
    assert!(output.contains(
        "var _n = require('./n'); Object.keys(_n).forEach(function (key) { if (key === \"default\" || key === \"__esModule\") return; Object.defineProperty(exports, key, {enumerable: true, get: function () { return _n[key]; }}); });"
    ));
}

#[test]
fn test_export_star_as_namespace() {
    let output = imports("export * as ns from './n';\n");
    assert!(output.contains("var _n = require('./n'); exports.ns = _interopRequireWildcard(_n);"));
}

#[test]
fn test_dynamic_import_is_left_alone() {
    let output = imports("import('./lazy').then(run);\n");
    assert_eq!(output, format!("{USE_STRICT}import('./lazy').then(run);\n"));
}

#[test]
fn test_typescript_elides_unused_imports() {
    let options = TransformOptions::from_transforms(&[Transform::Typescript, Transform::Imports]);
    let code = "import {A, b} from './x';\nimport Unused from './y';\nlet v: A = b;\n";
    let output = transform(code, &options).expect("transform failed").code;
    assert_eq!(
        output,
        format!("{USE_STRICT}var _x = require('./x');\n\nlet v = _x.b;\n")
    );
}

#[test]
fn test_typescript_default_interface_is_not_exported() {
    let options = TransformOptions::from_transforms(&[Transform::Typescript, Transform::Imports]);
    let code = "export default interface I { a: string }\nexport const v = 1;\n";
    let output = transform(code, &options).expect("transform failed").code;
    assert!(!output.contains("exports.default"));
    assert!(output.ends_with("\nconst v = 1; exports.v = v;\n"));
}

#[test]
fn test_typescript_type_exports_are_dropped() {
    let options = TransformOptions::from_transforms(&[Transform::Typescript, Transform::Imports]);
    let code = "interface I {}\nconst v = 1;\nexport {I, v};\n";
    let output = transform(code, &options).expect("transform failed").code;
    assert!(output.ends_with("\nconst v = 1;\nexports.v = v;\n"));
}
