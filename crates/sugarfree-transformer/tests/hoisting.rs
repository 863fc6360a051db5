//! Jest hoisting and react-hot-loader registration.

use pretty_assertions::assert_eq;
use sugarfree_transformer::{transform, Transform, TransformOptions};

fn jest(code: &str) -> String {
    transform(code, &TransformOptions::from_transforms(&[Transform::Jest]))
        .expect("transform failed")
        .code
}

#[test]
fn test_mock_is_wrapped_and_called_first() {
    assert_eq!(
        jest("jest.mock('./x');\nfoo();"),
        "_hoistedJest1();function _hoistedJest1() { jest.mock('./x'); }\nfoo();"
    );
}

#[test]
fn test_mock_without_semicolon() {
    assert_eq!(
        jest("jest.mock('x')\nfoo()"),
        "_hoistedJest1();function _hoistedJest1() { jest.mock('x'); }\nfoo()"
    );
}

#[test]
fn test_several_calls_get_distinct_names() {
    assert_eq!(
        jest("jest.mock('a');\njest.unmock('b');"),
        "_hoistedJest1();_hoistedJest2();function _hoistedJest1() { jest.mock('a'); }\nfunction _hoistedJest2() { jest.unmock('b'); }"
    );
}

#[test]
fn test_nested_or_shadowed_calls_stay() {
    let nested = "function f() { jest.mock('x'); }";
    assert_eq!(jest(nested), nested);
    let shadowed = "const jest = make();\njest.mock('x');";
    assert_eq!(jest(shadowed), shadowed);
    let other = "jest.fn();";
    assert_eq!(jest(other), other);
}

#[test]
fn test_hoisted_calls_run_before_requires() {
    let options = TransformOptions::from_transforms(&[Transform::Imports, Transform::Jest]);
    let output = transform("import a from 'a';\njest.mock('a');\n", &options)
        .expect("transform failed")
        .code;
    assert!(output.starts_with("\"use strict\"; function _interopRequireDefault(obj)"));
    assert!(output.ends_with(
        "}_hoistedJest1();var _a = require('a'); var _a2 = _interopRequireDefault(_a);\nfunction _hoistedJest1() { jest.mock('a'); }\n"
    ));
}

#[test]
fn test_hot_loader_registers_top_level_bindings() {
    let mut options = TransformOptions::from_transforms(&[Transform::ReactHotLoader]);
    options.file_path = Some("src/App.js".to_string());
    let code = "const App = () => null;\nfunction helper() {}";
    let output = transform(code, &options).expect("transform failed").code;
    assert_eq!(
        output,
        "(function () { var enterModule = require('react-hot-loader').enterModule; enterModule && enterModule(module); })();\
const App = () => null;\nfunction helper() {}\n;(function () {\n  var reactHotLoader = require('react-hot-loader').default;\n  var leaveModule = require('react-hot-loader').leaveModule;\n  if (!reactHotLoader) {\n    return;\n  }\n  reactHotLoader.register(App, \"App\", \"src/App.js\");\n  reactHotLoader.register(helper, \"helper\", \"src/App.js\");\n  leaveModule(module);\n})();"
    );
}
