//! Properties of the whole pipeline: identity, line preservation, position
//! mapping and error reporting.

use pretty_assertions::assert_eq;
use source_map::ByteOffset;
use sugarfree_transformer::{transform, Dialect, Transform, TransformError, TransformOptions};

const MIXED: &str = r#"import React from 'react';
import type {Props} from './types';

type State = {
  count: number,
};

export default class Counter extends React.Component<Props, State> {
  state: State = {count: 0};

  render(): React.Node {
    return (
      <div className="counter">
        {this.state.count}
        <button onClick={() => this.setState({count: 1})}>
          Reset
        </button>
      </div>
    );
  }
}
"#;

#[test]
fn test_no_transforms_is_identity() {
    let options = TransformOptions {
        dialect: Some(Dialect::TSX),
        ..TransformOptions::default()
    };
    let code = "const a = <b>{c as D}</b>;\nlet x: number = 1;\n";
    assert_eq!(transform(code, &options).unwrap().code, code);
}

#[test]
fn test_plain_javascript_passes_through_type_stripping() {
    let options = TransformOptions::from_transforms(&[Transform::Typescript]);
    let code = "const re = /a\\/b/g;\nconst t = `x${y}z`;\nif (a < b && c > d) {}\n";
    assert_eq!(transform(code, &options).unwrap().code, code);
}

#[test]
fn test_plain_javascript_is_identity_without_imports() {
    let code = r#"const re = /a\/b/g;
const t = `x${y}z`;
if (a < b && c > d) {}
function f(x, y = 2) { return x ? y : -y; }
const o = {a: 1, b() { return this.a; }};
class K extends Base { m() { return super.m(); } }
label: for (const k of list) { if (k) continue label; }
const sq = (n) => n * n;
async function g() { await h(); }
export const n = 1;
"#;
    let combinations: &[&[Transform]] = &[
        &[Transform::Flow],
        &[Transform::Jsx],
        &[Transform::Jest],
        &[Transform::Typescript],
        &[Transform::Flow, Transform::Jsx],
        &[Transform::Typescript, Transform::Jsx],
        &[Transform::Jsx, Transform::Jest],
        &[Transform::Flow, Transform::Jsx, Transform::Jest],
        &[Transform::Typescript, Transform::Jest],
    ];
    for transforms in combinations {
        let options = TransformOptions::from_transforms(transforms);
        let output = transform(code, &options).unwrap().code;
        assert_eq!(output, code, "transforms: {transforms:?}");
    }
}

#[test]
fn test_every_transform_preserves_line_count() {
    let options =
        TransformOptions::from_transforms(&[Transform::Flow, Transform::Jsx, Transform::Imports]);
    let output = transform(MIXED, &options).unwrap().code;
    assert_eq!(output.lines().count(), MIXED.lines().count());
    assert!(output.contains("class Counter extends _react2.default.Component {"));
    assert!(output.contains("_react2.default.createElement('div', { className: \"counter\",}"));
    assert!(output.ends_with("} exports.default = Counter;\n"));
}

#[test]
fn test_source_map_points_at_original_text() {
    let options = TransformOptions {
        source_maps: true,
        ..TransformOptions::from_transforms(&[Transform::Typescript])
    };
    let code = "let x: number = 1;\nlet y = 2;";
    let result = transform(code, &options).unwrap();
    assert_eq!(result.code, "let x = 1;\nlet y = 2;");
    let map = result.source_map.expect("source map requested");

    let generated = result.code.find('y').unwrap() as u32;
    let original = code.find('y').unwrap() as u32;
    assert_eq!(
        map.original_position(ByteOffset::from(generated)),
        Some(ByteOffset::from(original))
    );
    assert_eq!(
        map.generated_position(ByteOffset::from(original)),
        Some(ByteOffset::from(generated))
    );
}

#[test]
fn test_no_source_map_unless_requested() {
    let options = TransformOptions::from_transforms(&[Transform::Typescript]);
    assert!(transform("let x = 1;", &options).unwrap().source_map.is_none());
}

#[test]
fn test_hashbang_stays_first() {
    let options = TransformOptions::from_transforms(&[Transform::Imports]);
    let output = transform("#!/usr/bin/env node\nrun();\n", &options).unwrap().code;
    assert_eq!(output, "#!/usr/bin/env node\n\"use strict\";run();\n");
}

#[test]
fn test_tokenize_errors_carry_position() {
    let options = TransformOptions::from_transforms(&[Transform::Typescript]);
    let source = "let a = 1;\nf(}";
    let err = transform(source, &options).unwrap_err();
    assert!(matches!(err, TransformError::Tokenize(_)));
    assert_eq!(err.code(), "unbalanced-brackets");
    assert_eq!(err.line_col(source).map(|lc| lc.line), Some(1));
}
