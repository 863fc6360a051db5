//! Flow type stripping, with and without CommonJS interop.

use pretty_assertions::assert_eq;
use sugarfree_transformer::{transform, Transform, TransformOptions};

const IMPORT_DEFAULT_PREFIX: &str = " function _interopRequireDefault(obj) { return obj && obj.__esModule ? obj : { default: obj }; }";

fn assert_flow_result(code: &str, expected: &str) {
    let options =
        TransformOptions::from_transforms(&[Transform::Jsx, Transform::Imports, Transform::Flow]);
    let result = transform(code, &options).expect("transform failed");
    assert_eq!(result.code, expected);
}

fn assert_flow_esm_result(code: &str, expected: &str) {
    let options = TransformOptions::from_transforms(&[Transform::Jsx, Transform::Flow]);
    let result = transform(code, &options).expect("transform failed");
    assert_eq!(result.code, expected);
}

#[test]
fn test_removes_import_type_statements() {
    assert_flow_result(
        "
      import type {a} from 'b';
      import c from 'd';
      import type from 'e';
      import {f, type g} from 'h';
      import {type i, type j} from 'k';
      import type L from 'L';
    ",
        &format!(
            "\"use strict\";{IMPORT_DEFAULT_PREFIX}\n      \n      var _d = require('d'); var _d2 = _interopRequireDefault(_d);\n      var _e = require('e'); var _e2 = _interopRequireDefault(_e);\n      var _h = require('h');\n      \n      \n    "
        ),
    );
}

#[test]
fn test_optional_type_is_not_a_ternary() {
    assert_flow_result(
        "
      type A<T> = ?number;
      const f = (): number => 3;
    ",
        "\"use strict\";\n      \n      const f = () => 3;\n    ",
    );
}

#[test]
fn test_removes_class_property_variance() {
    assert_flow_result(
        "
      class C {
        +foo: number;
        -bar: number;
      }
    ",
        "\"use strict\";\n      class C {\n        \n        \n      }\n    ",
    );
}

#[test]
fn test_arrow_type_in_variable_declaration() {
    assert_flow_result(
        "
      const x: a => b = 2;
    ",
        "\"use strict\";
      const x = 2;
    ",
    );
}

#[test]
fn test_arrow_types_within_parameters() {
    assert_flow_result(
        "
      function partition<T>(
        list: T[],
        test: (T, number, T[]) => ?boolean,
      ): [T[], T[]] {
        return [];
      }
    ",
        "\"use strict\";
      function partition(
        list,
        test,
      ) {
        return [];
      }
    ",
    );
}

#[test]
fn test_exact_object_types() {
    assert_flow_result(
        "
      function foo(): {| x: number |} {
        return 3;
      }
    ",
        "\"use strict\";
      function foo() {
        return 3;
      }
    ",
    );
}

#[test]
fn test_export_type_star() {
    assert_flow_result(
        "
      export type * from \"a\";
    ",
        "\"use strict\";\n      \n    ",
    );
}

#[test]
fn test_import_typeof() {
    assert_flow_result(
        "
      import {typeof a as b} from 'c';
      import typeof d from 'e';
    ",
        "\"use strict\";\n      \n      \n    ",
    );
}

#[test]
fn test_export_type_list() {
    assert_flow_result(
        "
      export type {foo};
    ",
        "\"use strict\";\n      \n    ",
    );
}

#[test]
fn test_import_alias() {
    assert_flow_result(
        "
      import { a as b } from \"c\";
    ",
        "\"use strict\";
      var _c = require('c');
    ",
    );
}

#[test]
fn test_bounded_type_parameters() {
    assert_flow_result(
        "
      function makeWeakCache<A: B>(): void {
      }
    ",
        "\"use strict\";
      function makeWeakCache() {
      }
    ",
    );
}

#[test]
fn test_star_as_arrow_type_parameter() {
    assert_flow_result(
        "
      const x: *=>3 = null;
    ",
        "\"use strict\";
      const x = null;
    ",
    );
}

#[test]
fn test_iterator_in_declared_class() {
    assert_flow_result(
        "
      declare class A {
        @@iterator(): Iterator<File>;
      }
    ",
        "\"use strict\";\n      \n\n\n    ",
    );
}

#[test]
fn test_implements_in_declared_class() {
    assert_flow_result(
        "
      declare class A implements B, C {}
    ",
        "\"use strict\";\n      \n    ",
    );
}

#[test]
fn test_prunes_imported_type_names() {
    assert_flow_esm_result(
        "
      import a, {type n as b, m as c, type d} from './e';
      import type f from './g';
    ",
        "\n      import a, { m as c,} from './e';\n\n    ",
    );
}

#[test]
fn test_removes_flow_directives() {
    assert_flow_result(
        "
      /* Hello @flow */
      // World @flow
      function foo(): number {
        return 3;
      }
      // @flow
    ",
        "\"use strict\";\n      /* Hello  */\n      // World \n      function foo() {\n        return 3;\n      }\n      // \n    ",
    );
}
