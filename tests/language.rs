use std::fs;

use selva::{
    interpreter::{
        evaluator::core::Context,
        parser::core::parse_program,
        scanner::scan_tokens,
        value::core::Value,
    },
    run_program,
};
use walkdir::WalkDir;

/// Runs a program and returns the value of its last top-level expression
/// statement.
fn eval_source(source: &str) -> Result<Option<Value>, Box<dyn std::error::Error>> {
    let (tokens, scan_errors) = scan_tokens(source);
    if let Some(error) = scan_errors.into_iter().next() {
        return Err(Box::new(error));
    }

    let mut iter = tokens.iter().peekable();
    let (statements, parse_errors) = parse_program(&mut iter);
    if let Some(error) = parse_errors.into_iter().next() {
        return Err(Box::new(error));
    }

    let mut context = Context::new();
    Ok(context.eval_toplevel(&statements)?)
}

fn last_value(source: &str) -> Value {
    eval_source(source)
        .unwrap_or_else(|e| panic!("Script failed: {e}\n{source}"))
        .unwrap_or_else(|| panic!("Script produced no value:\n{source}"))
}

fn assert_number(source: &str, expected: f64) {
    assert_eq!(last_value(source), Value::Number(expected), "source: {source}");
}

fn assert_string(source: &str, expected: &str) {
    assert_eq!(last_value(source), Value::Str(expected.to_string()), "source: {source}");
}

fn assert_bool(source: &str, expected: bool) {
    assert_eq!(last_value(source), Value::Bool(expected), "source: {source}");
}

fn assert_rendered(source: &str, expected: &str) {
    assert_eq!(last_value(source).to_string(), expected, "source: {source}");
}

fn assert_failure(source: &str) {
    if eval_source(source).is_ok() {
        panic!("Script succeeded but was expected to fail:\n{source}");
    }
}

#[test]
fn script_corpus_works() {
    let mut count = 0;

    for entry in
        WalkDir::new("tests/scripts").into_iter()
                                     .filter_map(Result::ok)
                                     .filter(|e| e.path().extension().is_some_and(|ext| ext == "slv"))
    {
        let path = entry.path();
        let source =
            fs::read_to_string(path).unwrap_or_else(|e| panic!("Failed to read {path:?}: {e}"));

        count += 1;
        if let Err(e) = run_program(&source, false) {
            panic!("Script {path:?} failed: {e}");
        }
    }

    assert!(count > 0, "No scripts found in tests/scripts");
}

#[test]
fn closures_and_non_local_return() {
    assert_number(
        "fun fib(n) { if (n <= 1) return n; return fib(n-1) + fib(n-2); }\nfib(10);",
        55.0,
    );
}

#[test]
fn lexical_shadowing_restores_the_outer_binding() {
    assert_string(
        r#"
        var a = "global";
        var seen = "";
        {
            var a = "inner";
            seen = seen + a;
        }
        seen = seen + a;
        seen;
        "#,
        "innerglobal",
    );
}

#[test]
fn closures_observe_later_mutation_of_captured_scopes() {
    assert_number(
        r#"
        fun makeCounter() {
            var count = 0;
            fun increment() {
                count = count + 1;
                return count;
            }
            return increment;
        }
        var tick = makeCounter();
        tick();
        tick();
        tick();
        "#,
        3.0,
    );
}

#[test]
fn nested_composite_literals_and_deep_assignment() {
    assert_number(
        r#"
        var t[] = [ [1, 2], {"k": [9, 9, 9]} ];
        t[1]["k"][2] = 42;
        t[1]["k"][2];
        "#,
        42.0,
    );
}

#[test]
fn deep_assignment_past_the_end_pads_with_nil() {
    assert_rendered(
        r#"
        var a[] = [1];
        a[3] = 9;
        a;
        "#,
        "[1, nil, nil, 9]",
    );
}

#[test]
fn absolute_value_and_percent() {
    assert_number("|2 - 5 - (10 % 90)|;", 12.0);
    assert_number("|0 - 3|;", 3.0);
    assert_bool("|0 - 7| == |7|;", true);
}

#[test]
fn string_repetition_and_concatenation() {
    assert_string("3 * \"ab\";", "ababab");
    assert_string("\"ab\" * 2;", "abab");
    assert_string("\"a\" + \"b\";", "ab");
}

#[test]
fn range_expansion_and_multi_index_selectors() {
    assert_rendered("var s[] = [0..5, 99];\ns[1, 3];", "[1, 3]");
    assert_number("var s[] = [0..5, 99];\ns[-1];", 99.0);
    assert_number("var s[] = [0..5, 99];\ns[1, 3, 5][0];", 1.0);
}

#[test]
fn single_element_collapse_rule() {
    // A single-group access whose result is a one-element array collapses
    // to the element itself.
    assert_number("var a[] = [[5]];\na[0];", 5.0);
    assert_number("var m[] = [[1, 2], [3, 4]];\nm[1][0];", 3.0);
}

#[test]
fn while_and_for_loops() {
    assert_number(
        r#"
        var total = 0;
        var j = 0;
        while (j < 5) {
            total = total + j;
            j = j + 1;
        }
        total;
        "#,
        10.0,
    );
    assert_number(
        r#"
        var total = 0;
        for (var i = 0; i < 10; i = i + 1) {
            total = total + i;
        }
        total;
        "#,
        45.0,
    );
}

#[test]
fn postfix_and_prefix_increment() {
    assert_number("var i = 1;\ni++;\ni;", 2.0);
    assert_number("var i = 5;\ni--;\ni;", 4.0);
    // Prefix forms yield the adjusted value without mutating.
    assert_number("var j = 5;\nvar k = ++j;\nk;", 6.0);
    assert_number("var j = 5;\nvar k = ++j;\nj;", 5.0);
}

#[test]
fn logical_operators_short_circuit() {
    assert_bool(
        r#"
        var called = false;
        fun touch() { called = true; return true; }
        true or touch();
        called;
        "#,
        false,
    );
    assert_bool(
        r#"
        var called = false;
        fun touch() { called = true; return true; }
        nil and touch();
        called;
        "#,
        false,
    );
    assert_string("nil or \"yes\";", "yes");
    assert_number("\"hi\" and 2;", 2.0);
    assert_string("\"hi\" or 2;", "hi");
}

#[test]
fn fixed_size_array_declarations() {
    assert_rendered("var a[3] = [1, 2, 3];\na;", "[1, 2, 3]");
    assert_rendered("var a[2];\na;", "[nil, nil]");
    assert_failure("var a[2] = [1, 2, 3];");
}

#[test]
fn map_literals_and_dot_access() {
    assert_string("var m{} = { name: \"Ada\", \"age\": 36 };\nm.name;", "Ada");
    assert_number("var m{} = { name: \"Ada\", \"age\": 36 };\nm[\"age\"];", 36.0);
    assert_bool("var m{} = { a: 1 };\nm[\"missing\"] == nil;", true);
}

#[test]
fn map_methods_bind_this() {
    assert_string(
        r#"
        var obj{} = {
            label: "box",
            describe => () { return this["label"]; }
        };
        obj.describe();
        "#,
        "box",
    );
}

#[test]
fn function_literals_are_first_class() {
    assert_number("var f = fun (a, b) { return a + b; };\nf(2, 5);", 7.0);
    assert_number(
        r#"
        var ops[] = [ fun (x) { return x * 2; }, fun (x) { return x + 1; } ];
        ops[0](10) + ops[1](10);
        "#,
        31.0,
    );
}

#[test]
fn string_methods() {
    assert_number("var s = \"abc\";\ns.len();", 3.0);
    assert_string("var s = \"MiXeD\";\ns.lower();", "mixed");
    assert_string("var s = \"MiXeD\";\ns.upper();", "MIXED");
    assert_string("var s = \"  hi  \";\ns.trim();", "hi");
    assert_string("var s = \"xxhi\";\ns.trimleft(\"x\");", "hi");
    assert_string("var s = \"hixx\";\ns.trimright(\"x\");", "hi");
    assert_string("var s = \"pre_body\";\ns.trimprefix(\"pre_\");", "body");
    assert_string("var s = \"body.txt\";\ns.trimsuffix(\".txt\");", "body");
    assert_string("var s = \"a,b,c\";\nvar parts = s.split(\",\");\nparts[1];", "b");
    assert_number("var s = \"4.25\";\ns.number();", 4.25);
    assert_failure("var s = \"not a number\";\ns.number();");
}

#[test]
fn method_calls_on_nested_string_receivers() {
    assert_string(
        "var m{} = { greeting: \"hello\" };\nm.greeting.upper();",
        "HELLO",
    );
}

#[test]
fn template_interpolation() {
    assert_string(
        r#"
        var user{} = { name: "Ada", langs: ["rust", "go"] };
        var t = "hi ${user.name}, first=${user.langs.0}";
        t.template();
        "#,
        "hi Ada, first=rust",
    );
    assert_string(
        r#"
        var user{} = {
            name: "Ada",
            shout => () { return this["name"] + "!"; }
        };
        var t = "${user.shout()}";
        t.template();
        "#,
        "Ada!",
    );
    assert_string(
        r#"
        var width = 3;
        var banner = "${width}x${width}";
        banner.template();
        "#,
        "3x3",
    );
}

#[test]
fn len_builtin_measures_its_argument() {
    assert_number("var s = \"abc\";\nlen(s);", 3.0);
    assert_number("var a[] = [1, 2, 3, 4];\nlen(a);", 4.0);
    assert_number("var m{} = { a: 1, b: 2 };\nlen(m);", 2.0);
    assert_failure("len(42);");
}

#[test]
fn clone_deep_copies_composites() {
    assert_number(
        r#"
        var a[] = [ [1], 2 ];
        var b = clone(a);
        b[0][0] = 9;
        a[0][0];
        "#,
        1.0,
    );
    // Without clone, composites alias the same storage.
    assert_number(
        r#"
        var a[] = [1, 2];
        var c = a;
        c[1] = 7;
        a[1];
        "#,
        7.0,
    );
}

#[test]
fn sprint_renders_values() {
    assert_string("sprint(2);", "2");
    assert_string("sprint(2.5);", "2.5");
    assert_string("var a[] = [1, 2];\nsprint(a);", "[1, 2]");
}

#[test]
fn equality_semantics() {
    assert_bool("nil == nil;", true);
    assert_bool("nil == 0;", false);
    assert_bool("nil == false;", false);
    assert_bool("1 == 1;", true);
    assert_bool("\"a\" == \"a\";", true);
    assert_bool("1 <> 2;", true);
    // Composites compare by reference.
    assert_bool("var a[] = [1];\nvar b[] = [1];\na == b;", false);
    assert_bool("var a[] = [1];\nvar c = a;\na == c;", true);
}

#[test]
fn evaluation_is_deterministic() {
    let source = r#"
        var total = 0;
        for (var i = 1; i <= 32; i = i + 1) {
            total = total + i * i;
        }
        total;
    "#;
    assert_eq!(last_value(source), last_value(source));
}

#[test]
fn undefined_variable_is_an_error() {
    assert_failure("ghost;");
    assert_failure("var x = ghost + 1;");
}

#[test]
fn assignment_to_undefined_variable_is_an_error() {
    assert_failure("ghost = 1;");
}

#[test]
fn arity_mismatch_is_an_error() {
    assert_failure("fun f(a, b) { return a + b; }\nf(3);");
    assert_failure("clock(1);");
}

#[test]
fn type_incompatible_operands_are_errors() {
    assert_failure("1 + \"x\";");
    assert_failure("\"a\" < \"b\";");
    assert_failure("nil * 2;");
    assert_failure("|\"abc\"|;");
}

#[test]
fn selector_misuse_is_an_error() {
    assert_failure("var n = 4;\nn[0];");
    assert_failure("var a[] = [1, 2];\na[5];");
    assert_failure("var a[] = [1, 2];\na[0.5];");
    assert_failure("var m{} = { a: 1 };\nm[\"ghost\"][\"deeper\"] = 2;");
}

#[test]
fn calling_a_non_callable_is_an_error() {
    assert_failure("var n = 4;\nn();");
}

#[test]
fn reserved_words_are_parse_errors() {
    assert_failure("class Foo {}");
    assert_failure("break;");
    assert_failure("var x = 1 && 2;");
    assert_failure("try { 1; } catch { 2; }");
    assert_failure("switch (1) {}");
}

#[test]
fn syntax_errors_are_reported() {
    assert_failure("var = 1;");
    assert_failure("(1 + 2;");
    assert_failure("\"unterminated");
}
