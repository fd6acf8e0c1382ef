mod common;

use common::{def, node_with_text, parse, uses};
use goanalyze_ast::{NodeKind, ScopeResolver};
use goanalyze_core::{AnalysisPass, BasicKind, CallTarget, Type, UntypedKind};

fn def_type(src: &str, name: &str) -> Option<Type> {
    let ast = parse(src);
    let pass = AnalysisPass::new(&ast, &ScopeResolver);
    pass.type_of_def(def(&ast, name))
}

fn def_text(src: &str, name: &str) -> String {
    def_type(src, name).map_or_else(|| "<none>".to_string(), |t| t.text())
}

#[test]
fn literal_types() {
    let src = "package p\nvar a = 1\nvar b = 1.5\nvar c = 'x'\nvar d = \"s\"\nvar e = 1.5i\nvar f = 2i\n";
    assert_eq!(def_text(src, "a"), "int");
    assert_eq!(def_text(src, "b"), "float64");
    assert_eq!(def_text(src, "c"), "rune");
    assert_eq!(def_text(src, "d"), "string");
    assert_eq!(def_text(src, "e"), "complex64");
    assert_eq!(def_text(src, "f"), "complex128");
}

#[test]
fn untyped_constants_keep_their_category() {
    let src = "package p\nconst (\n\tX = 1\n\tY\n)\nconst Z = 2.0\nconst (\n\tA int8 = iota\n\tB\n)\n";
    assert_eq!(def_type(src, "X"), Some(Type::Untyped(UntypedKind::Int)));
    assert_eq!(def_type(src, "Y"), Some(Type::Untyped(UntypedKind::Int)));
    assert_eq!(def_type(src, "Z"), Some(Type::Untyped(UntypedKind::Float)));
    assert_eq!(def_type(src, "B"), Some(Type::Basic(BasicKind::Int8)));
}

#[test]
fn binary_operators() {
    let src = "package p\nvar n int64\nvar s = n + 1\nvar m = 2 * n\nvar k = n * 2\nvar q = 2 << 3.0\nvar c = n < 3\nvar l = true && false\n";
    assert_eq!(def_text(src, "s"), "int64");
    assert_eq!(def_text(src, "m"), "int64");
    assert_eq!(def_text(src, "k"), "int64");
    // a literal on the left of a multiplicative operator defers to the right operand
    assert_eq!(def_text(src, "q"), "float64");
    assert_eq!(def_text(src, "c"), "bool");
    assert_eq!(def_text(src, "l"), "bool");
}

#[test]
fn unary_operators() {
    let src = "package p\nvar x int\nvar ch chan string\nvar p = &x\nvar d = *p\nvar r = <-ch\nvar neg = -x\n";
    assert_eq!(def_text(src, "p"), "*int");
    assert_eq!(def_text(src, "d"), "int");
    assert_eq!(def_text(src, "r"), "string");
    assert_eq!(def_text(src, "neg"), "int");
}

#[test]
fn multi_value_declarations_decompose_by_position() {
    let src = "package p\nfunc f() (int, string) { return 0, \"\" }\nfunc g() {\n\ta, b := f()\n\t_, _ = a, b\n}\n";
    assert_eq!(def_text(src, "a"), "int");
    assert_eq!(def_text(src, "b"), "string");
}

#[test]
fn comma_ok_second_value_is_bool() {
    let src = "package p\nvar m map[string]float32\nvar i interface{}\nvar ch chan int\nfunc g() {\n\tv, ok := m[\"k\"]\n\ts, ok2 := i.(string)\n\tr, ok3 := <-ch\n\t_, _, _, _, _, _ = v, ok, s, ok2, r, ok3\n}\n";
    assert_eq!(def_text(src, "v"), "float32");
    assert_eq!(def_text(src, "ok"), "bool");
    assert_eq!(def_text(src, "s"), "string");
    assert_eq!(def_text(src, "ok2"), "bool");
    assert_eq!(def_text(src, "r"), "int");
    assert_eq!(def_text(src, "ok3"), "bool");
}

#[test]
fn range_variables_by_category() {
    let src = "package p\nfunc g(xs []bool, m map[string]int8, s string, ch chan uint) {\n\tfor i, x := range xs {\n\t\t_, _ = i, x\n\t}\n\tfor k, v := range m {\n\t\t_, _ = k, v\n\t}\n\tfor bi, r := range s {\n\t\t_, _ = bi, r\n\t}\n\tfor c := range ch {\n\t\t_ = c\n\t}\n}\n";
    assert_eq!(def_text(src, "i"), "int");
    assert_eq!(def_text(src, "x"), "bool");
    assert_eq!(def_text(src, "k"), "string");
    assert_eq!(def_text(src, "v"), "int8");
    assert_eq!(def_text(src, "bi"), "int");
    assert_eq!(def_text(src, "r"), "rune");
    assert_eq!(def_text(src, "c"), "uint");
}

#[test]
fn variadic_parameter_is_a_slice() {
    let src = "package p\nfunc h(prefix string, xs ...int) {}\n";
    assert_eq!(def_text(src, "xs"), "[]int");
    assert_eq!(def_text(src, "prefix"), "string");
    assert_eq!(def_text(src, "h"), "func(string, ...int)");
}

#[test]
fn builtin_calls() {
    let src = "package p\ntype T struct{}\nvar a = new(T)\nvar b = make([]int, 3)\nvar c = len(b)\nvar d = append(b, 1)\nvar e = real(1.5i)\nvar f = recover()\n";
    assert_eq!(def_text(src, "a"), "*p.T");
    assert_eq!(def_text(src, "b"), "[]int");
    assert_eq!(def_text(src, "c"), "int");
    assert_eq!(def_text(src, "d"), "[]int");
    assert_eq!(def_text(src, "e"), "float32");
    assert_eq!(def_text(src, "f"), "interface{}");
}

#[test]
fn conversions_take_the_target_type() {
    let src = "package p\ntype Celsius float64\nvar a = Celsius(3)\nvar b = []byte(\"x\")\nvar c = int64(2)\n";
    assert_eq!(def_text(src, "a"), "p.Celsius");
    assert_eq!(def_text(src, "b"), "[]byte");
    assert_eq!(def_text(src, "c"), "int64");
}

#[test]
fn calls_project_results() {
    let src = "package p\nfunc two() (int, error) { return 0, nil }\nfunc none() {}\nfunc g() {\n\ttwo()\n\tnone()\n}\n";
    let ast = parse(src);
    let pass = AnalysisPass::new(&ast, &ScopeResolver);
    let call = node_with_text(&ast, "two()", |k| matches!(k, NodeKind::Call(_)));
    assert_eq!(pass.infer(call).map(|t| t.text()).as_deref(), Some("(int, error)"));
    assert_eq!(pass.call_result_count(call), Some(2));
    let none = node_with_text(&ast, "none()", |k| matches!(k, NodeKind::Call(_)));
    assert_eq!(pass.infer(none), None);
    assert_eq!(pass.call_result_count(none), Some(0));
}

#[test]
fn selectors_reach_fields_methods_and_promoted_members() {
    let src = r"package p
type Inner struct{ Depth int }
type Outer struct {
	Inner
	Name string
}
func (o *Outer) Label() string { return o.Name }
func g(o Outer) {
	a := o.Name
	b := o.Depth
	c := o.Label()
	d := o.Label
	_, _, _, _ = a, b, c, d
}
";
    assert_eq!(def_text(src, "a"), "string");
    assert_eq!(def_text(src, "b"), "int");
    assert_eq!(def_text(src, "c"), "string");
    assert_eq!(def_text(src, "d"), "func() string");
}

#[test]
fn index_and_slice_expressions() {
    let src = "package p\nvar s = \"abc\"\nvar arr [4]uint16\nvar m map[int][]string\nvar a = s[0]\nvar b = arr[1]\nvar c = m[1]\nvar d = arr[:]\nvar e = s[1:]\n";
    assert_eq!(def_text(src, "a"), "byte");
    assert_eq!(def_text(src, "b"), "uint16");
    assert_eq!(def_text(src, "c"), "[]string");
    assert_eq!(def_text(src, "d"), "[]uint16");
    assert_eq!(def_text(src, "e"), "string");
}

#[test]
fn elided_composite_literals_take_the_outer_element_type() {
    let src = "package p\ntype T struct{ X int }\nvar xs = []T{{X: 1}}\nvar m = map[string]T{\"a\": {X: 2}}\n";
    let ast = parse(src);
    let pass = AnalysisPass::new(&ast, &ScopeResolver);
    let inner = node_with_text(&ast, "{X: 1}", |k| matches!(k, NodeKind::CompositeLit(_)));
    assert_eq!(pass.infer(inner).map(|t| t.text()).as_deref(), Some("p.T"));
    let value = node_with_text(&ast, "{X: 2}", |k| matches!(k, NodeKind::CompositeLit(_)));
    assert_eq!(pass.infer(value).map(|t| t.text()).as_deref(), Some("p.T"));
}

#[test]
fn type_switch_binding_follows_the_clause() {
    let src = "package p\nfunc g(x interface{}) {\n\tswitch v := x.(type) {\n\tcase string:\n\t\t_ = v\n\tcase int, bool:\n\t\t_ = v\n\t}\n}\n";
    let ast = parse(src);
    let pass = AnalysisPass::new(&ast, &ScopeResolver);
    let vs = uses(&ast, "v");
    assert_eq!(vs.len(), 2);
    assert_eq!(pass.infer(vs[0]).map(|t| t.text()).as_deref(), Some("string"));
    assert_eq!(pass.infer(vs[1]).map(|t| t.text()).as_deref(), Some("interface{}"));
}

#[test]
fn recursive_declarations_do_not_hang() {
    let src = "package p\nvar a = b\nvar b = a\n";
    assert_eq!(def_type(src, "a"), None);
}

#[test]
fn function_literals_and_callee_resolution() {
    let src = "package p\nimport \"C\"\nfunc g() {\n\tf := func(a int) (string, error) { return \"\", nil }\n\t_ = f\n\tC.puts(nil)\n}\n";
    assert_eq!(def_text(src, "f"), "func(int) (string, error)");
    let ast = parse(src);
    let pass = AnalysisPass::new(&ast, &ScopeResolver);
    let cgo = node_with_text(&ast, "C.puts(nil)", |k| matches!(k, NodeKind::Call(_)));
    let NodeKind::Call(call) = ast.kind(cgo) else {
        unreachable!()
    };
    assert_eq!(pass.resolve_call(call.callee), CallTarget::CSymbol);
    assert_eq!(pass.infer(cgo), Some(Type::CType));
}

#[test]
fn string_values_fold_through_references() {
    let src = "package p\nconst prefix = \"[\" + \"%s\"\nvar format = prefix + \"]\\n\"\nvar other = format\n";
    let ast = parse(src);
    let pass = AnalysisPass::new(&ast, &ScopeResolver);
    let init = pass.initializer(def(&ast, "other")).expect("initializer");
    assert_eq!(pass.string_value(init).as_deref(), Some("[%s]\n"));
}

#[test]
fn long_operator_chain_stops_at_the_depth_limit() {
    let mut src = String::from("package p\nvar n int64\nvar z = n");
    for _ in 1..10_000 {
        src.push_str(" + n");
    }
    src.push('\n');
    let ast = parse(&src);
    let pass = AnalysisPass::new(&ast, &ScopeResolver).with_max_depth(64);
    // too deep to resolve fully; the request must simply give up
    assert_eq!(pass.type_of_def(def(&ast, "z")), None);
    assert_eq!(def_text("package p\nvar n int64\nvar z = n + n + n\n", "z"), "int64");
}
