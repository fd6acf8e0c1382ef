use anyhow::Result;
use goanalyze_abi::Diagnostic;
use goanalyze_core::Analyzer;

fn analyze(src: &str) -> Result<Vec<Diagnostic>> {
    let ast = goanalyze_syntax::parse_package("example.com/assignment", &[("a.go", src)])?;
    let analyzer = Analyzer::new().with_inspection(goanalyze_assign::init_inspection());
    let reports = analyzer.analyze(&ast)?;
    Ok(reports.into_iter().flat_map(|r| r.diagnostics).collect())
}

fn messages(diags: &[Diagnostic]) -> Vec<&str> {
    diags.iter().map(|d| d.message.as_str()).collect()
}

const FUNC_LITERALS: &str = r"package assignmentCount

func _() {
	var c, d = func() (int, int, int) {return 1, 1, 1}, 1
	_, _ = c, d
}

func _() {
	var c, d = func() (int, int, int) {return 1, 1, 1}()
	_, _ = c, d
}

func _() {
	var c, d = func() (int, int) {return 1, 1}()
	_, _ = c, d
}

func _() {
	var c, d = func() (int, int) {return 1, 1}, 1, 2
	_, _ = c, d
}

func _() {
	var e, f = func() (int, int) {return 1, 1}(), 1
	_, _ = e, f
}
";

#[test]
fn function_literal_calls() -> Result<()> {
    let diags = analyze(FUNC_LITERALS)?;
    assert_eq!(
        messages(&diags),
        vec![
            "Assignment count mismatch: 3 element(s) assigned to 2 element(s)",
            "Multiple-value func() (int, int, int) in single-value context",
            "Assignment count mismatch: 3 element(s) assigned to 2 element(s)",
            "Multiple-value func() (int, int) in single-value context",
        ]
    );
    assert!(
        diags
            .iter()
            .all(|d| d.rule.starts_with("assignment-count/"))
    );
    Ok(())
}

const INTERFACE_METHODS: &str = r"package main

type validate interface {
	validate() (bool, error)
	void()
}

func main() {
	var s validate
	err := s.validate()
	_ = err
	v := s.void()
	_ = v
	if err2 := s.validate(); err2 != nil {
		return
	}
}
";

#[test]
fn interface_methods_in_single_value_context() -> Result<()> {
    let diags = analyze(INTERFACE_METHODS)?;
    assert_eq!(
        messages(&diags),
        vec![
            "Assignment count mismatch: 2 element(s) assigned to 1 element(s)",
            "Multiple-value s.validate() in single-value context",
            "Assignment count mismatch: 0 element(s) assigned to 1 element(s)",
            "s.void() doesn't return a value",
            "Assignment count mismatch: 2 element(s) assigned to 1 element(s)",
            "Multiple-value s.validate() in single-value context",
        ]
    );
    let rules: Vec<&str> = diags.iter().map(|d| d.rule.as_str()).collect();
    assert_eq!(rules[3], "assignment-count/no-value");
    Ok(())
}

#[test]
fn matching_counts_are_quiet() -> Result<()> {
    let src = r#"package p

import "C"

func pair() (int, string) { return 1, "" }

func g(ch chan int, m map[string]bool) {
	a, b := pair()
	var x, y = 1, 2
	x, y = y, x
	v, ok := <-ch
	w := <-ch
	_, found := m["k"]
	n := len(m)
	C.free(nil)
	cv := C.getenv(nil)
	_, _, _, _, _, _, _, _ = a, b, v, ok, w, found, n, cv
}
"#;
    assert!(analyze(src)?.is_empty());
    Ok(())
}

#[test]
fn select_receive_with_three_targets() -> Result<()> {
    let src = "package p\nfunc g(ch chan int) {\n\tvar a, b, c int\n\tselect {\n\tcase a, b, c = <-ch:\n\t}\n\t_, _, _ = a, b, c\n}\n";
    let diags = analyze(src)?;
    assert_eq!(diags.len(), 1);
    assert!(diags[0].message.starts_with("Assignment count mismatch: channel receiving"));
    Ok(())
}
