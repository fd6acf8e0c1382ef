mod common;

use common::{def, parse};
use goanalyze_ast::ScopeResolver;
use goanalyze_core::{AnalysisPass, BasicKind, ChanDir, Type, UntypedKind};

const DECLS: &str = r#"package p

type T struct{}
type A int
type B A
type X Y
type Y X
type R interface{ Read() int }
type RW interface {
	R
	Write(int)
}
type F struct{}
type G struct{}

func (F) Read() int   { return 0 }
func (*F) Write(int)  {}
func (G) Read() int   { return 0 }

var (
	vi  int
	vj  int
	vs  string
	vb  byte
	vu  uint8
	sl  []string
	mp  map[string]int
	st1 struct{ a, b int }
	st2 struct {
		a int
		b int
	}
	tg1 struct{ a int `json:"a"` }
	tg2 struct{ a int `json:"a"` }
	tg3 struct{ a int }
	fn  func(int) error
	snd chan<- int
	bid chan int
	rcv <-chan int
	tv  T
	iv  interface{ M() }
	arr [3]int
	arr4 [4]int
)
"#;

fn ty(pass: &AnalysisPass<'_>, name: &str) -> Type {
    pass.type_of_def(def(pass.ast(), name))
        .unwrap_or_else(|| panic!("no type for {name}"))
}

#[test]
fn identity_is_reflexive_and_symmetric() {
    let ast = parse(DECLS);
    let pass = AnalysisPass::new(&ast, &ScopeResolver);
    let names = [
        "vi", "vs", "vb", "sl", "mp", "st1", "tg1", "fn", "snd", "bid", "rcv", "tv", "iv", "arr",
    ];
    let types: Vec<Type> = names.iter().map(|n| ty(&pass, n)).collect();
    for a in &types {
        assert!(pass.identical(a, a), "{a} not identical to itself");
        for b in &types {
            assert_eq!(pass.identical(a, b), pass.identical(b, a), "{a} vs {b}");
        }
    }
}

#[test]
fn same_declared_type_is_identical() {
    let ast = parse(DECLS);
    let pass = AnalysisPass::new(&ast, &ScopeResolver);
    assert!(pass.identical(&ty(&pass, "vi"), &ty(&pass, "vj")));
    assert!(!pass.identical(&ty(&pass, "vi"), &ty(&pass, "vs")));
    assert!(pass.identical(&ty(&pass, "vb"), &ty(&pass, "vu")));
    assert!(!pass.identical(&ty(&pass, "arr"), &ty(&pass, "arr4")));
}

#[test]
fn struct_spelling_does_not_matter() {
    let ast = parse(DECLS);
    let pass = AnalysisPass::new(&ast, &ScopeResolver);
    assert!(pass.identical(&ty(&pass, "st1"), &ty(&pass, "st2")));
}

#[test]
fn struct_tags_take_part_in_identity() {
    let ast = parse(DECLS);
    let pass = AnalysisPass::new(&ast, &ScopeResolver);
    assert!(pass.identical(&ty(&pass, "tg1"), &ty(&pass, "tg2")));
    assert!(!pass.identical(&ty(&pass, "tg1"), &ty(&pass, "tg3")));
}

#[test]
fn underlying_is_idempotent() {
    let ast = parse(DECLS);
    let pass = AnalysisPass::new(&ast, &ScopeResolver);
    for name in ["A", "B", "T", "X", "R"] {
        let t = ty(&pass, name);
        let once = pass.underlying(&t);
        assert_eq!(pass.underlying(&once), once, "{name}");
    }
    assert_eq!(pass.underlying(&ty(&pass, "B")), Type::Basic(BasicKind::Int));
    // a cycle stops at a named type
    assert!(matches!(pass.underlying(&ty(&pass, "X")), Type::Named(_)));
}

#[test]
fn untyped_constants_are_assignable_to_numeric_types() {
    let ast = parse(DECLS);
    let pass = AnalysisPass::new(&ast, &ScopeResolver);
    let untyped = Type::Untyped(UntypedKind::Int);
    assert!(pass.is_assignable(&Type::Basic(BasicKind::Float64), &untyped));
    assert!(pass.is_assignable(&ty(&pass, "A"), &untyped));
    assert!(!pass.is_assignable(&Type::Basic(BasicKind::String), &untyped));
    assert!(pass.identical(&untyped, &Type::Basic(BasicKind::Uint16)));
    assert!(!pass.identical(&untyped, &Type::Untyped(UntypedKind::Float)));
}

#[test]
fn nil_is_assignable_to_nillable_types() {
    let ast = parse(DECLS);
    let pass = AnalysisPass::new(&ast, &ScopeResolver);
    assert!(pass.is_assignable(&ty(&pass, "sl"), &Type::UntypedNil));
    assert!(pass.is_assignable(&ty(&pass, "fn"), &Type::UntypedNil));
    assert!(!pass.is_assignable(&ty(&pass, "vs"), &Type::UntypedNil));
}

#[test]
fn interfaces_are_satisfied_through_embedding() {
    let ast = parse(DECLS);
    let pass = AnalysisPass::new(&ast, &ScopeResolver);
    let rw = ty(&pass, "RW");
    assert_eq!(pass.interface_methods(&rw).len(), 2);
    assert!(pass.implements(&rw, &ty(&pass, "F")));
    assert!(!pass.implements(&rw, &ty(&pass, "G")));
    assert!(pass.is_assignable(&ty(&pass, "R"), &ty(&pass, "G")));
    assert!(pass.is_assignable(&ty(&pass, "R"), &rw));
    assert!(!pass.is_assignable(&rw, &ty(&pass, "R")));
}

#[test]
fn channel_direction_matters() {
    let ast = parse(DECLS);
    let pass = AnalysisPass::new(&ast, &ScopeResolver);
    let send = ty(&pass, "snd");
    let both = ty(&pass, "bid");
    let recv = ty(&pass, "rcv");
    assert_eq!(send, Type::chan(ChanDir::Send, Type::Basic(BasicKind::Int)));
    assert!(!pass.identical(&send, &both));
    assert!(pass.is_assignable(&send, &both));
    assert!(pass.is_assignable(&recv, &both));
    assert!(!pass.is_assignable(&both, &send));
    assert!(!pass.is_assignable(&send, &recv));
}

#[test]
fn named_and_unnamed_with_same_underlying_are_assignable() {
    let ast = parse(DECLS);
    let pass = AnalysisPass::new(&ast, &ScopeResolver);
    let a = ty(&pass, "A");
    let b = ty(&pass, "B");
    assert!(!pass.is_assignable(&a, &b));
    assert!(!pass.is_assignable(&a, &Type::Basic(BasicKind::Int)));
    let empty = ty(&pass, "T");
    assert!(pass.is_assignable(&empty, &pass.underlying(&empty)));
}

#[test]
fn renders_types_like_go() {
    let ast = parse(DECLS);
    let pass = AnalysisPass::new(&ast, &ScopeResolver);
    assert_eq!(ty(&pass, "mp").text(), "map[string]int");
    assert_eq!(ty(&pass, "tv").text(), "p.T");
    assert_eq!(ty(&pass, "fn").text(), "func(int) error");
    assert_eq!(ty(&pass, "st1").text(), "struct {...}");
    assert_eq!(ty(&pass, "iv").text(), "interface {...}");
    assert_eq!(ty(&pass, "rcv").text(), "<-chan int");
    assert_eq!(ty(&pass, "arr").text(), "[3]int");
}

/// `I0` embeds `I1` ... embeds `I{depth}`, which requires `g()`; `I0` adds `f()`.
fn embedding_chain(depth: usize) -> String {
    let mut src = String::from("package p\n\ntype I0 interface {\n\tI1\n\tf()\n}\n");
    for level in 1..depth {
        src.push_str(&format!("type I{level} interface{{ I{} }}\n", level + 1));
    }
    src.push_str(&format!("type I{depth} interface{{ g() }}\n"));
    src.push_str("type Loop interface {\n\tLoop\n\th()\n}\n");
    src.push_str("type OnlyF struct{}\n\nfunc (OnlyF) f() {}\n");
    src.push_str("type Both struct{}\n\nfunc (Both) f() {}\nfunc (Both) g() {}\n");
    src
}

#[test]
fn deep_embedding_chains_are_flattened_completely() {
    let ast = parse(&embedding_chain(12));
    let pass = AnalysisPass::new(&ast, &ScopeResolver);
    let i0 = ty(&pass, "I0");
    let mut names: Vec<String> = pass
        .interface_methods(&i0)
        .into_iter()
        .map(|m| m.name)
        .collect();
    names.sort();
    assert_eq!(names, ["f", "g"]);
    assert!(!pass.is_assignable(&i0, &ty(&pass, "OnlyF")));
    assert!(pass.is_assignable(&i0, &ty(&pass, "Both")));
}

#[test]
fn self_embedding_interface_terminates() {
    let ast = parse(&embedding_chain(2));
    let pass = AnalysisPass::new(&ast, &ScopeResolver);
    let methods = pass.interface_methods(&ty(&pass, "Loop"));
    assert_eq!(methods.len(), 1);
    assert_eq!(methods[0].name, "h");
}

#[test]
fn methods_are_promoted_through_deep_struct_embedding() {
    let mut src = String::from("package p\n\ntype S0 struct{ S1 }\n");
    for level in 1..12 {
        src.push_str(&format!("type S{level} struct{{ *S{} }}\n", level + 1));
    }
    src.push_str("type S12 struct{ n int }\n\nfunc (S12) Deep() int { return 0 }\n");
    src.push_str("type Deeper interface{ Deep() int }\n");
    let ast = parse(&src);
    let pass = AnalysisPass::new(&ast, &ScopeResolver);
    let s0 = ty(&pass, "S0");
    assert!(pass.is_assignable(&ty(&pass, "Deeper"), &s0));
    assert!(pass.select_member(&s0, "n").is_some());
    assert!(pass.select_member(&s0, "Deep").is_some());
    assert!(pass.select_member(&s0, "Missing").is_none());
}
