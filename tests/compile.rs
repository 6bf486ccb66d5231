use funshade::code::{code_gen, gen_prog, GenError, ProgCode};
use funshade::lang::Module;
use funshade::load::{parse_source, Diagnostic};

fn parse(source: &str) -> Module {
    let mut dgns = vec![];
    let module = parse_source(source, &mut dgns).expect("source should parse");
    assert!(
        dgns.iter().all(|d| !d.is_error()),
        "unexpected diagnostics: {:?}",
        dgns
    );
    module
}

fn compile(source: &str) -> ProgCode {
    let module = parse(source);
    let (_, prog) = &module.programs[0];
    gen_prog(&module, prog).expect("program should generate")
}

/// Wraps function declarations into a minimal program, returning the vertex text.
fn vertex_with(functions: &str) -> String {
    compile(&format!(
        "
        {}
        vert v : () -> Vec4 o = {{ out o = Vec4(0.0, 0.0, 0.0, 1.0) }}
        frag f : Vec4 o -> Vec4 c = {{ out c = o }}
        p : Prog = mkProg v f
        ",
        functions
    ))
    .vertex
}

const BASIC: &str = "
uniform Float time
vert v : Vec3 pos -> Vec4 outpos = { out outpos = Vec4(pos.x, pos.y, pos.z, time) }
frag f : Vec4 c -> Vec4 outc = { out outc = c }
p : Prog = mkProg v f
";

#[test]
fn assembles_programs_in_declaration_order() {
    let code = compile(BASIC);

    assert_eq!(
        code.vertex,
        "precision highp float;
precision highp int;

uniform float time;
attribute vec3 pos;
varying vec4 outpos;

void main() {
    outpos = vec4(pos.x, pos.y, pos.z, time);
}
"
    );
    assert_eq!(
        code.fragment,
        "precision highp float;
precision highp int;

uniform float time;
varying vec4 c;
varying vec4 outc;

void main() {
    outc = c;
}
"
    );
}

#[test]
fn compilation_is_deterministic() {
    assert_eq!(parse(BASIC), parse(BASIC));
    assert_eq!(compile(BASIC), compile(BASIC));
}

#[test]
fn respects_operator_precedence() {
    let code = vertex_with(
        "
        f : (Float a, Float b, Float c) -> Float = { a - b * c }
        g : () -> Bool = { 1 < 2 == true }
        ",
    );
    assert!(code.contains("    return a - (b * c);\n"), "{}", code);
    assert!(code.contains("    return (1 < 2) == true;\n"), "{}", code);
}

#[test]
fn lifts_trailing_values_into_returns() {
    let code = vertex_with("mk : Float x -> Vec2 = { Vec2(x, 1.0) }");
    assert!(code.contains("vec2 mk(float x) {\n    return vec2(x, 1.0);\n}\n"), "{}", code);
}

#[test]
fn trailing_updates_are_not_returned() {
    let code = vertex_with("bump : Float x = { mut Float y = x; set y = y + 1.0 }");
    assert!(
        code.contains("void bump(float x) {\n    float y = x;\n    y = y + 1.0;\n}\n"),
        "{}",
        code
    );
}

#[test]
fn loops_break_after_their_body() {
    let code = vertex_with("count : () -> Int = { mut Int x = 0; for 5 do { set x (+ x 1) } x }");
    assert!(
        code.contains(
            "    for (int _i = 0; _i < 10000; _i++) {
        x = x + 1;
        if (_i >= 5) break;
    }
    return x;
"
        ),
        "{}",
        code
    );
}

#[test]
fn named_loop_counters_are_kept() {
    let code = vertex_with("sum : Int n -> Int = { mut Int s = 0 for i in n do { set s = s + i } s }");
    assert!(code.contains("for (int i = 0; i < 10000; i++) {"), "{}", code);
    assert!(code.contains("if (i >= n) break;"), "{}", code);
}

#[test]
fn comments_pass_through() {
    let code = vertex_with(
        "
        half : Float = {
            // one half
            /* exactly */ 0.5
        }
        ",
    );
    assert!(code.contains("    // one half\n    /* exactly */\n    return 0.5;\n"), "{}", code);
}

#[test]
fn composes_shaders() {
    let code = compile(
        "
        vert first : Vec3 pos -> Vec2 uv = { out uv = pos.xy }
        vert second : Vec2 coord -> Vec4 o = { out o = Vec4(coord.x, coord.y, 0.0, 1.0) }
        vert both : Vec3 pos -> Vec4 o = second . first
        frag f : Vec4 o -> Vec4 c = { out c = o }
        p : Prog = mkProg both f
        ",
    );

    assert!(code.vertex.contains("attribute vec3 pos;\nvarying vec4 o;\n"));
    assert!(
        code.vertex.contains(
            "void main() {
    vec2 uv;
    {
        uv = pos.xy;
    }
    {
        vec2 coord = uv;
        o = vec4(coord.x, coord.y, 0.0, 1.0);
    }
}
"
        ),
        "{}",
        code.vertex
    );
}

#[test]
fn programs_using_failed_compositions_do_not_resolve() {
    let mut dgns = vec![];
    let result = parse_source(
        "
        vert first : Vec3 pos -> Vec2 uv = { out uv = pos.xy }
        vert second : Vec3 n -> Vec4 o = { out o = Vec4(n.x, n.y, n.z, 1.0) }
        vert both : Vec3 pos -> Vec4 o = second . first
        frag f : Vec4 o -> Vec4 c = { out c = o }
        p : Prog = mkProg both f
        ",
        &mut dgns,
    );

    assert!(result.is_err());
    assert!(matches!(dgns[0], Diagnostic::CompositionMismatch { .. }));
    assert!(dgns.last().map_or(false, Diagnostic::is_critical));
}

#[test]
fn failed_compositions_alone_are_not_fatal() {
    let mut dgns = vec![];
    let module = parse_source(
        "
        vert first : Vec3 pos -> Vec2 uv = { out uv = pos.xy }
        vert second : Vec3 n -> Vec4 o = { out o = Vec4(n.x, n.y, n.z, 1.0) }
        vert both : Vec3 pos -> Vec4 o = second . first
        ",
        &mut dgns,
    )
    .unwrap();

    assert!(module.programs.is_empty());
    assert_eq!(dgns.len(), 1);
}

#[test]
fn matrix_literals_fail_generation() {
    let module = parse(
        "
        m : () -> Mat4 = { Mat4(1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0) }
        vert v : () -> Vec4 o = { out o = Vec4(0.0, 0.0, 0.0, 1.0) }
        frag f : Vec4 o -> Vec4 c = { out c = o }
        p : Prog = mkProg v f
        ",
    );
    assert!(matches!(
        code_gen(&module, None),
        Err(GenError::Unsupported { .. })
    ));
}

#[test]
fn syntax_errors_abort_the_whole_source() {
    let mut dgns = vec![];
    assert!(parse_source("uniform Float time\nf : Float x -> = { x }", &mut dgns).is_err());
    assert_eq!(dgns.len(), 1);
    assert!(matches!(dgns[0], Diagnostic::ParseError { .. }));

    let mut dgns = vec![];
    assert!(parse_source("f : () -> Float = { 1.0 } /* open", &mut dgns).is_err());
    assert!(matches!(dgns[0], Diagnostic::UnterminatedComment { .. }));

    let mut dgns = vec![];
    assert!(parse_source("f : () -> Float = { 1.0 ", &mut dgns).is_err());
    assert!(matches!(dgns[0], Diagnostic::LexError { .. }));
}

#[test]
fn generates_every_program() {
    let module = parse(&format!(
        "{}\nq : Prog = mkProg v f\n",
        BASIC
    ));
    let names: Vec<_> = code_gen(&module, None)
        .unwrap()
        .into_iter()
        .map(|(name, _)| name)
        .collect();
    assert_eq!(names, vec!["p", "q"]);
}

#[test]
fn generates_only_the_selected_program() {
    let module = parse(&format!("{}\nq : Prog = mkProg v f\n", BASIC));
    let selected = code_gen(&module, Some("q")).unwrap();
    assert_eq!(selected.len(), 1);
    assert_eq!(selected[0].0, "q");
    assert!(code_gen(&module, Some("missing")).unwrap().is_empty());
}

#[test]
fn composes_shaders_with_swapped_names() {
    let code = compile(
        "
        vert up : () -> (Float a, Float b) = { out a = 1.0; out b = 2.0 }
        vert down : (Float b, Float a) -> Vec4 o = { out o = Vec4(b, a, 0.0, 1.0) }
        vert both : () -> Vec4 o = down . up
        frag f : Vec4 o -> Vec4 c = { out c = o }
        p : Prog = mkProg both f
        ",
    );

    assert!(
        code.vertex.contains(
            "    {
        float _c0 = a;
        float _c1 = b;
        float b = _c0;
        float a = _c1;
        o = vec4(b, a, 0.0, 1.0);
    }
"
        ),
        "{}",
        code.vertex
    );
}

#[test]
fn renders_out_of_range_literals_as_errors() {
    let mut dgns = vec![];
    assert!(parse_source("h : Float = { 1e40 }", &mut dgns).is_err());
    assert!(matches!(dgns[0], Diagnostic::ParseError { .. }));
}

#[test]
fn comments_may_precede_operators() {
    let code = vertex_with("sum : (Float a, Float b) -> Float = { a // first\n + b }");
    assert!(code.contains("    return a + b;\n"), "{}", code);
}
