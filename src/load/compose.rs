//! Shader composition: `down . up` runs `up`, then feeds its outputs into `down`.
//!
//! Outputs of `up` are matched to inputs of `down` by position, and must have the same type.

use std::fmt::{Display, Formatter};

use crate::lang::kw::link_name;
use crate::lang::*;

#[derive(Debug, Clone, PartialEq)]
pub enum CompositionError {
    Arity {
        outputs: usize,
        inputs: usize,
    },
    Type {
        index: usize,
        output: Opaque,
        input: Opaque,
    },
    /// An output of the upstream shader would hide a global the composite still needs.
    Shadowing {
        name: String,
    },
}

impl Display for CompositionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CompositionError::Arity { outputs, inputs } => write!(
                f,
                "upstream shader has {} outputs, but downstream shader takes {} inputs",
                outputs, inputs
            ),
            CompositionError::Type {
                index,
                output,
                input,
            } => write!(
                f,
                "input #{} `{} {}` does not match output `{} {}`",
                index + 1,
                input.ty,
                input.name,
                output.ty,
                output.name
            ),
            CompositionError::Shadowing { name } => write!(
                f,
                "output `{}` of the upstream shader clashes with a global of the composite",
                name
            ),
        }
    }
}

impl std::error::Error for CompositionError {}

pub fn compose(stage: Stage, down: &Shader, up: &Shader) -> Result<Shader, CompositionError> {
    if up.outputs.len() != down.inputs.len() {
        return Err(CompositionError::Arity {
            outputs: up.outputs.len(),
            inputs: down.inputs.len(),
        });
    }

    for (index, (output, input)) in up.outputs.iter().zip(&down.inputs).enumerate() {
        if output.ty != input.ty {
            return Err(CompositionError::Type {
                index,
                output: output.clone(),
                input: input.clone(),
            });
        }
    }

    // Outputs of `up` become locals of the composite body.
    for output in &up.outputs {
        let clashes = |o: &Opaque| o.name == output.name;
        if up.inputs.iter().any(clashes) || down.outputs.iter().any(clashes) {
            return Err(CompositionError::Shadowing {
                name: output.name.clone(),
            });
        }
    }

    let mut body: Vec<Expr> = up
        .outputs
        .iter()
        .map(|o| Expr::Mut {
            ty: o.ty.clone(),
            name: o.name.clone(),
            value: None,
        })
        .collect();

    body.push(Expr::Scope {
        body: up.body.clone().map_stmts(&|e| match e {
            Expr::Out { name, value } => Expr::Update { name, value },
            e => e,
        }),
    });

    let rebound: Vec<(&Opaque, &Opaque)> = up
        .outputs
        .iter()
        .zip(&down.inputs)
        .filter(|(output, input)| output.name != input.name)
        .collect();

    // When an input is named like another output, rebinding it in place would hide
    // that output from the rebindings after it, so every output is read first.
    let permuted = rebound
        .iter()
        .any(|(_, input)| up.outputs.iter().any(|o| o.name == input.name));

    let rebind = |name: String, ty: &Type, from: String| Expr::Mut {
        ty: ty.clone(),
        name,
        value: Some(Box::new(Expr::Ref(from))),
    };

    let mut down_body: Vec<Expr> = if permuted {
        let links = rebound
            .iter()
            .enumerate()
            .map(|(i, (output, _))| rebind(link_name(i), &output.ty, output.name.clone()));
        let inputs = rebound
            .iter()
            .enumerate()
            .map(|(i, (_, input))| rebind(input.name.clone(), &input.ty, link_name(i)));
        links.chain(inputs).collect()
    } else {
        rebound
            .iter()
            .map(|(output, input)| rebind(input.name.clone(), &input.ty, output.name.clone()))
            .collect()
    };
    down_body.extend(down.body.stmts().iter().cloned());
    body.push(Expr::Scope {
        body: Seq::new(down_body),
    });

    Ok(Shader {
        stage,
        inputs: up.inputs.clone(),
        outputs: down.outputs.clone(),
        body: Seq::new(body),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn varying(ty: Type, name: &str) -> Opaque {
        Opaque::new(OpaqueType::Varying, ty, name)
    }

    fn out(name: &str, value: Expr) -> Expr {
        Expr::Out {
            name: name.into(),
            value: Box::new(value),
        }
    }

    fn shader(inputs: Vec<Opaque>, outputs: Vec<Opaque>, body: Vec<Expr>) -> Shader {
        Shader {
            stage: Stage::Vert,
            inputs,
            outputs,
            body: Seq::new(body),
        }
    }

    fn first() -> Shader {
        shader(
            vec![varying(Type::Vec3, "pos")],
            vec![varying(Type::Vec2, "uv")],
            vec![out("uv", Expr::Ref("pos".into()))],
        )
    }

    fn second() -> Shader {
        shader(
            vec![varying(Type::Vec2, "coord")],
            vec![varying(Type::Vec4, "color")],
            vec![out("color", Expr::Ref("coord".into()))],
        )
    }

    fn float(name: &str) -> Opaque {
        varying(Type::Float, name)
    }

    fn r(name: &str) -> Expr {
        Expr::Ref(name.into())
    }

    /// Runs a shader body over float signals, with block scoping.
    fn run(shader: &Shader, inputs: &[f32]) -> Vec<f32> {
        let mut frames = vec![shader
            .inputs
            .iter()
            .zip(inputs)
            .map(|(i, v)| (i.name.clone(), Some(*v)))
            .chain(shader.outputs.iter().map(|o| (o.name.clone(), None)))
            .collect::<Vec<_>>()];
        exec(&shader.body, &mut frames);
        shader
            .outputs
            .iter()
            .map(|o| frames[0].iter().find(|(n, _)| *n == o.name).unwrap().1.unwrap())
            .collect()
    }

    fn exec(body: &Seq, frames: &mut Vec<Vec<(String, Option<f32>)>>) {
        for stmt in body.stmts() {
            match stmt {
                Expr::Mut { name, value, .. } => {
                    let value = value.as_ref().map(|v| eval(v, frames));
                    frames.last_mut().unwrap().push((name.clone(), value));
                }
                Expr::Update { name, value } | Expr::Out { name, value } => {
                    let value = eval(value, frames);
                    let slot = frames
                        .iter_mut()
                        .rev()
                        .flat_map(|f| f.iter_mut().rev())
                        .find(|(n, _)| n == name)
                        .unwrap();
                    slot.1 = Some(value);
                }
                Expr::Scope { body } => {
                    frames.push(vec![]);
                    exec(body, frames);
                    frames.pop();
                }
                other => panic!("unexpected {:?}", other),
            }
        }
    }

    fn eval(expr: &Expr, frames: &[Vec<(String, Option<f32>)>]) -> f32 {
        match expr {
            Expr::F(v) => *v,
            Expr::Ref(name) => frames
                .iter()
                .rev()
                .flat_map(|f| f.iter().rev())
                .find(|(n, _)| n == name)
                .and_then(|(_, v)| *v)
                .unwrap(),
            Expr::BinOp { op, lhs, rhs } => match op {
                BOp::Add => eval(lhs, frames) + eval(rhs, frames),
                BOp::Mul => eval(lhs, frames) * eval(rhs, frames),
                other => panic!("unexpected {:?}", other),
            },
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn routes_swapped_names_by_position() {
        let up = shader(
            vec![],
            vec![float("a"), float("b")],
            vec![out("a", Expr::F(1.0)), out("b", Expr::F(2.0))],
        );
        let down = shader(
            vec![float("b"), float("a")],
            vec![float("o")],
            vec![out(
                "o",
                Expr::bin(BOp::Add, r("b"), Expr::bin(BOp::Mul, r("a"), Expr::F(10.0))),
            )],
        );
        let composite = compose(Stage::Vert, &down, &up).unwrap();
        assert_eq!(run(&composite, &[]), vec![21.0]);
    }

    #[test]
    fn routes_partially_overlapping_names_by_position() {
        let up = shader(
            vec![],
            vec![float("a"), float("b")],
            vec![out("a", Expr::F(1.0)), out("b", Expr::F(2.0))],
        );
        let down = shader(
            vec![float("b"), float("x")],
            vec![float("o")],
            vec![out(
                "o",
                Expr::bin(BOp::Add, r("b"), Expr::bin(BOp::Mul, r("x"), Expr::F(10.0))),
            )],
        );
        let composite = compose(Stage::Vert, &down, &up).unwrap();
        assert_eq!(run(&composite, &[]), vec![21.0]);
    }

    #[test]
    fn composition_is_associative_in_routing() {
        let a = shader(
            vec![float("p")],
            vec![float("a"), float("b")],
            vec![
                out("a", Expr::bin(BOp::Add, r("p"), Expr::F(1.0))),
                out("b", Expr::bin(BOp::Mul, r("p"), Expr::F(2.0))),
            ],
        );
        let b = shader(
            vec![float("b"), float("a")],
            vec![float("u"), float("v")],
            vec![
                out("u", Expr::bin(BOp::Add, r("b"), Expr::bin(BOp::Mul, r("a"), Expr::F(100.0)))),
                out("v", r("a")),
            ],
        );
        let c = shader(
            vec![float("v"), float("u")],
            vec![float("r")],
            vec![out(
                "r",
                Expr::bin(BOp::Add, Expr::bin(BOp::Mul, r("v"), Expr::F(1000.0)), r("u")),
            )],
        );

        let left = compose(Stage::Vert, &c, &compose(Stage::Vert, &b, &a).unwrap()).unwrap();
        let right = compose(Stage::Vert, &compose(Stage::Vert, &c, &b).unwrap(), &a).unwrap();

        assert_eq!(run(&left, &[3.0]), vec![604006.0]);
        assert_eq!(run(&right, &[3.0]), vec![604006.0]);
    }

    #[test]
    fn composes_matching_shaders() {
        let composite = compose(Stage::Vert, &second(), &first()).unwrap();
        assert_eq!(composite.inputs, first().inputs);
        assert_eq!(composite.outputs, second().outputs);

        let stmts = composite.body.stmts();
        assert_eq!(
            stmts[0],
            Expr::Mut {
                ty: Type::Vec2,
                name: "uv".into(),
                value: None,
            }
        );
        match &stmts[1] {
            Expr::Scope { body } => assert_eq!(
                body.stmts(),
                &[Expr::Update {
                    name: "uv".into(),
                    value: Box::new(Expr::Ref("pos".into())),
                }]
            ),
            other => panic!("unexpected {:?}", other),
        }
        match &stmts[2] {
            Expr::Scope { body } => {
                assert_eq!(
                    body.stmts()[0],
                    Expr::Mut {
                        ty: Type::Vec2,
                        name: "coord".into(),
                        value: Some(Box::new(Expr::Ref("uv".into()))),
                    }
                );
                assert_eq!(body.stmts()[1], out("color", Expr::Ref("coord".into())));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn skips_rebinding_when_names_agree() {
        let down = shader(
            vec![varying(Type::Vec2, "uv")],
            vec![varying(Type::Vec4, "color")],
            vec![],
        );
        let composite = compose(Stage::Vert, &down, &first()).unwrap();
        match &composite.body.stmts()[2] {
            Expr::Scope { body } => assert!(body.is_empty()),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn rejects_type_mismatch() {
        let down = shader(
            vec![varying(Type::Vec3, "uv")],
            vec![varying(Type::Vec4, "color")],
            vec![],
        );
        assert!(matches!(
            compose(Stage::Vert, &down, &first()),
            Err(CompositionError::Type { index: 0, .. })
        ));
    }

    #[test]
    fn rejects_arity_mismatch() {
        let down = shader(vec![], vec![varying(Type::Vec4, "color")], vec![]);
        assert_eq!(
            compose(Stage::Vert, &down, &first()),
            Err(CompositionError::Arity {
                outputs: 1,
                inputs: 0,
            })
        );
    }

    #[test]
    fn rejects_outputs_hiding_globals() {
        let down = shader(
            vec![varying(Type::Vec2, "coord")],
            vec![varying(Type::Vec4, "uv")],
            vec![],
        );
        assert_eq!(
            compose(Stage::Vert, &down, &first()),
            Err(CompositionError::Shadowing { name: "uv".into() })
        );
    }

    #[test]
    fn composition_is_associative_in_signature() {
        let third = shader(
            vec![varying(Type::Vec4, "tint")],
            vec![varying(Type::Float, "alpha")],
            vec![],
        );

        let left = compose(
            Stage::Vert,
            &third,
            &compose(Stage::Vert, &second(), &first()).unwrap(),
        )
        .unwrap();
        let right = compose(
            Stage::Vert,
            &compose(Stage::Vert, &third, &second()).unwrap(),
            &first(),
        )
        .unwrap();

        assert_eq!(left.inputs, right.inputs);
        assert_eq!(left.outputs, right.outputs);
    }

    #[test]
    fn nested_outputs_are_rewritten() {
        let up = shader(
            vec![],
            vec![varying(Type::Float, "v")],
            vec![Expr::Branch {
                cond: Box::new(Expr::B(true)),
                then: Seq::new(vec![out("v", Expr::F(1.0))]),
                otherwise: Seq::empty(),
            }],
        );
        let down = shader(vec![varying(Type::Float, "v")], vec![], vec![]);
        let composite = compose(Stage::Frag, &down, &up).unwrap();
        assert_eq!(composite.stage, Stage::Frag);
        match &composite.body.stmts()[1] {
            Expr::Scope { body } => match &body.stmts()[0] {
                Expr::Branch { then, .. } => {
                    assert!(matches!(then.stmts()[0], Expr::Update { .. }))
                }
                other => panic!("unexpected {:?}", other),
            },
            other => panic!("unexpected {:?}", other),
        }
    }
}
