mod common;

use std::rc::Rc;

use common::{factory, register, Merge, REGISTRY};
use mezuri_core::component::{ComponentType, InMemoryResolver, ProxyFactory};
use mezuri_core::declaration::{ComponentDefinition, MethodDeclaration};
use mezuri_core::pipeline::{Pipeline, PipelineStep, PipelineStepContext};
use mezuri_core::types::Type;
use serde_json::{json, Value};

fn source_step(f: &ProxyFactory, ctx: &PipelineStepContext, name: &str, query: &str) -> PipelineStep {
    let source = f.source(REGISTRY, name, "1.0.0");
    let step = PipelineStep::new();
    step.build(ctx, |ctx| {
            source.open(ctx)?.method(ctx, "tweets")?.call(ctx, query)?;
            Ok(())
        })
        .unwrap();
    step
}

fn threshold_step(f: &ProxyFactory, ctx: &PipelineStepContext, input: &PipelineStep, threshold: Value) -> PipelineStep {
    let op = f.operator(REGISTRY, "threshold", "1.0.0");
    let step = PipelineStep::new();
    step.build(ctx, |ctx| {
            let text = input.output(ctx)?["text"].clone();
            op.init(ctx, [("threshold", threshold)])?.method(ctx, "run")?.call(ctx, [("input", text)])?;
            Ok(())
        })
        .unwrap();
    step
}

/// `merge.join(left, right)` leyendo las salidas en el orden dado.
fn join_step(f: &ProxyFactory, ctx: &PipelineStepContext, first: &PipelineStep, second: &PipelineStep) -> PipelineStep {
    let merge = f.operator(REGISTRY, "merge", "1.0.0");
    let step = PipelineStep::new();
    step.build(ctx, |ctx| {
            let a = first.output(ctx)?["text"].clone();
            let b = second.output(ctx)?["text"].clone();
            merge.method(ctx, "join")?.call(ctx, [("left", a), ("right", b)])?;
            Ok(())
        })
        .unwrap();
    step
}

#[test]
fn predecessor_order_does_not_change_the_hash() {
    let f = factory();
    let ctx = PipelineStepContext::new();
    let p1 = source_step(&f, &ctx, "tweets", "*");
    let p2 = source_step(&f, &ctx, "users", "*");

    let s12 = join_step(&f, &ctx, &p1, &p2);
    let s21 = join_step(&f, &ctx, &p2, &p1);
    assert_eq!(s12.predecessors(), vec![p1.clone(), p2.clone()]);
    assert_eq!(s21.predecessors(), vec![p2.clone(), p1.clone()]);
    assert_eq!(s12.version_hash().unwrap(), s21.version_hash().unwrap());
}

#[test]
fn building_the_same_step_twice_is_deterministic() {
    let build = || {
        let f = factory();
        let ctx = PipelineStepContext::new();
        let src = source_step(&f, &ctx, "tweets", "*");
        let op = threshold_step(&f, &ctx, &src, json!(0.5));
        Pipeline::new(op).unwrap().version_hash().to_string()
    };
    assert_eq!(build(), build());
}

#[test]
fn changing_any_part_of_a_step_changes_the_hash() {
    let f = factory();
    let ctx = PipelineStepContext::new();
    let tweets = source_step(&f, &ctx, "tweets", "*");
    let users = source_step(&f, &ctx, "users", "*");
    let base = threshold_step(&f, &ctx, &tweets, json!(0.5)).version_hash().unwrap();

    // valor de parámetro distinto
    assert_ne!(threshold_step(&f, &ctx, &tweets, json!(0.7)).version_hash().unwrap(), base);
    // predecesor distinto
    assert_ne!(threshold_step(&f, &ctx, &users, json!(0.5)).version_hash().unwrap(), base);
    // query distinta en el predecesor
    let filtered = source_step(&f, &ctx, "tweets", "lang = 'es'");
    assert_ne!(threshold_step(&f, &ctx, &filtered, json!(0.5)).version_hash().unwrap(), base);
}

#[test]
fn changing_the_called_method_changes_the_hash() {
    let f = factory();
    let ctx = PipelineStepContext::new();
    let merge = f.operator(REGISTRY, "merge", "1.0.0");

    let join = PipelineStep::new();
    join.build(&ctx, |ctx| {
            merge.method(ctx, "join")?.call(ctx, [("left", Type::String), ("right", Type::String)])?;
            Ok(())
        })
        .unwrap();
    let both = PipelineStep::new();
    both.build(&ctx, |ctx| {
            merge.method(ctx, "both")?.call(ctx, [("left", Type::Bool), ("right", Type::Bool)])?;
            Ok(())
        })
        .unwrap();
    assert_ne!(join.version_hash().unwrap(), both.version_hash().unwrap());
}

/// `merge` con las mismas coordenadas y hash, pero `join` sobre enteros.
struct IntMerge;

impl ComponentDefinition for IntMerge {
    fn declarations(&self) -> Vec<MethodDeclaration> {
        vec![MethodDeclaration::io("join").input("left", Type::Int)
                                          .input("right", Type::Int)
                                          .output("merged", Type::String)]
    }
}

fn merge_factory(definition: &dyn ComponentDefinition) -> ProxyFactory {
    let mut resolver = InMemoryResolver::new();
    register(&mut resolver, ComponentType::Operator, "merge", definition, "hash-merge");
    ProxyFactory::new(Rc::new(resolver))
}

#[test]
fn changing_only_the_input_types_changes_the_hash() {
    let ctx = PipelineStepContext::new();
    let join = |f: &ProxyFactory, input: Type| {
        let merge = f.operator(REGISTRY, "merge", "1.0.0");
        let step = PipelineStep::new();
        step.build(&ctx, |ctx| {
                merge.method(ctx, "join")?.call(ctx, [("left", input.clone()), ("right", input)])?;
                Ok(())
            })
            .unwrap();
        step
    };
    let strings = join(&merge_factory(&Merge), Type::String);
    let ints = join(&merge_factory(&IntMerge), Type::Int);

    assert_eq!(strings.component(), ints.component());
    assert_eq!(strings.calls()[0].method, ints.calls()[0].method);
    assert_eq!(strings.peek_output(), ints.peek_output());
    assert_ne!(strings.version_hash().unwrap(), ints.version_hash().unwrap());
}

#[test]
fn equal_predecessors_do_not_cancel_out() {
    let f = factory();
    let ctx = PipelineStepContext::new();
    let merge = f.operator(REGISTRY, "merge", "1.0.0");

    let tweets = join_step(&f, &ctx, &source_step(&f, &ctx, "tweets", "*"), &source_step(&f, &ctx, "tweets", "*"));
    let users = join_step(&f, &ctx, &source_step(&f, &ctx, "users", "*"), &source_step(&f, &ctx, "users", "*"));
    let single = {
        let only = source_step(&f, &ctx, "tweets", "*");
        join_step(&f, &ctx, &only, &only)
    };
    let unconnected = PipelineStep::new();
    unconnected.build(&ctx, |ctx| {
                   merge.method(ctx, "join")?.call(ctx, [("left", Type::String), ("right", Type::String)])?;
                   Ok(())
               })
               .unwrap();

    assert_eq!(tweets.predecessors().len(), 2);
    assert_eq!(single.predecessors().len(), 1);
    let hashes = [tweets.version_hash().unwrap(),
                  users.version_hash().unwrap(),
                  single.version_hash().unwrap(),
                  unconnected.version_hash().unwrap()];
    for (i, a) in hashes.iter().enumerate() {
        for b in &hashes[i + 1..] {
            assert_ne!(a, b);
        }
    }
}

#[test]
fn shared_ancestor_does_not_cancel_out() {
    let f = factory();
    let ctx = PipelineStepContext::new();

    let diamond = |shared: &str| {
        let root = source_step(&f, &ctx, shared, "*");
        let low = threshold_step(&f, &ctx, &root, json!(0.2));
        let high = threshold_step(&f, &ctx, &root, json!(0.8));
        let merge = f.operator(REGISTRY, "merge", "1.0.0");
        let top = PipelineStep::new();
        top.build(&ctx, |ctx| {
               let l = low.output(ctx)?["result"].clone();
               let h = high.output(ctx)?["result"].clone();
               merge.method(ctx, "both")?.call(ctx, [("left", l), ("right", h)])?;
               Ok(())
           })
           .unwrap();
        Pipeline::new(top).unwrap()
    };

    let with_tweets = diamond("tweets");
    let with_users = diamond("users");
    assert_eq!(with_tweets.steps().len(), 4);
    assert_ne!(with_tweets.version_hash(), with_users.version_hash());
}

#[test]
fn pipeline_hash_is_the_terminal_step_hash() {
    let f = factory();
    let ctx = PipelineStepContext::new();
    let src = source_step(&f, &ctx, "tweets", "*");
    let op = threshold_step(&f, &ctx, &src, json!(0.5));
    let pipeline = Pipeline::new(op.clone()).unwrap();
    assert_eq!(pipeline.version_hash(), op.version_hash().unwrap());
    assert!(Pipeline::new(PipelineStep::new()).is_err());
}
