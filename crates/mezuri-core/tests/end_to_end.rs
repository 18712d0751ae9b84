mod common;

use std::cmp::Ordering;

use common::{factory, REGISTRY};
use mezuri_core::component::{ComponentInfo, ComponentType};
use mezuri_core::errors::CoreError;
use mezuri_core::pipeline::{Pipeline, PipelineStep, PipelineStepContext, StepStatus};
use mezuri_core::types::{Type, TypeMap};
use mezuri_core::version::{Version, VersionTag};
use serde_json::json;

#[test]
fn source_then_threshold_operator() {
    let f = factory();
    let ctx = PipelineStepContext::new();
    let tweets = f.source(REGISTRY, "tweets", "1.0.0");
    let threshold = f.operator(REGISTRY, "threshold", "1.0.0");

    let source_step = PipelineStep::new();
    source_step.build(&ctx, |ctx| {
                   let out = tweets.open(ctx)?.method(ctx, "tweets")?.call(ctx, "*")?;
                   assert_eq!(out, TypeMap::from([("text".to_string(), Type::String)]));
                   Ok(())
               })
               .unwrap();

    let op_step = PipelineStep::new();
    op_step.build(&ctx, |ctx| {
               let src_out = source_step.output(ctx)?;
               threshold.init(ctx, [("threshold", json!(0.5))])?
                        .method(ctx, "run")?
                        .call(ctx, [("input", src_out["text"].clone())])?;
               Ok(())
           })
           .unwrap();

    assert_eq!(op_step.status(), StepStatus::Frozen);
    assert_eq!(op_step.peek_output().unwrap(), TypeMap::from([("result".to_string(), Type::Bool)]));
    assert_eq!(op_step.predecessors(), vec![source_step.clone()]);
    // init + run
    let calls = op_step.calls();
    assert_eq!(calls.len(), 2);
    assert!(calls[0].is_init());
    assert_eq!(calls[0].arguments["threshold"], json!(0.5));

    let pipeline = Pipeline::new(op_step.clone()).unwrap();
    assert_eq!(pipeline.version_hash(), op_step.version_hash().unwrap());
    assert_eq!(pipeline.steps(), vec![source_step.clone(), op_step.clone()]);
    let deps: Vec<ComponentInfo> = pipeline.dependencies().into_iter().collect();
    assert_eq!(deps,
               vec![ComponentInfo::new(ComponentType::Source, REGISTRY, "tweets", "1.0.0"),
                    ComponentInfo::new(ComponentType::Operator, REGISTRY, "threshold", "1.0.0")]);

    let described = pipeline.describe().unwrap();
    assert_eq!(described["steps"].as_array().unwrap().len(), 2);
    assert_eq!(described["steps"][1]["predecessors"], json!([0]));
    assert_eq!(described["versionHash"], json!(pipeline.version_hash()));
}

#[test]
fn invalid_parameter_is_rejected_before_anything_is_recorded() {
    let f = factory();
    let ctx = PipelineStepContext::new();
    let threshold = f.operator(REGISTRY, "threshold", "1.0.0");
    let step = PipelineStep::new();

    let err = step.build(&ctx, |ctx| {
                      threshold.init(ctx, [("threshold", json!("bad"))])?
                               .method(ctx, "run")?
                               .call(ctx, [("input", Type::String)])?;
                      Ok(())
                  })
                  .unwrap_err();
    assert!(matches!(err, CoreError::ArgumentMismatch { .. }));
    assert_eq!(step.status(), StepStatus::Empty);
    assert!(step.calls().is_empty());
    assert!(step.component().is_none());
}

#[test]
fn unknown_component_surfaces_as_not_found() {
    let f = factory();
    let ctx = PipelineStepContext::new();
    let missing = f.source(REGISTRY, "missing", "1.0.0");
    let step = PipelineStep::new();
    let err = step.build(&ctx, |ctx| {
                      missing.open(ctx)?.method(ctx, "tweets")?.call(ctx, "*")?;
                      Ok(())
                  })
                  .unwrap_err();
    assert!(err.is_remote());
    assert_eq!(step.status(), StepStatus::Empty);
}

#[test]
fn version_tags_order_within_one_component() {
    let older = VersionTag::new(ComponentType::Operator, "threshold", Version::new(1, 2, 2));
    let newer = VersionTag::new(ComponentType::Operator, "threshold", Version::new(1, 2, 3));
    assert!(newer > older);
    assert_eq!(older.try_cmp(&newer).unwrap(), Ordering::Less);

    let foreign = VersionTag::new(ComponentType::Source, "threshold", Version::new(9, 0, 0));
    assert_eq!(newer.partial_cmp(&foreign), None);
    assert!(matches!(newer.try_cmp(&foreign), Err(CoreError::IncomparableTags { .. })));

    let tags = [older.to_string(), newer.to_string(), foreign.to_string()];
    assert_eq!(VersionTag::latest(ComponentType::Operator, "threshold", &tags), Some(newer));
}
