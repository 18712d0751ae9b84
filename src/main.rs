//! Demo de extremo a extremo sobre stores en memoria: un autor publica un
//! Source y un Operator en un registry, y un pipeline los compone.

use std::rc::Rc;

use log::info;
use mezuri_core::component::{ComponentType, ProxyFactory};
use mezuri_core::declaration::{DefinedComponent, DefinedMethod, DefinitionFile, MethodDeclaration};
use mezuri_core::pipeline::{Pipeline, PipelineStep, PipelineStepContext};
use mezuri_core::revision::{InMemoryRemotes, InMemoryRevisionStore, RevisionStore};
use mezuri_core::spec::DefinitionLocation;
use mezuri_core::types::Type;
use mezuri_core::version::Version;
use mezuri_registry::{InMemorySpecFetcher, Registry, RegistryConfig};
use mezuri::{ComponentWorkspace, WorkflowError};
use serde_json::json;

const DEFINITION_FILE: &str = "component.json";

fn release(kind: ComponentType,
           name: &str,
           class: &str,
           component: DefinedComponent,
           hub: &InMemoryRemotes,
           registry: &mut Registry<InMemorySpecFetcher>)
           -> Result<(), WorkflowError> {
    let url = format!("mem://{name}");
    hub.create(&url);
    let mut workspace = ComponentWorkspace::new(kind, InMemoryRevisionStore::with_remotes(hub.clone()));
    let definition = DefinitionFile::default().with_class(class, component);
    workspace.store_mut().write_file(DEFINITION_FILE, definition.to_json()?.as_bytes())?;
    workspace.init(name,
                   "demo component",
                   Version::default(),
                   Some(DefinitionLocation { file: DEFINITION_FILE.to_string(),
                                             class: class.to_string() }))?;
    let tag = workspace.commit("First version", Some(Version::new(1, 0, 0)))?;
    info!("created {tag}");
    let registry_url = registry.config().url.clone();
    let request = workspace.publish("origin", Some(url.as_str()), Some(registry_url.as_str()), registry)?;
    println!("{}", serde_json::to_string_pretty(&request).map_err(mezuri_core::CoreError::from)?);
    Ok(())
}

fn run() -> Result<(), WorkflowError> {
    let hub = InMemoryRemotes::new();
    let mut registry = Registry::new(RegistryConfig::from_env(), InMemorySpecFetcher::new(hub.clone()));
    let registry_url = registry.config().url.clone();

    let tweets = DefinedComponent::new(vec![DefinedMethod::from(MethodDeclaration::io("tweets").output("text", Type::String))
                                                .with_reader("file:///tweets.csv", "*")]);
    release(ComponentType::Source, "tweets", "Tweets", tweets, &hub, &mut registry)?;

    let threshold = DefinedComponent::new(vec![MethodDeclaration::parameters("configure").parameter("threshold", Type::Double)
                                                                                      .into(),
                                               MethodDeclaration::io("run").input("input", Type::String)
                                                                           .output("result", Type::Bool)
                                                                           .into()]);
    release(ComponentType::Operator, "threshold", "Threshold", threshold, &hub, &mut registry)?;

    let factory = ProxyFactory::new(Rc::new(registry));
    let source = factory.source(&registry_url, "tweets", "1.0.0");
    let operator = factory.operator(&registry_url, "threshold", "1.0.0");
    let ctx = PipelineStepContext::new();

    let read = PipelineStep::new();
    read.build(&ctx, |ctx| {
            source.open(ctx)?.method(ctx, "tweets")?.call(ctx, "lang = 'es'")?;
            Ok(())
        })?;
    let classify = PipelineStep::new();
    classify.build(&ctx, |ctx| {
                let text = read.output(ctx)?["text"].clone();
                operator.init(ctx, [("threshold", json!(0.5))])?
                        .method(ctx, "run")?
                        .call(ctx, [("input", text)])?;
                Ok(())
            })?;

    let pipeline = Pipeline::new(classify)?;
    println!("{}", serde_json::to_string_pretty(&pipeline.describe()?).map_err(mezuri_core::CoreError::from)?);
    println!("pipeline version hash: {}", pipeline.version_hash());
    Ok(())
}

fn main() {
    env_logger::init();
    if let Err(e) = run() {
        eprintln!("error: {e}");
        std::process::exit(e.exit_code());
    }
}
