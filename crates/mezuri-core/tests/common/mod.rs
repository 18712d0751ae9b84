//! Componentes de prueba compartidos por los tests de integración.
#![allow(dead_code)]

use std::rc::Rc;

use mezuri_core::component::{ComponentInfo, ComponentType, InMemoryResolver, ProxyFactory};
use mezuri_core::declaration::{ComponentDefinition, IopDeclaration, MethodDeclaration, SourceReaderInfo};
use mezuri_core::spec::SpecDocument;
use mezuri_core::types::Type;
use mezuri_core::version::Version;

pub const REGISTRY: &str = "http://registry.test";

pub struct Tweets;

impl ComponentDefinition for Tweets {
    fn declarations(&self) -> Vec<MethodDeclaration> {
        vec![MethodDeclaration::io("tweets").output("text", Type::String)]
    }

    fn open_reader(&self, _method: &str) -> Option<SourceReaderInfo> {
        Some(SourceReaderInfo { uri: "file:///tweets.csv".into(),
                                query: "*".into() })
    }
}

pub struct Threshold;

impl ComponentDefinition for Threshold {
    fn declarations(&self) -> Vec<MethodDeclaration> {
        vec![MethodDeclaration::parameters("configure").parameter("threshold", Type::Double),
             MethodDeclaration::io("run").input("input", Type::String)
                                         .output("result", Type::Bool)]
    }
}

pub struct Merge;

impl ComponentDefinition for Merge {
    fn declarations(&self) -> Vec<MethodDeclaration> {
        vec![MethodDeclaration::io("join").input("left", Type::String)
                                          .input("right", Type::String)
                                          .output("merged", Type::String),
             MethodDeclaration::io("first").input("left", Type::String)
                                           .output("merged", Type::String),
             MethodDeclaration::io("both").input("left", Type::Bool)
                                          .input("right", Type::Bool)
                                          .output("merged", Type::Bool)]
    }
}

pub fn register(resolver: &mut InMemoryResolver, kind: ComponentType, name: &str, definition: &dyn ComponentDefinition, hash: &str) {
    let mut specs = SpecDocument::new(name, "", Version::new(1, 0, 0));
    specs.set_iop(&IopDeclaration::extract(kind, definition));
    resolver.insert(ComponentInfo::new(kind, REGISTRY, name, "1.0.0"), specs, hash);
}

/// Resolver con `tweets` y `users` (Sources), `threshold` y `merge`
/// (Operators), todos en la versión 1.0.0.
pub fn resolver() -> Rc<InMemoryResolver> {
    let mut resolver = InMemoryResolver::new();
    register(&mut resolver, ComponentType::Source, "tweets", &Tweets, "hash-tweets");
    register(&mut resolver, ComponentType::Source, "users", &Tweets, "hash-users");
    register(&mut resolver, ComponentType::Operator, "threshold", &Threshold, "hash-threshold");
    register(&mut resolver, ComponentType::Operator, "merge", &Merge, "hash-merge");
    Rc::new(resolver)
}

pub fn factory() -> ProxyFactory {
    ProxyFactory::new(resolver())
}
