use std::rc::Rc;

use mezuri_core::component::{ComponentInfo, ComponentPublisher, ComponentResolver, ComponentType, ProxyFactory, PublishRequest};
use mezuri_core::declaration::{ComponentDefinition, IopDeclaration, MethodDeclaration};
use mezuri_core::errors::CoreError;
use mezuri_core::pipeline::PipelineStepContext;
use mezuri_core::revision::{InMemoryRemotes, InMemoryRevisionStore, RevisionStore};
use mezuri_core::spec::SpecDocument;
use mezuri_core::types::Type;
use mezuri_core::version::Version;
use mezuri_registry::{InMemorySpecFetcher, Registry, RegistryConfig, RegistryError};

const REGISTRY_URL: &str = "http://registry.test";
const REMOTE: &str = "mem://threshold";

/// Repositorio de un autor que empuja versiones a un remoto en memoria.
struct Author {
    store: InMemoryRevisionStore,
}

impl Author {
    fn new(hub: &InMemoryRemotes, url: &str) -> Self {
        hub.create(url);
        let mut store = InMemoryRevisionStore::with_remotes(hub.clone());
        store.init().unwrap();
        store.add_remote("origin", url).unwrap();
        Self { store }
    }

    /// Commit + tag + push de `spec`; devuelve `(tag, id del tag)`.
    fn release(&mut self, kind: ComponentType, spec: &SpecDocument) -> (String, String) {
        self.store.write_file("specification.json", spec.to_json().unwrap().as_bytes()).unwrap();
        self.store.add("specification.json").unwrap();
        self.store.commit(&format!("release {}", spec.version)).unwrap();
        let tag = format!("mezuri/{kind}/{}/{}/0", spec.name, spec.version);
        let id = self.store.tag(&tag, "Create Component version").unwrap();
        assert!(self.store.push("origin").unwrap());
        (tag, id)
    }
}

struct Threshold;

impl ComponentDefinition for Threshold {
    fn declarations(&self) -> Vec<MethodDeclaration> {
        vec![MethodDeclaration::parameters("configure").parameter("threshold", Type::Double),
             MethodDeclaration::io("run").input("tweet", Type::interface(REGISTRY_URL, "tweet", "1.0.0"))
                                         .output("result", Type::Bool)]
    }
}

fn threshold_spec(version: Version) -> SpecDocument {
    let mut spec = SpecDocument::new("threshold", "binary threshold", version);
    spec.set_iop(&IopDeclaration::extract(ComponentType::Operator, &Threshold));
    spec
}

fn registry(hub: &InMemoryRemotes) -> Registry<InMemorySpecFetcher> {
    Registry::new(RegistryConfig::default().with_url(REGISTRY_URL), InMemorySpecFetcher::new(hub.clone()))
}

#[test]
fn published_version_is_resolvable() {
    let hub = InMemoryRemotes::new();
    let mut author = Author::new(&hub, REMOTE);
    let spec = threshold_spec(Version::new(1, 0, 0));
    let (tag, hash) = author.release(ComponentType::Operator, &spec);

    let mut registry = registry(&hub);
    registry.create_component(ComponentType::Operator, "threshold", REMOTE).unwrap();
    let record = registry.publish_version(ComponentType::Operator, "threshold", "1.0.0", &tag, &hash).unwrap();
    assert_eq!(record.specs, spec);

    let info = ComponentInfo::new(ComponentType::Operator, REGISTRY_URL, "threshold", "1.0.0");
    let resolved = registry.get_component_version(&info).unwrap();
    assert_eq!(resolved.hash, hash);
    assert_eq!(resolved.specs.name, "threshold");
    assert_eq!(registry.get_component(ComponentType::Operator, "threshold").unwrap().versions.len(), 1);
}

#[test]
fn duplicates_are_conflicts() {
    let hub = InMemoryRemotes::new();
    let mut author = Author::new(&hub, REMOTE);
    let (tag, hash) = author.release(ComponentType::Operator, &threshold_spec(Version::new(1, 0, 0)));

    let mut registry = registry(&hub);
    registry.create_component(ComponentType::Operator, "threshold", REMOTE).unwrap();
    let err = registry.create_component(ComponentType::Operator, "threshold", REMOTE).unwrap_err();
    assert!(err.is_conflict());
    // otra clase, mismo nombre: colección distinta
    assert!(registry.create_component(ComponentType::Source, "threshold", REMOTE).is_ok());

    registry.publish_version(ComponentType::Operator, "threshold", "1.0.0", &tag, &hash).unwrap();
    let err = registry.publish_version(ComponentType::Operator, "threshold", "1.0.0", &tag, &hash).unwrap_err();
    assert!(matches!(err, RegistryError::VersionExists { .. }));
}

#[test]
fn announced_hash_must_match_the_remote_tag() {
    let hub = InMemoryRemotes::new();
    let mut author = Author::new(&hub, REMOTE);
    let (tag, _) = author.release(ComponentType::Operator, &threshold_spec(Version::new(1, 0, 0)));

    let mut registry = registry(&hub);
    registry.create_component(ComponentType::Operator, "threshold", REMOTE).unwrap();
    let err = registry.publish_version(ComponentType::Operator, "threshold", "1.0.0", &tag, "not-the-hash").unwrap_err();
    assert!(matches!(err, RegistryError::RemoteMismatch(_)));
    let err = registry.publish_version(ComponentType::Operator, "threshold", "1.0.0", "mezuri/operator/threshold/9.9.9/0", "x")
                      .unwrap_err();
    assert!(matches!(err, RegistryError::RemoteMismatch(_)));
    assert!(registry.list_versions(ComponentType::Operator, "threshold").unwrap().is_empty());
}

#[test]
fn announced_version_must_match_the_specification() {
    let hub = InMemoryRemotes::new();
    let mut author = Author::new(&hub, REMOTE);
    let (tag, hash) = author.release(ComponentType::Operator, &threshold_spec(Version::new(1, 0, 0)));

    let mut registry = registry(&hub);
    registry.create_component(ComponentType::Operator, "threshold", REMOTE).unwrap();
    let err = registry.publish_version(ComponentType::Operator, "threshold", "2.0.0", &tag, &hash).unwrap_err();
    assert!(matches!(err, RegistryError::RemoteMismatch(_)));
}

#[test]
fn unreachable_remote_is_reported_as_unavailable() {
    let hub = InMemoryRemotes::new();
    let mut registry = registry(&hub);
    registry.create_component(ComponentType::Source, "tweets", "mem://nowhere").unwrap();
    let err = registry.publish_version(ComponentType::Source, "tweets", "1.0.0", "mezuri/source/tweets/1.0.0/0", "h")
                      .unwrap_err();
    assert_eq!(err, RegistryError::RemoteUnavailable("mem://nowhere".into()));
    assert!(matches!(CoreError::from(err), CoreError::RemoteUnavailable(_)));
}

#[test]
fn publishing_records_dependents() {
    let hub = InMemoryRemotes::new();
    let mut author = Author::new(&hub, REMOTE);
    let (tag, hash) = author.release(ComponentType::Operator, &threshold_spec(Version::new(1, 0, 0)));

    let mut registry = registry(&hub);
    registry.create_component(ComponentType::Operator, "threshold", REMOTE).unwrap();
    registry.publish_version(ComponentType::Operator, "threshold", "1.0.0", &tag, &hash).unwrap();

    let tweet = ComponentInfo::new(ComponentType::Interface, REGISTRY_URL, "tweet", "1.0.0");
    assert_eq!(registry.dependents(&tweet),
               vec![ComponentInfo::new(ComponentType::Operator, REGISTRY_URL, "threshold", "1.0.0")]);
    let other = ComponentInfo::new(ComponentType::Interface, REGISTRY_URL, "user", "1.0.0");
    assert!(registry.dependents(&other).is_empty());
}

#[test]
fn publisher_registers_new_components_and_sorts_versions() {
    let hub = InMemoryRemotes::new();
    let mut author = Author::new(&hub, REMOTE);
    let mut registry = registry(&hub);

    for version in [Version::new(1, 10, 0), Version::new(1, 2, 0)] {
        let (tag, hash) = author.release(ComponentType::Operator, &threshold_spec(version));
        let request = PublishRequest { component_type: ComponentType::Operator,
                                       name: "threshold".into(),
                                       git_remote_url: REMOTE.into(),
                                       tag,
                                       version: version.to_string(),
                                       hash };
        registry.publish(&request).unwrap();
    }

    assert_eq!(registry.list_components(ComponentType::Operator).len(), 1);
    let versions: Vec<String> = registry.list_versions(ComponentType::Operator, "threshold")
                                        .unwrap()
                                        .iter()
                                        .map(|v| v.version.clone())
                                        .collect();
    assert_eq!(versions, vec!["1.2.0", "1.10.0"]);
}

#[test]
fn missing_versions_are_not_found_for_the_core() {
    let hub = InMemoryRemotes::new();
    let registry = registry(&hub);
    let info = ComponentInfo::new(ComponentType::Source, REGISTRY_URL, "tweets", "1.0.0");
    let err = registry.get_component_version(&info).unwrap_err();
    assert!(matches!(err, CoreError::NotFound(_)));
}

#[test]
fn proxies_resolve_through_the_registry() {
    let hub = InMemoryRemotes::new();
    let mut author = Author::new(&hub, REMOTE);
    let (tag, hash) = author.release(ComponentType::Operator, &threshold_spec(Version::new(1, 0, 0)));
    let mut registry = registry(&hub);
    registry.create_component(ComponentType::Operator, "threshold", REMOTE).unwrap();
    registry.publish_version(ComponentType::Operator, "threshold", "1.0.0", &tag, &hash).unwrap();

    let factory = ProxyFactory::new(Rc::new(registry));
    let threshold = factory.operator(REGISTRY_URL, "threshold", "1.0.0");
    assert_eq!(threshold.version_hash().unwrap(), hash);
    let ctx = &PipelineStepContext::new();
    assert!(matches!(threshold.method(ctx, "run"), Err(CoreError::NotInitialized(_))));
}
