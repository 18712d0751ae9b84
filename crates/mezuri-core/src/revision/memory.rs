use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::rc::Rc;

use log::debug;
use sha2::{Digest, Sha256};

use super::RevisionStore;
use crate::errors::{CoreError, Result};

#[derive(Debug, Clone)]
struct Commit {
    message: String,
    files: BTreeMap<String, Vec<u8>>,
}

#[derive(Debug, Clone)]
struct AnnotatedTag {
    id: String,
    commit: String,
    message: String,
}

/// Commits y tags de un repositorio (local o remoto).
#[derive(Debug, Clone, Default)]
pub struct RepositorySnapshot {
    commits: HashMap<String, Commit>,
    head: Option<String>,
    tags: BTreeMap<String, AnnotatedTag>,
}

impl RepositorySnapshot {
    fn commit_of(&self, reference: &str) -> Option<&Commit> {
        let id = self.commit_id(reference)?;
        self.commits.get(&id)
    }

    fn commit_id(&self, reference: &str) -> Option<String> {
        if reference == "HEAD" {
            return self.head.clone();
        }
        if let Some(tag) = self.tags.get(reference) {
            return Some(tag.commit.clone());
        }
        self.commits.contains_key(reference).then(|| reference.to_string())
    }

    /// Como `git rev-parse`: el id del tag anotado para un tag, el del
    /// commit en otro caso.
    pub fn rev_parse(&self, reference: &str) -> Option<String> {
        match self.tags.get(reference) {
            Some(tag) => Some(tag.id.clone()),
            None => self.commit_id(reference),
        }
    }

    pub fn show(&self, path: &str, revision: &str) -> Option<Vec<u8>> {
        self.commit_of(revision).and_then(|c| c.files.get(path).cloned())
    }

    pub fn commit_message(&self, reference: &str) -> Option<&str> {
        self.commit_of(reference).map(|c| c.message.as_str())
    }

    pub fn tag_names(&self) -> Vec<String> {
        self.tags.keys().cloned().collect()
    }

    pub fn tag_message(&self, name: &str) -> Option<&str> {
        self.tags.get(name).map(|t| t.message.as_str())
    }
}

/// Conjunto de repositorios remotos en memoria, indexado por URL.
///
/// Es un handle compartido: los stores que lo reciben empujan a él y un
/// registry puede leerlo. Solo se aceptan pushes a URLs creadas con
/// `create`.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRemotes(Rc<RefCell<HashMap<String, RepositorySnapshot>>>);

impl InMemoryRemotes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&self, url: &str) {
        self.0.borrow_mut().entry(url.to_string()).or_default();
    }

    pub fn repository(&self, url: &str) -> Option<RepositorySnapshot> {
        self.0.borrow().get(url).cloned()
    }

    fn receive(&self, url: &str, local: &RepositorySnapshot) -> bool {
        let mut remotes = self.0.borrow_mut();
        let Some(remote) = remotes.get_mut(url) else { return false };
        remote.commits.extend(local.commits.iter().map(|(k, v)| (k.clone(), v.clone())));
        remote.tags.extend(local.tags.iter().map(|(k, v)| (k.clone(), v.clone())));
        remote.head = local.head.clone();
        true
    }
}

/// Revision store en memoria: árbol de trabajo, ficheros seguidos,
/// commits, tags anotados y remotos.
#[derive(Debug, Default)]
pub struct InMemoryRevisionStore {
    initialized: bool,
    working_tree: BTreeMap<String, Vec<u8>>,
    tracked: BTreeSet<String>,
    repo: RepositorySnapshot,
    remotes: BTreeMap<String, String>,
    hub: InMemoryRemotes,
}

fn object_id(parts: &[&[u8]]) -> String {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update((part.len() as u64).to_be_bytes());
        hasher.update(part);
    }
    hasher.finalize().iter().map(|b| format!("{b:02x}")).collect()
}

impl InMemoryRevisionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store que empuja a `hub`.
    pub fn with_remotes(hub: InMemoryRemotes) -> Self {
        Self { hub, ..Self::default() }
    }

    pub fn snapshot(&self) -> &RepositorySnapshot {
        &self.repo
    }

    fn ensure_initialized(&self) -> Result<()> {
        if self.initialized {
            Ok(())
        } else {
            Err(CoreError::Io("not a repository".to_string()))
        }
    }
}

impl RevisionStore for InMemoryRevisionStore {
    fn init(&mut self) -> Result<()> {
        self.initialized = true;
        Ok(())
    }

    fn add(&mut self, path: &str) -> Result<()> {
        self.ensure_initialized()?;
        if !self.working_tree.contains_key(path) {
            return Err(CoreError::Io(format!("pathspec '{path}' did not match any files")));
        }
        self.tracked.insert(path.to_string());
        Ok(())
    }

    fn commit(&mut self, message: &str) -> Result<String> {
        self.ensure_initialized()?;
        let files: BTreeMap<String, Vec<u8>> = self.tracked
                                                   .iter()
                                                   .filter_map(|p| self.working_tree.get(p).map(|c| (p.clone(), c.clone())))
                                                   .collect();
        let parent = self.repo.head.clone().unwrap_or_default();
        let mut parts: Vec<&[u8]> = vec![parent.as_bytes(), message.as_bytes()];
        for (path, contents) in &files {
            parts.push(path.as_bytes());
            parts.push(contents);
        }
        let id = object_id(&parts);
        debug!("in-memory commit {id}: {message}");
        self.repo.commits.insert(id.clone(),
                                 Commit { message: message.to_string(),
                                          files });
        self.repo.head = Some(id.clone());
        Ok(id)
    }

    fn tag(&mut self, name: &str, message: &str) -> Result<String> {
        self.ensure_initialized()?;
        let commit = self.repo.head.clone().ok_or_else(|| CoreError::Io("no commit to tag".to_string()))?;
        if self.repo.tags.contains_key(name) {
            return Err(CoreError::Io(format!("tag '{name}' already exists")));
        }
        let id = object_id(&[b"tag", name.as_bytes(), commit.as_bytes(), message.as_bytes()]);
        self.repo.tags.insert(name.to_string(),
                              AnnotatedTag { id: id.clone(),
                                             commit,
                                             message: message.to_string() });
        Ok(id)
    }

    fn show(&self, path: &str, revision: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.repo.show(path, revision))
    }

    fn push(&mut self, remote: &str) -> Result<bool> {
        let Some(url) = self.remotes.get(remote) else { return Ok(false) };
        Ok(self.hub.receive(url, &self.repo))
    }

    fn list_tags(&self) -> Result<Vec<String>> {
        Ok(self.repo.tag_names())
    }

    fn list_remotes(&self) -> Result<Vec<String>> {
        Ok(self.remotes.keys().cloned().collect())
    }

    fn remote_url(&self, name: &str) -> Result<String> {
        self.remotes
            .get(name)
            .cloned()
            .ok_or_else(|| CoreError::NotFound(format!("remote '{name}'")))
    }

    fn add_remote(&mut self, name: &str, url: &str) -> Result<()> {
        if self.remotes.contains_key(name) {
            return Err(CoreError::Io(format!("remote '{name}' already exists")));
        }
        self.remotes.insert(name.to_string(), url.to_string());
        Ok(())
    }

    fn rev_parse(&self, reference: &str) -> Result<String> {
        self.repo
            .rev_parse(reference)
            .ok_or_else(|| CoreError::NotFound(format!("revision '{reference}'")))
    }

    fn read_file(&self, path: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.working_tree.get(path).cloned())
    }

    fn write_file(&mut self, path: &str, contents: &[u8]) -> Result<()> {
        self.working_tree.insert(path.to_string(), contents.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with_commit() -> InMemoryRevisionStore {
        let mut store = InMemoryRevisionStore::new();
        store.init().unwrap();
        store.write_file("spec.json", b"v1").unwrap();
        store.add("spec.json").unwrap();
        store.commit("first").unwrap();
        store
    }

    #[test]
    fn show_reads_committed_contents() {
        let mut store = store_with_commit();
        store.write_file("spec.json", b"v2").unwrap();
        assert_eq!(store.show("spec.json", "HEAD").unwrap().unwrap(), b"v1");
        let second = store.commit("second").unwrap();
        assert_eq!(store.snapshot().commit_message("HEAD"), Some("second"));
        assert_eq!(store.show("spec.json", &second).unwrap().unwrap(), b"v2");
        assert!(store.show("missing.json", "HEAD").unwrap().is_none());
        assert!(store.show("spec.json", "nope").unwrap().is_none());
    }

    #[test]
    fn tags_resolve_to_their_own_id() {
        let mut store = store_with_commit();
        let tag_id = store.tag("mezuri/source/x/1.0.0/0", "Create Component version 1.0.0").unwrap();
        assert_eq!(store.rev_parse("mezuri/source/x/1.0.0/0").unwrap(), tag_id);
        assert_ne!(store.rev_parse("HEAD").unwrap(), tag_id);
        assert_eq!(store.show("spec.json", "mezuri/source/x/1.0.0/0").unwrap().unwrap(), b"v1");
        assert!(store.tag("mezuri/source/x/1.0.0/0", "again").is_err());
    }

    #[test]
    fn push_requires_a_known_remote() {
        let hub = InMemoryRemotes::new();
        hub.create("mem://origin");
        let mut store = InMemoryRevisionStore::with_remotes(hub.clone());
        store.init().unwrap();
        store.write_file("a", b"1").unwrap();
        store.add("a").unwrap();
        store.commit("c").unwrap();
        store.tag("t", "m").unwrap();

        assert!(!store.push("origin").unwrap());
        store.add_remote("origin", "mem://origin").unwrap();
        store.add_remote("dead", "mem://nowhere").unwrap();
        assert!(store.push("origin").unwrap());
        assert!(!store.push("dead").unwrap());

        let remote = hub.repository("mem://origin").unwrap();
        assert_eq!(remote.rev_parse("t").unwrap(), store.rev_parse("t").unwrap());
        assert_eq!(remote.tag_message("t"), Some("m"));
    }

    #[test]
    fn add_requires_init_and_existing_file() {
        let mut store = InMemoryRevisionStore::new();
        store.write_file("a", b"1").unwrap();
        assert!(store.add("a").is_err());
        store.init().unwrap();
        assert!(store.add("b").is_err());
        assert!(store.add("a").is_ok());
    }
}
