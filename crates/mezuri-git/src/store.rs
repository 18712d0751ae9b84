//! `RevisionStore` sobre un repositorio git local.
//!
//! Cada operación es una invocación síncrona de `git` en el directorio raíz
//! del componente. Los commits llevan como committer la identidad de
//! procedencia; el autor es el configurado por el usuario.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use log::debug;
use mezuri_core::constants::{PROVENANCE_EMAIL, PROVENANCE_NAME};
use mezuri_core::errors::{CoreError, Result};
use mezuri_core::revision::RevisionStore;

use crate::error::GitError;

/// `git show` sale con este código si la revisión o la ruta no existen.
const MISSING_OBJECT_EXIT: i32 = 128;

#[derive(Debug, Clone)]
pub struct GitRevisionStore {
    root: PathBuf,
}

impl GitRevisionStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn output(&self, args: &[&str]) -> std::result::Result<Output, GitError> {
        debug!("git {}", args.join(" "));
        Ok(Command::new("git").args(args)
                              .current_dir(&self.root)
                              .env("GIT_COMMITTER_NAME", PROVENANCE_NAME)
                              .env("GIT_COMMITTER_EMAIL", PROVENANCE_EMAIL)
                              .output()?)
    }

    /// Ejecuta `git args` y devuelve su stdout sin espacios finales.
    fn run(&self, args: &[&str]) -> std::result::Result<String, GitError> {
        let output = self.output(args)?;
        if !output.status.success() {
            return Err(GitError::Failed { command: args.join(" "),
                                          stderr: String::from_utf8_lossy(&output.stderr).trim().to_string() });
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim_end().to_string())
    }

    /// `git clone url target` desde la raíz. `false` si git no pudo clonar.
    pub fn clone_repository(&self, url: &str, target: &str) -> std::result::Result<bool, GitError> {
        let output = self.output(&["clone", "--quiet", url, target])?;
        Ok(output.status.success())
    }

    fn lines(&self, args: &[&str]) -> Result<Vec<String>> {
        Ok(self.run(args)?
               .lines()
               .filter(|l| !l.is_empty())
               .map(str::to_string)
               .collect())
    }
}

impl RevisionStore for GitRevisionStore {
    fn init(&mut self) -> Result<()> {
        fs::create_dir_all(&self.root)?;
        self.run(&["init", "--quiet"])?;
        Ok(())
    }

    fn add(&mut self, path: &str) -> Result<()> {
        self.run(&["add", "--", path])?;
        Ok(())
    }

    fn commit(&mut self, message: &str) -> Result<String> {
        self.run(&["commit", "--quiet", "-a", "-m", message])?;
        self.rev_parse("HEAD")
    }

    fn tag(&mut self, name: &str, message: &str) -> Result<String> {
        self.run(&["tag", "-a", name, "-m", message])?;
        self.rev_parse(name)
    }

    fn show(&self, path: &str, revision: &str) -> Result<Option<Vec<u8>>> {
        let object = format!("{revision}:{path}");
        let output = self.output(&["show", &object])?;
        if output.status.success() {
            return Ok(Some(output.stdout));
        }
        match output.status.code() {
            Some(MISSING_OBJECT_EXIT) => Ok(None),
            _ => Err(GitError::Failed { command: format!("show {object}"),
                                        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string() }.into()),
        }
    }

    fn push(&mut self, remote: &str) -> Result<bool> {
        let output = self.output(&["push", "--quiet", "--follow-tags", remote, "HEAD"])?;
        if !output.status.success() {
            debug!("push to {remote} rejected: {}", String::from_utf8_lossy(&output.stderr).trim());
        }
        Ok(output.status.success())
    }

    fn list_tags(&self) -> Result<Vec<String>> {
        self.lines(&["tag", "--list"])
    }

    fn list_remotes(&self) -> Result<Vec<String>> {
        self.lines(&["remote"])
    }

    fn remote_url(&self, name: &str) -> Result<String> {
        self.run(&["remote", "get-url", name])
            .map_err(|_| CoreError::NotFound(format!("remote '{name}'")))
    }

    fn add_remote(&mut self, name: &str, url: &str) -> Result<()> {
        self.run(&["remote", "add", name, url])?;
        Ok(())
    }

    fn rev_parse(&self, reference: &str) -> Result<String> {
        self.run(&["rev-parse", "--verify", "--quiet", reference])
            .map_err(|_| CoreError::NotFound(format!("revision '{reference}'")))
    }

    fn read_file(&self, path: &str) -> Result<Option<Vec<u8>>> {
        match fs::read(self.root.join(path)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write_file(&mut self, path: &str, contents: &[u8]) -> Result<()> {
        let target = self.root.join(path);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(target, contents)?;
        Ok(())
    }
}
