//! CLI `mezuri`: gestiona el componente del directorio actual sobre git.
//! Códigos de salida: 0 éxito, 1 fallo de usuario, 2 uso incorrecto,
//! 4 fallo remoto, 5 resto.

mod args;

use log::info;
use mezuri::{ComponentWorkspace, WorkflowError};
use mezuri_core::component::{ComponentPublisher, PublishRequest};
use mezuri_core::errors::{CoreError, Result as CoreResult};
use mezuri_git::GitRevisionStore;

use crate::args::{parse, Command, USAGE};

/// Sin cliente HTTP: la solicitud de registro se imprime como JSON para
/// enviarla al registry.
struct PrintPublisher;

impl ComponentPublisher for PrintPublisher {
    fn publish(&mut self, request: &PublishRequest) -> CoreResult<()> {
        println!("{}", serde_json::to_string_pretty(request).map_err(CoreError::from)?);
        Ok(())
    }
}

fn run(invocation: args::Invocation) -> Result<(), WorkflowError> {
    let root = std::env::current_dir().map_err(CoreError::from)?;
    let mut workspace = ComponentWorkspace::new(invocation.kind, GitRevisionStore::new(root));
    match invocation.command {
        Command::Init { name,
                        description,
                        version,
                        definition, } => {
            workspace.init(&name, &description, version, definition)?;
            println!("initialized {} '{name}'", invocation.kind);
        }
        Command::Commit { message, version } => {
            let tag = workspace.commit(&message, version)?;
            println!("{tag}");
        }
        Command::Publish { remote,
                           remote_url,
                           registry, } => {
            let request = workspace.publish(&remote, remote_url.as_deref(), registry.as_deref(), &mut PrintPublisher)?;
            info!("pushed {} to {}", request.tag, request.git_remote_url);
        }
        Command::Versions => {
            for tag in workspace.versions()? {
                println!("{tag}");
            }
        }
    }
    Ok(())
}

fn main() {
    env_logger::init();
    let argv: Vec<String> = std::env::args().skip(1).collect();
    let invocation = match parse(&argv) {
        Ok(inv) => inv,
        Err(msg) => {
            eprintln!("{msg}\n{USAGE}");
            std::process::exit(2);
        }
    };
    if let Err(e) = run(invocation) {
        eprintln!("error: {e}");
        std::process::exit(e.exit_code());
    }
}
