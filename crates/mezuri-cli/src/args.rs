//! Parseo de la línea de comandos:
//! `mezuri <operator|source|interface> <init|commit|publish|versions> [opciones]`.

use mezuri_core::component::ComponentType;
use mezuri_core::spec::DefinitionLocation;
use mezuri_core::version::Version;

pub const USAGE: &str = "\
Uso:
  mezuri <operator|source|interface> init --name N [--description D] [--version V] [--definition FILE --class C]
  mezuri <operator|source|interface> commit <message> [-v VERSION]
  mezuri <operator|source|interface> publish [--remote NAME] [--remote-url URL] [--registry URL]
  mezuri <operator|source|interface> versions";

pub const DEFAULT_REMOTE: &str = "origin";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Init {
        name: String,
        description: String,
        version: Version,
        definition: Option<DefinitionLocation>,
    },
    Commit {
        message: String,
        version: Option<Version>,
    },
    Publish {
        remote: String,
        remote_url: Option<String>,
        registry: Option<String>,
    },
    Versions,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub kind: ComponentType,
    pub command: Command,
}

fn value_of<'a>(args: &'a [String], i: usize, flag: &str) -> Result<&'a str, String> {
    args.get(i).map(String::as_str).ok_or_else(|| format!("falta el valor de {flag}"))
}

/// Último valor dado a cualquiera de `names`.
fn flag_value(flags: &[(&str, &str)], names: &[&str]) -> Option<String> {
    flags.iter()
         .rev()
         .find(|(f, _)| names.contains(f))
         .map(|(_, v)| v.to_string())
}

fn ensure_known(flags: &[(&str, &str)], allowed: &[&str]) -> Result<(), String> {
    match flags.iter().find(|(f, _)| !allowed.contains(f)) {
        Some((f, _)) => Err(format!("opción desconocida {f}")),
        None => Ok(()),
    }
}

fn parse_version(text: &str) -> Result<Version, String> {
    text.parse().map_err(|e| format!("{e}"))
}

/// Parsea los argumentos sin el nombre del programa. El error es el
/// mensaje a mostrar junto al uso.
pub fn parse(args: &[String]) -> Result<Invocation, String> {
    let kind: ComponentType = args.first()
                                  .ok_or("falta la clase de componente")?
                                  .parse()
                                  .map_err(|_| format!("clase de componente desconocida '{}'", args[0]))?;
    let command = args.get(1).ok_or("falta el comando")?;
    let rest = &args[2..];

    let mut flags: Vec<(&str, &str)> = Vec::new();
    let mut positional: Vec<&str> = Vec::new();
    let mut i = 0;
    while i < rest.len() {
        let arg = rest[i].as_str();
        if arg.starts_with('-') {
            i += 1;
            flags.push((arg, value_of(rest, i, arg)?));
        } else {
            positional.push(arg);
        }
        i += 1;
    }

    let command = match command.as_str() {
        "init" => {
            ensure_known(&flags, &["--name", "--description", "--version", "-v", "--definition", "--class"])?;
            let name = flag_value(&flags, &["--name"]).ok_or("init requiere --name")?;
            let version = match flag_value(&flags, &["--version", "-v"]) {
                Some(v) => parse_version(&v)?,
                None => Version::default(),
            };
            let definition = match (flag_value(&flags, &["--definition"]), flag_value(&flags, &["--class"])) {
                (Some(file), Some(class)) => Some(DefinitionLocation { file, class }),
                (None, None) => None,
                _ => return Err("--definition y --class van juntos".to_string()),
            };
            Command::Init { name,
                            description: flag_value(&flags, &["--description"]).unwrap_or_default(),
                            version,
                            definition }
        }
        "commit" => {
            ensure_known(&flags, &["--version", "-v"])?;
            let message = positional.first().ok_or("commit requiere un mensaje")?.to_string();
            let version = flag_value(&flags, &["--version", "-v"]).map(|v| parse_version(&v)).transpose()?;
            Command::Commit { message, version }
        }
        "publish" => {
            ensure_known(&flags, &["--remote", "--remote-url", "--registry"])?;
            Command::Publish { remote: flag_value(&flags, &["--remote"]).unwrap_or_else(|| DEFAULT_REMOTE.to_string()),
                               remote_url: flag_value(&flags, &["--remote-url"]),
                               registry: flag_value(&flags, &["--registry"]) }
        }
        "versions" => Command::Versions,
        other => return Err(format!("comando desconocido '{other}'")),
    };
    Ok(Invocation { kind, command })
}
