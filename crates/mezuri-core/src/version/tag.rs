use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use super::semver::Version;
use crate::component::ComponentType;
use crate::constants::TAG_PREFIX;
use crate::errors::{CoreError, Result};

/// Tag de versión `mezuri/{type}/{name}/{version}/{update_num}`.
///
/// Solo son comparables los tags de un mismo componente (misma clase y
/// nombre); `partial_cmp` devuelve `None` en otro caso.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VersionTag {
    pub component_type: ComponentType,
    pub name: String,
    pub version: Version,
    pub update_num: u32,
}

impl VersionTag {
    pub fn new(component_type: ComponentType, name: &str, version: Version) -> Self {
        Self { component_type,
               name: name.to_string(),
               version,
               update_num: 0 }
    }

    pub fn with_update_num(mut self, update_num: u32) -> Self {
        self.update_num = update_num;
        self
    }

    /// Mismo tag con el contador de actualización siguiente. Falla si el
    /// contador ya está en su máximo.
    pub fn with_incremented_update_num(&self) -> Result<Self> {
        let next = self.update_num
                       .checked_add(1)
                       .ok_or_else(|| CoreError::InvalidVersionTag(format!("{self}: update number overflow")))?;
        Ok(self.clone().with_update_num(next))
    }

    pub fn same_component(&self, other: &VersionTag) -> bool {
        self.component_type == other.component_type && self.name == other.name
    }

    /// Como `partial_cmp`, pero reporta los tags incomparables como error.
    pub fn try_cmp(&self, other: &VersionTag) -> Result<Ordering> {
        self.partial_cmp(other)
            .ok_or_else(|| CoreError::IncomparableTags { left: self.to_string(),
                                                         right: other.to_string() })
    }

    /// Mayor tag del componente `(component_type, name)` entre `tags`.
    /// Ignora los tags que no parsean y los de otros componentes.
    pub fn latest<I, S>(component_type: ComponentType, name: &str, tags: I) -> Option<VersionTag>
        where I: IntoIterator<Item = S>,
              S: AsRef<str>
    {
        tags.into_iter()
            .filter_map(|t| t.as_ref().parse::<VersionTag>().ok())
            .filter(|t| t.component_type == component_type && t.name == name)
            .max_by(|a, b| (a.version, a.update_num).cmp(&(b.version, b.update_num)))
    }
}

impl PartialOrd for VersionTag {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if !self.same_component(other) {
            return None;
        }
        Some((self.version, self.update_num).cmp(&(other.version, other.update_num)))
    }
}

impl fmt::Display for VersionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{TAG_PREFIX}/{}/{}/{}/{}", self.component_type, self.name, self.version, self.update_num)
    }
}

impl FromStr for VersionTag {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || CoreError::InvalidVersionTag(s.to_string());
        let parts: Vec<&str> = s.split('/').collect();
        let (kind, name, version, update_num) = match parts.as_slice() {
            [prefix, kind, name, version] if *prefix == TAG_PREFIX => (kind, name, version, 0),
            [prefix, kind, name, version, n] if *prefix == TAG_PREFIX => {
                (kind, name, version, n.parse::<u32>().map_err(|_| invalid())?)
            }
            _ => return Err(invalid()),
        };
        if name.is_empty() {
            return Err(invalid());
        }
        Ok(VersionTag { component_type: kind.parse().map_err(|_| invalid())?,
                        name: name.to_string(),
                        version: version.parse().map_err(|_| invalid())?,
                        update_num })
    }
}
