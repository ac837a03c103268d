/// Hierarchical fixture registry: definitions are stored at a [`Location`]
/// and looked up from the requesting location up to the root.
use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use crate::{FixtureDef, Location, RegistryError};

/// Handle of a registered definition.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct DefId(usize);

#[derive(Debug)]
struct Registered {
    location: Location,
    def: FixtureDef,
}

#[derive(Default, Debug)]
pub struct Registry {
    defs: Vec<Registered>,
    index: HashMap<Location, HashMap<String, DefId>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `def` at `location`. The same name can be defined again in a
    /// descendant location (shadowing) but not twice in the same one.
    pub fn register(
        &mut self,
        location: impl Into<Location>,
        def: FixtureDef,
    ) -> Result<DefId, RegistryError> {
        let location = location.into();
        let names = self.index.entry(location.clone()).or_default();
        if names.contains_key(def.name()) {
            return Err(RegistryError::DuplicateDefinition {
                name: def.name().to_owned(),
                location,
            });
        }
        let id = DefId(self.defs.len());
        debug!(fixture = def.name(), %location, scope = %def.get_scope(), "register fixture");
        names.insert(def.name().to_owned(), id);
        self.defs.push(Registered { location, def });
        Ok(id)
    }

    /// Find the definition of `name` visible from `from`: the nearest one
    /// walking from `from` up to the root.
    pub fn lookup(&self, name: &str, from: &Location) -> Option<DefId> {
        from.ancestors().find_map(|location| {
            self.index
                .get(&location)
                .and_then(|names| names.get(name))
                .copied()
        })
    }

    pub fn get(&self, id: DefId) -> &FixtureDef {
        &self.defs[id.0].def
    }

    pub fn location(&self, id: DefId) -> &Location {
        &self.defs[id.0].location
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    /// All fixtures a test at `from` can request, sorted by name: shadowed
    /// definitions are left out.
    pub fn visible_from(&self, from: &Location) -> Vec<DefId> {
        let mut visible = BTreeMap::new();
        for location in from.ancestors() {
            if let Some(names) = self.index.get(&location) {
                for (name, id) in names {
                    visible.entry(name.as_str()).or_insert(*id);
                }
            }
        }
        visible.into_values().collect()
    }

    /// Every registration, in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (DefId, &Location, &FixtureDef)> {
        self.defs
            .iter()
            .enumerate()
            .map(|(n, r)| (DefId(n), &r.location, &r.def))
    }
}
