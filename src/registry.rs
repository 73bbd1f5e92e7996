use std::collections::{HashMap, VecDeque};

use crate::error::{Result, SpoolerError};
use crate::types::FileType;

/// A declared conversion edge: an external program (argv) that turns
/// bytes of type `from` into bytes of type `to` (spec §3).
#[derive(Debug, Clone)]
pub struct Conversion {
    pub from: FileType,
    pub to: FileType,
    pub argv: Vec<String>,
}

/// The Type & Conversion Registry (spec §4.2, §9 "Conversion graph").
///
/// Declared out of scope as a *component* — the real collaborator is the
/// interactive command parser wiring user `type`/`conversion` declarations
/// into it — but `find_path`'s contract is load-bearing for the Pipeline
/// Engine, so a concrete implementation lives here.
pub struct TypeRegistry {
    types: Vec<FileType>,
    by_name: HashMap<String, usize>,
    /// Declared conversions, in insertion order. At most one edge per
    /// ordered (from, to) pair; a second declaration for the same pair
    /// replaces the first *in place*, so insertion-order tie-breaking in
    /// `find_path` is unaffected by redeclaration (last-wins, spec §3).
    conversions: Vec<Conversion>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self {
            types: Vec::new(),
            by_name: HashMap::new(),
            conversions: Vec::new(),
        }
    }

    pub fn declare_type(&mut self, name: &str) -> Result<FileType> {
        if let Some(&idx) = self.by_name.get(name) {
            return Ok(self.types[idx].clone());
        }
        let file_type = FileType::new(name);
        self.by_name.insert(name.to_string(), self.types.len());
        self.types.push(file_type.clone());
        Ok(file_type)
    }

    pub fn lookup(&self, name: &str) -> Option<&FileType> {
        self.by_name.get(name).map(|&idx| &self.types[idx])
    }

    /// Infer a file type from a filename extension. `doc.pdf` -> `pdf`.
    pub fn infer_from_path(&self, path: &str) -> Option<&FileType> {
        let ext = path.rsplit_once('.').map(|(_, ext)| ext)?;
        self.lookup(ext)
    }

    pub fn declare_conversion(
        &mut self,
        from_name: &str,
        to_name: &str,
        argv: Vec<String>,
    ) -> Result<()> {
        if argv.is_empty() {
            return Err(SpoolerError::WrongArgs);
        }
        let from = self
            .lookup(from_name)
            .ok_or_else(|| SpoolerError::UnknownType(from_name.to_string()))?
            .clone();
        let to = self
            .lookup(to_name)
            .ok_or_else(|| SpoolerError::UnknownType(to_name.to_string()))?
            .clone();

        if let Some(existing) = self
            .conversions
            .iter_mut()
            .find(|c| c.from == from && c.to == to)
        {
            existing.argv = argv;
        } else {
            self.conversions.push(Conversion { from, to, argv });
        }
        Ok(())
    }

    /// Shortest (fewest-stage) path of conversions from `from_name` to
    /// `to_name`, by BFS. Empty iff `from == to`. Ties broken by
    /// conversion insertion order (spec §4.2).
    pub fn find_path(&self, from_name: &str, to_name: &str) -> Option<Vec<Conversion>> {
        if from_name == to_name {
            return Some(Vec::new());
        }

        let mut visited = std::collections::HashSet::new();
        visited.insert(from_name.to_string());
        let mut queue = VecDeque::new();
        // Each queue entry: (current type name, path of conversions taken to reach it)
        queue.push_back((from_name.to_string(), Vec::<Conversion>::new()));

        while let Some((current, path)) = queue.pop_front() {
            for conv in &self.conversions {
                if conv.from.name() != current {
                    continue;
                }
                if conv.to.name() == to_name {
                    let mut full = path.clone();
                    full.push(conv.clone());
                    return Some(full);
                }
                if visited.insert(conv.to.name().to_string()) {
                    let mut next_path = path.clone();
                    next_path.push(conv.clone());
                    queue.push_back((conv.to.name().to_string(), next_path));
                }
            }
        }

        None
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}
