use crate::error::{Result, SpoolerError};
use crate::registry::TypeRegistry;
use crate::types::FileType;

/// The lifecycle state of a declared printer (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrinterStatus {
    Disabled,
    Idle,
    Busy,
}

impl PrinterStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrinterStatus::Disabled => "disabled",
            PrinterStatus::Idle => "idle",
            PrinterStatus::Busy => "busy",
        }
    }
}

/// A named endpoint pinned to a single file type (spec §3).
#[derive(Debug, Clone)]
pub struct Printer {
    pub name: String,
    pub file_type: FileType,
    pub status: PrinterStatus,
}

/// A stable, non-owning handle into the Printer Registry (spec design notes:
/// "model as an index into the printer store or a handle type").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrinterHandle(pub usize);

/// Bounded set of named printers (spec §4.1).
pub struct PrinterRegistry {
    printers: Vec<Printer>,
    capacity: usize,
}

impl PrinterRegistry {
    pub fn new(capacity: usize) -> Self {
        Self {
            printers: Vec::new(),
            capacity,
        }
    }

    pub fn add(&mut self, name: &str, type_name: &str, types: &TypeRegistry) -> Result<PrinterHandle> {
        if self.printers.iter().any(|p| p.name == name) {
            return Err(SpoolerError::DuplicateName(name.to_string()));
        }
        let file_type = types
            .lookup(type_name)
            .ok_or_else(|| SpoolerError::UnknownType(type_name.to_string()))?
            .clone();
        if self.printers.len() >= self.capacity {
            return Err(SpoolerError::Full);
        }

        let handle = PrinterHandle(self.printers.len());
        self.printers.push(Printer {
            name: name.to_string(),
            file_type,
            status: PrinterStatus::Disabled,
        });
        Ok(handle)
    }

    /// Disabled -> Idle. No-op if already Idle. Errors if the printer
    /// doesn't exist.
    pub fn enable(&mut self, name: &str) -> Result<PrinterHandle> {
        let (idx, printer) = self
            .printers
            .iter_mut()
            .enumerate()
            .find(|(_, p)| p.name == name)
            .ok_or_else(|| SpoolerError::UnknownPrinter(name.to_string()))?;
        printer.status = PrinterStatus::Idle;
        Ok(PrinterHandle(idx))
    }

    pub fn lookup(&self, name: &str) -> Option<PrinterHandle> {
        self.printers
            .iter()
            .position(|p| p.name == name)
            .map(PrinterHandle)
    }

    pub fn get(&self, handle: PrinterHandle) -> &Printer {
        &self.printers[handle.0]
    }

    pub fn get_mut(&mut self, handle: PrinterHandle) -> &mut Printer {
        &mut self.printers[handle.0]
    }

    pub fn all(&self) -> impl Iterator<Item = (PrinterHandle, &Printer)> {
        self.printers
            .iter()
            .enumerate()
            .map(|(i, p)| (PrinterHandle(i), p))
    }

    /// First Idle printer whose type matches `from_type` exactly; else the
    /// first Idle printer reachable from `from_type` via a conversion path.
    /// Registry insertion order breaks ties; a direct match is always
    /// preferred over one requiring conversion (spec §4.1).
    pub fn select_compatible(
        &self,
        from_type: &FileType,
        types: &TypeRegistry,
    ) -> Option<PrinterHandle> {
        let direct = self.printers.iter().enumerate().find(|(_, p)| {
            p.status == PrinterStatus::Idle && &p.file_type == from_type
        });
        if let Some((idx, _)) = direct {
            return Some(PrinterHandle(idx));
        }

        self.printers
            .iter()
            .enumerate()
            .find(|(_, p)| {
                p.status == PrinterStatus::Idle
                    && types
                        .find_path(from_type.name(), p.file_type.name())
                        .is_some()
            })
            .map(|(idx, _)| PrinterHandle(idx))
    }

    pub fn set_status(&mut self, handle: PrinterHandle, status: PrinterStatus) {
        self.printers[handle.0].status = status;
    }
}
