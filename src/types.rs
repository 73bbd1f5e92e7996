use std::fmt;

/// A declared file type. Identity is by name alone.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileType {
    name: String,
}

impl FileType {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
