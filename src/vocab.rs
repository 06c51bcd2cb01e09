use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::Path;

/// Ordered class vocabulary shared by label generation and consumption.
///
/// A label's class index is its position in `names`, so the same vocabulary
/// (and the same `version`) must be used when labels are generated and when
/// they are read back. The two built-in variants must not be mixed within
/// one dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vocabulary {
    pub version: u32,
    pub names: Vec<String>,
}

impl Vocabulary {
    /// Digits 0-9, letters A-Z, then the sentinel labels `del`, `nothing`,
    /// `space` (39 classes)
    pub fn combined() -> Self {
        let mut names: Vec<String> = (0..10).map(|d| d.to_string()).collect();
        names.extend(('A'..='Z').map(|c| c.to_string()));
        names.extend(["del", "nothing", "space"].map(String::from));
        Self { version: 1, names }
    }

    /// Letters A-Z only (26 classes)
    pub fn letters() -> Self {
        Self {
            version: 1,
            names: ('A'..='Z').map(|c| c.to_string()).collect(),
        }
    }

    /// Load a vocabulary from a JSON file of the form
    /// `{"version": 1, "names": ["0", "1", ...]}`
    pub fn from_json_file(path: &Path) -> io::Result<Self> {
        let file = fs::File::open(path)?;
        let vocab: Vocabulary = serde_json::from_reader(file)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        vocab.validate()?;
        Ok(vocab)
    }

    /// Resolve a CLI selector: the built-in names `combined` and `letters`,
    /// or a path to a vocabulary JSON file
    pub fn resolve(selector: &str) -> io::Result<Self> {
        match selector {
            "combined" => Ok(Self::combined()),
            "letters" => Ok(Self::letters()),
            path => Self::from_json_file(Path::new(path)),
        }
    }

    fn validate(&self) -> io::Result<()> {
        if self.names.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "vocabulary has no class names",
            ));
        }
        let mut seen = HashSet::new();
        for name in &self.names {
            if !seen.insert(name.as_str()) {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("duplicate class name in vocabulary: {}", name),
                ));
            }
        }
        Ok(())
    }

    /// Zero-based class index of `name`, or `None` if the name is unknown
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
