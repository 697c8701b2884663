//! The payload the SS-tree indexes: an embedding tagged with a path.

use crate::embedding::Embedding;

/// An embedded item. Identity is by `path` (spec.md §4.4's Data Model),
/// not by embedding value — two entries at the same coordinates but
/// different paths are distinct, and re-inserting the same path is a
/// no-op rather than a duplicate leaf entry.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "debug", derive(serde::Serialize, serde::Deserialize))]
pub struct Data {
    embedding: Embedding,
    path: String,
}

impl Data {
    pub fn new(embedding: Embedding, path: impl Into<String>) -> Self {
        Data {
            embedding,
            path: path.into(),
        }
    }

    pub fn embedding(&self) -> &Embedding {
        &self.embedding
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

impl PartialEq for Data {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

impl Eq for Data {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_is_by_path_not_embedding() {
        let a = Data::new(Embedding::new(vec![1.0]), "/a");
        let b = Data::new(Embedding::new(vec![99.0]), "/a");
        let c = Data::new(Embedding::new(vec![1.0]), "/c");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
