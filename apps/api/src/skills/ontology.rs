//! Skill Ontology: immutable parent → children mapping, loaded once at startup.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum OntologyError {
    #[error("Failed to read skill ontology at {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Skill ontology is not a {{\"parent\": [\"child\", ...]}} object: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Broad skill categories (parents) and the specific skills that imply them (children).
#[derive(Debug, Clone)]
pub struct SkillOntology {
    parents: BTreeMap<String, Vec<String>>,
    child_to_parents: HashMap<String, Vec<String>>,
}

impl SkillOntology {
    pub fn new(parents: BTreeMap<String, Vec<String>>) -> Self {
        let mut child_to_parents: HashMap<String, Vec<String>> = HashMap::new();
        for (parent, children) in &parents {
            for child in children {
                let owners = child_to_parents.entry(child.clone()).or_default();
                if !owners.contains(parent) {
                    owners.push(parent.clone());
                }
            }
        }

        Self {
            parents,
            child_to_parents,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, OntologyError> {
        let parents: BTreeMap<String, Vec<String>> = serde_json::from_str(json)?;
        Ok(Self::new(parents))
    }

    pub fn load(path: &Path) -> Result<Self, OntologyError> {
        let json = std::fs::read_to_string(path).map_err(|source| OntologyError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Every label to index: all parents, then all children, in ontology order.
    /// A label listed in several places appears once per listing.
    pub fn labels(&self) -> Vec<String> {
        self.parents
            .keys()
            .cloned()
            .chain(self.parents.values().flatten().cloned())
            .collect()
    }

    /// Parents of `label` if it is a recognized child skill; empty otherwise.
    pub fn parents_of(&self, label: &str) -> &[String] {
        self.child_to_parents
            .get(label)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn parent_count(&self) -> usize {
        self.parents.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const ONTOLOGY_JSON: &str = r#"{
        "Machine Learning": ["scikit-learn", "xgboost"],
        "Data Analysis": ["pandas", "scikit-learn"]
    }"#;

    #[test]
    fn test_child_maps_to_every_parent() {
        let ontology = SkillOntology::from_json(ONTOLOGY_JSON).unwrap();
        assert_eq!(
            ontology.parents_of("scikit-learn"),
            ["Data Analysis".to_string(), "Machine Learning".to_string()]
        );
        assert_eq!(ontology.parents_of("xgboost"), ["Machine Learning".to_string()]);
    }

    #[test]
    fn test_parent_label_is_not_a_child() {
        let ontology = SkillOntology::from_json(ONTOLOGY_JSON).unwrap();
        assert!(ontology.parents_of("Machine Learning").is_empty());
    }

    #[test]
    fn test_labels_lists_parents_then_children() {
        let ontology = SkillOntology::from_json(ONTOLOGY_JSON).unwrap();
        let labels = ontology.labels();
        assert_eq!(labels.len(), 2 + 4);
        assert_eq!(labels[0], "Data Analysis");
        assert_eq!(labels[1], "Machine Learning");
        assert_eq!(labels[2], "pandas");
    }

    #[test]
    fn test_malformed_json_is_rejected() {
        let err = SkillOntology::from_json(r#"["not", "a", "map"]"#).unwrap_err();
        assert!(matches!(err, OntologyError::Malformed(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(ONTOLOGY_JSON.as_bytes()).unwrap();

        let ontology = SkillOntology::load(file.path()).unwrap();
        assert_eq!(ontology.parent_count(), 2);
    }

    #[test]
    fn test_load_missing_file_names_path() {
        let err = SkillOntology::load(Path::new("/nonexistent/ontology.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/ontology.json"));
    }

    #[test]
    fn test_bundled_ontology_parses() {
        let json = include_str!("../../../../data/skill_ontology.json");
        let ontology = SkillOntology::from_json(json).unwrap();
        assert!(ontology
            .parents_of("scikit-learn")
            .contains(&"Machine Learning".to_string()));
    }
}
