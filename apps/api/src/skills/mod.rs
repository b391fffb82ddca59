// Skill ontology and the nearest-neighbour index used to infer parent skills.

pub mod index;
pub mod ontology;
pub mod vector;
