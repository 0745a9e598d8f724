//! Controlled vocabulary of certificate types.
//!
//! Nodes live in an arena indexed by id, so rendering a node's full label walks
//! parent links in O(depth) instead of rescanning the list.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

pub const PATH_SEPARATOR: &str = " › ";

const STANDARD_TYPES: [&str; 7] = ["NR-01", "NR-06", "NR-10", "NR-20", "NR-33", "NR-35", "ASO"];

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrainingTypeId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingType {
    pub id: TrainingTypeId,
    pub name: String,
    #[serde(default)]
    pub parent_id: Option<TrainingTypeId>,
}

/// Intake payload for a new taxonomy node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTrainingType {
    pub name: String,
    #[serde(default)]
    pub parent_id: Option<TrainingTypeId>,
}

/// Node as listed to callers, with its full path label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrainingTypeView {
    pub id: TrainingTypeId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<TrainingTypeId>,
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TaxonomyError {
    #[error("training type {0:?} is defined twice")]
    DuplicateId(TrainingTypeId),
    #[error("training type {child:?} references unknown parent {parent:?}")]
    UnknownParent {
        child: TrainingTypeId,
        parent: TrainingTypeId,
    },
    #[error("training type {0:?} is part of a parent cycle")]
    Cycle(TrainingTypeId),
}

/// Tree of training types built from flat parent-pointer records.
#[derive(Debug, Clone, Default)]
pub struct TrainingTaxonomy {
    nodes: Vec<TrainingType>,
    index: HashMap<TrainingTypeId, usize>,
    children: HashMap<usize, Vec<usize>>,
    roots: Vec<usize>,
}

impl TrainingTaxonomy {
    pub fn from_nodes(nodes: Vec<TrainingType>) -> Result<Self, TaxonomyError> {
        let mut index = HashMap::with_capacity(nodes.len());
        for (position, node) in nodes.iter().enumerate() {
            if index.insert(node.id.clone(), position).is_some() {
                return Err(TaxonomyError::DuplicateId(node.id.clone()));
            }
        }

        let mut children: HashMap<usize, Vec<usize>> = HashMap::new();
        let mut roots = Vec::new();
        for (position, node) in nodes.iter().enumerate() {
            match &node.parent_id {
                None => roots.push(position),
                Some(parent) => {
                    let parent_position =
                        *index
                            .get(parent)
                            .ok_or_else(|| TaxonomyError::UnknownParent {
                                child: node.id.clone(),
                                parent: parent.clone(),
                            })?;
                    children.entry(parent_position).or_default().push(position);
                }
            }
        }

        let taxonomy = Self {
            nodes,
            index,
            children,
            roots,
        };

        for node in &taxonomy.nodes {
            if taxonomy.ancestors(&node.id).is_none() {
                return Err(TaxonomyError::Cycle(node.id.clone()));
            }
        }

        Ok(taxonomy)
    }

    /// Flat fallback used when the persistence layer has no taxonomy yet.
    pub fn standard() -> Self {
        let nodes = STANDARD_TYPES
            .iter()
            .map(|name| TrainingType {
                id: TrainingTypeId((*name).to_string()),
                name: (*name).to_string(),
                parent_id: None,
            })
            .collect();

        Self::from_nodes(nodes).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn get(&self, id: &TrainingTypeId) -> Option<&TrainingType> {
        self.index.get(id).map(|&position| &self.nodes[position])
    }

    pub fn has_children(&self, id: &TrainingTypeId) -> bool {
        self.index
            .get(id)
            .and_then(|position| self.children.get(position))
            .map(|children| !children.is_empty())
            .unwrap_or(false)
    }

    /// Positions from the root down to `id`, or `None` when the walk loops.
    fn ancestors(&self, id: &TrainingTypeId) -> Option<Vec<usize>> {
        let mut chain = Vec::new();
        let mut cursor = self.index.get(id).copied();

        while let Some(position) = cursor {
            if chain.len() > self.nodes.len() {
                return None;
            }
            chain.push(position);
            cursor = self.nodes[position]
                .parent_id
                .as_ref()
                .and_then(|parent| self.index.get(parent).copied());
        }

        chain.reverse();
        Some(chain)
    }

    /// Full label of a node, e.g. `NR-10 › Básico`.
    pub fn path(&self, id: &TrainingTypeId) -> Option<String> {
        let chain = self.ancestors(id)?;
        if chain.is_empty() {
            return None;
        }
        Some(
            chain
                .iter()
                .map(|&position| self.nodes[position].name.as_str())
                .collect::<Vec<_>>()
                .join(PATH_SEPARATOR),
        )
    }

    /// Every full label, depth first, siblings sorted by name.
    pub fn labels(&self) -> Vec<String> {
        self.walk().into_iter().map(|(_, label)| label).collect()
    }

    /// Nodes in label order, each with its rendered path.
    pub fn views(&self) -> Vec<TrainingTypeView> {
        self.walk()
            .into_iter()
            .map(|(position, path)| {
                let node = &self.nodes[position];
                TrainingTypeView {
                    id: node.id.clone(),
                    name: node.name.clone(),
                    parent_id: node.parent_id.clone(),
                    path,
                }
            })
            .collect()
    }

    fn walk(&self) -> Vec<(usize, String)> {
        let mut visited = Vec::with_capacity(self.nodes.len());
        let mut roots = self.roots.clone();
        self.sort_by_name(&mut roots);
        for root in roots {
            self.collect_paths(root, String::new(), &mut visited);
        }
        visited
    }

    fn collect_paths(
        &self,
        position: usize,
        prefix: String,
        visited: &mut Vec<(usize, String)>,
    ) {
        let label = if prefix.is_empty() {
            self.nodes[position].name.clone()
        } else {
            format!("{prefix}{PATH_SEPARATOR}{}", self.nodes[position].name)
        };
        visited.push((position, label.clone()));

        if let Some(children) = self.children.get(&position) {
            let mut children = children.clone();
            self.sort_by_name(&mut children);
            for child in children {
                self.collect_paths(child, label.clone(), visited);
            }
        }
    }

    fn sort_by_name(&self, positions: &mut [usize]) {
        positions.sort_by(|a, b| self.nodes[*a].name.cmp(&self.nodes[*b].name));
    }

    pub fn contains_label(&self, label: &str) -> bool {
        self.labels().iter().any(|candidate| candidate == label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str, name: &str, parent: Option<&str>) -> TrainingType {
        TrainingType {
            id: TrainingTypeId(id.to_string()),
            name: name.to_string(),
            parent_id: parent.map(|value| TrainingTypeId(value.to_string())),
        }
    }

    #[test]
    fn renders_hierarchical_paths() {
        let taxonomy = TrainingTaxonomy::from_nodes(vec![
            node("3", "Básico", Some("1")),
            node("1", "NR-10", None),
            node("2", "ASO", None),
            node("4", "SEP", Some("1")),
        ])
        .expect("valid taxonomy");

        assert_eq!(
            taxonomy.path(&TrainingTypeId("3".to_string())).as_deref(),
            Some("NR-10 › Básico")
        );
        assert_eq!(
            taxonomy.labels(),
            vec!["ASO", "NR-10", "NR-10 › Básico", "NR-10 › SEP"]
        );
        assert!(taxonomy.contains_label("NR-10 › SEP"));
        assert!(taxonomy.has_children(&TrainingTypeId("1".to_string())));
        assert!(!taxonomy.has_children(&TrainingTypeId("2".to_string())));
    }

    #[test]
    fn rejects_unknown_parent_and_cycles() {
        let unknown = TrainingTaxonomy::from_nodes(vec![node("1", "Child", Some("9"))]);
        assert!(matches!(unknown, Err(TaxonomyError::UnknownParent { .. })));

        let cycle = TrainingTaxonomy::from_nodes(vec![
            node("a", "A", Some("b")),
            node("b", "B", Some("a")),
        ]);
        assert!(matches!(cycle, Err(TaxonomyError::Cycle(_))));

        let duplicate =
            TrainingTaxonomy::from_nodes(vec![node("a", "A", None), node("a", "B", None)]);
        assert!(matches!(duplicate, Err(TaxonomyError::DuplicateId(_))));
    }

    #[test]
    fn standard_taxonomy_covers_critical_types() {
        let taxonomy = TrainingTaxonomy::standard();
        for name in ["NR-33", "NR-35", "NR-10", "NR-20", "ASO"] {
            assert!(taxonomy.contains_label(name), "{name} missing");
        }
        assert_eq!(taxonomy.len(), 7);
    }
}
