//! Product categories.

use serde::{Deserialize, Serialize};

use crate::types::CategoryId;

/// A node in the category tree returned by `/api/categories`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTreeNode {
    pub id: CategoryId,
    pub name: String,
    pub parent_id: Option<CategoryId>,
    pub level: Option<u32>,
    #[serde(default)]
    pub children: Vec<Self>,
}

impl CategoryTreeNode {
    /// Depth-first search for a category by ID.
    #[must_use]
    pub fn find(&self, id: &CategoryId) -> Option<&Self> {
        if &self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(id))
    }

    /// Iterate over this node and all its descendants, depth first.
    pub fn walk(&self) -> impl Iterator<Item = &Self> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            stack.extend(node.children.iter().rev());
            Some(node)
        })
    }
}

/// Create or rename a category (admin).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<CategoryId>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn tree() -> CategoryTreeNode {
        serde_json::from_str(
            r#"{"id":"c1","name":"Rau củ","parentId":null,"level":1,"children":[
                {"id":"c2","name":"Rau lá","parentId":"c1","level":2,"children":[]},
                {"id":"c3","name":"Củ quả","parentId":"c1","level":2,"children":[
                    {"id":"c4","name":"Khoai","parentId":"c3","level":3}
                ]}
            ]}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_find_nested() {
        let root = tree();
        assert_eq!(root.find(&CategoryId::new("c4")).unwrap().name, "Khoai");
        assert!(root.find(&CategoryId::new("missing")).is_none());
    }

    #[test]
    fn test_walk_is_depth_first() {
        let root = tree();
        let ids: Vec<_> = root.walk().map(|n| n.id.as_str().to_string()).collect();
        assert_eq!(ids, ["c1", "c2", "c3", "c4"]);
    }
}
