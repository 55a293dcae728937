//! Category hierarchy: building the navigation tree from flat rows and
//! guarding parent reassignment against cycles.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use uuid::Uuid;

use crate::core::error::AppError;
use crate::features::categories::models::Category;

/// A category with its children already resolved and ordered
#[derive(Debug, Clone)]
pub struct CategoryNode {
    pub category: Category,
    pub children: Vec<CategoryNode>,
}

/// Sibling order: display order, then name (case-insensitive), then id
pub fn sibling_order(a: &Category, b: &Category) -> Ordering {
    a.display_order
        .cmp(&b.display_order)
        .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
        .then_with(|| a.id.cmp(&b.id))
}

/// Build the category forest from a flat set of rows.
///
/// Roots are rows without a parent. Rows whose parent is not part of the
/// input are unreachable and left out, which is how descendants of a
/// filtered-out (inactive) category disappear from the public tree. Each
/// parent's group of children is consumed once, so corrupt cyclic rows
/// cannot cause unbounded recursion.
pub fn build_tree(rows: Vec<Category>) -> Vec<CategoryNode> {
    let mut by_parent: HashMap<Option<Uuid>, Vec<Category>> = HashMap::new();
    for row in rows {
        by_parent.entry(row.parent_id).or_default().push(row);
    }
    for siblings in by_parent.values_mut() {
        siblings.sort_by(sibling_order);
    }

    let roots = by_parent.remove(&None).unwrap_or_default();
    roots
        .into_iter()
        .map(|root| build_node(root, &mut by_parent))
        .collect()
}

fn build_node(category: Category, by_parent: &mut HashMap<Option<Uuid>, Vec<Category>>) -> CategoryNode {
    let children = by_parent
        .remove(&Some(category.id))
        .unwrap_or_default()
        .into_iter()
        .map(|child| build_node(child, by_parent))
        .collect();

    CategoryNode { category, children }
}

/// Walk the ancestor chain starting at `proposed_parent_id` and report
/// whether it reaches `category_id`.
///
/// Stops at a root, at an id missing from `parents`, or when a node is
/// revisited (already-corrupt data).
pub fn would_create_cycle(
    category_id: Uuid,
    proposed_parent_id: Uuid,
    parents: &HashMap<Uuid, Option<Uuid>>,
) -> bool {
    let mut visited = HashSet::new();
    let mut current = Some(proposed_parent_id);

    while let Some(id) = current {
        if id == category_id {
            return true;
        }
        if !visited.insert(id) {
            return false;
        }
        current = parents.get(&id).copied().flatten();
    }

    false
}

/// Why a proposed parent was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidParent {
    SelfParent,
    NotFound(Uuid),
    Inactive(Uuid),
    Cycle(Uuid),
}

impl std::fmt::Display for InvalidParent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvalidParent::SelfParent => write!(f, "A category cannot be its own parent"),
            InvalidParent::NotFound(id) => write!(f, "Parent category {} does not exist", id),
            InvalidParent::Inactive(id) => write!(f, "Parent category {} is not active", id),
            InvalidParent::Cycle(id) => write!(
                f,
                "Moving under category {} would create a circular reference",
                id
            ),
        }
    }
}

impl From<InvalidParent> for AppError {
    fn from(reason: InvalidParent) -> Self {
        match reason {
            InvalidParent::SelfParent | InvalidParent::NotFound(_) | InvalidParent::Inactive(_) => {
                AppError::Validation(format!("Invalid parent: {}", reason))
            }
            InvalidParent::Cycle(_) => AppError::Conflict(reason.to_string()),
        }
    }
}

/// Validate `proposed_parent_id` as the parent of `category_id` against the
/// full set of category rows. `category_id` is `None` for a category that
/// does not exist yet, in which case no cycle is possible.
pub fn check_parent(
    category_id: Option<Uuid>,
    proposed_parent_id: Uuid,
    rows: &[Category],
) -> Result<(), InvalidParent> {
    if category_id == Some(proposed_parent_id) {
        return Err(InvalidParent::SelfParent);
    }

    let parent = rows
        .iter()
        .find(|c| c.id == proposed_parent_id)
        .ok_or(InvalidParent::NotFound(proposed_parent_id))?;
    if !parent.is_active {
        return Err(InvalidParent::Inactive(proposed_parent_id));
    }

    if let Some(category_id) = category_id {
        let parents: HashMap<Uuid, Option<Uuid>> =
            rows.iter().map(|c| (c.id, c.parent_id)).collect();
        if would_create_cycle(category_id, proposed_parent_id, &parents) {
            return Err(InvalidParent::Cycle(proposed_parent_id));
        }
    }

    Ok(())
}
