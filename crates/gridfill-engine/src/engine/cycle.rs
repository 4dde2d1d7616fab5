//! Circular dependency detection for formula cells.
//!
//! Before a formula is committed, the workbook verifies it doesn't close a
//! loop (A1 → B1 → C1 → A1). Depth-first search over the "reads from" edges.

use std::collections::HashSet;

use super::Address;

/// Detect a circular dependency reachable from `start`.
/// `deps_of` returns the cells a formula cell reads (empty for literals).
/// Returns the cycle path (first and last element equal) if one is found.
pub fn detect_cycle<F>(start: &Address, deps_of: F) -> Option<Vec<Address>>
where
    F: Fn(&Address) -> Vec<Address>,
{
    let mut visiting = HashSet::new();
    let mut done = HashSet::new();
    let mut path = Vec::new();

    if dfs(start, &deps_of, &mut visiting, &mut done, &mut path) {
        Some(path)
    } else {
        None
    }
}

fn dfs<F>(
    current: &Address,
    deps_of: &F,
    visiting: &mut HashSet<Address>,
    done: &mut HashSet<Address>,
    path: &mut Vec<Address>,
) -> bool
where
    F: Fn(&Address) -> Vec<Address>,
{
    if visiting.contains(current) {
        path.push(*current);
        return true;
    }
    if done.contains(current) {
        return false;
    }

    visiting.insert(*current);
    path.push(*current);

    for dep in deps_of(current) {
        if dfs(&dep, deps_of, visiting, done, path) {
            return true;
        }
    }

    path.pop();
    visiting.remove(current);
    done.insert(*current);
    false
}
