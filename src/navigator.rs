//! Relocation along the tree of known paths.

use crate::infra::Position;

/// Intermediate moves taking the agent from the end of `current_path` to
/// the parent of the last cell of `target_path`.
///
/// Both paths start at the origin. The route walks back along the current
/// path to the last cell the two paths share, then forward along the target
/// path. Neither the current cell nor the target itself is included, so the
/// route is empty when the target is the current cell or adjacent to it.
pub fn plan_route(current_path: &[Position], target_path: &[Position]) -> Vec<Position> {
    let (Some(current), Some(target)) = (current_path.last(), target_path.last()) else {
        return Vec::new();
    };
    if current == target || current.is_adjacent(target) {
        return Vec::new();
    }

    let shared = current_path
        .iter()
        .zip(target_path)
        .take_while(|(a, b)| a == b)
        .count();
    if shared == 0 {
        return Vec::new();
    }
    if shared == target_path.len() {
        // The target is one of current's ancestors.
        return current_path[shared..current_path.len() - 1]
            .iter()
            .rev()
            .copied()
            .collect();
    }

    // Back: current's ancestors down to the branching cell.
    let back = current_path[shared - 1..current_path.len() - 1].iter().rev();
    // Forward: below the branching cell up to the target's parent.
    let forward = target_path[shared..target_path.len() - 1].iter();

    back.chain(forward).copied().collect()
}
