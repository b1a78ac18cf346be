use std::collections::HashMap;

use uuid::Uuid;

use super::CommentTree;

/// Nests a flat list of comments (all from the same post) into a forest.
///
/// Roots and every `replies` list keep the order the comments came in, so
/// callers sort the input to get the order they want. A comment whose parent
/// is not part of the batch is shown at the top level instead of being
/// dropped. Every input comment ends up in the output exactly once.
pub fn build_tree(comments: Vec<CommentTree>) -> Vec<CommentTree> {
    let n = comments.len();

    // Index by id so attaching children is O(n) instead of O(n^2)
    let index: HashMap<Uuid, usize> = comments
        .iter()
        .enumerate()
        .map(|(i, c)| (c.id, i))
        .collect();

    let mut children: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut top_level = Vec::new();

    for (i, comment) in comments.iter().enumerate() {
        match comment.parent_id.and_then(|p| index.get(&p)).copied() {
            Some(parent) if parent != i => children[parent].push(i),
            _ => top_level.push(i),
        }
    }

    let mut walk = Walk {
        children: &children,
        visited: vec![false; n],
        tree_parent: vec![None; n],
        depth: vec![0; n],
        order: Vec::with_capacity(n),
    };

    for &root in &top_level {
        walk.visit(root);
    }

    // Anything left over sits on a parent cycle. Promote the first member of
    // each cycle to the top level so it is still shown.
    for i in 0..n {
        if !walk.visited[i] {
            top_level.push(i);
            walk.visit(i);
        }
    }

    let Walk {
        visited: _,
        tree_parent,
        depth,
        order,
        ..
    } = walk;

    let mut pending: Vec<Option<CommentTree>> = comments.into_iter().map(Some).collect();
    let mut built: Vec<Option<CommentTree>> = (0..n).map(|_| None).collect();

    // Children come after their parent in pre-order, so walking it backwards
    // finishes every subtree before its parent needs it
    for &i in order.iter().rev() {
        let Some(mut comment) = pending[i].take() else {
            continue;
        };

        comment.depth = depth[i];
        comment.replies = children[i]
            .iter()
            .filter(|&&c| tree_parent[c] == Some(i))
            .filter_map(|&c| built[c].take())
            .collect();

        built[i] = Some(comment);
    }

    top_level
        .into_iter()
        .filter_map(|i| built[i].take())
        .collect()
}

struct Walk<'a> {
    children: &'a [Vec<usize>],
    visited: Vec<bool>,
    tree_parent: Vec<Option<usize>>,
    depth: Vec<usize>,
    order: Vec<usize>,
}

impl Walk<'_> {
    /// Iterative pre-order traversal from `start`, so long reply chains can't
    /// overflow the stack.
    fn visit(&mut self, start: usize) {
        let mut stack = vec![(start, None, 0)];

        while let Some((node, parent, depth)) = stack.pop() {
            if self.visited[node] {
                continue;
            }

            self.visited[node] = true;
            self.tree_parent[node] = parent;
            self.depth[node] = depth;
            self.order.push(node);

            // reversed so children are popped in input order
            stack.extend(
                self.children[node]
                    .iter()
                    .rev()
                    .filter(|&&c| !self.visited[c])
                    .map(|&c| (c, Some(node), depth + 1)),
            );
        }
    }
}

/// Pre-order traversal of a forest.
pub fn flatten(forest: &[CommentTree]) -> Vec<&CommentTree> {
    let mut result = Vec::new();
    let mut stack: Vec<&CommentTree> = forest.iter().rev().collect();

    while let Some(comment) = stack.pop() {
        result.push(comment);
        stack.extend(comment.replies.iter().rev());
    }

    result
}

/// An optimistic change to a comment forest the client already holds, applied
/// after the matching store write succeeded and without refetching.
#[derive(Debug, Clone)]
pub enum TreePatch {
    /// Place a new comment under its `parent_id`, or first among the roots
    /// when it has none.
    Insert(CommentTree),
    /// Drop a comment together with everything nested under it.
    Remove(Uuid),
}

/// Applies `patch` in place. Returns whether the forest changed.
pub fn apply_patch(forest: &mut Vec<CommentTree>, patch: TreePatch) -> bool {
    match patch {
        TreePatch::Insert(mut comment) => {
            let parent = match comment.parent_id {
                Some(parent_id) => find_mut(forest, parent_id),
                None => None,
            };

            if let Some(parent) = parent {
                comment.depth = parent.depth + 1;
                parent.replies.push(comment);
            } else {
                // Same as the builder: an unknown parent puts it at the top
                comment.depth = 0;
                forest.insert(0, comment);
            }
            true
        }
        TreePatch::Remove(id) => remove(forest, id),
    }
}

/// Sibling indices leading from the roots to the comment with `id`, found
/// without recursion like the builder.
fn path_to(forest: &[CommentTree], id: Uuid) -> Option<Vec<usize>> {
    // One frame per level: the siblings being scanned and the next position
    let mut frames: Vec<(&[CommentTree], usize)> = vec![(forest, 0)];

    while let Some(frame) = frames.last_mut() {
        let (level, pos) = *frame;
        if pos == level.len() {
            frames.pop();
            continue;
        }
        frame.1 += 1;

        let comment = &level[pos];
        if comment.id == id {
            return Some(frames.iter().map(|&(_, next)| next - 1).collect());
        }
        frames.push((comment.replies.as_slice(), 0));
    }

    None
}

fn descend<'a>(forest: &'a mut [CommentTree], path: &[usize]) -> Option<&'a mut CommentTree> {
    let (&first, rest) = path.split_first()?;
    let mut node = &mut forest[first];
    for &i in rest {
        node = &mut node.replies[i];
    }
    Some(node)
}

fn find_mut(forest: &mut [CommentTree], id: Uuid) -> Option<&mut CommentTree> {
    let path = path_to(forest, id)?;
    descend(forest, &path)
}

fn remove(forest: &mut Vec<CommentTree>, id: Uuid) -> bool {
    let Some(path) = path_to(forest, id) else {
        return false;
    };
    let Some((&last, parents)) = path.split_last() else {
        return false;
    };

    let siblings = if parents.is_empty() {
        forest
    } else {
        match descend(forest, parents) {
            Some(parent) => &mut parent.replies,
            None => return false,
        }
    };
    siblings.remove(last);
    true
}
