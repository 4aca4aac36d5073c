use tree_sitter::Node;

/// Pre-order depth-first search below (and including) `root`.
///
/// Returns the first value `visit` produces. Siblings of `root` are never
/// visited, so the search is confined to its subtree.
pub fn find_first<'tree, T, F>(root: Node<'tree>, mut visit: F) -> Option<T>
where
    F: FnMut(Node<'tree>) -> Option<T>,
{
    let mut cursor = root.walk();
    let mut depth = 0usize;

    loop {
        if let Some(found) = visit(cursor.node()) {
            return Some(found);
        }

        if cursor.goto_first_child() {
            depth += 1;
            continue;
        }

        loop {
            if depth == 0 {
                return None;
            }
            if cursor.goto_next_sibling() {
                break;
            }
            cursor.goto_parent();
            depth -= 1;
        }
    }
}
