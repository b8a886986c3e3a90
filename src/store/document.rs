use serde_json::{Map, Value};

use crate::store::StorePath;

pub(crate) fn get<'a>(root: &'a Value, path: &StorePath) -> Option<&'a Value> {
    let mut node = root;
    for segment in path.segments() {
        node = node.as_object()?.get(segment)?;
    }
    if node.is_null() {
        None
    } else {
        Some(node)
    }
}

/// Writes `value` at `path`, creating intermediate objects. A `null` value
/// removes the node instead.
pub(crate) fn set(root: &mut Value, path: &StorePath, value: Value) {
    if value.is_null() {
        remove(root, path);
        return;
    }

    let Some((leaf, parents)) = path.segments().split_last() else {
        *root = value;
        return;
    };

    let mut node = root;
    for segment in parents {
        node = ensure_object(node)
            .entry(segment.clone())
            .or_insert_with(|| Value::Object(Map::new()));
    }
    ensure_object(node).insert(leaf.clone(), value);
}

/// Removes the node at `path` and prunes any ancestors left empty.
pub(crate) fn remove(root: &mut Value, path: &StorePath) {
    if path.is_root() {
        *root = Value::Object(Map::new());
        return;
    }
    remove_segments(root, path.segments());
}

fn remove_segments(node: &mut Value, segments: &[String]) -> bool {
    let Some(object) = node.as_object_mut() else {
        return false;
    };
    let Some((head, rest)) = segments.split_first() else {
        return false;
    };

    if rest.is_empty() {
        object.remove(head);
    } else if let Some(child) = object.get_mut(head) {
        if remove_segments(child, rest) {
            object.remove(head);
        }
    }
    object.is_empty()
}

fn ensure_object(node: &mut Value) -> &mut Map<String, Value> {
    if !node.is_object() {
        *node = Value::Object(Map::new());
    }
    match node {
        Value::Object(map) => map,
        _ => unreachable!("node was just replaced by an object"),
    }
}
