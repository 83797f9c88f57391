use serde_json::{Map, Value};

/// Nesting level past which objects are replaced instead of merged.
pub const MAX_MERGE_DEPTH: usize = 8;

/// Merge `patch` into `target`.
///
/// When both sides hold an object under the same key the objects are merged
/// recursively; any other value in `patch` (arrays included) replaces the
/// current one outright. Recursion stops at [`MAX_MERGE_DEPTH`], below which
/// patch objects replace whatever is there.
pub fn deep_merge(target: &mut Map<String, Value>, patch: Map<String, Value>) {
    merge_at(target, patch, 0);
}

fn merge_at(target: &mut Map<String, Value>, patch: Map<String, Value>, depth: usize) {
    for (key, incoming) in patch {
        match incoming {
            Value::Object(incoming) if depth < MAX_MERGE_DEPTH => {
                if let Some(Value::Object(current)) = target.get_mut(&key) {
                    merge_at(current, incoming, depth + 1);
                } else {
                    target.insert(key, Value::Object(incoming));
                }
            }
            other => {
                target.insert(key, other);
            }
        }
    }
}
