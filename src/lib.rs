pub mod application;
pub mod commands;
pub mod config;
pub mod package;
pub mod provider;
pub mod runtime;

/// Test utilities shared by unit tests.
#[cfg(test)]
pub mod test_utils {
    use crate::runtime::MockRuntime;
    use mockall::predicate::{always, eq};
    use serde_json::{Map, Value};
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};

    /// Configure a mock runtime backed by a single in-memory file.
    ///
    /// - `exists` is true for `path`
    /// - `read_to_string` returns the current content
    /// - `write` replaces the content
    ///
    /// The returned handle can be used to inspect what was written, or to
    /// simulate another process editing the file.
    pub fn mock_config_file(path: &str, content: &str) -> (MockRuntime, Arc<Mutex<String>>) {
        let file = Arc::new(Mutex::new(content.to_string()));
        let path = PathBuf::from(path);
        let mut runtime = MockRuntime::new();

        runtime
            .expect_exists()
            .with(eq(path.clone()))
            .returning(|_| true);

        let reader = file.clone();
        runtime
            .expect_read_to_string()
            .with(eq(path.clone()))
            .returning(move |_| Ok(reader.lock().unwrap().clone()));

        let writer = file.clone();
        runtime
            .expect_write()
            .with(eq(path), always())
            .returning(move |_, contents| {
                *writer.lock().unwrap() = String::from_utf8_lossy(contents).into_owned();
                Ok(())
            });

        (runtime, file)
    }

    /// Unwrap a JSON object literal.
    pub fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected a JSON object, got {}", other),
        }
    }
}
