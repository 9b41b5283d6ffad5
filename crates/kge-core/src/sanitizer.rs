use serde_json::Value;
use tracing::trace;

use crate::dig::{DigOptions, DigResult, DigPath, dig_path};

type Transform = Box<dyn Fn(Value) -> Value + Send + Sync>;

struct Filter {
    paths: Vec<DigPath>,
    transform: Transform,
}

/// Ordered list of `(paths, transform)` filters applied through [`dig_path`].
///
/// Every filter runs in registration order, every path of a filter in list
/// order. Paths that do not resolve are skipped.
#[derive(Default)]
pub struct Sanitizer {
    filters: Vec<Filter>,
}

impl Sanitizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `transform` for each of `paths`. Fails if a path does not parse.
    pub fn add_filter<I, S, F>(mut self, paths: I, transform: F) -> DigResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        let paths = paths
            .into_iter()
            .map(|p| DigPath::parse(p.as_ref()))
            .collect::<DigResult<Vec<_>>>()?;
        self.filters.push(Filter {
            paths,
            transform: Box::new(transform),
        });
        Ok(self)
    }

    pub fn sanitize(&self, mut value: Value) -> Value {
        for filter in &self.filters {
            let opts = DigOptions::new().mutate(|found| (filter.transform)(found));
            for path in &filter.paths {
                if let Err(err) = dig_path(&mut value, path, &opts) {
                    trace!(path = %path, error = %err, "sanitizer path skipped");
                }
            }
        }
        value
    }
}
