// Output router: per-chunk routing of subprocess output (log vs. re-ingest)

use std::sync::Mutex;

use serde_yaml::Value;
use tracing::debug;

use super::arguments::StreamPolicy;
use crate::domain::resource_list::RESOURCE_LIST_KIND;
use crate::domain::KubernetesObject;
use crate::port::{LogSink, OutputSink};

/// Routes stdout/stderr chunks according to a `StreamPolicy`
///
/// stderr always goes to the error log. stdout goes to the info log, or is
/// buffered for `finish` when capturing.
pub struct OutputRouter<'a> {
    policy: StreamPolicy,
    log: &'a dyn LogSink,
    buffer: Mutex<String>,
}

impl<'a> OutputRouter<'a> {
    pub fn new(policy: StreamPolicy, log: &'a dyn LogSink) -> Self {
        Self {
            policy,
            log,
            buffer: Mutex::new(String::new()),
        }
    }

    /// Parse captured stdout into objects, in document order
    ///
    /// Documents that fail to parse or are not Kubernetes objects are
    /// dropped. A `ResourceList` document contributes its items. Returns
    /// nothing when stdout was only logged.
    pub fn finish(self) -> Vec<KubernetesObject> {
        if self.policy != StreamPolicy::Capture {
            return Vec::new();
        }
        let buffer = self
            .buffer
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        parse_documents(&buffer)
    }
}

impl OutputSink for OutputRouter<'_> {
    fn on_stdout(&self, chunk: &str) {
        match self.policy {
            StreamPolicy::LogOnly => self.log.info(trim_line_terminator(chunk)),
            StreamPolicy::Capture => self
                .buffer
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .push_str(chunk),
        }
    }

    fn on_stderr(&self, chunk: &str) {
        self.log.error(trim_line_terminator(chunk));
    }
}

/// Strip exactly one trailing `\r\n`, `\n` or `\r`
pub fn trim_line_terminator(chunk: &str) -> &str {
    chunk
        .strip_suffix("\r\n")
        .or_else(|| chunk.strip_suffix('\n'))
        .or_else(|| chunk.strip_suffix('\r'))
        .unwrap_or(chunk)
}

/// Parse a multi-document YAML stream, keeping only Kubernetes objects
///
/// Each document is parsed on its own so that one malformed document does
/// not hide the ones after it.
pub fn parse_documents(text: &str) -> Vec<KubernetesObject> {
    let mut objects = Vec::new();
    for (idx, doc) in split_documents(text).into_iter().enumerate() {
        if doc.trim().is_empty() {
            continue;
        }
        match serde_yaml::from_str::<Value>(&doc) {
            Ok(value) => collect_objects(value, idx, &mut objects),
            Err(e) => debug!(document = idx, error = %e, "Discarding malformed output document"),
        }
    }
    objects
}

fn collect_objects(value: Value, idx: usize, out: &mut Vec<KubernetesObject>) {
    if value.get("kind").and_then(Value::as_str) == Some(RESOURCE_LIST_KIND) {
        if let Some(Value::Sequence(items)) = value.get("items") {
            out.extend(items.iter().cloned().filter_map(KubernetesObject::from_value));
        }
        return;
    }
    match KubernetesObject::from_value(value) {
        Some(obj) => out.push(obj),
        None => debug!(document = idx, "Discarding output document that is not a Kubernetes object"),
    }
}

/// Split on `---` / `...` marker lines
///
/// Content after `--- ` on the marker line (`--- {kind: ...}`) opens the
/// next document.
fn split_documents(text: &str) -> Vec<String> {
    let mut docs = Vec::new();
    let mut current = String::new();
    for line in text.split_inclusive('\n') {
        let marker = trim_line_terminator(line);
        if marker == "---" || marker == "..." {
            docs.push(std::mem::take(&mut current));
        } else if let Some(inline) = line.strip_prefix("--- ") {
            docs.push(std::mem::take(&mut current));
            current.push_str(inline);
        } else {
            current.push_str(line);
        }
    }
    docs.push(current);
    docs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::log_sink::mocks::RecordingLogSink;
    use crate::port::LogLevel;

    #[test]
    fn test_trim_line_terminator() {
        assert_eq!(trim_line_terminator("line\n"), "line");
        assert_eq!(trim_line_terminator("line\r\n"), "line");
        assert_eq!(trim_line_terminator("line\r"), "line");
        assert_eq!(trim_line_terminator("line\n\n"), "line\n");
        assert_eq!(trim_line_terminator("line"), "line");
    }

    #[test]
    fn test_log_only_routes_stdout_to_info() {
        let log = RecordingLogSink::new();
        let router = OutputRouter::new(StreamPolicy::LogOnly, &log);

        router.on_stdout("hello\n");
        router.on_stderr("warning: deprecated\r\n");
        router.on_stdout("world\n");

        assert!(router.finish().is_empty());
        assert_eq!(log.at(LogLevel::Info), vec!["hello", "world"]);
        assert_eq!(log.at(LogLevel::Error), vec!["warning: deprecated"]);
    }

    #[test]
    fn test_capture_buffers_stdout_and_logs_stderr() {
        let log = RecordingLogSink::new();
        let router = OutputRouter::new(StreamPolicy::Capture, &log);

        for line in [
            "apiVersion: v1\n",
            "kind: ConfigMap\n",
            "metadata:\n",
            "  name: first\n",
            "---\n",
            "apiVersion: v1\n",
            "kind: Secret\n",
            "metadata:\n",
            "  name: second\n",
        ] {
            router.on_stdout(line);
        }
        router.on_stderr("progress\n");

        let objects = router.finish();
        let names: Vec<_> = objects.iter().filter_map(|o| o.name()).collect();
        assert_eq!(names, vec!["first", "second"]);
        assert!(log.at(LogLevel::Info).is_empty());
        assert_eq!(log.at(LogLevel::Error), vec!["progress"]);
    }

    #[test]
    fn test_parse_documents_drops_malformed_and_non_objects() {
        let text = "\
---
apiVersion: v1
kind: ConfigMap
metadata:
  name: good
---
key: [unclosed
---
just: data
---
apiVersion: v1
kind: Namespace
metadata:
  name: also-good
";
        let objects = parse_documents(text);
        let names: Vec<_> = objects.iter().filter_map(|o| o.name()).collect();
        assert_eq!(names, vec!["good", "also-good"]);
    }

    #[test]
    fn test_parse_documents_unwraps_resource_list() {
        let text = "\
apiVersion: config.kubernetes.io/v1
kind: ResourceList
items:
- apiVersion: v1
  kind: ConfigMap
  metadata:
    name: from-list
- not: an object
";
        let objects = parse_documents(text);
        assert_eq!(objects.len(), 1);
        assert_eq!(objects[0].name(), Some("from-list"));
    }

    #[test]
    fn test_parse_documents_inline_content_after_marker() {
        let text = "\
--- {apiVersion: v1, kind: ConfigMap, metadata: {name: a}}
--- {apiVersion: v1, kind: ConfigMap, metadata: {name: b}}
--- # generated by clusterctl
apiVersion: v1
kind: ConfigMap
metadata:
  name: c
";
        let objects = parse_documents(text);
        let names: Vec<_> = objects.iter().filter_map(|o| o.name()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_parse_documents_empty() {
        assert!(parse_documents("").is_empty());
        assert!(parse_documents("---\n---\n").is_empty());
    }
}
