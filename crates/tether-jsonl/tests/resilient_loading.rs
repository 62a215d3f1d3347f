//! Integration tests for resilient JSONL loading.

use serde::{Deserialize, Serialize};
use tether_jsonl::{read_jsonl_resilient, write_jsonl_atomic, Warning};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Edge {
    id: String,
    source: String,
    target: String,
}

fn edge(id: &str, source: &str, target: &str) -> Edge {
    Edge {
        id: id.to_string(),
        source: source.to_string(),
        target: target.to_string(),
    }
}

#[tokio::test]
async fn snapshot_round_trips_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("edges.jsonl");
    let edges = vec![edge("dep-1", "a", "b"), edge("dep-2", "b", "c")];

    write_jsonl_atomic(&path, edges.iter()).await.unwrap();
    let (loaded, warnings) = read_jsonl_resilient::<Edge, _>(&path).await.unwrap();

    assert_eq!(loaded, edges);
    assert!(warnings.is_empty());
}

#[tokio::test]
async fn corrupted_lines_are_skipped_with_warnings() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("edges.jsonl");
    let contents = concat!(
        "{\"id\":\"dep-1\",\"source\":\"a\",\"target\":\"b\"}\n",
        "{\"id\":\"dep-2\",\"source\":\n",
        "\n",
        "{\"id\":\"dep-3\"}\n",
        "{\"id\":\"dep-4\",\"source\":\"c\",\"target\":\"d\"}\n",
    );
    tokio::fs::write(&path, contents).await.unwrap();

    let (loaded, warnings) = read_jsonl_resilient::<Edge, _>(&path).await.unwrap();

    assert_eq!(loaded, vec![edge("dep-1", "a", "b"), edge("dep-4", "c", "d")]);
    let lines: Vec<usize> = warnings.iter().map(Warning::line_number).collect();
    assert_eq!(lines, vec![2, 4]);
}

#[tokio::test]
async fn missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = read_jsonl_resilient::<Edge, _>(dir.path().join("absent.jsonl")).await;
    assert!(matches!(result, Err(tether_jsonl::Error::Io(_))));
}
