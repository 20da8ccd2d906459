//! HTTP tree store against a one-shot local responder

use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use bstview::domain::{from_json_str, to_json_string, TreeBuilder, TreeNode};
use bstview::infrastructure::traits::TreeStore;
use bstview::infrastructure::{HttpTreeStore, StoreError};

/// Captured request: request line and body
struct Request {
    line: String,
    body: String,
}

/// Serve exactly one request with `status` and `body`, returning what was received.
fn serve_once(status: &'static str, body: impl Into<String>) -> (String, JoinHandle<Request>) {
    let body = body.into();
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let base_url = format!("http://{}", listener.local_addr().expect("addr"));

    let handle = thread::spawn(move || {
        let (stream, _) = listener.accept().expect("accept");
        let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));

        let mut line = String::new();
        reader.read_line(&mut line).expect("request line");

        let mut content_length = 0;
        loop {
            let mut header = String::new();
            reader.read_line(&mut header).expect("header");
            let header = header.trim_end();
            if header.is_empty() {
                break;
            }
            if let Some((name, value)) = header.split_once(':') {
                if name.eq_ignore_ascii_case("content-length") {
                    content_length = value.trim().parse().expect("content length");
                }
            }
        }
        let mut buf = vec![0; content_length];
        reader.read_exact(&mut buf).expect("body");

        let mut stream = stream;
        write!(
            stream,
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        )
        .expect("write response");
        stream.flush().expect("flush");

        Request {
            line: line.trim_end().to_string(),
            body: String::from_utf8(buf).expect("utf8 body"),
        }
    });
    (base_url, handle)
}

/// Sorted input, which builds a right-leaning chain as deep as it is long.
fn sorted_chain(len: u32) -> (String, TreeNode) {
    let numbers: Vec<f64> = (1..=len).map(f64::from).collect();
    let input = (1..=len).map(|n| n.to_string()).collect::<Vec<_>>().join(",");
    (input, TreeBuilder::build(&numbers).unwrap())
}

fn store(base_url: &str) -> HttpTreeStore {
    HttpTreeStore::new(base_url, Duration::from_secs(5)).expect("store")
}

#[test]
fn given_store_with_trees_when_listing_then_decodes_both_structure_forms() {
    let (url, server) = serve_once(
        "200 OK",
        r#"[
            {"id": 1, "inputNumbers": "2,1", "treeStructure": "{\"value\":2,\"left\":{\"value\":1}}"},
            {"id": 2, "inputNumbers": "7", "treeStructure": {"value": 7}}
        ]"#,
    );

    let trees = store(&url).list_trees().unwrap();
    let request = server.join().unwrap();

    assert_eq!(request.line, "GET /api/previous-trees HTTP/1.1");
    assert_eq!(trees.len(), 2);
    assert_eq!(trees[0].tree_structure, TreeBuilder::build(&[2.0, 1.0]));
    assert_eq!(trees[1].tree_structure, Some(TreeNode::leaf(7.0)));
    assert_eq!(trees[1].display_name(), "Tree 2: 7");
}

#[test]
fn given_tree_when_saving_then_posts_json_encoded_structure() {
    let (url, server) = serve_once(
        "201 Created",
        r#"{"id": 9, "inputNumbers": "10,5", "treeStructure": "{\"value\":10,\"left\":{\"value\":5}}"}"#,
    );
    let tree = TreeBuilder::build(&[10.0, 5.0]).unwrap();

    let saved = store(&url).save_tree("10,5", Some(&tree)).unwrap();
    let request = server.join().unwrap();

    assert_eq!(request.line, "POST /api/save-tree HTTP/1.1");
    let body: serde_json::Value = serde_json::from_str(&request.body).unwrap();
    assert_eq!(body["inputNumbers"], "10,5");
    assert_eq!(
        body["treeStructure"],
        r#"{"value":10,"left":{"value":5}}"#
    );
    assert_eq!(saved.id, 9);
    assert_eq!(saved.tree_structure, Some(tree));
}

#[test]
fn given_server_error_when_listing_then_reports_status() {
    let (url, server) = serve_once("500 Internal Server Error", r#"{"error":"boom"}"#);

    let err = store(&url).list_trees().unwrap_err();
    server.join().unwrap();

    assert!(matches!(err, StoreError::Status { status: 500, .. }));
}

#[test]
fn given_garbage_body_when_listing_then_reports_decode_error() {
    let (url, server) = serve_once("200 OK", "not json");

    let err = store(&url).list_trees().unwrap_err();
    server.join().unwrap();

    assert!(matches!(err, StoreError::Decode { .. }));
}

#[test]
fn given_nothing_listening_when_listing_then_reports_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let err = store(&url).list_trees().unwrap_err();

    assert!(matches!(err, StoreError::Transport { .. }));
}

#[test]
fn given_deep_chain_among_trees_when_listing_then_every_tree_decodes() {
    let (input, chain) = sorted_chain(600);
    let body = to_json_string(&serde_json::json!([
        {"id": 1, "inputNumbers": input, "treeStructure": to_json_string(&chain).unwrap()},
        {"id": 2, "inputNumbers": "7", "treeStructure": "{\"value\":7}"},
    ]))
    .unwrap();
    let (url, server) = serve_once("200 OK", body);

    let trees = store(&url).list_trees().unwrap();
    server.join().unwrap();

    assert_eq!(trees.len(), 2);
    assert_eq!(trees[0].tree_structure.as_ref(), Some(&chain));
    assert_eq!(trees[0].tree_structure.as_ref().map(TreeNode::height), Some(600));
    assert_eq!(trees[1].tree_structure, Some(TreeNode::leaf(7.0)));
}

#[test]
fn given_deep_chain_when_saving_then_decodes_echoed_tree() {
    let (input, chain) = sorted_chain(600);
    let encoded = to_json_string(&chain).unwrap();
    let body = to_json_string(&serde_json::json!({
        "id": 4,
        "inputNumbers": &input,
        "treeStructure": encoded,
    }))
    .unwrap();
    let (url, server) = serve_once("201 Created", body);

    let saved = store(&url).save_tree(&input, Some(&chain)).unwrap();
    let request = server.join().unwrap();

    let posted: serde_json::Value = serde_json::from_str(&request.body).unwrap();
    let posted_tree: TreeNode = from_json_str(posted["treeStructure"].as_str().unwrap()).unwrap();
    assert_eq!(posted_tree, chain);
    assert_eq!(saved.id, 4);
    assert_eq!(saved.tree_structure, Some(chain));
}
