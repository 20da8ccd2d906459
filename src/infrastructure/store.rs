//! Tree store implementations: HTTP client and in-memory store.

use std::sync::Mutex;
use std::time::Duration;

use reqwest::blocking::{Client, Response};
use serde::Serialize;
use tracing::{debug, trace};
use url::Url;

use crate::domain::{from_json_str, to_json_string, SavedTree, TreeId, TreeNode};
use crate::infrastructure::error::{StoreError, StoreResult};
use crate::infrastructure::traits::TreeStore;

const LIST_PATH: &str = "api/previous-trees";
const SAVE_PATH: &str = "api/save-tree";

/// Body of a save request. The tree travels as a JSON-encoded string.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SaveTreeRequest<'a> {
    input_numbers: &'a str,
    tree_structure: String,
}

/// Blocking HTTP client for the tree store API.
#[derive(Debug, Clone)]
pub struct HttpTreeStore {
    base_url: Url,
    client: Client,
}

impl HttpTreeStore {
    pub fn new(base_url: &str, timeout: Duration) -> StoreResult<Self> {
        let mut base_url = Url::parse(base_url)?;
        // keep a trailing slash so joins extend the path instead of replacing it
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| StoreError::Transport {
                url: base_url.to_string(),
                source,
            })?;
        Ok(Self { base_url, client })
    }

    fn endpoint(&self, path: &str) -> StoreResult<Url> {
        Ok(self.base_url.join(path)?)
    }

    fn check(url: &Url, response: reqwest::Result<Response>) -> StoreResult<String> {
        let transport = |source| StoreError::Transport {
            url: url.to_string(),
            source,
        };
        let response = response.map_err(transport)?;
        let status = response.status();
        if !status.is_success() {
            return Err(StoreError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        let body = response.text().map_err(transport)?;
        trace!("response body: {body}");
        Ok(body)
    }

    fn decode<T: serde::de::DeserializeOwned>(url: &Url, body: &str) -> StoreResult<T> {
        from_json_str(body).map_err(|source| StoreError::Decode {
            url: url.to_string(),
            source,
        })
    }
}

impl TreeStore for HttpTreeStore {
    fn list_trees(&self) -> StoreResult<Vec<SavedTree>> {
        let url = self.endpoint(LIST_PATH)?;
        debug!("GET {url}");
        let body = Self::check(&url, self.client.get(url.clone()).send())?;
        Self::decode(&url, &body)
    }

    fn save_tree(&self, input_numbers: &str, tree: Option<&TreeNode>) -> StoreResult<SavedTree> {
        let url = self.endpoint(SAVE_PATH)?;
        let request = SaveTreeRequest {
            input_numbers,
            tree_structure: to_json_string(&tree).map_err(StoreError::Encode)?,
        };
        debug!("POST {url}");
        trace!(?request, "payload");
        let body = Self::check(&url, self.client.post(url.clone()).json(&request).send())?;
        Self::decode(&url, &body)
    }
}

/// Store kept in process memory; ids count up from 1.
#[derive(Debug, Default)]
pub struct MemoryTreeStore {
    trees: Mutex<Vec<SavedTree>>,
}

impl MemoryTreeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with `trees`.
    pub fn with_trees(trees: Vec<SavedTree>) -> Self {
        Self {
            trees: Mutex::new(trees),
        }
    }

    fn next_id(trees: &[SavedTree]) -> TreeId {
        trees.iter().map(|t| t.id).max().unwrap_or(0) + 1
    }
}

impl TreeStore for MemoryTreeStore {
    fn list_trees(&self) -> StoreResult<Vec<SavedTree>> {
        let trees = self
            .trees
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store poisoned".into()))?;
        Ok(trees.clone())
    }

    fn save_tree(&self, input_numbers: &str, tree: Option<&TreeNode>) -> StoreResult<SavedTree> {
        let mut trees = self
            .trees
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store poisoned".into()))?;
        let saved = SavedTree {
            id: Self::next_id(&trees),
            input_numbers: input_numbers.to_string(),
            tree_structure: tree.cloned(),
        };
        trees.push(saved.clone());
        Ok(saved)
    }
}
