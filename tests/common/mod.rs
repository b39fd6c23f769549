//! Shared fixtures: a fake GitHub contents API served by wiremock.

#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const OWNER: &str = "acme";
pub const REPO: &str = "crm";

/// URL path of the contents endpoint for a repository path.
pub fn contents_path(repo_path: &str) -> String {
    if repo_path.is_empty() {
        format!("/repos/{}/{}/contents", OWNER, REPO)
    } else {
        format!("/repos/{}/{}/contents/{}", OWNER, REPO, repo_path)
    }
}

/// A listing entry the way the contents API reports it.
pub fn entry(base: &str, repo_path: &str, is_dir: bool) -> Value {
    let name = repo_path.rsplit('/').next().unwrap_or(repo_path);
    let download_url = if is_dir {
        Value::Null
    } else {
        json!(format!("{}/raw/{}", base, repo_path))
    };
    json!({
        "name": name,
        "path": repo_path,
        "sha": "0000000000000000000000000000000000000000",
        "size": 0,
        "type": if is_dir { "dir" } else { "file" },
        "url": format!("{}{}", base, contents_path(repo_path)),
        "download_url": download_url,
    })
}

/// A wiremock server serving a fixed tree of files.
///
/// Every directory answers with a JSON array, every file path answers its
/// contents endpoint with a single object, and `download_url`s point at
/// `/raw/<path>` on the same server.
pub struct FakeRepo {
    pub server: MockServer,
}

impl FakeRepo {
    pub async fn serve(files: &[(&str, &str)]) -> Self {
        let server = MockServer::start().await;
        let base = server.uri();

        let mut dirs: BTreeMap<String, BTreeSet<(String, bool)>> = BTreeMap::new();
        dirs.entry(String::new()).or_default();

        for (file_path, contents) in files {
            let segments: Vec<&str> = file_path.split('/').collect();
            for i in 0..segments.len() {
                let parent = segments[..i].join("/");
                let child = segments[..=i].join("/");
                let is_dir = i + 1 < segments.len();
                dirs.entry(parent).or_default().insert((child.clone(), is_dir));
                if is_dir {
                    dirs.entry(child).or_default();
                }
            }

            let body = contents.as_bytes().to_vec();
            Mock::given(method("GET"))
                .and(path(format!("/raw/{}", file_path)))
                .respond_with(ResponseTemplate::new(200).set_body_bytes(body))
                .mount(&server)
                .await;

            Mock::given(method("GET"))
                .and(path(contents_path(file_path)))
                .respond_with(
                    ResponseTemplate::new(200).set_body_json(entry(&base, file_path, false)),
                )
                .mount(&server)
                .await;
        }

        for (dir, children) in &dirs {
            let entries: Vec<Value> = children
                .iter()
                .map(|(child, is_dir)| entry(&base, child, *is_dir))
                .collect();
            Mock::given(method("GET"))
                .and(path(contents_path(dir)))
                .respond_with(ResponseTemplate::new(200).set_body_json(Value::Array(entries)))
                .mount(&server)
                .await;
        }

        Self { server }
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    /// URL paths of every request received so far, sorted.
    pub async fn requested_paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self
            .server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .map(|r| r.url.path().to_string())
            .collect();
        paths.sort();
        paths
    }
}

/// Every regular file under `root`, keyed by `/`-separated relative path.
pub fn read_tree(root: &Path) -> BTreeMap<String, Vec<u8>> {
    let mut out = BTreeMap::new();
    collect(root, root, &mut out);
    out
}

fn collect(root: &Path, dir: &Path, out: &mut BTreeMap<String, Vec<u8>>) {
    for item in fs::read_dir(dir).unwrap() {
        let item = item.unwrap();
        let path = item.path();
        if path.is_dir() {
            collect(root, &path, out);
        } else {
            let relative = path
                .strip_prefix(root)
                .unwrap()
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join("/");
            out.insert(relative, fs::read(&path).unwrap());
        }
    }
}
