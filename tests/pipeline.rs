//! End-to-end runs of the docver pipeline against `fixtures/site`.
//!
//! Each test copies the fixture site into a temp directory, so tests can
//! break it in their own way without affecting each other.

use docver::generate::{DATA_DIR, GLOBAL_DATA_FILE, ROUTES_FILE};
use docver::pipeline::{self, BuildError};
use docver::scan::ScanError;
use docver::types::{GlobalPluginData, RouteConfig};
use pretty_assertions::assert_eq;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn setup_site() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/site");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());
        if src_path.is_dir() {
            fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

/// Every file under `dir`, relative path → contents.
fn snapshot(dir: &Path) -> BTreeMap<String, String> {
    let mut files = BTreeMap::new();
    for entry in walkdir::WalkDir::new(dir) {
        let entry = entry.unwrap();
        if entry.file_type().is_file() {
            let relative = entry.path().strip_prefix(dir).unwrap();
            files.insert(
                relative.to_string_lossy().into_owned(),
                fs::read_to_string(entry.path()).unwrap(),
            );
        }
    }
    files
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

fn leaf_routes(routes: &[RouteConfig]) -> Vec<&RouteConfig> {
    routes.iter().flat_map(|r| r.routes.iter()).collect()
}

#[test]
fn build_is_idempotent() {
    let site = setup_site();
    let first = site.path().join("out-1");
    let second = site.path().join("out-2");

    pipeline::build(site.path(), &first).unwrap();
    pipeline::build(site.path(), &second).unwrap();

    let a = snapshot(&first);
    assert!(a.contains_key(ROUTES_FILE));
    assert!(a.contains_key(GLOBAL_DATA_FILE));
    assert_eq!(a, snapshot(&second));
}

#[test]
fn rebuild_into_same_directory_is_stable() {
    let site = setup_site();
    let out = site.path().join("out");

    pipeline::build(site.path(), &out).unwrap();
    let before = snapshot(&out);
    pipeline::build(site.path(), &out).unwrap();
    assert_eq!(before, snapshot(&out));
}

#[test]
fn previous_and_next_point_at_real_docs() {
    let site = setup_site();
    let out = site.path().join("out");
    let (_, emitted) = pipeline::build(site.path(), &out).unwrap();

    let leaves = leaf_routes(&emitted.routes);
    let payloads: Vec<Value> = leaves
        .iter()
        .map(|r| read_json(&out.join(&r.modules["metadata"])))
        .collect();

    for payload in &payloads {
        for key in ["previous", "next"] {
            let Some(neighbour) = payload.get(key) else {
                continue;
            };
            let target = payloads
                .iter()
                .find(|p| p["permalink"] == neighbour["permalink"])
                .unwrap_or_else(|| panic!("{key} of {} has no doc", payload["id"]));
            assert_eq!(target["title"], neighbour["title"]);
            assert_eq!(target["version"], payload["version"]);
            assert_eq!(target["sidebar"], payload["sidebar"]);
        }
    }
}

#[test]
fn latest_version_route_sorts_last_by_priority() {
    let site = setup_site();
    let out = site.path().join("out");
    pipeline::build(site.path(), &out).unwrap();

    let routes: Vec<RouteConfig> =
        serde_json::from_str(&fs::read_to_string(out.join(ROUTES_FILE)).unwrap()).unwrap();
    let latest = routes.iter().find(|r| r.path == "/docs").unwrap();
    let current = routes.iter().find(|r| r.path == "/docs/next").unwrap();

    assert_eq!(latest.priority, Some(-1));
    assert!(latest.effective_priority() < current.effective_priority());
    assert!(current.path.starts_with(&latest.path));
}

#[test]
fn global_data_is_minimal_and_sorted() {
    let site = setup_site();
    let out = site.path().join("out");
    pipeline::build(site.path(), &out).unwrap();

    let raw = read_json(&out.join(GLOBAL_DATA_FILE));
    for version in raw["versions"].as_array().unwrap() {
        for doc in version["docs"].as_array().unwrap() {
            let keys: Vec<&String> = doc.as_object().unwrap().keys().collect();
            assert_eq!(keys, vec!["id", "path"]);
        }
    }

    let global: GlobalPluginData = serde_json::from_value(raw).unwrap();
    assert_eq!(global.path, "/docs");
    assert_eq!(global.latest_version_name, "1.0.0");

    let names: Vec<&str> = global.versions.iter().map(|v| v.name.as_str()).collect();
    assert_eq!(names, vec!["next", "1.0.0"]);

    let current = &global.versions[0];
    assert_eq!(current.main_doc_id, "intro");
    let ids: Vec<&str> = current.docs.iter().map(|d| d.id.as_str()).collect();
    assert_eq!(
        ids,
        vec![
            "changelog",
            "guides/configure",
            "guides/install",
            "intro",
            "reference"
        ]
    );

    let released = &global.versions[1];
    assert_eq!(released.path, "/docs");
    let paths: Vec<&str> = released.docs.iter().map(|d| d.path.as_str()).collect();
    assert_eq!(paths, vec!["/docs/guides/install", "/docs/"]);
}

#[test]
fn payloads_carry_full_metadata() {
    let site = setup_site();
    let out = site.path().join("out");
    let (_, emitted) = pipeline::build(site.path(), &out).unwrap();

    let configure = leaf_routes(&emitted.routes)
        .into_iter()
        .find(|r| r.path == "/docs/next/configuration")
        .unwrap();
    assert_eq!(configure.modules["content"], "@site/docs/guides/configure.md");

    let payload = read_json(&out.join(&configure.modules["metadata"]));
    assert_eq!(payload["id"], "guides/configure");
    assert_eq!(payload["title"], "Configuration");
    assert_eq!(payload["description"], "Every knob, explained.");
    assert_eq!(
        payload["editUrl"],
        "https://github.com/acme/widgets/edit/main/docs/guides/configure.md"
    );
    assert_eq!(payload["previous"]["title"], "Installation");
    assert!(payload.get("next").is_none());
}

#[test]
fn every_data_file_is_referenced() {
    let site = setup_site();
    let out = site.path().join("out");
    let (_, emitted) = pipeline::build(site.path(), &out).unwrap();

    let mut referenced: Vec<&str> = emitted
        .routes
        .iter()
        .flat_map(|r| {
            std::iter::once(r)
                .chain(r.routes.iter())
                .flat_map(|route| route.modules.iter())
        })
        .filter(|(name, _)| name.as_str() != "content")
        .map(|(_, path)| path.as_str())
        .collect();
    referenced.sort();

    let mut written: Vec<String> = snapshot(&out.join(DATA_DIR))
        .into_keys()
        .map(|name| format!("{DATA_DIR}/{name}"))
        .collect();
    written.sort();

    assert_eq!(referenced, written.iter().map(String::as_str).collect::<Vec<_>>());
}

#[test]
fn unknown_sidebar_id_lists_valid_ids() {
    let site = setup_site();
    fs::write(
        site.path().join("sidebars.json"),
        r#"{ "docs": ["intro", "guides/missing"] }"#,
    )
    .unwrap();
    let out = site.path().join("out");

    let err = pipeline::build(site.path(), &out).unwrap_err();
    assert!(matches!(err, BuildError::Sidebar(_)));
    let message = err.to_string();
    assert!(message.contains("guides/missing"), "{message}");
    for id in [
        "changelog",
        "guides/configure",
        "guides/install",
        "intro",
        "reference",
    ] {
        assert!(message.contains(id), "{message}");
    }
    assert!(!out.exists());
}

#[test]
fn legacy_options_are_migrated() {
    let site = setup_site();
    fs::write(
        site.path().join("docver.toml"),
        "versions = [\"1.0.0\"]\nhomepage_id = \"intro\"\nexclude_next_version_docs = true\n",
    )
    .unwrap();
    let out = site.path().join("out");

    let (content, emitted) = pipeline::build(site.path(), &out).unwrap();
    assert_eq!(content.catalog.versions().len(), 1);
    assert_eq!(emitted.global_data.versions[0].main_doc_id, "intro");
    assert_eq!(emitted.routes.len(), 1);
}

#[test]
fn invalid_option_names_option_and_value() {
    let site = setup_site();
    fs::write(
        site.path().join("docver.toml"),
        "versions = [\"1.0.0\"]\nlast_version = \"9.9\"\n",
    )
    .unwrap();

    let err = pipeline::build(site.path(), &site.path().join("out")).unwrap_err();
    assert!(matches!(err, BuildError::Scan(ScanError::Config(_))));
    let message = err.to_string();
    assert!(message.contains("last_version"), "{message}");
    assert!(message.contains("9.9"), "{message}");
}
