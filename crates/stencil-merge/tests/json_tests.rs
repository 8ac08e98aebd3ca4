//! Owned-key merge behaviour against realistic documents.

use pretty_assertions::assert_eq;
use serde_json::json;
use stencil_merge::{
    KeyPath, created_parents, get_path, merge_json_keys, parse_document, prune_empty_objects,
    render_document, unmerge_json_keys,
};

fn keys(paths: &[&str]) -> Vec<KeyPath> {
    paths.iter().map(|p| KeyPath::parse(p).unwrap()).collect()
}

#[test]
fn merge_adds_declared_key_and_keeps_order() {
    let existing = parse_document(r#"{"name":"x","version":"1.0.0","private":true}"#).unwrap();
    let owned = keys(&["scripts.lint"]);
    let mut candidate = existing.clone();
    candidate["scripts"] = json!({"lint": "eslint ."});

    let merged = merge_json_keys(&existing, &owned, &candidate).unwrap();

    assert_eq!(
        render_document(&merged).unwrap(),
        "{\n  \"name\": \"x\",\n  \"version\": \"1.0.0\",\n  \"private\": true,\n  \"scripts\": {\n    \"lint\": \"eslint .\"\n  }\n}\n"
    );
}

#[test]
fn merge_cannot_delete_foreign_keys() {
    let existing = json!({"name": "x", "scripts": {"build": "tsc"}});
    let owned = keys(&["scripts.lint"]);
    // careless merge function: rebuilt the object from scratch
    let candidate = json!({"scripts": {"lint": "eslint ."}});

    let merged = merge_json_keys(&existing, &owned, &candidate).unwrap();

    assert_eq!(
        merged,
        json!({"name": "x", "scripts": {"build": "tsc", "lint": "eslint ."}})
    );
}

#[test]
fn merge_cannot_introduce_undeclared_keys() {
    let existing = json!({"name": "x"});
    let owned = keys(&["scripts.lint"]);
    let candidate = json!({"name": "x", "scripts": {"lint": "eslint .", "rogue": "rm -rf"}, "extra": 1});

    let merged = merge_json_keys(&existing, &owned, &candidate).unwrap();

    assert_eq!(merged, json!({"name": "x", "scripts": {"lint": "eslint ."}}));
}

#[test]
fn merge_is_idempotent() {
    let existing = json!({"name": "x"});
    let owned = keys(&["scripts.lint"]);
    let candidate = json!({"name": "x", "scripts": {"lint": "eslint ."}});

    let once = merge_json_keys(&existing, &owned, &candidate).unwrap();
    let twice = merge_json_keys(&once, &owned, &candidate).unwrap();

    assert_eq!(render_document(&once).unwrap(), render_document(&twice).unwrap());
}

#[test]
fn unmerge_restores_original_document() {
    let original = parse_document(r#"{"name":"x"}"#).unwrap();
    let owned = keys(&["scripts.lint", "scripts.format"]);
    let candidate = json!({"name": "x", "scripts": {"lint": "eslint .", "format": "prettier -w ."}});
    let installed = merge_json_keys(&original, &owned, &candidate).unwrap();
    let created = created_parents(&original, &installed, &owned);
    assert_eq!(created, keys(&["scripts"]));

    let mut unmerged = unmerge_json_keys(&installed, &owned, &original).unwrap();
    prune_empty_objects(&mut unmerged, &created);

    assert_eq!(render_document(&unmerged).unwrap(), render_document(&original).unwrap());
}

#[test]
fn unmerge_keeps_empty_object_the_user_wrote() {
    let original = parse_document(r#"{"name":"x","scripts":{}}"#).unwrap();
    let owned = keys(&["scripts.lint"]);
    let candidate = json!({"name": "x", "scripts": {"lint": "eslint ."}});
    let installed = merge_json_keys(&original, &owned, &candidate).unwrap();
    let created = created_parents(&original, &installed, &owned);
    assert!(created.is_empty());

    let mut unmerged = unmerge_json_keys(&installed, &owned, &json!({"name": "x"})).unwrap();
    prune_empty_objects(&mut unmerged, &created);

    assert_eq!(unmerged, original);
}

#[test]
fn unmerge_leaves_user_siblings() {
    let installed = json!({"scripts": {"build": "tsc", "lint": "eslint ."}});
    let owned = keys(&["scripts.lint"]);

    let unmerged = unmerge_json_keys(&installed, &owned, &json!({})).unwrap();

    assert_eq!(unmerged, json!({"scripts": {"build": "tsc"}}));
}

#[test]
fn literal_dotted_keys_round_trip() {
    let existing = json!({"files.eol": "\n"});
    let owned = keys(&[r"editor\.formatOnSave"]);
    let candidate = json!({"files.eol": "\n", "editor.formatOnSave": true});

    let merged = merge_json_keys(&existing, &owned, &candidate).unwrap();
    assert_eq!(get_path(&merged, &owned[0]), Some(&json!(true)));

    let unmerged = unmerge_json_keys(&merged, &owned, &json!({})).unwrap();
    assert_eq!(unmerged, existing);
}

#[test]
fn conflicting_scalar_is_an_error() {
    let existing = json!({"scripts": "make"});
    let owned = keys(&["scripts.lint"]);
    let candidate = json!({"scripts": {"lint": "eslint ."}});

    assert!(merge_json_keys(&existing, &owned, &candidate).is_err());
}
