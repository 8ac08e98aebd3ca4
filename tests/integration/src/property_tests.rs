//! Properties that must hold for any user content the engine runs into.

use proptest::prelude::*;
use serde_json::{Map, Value, json};
use stencil_context::ProjectContext;
use stencil_core::{Operation, ReconcileCache, ReconcileEngine};
use stencil_merge::{KeyPath, TextPatch};
use stencil_schema::{JsonMergeDefinition, Schema};
use stencil_test_utils::{TestProject, TreeSnapshot};

fn schema() -> Schema {
    Schema::builder("1.0.0")
        .json_merge(
            "settings.json",
            JsonMergeDefinition::entries(
                vec![
                    (KeyPath::parse("editor.formatOnSave").unwrap(), json!(true)),
                    (KeyPath::parse("tool.enabled").unwrap(), json!(true)),
                ],
                Vec::new(),
            ),
        )
        .text_patch(".gitignore", TextPatch::append("# tool\n.tool/\n", "# tool"))
        .build()
        .unwrap()
}

fn reconcile(project: &TestProject, operation: Operation) {
    let ctx = ProjectContext::builder(project.root()).build();
    let report = ReconcileEngine::new(&schema(), &ctx)
        .reconcile(operation, &mut ReconcileCache::new())
        .unwrap();
    assert!(report.is_success(), "{:?}", report.errors);
}

/// JSON objects of user keys. Besides keys of their own, users may already
/// have the objects stencil merges into, empty or with neighbours of the
/// owned keys, or a scalar that blocks the merge.
fn user_object() -> impl Strategy<Value = Map<String, Value>> {
    let leaf = prop_oneof![
        any::<bool>().prop_map(Value::from),
        any::<i32>().prop_map(Value::from),
        "[a-z ]{0,8}".prop_map(Value::from),
    ];
    let value = leaf.prop_recursive(2, 8, 3, |inner| {
        prop::collection::btree_map("[a-z]{1,4}", inner, 0..3)
            .prop_map(|m| Value::Object(m.into_iter().collect()))
    });
    let owned_parent = prop_oneof![
        Just(json!({})),
        any::<i32>().prop_map(|n| json!({"other": n})),
        any::<bool>().prop_map(Value::from),
    ];
    (
        prop::collection::btree_map("u[a-z]{1,5}", value, 0..5),
        prop::option::of(owned_parent.clone()),
        prop::option::of(owned_parent),
        any::<bool>(),
    )
        .prop_map(|(keys, editor, tool, parents_first)| {
            let mut parents = Map::new();
            if let Some(editor) = editor {
                parents.insert("editor".to_string(), editor);
            }
            if let Some(tool) = tool {
                parents.insert("tool".to_string(), tool);
            }
            let own = keys.into_iter();
            if parents_first {
                parents.into_iter().chain(own).collect()
            } else {
                own.chain(parents).collect()
            }
        })
}

/// The text of a user JSON file: pretty or on one line, with or without
/// a final newline.
fn json_text() -> impl Strategy<Value = String> {
    (user_object(), any::<bool>(), any::<bool>()).prop_map(|(user, compact, newline)| {
        let value = Value::Object(user);
        let mut text = if compact {
            serde_json::to_string(&value).unwrap()
        } else {
            serde_json::to_string_pretty(&value).unwrap()
        };
        if newline {
            text.push('\n');
        }
        text
    })
}

/// Gitignore-like text that does not already contain the marker, with or
/// without a final newline.
fn gitignore() -> impl Strategy<Value = String> {
    (prop::collection::vec("[a-z_/*.]{1,12}", 0..6), any::<bool>()).prop_map(|(lines, newline)| {
        let mut text = lines.join("\n");
        if newline && !text.is_empty() {
            text.push('\n');
        }
        text
    })
}

fn project_with(settings: Option<&str>, ignore: &str) -> TestProject {
    let project = TestProject::new().with_file(".gitignore", ignore);
    match settings {
        Some(text) => project.with_file("settings.json", text),
        None => project,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn install_then_uninstall_is_identity(
        settings in prop::option::of(json_text()),
        ignore in gitignore(),
    ) {
        let project = project_with(settings.as_deref(), &ignore);
        let before = TreeSnapshot::capture(project.root());

        reconcile(&project, Operation::Install);
        reconcile(&project, Operation::Uninstall);

        prop_assert_eq!(TreeSnapshot::capture(project.root()), before);
    }

    #[test]
    fn install_is_idempotent_for_any_user_content(
        settings in prop::option::of(json_text()),
        ignore in gitignore(),
    ) {
        let project = project_with(settings.as_deref(), &ignore);

        reconcile(&project, Operation::Install);
        let once = TreeSnapshot::capture(project.root());
        reconcile(&project, Operation::Install);

        prop_assert_eq!(TreeSnapshot::capture(project.root()), once);
    }

    #[test]
    fn user_keys_survive_every_operation(user in user_object(), compact in any::<bool>()) {
        let value = Value::Object(user.clone());
        let text = if compact {
            serde_json::to_string(&value).unwrap()
        } else {
            serde_json::to_string_pretty(&value).unwrap()
        };
        let project = TestProject::new().with_file("settings.json", &text);

        for operation in [Operation::Install, Operation::Upgrade, Operation::Uninstall] {
            reconcile(&project, operation);
            let doc = project.read_json("settings.json");
            for (key, value) in &user {
                match value {
                    Value::Object(inner) => {
                        for (name, nested) in inner {
                            prop_assert_eq!(&doc[key.as_str()][name.as_str()], nested);
                        }
                    }
                    _ => prop_assert_eq!(doc.get(key), Some(value)),
                }
            }
        }
        prop_assert_eq!(project.read_json("settings.json"), value);
    }

    #[test]
    fn key_paths_round_trip_through_display(segments in prop::collection::vec(r"[a-z.\\:]{1,6}", 1..4)) {
        let path = KeyPath::from_segments(segments.clone()).unwrap();
        let reparsed = KeyPath::parse(&path.to_string()).unwrap();
        prop_assert_eq!(reparsed.segments(), segments.as_slice());
    }
}
