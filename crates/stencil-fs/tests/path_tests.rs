use rstest::rstest;
use stencil_fs::{NormalizedPath, RelPath};

#[test]
fn test_normalize_backslashes_to_forward() {
    let path = NormalizedPath::new("foo\\bar\\baz");
    assert_eq!(path.as_str(), "foo/bar/baz");
}

#[test]
fn test_join_resolves_dots() {
    let base = NormalizedPath::new("/a/b");

    assert_eq!(base.join("c").as_str(), "/a/b/c");
    assert_eq!(base.join("./c").as_str(), "/a/b/c");
    assert_eq!(base.join("../c").as_str(), "/a/c");
}

#[test]
fn test_resolve_rel_path() {
    let root = NormalizedPath::new("/work/project");
    let rel = RelPath::parse(".vscode/settings.json").unwrap();
    assert_eq!(root.resolve(&rel).as_str(), "/work/project/.vscode/settings.json");
}

#[test]
fn test_parent_and_file_name() {
    let path = NormalizedPath::new("foo/bar/baz.txt");
    assert_eq!(path.parent().unwrap().as_str(), "foo/bar");
    assert_eq!(path.file_name(), Some("baz.txt"));
    assert_eq!(path.extension(), Some("txt"));
}

#[test]
fn test_hidden_file_has_no_extension() {
    assert_eq!(NormalizedPath::new("/x/.gitignore").extension(), None);
}

#[rstest]
#[case("AGENTS.md")]
#[case(".stencil/hooks/pre-commit.sh")]
#[case("docs\\decisions\\TEMPLATE.md")]
#[case(".vscode/")]
fn test_rel_path_accepts(#[case] input: &str) {
    assert!(RelPath::parse(input).is_ok(), "{input} should be accepted");
}

#[rstest]
#[case("")]
#[case("/etc/passwd")]
#[case("C:/Windows")]
#[case("../outside.txt")]
#[case("a/../b")]
#[case("a//b")]
#[case("./a")]
fn test_rel_path_rejects(#[case] input: &str) {
    assert!(RelPath::parse(input).is_err(), "{input} should be rejected");
}

#[test]
fn test_rel_path_trailing_slash_is_trimmed() {
    assert_eq!(RelPath::parse(".vscode/").unwrap().as_str(), ".vscode");
}

#[test]
fn test_rel_path_depth_and_file_name() {
    let p = RelPath::parse(".stencil/hooks/pre-commit.sh").unwrap();
    assert_eq!(p.depth(), 3);
    assert_eq!(p.file_name(), "pre-commit.sh");
    assert_eq!(p.parent().unwrap().as_str(), ".stencil/hooks");
    assert!(RelPath::parse("AGENTS.md").unwrap().parent().is_none());
}
