use proptest::prelude::*;
use stencil_fs::{NormalizedPath, RelPath};

proptest! {
    #[test]
    fn normalized_paths_have_no_backslashes_or_empty_segments(s in "\\PC*") {
        let path = NormalizedPath::new(&s);
        let as_str = path.as_str();

        prop_assert!(!as_str.contains('\\'));
        prop_assert!(!as_str.contains("//"));
    }

    #[test]
    fn normalization_is_idempotent(s in "\\PC*") {
        let once = NormalizedPath::new(&s);
        let twice = NormalizedPath::new(once.to_native());
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn accepted_rel_paths_never_escape(segments in prop::collection::vec("[a-zA-Z0-9_.-]{1,8}", 1..5)) {
        let joined = segments.join("/");
        if let Ok(rel) = RelPath::parse(&joined) {
            let root = NormalizedPath::new("/project");
            prop_assert!(root.resolve(&rel).as_str().starts_with("/project/"));
        }
    }
}
