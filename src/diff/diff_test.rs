//! Scenario and property tests for the diff engine.

#[cfg(test)]
mod tests {
    use crate::diff::{diff, summarize, ItemStatus, PathDiff, PathStatus};
    use crate::value::strategy::arb_map;
    use crate::value::{map_from_json, Value};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn test_changed_title_and_tags() {
        let cur = map_from_json(r#"{"title":"Old","tags":["a","b"]}"#).unwrap();
        let inc = map_from_json(r#"{"title":"New","tags":["a","b","c"]}"#).unwrap();

        let diffs = diff(Some(&cur), &inc);

        assert_eq!(diffs.len(), 2);
        assert_eq!(
            diffs.get("title"),
            Some(&PathDiff::changed("Old".into(), "New".into()))
        );
        assert_eq!(
            diffs.get("tags"),
            Some(&PathDiff::changed(
                Value::from(vec!["a", "b"]),
                Value::from(vec!["a", "b", "c"])
            ))
        );
        assert_eq!(summarize(&diffs), ItemStatus::Update);
    }

    #[test]
    fn test_absent_current_creates() {
        let inc = map_from_json(r#"{"title":"Hi"}"#).unwrap();

        let diffs = diff(None, &inc);

        assert_eq!(diffs.len(), 1);
        let title = diffs.get("title").unwrap();
        assert_eq!(title.status, PathStatus::Added);
        assert_eq!(title.current, None);
        assert_eq!(title.incoming, Some(Value::from("Hi")));
        assert_eq!(summarize(&diffs), ItemStatus::Create);
    }

    #[test]
    fn test_removed_everything_deletes() {
        let cur = map_from_json(r#"{"title":"Hi","meta":{"a":1}}"#).unwrap();
        let inc = map_from_json("{}").unwrap();

        let diffs = diff(Some(&cur), &inc);

        assert_eq!(summarize(&diffs), ItemStatus::Delete);
        assert!(diffs.get("meta.a").is_some());
    }

    proptest! {
        #[test]
        fn prop_self_diff_is_empty(x in arb_map()) {
            prop_assert!(diff(Some(&x), &x).is_empty());
        }

        #[test]
        fn prop_diff_is_antisymmetric(a in arb_map(), b in arb_map()) {
            let forward = diff(Some(&a), &b);
            let backward = diff(Some(&b), &a);
            prop_assert_eq!(forward.swapped(), backward);
        }
    }
}
