//! Tests for document parsing and in-place editing.

#[cfg(test)]
mod tests {
    use crate::document::{Document, Node, Path, ScalarStyle};
    use pretty_assertions::assert_eq;

    const DEPLOYMENT: &str = r#"# Deployment for the web tier
apiVersion: apps/v1
kind: Deployment
metadata:
  name: web  # name


spec:
  template:
    spec:
      containers:
        - name: first
          image: some-repository:1.0 # Inline comment
        - name: second
          image: "other:2.0"
      volumes: [ {name: data}, {name: cache} ]
"#;

    fn image_path(index: usize) -> Path {
        Path::keys(["spec", "template", "spec", "containers"])
            .with(index)
            .with("image")
    }

    fn write_to_string(doc: &Document) -> String {
        let mut out = Vec::new();
        doc.write(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_round_trip_is_identical() {
        let doc = Document::parse(DEPLOYMENT).unwrap();
        assert_eq!(write_to_string(&doc), DEPLOYMENT);
        assert_eq!(doc.to_string(), DEPLOYMENT);
    }

    #[test]
    fn test_round_trip_odd_layouts() {
        let sources = [
            "---\nkey: value\n...\n",
            "list:\n- a\n-   b   # spaced\n-\n",
            "text: >\n  folded\n  lines\n\nkeep: |+\n  kept\n\n",
            "quoted: 'it''s' # c\nescaped: \"a\\tb\"\n",
            "windows: yes\r\nline: endings\r\n",
            "anchors:\n  base: &base {a: 1}\n  copy: *base\n",
        ];
        for src in sources {
            let doc = Document::parse(src).unwrap();
            assert_eq!(doc.as_str(), src);
        }
    }

    #[test]
    fn test_get_navigates_mappings_and_sequences() {
        let doc = Document::parse(DEPLOYMENT).unwrap();
        assert_eq!(doc.get(&image_path(0)).unwrap().as_str(), Some("some-repository:1.0"));
        assert_eq!(doc.get(&image_path(1)).unwrap().as_str(), Some("other:2.0"));

        let volumes = Path::keys(["spec", "template", "spec", "volumes"]);
        let volumes = doc.get(&volumes).unwrap().as_sequence().unwrap();
        assert_eq!(volumes.len(), 2);
        assert!(volumes.flow);

        assert!(matches!(doc.root(), Node::Mapping(_)));
        assert!(doc.find(&Path::keys(["nope"])).is_none());
    }

    #[test]
    fn test_get_reports_structure_errors() {
        let doc = Document::parse(DEPLOYMENT).unwrap();

        let err = doc
            .get(&Path::keys(["spec", "template", "spec", "initContainers"]))
            .unwrap_err();
        assert!(err.is_structure());
        assert_eq!(err.to_string(), ".spec.template.spec.initContainers: key not found");

        let err = doc.get(&Path::keys(["kind", "name"])).unwrap_err();
        assert_eq!(err.to_string(), ".kind: expected a mapping, found a scalar");

        let err = doc.get(&image_path(5)).unwrap_err();
        assert!(err.to_string().starts_with(".spec.template.spec.containers[5]: index out of range"));
    }

    #[test]
    fn test_parse_errors() {
        for src in ["a: [1, 2\n", "a: 1\n---\nb: 2\n", "a: 'open\n", "a: b: c\n"] {
            let err = Document::parse(src).unwrap_err();
            assert!(err.is_parse(), "{src:?} gave {err}");
        }
    }

    #[test]
    fn test_load_rejects_invalid_utf8() {
        let err = Document::load(&b"a: 1\nb: \xff\n"[..]).unwrap_err();
        assert!(err.is_parse());
        assert!(err.to_string().starts_with("line 2, column 4"));
    }

    #[test]
    fn test_set_scalar_changes_only_the_scalar() {
        let mut doc = Document::parse(DEPLOYMENT).unwrap();
        assert!(doc.set_scalar(&image_path(0), "some-repository:1.1").unwrap());
        assert!(doc.set_scalar(&image_path(1), "other:2.1").unwrap());

        let expected = DEPLOYMENT
            .replace("some-repository:1.0 # Inline", "some-repository:1.1 # Inline")
            .replace("\"other:2.0\"", "\"other:2.1\"");
        assert_eq!(doc.as_str(), expected);
        assert_eq!(doc.get(&image_path(1)).unwrap().as_str(), Some("other:2.1"));
    }

    #[test]
    fn test_set_scalar_same_value_is_noop() {
        let mut doc = Document::parse(DEPLOYMENT).unwrap();
        assert!(!doc.set_scalar(&image_path(0), "some-repository:1.0").unwrap());
        assert_eq!(doc.as_str(), DEPLOYMENT);
    }

    #[test]
    fn test_set_scalar_quotes_values_that_would_change_type() {
        let mut doc = Document::parse("a: latest\nb: '1.0.0'\nc: 2.0\n").unwrap();
        doc.set_scalar(&Path::keys(["a"]), "1.1").unwrap();
        doc.set_scalar(&Path::keys(["b"]), "1.1").unwrap();
        doc.set_scalar(&Path::keys(["c"]), "4.5.6").unwrap();
        assert_eq!(doc.as_str(), "a: '1.1'\nb: '1.1'\nc: 4.5.6\n");

        let a = doc.get(&Path::keys(["a"])).unwrap().as_scalar().unwrap();
        assert_eq!(a.style, ScalarStyle::SingleQuoted);
        assert_eq!(a.value, "1.1");
    }

    #[test]
    fn test_set_scalar_fills_implicit_null() {
        let mut doc = Document::parse("a:\nb: 1 # keep\n").unwrap();
        doc.set_scalar(&Path::keys(["a"]), "x").unwrap();
        doc.set_scalar(&Path::keys(["b"]), "2").unwrap();
        assert_eq!(doc.as_str(), "a: x\nb: '2' # keep\n");
        assert_eq!(doc.get(&Path::keys(["a"])).unwrap().as_str(), Some("x"));
    }

    #[test]
    fn test_set_scalar_replaces_block_scalar() {
        let mut doc = Document::parse("msg: |\n  hello\n  world\nnext: 1\n").unwrap();
        doc.set_scalar(&Path::keys(["msg"]), "bye").unwrap();
        assert_eq!(doc.as_str(), "msg: bye\nnext: 1\n");

        doc.set_scalar(&Path::keys(["msg"]), "two\nlines").unwrap();
        assert_eq!(doc.as_str(), "msg: \"two\\nlines\"\nnext: 1\n");
    }

    #[test]
    fn test_set_scalar_rejects_collections() {
        let mut doc = Document::parse(DEPLOYMENT).unwrap();
        let err = doc.set_scalar(&Path::keys(["metadata"]), "x").unwrap_err();
        assert_eq!(err.to_string(), ".metadata: expected a scalar, found a mapping");
        assert_eq!(doc.as_str(), DEPLOYMENT);
    }

    #[test]
    fn test_insert_entry_into_block_mapping() {
        let src = "images:\n- name: a\n  newName: b # renamed\n# trailing\nother: 1\n";
        let mut doc = Document::parse(src).unwrap();
        let entry = Path::keys(["images"]).with(0);
        doc.insert_entry(&entry, "newTag", "1.1").unwrap();
        assert_eq!(
            doc.as_str(),
            "images:\n- name: a\n  newName: b # renamed\n  newTag: '1.1'\n# trailing\nother: 1\n"
        );
        assert_eq!(doc.get(&entry.with("newTag")).unwrap().as_str(), Some("1.1"));

        // The inserted scalar is addressable for later edits.
        doc.set_scalar(&entry.with("newTag"), "1.2.0").unwrap();
        assert!(doc.as_str().contains("  newTag: '1.2.0'\n# trailing"));
        assert_eq!(doc.get(&Path::keys(["other"])).unwrap().as_str(), Some("1"));
    }

    #[test]
    fn test_insert_entry_into_flow_mapping() {
        let mut doc = Document::parse("images: [{name: a}]\n").unwrap();
        let entry = Path::keys(["images"]).with(0);
        doc.insert_entry(&entry, "newTag", "1.2.3").unwrap();
        assert_eq!(doc.as_str(), "images: [{name: a, newTag: 1.2.3}]\n");
        assert_eq!(doc.get(&entry.with("newTag")).unwrap().as_str(), Some("1.2.3"));
    }

    #[test]
    fn test_insert_entry_rejects_existing_key() {
        let mut doc = Document::parse("a: 1\n").unwrap();
        let err = doc.insert_entry(&Path::new(), "a", "2").unwrap_err();
        assert!(err.is_structure());
    }

    #[test]
    fn test_from_str() {
        let doc: Document = "kind: Kustomization\n".parse().unwrap();
        assert_eq!(doc.get(&Path::keys(["kind"])).unwrap().as_str(), Some("Kustomization"));
    }
}
