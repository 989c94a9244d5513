//! Tag annotation tests: binding index numbering, forced and suppressed tags,
//! prefix propagation through a root `<merge>`.

#[cfg(test)]
mod tests {
    use crate::annotate::{annotate, is_expression_attribute, Annotation, NodeKind};
    use crate::buffer::LineBuffer;
    use crate::options::LayoutVocabulary;
    use crate::xml::{parse_document, Element};

    fn run(source: &str, new_tag: Option<&str>) -> (Vec<(String, String)>, usize, LineBuffer) {
        let root = parse_document(source).unwrap().root.unwrap();
        let mut buffer = LineBuffer::from_source(source);
        let Annotation {
            binding_count,
            pending,
        } = annotate(&root, &mut buffer, &LayoutVocabulary::default(), new_tag);
        let pending = pending
            .into_iter()
            .map(|p| (p.element.name.clone(), p.text))
            .collect();
        (pending, binding_count, buffer)
    }

    fn tag(value: &str) -> String {
        format!("android:tag=\"{}\"", value)
    }

    fn entry(element: &str, text: String) -> (String, String) {
        (element.to_string(), text)
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // NUMBERING
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_indices_follow_document_order() {
        let source = "<A android:text=\"@{a}\"><B/><C android:text=\"@{c}\"/><D><E android:text=\"@{e}\"/></D></A>";
        let (pending, count, _) = run(source, None);
        assert_eq!(count, 3);
        assert_eq!(
            pending,
            vec![
                entry("A", tag("binding_0")),
                entry("C", tag("binding_1")),
                entry("E", tag("binding_2")),
            ]
        );
    }

    #[test]
    fn test_include_takes_its_own_index() {
        let source = "<A><include layout=\"@layout/x\"/><include layout=\"@layout/y\"/><B android:text=\"@{b}\"/></A>";
        let (pending, count, _) = run(source, None);
        assert_eq!(count, 4);
        assert_eq!(
            pending,
            vec![
                entry("A", tag("binding_0")),
                entry("include", tag("binding_1")),
                entry("include", tag("binding_2")),
                entry("B", tag("binding_3")),
            ]
        );
    }

    #[test]
    fn test_includes_are_numbered_under_either_prefix() {
        let (pending, count, _) = run("<include layout=\"@layout/x\"/>", Some("root"));
        assert_eq!(count, 1);
        assert_eq!(pending, vec![entry("include", tag("root_0"))]);

        let (pending, count, _) = run("<include layout=\"@layout/x\"/>", None);
        assert_eq!(count, 1);
        assert_eq!(pending, vec![entry("include", tag("binding_0"))]);
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // MERGE
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_root_merge_passes_prefix_one_level_down() {
        let (pending, count, _) = run("<merge><A><B/></A><C/></merge>", Some("t"));
        assert_eq!(count, 2);
        assert_eq!(pending, vec![entry("A", tag("t_0")), entry("C", tag("t_1"))]);
    }

    #[test]
    fn test_nested_merge_gets_no_prefix() {
        let (pending, count, _) = run("<L><merge><V/></merge></L>", Some("t"));
        assert_eq!(count, 1);
        assert_eq!(pending, vec![entry("L", tag("t_0"))]);
    }

    #[test]
    fn test_merge_is_never_tagged() {
        let (pending, count, _) = run("<merge android:text=\"@{m}\"><V android:text=\"@{v}\"/></merge>", None);
        assert_eq!(count, 1);
        assert_eq!(pending, vec![entry("V", tag("binding_0"))]);
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // ATTRIBUTE REWRITING
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_lone_static_tag_does_not_force_a_tag() {
        let source = "<A android:tag=\"x\">\n<B android:tag=\"y\" android:text=\"@{v}\"/>\n</A>";
        let (pending, count, buffer) = run(source, None);
        assert_eq!(count, 1);
        assert_eq!(pending, vec![entry("B", tag("binding_0"))]);
        assert_eq!(buffer.line(0), Some("<A android:tag=\"x\">"));
        assert_eq!(
            buffer.line(1).map(str::to_string),
            Some(format!("<B{}/>", " ".repeat(36)))
        );
    }

    #[test]
    fn test_tag_written_over_first_attribute_with_room() {
        let source = "<V android:text=\"@{a}\" android:hint=\"@{user.lastName}\" android:src=\"@{user.avatar}\"/>";
        let (pending, _, buffer) = run(source, None);
        assert!(pending.is_empty());
        let line = buffer.line(0).unwrap();
        assert_eq!(line.matches("android:tag").count(), 1);
        assert!(!line.contains("@{"));
        assert_eq!(line.find("android:tag"), Some(23));
        assert_eq!(line.chars().count(), source.chars().count());
    }

    #[test]
    fn test_oversized_literal_is_deferred_with_the_tag() {
        let quotes = "&quot;".repeat(20);
        let source = format!("<V a=\"@{{b,default='{}'}}\"/>", quotes);
        let (pending, count, buffer) = run(&source, None);
        assert_eq!(count, 1);
        let literal = format!("a=\"{}\"", "\\&quot;".repeat(20));
        assert_eq!(
            pending,
            vec![entry("V", format!("{} {}", tag("binding_0"), literal))]
        );
        assert_eq!(
            buffer.line(0).map(str::to_string),
            Some(format!("<V{}/>", " ".repeat(140)))
        );
    }

    #[test]
    fn test_expression_attribute_detection() {
        let root: Element = parse_document("<V a=\"@{x}\" b='@{y}' c=\"@{z\" d=\"x\" android:tag=\"t\"/>")
            .unwrap()
            .root
            .unwrap();
        let vocabulary = LayoutVocabulary::default();
        let flags: Vec<bool> = root
            .attributes
            .iter()
            .map(|a| is_expression_attribute(a, &vocabulary))
            .collect();
        assert_eq!(flags, vec![true, true, false, false, true]);
    }

    #[test]
    fn test_node_kinds() {
        let vocabulary = LayoutVocabulary::default();
        assert_eq!(NodeKind::classify("layout", &vocabulary), NodeKind::Wrapper);
        assert_eq!(NodeKind::classify("data", &vocabulary), NodeKind::Metadata);
        assert_eq!(NodeKind::classify("merge", &vocabulary), NodeKind::Merge);
        assert_eq!(NodeKind::classify("include", &vocabulary), NodeKind::Include);
        assert_eq!(NodeKind::classify("TextView", &vocabulary), NodeKind::View);
    }
}
