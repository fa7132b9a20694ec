use super::*;

fn element(tag: &str, attrs: &[(&str, &str)], children: Vec<MarkupNode>) -> MarkupNode {
    MarkupNode::Element {
        tag: tag.to_string(),
        attrs: attrs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
        children,
    }
}

fn text(value: &str) -> MarkupNode {
    MarkupNode::Text(value.to_string())
}

#[test]
fn parses_nested_elements_with_attributes() {
    let nodes = parse_fragment(r#"<div id="a" class='x y'><span data-n=3>hi</span></div>"#)
        .expect("parse");
    assert_eq!(
        nodes,
        vec![element(
            "div",
            &[("id", "a"), ("class", "x y")],
            vec![element("span", &[("data-n", "3")], vec![text("hi")])],
        )]
    );
}

#[test]
fn void_and_self_closing_elements_take_no_children() {
    let nodes = parse_fragment(r#"<input id="email" required><path d="M5 12h14"/>tail"#)
        .expect("parse");
    assert_eq!(
        nodes,
        vec![
            element("input", &[("id", "email"), ("required", "")], vec![]),
            element("path", &[("d", "M5 12h14")], vec![]),
            text("tail"),
        ]
    );
}

#[test]
fn skips_comments_and_doctype() {
    let nodes = parse_fragment("<!DOCTYPE html><!-- note --><p>x</p>").expect("parse");
    assert_eq!(nodes, vec![element("p", &[], vec![text("x")])]);
}

#[test]
fn decodes_character_references() {
    let nodes = parse_fragment(r#"<p title="a &quot;b&quot;">1 &lt; 2 &amp;&amp; &#65;&#x42; &bogus;</p>"#)
        .expect("parse");
    assert_eq!(
        nodes,
        vec![element(
            "p",
            &[("title", "a \"b\"")],
            vec![text("1 < 2 && AB &bogus;")],
        )]
    );
}

#[test]
fn script_body_is_raw_text() {
    let nodes = parse_fragment("<script>if (a < b) { go(); }</script><p></p>").expect("parse");
    assert_eq!(
        nodes,
        vec![
            element("script", &[], vec![text("if (a < b) { go(); }")]),
            element("p", &[], vec![]),
        ]
    );
}

#[test]
fn recovers_from_stray_and_missing_close_tags() {
    let nodes = parse_fragment("</em><ul><li>one<li>two</ul>").expect("parse");
    assert_eq!(
        nodes,
        vec![element(
            "ul",
            &[],
            vec![element(
                "li",
                &[],
                vec![text("one"), element("li", &[], vec![text("two")])],
            )],
        )]
    );
}

#[test]
fn lone_angle_bracket_is_text() {
    let nodes = parse_fragment("a < b").expect("parse");
    assert_eq!(nodes, vec![text("a "), text("< b")]);
}

#[test]
fn reports_unterminated_constructs() {
    assert_eq!(
        parse_fragment("<p>ok</p><div class=\"x"),
        Err(MarkupError::UnterminatedAttribute { offset: 21 })
    );
    assert_eq!(
        parse_fragment("<div"),
        Err(MarkupError::UnterminatedTag { offset: 0 })
    );
    assert_eq!(
        parse_fragment("x<!-- open"),
        Err(MarkupError::UnterminatedComment { offset: 1 })
    );
}

#[test]
fn escapes_for_serialization() {
    assert_eq!(escape_text("a<b & c>"), "a&lt;b &amp; c&gt;");
    assert_eq!(escape_attr(r#"say "hi""#), "say &quot;hi&quot;");
}
