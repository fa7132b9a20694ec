use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use super::*;

const PAGE: &str = r#"
<main id="page">
  <section class="faq">
    <button class="toggle-faq first"><span>Q1</span><svg class="icon"></svg></button>
    <div class="answer hidden">A1</div>
    <button class="toggle-faq"><span>Q2</span></button>
    text between
    <div class="answer">A2</div>
  </section>
  <form id="validateEmail"><input id="email" type="email" value="seed@example.com"><p id="result"></p></form>
</main>
"#;

#[test]
fn parse_builds_queryable_tree() {
    let document = Document::parse(PAGE).expect("parse");

    let toggles = document.query_selector_all(".toggle-faq");
    assert_eq!(toggles.len(), 2);
    assert!(toggles[0].class_list().contains("first"));
    assert_eq!(toggles[0].tag_name(), "button");

    let form = document.get_element_by_id("validateEmail").expect("form");
    assert_eq!(form.tag_name(), "form");
    assert_eq!(
        document.query_selector("#result").expect("result").tag_name(),
        "p"
    );
    assert!(document.get_element_by_id("missing").is_none());
    assert!(document.query_selector_all("div > p").is_empty());
}

#[test]
fn next_element_sibling_skips_text_nodes() {
    let document = Document::parse(PAGE).expect("parse");
    let toggles = document.query_selector_all(".toggle-faq");

    let first = toggles[0].next_element_sibling().expect("sibling");
    assert_eq!(first.text_content(), "A1");

    let second = toggles[1].next_element_sibling().expect("sibling");
    assert_eq!(second.text_content(), "A2");

    let last = document.get_element_by_id("validateEmail").expect("form");
    assert!(last.next_element_sibling().is_none());
}

#[test]
fn class_list_toggle_reports_presence() {
    let document = Document::new();
    let div = document.create_element("div");
    div.set_attribute("class", "a hidden b");

    assert!(!div.class_list().toggle("hidden"));
    assert_eq!(div.class_list().to_vec(), vec!["a", "b"]);
    assert!(div.class_list().toggle("hidden"));
    assert_eq!(div.attribute("class").as_deref(), Some("a b hidden"));

    div.class_list().remove("a");
    div.class_list().remove("b");
    div.class_list().remove("hidden");
    assert_eq!(div.attribute("class"), None);
    div.class_list().add("x");
    div.class_list().add("x");
    assert_eq!(div.class_list().to_vec(), vec!["x"]);
}

#[test]
fn inner_html_replaces_children_and_serializes() {
    let document = Document::parse(PAGE).expect("parse");
    let icon = document.query_selector("svg").expect("icon");

    icon.set_inner_html(r#"<path d="M5 12h14"></path>"#)
        .expect("markup");
    assert_eq!(icon.inner_html(), r#"<path d="M5 12h14"></path>"#);
    assert_eq!(
        icon.query_selector("path")
            .and_then(|path| path.attribute("d"))
            .as_deref(),
        Some("M5 12h14")
    );

    icon.set_inner_html(r#"<path d="M12 5v14M5 12h14"/>"#)
        .expect("markup");
    assert_eq!(icon.children().len(), 1);
    assert_eq!(icon.inner_html(), r#"<path d="M12 5v14M5 12h14"></path>"#);

    assert!(icon.set_inner_html("<path d=\"broken").is_err());
    assert_eq!(icon.children().len(), 1);
}

#[test]
fn text_content_replaces_children() {
    let document = Document::parse(PAGE).expect("parse");
    let button = document.query_selector(".first").expect("button");

    assert_eq!(button.text_content(), "Q1");
    button.set_text_content("<b>plain</b>");
    assert!(button.query_selector("svg").is_none());
    assert_eq!(button.inner_html(), "&lt;b&gt;plain&lt;/b&gt;");
}

#[test]
fn input_value_starts_from_attribute_and_is_independent() {
    let document = Document::parse(PAGE).expect("parse");
    let input = document.get_element_by_id("email").expect("input");

    assert_eq!(input.value(), "seed@example.com");
    input.set_value("  typed@example.com ");
    assert_eq!(input.value(), "  typed@example.com ");
    assert_eq!(input.attribute("value").as_deref(), Some("seed@example.com"));
}

#[test]
fn built_tree_behaves_like_parsed_tree() {
    let document = Document::new();
    let list = document.create_element("UL");
    let item = document.create_element("li");
    item.set_attribute("id", "only");
    list.append_child(&item);
    document.append_child(&list);

    assert_eq!(document.children(), vec![list.clone()]);
    assert_eq!(item.parent_element(), Some(list.clone()));
    assert_eq!(document.get_element_by_id("only"), Some(item.clone()));
    assert_eq!(document.to_html(), r#"<ul><li id="only"></li></ul>"#);

    item.append_child(&list);
    assert_eq!(item.children().len(), 0);
}

#[test]
fn detached_elements_are_not_found_by_id() {
    let document = Document::new();
    let floating = document.create_element("div");
    floating.set_attribute("id", "floating");
    assert!(document.get_element_by_id("floating").is_none());
}

#[test]
fn events_bubble_to_ancestor_listeners() {
    let document = Document::parse(PAGE).expect("parse");
    let button = document.query_selector(".first").expect("button");
    let span = button.query_selector("span").expect("span");
    let hits = Arc::new(AtomicUsize::new(0));

    let seen = hits.clone();
    let expected = button.clone();
    button.add_event_listener(EventType::Click, move |event| {
        assert_eq!(event.current_target(), &expected);
        assert_eq!(event.target().tag_name(), "span");
        seen.fetch_add(1, Ordering::SeqCst);
        None
    });

    let dispatch = span.click();
    assert_eq!(dispatch.pending(), 0);
    assert!(!dispatch.default_prevented());
    assert_eq!(hits.load(Ordering::SeqCst), 1);

    let submit = span.request_submit();
    assert_eq!(submit.pending(), 0);
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn handler_tasks_run_when_the_dispatch_settles() {
    let document = Document::parse(PAGE).expect("parse");
    let form = document.get_element_by_id("validateEmail").expect("form");
    let done = Arc::new(AtomicUsize::new(0));

    let finished = done.clone();
    form.add_event_listener(EventType::Submit, move |event| {
        event.prevent_default();
        let finished = finished.clone();
        let task: HandlerTask = Box::pin(async move {
            finished.fetch_add(1, Ordering::SeqCst);
        });
        Some(task)
    });

    let dispatch = form.request_submit();
    assert!(dispatch.default_prevented());
    assert_eq!(dispatch.pending(), 1);
    assert_eq!(done.load(Ordering::SeqCst), 0);

    dispatch.settle().await;
    assert_eq!(done.load(Ordering::SeqCst), 1);
}

#[test]
fn replaced_content_reuses_arena_slots() {
    let document = Document::parse(PAGE).expect("parse");
    let icon = document.query_selector("svg").expect("icon");
    let result = document.get_element_by_id("result").expect("result");

    icon.set_inner_html(r#"<path d="M12 5v14M5 12h14"></path>"#)
        .expect("markup");
    result.set_text_content("Valid email!");
    let settled = document.slot_count();

    for round in 0..200 {
        let glyph = if round % 2 == 0 {
            r#"<path d="M5 12h14"></path>"#
        } else {
            r#"<path d="M12 5v14M5 12h14"></path>"#
        };
        icon.set_inner_html(glyph).expect("markup");
        result.set_text_content(if round % 2 == 0 { "Invalid email!" } else { "Valid email!" });
    }

    assert_eq!(document.slot_count(), settled);
    assert_eq!(result.text_content(), "Valid email!");
}

#[test]
fn handles_to_dropped_nodes_go_stale() {
    let document = Document::parse(PAGE).expect("parse");
    let icon = document.query_selector("svg").expect("icon");
    icon.set_inner_html(r#"<path d="M5 12h14"></path>"#)
        .expect("markup");
    let old_path = icon.query_selector("path").expect("path");
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    old_path.add_event_listener(EventType::Click, move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        None
    });

    icon.set_inner_html(r#"<path d="M12 5v14M5 12h14"></path>"#)
        .expect("markup");
    let new_path = icon.query_selector("path").expect("path");

    assert_ne!(old_path, new_path);
    assert_eq!(old_path.tag_name(), "");
    assert_eq!(old_path.attribute("d"), None);
    assert!(old_path.parent_element().is_none());

    let dispatch = new_path.click();
    assert_eq!(dispatch.pending(), 0);
    assert_eq!(hits.load(Ordering::SeqCst), 0);

    old_path.set_text_content("ignored");
    assert_eq!(icon.children(), vec![new_path]);
}
