//! In-memory document tree.
//!
//! Nodes live in an arena behind a single lock. [`Document`] and [`Element`]
//! are cheap handles into it; every method takes the lock for the duration
//! of one operation and never across a listener call or an `.await`.

use std::{
    collections::{BTreeMap, HashMap},
    fmt,
    sync::Arc,
};

use parking_lot::Mutex;
use tracing::debug;

use crate::{
    event::{Dispatch, Event, EventType, HandlerTask, Listener},
    markup::{self, MarkupError, MarkupNode},
    selector::Selector,
};

/// Arena slot index plus the generation it was issued for. A handle whose
/// node has been dropped no longer resolves, even after the slot is reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    index: usize,
    generation: u32,
}

const ROOT: NodeId = NodeId {
    index: 0,
    generation: 0,
};

#[derive(Debug, Clone)]
enum NodeKind {
    Document,
    Element(ElementData),
    Text(String),
}

#[derive(Debug, Clone)]
struct ElementData {
    tag: String,
    attrs: BTreeMap<String, String>,
    value: String,
}

impl ElementData {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attrs: BTreeMap::new(),
            value: String::new(),
        }
    }

    fn classes(&self) -> Vec<&str> {
        self.attrs
            .get("class")
            .map(|classes| classes.split_whitespace().collect())
            .unwrap_or_default()
    }

    fn set_classes(&mut self, classes: &[String]) {
        if classes.is_empty() {
            self.attrs.remove("class");
        } else {
            self.attrs.insert("class".to_string(), classes.join(" "));
        }
    }
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    kind: NodeKind,
}

struct Slot {
    generation: u32,
    node: Option<Node>,
}

struct Dom {
    slots: Vec<Slot>,
    free: Vec<usize>,
    listeners: HashMap<(NodeId, EventType), Vec<Listener>>,
}

impl Dom {
    fn new() -> Self {
        Self {
            slots: vec![Slot {
                generation: 0,
                node: Some(Node {
                    parent: None,
                    children: Vec::new(),
                    kind: NodeKind::Document,
                }),
            }],
            free: Vec::new(),
            listeners: HashMap::new(),
        }
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        let node = Node {
            parent: None,
            children: Vec::new(),
            kind,
        };
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index];
            slot.node = Some(node);
            return NodeId {
                index,
                generation: slot.generation,
            };
        }
        self.slots.push(Slot {
            generation: 0,
            node: Some(node),
        });
        NodeId {
            index: self.slots.len() - 1,
            generation: 0,
        }
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        self.slots
            .get(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.slots
            .get_mut(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
    }

    fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|node| node.parent)
    }

    fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id)
            .map(|node| node.children.as_slice())
            .unwrap_or(&[])
    }

    fn element(&self, id: NodeId) -> Option<&ElementData> {
        match &self.node(id)?.kind {
            NodeKind::Element(data) => Some(data),
            _ => None,
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        match &mut self.node_mut(id)?.kind {
            NodeKind::Element(data) => Some(data),
            _ => None,
        }
    }

    fn is_element(&self, id: NodeId) -> bool {
        self.element(id).is_some()
    }

    fn live_nodes(&self) -> usize {
        self.slots.iter().filter(|slot| slot.node.is_some()).count()
    }

    fn is_ancestor_or_self(&self, ancestor: NodeId, mut node: NodeId) -> bool {
        loop {
            if node == ancestor {
                return true;
            }
            match self.parent(node) {
                Some(parent) => node = parent,
                None => return false,
            }
        }
    }

    fn detach(&mut self, child: NodeId) {
        let parent = self.node_mut(child).and_then(|node| node.parent.take());
        if let Some(parent) = parent.and_then(|parent| self.node_mut(parent)) {
            parent.children.retain(|id| *id != child);
        }
    }

    /// Returns false when the append would create a cycle or either node is
    /// gone.
    fn append(&mut self, parent: NodeId, child: NodeId) -> bool {
        if self.node(parent).is_none()
            || self.node(child).is_none()
            || self.is_ancestor_or_self(child, parent)
        {
            return false;
        }
        self.detach(child);
        if let Some(node) = self.node_mut(child) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.node_mut(parent) {
            node.children.push(child);
        }
        true
    }

    /// Drops every child subtree of `parent`. Their slots are recycled and
    /// outstanding handles to them stop resolving.
    fn clear_children(&mut self, parent: NodeId) {
        let Some(node) = self.node_mut(parent) else {
            return;
        };
        let children = std::mem::take(&mut node.children);
        for child in children {
            let mut doomed = self.descendants(child);
            doomed.push(child);
            for id in doomed {
                self.release(id);
            }
        }
    }

    fn release(&mut self, id: NodeId) {
        let Some(slot) = self
            .slots
            .get_mut(id.index)
            .filter(|slot| slot.generation == id.generation && slot.node.is_some())
        else {
            return;
        };
        slot.node = None;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        self.listeners.retain(|(node, _), _| *node != id);
    }

    fn insert_markup(&mut self, parent: NodeId, nodes: Vec<MarkupNode>) {
        for node in nodes {
            match node {
                MarkupNode::Text(text) => {
                    let id = self.push(NodeKind::Text(text));
                    self.append(parent, id);
                }
                MarkupNode::Element {
                    tag,
                    attrs,
                    children,
                } => {
                    let mut data = ElementData::new(&tag);
                    for (name, value) in attrs {
                        data.attrs.insert(name, value);
                    }
                    data.value = data.attrs.get("value").cloned().unwrap_or_default();
                    let id = self.push(NodeKind::Element(data));
                    self.append(parent, id);
                    self.insert_markup(id, children);
                }
            }
        }
    }

    /// Descendants in document order, excluding `root` itself.
    fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(root).iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        out
    }

    fn matching_descendants(&self, root: NodeId, selector: &Selector) -> Vec<NodeId> {
        self.descendants(root)
            .into_iter()
            .filter(|id| {
                self.element(*id).is_some_and(|data| {
                    selector.matches(
                        &data.tag,
                        data.attrs.get("id").map(String::as_str),
                        &data.classes(),
                    )
                })
            })
            .collect()
    }

    fn next_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        let siblings = self.children(self.parent(id)?);
        let index = siblings.iter().position(|sibling| *sibling == id)?;
        siblings[index + 1..]
            .iter()
            .copied()
            .find(|sibling| self.is_element(*sibling))
    }

    fn text_content(&self, id: NodeId) -> String {
        let Some(node) = self.node(id) else {
            return String::new();
        };
        if let NodeKind::Text(text) = &node.kind {
            return text.clone();
        }
        self.descendants(id)
            .into_iter()
            .filter_map(|node| match &self.node(node)?.kind {
                NodeKind::Text(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    fn serialize_children(&self, id: NodeId, out: &mut String) {
        let raw = self
            .element(id)
            .is_some_and(|data| markup::is_raw_text_element(&data.tag));
        for child in self.children(id) {
            match self.node(*child).map(|node| &node.kind) {
                Some(NodeKind::Text(text)) if raw => out.push_str(text),
                Some(NodeKind::Text(text)) => out.push_str(&markup::escape_text(text)),
                Some(NodeKind::Element(data)) => {
                    out.push('<');
                    out.push_str(&data.tag);
                    for (name, value) in &data.attrs {
                        out.push(' ');
                        out.push_str(name);
                        out.push_str("=\"");
                        out.push_str(&markup::escape_attr(value));
                        out.push('"');
                    }
                    out.push('>');
                    if markup::is_void_element(&data.tag) {
                        continue;
                    }
                    self.serialize_children(*child, out);
                    out.push_str("</");
                    out.push_str(&data.tag);
                    out.push('>');
                }
                Some(NodeKind::Document) | None => {}
            }
        }
    }
}

/// Handle to a document tree. Clones share the same tree.
///
/// Replacing an element's content frees the old nodes' slots for reuse, so
/// repeated re-rendering keeps the arena at a steady size.
#[derive(Clone)]
pub struct Document {
    dom: Arc<Mutex<Dom>>,
}

impl Document {
    pub fn new() -> Self {
        Self {
            dom: Arc::new(Mutex::new(Dom::new())),
        }
    }

    /// Builds a document from server-rendered markup.
    pub fn parse(html: &str) -> Result<Self, MarkupError> {
        let nodes = markup::parse_fragment(html)?;
        let document = Self::new();
        document.dom.lock().insert_markup(ROOT, nodes);
        Ok(document)
    }

    fn wrap(&self, node: NodeId) -> Element {
        Element {
            document: self.clone(),
            node,
        }
    }

    fn same_tree(&self, other: &Document) -> bool {
        Arc::ptr_eq(&self.dom, &other.dom)
    }

    pub fn create_element(&self, tag: &str) -> Element {
        let node = self
            .dom
            .lock()
            .push(NodeKind::Element(ElementData::new(tag)));
        self.wrap(node)
    }

    pub fn append_child(&self, child: &Element) {
        if self.same_tree(&child.document) {
            self.dom.lock().append(ROOT, child.node);
        }
    }

    pub fn children(&self) -> Vec<Element> {
        let dom = self.dom.lock();
        dom.children(ROOT)
            .iter()
            .copied()
            .filter(|id| dom.is_element(*id))
            .map(|id| self.wrap(id))
            .collect()
    }

    /// First attached element carrying the id, in document order.
    pub fn get_element_by_id(&self, id: &str) -> Option<Element> {
        let dom = self.dom.lock();
        dom.descendants(ROOT)
            .into_iter()
            .find(|node| {
                dom.element(*node)
                    .and_then(|data| data.attrs.get("id"))
                    .is_some_and(|value| value == id)
            })
            .map(|node| self.wrap(node))
    }

    pub fn query_selector(&self, selector: &str) -> Option<Element> {
        self.query_selector_all(selector).into_iter().next()
    }

    /// Unsupported selector syntax matches nothing.
    pub fn query_selector_all(&self, selector: &str) -> Vec<Element> {
        query_all(self, ROOT, selector)
    }

    #[cfg(test)]
    pub(crate) fn slot_count(&self) -> usize {
        self.dom.lock().slots.len()
    }

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.dom.lock().serialize_children(ROOT, &mut out);
        out
    }

    /// Delivers an event to `target` and bubbles it through its ancestors.
    pub fn dispatch_event(&self, target: &Element, kind: EventType) -> Dispatch {
        if !self.same_tree(&target.document) {
            return Dispatch::new(false, Vec::new());
        }

        let path: Vec<NodeId> = {
            let dom = self.dom.lock();
            let mut path = vec![target.node];
            let mut current = dom.parent(target.node);
            while let Some(parent) = current {
                path.push(parent);
                current = dom.parent(parent);
            }
            path
        };

        let mut event = Event::new(kind, target.clone());
        let mut tasks: Vec<HandlerTask> = Vec::new();
        for node in path {
            let listeners: Vec<Listener> = self
                .dom
                .lock()
                .listeners
                .get(&(node, kind))
                .cloned()
                .unwrap_or_default();
            if listeners.is_empty() {
                continue;
            }
            event.set_current_target(self.wrap(node));
            for listener in listeners {
                if let Some(task) = listener(&mut event) {
                    tasks.push(task);
                }
            }
        }

        debug!(
            event = kind.as_str(),
            pending = tasks.len(),
            default_prevented = event.default_prevented(),
            "dispatched event"
        );
        Dispatch::new(event.default_prevented(), tasks)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dom = self.dom.lock();
        f.debug_struct("Document")
            .field("nodes", &dom.live_nodes())
            .field("listeners", &dom.listeners.len())
            .finish()
    }
}

fn query_all(document: &Document, root: NodeId, selector: &str) -> Vec<Element> {
    let Some(parsed) = Selector::parse(selector) else {
        debug!(%selector, "unsupported selector");
        return Vec::new();
    };
    let matches = document.dom.lock().matching_descendants(root, &parsed);
    matches.into_iter().map(|id| document.wrap(id)).collect()
}

/// Handle to one element node.
#[derive(Clone)]
pub struct Element {
    document: Document,
    node: NodeId,
}

impl Element {
    pub fn owner_document(&self) -> Document {
        self.document.clone()
    }

    pub fn node_id(&self) -> NodeId {
        self.node
    }

    fn with_data<T>(&self, read: impl FnOnce(&ElementData) -> T) -> Option<T> {
        self.document.dom.lock().element(self.node).map(read)
    }

    fn update_data<T>(&self, write: impl FnOnce(&mut ElementData) -> T) -> Option<T> {
        self.document.dom.lock().element_mut(self.node).map(write)
    }

    pub fn tag_name(&self) -> String {
        self.with_data(|data| data.tag.clone()).unwrap_or_default()
    }

    pub fn id(&self) -> Option<String> {
        self.attribute("id")
    }

    pub fn attribute(&self, name: &str) -> Option<String> {
        self.with_data(|data| data.attrs.get(name).cloned())
            .flatten()
    }

    pub fn set_attribute(&self, name: &str, value: &str) {
        self.update_data(|data| {
            data.attrs
                .insert(name.to_ascii_lowercase(), value.to_string())
        });
    }

    pub fn class_list(&self) -> ClassList<'_> {
        ClassList { element: self }
    }

    pub fn parent_element(&self) -> Option<Element> {
        let dom = self.document.dom.lock();
        dom.parent(self.node)
            .filter(|parent| dom.is_element(*parent))
            .map(|parent| self.document.wrap(parent))
    }

    pub fn children(&self) -> Vec<Element> {
        let dom = self.document.dom.lock();
        dom.children(self.node)
            .iter()
            .copied()
            .filter(|id| dom.is_element(*id))
            .map(|id| self.document.wrap(id))
            .collect()
    }

    /// Next element after this one under the same parent, skipping text.
    pub fn next_element_sibling(&self) -> Option<Element> {
        let sibling = self.document.dom.lock().next_element_sibling(self.node)?;
        Some(self.document.wrap(sibling))
    }

    /// Moves `child` under this element. Ignored for elements of another
    /// document or when it would make an element its own ancestor.
    pub fn append_child(&self, child: &Element) {
        if self.document.same_tree(&child.document) {
            self.document.dom.lock().append(self.node, child.node);
        }
    }

    pub fn query_selector(&self, selector: &str) -> Option<Element> {
        self.query_selector_all(selector).into_iter().next()
    }

    pub fn query_selector_all(&self, selector: &str) -> Vec<Element> {
        query_all(&self.document, self.node, selector)
    }

    pub fn inner_html(&self) -> String {
        let mut out = String::new();
        self.document
            .dom
            .lock()
            .serialize_children(self.node, &mut out);
        out
    }

    /// Replaces all children with the parsed markup. On a parse error the
    /// element is left untouched. The old children are dropped, so handles
    /// to them stop resolving.
    pub fn set_inner_html(&self, html: &str) -> Result<(), MarkupError> {
        let nodes = markup::parse_fragment(html)?;
        let mut dom = self.document.dom.lock();
        if dom.node(self.node).is_none() {
            return Ok(());
        }
        dom.clear_children(self.node);
        dom.insert_markup(self.node, nodes);
        Ok(())
    }

    pub fn text_content(&self) -> String {
        self.document.dom.lock().text_content(self.node)
    }

    pub fn set_text_content(&self, text: &str) {
        let mut dom = self.document.dom.lock();
        if dom.node(self.node).is_none() {
            return;
        }
        dom.clear_children(self.node);
        if !text.is_empty() {
            let id = dom.push(NodeKind::Text(text.to_string()));
            dom.append(self.node, id);
        }
    }

    /// Current value of a form control.
    pub fn value(&self) -> String {
        self.with_data(|data| data.value.clone()).unwrap_or_default()
    }

    pub fn set_value(&self, value: &str) {
        self.update_data(|data| data.value = value.to_string());
    }

    pub fn add_event_listener<F>(&self, kind: EventType, listener: F)
    where
        F: Fn(&mut Event) -> Option<HandlerTask> + Send + Sync + 'static,
    {
        self.document
            .dom
            .lock()
            .listeners
            .entry((self.node, kind))
            .or_default()
            .push(Arc::new(listener));
    }

    pub fn click(&self) -> Dispatch {
        self.document.dispatch_event(self, EventType::Click)
    }

    /// Fires `submit` at this element, as a form's submit button would.
    pub fn request_submit(&self) -> Dispatch {
        self.document.dispatch_event(self, EventType::Submit)
    }
}

impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        self.node == other.node && self.document.same_tree(&other.document)
    }
}

impl Eq for Element {}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (tag, id) = self
            .with_data(|data| (data.tag.clone(), data.attrs.get("id").cloned()))
            .unwrap_or_default();
        f.debug_struct("Element")
            .field("node", &self.node)
            .field("tag", &tag)
            .field("id", &id)
            .finish()
    }
}

/// Token list view over an element's `class` attribute.
pub struct ClassList<'a> {
    element: &'a Element,
}

impl ClassList<'_> {
    pub fn contains(&self, class: &str) -> bool {
        self.element
            .with_data(|data| data.classes().contains(&class))
            .unwrap_or(false)
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.element
            .with_data(|data| data.classes().into_iter().map(str::to_string).collect())
            .unwrap_or_default()
    }

    pub fn add(&self, class: &str) {
        self.element.update_data(|data| {
            let mut classes: Vec<String> =
                data.classes().into_iter().map(str::to_string).collect();
            if !classes.iter().any(|existing| existing == class) {
                classes.push(class.to_string());
                data.set_classes(&classes);
            }
        });
    }

    pub fn remove(&self, class: &str) {
        self.element.update_data(|data| {
            let classes: Vec<String> = data
                .classes()
                .into_iter()
                .filter(|existing| *existing != class)
                .map(str::to_string)
                .collect();
            data.set_classes(&classes);
        });
    }

    /// Flips the class and reports whether it is now present.
    pub fn toggle(&self, class: &str) -> bool {
        self.element
            .update_data(|data| {
                let mut classes: Vec<String> =
                    data.classes().into_iter().map(str::to_string).collect();
                let present = match classes.iter().position(|existing| existing == class) {
                    Some(index) => {
                        classes.remove(index);
                        false
                    }
                    None => {
                        classes.push(class.to_string());
                        true
                    }
                };
                data.set_classes(&classes);
                present
            })
            .unwrap_or(false)
    }
}

#[cfg(test)]
#[path = "tests/dom_tests.rs"]
mod tests;
