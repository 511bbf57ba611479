//! Tests for arena tree construction and traversal.

use parsl_dom::{Attribute, AttributeList, DomTree, ElementData, Namespace, NodeId, NodeType};

fn alloc_element(tree: &mut DomTree, tag: &str) -> NodeId {
    let mut attrs = AttributeList::new();
    let _ = attrs.set("id", format!("{tag}-id"));
    tree.alloc(NodeType::Element(ElementData::new(0, tag.to_string(), Namespace::Html, attrs)))
}

#[test]
fn new_tree_has_only_the_document_node() {
    let tree = DomTree::new();
    assert_eq!(tree.len(), 1);
    assert_eq!(tree.root(), NodeId::ROOT);
    assert!(matches!(tree.get(NodeId::ROOT).unwrap().node_type, NodeType::Document));
}

#[test]
fn append_child_links_siblings_in_order() {
    let mut tree = DomTree::new();
    let html = alloc_element(&mut tree, "html");
    tree.append_child(NodeId::ROOT, html);

    let head = alloc_element(&mut tree, "head");
    let body = alloc_element(&mut tree, "body");
    tree.append_child(html, head);
    tree.append_child(html, body);

    assert_eq!(tree.children(html), &[head, body]);
    assert_eq!(tree.next_sibling(head), Some(body));
    assert_eq!(tree.prev_sibling(body), Some(head));
    assert_eq!(tree.parent(body), Some(html));
}

#[test]
fn document_element_and_body_are_found_by_tag_name() {
    let mut tree = DomTree::new();
    let html = alloc_element(&mut tree, "html");
    tree.append_child(NodeId::ROOT, html);
    let body = alloc_element(&mut tree, "body");
    tree.append_child(html, body);

    assert_eq!(tree.document_element(), Some(html));
    assert_eq!(tree.body(), Some(body));
}

#[test]
fn descendants_are_in_document_order() {
    let mut tree = DomTree::new();
    let html = alloc_element(&mut tree, "html");
    tree.append_child(NodeId::ROOT, html);
    let head = alloc_element(&mut tree, "head");
    let body = alloc_element(&mut tree, "body");
    tree.append_child(html, head);
    tree.append_child(html, body);
    let p = alloc_element(&mut tree, "p");
    tree.append_child(body, p);

    let order: Vec<NodeId> = tree.descendants(html).collect();
    assert_eq!(order, vec![head, body, p]);
}

#[test]
fn attribute_list_lookup_is_case_insensitive_and_replaces_in_place() {
    let mut attrs = AttributeList::new();
    assert!(!attrs.set("Href", "/a".to_string()));
    assert_eq!(attrs.len(), 1);
    assert!(attrs.set("HREF", "/b".to_string()));
    assert_eq!(attrs.len(), 1);
    assert_eq!(attrs.get("href"), Some("/b"));
}

#[test]
fn attribute_list_preserves_insertion_order() {
    let attrs: AttributeList = vec![
        Attribute { name: "class".to_string(), value: "a".to_string() },
        Attribute { name: "id".to_string(), value: "b".to_string() },
    ]
    .into_iter()
    .collect();

    let names: Vec<&str> = attrs.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec!["class", "id"]);
}
