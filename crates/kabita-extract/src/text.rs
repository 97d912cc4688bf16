// Text collection over the parsed markup tree.
//
// Walks ego_tree nodes directly so excluded subtrees (footnote spans and the
// like) are skipped in one pass rather than removed and re-parsed.

use ego_tree::NodeRef;
use scraper::{ElementRef, Node};
use std::ops::Deref;

/// Concatenate the element's own text nodes, ignoring descendants.
pub fn own_text(element: ElementRef) -> String {
    element
        .children()
        .filter_map(|child| child.value().as_text())
        .map(|text| text.deref())
        .collect()
}

/// Collect all text under `element`, skipping any subtree rooted at a tag in `skip`.
///
/// `<br>` inside a line becomes a space.
pub fn collect_text_excluding(element: ElementRef, skip: &[&str]) -> String {
    let mut text = String::new();
    walk(*element, skip, &mut text);
    text
}

fn walk(node: NodeRef<Node>, skip: &[&str], text: &mut String) {
    for child in node.children() {
        match child.value() {
            Node::Text(t) => text.push_str(t.deref()),
            Node::Element(elem) => {
                let tag = elem.name();
                if skip.contains(&tag) {
                    continue;
                }
                if tag == "br" {
                    text.push(' ');
                } else {
                    walk(child, skip, text);
                }
            }
            _ => {}
        }
    }
}
