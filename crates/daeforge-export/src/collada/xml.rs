//! Small builder helpers over `xmltree::Element`

use std::fmt::Display;

use xmltree::{Element, XMLNode};

pub(crate) trait ElementExt: Sized {
    fn attr(self, key: &str, value: impl Into<String>) -> Self;
    fn child(self, child: Element) -> Self;
    fn text(self, text: impl Into<String>) -> Self;
    fn push(&mut self, child: Element);
}

impl ElementExt for Element {
    fn attr(mut self, key: &str, value: impl Into<String>) -> Self {
        self.attributes.insert(key.to_string(), value.into());
        self
    }

    fn child(mut self, child: Element) -> Self {
        self.push(child);
        self
    }

    fn text(mut self, text: impl Into<String>) -> Self {
        self.children.push(XMLNode::Text(text.into()));
        self
    }

    fn push(&mut self, child: Element) {
        self.children.push(XMLNode::Element(child));
    }
}

/// `<name>text</name>`
pub(crate) fn text_element(name: &str, text: impl Into<String>) -> Element {
    Element::new(name).text(text)
}

/// Space separated values
pub(crate) fn join<T: Display>(values: impl IntoIterator<Item = T>) -> String {
    let mut out = String::new();
    for (i, value) in values.into_iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.push_str(&value.to_string());
    }
    out
}

/// `#id`
pub(crate) fn url(id: &str) -> String {
    format!("#{id}")
}
