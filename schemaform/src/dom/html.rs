use std::fmt::Write;

use super::{Document, NodeData, NodeId};

const VOID_TAGS: [&str; 6] = ["input", "br", "hr", "img", "meta", "link"];

impl Document {
    /// Serialize the whole document, live control state included.
    pub fn to_html(&self) -> String {
        self.node_html(self.root)
    }

    /// Serialize the subtree rooted at `node`.
    pub fn node_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.write_node(&mut out, node, None);
        out
    }

    fn write_node(&self, out: &mut String, node: NodeId, selected: Option<&str>) {
        let el = match &self.nodes[node.0].data {
            NodeData::Text(t) => {
                out.push_str(&escape(t, false));
                return;
            }
            NodeData::Element(el) => el,
        };

        out.push('<');
        out.push_str(&el.tag);
        for (k, v) in el.attrs() {
            let _ = write!(out, " {k}=\"{}\"", escape(v, true));
        }
        match el.tag.as_str() {
            "input" => {
                if el.input_type() == "checkbox" {
                    if el.checked() {
                        out.push_str(" checked");
                    }
                } else {
                    let _ = write!(out, " value=\"{}\"", escape(el.value(), true));
                }
            }
            "option" if selected.is_some() && el.attr("value") == selected => {
                out.push_str(" selected");
            }
            _ => {}
        }
        out.push('>');

        if VOID_TAGS.contains(&el.tag.as_str()) {
            return;
        }
        if el.tag == "textarea" {
            out.push_str(&escape(el.value(), false));
        } else {
            let selected = (el.tag == "select").then(|| el.value()).or(selected);
            for child in self.children(node) {
                self.write_node(out, *child, selected);
            }
        }
        let _ = write!(out, "</{}>", el.tag);
    }
}

fn escape(text: &str, attr: bool) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attr => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialize_live_state() {
        let mut doc = Document::default();
        let root = doc.root();
        let input = doc.append_element(root, "input", &[("type", "text"), ("name", "a")]);
        doc.set_value(input, "x \"y\" <z>");
        let check = doc.append_element(root, "input", &[("type", "checkbox")]);
        doc.set_checked(check, true);
        let select = doc.append_element(root, "select", &[]);
        let opt = doc.append_element(select, "option", &[("value", "1")]);
        doc.append_text(opt, "One");
        let opt = doc.append_element(select, "option", &[("value", "2")]);
        doc.append_text(opt, "Two & more");
        doc.set_value(select, "2");

        assert_eq!(
            doc.to_html(),
            "<form><input type=\"text\" name=\"a\" value=\"x &quot;y&quot; &lt;z&gt;\">\
             <input type=\"checkbox\" checked>\
             <select><option value=\"1\">One</option>\
             <option value=\"2\" selected>Two &amp; more</option></select></form>"
        );
    }
}
