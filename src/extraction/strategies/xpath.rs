//! XPath evaluation over the message body parsed as XML.

use super::ExtractionStrategy;
use crate::config::ExtractionConfig;
use crate::extraction::domain::{ExtractionError, ExtractionResult, ParsingRule};
use crate::message::Message;
use sxd_document::dom::{ChildOfElement, Element};
use sxd_document::parser;
use sxd_xpath::nodeset::Node;
use sxd_xpath::{Value, evaluate_xpath};

const INDENT: &str = "  ";

pub(in crate::extraction) struct XpathStrategy;

impl ExtractionStrategy for XpathStrategy {
    fn extract(
        &self,
        rule: &ParsingRule,
        message: &Message,
        _config: &ExtractionConfig,
    ) -> ExtractionResult<Vec<String>> {
        // A body that is not XML has nothing to match.
        let Ok(package) = parser::parse(message.body()) else {
            return Ok(Vec::new());
        };
        let document = package.as_document();
        let result = evaluate_xpath(&document, rule.expression())
            .map_err(|err| ExtractionError::invalid(rule, err))?;

        let values = match result {
            Value::Nodeset(nodes) => {
                let ordered = nodes.document_order();
                let limit = if rule.is_multiple() { ordered.len() } else { 1 };
                ordered.into_iter().take(limit).map(render_node).collect()
            }
            other => vec![other.string()],
        };
        Ok(values)
    }
}

fn render_node(node: Node<'_>) -> String {
    match node {
        Node::Element(element) => {
            let mut out = String::new();
            render_element(element, 0, &mut out);
            out
        }
        other => other.string_value(),
    }
}

fn render_element(element: Element<'_>, depth: usize, out: &mut String) {
    let indent = INDENT.repeat(depth);
    out.push_str(&indent);
    out.push('<');
    out.push_str(element.name().local_part());
    for attribute in element.attributes() {
        out.push_str(&format!(
            " {}=\"{}\"",
            attribute.name().local_part(),
            escape(attribute.value())
        ));
    }

    let children = element.children();
    if children.is_empty() {
        out.push_str("/>");
        return;
    }
    out.push('>');

    let text_only = children
        .iter()
        .all(|child| matches!(child, ChildOfElement::Text(_)));
    if text_only {
        for child in &children {
            if let ChildOfElement::Text(text) = child {
                out.push_str(&escape(text.text()));
            }
        }
    } else {
        for child in children {
            match child {
                ChildOfElement::Element(nested) => {
                    out.push('\n');
                    render_element(nested, depth.saturating_add(1), out);
                }
                ChildOfElement::Text(text) if !text.text().trim().is_empty() => {
                    out.push('\n');
                    out.push_str(&INDENT.repeat(depth.saturating_add(1)));
                    out.push_str(&escape(text.text().trim()));
                }
                _ => {}
            }
        }
        out.push('\n');
        out.push_str(&indent);
    }
    out.push_str("</");
    out.push_str(element.name().local_part());
    out.push('>');
}

fn escape(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
