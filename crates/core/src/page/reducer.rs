//! Reduction of a raw page capture into a bounded [`Snapshot`].

use ego_tree::NodeRef;
use scraper::node::Element as HtmlElement;
use scraper::{Html, Node};
use serde::{Deserialize, Serialize};
use surf_protocol::Element;

use super::actions::build_actions;
use super::selector;
use super::types::{RawPage, Snapshot};

pub const DEFAULT_MAX_TEXT: usize = 4000;
pub const DEFAULT_MAX_ELEMENTS: usize = 80;

/// Sibling text kept as an element's `context`.
const CONTEXT_LIMIT: usize = 80;

/// Elements whose text content is never page text.
const SKIPPED_TAGS: [&str; 4] = ["script", "style", "noscript", "template"];

/// Bounds applied by a [`Reducer`]. Zero selects the default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReduceOptions {
	pub max_text: usize,
	pub max_elements: usize,
}

/// Deterministic page reducer. Pure and synchronous.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reducer {
	max_text: usize,
	max_elements: usize,
}

impl Default for Reducer {
	fn default() -> Self {
		Self::new(ReduceOptions::default())
	}
}

impl Reducer {
	pub fn new(options: ReduceOptions) -> Self {
		let or_default = |value: usize, default: usize| if value == 0 { default } else { value };
		Self {
			max_text: or_default(options.max_text, DEFAULT_MAX_TEXT),
			max_elements: or_default(options.max_elements, DEFAULT_MAX_ELEMENTS),
		}
	}

	pub fn max_text(&self) -> usize {
		self.max_text
	}

	pub fn max_elements(&self) -> usize {
		self.max_elements
	}

	/// Copy of this reducer with any non-zero override applied.
	pub fn with_limits(&self, max_text: Option<usize>, max_elements: Option<usize>) -> Self {
		Self::new(ReduceOptions {
			max_text: max_text.filter(|n| *n > 0).unwrap_or(self.max_text),
			max_elements: max_elements.filter(|n| *n > 0).unwrap_or(self.max_elements),
		})
	}

	/// Reduces `raw` to at most `max_text` characters of text and
	/// `max_elements` elements, deriving one action per usable element.
	///
	/// Elements parsed from `html` win when there are any; otherwise the
	/// extension-supplied elements are used as-is. Parsed text is only used
	/// when the supplied text is blank.
	pub fn reduce(&self, raw: RawPage) -> Snapshot {
		let RawPage {
			url,
			title,
			text,
			html,
			elements: supplied,
		} = raw;

		let mut text = text.trim().to_string();
		let mut elements = Vec::new();
		if let Some(html) = html.as_deref().filter(|html| !html.trim().is_empty()) {
			let parsed = parse_html(html, self.max_elements);
			if text.is_empty() {
				text = parsed.text;
			}
			elements = parsed.elements;
		}
		if elements.is_empty() {
			elements = supplied;
		}

		let mut text = compact_whitespace(&text);
		truncate_chars(&mut text, self.max_text);
		let kept = text.trim_end().len();
		text.truncate(kept);
		elements.truncate(self.max_elements);

		let actions = build_actions(&elements);
		Snapshot {
			id: None,
			url,
			title,
			text,
			elements,
			actions,
		}
	}
}

struct ParsedPage {
	text: String,
	elements: Vec<Element>,
}

fn parse_html(html: &str, max_elements: usize) -> ParsedPage {
	let document = Html::parse_document(html);
	let mut walker = Walker {
		max_elements,
		text: String::new(),
		elements: Vec::new(),
		path: Vec::new(),
	};
	walker.walk(document.tree.root());
	ParsedPage {
		text: walker.text,
		elements: walker.elements,
	}
}

/// Depth-first document walk collecting page text and actionable elements.
struct Walker {
	max_elements: usize,
	text: String,
	elements: Vec<Element>,
	path: Vec<String>,
}

impl Walker {
	fn is_full(&self) -> bool {
		self.elements.len() >= self.max_elements
	}

	fn walk(&mut self, node: NodeRef<'_, Node>) {
		let mut entered = false;
		match node.value() {
			Node::Element(element) => {
				let tag = element.name().to_ascii_lowercase();
				if is_skipped(&tag) {
					return;
				}
				self.path.push(tag.clone());
				entered = true;
				if is_actionable(&tag, element) {
					let built = build_element(&tag, node, element, &self.path);
					if is_retained(&built) {
						self.elements.push(built);
					}
				}
			}
			Node::Text(text) => {
				let text = text.trim();
				if !text.is_empty() {
					self.text.push_str(text);
					self.text.push(' ');
				}
			}
			_ => {}
		}

		for child in node.children() {
			if self.is_full() {
				break;
			}
			self.walk(child);
		}

		if entered {
			self.path.pop();
		}
	}
}

fn is_skipped(tag: &str) -> bool {
	SKIPPED_TAGS.contains(&tag)
}

fn is_actionable(tag: &str, element: &HtmlElement) -> bool {
	match tag {
		"a" | "button" | "input" | "select" | "textarea" => true,
		"div" | "span" => matches!(element.attr("role"), Some("button" | "link")),
		_ => false,
	}
}

fn is_retained(element: &Element) -> bool {
	!element.text.is_empty()
		|| !element.aria_label.is_empty()
		|| !element.name.is_empty()
		|| !element.id.is_empty()
}

fn build_element(tag: &str, node: NodeRef<'_, Node>, element: &HtmlElement, path: &[String]) -> Element {
	let attr = |name: &str| element.attr(name).unwrap_or_default().to_string();
	Element {
		tag: tag.to_string(),
		text: descendant_text(node),
		selector: selector::synthesize(tag, element, nth_child(node), path),
		href: attr("href"),
		input_type: attr("type"),
		name: attr("name"),
		id: attr("id"),
		aria_label: attr("aria-label"),
		title: attr("title"),
		alt: attr("alt"),
		value: attr("value"),
		placeholder: attr("placeholder"),
		context: sibling_text(node),
	}
}

fn collect_text<'a>(node: NodeRef<'a, Node>, out: &mut Vec<&'a str>) {
	for child in node.children() {
		match child.value() {
			Node::Text(text) => {
				let text = text.trim();
				if !text.is_empty() {
					out.push(text);
				}
			}
			Node::Element(element) if is_skipped(element.name()) => {}
			_ => collect_text(child, out),
		}
	}
}

fn descendant_text(node: NodeRef<'_, Node>) -> String {
	let mut parts = Vec::new();
	collect_text(node, &mut parts);
	compact_whitespace(&parts.join(" "))
}

/// 1-based position among the parent's element children.
fn nth_child(node: NodeRef<'_, Node>) -> Option<usize> {
	let parent = node.parent()?;
	parent
		.children()
		.filter(|child| child.value().is_element())
		.position(|child| child.id() == node.id())
		.map(|index| index + 1)
}

/// Direct text children of the parent, excluding `node` itself.
fn sibling_text(node: NodeRef<'_, Node>) -> String {
	let Some(parent) = node.parent() else {
		return String::new();
	};
	let parts: Vec<&str> = parent
		.children()
		.filter(|child| child.id() != node.id())
		.filter_map(|child| child.value().as_text())
		.map(|text| text.trim())
		.filter(|text| !text.is_empty())
		.collect();
	let mut context = compact_whitespace(&parts.join(" "));
	truncate_chars(&mut context, CONTEXT_LIMIT);
	context
}

/// Collapses every whitespace run to a single space and trims the ends.
pub fn compact_whitespace(input: &str) -> String {
	input.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn truncate_chars(text: &mut String, max: usize) {
	if let Some((index, _)) = text.char_indices().nth(max) {
		text.truncate(index);
	}
}
