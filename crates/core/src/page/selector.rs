//! CSS selector synthesis for actionable elements.

use scraper::node::Element as HtmlElement;

/// Test-automation attributes tried after `data-testid`, in order.
const DATA_ATTRS: [&str; 5] = [
	"data-test",
	"data-qa",
	"data-automation",
	"data-cy",
	"data-automation-id",
];

fn non_empty<'a>(element: &'a HtmlElement, name: &str) -> Option<&'a str> {
	element.attr(name).filter(|value| !value.is_empty())
}

/// Escapes a value for use inside a double-quoted attribute selector.
pub fn escape_attr_value(value: &str) -> String {
	let mut out = String::with_capacity(value.len());
	for ch in value.chars() {
		if matches!(ch, '"' | '\\') {
			out.push('\\');
		}
		out.push(ch);
	}
	out
}

/// True when `value` can follow `#` or `.` in a selector without escaping.
fn is_plain_ident(value: &str) -> bool {
	let body = value.strip_prefix('-').unwrap_or(value);
	let Some(first) = body.chars().next() else {
		return false;
	};
	if first.is_ascii_digit() || first == '-' {
		return false;
	}
	body
		.chars()
		.all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_') || !ch.is_ascii())
}

fn by_attr(tag: &str, name: &str, value: &str) -> String {
	format!("{tag}[{name}=\"{}\"]", escape_attr_value(value))
}

/// Picks the most stable selector available for `element`.
///
/// `nth_child` is the 1-based position among element siblings; `path` is
/// the tag chain from the document root down to and including `tag`.
pub(crate) fn synthesize(tag: &str, element: &HtmlElement, nth_child: Option<usize>, path: &[String]) -> String {
	if let Some(id) = non_empty(element, "id") {
		if is_plain_ident(id) {
			return format!("#{id}");
		}
		return by_attr(tag, "id", id);
	}
	if let Some(value) = non_empty(element, "data-testid") {
		return by_attr(tag, "data-testid", value);
	}
	for name in DATA_ATTRS {
		if let Some(value) = non_empty(element, name) {
			return by_attr(tag, name, value);
		}
	}
	for name in ["name", "aria-label"] {
		if let Some(value) = non_empty(element, name) {
			return by_attr(tag, name, value);
		}
	}
	let class = element.attr("class").and_then(|c| c.split_whitespace().next());
	if let Some(class) = class.filter(|c| is_plain_ident(c)) {
		return format!("{tag}.{class}");
	}
	if let Some(n) = nth_child {
		return format!("{tag}:nth-child({n})");
	}
	if !path.is_empty() {
		return path.join(" > ");
	}
	tag.to_string()
}
