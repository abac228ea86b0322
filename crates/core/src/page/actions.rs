//! Derivation of [`Action`]s from reduced elements.

use surf_protocol::Element;

use super::types::{Action, Verb};

/// One action per element that has a selector and a known verb.
pub fn build_actions(elements: &[Element]) -> Vec<Action> {
	elements
		.iter()
		.filter(|element| !element.selector.is_empty())
		.filter_map(|element| {
			Some(Action {
				verb: verb_for(element)?,
				selector: element.selector.clone(),
				label: label_for(element),
				hint: hint_for(element),
			})
		})
		.collect()
}

pub fn verb_for(element: &Element) -> Option<Verb> {
	let verb = match element.tag.to_ascii_lowercase().as_str() {
		"a" => Verb::Open,
		"button" | "div" | "span" => Verb::Click,
		"select" => Verb::Select,
		"textarea" => Verb::Type,
		"input" => match element.input_type.to_ascii_lowercase().as_str() {
			"submit" | "button" => Verb::Click,
			"checkbox" => Verb::Toggle,
			"radio" => Verb::Select,
			_ => Verb::Type,
		},
		_ => return None,
	};
	Some(verb)
}

pub fn label_for(element: &Element) -> String {
	[
		&element.text,
		&element.aria_label,
		&element.title,
		&element.alt,
		&element.value,
		&element.placeholder,
		&element.name,
		&element.context,
	]
	.into_iter()
	.map(|value| value.trim())
	.find(|value| !value.is_empty())
	.unwrap_or_default()
	.to_string()
}

pub fn hint_for(element: &Element) -> String {
	if !element.href.is_empty() {
		format!("href={}", element.href)
	} else if !element.input_type.is_empty() {
		format!("type={}", element.input_type)
	} else if !element.name.is_empty() {
		format!("name={}", element.name)
	} else {
		String::new()
	}
}
