use super::text::{accessible_name, extract_text, NameFor};
use super::visibility::{content_elements, visible_elements};
use super::Page;
use crate::host::HostNode;
use crate::models::{ButtonSnapshot, FormField, FormSnapshot, SearchDescriptor, SelectOption};
use crate::utils::{closest_ancestor, has_ancestor, normalize_text, to_absolute_uri};
use std::collections::HashSet;

const BUTTON_INPUT_TYPES: &[&str] = &["button", "submit", "reset"];
const SEARCH_NAMES: &[&str] = &["q", "query", "search", "s"];
/// Inputs that can never be a search box.
const NON_TEXT_INPUTS: &[&str] = &[
    "hidden", "submit", "button", "reset", "checkbox", "radio", "file", "image", "password",
    "range", "color",
];

fn input_type<N: HostNode>(node: &N) -> String {
    node.attr("type")
        .map(|t| t.trim().to_ascii_lowercase())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| "text".to_string())
}

fn is_form_control<N: HostNode>(node: &N) -> bool {
    matches!(
        node.tag_name().as_deref(),
        Some("input" | "select" | "textarea" | "button")
    )
}

/// Removed from the tab order: an anti-automation trap, not a real field.
fn is_trap<N: HostNode>(node: &N) -> bool {
    node.attr("tabindex").is_some_and(|t| t.trim() == "-1")
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| normalize_text(&v))
        .filter(|v| !v.is_empty())
}

pub fn harvest_forms<N: HostNode>(document: &N, page: &Page) -> Vec<FormSnapshot> {
    let page_address = page.page_address();
    let mut seen_actions = HashSet::new();
    let mut forms = vec![];
    for form in visible_elements(document).into_iter().filter(|n| n.has_tag("form")) {
        let action = form
            .attr("action")
            .filter(|a| !a.trim().is_empty())
            .map(|a| page.resolve(&a))
            .unwrap_or_else(|| page_address.clone());
        if !seen_actions.insert(action.clone()) {
            tracing::debug!(%action, "skipping form with a duplicate action");
            continue;
        }
        let method = form
            .attr("method")
            .map(|m| m.trim().to_ascii_uppercase())
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| "GET".to_string());
        let fields = visible_elements(&form)
            .into_iter()
            .filter(is_form_control)
            .filter_map(|control| form_field(&control))
            .collect();
        forms.push(FormSnapshot {
            action,
            method,
            label: accessible_name(&form, NameFor::Region),
            fields,
        });
    }
    forms
}

fn form_field<N: HostNode>(control: &N) -> Option<FormField> {
    let tag = control.tag_name()?;
    let field_type = match tag.as_str() {
        "input" => input_type(control),
        "button" => control
            .attr("type")
            .map(|t| t.trim().to_ascii_lowercase())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| "submit".to_string()),
        other => other.to_string(),
    };
    if field_type == "hidden" || is_trap(control) {
        return None;
    }
    let name_for = if tag == "button" || BUTTON_INPUT_TYPES.contains(&field_type.as_str()) {
        NameFor::Button
    } else {
        NameFor::Field
    };
    let (value, options) = match tag.as_str() {
        "select" => {
            let options = select_options(control);
            let value = selected_value(control);
            (value, Some(options))
        }
        "textarea" => (non_empty(Some(extract_text(control))), None),
        _ if field_type == "password" => (None, None),
        "input" if matches!(field_type.as_str(), "checkbox" | "radio") => {
            let checked = control.has_attr("checked");
            (checked.then(|| non_empty(control.attr("value"))).flatten(), None)
        }
        "input" => (non_empty(control.attr("value")), None),
        _ => (None, None),
    };
    Some(FormField {
        name: control.attr("name").map(|n| n.trim().to_string()).unwrap_or_default(),
        label: accessible_name(control, name_for).unwrap_or_default(),
        required: control.has_attr("required")
            || control
                .attr("aria-required")
                .is_some_and(|v| v.trim().eq_ignore_ascii_case("true")),
        field_type,
        value,
        options,
    })
}

fn option_elements<N: HostNode>(select: &N) -> Vec<N> {
    crate::utils::descendant_elements(select)
        .into_iter()
        .filter(|n| n.has_tag("option"))
        .collect()
}

fn option_value<N: HostNode>(option: &N) -> String {
    option
        .attr("value")
        .unwrap_or_else(|| extract_text(option))
}

fn select_options<N: HostNode>(select: &N) -> Vec<SelectOption> {
    option_elements(select)
        .iter()
        .map(|option| {
            let text = extract_text(option);
            SelectOption {
                value: option_value(option),
                label: non_empty(option.attr("label")).unwrap_or(text),
            }
        })
        .collect()
}

/// The option a browser would show: the last one marked `selected`, else
/// the first.
fn selected_value<N: HostNode>(select: &N) -> Option<String> {
    let options = option_elements(select);
    options
        .iter()
        .rev()
        .find(|o| o.has_attr("selected"))
        .or(options.first())
        .map(option_value)
}

pub fn harvest_buttons<N: HostNode>(document: &N, page: &Page) -> Vec<ButtonSnapshot> {
    let classifier = page.classifier;
    let mut seen = HashSet::new();
    let mut buttons = vec![];
    for node in content_elements(document, classifier) {
        let button_type = match node.tag_name().as_deref() {
            Some("button") => node
                .attr("type")
                .map(|t| t.trim().to_ascii_lowercase())
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| "submit".to_string()),
            Some("input") if BUTTON_INPUT_TYPES.contains(&input_type(&node).as_str()) => {
                input_type(&node)
            }
            _ if node.role().as_deref() == Some("button") => "button".to_string(),
            _ => continue,
        };
        if has_ancestor(&node, |a| a.has_tag("form")) {
            continue;
        }
        let Some(text) = accessible_name(&node, NameFor::Button) else {
            continue;
        };
        if classifier.is_carousel_phrase(&text) || !classifier.is_content_text(&text) {
            continue;
        }
        if !seen.insert(text.to_lowercase()) {
            continue;
        }
        buttons.push(ButtonSnapshot { text, button_type });
    }
    buttons
}

fn in_search_landmark<N: HostNode>(node: &N) -> bool {
    has_ancestor(node, |a| a.has_tag("search") || a.role().as_deref() == Some("search"))
}

fn contains_search(value: Option<String>) -> bool {
    value.is_some_and(|v| v.to_lowercase().contains("search"))
}

/// Search box probes, strongest first: an explicit search input, a
/// conventional query name, "search" in its label, placeholder or id, and
/// finally any input inside a search landmark.
fn matches_search_tier<N: HostNode>(tier: usize, input: &N) -> bool {
    match tier {
        0 => input_type(input) == "search",
        1 => input
            .attr("name")
            .is_some_and(|name| SEARCH_NAMES.contains(&name.trim().to_lowercase().as_str())),
        2 => {
            contains_search(accessible_name(input, NameFor::Field))
                || contains_search(input.attr("placeholder"))
                || contains_search(input.attr("id"))
        }
        _ => in_search_landmark(input),
    }
}

/// Find the site's search box and describe how to submit a query to it.
pub fn detect_search<N: HostNode>(document: &N, page: &Page) -> Option<SearchDescriptor> {
    let inputs = visible_elements(document)
        .into_iter()
        .filter(|n| n.has_tag("input") && !NON_TEXT_INPUTS.contains(&input_type(n).as_str()))
        .collect::<Vec<_>>();

    let input = (0..4).find_map(|tier| inputs.iter().find(|n| matches_search_tier(tier, *n)))?;

    let action = match closest_ancestor(input, "form") {
        Some(form) => form
            .attr("action")
            .filter(|a| !a.trim().is_empty())
            .map(|a| page.resolve(&a))
            .unwrap_or_else(|| page.page_address()),
        None => to_absolute_uri("/search", page.doc_uri),
    };
    let param_name = input
        .attr("name")
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| "q".to_string());
    Some(SearchDescriptor { action, param_name })
}
