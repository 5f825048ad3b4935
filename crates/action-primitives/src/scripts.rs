//! Scripts injected into the active tab.
//!
//! Every script is an expression evaluating to a JSON value. Caller-supplied
//! strings are embedded as JSON string literals, never spliced raw.

use tabpilot_core_types::{ElementTarget, ScrollDirection};

/// Tags whose content is never part of the snapshot.
const SKIPPED_TAGS: &str = r#"["SCRIPT","STYLE","NOSCRIPT","SVG","TEMPLATE","IFRAME","LINK","META"]"#;

const MAX_SNAPSHOT_DEPTH: usize = 48;
const SCROLL_FRACTION: f64 = 0.8;

fn literal(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "\"\"".to_string())
}

/// Expression resolving `target` to an element or `null`.
///
/// Text targets prefer an exact match among clickable and editable
/// elements, then the first one whose text contains the needle.
fn locate(target: &ElementTarget) -> String {
    match target {
        ElementTarget::Css(selector) => {
            format!("document.querySelector({})", literal(selector))
        }
        ElementTarget::Text(text) => format!(
            r#"(() => {{
  const needle = {needle}.trim().toLowerCase();
  const pool = Array.from(document.querySelectorAll(
    'a, button, [role="button"], [role="link"], input, textarea, select, label, [contenteditable="true"]'));
  const textOf = (el) => (el.innerText || el.value || el.getAttribute('aria-label')
    || el.getAttribute('placeholder') || el.getAttribute('title') || '').trim().toLowerCase();
  return pool.find((el) => textOf(el) === needle)
    || pool.find((el) => textOf(el).includes(needle))
    || null;
}})()"#,
            needle = literal(text)
        ),
    }
}

pub fn click(target: &ElementTarget) -> String {
    format!(
        r#"(() => {{
  const el = {locate};
  if (!el) return {{ ok: false, reason: 'not_found' }};
  el.scrollIntoView({{ block: 'center' }});
  el.click();
  return {{ ok: true }};
}})()"#,
        locate = locate(target)
    )
}

/// Set the element's value and dispatch `input` then `change` so page
/// frameworks observe the edit.
pub fn type_text(target: &ElementTarget, text: &str) -> String {
    format!(
        r#"(() => {{
  const el = {locate};
  if (!el) return {{ ok: false, reason: 'not_found' }};
  el.focus();
  if ('value' in el) {{
    el.value = {text};
  }} else if (el.isContentEditable) {{
    el.textContent = {text};
  }} else {{
    return {{ ok: false, reason: 'not_editable' }};
  }}
  el.dispatchEvent(new Event('input', {{ bubbles: true }}));
  el.dispatchEvent(new Event('change', {{ bubbles: true }}));
  return {{ ok: true }};
}})()"#,
        locate = locate(target),
        text = literal(text)
    )
}

pub fn scroll(direction: ScrollDirection) -> String {
    let sign = match direction {
        ScrollDirection::Down => "",
        ScrollDirection::Up => "-",
    };
    format!(
        "(() => {{ window.scrollBy(0, {sign}Math.round(window.innerHeight * {SCROLL_FRACTION})); return {{ ok: true, y: window.scrollY }}; }})()"
    )
}

/// Serialize `document.body` into the `DomNode` JSON shape.
pub fn snapshot() -> String {
    format!(
        r#"(() => {{
  const skipped = new Set({SKIPPED_TAGS});
  const walk = (el, depth) => {{
    const node = {{ tag: el.tagName.toLowerCase(), attrs: {{}}, text: '', children: [] }};
    for (const attr of el.attributes) node.attrs[attr.name] = attr.value;
    const own = [];
    for (const child of el.childNodes) {{
      if (child.nodeType === Node.TEXT_NODE) {{
        const t = child.textContent.trim();
        if (t) own.push(t);
      }} else if (child.nodeType === Node.ELEMENT_NODE && depth < {MAX_SNAPSHOT_DEPTH}
          && !skipped.has(child.tagName.toUpperCase())) {{
        node.children.push(walk(child, depth + 1));
      }}
    }}
    node.text = own.join(' ');
    return node;
  }};
  return document.body ? walk(document.body, 0) : null;
}})()"#
    )
}
