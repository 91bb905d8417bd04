//! Frontmatter block parsing and rendering
//!
//! The block between the `---` delimiters is read as a YAML mapping with
//! serde_yaml, so block scalars, nested mappings and flow collections all
//! load into the JSON value model. Rendering writes top-level lists as dash
//! lists and nested values in flow style.

use serde_json::{Map, Value};

use super::{Frontmatter, MetadataError};

const DELIMITER: &str = "---";

/// Split a note into its frontmatter map and body.
///
/// A note without a complete `---` block has an empty frontmatter and the
/// whole content as body.
pub fn split(content: &str) -> Result<(Frontmatter, &str), MetadataError> {
	let Some((block, body)) = find_block(content) else {
		return Ok((Frontmatter::new(), content));
	};
	Ok((parse_block(block)?, body))
}

/// Locate the frontmatter block, returning the lines between the delimiters
/// and the body after the closing delimiter.
fn find_block(content: &str) -> Option<(&str, &str)> {
	let rest = content.strip_prefix('\u{feff}').unwrap_or(content);
	let first_end = rest.find('\n')?;
	if rest[..first_end].trim_end() != DELIMITER {
		return None;
	}

	let block_start = first_end + 1;
	let mut offset = block_start;
	for line in rest[block_start..].split_inclusive('\n') {
		if line.trim_end() == DELIMITER {
			let body = &rest[offset + line.len()..];
			return Some((&rest[block_start..offset], body));
		}
		offset += line.len();
	}
	None
}

fn parse_block(block: &str) -> Result<Frontmatter, MetadataError> {
	let has_content = block.lines().any(|l| {
		let l = l.trim();
		!l.is_empty() && !l.starts_with('#')
	});
	if !has_content {
		return Ok(Frontmatter::new());
	}

	// Block line numbers are offset by the opening delimiter
	let value: Value = serde_yaml::from_str(block)
		.map_err(|e| MetadataError::parse(e.location().map_or(1, |l| l.line()) + 1, e.to_string()))?;
	match value {
		Value::Null => Ok(Frontmatter::new()),
		Value::Object(map) => Ok(map),
		_ => Err(MetadataError::parse(2, "frontmatter must be a mapping")),
	}
}

/// Whether `s` reads back as the same plain string
fn is_plain_string(s: &str) -> bool {
	matches!(serde_yaml::from_str::<Value>(s), Ok(Value::String(ref parsed)) if parsed == s)
}

// ============================================================================
// RENDERING
// ============================================================================

/// Render a frontmatter map and body back into a note.
///
/// An empty map produces the body alone.
pub fn render(frontmatter: &Frontmatter, body: &str) -> String {
	if frontmatter.is_empty() {
		return body.to_string();
	}

	let mut out = String::from("---\n");
	for (key, value) in frontmatter {
		out.push_str(&render_key(key));
		out.push(':');
		match value {
			Value::Null => {}
			Value::Array(items) if items.is_empty() => out.push_str(" []"),
			Value::Array(items) => {
				for item in items {
					out.push_str("\n  - ");
					out.push_str(&render_scalar(item));
				}
			}
			other => {
				out.push(' ');
				out.push_str(&render_scalar(other));
			}
		}
		out.push('\n');
	}
	out.push_str("---\n");
	out.push_str(body);
	out
}

fn render_key(key: &str) -> String {
	if key.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '-' || c == '.') {
		key.to_string()
	} else {
		quote(key)
	}
}

fn render_scalar(value: &Value) -> String {
	match value {
		Value::Null => "null".to_string(),
		Value::Bool(b) => b.to_string(),
		Value::Number(n) => n.to_string(),
		Value::String(s) if needs_quotes(s) => quote(s),
		Value::String(s) => s.clone(),
		Value::Array(_) | Value::Object(_) => value.to_string(),
	}
}

fn needs_quotes(s: &str) -> bool {
	if s.is_empty() || s.trim() != s {
		return true;
	}
	if !is_plain_string(s) {
		return true;
	}
	let first = s.chars().next().unwrap_or(' ');
	"-?:,[]{}#&*!|>'\"%@`".contains(first) || s.contains(": ") || s.contains(" #") || s.contains('\n')
}

fn quote(s: &str) -> String {
	let mut out = String::with_capacity(s.len() + 2);
	out.push('"');
	for c in s.chars() {
		match c {
			'"' => out.push_str("\\\""),
			'\\' => out.push_str("\\\\"),
			'\n' => out.push_str("\\n"),
			'\t' => out.push_str("\\t"),
			c => out.push(c),
		}
	}
	out.push('"');
	out
}

/// Build a frontmatter map from pairs, mostly for tests and callers
/// assembling metadata by hand
pub fn from_pairs<I, K>(pairs: I) -> Frontmatter
where
	I: IntoIterator<Item = (K, Value)>,
	K: Into<String>,
{
	pairs.into_iter().map(|(k, v)| (k.into(), v)).collect::<Map<String, Value>>()
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn test_note_without_frontmatter() {
		let (fm, body) = split("# Title\n\ntext").unwrap();
		assert!(fm.is_empty());
		assert_eq!(body, "# Title\n\ntext");
	}

	#[test]
	fn test_unterminated_block_is_body() {
		let content = "---\ntitle: A\nno closing";
		let (fm, body) = split(content).unwrap();
		assert!(fm.is_empty());
		assert_eq!(body, content);
	}

	#[test]
	fn test_scalars() {
		let content = "---\ntitle: A\ncount: 3\nratio: 0.5\ndone: true\nempty:\nquoted: \"a: b\"\nsingle: 'it''s'\n---\nhello";
		let (fm, body) = split(content).unwrap();
		assert_eq!(body, "hello");
		assert_eq!(fm["title"], json!("A"));
		assert_eq!(fm["count"], json!(3));
		assert_eq!(fm["ratio"], json!(0.5));
		assert_eq!(fm["done"], json!(true));
		assert_eq!(fm["empty"], Value::Null);
		assert_eq!(fm["quoted"], json!("a: b"));
		assert_eq!(fm["single"], json!("it's"));
	}

	#[test]
	fn test_lists() {
		let content = "---\ntags: [x, \"y, z\"]\naliases:\n  - one\n  - two\nnone: []\n---\n";
		let (fm, _) = split(content).unwrap();
		assert_eq!(fm["tags"], json!(["x", "y, z"]));
		assert_eq!(fm["aliases"], json!(["one", "two"]));
		assert_eq!(fm["none"], json!([]));
	}

	#[test]
	fn test_crlf_and_comments() {
		let content = "---\r\n# comment\r\ntitle: A # trailing\r\n---\r\nbody";
		let (fm, body) = split(content).unwrap();
		assert_eq!(fm["title"], json!("A"));
		assert_eq!(body, "body");
	}

	#[test]
	fn test_block_scalars() {
		let content = "---\ndescription: >\n  folded\n  text\nnotes: |\n  line one\n  line two\n---\nbody";
		let (fm, body) = split(content).unwrap();
		assert_eq!(fm["description"], json!("folded text\n"));
		assert_eq!(fm["notes"], json!("line one\nline two\n"));
		assert_eq!(body, "body");
	}

	#[test]
	fn test_nested_mapping() {
		let (fm, _) = split("---\nauthor:\n  name: x\n  links:\n    - a\n---\n").unwrap();
		assert_eq!(fm["author"], json!({"name": "x", "links": ["a"]}));
	}

	#[test]
	fn test_comment_only_block() {
		let (fm, body) = split("---\n# nothing yet\n---\nbody").unwrap();
		assert!(fm.is_empty());
		assert_eq!(body, "body");
	}

	#[test]
	fn test_invalid_yaml_reports_line() {
		let err = split("---\ntitle: A\ntags: [unclosed\n---\n").unwrap_err();
		assert!(matches!(err, MetadataError::Parse { .. }), "{}", err);

		let err = split("---\n- just\n- a list\n---\n").unwrap_err();
		assert!(err.to_string().contains("mapping"), "{}", err);
	}

	#[test]
	fn test_render_then_split_preserves_values() {
		let fm = from_pairs([
			("title", json!("A: the sequel")),
			("tags", json!(["x", "y"])),
			("published", json!(true)),
			("version", json!("1.0")),
			("extra", json!({"k": 1})),
		]);
		let rendered = render(&fm, "hello\n");
		assert!(rendered.starts_with("---\ntitle: \"A: the sequel\"\ntags:\n  - x\n  - y\n"));

		let (parsed, body) = split(&rendered).unwrap();
		assert_eq!(parsed, fm);
		assert_eq!(body, "hello\n");
	}

	#[test]
	fn test_render_empty_frontmatter() {
		assert_eq!(render(&Frontmatter::new(), "body"), "body");
	}
}

// vim: ts=4
