use super::visitor::find_first;
use super::{ConfigParser, SourceLanguage};
use tracing::debug;
use tree_sitter::{Node, Tree};

/// Find the first value bound to `name` anywhere in the source.
///
/// Two shapes match, whichever comes first in document order:
///
/// * an object pair whose key (quotes stripped) is `name`, e.g. `output: "export"`
/// * an identifier spelled `name` followed by a named sibling, e.g.
///   `const output = "export"`
///
/// The returned text has one pair of surrounding quotes removed. Lookups are
/// scope-unaware: a nested object's key can shadow a top-level one that comes
/// later in the file.
pub fn find_property(source: &str, language: SourceLanguage, name: &str) -> Option<String> {
    let tree = parse(source, language)?;

    find_first(tree.root_node(), |node| {
        let value = pair_value(node, source, name).or_else(|| identifier_value(node, source, name))?;
        let text = trim_quotes(node_text(value, source)?);
        (!text.is_empty()).then(|| text.to_string())
    })
}

/// Follow a path of object keys, e.g. `["server", "preset"]`.
///
/// Each segment is searched for inside the value of the previous one, so only
/// the first segment is looked up across the whole file.
pub fn find_nested_property(
    source: &str,
    language: SourceLanguage,
    path: &[&str],
) -> Option<String> {
    if path.is_empty() {
        return None;
    }

    let tree = parse(source, language)?;
    resolve_path(tree.root_node(), source, path)
}

fn resolve_path(scope: Node<'_>, source: &str, path: &[&str]) -> Option<String> {
    let (first, rest) = path.split_first()?;
    let value = find_first(scope, |node| pair_value(node, source, first))?;

    if rest.is_empty() {
        return Some(trim_quotes(node_text(value, source)?).to_string());
    }

    resolve_path(value, source, rest)
}

fn parse(source: &str, language: SourceLanguage) -> Option<Tree> {
    let mut parser = match ConfigParser::new(language) {
        Ok(parser) => parser,
        Err(e) => {
            debug!(error = %e, "Config parser unavailable");
            return None;
        }
    };

    match parser.parse(source) {
        Ok(tree) => Some(tree),
        Err(e) => {
            debug!(error = %e, language = language.as_str(), "Failed to parse config source");
            None
        }
    }
}

fn pair_value<'tree>(node: Node<'tree>, source: &str, name: &str) -> Option<Node<'tree>> {
    if node.kind() != "pair" {
        return None;
    }

    let key = node.child_by_field_name("key")?;
    if trim_quotes(node_text(key, source)?) != name {
        return None;
    }

    node.child_by_field_name("value")
}

fn identifier_value<'tree>(node: Node<'tree>, source: &str, name: &str) -> Option<Node<'tree>> {
    if !matches!(node.kind(), "identifier" | "property_identifier") {
        return None;
    }
    if node_text(node, source)? != name {
        return None;
    }

    node.next_named_sibling()
}

fn node_text<'s>(node: Node<'_>, source: &'s str) -> Option<&'s str> {
    node.utf8_text(source.as_bytes()).ok()
}

fn trim_quotes(text: &str) -> &str {
    for quote in ['"', '\'', '`'] {
        if let Some(inner) = text
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    text
}
