//! Best-effort property lookup in JavaScript and TypeScript config files.
//!
//! Config files such as `next.config.mjs` or `astro.config.ts` are parsed with
//! tree-sitter and searched structurally; nothing is ever evaluated. Every
//! failure (unsupported grammar, unparseable source, missing property)
//! collapses to `None`.

mod property;
mod visitor;

pub use property::{find_nested_property, find_property};
pub use visitor::find_first;

use thiserror::Error;
use tree_sitter::{Parser, Tree};

#[derive(Debug, Error)]
pub enum SyntaxError {
    #[error("Failed to load {language} grammar: {message}")]
    Grammar {
        language: &'static str,
        message: String,
    },

    #[error("Parser produced no tree")]
    Parse,
}

/// Grammar used to read a config file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceLanguage {
    JavaScript,
    TypeScript,
}

impl SourceLanguage {
    /// `.ts`, `.mts` and `.cts` files use the TypeScript grammar; everything else is JavaScript.
    pub fn from_path(path: &str) -> Self {
        match path.rsplit_once('.').map(|(_, ext)| ext) {
            Some("ts") | Some("mts") | Some("cts") => Self::TypeScript,
            _ => Self::JavaScript,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::JavaScript => "javascript",
            Self::TypeScript => "typescript",
        }
    }

    fn grammar(self) -> tree_sitter::Language {
        match self {
            Self::JavaScript => tree_sitter_javascript::LANGUAGE.into(),
            Self::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
        }
    }
}

/// Tree-sitter parser bound to one grammar
pub struct ConfigParser {
    parser: Parser,
}

impl ConfigParser {
    pub fn new(language: SourceLanguage) -> Result<Self, SyntaxError> {
        let mut parser = Parser::new();
        parser
            .set_language(&language.grammar())
            .map_err(|e| SyntaxError::Grammar {
                language: language.as_str(),
                message: e.to_string(),
            })?;

        Ok(Self { parser })
    }

    /// Syntax errors inside the source still yield a tree with `ERROR` nodes.
    pub fn parse(&mut self, source: &str) -> Result<Tree, SyntaxError> {
        self.parser.parse(source, None).ok_or(SyntaxError::Parse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_from_path() {
        assert_eq!(
            SourceLanguage::from_path("next.config.ts"),
            SourceLanguage::TypeScript
        );
        assert_eq!(
            SourceLanguage::from_path("vite.config.mts"),
            SourceLanguage::TypeScript
        );
        assert_eq!(
            SourceLanguage::from_path("next.config.mjs"),
            SourceLanguage::JavaScript
        );
        assert_eq!(
            SourceLanguage::from_path("app.config.js"),
            SourceLanguage::JavaScript
        );
        assert_eq!(SourceLanguage::from_path("Makefile"), SourceLanguage::JavaScript);
    }

    #[test]
    fn test_parsers_load_both_grammars() {
        for language in [SourceLanguage::JavaScript, SourceLanguage::TypeScript] {
            let mut parser = ConfigParser::new(language).unwrap();
            let tree = parser.parse("export default {}").unwrap();
            assert_eq!(tree.root_node().kind(), "program");
        }
    }
}
