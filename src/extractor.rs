// src/extractor.rs

use crate::model::{EntityDescriptor, EntityKind, ObjectTable};
use std::collections::VecDeque;
use thiserror::Error;
use tree_sitter::{Node, Parser};

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("source text contains syntax errors")]
    Syntax,

    #[error("parser setup failed: {0}")]
    Setup(String),
}

/// Turns source text into the function and class declarations it contains.
///
/// Implementations report every declaration at any nesting depth, in
/// breadth-first order, so that a later entry with the same name shadows an
/// earlier one when collected into an [`ObjectTable`].
pub trait SourceParser {
    fn parse(&self, text: &str) -> Result<Vec<EntityDescriptor>, ParseError>;
}

/// Python grammar via tree-sitter
#[derive(Debug, Default, Clone, Copy)]
pub struct PythonParser;

// Wrapper nodes that have no counterpart in Python's own AST. Their children
// are walked at the wrapper's depth.
const TRANSPARENT_KINDS: &[&str] = &["block", "decorated_definition", "else_clause", "finally_clause"];

// Nodes whose span ends where their last nested statement ends
const BODY_KINDS: &[&str] = &[
    "block",
    "else_clause",
    "elif_clause",
    "except_clause",
    "except_group_clause",
    "finally_clause",
    "case_clause",
    "decorated_definition",
    "function_definition",
    "class_definition",
];

// Python 2 statements the grammar still accepts
const REJECTED_KINDS: &[&str] = &["print_statement", "exec_statement"];

impl PythonParser {
    fn entity_of(node: Node<'_>, source: &[u8]) -> Option<EntityDescriptor> {
        let kind = match node.kind() {
            "function_definition" => EntityKind::Function,
            "class_definition" => EntityKind::Class,
            _ => return None,
        };
        let name = node.child_by_field_name("name")?.utf8_text(source).ok()?;

        let start_row = node.start_position().row;
        Some(EntityDescriptor::new(kind, name, start_row + 1, Self::end_row(node) + 1))
    }

    /// Row of the last statement inside `node`, ignoring trailing comments
    fn end_row(node: Node<'_>) -> usize {
        let mut cursor = node.walk();
        let last = node.named_children(&mut cursor).filter(|c| c.kind() != "comment").last();
        match last {
            Some(child) if node.kind() == "block" || BODY_KINDS.contains(&child.kind()) => Self::end_row(child),
            _ => node.end_position().row,
        }
    }

    fn push_children<'t>(node: Node<'t>, queue: &mut VecDeque<Node<'t>>) {
        let mut cursor = node.walk();
        let children: Vec<Node<'t>> = node.named_children(&mut cursor).collect();
        for child in children {
            if TRANSPARENT_KINDS.contains(&child.kind()) {
                Self::push_children(child, queue);
            } else {
                queue.push_back(child);
            }
        }
    }
}

impl SourceParser for PythonParser {
    fn parse(&self, text: &str) -> Result<Vec<EntityDescriptor>, ParseError> {
        let mut parser = Parser::new();
        let language: tree_sitter::Language = tree_sitter_python::LANGUAGE.into();
        parser.set_language(&language).map_err(|e| ParseError::Setup(e.to_string()))?;

        let tree = parser.parse(text, None).ok_or_else(|| ParseError::Setup("parser returned no tree".into()))?;
        let root = tree.root_node();
        if root.has_error() {
            return Err(ParseError::Syntax);
        }

        let source = text.as_bytes();
        let mut entities = Vec::new();
        let mut queue = VecDeque::new();
        Self::push_children(root, &mut queue);

        while let Some(node) = queue.pop_front() {
            if REJECTED_KINDS.contains(&node.kind()) {
                return Err(ParseError::Syntax);
            }
            if let Some(entity) = Self::entity_of(node, source) {
                entities.push(entity);
            }
            Self::push_children(node, &mut queue);
        }

        Ok(entities)
    }
}

/// Builds name-keyed [`ObjectTable`]s from source text
pub struct SourceObjectExtractor {
    parser: Box<dyn SourceParser>,
}

impl SourceObjectExtractor {
    pub fn new(parser: Box<dyn SourceParser>) -> Self {
        Self { parser }
    }

    pub fn python() -> Self {
        Self::new(Box::new(PythonParser))
    }

    /// Never fails: text that does not parse contributes no entities.
    pub fn extract(&self, text: &str) -> ObjectTable {
        match self.parser.parse(text) {
            Ok(entities) => entities.into_iter().collect(),
            Err(e) => {
                tracing::debug!("treating text as empty: {}", e);
                ObjectTable::new()
            }
        }
    }
}
