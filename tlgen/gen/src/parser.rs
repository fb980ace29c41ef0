//! Line parser for TDLib TL schema files.
//!
//! Turns schema text into typed [`Declaration`] records. The parser works one
//! line at a time and keeps at most one open record: either the doc comment
//! block that precedes the next class or function, or an interface whose
//! description may still be continued.
//!
//! ## Line Grammar
//!
//! ```text
//! //@class MessageContent @description Contains the content of a message
//!
//! //@description A text message @text Text of the message
//! //-continued description
//! messageText text:formattedText = MessageContent;
//!
//! ---functions---
//!
//! //@description Returns the current user
//! getMe = User;
//! ```
//!
//! Builtin declarations (`double ? = Double;`, `vector {t:Type} # [ t ] = Vector t;`,
//! `boolTrue = Bool;`, ...) and plain comments are skipped.

use tracing::{debug, instrument, warn};

use crate::errors::GeneratorError;

/// Line that switches the parser from type to function declarations.
pub const FUNCTIONS_SENTINEL: &str = "---functions---";

/// Optional line marking the start of the type declarations.
pub const TYPES_SENTINEL: &str = "---types---";

/// Result types of builtin declarations that are never emitted.
const BUILTIN_ROOTS: &[&str] = &[
    "Double", "String", "Int32", "Int53", "Int64", "Bytes", "Bool", "Vector",
];

/// Description fragment flagging a function as synchronously executable.
const SYNCHRONOUS_MARKER: &str = "Can be called synchronously";

/// Prefix used by TDLib to document a parameter literally named `description`.
const PARAM_TAG_PREFIX: &str = "param_";

/// A property or parameter as written on a declaration line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawProperty {
    pub name: String,
    pub type_name: String,
    pub description: String,
}

/// `//@class Name @description ...`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceDecl {
    pub name: String,
    pub description: String,
    pub line: usize,
}

/// `name p:type ... = Root;` in the types section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassDecl {
    pub name: String,
    pub root: String,
    pub description: String,
    pub properties: Vec<RawProperty>,
    pub line: usize,
}

/// `name p:type ... = ReturnType;` in the functions section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDecl {
    pub name: String,
    pub return_type: String,
    pub description: String,
    pub properties: Vec<RawProperty>,
    pub is_synchronous: bool,
    pub line: usize,
}

/// A single logical declaration found in the schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Declaration {
    Interface(InterfaceDecl),
    Class(ClassDecl),
    Function(FunctionDecl),
}

/// Which section of the schema is being read.
///
/// The only transition is `ReadingTypes -> ReadingFunctions`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserState {
    ReadingTypes,
    ReadingFunctions,
}

/// Item that a `//-` continuation line extends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DocTarget {
    Description,
    Param(usize),
}

/// Doc comment lines collected ahead of a declaration.
#[derive(Debug)]
struct DocBlock {
    description: String,
    params: Vec<(String, String)>,
    last: DocTarget,
    line: usize,
}

impl DocBlock {
    fn param_description(&self, name: &str) -> String {
        self.params
            .iter()
            .find(|(param, _)| param == name)
            .map(|(_, text)| text.clone())
            .unwrap_or_default()
    }

    fn add_param(&mut self, tag: &str, text: &str) {
        let name = tag.strip_prefix(PARAM_TAG_PREFIX).unwrap_or(tag);
        self.params.push((name.to_string(), text.to_string()));
        self.last = DocTarget::Param(self.params.len() - 1);
    }

    fn continue_last(&mut self, text: &str) {
        let target = match self.last {
            DocTarget::Description => &mut self.description,
            DocTarget::Param(idx) => &mut self.params[idx].1,
        };
        append_text(target, text);
    }
}

/// The record currently open in the parser.
#[derive(Debug)]
enum OpenRecord {
    Doc(DocBlock),
    Interface(InterfaceDecl),
}

/// Incremental TL line parser.
///
/// ## Examples
///
/// ```
/// use tlgen_gen::parser::{Declaration, LineParser, ParserState};
///
/// let mut parser = LineParser::new();
/// parser.feed(1, "//@description The ok object").unwrap();
/// parser.feed(2, "ok = Ok;").unwrap();
/// parser.feed(3, "---functions---").unwrap();
/// assert_eq!(parser.state(), ParserState::ReadingFunctions);
///
/// let declarations = parser.finish();
/// assert!(matches!(&declarations[0], Declaration::Class(c) if c.name == "ok"));
/// ```
#[derive(Debug)]
pub struct LineParser {
    state: ParserState,
    open: Option<OpenRecord>,
    declarations: Vec<Declaration>,
}

impl Default for LineParser {
    fn default() -> Self {
        Self::new()
    }
}

impl LineParser {
    pub fn new() -> Self {
        Self {
            state: ParserState::ReadingTypes,
            open: None,
            declarations: Vec::new(),
        }
    }

    pub fn state(&self) -> ParserState {
        self.state
    }

    /// Feeds one schema line. `line_no` is 1-based and only used in errors.
    ///
    /// ## Errors
    ///
    /// Returns `GeneratorError::ParseError` for out-of-context or truncated
    /// lines.
    pub fn feed(&mut self, line_no: usize, line: &str) -> Result<(), GeneratorError> {
        let line = line.trim();

        if line.is_empty() {
            return Ok(());
        }
        if line == FUNCTIONS_SENTINEL {
            return self.enter_functions(line_no);
        }
        if line == TYPES_SENTINEL {
            return match self.state {
                ParserState::ReadingTypes => Ok(()),
                ParserState::ReadingFunctions => Err(GeneratorError::parse(
                    line_no,
                    "types section cannot follow the functions section",
                )),
            };
        }
        if let Some(text) = line.strip_prefix("//-") {
            return self.continuation(line_no, text.trim());
        }
        if let Some(body) = line.strip_prefix("//") {
            if body.starts_with('@') {
                return self.tag_line(line_no, body);
            }
            // Plain comment
            return Ok(());
        }
        if looks_like_declaration(line) {
            return self.declaration(line_no, line);
        }

        debug!(line = line_no, "skipping unrecognized line");
        Ok(())
    }

    /// Finalizes the open record and returns every declaration in order.
    ///
    /// An interface still open at end of input is kept as-is. A doc block
    /// that never met its declaration is dropped.
    pub fn finish(mut self) -> Vec<Declaration> {
        match self.open.take() {
            Some(OpenRecord::Interface(interface)) => {
                self.declarations.push(Declaration::Interface(interface));
            }
            Some(OpenRecord::Doc(doc)) => {
                warn!(line = doc.line, "doc comment at end of input has no declaration");
            }
            None => {}
        }
        self.declarations
    }

    fn enter_functions(&mut self, line_no: usize) -> Result<(), GeneratorError> {
        if self.state == ParserState::ReadingFunctions {
            return Err(GeneratorError::parse(
                line_no,
                format!("duplicate '{}' sentinel", FUNCTIONS_SENTINEL),
            ));
        }
        self.close_open_record();
        self.state = ParserState::ReadingFunctions;
        debug!(line = line_no, "entering functions section");
        Ok(())
    }

    /// Closes whatever record is open before a new one starts.
    fn close_open_record(&mut self) {
        match self.open.take() {
            Some(OpenRecord::Interface(interface)) => {
                self.declarations.push(Declaration::Interface(interface));
            }
            Some(OpenRecord::Doc(doc)) => {
                warn!(line = doc.line, "discarding doc comment without a declaration");
            }
            None => {}
        }
    }

    fn continuation(&mut self, line_no: usize, text: &str) -> Result<(), GeneratorError> {
        match self.open.as_mut() {
            Some(OpenRecord::Doc(doc)) => doc.continue_last(text),
            Some(OpenRecord::Interface(interface)) => append_text(&mut interface.description, text),
            None => {
                return Err(GeneratorError::parse(
                    line_no,
                    "continuation line with no open declaration",
                ));
            }
        }
        Ok(())
    }

    fn tag_line(&mut self, line_no: usize, body: &str) -> Result<(), GeneratorError> {
        let tags = split_tags(body);
        let Some(&(first, first_text)) = tags.first() else {
            return Ok(());
        };

        match first {
            "class" => {
                let name = first_text.split_whitespace().next().unwrap_or_default();
                if name.is_empty() {
                    return Err(GeneratorError::parse(line_no, "interface declaration without a name"));
                }
                let description = tags
                    .iter()
                    .skip(1)
                    .find(|(tag, _)| *tag == "description")
                    .map(|(_, text)| text.to_string())
                    .unwrap_or_default();

                self.close_open_record();
                self.open = Some(OpenRecord::Interface(InterfaceDecl {
                    name: name.to_string(),
                    description,
                    line: line_no,
                }));
            }
            "description" => {
                self.close_open_record();
                let mut doc = DocBlock {
                    description: first_text.to_string(),
                    params: Vec::new(),
                    last: DocTarget::Description,
                    line: line_no,
                };
                for (tag, text) in tags.iter().skip(1) {
                    doc.add_param(tag, text);
                }
                self.open = Some(OpenRecord::Doc(doc));
            }
            _ => match self.open.as_mut() {
                Some(OpenRecord::Doc(doc)) => {
                    for (tag, text) in &tags {
                        doc.add_param(tag, text);
                    }
                }
                _ => {
                    return Err(GeneratorError::parse(
                        line_no,
                        format!("property description '@{}' with no open declaration", first),
                    ));
                }
            },
        }
        Ok(())
    }

    fn declaration(&mut self, line_no: usize, line: &str) -> Result<(), GeneratorError> {
        let body = line
            .strip_suffix(';')
            .ok_or_else(|| GeneratorError::parse(line_no, "truncated declaration: missing ';'"))?
            .trim();
        let (lhs, root) = body.split_once('=').ok_or_else(|| {
            GeneratorError::parse(line_no, "truncated declaration: missing '= Type'")
        })?;
        let lhs = lhs.trim();
        let root = root.trim();

        let root_head = root.split_whitespace().next().unwrap_or_default();
        if lhs.contains(['?', '{', '#', '[']) || BUILTIN_ROOTS.contains(&root_head) {
            // Builtin type; its doc comment (if any) goes with it
            if let Some(OpenRecord::Interface(interface)) = self.open.take() {
                self.declarations.push(Declaration::Interface(interface));
            }
            return Ok(());
        }
        if root.is_empty() {
            return Err(GeneratorError::parse(line_no, "truncated declaration: missing result type"));
        }
        if !is_identifier(root) {
            return Err(GeneratorError::parse(
                line_no,
                format!("invalid result type '{}'", root),
            ));
        }

        let mut tokens = lhs.split_whitespace();
        let name = tokens
            .next()
            .ok_or_else(|| GeneratorError::parse(line_no, "declaration without a name"))?;
        if !is_identifier(name) {
            return Err(GeneratorError::parse(
                line_no,
                format!("invalid declaration name '{}'", name),
            ));
        }

        // Any open interface is complete now; keep it ahead of this declaration
        let doc = match self.open.take() {
            Some(OpenRecord::Doc(doc)) => Some(doc),
            Some(OpenRecord::Interface(interface)) => {
                self.declarations.push(Declaration::Interface(interface));
                None
            }
            None => None,
        };

        let mut properties = Vec::new();
        for token in tokens {
            let (prop_name, type_name) = token
                .split_once(':')
                .filter(|(n, t)| !n.is_empty() && !t.is_empty())
                .ok_or_else(|| {
                    GeneratorError::parse(line_no, format!("malformed parameter '{}' in '{}'", token, name))
                })?;
            properties.push(RawProperty {
                name: prop_name.to_string(),
                type_name: type_name.to_string(),
                description: doc
                    .as_ref()
                    .map(|d| d.param_description(prop_name))
                    .unwrap_or_default(),
            });
        }

        let description = doc.map(|d| d.description).unwrap_or_default();
        let declaration = match self.state {
            ParserState::ReadingTypes => Declaration::Class(ClassDecl {
                name: name.to_string(),
                root: root.to_string(),
                description,
                properties,
                line: line_no,
            }),
            ParserState::ReadingFunctions => Declaration::Function(FunctionDecl {
                name: name.to_string(),
                return_type: root.to_string(),
                is_synchronous: description.contains(SYNCHRONOUS_MARKER),
                description,
                properties,
                line: line_no,
            }),
        };
        self.declarations.push(declaration);
        Ok(())
    }
}

/// Parses a whole schema into declarations.
///
/// ## Errors
///
/// Returns the first `GeneratorError::ParseError` encountered; nothing parsed
/// so far is returned in that case.
#[instrument(skip(text), fields(bytes = text.len()))]
pub fn parse_schema(text: &str) -> Result<Vec<Declaration>, GeneratorError> {
    let mut parser = LineParser::new();
    for (idx, line) in text.lines().enumerate() {
        parser.feed(idx + 1, line)?;
    }
    let declarations = parser.finish();
    debug!(count = declarations.len(), "parsed declarations");
    Ok(declarations)
}

/// Splits the body of a `//@` comment into `(tag, text)` pairs.
///
/// A tag is `@` followed by a lower-case identifier, at the start of the body
/// or after whitespace, so mentions like `@BotFather` stay in the text.
fn split_tags(body: &str) -> Vec<(&str, &str)> {
    let bytes = body.as_bytes();
    let mut starts: Vec<(usize, usize)> = Vec::new(); // (tag start, tag end)

    for (idx, &b) in bytes.iter().enumerate() {
        if b != b'@' || (idx > 0 && !bytes[idx - 1].is_ascii_whitespace()) {
            continue;
        }
        let tag_start = idx + 1;
        if !bytes.get(tag_start).is_some_and(u8::is_ascii_lowercase) {
            continue;
        }
        let tag_end = bytes[tag_start..]
            .iter()
            .position(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || *c == b'_'))
            .map_or(bytes.len(), |len| tag_start + len);
        if tag_end < bytes.len() && !bytes[tag_end].is_ascii_whitespace() {
            continue;
        }
        starts.push((tag_start, tag_end));
    }

    starts
        .iter()
        .enumerate()
        .map(|(i, &(tag_start, tag_end))| {
            // Text runs until the '@' of the next tag
            let text_end = starts.get(i + 1).map_or(body.len(), |&(next, _)| next - 1);
            (&body[tag_start..tag_end], body[tag_end..text_end].trim())
        })
        .collect()
}

/// `name p:type ... = Root;` shape, possibly truncated: an identifier, then
/// `p:type` tokens up to `=`. Builtin syntax (`?`, `{t:Type}`, `#`, `[`)
/// also qualifies so the builtin is consumed as a declaration.
fn looks_like_declaration(line: &str) -> bool {
    let mut tokens = line.split_whitespace();
    if !tokens.next().is_some_and(is_identifier) {
        return false;
    }
    let mut params = 0;
    for token in tokens {
        if token.starts_with('=') || token.contains(['?', '{', '#', '[']) {
            return true;
        }
        if !token.contains(':') {
            return false;
        }
        params += 1;
    }
    params > 0
}

fn is_identifier(token: &str) -> bool {
    token.starts_with(|c: char| c.is_ascii_alphabetic())
        && token.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn append_text(target: &mut String, text: &str) {
    if text.is_empty() {
        return;
    }
    if !target.is_empty() {
        target.push(' ');
    }
    target.push_str(text);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::SAMPLE_SCHEMA;

    fn classes(declarations: &[Declaration]) -> Vec<&ClassDecl> {
        declarations
            .iter()
            .filter_map(|d| match d {
                Declaration::Class(c) => Some(c),
                _ => None,
            })
            .collect()
    }

    fn functions(declarations: &[Declaration]) -> Vec<&FunctionDecl> {
        declarations
            .iter()
            .filter_map(|d| match d {
                Declaration::Function(f) => Some(f),
                _ => None,
            })
            .collect()
    }

    fn parse_error_line(result: Result<Vec<Declaration>, GeneratorError>) -> usize {
        match result {
            Err(GeneratorError::ParseError { line, .. }) => line,
            other => panic!("expected ParseError, got {:?}", other),
        }
    }

    #[test]
    fn class_with_inline_properties_and_docs() {
        let text = "//@description A test record @value The value\ntestA value:string = TestA;";
        let declarations = parse_schema(text).unwrap();
        let class = classes(&declarations)[0];

        assert_eq!(class.name, "testA");
        assert_eq!(class.root, "TestA");
        assert_eq!(class.description, "A test record");
        assert_eq!(
            class.properties,
            vec![RawProperty {
                name: "value".to_string(),
                type_name: "string".to_string(),
                description: "The value".to_string(),
            }]
        );
        assert_eq!(class.line, 2);
    }

    #[test]
    fn interface_line_opens_family() {
        let text = "//@class AbstractX @description Some family\n\n//@description First\nvariantOne = AbstractX;";
        let declarations = parse_schema(text).unwrap();

        assert_eq!(
            declarations[0],
            Declaration::Interface(InterfaceDecl {
                name: "AbstractX".to_string(),
                description: "Some family".to_string(),
                line: 1,
            })
        );
        assert_eq!(classes(&declarations)[0].root, "AbstractX");
    }

    #[test]
    fn continuation_lines_join_with_single_space() {
        let text = "//@description First part\n//-second part\n//@count Number\n//-of items\nthing count:int32 = Thing;";
        let declarations = parse_schema(text).unwrap();
        let class = classes(&declarations)[0];

        assert_eq!(class.description, "First part second part");
        assert_eq!(class.properties[0].description, "Number of items");
    }

    #[test]
    fn continuation_extends_open_interface() {
        let text = "//@class Family @description Begins\n//-and ends";
        let declarations = parse_schema(text).unwrap();
        assert!(matches!(
            &declarations[0],
            Declaration::Interface(i) if i.description == "Begins and ends"
        ));
    }

    #[test]
    fn functions_only_after_sentinel() {
        let text = "ok = Ok;\n---functions---\n//@description Closes it\nclose = Ok;";
        let declarations = parse_schema(text).unwrap();

        assert_eq!(classes(&declarations).len(), 1);
        let function = functions(&declarations)[0];
        assert_eq!(function.name, "close");
        assert_eq!(function.return_type, "Ok");
        assert!(!function.is_synchronous);
    }

    #[test]
    fn synchronous_marker_sets_flag() {
        let text = "---functions---\n//@description Returns the level. Can be called synchronously\ngetLevel = Level;";
        let declarations = parse_schema(text).unwrap();
        assert!(functions(&declarations)[0].is_synchronous);
    }

    #[test]
    fn second_sentinel_is_rejected() {
        let text = "---functions---\n---functions---";
        assert_eq!(parse_error_line(parse_schema(text)), 2);
    }

    #[test]
    fn types_sentinel_cannot_follow_functions() {
        assert_eq!(parse_error_line(parse_schema("---types---\n---functions---\n---types---")), 3);
    }

    #[test]
    fn property_description_without_open_declaration_fails() {
        let text = "ok = Ok;\n//@value Orphan property";
        assert_eq!(parse_error_line(parse_schema(text)), 2);
    }

    #[test]
    fn property_description_after_interface_fails() {
        let text = "//@class Family @description A family\n//@value Orphan property";
        assert_eq!(parse_error_line(parse_schema(text)), 2);
    }

    #[test]
    fn continuation_without_open_declaration_fails() {
        assert_eq!(parse_error_line(parse_schema("\n//-dangling")), 2);
    }

    #[test]
    fn truncated_declarations_fail() {
        assert_eq!(parse_error_line(parse_schema("testA value:string = TestA")), 1);
        assert_eq!(parse_error_line(parse_schema("testA value:string;")), 1);
        assert_eq!(parse_error_line(parse_schema("testA value: = TestA;")), 1);
        assert_eq!(parse_error_line(parse_schema("testA :string = TestA;")), 1);
        assert_eq!(parse_error_line(parse_schema("testA value:string = ;")), 1);
    }

    #[test]
    fn builtin_and_comment_lines_are_inert() {
        let text = "double ? = Double;\nint64 = Int64;\nboolTrue = Bool;\nvector {t:Type} # [ t ] = Vector t;\n// plain comment\nrandom words here";
        let declarations = parse_schema(text).unwrap();
        assert!(declarations.is_empty());
    }

    #[test]
    fn prose_lines_are_inert() {
        let text = "Note: see docs\nNote that x: y\nSee also = that\nok = Ok;";
        let declarations = parse_schema(text).unwrap();
        assert_eq!(classes(&declarations).len(), 1);
    }

    #[test]
    fn open_interface_at_end_of_input_is_kept() {
        let declarations = parse_schema("//@class Lonely @description No variants").unwrap();
        assert_eq!(declarations.len(), 1);
    }

    #[test]
    fn dangling_doc_block_at_end_of_input_is_not_an_error() {
        let declarations = parse_schema("ok = Ok;\n//@description Nothing follows").unwrap();
        assert_eq!(declarations.len(), 1);
    }

    #[test]
    fn param_prefix_documents_description_property() {
        let text = "//@description A bot @param_description Bot description\nbot description:string = Bot;";
        let declarations = parse_schema(text).unwrap();
        assert_eq!(classes(&declarations)[0].properties[0].description, "Bot description");
    }

    #[test]
    fn split_tags_ignores_mentions() {
        let tags = split_tags("@description Talk to @BotFather, not me@home @user_id The user");
        assert_eq!(
            tags,
            vec![
                ("description", "Talk to @BotFather, not me@home"),
                ("user_id", "The user"),
            ]
        );
    }

    #[test]
    fn sample_schema_parses_in_order() {
        let declarations = parse_schema(SAMPLE_SCHEMA).unwrap();

        let names: Vec<&str> = declarations
            .iter()
            .map(|d| match d {
                Declaration::Interface(i) => i.name.as_str(),
                Declaration::Class(c) => c.name.as_str(),
                Declaration::Function(f) => f.name.as_str(),
            })
            .collect();
        assert_eq!(names.first(), Some(&"error"));
        assert!(names.contains(&"TextEntityType"));
        assert!(names.contains(&"getAuthorizationState"));

        let interface_pos = names.iter().position(|n| *n == "TextEntityType").unwrap();
        let variant_pos = names.iter().position(|n| *n == "textEntityTypeBold").unwrap();
        assert!(interface_pos < variant_pos);
    }
}
