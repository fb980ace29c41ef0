//! Identifier normalization for generated Rust code.
//!
//! Raw TL identifiers (`chatId`, `messageText`, `type`) are turned into Rust
//! identifiers according to the role they play in the generated crate:
//!
//! | Role | Casing | Example |
//! |------|--------|---------|
//! | [`Role::ExportedType`] | PascalCase | `inputFileId` → `InputFileID` |
//! | [`Role::EnumConstant`] | PascalCase | `textEntityTypeBold` → `TextEntityTypeBold` |
//! | [`Role::ExportedField`] | snake_case | `chatId` → `chat_id` |
//! | [`Role::UnexportedLocal`] | snake_case | `type` → `type_` |
//!
//! Every transformation here is idempotent: normalizing an already normalized
//! name returns it unchanged.

/// Words rendered fully upper-case in PascalCase names.
const ACRONYMS: &[&str] = &["html", "ttl", "udp", "uri", "url", "api", "id", "ip"];

/// Rust keywords, strict and reserved.
const RUST_KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "crate",
    "do", "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if", "impl", "in",
    "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub", "ref",
    "return", "self", "static", "struct", "super", "trait", "true", "try", "type", "typeof",
    "unsafe", "unsized", "use", "virtual", "where", "while", "yield",
];

/// Snake-case names used by the generated framework itself.
const RESERVED_FIELD_NAMES: &[&str] = &["header", "json"];

/// Type names that would shadow prelude or generated shared types.
const RESERVED_TYPE_NAMES: &[&str] = &[
    "Self", "Ok", "Err", "Some", "None", "Option", "Result", "Box", "Vec", "String", "Header",
    "JsonInt64", "Bytes", "TdMessage", "TdError", "Transport", "Client",
];

const TYPE_SUFFIX: &str = "Object";
const FIELD_SUFFIX: &str = "_";

/// The position an identifier occupies in generated code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Struct, enum and trait names.
    ExportedType,
    /// Struct fields and method parameters.
    ExportedField,
    /// Local bindings and private helpers.
    UnexportedLocal,
    /// Variants of a discriminant enum.
    EnumConstant,
}

/// Converts a raw identifier to the Rust form required by `role`.
///
/// ## Examples
///
/// ```
/// use tlgen_gen::naming::{Role, normalize};
///
/// assert_eq!(normalize("chatId", Role::ExportedType), "ChatID");
/// assert_eq!(normalize("chatId", Role::ExportedField), "chat_id");
/// assert_eq!(normalize("type", Role::UnexportedLocal), "type_");
/// assert_eq!(normalize("ok", Role::ExportedType), "OkObject");
/// ```
pub fn normalize(raw: &str, role: Role) -> String {
    match role {
        Role::ExportedType | Role::EnumConstant => {
            let name = to_pascal_case(raw);
            if RESERVED_TYPE_NAMES.contains(&name.as_str()) {
                name + TYPE_SUFFIX
            } else {
                name
            }
        }
        Role::ExportedField | Role::UnexportedLocal => {
            let name = to_snake_case(raw);
            if RUST_KEYWORDS.contains(&name.as_str()) || RESERVED_FIELD_NAMES.contains(&name.as_str()) {
                name + FIELD_SUFFIX
            } else {
                name
            }
        }
    }
}

/// PascalCase with acronyms canonicalized as whole words.
pub fn to_pascal_case(raw: &str) -> String {
    split_words(raw)
        .iter()
        .map(|word| {
            if word.upper || ACRONYMS.contains(&word.text.as_str()) {
                word.text.to_ascii_uppercase()
            } else {
                capitalize(&word.text)
            }
        })
        .collect()
}

/// snake_case; a trailing underscore on the input is kept.
pub fn to_snake_case(raw: &str) -> String {
    let mut name = join_words(raw, "_");
    if raw.ends_with('_') && !name.is_empty() {
        name.push('_');
    }
    name
}

pub fn to_screaming_snake_case(raw: &str) -> String {
    join_words(raw, "_").to_ascii_uppercase()
}

/// Removes the interface name from the front of a variant type name.
///
/// Both arguments are PascalCase. Returns `None` when the variant does not
/// start with the interface name or the remainder is not a usable identifier.
///
/// ## Examples
///
/// ```
/// use tlgen_gen::naming::strip_variant_prefix;
///
/// assert_eq!(strip_variant_prefix("TextEntityTypeBold", "TextEntityType"), Some("Bold"));
/// assert_eq!(strip_variant_prefix("Ok", "Ok"), None);
/// assert_eq!(strip_variant_prefix("Message", "MessageContent"), None);
/// ```
pub fn strip_variant_prefix<'a>(variant: &'a str, interface: &str) -> Option<&'a str> {
    variant
        .strip_prefix(interface)
        .filter(|rest| rest.starts_with(|c: char| c.is_ascii_uppercase()))
}

/// One lower-cased word of an identifier.
#[derive(Debug, PartialEq, Eq)]
struct Word {
    text: String,
    /// Came from an upper-case run and stays upper-case in PascalCase.
    upper: bool,
}

impl Word {
    fn plain(chars: &[char]) -> Self {
        Self {
            text: chars.iter().collect::<String>().to_ascii_lowercase(),
            upper: false,
        }
    }

    fn upper(text: String) -> Self {
        Self { text, upper: true }
    }
}

fn join_words(raw: &str, separator: &str) -> String {
    split_words(raw)
        .iter()
        .map(|word| word.text.as_str())
        .collect::<Vec<_>>()
        .join(separator)
}

/// Splits an identifier into words.
///
/// Boundaries are non-alphanumeric characters and a lower-case letter or digit
/// followed by an upper-case letter. Inside an upper-case run the last capital
/// opens a new word when lower-case letters follow it, possibly after digits
/// (`HTMLText` → `html`, `text`; `UDPP2p` → `udp`, `p2p`). The rest of the run
/// is broken into known acronyms and upper-case leftovers, so a PascalCase
/// name splits into the same words it was built from.
fn split_words(raw: &str) -> Vec<Word> {
    let mut words = Vec::new();
    for segment in raw.split(|c: char| !c.is_ascii_alphanumeric()).filter(|s| !s.is_empty()) {
        let chars: Vec<char> = segment.chars().collect();
        split_segment(&chars, &mut words);
    }
    words
}

fn split_segment(chars: &[char], words: &mut Vec<Word>) {
    let mut idx = 0;
    while idx < chars.len() {
        if !chars[idx].is_ascii_uppercase() {
            let end = scan(chars, idx, |c| c.is_ascii_lowercase() || c.is_ascii_digit());
            words.push(Word::plain(&chars[idx..end]));
            idx = end;
            continue;
        }

        let run_end = scan(chars, idx, |c| c.is_ascii_uppercase());
        let digits_end = scan(chars, run_end, |c| c.is_ascii_digit());
        if chars.get(digits_end).is_some_and(char::is_ascii_lowercase) {
            split_upper_run(&chars[idx..run_end - 1], words);
            let end = scan(chars, run_end, |c| c.is_ascii_lowercase() || c.is_ascii_digit());
            words.push(Word::plain(&chars[run_end - 1..end]));
            idx = end;
        } else {
            split_upper_run(&chars[idx..run_end], words);
            // `IPV6` keeps its digits on the last piece of the run
            if let Some(last) = words.last_mut() {
                last.text.extend(&chars[run_end..digits_end]);
            }
            idx = digits_end;
        }
    }
}

/// Index of the first char at or after `from` that fails `keep`.
fn scan(chars: &[char], from: usize, keep: impl Fn(char) -> bool) -> usize {
    chars[from..]
        .iter()
        .position(|&c| !keep(c))
        .map_or(chars.len(), |len| from + len)
}

/// Breaks an upper-case run such as `APIID` into known acronyms. Letters that
/// match no acronym are grouped into upper-case words of their own.
fn split_upper_run(run: &[char], words: &mut Vec<Word>) {
    let lower = run.iter().collect::<String>().to_ascii_lowercase();
    let mut rest = lower.as_str();
    let mut leftover = String::new();

    while !rest.is_empty() {
        // ACRONYMS is ordered longest first
        match ACRONYMS.iter().find(|a| rest.starts_with(**a)) {
            Some(acronym) => {
                if !leftover.is_empty() {
                    words.push(Word::upper(std::mem::take(&mut leftover)));
                }
                words.push(Word::upper(acronym.to_string()));
                rest = &rest[acronym.len()..];
            }
            None => {
                leftover.push_str(&rest[..1]);
                rest = &rest[1..];
            }
        }
    }
    if !leftover.is_empty() {
        words.push(Word::upper(leftover));
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}
