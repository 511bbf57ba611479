//! Token types produced by the tokenizer.

use core::fmt;
use parsl_dom::Attribute;

/// A token emitted by the tokenizer and consumed by the dispatcher.
///
/// Six shapes, matching the tagged union the tokenizer/dispatcher boundary
/// is built around: an inert placeholder, a buffered run of character data,
/// a doctype, a start tag, an end tag, and a comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// No-op placeholder. Never emitted by the tokenizer; used as a default
    /// "current token" value before one has been started.
    Empty,

    /// A run of character data. The tokenizer emits these one character at a
    /// time; the dispatcher is responsible for coalescing consecutive runs
    /// into a single CDATA node (§3 invariant I4).
    Char {
        /// The character.
        data: char,
    },

    /// A DOCTYPE token. Unlike the full living-standard shape, this carries
    /// only a name and a force-quirks flag — no public/system identifier —
    /// matching the simpler doctype model this parser is built around.
    Doctype {
        /// Doctype name, or `None` if never set (missing is distinct from empty).
        name: Option<String>,
        /// Set when the doctype was malformed badly enough that a consumer
        /// building a document tree should treat it as quirks-triggering.
        force_quirks: bool,
    },

    /// A start tag, e.g. `<div class="x">`.
    StartTag {
        /// Raw tag name, already folded to lowercase.
        name: String,
        /// Attributes in source order; duplicates by name are dropped at
        /// tokenization time, keeping only the first occurrence.
        attributes: Vec<Attribute>,
        /// Set by the `/>` sequence in the self-closing start tag state.
        self_closing: bool,
    },

    /// An end tag, e.g. `</div>`.
    EndTag {
        /// Raw tag name, already folded to lowercase.
        name: String,
        /// Attributes are tokenized for end tags too (and discarded by the
        /// dispatcher), matching the living standard's tokenizer contract.
        attributes: Vec<Attribute>,
    },

    /// A comment, `<!-- ... -->` or a bogus-comment recovery.
    Comment {
        /// Comment text.
        data: String,
    },

    /// End of input.
    EndOfFile,
}

impl Token {
    /// A fresh doctype token with name "missing" and force-quirks off.
    #[must_use]
    pub const fn new_doctype() -> Self {
        Self::Doctype { name: None, force_quirks: false }
    }

    /// A fresh start tag token with an empty name and no attributes.
    #[must_use]
    pub const fn new_start_tag() -> Self {
        Self::StartTag { name: String::new(), attributes: Vec::new(), self_closing: false }
    }

    /// A fresh end tag token with an empty name and no attributes.
    #[must_use]
    pub const fn new_end_tag() -> Self {
        Self::EndTag { name: String::new(), attributes: Vec::new() }
    }

    /// A fresh, empty comment token.
    #[must_use]
    pub const fn new_comment() -> Self {
        Self::Comment { data: String::new() }
    }

    /// True for [`Token::EndOfFile`].
    #[must_use]
    pub const fn is_eof(&self) -> bool {
        matches!(self, Self::EndOfFile)
    }

    /// The tag name of a start or end tag token, if any.
    #[must_use]
    pub fn tag_name(&self) -> Option<&str> {
        match self {
            Self::StartTag { name, .. } | Self::EndTag { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Append to the tag-name buffer of a start/end tag token. Characters
    /// are already folded to lowercase by the caller before this is
    /// invoked (§4.1 "Tag-name lowercasing").
    ///
    /// # Panics
    /// Panics if called on a non-tag token; this indicates a tokenizer bug.
    pub fn append_to_tag_name(&mut self, c: char) {
        match self {
            Self::StartTag { name, .. } | Self::EndTag { name, .. } => name.push(c),
            _ => panic!("append_to_tag_name called on {self:?}"),
        }
    }

    /// Append to the doctype name buffer, starting it if this is the first
    /// character (name starts "missing", not empty).
    ///
    /// # Panics
    /// Panics if called on a non-doctype token.
    pub fn append_to_doctype_name(&mut self, c: char) {
        match self {
            Self::Doctype { name, .. } => name.get_or_insert_with(String::new).push(c),
            _ => panic!("append_to_doctype_name called on {self:?}"),
        }
    }

    /// Set the doctype force-quirks flag.
    ///
    /// # Panics
    /// Panics if called on a non-doctype token.
    pub fn set_force_quirks(&mut self) {
        match self {
            Self::Doctype { force_quirks, .. } => *force_quirks = true,
            _ => panic!("set_force_quirks called on {self:?}"),
        }
    }

    /// Set the self-closing flag of a start tag token.
    ///
    /// # Panics
    /// Panics if called on a non-start-tag token.
    pub fn set_self_closing(&mut self) {
        match self {
            Self::StartTag { self_closing, .. } => *self_closing = true,
            _ => panic!("set_self_closing called on {self:?}"),
        }
    }

    /// Append to a comment token's data.
    ///
    /// # Panics
    /// Panics if called on a non-comment token.
    pub fn append_to_comment(&mut self, c: char) {
        match self {
            Self::Comment { data } => data.push(c),
            _ => panic!("append_to_comment called on {self:?}"),
        }
    }

    /// Start a new, empty attribute on a tag token.
    ///
    /// # Panics
    /// Panics if called on a non-tag token.
    pub fn start_new_attribute(&mut self) {
        match self {
            Self::StartTag { attributes, .. } | Self::EndTag { attributes, .. } => {
                attributes.push(Attribute { name: String::new(), value: String::new() });
            }
            _ => panic!("start_new_attribute called on {self:?}"),
        }
    }

    /// Append to the name of the most recently started attribute.
    ///
    /// # Panics
    /// Panics if called on a non-tag token.
    pub fn append_to_current_attribute_name(&mut self, c: char) {
        match self {
            Self::StartTag { attributes, .. } | Self::EndTag { attributes, .. } => {
                if let Some(attr) = attributes.last_mut() {
                    attr.name.push(c);
                }
            }
            _ => panic!("append_to_current_attribute_name called on {self:?}"),
        }
    }

    /// Append to the value of the most recently started attribute.
    ///
    /// # Panics
    /// Panics if called on a non-tag token.
    pub fn append_to_current_attribute_value(&mut self, c: char) {
        match self {
            Self::StartTag { attributes, .. } | Self::EndTag { attributes, .. } => {
                if let Some(attr) = attributes.last_mut() {
                    attr.value.push(c);
                }
            }
            _ => panic!("append_to_current_attribute_value called on {self:?}"),
        }
    }

    /// Whether the most recently started attribute's name duplicates an
    /// earlier attribute on the same token (case-sensitive per the living
    /// standard's "exact same name" wording).
    #[must_use]
    pub fn current_attribute_name_is_duplicate(&self) -> bool {
        match self {
            Self::StartTag { attributes, .. } | Self::EndTag { attributes, .. } => attributes
                .last()
                .is_some_and(|current| attributes[..attributes.len() - 1].iter().any(|a| a.name == current.name)),
            _ => false,
        }
    }

    /// Drop the most recently started attribute (used on duplicate-name
    /// recovery).
    ///
    /// # Panics
    /// Panics if called on a non-tag token.
    pub fn remove_current_attribute(&mut self) {
        match self {
            Self::StartTag { attributes, .. } | Self::EndTag { attributes, .. } => {
                let _ = attributes.pop();
            }
            _ => panic!("remove_current_attribute called on {self:?}"),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "EMPTY"),
            Self::Char { data } => match data {
                '\n' => write!(f, "Char(\\n)"),
                '\t' => write!(f, "Char(\\t)"),
                ' ' => write!(f, "Char(SPACE)"),
                c => write!(f, "Char({c})"),
            },
            Self::Doctype { name, force_quirks } => {
                write!(f, "DOCTYPE")?;
                if let Some(n) = name {
                    write!(f, " {n}")?;
                }
                if *force_quirks {
                    write!(f, " (force-quirks)")?;
                }
                Ok(())
            }
            Self::StartTag { name, attributes, self_closing } => {
                write!(f, "<{name}")?;
                for a in attributes {
                    write!(f, " {}=\"{}\"", a.name, a.value)?;
                }
                if *self_closing {
                    write!(f, " /")?;
                }
                write!(f, ">")
            }
            Self::EndTag { name, .. } => write!(f, "</{name}>"),
            Self::Comment { data } => write!(f, "<!--{data}-->"),
            Self::EndOfFile => write!(f, "EOF"),
        }
    }
}
