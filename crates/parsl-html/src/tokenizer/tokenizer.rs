use strum_macros::Display;

use super::token::Token;

/// [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
///
/// The tokenizer state machine. Each state corresponds to a section in § 13.2.5.
#[derive(Debug, PartialEq, Display)]
pub enum TokenizerState {
    /// [§ 13.2.5.1 Data state](https://html.spec.whatwg.org/multipage/parsing.html#data-state)
    Data,
    /// [§ 13.2.5.2 RCDATA state](https://html.spec.whatwg.org/multipage/parsing.html#rcdata-state)
    RCDATA,
    /// [§ 13.2.5.3 RAWTEXT state](https://html.spec.whatwg.org/multipage/parsing.html#rawtext-state)
    RAWTEXT,
    /// [§ 13.2.5.4 Script data state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-state)
    ScriptData,
    /// [§ 13.2.5.5 PLAINTEXT state](https://html.spec.whatwg.org/multipage/parsing.html#plaintext-state)
    PLAINTEXT,
    /// [§ 13.2.5.6 Tag open state](https://html.spec.whatwg.org/multipage/parsing.html#tag-open-state)
    TagOpen,
    /// [§ 13.2.5.7 End tag open state](https://html.spec.whatwg.org/multipage/parsing.html#end-tag-open-state)
    EndTagOpen,
    /// [§ 13.2.5.8 Tag name state](https://html.spec.whatwg.org/multipage/parsing.html#tag-name-state)
    TagName,
    /// [§ 13.2.5.9 RCDATA less-than sign state](https://html.spec.whatwg.org/multipage/parsing.html#rcdata-less-than-sign-state)
    RCDATALessThanSign,
    /// [§ 13.2.5.10 RCDATA end tag open state](https://html.spec.whatwg.org/multipage/parsing.html#rcdata-end-tag-open-state)
    RCDATAEndTagOpen,
    /// [§ 13.2.5.11 RCDATA end tag name state](https://html.spec.whatwg.org/multipage/parsing.html#rcdata-end-tag-name-state)
    RCDATAEndTagName,
    /// [§ 13.2.5.12 RAWTEXT less-than sign state](https://html.spec.whatwg.org/multipage/parsing.html#rawtext-less-than-sign-state)
    RAWTEXTLessThanSign,
    /// [§ 13.2.5.13 RAWTEXT end tag open state](https://html.spec.whatwg.org/multipage/parsing.html#rawtext-end-tag-open-state)
    RAWTEXTEndTagOpen,
    /// [§ 13.2.5.14 RAWTEXT end tag name state](https://html.spec.whatwg.org/multipage/parsing.html#rawtext-end-tag-name-state)
    RAWTEXTEndTagName,
    /// [§ 13.2.5.15 Script data less-than sign state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-less-than-sign-state)
    ScriptDataLessThanSign,
    /// [§ 13.2.5.16 Script data end tag open state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-end-tag-open-state)
    ScriptDataEndTagOpen,
    /// [§ 13.2.5.17 Script data end tag name state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-end-tag-name-state)
    ScriptDataEndTagName,
    /// [§ 13.2.5.18 Script data escape start state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-escape-start-state)
    ScriptDataEscapeStart,
    /// [§ 13.2.5.19 Script data escape start dash state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-escape-start-dash-state)
    ScriptDataEscapeStartDash,
    /// [§ 13.2.5.20 Script data escaped state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-escaped-state)
    ScriptDataEscaped,
    /// [§ 13.2.5.21 Script data escaped dash state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-escaped-dash-state)
    ScriptDataEscapedDash,
    /// [§ 13.2.5.22 Script data escaped dash dash state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-escaped-dash-dash-state)
    ScriptDataEscapedDashDash,
    /// [§ 13.2.5.23 Script data escaped less-than sign state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-escaped-less-than-sign-state)
    ScriptDataEscapedLessThanSign,
    /// [§ 13.2.5.24 Script data escaped end tag open state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-escaped-end-tag-open-state)
    ScriptDataEscapedEndTagOpen,
    /// [§ 13.2.5.25 Script data escaped end tag name state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-escaped-end-tag-name-state)
    ScriptDataEscapedEndTagName,
    /// [§ 13.2.5.26 Script data double escape start state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-double-escape-start-state)
    ScriptDataDoubleEscapeStart,
    /// [§ 13.2.5.27 Script data double escaped state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-double-escaped-state)
    ScriptDataDoubleEscaped,
    /// [§ 13.2.5.28 Script data double escaped dash state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-double-escaped-dash-state)
    ScriptDataDoubleEscapedDash,
    /// [§ 13.2.5.29 Script data double escaped dash dash state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-double-escaped-dash-dash-state)
    ScriptDataDoubleEscapedDashDash,
    /// [§ 13.2.5.30 Script data double escaped less-than sign state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-double-escaped-less-than-sign-state)
    ScriptDataDoubleEscapedLessThanSign,
    /// [§ 13.2.5.31 Script data double escape end state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-double-escape-end-state)
    ScriptDataDoubleEscapeEnd,
    /// [§ 13.2.5.32 Before attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#before-attribute-name-state)
    BeforeAttributeName,
    /// [§ 13.2.5.33 Attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-name-state)
    AttributeName,
    /// [§ 13.2.5.34 After attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#after-attribute-name-state)
    AfterAttributeName,
    /// [§ 13.2.5.35 Before attribute value state](https://html.spec.whatwg.org/multipage/parsing.html#before-attribute-value-state)
    BeforeAttributeValue,
    /// [§ 13.2.5.36 Attribute value (double-quoted) state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-value-(double-quoted)-state)
    AttributeValueDoubleQuoted,
    /// [§ 13.2.5.37 Attribute value (single-quoted) state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-value-(single-quoted)-state)
    AttributeValueSingleQuoted,
    /// [§ 13.2.5.38 Attribute value (unquoted) state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-value-(unquoted)-state)
    AttributeValueUnquoted,
    /// [§ 13.2.5.39 After attribute value (quoted) state](https://html.spec.whatwg.org/multipage/parsing.html#after-attribute-value-(quoted)-state)
    AfterAttributeValueQuoted,
    /// [§ 13.2.5.40 Self-closing start tag state](https://html.spec.whatwg.org/multipage/parsing.html#self-closing-start-tag-state)
    SelfClosingStartTag,
    /// [§ 13.2.5.41 Bogus comment state](https://html.spec.whatwg.org/multipage/parsing.html#bogus-comment-state)
    BogusComment,
    /// [§ 13.2.5.42 Markup declaration open state](https://html.spec.whatwg.org/multipage/parsing.html#markup-declaration-open-state)
    MarkupDeclarationOpen,
    /// [§ 13.2.5.43 Comment start state](https://html.spec.whatwg.org/multipage/parsing.html#comment-start-state)
    CommentStart,
    /// [§ 13.2.5.44 Comment start dash state](https://html.spec.whatwg.org/multipage/parsing.html#comment-start-dash-state)
    CommentStartDash,
    /// [§ 13.2.5.45 Comment state](https://html.spec.whatwg.org/multipage/parsing.html#comment-state)
    Comment,
    /// [§ 13.2.5.46 Comment less-than sign state](https://html.spec.whatwg.org/multipage/parsing.html#comment-less-than-sign-state)
    CommentLessThanSign,
    /// [§ 13.2.5.47 Comment less-than sign bang state](https://html.spec.whatwg.org/multipage/parsing.html#comment-less-than-sign-bang-state)
    CommentLessThanSignBang,
    /// [§ 13.2.5.48 Comment less-than sign bang dash state](https://html.spec.whatwg.org/multipage/parsing.html#comment-less-than-sign-bang-dash-state)
    CommentLessThanSignBangDash,
    /// [§ 13.2.5.49 Comment less-than sign bang dash dash state](https://html.spec.whatwg.org/multipage/parsing.html#comment-less-than-sign-bang-dash-dash-state)
    CommentLessThanSignBangDashDash,
    /// [§ 13.2.5.50 Comment end dash state](https://html.spec.whatwg.org/multipage/parsing.html#comment-end-dash-state)
    CommentEndDash,
    /// [§ 13.2.5.51 Comment end state](https://html.spec.whatwg.org/multipage/parsing.html#comment-end-state)
    CommentEnd,
    /// [§ 13.2.5.52 Comment end bang state](https://html.spec.whatwg.org/multipage/parsing.html#comment-end-bang-state)
    CommentEndBang,
    /// [§ 13.2.5.53 DOCTYPE state](https://html.spec.whatwg.org/multipage/parsing.html#doctype-state)
    DOCTYPE,
    /// [§ 13.2.5.54 Before DOCTYPE name state](https://html.spec.whatwg.org/multipage/parsing.html#before-doctype-name-state)
    BeforeDOCTYPEName,
    /// [§ 13.2.5.55 DOCTYPE name state](https://html.spec.whatwg.org/multipage/parsing.html#doctype-name-state)
    DOCTYPEName,
    /// [§ 13.2.5.56 After DOCTYPE name state](https://html.spec.whatwg.org/multipage/parsing.html#after-doctype-name-state)
    ///
    /// Simplified: this tokenizer's DOCTYPE token carries only a name and a
    /// force-quirks flag (no public/system identifier), so anything past the
    /// name other than whitespace-then-`>` falls straight to `BogusDOCTYPE`.
    AfterDOCTYPEName,
    /// [§ 13.2.5.68 Bogus DOCTYPE state](https://html.spec.whatwg.org/multipage/parsing.html#bogus-doctype-state)
    BogusDOCTYPE,
    /// [§ 13.2.5.72 Character reference state](https://html.spec.whatwg.org/multipage/parsing.html#character-reference-state)
    CharacterReference,
    /// [§ 13.2.5.73 Named character reference state](https://html.spec.whatwg.org/multipage/parsing.html#named-character-reference-state)
    ///
    /// Entity expansion is out of scope here: this state consumes the
    /// maximal run of ASCII alphanumerics following `&` and discards it,
    /// then reconsumes in the return state.
    NamedCharacterReference,
    /// [§ 13.2.5.75 Numeric character reference state](https://html.spec.whatwg.org/multipage/parsing.html#numeric-character-reference-state)
    ///
    /// Entity expansion is out of scope here: this state consumes `x`/`X`
    /// followed by a run of hex digits, or a run of decimal digits, and
    /// discards them, then reconsumes in the return state.
    NumericCharacterReference,
}

/// [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
///
/// "Implementations must act as if they used the following state machine to tokenize HTML."
///
/// This struct maintains the state machine for tokenizing HTML input into tokens.
pub struct HTMLTokenizer {
    pub(super) state: TokenizerState,
    pub(super) return_state: Option<TokenizerState>,
    pub(super) input: String,
    pub(super) current_pos: usize,
    pub(super) line: usize,
    pub(super) current_input_character: Option<char>,
    pub(super) current_token: Option<Token>,
    pub(super) eof_emitted: bool,
    pub(super) token_stream: std::collections::VecDeque<Token>,
    // When true, the next iteration of the main loop will not consume a new character.
    // "Reconsume in the X state" sets this flag.
    pub(super) reconsume: bool,

    /// [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
    /// "The last start tag token emitted is used as part of the tree construction stage
    /// and in the RCDATA, RAWTEXT, and script data states."
    pub(super) last_start_tag_name: Option<String>,

    /// [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#temporary-buffer)
    /// "The temporary buffer is used to temporarily store characters during certain
    /// tokenization operations, particularly for end tag detection in RCDATA/RAWTEXT states."
    pub(super) temporary_buffer: String,

    /// Recoverable parse errors accumulated so far, for the caller to surface.
    pub(super) issues: Vec<parsl_common::error::ParseIssue>,
}
impl HTMLTokenizer {
    /// Create a new tokenizer for the given input.
    ///
    /// [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization):
    /// "The tokenizer state machine consists of the states defined in the
    /// following subsections. The initial state is the data state."
    pub fn new(input: String) -> Self {
        HTMLTokenizer {
            state: TokenizerState::Data,
            return_state: None,
            input,
            current_pos: 0,
            line: 1,
            current_input_character: None,
            current_token: None,
            eof_emitted: false,
            token_stream: std::collections::VecDeque::new(),
            reconsume: false,
            last_start_tag_name: None,
            temporary_buffer: String::new(),
            issues: Vec::new(),
        }
    }

    /// Read one pending token out of the queue, if any.
    ///
    /// [§ 4.1 Input contract]: reads one byte per invocation, returns `None`
    /// when a token is not yet complete, `Some(token)` when one is ready.
    /// Several internal transitions enqueue more than one character token at
    /// once (the RCDATA/RAWTEXT/script end-tag-name "anything else" flush);
    /// those are drained one per call without consuming further input.
    pub fn tokenize(&mut self) -> Option<Token> {
        if let Some(tok) = self.token_stream.pop_front() {
            return Some(tok);
        }
        if self.eof_emitted {
            return None;
        }
        self.step();
        self.token_stream.pop_front()
    }

    /// The back-channel the dispatcher uses to request a content-model
    /// switch (RCDATA for `title`/`textarea`, RAWTEXT for `style`/`xmp`/
    /// `iframe`/`noembed`/`noframes`, `ScriptData` for `script`, `PLAINTEXT`
    /// for `plaintext`) after it has seen and acted on a start tag token.
    /// Honored starting with the next invocation of [`Self::tokenize`].
    pub fn override_state(&mut self, new_state: TokenizerState) {
        self.state = new_state;
    }

    /// Drain the parse-error diagnostics accumulated since the last call.
    pub fn take_issues(&mut self) -> Vec<parsl_common::error::ParseIssue> {
        std::mem::take(&mut self.issues)
    }

    fn step(&mut self) {
        if self.reconsume {
            self.reconsume = false;
        } else {
            self.current_input_character = self.consume();
            if self.current_input_character == Some('\n') {
                self.line += 1;
            }
        }

        // Global pre-filter: any control byte other than LF/TAB is silently
        // dropped rather than being handed to a per-state handler. Each
        // state's own EOF arm is responsible for emitting the end-of-file
        // token once input is exhausted.
        if let Some(c) = self.current_input_character {
            if c.is_control() && c != '\n' && c != '\t' {
                return;
            }
        }

        self.dispatch_state();
    }

    /// [§ 13.2.5.1 Data state](https://html.spec.whatwg.org/multipage/parsing.html#data-state)
    fn handle_data_state(&mut self) {
        match self.current_input_character {
            // "U+0026 AMPERSAND (&) - Set the return state to the data state.
            // Switch to the character reference state."
            Some('&') => {
                self.return_state = Some(TokenizerState::Data);
                self.switch_to(TokenizerState::CharacterReference);
            }
            // "U+003C LESS-THAN SIGN (<) - Switch to the tag open state."
            Some('<') => {
                self.switch_to(TokenizerState::TagOpen);
            }
            // "U+0000 NULL - This is an unexpected-null-character parse error.
            // Emit the current input character as a character token."
            Some('\0') => {
                self.log_parse_error();
                self.emit_character_token('\0');
                self.switch_to(TokenizerState::Data);
            }
            // "EOF - Emit an end-of-file token."
            None => {
                self.emit_eof_token();
                self.eof_emitted = true;
            }
            // "Anything else - Emit the current input character as a character token."
            Some(c) => {
                self.emit_character_token(c);
                self.switch_to(TokenizerState::Data);
            }
        }
    }
    /// [§ 13.2.5.2 RCDATA state](https://html.spec.whatwg.org/multipage/parsing.html#rcdata-state)
    fn handle_rcdata_state(&mut self) {
        match self.current_input_character {
            // "U+0026 AMPERSAND (&)"
            // "Set the return state to the RCDATA state. Switch to the character reference state."
            Some('&') => {
                self.return_state = Some(TokenizerState::RCDATA);
                self.switch_to(TokenizerState::CharacterReference);
            }
            // "U+003C LESS-THAN SIGN (<)"
            // "Switch to the RCDATA less-than sign state."
            Some('<') => {
                self.switch_to(TokenizerState::RCDATALessThanSign);
            }
            // "U+0000 NULL"
            // "This is an unexpected-null-character parse error. Emit a U+FFFD REPLACEMENT
            // CHARACTER character token."
            Some('\0') => {
                self.log_parse_error();
                self.emit_character_token('\u{FFFD}');
            }
            // "EOF"
            // "Emit an end-of-file token."
            None => {
                self.emit_eof_token();
                self.eof_emitted = true;
            }
            // "Anything else"
            // "Emit the current input character as a character token."
            Some(c) => {
                self.emit_character_token(c);
            }
        }
    }

    /// [§ 13.2.5.9 RCDATA less-than sign state](https://html.spec.whatwg.org/multipage/parsing.html#rcdata-less-than-sign-state)
    fn handle_rcdata_less_than_sign_state(&mut self) {
        match self.current_input_character {
            // "U+002F SOLIDUS (/)"
            // "Set the temporary buffer to the empty string. Switch to the RCDATA end tag open state."
            Some('/') => {
                self.temporary_buffer.clear();
                self.switch_to(TokenizerState::RCDATAEndTagOpen);
            }
            // "Anything else"
            // "Emit a U+003C LESS-THAN SIGN character token. Reconsume in the RCDATA state."
            _ => {
                self.emit_character_token('<');
                self.reconsume_in(TokenizerState::RCDATA);
            }
        }
    }

    /// [§ 13.2.5.10 RCDATA end tag open state](https://html.spec.whatwg.org/multipage/parsing.html#rcdata-end-tag-open-state)
    fn handle_rcdata_end_tag_open_state(&mut self) {
        match self.current_input_character {
            // "ASCII alpha"
            // "Create a new end tag token, set its tag name to the empty string. Reconsume in
            // the RCDATA end tag name state."
            Some(c) if c.is_ascii_alphabetic() => {
                self.current_token = Some(Token::new_end_tag());
                self.reconsume_in(TokenizerState::RCDATAEndTagName);
            }
            // "Anything else"
            // "Emit a U+003C LESS-THAN SIGN character token and a U+002F SOLIDUS character token.
            // Reconsume in the RCDATA state."
            _ => {
                self.emit_character_token('<');
                self.emit_character_token('/');
                self.reconsume_in(TokenizerState::RCDATA);
            }
        }
    }

    /// [§ 13.2.5.11 RCDATA end tag name state](https://html.spec.whatwg.org/multipage/parsing.html#rcdata-end-tag-name-state)
    fn handle_rcdata_end_tag_name_state(&mut self) {
        match self.current_input_character {
            // "U+0009 CHARACTER TABULATION (tab)"
            // "U+000A LINE FEED (LF)"
            // "U+000C FORM FEED (FF)"
            // "U+0020 SPACE"
            // "If the current end tag token is an appropriate end tag token, then switch to the
            // before attribute name state. Otherwise, treat it as per the "anything else" entry below."
            Some(c) if Self::is_whitespace_char(c) => {
                if self.is_appropriate_end_tag_token() {
                    self.switch_to(TokenizerState::BeforeAttributeName);
                } else {
                    self.emit_rcdata_end_tag_name_anything_else();
                }
            }
            // "U+002F SOLIDUS (/)"
            // "If the current end tag token is an appropriate end tag token, then switch to the
            // self-closing start tag state. Otherwise, treat it as per the "anything else" entry below."
            Some('/') => {
                if self.is_appropriate_end_tag_token() {
                    self.switch_to(TokenizerState::SelfClosingStartTag);
                } else {
                    self.emit_rcdata_end_tag_name_anything_else();
                }
            }
            // "U+003E GREATER-THAN SIGN (>)"
            // "If the current end tag token is an appropriate end tag token, then switch to the
            // data state and emit the current tag token. Otherwise, treat it as per the "anything
            // else" entry below."
            Some('>') => {
                if self.is_appropriate_end_tag_token() {
                    self.switch_to(TokenizerState::Data);
                    self.emit_token();
                } else {
                    self.emit_rcdata_end_tag_name_anything_else();
                }
            }
            // "ASCII upper alpha"
            // "Append the lowercase version of the current input character (add 0x0020 to the
            // character's code point) to the current tag token's tag name. Append the current
            // input character to the temporary buffer."
            Some(c) if c.is_ascii_uppercase() => {
                if let Some(ref mut token) = self.current_token {
                    token.append_to_tag_name(c.to_ascii_lowercase());
                }
                self.temporary_buffer.push(c);
            }
            // "ASCII lower alpha"
            // "Append the current input character to the current tag token's tag name. Append
            // the current input character to the temporary buffer."
            Some(c) if c.is_ascii_lowercase() => {
                if let Some(ref mut token) = self.current_token {
                    token.append_to_tag_name(c);
                }
                self.temporary_buffer.push(c);
            }
            // "Anything else"
            // "Emit a U+003C LESS-THAN SIGN character token, a U+002F SOLIDUS character token,
            // and a character token for each of the characters in the temporary buffer (in the
            // order they were added to the buffer). Reconsume in the RCDATA state."
            _ => {
                self.emit_rcdata_end_tag_name_anything_else();
            }
        }
    }

    /// [§ 13.2.5.3 RAWTEXT state](https://html.spec.whatwg.org/multipage/parsing.html#rawtext-state)
    fn handle_rawtext_state(&mut self) {
        match self.current_input_character {
            // "U+003C LESS-THAN SIGN (<)"
            // "Switch to the RAWTEXT less-than sign state."
            Some('<') => {
                self.switch_to(TokenizerState::RAWTEXTLessThanSign);
            }
            // "U+0000 NULL"
            // "This is an unexpected-null-character parse error. Emit a U+FFFD REPLACEMENT
            // CHARACTER character token."
            Some('\0') => {
                self.log_parse_error();
                self.emit_character_token('\u{FFFD}');
            }
            // "EOF"
            // "Emit an end-of-file token."
            None => {
                self.emit_eof_token();
                self.eof_emitted = true;
            }
            // "Anything else"
            // "Emit the current input character as a character token."
            Some(c) => {
                self.emit_character_token(c);
            }
        }
    }
    /// [§ 13.2.5.4 Script data state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-state)
    fn handle_script_data_state(&mut self) {
        // "Consume the next input character:"
        match self.current_input_character {
            // "U+003C LESS-THAN SIGN (<)"
            // "Switch to the script data less-than sign state."
            Some('<') => {
                self.switch_to(TokenizerState::ScriptDataLessThanSign);
            }
            // "U+0000 NULL"
            // "This is an unexpected-null-character parse error. Emit a U+FFFD REPLACEMENT CHARACTER character token."
            Some('\0') => {
                self.log_parse_error();
                self.emit_character_token('\u{FFFD}');
            }
            // "EOF"
            // "Emit an end-of-file token."
            None => {
                self.emit_eof_token();
                self.eof_emitted = true;
            }
            // "Anything else"
            // "Emit the current input character as a character token."
            Some(c) => {
                self.emit_character_token(c);
            }
        }
    }

    /// [§ 13.2.5.17 Script data less-than sign state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-less-than-sign-state)
    fn handle_script_data_less_than_sign_state(&mut self) {
        // "Consume the next input character:"
        match self.current_input_character {
            // "U+002F SOLIDUS (/)"
            // "Set the temporary buffer to the empty string. Switch to the script data end tag open state."
            Some('/') => {
                self.temporary_buffer.clear();
                self.switch_to(TokenizerState::ScriptDataEndTagOpen);
            }
            // "U+0021 EXCLAMATION MARK (!)"
            // "Switch to the script data escape start state. Emit a U+003C LESS-THAN SIGN character token
            // and a U+0021 EXCLAMATION MARK character token."
            Some('!') => {
                self.switch_to(TokenizerState::ScriptDataEscapeStart);
                self.emit_character_token('<');
                self.emit_character_token('!');
            }
            // "Anything else"
            // "Emit a U+003C LESS-THAN SIGN character token. Reconsume in the script data state."
            _ => {
                self.emit_character_token('<');
                self.reconsume_in(TokenizerState::ScriptData);
            }
        }
    }

    /// [§ 13.2.5.18 Script data end tag open state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-end-tag-open-state)
    fn handle_script_data_end_tag_open_state(&mut self) {
        // "Consume the next input character:"
        match self.current_input_character {
            // "ASCII alpha"
            // "Create a new end tag token, set its tag name to the empty string. Reconsume in the
            // script data end tag name state."
            Some(c) if c.is_ascii_alphabetic() => {
                self.current_token = Some(Token::new_end_tag());
                self.reconsume_in(TokenizerState::ScriptDataEndTagName);
            }
            // "Anything else"
            // "Emit a U+003C LESS-THAN SIGN character token and a U+002F SOLIDUS character token.
            // Reconsume in the script data state."
            _ => {
                self.emit_character_token('<');
                self.emit_character_token('/');
                self.reconsume_in(TokenizerState::ScriptData);
            }
        }
    }

    /// [§ 13.2.5.19 Script data end tag name state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-end-tag-name-state)
    fn handle_script_data_end_tag_name_state(&mut self) {
        // "Consume the next input character:"
        match self.current_input_character {
            // "U+0009 CHARACTER TABULATION (tab)"
            // "U+000A LINE FEED (LF)"
            // "U+000C FORM FEED (FF)"
            // "U+0020 SPACE"
            // "If the current end tag token is an appropriate end tag token, then switch to the
            // before attribute name state. Otherwise, treat it as per the \"anything else\" entry below."
            Some(c) if Self::is_whitespace_char(c) => {
                if self.is_appropriate_end_tag_token() {
                    self.switch_to(TokenizerState::BeforeAttributeName);
                } else {
                    self.emit_script_data_end_tag_name_anything_else();
                }
            }
            // "U+002F SOLIDUS (/)"
            // "If the current end tag token is an appropriate end tag token, then switch to the
            // self-closing start tag state. Otherwise, treat it as per the \"anything else\" entry below."
            Some('/') => {
                if self.is_appropriate_end_tag_token() {
                    self.switch_to(TokenizerState::SelfClosingStartTag);
                } else {
                    self.emit_script_data_end_tag_name_anything_else();
                }
            }
            // "U+003E GREATER-THAN SIGN (>)"
            // "If the current end tag token is an appropriate end tag token, then switch to the data state
            // and emit the current tag token. Otherwise, treat it as per the \"anything else\" entry below."
            Some('>') => {
                if self.is_appropriate_end_tag_token() {
                    self.switch_to(TokenizerState::Data);
                    self.emit_token();
                } else {
                    self.emit_script_data_end_tag_name_anything_else();
                }
            }
            // "ASCII upper alpha"
            // "Append the lowercase version of the current input character to the current tag token's
            // tag name. Append the current input character to the temporary buffer."
            Some(c) if c.is_ascii_uppercase() => {
                if let Some(ref mut token) = self.current_token {
                    token.append_to_tag_name(c.to_ascii_lowercase());
                }
                self.temporary_buffer.push(c);
            }
            // "ASCII lower alpha"
            // "Append the current input character to the current tag token's tag name. Append the
            // current input character to the temporary buffer."
            Some(c) if c.is_ascii_lowercase() => {
                if let Some(ref mut token) = self.current_token {
                    token.append_to_tag_name(c);
                }
                self.temporary_buffer.push(c);
            }
            // "Anything else"
            // "Emit a U+003C LESS-THAN SIGN character token, a U+002F SOLIDUS character token, and a
            // character token for each of the characters in the temporary buffer. Reconsume in the
            // script data state."
            _ => {
                self.emit_script_data_end_tag_name_anything_else();
            }
        }
    }

    /// [§ 13.2.5.5 PLAINTEXT state](https://html.spec.whatwg.org/multipage/parsing.html#plaintext-state)
    fn handle_plaintext_state(&mut self) {
        match self.current_input_character {
            Some('\0') => {
                self.log_parse_error();
                self.emit_character_token('\u{FFFD}');
            }
            None => {
                self.emit_eof_token();
                self.eof_emitted = true;
            }
            Some(c) => {
                self.emit_character_token(c);
            }
        }
    }

    /// [§ 13.2.5.20 Script data escape start state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-escape-start-state)
    fn handle_script_data_escape_start_state(&mut self) {
        match self.current_input_character {
            Some('-') => {
                self.switch_to(TokenizerState::ScriptDataEscapeStartDash);
                self.emit_character_token('-');
            }
            _ => {
                self.reconsume_in(TokenizerState::ScriptData);
            }
        }
    }

    /// [§ 13.2.5.21 Script data escape start dash state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-escape-start-dash-state)
    fn handle_script_data_escape_start_dash_state(&mut self) {
        match self.current_input_character {
            Some('-') => {
                self.switch_to(TokenizerState::ScriptDataEscapedDashDash);
                self.emit_character_token('-');
            }
            _ => {
                self.reconsume_in(TokenizerState::ScriptData);
            }
        }
    }

    /// [§ 13.2.5.22 Script data escaped state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-escaped-state)
    fn handle_script_data_escaped_state(&mut self) {
        match self.current_input_character {
            Some('-') => {
                self.switch_to(TokenizerState::ScriptDataEscapedDash);
                self.emit_character_token('-');
            }
            Some('<') => {
                self.switch_to(TokenizerState::ScriptDataEscapedLessThanSign);
            }
            Some('\0') => {
                self.log_parse_error();
                self.emit_character_token('\u{FFFD}');
            }
            None => {
                self.log_parse_error();
                self.emit_eof_token();
                self.eof_emitted = true;
            }
            Some(c) => {
                self.emit_character_token(c);
            }
        }
    }

    /// [§ 13.2.5.23 Script data escaped dash state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-escaped-dash-state)
    fn handle_script_data_escaped_dash_state(&mut self) {
        match self.current_input_character {
            Some('-') => {
                self.switch_to(TokenizerState::ScriptDataEscapedDashDash);
                self.emit_character_token('-');
            }
            Some('<') => {
                self.switch_to(TokenizerState::ScriptDataEscapedLessThanSign);
            }
            Some('\0') => {
                self.log_parse_error();
                self.switch_to(TokenizerState::ScriptDataEscaped);
                self.emit_character_token('\u{FFFD}');
            }
            None => {
                self.log_parse_error();
                self.emit_eof_token();
                self.eof_emitted = true;
            }
            Some(c) => {
                self.switch_to(TokenizerState::ScriptDataEscaped);
                self.emit_character_token(c);
            }
        }
    }

    /// [§ 13.2.5.24 Script data escaped dash dash state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-escaped-dash-dash-state)
    fn handle_script_data_escaped_dash_dash_state(&mut self) {
        match self.current_input_character {
            Some('-') => {
                self.emit_character_token('-');
            }
            Some('<') => {
                self.switch_to(TokenizerState::ScriptDataEscapedLessThanSign);
            }
            Some('>') => {
                self.switch_to(TokenizerState::ScriptData);
                self.emit_character_token('>');
            }
            Some('\0') => {
                self.log_parse_error();
                self.switch_to(TokenizerState::ScriptDataEscaped);
                self.emit_character_token('\u{FFFD}');
            }
            None => {
                self.log_parse_error();
                self.emit_eof_token();
                self.eof_emitted = true;
            }
            Some(c) => {
                self.switch_to(TokenizerState::ScriptDataEscaped);
                self.emit_character_token(c);
            }
        }
    }

    /// [§ 13.2.5.25 Script data escaped less-than sign state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-escaped-less-than-sign-state)
    fn handle_script_data_escaped_less_than_sign_state(&mut self) {
        match self.current_input_character {
            Some('/') => {
                self.temporary_buffer.clear();
                self.switch_to(TokenizerState::ScriptDataEscapedEndTagOpen);
            }
            Some(c) if c.is_ascii_alphabetic() => {
                self.temporary_buffer.clear();
                self.emit_character_token('<');
                self.reconsume_in(TokenizerState::ScriptDataDoubleEscapeStart);
            }
            _ => {
                self.emit_character_token('<');
                self.reconsume_in(TokenizerState::ScriptDataEscaped);
            }
        }
    }

    /// [§ 13.2.5.26 Script data escaped end tag open state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-escaped-end-tag-open-state)
    fn handle_script_data_escaped_end_tag_open_state(&mut self) {
        match self.current_input_character {
            Some(c) if c.is_ascii_alphabetic() => {
                self.current_token = Some(Token::new_end_tag());
                self.reconsume_in(TokenizerState::ScriptDataEscapedEndTagName);
            }
            _ => {
                self.emit_character_token('<');
                self.emit_character_token('/');
                self.reconsume_in(TokenizerState::ScriptDataEscaped);
            }
        }
    }

    /// [§ 13.2.5.27 Script data escaped end tag name state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-escaped-end-tag-name-state)
    fn handle_script_data_escaped_end_tag_name_state(&mut self) {
        match self.current_input_character {
            Some(c) if Self::is_whitespace_char(c) => {
                if self.is_appropriate_end_tag_token() {
                    self.switch_to(TokenizerState::BeforeAttributeName);
                } else {
                    self.emit_escaped_end_tag_name_anything_else();
                }
            }
            Some('/') => {
                if self.is_appropriate_end_tag_token() {
                    self.switch_to(TokenizerState::SelfClosingStartTag);
                } else {
                    self.emit_escaped_end_tag_name_anything_else();
                }
            }
            Some('>') => {
                if self.is_appropriate_end_tag_token() {
                    self.switch_to(TokenizerState::Data);
                    self.emit_token();
                } else {
                    self.emit_escaped_end_tag_name_anything_else();
                }
            }
            Some(c) if c.is_ascii_uppercase() => {
                if let Some(ref mut token) = self.current_token {
                    token.append_to_tag_name(c.to_ascii_lowercase());
                }
                self.temporary_buffer.push(c);
            }
            Some(c) if c.is_ascii_lowercase() => {
                if let Some(ref mut token) = self.current_token {
                    token.append_to_tag_name(c);
                }
                self.temporary_buffer.push(c);
            }
            _ => {
                self.emit_escaped_end_tag_name_anything_else();
            }
        }
    }

    /// [§ 13.2.5.28 Script data double escape start state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-double-escape-start-state)
    fn handle_script_data_double_escape_start_state(&mut self) {
        match self.current_input_character {
            Some(c) if Self::is_whitespace_char(c) || c == '/' || c == '>' => {
                if self.temporary_buffer == "script" {
                    self.switch_to(TokenizerState::ScriptDataDoubleEscaped);
                } else {
                    self.switch_to(TokenizerState::ScriptDataEscaped);
                }
                self.emit_character_token(c);
            }
            Some(c) if c.is_ascii_uppercase() => {
                self.temporary_buffer.push(c.to_ascii_lowercase());
                self.emit_character_token(c);
            }
            Some(c) if c.is_ascii_lowercase() => {
                self.temporary_buffer.push(c);
                self.emit_character_token(c);
            }
            _ => {
                self.reconsume_in(TokenizerState::ScriptDataEscaped);
            }
        }
    }

    /// [§ 13.2.5.29 Script data double escaped state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-double-escaped-state)
    fn handle_script_data_double_escaped_state(&mut self) {
        match self.current_input_character {
            Some('-') => {
                self.switch_to(TokenizerState::ScriptDataDoubleEscapedDash);
                self.emit_character_token('-');
            }
            Some('<') => {
                self.switch_to(TokenizerState::ScriptDataDoubleEscapedLessThanSign);
                self.emit_character_token('<');
            }
            Some('\0') => {
                self.log_parse_error();
                self.emit_character_token('\u{FFFD}');
            }
            None => {
                self.log_parse_error();
                self.emit_eof_token();
                self.eof_emitted = true;
            }
            Some(c) => {
                self.emit_character_token(c);
            }
        }
    }

    /// [§ 13.2.5.30 Script data double escaped dash state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-double-escaped-dash-state)
    fn handle_script_data_double_escaped_dash_state(&mut self) {
        match self.current_input_character {
            Some('-') => {
                self.switch_to(TokenizerState::ScriptDataDoubleEscapedDashDash);
                self.emit_character_token('-');
            }
            Some('<') => {
                self.switch_to(TokenizerState::ScriptDataDoubleEscapedLessThanSign);
                self.emit_character_token('<');
            }
            Some('\0') => {
                self.log_parse_error();
                self.switch_to(TokenizerState::ScriptDataDoubleEscaped);
                self.emit_character_token('\u{FFFD}');
            }
            None => {
                self.log_parse_error();
                self.emit_eof_token();
                self.eof_emitted = true;
            }
            Some(c) => {
                self.switch_to(TokenizerState::ScriptDataDoubleEscaped);
                self.emit_character_token(c);
            }
        }
    }

    /// [§ 13.2.5.31 Script data double escaped dash dash state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-double-escaped-dash-dash-state)
    fn handle_script_data_double_escaped_dash_dash_state(&mut self) {
        match self.current_input_character {
            Some('-') => {
                self.emit_character_token('-');
            }
            Some('<') => {
                self.switch_to(TokenizerState::ScriptDataDoubleEscapedLessThanSign);
                self.emit_character_token('<');
            }
            Some('>') => {
                self.switch_to(TokenizerState::ScriptData);
                self.emit_character_token('>');
            }
            Some('\0') => {
                self.log_parse_error();
                self.switch_to(TokenizerState::ScriptDataDoubleEscaped);
                self.emit_character_token('\u{FFFD}');
            }
            None => {
                self.log_parse_error();
                self.emit_eof_token();
                self.eof_emitted = true;
            }
            Some(c) => {
                self.switch_to(TokenizerState::ScriptDataDoubleEscaped);
                self.emit_character_token(c);
            }
        }
    }

    /// [§ 13.2.5.32 Script data double escaped less-than sign state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-double-escaped-less-than-sign-state)
    fn handle_script_data_double_escaped_less_than_sign_state(&mut self) {
        match self.current_input_character {
            Some('/') => {
                self.temporary_buffer.clear();
                self.switch_to(TokenizerState::ScriptDataDoubleEscapeEnd);
                self.emit_character_token('/');
            }
            _ => {
                self.reconsume_in(TokenizerState::ScriptDataDoubleEscaped);
            }
        }
    }

    /// [§ 13.2.5.33 Script data double escape end state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-double-escape-end-state)
    fn handle_script_data_double_escape_end_state(&mut self) {
        match self.current_input_character {
            Some(c) if Self::is_whitespace_char(c) || c == '/' || c == '>' => {
                if self.temporary_buffer == "script" {
                    self.switch_to(TokenizerState::ScriptDataEscaped);
                } else {
                    self.switch_to(TokenizerState::ScriptDataDoubleEscaped);
                }
                self.emit_character_token(c);
            }
            Some(c) if c.is_ascii_uppercase() => {
                self.temporary_buffer.push(c.to_ascii_lowercase());
                self.emit_character_token(c);
            }
            Some(c) if c.is_ascii_lowercase() => {
                self.temporary_buffer.push(c);
                self.emit_character_token(c);
            }
            _ => {
                self.reconsume_in(TokenizerState::ScriptDataDoubleEscaped);
            }
        }
    }

    /// [§ 13.2.5.12 RAWTEXT less-than sign state](https://html.spec.whatwg.org/multipage/parsing.html#rawtext-less-than-sign-state)
    fn handle_rawtext_less_than_sign_state(&mut self) {
        match self.current_input_character {
            // "U+002F SOLIDUS (/)"
            // "Set the temporary buffer to the empty string. Switch to the RAWTEXT end tag open state."
            Some('/') => {
                self.temporary_buffer.clear();
                self.switch_to(TokenizerState::RAWTEXTEndTagOpen);
            }
            // "Anything else"
            // "Emit a U+003C LESS-THAN SIGN character token. Reconsume in the RAWTEXT state."
            _ => {
                self.emit_character_token('<');
                self.reconsume_in(TokenizerState::RAWTEXT);
            }
        }
    }

    /// [§ 13.2.5.13 RAWTEXT end tag open state](https://html.spec.whatwg.org/multipage/parsing.html#rawtext-end-tag-open-state)
    fn handle_rawtext_end_tag_open_state(&mut self) {
        match self.current_input_character {
            // "ASCII alpha"
            // "Create a new end tag token, set its tag name to the empty string. Reconsume in
            // the RAWTEXT end tag name state."
            Some(c) if c.is_ascii_alphabetic() => {
                self.current_token = Some(Token::new_end_tag());
                self.reconsume_in(TokenizerState::RAWTEXTEndTagName);
            }
            // "Anything else"
            // "Emit a U+003C LESS-THAN SIGN character token and a U+002F SOLIDUS character token.
            // Reconsume in the RAWTEXT state."
            _ => {
                self.emit_character_token('<');
                self.emit_character_token('/');
                self.reconsume_in(TokenizerState::RAWTEXT);
            }
        }
    }

    /// [§ 13.2.5.14 RAWTEXT end tag name state](https://html.spec.whatwg.org/multipage/parsing.html#rawtext-end-tag-name-state)
    fn handle_rawtext_end_tag_name_state(&mut self) {
        match self.current_input_character {
            // "U+0009 CHARACTER TABULATION (tab)"
            // "U+000A LINE FEED (LF)"
            // "U+000C FORM FEED (FF)"
            // "U+0020 SPACE"
            // "If the current end tag token is an appropriate end tag token, then switch to the
            // before attribute name state. Otherwise, treat it as per the "anything else" entry below."
            Some(c) if Self::is_whitespace_char(c) => {
                if self.is_appropriate_end_tag_token() {
                    self.switch_to(TokenizerState::BeforeAttributeName);
                } else {
                    self.emit_rawtext_end_tag_name_anything_else();
                }
            }
            // "U+002F SOLIDUS (/)"
            // "If the current end tag token is an appropriate end tag token, then switch to the
            // self-closing start tag state. Otherwise, treat it as per the "anything else" entry below."
            Some('/') => {
                if self.is_appropriate_end_tag_token() {
                    self.switch_to(TokenizerState::SelfClosingStartTag);
                } else {
                    self.emit_rawtext_end_tag_name_anything_else();
                }
            }
            // "U+003E GREATER-THAN SIGN (>)"
            // "If the current end tag token is an appropriate end tag token, then switch to the
            // data state and emit the current tag token. Otherwise, treat it as per the "anything
            // else" entry below."
            Some('>') => {
                if self.is_appropriate_end_tag_token() {
                    self.switch_to(TokenizerState::Data);
                    self.emit_token();
                } else {
                    self.emit_rawtext_end_tag_name_anything_else();
                }
            }
            // "ASCII upper alpha"
            // "Append the lowercase version of the current input character (add 0x0020 to the
            // character's code point) to the current tag token's tag name. Append the current
            // input character to the temporary buffer."
            Some(c) if c.is_ascii_uppercase() => {
                if let Some(ref mut token) = self.current_token {
                    token.append_to_tag_name(c.to_ascii_lowercase());
                }
                self.temporary_buffer.push(c);
            }
            // "ASCII lower alpha"
            // "Append the current input character to the current tag token's tag name. Append
            // the current input character to the temporary buffer."
            Some(c) if c.is_ascii_lowercase() => {
                if let Some(ref mut token) = self.current_token {
                    token.append_to_tag_name(c);
                }
                self.temporary_buffer.push(c);
            }
            // "Anything else"
            // "Emit a U+003C LESS-THAN SIGN character token, a U+002F SOLIDUS character token,
            // and a character token for each of the characters in the temporary buffer (in the
            // order they were added to the buffer). Reconsume in the RAWTEXT state."
            _ => {
                self.emit_rawtext_end_tag_name_anything_else();
            }
        }
    }

    /// [§ 13.2.5.6 Tag open state](https://html.spec.whatwg.org/multipage/parsing.html#tag-open-state)
    fn handle_tag_open_state(&mut self) {
        match self.current_input_character {
            // "U+0021 EXCLAMATION MARK (!) - Switch to the markup declaration open state."
            // NOTE: We use reconsume_in here so that MarkupDeclarationOpen can peek ahead
            // without the main loop consuming a character first. This state uses lookahead
            // rather than consuming the "current input character".
            Some('!') => {
                self.reconsume_in(TokenizerState::MarkupDeclarationOpen);
            }
            // "U+002F SOLIDUS (/) - Switch to the end tag open state."
            Some('/') => {
                self.switch_to(TokenizerState::EndTagOpen);
            }
            // "ASCII alpha - Create a new start tag token, set its tag name to the empty
            // string. Reconsume in the tag name state."
            Some(c) if c.is_ascii_alphabetic() => {
                self.current_token = Some(Token::new_start_tag());
                self.reconsume_in(TokenizerState::TagName);
            }
            // "U+003F QUESTION MARK (?) - This is an unexpected-question-mark-instead-of-tag-name
            // parse error. Create a comment token whose data is the empty string. Reconsume in the
            // bogus comment state."
            Some('?') => {
                self.log_parse_error();
                self.current_token = Some(Token::new_comment());
                self.reconsume_in(TokenizerState::BogusComment);
            }
            // "EOF - This is an eof-before-tag-name parse error. Emit a U+003C LESS-THAN SIGN
            // character token and an end-of-file token."
            None => {
                self.log_parse_error();
                self.emit_character_token('<');
                self.emit_eof_token();
                self.eof_emitted = true;
            }
            // "Anything else - This is an invalid-first-character-of-tag-name parse error.
            // Emit a U+003C LESS-THAN SIGN character token. Reconsume in the data state."
            Some(_) => {
                self.log_parse_error();
                self.emit_character_token('<');
                self.reconsume_in(TokenizerState::Data);
            }
        }
    }
    /// [§ 13.2.5.42 Markup declaration open state](https://html.spec.whatwg.org/multipage/parsing.html#markup-declaration-open-state)
    fn handle_markup_declaration_open_state(&mut self) {
        // "If the next two characters are both U+002D HYPHEN-MINUS characters (-),
        // consume those two characters, create a comment token whose data is the empty
        // string, and switch to the comment start state."
        if self.next_few_characters_are("--") {
            self.consume_string("--");
            self.current_token = Some(Token::new_comment());
            self.switch_to(TokenizerState::CommentStart);
        }
        // "Otherwise, if the next seven characters are an ASCII case-insensitive
        // match for the word 'DOCTYPE', consume those characters and switch to the
        // DOCTYPE state."
        else if self.next_few_characters_are_case_insensitive("DOCTYPE") {
            self.consume_string("DOCTYPE");
            self.switch_to(TokenizerState::DOCTYPE);
        }
        // CDATA sections are only honored in foreign content, which this
        // tokenizer doesn't track; `[CDATA[` in HTML content is always a
        // cdata-in-html-content parse error recovered as a bogus comment.
        else if self.next_few_characters_are("[CDATA[") {
            self.consume_string("[CDATA[");
            self.log_parse_error();
            self.current_token = Some(Token::new_comment());
            self.reconsume_in(TokenizerState::BogusComment);
        }
        // "Otherwise, this is an incorrectly-opened-comment parse error. Create a
        // comment token whose data is the empty string. Switch to the bogus comment state
        // (don't consume anything in the current state)."
        else {
            self.log_parse_error();
            self.current_token = Some(Token::new_comment());
            self.reconsume_in(TokenizerState::BogusComment);
        }
    }
    /// [§ 13.2.5.53 DOCTYPE state](https://html.spec.whatwg.org/multipage/parsing.html#doctype-state)
    fn handle_doctype_state(&mut self) {
        match self.current_input_character {
            // "U+0009 CHARACTER TABULATION, U+000A LINE FEED, U+000C FORM FEED,
            // U+0020 SPACE - Switch to the before DOCTYPE name state."
            Some(c) if Self::is_whitespace_char(c) => {
                self.switch_to(TokenizerState::BeforeDOCTYPEName);
            }
            // "U+003E GREATER-THAN SIGN (>) - Reconsume in the before DOCTYPE name state."
            Some('>') => {
                self.reconsume_in(TokenizerState::BeforeDOCTYPEName);
            }
            // "EOF - This is an eof-in-doctype parse error. Create a new DOCTYPE token.
            // Set its force-quirks flag to on. Emit the current token. Emit an end-of-file token."
            None => {
                self.log_parse_error();
                let mut token = Token::new_doctype();
                token.set_force_quirks();
                self.current_token = Some(token);
                self.emit_token();
                self.emit_eof_token();
                self.eof_emitted = true;
            }
            // "Anything else - This is a missing-whitespace-before-doctype-name parse error.
            // Reconsume in the before DOCTYPE name state."
            Some(_) => {
                self.log_parse_error();
                self.reconsume_in(TokenizerState::BeforeDOCTYPEName);
            }
        }
    }
    /// [§ 13.2.5.54 Before DOCTYPE name state](https://html.spec.whatwg.org/multipage/parsing.html#before-doctype-name-state)
    fn handle_before_doctype_name_state(&mut self) {
        match self.current_input_character {
            // "U+0009 CHARACTER TABULATION, U+000A LINE FEED, U+000C FORM FEED,
            // U+0020 SPACE - Ignore the character."
            Some(c) if Self::is_whitespace_char(c) => {
                self.switch_to(TokenizerState::BeforeDOCTYPEName);
            }
            // "ASCII upper alpha - Create a new DOCTYPE token. Set the token's name to
            // the lowercase version of the current input character. Switch to the DOCTYPE name state."
            Some(c) if c.is_ascii_uppercase() => {
                let mut token = Token::new_doctype();
                token.append_to_doctype_name(c.to_ascii_lowercase());
                self.current_token = Some(token);
                self.switch_to(TokenizerState::DOCTYPEName);
            }
            // "U+0000 NULL - This is an unexpected-null-character parse error. Create a new
            // DOCTYPE token. Set the token's name to a U+FFFD REPLACEMENT CHARACTER. Switch to
            // the DOCTYPE name state."
            Some('\0') => {
                self.log_parse_error();
                let mut token = Token::new_doctype();
                token.append_to_doctype_name('\u{FFFD}');
                self.current_token = Some(token);
                self.switch_to(TokenizerState::DOCTYPEName);
            }
            // "U+003E GREATER-THAN SIGN (>) - This is a missing-doctype-name parse error.
            // Create a new DOCTYPE token. Set its force-quirks flag to on. Switch to the data state.
            // Emit the current token."
            Some('>') => {
                self.log_parse_error();
                let mut token = Token::new_doctype();
                token.set_force_quirks();
                self.current_token = Some(token);
                self.switch_to(TokenizerState::Data);
                self.emit_token();
            }
            // "EOF - This is an eof-in-doctype parse error. Create a new DOCTYPE token.
            // Set its force-quirks flag to on. Emit the current token. Emit an end-of-file token."
            None => {
                self.log_parse_error();
                let mut token = Token::new_doctype();
                token.set_force_quirks();
                self.current_token = Some(token);
                self.emit_token();
                self.emit_eof_token();
                self.eof_emitted = true;
            }
            // "Anything else - Create a new DOCTYPE token. Set the token's name to the
            // current input character. Switch to the DOCTYPE name state."
            Some(c) => {
                let mut token = Token::new_doctype();
                token.append_to_doctype_name(c);
                self.current_token = Some(token);
                self.switch_to(TokenizerState::DOCTYPEName);
            }
        }
    }
    /// [§ 13.2.5.55 DOCTYPE name state](https://html.spec.whatwg.org/multipage/parsing.html#doctype-name-state)
    fn handle_doctype_name_state(&mut self) {
        match self.current_input_character {
            // "U+0009 CHARACTER TABULATION, U+000A LINE FEED, U+000C FORM FEED,
            // U+0020 SPACE - Switch to the after DOCTYPE name state."
            Some(c) if Self::is_whitespace_char(c) => {
                self.switch_to(TokenizerState::AfterDOCTYPEName);
            }
            // "U+003E GREATER-THAN SIGN (>) - Switch to the data state. Emit the current token."
            Some('>') => {
                self.switch_to(TokenizerState::Data);
                self.emit_token();
            }
            // "ASCII upper alpha - Append the lowercase version of the current input
            // character to the current DOCTYPE token's name."
            Some(c) if c.is_ascii_uppercase() => {
                if let Some(ref mut token) = self.current_token {
                    token.append_to_doctype_name(c.to_ascii_lowercase());
                }
            }
            // "U+0000 NULL - This is an unexpected-null-character parse error. Append a
            // U+FFFD REPLACEMENT CHARACTER to the current DOCTYPE token's name."
            Some('\0') => {
                self.log_parse_error();
                if let Some(ref mut token) = self.current_token {
                    token.append_to_doctype_name('\u{FFFD}');
                }
            }
            // "EOF - This is an eof-in-doctype parse error. Set the current DOCTYPE token's
            // force-quirks flag to on. Emit the current token. Emit an end-of-file token."
            None => {
                self.log_parse_error();
                if let Some(ref mut token) = self.current_token {
                    token.set_force_quirks();
                }
                self.emit_token();
                self.emit_eof_token();
                self.eof_emitted = true;
            }
            // "Anything else - Append the current input character to the current DOCTYPE
            // token's name."
            Some(c) => {
                if let Some(ref mut token) = self.current_token {
                    token.append_to_doctype_name(c);
                }
            }
        }
    }

    /// [§ 13.2.5.56 After DOCTYPE name state](https://html.spec.whatwg.org/multipage/parsing.html#after-doctype-name-state)
    ///
    /// Simplified: the living standard looks for `PUBLIC`/`SYSTEM` keywords
    /// here to parse identifiers this tokenizer's DOCTYPE token doesn't
    /// carry. Anything other than whitespace or `>` falls to `BogusDOCTYPE`.
    fn handle_after_doctype_name_state(&mut self) {
        match self.current_input_character {
            Some(c) if Self::is_whitespace_char(c) => {}
            Some('>') => {
                self.switch_to(TokenizerState::Data);
                self.emit_token();
            }
            None => {
                self.log_parse_error();
                if let Some(ref mut token) = self.current_token {
                    token.set_force_quirks();
                }
                self.emit_token();
                self.emit_eof_token();
                self.eof_emitted = true;
            }
            Some(_) => {
                self.log_parse_error();
                self.reconsume_in(TokenizerState::BogusDOCTYPE);
            }
        }
    }

    /// [§ 13.2.5.68 Bogus DOCTYPE state](https://html.spec.whatwg.org/multipage/parsing.html#bogus-doctype-state)
    fn handle_bogus_doctype_state(&mut self) {
        match self.current_input_character {
            Some('>') => {
                self.switch_to(TokenizerState::Data);
                self.emit_token();
            }
            Some('\0') => {
                self.log_parse_error();
            }
            None => {
                self.emit_token();
                self.emit_eof_token();
                self.eof_emitted = true;
            }
            Some(_) => {}
        }
    }

    /// [§ 13.2.5.8 Tag name state](https://html.spec.whatwg.org/multipage/parsing.html#tag-name-state)
    fn handle_tag_name_state(&mut self) {
        match self.current_input_character {
            // "U+0009 CHARACTER TABULATION, U+000A LINE FEED, U+000C FORM FEED,
            // U+0020 SPACE - Switch to the before attribute name state."
            Some(c) if Self::is_whitespace_char(c) => {
                self.switch_to(TokenizerState::BeforeAttributeName);
            }
            // "U+002F SOLIDUS (/) - Switch to the self-closing start tag state."
            Some('/') => {
                self.switch_to(TokenizerState::SelfClosingStartTag);
            }
            // "U+003E GREATER-THAN SIGN (>) - Switch to the data state. Emit the current token."
            Some('>') => {
                self.switch_to(TokenizerState::Data);
                self.emit_token();
            }
            // "ASCII upper alpha - Append the lowercase version of the current input
            // character to the current tag token's tag name."
            Some(c) if c.is_ascii_uppercase() => {
                if let Some(ref mut token) = self.current_token {
                    token.append_to_tag_name(c.to_ascii_lowercase());
                }
            }
            // "U+0000 NULL - This is an unexpected-null-character parse error. Append a
            // U+FFFD REPLACEMENT CHARACTER to the current tag token's tag name."
            Some('\0') => {
                self.log_parse_error();
                if let Some(ref mut token) = self.current_token {
                    token.append_to_tag_name('\u{FFFD}');
                }
            }
            // "EOF - This is an eof-in-tag parse error. Emit an end-of-file token."
            None => {
                self.log_parse_error();
                self.emit_eof_token();
                self.eof_emitted = true;
            }
            // "Anything else - Append the current input character to the current tag
            // token's tag name."
            Some(c) => {
                if let Some(ref mut token) = self.current_token {
                    token.append_to_tag_name(c);
                }
            }
        }
    }
    /// [§ 13.2.5.40 Self-closing start tag state](https://html.spec.whatwg.org/multipage/parsing.html#self-closing-start-tag-state)
    fn handle_self_closing_start_tag_state(&mut self) {
        match self.current_input_character {
            // "U+003E GREATER-THAN SIGN (>) - Set the self-closing flag of the current
            // tag token. Switch to the data state. Emit the current token."
            Some('>') => {
                if let Some(ref mut token) = self.current_token {
                    token.set_self_closing();
                }
                self.switch_to(TokenizerState::Data);
                self.emit_token();
            }
            // "EOF - This is an eof-in-tag parse error. Emit an end-of-file token."
            None => {
                self.log_parse_error();
                self.emit_eof_token();
                self.eof_emitted = true;
            }
            // "Anything else - This is an unexpected-solidus-in-tag parse error.
            // Reconsume in the before attribute name state."
            Some(_) => {
                self.log_parse_error();
                self.reconsume_in(TokenizerState::BeforeAttributeName);
            }
        }
    }
    /// [§ 13.2.5.7 End tag open state](https://html.spec.whatwg.org/multipage/parsing.html#end-tag-open-state)
    fn handle_end_tag_open_state(&mut self) {
        match self.current_input_character {
            // "ASCII alpha - Create a new end tag token, set its tag name to the empty
            // string. Reconsume in the tag name state."
            Some(c) if c.is_ascii_alphabetic() => {
                self.current_token = Some(Token::new_end_tag());
                self.reconsume_in(TokenizerState::TagName);
            }
            // "U+003E GREATER-THAN SIGN (>) - This is a missing-end-tag-name parse error.
            // Switch to the data state."
            Some('>') => {
                self.log_parse_error();
                self.switch_to(TokenizerState::Data);
            }
            // "EOF - This is an eof-before-tag-name parse error. Emit a U+003C LESS-THAN
            // SIGN character token, a U+002F SOLIDUS character token and an end-of-file token."
            None => {
                self.log_parse_error();
                self.emit_character_token('<');
                self.emit_character_token('/');
                self.emit_eof_token();
                self.eof_emitted = true;
            }
            // "Anything else - This is an invalid-first-character-of-tag-name parse error.
            // Create a comment token whose data is the empty string. Reconsume in the bogus
            // comment state."
            Some(_) => {
                self.log_parse_error();
                self.current_token = Some(Token::new_comment());
                self.reconsume_in(TokenizerState::BogusComment);
            }
        }
    }

    /// [§ 13.2.5.32 Before attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#before-attribute-name-state)
    fn handle_before_attribute_name_state(&mut self) {
        match self.current_input_character {
            // "U+0009 CHARACTER TABULATION, U+000A LINE FEED, U+000C FORM FEED,
            // U+0020 SPACE - Ignore the character."
            Some(c) if Self::is_whitespace_char(c) => {
                self.switch_to(TokenizerState::BeforeAttributeName);
            }
            // "U+002F SOLIDUS (/), U+003E GREATER-THAN SIGN (>), EOF -
            // Reconsume in the after attribute name state."
            Some('/') | Some('>') | None => {
                self.reconsume_in(TokenizerState::AfterAttributeName);
            }
            // "U+003D EQUALS SIGN (=) - This is an unexpected-equals-sign-before-attribute-name
            // parse error. Start a new attribute in the current tag token. Set that attribute's name
            // to the current input character, and its value to the empty string. Switch to the
            // attribute name state."
            Some('=') => {
                self.log_parse_error();
                if let Some(ref mut token) = self.current_token {
                    token.start_new_attribute();
                    token.append_to_current_attribute_name('=');
                }
                self.switch_to(TokenizerState::AttributeName);
            }
            // "Anything else - Start a new attribute in the current tag token. Set that
            // attribute name and value to the empty string. Reconsume in the attribute name state."
            Some(_) => {
                if let Some(ref mut token) = self.current_token {
                    token.start_new_attribute();
                }
                self.reconsume_in(TokenizerState::AttributeName);
            }
        }
    }

    /// [§ 13.2.5.33 Attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-name-state)
    fn handle_attribute_name_state(&mut self) {
        match self.current_input_character {
            // "U+0009 CHARACTER TABULATION, U+000A LINE FEED, U+000C FORM FEED,
            // U+0020 SPACE, U+002F SOLIDUS (/), U+003E GREATER-THAN SIGN (>), EOF -
            // Reconsume in the after attribute name state."
            Some(c) if Self::is_whitespace_char(c) => {
                self.check_duplicate_attribute();
                self.reconsume_in(TokenizerState::AfterAttributeName);
            }
            Some('/') | Some('>') => {
                self.check_duplicate_attribute();
                self.reconsume_in(TokenizerState::AfterAttributeName);
            }
            None => {
                self.check_duplicate_attribute();
                self.reconsume_in(TokenizerState::AfterAttributeName);
            }
            // "U+003D EQUALS SIGN (=) - Switch to the before attribute value state."
            Some('=') => {
                self.check_duplicate_attribute();
                self.switch_to(TokenizerState::BeforeAttributeValue);
            }
            // "ASCII upper alpha - Append the lowercase version of the current input
            // character to the current attribute's name."
            Some(c) if c.is_ascii_uppercase() => {
                if let Some(ref mut token) = self.current_token {
                    token.append_to_current_attribute_name(c.to_ascii_lowercase());
                }
            }
            // "U+0000 NULL - This is an unexpected-null-character parse error. Append a
            // U+FFFD REPLACEMENT CHARACTER to the current attribute's name."
            Some('\0') => {
                self.log_parse_error();
                if let Some(ref mut token) = self.current_token {
                    token.append_to_current_attribute_name('\u{FFFD}');
                }
            }
            // "U+0022 QUOTATION MARK (\"), U+0027 APOSTROPHE ('), U+003C LESS-THAN SIGN (<) -
            // This is an unexpected-character-in-attribute-name parse error. Treat it as per the
            // 'anything else' entry below."
            Some('"') | Some('\'') | Some('<') => {
                self.log_parse_error();
                if let Some(ref mut token) = self.current_token {
                    token.append_to_current_attribute_name(self.current_input_character.unwrap());
                }
            }
            // "Anything else - Append the current input character to the current attribute's name."
            Some(c) => {
                if let Some(ref mut token) = self.current_token {
                    token.append_to_current_attribute_name(c);
                }
            }
        }
    }

    /// [§ 13.2.5.34 After attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#after-attribute-name-state)
    fn handle_after_attribute_name_state(&mut self) {
        match self.current_input_character {
            // "U+0009 CHARACTER TABULATION, U+000A LINE FEED, U+000C FORM FEED,
            // U+0020 SPACE - Ignore the character."
            Some(c) if Self::is_whitespace_char(c) => {
                self.switch_to(TokenizerState::AfterAttributeName);
            }
            // "U+002F SOLIDUS (/) - Switch to the self-closing start tag state."
            Some('/') => {
                self.switch_to(TokenizerState::SelfClosingStartTag);
            }
            // "U+003D EQUALS SIGN (=) - Switch to the before attribute value state."
            Some('=') => {
                self.switch_to(TokenizerState::BeforeAttributeValue);
            }
            // "U+003E GREATER-THAN SIGN (>) - Switch to the data state. Emit the current tag token."
            Some('>') => {
                self.switch_to(TokenizerState::Data);
                self.emit_token();
            }
            // "EOF - This is an eof-in-tag parse error. Emit an end-of-file token."
            None => {
                self.log_parse_error();
                self.emit_eof_token();
                self.eof_emitted = true;
            }
            // "Anything else - Start a new attribute in the current tag token. Set that
            // attribute name and value to the empty string. Reconsume in the attribute name state."
            Some(_) => {
                if let Some(ref mut token) = self.current_token {
                    token.start_new_attribute();
                }
                self.reconsume_in(TokenizerState::AttributeName);
            }
        }
    }

    /// [§ 13.2.5.35 Before attribute value state](https://html.spec.whatwg.org/multipage/parsing.html#before-attribute-value-state)
    fn handle_before_attribute_value_state(&mut self) {
        match self.current_input_character {
            // "U+0009 CHARACTER TABULATION, U+000A LINE FEED, U+000C FORM FEED,
            // U+0020 SPACE - Ignore the character."
            Some(c) if Self::is_whitespace_char(c) => {
                self.switch_to(TokenizerState::BeforeAttributeValue);
            }
            // "U+0022 QUOTATION MARK (\") - Switch to the attribute value (double-quoted) state."
            Some('"') => {
                self.switch_to(TokenizerState::AttributeValueDoubleQuoted);
            }
            // "U+0027 APOSTROPHE (') - Switch to the attribute value (single-quoted) state."
            Some('\'') => {
                self.switch_to(TokenizerState::AttributeValueSingleQuoted);
            }
            // "U+003E GREATER-THAN SIGN (>) - This is a missing-attribute-value parse error.
            // Switch to the data state. Emit the current tag token."
            Some('>') => {
                self.log_parse_error();
                self.switch_to(TokenizerState::Data);
                self.emit_token();
            }
            // "Anything else - Reconsume in the attribute value (unquoted) state."
            _ => {
                self.reconsume_in(TokenizerState::AttributeValueUnquoted);
            }
        }
    }

    /// [§ 13.2.5.36 Attribute value (double-quoted) state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-value-(double-quoted)-state)
    fn handle_attribute_value_double_quoted_state(&mut self) {
        match self.current_input_character {
            // "U+0022 QUOTATION MARK (\") - Switch to the after attribute value (quoted) state."
            Some('"') => {
                self.switch_to(TokenizerState::AfterAttributeValueQuoted);
            }
            // "U+0026 AMPERSAND (&) - Set the return state to the attribute value (double-quoted)
            // state. Switch to the character reference state."
            Some('&') => {
                self.return_state = Some(TokenizerState::AttributeValueDoubleQuoted);
                self.switch_to(TokenizerState::CharacterReference);
            }
            // "U+0000 NULL - This is an unexpected-null-character parse error. Append a
            // U+FFFD REPLACEMENT CHARACTER to the current attribute's value."
            Some('\0') => {
                self.log_parse_error();
                if let Some(ref mut token) = self.current_token {
                    token.append_to_current_attribute_value('\u{FFFD}');
                }
            }
            // "EOF - This is an eof-in-tag parse error. Emit an end-of-file token."
            None => {
                self.log_parse_error();
                self.emit_eof_token();
                self.eof_emitted = true;
            }
            // "Anything else - Append the current input character to the current attribute's value."
            Some(c) => {
                if let Some(ref mut token) = self.current_token {
                    token.append_to_current_attribute_value(c);
                }
            }
        }
    }

    /// [§ 13.2.5.37 Attribute value (single-quoted) state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-value-(single-quoted)-state)
    fn handle_attribute_value_single_quoted_state(&mut self) {
        match self.current_input_character {
            // "U+0027 APOSTROPHE (') - Switch to the after attribute value (quoted) state."
            Some('\'') => {
                self.switch_to(TokenizerState::AfterAttributeValueQuoted);
            }
            // "U+0026 AMPERSAND (&) - Set the return state to the attribute value (single-quoted)
            // state. Switch to the character reference state."
            Some('&') => {
                self.return_state = Some(TokenizerState::AttributeValueSingleQuoted);
                self.switch_to(TokenizerState::CharacterReference);
            }
            // "U+0000 NULL - This is an unexpected-null-character parse error. Append a
            // U+FFFD REPLACEMENT CHARACTER to the current attribute's value."
            Some('\0') => {
                self.log_parse_error();
                if let Some(ref mut token) = self.current_token {
                    token.append_to_current_attribute_value('\u{FFFD}');
                }
            }
            // "EOF - This is an eof-in-tag parse error. Emit an end-of-file token."
            None => {
                self.log_parse_error();
                self.emit_eof_token();
                self.eof_emitted = true;
            }
            // "Anything else - Append the current input character to the current attribute's value."
            Some(c) => {
                if let Some(ref mut token) = self.current_token {
                    token.append_to_current_attribute_value(c);
                }
            }
        }
    }

    /// [§ 13.2.5.38 Attribute value (unquoted) state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-value-(unquoted)-state)
    fn handle_attribute_value_unquoted_state(&mut self) {
        match self.current_input_character {
            // "U+0009 CHARACTER TABULATION, U+000A LINE FEED, U+000C FORM FEED,
            // U+0020 SPACE - Switch to the before attribute name state."
            Some(c) if Self::is_whitespace_char(c) => {
                self.switch_to(TokenizerState::BeforeAttributeName);
            }
            // "U+0026 AMPERSAND (&) - Set the return state to the attribute value (unquoted)
            // state. Switch to the character reference state."
            Some('&') => {
                self.return_state = Some(TokenizerState::AttributeValueUnquoted);
                self.switch_to(TokenizerState::CharacterReference);
            }
            // "U+003E GREATER-THAN SIGN (>) - Switch to the data state. Emit the current tag token."
            Some('>') => {
                self.switch_to(TokenizerState::Data);
                self.emit_token();
            }
            // "U+0000 NULL - This is an unexpected-null-character parse error. Append a
            // U+FFFD REPLACEMENT CHARACTER to the current attribute's value."
            Some('\0') => {
                self.log_parse_error();
                if let Some(ref mut token) = self.current_token {
                    token.append_to_current_attribute_value('\u{FFFD}');
                }
            }
            // "U+0022 QUOTATION MARK (\"), U+0027 APOSTROPHE ('), U+003C LESS-THAN SIGN (<),
            // U+003D EQUALS SIGN (=), U+0060 GRAVE ACCENT (`) - This is an
            // unexpected-character-in-unquoted-attribute-value parse error. Treat it as per the
            // 'anything else' entry below."
            Some('"') | Some('\'') | Some('<') | Some('=') | Some('`') => {
                self.log_parse_error();
                if let Some(ref mut token) = self.current_token {
                    token.append_to_current_attribute_value(self.current_input_character.unwrap());
                }
            }
            // "EOF - This is an eof-in-tag parse error. Emit an end-of-file token."
            None => {
                self.log_parse_error();
                self.emit_eof_token();
                self.eof_emitted = true;
            }
            // "Anything else - Append the current input character to the current attribute's value."
            Some(c) => {
                if let Some(ref mut token) = self.current_token {
                    token.append_to_current_attribute_value(c);
                }
            }
        }
    }

    /// [§ 13.2.5.39 After attribute value (quoted) state](https://html.spec.whatwg.org/multipage/parsing.html#after-attribute-value-(quoted)-state)
    fn handle_after_attribute_value_quoted_state(&mut self) {
        match self.current_input_character {
            // "U+0009 CHARACTER TABULATION, U+000A LINE FEED, U+000C FORM FEED,
            // U+0020 SPACE - Switch to the before attribute name state."
            Some(c) if Self::is_whitespace_char(c) => {
                self.switch_to(TokenizerState::BeforeAttributeName);
            }
            // "U+002F SOLIDUS (/) - Switch to the self-closing start tag state."
            Some('/') => {
                self.switch_to(TokenizerState::SelfClosingStartTag);
            }
            // "U+003E GREATER-THAN SIGN (>) - Switch to the data state. Emit the current tag token."
            Some('>') => {
                self.switch_to(TokenizerState::Data);
                self.emit_token();
            }
            // "EOF - This is an eof-in-tag parse error. Emit an end-of-file token."
            None => {
                self.log_parse_error();
                self.emit_eof_token();
                self.eof_emitted = true;
            }
            // "Anything else - This is a missing-whitespace-between-attributes parse error.
            // Reconsume in the before attribute name state."
            Some(_) => {
                self.log_parse_error();
                self.reconsume_in(TokenizerState::BeforeAttributeName);
            }
        }
    }

    /// [§ 13.2.5.43 Comment start state](https://html.spec.whatwg.org/multipage/parsing.html#comment-start-state)
    fn handle_comment_start_state(&mut self) {
        match self.current_input_character {
            // "U+002D HYPHEN-MINUS (-) - Switch to the comment start dash state."
            Some('-') => {
                self.switch_to(TokenizerState::CommentStartDash);
            }
            // "U+003E GREATER-THAN SIGN (>) - This is an abrupt-closing-of-empty-comment
            // parse error. Switch to the data state. Emit the current comment token."
            Some('>') => {
                self.log_parse_error();
                self.switch_to(TokenizerState::Data);
                self.emit_token();
            }
            // "Anything else - Reconsume in the comment state."
            _ => {
                self.reconsume_in(TokenizerState::Comment);
            }
        }
    }

    /// [§ 13.2.5.44 Comment start dash state](https://html.spec.whatwg.org/multipage/parsing.html#comment-start-dash-state)
    fn handle_comment_start_dash_state(&mut self) {
        match self.current_input_character {
            // "U+002D HYPHEN-MINUS (-) - Switch to the comment end state."
            Some('-') => {
                self.switch_to(TokenizerState::CommentEnd);
            }
            // "U+003E GREATER-THAN SIGN (>) - This is an abrupt-closing-of-empty-comment
            // parse error. Switch to the data state. Emit the current comment token."
            Some('>') => {
                self.log_parse_error();
                self.switch_to(TokenizerState::Data);
                self.emit_token();
            }
            // "EOF - This is an eof-in-comment parse error. Emit the current comment
            // token. Emit an end-of-file token."
            None => {
                self.log_parse_error();
                self.emit_token();
                self.emit_eof_token();
                self.eof_emitted = true;
            }
            // "Anything else - Append a U+002D HYPHEN-MINUS character (-) to the comment
            // token's data. Reconsume in the comment state."
            Some(_) => {
                if let Some(ref mut token) = self.current_token {
                    token.append_to_comment('-');
                }
                self.reconsume_in(TokenizerState::Comment);
            }
        }
    }

    /// [§ 13.2.5.45 Comment state](https://html.spec.whatwg.org/multipage/parsing.html#comment-state)
    fn handle_comment_state(&mut self) {
        match self.current_input_character {
            // "U+003C LESS-THAN SIGN (<) - Append the current input character to the
            // comment token's data. Switch to the comment less-than sign state."
            Some('<') => {
                if let Some(ref mut token) = self.current_token {
                    token.append_to_comment('<');
                }
                self.switch_to(TokenizerState::CommentLessThanSign);
            }
            // "U+002D HYPHEN-MINUS (-) - Switch to the comment end dash state."
            Some('-') => {
                self.switch_to(TokenizerState::CommentEndDash);
            }
            // "U+0000 NULL - This is an unexpected-null-character parse error. Append a
            // U+FFFD REPLACEMENT CHARACTER character to the comment token's data."
            Some('\0') => {
                self.log_parse_error();
                if let Some(ref mut token) = self.current_token {
                    token.append_to_comment('\u{FFFD}');
                }
            }
            // "EOF - This is an eof-in-comment parse error. Emit the current comment
            // token. Emit an end-of-file token."
            None => {
                self.log_parse_error();
                self.emit_token();
                self.emit_eof_token();
                self.eof_emitted = true;
            }
            // "Anything else - Append the current input character to the comment token's data."
            Some(c) => {
                if let Some(ref mut token) = self.current_token {
                    token.append_to_comment(c);
                }
            }
        }
    }

    /// [§ 13.2.5.46 Comment less-than sign state](https://html.spec.whatwg.org/multipage/parsing.html#comment-less-than-sign-state)
    fn handle_comment_less_than_sign_state(&mut self) {
        match self.current_input_character {
            // "U+0021 EXCLAMATION MARK (!) - Append the current input character to the
            // comment token's data. Switch to the comment less-than sign bang state."
            Some('!') => {
                if let Some(ref mut token) = self.current_token {
                    token.append_to_comment('!');
                }
                self.switch_to(TokenizerState::CommentLessThanSignBang);
            }
            // "U+003C LESS-THAN SIGN (<) - Append the current input character to the
            // comment token's data."
            Some('<') => {
                if let Some(ref mut token) = self.current_token {
                    token.append_to_comment('<');
                }
            }
            // "Anything else - Reconsume in the comment state."
            _ => {
                self.reconsume_in(TokenizerState::Comment);
            }
        }
    }

    /// [§ 13.2.5.47 Comment less-than sign bang state](https://html.spec.whatwg.org/multipage/parsing.html#comment-less-than-sign-bang-state)
    fn handle_comment_less_than_sign_bang_state(&mut self) {
        match self.current_input_character {
            // "U+002D HYPHEN-MINUS (-) - Switch to the comment less-than sign bang dash state."
            Some('-') => {
                self.switch_to(TokenizerState::CommentLessThanSignBangDash);
            }
            // "Anything else - Reconsume in the comment state."
            _ => {
                self.reconsume_in(TokenizerState::Comment);
            }
        }
    }

    /// [§ 13.2.5.48 Comment less-than sign bang dash state](https://html.spec.whatwg.org/multipage/parsing.html#comment-less-than-sign-bang-dash-state)
    fn handle_comment_less_than_sign_bang_dash_state(&mut self) {
        match self.current_input_character {
            // "U+002D HYPHEN-MINUS (-) - Switch to the comment less-than sign bang dash dash state."
            Some('-') => {
                self.switch_to(TokenizerState::CommentLessThanSignBangDashDash);
            }
            // "Anything else - Reconsume in the comment end dash state."
            _ => {
                self.reconsume_in(TokenizerState::CommentEndDash);
            }
        }
    }

    /// [§ 13.2.5.49 Comment less-than sign bang dash dash state](https://html.spec.whatwg.org/multipage/parsing.html#comment-less-than-sign-bang-dash-dash-state)
    fn handle_comment_less_than_sign_bang_dash_dash_state(&mut self) {
        match self.current_input_character {
            // "U+003E GREATER-THAN SIGN (>) - Reconsume in the comment end state."
            Some('>') => {
                self.reconsume_in(TokenizerState::CommentEnd);
            }
            // "EOF - Reconsume in the comment end state."
            None => {
                self.reconsume_in(TokenizerState::CommentEnd);
            }
            // "Anything else - This is a nested-comment parse error. Reconsume in the
            // comment end state."
            Some(_) => {
                self.log_parse_error();
                self.reconsume_in(TokenizerState::CommentEnd);
            }
        }
    }

    /// [§ 13.2.5.50 Comment end dash state](https://html.spec.whatwg.org/multipage/parsing.html#comment-end-dash-state)
    fn handle_comment_end_dash_state(&mut self) {
        match self.current_input_character {
            // "U+002D HYPHEN-MINUS (-) - Switch to the comment end state."
            Some('-') => {
                self.switch_to(TokenizerState::CommentEnd);
            }
            // "EOF - This is an eof-in-comment parse error. Emit the current comment
            // token. Emit an end-of-file token."
            None => {
                self.log_parse_error();
                self.emit_token();
                self.emit_eof_token();
                self.eof_emitted = true;
            }
            // "Anything else - Append a U+002D HYPHEN-MINUS character (-) to the comment
            // token's data. Reconsume in the comment state."
            Some(_) => {
                if let Some(ref mut token) = self.current_token {
                    token.append_to_comment('-');
                }
                self.reconsume_in(TokenizerState::Comment);
            }
        }
    }

    /// [§ 13.2.5.51 Comment end state](https://html.spec.whatwg.org/multipage/parsing.html#comment-end-state)
    fn handle_comment_end_state(&mut self) {
        match self.current_input_character {
            // "U+003E GREATER-THAN SIGN (>) - Switch to the data state. Emit the current
            // comment token."
            Some('>') => {
                self.switch_to(TokenizerState::Data);
                self.emit_token();
            }
            // "U+0021 EXCLAMATION MARK (!) - Switch to the comment end bang state."
            Some('!') => {
                self.switch_to(TokenizerState::CommentEndBang);
            }
            // "U+002D HYPHEN-MINUS (-) - Append a U+002D HYPHEN-MINUS character (-) to
            // the comment token's data."
            Some('-') => {
                if let Some(ref mut token) = self.current_token {
                    token.append_to_comment('-');
                }
            }
            // "EOF - This is an eof-in-comment parse error. Emit the current comment
            // token. Emit an end-of-file token."
            None => {
                self.log_parse_error();
                self.emit_token();
                self.emit_eof_token();
                self.eof_emitted = true;
            }
            // "Anything else - Append two U+002D HYPHEN-MINUS characters (-) to the
            // comment token's data. Reconsume in the comment state."
            Some(_) => {
                if let Some(ref mut token) = self.current_token {
                    token.append_to_comment('-');
                    token.append_to_comment('-');
                }
                self.reconsume_in(TokenizerState::Comment);
            }
        }
    }

    /// [§ 13.2.5.52 Comment end bang state](https://html.spec.whatwg.org/multipage/parsing.html#comment-end-bang-state)
    fn handle_comment_end_bang_state(&mut self) {
        match self.current_input_character {
            // "U+002D HYPHEN-MINUS (-) - Append two U+002D HYPHEN-MINUS characters (-)
            // and a U+0021 EXCLAMATION MARK character (!) to the comment token's data. Switch
            // to the comment end dash state."
            Some('-') => {
                if let Some(ref mut token) = self.current_token {
                    token.append_to_comment('-');
                    token.append_to_comment('-');
                    token.append_to_comment('!');
                }
                self.switch_to(TokenizerState::CommentEndDash);
            }
            // "U+003E GREATER-THAN SIGN (>) - This is an incorrectly-closed-comment parse
            // error. Switch to the data state. Emit the current comment token."
            Some('>') => {
                self.log_parse_error();
                self.switch_to(TokenizerState::Data);
                self.emit_token();
            }
            // "EOF - This is an eof-in-comment parse error. Emit the current comment
            // token. Emit an end-of-file token."
            None => {
                self.log_parse_error();
                self.emit_token();
                self.emit_eof_token();
                self.eof_emitted = true;
            }
            // "Anything else - Append two U+002D HYPHEN-MINUS characters (-) and a U+0021
            // EXCLAMATION MARK character (!) to the comment token's data. Reconsume in the
            // comment state."
            Some(_) => {
                if let Some(ref mut token) = self.current_token {
                    token.append_to_comment('-');
                    token.append_to_comment('-');
                    token.append_to_comment('!');
                }
                self.reconsume_in(TokenizerState::Comment);
            }
        }
    }

    /// [§ 13.2.5.41 Bogus comment state](https://html.spec.whatwg.org/multipage/parsing.html#bogus-comment-state)
    fn handle_bogus_comment_state(&mut self) {
        match self.current_input_character {
            // "U+003E GREATER-THAN SIGN (>) - Switch to the data state. Emit the current
            // comment token."
            Some('>') => {
                self.switch_to(TokenizerState::Data);
                self.emit_token();
            }
            // "EOF - Emit the comment. Emit an end-of-file token."
            None => {
                self.emit_token();
                self.emit_eof_token();
                self.eof_emitted = true;
            }
            // "U+0000 NULL - This is an unexpected-null-character parse error. Append a
            // U+FFFD REPLACEMENT CHARACTER character to the comment token's data."
            Some('\0') => {
                self.log_parse_error();
                if let Some(ref mut token) = self.current_token {
                    token.append_to_comment('\u{FFFD}');
                }
            }
            // "Anything else - Append the current input character to the comment token's data."
            Some(c) => {
                if let Some(ref mut token) = self.current_token {
                    token.append_to_comment(c);
                }
            }
        }
    }

    /// [§ 13.2.5.72 Character reference state](https://html.spec.whatwg.org/multipage/parsing.html#character-reference-state)
    fn handle_character_reference_state(&mut self) {
        // "Set the temporary buffer to the empty string."
        self.temporary_buffer.clear();
        // "Append a U+0026 AMPERSAND character (&) to the temporary buffer."
        self.temporary_buffer.push('&');

        match self.current_input_character {
            // "ASCII alphanumeric"
            // "Reconsume in the named character reference state."
            Some(c) if c.is_ascii_alphanumeric() => {
                self.reconsume_in(TokenizerState::NamedCharacterReference);
            }
            // "U+0023 NUMBER SIGN (#)"
            // "Append the current input character to the temporary buffer.
            // Switch to the numeric character reference state."
            Some('#') => {
                self.temporary_buffer.push('#');
                self.switch_to(TokenizerState::NumericCharacterReference);
            }
            // "Anything else"
            // "Flush code points consumed as a character reference.
            // Reconsume in the return state."
            _ => {
                self.flush_code_points_consumed_as_character_reference();
                let return_state = self.return_state.take().unwrap();
                self.reconsume_in(return_state);
            }
        }
    }
    /// [§ 13.2.5.73 Named character reference state](https://html.spec.whatwg.org/multipage/parsing.html#named-character-reference-state)
    ///
    /// "Consume the maximum number of characters possible, where the
    /// consumed characters are one of the identifiers in the first column
    /// of the named character references table." The temporary buffer
    /// already holds `&` (appended by the character reference state); we
    /// grow it one character at a time, tracking the longest prefix that
    /// matches a table entry, and stop as soon as no entry could possibly
    /// extend the current prefix.
    ///
    /// Unlike the full living standard this tokenizer has no dedicated
    /// ambiguous-ampersand state: on a lookup miss the consumed run is
    /// flushed back literally and tokenization reconsumes directly in the
    /// return state, which produces the same observable output (the
    /// ambiguous-ampersand state exists only to emit/append characters one
    /// at a time; flushing the whole run up front is equivalent here).
    fn handle_named_character_reference_state(&mut self) {
        use super::named_character_references::{any_entity_has_prefix, lookup_entity};

        let mut longest_match: Option<(usize, &'static str)> = None;

        if let Some(c) = self.current_input_character {
            self.temporary_buffer.push(c);
            if let Some(replacement) = lookup_entity(&self.temporary_buffer[1..]) {
                longest_match = Some((self.temporary_buffer.len(), replacement));
            }
        }

        loop {
            let entity_name = &self.temporary_buffer[1..];
            if entity_name.ends_with(';') || !any_entity_has_prefix(entity_name) {
                break;
            }
            match self.consume() {
                Some(c) if c.is_ascii_alphanumeric() || c == ';' => {
                    self.temporary_buffer.push(c);
                    if let Some(replacement) = lookup_entity(&self.temporary_buffer[1..]) {
                        longest_match = Some((self.temporary_buffer.len(), replacement));
                    }
                }
                next => {
                    self.current_input_character = next;
                    self.reconsume = true;
                    break;
                }
            }
        }

        let Some((match_len, replacement)) = longest_match else {
            // "Otherwise: flush code points consumed as a character reference."
            // (no ambiguous-ampersand follow-up state in this tokenizer; see doc above)
            self.flush_code_points_consumed_as_character_reference();
            let return_state = self.return_state.take().unwrap();
            if self.reconsume {
                self.state = return_state;
            } else {
                self.switch_to(return_state);
            }
            return;
        };

        let matched_entity = &self.temporary_buffer[1..match_len];
        let last_char_is_semicolon = matched_entity.ends_with(';');

        // "For historical reasons" an attribute-value match without a
        // trailing semicolon, followed by `=` or an alphanumeric, is NOT
        // decoded and is instead flushed verbatim.
        if self.is_consumed_as_part_of_attribute() && !last_char_is_semicolon {
            let next_char = if match_len < self.temporary_buffer.len() {
                self.temporary_buffer.chars().nth(match_len)
            } else if self.reconsume {
                self.current_input_character
            } else {
                self.peek_codepoint(0)
            };
            if matches!(next_char, Some('='))
                || matches!(next_char, Some(c) if c.is_ascii_alphanumeric())
            {
                self.flush_code_points_consumed_as_character_reference();
                let return_state = self.return_state.take().unwrap();
                if self.reconsume {
                    self.state = return_state;
                } else {
                    self.switch_to(return_state);
                }
                return;
            }
        }

        if !last_char_is_semicolon {
            self.log_parse_error();
        }

        let chars_after_match: String = self.temporary_buffer[match_len..].to_string();
        self.temporary_buffer.clear();
        self.temporary_buffer.push_str(replacement);
        self.flush_code_points_consumed_as_character_reference();

        for c in chars_after_match.chars() {
            if self.is_consumed_as_part_of_attribute() {
                if let Some(ref mut token) = self.current_token {
                    token.append_to_current_attribute_value(c);
                }
            } else {
                self.emit_character_token(c);
            }
        }

        let return_state = self.return_state.take().unwrap();
        if self.reconsume {
            self.state = return_state;
        } else {
            self.switch_to(return_state);
        }
    }

    /// [§ 13.2.5.75 Numeric character reference state](https://html.spec.whatwg.org/multipage/parsing.html#numeric-character-reference-state)
    ///
    /// Entity expansion is out of scope: consume an optional `x`/`X` plus a
    /// maximal run of hex digits, or a maximal run of decimal digits, and
    /// discard them, then reconsume in the return state.
    fn handle_numeric_character_reference_state(&mut self) {
        let hex = matches!(self.current_input_character, Some('x' | 'X'));
        if hex {
            self.current_input_character = self.consume();
        }
        loop {
            let is_digit = self.current_input_character.is_some_and(|c| {
                if hex { c.is_ascii_hexdigit() } else { c.is_ascii_digit() }
            });
            if !is_digit {
                break;
            }
            self.current_input_character = self.consume();
        }
        if self.current_input_character == Some(';') {
            self.current_input_character = self.consume();
        } else {
            self.log_parse_error();
        }
        let return_state = self.return_state.take().unwrap();
        self.reconsume_in(return_state);
    }

    /// Dispatch on the current state, processing exactly one character
    /// (already consumed/reconsumed by `step`).
    fn dispatch_state(&mut self) {
        match self.state {
            TokenizerState::Data => self.handle_data_state(),
            TokenizerState::RCDATA => self.handle_rcdata_state(),
            TokenizerState::RAWTEXT => self.handle_rawtext_state(),
            TokenizerState::ScriptData => self.handle_script_data_state(),
            TokenizerState::PLAINTEXT => self.handle_plaintext_state(),
            TokenizerState::TagOpen => self.handle_tag_open_state(),
            TokenizerState::EndTagOpen => self.handle_end_tag_open_state(),
            TokenizerState::TagName => self.handle_tag_name_state(),
            TokenizerState::RCDATALessThanSign => self.handle_rcdata_less_than_sign_state(),
            TokenizerState::RCDATAEndTagOpen => self.handle_rcdata_end_tag_open_state(),
            TokenizerState::RCDATAEndTagName => self.handle_rcdata_end_tag_name_state(),
            TokenizerState::RAWTEXTLessThanSign => self.handle_rawtext_less_than_sign_state(),
            TokenizerState::RAWTEXTEndTagOpen => self.handle_rawtext_end_tag_open_state(),
            TokenizerState::RAWTEXTEndTagName => self.handle_rawtext_end_tag_name_state(),
            TokenizerState::ScriptDataLessThanSign => {
                self.handle_script_data_less_than_sign_state()
            }
            TokenizerState::ScriptDataEndTagOpen => self.handle_script_data_end_tag_open_state(),
            TokenizerState::ScriptDataEndTagName => self.handle_script_data_end_tag_name_state(),
            TokenizerState::ScriptDataEscapeStart => self.handle_script_data_escape_start_state(),
            TokenizerState::ScriptDataEscapeStartDash => {
                self.handle_script_data_escape_start_dash_state()
            }
            TokenizerState::ScriptDataEscaped => self.handle_script_data_escaped_state(),
            TokenizerState::ScriptDataEscapedDash => self.handle_script_data_escaped_dash_state(),
            TokenizerState::ScriptDataEscapedDashDash => {
                self.handle_script_data_escaped_dash_dash_state()
            }
            TokenizerState::ScriptDataEscapedLessThanSign => {
                self.handle_script_data_escaped_less_than_sign_state()
            }
            TokenizerState::ScriptDataEscapedEndTagOpen => {
                self.handle_script_data_escaped_end_tag_open_state()
            }
            TokenizerState::ScriptDataEscapedEndTagName => {
                self.handle_script_data_escaped_end_tag_name_state()
            }
            TokenizerState::ScriptDataDoubleEscapeStart => {
                self.handle_script_data_double_escape_start_state()
            }
            TokenizerState::ScriptDataDoubleEscaped => {
                self.handle_script_data_double_escaped_state()
            }
            TokenizerState::ScriptDataDoubleEscapedDash => {
                self.handle_script_data_double_escaped_dash_state()
            }
            TokenizerState::ScriptDataDoubleEscapedDashDash => {
                self.handle_script_data_double_escaped_dash_dash_state()
            }
            TokenizerState::ScriptDataDoubleEscapedLessThanSign => {
                self.handle_script_data_double_escaped_less_than_sign_state()
            }
            TokenizerState::ScriptDataDoubleEscapeEnd => {
                self.handle_script_data_double_escape_end_state()
            }
            TokenizerState::BeforeAttributeName => self.handle_before_attribute_name_state(),
            TokenizerState::AttributeName => self.handle_attribute_name_state(),
            TokenizerState::AfterAttributeName => self.handle_after_attribute_name_state(),
            TokenizerState::BeforeAttributeValue => self.handle_before_attribute_value_state(),
            TokenizerState::AttributeValueDoubleQuoted => {
                self.handle_attribute_value_double_quoted_state()
            }
            TokenizerState::AttributeValueSingleQuoted => {
                self.handle_attribute_value_single_quoted_state()
            }
            TokenizerState::AttributeValueUnquoted => {
                self.handle_attribute_value_unquoted_state()
            }
            TokenizerState::AfterAttributeValueQuoted => {
                self.handle_after_attribute_value_quoted_state()
            }
            TokenizerState::SelfClosingStartTag => self.handle_self_closing_start_tag_state(),
            TokenizerState::BogusComment => self.handle_bogus_comment_state(),
            TokenizerState::MarkupDeclarationOpen => self.handle_markup_declaration_open_state(),
            TokenizerState::CommentStart => self.handle_comment_start_state(),
            TokenizerState::CommentStartDash => self.handle_comment_start_dash_state(),
            TokenizerState::Comment => self.handle_comment_state(),
            TokenizerState::CommentLessThanSign => self.handle_comment_less_than_sign_state(),
            TokenizerState::CommentLessThanSignBang => {
                self.handle_comment_less_than_sign_bang_state()
            }
            TokenizerState::CommentLessThanSignBangDash => {
                self.handle_comment_less_than_sign_bang_dash_state()
            }
            TokenizerState::CommentLessThanSignBangDashDash => {
                self.handle_comment_less_than_sign_bang_dash_dash_state()
            }
            TokenizerState::CommentEndDash => self.handle_comment_end_dash_state(),
            TokenizerState::CommentEnd => self.handle_comment_end_state(),
            TokenizerState::CommentEndBang => self.handle_comment_end_bang_state(),
            TokenizerState::DOCTYPE => self.handle_doctype_state(),
            TokenizerState::BeforeDOCTYPEName => self.handle_before_doctype_name_state(),
            TokenizerState::DOCTYPEName => self.handle_doctype_name_state(),
            // PUBLIC/SYSTEM identifier states are not part of this tokenizer's
            // DOCTYPE token (§3's Token shape carries only a name and a
            // force-quirks flag), so `AfterDOCTYPEName` falls straight through
            // to `BogusDOCTYPE` for anything past the name besides `>`.
            TokenizerState::AfterDOCTYPEName => self.handle_after_doctype_name_state(),
            TokenizerState::BogusDOCTYPE => self.handle_bogus_doctype_state(),
            TokenizerState::CharacterReference => self.handle_character_reference_state(),
            TokenizerState::NamedCharacterReference => {
                self.handle_named_character_reference_state()
            }
            TokenizerState::NumericCharacterReference => {
                self.handle_numeric_character_reference_state()
            }
        }
    }
}
