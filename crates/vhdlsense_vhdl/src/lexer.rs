//! VHDL tokenizer.
//!
//! A hand-written scanner with unbounded lookahead and checkpoint/backtrack
//! support. `scan` advances by one token; `peek(n)` lazily reads ahead into
//! a queue without advancing; `add_checkpoint`/`backtrack` snapshot and
//! replay the stream so the parser can try a production and change its mind.
//!
//! The tokenizer never fails. Non-conforming lexemes produce a diagnostic
//! and either a substituted canonical token (`!=` becomes `/=`, `{` becomes
//! `(`, ...) or an [`Kind::Invalid`] token the parser treats as skippable
//! filler.

use std::collections::VecDeque;

use vhdlsense_base::{Diagnostic, Location, Position, StringTable, Symbol};

use crate::chars::{is_digit, is_graphic_character, CharacterStream};
use crate::token::{keyword_from_str, Kind, Token, Version};

const LSQUARE: &str = "'[' is not a valid vhdl character. Use '(' instead";
const RSQUARE: &str = "']' is not a valid vhdl character. Use ')' instead";
const NOT_EQ: &str = "'!=' is not a valid vhdl operator. Use '/=' instead";
const EQ_EQ: &str = "'==' is not used to compare in vhdl. Use '=' instead";
const HASH_BASE: &str = "'#' is used to define a base literal and it must be preceded by a base";
const LBRACKET: &str = "'{' is not a valid vhdl character. Use '(' instead";
const RBRACKET: &str = "'}' is not a valid vhdl character. Use ')' instead";
const XOR_CARET: &str = "'^' is not a valid vhdl operator. Use 'xor' instead";
const NOT_TILDA: &str = "'~' is not a valid vhdl operator. Use 'not' instead";
const QUESTION_MARK: &str = "'?' can only be used in strings or comments";
const TOOL_DIRECTIVE: &str = "Tool directives are ignored";
const DOLLAR_SIGN: &str = "'$' can only be used in strings or comments";
const AT_SIGN: &str = "'@' can only be used in strings or comments";
const VHDL87_EXT_ID: &str = "extended identifiers not allowed in vhdl87";
const ID_START_UNDER: &str = "Identifier cannot start with '_'";
const UNTERM_STR: &str = "Unterminated string.";
const MULTILINE_STR: &str = "Multi line string not allowed.";
const FMT_EFFECT_STR: &str = "Format effector not allowed in a string.";
const GRAPHIC_CHAR: &str = "Expected a graphic character here";
const GRAPHIC_STR: &str = "Invalid character in string.";
const UNTERM_XID: &str = "Unterminated extended identifier.";
const MULTILINE_XID: &str = "Multi line extended identifier not allowed.";
const FMT_EFFECT_XID: &str = "Format effector not allowed in a extended identifier.";
const GRAPHIC_XID: &str = "Invalid character in extended identifier.";
const UNTERM_BSTR: &str = "Unterminated bit string.";
const MULTILINE_BSTR: &str = "Multi line bit string not allowed.";
const FMT_EFFECT_BSTR: &str = "Format effector not allowed in a bit string.";
const GRAPHIC_BSTR: &str = "Invalid character in bit string.";

/// Parameters for [`Lexer::look_for`]: scan ahead until one of `look` is
/// seen at nesting depth `depth` (true), one of `stop` is seen at that depth
/// (false), `abort` or end of file is seen anywhere (false). Nesting is
/// tracked between `nest_in` and `nest_out`.
#[derive(Clone, Copy)]
pub struct LookParams {
    pub look: [Kind; 4],
    pub stop: [Kind; 4],
    pub abort: Kind,
    pub nest_in: Kind,
    pub nest_out: Kind,
    pub depth: u32,
}

pub struct Lexer<'src, 'st> {
    version: Version,
    strings: &'st mut StringTable,
    diagnostics: Vec<Diagnostic>,
    cs: CharacterStream<'src>,

    // kind and location of the last token to come out of `lex_one`, which
    // runs ahead of the scan position whenever lookahead is active
    last_lexed: Kind,
    loc: Location,

    lookahead: VecDeque<Token>,
    current: Token,
    previous: Token,

    filename: Symbol,
    checkpoints: Vec<Vec<Token>>,
}

impl<'src, 'st> Lexer<'src, 'st> {
    pub fn new(
        src: &'src [u8],
        strings: &'st mut StringTable,
        filename: &str,
        version: Version,
    ) -> Self {
        let filename = strings.intern_str(filename);
        Lexer {
            version,
            strings,
            diagnostics: Vec::new(),
            cs: CharacterStream::new(src),
            last_lexed: Kind::Invalid,
            loc: Location::at_start_of(filename),
            lookahead: VecDeque::new(),
            current: Token::default(),
            previous: Token::default(),
            filename,
            checkpoints: Vec::new(),
        }
    }

    /// Advance one token. The previous current token stays reachable through
    /// [`previous_token`] (lookback of one).
    ///
    /// [`previous_token`]: Lexer::previous_token
    pub fn scan(&mut self) -> Token {
        self.peek(1);

        if let Some(frame) = self.checkpoints.last_mut() {
            frame.push(self.current);
        }

        self.previous = self.current;
        self.current = self.lookahead.pop_front().expect("peek filled the queue");
        self.current
    }

    /// Peek the nth token without advancing. `peek(0)` is the current token.
    pub fn peek(&mut self, nth: usize) -> Token {
        if nth == 0 {
            return self.current;
        }
        while self.lookahead.len() < nth {
            let t = self.lex_one();
            self.lookahead.push_back(t);
        }
        self.lookahead[nth - 1]
    }

    /// Structured lookahead over the peek buffer. See [`LookParams`].
    pub fn look_for(&mut self, params: &LookParams) -> bool {
        let mut nest = 0u32;
        for n in 0.. {
            let kind = self.peek(n).kind;

            if kind == Kind::Eof || kind == params.abort {
                return false;
            }
            if kind == params.nest_in {
                nest += 1;
            }
            if nest == params.depth {
                if params.look.contains(&kind) {
                    return true;
                }
                if params.stop.contains(&kind) {
                    return false;
                }
            }
            if kind == params.nest_out && nest > 0 {
                nest -= 1;
            }
        }
        false
    }

    /// Begin recording scans so they can be replayed by [`backtrack`].
    /// Checkpoints nest.
    ///
    /// [`backtrack`]: Lexer::backtrack
    pub fn add_checkpoint(&mut self) {
        self.checkpoints.push(vec![self.previous, self.current]);
    }

    pub fn has_checkpoint(&self) -> bool {
        !self.checkpoints.is_empty()
    }

    /// Replay every token scanned since the last checkpoint and restore the
    /// current/previous pair. Does nothing without an active checkpoint.
    pub fn backtrack(&mut self) {
        let Some(frame) = self.checkpoints.pop() else {
            return;
        };
        if frame.len() <= 2 {
            return;
        }

        // frame: [previous, current, current-again, t1, t2, ...] where the
        // tail records each token that was current when a scan happened
        self.lookahead.push_front(self.current);
        for t in frame[3..].iter().rev() {
            self.lookahead.push_front(*t);
        }
        self.current = frame[1];
        self.previous = frame[0];
    }

    /// Drop the last checkpoint. A nested frame's recording is appended to
    /// its parent so an outer backtrack still replays everything.
    pub fn drop_checkpoint(&mut self) {
        let Some(mut frame) = self.checkpoints.pop() else {
            return;
        };
        if let Some(parent) = self.checkpoints.last_mut() {
            parent.extend(frame.drain(2..));
        }
    }

    pub fn current_token(&self) -> Token {
        self.current
    }

    pub fn previous_token(&self) -> Token {
        self.previous
    }

    pub fn filename(&self) -> Symbol {
        self.filename
    }

    pub fn current_line(&self) -> u32 {
        self.current.location.begin.line
    }

    pub fn current_column(&self) -> u32 {
        self.current.location.begin.column
    }

    pub fn current_location(&self) -> Location {
        self.current.location
    }

    pub fn current_position(&self) -> Position {
        self.current.location.begin
    }

    pub fn previous_location(&self) -> Location {
        self.previous.location
    }

    /// Identifier/literal text of the current token.
    pub fn identifier_text(&self) -> String {
        self.strings.resolve(self.current.value).to_string()
    }

    /// String/character content of the current token, without the brackets.
    pub fn string_text(&self) -> String {
        let s = self.strings.resolve(self.current.value);
        match self.current.kind {
            Kind::StringLiteral | Kind::Character if s.len() >= 2 => {
                s[1..s.len() - 1].to_string()
            }
            _ => s.to_string(),
        }
    }

    pub fn strings(&mut self) -> &mut StringTable {
        self.strings
    }

    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    fn diagnose(&mut self, msg: &'static str) {
        self.diagnostics.push(Diagnostic::new(msg, self.loc));
    }

    fn lex_one(&mut self) -> Token {
        while !self.cs.end_of_stream() {
            self.loc.step();

            match self.cs.current_char() {
                b'_' => {
                    self.diagnose(ID_START_UNDER);
                    return self.lex_identifier_or_keyword_or_bitstring();
                }
                c if c.is_ascii_alphabetic() => {
                    return self.lex_identifier_or_keyword_or_bitstring();
                }
                c if is_digit(c) => return self.lex_number(),

                b'"' => return self.lex_string(),

                b'#' => {
                    self.cs.next();
                    self.loc.columns(1);
                    self.diagnose(HASH_BASE);
                }

                b'&' => return self.delimiter(Kind::Concat, 1),

                b'\'' => {
                    if self.cs.look_ahead(2) == b'\'' {
                        match self.last_lexed {
                            Kind::RightSquare
                            | Kind::RightPar
                            | Kind::KwAll
                            | Kind::Identifier => {}
                            _ => return self.lex_character(),
                        }
                    }
                    return self.delimiter(Kind::Tick, 1);
                }

                b'(' => return self.delimiter(Kind::LeftPar, 1),
                b')' => return self.delimiter(Kind::RightPar, 1),

                b'*' => {
                    if self.cs.next_char() == b'*' {
                        return self.delimiter(Kind::Pow, 2);
                    }
                    return self.delimiter(Kind::Times, 1);
                }

                b'+' => return self.delimiter(Kind::Plus, 1),
                b',' => return self.delimiter(Kind::Comma, 1),

                b'-' => {
                    if self.cs.next_char() != b'-' {
                        return self.delimiter(Kind::Minus, 1);
                    }
                    // comment
                    self.cs.skip_to_eol();
                }

                b'.' => return self.delimiter(Kind::Dot, 1),

                b'/' => {
                    if self.cs.next_char() == b'=' {
                        return self.delimiter(Kind::Ne, 2);
                    }
                    return self.delimiter(Kind::Div, 1);
                }

                b':' => {
                    if self.cs.next_char() == b'=' {
                        return self.delimiter(Kind::ColonEq, 2);
                    }
                    return self.delimiter(Kind::Colon, 1);
                }

                b';' => return self.delimiter(Kind::Semicolon, 1),

                b'<' => match self.cs.next_char() {
                    b'=' => return self.delimiter(Kind::Lte, 2),
                    b'>' => return self.delimiter(Kind::Box, 2),
                    _ => return self.delimiter(Kind::Lt, 1),
                },

                b'=' => match self.cs.next_char() {
                    b'>' => return self.delimiter(Kind::RightArrow, 2),
                    b'=' => {
                        self.cs.advance(2);
                        self.loc.columns(2);
                        self.diagnose(EQ_EQ);
                        return self.delimiter(Kind::Eq, 0);
                    }
                    _ => return self.delimiter(Kind::Eq, 1),
                },

                b'>' => {
                    if self.cs.next_char() == b'=' {
                        return self.delimiter(Kind::Gte, 2);
                    }
                    return self.delimiter(Kind::Gt, 1);
                }

                b'[' => {
                    if self.version == Version::Vhdl87 {
                        self.cs.next();
                        self.loc.columns(1);
                        self.diagnose(LSQUARE);
                        return self.delimiter(Kind::LeftPar, 0);
                    }
                    return self.delimiter(Kind::LeftSquare, 1);
                }

                b']' => {
                    if self.version == Version::Vhdl87 {
                        self.cs.next();
                        self.loc.columns(1);
                        self.diagnose(RSQUARE);
                        return self.delimiter(Kind::RightPar, 0);
                    }
                    return self.delimiter(Kind::RightSquare, 1);
                }

                b'|' => return self.delimiter(Kind::Bar, 1),

                b' ' | b'\t' | 0xA0 => {
                    self.cs.next();
                    self.loc.columns(1);
                }

                b'\r' => {
                    if self.cs.next_char() == b'\n' {
                        self.cs.next();
                    }
                    self.loc.lines(1);
                    self.cs.next();
                }

                b'\n' | 0x0B | 0x0C => {
                    // one or more format effectors cause at least one end of
                    // line
                    self.loc.lines(1);
                    self.cs.next();
                }

                b'!' => {
                    if self.cs.next_char() == b'=' {
                        self.cs.advance(2);
                        self.loc.columns(2);
                        self.diagnose(NOT_EQ);
                        return self.delimiter(Kind::Ne, 0);
                    }
                    // LRM93 13.10: a vertical line used as a delimiter can be
                    // replaced by an exclamation mark
                    return self.delimiter(Kind::Bar, 1);
                }

                b'%' => {
                    // LRM93 13.10: % can replace the string brackets
                    return self.lex_string();
                }

                b'{' => {
                    self.cs.next();
                    self.loc.columns(1);
                    self.diagnose(LBRACKET);
                    return self.delimiter(Kind::LeftPar, 0);
                }

                b'}' => {
                    self.cs.next();
                    self.loc.columns(1);
                    self.diagnose(RBRACKET);
                    return self.delimiter(Kind::RightPar, 0);
                }

                b'\\' => {
                    if self.version == Version::Vhdl87 {
                        self.diagnose(VHDL87_EXT_ID);
                    }
                    return self.lex_extended_identifier();
                }

                b'^' => {
                    self.cs.next();
                    self.loc.columns(1);
                    self.diagnose(XOR_CARET);
                    return self.keyword(Kind::KwXor);
                }

                b'~' => {
                    self.cs.next();
                    self.loc.columns(1);
                    self.diagnose(NOT_TILDA);
                    return self.keyword(Kind::KwNot);
                }

                b'?' => {
                    self.cs.next();
                    self.loc.columns(1);
                    self.diagnose(QUESTION_MARK);
                }

                b'`' => {
                    self.cs.next();
                    self.loc.columns(1);
                    self.diagnose(TOOL_DIRECTIVE);
                    self.cs.skip_to_eol();
                }

                b'$' => {
                    self.cs.next();
                    self.loc.columns(1);
                    self.diagnose(DOLLAR_SIGN);
                }

                b'@' => {
                    self.cs.next();
                    self.loc.columns(1);
                    self.diagnose(AT_SIGN);
                }

                _ => {
                    self.cs.next();
                    self.loc.columns(1);
                }
            }
        }

        self.loc.step();
        self.last_lexed = Kind::Eof;
        Token::eof(self.loc)
    }

    // LRM93 13.6
    //
    // string_literal ::= " { graphic_character } "
    fn lex_string(&mut self) -> Token {
        let quote = self.cs.current_char();
        debug_assert!(quote == b'"' || quote == b'%');

        let mut str = vec![quote];

        loop {
            self.cs.next();
            self.loc.columns(1);

            if self.cs.end_of_stream() {
                self.diagnose(UNTERM_STR);
                self.last_lexed = Kind::Invalid;
                return Token::invalid(self.loc);
            }

            let c = self.cs.current_char();
            match c {
                b'%' | b'"' if c == quote => {
                    if self.cs.next_char() != quote {
                        str.push(c);
                        self.cs.next();
                        self.loc.columns(1);
                        return self.literal(Kind::StringLiteral, &str);
                    }
                    // "" or %% inside a string counts as one " or one %
                    self.cs.next();
                    str.push(c);
                }
                b'\r' | b'\n' => {
                    self.diagnose(MULTILINE_STR);
                    self.last_lexed = Kind::Invalid;
                    return Token::invalid(self.loc);
                }
                0x0B | 0x0C | b'\t' => {
                    self.diagnose(FMT_EFFECT_STR);
                    self.last_lexed = Kind::Invalid;
                    return Token::invalid(self.loc);
                }
                _ => {
                    if !is_graphic_character(c) {
                        self.diagnose(GRAPHIC_STR);
                        continue;
                    }
                    str.push(c);
                }
            }
        }
    }

    // LRM93 13.5
    //
    // character_literal ::= ' graphic_character '
    fn lex_character(&mut self) -> Token {
        let c = self.cs.look_ahead(1);
        if is_graphic_character(c) {
            let buffer = [b'\'', c, b'\''];
            self.cs.advance(3);
            self.loc.columns(3);
            return self.literal(Kind::Character, &buffer);
        }

        self.diagnose(GRAPHIC_CHAR);
        self.last_lexed = Kind::Invalid;
        Token::invalid(self.loc)
    }

    // LRM93 13.3.2
    //
    // extended_identifier ::= \ graphic_character { graphic_character } \
    fn lex_extended_identifier(&mut self) -> Token {
        let mut str = vec![b'\\'];

        loop {
            self.cs.next();
            self.loc.columns(1);

            if self.cs.end_of_stream() {
                self.diagnose(UNTERM_XID);
                self.last_lexed = Kind::Invalid;
                return Token::invalid(self.loc);
            }

            let c = self.cs.current_char();
            match c {
                b'\\' => {
                    if self.cs.next_char() != b'\\' {
                        self.cs.next();
                        self.loc.columns(1);
                        return self.identifier(Kind::ExtendedIdentifier, &str);
                    }
                    // LRM93 13.3.2: a backslash in an extended identifier is
                    // written doubled
                    self.cs.next();
                    str.push(b'\\');
                }
                b'\r' | b'\n' => {
                    self.diagnose(MULTILINE_XID);
                    self.last_lexed = Kind::Invalid;
                    return Token::invalid(self.loc);
                }
                0x0B | 0x0C | b'\t' => {
                    self.diagnose(FMT_EFFECT_XID);
                    self.last_lexed = Kind::Invalid;
                    return Token::invalid(self.loc);
                }
                _ => {
                    if !is_graphic_character(c) {
                        self.diagnose(GRAPHIC_XID);
                        continue;
                    }
                    str.push(c);
                }
            }
        }
    }

    // LRM93 13.3
    //
    // basic_identifier ::= letter { [ underline ] letter_or_digit }
    fn lex_identifier_or_keyword_or_bitstring(&mut self) -> Token {
        let start = self.cs.get_position();
        let mut identifier: Vec<u8> = Vec::new();

        loop {
            let c = self.cs.current_char();
            let c = match c {
                b'A'..=b'Z' => c + 32,
                b'a'..=b'z' | b'0'..=b'9' | b'_' => c,
                b'"' | b'%' => {
                    if self.cs.get_position() - start == 1 {
                        // a single letter straight before a string bracket is
                        // a bit-string base specifier
                        self.cs.set_position(start);
                        return self.lex_bitstring();
                    }
                    return self.finish_identifier(&identifier);
                }
                _ => return self.finish_identifier(&identifier),
            };

            identifier.push(c);
            self.cs.next();
            self.loc.columns(1);
        }
    }

    fn finish_identifier(&mut self, identifier: &[u8]) -> Token {
        let text = std::str::from_utf8(identifier).unwrap_or("");
        match keyword_from_str(text) {
            Some(kind) => self.keyword(kind),
            None => self.identifier(Kind::Identifier, identifier),
        }
    }

    // LRM93 13.4
    //
    // decimal_literal ::= integer [ . integer ] [ exponent ]
    // based_literal ::= base # based_integer [ . based_integer ] # [ exponent ]
    fn lex_number(&mut self) -> Token {
        debug_assert!(is_digit(self.cs.current_char()));

        let mut str = Vec::new();
        self.lex_integer(&mut str);

        if self.cs.current_char() == b'#' {
            str.push(b'#');
            self.cs.next();
            self.loc.columns(1);
            self.lex_based_integer(&mut str);

            let mut is_integer = true;
            if self.cs.current_char() == b'.' {
                is_integer = false;
                str.push(b'.');
                self.cs.next();
                self.loc.columns(1);
                self.lex_based_integer(&mut str);
            }

            if self.cs.current_char() == b'#' {
                str.push(b'#');
                self.cs.next();
                self.loc.columns(1);
            }

            self.lex_exponent(&mut str);

            let kind = if is_integer { Kind::Integer } else { Kind::Real };
            return self.literal(kind, &str);
        }

        let mut is_integer = true;
        if self.cs.current_char() == b'.' && is_digit(self.cs.next_char()) {
            is_integer = false;
            str.push(b'.');
            self.cs.next();
            self.loc.columns(1);
            self.lex_integer(&mut str);
        }

        self.lex_exponent(&mut str);

        let kind = if is_integer { Kind::Integer } else { Kind::Real };
        self.literal(kind, &str)
    }

    fn lex_exponent(&mut self, str: &mut Vec<u8>) {
        let c = self.cs.current_char();
        if c != b'e' && c != b'E' {
            return;
        }
        str.push(c);
        self.cs.next();
        self.loc.columns(1);

        let sign = self.cs.current_char();
        if sign == b'+' || sign == b'-' {
            str.push(sign);
            self.cs.next();
            self.loc.columns(1);
        }

        self.lex_integer(str);
    }

    // LRM93 13.7
    //
    // bit_string_literal ::= base_specifier " [ bit_value ] "
    fn lex_bitstring(&mut self) -> Token {
        let base = self.cs.current_char();
        self.cs.next();
        self.loc.columns(1);

        let quote = self.cs.current_char();
        debug_assert!(quote == b'"' || quote == b'%');

        let mut str = vec![base, quote];

        loop {
            self.cs.next();
            self.loc.columns(1);

            if self.cs.end_of_stream() {
                self.diagnose(UNTERM_BSTR);
                self.last_lexed = Kind::Invalid;
                return Token::invalid(self.loc);
            }

            let c = self.cs.current_char();
            match c {
                b'%' | b'"' if c == quote => {
                    if self.cs.next_char() != quote {
                        str.push(c);
                        self.cs.next();
                        self.loc.columns(1);
                        return self.literal(Kind::BitString, &str);
                    }
                    self.cs.next();
                    str.push(c);
                }
                b'_' => {}
                b'\r' | b'\n' => {
                    self.diagnose(MULTILINE_BSTR);
                    self.last_lexed = Kind::Invalid;
                    return Token::invalid(self.loc);
                }
                0x0B | 0x0C | b'\t' => {
                    self.diagnose(FMT_EFFECT_BSTR);
                    self.last_lexed = Kind::Invalid;
                    return Token::invalid(self.loc);
                }
                _ => {
                    if !is_graphic_character(c) {
                        self.diagnose(GRAPHIC_BSTR);
                        continue;
                    }
                    str.push(c);
                }
            }
        }
    }

    fn lex_integer(&mut self, buffer: &mut Vec<u8>) {
        while !self.cs.end_of_stream() {
            let c = self.cs.current_char();
            if is_digit(c) {
                buffer.push(c);
            } else if c != b'_' {
                return;
            }
            self.cs.next();
            self.loc.columns(1);
        }
    }

    fn lex_based_integer(&mut self, buffer: &mut Vec<u8>) {
        while !self.cs.end_of_stream() {
            let c = self.cs.current_char();
            if is_digit(c) || c.is_ascii_hexdigit() {
                buffer.push(c);
            } else if c != b'_' {
                return;
            }
            self.cs.next();
            self.loc.columns(1);
        }
    }

    fn delimiter(&mut self, kind: Kind, width: i32) -> Token {
        if width > 0 {
            self.cs.advance(width as usize);
            self.loc.columns(width);
        }
        self.last_lexed = kind;
        let value = self.strings.intern_str(kind.text());
        Token::new(kind, value, self.loc)
    }

    fn keyword(&mut self, kind: Kind) -> Token {
        self.last_lexed = kind;
        let value = self.strings.intern_str(kind.text());
        Token::new(kind, value, self.loc)
    }

    fn identifier(&mut self, kind: Kind, bytes: &[u8]) -> Token {
        self.last_lexed = kind;
        let value = self.strings.intern(bytes);
        Token::new(kind, value, self.loc)
    }

    fn literal(&mut self, kind: Kind, bytes: &[u8]) -> Token {
        self.last_lexed = kind;
        let value = self.strings.intern(bytes);
        Token::new(kind, value, self.loc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens_of(src: &str) -> (Vec<Token>, Vec<Diagnostic>, StringTable) {
        let mut st = StringTable::new();
        let mut lexer = Lexer::new(src.as_bytes(), &mut st, "test.vhd", Version::Vhdl93);
        let mut out = Vec::new();
        loop {
            let t = lexer.scan();
            if t.kind == Kind::Eof {
                break;
            }
            out.push(t);
        }
        let diags = lexer.take_diagnostics();
        (out, diags, st)
    }

    fn kinds_of(src: &str) -> Vec<Kind> {
        tokens_of(src).0.iter().map(|t| t.kind).collect()
    }

    #[test]
    fn scans_keywords_and_identifiers() {
        assert_eq!(
            kinds_of("entity counter is"),
            vec![Kind::KwEntity, Kind::Identifier, Kind::KwIs]
        );
    }

    #[test]
    fn identifiers_are_lowercased_for_interning() {
        let (tokens, _, st) = tokens_of("Counter COUNTER counter");
        assert_eq!(tokens[0].value, tokens[1].value);
        assert_eq!(tokens[1].value, tokens[2].value);
        assert_eq!(st.resolve(tokens[0].value), "counter");
    }

    #[test]
    fn compound_delimiters() {
        assert_eq!(
            kinds_of("<= => := /= ** <> >="),
            vec![
                Kind::Lte,
                Kind::RightArrow,
                Kind::ColonEq,
                Kind::Ne,
                Kind::Pow,
                Kind::Box,
                Kind::Gte
            ]
        );
    }

    #[test]
    fn comments_are_skipped() {
        assert_eq!(
            kinds_of("a -- the rest is gone ; begin\nb"),
            vec![Kind::Identifier, Kind::Identifier]
        );
    }

    #[test]
    fn integer_and_real_literals() {
        assert_eq!(
            kinds_of("42 1_000 3.14 1e6 2.5e-3"),
            vec![Kind::Integer, Kind::Integer, Kind::Real, Kind::Integer, Kind::Real]
        );
    }

    #[test]
    fn based_literal_is_one_token() {
        let (tokens, diags, st) = tokens_of("16#CAFE_F00D#");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, Kind::Integer);
        assert_eq!(st.resolve(tokens[0].value), "16#CAFEF00D#");
        assert!(diags.is_empty());
    }

    #[test]
    fn string_with_doubled_quote_is_one_token() {
        let (tokens, diags, st) = tokens_of("\"ab\"\"cd\"");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, Kind::StringLiteral);
        assert_eq!(st.resolve(tokens[0].value), "\"ab\"cd\"");
        assert!(diags.is_empty());
    }

    #[test]
    fn unterminated_string_diagnoses_and_yields_invalid() {
        let (tokens, diags, _) = tokens_of("\"abc");
        assert_eq!(tokens[0].kind, Kind::Invalid);
        assert!(diags.iter().any(|d| d.message().contains("Unterminated")));
    }

    #[test]
    fn multiline_string_diagnoses() {
        let (tokens, diags, _) = tokens_of("\"ab\ncd\"");
        assert_eq!(tokens[0].kind, Kind::Invalid);
        assert!(diags.iter().any(|d| d.message().contains("Multi line")));
    }

    #[test]
    fn character_literal_vs_tick_disambiguation() {
        // after an identifier, 'x' is attribute tick syntax, not a character
        assert_eq!(
            kinds_of("clk'event"),
            vec![Kind::Identifier, Kind::Tick, Kind::Identifier]
        );
        // after <= it is a character literal
        assert_eq!(
            kinds_of("q <= '0'"),
            vec![Kind::Identifier, Kind::Lte, Kind::Character]
        );
    }

    #[test]
    fn bitstring_literals() {
        let (tokens, _, st) = tokens_of("b\"1010\" x\"FF\"");
        assert_eq!(tokens[0].kind, Kind::BitString);
        assert_eq!(tokens[1].kind, Kind::BitString);
        assert_eq!(st.resolve(tokens[0].value), "b\"1010\"");
    }

    #[test]
    fn extended_identifier_with_doubled_backslash() {
        let (tokens, _, st) = tokens_of("\\bus\\\\name\\");
        assert_eq!(tokens[0].kind, Kind::ExtendedIdentifier);
        assert_eq!(st.resolve(tokens[0].value), "\\bus\\name");
    }

    #[test]
    fn foreign_operators_are_substituted_with_diagnostics() {
        let (tokens, diags, _) = tokens_of("a != b == c");
        let kinds: Vec<Kind> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![Kind::Identifier, Kind::Ne, Kind::Identifier, Kind::Eq, Kind::Identifier]
        );
        assert_eq!(diags.len(), 2);
    }

    #[test]
    fn curly_braces_become_parens() {
        let (tokens, diags, _) = tokens_of("{ }");
        assert_eq!(tokens[0].kind, Kind::LeftPar);
        assert_eq!(tokens[1].kind, Kind::RightPar);
        assert_eq!(diags.len(), 2);
    }

    #[test]
    fn tool_directives_are_skipped_with_notice() {
        let (tokens, diags, _) = tokens_of("`protect begin\nsignal");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, Kind::KwSignal);
        assert!(diags.iter().any(|d| d.message().contains("directive")));
    }

    #[test]
    fn token_ranges_are_ordered_and_in_buffer() {
        let src = "entity e is\nend entity e;";
        let (tokens, _, _) = tokens_of(src);
        for t in &tokens {
            assert!(t.location.begin <= t.location.end, "{:?}", t);
            assert!(t.location.end.line as usize <= src.lines().count());
        }
    }

    #[test]
    fn peek_does_not_advance() {
        let mut st = StringTable::new();
        let mut lexer = Lexer::new(b"a b c", &mut st, "t.vhd", Version::Vhdl93);
        lexer.scan();
        let current = lexer.current_token();
        let peeked = lexer.peek(0);
        assert_eq!(current.kind, peeked.kind);
        assert_eq!(current.value, peeked.value);
        let next = lexer.peek(1);
        assert_eq!(lexer.current_token().value, current.value);
        let scanned = lexer.scan();
        assert_eq!(scanned.value, next.value);
    }

    #[test]
    fn previous_token_is_the_last_discarded() {
        let mut st = StringTable::new();
        let mut lexer = Lexer::new(b"a b", &mut st, "t.vhd", Version::Vhdl93);
        lexer.scan();
        let first = lexer.current_token();
        lexer.scan();
        assert_eq!(lexer.previous_token().value, first.value);
    }

    #[test]
    fn checkpoint_backtrack_replays_exactly() {
        let mut st = StringTable::new();
        let mut lexer = Lexer::new(b"id1 id2 ; id3", &mut st, "t.vhd", Version::Vhdl93);
        lexer.scan(); // current = id1

        lexer.add_checkpoint();
        let a = lexer.scan(); // id2
        let b = lexer.scan(); // ;
        lexer.backtrack();

        let a2 = lexer.scan();
        let b2 = lexer.scan();
        assert_eq!(a.kind, a2.kind);
        assert_eq!(a.value, a2.value);
        assert_eq!(a.location, a2.location);
        assert_eq!(b.kind, b2.kind);
        assert_eq!(b.location, b2.location);
    }

    #[test]
    fn checkpoint_backtrack_restores_current_and_previous() {
        let mut st = StringTable::new();
        let mut lexer = Lexer::new(b"x y z", &mut st, "t.vhd", Version::Vhdl93);
        lexer.scan();
        let cur = lexer.current_token();
        let prev = lexer.previous_token();

        lexer.add_checkpoint();
        lexer.scan();
        lexer.scan();
        lexer.backtrack();

        assert_eq!(lexer.current_token().value, cur.value);
        assert_eq!(lexer.previous_token().kind, prev.kind);
    }

    #[test]
    fn nested_checkpoint_drop_appends_to_parent() {
        let mut st = StringTable::new();
        let mut lexer = Lexer::new(b"a b c d e", &mut st, "t.vhd", Version::Vhdl93);
        lexer.scan(); // a

        lexer.add_checkpoint();
        let b = lexer.scan();
        lexer.add_checkpoint();
        let c = lexer.scan();
        lexer.drop_checkpoint();
        // outer backtrack must replay b and c
        lexer.backtrack();

        assert_eq!(lexer.scan().value, b.value);
        assert_eq!(lexer.scan().value, c.value);
    }

    #[test]
    fn look_for_finds_at_depth() {
        let mut st = StringTable::new();
        let mut lexer = Lexer::new(b"( a , b )", &mut st, "t.vhd", Version::Vhdl93);
        lexer.scan();
        let params = LookParams {
            look: [Kind::Comma, Kind::Invalid, Kind::Invalid, Kind::Invalid],
            stop: [Kind::RightPar, Kind::Invalid, Kind::Invalid, Kind::Invalid],
            abort: Kind::Semicolon,
            nest_in: Kind::LeftPar,
            nest_out: Kind::RightPar,
            depth: 1,
        };
        assert!(lexer.look_for(&params));
    }

    #[test]
    fn look_for_returns_false_on_eof_without_overreading() {
        let mut st = StringTable::new();
        let mut lexer = Lexer::new(b"a b", &mut st, "t.vhd", Version::Vhdl93);
        lexer.scan();
        let params = LookParams {
            look: [Kind::Comma, Kind::Invalid, Kind::Invalid, Kind::Invalid],
            stop: [Kind::Invalid; 4],
            abort: Kind::Semicolon,
            nest_in: Kind::LeftPar,
            nest_out: Kind::RightPar,
            depth: 0,
        };
        assert!(!lexer.look_for(&params));
        // scanning afterwards still works and terminates
        assert_eq!(lexer.scan().kind, Kind::Identifier);
        assert_eq!(lexer.scan().kind, Kind::Eof);
        assert_eq!(lexer.scan().kind, Kind::Eof);
    }

    #[test]
    fn nbsp_is_whitespace() {
        let src = [b'a', 0xA0, b'b'];
        let mut st = StringTable::new();
        let mut lexer = Lexer::new(&src, &mut st, "t.vhd", Version::Vhdl93);
        assert_eq!(lexer.scan().kind, Kind::Identifier);
        assert_eq!(lexer.scan().kind, Kind::Identifier);
    }

    #[test]
    fn exclamation_mark_is_a_bar() {
        assert_eq!(kinds_of("a ! b"), vec![Kind::Identifier, Kind::Bar, Kind::Identifier]);
    }

    #[test]
    fn percent_string_brackets() {
        let (tokens, _, st) = tokens_of("%abc%");
        assert_eq!(tokens[0].kind, Kind::StringLiteral);
        assert_eq!(st.resolve(tokens[0].value), "%abc%");
    }
}
