//! Literal decoding for plan arguments.
//!
//! Planners write arguments the way they would in a Python call:
//! `'single'` or `"double"` quoted strings, `True`/`False`/`None`, numbers,
//! lists, tuples and dicts. Anything that is not a complete literal is kept
//! as the raw text.

use serde_json::{Map, Number, Value};

/// Decode `text` as a literal, falling back to the raw string.
pub fn literal_or_raw(text: &str) -> Value {
    parse_literal(text).unwrap_or_else(|| Value::String(text.to_string()))
}

/// Decode `text` as a literal. A bare comma-separated sequence decodes as a
/// tuple (array).
pub fn parse_literal(text: &str) -> Option<Value> {
    let mut cursor = Cursor {
        chars: text.chars().collect(),
        pos: 0,
    };

    cursor.skip_ws();
    let first = cursor.value()?;
    cursor.skip_ws();

    let value = if cursor.peek() == Some(',') {
        let mut items = vec![first];
        while cursor.eat(',') {
            cursor.skip_ws();
            if cursor.at_end() {
                break;
            }
            items.push(cursor.value()?);
            cursor.skip_ws();
        }
        Value::Array(items)
    } else {
        first
    };

    cursor.skip_ws();
    cursor.at_end().then_some(value)
}

struct Cursor {
    chars: Vec<char>,
    pos: usize,
}

impl Cursor {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn value(&mut self) -> Option<Value> {
        match self.peek()? {
            quote @ ('\'' | '"') => self.string(quote).map(Value::String),
            '[' => self.sequence('[', ']'),
            '(' => self.tuple(),
            '{' => self.dict(),
            c if c.is_ascii_digit() || c == '-' || c == '+' || c == '.' => self.number(),
            c if c.is_alphabetic() => self.keyword(),
            _ => None,
        }
    }

    fn string(&mut self, quote: char) -> Option<String> {
        self.pos += 1;
        let mut out = String::new();
        loop {
            let c = self.peek()?;
            self.pos += 1;
            match c {
                '\\' => {
                    let escaped = self.peek()?;
                    self.pos += 1;
                    match escaped {
                        'n' => out.push('\n'),
                        't' => out.push('\t'),
                        'r' => out.push('\r'),
                        '0' => out.push('\0'),
                        '\\' | '\'' | '"' => out.push(escaped),
                        other => {
                            out.push('\\');
                            out.push(other);
                        }
                    }
                }
                c if c == quote => return Some(out),
                c => out.push(c),
            }
        }
    }

    fn number(&mut self) -> Option<Value> {
        let start = self.pos;
        if matches!(self.peek(), Some('-' | '+')) {
            self.pos += 1;
        }
        let mut is_float = false;
        while let Some(c) = self.peek() {
            match c {
                '0'..='9' | '_' => {}
                '.' | 'e' | 'E' => is_float = true,
                '-' | '+' if matches!(self.chars.get(self.pos - 1), Some('e' | 'E')) => {}
                _ => break,
            }
            self.pos += 1;
        }

        let literal: String = self.chars[start..self.pos]
            .iter()
            .filter(|c| **c != '_')
            .collect();
        if !is_float && let Ok(int) = literal.parse::<i64>() {
            return Some(Value::Number(int.into()));
        }
        let float = literal.parse::<f64>().ok()?;
        Number::from_f64(float).map(Value::Number)
    }

    fn keyword(&mut self) -> Option<Value> {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_alphanumeric() || c == '_') {
            self.pos += 1;
        }
        let word: String = self.chars[start..self.pos].iter().collect();
        match word.as_str() {
            "True" => Some(Value::Bool(true)),
            "False" => Some(Value::Bool(false)),
            "None" => Some(Value::Null),
            _ => None,
        }
    }

    /// Comma-separated values between `open` and `close`, trailing comma allowed.
    fn items(&mut self, open: char, close: char) -> Option<(Vec<Value>, bool)> {
        if !self.eat(open) {
            return None;
        }
        let mut items = Vec::new();
        let mut saw_comma = false;
        loop {
            self.skip_ws();
            if self.eat(close) {
                return Some((items, saw_comma));
            }
            items.push(self.value()?);
            self.skip_ws();
            if self.eat(',') {
                saw_comma = true;
            } else if self.eat(close) {
                return Some((items, saw_comma));
            } else {
                return None;
            }
        }
    }

    fn sequence(&mut self, open: char, close: char) -> Option<Value> {
        self.items(open, close).map(|(items, _)| Value::Array(items))
    }

    /// `(x)` is just `x`; `(x,)` and `(x, y)` are tuples.
    fn tuple(&mut self) -> Option<Value> {
        let (mut items, saw_comma) = self.items('(', ')')?;
        if items.len() == 1 && !saw_comma {
            return items.pop();
        }
        Some(Value::Array(items))
    }

    fn dict(&mut self) -> Option<Value> {
        self.eat('{');
        let mut map = Map::new();
        loop {
            self.skip_ws();
            if self.eat('}') {
                return Some(Value::Object(map));
            }
            let key = match self.value()? {
                Value::String(key) => key,
                other => other.to_string(),
            };
            self.skip_ws();
            if !self.eat(':') {
                return None;
            }
            self.skip_ws();
            let value = self.value()?;
            map.insert(key, value);
            self.skip_ws();
            if !self.eat(',') {
                self.skip_ws();
                return self.eat('}').then_some(Value::Object(map));
            }
        }
    }
}
