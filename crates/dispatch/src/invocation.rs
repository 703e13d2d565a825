use fleet_common::{AccessLevel, BotHandle};

use crate::error::{Error, Result};

/// One tokenized command line plus who sent it.
///
/// Tokens are whitespace-delimited; token 0 is the verb. The raw line is
/// kept so handlers can take a free-text tail with its inner spacing intact.
#[derive(Debug, Clone)]
pub struct Invocation {
    raw: String,
    tokens: Vec<String>,
    access: AccessLevel,
    origin: BotHandle,
    caller_id: u64,
}

impl Invocation {
    pub fn parse(
        message: &str,
        access: AccessLevel,
        origin: BotHandle,
        caller_id: u64,
    ) -> Result<Self> {
        let tokens: Vec<String> = message.split_whitespace().map(str::to_string).collect();
        if tokens.is_empty() {
            return Err(Error::EmptyMessage);
        }
        Ok(Self {
            raw: message.to_string(),
            tokens,
            access,
            origin,
            caller_id,
        })
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn verb(&self) -> &str {
        &self.tokens[0]
    }

    pub fn token(&self, index: usize) -> Option<&str> {
        self.tokens.get(index).map(String::as_str)
    }

    /// Number of tokens, verb included.
    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    pub fn access(&self) -> AccessLevel {
        self.access
    }

    pub fn origin(&self) -> &BotHandle {
        &self.origin
    }

    pub fn caller_id(&self) -> u64 {
        self.caller_id
    }

    /// Tokens from `from` onward joined with `delimiter`. Empty when `from`
    /// is past the end.
    pub fn joined(&self, from: usize, delimiter: &str) -> String {
        self.tokens
            .get(from..)
            .map(|rest| rest.join(delimiter))
            .unwrap_or_default()
    }

    /// Raw text after skipping `skip` tokens, trimmed at both ends.
    pub fn tail(&self, skip: usize) -> &str {
        tail_after(&self.raw, skip)
    }
}

/// Raw text of `text` after its first `skip` whitespace-delimited tokens.
pub fn tail_after(text: &str, skip: usize) -> &str {
    let mut rest = text.trim_start();
    for _ in 0..skip {
        match rest.find(char::is_whitespace) {
            Some(idx) => rest = rest[idx..].trim_start(),
            None => return "",
        }
    }
    rest.trim_end()
}

/// The positional parameters a handler sees, after the verb and any
/// target-name tokens have been consumed.
#[derive(Debug, Clone, Copy)]
pub struct Params<'a> {
    invocation: &'a Invocation,
    start: usize,
}

impl<'a> Params<'a> {
    pub fn new(invocation: &'a Invocation, start: usize) -> Self {
        Self { invocation, start }
    }

    pub fn len(&self) -> usize {
        self.invocation.token_count().saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: usize) -> Option<&'a str> {
        self.invocation.token(self.start + index)
    }

    pub fn require(&self, index: usize) -> Result<&'a str> {
        self.get(index).ok_or(Error::MissingArgument { index })
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a str> + 'a {
        let invocation = self.invocation;
        (self.start..invocation.token_count()).filter_map(move |i| invocation.token(i))
    }

    /// Parameters from `from` onward joined with `delimiter`.
    pub fn joined(&self, from: usize, delimiter: &str) -> String {
        self.invocation.joined(self.start + from, delimiter)
    }

    /// Raw text from parameter `from` to the end of the line.
    pub fn tail(&self, from: usize) -> &'a str {
        if self.start + from >= self.invocation.token_count() {
            return "";
        }
        self.invocation.tail(self.start + from)
    }
}
