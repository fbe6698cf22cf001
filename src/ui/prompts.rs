//! Typed prompts
//!
//! Text fields with a fixed validator, label and error message: email,
//! integer and float, plus a masked password field.

use std::str::FromStr;

use super::text_field::TextField;
use super::validator::{EmailValidator, FloatValidator, IntegerValidator, Validator};
use crate::config::{FieldText, PromptConfig};
use crate::core::backend::TerminalBackend;
use crate::core::session::Session;
use crate::error::Result;

/// Typed prompts sharing one set of texts.
#[derive(Debug, Clone, Default)]
pub struct Prompts {
    config: PromptConfig,
}

impl Prompts {
    pub fn new(config: &PromptConfig) -> Self {
        Self { config: config.clone() }
    }

    pub fn email<B: TerminalBackend>(&self, session: &mut Session<B>) -> Result<String> {
        field(&self.config.email, EmailValidator).edit(session)
    }

    pub fn integer<B: TerminalBackend>(&self, session: &mut Session<B>) -> Result<i64> {
        parsed(field(&self.config.integer, IntegerValidator), session)
    }

    pub fn float<B: TerminalBackend>(&self, session: &mut Session<B>) -> Result<f64> {
        parsed(field(&self.config.float, FloatValidator), session)
    }

    /// Masked, unvalidated field. An empty `prompt` uses the configured one.
    pub fn password<B: TerminalBackend>(&self, session: &mut Session<B>, prompt: &str) -> Result<String> {
        let prompt = if prompt.is_empty() { self.config.password_prompt.as_str() } else { prompt };
        TextField::new(prompt)
            .mask(self.config.mask_byte())
            .edit(session)
    }
}

fn field<'a>(text: &FieldText, validator: impl Validator + 'a) -> TextField<'a> {
    TextField::new(&text.prompt)
        .validator(validator)
        .error_message(&text.error)
}

/// Edit until the value parses. The validator already accepts only parseable
/// input, so this normally loops once.
fn parsed<T: FromStr, B: TerminalBackend>(field: TextField<'_>, session: &mut Session<B>) -> Result<T> {
    loop {
        if let Ok(value) = field.edit(session)?.parse() {
            return Ok(value);
        }
    }
}

/// Email prompt with the default texts.
pub fn email<B: TerminalBackend>(session: &mut Session<B>) -> Result<String> {
    Prompts::default().email(session)
}

/// Integer prompt with the default texts.
pub fn integer<B: TerminalBackend>(session: &mut Session<B>) -> Result<i64> {
    Prompts::default().integer(session)
}

/// Float prompt with the default texts.
pub fn float<B: TerminalBackend>(session: &mut Session<B>) -> Result<f64> {
    Prompts::default().float(session)
}

/// Password prompt masked with `*`.
pub fn password<B: TerminalBackend>(session: &mut Session<B>, prompt: &str) -> Result<String> {
    Prompts::default().password(session, prompt)
}
