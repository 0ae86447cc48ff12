//! Per-step answer validation, run before anything is written to the store.
//!
//! A failed validation blocks navigation; the form and history are left
//! untouched so the user can correct the field inline.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::ValidationError;
use crate::graph::{Question, QuestionKind};
use crate::wizard::form::AnswerValue;

/// Minimum length for free-text contact fields like the name.
const MIN_NAME_LEN: usize = 2;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"));

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[0-9][0-9 \-()]{6,18}$").expect("valid phone regex"));

static POSTCODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9 \-]{1,9}$").expect("valid postcode regex"));

/// Validate an answer against the step that collected it.
pub fn validate_answer(question: &Question, answer: &AnswerValue) -> Result<(), ValidationError> {
    match question.kind {
        QuestionKind::SingleSelect | QuestionKind::AiRecommendation => {
            let value = answer.as_text().ok_or(ValidationError::KindMismatch {
                expected: question.kind.to_string(),
            })?;
            require_known_option(question, value)
        }
        QuestionKind::MultiSelect => {
            let values = answer.as_multi().ok_or(ValidationError::KindMismatch {
                expected: question.kind.to_string(),
            })?;
            if values.is_empty() {
                return Err(ValidationError::Missing);
            }
            for value in values {
                require_known_option(question, value)?;
            }
            Ok(())
        }
        QuestionKind::Slider => {
            let value = answer.as_number().ok_or(ValidationError::KindMismatch {
                expected: question.kind.to_string(),
            })?;
            match question.slider {
                Some(slider) if value < slider.min || value > slider.max => {
                    Err(ValidationError::OutOfRange {
                        value,
                        min: slider.min,
                        max: slider.max,
                    })
                }
                _ => Ok(()),
            }
        }
        QuestionKind::ContactFields => {
            let fields = answer.as_fields().ok_or(ValidationError::KindMismatch {
                expected: question.kind.to_string(),
            })?;
            for name in &question.fields {
                let value = fields
                    .get(name)
                    .map(|v| v.trim())
                    .filter(|v| !v.is_empty())
                    .ok_or_else(|| ValidationError::Field {
                        field: name.clone(),
                        message: "is required".to_string(),
                    })?;
                validate_contact_field(name, value)?;
            }
            Ok(())
        }
        QuestionKind::LocationSelect => {
            let value = answer.as_text().ok_or(ValidationError::KindMismatch {
                expected: question.kind.to_string(),
            })?;
            if value.trim().is_empty() {
                return Err(ValidationError::Missing);
            }
            // Location steps without options accept free-form place names.
            if question.options.is_empty() {
                Ok(())
            } else {
                require_known_option(question, value)
            }
        }
        QuestionKind::Terminal => Ok(()),
    }
}

fn require_known_option(question: &Question, value: &str) -> Result<(), ValidationError> {
    if question.options.iter().any(|o| o.value == value) {
        Ok(())
    } else {
        Err(ValidationError::UnknownOption {
            value: value.to_string(),
        })
    }
}

fn validate_contact_field(name: &str, value: &str) -> Result<(), ValidationError> {
    let fail = |message: &str| {
        Err(ValidationError::Field {
            field: name.to_string(),
            message: message.to_string(),
        })
    };
    match name {
        "email" => {
            if EMAIL_RE.is_match(value) {
                Ok(())
            } else {
                fail("is not a valid email address")
            }
        }
        "phone" => {
            if PHONE_RE.is_match(value) {
                Ok(())
            } else {
                fail("is not a valid phone number")
            }
        }
        "postcode" => {
            if POSTCODE_RE.is_match(value) {
                Ok(())
            } else {
                fail("is not a valid postcode")
            }
        }
        _ => {
            if value.chars().count() >= MIN_NAME_LEN {
                Ok(())
            } else {
                fail("is too short")
            }
        }
    }
}
