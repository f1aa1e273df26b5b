// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Field rules shared by every command that takes form-like input.
//!
//! Rules accumulate into a [`Validator`] so one call reports every bad field
//! at once. Optional fields that are empty always pass.

use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;

use crate::error::{AppError, FieldError};

static EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex"));
static PHONE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[0-9\s\-()]{8,20}$").expect("phone regex"));
static NPWP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{2}\.\d{3}\.\d{3}\.\d-\d{3}\.\d{3}|\d{15,16})$").expect("npwp regex")
});
static HS_CODE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{4}\.\d{2}(\.\d{2}){0,2}|\d{6}|\d{8}|\d{10})$").expect("hs code regex")
});

#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn check(&mut self, cond: bool, field: &str, message: &str) -> &mut Self {
        if !cond {
            self.errors.push(FieldError::new(field, message));
        }
        self
    }

    pub fn required(&mut self, field: &str, value: &str) -> &mut Self {
        self.check(!value.trim().is_empty(), field, "is required")
    }

    /// Length in characters, after trimming. Empty values are left to `required`.
    pub fn length(&mut self, field: &str, value: &str, min: usize, max: usize) -> &mut Self {
        let n = value.trim().chars().count();
        if n > 0 && (n < min || n > max) {
            self.errors.push(FieldError::new(
                field,
                format!("must be between {} and {} characters", min, max),
            ));
        }
        self
    }

    pub fn email(&mut self, field: &str, value: Option<&str>) -> &mut Self {
        self.pattern(field, value, &EMAIL, "invalid email address")
    }

    pub fn phone(&mut self, field: &str, value: Option<&str>) -> &mut Self {
        self.pattern(field, value, &PHONE, "invalid phone number")
    }

    pub fn npwp(&mut self, field: &str, value: Option<&str>) -> &mut Self {
        self.pattern(
            field,
            value,
            &NPWP,
            "invalid NPWP, expected NN.NNN.NNN.N-NNN.NNN",
        )
    }

    pub fn hs_code(&mut self, field: &str, value: &str) -> &mut Self {
        if value.trim().is_empty() {
            return self.required(field, value);
        }
        self.pattern(
            field,
            Some(value),
            &HS_CODE,
            "invalid HS code, expected NNNN.NN[.NN[.NN]]",
        )
    }

    pub fn percentage(&mut self, field: &str, value: Decimal) -> &mut Self {
        self.check(
            value >= Decimal::ZERO && value <= Decimal::ONE_HUNDRED,
            field,
            "must be between 0 and 100",
        )
    }

    pub fn non_negative(&mut self, field: &str, value: Decimal) -> &mut Self {
        self.check(value >= Decimal::ZERO, field, "must not be negative")
    }

    pub fn positive(&mut self, field: &str, value: Decimal) -> &mut Self {
        self.check(value > Decimal::ZERO, field, "must be greater than 0")
    }

    fn pattern(&mut self, field: &str, value: Option<&str>, re: &Regex, msg: &str) -> &mut Self {
        if let Some(v) = value.map(str::trim).filter(|v| !v.is_empty()) {
            if !re.is_match(v) {
                self.errors.push(FieldError::new(field, msg));
            }
        }
        self
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn finish(&mut self) -> Result<(), AppError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            let errors = std::mem::take(&mut self.errors);
            tracing::warn!(fields = errors.len(), "validation rejected input");
            Err(AppError::Validation(errors))
        }
    }
}

/// Contact fields common to customers and vendors.
pub struct ContactForm<'a> {
    pub name: &'a str,
    pub email: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub npwp: Option<&'a str>,
}

pub fn validate_contact(form: &ContactForm<'_>) -> Result<(), AppError> {
    Validator::new()
        .required("name", form.name)
        .length("name", form.name, 2, 100)
        .email("email", form.email)
        .phone("phone", form.phone)
        .npwp("npwp", form.npwp)
        .finish()
}
