//! Form state and field validation
//!
//! Every form keeps raw input as typed and reports per-field messages. A form
//! is submittable only when `validate()` returns no errors.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;

use crate::error::Error;

static PHONE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{11,12}$").expect("valid phone pattern"));

static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email pattern")
});

/// Minimum password length accepted by the auth service
pub const MIN_PASSWORD_LEN: usize = 6;

/// Field name to message, ordered by field name
#[derive(Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<&'static str, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0.keys().copied()
    }

    /// `Ok(())` when empty, a validation error otherwise
    pub fn into_result(self) -> Result<(), Error> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation(self))
        }
    }
}

impl fmt::Debug for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.0.iter()).finish()
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in &self.0 {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{}: {}", field, message)?;
            first = false;
        }
        Ok(())
    }
}

/// Input is taken as typed: only the empty string is missing
fn require(errors: &mut FieldErrors, field: &'static str, value: &str, message: &str) {
    if value.is_empty() {
        errors.insert(field, message);
    }
}

pub fn is_valid_phone(value: &str) -> bool {
    PHONE.is_match(value)
}

pub fn is_valid_email(value: &str) -> bool {
    EMAIL.is_match(value)
}

/// Inputs of the new-listing form
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CarField {
    Name,
    Model,
    Year,
    KmRodado,
    Valor,
    Cidade,
    Whatsapp,
    Descricao,
}

impl CarField {
    pub const ALL: [CarField; 8] = [
        CarField::Name,
        CarField::Model,
        CarField::Year,
        CarField::KmRodado,
        CarField::Valor,
        CarField::Cidade,
        CarField::Whatsapp,
        CarField::Descricao,
    ];

    /// Input name, also the stored document field
    pub fn key(self) -> &'static str {
        match self {
            CarField::Name => "name",
            CarField::Model => "model",
            CarField::Year => "year",
            CarField::KmRodado => "kmRodado",
            CarField::Valor => "valor",
            CarField::Cidade => "cidade",
            CarField::Whatsapp => "whatsapp",
            CarField::Descricao => "descricao",
        }
    }

    fn required_message(self) -> &'static str {
        match self {
            CarField::Name => "O campo nome é obrigatório.",
            CarField::Model => "O campo modelo é obrigatório.",
            CarField::Year => "O ano do carro é obrigatório.",
            CarField::KmRodado => "Quilometragem obrigatória.",
            CarField::Valor => "O campo valor do carro é obrigatório.",
            CarField::Cidade => "O campo Cidade é obrigatório.",
            CarField::Whatsapp => "O campo telefone é obrigatório.",
            CarField::Descricao => "O campo descrição é obrigatório.",
        }
    }
}

/// The new-listing form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CarForm {
    pub name: String,
    pub model: String,
    pub year: String,
    pub km_rodado: String,
    pub valor: String,
    pub cidade: String,
    pub whatsapp: String,
    pub descricao: String,
}

impl CarForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: CarField) -> &str {
        match field {
            CarField::Name => &self.name,
            CarField::Model => &self.model,
            CarField::Year => &self.year,
            CarField::KmRodado => &self.km_rodado,
            CarField::Valor => &self.valor,
            CarField::Cidade => &self.cidade,
            CarField::Whatsapp => &self.whatsapp,
            CarField::Descricao => &self.descricao,
        }
    }

    pub fn set(&mut self, field: CarField, value: impl Into<String>) {
        let value = value.into();
        match field {
            CarField::Name => self.name = value,
            CarField::Model => self.model = value,
            CarField::Year => self.year = value,
            CarField::KmRodado => self.km_rodado = value,
            CarField::Valor => self.valor = value,
            CarField::Cidade => self.cidade = value,
            CarField::Whatsapp => self.whatsapp = value,
            CarField::Descricao => self.descricao = value,
        }
    }

    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        for field in CarField::ALL {
            require(&mut errors, field.key(), self.get(field), field.required_message());
        }
        if !self.whatsapp.is_empty() && !is_valid_phone(&self.whatsapp) {
            errors.insert(CarField::Whatsapp.key(), "Número de telefone inválido.");
        }
        errors
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// The sign-up form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl RegisterForm {
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        require(&mut errors, "name", &self.name, "O campo nome é obrigatório.");
        require(&mut errors, "email", &self.email, "O campo email é obrigatório.");
        if !self.email.trim().is_empty() && !is_valid_email(self.email.trim()) {
            errors.insert("email", "Insira um email válido");
        }
        require(&mut errors, "password", &self.password, "O campo senha é obrigatório.");
        if !self.password.is_empty() && self.password.chars().count() < MIN_PASSWORD_LEN {
            errors.insert("password", "A senha deve ter pelo menos 6 caracteres.");
        }
        errors
    }
}

/// The sign-in form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        require(&mut errors, "email", &self.email, "O campo email é obrigatório.");
        if !self.email.trim().is_empty() && !is_valid_email(self.email.trim()) {
            errors.insert("email", "Insira um email válido");
        }
        require(&mut errors, "password", &self.password, "O campo senha é obrigatório.");
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> CarForm {
        CarForm {
            name: "Gol".into(),
            model: "1.0".into(),
            year: "2018".into(),
            km_rodado: "10000".into(),
            valor: "30000".into(),
            cidade: "Recife".into(),
            whatsapp: "81999998888".into(),
            descricao: "ok".into(),
        }
    }

    #[test]
    fn phone_pattern_accepts_11_or_12_digits() {
        assert!(is_valid_phone("81999998888"));
        assert!(is_valid_phone("081999998888"));
        assert!(!is_valid_phone("8199999888"));
        assert!(!is_valid_phone("0819999988889"));
        assert!(!is_valid_phone("81 99999888"));
    }

    #[test]
    fn empty_form_reports_every_field() {
        let errors = CarForm::new().validate();
        assert_eq!(errors.len(), CarField::ALL.len());
        assert_eq!(errors.get("whatsapp"), Some("O campo telefone é obrigatório."));
    }

    #[test]
    fn filled_form_is_valid() {
        assert!(filled().validate().is_empty());
    }

    #[test]
    fn whitespace_is_kept_as_typed() {
        let mut form = filled();
        form.set(CarField::Cidade, "   ");
        assert!(form.validate().get("cidade").is_none());

        form.set(CarField::Cidade, "");
        assert_eq!(form.validate().get("cidade"), Some("O campo Cidade é obrigatório."));
    }

    #[test]
    fn bad_phone_is_reported() {
        let mut form = filled();
        form.set(CarField::Whatsapp, "123");
        assert_eq!(form.validate().get("whatsapp"), Some("Número de telefone inválido."));
    }

    #[test]
    fn reset_clears_inputs() {
        let mut form = filled();
        form.reset();
        assert_eq!(form, CarForm::default());
    }

    #[test]
    fn register_checks_email_and_password() {
        let form = RegisterForm {
            name: "Ana".into(),
            email: "not-an-email".into(),
            password: "12345".into(),
        };
        let errors = form.validate();
        assert_eq!(errors.get("email"), Some("Insira um email válido"));
        assert!(errors.get("password").is_some());
        assert!(errors.get("name").is_none());
    }

    #[test]
    fn errors_convert_to_validation_error() {
        let err = LoginForm::default().validate().into_result().unwrap_err();
        assert!(matches!(err, Error::Validation(ref e) if e.len() == 2));
        assert!(err.to_string().contains("email: O campo email é obrigatório."));
    }
}
