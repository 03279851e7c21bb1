//! Interface of the form schemas that produce request bodies.
//!
//! The concrete field rules live with the forms. This module only fixes the shape every
//! schema shares, so call sites can look one up by [`FormKind`], validate a candidate and
//! turn the valid output into a [`RequestBody`].
//!
//! ```rust
//! use abeg_fetch::validation::{FormKind, Schema, SchemaRegistry, Validation, ValidationIssue};
//! use serde::Serialize;
//! use serde_json::{Value, json};
//!
//! #[derive(Serialize)]
//! struct ForgotPassword {
//!     email: String,
//! }
//!
//! struct ForgotPasswordSchema;
//!
//! impl Schema for ForgotPasswordSchema {
//!     type Output = ForgotPassword;
//!
//!     fn validate(&self, candidate: &Value) -> Validation<ForgotPassword> {
//!         match candidate["email"].as_str() {
//!             Some(email) if email.contains('@') => Validation::Valid(ForgotPassword {
//!                 email: email.trim().to_lowercase(),
//!             }),
//!             _ => Validation::Invalid(vec![ValidationIssue::new(["email"], "Enter a valid email")]),
//!         }
//!     }
//! }
//!
//! let registry = SchemaRegistry::new().with_schema(FormKind::ForgotPassword, ForgotPasswordSchema);
//!
//! let schema = registry.schema_for(FormKind::ForgotPassword).expect("registered");
//! let body = schema.validate(&json!({ "email": " Ada@Abeg.test " })).into_body()?;
//! assert!(registry.schema_for(FormKind::Login).is_none());
//! # Ok::<(), abeg_fetch::validation::InvalidBody>(())
//! ```

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::{FetcherError, RequestBody};

/// Identifies the form a candidate comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FormKind {
    /// Sign in.
    Login,
    /// Account creation.
    Signup,
    /// Password reset request.
    ForgotPassword,
    /// New password.
    ResetPassword,
    /// Campaign category, country and tags.
    CampaignStepOne,
    /// Campaign title, fundraiser, goal and deadline.
    CampaignStepTwo,
    /// Campaign photos and story.
    CampaignStepThree,
}

impl FormKind {
    /// Every form kind.
    pub const ALL: [Self; 7] = [
        Self::Login,
        Self::Signup,
        Self::ForgotPassword,
        Self::ResetPassword,
        Self::CampaignStepOne,
        Self::CampaignStepTwo,
        Self::CampaignStepThree,
    ];

    /// The identifier used on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::Signup => "signup",
            Self::ForgotPassword => "forgotPassword",
            Self::ResetPassword => "resetPassword",
            Self::CampaignStepOne => "campaignStepOne",
            Self::CampaignStepTwo => "campaignStepTwo",
            Self::CampaignStepThree => "campaignStepThree",
        }
    }
}

impl fmt::Display for FormKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One reason a candidate was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Path to the offending field, empty for the whole candidate.
    pub path: Vec<String>,
    /// User-facing message.
    pub message: String,
}

impl ValidationIssue {
    /// Creates an issue.
    pub fn new<P>(path: impl IntoIterator<Item = P>, message: impl Into<String>) -> Self
    where
        P: Into<String>,
    {
        Self {
            path: path.into_iter().map(Into::into).collect(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            f.write_str(&self.message)
        } else {
            write!(f, "{}: {}", self.path.join("."), self.message)
        }
    }
}

/// Outcome of validating a candidate. Issues keep the order the schema reported them in.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum Validation<T> {
    /// The candidate passed, with its normalized output.
    Valid(T),
    /// The candidate was rejected.
    Invalid(Vec<ValidationIssue>),
}

impl<T> Validation<T> {
    /// Whether the candidate passed.
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }

    /// The reported issues, empty when valid.
    pub fn issues(&self) -> &[ValidationIssue] {
        match self {
            Self::Valid(_) => &[],
            Self::Invalid(issues) => issues,
        }
    }

    /// Converts into a standard [`Result`].
    ///
    /// # Errors
    ///
    /// Returns the issues when the candidate was rejected.
    pub fn into_result(self) -> Result<T, Vec<ValidationIssue>> {
        match self {
            Self::Valid(output) => Ok(output),
            Self::Invalid(issues) => Err(issues),
        }
    }

    /// Maps the valid output.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Validation<U> {
        match self {
            Self::Valid(output) => Validation::Valid(f(output)),
            Self::Invalid(issues) => Validation::Invalid(issues),
        }
    }
}

impl<T> Validation<T>
where
    T: Serialize,
{
    /// Turns a valid output into a JSON [`RequestBody`].
    ///
    /// # Errors
    ///
    /// Returns [`InvalidBody::Issues`] when the candidate was rejected, and
    /// [`InvalidBody::Serialization`] when the output cannot be serialized.
    pub fn into_body(self) -> Result<RequestBody, InvalidBody> {
        let output = self.into_result().map_err(InvalidBody::Issues)?;
        RequestBody::json(&output).map_err(InvalidBody::Serialization)
    }
}

/// Why a validation could not become a request body.
#[derive(Debug, derive_more::Error, derive_more::Display)]
pub enum InvalidBody {
    /// The candidate was rejected.
    #[display("candidate rejected with {} issue(s)", _0.len())]
    Issues(#[error(not(source))] Vec<ValidationIssue>),

    /// The valid output could not be serialized.
    #[display("{_0}")]
    Serialization(FetcherError),
}

/// Validates a candidate into a typed, normalized output.
pub trait Schema: Send + Sync + 'static {
    /// What a valid candidate becomes.
    type Output: Serialize;

    /// Validates the candidate.
    fn validate(&self, candidate: &Value) -> Validation<Self::Output>;
}

/// A [`Schema`] whose output has been serialized, so schemas of different forms can be
/// stored side by side.
pub trait ErasedSchema: Send + Sync {
    /// Validates the candidate, producing its output as JSON.
    fn validate(&self, candidate: &Value) -> Validation<Value>;
}

impl<S> ErasedSchema for S
where
    S: Schema,
{
    fn validate(&self, candidate: &Value) -> Validation<Value> {
        match Schema::validate(self, candidate) {
            Validation::Valid(output) => match serde_json::to_value(output) {
                Ok(value) => Validation::Valid(value),
                Err(err) => Validation::Invalid(vec![ValidationIssue::new(
                    Vec::<String>::new(),
                    err.to_string(),
                )]),
            },
            Validation::Invalid(issues) => Validation::Invalid(issues),
        }
    }
}

/// Lookup of the schema of each form.
#[derive(Default, derive_more::Debug)]
#[debug("SchemaRegistry({:?})", schemas.keys().collect::<Vec<_>>())]
pub struct SchemaRegistry {
    schemas: IndexMap<FormKind, Box<dyn ErasedSchema>>,
}

impl SchemaRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the schema of a form, replacing any previous one.
    #[must_use]
    pub fn with_schema(mut self, kind: FormKind, schema: impl Schema) -> Self {
        self.register(kind, schema);
        self
    }

    /// Registers the schema of a form, replacing any previous one.
    pub fn register(&mut self, kind: FormKind, schema: impl Schema) {
        if self.schemas.insert(kind, Box::new(schema)).is_some() {
            debug!(form = %kind, "schema replaced");
        }
    }

    /// Returns the schema of a form, `None` when the form has none.
    pub fn schema_for(&self, kind: FormKind) -> Option<&dyn ErasedSchema> {
        self.schemas.get(&kind).map(AsRef::as_ref)
    }

    /// Validates a candidate with the schema of a form, `None` when the form has none.
    pub fn validate(&self, kind: FormKind, candidate: &Value) -> Option<Validation<Value>> {
        let validation = self.schema_for(kind)?.validate(candidate);
        if let Validation::Invalid(issues) = &validation {
            debug!(form = %kind, issues = issues.len(), "candidate rejected");
        }
        Some(validation)
    }

    /// The forms that have a schema, in registration order.
    pub fn kinds(&self) -> impl Iterator<Item = FormKind> + '_ {
        self.schemas.keys().copied()
    }
}
