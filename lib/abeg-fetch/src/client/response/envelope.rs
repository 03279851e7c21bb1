use std::collections::BTreeMap;
use std::fmt;

use serde::de::{self, DeserializeOwned};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Field-level validation errors reported by the backend, keyed by field name.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// The literal `"success"` status of a success payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SuccessStatus {
    /// `"success"`
    #[default]
    #[serde(rename = "success")]
    Success,
}

/// The literal `"Error"` status of an error payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorStatus {
    /// `"Error"`
    #[default]
    #[serde(rename = "Error")]
    Error,
}

impl fmt::Display for ErrorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Error")
    }
}

/// Wire contract of a successful backend response.
///
/// ```json
/// { "status": "success", "data": { "id": "abc" }, "message": "ok" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuccessPayload<T> {
    /// Always `"success"`.
    pub status: SuccessStatus,
    /// Response data, `None` when the body carried none or it did not match `T`.
    pub data: Option<T>,
    /// Human readable message.
    pub message: String,
}

impl<T> SuccessPayload<T> {
    /// Creates a success payload.
    pub fn new(data: Option<T>, message: impl Into<String>) -> Self {
        Self {
            status: SuccessStatus::Success,
            data,
            message: message.into(),
        }
    }
}

/// Wire contract of a failed backend response.
///
/// ```json
/// { "status": "Error", "message": "Validation failed", "error": { "story": ["too short"] } }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload<E = FieldErrors> {
    /// Always `"Error"`.
    pub status: ErrorStatus,
    /// Human readable message.
    pub message: String,
    /// Optional structured details, usually per-field messages.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<E>,
}

impl<E> ErrorPayload<E> {
    /// Creates an error payload without details.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: ErrorStatus::Error,
            message: message.into(),
            error: None,
        }
    }

    /// Attaches structured details.
    #[must_use]
    pub fn with_error(mut self, error: E) -> Self {
        self.error = Some(error);
        self
    }
}

/// Outcome of a single request: exactly one of a success or an error payload.
///
/// The envelope is returned for every ordinary outcome, including timeouts, cancellation,
/// connection failures and non-2xx statuses, so callers never need to catch anything.
///
/// It serializes to the `{ "data": ..., "error": ... }` shape where exactly one side is `null`:
///
/// ```rust
/// use abeg_fetch::{ErrorPayload, ResultEnvelope};
///
/// let envelope = ResultEnvelope::<(), _>::Failure(ErrorPayload::<()>::new("Request timed out"));
/// let json = serde_json::to_value(&envelope)?;
///
/// assert!(json["data"].is_null());
/// assert_eq!(json["error"]["message"], "Request timed out");
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum ResultEnvelope<T, E = FieldErrors> {
    /// The backend answered with a 2xx status.
    Success(SuccessPayload<T>),
    /// Anything else.
    Failure(ErrorPayload<E>),
}

impl<T, E> ResultEnvelope<T, E> {
    /// The success side, if any.
    pub fn data(&self) -> Option<&SuccessPayload<T>> {
        match self {
            Self::Success(payload) => Some(payload),
            Self::Failure(_) => None,
        }
    }

    /// The failure side, if any.
    pub fn error(&self) -> Option<&ErrorPayload<E>> {
        match self {
            Self::Success(_) => None,
            Self::Failure(payload) => Some(payload),
        }
    }

    /// Whether this is the success side.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Converts into a standard `Result`.
    ///
    /// # Errors
    ///
    /// Returns the error payload for the failure side.
    pub fn into_result(self) -> Result<SuccessPayload<T>, ErrorPayload<E>> {
        match self {
            Self::Success(payload) => Ok(payload),
            Self::Failure(payload) => Err(payload),
        }
    }

    /// Splits into the `(data, error)` pair of the wire shape.
    pub fn into_parts(self) -> (Option<SuccessPayload<T>>, Option<ErrorPayload<E>>) {
        match self {
            Self::Success(payload) => (Some(payload), None),
            Self::Failure(payload) => (None, Some(payload)),
        }
    }

    /// Maps the success data, leaving failures untouched.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ResultEnvelope<U, E> {
        match self {
            Self::Success(SuccessPayload {
                status,
                data,
                message,
            }) => ResultEnvelope::Success(SuccessPayload {
                status,
                data: data.map(f),
                message,
            }),
            Self::Failure(payload) => ResultEnvelope::Failure(payload),
        }
    }
}

impl<T, E> From<ResultEnvelope<T, E>> for Result<SuccessPayload<T>, ErrorPayload<E>> {
    fn from(envelope: ResultEnvelope<T, E>) -> Self {
        envelope.into_result()
    }
}

impl<T, E> Serialize for ResultEnvelope<T, E>
where
    T: Serialize,
    E: Serialize,
{
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ResultEnvelope", 2)?;
        state.serialize_field("data", &self.data())?;
        state.serialize_field("error", &self.error())?;
        state.end()
    }
}

#[derive(Deserialize)]
#[serde(bound = "T: DeserializeOwned, E: DeserializeOwned")]
struct EnvelopeWire<T, E> {
    data: Option<SuccessPayload<T>>,
    error: Option<ErrorPayload<E>>,
}

impl<'de, T, E> Deserialize<'de> for ResultEnvelope<T, E>
where
    T: DeserializeOwned,
    E: DeserializeOwned,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let wire = EnvelopeWire::<T, E>::deserialize(deserializer)?;
        match (wire.data, wire.error) {
            (Some(data), None) => Ok(Self::Success(data)),
            (None, Some(error)) => Ok(Self::Failure(error)),
            (Some(_), Some(_)) => Err(de::Error::custom(
                "envelope carries both data and error",
            )),
            (None, None) => Err(de::Error::custom(
                "envelope carries neither data nor error",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Created {
        id: String,
    }

    #[test]
    fn test_success_serializes_with_null_error() {
        let envelope = ResultEnvelope::<_, FieldErrors>::Success(SuccessPayload::new(
            Some(Created {
                id: "abc".to_string(),
            }),
            "ok",
        ));

        let json = serde_json::to_string_pretty(&envelope).expect("should serialize");

        insta::assert_snapshot!(json, @r#"
        {
          "data": {
            "status": "success",
            "data": {
              "id": "abc"
            },
            "message": "ok"
          },
          "error": null
        }
        "#);
    }

    #[test]
    fn test_failure_serializes_with_null_data() {
        let mut fields = FieldErrors::new();
        fields.insert("story".to_string(), vec!["too short".to_string()]);
        let envelope =
            ResultEnvelope::<Created>::Failure(ErrorPayload::new("Validation failed").with_error(fields));

        let json = serde_json::to_string_pretty(&envelope).expect("should serialize");

        insta::assert_snapshot!(json, @r#"
        {
          "data": null,
          "error": {
            "status": "Error",
            "message": "Validation failed",
            "error": {
              "story": [
                "too short"
              ]
            }
          }
        }
        "#);
    }

    #[test]
    fn test_deserialize_rejects_both_sides() {
        let value = json!({
            "data": { "status": "success", "data": null, "message": "ok" },
            "error": { "status": "Error", "message": "boom" },
        });

        let result = serde_json::from_value::<ResultEnvelope<Created>>(value);

        assert!(result.is_err());
    }

    #[test]
    fn test_deserialize_rejects_neither_side() {
        let result = serde_json::from_value::<ResultEnvelope<Created>>(
            json!({ "data": null, "error": null }),
        );

        assert!(result.is_err());
    }

    #[test]
    fn test_wire_shape_round_trips_failure() {
        let value = json!({
            "data": null,
            "error": { "status": "Error", "message": "Unauthorized" },
        });

        let envelope =
            serde_json::from_value::<ResultEnvelope<Created>>(value).expect("should parse");

        assert_eq!(envelope, ResultEnvelope::Failure(ErrorPayload::new("Unauthorized")));
    }

    #[test]
    fn test_error_status_must_be_literal() {
        let result = serde_json::from_value::<ErrorPayload>(
            json!({ "status": "error", "message": "lowercase is not the contract" }),
        );

        assert!(result.is_err());
    }

    #[test]
    fn test_map_keeps_message() {
        let envelope = ResultEnvelope::<_, FieldErrors>::Success(SuccessPayload::new(Some(2), "ok"));

        let mapped = envelope.map(|value| value * 21);

        assert_eq!(mapped.data().and_then(|payload| payload.data), Some(42));
        assert_eq!(mapped.data().map(|payload| payload.message.as_str()), Some("ok"));
    }
}
