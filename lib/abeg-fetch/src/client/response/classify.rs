use http::StatusCode;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::envelope::{ErrorPayload, ResultEnvelope, SuccessPayload};

/// Turns a received status and body into a [`ResultEnvelope`].
///
/// The function is total over two status classes:
///
/// - **2xx**: the body is read as a success payload. An empty body, a body that is not JSON,
///   or a `data` field that does not match `T` still yields a success envelope, with
///   `data: None` and the body's `message` (or the status reason phrase).
/// - **anything else**: the body is read as an error payload. When that fails (wrong `status`
///   literal, `error` details of another shape, not JSON) the body's non-empty `message` is
///   kept with `error: None`, else `default_error_message`, else the status reason phrase.
///
/// ```rust
/// use abeg_fetch::{ResultEnvelope, classify_response};
/// use http::StatusCode;
///
/// let body = br#"{"status":"Error","message":"Validation failed","error":{"story":["too short"]}}"#;
/// let envelope: ResultEnvelope<()> =
///     classify_response(StatusCode::UNPROCESSABLE_ENTITY, body, None);
///
/// let error = envelope.error().expect("a failure");
/// assert_eq!(error.message, "Validation failed");
/// assert_eq!(error.error.as_ref().and_then(|fields| fields.get("story")).map(Vec::len), Some(1));
/// ```
pub fn classify_response<T, E>(
    status: StatusCode,
    body: &[u8],
    default_error_message: Option<&str>,
) -> ResultEnvelope<T, E>
where
    T: DeserializeOwned,
    E: DeserializeOwned,
{
    if status.is_success() {
        ResultEnvelope::Success(success_payload(status, body))
    } else {
        ResultEnvelope::Failure(error_payload(status, body, default_error_message))
    }
}

fn success_payload<T>(status: StatusCode, body: &[u8]) -> SuccessPayload<T>
where
    T: DeserializeOwned,
{
    if let Some(payload) = parse::<SuccessPayload<T>>(body) {
        return payload;
    }

    let message = body_message(body).unwrap_or_else(|| reason_phrase(status));
    SuccessPayload::new(None, message)
}

fn error_payload<E>(
    status: StatusCode,
    body: &[u8],
    default_error_message: Option<&str>,
) -> ErrorPayload<E>
where
    E: DeserializeOwned,
{
    if let Some(payload) = parse::<ErrorPayload<E>>(body) {
        return payload;
    }

    let message = body_message(body)
        .filter(|message| !message.is_empty())
        .or_else(|| default_error_message.map(str::to_string))
        .unwrap_or_else(|| reason_phrase(status));
    ErrorPayload::new(message)
}

fn parse<P>(body: &[u8]) -> Option<P>
where
    P: DeserializeOwned,
{
    if body.iter().all(u8::is_ascii_whitespace) {
        return None;
    }

    let deserializer = &mut serde_json::Deserializer::from_slice(body);
    serde_path_to_error::deserialize(deserializer)
        .inspect_err(|err| {
            debug!(path = %err.path(), error = %err.inner(), "body does not match the payload contract");
        })
        .ok()
}

fn body_message(body: &[u8]) -> Option<String> {
    let value = serde_json::from_slice::<serde_json::Value>(body).ok()?;
    value.get("message")?.as_str().map(str::to_string)
}

fn reason_phrase(status: StatusCode) -> String {
    status
        .canonical_reason()
        .map_or_else(|| format!("HTTP {}", status.as_u16()), str::to_string)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde::Deserialize;

    use super::*;
    use crate::FieldErrors;

    #[derive(Debug, Clone, PartialEq, Deserialize)]
    struct Created {
        id: String,
    }

    fn classify(status: u16, body: &str, default: Option<&str>) -> ResultEnvelope<Created> {
        let status = StatusCode::from_u16(status).expect("valid status");
        classify_response(status, body.as_bytes(), default)
    }

    #[test]
    fn test_success_with_matching_data() {
        let envelope = classify(
            200,
            r#"{"status":"success","data":{"id":"abc"},"message":"ok"}"#,
            None,
        );

        assert_eq!(
            envelope,
            ResultEnvelope::Success(SuccessPayload::new(
                Some(Created {
                    id: "abc".to_string()
                }),
                "ok"
            ))
        );
    }

    #[rstest]
    #[case::empty_body(204, "", "No Content")]
    #[case::whitespace_body(200, "  \n", "OK")]
    #[case::not_json(200, "<html>hello</html>", "OK")]
    #[case::mismatched_data(201, r#"{"status":"success","data":{"uuid":1},"message":"Created it"}"#, "Created it")]
    #[case::missing_message(200, r#"{"status":"success","data":{"id":"abc"}}"#, "OK")]
    fn test_success_fallback_keeps_success_status(
        #[case] status: u16,
        #[case] body: &str,
        #[case] expected_message: &str,
    ) {
        let envelope = classify(status, body, Some("ignored for 2xx"));

        assert_eq!(
            envelope,
            ResultEnvelope::Success(SuccessPayload::new(None, expected_message))
        );
    }

    #[test]
    fn test_domain_error_is_kept_verbatim() {
        let envelope = classify(
            422,
            r#"{"status":"Error","message":"Validation failed","error":{"story":["too short"]}}"#,
            Some("Something went wrong"),
        );

        let mut fields = FieldErrors::new();
        fields.insert("story".to_string(), vec!["too short".to_string()]);
        assert_eq!(
            envelope,
            ResultEnvelope::Failure(ErrorPayload::new("Validation failed").with_error(fields))
        );
    }

    #[rstest]
    #[case::default_message(500, "oops", Some("Something went wrong"), "Something went wrong")]
    #[case::reason_phrase(503, "", None, "Service Unavailable")]
    #[case::wrong_status_literal(400, r#"{"status":"fail","message":"nope"}"#, None, "nope")]
    #[case::lowercase_status(400, r#"{"status":"error","message":"Bad token"}"#, Some("Something went wrong"), "Bad token")]
    #[case::wrong_error_shape(409, r#"{"status":"Error","message":"Email already registered","error":{"email":"taken"}}"#, None, "Email already registered")]
    #[case::empty_message(502, r#"{"status":"fail","message":""}"#, Some("Something went wrong"), "Something went wrong")]
    #[case::message_not_a_string(500, r#"{"status":"Error","message":42}"#, None, "Internal Server Error")]
    #[case::unknown_code(599, "", None, "HTTP 599")]
    fn test_error_fallback(
        #[case] status: u16,
        #[case] body: &str,
        #[case] default: Option<&str>,
        #[case] expected_message: &str,
    ) {
        let envelope = classify(status, body, default);

        assert_eq!(envelope, ResultEnvelope::Failure(ErrorPayload::new(expected_message)));
    }

    #[test]
    fn test_redirect_status_is_a_failure() {
        let envelope = classify(304, "", None);

        assert!(!envelope.is_success());
        assert_eq!(envelope.error().map(|error| error.message.as_str()), Some("Not Modified"));
    }
}
