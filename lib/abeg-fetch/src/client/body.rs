use bytes::Bytes;
use headers::ContentType;
use serde::Serialize;

use super::FetcherError;

/// The body of a request.
///
/// JSON bodies are serialized eagerly and sent with `Content-Type: application/json`.
/// Multipart bodies are handed to the transport untouched so it can pick the boundary
/// and write the matching content type itself.
#[derive(Clone, derive_more::Debug)]
pub enum RequestBody {
    /// A serialized JSON document.
    Json(#[debug(ignore)] Bytes),
    /// A `multipart/form-data` payload.
    Multipart(FormData),
}

impl RequestBody {
    /// Creates a JSON body from a serializable value.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use abeg_fetch::RequestBody;
    /// use serde::Serialize;
    ///
    /// #[derive(Serialize)]
    /// struct StepOne {
    ///     category_id: String,
    ///     country: String,
    ///     tags: Vec<String>,
    /// }
    ///
    /// let body = RequestBody::json(&StepOne {
    ///     category_id: "65b0576bb36c6a968d892a52".to_string(),
    ///     country: "NG".to_string(),
    ///     tags: vec!["health".to_string()],
    /// })?;
    /// # Ok::<(), abeg_fetch::FetcherError>(())
    /// ```
    pub fn json<T>(value: &T) -> Result<Self, FetcherError>
    where
        T: Serialize + ?Sized,
    {
        let data = serde_json::to_vec(value)?;
        Ok(Self::Json(Bytes::from(data)))
    }

    /// The content type the request must declare, if any.
    ///
    /// Multipart bodies return `None`: the boundary is only known to the transport.
    pub(crate) fn content_type(&self) -> Option<ContentType> {
        match self {
            Self::Json(_) => Some(ContentType::json()),
            Self::Multipart(_) => None,
        }
    }
}

impl From<FormData> for RequestBody {
    fn from(form: FormData) -> Self {
        Self::Multipart(form)
    }
}

/// An ordered multipart form, the equivalent of a browser `FormData`.
///
/// Fields keep their insertion order and a name may repeat, which is how several
/// files are attached under one field.
///
/// ```rust
/// use abeg_fetch::{FormData, FormPart};
///
/// let form = FormData::new()
///     .set("story", "A story worth telling")
///     .set("campaignId", "abc")
///     .append("photos", FormPart::file("cover.png", mime::IMAGE_PNG, vec![0x89, 0x50]));
///
/// assert_eq!(form.len(), 3);
/// ```
#[derive(Debug, Clone, Default)]
pub struct FormData {
    parts: Vec<(String, FormPart)>,
}

impl FormData {
    /// Creates an empty form.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces every existing field with this name by a single text field.
    pub fn set(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        self.parts.retain(|(existing, _)| *existing != name);
        self.parts.push((name, FormPart::text(value)));
        self
    }

    /// Appends a part, keeping any existing field with the same name.
    pub fn append(mut self, name: impl Into<String>, part: FormPart) -> Self {
        self.parts.push((name.into(), part));
        self
    }

    /// Returns the first part registered under `name`.
    pub fn get(&self, name: &str) -> Option<&FormPart> {
        self.parts
            .iter()
            .find_map(|(existing, part)| (existing == name).then_some(part))
    }

    /// Iterates over every part in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FormPart)> {
        self.parts.iter().map(|(name, part)| (name.as_str(), part))
    }

    /// Number of parts.
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    /// Whether the form has no parts.
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

/// A single multipart field.
#[derive(Clone, derive_more::Debug)]
pub enum FormPart {
    /// A plain text field.
    Text(String),
    /// A binary attachment.
    File {
        /// File name reported to the server.
        file_name: String,
        /// Media type of the content.
        mime: mime::Mime,
        /// Raw content.
        #[debug("{} bytes", content.len())]
        content: Bytes,
    },
}

impl FormPart {
    /// Creates a text field.
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Creates a file attachment.
    pub fn file(file_name: impl Into<String>, mime: mime::Mime, content: impl Into<Bytes>) -> Self {
        Self::File {
            file_name: file_name.into(),
            mime,
            content: content.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct StepTwo {
        title: String,
        goal: u32,
    }

    #[test]
    fn test_json_body_is_serialized_with_json_content_type() {
        let step = StepTwo {
            title: "Help Ada walk again".to_string(),
            goal: 5000,
        };

        let body = RequestBody::json(&step).expect("should serialize");

        assert_eq!(body.content_type(), Some(ContentType::json()));
        let RequestBody::Json(data) = body else {
            panic!("expected a JSON body");
        };
        let parsed = serde_json::from_slice::<StepTwo>(&data).expect("should parse JSON");
        assert_eq!(parsed, step);
    }

    #[test]
    fn test_multipart_body_has_no_content_type() {
        let body = RequestBody::from(FormData::new().set("story", "once upon a time"));

        assert_eq!(body.content_type(), None);
    }

    #[test]
    fn test_set_replaces_and_append_keeps() {
        let form = FormData::new()
            .set("story", "draft")
            .append("photos", FormPart::file("a.png", mime::IMAGE_PNG, vec![1]))
            .append("photos", FormPart::file("b.png", mime::IMAGE_PNG, vec![2]))
            .set("story", "final");

        let names = form.iter().map(|(name, _)| name).collect::<Vec<_>>();
        assert_eq!(names, vec!["photos", "photos", "story"]);
        assert!(matches!(form.get("story"), Some(FormPart::Text(text)) if text == "final"));
    }

    #[test]
    fn test_file_part_debug_hides_content() {
        let part = FormPart::file("cover.png", mime::IMAGE_PNG, vec![0; 2048]);

        let debug = format!("{part:?}");

        assert!(debug.contains("cover.png"));
        assert!(debug.contains("2048 bytes"));
        assert!(!debug.contains("0, 0"));
    }
}
