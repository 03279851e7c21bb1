mod classify;
pub use self::classify::classify_response;

mod envelope;
pub use self::envelope::{
    ErrorPayload, ErrorStatus, FieldErrors, ResultEnvelope, SuccessPayload, SuccessStatus,
};

mod raw;
pub use self::raw::RawResponse;
