use serde::Serialize;

/// Soft result of a user action. Duplicate favorites and repeat reviews
/// come back as `info`, leaving existing state untouched.
#[derive(Debug, Serialize)]
pub struct ActionOutcome {
    pub status: &'static str,
    pub message: String,
}

impl ActionOutcome {
    pub fn success(message: &str) -> Self {
        Self {
            status: "success",
            message: message.to_string(),
        }
    }

    pub fn info(message: &str) -> Self {
        Self {
            status: "info",
            message: message.to_string(),
        }
    }
}
