use thiserror::Error;

/// Failures raised by the secret store and event publisher collaborators.
///
/// These abort the current run; they're wrapped into `anyhow::Error` on the way
/// up so the scheduler can log the whole context chain.
#[derive(Debug, Error)]
pub enum CollaboratorError {
    #[error("secret '{name}' could not be resolved: {reason}")]
    SecretUnavailable { name: String, reason: String },

    #[error("access token variable '{0}' is not set")]
    MissingToken(String),

    #[error("event endpoint {endpoint} rejected the record with status {status}: {body}")]
    PublishRejected { endpoint: String, status: u16, body: String },
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_body_is_untouched() {
        assert_eq!(truncate_body("not found"), "not found");
    }

    #[test]
    fn long_body_is_cut_on_char_boundary() {
        let body = "é".repeat(300);
        let cut = truncate_body(&body);
        assert!(cut.ends_with("..."));
        assert_eq!(cut.chars().count(), 203);
    }

    #[test]
    fn messages_name_the_failure() {
        let err = CollaboratorError::SecretUnavailable { name: "weatherapikey".into(), reason: "403".into() };
        assert!(err.to_string().contains("weatherapikey"));

        let err = CollaboratorError::MissingToken("EVENT_HUB_ACCESS_TOKEN".into());
        assert!(err.to_string().contains("EVENT_HUB_ACCESS_TOKEN"));
    }
}
