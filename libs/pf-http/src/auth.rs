use pf_utils::SecretString;

/// Supplies the bearer token attached to authenticated requests.
///
/// Read on every request so a login or logout between calls is picked up
/// without rebuilding the client.
pub trait BearerSource: Send + Sync {
    fn bearer_token(&self) -> Option<SecretString>;
}

/// Never supplies a token.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoBearer;

impl BearerSource for NoBearer {
    fn bearer_token(&self) -> Option<SecretString> {
        None
    }
}
