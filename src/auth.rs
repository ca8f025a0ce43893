/// Opaque token handed over by the host's identity provider. The engine only
/// routes on its presence; it never inspects or refreshes it.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: String,
    pub access_token: String,
}

impl Identity {
    pub fn new(user_id: &str, access_token: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            access_token: access_token.to_string(),
        }
    }
}
