use serde::Deserialize;

/// One entry of the users file. Credential fields (`password_hash`,
/// `last_password_change`) are left undeserialized so they never enter the process.
#[derive(Debug, Clone, Deserialize)]
pub struct UserEntry {
    pub username: String,
}
