/// Runs bcrypt on the blocking pool.
pub async fn hash(password: String, cost: u32) -> Result<String, bcrypt::BcryptError> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .unwrap_or_else(|e| Err(bcrypt::BcryptError::Io(std::io::Error::other(e))))
}

pub async fn verify(password: String, hash: String) -> Result<bool, bcrypt::BcryptError> {
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .unwrap_or_else(|e| Err(bcrypt::BcryptError::Io(std::io::Error::other(e))))
}
