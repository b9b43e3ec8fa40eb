use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Subject (admin name)
    pub is_admin: bool,
    pub iat: usize, // Issued at
    pub exp: usize, // Expiration time
}
