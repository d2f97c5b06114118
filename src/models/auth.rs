// src/models/auth.rs

use serde::{Deserialize, Serialize};

use crate::models::church::normalize_email;

// Quem está chamando a API, já verificado pelo token.
// Só o e-mail importa: a autorização é por igreja (lista de admins).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub email: String,
}

impl Caller {
    pub fn new(email: &str) -> Self {
        Self {
            email: normalize_email(email),
        }
    }
}

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Subject (e-mail do usuário)
    pub exp: usize,  // Expiration time (quando o token expira)
    pub iat: usize,  // Issued At (quando o token foi criado)
}
