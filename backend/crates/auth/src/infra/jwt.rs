//! JWT token issue and validation (HS256)
//!
//! Validation is a pure, local computation over the secret, the token bytes
//! and the clock: no storage or network access.

use std::fmt;

use chrono::Utc;
use jsonwebtoken::errors::ErrorKind as JwtErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::de::DeserializeOwned;

use crate::application::config::AuthConfig;
use crate::domain::token::{
    Expiring, SessionClaims, TokenClaims, TokenRejection, VerificationClaims,
};
use crate::error::{AuthError, AuthResult};

/// The only accepted signing algorithm
const ALGORITHM: Algorithm = Algorithm::HS256;

#[derive(Clone)]
pub struct JwtTokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtTokenService {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(ALGORITHM);
        validation.leeway = 0;
        // `exp` is checked after decoding, where the boundary second is refused
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(&config.jwt_secret)
    }

    /// Sign a claim set
    pub fn issue(&self, claims: &TokenClaims) -> AuthResult<String> {
        encode(&Header::new(ALGORITHM), claims, &self.encoding_key)
            .map_err(|e| AuthError::Internal(format!("Failed to sign token: {}", e)))
    }

    /// Validate a token of either shape
    pub fn validate(&self, token: &str) -> Result<TokenClaims, TokenRejection> {
        self.decode(token)
    }

    /// Validate a token that must carry session claims
    pub fn validate_session(&self, token: &str) -> Result<SessionClaims, TokenRejection> {
        self.decode(token)
    }

    /// Validate a token that must carry verification claims
    pub fn validate_verification(
        &self,
        token: &str,
    ) -> Result<VerificationClaims, TokenRejection> {
        self.decode(token)
    }

    fn decode<T: DeserializeOwned + Expiring>(&self, token: &str) -> Result<T, TokenRejection> {
        // Reject foreign algorithms before touching the signature
        let header = jsonwebtoken::decode_header(token).map_err(|_| TokenRejection::Malformed)?;
        if header.alg != ALGORITHM {
            return Err(TokenRejection::UnexpectedAlgorithm);
        }

        let claims = decode::<T>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| classify(e.kind()))?;

        if Utc::now().timestamp() >= claims.expires_at() {
            return Err(TokenRejection::Expired);
        }
        Ok(claims)
    }
}

fn classify(kind: &JwtErrorKind) -> TokenRejection {
    match kind {
        JwtErrorKind::ExpiredSignature => TokenRejection::Expired,
        JwtErrorKind::InvalidSignature => TokenRejection::BadSignature,
        JwtErrorKind::InvalidAlgorithm | JwtErrorKind::InvalidAlgorithmName => {
            TokenRejection::UnexpectedAlgorithm
        }
        JwtErrorKind::Json(_) | JwtErrorKind::MissingRequiredClaim(_) => {
            TokenRejection::MalformedClaims
        }
        _ => TokenRejection::Malformed,
    }
}

impl fmt::Debug for JwtTokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtTokenService")
            .field("algorithm", &ALGORITHM)
            .field("encoding_key", &"[hidden]")
            .field("decoding_key", &"[hidden]")
            .finish()
    }
}
