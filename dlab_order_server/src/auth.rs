//! Verification side of the authorization gate.
//!
//! Credentials are issued elsewhere: the user service authenticates customers and staff and
//! mints short-lived HS256 access tokens with a secret it shares with this server. This module
//! only *verifies* those tokens and exposes the resulting identity and role to the handlers.
//! Nothing here re-implements credential checking.

use std::fmt::Display;

use actix_web::{dev::ServiceRequest, http::header::AUTHORIZATION, web, FromRequest, HttpMessage, HttpRequest};
use futures::future::{ready, Ready};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::errors::{AuthError, ServerError};

//--------------------------------------         Role          -------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Customer,
    Admin,
}

impl Role {
    /// Whether a caller holding this role satisfies `required`. Admins cover everything a
    /// customer may do.
    pub fn covers(&self, required: Role) -> bool {
        match required {
            Role::Customer => true,
            Role::Admin => matches!(self, Role::Admin),
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Customer => write!(f, "customer"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

//--------------------------------------      JwtClaims        -------------------------------------------------------
/// The claims carried by an access token: who the caller is and what they may do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    /// The caller's stable account id.
    pub sub: String,
    pub email: String,
    pub role: Role,
    /// Expiry as a unix timestamp. Enforced during validation.
    pub exp: i64,
}

//--------------------------------------    TokenVerifier      -------------------------------------------------------
pub struct TokenVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(secret: &dlab_common::Secret<String>) -> Self {
        let decoding_key = DecodingKey::from_secret(secret.reveal().as_bytes());
        let validation = Validation::new(Algorithm::HS256);
        Self { decoding_key, validation }
    }

    /// `Authenticate(token) -> (identity, role)`. Checks the signature and expiry; anything
    /// wrong with the token is a validation error, never a silent guest.
    pub fn authenticate(&self, token: &str) -> Result<JwtClaims, AuthError> {
        decode::<JwtClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| AuthError::ValidationError(e.to_string()))
    }
}

//--------------------------------------     Extractors        -------------------------------------------------------
fn bearer_token(req: &HttpRequest) -> Result<Option<&str>, ServerError> {
    let Some(header) = req.headers().get(AUTHORIZATION) else {
        return Ok(None);
    };
    let value = header.to_str().map_err(|_| ServerError::CouldNotDeserializeAuthToken)?;
    let token = value.strip_prefix("Bearer ").ok_or(ServerError::CouldNotDeserializeAuthToken)?;
    Ok(Some(token))
}

pub(crate) fn claims_from_request(req: &HttpRequest) -> Result<Option<JwtClaims>, ServerError> {
    // The ACL middleware stores the claims it validated; reuse them rather than decoding twice.
    if let Some(claims) = req.extensions().get::<JwtClaims>() {
        return Ok(Some(claims.clone()));
    }
    let Some(token) = bearer_token(req)? else {
        return Ok(None);
    };
    let verifier = req
        .app_data::<web::Data<TokenVerifier>>()
        .ok_or_else(|| ServerError::InitializeError("TokenVerifier is not registered".to_string()))?;
    let claims = verifier.authenticate(token)?;
    Ok(Some(claims))
}

pub(crate) fn claims_from_service_request(req: &ServiceRequest) -> Result<Option<JwtClaims>, ServerError> {
    claims_from_request(req.request())
}

impl FromRequest for JwtClaims {
    type Error = ServerError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
        let result = claims_from_request(req)
            .and_then(|claims| claims.ok_or(ServerError::AuthenticationError(AuthError::MissingToken)));
        ready(result)
    }
}

/// An extractor for routes that accept, but do not require, authentication. An absent
/// `Authorization` header yields `None`; a header that is present but invalid is still an error
/// rather than a silent downgrade to guest.
pub struct MaybeAuthenticated(Option<JwtClaims>);

impl MaybeAuthenticated {
    pub fn into_inner(self) -> Option<JwtClaims> {
        self.0
    }
}

impl FromRequest for MaybeAuthenticated {
    type Error = ServerError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
        ready(claims_from_request(req).map(MaybeAuthenticated))
    }
}
