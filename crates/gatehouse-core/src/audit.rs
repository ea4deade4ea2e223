//! Security audit logging for authentication events
//!
//! Registrations, logins, rejected tokens and denied resource accesses are
//! logged at INFO level with the "audit" target, so they can be filtered
//! and routed separately from application logs.
//!
//! Events never carry plaintext passwords, password hashes or tokens, and a
//! failed login is recorded the same way whether or not the email exists.
//!
//! # Example
//!
//! ```ignore
//! use gatehouse_core::audit::{audit_log, AuditEvent};
//!
//! audit_log(&AuditEvent::LoginSuccess {
//!     user_id: account.id,
//!     email: account.email.clone(),
//! });
//! ```

use axum::http::HeaderMap;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

/// Security audit events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum AuditEvent {
    /// Account committed to the credential store
    RegistrationSuccess { user_id: Uuid, email: String },

    /// Registration rejected (validation, duplicate email)
    RegistrationFailure { email: String, reason: String },

    /// Account exists but its profile could not be created
    ProfileMirrorFailed { user_id: Uuid, reason: String },

    LoginSuccess { user_id: Uuid, email: String },

    /// Unknown email and wrong password are deliberately the same event
    LoginFailure { email: String },

    /// Request carried a missing, malformed or rejected bearer token
    InvalidToken {
        reason: String,
        ip_address: Option<String>,
        user_agent: Option<String>,
    },

    /// Authenticated caller tried to touch another identity's resource
    AccessDenied {
        user_id: Uuid,
        resource: String,
        ip_address: Option<String>,
    },
}

/// Log an audit event with the "audit" target
pub fn audit_log(event: &AuditEvent) {
    let timestamp = Utc::now();

    let event_json = serde_json::to_string(event)
        .unwrap_or_else(|e| format!("{{\"error\":\"Failed to serialize audit event: {e}\"}}"));

    match event {
        AuditEvent::RegistrationSuccess { user_id, email } => {
            info!(
                target: "audit",
                timestamp = %timestamp,
                event = %event_json,
                user_id = %user_id,
                email = %email,
                "Registration successful"
            );
        }
        AuditEvent::RegistrationFailure { email, reason } => {
            info!(
                target: "audit",
                timestamp = %timestamp,
                event = %event_json,
                email = %email,
                reason = %reason,
                "Registration failed"
            );
        }
        AuditEvent::ProfileMirrorFailed { user_id, reason } => {
            info!(
                target: "audit",
                timestamp = %timestamp,
                event = %event_json,
                user_id = %user_id,
                reason = %reason,
                "Profile mirror failed"
            );
        }
        AuditEvent::LoginSuccess { user_id, email } => {
            info!(
                target: "audit",
                timestamp = %timestamp,
                event = %event_json,
                user_id = %user_id,
                email = %email,
                "Login successful"
            );
        }
        AuditEvent::LoginFailure { email } => {
            info!(
                target: "audit",
                timestamp = %timestamp,
                event = %event_json,
                email = %email,
                "Login failed"
            );
        }
        AuditEvent::InvalidToken {
            reason, ip_address, ..
        } => {
            info!(
                target: "audit",
                timestamp = %timestamp,
                event = %event_json,
                ip_address = ?ip_address,
                reason = %reason,
                "Invalid token"
            );
        }
        AuditEvent::AccessDenied {
            user_id,
            resource,
            ip_address,
        } => {
            info!(
                target: "audit",
                timestamp = %timestamp,
                event = %event_json,
                user_id = %user_id,
                resource = %resource,
                ip_address = ?ip_address,
                "Access denied"
            );
        }
    }
}

/// Extract client IP address from request headers
///
/// Checks `X-Forwarded-For` first (first hop wins), then `X-Real-IP`.
pub fn extract_ip_address(headers: &HeaderMap) -> Option<String> {
    if let Some(xff) = headers.get("x-forwarded-for") {
        if let Ok(xff_str) = xff.to_str() {
            if let Some(first_ip) = xff_str.split(',').next() {
                let first_ip = first_ip.trim();
                if !first_ip.is_empty() {
                    return Some(first_ip.to_string());
                }
            }
        }
    }

    if let Some(real_ip) = headers.get("x-real-ip") {
        if let Ok(ip_str) = real_ip.to_str() {
            return Some(ip_str.to_string());
        }
    }

    None
}

/// Extract user agent from request headers
pub fn extract_user_agent(headers: &HeaderMap) -> Option<String> {
    headers
        .get(axum::http::header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
}
