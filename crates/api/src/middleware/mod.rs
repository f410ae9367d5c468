//! Authentication and authorization middleware extractors.
//!
//! - [`auth::AuthUser`] -- Extracts the authenticated user from a JWT Bearer token.
//! - [`rbac::RequireTeacher`] -- Requires `teacher` or `admin` role.
//! - [`rbac::RequireStudent`] -- Requires the `student` role.

pub mod auth;
pub mod rbac;
