//! Verification of access tokens issued by the hosted auth service.

pub mod jwt;
