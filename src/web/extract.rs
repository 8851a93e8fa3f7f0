// src/web/extract.rs
//! `Json` e `Path` com rejeições convertidas em `AppError`, para que corpos
//! ou ids inválidos respondam com o mesmo `{"error": ...}` do resto da API.
use crate::error::AppError;
use axum::extract::{FromRequest, FromRequestParts};

#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct AppPath<T>(pub T);
