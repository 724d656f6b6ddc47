// src/handlers.rs

pub mod auth;
pub mod campanhas;
pub mod conexao;
pub mod instancias;
pub mod mensagens;
pub mod templates;
