pub mod auth;
pub mod campanha;
pub mod instancia;
pub mod mensagens;
pub mod status;
pub mod template;
