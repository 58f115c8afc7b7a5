pub mod elasticsearch;
pub mod omdb;
