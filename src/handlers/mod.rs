pub mod extractors;
pub mod health;
pub mod layouts;
pub mod response;
