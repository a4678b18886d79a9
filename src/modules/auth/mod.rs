pub mod controller;
pub mod cookie;
pub mod model;
pub mod router;
pub mod sender;
pub mod service;
