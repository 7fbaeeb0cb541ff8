pub mod check;
pub mod event;
pub mod notification;
pub mod ownership;
pub mod shift;
