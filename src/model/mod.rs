pub mod attendance;
pub mod invoice;
pub mod product;
pub mod purchase;
pub mod role;
pub mod status;
pub mod user;
