pub mod attendance;
pub mod invoice;
pub mod product;
pub mod purchase;
