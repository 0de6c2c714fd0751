mod acl;
mod bearer;
mod hmac;

pub use acl::AclMiddlewareFactory;
pub use bearer::BearerAuthFactory;
pub use hmac::HmacMiddlewareFactory;
