//! Request dispatch: the routing table, typed endpoint adapters, and the
//! dispatcher that drives a request through them.

pub mod dispatcher;
pub mod endpoint;
pub mod registry;

pub use dispatcher::{RequestDispatcher, dispatch_handler};
pub use endpoint::{
    BoxFuture, DecodeError, HandlerTarget, JsonEndpoint, PageEndpoint, RawRequest,
    TypedJsonEndpoint, decode_args,
};
pub use registry::{
    AuthRequirement, HandlerDescriptor, HandlerRegistry, RegistryBuilder, RegistryError,
    ResponseKind, RouteError, RouteKey,
};
