// Handlers are shared by every entity; `usuarios` only overrides what needs
// password hashing or token issuance.
pub mod resource;
pub mod system;
pub mod usuarios;

pub use resource::ResourceState;
