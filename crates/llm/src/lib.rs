//! Provider plumbing for the comparison service: which chat APIs exist, how to
//! talk to each of them, and the HTTP port the dispatcher sends through.

pub mod adapters;
pub mod credentials;
pub mod provider;
pub mod registry;
pub mod transport;

pub use adapters::{AdapterKind, ExtractError, ProviderAdapter};
pub use credentials::Credentials;
pub use provider::{Endpoint, ProviderDescriptor, ProviderId, UnknownProvider};
pub use registry::ProviderRegistry;
pub use transport::{HttpTransport, OutboundRequest, RawResponse, ReqwestTransport, TransportError};
