pub mod api;
pub mod client_trait;
pub mod config;
pub mod error;
pub mod masking;
pub mod sources;
pub mod utils;

pub use api::client::AdminClient;
pub use client_trait::AdminApi;
pub use config::{ClientConfig, ConfigError};
pub use error::{ClientError, ClientResult};
pub use masking::mask_token;
pub use sources::EntitySource;
