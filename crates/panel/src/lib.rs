//! Pterodactyl application-API client.
//!
//! Every panel call funnels through [`PanelClient::call`], which normalizes
//! transport failures and non-2xx responses into [`PanelError`]. Nothing
//! upstream-shaped escapes this crate as an unhandled fault.

pub mod client;
pub mod types;

pub use {
    client::{PanelClient, PanelError},
    types::{NodeAttributes, PanelList, PanelObject, ServerAttributes, UserAttributes},
};
