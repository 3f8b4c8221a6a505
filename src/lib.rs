//! # tidarr-send
//!
//! Send Tidal tracks, albums, playlists and artists to a self-hosted
//! [Tidarr](https://github.com/cstaelen/tidarr) download manager.
//!
//! The flow mirrors one context-menu click in the host application: a media
//! selection is normalized into a download request, the client authenticates
//! when an admin password is configured, submits the item to `/api/save`,
//! and the button label reports the outcome.
//!
//! ```no_run
//! use tidarr_send::{config::ServerConfig, models::MediaSelection, request, Quality, TidarrClient};
//!
//! let selection = MediaSelection::parse("track:42").unwrap();
//! let requests = request::plan(&[selection], Quality::High);
//! let client = TidarrClient::new();
//! let server = ServerConfig::new("http://tidarr.local:8484", "");
//! let _ack = client.send(&requests[0], &server)?;
//! # Ok::<(), tidarr_send::SendError>(())
//! ```

pub mod config;
pub mod error;
pub mod menu;
pub mod models;
pub mod request;
pub mod tidarr;

pub use config::{ServerConfig, Settings};
pub use error::SendError;
pub use menu::{ButtonState, MenuButton};
pub use models::{DownloadRequest, MediaKind, MediaSelection, Quality};
pub use tidarr::{Ack, ConnectionTest, Dispatch, TidarrClient};
