use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const UNKNOWN_ARTIST: &str = "Unknown Artist";
pub const UNKNOWN_TITLE: &str = "Unknown Title";

/// Base for every synthesized media URL.
pub const TIDAL_BROWSE_URL: &str = "https://tidal.com/browse";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistRef {
    pub name: String,
}

impl ArtistRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlbumRef {
    pub id: String,
    pub title: Option<String>,
    #[serde(rename = "releaseDate")]
    pub release_date: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Track,
    Album,
    Playlist,
    Artist,
    Mix,
    Video,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Track => "track",
            MediaKind::Album => "album",
            MediaKind::Playlist => "playlist",
            MediaKind::Artist => "artist",
            MediaKind::Mix => "mix",
            MediaKind::Video => "video",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "track" => Ok(MediaKind::Track),
            "album" => Ok(MediaKind::Album),
            "playlist" => Ok(MediaKind::Playlist),
            "artist" => Ok(MediaKind::Artist),
            "mix" => Ok(MediaKind::Mix),
            "video" => Ok(MediaKind::Video),
            _ => Err(()),
        }
    }
}

/// Download quality passed through verbatim to the Tidarr server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    Low,
    #[default]
    High,
    Master,
}

impl Quality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Quality::Low => "low",
            Quality::High => "high",
            Quality::Master => "master",
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Quality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Quality::Low),
            // "normal" and "lossless" are labels some clients use for the
            // same 16-bit tier Tidarr calls "high"
            "high" | "normal" | "lossless" => Ok(Quality::High),
            "master" => Ok(Quality::Master),
            other => Err(format!("unknown quality: {other}")),
        }
    }
}

/// One media entity the user selected, as an explicit tagged union.
///
/// Every variant carries the identifier, an optional title and share URL, and
/// the ordered artist list the host application exposed for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum MediaSelection {
    Track {
        id: String,
        title: Option<String>,
        url: Option<String>,
        artists: Vec<ArtistRef>,
        album: Option<AlbumRef>,
    },
    Album {
        id: String,
        title: Option<String>,
        url: Option<String>,
        artists: Vec<ArtistRef>,
        release_date: Option<String>,
    },
    Playlist {
        id: String,
        title: Option<String>,
        url: Option<String>,
        artists: Vec<ArtistRef>,
    },
    Artist {
        id: String,
        title: Option<String>,
        url: Option<String>,
        artists: Vec<ArtistRef>,
    },
    Mix {
        id: String,
        title: Option<String>,
        url: Option<String>,
        artists: Vec<ArtistRef>,
    },
    Video {
        id: String,
        title: Option<String>,
        url: Option<String>,
        artists: Vec<ArtistRef>,
    },
}

impl MediaSelection {
    /// Selection with only a kind and an id, everything else unknown.
    pub fn bare(kind: MediaKind, id: impl Into<String>) -> Self {
        let id = id.into();
        match kind {
            MediaKind::Track => MediaSelection::Track {
                id,
                title: None,
                url: None,
                artists: Vec::new(),
                album: None,
            },
            MediaKind::Album => MediaSelection::Album {
                id,
                title: None,
                url: None,
                artists: Vec::new(),
                release_date: None,
            },
            MediaKind::Playlist => MediaSelection::Playlist {
                id,
                title: None,
                url: None,
                artists: Vec::new(),
            },
            MediaKind::Artist => MediaSelection::Artist {
                id,
                title: None,
                url: None,
                artists: Vec::new(),
            },
            MediaKind::Mix => MediaSelection::Mix {
                id,
                title: None,
                url: None,
                artists: Vec::new(),
            },
            MediaKind::Video => MediaSelection::Video {
                id,
                title: None,
                url: None,
                artists: Vec::new(),
            },
        }
    }

    pub fn kind(&self) -> MediaKind {
        match self {
            MediaSelection::Track { .. } => MediaKind::Track,
            MediaSelection::Album { .. } => MediaKind::Album,
            MediaSelection::Playlist { .. } => MediaKind::Playlist,
            MediaSelection::Artist { .. } => MediaKind::Artist,
            MediaSelection::Mix { .. } => MediaKind::Mix,
            MediaSelection::Video { .. } => MediaKind::Video,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            MediaSelection::Track { id, .. }
            | MediaSelection::Album { id, .. }
            | MediaSelection::Playlist { id, .. }
            | MediaSelection::Artist { id, .. }
            | MediaSelection::Mix { id, .. }
            | MediaSelection::Video { id, .. } => id,
        }
    }

    pub fn title(&self) -> Option<&str> {
        match self {
            MediaSelection::Track { title, .. }
            | MediaSelection::Album { title, .. }
            | MediaSelection::Playlist { title, .. }
            | MediaSelection::Artist { title, .. }
            | MediaSelection::Mix { title, .. }
            | MediaSelection::Video { title, .. } => title.as_deref(),
        }
    }

    pub fn url(&self) -> Option<&str> {
        match self {
            MediaSelection::Track { url, .. }
            | MediaSelection::Album { url, .. }
            | MediaSelection::Playlist { url, .. }
            | MediaSelection::Artist { url, .. }
            | MediaSelection::Mix { url, .. }
            | MediaSelection::Video { url, .. } => url.as_deref(),
        }
    }

    pub fn artists(&self) -> &[ArtistRef] {
        match self {
            MediaSelection::Track { artists, .. }
            | MediaSelection::Album { artists, .. }
            | MediaSelection::Playlist { artists, .. }
            | MediaSelection::Artist { artists, .. }
            | MediaSelection::Mix { artists, .. }
            | MediaSelection::Video { artists, .. } => artists,
        }
    }

    /// Album identifier for grouping, present only on tracks with album info.
    pub fn album_id(&self) -> Option<&str> {
        match self {
            MediaSelection::Track { album, .. } => album.as_ref().map(|a| a.id.as_str()),
            _ => None,
        }
    }

    /// First artist name, with the usual fallback.
    pub fn primary_artist(&self) -> String {
        self.artists()
            .first()
            .map(|a| a.name.clone())
            .unwrap_or_else(|| UNKNOWN_ARTIST.to_string())
    }

    /// Parse a CLI reference: either a Tidal share URL or a `kind:id` pair
    /// like `track:42` or `album:7`.
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        if !input.contains("://") {
            let (kind, id) = input.split_once(':')?;
            let kind = kind.to_lowercase().parse::<MediaKind>().ok()?;
            if id.is_empty() || !id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
                return None;
            }
            return Some(Self::bare(kind, id));
        }
        Self::from_share_url(input)
    }

    /// Parse a Tidal share link into a selection.
    ///
    /// Accepted shapes (with or without the `browse` prefix, query string
    /// ignored):
    /// - `https://tidal.com/browse/{kind}/{id}`
    /// - `https://listen.tidal.com/{kind}/{id}`
    /// - `https://tidal.com/browse/album/{album_id}/track/{track_id}`
    pub fn from_share_url(url: &str) -> Option<Self> {
        let rest = url
            .strip_prefix("https://")
            .or_else(|| url.strip_prefix("http://"))?;
        let (host, path) = rest.split_once('/')?;
        if !matches!(host, "tidal.com" | "www.tidal.com" | "listen.tidal.com") {
            return None;
        }

        let path = path.split('?').next().unwrap_or("");
        let mut segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        if segments.first() == Some(&"browse") {
            segments.remove(0);
        }

        match segments.as_slice() {
            ["album", album_id, "track", track_id] => Some(MediaSelection::Track {
                id: (*track_id).to_string(),
                title: None,
                url: Some(url.to_string()),
                artists: Vec::new(),
                album: Some(AlbumRef {
                    id: (*album_id).to_string(),
                    title: None,
                    release_date: None,
                }),
            }),
            [kind, id] => {
                let kind = kind.parse::<MediaKind>().ok()?;
                let mut selection = Self::bare(kind, *id);
                selection.set_url(url.to_string());
                Some(selection)
            }
            _ => None,
        }
    }

    fn set_url(&mut self, value: String) {
        match self {
            MediaSelection::Track { url, .. }
            | MediaSelection::Album { url, .. }
            | MediaSelection::Playlist { url, .. }
            | MediaSelection::Artist { url, .. }
            | MediaSelection::Mix { url, .. }
            | MediaSelection::Video { url, .. } => *url = Some(value),
        }
    }
}

/// The normalized record `/api/save` expects under the `item` key.
///
/// `status`, `loading` and `error` are fixed by the wire contract; Tidarr
/// uses them as the initial queue entry state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadRequest {
    pub id: String,
    pub title: String,
    pub artist: String,
    pub artists: Vec<ArtistRef>,
    pub url: String,
    #[serde(rename = "type")]
    pub kind: MediaKind,
    pub quality: Quality,
    pub status: String,
    pub loading: bool,
    pub error: bool,
}
