//! Request Builder: turns media selections into the normalized records the
//! Tidarr `/api/save` endpoint expects.
//!
//! Everything here is pure and total. There is no failure path: missing
//! fields fall back to sentinels and missing URLs are synthesized from a
//! fixed template, so the same selection always yields the same request.

use crate::models::{
    AlbumRef, ArtistRef, DownloadRequest, MediaKind, MediaSelection, Quality, TIDAL_BROWSE_URL,
    UNKNOWN_ARTIST, UNKNOWN_TITLE,
};

/// Canonical URL for a media entity, used when the selection carries none.
pub fn canonical_url(kind: MediaKind, id: &str) -> String {
    format!("{TIDAL_BROWSE_URL}/{kind}/{id}")
}

// A track inside a known album gets the richer album-scoped link.
fn track_url(id: &str, album: Option<&AlbumRef>) -> String {
    match album {
        Some(album) => format!("{TIDAL_BROWSE_URL}/album/{}/track/{id}", album.id),
        None => canonical_url(MediaKind::Track, id),
    }
}

fn resolve_url(selection: &MediaSelection) -> String {
    // Pass an explicit URL through untouched, as long as it is absolute.
    if let Some(url) = selection.url() {
        if url.starts_with("http://") || url.starts_with("https://") {
            return url.to_string();
        }
    }
    match selection {
        MediaSelection::Track { id, album, .. } => track_url(id, album.as_ref()),
        other => canonical_url(other.kind(), other.id()),
    }
}

fn artist_list(artists: &[ArtistRef]) -> Vec<ArtistRef> {
    if artists.is_empty() {
        vec![ArtistRef::new(UNKNOWN_ARTIST)]
    } else {
        artists.to_vec()
    }
}

/// Build one download request from one selection. Total, no failure path.
pub fn build(selection: &MediaSelection, quality: Quality) -> DownloadRequest {
    DownloadRequest {
        id: selection.id().to_string(),
        title: selection
            .title()
            .unwrap_or(UNKNOWN_TITLE)
            .to_string(),
        artist: selection.primary_artist(),
        artists: artist_list(selection.artists()),
        url: resolve_url(selection),
        kind: selection.kind(),
        quality,
        status: "queue".to_string(),
        loading: true,
        error: false,
    }
}

/// Plan the requests for a whole selection.
///
/// Grouping rule: more than one item, all of them tracks of the same album,
/// collapses into exactly one album-type request. Anything else sends one
/// request per item, each typed by its own kind.
pub fn plan(selections: &[MediaSelection], quality: Quality) -> Vec<DownloadRequest> {
    if let Some(album) = shared_album(selections) {
        let first = &selections[0];
        return vec![DownloadRequest {
            id: album.id.clone(),
            title: album
                .title
                .clone()
                .unwrap_or_else(|| UNKNOWN_TITLE.to_string()),
            artist: first.primary_artist(),
            artists: artist_list(first.artists()),
            url: canonical_url(MediaKind::Album, &album.id),
            kind: MediaKind::Album,
            quality,
            status: "queue".to_string(),
            loading: true,
            error: false,
        }];
    }

    selections
        .iter()
        .map(|selection| build(selection, quality))
        .collect()
}

// Album shared by every selected track, if the grouping rule applies.
fn shared_album(selections: &[MediaSelection]) -> Option<&AlbumRef> {
    if selections.len() < 2 {
        return None;
    }
    let first = match &selections[0] {
        MediaSelection::Track {
            album: Some(album), ..
        } => album,
        _ => return None,
    };
    let all_match = selections
        .iter()
        .all(|selection| selection.album_id() == Some(first.id.as_str()));
    all_match.then_some(first)
}
