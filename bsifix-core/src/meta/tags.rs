use std::collections::BTreeMap;

use serde::Serialize;

/// Flat tag → text mapping as returned by a metadata probe.
pub type TagMap = BTreeMap<String, String>;

/// Tags recognised from a probe mapping. Empty values count as absent.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TrackTags {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub date: Option<String>,
    pub genre: Option<String>,
    pub track: Option<String>,
    pub composer: Option<String>,
    pub comment: Option<String>,
    pub encoded_by: Option<String>,
}

impl TrackTags {
    /// Keys are matched case-insensitively (`TITLE` and `title` are the same tag).
    pub fn from_map(map: &TagMap) -> Self {
        let lower: BTreeMap<String, &str> = map
            .iter()
            .filter(|(_, v)| !v.trim().is_empty())
            .map(|(k, v)| (k.to_ascii_lowercase(), v.as_str()))
            .collect();
        let get = |k: &str| lower.get(k).map(|v| v.to_string());
        Self {
            title: get("title"),
            artist: get("artist"),
            album: get("album"),
            date: get("date").or_else(|| get("date_created")),
            genre: get("genre"),
            track: get("track"),
            composer: get("composer"),
            comment: get("comment"),
            encoded_by: get("encoded_by"),
        }
    }

    pub fn resolve(self, stem: &str, defaults: &MetadataDefaults) -> TrackMetadata {
        TrackMetadata {
            title: self.title.unwrap_or_else(|| stem.to_string()),
            artist: self.artist.unwrap_or_else(|| defaults.artist.clone()),
            album: self.album,
            date: self
                .date
                .unwrap_or_else(|| super::now().year().to_string()),
            genre: self.genre.unwrap_or_else(|| defaults.genre.clone()),
            track: self.track,
            composer: self.composer,
            comment: self.comment,
            encoded_by: self.encoded_by,
            cut_id: stem.to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MetadataDefaults {
    pub artist: String,
    pub genre: String,
}

impl Default for MetadataDefaults {
    fn default() -> Self {
        Self {
            artist: "Unknown Artist".to_string(),
            genre: "Children's Music".to_string(),
        }
    }
}

/// Metadata with every default applied; what the rewrite and transcode stages consume.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TrackMetadata {
    pub title: String,
    pub artist: String,
    pub album: Option<String>,
    pub date: String,
    pub genre: String,
    pub track: Option<String>,
    pub composer: Option<String>,
    pub comment: Option<String>,
    pub encoded_by: Option<String>,
    /// Cart cut identifier (the source file stem).
    pub cut_id: String,
}

impl TrackMetadata {
    /// Non-empty `(key, value)` pairs to embed during transcoding.
    pub fn transcode_pairs(&self) -> Vec<(&'static str, String)> {
        let fields: [(&'static str, Option<&String>); 9] = [
            ("title", Some(&self.title)),
            ("artist", Some(&self.artist)),
            ("album", self.album.as_ref()),
            ("date", Some(&self.date)),
            ("genre", Some(&self.genre)),
            ("track", self.track.as_ref()),
            ("composer", self.composer.as_ref()),
            ("comment", self.comment.as_ref()),
            ("encoded_by", self.encoded_by.as_ref()),
        ];
        fields
            .into_iter()
            .filter_map(|(k, v)| v.filter(|v| !v.is_empty()).map(|v| (k, v.clone())))
            .collect()
    }
}
