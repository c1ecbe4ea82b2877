//! File locations, media attachments and documents.

use std::time::Duration;

use dialog_wire::types;

// ─── FileLocation ─────────────────────────────────────────────────────────────

/// Address of a stored file plus the access proof needed to fetch it.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FileLocation {
    pub file_id:     i64,
    pub access_hash: i64,
}

impl FileLocation {
    pub fn new(file_id: i64, access_hash: i64) -> Self {
        Self { file_id, access_hash }
    }

    pub fn to_wire(&self) -> types::FileLocation {
        types::FileLocation { file_id: self.file_id, access_hash: self.access_hash }
    }
}

impl From<types::FileLocation> for FileLocation {
    fn from(f: types::FileLocation) -> Self {
        Self { file_id: f.file_id, access_hash: f.access_hash }
    }
}

/// A time-limited download URL returned by [`crate::Client::get_file_url`].
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileUrl {
    pub url:     String,
    /// How long `url` stays valid.
    pub timeout: Duration,
}

impl From<types::ResponseGetFileUrl> for FileUrl {
    fn from(r: types::ResponseGetFileUrl) -> Self {
        Self {
            url:     r.url,
            timeout: Duration::from_secs(u64::try_from(r.timeout).unwrap_or(0)),
        }
    }
}

// ─── Media ────────────────────────────────────────────────────────────────────

/// An image stored on the server.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Image {
    pub file:   FileLocation,
    pub width:  i32,
    pub height: i32,
    pub size:   i32,
}

impl Image {
    fn from_wire(i: &types::ImageLocation) -> Self {
        Self {
            file:   i.file_location.into(),
            width:  i.width,
            height: i.height,
            size:   i.file_size,
        }
    }

    fn to_wire(&self) -> types::ImageLocation {
        types::ImageLocation {
            file_location: self.file.to_wire(),
            width:         self.width,
            height:        self.height,
            file_size:     self.size,
        }
    }
}

/// One attachment of a media message.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Media {
    Image(Image),
    WebPage {
        url:         String,
        title:       String,
        description: String,
        image:       Option<Image>,
    },
    Audio {
        file:      FileLocation,
        duration:  i32,
        mime_type: String,
        size:      i32,
    },
}

impl Media {
    /// Map a wire attachment; `None` when no field is populated.
    pub fn from_wire(m: &types::MessageMedia) -> Option<Self> {
        if let Some(w) = &m.web_page {
            return Some(Self::WebPage {
                url:         w.url.clone(),
                title:       w.title.clone(),
                description: w.description.clone(),
                image:       w.image.as_ref().map(Image::from_wire),
            });
        }
        if let Some(i) = &m.image {
            return Some(Self::Image(Image::from_wire(&i.image)));
        }
        m.audio.as_ref().map(|a| Self::Audio {
            file:      a.file_location.into(),
            duration:  a.duration,
            mime_type: a.mime_type.clone(),
            size:      a.file_size,
        })
    }

    pub fn to_wire(&self) -> types::MessageMedia {
        match self {
            Self::Image(i) => types::MessageMedia {
                image: Some(types::ImageMedia { image: i.to_wire() }),
                ..Default::default()
            },
            Self::WebPage { url, title, description, image } => types::MessageMedia {
                web_page: Some(types::WebpageMedia {
                    url:         url.clone(),
                    title:       title.clone(),
                    description: description.clone(),
                    image:       image.as_ref().map(Image::to_wire),
                }),
                ..Default::default()
            },
            Self::Audio { file, duration, mime_type, size } => types::MessageMedia {
                audio: Some(types::AudioMedia {
                    file_location: file.to_wire(),
                    duration:      *duration,
                    mime_type:     mime_type.clone(),
                    file_size:     *size,
                }),
                ..Default::default()
            },
        }
    }
}

// ─── Documents ────────────────────────────────────────────────────────────────

/// Typed extras of a document.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DocumentKind {
    #[default]
    Plain,
    Photo { width: i32, height: i32 },
    Video { width: i32, height: i32, duration: i32 },
    Voice { duration: i32 },
}

impl DocumentKind {
    fn from_wire(ext: Option<&types::DocumentEx>) -> Self {
        let Some(ext) = ext else { return Self::Plain };
        if let Some(p) = ext.photo {
            Self::Photo { width: p.width, height: p.height }
        } else if let Some(v) = ext.video {
            Self::Video { width: v.width, height: v.height, duration: v.duration }
        } else if let Some(v) = ext.voice {
            Self::Voice { duration: v.duration }
        } else {
            Self::Plain
        }
    }

    fn to_wire(self) -> Option<types::DocumentEx> {
        let mut ext = types::DocumentEx::default();
        match self {
            Self::Plain => return None,
            Self::Photo { width, height } => {
                ext.photo = Some(types::DocumentExPhoto { width, height });
            }
            Self::Video { width, height, duration } => {
                ext.video = Some(types::DocumentExVideo { width, height, duration });
            }
            Self::Voice { duration } => {
                ext.voice = Some(types::DocumentExVoice { duration });
            }
        }
        Some(ext)
    }
}

/// A file sent as a document (any file type, including photos and videos
/// sent without compression).
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocumentContent {
    pub file:      FileLocation,
    pub size:      i32,
    pub name:      String,
    pub mime_type: String,
    pub kind:      DocumentKind,
}

impl DocumentContent {
    /// A plain document whose MIME type is guessed from `name`.
    pub fn new(file: FileLocation, size: i32, name: impl Into<String>) -> Self {
        let name = name.into();
        let mime_type = mime_guess::from_path(&name)
            .first_or_octet_stream()
            .essence_str()
            .to_owned();
        Self { file, size, name, mime_type, kind: DocumentKind::Plain }
    }

    /// Replace the guessed MIME type.
    pub fn mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = mime_type.into(); self
    }

    /// Attach typed extras.
    pub fn kind(mut self, kind: DocumentKind) -> Self {
        self.kind = kind; self
    }

    pub fn from_wire(d: &types::DocumentMessage) -> Self {
        Self {
            file:      FileLocation::new(d.file_id, d.access_hash),
            size:      d.file_size,
            name:      d.name.clone(),
            mime_type: d.mime_type.clone(),
            kind:      DocumentKind::from_wire(d.ext.as_ref()),
        }
    }

    pub fn to_wire(&self) -> types::DocumentMessage {
        types::DocumentMessage {
            file_id:     self.file.file_id,
            access_hash: self.file.access_hash,
            file_size:   self.size,
            name:        self.name.clone(),
            mime_type:   self.mime_type.clone(),
            ext:         self.kind.to_wire(),
        }
    }
}
