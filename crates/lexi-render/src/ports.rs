// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Collaborator ports consumed by the generator.
//!
//! The lexicon store, publication filter, writing-system registry, media
//! file service and style resolver are all external. Each is a small
//! `Send + Sync` trait so that one [`RenderEnvironment`] can be shared by
//! every render worker.
use thiserror::Error;

use crate::ident::{Guid, ObjectId};
use crate::value::{FileRef, TsString, Value};

/// Broad category of an object, as far as rendering cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    /// Lexical entry.
    Entry,
    /// Sense of an entry (or sub-sense of a sense).
    Sense,
    /// Variant or complex-form reference owned by an entry.
    EntryRef,
    /// Lexical relation instance.
    LexReference,
    /// Lexical relation type.
    RelationType,
    /// Item of a possibility list (parts of speech, usages, types).
    Possibility,
    /// Allomorph or other form object.
    Form,
    /// Picture owned by a sense.
    Picture,
    /// Anything else.
    Other,
}

/// Schema-level kind of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Single object reference.
    Atomic,
    /// Unordered objects.
    Collection,
    /// Ordered objects.
    Sequence,
    /// String, number, boolean, or date.
    Primitive,
    /// Formatted text.
    Rich,
    /// Text per writing system.
    MultiString,
    /// Paragraph-structured text.
    Paragraphs,
    /// Media file.
    File,
}

/// Read access to the lexicon store.
pub trait FieldAccessor: Send + Sync {
    /// Schema class name of `obj` (e.g. `LexEntry`).
    fn class_name(&self, obj: ObjectId) -> Option<&str>;
    /// Rendering category of `obj`.
    fn object_kind(&self, obj: ObjectId) -> ObjectKind;
    /// Stable identity of `obj`.
    fn guid(&self, obj: ObjectId) -> Guid;
    /// Kind of `field` on `class`, or `None` when the class has no such field.
    fn field_kind(&self, class: &str, field: &str) -> Option<FieldKind>;
    /// Value of a static field. `None` when the field is unknown.
    fn get_field(&self, obj: ObjectId, field: &str) -> Option<Value>;
    /// Value of a custom field declared on `owner_class`. `None` when no such
    /// custom field exists.
    fn get_custom_field(&self, obj: ObjectId, owner_class: &str, field: &str) -> Option<Value>;
    /// Key used to order unordered collections.
    fn sort_key(&self, obj: ObjectId) -> String;
    /// Display headword of an entry or sense.
    fn headword(&self, obj: ObjectId) -> TsString;
    /// Entry that owns `obj` (an entry owns itself).
    fn owning_entry(&self, obj: ObjectId) -> Option<ObjectId>;
}

/// Decides which objects a publication leaves out.
pub trait PublicationFilter: Send + Sync {
    /// `true` when `obj` must not appear.
    fn is_excluded(&self, obj: ObjectId) -> bool;
}

/// Filter that publishes everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct PublishEverything;

impl PublicationFilter for PublishEverything {
    fn is_excluded(&self, _obj: ObjectId) -> bool {
        false
    }
}

/// Descriptive data for one writing system.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WritingSystem {
    /// Identifier used in [`crate::Run::ws`] and in node options.
    pub id: String,
    /// Short label for abbreviation prefixes.
    pub abbreviation: String,
    /// BCP 47 language tag for `lang` attributes.
    pub language_tag: String,
    /// Default font family.
    pub default_font: String,
    /// Right-to-left script.
    pub right_to_left: bool,
}

/// Magic writing-system tokens understood by every registry.
pub mod magic {
    /// Default vernacular writing system.
    pub const VERNACULAR: &str = "vernacular";
    /// Default analysis writing system.
    pub const ANALYSIS: &str = "analysis";
    /// First vernacular writing system with data.
    pub const BEST_VERNACULAR: &str = "best vernacular";
    /// First analysis writing system with data.
    pub const BEST_ANALYSIS: &str = "best analysis";
    /// Best vernacular, else best analysis.
    pub const BEST_VERNACULAR_OR_ANALYSIS: &str = "best vernoranal";
    /// Best analysis, else best vernacular.
    pub const BEST_ANALYSIS_OR_VERNACULAR: &str = "best analorvern";
    /// Default pronunciation writing system.
    pub const PRONUNCIATION: &str = "pronunciation";
}

/// Writing-system lookup.
pub trait WritingSystemRegistry: Send + Sync {
    /// Candidate writing-system ids for a configured token, in preference
    /// order. Concrete ids resolve to themselves when known; magic tokens
    /// (see [`magic`]) expand to their family. Unknown tokens resolve to
    /// nothing.
    fn resolve(&self, token: &str) -> Vec<String>;
    /// Writing system with the given id.
    fn writing_system(&self, id: &str) -> Option<&WritingSystem>;
    /// Every writing system in use, in document order.
    fn all(&self) -> Vec<&WritingSystem>;
    /// Multigraphs that sort as single letters in `ws`.
    fn digraphs(&self, _ws: &str) -> Vec<String> {
        Vec::new()
    }
}

/// Category of a media file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    /// Image.
    Picture,
    /// Sound file.
    Audio,
    /// Movie.
    Video,
    /// Any other file.
    Other,
}

impl MediaKind {
    /// Classifies by file extension alone.
    pub fn from_extension(ext: &str) -> Self {
        match ext {
            "wav" | "mp3" | "ogg" | "wma" | "m4a" | "flac" | "aac" => Self::Audio,
            "mp4" | "avi" | "wmv" | "webm" | "mov" | "mpg" | "mpeg" | "mkv" => Self::Video,
            "jpg" | "jpeg" | "png" | "gif" | "bmp" | "tif" | "tiff" | "svg" => Self::Picture,
            _ => Self::Other,
        }
    }
}

/// Failure to place a media file.
#[derive(Debug, Error)]
pub enum FileServiceError {
    /// The source file does not exist.
    #[error("media file missing: {0}")]
    Missing(String),
    /// Copying or linking failed.
    #[error("media i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Places media files for the exported document.
pub trait FileService: Send + Sync {
    /// Path to reference from the markup for `file`.
    fn resolve_media(&self, file: &FileRef, kind: MediaKind) -> Result<String, FileServiceError>;
}

/// Leaves media where the store recorded it.
#[derive(Debug, Clone, Copy, Default)]
pub struct MediaInPlace;

impl FileService for MediaInPlace {
    fn resolve_media(&self, file: &FileRef, _kind: MediaKind) -> Result<String, FileServiceError> {
        Ok(file.path.replace('\\', "/"))
    }
}

/// Maps style names to CSS declarations.
pub trait StyleResolver: Send + Sync {
    /// Opaque CSS declaration block for `style` (without braces).
    fn css_for(&self, style: &str) -> Option<String>;
}

/// Resolver with no styles.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoStyles;

impl StyleResolver for NoStyles {
    fn css_for(&self, _style: &str) -> Option<String> {
        None
    }
}

/// Everything a render pass reads from the outside world.
#[derive(Clone, Copy)]
pub struct RenderEnvironment<'a> {
    /// Lexicon store.
    pub accessor: &'a dyn FieldAccessor,
    /// Publication filter.
    pub filter: &'a dyn PublicationFilter,
    /// Writing-system registry.
    pub writing_systems: &'a dyn WritingSystemRegistry,
    /// Media file placement.
    pub files: &'a dyn FileService,
    /// Style lookup for the stylesheet fragment.
    pub styles: &'a dyn StyleResolver,
}

impl<'a> RenderEnvironment<'a> {
    /// Environment that publishes everything, leaves media in place and
    /// knows no styles.
    pub fn new(
        accessor: &'a dyn FieldAccessor,
        writing_systems: &'a dyn WritingSystemRegistry,
    ) -> Self {
        Self {
            accessor,
            filter: &PublishEverything,
            writing_systems,
            files: &MediaInPlace,
            styles: &NoStyles,
        }
    }

    /// Replaces the publication filter.
    pub fn with_filter(mut self, filter: &'a dyn PublicationFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Replaces the file service.
    pub fn with_files(mut self, files: &'a dyn FileService) -> Self {
        self.files = files;
        self
    }

    /// Replaces the style resolver.
    pub fn with_styles(mut self, styles: &'a dyn StyleResolver) -> Self {
        self.styles = styles;
        self
    }
}

impl std::fmt::Debug for RenderEnvironment<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderEnvironment").finish_non_exhaustive()
    }
}
