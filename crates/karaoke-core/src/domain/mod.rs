pub mod ids;
pub mod lyrics;
pub(crate) mod nullable;
pub mod song;
pub mod source;

pub use ids::SongId;
pub use lyrics::{LyricSheet, format_clock, line_index};
pub use song::{Reference, Song};
pub use source::{InstrumentalSource, SourceKind};
