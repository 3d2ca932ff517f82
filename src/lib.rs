pub mod classify;
pub mod columns;
pub mod config;
pub mod densify;
pub mod error;
pub mod hover;
pub mod layout;
pub mod legend;
pub mod model;
pub mod parser;
pub mod profile;
pub mod segment;
pub mod shapes;
pub mod ticks;
pub mod writer;

pub use classify::{ClassificationTable, Lookup};
pub use config::ProfileOptions;
pub use error::{ProfileError, Result};
pub use hover::HoverEvent;
pub use model::{Coord, ProfileGeometry, ProfileKind, ProfileOutcome, SurveyPoint, NO_DATA_MESSAGE};
pub use parser::parse_feature_collection;
pub use profile::{ProfileCompiler, ProfileDrawing, ProfileRequest, Sheet};
pub use writer::SvgWriter;
