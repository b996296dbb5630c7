pub mod dataset;
pub mod keymap;
pub mod language;
pub mod question_type;
pub mod record;

pub use dataset::{load_dataset, parse_dataset, render_dataset, write_dataset, DatasetShape};
pub use keymap::{keymap_for, FieldSlot, KeyMap, ENGLISH_KEYMAP, KEYMAPS};
pub use language::Language;
pub use question_type::QuestionType;
pub use record::{attach_annotation, Record, ValidationAnnotation, Verdict, VALIDATION_KEY};
