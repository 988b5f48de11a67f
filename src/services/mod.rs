//! High-level operations composed from the text, matching, oracle and
//! repository layers. The CLI is a thin shell over these.

mod matching;
mod submit;

pub use matching::MatchService;
pub use submit::{submit_text, SubmitOptions, DEFAULT_SECTION_WORDS};
