//! Token rules and the IRI detector that drive the token/rule scanner
//! (spec component G).

mod number_rule;
mod region_rule;
mod regex_rule;
mod rule;
mod token;
mod uri_detector;
mod uri_rule;
mod word_rule;

pub use number_rule::NumberRule;
pub use region_rule::RegionRule;
pub use regex_rule::RegexRule;
pub use rule::Rule;
pub use token::{Scanner, Token, TokenId};
pub use uri_detector::{Span, UriDetector};
pub use uri_rule::URIRule;
pub use word_rule::WordRule;
