use strum::EnumIs;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, EnumIs, Error)]
pub enum Error {
    /// The textual form of a type expression could not be parsed.
    #[error(
        "Unable to parse type expression `{input}`: {}. Type expressions follow the demangler's fully qualified output, e.g. `Swift.Array<Swift.Int>` or `(Swift.Int) throws -> ()`.",
        .reasons.join("; ")
    )]
    TypeSpecParse { input: String, reasons: Vec<String> },
}
