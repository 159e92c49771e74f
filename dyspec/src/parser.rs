//! Textual parser for type expressions.
//!
//! The accepted syntax is the canonical rendering produced by
//! [`TypeSpec`]'s `Display` implementation, plus the sugar a demangler
//! typically prints:
//!
//! - `T?` and `T!` for `Swift.Optional<T>` / `Swift.ImplicitlyUnwrappedOptional<T>`,
//! - `[T]` and `[K: V]` for `Swift.Array<T>` / `Swift.Dictionary<K, V>`,
//! - `@attr[args]` as an alternative spelling of `@attr(args)`.
//!
//! A parenthesized single unlabeled type is folded into that type, so `(T)`
//! parses as `T`.
use std::str::FromStr;

use chumsky::prelude::*;

use crate::{
    types::{NamedTypeSpec, TypeSpec, TypeSpecAttribute, TypeSpecShape},
    utils::Error,
};

type Extra<'src> = extra::Err<Rich<'src, char>>;

/// Characters that can never appear inside an identifier.
const RESERVED: &[char] = &[
    '.', ',', '(', ')', '<', '>', '[', ']', ':', '&', '?', '!', '@', '-', '=',
];

const OPTIONAL: &str = "Swift.Optional";
const IMPLICITLY_UNWRAPPED_OPTIONAL: &str = "Swift.ImplicitlyUnwrappedOptional";
const ARRAY: &str = "Swift.Array";
const DICTIONARY: &str = "Swift.Dictionary";

pub fn whitespace<'src>() -> impl Parser<'src, &'src str, (), Extra<'src>> + Clone {
    any()
        .filter(|c: &char| c.is_whitespace())
        .repeated()
        .at_least(1)
        .ignored()
        .labelled("whitespace")
}

pub fn identifier<'src>() -> impl Parser<'src, &'src str, &'src str, Extra<'src>> + Clone {
    any()
        .filter(|c: &char| !c.is_whitespace() && !RESERVED.contains(c))
        .repeated()
        .at_least(1)
        .to_slice()
        .labelled("identifier")
}

pub fn attribute_parser<'src>()
-> impl Parser<'src, &'src str, TypeSpecAttribute, Extra<'src>> + Clone {
    let parameters = |open: char, close: char| {
        any()
            .filter(move |c: &char| *c != ',' && *c != close)
            .repeated()
            .at_least(1)
            .to_slice()
            .map(|s: &str| s.trim().to_string())
            .separated_by(just(','))
            .collect::<Vec<_>>()
            .delimited_by(just(open), just(close))
    };

    just('@')
        .ignore_then(identifier())
        .then(choice((parameters('(', ')'), parameters('[', ']'))).or_not())
        .map(|(name, parameters)| {
            TypeSpecAttribute::with_parameters(name, parameters.unwrap_or_default())
        })
        .labelled("attribute")
}

/// Wrap `core` with the prefix every type expression may carry: attributes,
/// `inout` and (when `allow_label` is set) a `label:`.
fn decorated<'src, P>(
    core: P,
    allow_label: bool,
) -> impl Parser<'src, &'src str, TypeSpec, Extra<'src>> + Clone
where
    P: Parser<'src, &'src str, TypeSpec, Extra<'src>> + Clone,
{
    let label = if allow_label {
        identifier()
            .then_ignore(just(':').padded())
            .map(|s: &str| s.to_string())
            .or_not()
            .boxed()
    } else {
        empty().to(None).boxed()
    };

    attribute_parser()
        .padded()
        .repeated()
        .collect::<Vec<_>>()
        .then(just("inout").then(whitespace()).or_not())
        .then(label)
        .then(core)
        .map(|(((attributes, inout), label), core)| {
            let mut spec = core.prepend_attributes(attributes);
            if inout.is_some() {
                spec = spec.with_inout(true);
            }
            match label {
                Some(label) => spec.with_label(label),
                None => spec,
            }
        })
}

type Segment<'src> = (&'src str, Option<Vec<TypeSpec>>);

fn named_segment((name, generics): Segment<'_>, inner: Option<TypeSpec>) -> TypeSpec {
    let spec = TypeSpec::from(NamedTypeSpec::new(name))
        .with_generic_parameters(generics.unwrap_or_default());
    match inner {
        Some(inner) => spec.with_inner_type(inner),
        None => spec,
    }
}

fn build_named(head: Segment<'_>, rest: Vec<Segment<'_>>) -> TypeSpec {
    let inner = rest
        .into_iter()
        .rev()
        .fold(None, |inner, segment| Some(named_segment(segment, inner)));
    named_segment(head, inner)
}

fn core_parser<'src>() -> impl Parser<'src, &'src str, TypeSpec, Extra<'src>> + Clone {
    recursive(|core| {
        let full = decorated(core.clone(), true);
        let unlabeled = decorated(core, false);

        let generic_arguments = unlabeled
            .clone()
            .padded()
            .separated_by(just(','))
            .at_least(1)
            .collect::<Vec<_>>()
            .delimited_by(just('<'), just('>'))
            .labelled("generic arguments");

        // `Swift.Dictionary<K, V>.Index`: dots before the generic arguments
        // belong to the name, dots after them select an inner type.
        let segment = identifier()
            .then(just('.').then(identifier()).repeated())
            .to_slice()
            .then(generic_arguments.or_not());

        let named = segment
            .clone()
            .then(just('.').ignore_then(segment).repeated().collect::<Vec<_>>())
            .map(|(head, rest)| build_named(head, rest))
            .labelled("named type");

        let tuple = full
            .padded()
            .separated_by(just(','))
            .collect::<Vec<_>>()
            .delimited_by(just('(').padded(), just(')'))
            .map(|mut elements| {
                if elements.len() == 1 && elements[0].label().is_none() {
                    elements.remove(0)
                } else {
                    TypeSpec::tuple(elements)
                }
            })
            .labelled("tuple");

        let sugar = unlabeled
            .clone()
            .padded()
            .then(just(':').padded().ignore_then(unlabeled.clone().padded()).or_not())
            .delimited_by(just('['), just(']'))
            .map(|(key, value)| match value {
                Some(value) => TypeSpec::named_generic(DICTIONARY, [key, value]),
                None => TypeSpec::named_generic(ARRAY, [key]),
            })
            .labelled("collection");

        let atom = choice((tuple, sugar, named)).foldl(
            one_of("?!").repeated(),
            |spec, marker| match marker {
                '?' => TypeSpec::named_generic(OPTIONAL, [spec]),
                _ => TypeSpec::named_generic(IMPLICITLY_UNWRAPPED_OPTIONAL, [spec]),
            },
        );

        let composition = atom
            .clone()
            .then(
                just('&')
                    .padded()
                    .ignore_then(atom)
                    .repeated()
                    .collect::<Vec<_>>(),
            )
            .try_map(|(first, rest), span| {
                if rest.is_empty() {
                    return Ok(first);
                }
                std::iter::once(first)
                    .chain(rest)
                    .map(|spec| match spec.shape() {
                        TypeSpecShape::Named(named) if !spec.contains_generic_parameters() => {
                            Ok(named.clone())
                        }
                        _ => Err(Rich::custom(
                            span,
                            format!("`{}` cannot appear in a protocol composition", spec),
                        )),
                    })
                    .collect::<Result<Vec<_>, _>>()
                    .map(TypeSpec::protocol_list)
            });

        composition
            .then(
                just("throws")
                    .padded()
                    .or_not()
                    .then_ignore(just("->").padded())
                    .then(unlabeled)
                    .or_not(),
            )
            .map(|(arguments, closure)| match closure {
                Some((throws, returns)) => TypeSpec::closure(arguments, returns, throws.is_some()),
                None => arguments,
            })
            .labelled("type")
    })
}

/// Parser for a complete type expression, including its attributes,
/// `inout` marker and label.
pub fn type_spec_parser<'src>() -> impl Parser<'src, &'src str, TypeSpec, Extra<'src>> + Clone {
    decorated(core_parser(), true)
}

/// Parse a type expression from its textual form.
///
/// ```rust
/// # use dyspec::parser::parse_type_spec;
/// let spec = parse_type_spec("Swift.Dictionary<Swift.String, T>.Index").unwrap();
/// assert_eq!(spec.to_string(), "Swift.Dictionary<Swift.String, T>.Index");
/// ```
pub fn parse_type_spec(src: &str) -> Result<TypeSpec, Error> {
    type_spec_parser()
        .padded()
        .then_ignore(end())
        .parse(src)
        .into_result()
        .map_err(|errors| {
            log::debug!("rejected type expression `{}` ({} errors)", src, errors.len());
            Error::TypeSpecParse {
                input: src.to_string(),
                reasons: errors.into_iter().map(|e| e.to_string()).collect(),
            }
        })
}

impl FromStr for TypeSpec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_type_spec(s)
    }
}
